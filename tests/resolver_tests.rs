// tests/resolver_tests.rs
//
// Join-point advice resolution: argument-index binding, ordering, guard
// propagation, and binding failure reporting.

mod common;

use common::{demo_repository, place_method};
use weft::definition::{
    AdviceDefinition, AdviceKind, AspectDefinition, DeploymentModel, SpecialArg, SystemDefinition,
};
use weft::errors::ErrorKind;
use weft::eval::{JoinPointRef, MatchContext, RuntimeCheck};
use weft::resolve::{
    resolve_advice, ArgSlot, JOIN_POINT_ARG, SPECIAL_ARG, STATIC_JOIN_POINT_ARG,
};

fn advice(
    system: &SystemDefinition,
    aspect: &str,
    name: &str,
    kind: AdviceKind,
    bind_to: &str,
    signature: &str,
    special_arg: Option<SpecialArg>,
) -> AdviceDefinition {
    AdviceDefinition::compile(
        aspect,
        name,
        kind,
        DeploymentModel::PerJvm,
        bind_to,
        signature,
        special_arg,
        &system.namespace,
    )
    .unwrap()
}

#[test]
fn scenario_e_argument_index_array() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");
    let mut aspect = AspectDefinition::new("Logging", "demo.aspect.LoggingAspect");
    aspect.add_advice(advice(
        &system,
        "Logging",
        "logEntry",
        AdviceKind::Before,
        "execution(* demo.service.OrderService.place(..)) && args(x)",
        "logEntry(StaticJoinPoint jp, int x)",
        None,
    ));
    system.add_aspect(aspect);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let container = resolve_advice(&[system], &ctx).unwrap();

    assert_eq!(container.before.len(), 1);
    let info = &container.before[0];
    assert_eq!(
        info.arg_slots,
        vec![ArgSlot::StaticJoinPoint, ArgSlot::Advised(0)]
    );
    assert_eq!(info.index_array(), vec![STATIC_JOIN_POINT_ARG, 0]);
    // args() always leaves a runtime type check behind.
    assert!(info.requires_runtime_guard());
    assert!(info.runtime_checks.contains(&RuntimeCheck::ArgumentTypes));
}

#[test]
fn join_point_parameter_binds_unconditionally() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");
    let mut aspect = AspectDefinition::new("Logging", "demo.aspect.LoggingAspect");
    aspect.add_advice(advice(
        &system,
        "Logging",
        "trace",
        AdviceKind::Around,
        "execution(* demo.service.OrderService.place(..))",
        "trace(weft.JoinPoint jp)",
        None,
    ));
    system.add_aspect(aspect);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let container = resolve_advice(&[system], &ctx).unwrap();

    assert_eq!(container.around.len(), 1);
    let info = &container.around[0];
    assert_eq!(info.arg_slots, vec![ArgSlot::JoinPoint]);
    assert_eq!(info.index_array(), vec![JOIN_POINT_ARG]);
    assert!(!info.requires_runtime_guard());
}

#[test]
fn target_binding_resolves_by_name() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");
    let mut aspect = AspectDefinition::new("Guard", "demo.aspect.GuardAspect");
    aspect.add_advice(advice(
        &system,
        "Guard",
        "checkTarget",
        AdviceKind::Before,
        "execution(* demo.service.OrderService.place(..)) && target(t)",
        "checkTarget(weft.JoinPoint jp, demo.service.OrderService t)",
        None,
    ));
    system.add_aspect(aspect);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let container = resolve_advice(&[system], &ctx).unwrap();

    assert_eq!(container.before.len(), 1);
    assert_eq!(
        container.before[0].arg_slots,
        vec![ArgSlot::JoinPoint, ArgSlot::Target]
    );
}

#[test]
fn special_argument_binds_thrown_value() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");
    let mut aspect = AspectDefinition::new("Errors", "demo.aspect.ErrorAspect");
    aspect.add_advice(advice(
        &system,
        "Errors",
        "onFailure",
        AdviceKind::AfterThrowing,
        "execution(* demo.service.OrderService.place(..))",
        "onFailure(weft.JoinPoint jp, java.lang.Exception failure)",
        Some(SpecialArg {
            name: "failure".into(),
            type_name: "java.lang.Exception".into(),
        }),
    ));
    system.add_aspect(aspect);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let container = resolve_advice(&[system], &ctx).unwrap();

    assert_eq!(container.after_throwing.len(), 1);
    let info = &container.after_throwing[0];
    assert_eq!(info.arg_slots, vec![ArgSlot::JoinPoint, ArgSlot::Special]);
    assert_eq!(info.index_array()[1], SPECIAL_ARG);
}

#[test]
fn unbindable_parameter_is_fatal_and_named() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");
    let mut aspect = AspectDefinition::new("Broken", "demo.aspect.BrokenAspect");
    // `y` is bound by nothing: not args-bound, not a join-point type, not
    // this/target, not a special argument.
    aspect.add_advice(advice(
        &system,
        "Broken",
        "oops",
        AdviceKind::Before,
        "execution(* demo.service.OrderService.place(..))",
        "oops(weft.JoinPoint jp, int y)",
        None,
    ));
    system.add_aspect(aspect);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let err = resolve_advice(&[system], &ctx).unwrap_err();

    let ErrorKind::UnboundParameter {
        aspect,
        advice,
        parameter,
        position,
    } = err.kind
    else {
        panic!("expected an unbound-parameter error");
    };
    assert_eq!(aspect, "Broken");
    assert_eq!(advice, "oops");
    assert_eq!(parameter, "y");
    assert_eq!(position, 1);
}

#[test]
fn non_matching_advice_is_excluded_entirely() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");
    let mut aspect = AspectDefinition::new("Web", "demo.aspect.WebAspect");
    aspect.add_advice(advice(
        &system,
        "Web",
        "traceWeb",
        AdviceKind::Before,
        "execution(* demo.web..*.*(..))",
        "traceWeb(weft.JoinPoint jp)",
        None,
    ));
    system.add_aspect(aspect);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let container = resolve_advice(&[system], &ctx).unwrap();
    assert!(container.is_empty());
    assert!(container.skips_instrumentation());
}

#[test]
fn ordering_is_registration_then_declaration_order() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");

    let mut first = AspectDefinition::new("First", "demo.aspect.First");
    first.add_advice(advice(
        &system,
        "First",
        "one",
        AdviceKind::Before,
        "execution(* demo.service.OrderService.place(..))",
        "one(weft.JoinPoint jp)",
        None,
    ));
    first.add_advice(advice(
        &system,
        "First",
        "two",
        AdviceKind::Before,
        "execution(* demo.service..*.*(..))",
        "two(weft.JoinPoint jp)",
        None,
    ));

    let mut second = AspectDefinition::new("Second", "demo.aspect.Second");
    second.add_advice(advice(
        &system,
        "Second",
        "three",
        AdviceKind::Before,
        "execution(* demo.service.OrderService.place(..))",
        "three(weft.JoinPoint jp)",
        None,
    ));

    system.add_aspect(first);
    system.add_aspect(second);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let container = resolve_advice(&[system], &ctx).unwrap();

    let names: Vec<&str> = container.before.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
}

#[test]
fn undetermined_advice_carries_its_guard_into_the_plan() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");
    let mut aspect = AspectDefinition::new("Flow", "demo.aspect.FlowAspect");
    aspect.add_advice(advice(
        &system,
        "Flow",
        "inFlow",
        AdviceKind::Before,
        "execution(* demo.service.OrderService.place(..)) \
         && cflow(execution(* demo.web.Controller.handle(..)))",
        "inFlow(weft.JoinPoint jp)",
        None,
    ));
    system.add_aspect(aspect);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let container = resolve_advice(&[system], &ctx).unwrap();

    assert_eq!(container.before.len(), 1);
    let info = &container.before[0];
    assert!(info.requires_runtime_guard());
    assert!(info.runtime_checks.contains(&RuntimeCheck::ControlFlow));
}

#[test]
fn deployment_model_flows_through_to_the_plan() {
    let repo = demo_repository();
    let mut system = SystemDefinition::new("demo");
    let mut aspect = AspectDefinition::new("Scoped", "demo.aspect.ScopedAspect")
        .with_deployment_model(DeploymentModel::PerThread);
    aspect.add_advice(advice(
        &system,
        "Scoped",
        "tick",
        AdviceKind::AfterFinally,
        "execution(* demo.service.OrderService.place(..))",
        "tick(weft.JoinPoint jp)",
        None,
    ));
    system.add_aspect(aspect);

    let place = place_method(&repo);
    let ctx = MatchContext::execution(JoinPointRef::Method(&place), &repo);
    let container = resolve_advice(&[system], &ctx).unwrap();
    assert_eq!(
        container.after_finally[0].deployment_model,
        DeploymentModel::PerThread
    );
}
