//! Join-point advice resolution.
//!
//! For a concrete match context, iterates every system, aspect, and advice
//! definition, evaluates each expression, and assembles the ordered advice
//! plan the codegen layer consumes: five kind-ordered lists, each entry
//! carrying a typed argument-slot table (with its conventional `int`-array
//! rendering) and the residual runtime checks that must guard dispatch.
//!
//! Ordering is aspect registration order, then advice declaration order
//! within an aspect. There is no cross-aspect priority mechanism.

use crate::definition::{AdviceDefinition, AdviceKind, DeploymentModel, SystemDefinition};
use crate::errors::{DefinitionContext, ErrorReporting, SourceContext, WeftError};
use crate::eval::{evaluate, BindingResult, MatchContext, RuntimeCheck};

// ============================================================================
// ARGUMENT SLOTS
// ============================================================================

/// Index sentinel for a join-point-object parameter.
pub const JOIN_POINT_ARG: i32 = -1;
/// Index sentinel for a static-join-point parameter.
pub const STATIC_JOIN_POINT_ARG: i32 = -2;
/// Index sentinel for a bound `this(...)` parameter.
pub const THIS_ARG: i32 = -3;
/// Index sentinel for a bound `target(...)` parameter.
pub const TARGET_ARG: i32 = -4;
/// Index sentinel for an after-returning / after-throwing value parameter.
pub const SPECIAL_ARG: i32 = -5;

/// Qualified type names that bind to runtime-injected join-point values.
pub const JOIN_POINT_TYPE: &str = "weft.JoinPoint";
pub const STATIC_JOIN_POINT_TYPE: &str = "weft.StaticJoinPoint";

/// Resolved binding of one advice-method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSlot {
    JoinPoint,
    StaticJoinPoint,
    This,
    Target,
    Special,
    /// Index into the advised member's own parameter list.
    Advised(usize),
}

impl ArgSlot {
    /// Conventional `int` rendering: negative sentinels for injected values,
    /// non-negative advised-argument indices.
    pub fn index(self) -> i32 {
        match self {
            ArgSlot::JoinPoint => JOIN_POINT_ARG,
            ArgSlot::StaticJoinPoint => STATIC_JOIN_POINT_ARG,
            ArgSlot::This => THIS_ARG,
            ArgSlot::Target => TARGET_ARG,
            ArgSlot::Special => SPECIAL_ARG,
            ArgSlot::Advised(index) => index as i32,
        }
    }
}

// ============================================================================
// RESOLVED ADVICE
// ============================================================================

/// One advice selected for a join point, with its binding plan.
#[derive(Debug, Clone)]
pub struct AdviceInfo {
    pub aspect: String,
    pub name: String,
    pub kind: AdviceKind,
    pub deployment_model: DeploymentModel,
    pub arg_slots: Vec<ArgSlot>,
    /// Residual checks dispatch must evaluate; empty for unconditional
    /// matches.
    pub runtime_checks: Vec<RuntimeCheck>,
}

impl AdviceInfo {
    pub fn requires_runtime_guard(&self) -> bool {
        !self.runtime_checks.is_empty()
    }

    pub fn index_array(&self) -> Vec<i32> {
        self.arg_slots.iter().map(|s| s.index()).collect()
    }
}

/// Ordered advice lists per temporal kind.
#[derive(Debug, Clone, Default)]
pub struct AdviceInfoContainer {
    pub before: Vec<AdviceInfo>,
    pub around: Vec<AdviceInfo>,
    pub after_returning: Vec<AdviceInfo>,
    pub after_throwing: Vec<AdviceInfo>,
    pub after_finally: Vec<AdviceInfo>,
}

impl AdviceInfoContainer {
    pub fn push(&mut self, advice: AdviceInfo) {
        self.list_mut(advice.kind).push(advice);
    }

    fn list_mut(&mut self, kind: AdviceKind) -> &mut Vec<AdviceInfo> {
        match kind {
            AdviceKind::Before => &mut self.before,
            AdviceKind::Around => &mut self.around,
            AdviceKind::AfterReturning => &mut self.after_returning,
            AdviceKind::AfterThrowing => &mut self.after_throwing,
            AdviceKind::AfterFinally => &mut self.after_finally,
        }
    }

    pub fn list(&self, kind: AdviceKind) -> &[AdviceInfo] {
        match kind {
            AdviceKind::Before => &self.before,
            AdviceKind::Around => &self.around,
            AdviceKind::AfterReturning => &self.after_returning,
            AdviceKind::AfterThrowing => &self.after_throwing,
            AdviceKind::AfterFinally => &self.after_finally,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &AdviceInfo> {
        self.before
            .iter()
            .chain(self.around.iter())
            .chain(self.after_returning.iter())
            .chain(self.after_throwing.iter())
            .chain(self.after_finally.iter())
    }

    pub fn len(&self) -> usize {
        self.all().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no advice at this join point needs instrumentation at all,
    /// letting the weaver skip the site entirely.
    pub fn skips_instrumentation(&self) -> bool {
        self.is_empty()
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolves the ordered advice plan for one join point.
///
/// Collects every advice whose verdict is `True` or `Undetermined`; the
/// latter carry their runtime checks into the plan. Binding failures are
/// definition errors and abort resolution; an advice is never silently
/// dropped or bound to a wrong index.
pub fn resolve_advice(
    systems: &[SystemDefinition],
    ctx: &MatchContext<'_>,
) -> Result<AdviceInfoContainer, WeftError> {
    let mut container = AdviceInfoContainer::default();

    for system in systems {
        for aspect in &system.aspects {
            for advice in &aspect.advice {
                let evaluation = evaluate(&advice.expression, ctx, &system.namespace)?;
                if !evaluation.participates() {
                    continue;
                }
                let arg_slots = bind_arguments(advice, &evaluation.bindings)?;
                container.push(AdviceInfo {
                    aspect: aspect.name.clone(),
                    name: advice.name.clone(),
                    kind: advice.kind,
                    deployment_model: aspect.deployment_model,
                    arg_slots,
                    runtime_checks: evaluation.bindings.runtime_checks().to_vec(),
                });
            }
        }
    }

    Ok(container)
}

/// Maps every advice parameter to exactly one binding kind.
///
/// Order matters: an `args(...)`-bound name wins over everything, then the
/// join-point types, then bound `this`/`target` names, then the special
/// argument. Anything left over is a fatal definition error naming the
/// advice, aspect, parameter, and position.
fn bind_arguments(
    advice: &AdviceDefinition,
    bindings: &BindingResult,
) -> Result<Vec<ArgSlot>, WeftError> {
    let mut slots = Vec::with_capacity(advice.signature.params.len());

    for (position, param) in advice.signature.params.iter().enumerate() {
        let slot = if let Some(index) = bindings.arg_index(&param.name) {
            ArgSlot::Advised(index)
        } else if is_join_point_type(&param.type_name) {
            ArgSlot::JoinPoint
        } else if is_static_join_point_type(&param.type_name) {
            ArgSlot::StaticJoinPoint
        } else if bindings.this_binding() == Some(param.name.as_str()) {
            ArgSlot::This
        } else if bindings.target_binding() == Some(param.name.as_str()) {
            ArgSlot::Target
        } else if advice
            .special_arg
            .as_ref()
            .is_some_and(|special| special.name == param.name)
        {
            ArgSlot::Special
        } else {
            let ctx = DefinitionContext::new(
                SourceContext::from_text(advice.aspect.clone(), advice.signature.source()),
                "binding",
            );
            return Err(ctx.unbound_parameter(&advice.aspect, &advice.name, &param.name, position));
        };
        slots.push(slot);
    }

    Ok(slots)
}

fn is_join_point_type(type_name: &str) -> bool {
    type_name == JOIN_POINT_TYPE || type_name == "JoinPoint"
}

fn is_static_join_point_type(type_name: &str) -> bool {
    type_name == STATIC_JOIN_POINT_TYPE || type_name == "StaticJoinPoint"
}
