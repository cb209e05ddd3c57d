//! Three-valued pointcut evaluation.
//!
//! This module is the algorithmic heart of the weaving core: a single
//! recursive walk over the expression tree that decides, from static
//! reflection metadata alone, whether a pointcut definitely matches a join
//! point (`True`), definitely does not (`False`), or cannot be decided
//! without a runtime check (`Undetermined`). The distinction drives code
//! generation downstream: `False` excludes instrumentation entirely,
//! `Undetermined` compiles into a guarded dispatch, `True` dispatches
//! unconditionally.
//!
//! Every call produces a fresh [`BindingResult`]; the context is never
//! mutated and never reused, so binding state cannot leak between advice
//! candidates.

use crate::errors::{
    unspanned, DefinitionContext, ErrorKind, ErrorReporting, SourceContext, WeftError,
};
use crate::expr::{
    AnnotationScope, ArgElement, ExprNode, ExpressionInfo, ExpressionNamespace, TargetSpec,
};
use crate::meta::{AnnotationInfo, Assignability, OBJECT};
use crate::pattern::TypePattern;

pub mod binding;
pub mod context;

pub use binding::{BindingResult, RuntimeCheck};
pub use context::{JoinPointRef, MatchContext, PointcutKind};

// ============================================================================
// VERDICT
// ============================================================================

/// Three-valued match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    True,
    False,
    Undetermined,
}

impl Verdict {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Verdict::True
        } else {
            Verdict::False
        }
    }

    /// `False` dominates, then `Undetermined`, then `True`.
    pub fn and(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::False, _) | (_, Verdict::False) => Verdict::False,
            (Verdict::Undetermined, _) | (_, Verdict::Undetermined) => Verdict::Undetermined,
            _ => Verdict::True,
        }
    }

    /// `True` dominates, then `Undetermined`, then `False`.
    pub fn or(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::True, _) | (_, Verdict::True) => Verdict::True,
            (Verdict::Undetermined, _) | (_, Verdict::Undetermined) => Verdict::Undetermined,
            _ => Verdict::False,
        }
    }

    /// Negating "don't know yet" is still "don't know yet".
    pub fn not(self) -> Verdict {
        match self {
            Verdict::True => Verdict::False,
            Verdict::False => Verdict::True,
            Verdict::Undetermined => Verdict::Undetermined,
        }
    }

    pub fn is_true(self) -> bool {
        self == Verdict::True
    }

    pub fn is_false(self) -> bool {
        self == Verdict::False
    }

    pub fn is_undetermined(self) -> bool {
        self == Verdict::Undetermined
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Result of one evaluation: the verdict plus the bindings and residual
/// runtime checks collected along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub bindings: BindingResult,
}

impl Evaluation {
    /// True iff the advice participates at this join point, conditionally or
    /// not. Only `False` excludes it.
    pub fn participates(&self) -> bool {
        !self.verdict.is_false()
    }
}

/// Evaluates a compiled expression against a match context.
///
/// Named references resolve through the given namespace; a reference cycle or
/// an unresolved name is a definition error, never a silent non-match.
pub fn evaluate(
    expr: &ExpressionInfo,
    ctx: &MatchContext<'_>,
    namespace: &ExpressionNamespace,
) -> Result<Evaluation, WeftError> {
    let mut evaluator = Evaluator {
        expr,
        ctx,
        namespace,
        ref_stack: vec![],
        bindings: BindingResult::new(),
    };
    let verdict = evaluator.eval(expr.root())?;
    Ok(Evaluation {
        verdict,
        bindings: evaluator.bindings,
    })
}

// ============================================================================
// EVALUATOR
// ============================================================================

struct Evaluator<'a> {
    expr: &'a ExpressionInfo,
    ctx: &'a MatchContext<'a>,
    namespace: &'a ExpressionNamespace,
    /// Visitation stack for pointcut-reference cycle detection.
    ref_stack: Vec<String>,
    bindings: BindingResult,
}

impl<'a> Evaluator<'a> {
    fn eval(&mut self, node: &ExprNode) -> Result<Verdict, WeftError> {
        match node {
            ExprNode::And(lhs, rhs) => Ok(self.eval(lhs)?.and(self.eval(rhs)?)),
            ExprNode::Or(lhs, rhs) => Ok(self.eval(lhs)?.or(self.eval(rhs)?)),
            ExprNode::Not(operand) => Ok(self.eval(operand)?.not()),

            ExprNode::Execution(pattern) => Ok(self.eval_callable(pattern, PointcutKind::Execution)),
            ExprNode::Call(pattern) => Ok(self.eval_callable(pattern, PointcutKind::Call)),
            ExprNode::Get(pattern) => Ok(self.eval_field(pattern, PointcutKind::Get)),
            ExprNode::Set(pattern) => Ok(self.eval_field(pattern, PointcutKind::Set)),
            ExprNode::Within(pattern) => {
                Ok(Verdict::from_bool(pattern.matches(self.ctx.within_class_name())))
            }
            ExprNode::WithinCode(pattern) => Ok(self.eval_withincode(pattern)),
            ExprNode::Handler(pattern) => self.eval_handler(pattern),
            ExprNode::StaticInitialization(pattern) => Ok(self.eval_static_initialization(pattern)),

            ExprNode::Cflow(_) | ExprNode::CflowBelow(_) => {
                // Control-flow membership is only knowable on a live thread
                // stack; matching always defers to a runtime guard.
                self.bindings.require(RuntimeCheck::ControlFlow);
                Ok(Verdict::Undetermined)
            }

            ExprNode::This(spec) => self.eval_this(spec),
            ExprNode::Target(spec) => self.eval_target(spec),
            ExprNode::Args(elements) => Ok(self.eval_args(elements)),
            ExprNode::AnnotationMatch { scope, pattern } => Ok(self.eval_annotation(*scope, pattern)),

            ExprNode::Reference(name) => self.eval_reference(name),
        }
    }

    // --- Structural designators ---

    fn eval_callable(
        &mut self,
        pattern: &crate::pattern::MemberPattern,
        kind: PointcutKind,
    ) -> Verdict {
        if self.ctx.kind != kind {
            return Verdict::False;
        }
        match self.ctx.join_point {
            JoinPointRef::Method(m) => pattern.matches_method(m, self.ctx.repo),
            JoinPointRef::Constructor(c) => pattern.matches_constructor(c, self.ctx.repo),
            JoinPointRef::Class(c) => pattern.matches_class(c, self.ctx.repo),
            JoinPointRef::Field(_) | JoinPointRef::StaticInit(_) => Verdict::False,
        }
    }

    fn eval_field(&mut self, pattern: &crate::pattern::FieldPattern, kind: PointcutKind) -> Verdict {
        if self.ctx.kind != kind {
            return Verdict::False;
        }
        match self.ctx.join_point {
            JoinPointRef::Field(f) => pattern.matches_field(f),
            JoinPointRef::Class(c) => pattern.matches_class(c),
            _ => Verdict::False,
        }
    }

    fn eval_withincode(&mut self, pattern: &crate::pattern::MemberPattern) -> Verdict {
        match self.ctx.within {
            JoinPointRef::Method(m) => pattern.matches_method(m, self.ctx.repo),
            JoinPointRef::Constructor(c) => pattern.matches_constructor(c, self.ctx.repo),
            // Only the enclosing class is known: a positive declaring-type
            // match narrows, it never decides.
            JoinPointRef::Class(c) => pattern.matches_class(c, self.ctx.repo),
            JoinPointRef::Field(_) | JoinPointRef::StaticInit(_) => Verdict::False,
        }
    }

    fn eval_static_initialization(&mut self, pattern: &TypePattern) -> Verdict {
        if self.ctx.kind != PointcutKind::StaticInitialization {
            return Verdict::False;
        }
        match self.ctx.join_point {
            JoinPointRef::StaticInit(c) | JoinPointRef::Class(c) => {
                Verdict::from_bool(pattern.matches(&c.name))
            }
            _ => Verdict::False,
        }
    }

    fn eval_handler(&mut self, pattern: &TypePattern) -> Result<Verdict, WeftError> {
        if self.ctx.kind != PointcutKind::Handler {
            return Ok(Verdict::False);
        }
        let JoinPointRef::Class(exception) = self.ctx.join_point else {
            return Ok(Verdict::False);
        };

        // The caught instance is always assignable to the static handler
        // type, so a pattern matching that type matches every instance.
        if pattern.matches(&exception.name) {
            return Ok(Verdict::True);
        }

        let Some(exact) = pattern.exact_name() else {
            // A wildcard pattern may still match a narrower runtime instance.
            self.bindings.require(RuntimeCheck::HandlerInstance);
            return Ok(Verdict::Undetermined);
        };

        match self.ctx.repo.assignable(&exact, &exception.name) {
            Assignability::Yes | Assignability::Unknown => {
                self.bindings.require(RuntimeCheck::HandlerInstance);
                Ok(Verdict::Undetermined)
            }
            Assignability::No => Ok(Verdict::False),
        }
    }

    // --- Runtime-binding designators ---

    fn eval_this(&mut self, spec: &TargetSpec) -> Result<Verdict, WeftError> {
        // No enclosing instance inside a static member.
        if self.ctx.within.is_static() {
            return Ok(Verdict::False);
        }
        let (bound_name, type_name) = self.resolve_target_spec(spec)?;
        if let Some(name) = bound_name {
            self.bindings.bind_this(name);
        }
        let subject = self.ctx.within_class_name().to_string();
        Ok(self.instance_verdict(&subject, &type_name, RuntimeCheck::ThisInstanceOf(type_name.clone())))
    }

    fn eval_target(&mut self, spec: &TargetSpec) -> Result<Verdict, WeftError> {
        // A static callee has no receiver instance.
        if self.ctx.join_point.is_static() {
            return Ok(Verdict::False);
        }
        let (bound_name, type_name) = self.resolve_target_spec(spec)?;
        if let Some(name) = bound_name {
            self.bindings.bind_target(name);
        }
        let subject = self.ctx.join_point.declaring_name().to_string();
        Ok(self.instance_verdict(&subject, &type_name, RuntimeCheck::TargetInstanceOf(type_name.clone())))
    }

    /// Resolves the `this(...)`/`target(...)` token: a name bound in the
    /// expression's argument-type table, or a literal type name. Literal
    /// types must be loadable in the active scope.
    fn resolve_target_spec(
        &self,
        spec: &TargetSpec,
    ) -> Result<(Option<String>, String), WeftError> {
        if let Some(type_name) = self.expr.arg_type(&spec.token) {
            return Ok((Some(spec.token.clone()), type_name.to_string()));
        }
        let type_name = spec.token.clone();
        if type_name != OBJECT && !self.ctx.repo.contains(&type_name) {
            return Err(self.reporting().report(
                ErrorKind::UnresolvedType {
                    type_name: type_name.clone(),
                },
                unspanned(),
            ));
        }
        Ok((None, type_name))
    }

    /// Instance-of verdict for a statically known subject type.
    ///
    /// Statically a subtype: `True`. Statically unrelated in a fully loaded
    /// hierarchy: `False`. Subject a supertype of the bound type (the runtime
    /// instance may be narrower), or the hierarchy incomplete: `Undetermined`
    /// with the instance-of check recorded, never a premature `True`.
    fn instance_verdict(
        &mut self,
        subject: &str,
        type_name: &str,
        check: RuntimeCheck,
    ) -> Verdict {
        match self.ctx.repo.assignable(subject, type_name) {
            Assignability::Yes => Verdict::True,
            forward => {
                let reverse = self.ctx.repo.assignable(type_name, subject);
                match (forward, reverse) {
                    (Assignability::No, Assignability::No) => Verdict::False,
                    _ => {
                        self.bindings.require(check);
                        Verdict::Undetermined
                    }
                }
            }
        }
    }

    fn eval_args(&mut self, elements: &[ArgElement]) -> Verdict {
        let param_count = self.ctx.join_point.parameter_count();
        let mut ellipsis_seen = false;
        for (position, element) in elements.iter().enumerate() {
            if matches!(element, ArgElement::Ellipsis) {
                ellipsis_seen = true;
                continue;
            }
            let ArgElement::Entry(token) = element else {
                continue;
            };
            if self.expr.arg_type(token).is_none() {
                continue; // a type name, checked at runtime
            }
            // Positions after a `..` marker count from the end of the
            // advised parameter list.
            let index = if ellipsis_seen {
                param_count.and_then(|count| count.checked_sub(elements.len() - position))
            } else {
                Some(position)
            };
            if let Some(index) = index {
                self.bindings.bind_arg(token.clone(), index);
            }
        }

        // Argument runtime types are never decidable from declaring-type
        // metadata alone (covariance, erasure); always defer.
        self.bindings.require(RuntimeCheck::ArgumentTypes);
        Verdict::Undetermined
    }

    fn eval_annotation(&mut self, scope: AnnotationScope, pattern: &TypePattern) -> Verdict {
        match scope {
            AnnotationScope::Member => {
                if !self.ctx.join_point.is_member()
                    && matches!(
                        self.ctx.kind,
                        PointcutKind::Execution
                            | PointcutKind::Call
                            | PointcutKind::Set
                            | PointcutKind::Get
                    )
                {
                    // Coarse class-only context: the member's annotations are
                    // not known yet.
                    return Verdict::Undetermined;
                }
                Verdict::from_bool(annotations_contain(self.ctx.join_point.annotations(), pattern))
            }
            AnnotationScope::Within => {
                let class_name = self.ctx.within_class_name();
                match self.ctx.repo.lookup(class_name) {
                    Some(class) => {
                        Verdict::from_bool(annotations_contain(&class.annotations, pattern))
                    }
                    None => Verdict::Undetermined,
                }
            }
        }
    }

    // --- References ---

    fn eval_reference(&mut self, name: &str) -> Result<Verdict, WeftError> {
        if self.ref_stack.iter().any(|seen| seen == name) {
            let mut chain = self.ref_stack.clone();
            chain.push(name.to_string());
            return Err(self
                .reporting()
                .report(ErrorKind::CyclicReference { chain }, unspanned()));
        }
        let Some(target) = self.namespace.lookup(name) else {
            return Err(self.reporting().unresolved_reference(
                name,
                self.namespace.name(),
                unspanned(),
            ));
        };

        self.ref_stack.push(name.to_string());
        let verdict = self.eval(target.root());
        self.ref_stack.pop();
        verdict
    }

    fn reporting(&self) -> DefinitionContext {
        DefinitionContext::new(
            SourceContext::from_text(self.expr.namespace(), self.expr.source()),
            "evaluation",
        )
    }
}

fn annotations_contain(annotations: &[AnnotationInfo], pattern: &TypePattern) -> bool {
    annotations.iter().any(|a| pattern.matches(&a.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_truth_table() {
        use Verdict::*;
        assert_eq!(True.and(True), True);
        assert_eq!(True.and(False), False);
        assert_eq!(True.and(Undetermined), Undetermined);
        assert_eq!(False.and(Undetermined), False);
        assert_eq!(Undetermined.and(Undetermined), Undetermined);
        assert_eq!(False.and(False), False);
    }

    #[test]
    fn or_truth_table() {
        use Verdict::*;
        assert_eq!(True.or(False), True);
        assert_eq!(True.or(Undetermined), True);
        assert_eq!(False.or(Undetermined), Undetermined);
        assert_eq!(Undetermined.or(Undetermined), Undetermined);
        assert_eq!(False.or(False), False);
    }

    #[test]
    fn not_truth_table() {
        use Verdict::*;
        assert_eq!(True.not(), False);
        assert_eq!(False.not(), True);
        assert_eq!(Undetermined.not(), Undetermined);
    }
}
