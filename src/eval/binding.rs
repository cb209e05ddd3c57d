//! Binding bookkeeping produced by one evaluation.
//!
//! Every `evaluate` call returns a fresh `BindingResult`; nothing is reused
//! across advice candidates, so one candidate's bindings can never leak into
//! another's.

use im::HashMap;

/// A residual check that must be compiled into the dispatch site because the
/// static metadata could not decide the predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCheck {
    /// `this(...)` needs an instance-of test against the named type.
    ThisInstanceOf(String),
    /// `target(...)` needs an instance-of test against the named type.
    TargetInstanceOf(String),
    /// `cflow`/`cflowbelow` needs the thread's active join-point stack.
    ControlFlow,
    /// `args(...)` needs the actual argument runtime types.
    ArgumentTypes,
    /// `handler(...)` needs the caught exception instance.
    HandlerInstance,
}

/// Output of one evaluation: the expression-variable bindings and the
/// residual runtime checks the resolver must attach to the advice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingResult {
    arg_indices: HashMap<String, usize>,
    this_binding: Option<String>,
    target_binding: Option<String>,
    runtime_checks: Vec<RuntimeCheck>,
}

impl BindingResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps an expression variable to a position in the advised member's own
    /// parameter list (not the advice's).
    pub fn bind_arg(&mut self, name: impl Into<String>, index: usize) {
        self.arg_indices.insert(name.into(), index);
    }

    pub fn bind_this(&mut self, name: impl Into<String>) {
        self.this_binding = Some(name.into());
    }

    pub fn bind_target(&mut self, name: impl Into<String>) {
        self.target_binding = Some(name.into());
    }

    pub fn require(&mut self, check: RuntimeCheck) {
        if !self.runtime_checks.contains(&check) {
            self.runtime_checks.push(check);
        }
    }

    pub fn arg_index(&self, name: &str) -> Option<usize> {
        self.arg_indices.get(name).copied()
    }

    pub fn arg_indices(&self) -> &HashMap<String, usize> {
        &self.arg_indices
    }

    pub fn this_binding(&self) -> Option<&str> {
        self.this_binding.as_deref()
    }

    pub fn target_binding(&self) -> Option<&str> {
        self.target_binding.as_deref()
    }

    pub fn runtime_checks(&self) -> &[RuntimeCheck] {
        &self.runtime_checks
    }

    /// True iff dispatch must be guarded at runtime.
    pub fn requires_runtime_guard(&self) -> bool {
        !self.runtime_checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_accumulate() {
        let mut b = BindingResult::new();
        b.bind_arg("x", 0);
        b.bind_this("me");
        b.require(RuntimeCheck::ControlFlow);
        b.require(RuntimeCheck::ControlFlow);
        assert_eq!(b.arg_index("x"), Some(0));
        assert_eq!(b.this_binding(), Some("me"));
        assert_eq!(b.runtime_checks().len(), 1);
        assert!(b.requires_runtime_guard());
    }

    #[test]
    fn fresh_results_are_unguarded() {
        let b = BindingResult::new();
        assert!(!b.requires_runtime_guard());
        assert_eq!(b.arg_index("x"), None);
    }
}
