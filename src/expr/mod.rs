//! Pointcut expression AST.
//!
//! A pointcut expression parses once into an immutable [`ExprNode`] tree and
//! is shared from then on; evaluation never mutates it. Boolean structure is
//! explicit (`And`/`Or`/`Not`) and every primitive designator carries its
//! compiled pattern payload directly, so evaluation is a single recursive
//! match with compiler-checked exhaustiveness.

use std::collections::HashMap;

use crate::pattern::{FieldPattern, MemberPattern, TypePattern};

pub mod namespace;
pub mod parser;

pub use namespace::ExpressionNamespace;
pub use parser::parse_expression;

// ============================================================================
// AST
// ============================================================================

/// Where an annotation designator looks: the matched member itself or the
/// lexically enclosing class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationScope {
    Member,
    Within,
}

/// Argument of `this(...)` / `target(...)`: either a name bound to an advice
/// parameter or a plain type name. Which one it is depends on the owning
/// expression's argument-type table and is decided at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub token: String,
}

/// One element of an `args(...)` list. `Entry` tokens are resolved at
/// evaluation time: a token naming an advice parameter binds that parameter
/// to the advised argument position; anything else is a type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgElement {
    /// `..`: any remaining arguments.
    Ellipsis,
    /// `*`: exactly one argument of any type.
    Any,
    Entry(String),
}

/// The pointcut expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    And(Box<ExprNode>, Box<ExprNode>),
    Or(Box<ExprNode>, Box<ExprNode>),
    Not(Box<ExprNode>),

    Execution(MemberPattern),
    Call(MemberPattern),
    Get(FieldPattern),
    Set(FieldPattern),
    Within(TypePattern),
    WithinCode(MemberPattern),
    Handler(TypePattern),
    StaticInitialization(TypePattern),

    Cflow(Box<ExprNode>),
    CflowBelow(Box<ExprNode>),

    This(TargetSpec),
    Target(TargetSpec),
    Args(Vec<ArgElement>),
    AnnotationMatch {
        scope: AnnotationScope,
        pattern: TypePattern,
    },

    /// Named pointcut reference, resolved through the namespace.
    Reference(String),
}

impl ExprNode {
    /// Renders the tree back to expression syntax, for diagnostics.
    pub fn pretty(&self) -> String {
        match self {
            ExprNode::And(l, r) => format!("({} && {})", l.pretty(), r.pretty()),
            ExprNode::Or(l, r) => format!("({} || {})", l.pretty(), r.pretty()),
            ExprNode::Not(e) => format!("!{}", e.pretty()),
            ExprNode::Execution(p) => format!("execution({})", p.source()),
            ExprNode::Call(p) => format!("call({})", p.source()),
            ExprNode::Get(p) => format!("get({})", p.source()),
            ExprNode::Set(p) => format!("set({})", p.source()),
            ExprNode::Within(p) => format!("within({})", p.source()),
            ExprNode::WithinCode(p) => format!("withincode({})", p.source()),
            ExprNode::Handler(p) => format!("handler({})", p.source()),
            ExprNode::StaticInitialization(p) => {
                format!("staticinitialization({})", p.source())
            }
            ExprNode::Cflow(e) => format!("cflow({})", e.pretty()),
            ExprNode::CflowBelow(e) => format!("cflowbelow({})", e.pretty()),
            ExprNode::This(t) => format!("this({})", t.token),
            ExprNode::Target(t) => format!("target({})", t.token),
            ExprNode::Args(elements) => {
                let inner = elements
                    .iter()
                    .map(|e| match e {
                        ArgElement::Ellipsis => "..".to_string(),
                        ArgElement::Any => "*".to_string(),
                        ArgElement::Entry(token) => token.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("args({})", inner)
            }
            ExprNode::AnnotationMatch { scope, pattern } => match scope {
                AnnotationScope::Member => format!("@annotation({})", pattern.source()),
                AnnotationScope::Within => format!("@within({})", pattern.source()),
            },
            ExprNode::Reference(name) => name.clone(),
        }
    }
}

// ============================================================================
// COMPILED EXPRESSION
// ============================================================================

/// A compiled pointcut expression: source text, owning namespace, parsed
/// tree, and the advice argument-type table (advice parameter name →
/// qualified type name) installed when the expression is compiled on behalf
/// of an advice definition. Immutable once built, shared via `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionInfo {
    source: String,
    namespace: String,
    root: ExprNode,
    arg_types: HashMap<String, String>,
}

impl ExpressionInfo {
    /// Parses expression text. Fails with a definition error on malformed
    /// syntax; never defers a syntax failure to match time.
    pub fn compile(
        text: &str,
        namespace: impl Into<String>,
    ) -> Result<Self, crate::errors::WeftError> {
        let namespace = namespace.into();
        let root = parse_expression(text, &namespace)?;
        Ok(Self {
            source: text.to_string(),
            namespace,
            root,
            arg_types: HashMap::new(),
        })
    }

    /// Installs the advice argument-type table (parameter name → type name).
    pub fn with_arg_types(mut self, arg_types: HashMap<String, String>) -> Self {
        self.arg_types = arg_types;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn root(&self) -> &ExprNode {
        &self.root
    }

    /// Resolves a bound name to its declared advice-parameter type.
    pub fn arg_type(&self, name: &str) -> Option<&str> {
        self.arg_types.get(name).map(String::as_str)
    }

    pub fn arg_types(&self) -> &HashMap<String, String> {
        &self.arg_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_is_idempotent() {
        let a = ExpressionInfo::compile("execution(* foo.Bar.run(..))", "tests").unwrap();
        let b = ExpressionInfo::compile("execution(* foo.Bar.run(..))", "tests").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pretty_round_trips_structure() {
        let info = ExpressionInfo::compile(
            "execution(* foo.Bar.run(..)) && !within(foo.tests..*)",
            "tests",
        )
        .unwrap();
        let rendered = info.root().pretty();
        assert!(rendered.contains("execution(* foo.Bar.run(..))"));
        assert!(rendered.contains("!within(foo.tests..*)"));
    }
}
