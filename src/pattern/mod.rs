//! Pattern compiler for textual join-point designators.
//!
//! Compiles the textual forms inside pointcut designators (type patterns with
//! segment wildcards, member patterns with modifier and annotation filters)
//! into immutable, matchable pattern objects. Compilation is pure: the same
//! source text always compiles to an equal pattern, and every malformed
//! pattern fails here at definition time, never during matching.

use thiserror::Error;

pub mod member;
pub mod modifiers;
pub mod type_pattern;

pub use member::{ConstructorPattern, FieldPattern, MemberPattern, MethodPattern, ParamPattern};
pub use modifiers::ModifierPattern;
pub use type_pattern::{NamePattern, TypePattern};

/// Low-level pattern syntax failure. Callers that own a reporting context
/// convert this into a `WeftError` carrying the literal pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternSyntax {
    #[error("empty segment between dots")]
    EmptySegment,
    #[error("three or more consecutive dots")]
    RunOfDots,
    #[error("adjacent '..' wildcards")]
    AdjacentEllipses,
    #[error("trailing '.'")]
    TrailingDot,
    #[error("empty pattern")]
    Empty,
    #[error("unknown modifier token '{0}'")]
    UnknownModifier(String),
    #[error("missing '(' in member pattern")]
    MissingParameterList,
    #[error("unterminated parameter list")]
    UnterminatedParameterList,
    #[error("empty parameter entry")]
    EmptyParameter,
    #[error("more than one '..' in parameter list")]
    MultipleEllipses,
    #[error("missing member name")]
    MissingName,
    #[error("missing type in pattern")]
    MissingType,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
}
