//! Weft Error Handling - Unified Encapsulated API
//!
//! Every definition-time failure in the weaving core (pattern syntax,
//! expression syntax, reference resolution, advice binding, document loading)
//! is reported through the single `WeftError` type defined here.

use miette::{Diagnostic, SourceSpan};
use miette::{LabeledSpan, NamedSource};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Source context for error reporting. Carries the text being compiled
/// (a pattern, an expression, a definition document) and a display name
/// identifying where it came from.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real definition text.
    /// This is the preferred method for error reporting.
    pub fn from_text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a fallback when real definition text is unavailable.
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("// {}", context),
        }
    }

    /// Convert to NamedSource for use with miette error reporting.
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("default context")
    }
}

/// The single error type - no wrapper, no variants, just essential data.
#[derive(Debug)]
pub struct WeftError {
    /// What went wrong (type-specific data)
    pub kind: ErrorKind,
    /// Where it happened (context-specific source information)
    pub source_info: SourceInfo,
    /// How to help (auto-populated based on context)
    pub diagnostic_info: DiagnosticInfo,
}

/// All error types as a clean enum - no duplicate fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // Pattern errors - malformed designator text
    MalformedTypePattern {
        pattern: String,
        reason: String,
    },
    MalformedMemberPattern {
        pattern: String,
        reason: String,
    },
    MalformedModifier {
        token: String,
    },

    // Expression errors - pointcut grammar failures
    EmptyExpression,
    ExpressionSyntax {
        detail: String,
    },
    UnknownDesignator {
        designator: String,
    },

    // Reference errors
    UnresolvedReference {
        name: String,
        namespace: String,
    },
    CyclicReference {
        chain: Vec<String>,
    },
    UnresolvedType {
        type_name: String,
    },

    // Binding errors - advice parameters that cannot be mapped
    UnboundParameter {
        aspect: String,
        advice: String,
        parameter: String,
        position: usize,
    },
    MalformedSignature {
        signature: String,
        reason: String,
    },

    // Definition-document errors
    InvalidDocument {
        detail: String,
    },
    DuplicateAspect {
        aspect: String,
    },
    DuplicatePointcut {
        pointcut: String,
        aspect: String,
    },
}

/// Context-specific source information.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Diagnostic enhancement data.
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// Context-aware error creation - each compilation phase knows how to create
/// appropriate errors.
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements.
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> WeftError;

    /// Convenience methods for common error types.
    fn malformed_type_pattern(&self, pattern: &str, reason: &str, span: SourceSpan) -> WeftError {
        self.report(
            ErrorKind::MalformedTypePattern {
                pattern: pattern.into(),
                reason: reason.into(),
            },
            span,
        )
    }

    fn malformed_member_pattern(&self, pattern: &str, reason: &str, span: SourceSpan) -> WeftError {
        self.report(
            ErrorKind::MalformedMemberPattern {
                pattern: pattern.into(),
                reason: reason.into(),
            },
            span,
        )
    }

    fn unknown_designator(&self, designator: &str, span: SourceSpan) -> WeftError {
        self.report(
            ErrorKind::UnknownDesignator {
                designator: designator.into(),
            },
            span,
        )
    }

    fn unresolved_reference(&self, name: &str, namespace: &str, span: SourceSpan) -> WeftError {
        self.report(
            ErrorKind::UnresolvedReference {
                name: name.into(),
                namespace: namespace.into(),
            },
            span,
        )
    }

    fn unbound_parameter(
        &self,
        aspect: &str,
        advice: &str,
        parameter: &str,
        position: usize,
    ) -> WeftError {
        self.report(
            ErrorKind::UnboundParameter {
                aspect: aspect.into(),
                advice: advice.into(),
                parameter: parameter.into(),
                position,
            },
            unspanned(),
        )
    }
}

impl ErrorKind {
    /// Get the error category for test assertions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedTypePattern { .. }
            | Self::MalformedMemberPattern { .. }
            | Self::MalformedModifier { .. } => ErrorCategory::Pattern,

            Self::EmptyExpression
            | Self::ExpressionSyntax { .. }
            | Self::UnknownDesignator { .. } => ErrorCategory::Expression,

            Self::UnresolvedReference { .. }
            | Self::CyclicReference { .. }
            | Self::UnresolvedType { .. } => ErrorCategory::Reference,

            Self::UnboundParameter { .. } | Self::MalformedSignature { .. } => {
                ErrorCategory::Binding
            }

            Self::InvalidDocument { .. }
            | Self::DuplicateAspect { .. }
            | Self::DuplicatePointcut { .. } => ErrorCategory::Definition,
        }
    }

    /// Get error code suffix for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MalformedTypePattern { .. } => "malformed_type_pattern",
            Self::MalformedMemberPattern { .. } => "malformed_member_pattern",
            Self::MalformedModifier { .. } => "malformed_modifier",
            Self::EmptyExpression => "empty_expression",
            Self::ExpressionSyntax { .. } => "expression_syntax",
            Self::UnknownDesignator { .. } => "unknown_designator",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::CyclicReference { .. } => "cyclic_reference",
            Self::UnresolvedType { .. } => "unresolved_type",
            Self::UnboundParameter { .. } => "unbound_parameter",
            Self::MalformedSignature { .. } => "malformed_signature",
            Self::InvalidDocument { .. } => "invalid_document",
            Self::DuplicateAspect { .. } => "duplicate_aspect",
            Self::DuplicatePointcut { .. } => "duplicate_pointcut",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Pattern,
    Expression,
    Reference,
    Binding,
    Definition,
}

impl std::error::Error for WeftError {}

impl fmt::Display for WeftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::MalformedTypePattern { pattern, reason } => {
                write!(
                    f,
                    "Pattern error: malformed type pattern '{}': {}",
                    pattern, reason
                )
            }
            ErrorKind::MalformedMemberPattern { pattern, reason } => {
                write!(
                    f,
                    "Pattern error: malformed member pattern '{}': {}",
                    pattern, reason
                )
            }
            ErrorKind::MalformedModifier { token } => {
                write!(f, "Pattern error: unknown modifier token '{}'", token)
            }
            ErrorKind::EmptyExpression => {
                write!(f, "Expression error: empty pointcut expression")
            }
            ErrorKind::ExpressionSyntax { detail } => {
                write!(f, "Expression error: {}", detail)
            }
            ErrorKind::UnknownDesignator { designator } => {
                write!(f, "Expression error: unknown designator '{}'", designator)
            }
            ErrorKind::UnresolvedReference { name, namespace } => {
                write!(
                    f,
                    "Reference error: no pointcut named '{}' in namespace '{}'",
                    name, namespace
                )
            }
            ErrorKind::CyclicReference { chain } => {
                write!(
                    f,
                    "Reference error: cyclic pointcut reference: {}",
                    chain.join(" -> ")
                )
            }
            ErrorKind::UnresolvedType { type_name } => {
                write!(f, "Reference error: type '{}' cannot be resolved", type_name)
            }
            ErrorKind::UnboundParameter {
                aspect,
                advice,
                parameter,
                position,
            } => {
                write!(
                    f,
                    "Binding error: parameter '{}' (position {}) of advice '{}' in aspect '{}' cannot be bound",
                    parameter, position, advice, aspect
                )
            }
            ErrorKind::MalformedSignature { signature, reason } => {
                write!(
                    f,
                    "Binding error: malformed advice signature '{}': {}",
                    signature, reason
                )
            }
            ErrorKind::InvalidDocument { detail } => {
                write!(f, "Definition error: invalid document: {}", detail)
            }
            ErrorKind::DuplicateAspect { aspect } => {
                write!(f, "Definition error: duplicate aspect '{}'", aspect)
            }
            ErrorKind::DuplicatePointcut { pointcut, aspect } => {
                write!(
                    f,
                    "Definition error: duplicate pointcut '{}' in aspect '{}'",
                    pointcut, aspect
                )
            }
        }
    }
}

impl Diagnostic for WeftError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl WeftError {
    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::MalformedTypePattern { .. } => "malformed type pattern".into(),
            ErrorKind::MalformedMemberPattern { .. } => "malformed member pattern".into(),
            ErrorKind::MalformedModifier { .. } => "unknown modifier".into(),
            ErrorKind::EmptyExpression => "empty expression".into(),
            ErrorKind::ExpressionSyntax { .. } => "syntax error".into(),
            ErrorKind::UnknownDesignator { .. } => "unknown designator".into(),
            ErrorKind::UnresolvedReference { .. } => "unresolved pointcut reference".into(),
            ErrorKind::CyclicReference { .. } => "cyclic reference".into(),
            ErrorKind::UnresolvedType { .. } => "unresolved type".into(),
            ErrorKind::UnboundParameter { .. } => "unbindable parameter".into(),
            ErrorKind::MalformedSignature { .. } => "malformed signature".into(),
            ErrorKind::InvalidDocument { .. } => "invalid document".into(),
            ErrorKind::DuplicateAspect { .. } => "duplicate aspect".into(),
            ErrorKind::DuplicatePointcut { .. } => "duplicate pointcut".into(),
        }
    }
}

/// Creates a placeholder span for errors not tied to a specific location in
/// the definition text, such as binding errors computed from compiled data.
/// This makes the intent of using an empty span explicit and searchable.
pub fn unspanned() -> miette::SourceSpan {
    miette::SourceSpan::from(0..0)
}

/// Converts a byte range within definition text to a miette SourceSpan.
pub fn to_source_span(range: std::ops::Range<usize>) -> miette::SourceSpan {
    miette::SourceSpan::from(range)
}

/// General-purpose error creation context used throughout the codebase
/// for creating properly contextualized WeftError instances.
pub struct DefinitionContext {
    pub source: SourceContext,
    pub phase: String,
}

impl DefinitionContext {
    pub fn new(source: SourceContext, phase: impl Into<String>) -> Self {
        Self {
            source,
            phase: phase.into(),
        }
    }
}

impl ErrorReporting for DefinitionContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> WeftError {
        let error_code = format!("weft::{}::{}", self.phase, kind.code_suffix());

        WeftError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a WeftError with full miette diagnostics.
///
/// This provides rich error formatting with source spans, suggestions, and
/// context. Use this for user-facing error display in host tooling.
pub fn print_error(error: WeftError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_text() {
        let ctx = DefinitionContext::new(SourceContext::from_text("aspect", "a...b"), "pattern");
        let err = ctx.malformed_type_pattern("a...b", "empty segment", unspanned());
        let rendered = err.to_string();
        assert!(rendered.contains("a...b"));
        assert!(rendered.contains("empty segment"));
        assert_eq!(err.kind.category(), ErrorCategory::Pattern);
    }

    #[test]
    fn error_codes_carry_phase_and_kind() {
        let ctx = DefinitionContext::new(SourceContext::fallback("x"), "expression");
        let err = ctx.report(ErrorKind::EmptyExpression, unspanned());
        assert_eq!(
            err.diagnostic_info.error_code,
            "weft::expression::empty_expression"
        );
    }

    #[test]
    fn cyclic_reference_reports_the_chain() {
        let ctx = DefinitionContext::new(SourceContext::fallback("x"), "evaluation");
        let err = ctx.report(
            ErrorKind::CyclicReference {
                chain: vec!["a".into(), "b".into(), "a".into()],
            },
            unspanned(),
        );
        assert!(err.to_string().contains("a -> b -> a"));
    }
}
