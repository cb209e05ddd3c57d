//! Pointcut expression parser.
//!
//! Converts pointcut expression text into [`ExprNode`] trees. This parser is
//! purely syntactic: designator argument text is compiled by the pattern
//! module, and names are not resolved here. Every failure is a definition
//! error carrying the expression text and a span; nothing is deferred to
//! match time.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::errors::{
    to_source_span, unspanned, DefinitionContext, ErrorKind, ErrorReporting, SourceContext,
    WeftError,
};
use crate::expr::{AnnotationScope, ArgElement, ExprNode, TargetSpec};
use crate::pattern::{FieldPattern, MemberPattern, TypePattern};

#[derive(Parser)]
#[grammar = "expr/grammar.pest"]
struct PointcutParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses pointcut expression text into an AST.
///
/// The namespace name is only used to label diagnostics; reference resolution
/// happens at evaluation time through the owning namespace.
pub fn parse_expression(text: &str, namespace: &str) -> Result<ExprNode, WeftError> {
    let ctx = DefinitionContext::new(SourceContext::from_text(namespace, text), "expression");

    if text.trim().is_empty() {
        return Err(ctx.report(ErrorKind::EmptyExpression, unspanned()));
    }

    let mut pairs = PointcutParser::parse(Rule::expression, text)
        .map_err(|e| convert_parse_error(e, &ctx))?;

    let expression = pairs.next().unwrap(); // pest guarantees the expression rule
    let or_expr = expression
        .into_inner()
        .find(|p| p.as_rule() == Rule::or_expr)
        .unwrap(); // grammar guarantees one operand chain

    build_or_expr(or_expr, &ctx)
}

// ============================================================================
// AST BUILDERS
// ============================================================================

fn build_or_expr(pair: Pair<Rule>, ctx: &DefinitionContext) -> Result<ExprNode, WeftError> {
    let mut node: Option<ExprNode> = None;
    for operand in pair.into_inner() {
        if operand.as_rule() != Rule::and_expr {
            continue; // operator token
        }
        let rhs = build_and_expr(operand, ctx)?;
        node = Some(match node.take() {
            None => rhs,
            Some(lhs) => ExprNode::Or(Box::new(lhs), Box::new(rhs)),
        });
    }
    Ok(node.unwrap()) // grammar guarantees at least one operand
}

fn build_and_expr(pair: Pair<Rule>, ctx: &DefinitionContext) -> Result<ExprNode, WeftError> {
    let mut node: Option<ExprNode> = None;
    for operand in pair.into_inner() {
        if operand.as_rule() != Rule::not_expr {
            continue;
        }
        let rhs = build_not_expr(operand, ctx)?;
        node = Some(match node.take() {
            None => rhs,
            Some(lhs) => ExprNode::And(Box::new(lhs), Box::new(rhs)),
        });
    }
    Ok(node.unwrap())
}

fn build_not_expr(pair: Pair<Rule>, ctx: &DefinitionContext) -> Result<ExprNode, WeftError> {
    let mut inner = pair.into_inner();
    let first = inner.next().unwrap(); // grammar guarantees inner exists
    match first.as_rule() {
        Rule::not_op => {
            let operand = build_not_expr(inner.next().unwrap(), ctx)?;
            Ok(ExprNode::Not(Box::new(operand)))
        }
        Rule::primary => build_primary(first, ctx),
        _ => unreachable!("not_expr contains not_op or primary"),
    }
}

fn build_primary(pair: Pair<Rule>, ctx: &DefinitionContext) -> Result<ExprNode, WeftError> {
    let inner = pair.into_inner().next().unwrap(); // grammar guarantees inner exists
    match inner.as_rule() {
        Rule::or_expr => build_or_expr(inner, ctx),
        Rule::designator => build_designator(inner, ctx),
        Rule::reference => Ok(ExprNode::Reference(inner.as_str().to_string())),
        _ => unreachable!("primary contains or_expr, designator, or reference"),
    }
}

fn build_designator(pair: Pair<Rule>, ctx: &DefinitionContext) -> Result<ExprNode, WeftError> {
    let mut inner = pair.into_inner();
    let name_pair = inner.next().unwrap(); // grammar guarantees the name
    let name_span = to_source_span(name_pair.as_span().start()..name_pair.as_span().end());
    let name = name_pair.as_str().to_string();

    let arg_pair = inner.next().unwrap(); // arg_text, possibly empty
    let arg_span = to_source_span(arg_pair.as_span().start()..arg_pair.as_span().end());
    let arg = arg_pair.as_str().to_string();

    match name.as_str() {
        "execution" => Ok(ExprNode::Execution(member_pattern(&arg, arg_span, ctx)?)),
        "call" => Ok(ExprNode::Call(member_pattern(&arg, arg_span, ctx)?)),
        "set" => Ok(ExprNode::Set(field_pattern(&arg, arg_span, ctx)?)),
        "get" => Ok(ExprNode::Get(field_pattern(&arg, arg_span, ctx)?)),
        "within" => Ok(ExprNode::Within(type_pattern(&arg, arg_span, ctx)?)),
        "withincode" => Ok(ExprNode::WithinCode(member_pattern(&arg, arg_span, ctx)?)),
        "handler" => Ok(ExprNode::Handler(type_pattern(&arg, arg_span, ctx)?)),
        "staticinitialization" => Ok(ExprNode::StaticInitialization(type_pattern(
            &arg, arg_span, ctx,
        )?)),
        "cflow" => Ok(ExprNode::Cflow(Box::new(parse_expression(
            &arg,
            &ctx.source.name,
        )?))),
        "cflowbelow" => Ok(ExprNode::CflowBelow(Box::new(parse_expression(
            &arg,
            &ctx.source.name,
        )?))),
        "this" => Ok(ExprNode::This(target_spec(&arg, arg_span, ctx)?)),
        "target" => Ok(ExprNode::Target(target_spec(&arg, arg_span, ctx)?)),
        "args" => Ok(ExprNode::Args(parse_args(&arg, arg_span, ctx)?)),
        "@annotation" => Ok(ExprNode::AnnotationMatch {
            scope: AnnotationScope::Member,
            pattern: type_pattern(&arg, arg_span, ctx)?,
        }),
        "@within" => Ok(ExprNode::AnnotationMatch {
            scope: AnnotationScope::Within,
            pattern: type_pattern(&arg, arg_span, ctx)?,
        }),
        other => Err(ctx.unknown_designator(other, name_span)),
    }
}

// ============================================================================
// DESIGNATOR ARGUMENT SUB-PARSERS
// ============================================================================

fn member_pattern(
    arg: &str,
    span: miette::SourceSpan,
    ctx: &DefinitionContext,
) -> Result<MemberPattern, WeftError> {
    MemberPattern::compile(arg).map_err(|e| ctx.malformed_member_pattern(arg, &e.to_string(), span))
}

fn field_pattern(
    arg: &str,
    span: miette::SourceSpan,
    ctx: &DefinitionContext,
) -> Result<FieldPattern, WeftError> {
    FieldPattern::compile(arg).map_err(|e| ctx.malformed_member_pattern(arg, &e.to_string(), span))
}

fn type_pattern(
    arg: &str,
    span: miette::SourceSpan,
    ctx: &DefinitionContext,
) -> Result<TypePattern, WeftError> {
    TypePattern::compile(arg.trim())
        .map_err(|e| ctx.malformed_type_pattern(arg, &e.to_string(), span))
}

fn target_spec(
    arg: &str,
    span: miette::SourceSpan,
    ctx: &DefinitionContext,
) -> Result<TargetSpec, WeftError> {
    let token = arg.trim();
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(ctx.report(
            ErrorKind::ExpressionSyntax {
                detail: format!("expected a single binding name or type, found '{}'", arg),
            },
            span,
        ));
    }
    Ok(TargetSpec {
        token: token.to_string(),
    })
}

fn parse_args(
    arg: &str,
    span: miette::SourceSpan,
    ctx: &DefinitionContext,
) -> Result<Vec<ArgElement>, WeftError> {
    let text = arg.trim();
    if text.is_empty() {
        return Ok(vec![]);
    }
    let mut elements = vec![];
    let mut seen_ellipsis = false;
    for entry in text.split(',') {
        let entry = entry.trim();
        if entry.is_empty() || entry.chars().any(char::is_whitespace) {
            return Err(ctx.report(
                ErrorKind::ExpressionSyntax {
                    detail: format!("malformed args() entry in '{}'", arg),
                },
                span,
            ));
        }
        match entry {
            ".." => {
                if seen_ellipsis {
                    return Err(ctx.report(
                        ErrorKind::ExpressionSyntax {
                            detail: "more than one '..' in args()".to_string(),
                        },
                        span,
                    ));
                }
                seen_ellipsis = true;
                elements.push(ArgElement::Ellipsis);
            }
            "*" => elements.push(ArgElement::Any),
            _ => elements.push(ArgElement::Entry(entry.to_string())),
        }
    }
    Ok(elements)
}

fn convert_parse_error(error: pest::error::Error<Rule>, ctx: &DefinitionContext) -> WeftError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => to_source_span(pos..pos + 1),
        pest::error::InputLocation::Span((start, end)) => to_source_span(start..end),
    };
    ctx.report(
        ErrorKind::ExpressionSyntax {
            detail: error.variant.message().to_string(),
        },
        span,
    )
}
