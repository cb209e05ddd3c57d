//! Method, constructor, and field patterns.
//!
//! A member pattern pairs a declaring-type pattern with a name pattern, a
//! modifier filter, optional annotation filters, and (for methods and
//! constructors) a positional parameter-type pattern list with at most one
//! `..` "any remaining parameters" marker.
//!
//! Declaring-type matching for execution/call predicates consults the
//! supertype hierarchy through the repository so that inherited members
//! match; a hierarchy the repository cannot fully resolve yields
//! `Undetermined` instead of a guess.

use crate::eval::Verdict;
use crate::meta::{
    AnnotationInfo, ClassInfo, ConstructorInfo, FieldInfo, MetadataRepository, MethodInfo, OBJECT,
};
use crate::pattern::modifiers::{modifier_token, ModifierPattern};
use crate::pattern::type_pattern::{NamePattern, TypePattern};
use crate::pattern::PatternSyntax;

// ============================================================================
// PARAMETER PATTERNS
// ============================================================================

/// One entry of a parameter-type pattern list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamPattern {
    /// `*`: exactly one parameter of any type.
    Any,
    /// `..`: zero or more parameters, permitted at one position.
    Ellipsis,
    Type(TypePattern),
}

/// Positional parameter matching with `..` expansion.
pub fn params_match(patterns: &[ParamPattern], parameters: &[String]) -> bool {
    let Some((first, rest)) = patterns.split_first() else {
        return parameters.is_empty();
    };
    match first {
        ParamPattern::Ellipsis => {
            (0..=parameters.len()).any(|skip| params_match(rest, &parameters[skip..]))
        }
        ParamPattern::Any => {
            !parameters.is_empty() && params_match(rest, &parameters[1..])
        }
        ParamPattern::Type(pattern) => {
            let Some((head, tail)) = parameters.split_first() else {
                return false;
            };
            pattern.matches(head) && params_match(rest, tail)
        }
    }
}

fn parse_params(text: &str) -> Result<Vec<ParamPattern>, PatternSyntax> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(vec![]);
    }
    let mut patterns = vec![];
    let mut seen_ellipsis = false;
    for entry in text.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(PatternSyntax::EmptyParameter);
        }
        match entry {
            ".." => {
                if seen_ellipsis {
                    return Err(PatternSyntax::MultipleEllipses);
                }
                seen_ellipsis = true;
                patterns.push(ParamPattern::Ellipsis);
            }
            "*" => patterns.push(ParamPattern::Any),
            _ => patterns.push(ParamPattern::Type(TypePattern::compile(entry)?)),
        }
    }
    Ok(patterns)
}

// ============================================================================
// DECLARING-TYPE MATCHING
// ============================================================================

/// Matches a declaring-type pattern against a class, walking supertypes so
/// that members inherited from a matching ancestor are found.
pub fn declaring_matches(
    pattern: &TypePattern,
    declaring: &str,
    repo: &MetadataRepository,
) -> Verdict {
    if pattern.matches(declaring) {
        return Verdict::True;
    }
    // The root is implicit in every hierarchy.
    if pattern.matches(OBJECT) {
        return Verdict::True;
    }

    let Some(class) = repo.lookup(declaring) else {
        // The declaring class is not loaded; supertypes cannot be consulted.
        return Verdict::Undetermined;
    };
    let (hierarchy, complete) = repo.hierarchy_of(class);
    if hierarchy.iter().any(|c| pattern.matches(&c.name)) {
        return Verdict::True;
    }
    if complete {
        Verdict::False
    } else {
        Verdict::Undetermined
    }
}

fn annotations_match(patterns: &[TypePattern], annotations: &[AnnotationInfo]) -> bool {
    patterns
        .iter()
        .all(|p| annotations.iter().any(|a| p.matches(&a.name)))
}

// ============================================================================
// METHOD / CONSTRUCTOR PATTERNS
// ============================================================================

/// Compiled method designator: `[@Anno] [modifiers] ret-type decl.name(params)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPattern {
    source: String,
    pub annotations: Vec<TypePattern>,
    pub modifiers: ModifierPattern,
    pub return_type: TypePattern,
    pub declaring: TypePattern,
    pub name: NamePattern,
    pub params: Vec<ParamPattern>,
}

/// Compiled constructor designator: `[@Anno] [modifiers] decl.new(params)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorPattern {
    source: String,
    pub annotations: Vec<TypePattern>,
    pub modifiers: ModifierPattern,
    pub declaring: TypePattern,
    pub params: Vec<ParamPattern>,
}

/// Either callable pattern; `execution`/`call`/`withincode` accept both, with
/// the `Type.new(...)` form selecting constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberPattern {
    Method(MethodPattern),
    Constructor(ConstructorPattern),
}

impl MethodPattern {
    pub fn compile(text: &str) -> Result<Self, PatternSyntax> {
        match MemberPattern::compile(text)? {
            MemberPattern::Method(p) => Ok(p),
            MemberPattern::Constructor(_) => {
                Err(PatternSyntax::UnexpectedToken("new".to_string()))
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches_method(&self, method: &MethodInfo, repo: &MetadataRepository) -> Verdict {
        if !self.name.matches(&method.name) {
            return Verdict::False;
        }
        if !self.modifiers.matches(method.modifiers) {
            return Verdict::False;
        }
        if !self.return_type.matches(&method.return_type) {
            return Verdict::False;
        }
        if !params_match(&self.params, &method.parameters) {
            return Verdict::False;
        }
        if !annotations_match(&self.annotations, &method.annotations) {
            return Verdict::False;
        }
        declaring_matches(&self.declaring, &method.declaring, repo)
    }

    /// Early/coarse check against a class only: a positive declaring-type
    /// match is `Undetermined` (name/params/modifiers not yet checked), a
    /// negative one conclusively excludes the class.
    pub fn matches_class(&self, class: &ClassInfo, repo: &MetadataRepository) -> Verdict {
        match declaring_matches(&self.declaring, &class.name, repo) {
            Verdict::False => Verdict::False,
            _ => Verdict::Undetermined,
        }
    }
}

impl ConstructorPattern {
    pub fn compile(text: &str) -> Result<Self, PatternSyntax> {
        match MemberPattern::compile(text)? {
            MemberPattern::Constructor(p) => Ok(p),
            MemberPattern::Method(_) => Err(PatternSyntax::MissingType),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches_constructor(
        &self,
        constructor: &ConstructorInfo,
        repo: &MetadataRepository,
    ) -> Verdict {
        if !self.modifiers.matches(constructor.modifiers) {
            return Verdict::False;
        }
        if !params_match(&self.params, &constructor.parameters) {
            return Verdict::False;
        }
        if !annotations_match(&self.annotations, &constructor.annotations) {
            return Verdict::False;
        }
        declaring_matches(&self.declaring, &constructor.declaring, repo)
    }

    pub fn matches_class(&self, class: &ClassInfo, repo: &MetadataRepository) -> Verdict {
        match declaring_matches(&self.declaring, &class.name, repo) {
            Verdict::False => Verdict::False,
            _ => Verdict::Undetermined,
        }
    }
}

impl MemberPattern {
    pub fn compile(text: &str) -> Result<Self, PatternSyntax> {
        let text = text.trim();
        let Some(open) = text.find('(') else {
            return Err(PatternSyntax::MissingParameterList);
        };
        if !text.ends_with(')') {
            return Err(PatternSyntax::UnterminatedParameterList);
        }
        let head = &text[..open];
        let params = parse_params(&text[open + 1..text.len() - 1])?;

        let mut tokens: Vec<&str> = head.split_whitespace().collect();
        let annotations = take_annotations(&mut tokens)?;
        let modifiers = take_modifiers(&mut tokens)?;

        match tokens.as_slice() {
            [callable] => {
                let (declaring, name) = split_declaring_and_name(callable)?;
                if name != "new" {
                    // A method pattern needs a return-type token.
                    return Err(PatternSyntax::MissingType);
                }
                Ok(MemberPattern::Constructor(ConstructorPattern {
                    source: text.to_string(),
                    annotations,
                    modifiers,
                    declaring,
                    params,
                }))
            }
            [return_type, callable] => {
                let (declaring, name) = split_declaring_and_name(callable)?;
                if name == "new" {
                    return Err(PatternSyntax::UnexpectedToken(return_type.to_string()));
                }
                Ok(MemberPattern::Method(MethodPattern {
                    source: text.to_string(),
                    annotations,
                    modifiers,
                    return_type: TypePattern::compile(return_type)?,
                    declaring,
                    name: NamePattern::compile(name)?,
                    params,
                }))
            }
            [] => Err(PatternSyntax::MissingType),
            [_, _, extra, ..] => Err(PatternSyntax::UnexpectedToken(extra.to_string())),
        }
    }

    pub fn source(&self) -> &str {
        match self {
            MemberPattern::Method(p) => p.source(),
            MemberPattern::Constructor(p) => p.source(),
        }
    }

    pub fn matches_method(&self, method: &MethodInfo, repo: &MetadataRepository) -> Verdict {
        match self {
            MemberPattern::Method(p) => p.matches_method(method, repo),
            MemberPattern::Constructor(_) => Verdict::False,
        }
    }

    pub fn matches_constructor(
        &self,
        constructor: &ConstructorInfo,
        repo: &MetadataRepository,
    ) -> Verdict {
        match self {
            MemberPattern::Constructor(p) => p.matches_constructor(constructor, repo),
            MemberPattern::Method(_) => Verdict::False,
        }
    }

    pub fn matches_class(&self, class: &ClassInfo, repo: &MetadataRepository) -> Verdict {
        match self {
            MemberPattern::Method(p) => p.matches_class(class, repo),
            MemberPattern::Constructor(p) => p.matches_class(class, repo),
        }
    }
}

// ============================================================================
// FIELD PATTERNS
// ============================================================================

/// Compiled field designator: `[@Anno] [modifiers] field-type decl.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPattern {
    source: String,
    pub annotations: Vec<TypePattern>,
    pub modifiers: ModifierPattern,
    pub field_type: TypePattern,
    pub declaring: TypePattern,
    pub name: NamePattern,
}

impl FieldPattern {
    pub fn compile(text: &str) -> Result<Self, PatternSyntax> {
        let text = text.trim();
        if text.contains('(') {
            return Err(PatternSyntax::UnexpectedToken("(".to_string()));
        }
        let mut tokens: Vec<&str> = text.split_whitespace().collect();
        let annotations = take_annotations(&mut tokens)?;
        let modifiers = take_modifiers(&mut tokens)?;

        match tokens.as_slice() {
            [field_type, member] => {
                let (declaring, name) = split_declaring_and_name(member)?;
                Ok(FieldPattern {
                    source: text.to_string(),
                    annotations,
                    modifiers,
                    field_type: TypePattern::compile(field_type)?,
                    declaring,
                    name: NamePattern::compile(name)?,
                })
            }
            [] | [_] => Err(PatternSyntax::MissingType),
            [_, _, extra, ..] => Err(PatternSyntax::UnexpectedToken(extra.to_string())),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Field declaring types are matched exactly; fields are not inherited
    /// through the hierarchy for set/get matching.
    pub fn matches_field(&self, field: &FieldInfo) -> Verdict {
        if !self.name.matches(&field.name) {
            return Verdict::False;
        }
        if !self.modifiers.matches(field.modifiers) {
            return Verdict::False;
        }
        if !self.field_type.matches(&field.field_type) {
            return Verdict::False;
        }
        if !annotations_match(&self.annotations, &field.annotations) {
            return Verdict::False;
        }
        Verdict::from_bool(self.declaring.matches(&field.declaring))
    }

    pub fn matches_class(&self, class: &ClassInfo) -> Verdict {
        if self.declaring.matches(&class.name) {
            Verdict::Undetermined
        } else {
            Verdict::False
        }
    }
}

// ============================================================================
// SHARED TOKEN HELPERS
// ============================================================================

fn take_annotations(tokens: &mut Vec<&str>) -> Result<Vec<TypePattern>, PatternSyntax> {
    let mut annotations = vec![];
    while let Some(token) = tokens.first() {
        let Some(name) = token.strip_prefix('@') else {
            break;
        };
        if name.is_empty() {
            return Err(PatternSyntax::UnexpectedToken("@".to_string()));
        }
        annotations.push(TypePattern::compile(name)?);
        tokens.remove(0);
    }
    Ok(annotations)
}

fn take_modifiers(tokens: &mut Vec<&str>) -> Result<ModifierPattern, PatternSyntax> {
    let mut modifiers = ModifierPattern::any();
    while let Some(token) = tokens.first() {
        if modifier_token(token).is_none() {
            break;
        }
        modifiers = modifiers.with_token(token)?;
        tokens.remove(0);
    }
    Ok(modifiers)
}

/// Splits `decl.name`, keeping a trailing `..` with the declaring part so
/// `foo..bar` reads as name `bar` on any type under `foo`. A dotless token is
/// a bare member name on any declaring type.
fn split_declaring_and_name(token: &str) -> Result<(TypePattern, &str), PatternSyntax> {
    let Some(dot) = token.rfind('.') else {
        return Ok((TypePattern::match_all(), token));
    };
    let name = &token[dot + 1..];
    if name.is_empty() {
        return Err(PatternSyntax::MissingName);
    }
    let declaring_text = if dot >= 1 && token.as_bytes()[dot - 1] == b'.' {
        &token[..dot + 1]
    } else {
        &token[..dot]
    };
    Ok((TypePattern::compile(declaring_text)?, name))
}
