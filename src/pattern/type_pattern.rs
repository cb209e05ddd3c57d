//! Type-name and member-name patterns with segment wildcards.
//!
//! A type pattern is matched segment-wise against dot-delimited qualified
//! names. `*` matches exactly one segment, `..` matches zero or more segments,
//! and a `*` inside a segment globs within that segment only. Nested-class
//! separators (`$`) are ordinary segment text, except that a `$`-leading
//! segment suffix-matches, which is what makes the `..$Inner` idiom work.

use regex::Regex;

use crate::pattern::PatternSyntax;

// ============================================================================
// SEGMENTS
// ============================================================================

/// One compiled pattern segment.
#[derive(Debug, Clone)]
pub enum Segment {
    /// `*`: exactly one segment, any text.
    Any,
    /// `..`: zero or more segments.
    Ellipsis,
    /// Exact segment text. A leading `$` makes it a within-segment suffix.
    Literal(String),
    /// A segment containing `*` as a substring, compiled to an anchored regex.
    Glob { raw: String, re: Regex },
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Segment::Any, Segment::Any) => true,
            (Segment::Ellipsis, Segment::Ellipsis) => true,
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Glob { raw: a, .. }, Segment::Glob { raw: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Segment {}

fn glob_regex(raw: &str) -> Result<Regex, PatternSyntax> {
    let mut source = String::from("^");
    for ch in raw.chars() {
        if ch == '*' {
            source.push_str(".*");
        } else {
            source.push_str(&regex::escape(&ch.to_string()));
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|_| PatternSyntax::UnexpectedToken(raw.to_string()))
}

fn compile_segment(text: &str) -> Result<Segment, PatternSyntax> {
    if text == "*" {
        return Ok(Segment::Any);
    }
    if text.contains('*') {
        return Ok(Segment::Glob {
            raw: text.to_string(),
            re: glob_regex(text)?,
        });
    }
    Ok(Segment::Literal(text.to_string()))
}

fn segment_matches(segment: &Segment, candidate: &str) -> bool {
    match segment {
        Segment::Any => !candidate.is_empty(),
        Segment::Ellipsis => true,
        Segment::Literal(text) => {
            if let Some(suffix) = text.strip_prefix('$') {
                // `..$Inner` backs up to just before a nested-class separator.
                candidate
                    .strip_suffix(suffix)
                    .is_some_and(|head| head.ends_with('$'))
            } else {
                candidate == text
            }
        }
        Segment::Glob { re, .. } => re.is_match(candidate),
    }
}

// ============================================================================
// TYPE PATTERN
// ============================================================================

/// Compiled pattern over fully-qualified type names.
#[derive(Debug, Clone, Eq)]
pub struct TypePattern {
    source: String,
    segments: Vec<Segment>,
}

impl PartialEq for TypePattern {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl TypePattern {
    /// Compiles pattern text. The empty pattern is valid and matches nothing.
    pub fn compile(text: &str) -> Result<Self, PatternSyntax> {
        // `*` alone matches everything, qualified or not.
        if text == "*" {
            return Ok(Self {
                source: text.to_string(),
                segments: vec![Segment::Ellipsis, Segment::Any],
            });
        }
        let segments = tokenize(text)?;
        Ok(Self {
            source: text.to_string(),
            segments,
        })
    }

    /// A pattern that matches any type name.
    pub fn match_all() -> Self {
        Self::compile("*").expect("'*' is a valid pattern")
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True iff the candidate qualified name matches.
    pub fn matches(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        let parts: Vec<&str> = candidate.split('.').collect();
        match_segments(&self.segments, &parts)
    }

    /// If the pattern is a plain qualified name with no wildcards, return it.
    pub fn exact_name(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) if !text.starts_with('$') => parts.push(text.as_str()),
                _ => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(parts.join("."))
    }

    pub fn has_wildcards(&self) -> bool {
        self.exact_name().is_none()
    }
}

fn tokenize(text: &str) -> Result<Vec<Segment>, PatternSyntax> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments: Vec<Segment> = vec![];
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '.' {
            current.push(c);
            i += 1;
            continue;
        }

        if i + 1 < chars.len() && chars[i + 1] == '.' {
            if i + 2 < chars.len() && chars[i + 2] == '.' {
                return Err(PatternSyntax::RunOfDots);
            }
            if !current.is_empty() {
                segments.push(compile_segment(&current)?);
                current.clear();
            } else if matches!(segments.last(), Some(Segment::Ellipsis)) {
                return Err(PatternSyntax::AdjacentEllipses);
            }
            segments.push(Segment::Ellipsis);
            i += 2;
        } else {
            if current.is_empty() {
                return Err(PatternSyntax::EmptySegment);
            }
            segments.push(compile_segment(&current)?);
            current.clear();
            if i + 1 == chars.len() {
                return Err(PatternSyntax::TrailingDot);
            }
            i += 1;
        }
    }

    if !current.is_empty() {
        segments.push(compile_segment(&current)?);
    }
    Ok(segments)
}

/// Glob-over-segments matching, greedy leftmost for `..`.
fn match_segments(pattern: &[Segment], candidate: &[&str]) -> bool {
    let Some((first, rest)) = pattern.split_first() else {
        return candidate.is_empty();
    };

    match first {
        Segment::Ellipsis => {
            (0..=candidate.len()).any(|skip| match_segments(rest, &candidate[skip..]))
        }
        _ => {
            let Some((head, tail)) = candidate.split_first() else {
                return false;
            };
            segment_matches(first, head) && match_segments(rest, tail)
        }
    }
}

// ============================================================================
// NAME PATTERN
// ============================================================================

/// Single-segment pattern for unqualified member names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    source: String,
    segment: Segment,
}

impl NamePattern {
    pub fn compile(text: &str) -> Result<Self, PatternSyntax> {
        if text.is_empty() {
            return Err(PatternSyntax::MissingName);
        }
        if text.contains('.') {
            return Err(PatternSyntax::UnexpectedToken(text.to_string()));
        }
        Ok(Self {
            source: text.to_string(),
            segment: compile_segment(text)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, name: &str) -> bool {
        !name.is_empty() && segment_matches(&self.segment, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(text: &str) -> TypePattern {
        TypePattern::compile(text).unwrap()
    }

    #[test]
    fn star_alone_matches_everything() {
        let p = pat("*");
        assert!(p.matches("Foo"));
        assert!(p.matches("foo.bar.Baz"));
        assert!(!p.matches(""));
    }

    #[test]
    fn single_star_segment_matches_exactly_one_segment() {
        // Scenario A
        let p = pat("foo.bar.*");
        assert!(p.matches("foo.bar.SomeClass"));
        assert!(!p.matches("foo.bar.baz.SomeClass"));
        assert!(!p.matches("foo.bar"));
    }

    #[test]
    fn ellipsis_matches_zero_or_more_segments() {
        // Scenario B
        let p = pat("foo.bar..*");
        assert!(p.matches("foo.bar.SomeClass"));
        assert!(p.matches("foo.bar.baz.buzz.SomeClass"));
        assert!(!p.matches("foo.SomeClass"));
    }

    #[test]
    fn leading_segment_plus_trailing_ellipsis() {
        let p = pat("a..");
        assert!(p.matches("a"));
        assert!(p.matches("a.b"));
        assert!(p.matches("a.b.c"));
        assert!(!p.matches("b.a"));
    }

    #[test]
    fn bare_ellipsis_matches_anything() {
        let p = pat("..");
        assert!(p.matches("a"));
        assert!(p.matches("a.b.c"));
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let p = pat("");
        assert!(!p.matches("a"));
        assert!(!p.matches("a.b"));
    }

    #[test]
    fn glob_within_a_segment() {
        let p = pat("foo.ba*.Worker");
        assert!(p.matches("foo.bar.Worker"));
        assert!(p.matches("foo.baz.Worker"));
        assert!(!p.matches("foo.qux.Worker"));

        let suffix = pat("foo.*Impl");
        assert!(suffix.matches("foo.ServiceImpl"));
        assert!(!suffix.matches("foo.Service"));
    }

    #[test]
    fn dollar_is_segment_text() {
        let p = pat("foo.Outer$Inner");
        assert!(p.matches("foo.Outer$Inner"));
        assert!(!p.matches("foo.Outer.Inner"));
    }

    #[test]
    fn ellipsis_dollar_matches_any_outer_path() {
        let p = pat("..$Inner");
        assert!(p.matches("foo.Outer$Inner"));
        assert!(p.matches("a.b.c.Deep$Inner"));
        assert!(!p.matches("foo.Inner"));
        assert!(!p.matches("foo.Outer$Other"));
    }

    #[test]
    fn malformed_patterns_fail_at_compile_time() {
        assert_eq!(
            TypePattern::compile("a...b").unwrap_err(),
            PatternSyntax::RunOfDots
        );
        assert_eq!(
            TypePattern::compile("a....b").unwrap_err(),
            PatternSyntax::RunOfDots
        );
        assert_eq!(
            TypePattern::compile("a.").unwrap_err(),
            PatternSyntax::TrailingDot
        );
        assert_eq!(
            TypePattern::compile(".a").unwrap_err(),
            PatternSyntax::EmptySegment
        );
    }

    #[test]
    fn compilation_is_idempotent() {
        assert_eq!(pat("foo..*.ba*"), pat("foo..*.ba*"));
        assert_ne!(pat("foo.*"), pat("foo.."));
    }

    #[test]
    fn exact_name_only_for_wildcard_free_patterns() {
        assert_eq!(pat("foo.Bar").exact_name().as_deref(), Some("foo.Bar"));
        assert_eq!(pat("foo.*").exact_name(), None);
        assert_eq!(pat("foo..Bar").exact_name(), None);
        assert!(pat("foo.*").has_wildcards());
    }

    #[test]
    fn name_pattern_single_segment_rules() {
        let p = NamePattern::compile("get*").unwrap();
        assert!(p.matches("getName"));
        assert!(!p.matches("setName"));
        assert!(NamePattern::compile("a.b").is_err());
        assert!(NamePattern::compile("").is_err());
    }
}
