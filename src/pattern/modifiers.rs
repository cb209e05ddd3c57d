//! Modifier filters compiled from tokens like `public` and `!static`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::meta::Modifiers;
use crate::pattern::PatternSyntax;

static MODIFIER_TOKENS: Lazy<HashMap<&'static str, Modifiers>> = Lazy::new(|| {
    HashMap::from([
        ("public", Modifiers::PUBLIC),
        ("private", Modifiers::PRIVATE),
        ("protected", Modifiers::PROTECTED),
        ("static", Modifiers::STATIC),
        ("final", Modifiers::FINAL),
        ("abstract", Modifiers::ABSTRACT),
        ("synchronized", Modifiers::SYNCHRONIZED),
    ])
});

/// Returns the modifier bit for a bare token, if the token is a modifier.
pub fn modifier_token(token: &str) -> Option<Modifiers> {
    let bare = token.strip_prefix('!').unwrap_or(token);
    MODIFIER_TOKENS.get(bare).copied()
}

/// Required-present / required-absent modifier bitmask filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierPattern {
    required: Modifiers,
    forbidden: Modifiers,
}

impl ModifierPattern {
    /// An empty filter that accepts any modifier set.
    pub fn any() -> Self {
        Self::default()
    }

    /// Compiles a list of tokens, each optionally negated with `!`.
    pub fn compile(tokens: &[&str]) -> Result<Self, PatternSyntax> {
        let mut pattern = Self::default();
        for token in tokens {
            pattern = pattern.with_token(token)?;
        }
        Ok(pattern)
    }

    /// Folds one more token into the filter.
    pub fn with_token(mut self, token: &str) -> Result<Self, PatternSyntax> {
        let negated = token.starts_with('!');
        let bare = token.strip_prefix('!').unwrap_or(token);
        let Some(bit) = MODIFIER_TOKENS.get(bare).copied() else {
            return Err(PatternSyntax::UnknownModifier(token.to_string()));
        };
        if negated {
            self.forbidden = self.forbidden | bit;
        } else {
            self.required = self.required | bit;
        }
        Ok(self)
    }

    pub fn matches(&self, modifiers: Modifiers) -> bool {
        modifiers.contains(self.required) && !modifiers.intersects(self.forbidden)
    }

    pub fn is_any(&self) -> bool {
        *self == Self::default()
    }
}
