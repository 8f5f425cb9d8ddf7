//! Token references: `t(name)`, `token(name)` and `var(--lwc-name, fallback)`.

use super::pattern::{AURA_TOKEN, VAR_TOKEN};
use super::{Recognizer, Span, StateBuilder};

pub struct TokenRecognizer;

impl Recognizer for TokenRecognizer {
    fn recognize(&self, input: &str, state: &mut StateBuilder) {
        for pattern in [&*AURA_TOKEN, &*VAR_TOKEN] {
            for captures in pattern.captures_iter(input) {
                if let (Some(whole), Some(token)) = (captures.get(0), captures.name("token")) {
                    state.add(Span::from(whole), token.as_str());
                }
            }
        }
    }
}

/// A token reference found in a declaration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenReference {
    pub name: String,
    pub span: Span,
    /// Literal fallback of a `var()` reference.
    pub fallback: Option<String>,
    pub is_var: bool,
}

/// Every token reference in `value`, in source order.
pub fn references(value: &str) -> Vec<TokenReference> {
    let mut found: Vec<TokenReference> = AURA_TOKEN
        .captures_iter(value)
        .filter_map(|captures| {
            Some(TokenReference {
                name: captures.name("token")?.as_str().to_string(),
                span: captures.get(0)?.into(),
                fallback: None,
                is_var: false,
            })
        })
        .chain(VAR_TOKEN.captures_iter(value).filter_map(|captures| {
            Some(TokenReference {
                name: captures.name("token")?.as_str().to_string(),
                span: captures.get(0)?.into(),
                fallback: captures.name("fallback").map(|m| m.as_str().to_string()),
                is_var: true,
            })
        }))
        .collect();
    found.sort_by_key(|reference| reference.span);
    found
}
