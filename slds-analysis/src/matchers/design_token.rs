//! Deprecated and unknown token references

use super::{entry_styles, Matcher};
use crate::catalog::TokenCatalog;
use crate::context::{Context, ContextKey};
use crate::model::{Action, Item, Recommendation};
use crate::normalizer::token::{self, TokenReference};
use slds_parser::{Bundle, EntityType, Entry, InputKind, Style};
use std::collections::HashMap;
use std::sync::Arc;

pub struct DesignTokenMatcher {
    catalog: Arc<dyn TokenCatalog>,
    /// Deprecated name to successor, used when the token comment names none.
    successors: HashMap<String, String>,
}

impl DesignTokenMatcher {
    pub fn new(catalog: Arc<dyn TokenCatalog>, successors: HashMap<String, String>) -> Self {
        Self {
            catalog,
            successors,
        }
    }

    fn successor(&self, name: &str) -> Option<String> {
        let from_comment = self
            .catalog
            .design_token(name)
            .and_then(|token| token.successor_from_comment())
            .filter(|successor| self.catalog.design_token(successor).is_some());
        from_comment.or_else(|| {
            self.successors
                .get(name)
                .filter(|successor| self.catalog.design_token(successor).is_some())
                .cloned()
        })
    }

    fn action(
        &self,
        style: &Style,
        reference: &TokenReference,
        entity: EntityType,
        context: &Context,
    ) -> Option<Action> {
        let range = style.value_span_range(reference.span.start, reference.span.end);
        let action = match self.successor(&reference.name) {
            Some(successor) if context.is_enabled(ContextKey::Deprecated) => {
                let token = self.catalog.design_token(&successor)?;
                let value = if reference.is_var {
                    let written = &style.value[reference.span.start..reference.span.end];
                    written.replacen(
                        &format!("--lwc-{}", reference.name),
                        &format!("--lwc-{successor}"),
                        1,
                    )
                } else {
                    token.reference(entity)
                };
                Action::replace(successor, value, range).with_description(token.comment.clone())
            }
            None if context.is_enabled(ContextKey::Invalid) => {
                let action = Action::remove(&reference.name, range);
                match &reference.fallback {
                    Some(fallback) => action.with_value(fallback),
                    None => action,
                }
            }
            _ => return None,
        };
        Some(action.with_file_type(InputKind::Style))
    }
}

impl Matcher for DesignTokenMatcher {
    fn name(&self) -> &str {
        "design-token"
    }

    fn matches(&self, entry: &Entry, _bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        if !context.is_enabled(ContextKey::DesignToken)
            || !(context.is_enabled(ContextKey::Deprecated)
                || context.is_enabled(ContextKey::Invalid))
        {
            return Vec::new();
        }

        let mut result = Vec::new();
        for (_, style) in entry_styles(entry) {
            let items: Vec<Item> = token::references(&style.value)
                .iter()
                .filter(|reference| {
                    self.catalog
                        .design_token(&reference.name)
                        .map_or(true, |token| token.is_deprecated())
                })
                .filter_map(|reference| {
                    self.action(style, reference, entry.entity_type, context)
                        .map(|action| Item::new(&reference.name, action))
                })
                .collect();
            if !items.is_empty() {
                result.push(Recommendation::new(style.clone(), items));
            }
        }
        tracing::debug!(path = %entry.path.display(), found = result.len(), "design token matcher");
        result
    }
}
