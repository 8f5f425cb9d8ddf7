//! Matching declaration values against token values

use crate::catalog::{DesignToken, TokenType};
use crate::model::{Action, Item, Recommendation};
use crate::normalizer;
use slds_parser::{EntityType, InputKind, Range, Style};

/// A replacement by `token`, referenced the way `entity` stylesheets do.
pub(crate) fn token_action(token: &DesignToken, entity: EntityType, range: Range) -> Action {
    Action::replace(&token.name, token.reference(entity), range)
        .with_css_properties(token.css_properties.clone())
        .with_description(token.comment.clone())
        .with_file_type(InputKind::Style)
}

/// Items for every recognized span of the value equal to a token value. A
/// token matching no single span may still match a rewrite of the whole value.
pub(crate) fn match_style<'a>(
    style: &Style,
    tokens: impl IntoIterator<Item = &'a DesignToken>,
    entity: EntityType,
) -> Option<Recommendation> {
    let property = style.property_name();
    let applicable: Vec<&DesignToken> = tokens
        .into_iter()
        .filter(|token| token.token_type == TokenType::Token && token.applies_to(&property))
        .collect();
    if applicable.is_empty() {
        return None;
    }

    let state = normalizer::normalize(&style.value);
    let mut expansions = None;
    let mut items = Vec::new();
    for token in applicable {
        let spans: Vec<_> = state
            .values()
            .iter()
            .filter(|(_, values)| values.contains(&token.value))
            .map(|(span, _)| *span)
            .collect();

        if !spans.is_empty() {
            items.extend(spans.into_iter().map(|span| {
                let range = style.value_span_range(span.start, span.end);
                Item::new(state.text(&span), token_action(token, entity, range))
            }));
            continue;
        }

        let whole = expansions.get_or_insert_with(|| state.expand());
        if whole.contains(&token.value) {
            items.push(Item::new(
                style.value.trim(),
                token_action(token, entity, style.value_range),
            ));
        }
    }

    (!items.is_empty()).then(|| Recommendation::new(style.clone(), items))
}
