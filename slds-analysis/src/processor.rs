//! Ranking and suppression of merged recommendations

use crate::model::{ActionType, Recommendation};
use slds_parser::{InputKind, Range};

/// Ranges replaced by rule level (utility class) recommendations.
fn rule_replacements(recommendations: &[Recommendation]) -> Vec<Range> {
    recommendations
        .iter()
        .filter(|recommendation| recommendation.kind() == InputKind::RuleSet)
        .flat_map(|recommendation| recommendation.actions())
        .filter(|action| action.action_type == ActionType::Replace)
        .map(|action| action.range)
        .collect()
}

/// Drops empty recommendations and those inside a rule level replacement,
/// then orders what is left for presentation.
pub fn process(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let recommendations: Vec<Recommendation> = recommendations
        .into_iter()
        .filter(|recommendation| !recommendation.is_empty())
        .collect();
    let replaced = rule_replacements(&recommendations);

    let mut kept: Vec<Recommendation> = recommendations
        .into_iter()
        .filter(|recommendation| {
            recommendation.kind() == InputKind::RuleSet || {
                let range = recommendation.input.range();
                !replaced.iter().any(|outer| outer.encloses(&range))
            }
        })
        .collect();

    kept.sort_by(|left, right| {
        left.presentation_cmp(right)
            .then_with(|| left.input.range().cmp(&right.input.range()))
    });
    tracing::debug!(kept = kept.len(), suppressed = replaced.len(), "processed recommendations");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Item};
    use slds_parser::{Position, RuleSet, Selector, Style};

    fn range(start: (usize, usize), end: (usize, usize)) -> Range {
        Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
    }

    fn style(property: &str, at: Range) -> Style {
        Style {
            property: property.to_string(),
            value: "1rem".to_string(),
            range: at,
            value_range: at,
            annotation: Default::default(),
        }
    }

    fn rule(at: Range) -> Recommendation {
        let rule = RuleSet {
            selectors: vec![Selector {
                text: ".THIS .a".to_string(),
                range: range((1, 0), (1, 8)),
            }],
            styles: vec![],
            range: at,
            annotation: Default::default(),
        };
        Recommendation::new(
            rule,
            [Item::new("slds-p-around_medium", Action::replace("slds-p-around_medium", "slds-p-around_medium", at))],
        )
    }

    fn declaration(property: &str, at: Range) -> Recommendation {
        Recommendation::new(
            style(property, at),
            [Item::new("1rem", Action::replace("spacingMedium", "t(spacingMedium)", at))],
        )
    }

    #[test]
    fn test_contained_declaration_is_suppressed() {
        let result = process(vec![
            declaration("padding", range((2, 3), (2, 8))),
            rule(range((1, 3), (3, 8))),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].kind(), InputKind::RuleSet);
    }

    #[test]
    fn test_declaration_outside_survives() {
        let result = process(vec![
            declaration("padding", range((1, 0), (1, 2))),
            rule(range((1, 3), (3, 8))),
        ]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].kind(), InputKind::RuleSet);
        assert_eq!(result[1].kind(), InputKind::Style);
    }

    #[test]
    fn test_empty_recommendations_are_dropped() {
        let empty = Recommendation::new(style("margin", range((0, 0), (0, 4))), Vec::<Item>::new());
        assert!(process(vec![empty]).is_empty());
    }

    #[test]
    fn test_presentation_order() {
        let result = process(vec![
            declaration("padding", range((4, 0), (4, 10))),
            declaration("margin", range((5, 0), (5, 10))),
            declaration("margin", range((2, 0), (2, 10))),
        ]);
        let order: Vec<_> = result
            .iter()
            .map(|rec| (rec.input.sort_key(), rec.input.range().start.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("margin".to_string(), 2),
                ("margin".to_string(), 5),
                ("padding".to_string(), 4)
            ]
        );
    }
}
