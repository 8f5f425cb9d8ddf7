//! Merging recommendations from independent matchers
//!
//! Two recommendations are merged when the aggregator's [`Equivalence`]
//! holds for them. Merging groups items by their value and unions the action
//! sets of items that share a value. Since the result does not depend on the
//! order in which recommendations arrive, [`Aggregator::combine`] can join
//! partial results of concurrent matchers in any order.

use crate::model::{Item, Recommendation};
use std::collections::{BTreeMap, BTreeSet};

/// When two recommendations describe the same thing
#[derive(Debug, Clone, Copy, Default)]
pub enum Equivalence {
    /// Structurally equal recommendations.
    #[default]
    Identical,
    /// Recommendations for the same input, whatever their items.
    SameInput,
    Custom(fn(&Recommendation, &Recommendation) -> bool),
}

impl Equivalence {
    pub fn holds(&self, left: &Recommendation, right: &Recommendation) -> bool {
        match self {
            Equivalence::Identical => left == right,
            Equivalence::SameInput => left.input == right.input,
            Equivalence::Custom(predicate) => predicate(left, right),
        }
    }
}

/// Items grouped by value, the actions of each group unioned.
pub fn merge_items(items: impl IntoIterator<Item = Item>) -> BTreeSet<Item> {
    let mut grouped: BTreeMap<String, Item> = BTreeMap::new();
    for item in items {
        match grouped.get_mut(&item.value) {
            Some(existing) => existing.actions.extend(item.actions),
            None => {
                grouped.insert(item.value.clone(), item);
            }
        }
    }
    grouped.into_values().collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    equivalence: Equivalence,
}

impl Aggregator {
    pub fn new(equivalence: Equivalence) -> Self {
        Self { equivalence }
    }

    pub fn equivalence(&self) -> Equivalence {
        self.equivalence
    }

    /// Folds one recommendation into `accumulated`. The incoming items are
    /// grouped by value first so it compares against stored entries in the
    /// same shape they were stored in.
    pub fn accumulate(&self, accumulated: &mut Vec<Recommendation>, recommendation: Recommendation) {
        let Recommendation { input, items } = recommendation;
        let recommendation = Recommendation {
            input,
            items: merge_items(items),
        };
        let existing = accumulated
            .iter_mut()
            .find(|candidate| self.equivalence.holds(candidate, &recommendation));
        match existing {
            Some(existing) => {
                let items = std::mem::take(&mut existing.items);
                existing.items = merge_items(items.into_iter().chain(recommendation.items));
            }
            None => accumulated.push(recommendation),
        }
    }

    /// Joins two partial results.
    pub fn combine(
        &self,
        mut left: Vec<Recommendation>,
        right: Vec<Recommendation>,
    ) -> Vec<Recommendation> {
        for recommendation in right {
            self.accumulate(&mut left, recommendation);
        }
        left
    }

    pub fn merge(&self, recommendations: impl IntoIterator<Item = Recommendation>) -> Vec<Recommendation> {
        let mut accumulated = Vec::new();
        for recommendation in recommendations {
            self.accumulate(&mut accumulated, recommendation);
        }
        accumulated
    }
}
