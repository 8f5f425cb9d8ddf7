//! Recommendations and the edits they propose

use serde::{Deserialize, Serialize};
use slds_parser::{Input, InputKind, Range, RuleSet, Selector};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Replace,
    Remove,
    /// Informational, carries a description instead of an edit.
    None,
}

/// An edit elsewhere that must accompany the primary one
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelatedInformation {
    pub path: Option<PathBuf>,
    pub range: Range,
    /// Text to insert at `range`.
    pub value: Option<String>,
}

/// One proposed edit.
///
/// Ordered by type, then range, then name, then the remaining fields, so
/// action sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,
    pub range: Range,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css_properties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<RelatedInformation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<InputKind>,
}

impl Action {
    pub fn new(action_type: ActionType, name: impl Into<String>, range: Range) -> Self {
        Self {
            action_type,
            range,
            name: name.into(),
            value: None,
            css_properties: Vec::new(),
            description: None,
            related_information: Vec::new(),
            file_type: None,
        }
    }

    pub fn replace(name: impl Into<String>, value: impl Into<String>, range: Range) -> Self {
        Self::new(ActionType::Replace, name, range).with_value(value)
    }

    pub fn remove(name: impl Into<String>, range: Range) -> Self {
        Self::new(ActionType::Remove, name, range)
    }

    pub fn note(name: impl Into<String>, range: Range) -> Self {
        Self::new(ActionType::None, name, range)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_css_properties(mut self, properties: Vec<String>) -> Self {
        self.css_properties = properties;
        self
    }

    pub fn with_related(mut self, related: Vec<RelatedInformation>) -> Self {
        self.related_information = related;
        self
    }

    pub fn with_file_type(mut self, kind: InputKind) -> Self {
        self.file_type = Some(kind);
        self
    }
}

/// One candidate substring of an input and the edits proposed for it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Item {
    pub value: String,
    pub actions: BTreeSet<Action>,
}

impl Item {
    pub fn new(value: impl Into<String>, action: Action) -> Self {
        Self::with_actions(value, [action])
    }

    pub fn with_actions(value: impl Into<String>, actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            value: value.into(),
            actions: actions.into_iter().collect(),
        }
    }
}

/// Everything proposed for one structured input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recommendation {
    pub input: Input,
    pub items: BTreeSet<Item>,
}

impl Recommendation {
    pub fn new(input: impl Into<Input>, items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            input: input.into(),
            items: items.into_iter().collect(),
        }
    }

    pub fn kind(&self) -> InputKind {
        self.input.kind()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.items.iter().flat_map(|item| item.actions.iter())
    }

    /// Presentation order: rules, styles, elements, blocks, then each kind's own text.
    pub fn presentation_cmp(&self, other: &Self) -> Ordering {
        self.kind()
            .cmp(&other.kind())
            .then_with(|| self.input.sort_key().cmp(&other.input.sort_key()))
    }
}

/// A selector that restyles a class owned by the design system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentOverride {
    pub rule_set: RuleSet,
    pub selector: Selector,
    pub overridden_class: String,
    pub action: Action,
}

/// Output of one analyzed entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub path: PathBuf,
    pub recommendations: Vec<Recommendation>,
    pub overrides: Vec<ComponentOverride>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty() && self.overrides.is_empty()
    }

    /// Number of actions and overrides reported.
    pub fn finding_count(&self) -> usize {
        self.recommendations
            .iter()
            .map(|recommendation| recommendation.actions().count())
            .sum::<usize>()
            + self.overrides.len()
    }
}
