//! Feature flags for one analysis run

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A concern that can be switched off for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextKey {
    Global,
    DesignToken,
    Deprecated,
    Invalid,
    UtilityClass,
    Bem,
    Density,
    Override,
    SldsMobileValidation,
    /// Block-range suppression for styles and script blocks.
    V2Annotation,
}

impl ContextKey {
    pub const ALL: [ContextKey; 10] = [
        ContextKey::Global,
        ContextKey::DesignToken,
        ContextKey::Deprecated,
        ContextKey::Invalid,
        ContextKey::UtilityClass,
        ContextKey::Bem,
        ContextKey::Density,
        ContextKey::Override,
        ContextKey::SldsMobileValidation,
        ContextKey::V2Annotation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContextKey::Global => "GLOBAL",
            ContextKey::DesignToken => "DESIGN_TOKEN",
            ContextKey::Deprecated => "DEPRECATED",
            ContextKey::Invalid => "INVALID",
            ContextKey::UtilityClass => "UTILITY_CLASS",
            ContextKey::Bem => "BEM",
            ContextKey::Density => "DENSITY",
            ContextKey::Override => "OVERRIDE",
            ContextKey::SldsMobileValidation => "SLDS_MOBILE_VALIDATION",
            ContextKey::V2Annotation => "V2_ANNOTATION",
        }
    }

    /// Case-insensitive; `-` and `_` are interchangeable.
    pub fn parse(name: &str) -> Option<Self> {
        let wanted = name.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(&wanted))
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    disabled: BTreeSet<ContextKey>,
    workers: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            disabled: BTreeSet::new(),
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables every named flag. Unknown names are skipped.
    pub fn with_disabled<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::default();
        for name in names {
            context.set_named(name.as_ref(), false);
        }
        context
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn set(&mut self, key: ContextKey, enabled: bool) {
        if enabled {
            self.disabled.remove(&key);
        } else {
            self.disabled.insert(key);
        }
    }

    /// Returns false when the name is not a known flag.
    pub fn set_named(&mut self, name: &str, enabled: bool) -> bool {
        match ContextKey::parse(name) {
            Some(key) => {
                self.set(key, enabled);
                true
            }
            None => {
                tracing::debug!(flag = name, "ignoring unknown context flag");
                false
            }
        }
    }

    pub fn is_enabled(&self, key: ContextKey) -> bool {
        !self.disabled.contains(&key)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}
