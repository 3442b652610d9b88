//! Moderation verdicts returned by the safety classifier

use std::collections::BTreeMap;

/// One verdict from the moderation service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModerationVerdict {
    /// Whether the input violates policy
    pub flagged: bool,

    /// Per-category flagged status
    pub categories: BTreeMap<String, bool>,

    /// Per-category classifier score (0.0-1.0)
    pub category_scores: BTreeMap<String, f64>,
}

impl ModerationVerdict {
    /// A verdict that flags nothing
    pub fn clean() -> Self {
        Self::default()
    }

    /// A flagged verdict for the given categories
    pub fn flagged_for<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: BTreeMap<String, bool> =
            categories.into_iter().map(|c| (c.into(), true)).collect();
        let category_scores = categories.keys().map(|c| (c.clone(), 1.0)).collect();
        Self {
            flagged: true,
            categories,
            category_scores,
        }
    }

    /// Names of the categories that were flagged
    pub fn flagged_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
