//! Learned feedback: per-item and per-token accept/reject counts
//!
//! The store is an explicit handle with `load` and `save` as its only I/O.
//! Searches read one [`FeedbackSnapshot`] up front and never see writes
//! made while they run. Every `mark_*` call is a full load-modify-save
//! round trip; concurrent writers in other processes are last-writer-wins.

mod json;
mod learner;
mod memory;

pub use json::JsonFeedbackStore;
pub use learner::{learn, learn_negative, learn_positive};
pub use memory::MemoryFeedbackStore;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accumulated positive and negative signals for one key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasEntry {
    /// Times the key was accepted
    #[serde(default)]
    pub pos: u64,
    /// Times the key was rejected
    #[serde(default)]
    pub neg: u64,
}

impl BiasEntry {
    /// Count one outcome
    pub fn record(&mut self, positive: bool) {
        if positive {
            self.pos = self.pos.saturating_add(1);
        } else {
            self.neg = self.neg.saturating_add(1);
        }
    }

    /// Laplace-smoothed ratio `(1 + pos) / (1 + neg)`
    pub fn bias(&self) -> f64 {
        smoothed_ratio(self.pos, self.neg)
    }
}

fn smoothed_ratio(pos: u64, neg: u64) -> f64 {
    (1.0 + pos as f64) / (1.0 + neg as f64)
}

/// Immutable view of the feedback file, as persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSnapshot {
    /// Counts keyed by item path
    #[serde(default)]
    pub item_bias: BTreeMap<String, BiasEntry>,
    /// Counts keyed by query token
    #[serde(default)]
    pub token_bias: BTreeMap<String, BiasEntry>,
}

impl FeedbackSnapshot {
    /// Whether no feedback has been recorded
    pub fn is_empty(&self) -> bool {
        self.item_bias.is_empty() && self.token_bias.is_empty()
    }

    /// Record one outcome for an item key
    pub fn record_item(&mut self, key: &str, positive: bool) {
        self.item_bias
            .entry(key.to_string())
            .or_default()
            .record(positive);
    }

    /// Record one outcome for each token independently
    pub fn record_tokens<T: AsRef<str>>(&mut self, tokens: &[T], positive: bool) {
        for token in tokens {
            self.token_bias
                .entry(token.as_ref().to_string())
                .or_default()
                .record(positive);
        }
    }

    /// Item bias `(1 + pos) / (1 + neg)`, or `1.0` for an unseen item
    pub fn bias_for_item(&self, key: &str) -> f64 {
        self.item_bias.get(key).map_or(1.0, BiasEntry::bias)
    }

    /// Pooled token bias: `(1 + Σpos) / (1 + Σneg)` over the given tokens
    pub fn bias_for_tokens<T: AsRef<str>>(&self, tokens: &[T]) -> f64 {
        let (pos, neg) = tokens
            .iter()
            .filter_map(|t| self.token_bias.get(t.as_ref()))
            .fold((0u64, 0u64), |(pos, neg), e| {
                (pos.saturating_add(e.pos), neg.saturating_add(e.neg))
            });
        smoothed_ratio(pos, neg)
    }
}

/// Result of reading persisted feedback.
///
/// `Missing` and `Corrupt` both fall back to the empty snapshot but stay
/// distinguishable for callers and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Persisted state was read and parsed
    Loaded(FeedbackSnapshot),
    /// Nothing persisted yet
    Missing,
    /// Persisted state exists but could not be read or parsed
    Corrupt {
        /// Why the state was rejected
        reason: String,
    },
}

impl LoadOutcome {
    /// Snapshot to rank with; empty for the fallback variants
    pub fn into_snapshot(self) -> FeedbackSnapshot {
        match self {
            LoadOutcome::Loaded(snapshot) => snapshot,
            LoadOutcome::Missing | LoadOutcome::Corrupt { .. } => FeedbackSnapshot::default(),
        }
    }

    /// Whether this is the empty fallback rather than persisted state
    pub fn is_fallback(&self) -> bool {
        !matches!(self, LoadOutcome::Loaded(_))
    }
}

/// Persistent home for feedback counts
pub trait FeedbackStore {
    /// Read persisted state; never fails, falls back to empty
    fn load(&self) -> LoadOutcome;

    /// Replace persisted state with `snapshot`, durably and atomically
    fn save(&self, snapshot: &FeedbackSnapshot) -> Result<()>;

    /// Current state, empty on fallback
    fn snapshot(&self) -> FeedbackSnapshot {
        self.load().into_snapshot()
    }

    /// Increment `pos` or `neg` for one item key and persist
    fn mark_item(&self, key: &str, positive: bool) -> Result<()> {
        let mut snapshot = self.snapshot();
        snapshot.record_item(key, positive);
        self.save(&snapshot)
    }

    /// Increment `pos` or `neg` for every token and persist once
    fn mark_tokens(&self, tokens: &[String], positive: bool) -> Result<()> {
        let mut snapshot = self.snapshot();
        snapshot.record_tokens(tokens, positive);
        self.save(&snapshot)
    }

    /// Forget all learned bias
    fn reset(&self) -> Result<()> {
        self.save(&FeedbackSnapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_item_is_neutral() {
        let snapshot = FeedbackSnapshot::default();
        assert_eq!(snapshot.bias_for_item("/nowhere"), 1.0);
        assert_eq!(snapshot.bias_for_tokens(&["a", "b"]), 1.0);
    }

    #[test]
    fn test_item_bias_is_laplace_smoothed() {
        let mut snapshot = FeedbackSnapshot::default();
        for _ in 0..3 {
            snapshot.record_item("/p", true);
        }
        snapshot.record_item("/p", false);
        assert_eq!(snapshot.bias_for_item("/p"), 4.0 / 2.0);
    }

    #[test]
    fn test_item_bias_monotonic() {
        let mut snapshot = FeedbackSnapshot::default();
        let mut last = snapshot.bias_for_item("/p");
        for _ in 0..5 {
            snapshot.record_item("/p", true);
            let next = snapshot.bias_for_item("/p");
            assert!(next > last);
            last = next;
        }
        for _ in 0..5 {
            snapshot.record_item("/p", false);
            let next = snapshot.bias_for_item("/p");
            assert!(next < last);
            assert!(next > 0.0);
            last = next;
        }
    }

    #[test]
    fn test_token_bias_pools_evidence() {
        let mut snapshot = FeedbackSnapshot::default();
        snapshot.record_tokens(&["shop"], true);
        snapshot.record_tokens(&["shop"], true);
        snapshot.record_tokens(&["drawing"], false);

        // (1 + 2) / (1 + 1), not the product of per-token ratios
        assert_eq!(snapshot.bias_for_tokens(&["shop", "drawing", "unseen"]), 1.5);
    }

    #[test]
    fn test_counts_saturate_at_max() {
        let mut snapshot: FeedbackSnapshot = serde_json::from_str(
            r#"{"item_bias": {"/a.pdf": {"pos": 18446744073709551615}},
                "token_bias": {"report": {"pos": 18446744073709551615}, "q3": {"pos": 1}}}"#,
        )
        .unwrap();

        let pooled = snapshot.bias_for_tokens(&["report", "q3"]);
        assert!(pooled.is_finite() && pooled > 1.0);

        snapshot.record_item("/a.pdf", true);
        snapshot.record_tokens(&["report"], true);
        assert_eq!(snapshot.item_bias["/a.pdf"].pos, u64::MAX);
        assert_eq!(snapshot.token_bias["report"].pos, u64::MAX);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut snapshot = FeedbackSnapshot::default();
        snapshot.record_item("/x/y.txt", false);
        snapshot.record_tokens(&["預製"], true);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["item_bias"]["/x/y.txt"]["neg"], 1);
        assert_eq!(value["item_bias"]["/x/y.txt"]["pos"], 0);
        assert_eq!(value["token_bias"]["預製"]["pos"], 1);
    }

    #[test]
    fn test_snapshot_missing_sections_default() {
        let snapshot: FeedbackSnapshot =
            serde_json::from_str(r#"{"item_bias": {"/a": {"pos": 2}}}"#).unwrap();
        assert_eq!(snapshot.item_bias["/a"], BiasEntry { pos: 2, neg: 0 });
        assert!(snapshot.token_bias.is_empty());
    }

    #[test]
    fn test_load_outcome_fallbacks() {
        assert!(LoadOutcome::Missing.is_fallback());
        let corrupt = LoadOutcome::Corrupt {
            reason: "bad".to_string(),
        };
        assert!(corrupt.is_fallback());
        assert!(corrupt.into_snapshot().is_empty());
        assert!(!LoadOutcome::Loaded(FeedbackSnapshot::default()).is_fallback());
    }
}
