//! Relevance scoring for a single item
//!
//! Score = base overlap × freshness × depth × extension × item bias × token bias.
//!
//! The base overlap gates everything: an item that shares no query token
//! with its searchable text scores zero and no multiplier can revive it.
//! The path-dependent factors (freshness, depth, extension, item bias) only
//! apply when the item has a non-empty path.

use crate::error::{Error, Result};
use crate::feedback::FeedbackSnapshot;
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::UNIX_EPOCH;

const SECS_PER_DAY: f64 = 86_400.0;

/// Which tokens the extension bonus compares the item extension against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionMatch {
    /// Synonym-expanded query tokens (default)
    #[default]
    Expanded,
    /// Only the tokens of the query as typed
    Literal,
}

impl std::str::FromStr for ExtensionMatch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "expanded" => Ok(ExtensionMatch::Expanded),
            "literal" => Ok(ExtensionMatch::Literal),
            _ => Err(Error::ConfigError(format!(
                "Unknown extension match policy '{}' (expected expanded or literal)",
                s
            ))),
        }
    }
}

/// Tunable scoring constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Maximum freshness boost (0.25 = +25% for a file modified just now)
    pub freshness_weight: f64,
    /// Time constant of the freshness decay, in days
    pub freshness_decay_days: f64,
    /// Separators allowed before the depth penalty starts
    pub depth_allowance: usize,
    /// Penalty per separator beyond the allowance
    pub depth_step: f64,
    /// Bonus per extension when the extension appears among the query tokens
    pub extension_hints: BTreeMap<String, f64>,
    /// Bonus for a matched extension with no hint of its own
    pub default_extension_bonus: f64,
    /// Token source for the extension bonus
    pub extension_match: ExtensionMatch,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let extension_hints = [("dwg", 1.2), ("pdf", 1.1), ("xlsx", 1.05)]
            .into_iter()
            .map(|(ext, bonus)| (ext.to_string(), bonus))
            .collect();

        ScoringConfig {
            freshness_weight: 0.25,
            freshness_decay_days: 30.0,
            depth_allowance: 6,
            depth_step: 0.08,
            extension_hints,
            default_extension_bonus: 1.1,
            extension_match: ExtensionMatch::Expanded,
        }
    }
}

impl ScoringConfig {
    /// Reject constants that would make scores negative or undefined
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("freshness_weight", self.freshness_weight),
            ("depth_step", self.depth_step),
            ("default_extension_bonus", self.default_extension_bonus),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "scoring.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !self.freshness_decay_days.is_finite() || self.freshness_decay_days <= 0.0 {
            return Err(Error::ConfigError(format!(
                "scoring.freshness_decay_days must be positive, got {}",
                self.freshness_decay_days
            )));
        }
        for (ext, bonus) in &self.extension_hints {
            if !bonus.is_finite() || *bonus < 0.0 {
                return Err(Error::ConfigError(format!(
                    "scoring.extension_hints.{} must be a non-negative number, got {}",
                    ext, bonus
                )));
            }
        }
        Ok(())
    }
}

/// Per-factor view of one item's score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Summed substring occurrences of query tokens
    pub base: f64,
    /// Recency multiplier
    pub freshness: f64,
    /// Nesting multiplier
    pub depth: f64,
    /// Extension hint multiplier
    pub extension: f64,
    /// Learned item multiplier
    pub item_bias: f64,
    /// Learned query-token multiplier
    pub token_bias: f64,
    /// Product of all of the above
    pub total: f64,
}

/// Scores items for one query against one feedback snapshot.
///
/// Built once per search; the pooled token bias is computed up front.
pub struct Scorer<'a> {
    config: &'a ScoringConfig,
    snapshot: &'a FeedbackSnapshot,
    tokens: &'a [String],
    extension_tokens: &'a [String],
    token_bias: f64,
    now: f64,
}

impl<'a> Scorer<'a> {
    /// Create a scorer.
    ///
    /// `tokens` are the expanded query tokens, `literal_tokens` those of the
    /// query as typed (used by [`ExtensionMatch::Literal`]), `now` is in
    /// seconds since the Unix epoch.
    pub fn new(
        config: &'a ScoringConfig,
        snapshot: &'a FeedbackSnapshot,
        tokens: &'a [String],
        literal_tokens: &'a [String],
        now: f64,
    ) -> Self {
        let extension_tokens = match config.extension_match {
            ExtensionMatch::Expanded => tokens,
            ExtensionMatch::Literal => literal_tokens,
        };
        Scorer {
            config,
            snapshot,
            tokens,
            extension_tokens,
            token_bias: snapshot.bias_for_tokens(tokens),
            now,
        }
    }

    /// Final score, or `None` when the item has no base overlap
    pub fn score(&self, item: &Item) -> Option<f64> {
        self.breakdown(item).map(|b| b.total)
    }

    /// Every factor of the score, or `None` when the item has no base overlap
    pub fn breakdown(&self, item: &Item) -> Option<ScoreBreakdown> {
        let base = base_overlap(self.tokens, &haystack(item));
        if base <= 0.0 {
            return None;
        }

        let path = item.path_str();
        let (freshness, depth, extension, item_bias) = if path.is_empty() {
            (1.0, 1.0, 1.0, 1.0)
        } else {
            (
                freshness_boost(item_mtime(item), self.now, self.config),
                depth_penalty(path, self.config),
                extension_bonus(item.extension().as_deref(), self.extension_tokens, self.config),
                self.snapshot.bias_for_item(path),
            )
        };

        let total = base * freshness * depth * extension * item_bias * self.token_bias;
        Some(ScoreBreakdown {
            base,
            freshness,
            depth,
            extension,
            item_bias,
            token_bias: self.token_bias,
            total,
        })
    }
}

/// Lowercased searchable text: description, name, path and parent directory
pub fn haystack(item: &Item) -> String {
    format!(
        "{} {} {} {}",
        item.description.as_deref().unwrap_or(""),
        item.display_name(),
        item.path,
        item.parent_dir()
    )
    .to_lowercase()
}

/// Sum of non-overlapping substring occurrences of each token in `haystack`
pub fn base_overlap<T: AsRef<str>>(tokens: &[T], haystack: &str) -> f64 {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|t| !t.is_empty())
        .map(|t| haystack.matches(t).count() as f64)
        .sum()
}

/// Modification time from the item, else from filesystem metadata
pub fn item_mtime(item: &Item) -> Option<f64> {
    if let Some(mtime) = item.mtime.filter(|m| m.is_finite()) {
        return Some(mtime);
    }
    let modified = std::fs::metadata(item.path_str()).ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(since_epoch.as_secs_f64())
}

/// `1 + weight · exp(-days / decay)`; neutral when the mtime is unknown
pub fn freshness_boost(mtime: Option<f64>, now: f64, config: &ScoringConfig) -> f64 {
    match mtime {
        Some(mtime) => {
            let days = ((now - mtime) / SECS_PER_DAY).max(0.0);
            1.0 + config.freshness_weight * (-days / config.freshness_decay_days).exp()
        }
        None => 1.0,
    }
}

/// `1 / (1 + max(0, separators - allowance) · step)`
pub fn depth_penalty(path: &str, config: &ScoringConfig) -> f64 {
    let depth = path.chars().filter(|c| matches!(c, '/' | '\\')).count();
    let excess = depth.saturating_sub(config.depth_allowance) as f64;
    1.0 / (1.0 + excess * config.depth_step)
}

/// Bonus when the item's extension appears literally among `tokens`
pub fn extension_bonus<T: AsRef<str>>(
    ext: Option<&str>,
    tokens: &[T],
    config: &ScoringConfig,
) -> f64 {
    let Some(ext) = ext.filter(|e| !e.is_empty()) else {
        return 1.0;
    };
    if !tokens.iter().any(|t| t.as_ref() == ext) {
        return 1.0;
    }
    config
        .extension_hints
        .get(ext)
        .copied()
        .unwrap_or(config.default_extension_bonus)
}
