//! Ranking and the search/learn facade

use crate::error::Result;
use crate::feedback::{self, FeedbackSnapshot, FeedbackStore};
use crate::item::Item;
use crate::opener::Opener;
use crate::scoring::{ScoreBreakdown, Scorer, ScoringConfig};
use crate::synonyms::SynonymTable;
use crate::tokenizer::tokenize;

/// Search options
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of results
    pub limit: usize,
    /// Attach a per-factor breakdown to every result
    pub explain: bool,
    /// Reference time for freshness (seconds since epoch); defaults to now
    pub now: Option<f64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            limit: 10,
            explain: false,
            now: None,
        }
    }
}

impl SearchOptions {
    /// Options returning at most `limit` results
    pub fn with_limit(limit: usize) -> Self {
        SearchOptions {
            limit,
            ..Default::default()
        }
    }
}

/// Search result
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SearchResult {
    /// Relevance score (not comparable across queries)
    pub score: f64,
    /// The matched item
    pub item: Item,
    /// Score factors, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

/// Rank `items` for `query` against a fixed feedback snapshot.
///
/// Items without base overlap are dropped; the rest are stably sorted by
/// descending score, so equal scores keep their input order.
pub fn rank(
    query: &str,
    items: &[Item],
    snapshot: &FeedbackSnapshot,
    synonyms: &SynonymTable,
    scoring: &ScoringConfig,
    options: &SearchOptions,
) -> Vec<SearchResult> {
    if options.limit == 0 {
        return Vec::new();
    }

    let tokens = synonyms.query_tokens(query);
    if tokens.is_empty() {
        return Vec::new();
    }
    let literal_tokens = tokenize(query);
    let now = options.now.unwrap_or_else(crate::now_epoch_secs);
    let scorer = Scorer::new(scoring, snapshot, &tokens, &literal_tokens, now);

    let mut results: Vec<SearchResult> = items
        .iter()
        .filter_map(|item| {
            let breakdown = scorer.breakdown(item)?;
            Some(SearchResult {
                score: breakdown.total,
                item: item.clone(),
                breakdown: options.explain.then_some(breakdown),
            })
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(options.limit);
    results
}

/// Searcher over caller-supplied items
pub struct Searcher<'a, S: FeedbackStore + ?Sized> {
    store: &'a S,
    synonyms: &'a SynonymTable,
    scoring: &'a ScoringConfig,
}

impl<'a, S: FeedbackStore + ?Sized> Searcher<'a, S> {
    /// Create a new searcher
    pub fn new(store: &'a S, synonyms: &'a SynonymTable, scoring: &'a ScoringConfig) -> Self {
        Searcher {
            store,
            synonyms,
            scoring,
        }
    }

    /// Search `items`, taking one feedback snapshot for the whole ranking
    pub fn search(
        &self,
        query: &str,
        items: &[Item],
        options: &SearchOptions,
    ) -> Vec<SearchResult> {
        let snapshot = self.store.snapshot();
        let results = rank(query, items, &snapshot, self.synonyms, self.scoring, options);
        tracing::debug!(
            "Query '{}' matched {} of {} items",
            query,
            results.len(),
            items.len()
        );
        results
    }
}

/// Item collection, feedback store and ranking settings in one handle.
///
/// This is the surface the CLI uses: `search`, then `learn_positive` or
/// `learn_negative` once the user has acted on a result.
pub struct Engine<S: FeedbackStore> {
    items: Vec<Item>,
    store: S,
    synonyms: SynonymTable,
    scoring: ScoringConfig,
}

impl<S: FeedbackStore> Engine<S> {
    /// Engine with the default synonym table and scoring constants
    pub fn new(items: Vec<Item>, store: S) -> Self {
        Engine {
            items,
            store,
            synonyms: SynonymTable::default(),
            scoring: ScoringConfig::default(),
        }
    }

    /// Replace the synonym table
    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Replace the scoring constants
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Items searched by [`Engine::search`]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Underlying feedback store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Top `top_k` results for `query` over the engine's items
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        self.search_with(query, &SearchOptions::with_limit(top_k))
    }

    /// Search the engine's items with explicit options
    pub fn search_with(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        self.searcher().search(query, &self.items, options)
    }

    /// Search a caller-supplied collection instead of the engine's items
    pub fn search_items(&self, query: &str, items: &[Item], top_k: usize) -> Vec<SearchResult> {
        self.searcher()
            .search(query, items, &SearchOptions::with_limit(top_k))
    }

    /// Record that `item` was the right answer for `query`
    pub fn learn_positive(&self, query: &str, item: &Item) -> Result<()> {
        feedback::learn_positive(&self.store, query, item)
    }

    /// Record that `item` was the wrong answer for `query`
    pub fn learn_negative(&self, query: &str, item: &Item) -> Result<()> {
        feedback::learn_negative(&self.store, query, item)
    }

    /// Open `item` and learn from the outcome.
    ///
    /// A successful open of a non-empty target is positive feedback;
    /// anything else is negative. Returns whether the open succeeded.
    pub fn open(&self, opener: &dyn Opener, query: &str, item: &Item) -> Result<bool> {
        let target = item.path_str();
        let opened = opener.run_action(&item.action, target);
        if opened && !target.is_empty() {
            self.learn_positive(query, item)?;
        } else {
            self.learn_negative(query, item)?;
        }
        Ok(opened)
    }

    fn searcher(&self) -> Searcher<'_, S> {
        Searcher::new(&self.store, &self.synonyms, &self.scoring)
    }
}
