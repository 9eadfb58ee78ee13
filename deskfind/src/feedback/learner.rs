//! Turning accept/reject outcomes into stored bias

use super::FeedbackStore;
use crate::error::Result;
use crate::item::Item;
use crate::tokenizer::tokenize;

/// Record an outcome for `item` under `query`.
///
/// Marks the item's feedback key and every token of the raw (unexpanded)
/// query. Both writes are persisted before this returns.
pub fn learn<S: FeedbackStore + ?Sized>(
    store: &S,
    query: &str,
    item: &Item,
    positive: bool,
) -> Result<()> {
    let tokens = tokenize(query);
    store.mark_item(item.feedback_key(), positive)?;
    store.mark_tokens(&tokens, positive)?;
    tracing::debug!(
        "Recorded {} feedback for '{}' ({} query tokens)",
        if positive { "positive" } else { "negative" },
        item.feedback_key(),
        tokens.len()
    );
    Ok(())
}

/// The user accepted `item` for `query`
pub fn learn_positive<S: FeedbackStore + ?Sized>(
    store: &S,
    query: &str,
    item: &Item,
) -> Result<()> {
    learn(store, query, item, true)
}

/// The user rejected `item` for `query`, or opening it failed
pub fn learn_negative<S: FeedbackStore + ?Sized>(
    store: &S,
    query: &str,
    item: &Item,
) -> Result<()> {
    learn(store, query, item, false)
}
