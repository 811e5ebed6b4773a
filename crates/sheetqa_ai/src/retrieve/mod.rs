use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use sheetqa_core::error::AppError;

use crate::embeddings::Embedder;
use crate::store::{PassageSearch, RetrievedPassage};

pub mod rerank;

pub use rerank::RankedPassage;

/// Valid band for the caller's answer-window hint.
const TOP_K_MIN: u32 = 1;
const TOP_K_MAX: u32 = 12;
const TOP_K_DEFAULT: u32 = 6;

/// Band for the raw candidate width requested from the store. Wider than
/// the answer window so the reranker has material to work with.
const CANDIDATE_MIN: u32 = 10;
const CANDIDATE_MAX: u32 = 40;

pub fn clamp_top_k(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(TOP_K_DEFAULT)
        .clamp(TOP_K_MIN, TOP_K_MAX)
}

/// Recall-then-precision tiering: ask the store for roughly 3x the answer
/// window, clamped to a fixed band.
pub fn candidate_width(top_k: u32) -> u32 {
    (top_k * 3).clamp(CANDIDATE_MIN, CANDIDATE_MAX)
}

/// Embed each query and run the ranked retrieval, merging results into a
/// candidate set keyed by passage identity. On a key collision the higher
/// similarity wins; an exact tie keeps the first passage seen. Any failed
/// embed or search call fails the whole request.
pub fn gather_candidates(
    embedder: &dyn Embedder,
    search: &dyn PassageSearch,
    embed_model: &str,
    queries: &[String],
    width: u32,
    spreadsheet_id: Option<&str>,
) -> Result<Vec<RetrievedPassage>, AppError> {
    let mut candidates: BTreeMap<String, RetrievedPassage> = BTreeMap::new();

    for query in queries {
        let vector = embedder.embed(embed_model, query)?;
        let passages = search.search(&vector, width, spreadsheet_id)?;
        for passage in passages {
            match candidates.entry(passage.key()) {
                Entry::Vacant(slot) => {
                    slot.insert(passage);
                }
                // Strict comparison: an exact similarity tie keeps the
                // passage seen first.
                Entry::Occupied(mut slot) => {
                    if passage.similarity > slot.get().similarity {
                        slot.insert(passage);
                    }
                }
            }
        }
    }

    Ok(candidates.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_is_clamped_into_band() {
        assert_eq!(clamp_top_k(None), 6);
        assert_eq!(clamp_top_k(Some(0)), 1);
        assert_eq!(clamp_top_k(Some(1000)), 12);
        assert_eq!(clamp_top_k(Some(4)), 4);
    }

    #[test]
    fn candidate_width_is_tiered_and_clamped() {
        assert_eq!(candidate_width(1), 10);
        assert_eq!(candidate_width(6), 18);
        assert_eq!(candidate_width(12), 36);
    }
}
