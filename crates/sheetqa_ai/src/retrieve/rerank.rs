use crate::store::RetrievedPassage;

/// Per-keyword-hit score bonus and its ceiling. The ceiling keeps lexical
/// overlap from outranking a clearly better semantic match.
const PER_HIT_BONUS: f32 = 0.02;
const MAX_BONUS_HITS: usize = 6;

/// Filler words that match almost every passage in this domain.
const STOPLIST: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "with", "from", "that", "this", "have", "has",
    "what", "who", "where", "when", "which", "how", "does", "about", "sheet", "sheets",
    "spreadsheet", "spreadsheets", "row", "rows", "column", "columns", "cell", "value",
];

/// Candidate surviving dedup, annotated with its combined rerank score.
#[derive(Debug, Clone)]
pub struct RankedPassage {
    pub passage: RetrievedPassage,
    pub combined: f32,
}

/// Lowercased question tokens of length >= 3, stoplist removed, deduped in
/// first-seen order.
pub fn keywords(question: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in question
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3)
    {
        let token = token.to_lowercase();
        if STOPLIST.contains(&token.as_str()) {
            continue;
        }
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

pub(crate) fn keyword_hits(text: &str, keywords: &[String]) -> usize {
    if keywords.is_empty() {
        return 0;
    }
    let lower = text.to_lowercase();
    keywords.iter().filter(|k| lower.contains(k.as_str())).count()
}

/// Cheap local rerank standing in for a second-stage semantic reranker:
/// base similarity plus a bounded lexical-overlap bonus, sorted descending.
/// Ties break by raw similarity, then by passage key for a stable order.
pub fn rank(candidates: Vec<RetrievedPassage>, question: &str) -> Vec<RankedPassage> {
    let kws = keywords(question);

    let mut ranked: Vec<RankedPassage> = candidates
        .into_iter()
        .map(|passage| {
            let hits = keyword_hits(&passage.text, &kws).min(MAX_BONUS_HITS);
            let combined = passage.similarity + hits as f32 * PER_HIT_BONUS;
            RankedPassage { passage, combined }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.combined
            .partial_cmp(&a.combined)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.passage
                    .similarity
                    .partial_cmp(&a.passage.similarity)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then_with(|| a.passage.key().cmp(&b.passage.key()))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PassageMetadata;

    fn passage(id: &str, text: &str, similarity: f32) -> RetrievedPassage {
        RetrievedPassage {
            spreadsheet_id: id.to_string(),
            sheet_name: "Roster".to_string(),
            a1_range: "A1:D20".to_string(),
            text: text.to_string(),
            similarity,
            metadata: PassageMetadata::default(),
        }
    }

    #[test]
    fn keywords_drop_short_and_stoplisted_tokens() {
        let kws = keywords("Who is the lead on the Austin spreadsheet?");
        assert_eq!(kws, vec!["lead", "austin"]);
    }

    #[test]
    fn lexical_bonus_is_capped() {
        // Ten distinct keyword hits, but only MAX_BONUS_HITS count.
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let stuffed = passage("doc1", text, 0.50);
        let better = passage("doc2", "unrelated numbers", 0.70);
        let ranked = rank(
            vec![stuffed, better],
            "alpha beta gamma delta epsilon zeta eta theta iota kappa",
        );
        // 0.50 + 6 * 0.02 = 0.62 < 0.70: semantics still wins.
        assert_eq!(ranked[0].passage.spreadsheet_id, "doc2");
        assert!((ranked[1].combined - 0.62).abs() < 1e-6);
    }

    #[test]
    fn rank_is_deterministic_across_calls() {
        let ps = vec![
            passage("doc1", "crew lead Dana", 0.8),
            passage("doc2", "crew lead Omar", 0.8),
            passage("doc3", "budget totals", 0.8),
        ];
        let a: Vec<String> = rank(ps.clone(), "crew lead")
            .into_iter()
            .map(|r| r.passage.spreadsheet_id)
            .collect();
        let b: Vec<String> = rank(ps, "crew lead")
            .into_iter()
            .map(|r| r.passage.spreadsheet_id)
            .collect();
        assert_eq!(a, b);
    }
}
