use std::collections::BTreeMap;

use sheetqa_core::domain::{CrawlStatus, IndexRecord};
use sheetqa_core::error::AppError;

use crate::answer::{AskResponse, Evidence};
use crate::store::IndexCatalog;

/// Upper bound on synthesized evidence entries for a status answer.
const MAX_INTROSPECTION_EVIDENCE: usize = 20;

/// Phrases that mark a question as being about the index itself rather
/// than spreadsheet content. Deliberately narrow: a false negative falls
/// through to normal retrieval, which is safe; a false positive replaces a
/// content answer with a status summary.
const INDEX_PHRASES: &[&str] = &[
    "indexed",
    "index status",
    "crawl",
    "crawled",
    "crawling",
    "re-index",
    "reindex",
    "how many sheets",
    "how many spreadsheets",
    "which spreadsheets",
    "pending sheets",
    "index errors",
    "index coverage",
];

/// Heuristic route classifier. Kept as a plain predicate so it can be
/// swapped for a semantic classifier without touching the pipeline.
pub fn is_index_question(question: &str) -> bool {
    let q = question.to_lowercase();
    INDEX_PHRASES.iter().any(|p| q.contains(p))
}

fn record_line(record: &IndexRecord) -> String {
    let title = record
        .title
        .as_deref()
        .unwrap_or(record.spreadsheet_id.as_str());
    let mut line = format!("{} - status={}", title, record.status.label());
    if let Some(n) = record.sheet_count {
        line.push_str(&format!("; sheets={n}"));
    }
    if let Some(ts) = &record.updated_at {
        line.push_str(&format!("; updated={ts}"));
    }
    line
}

/// Answer a coverage/status question straight from the catalog, bypassing
/// semantic retrieval. Citations stay empty: these answers are not sourced
/// from spreadsheet content and must not claim content citations.
pub fn answer_index_question(
    catalog: &dyn IndexCatalog,
    spreadsheet_id: Option<&str>,
) -> Result<AskResponse, AppError> {
    let mut records = catalog.list_documents(spreadsheet_id)?;
    records.sort_by(|a, b| a.spreadsheet_id.cmp(&b.spreadsheet_id));

    let mut by_status: BTreeMap<&'static str, u32> = BTreeMap::new();
    for record in &records {
        *by_status.entry(record.status.label()).or_default() += 1;
    }

    // Per-status counts, largest bucket first, name as the tie-break.
    let mut buckets: Vec<(&str, u32)> = by_status.into_iter().collect();
    buckets.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let count_of = |status: CrawlStatus| {
        records.iter().filter(|r| r.status == status).count()
    };

    let mut answer = format!("{} spreadsheets tracked by the index.", records.len());
    if !buckets.is_empty() {
        let parts: Vec<String> = buckets
            .iter()
            .map(|(label, n)| format!("{label}: {n}"))
            .collect();
        answer.push_str(&format!(" By status: {}.", parts.join(", ")));
    }
    answer.push_str(&format!(
        " Indexed {}, pending {}, in progress {}, errors {}.",
        count_of(CrawlStatus::Indexed),
        count_of(CrawlStatus::Pending),
        count_of(CrawlStatus::InProgress),
        count_of(CrawlStatus::Error),
    ));

    let evidence = records
        .iter()
        .take(MAX_INTROSPECTION_EVIDENCE)
        .enumerate()
        .map(|(i, record)| Evidence {
            source: (i + 1) as u32,
            spreadsheet_id: record.spreadsheet_id.clone(),
            sheet_name: "(index catalog)".to_string(),
            a1_range: String::new(),
            preview: record_line(record),
        })
        .collect();

    Ok(AskResponse {
        answer,
        citations: Vec::new(),
        evidence,
    })
}
