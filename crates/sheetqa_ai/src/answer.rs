use serde::{Deserialize, Serialize};

use crate::prompt::Source;
use crate::store::RetrievedPassage;

/// Placeholder shown when the completion succeeds but comes back blank.
/// Raw emptiness must never reach the end user.
pub const EMPTY_ANSWER_PLACEHOLDER: &str =
    "The model returned no answer for this question. Try rephrasing it.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub spreadsheet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_title: Option<String>,
    pub url: String,
    pub sheet_name: String,
    pub a1_range: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    /// 1-based ordinal matching the `[n]` markers in the answer text.
    pub source: u32,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub a1_range: String,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub evidence: Vec<Evidence>,
}

/// External URL for a passage: deep link to the tab when the crawler kept
/// its gid, else the base document URL.
fn resolve_url(passage: &RetrievedPassage) -> String {
    let base = format!(
        "https://docs.google.com/spreadsheets/d/{}",
        passage.spreadsheet_id
    );
    match &passage.metadata.gid {
        Some(gid) => format!("{base}/edit#gid={gid}"),
        None => base,
    }
}

/// Project the completion text and the exact source set shown to the model
/// into the final answer. Citations and evidence are built from the same
/// list in the same order, so position i in both always refers to the
/// passage the answer cites as `[i+1]`.
pub fn shape(completion: &str, sources: &[Source]) -> AskResponse {
    let text = completion.trim();
    let answer = if text.is_empty() {
        EMPTY_ANSWER_PLACEHOLDER.to_string()
    } else {
        text.to_string()
    };

    let citations = sources
        .iter()
        .map(|s| Citation {
            spreadsheet_id: s.passage.spreadsheet_id.clone(),
            spreadsheet_title: s.passage.metadata.spreadsheet_title.clone(),
            url: resolve_url(&s.passage),
            sheet_name: s.passage.sheet_name.clone(),
            a1_range: s.passage.a1_range.clone(),
            similarity: s.passage.similarity,
        })
        .collect();

    let evidence = sources
        .iter()
        .enumerate()
        .map(|(i, s)| Evidence {
            source: (i + 1) as u32,
            spreadsheet_id: s.passage.spreadsheet_id.clone(),
            sheet_name: s.passage.sheet_name.clone(),
            a1_range: s.passage.a1_range.clone(),
            preview: s.snippet.clone(),
        })
        .collect();

    AskResponse {
        answer,
        citations,
        evidence,
    }
}
