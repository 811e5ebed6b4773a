use serde::{Deserialize, Serialize};
use sheetqa_core::domain::IndexRecord;
use sheetqa_core::error::AppError;

use super::{IndexCatalog, PassageMetadata, PassageSearch, RetrievedPassage};

/// Vector-store client speaking to a PostgREST-style endpoint: ranked
/// retrieval is a stored procedure, the catalog is a plain table read.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: String,
    service_key: String,
}

impl HttpStore {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            return Err(AppError::new(
                "QA_CLIENT_CONFIG",
                "Store base URL must be http(s)",
            )
            .with_details(format!("base_url={base_url}")));
        }
        if service_key.trim().is_empty() {
            return Err(AppError::new(
                "QA_CLIENT_CONFIG",
                "Store service key must not be empty",
            ));
        }

        Ok(Self {
            base_url,
            service_key: service_key.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: u32,
    filter_spreadsheet_id: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
struct MatchRow {
    spreadsheet_id: String,
    sheet_name: String,
    a1_range: String,
    content: String,
    similarity: f32,
    spreadsheet_title: Option<String>,
    gid: Option<String>,
}

impl PassageSearch for HttpStore {
    fn search(
        &self,
        query: &[f32],
        width: u32,
        spreadsheet_id: Option<&str>,
    ) -> Result<Vec<RetrievedPassage>, AppError> {
        let url = format!("{}/rest/v1/rpc/match_sheet_chunks", self.base_url);
        let req = MatchRequest {
            query_embedding: query,
            match_count: width,
            filter_spreadsheet_id: spreadsheet_id,
        };

        let resp = ureq::post(&url)
            .timeout(std::time::Duration::from_secs(15))
            .set("apikey", &self.service_key)
            .set("Authorization", &format!("Bearer {}", self.service_key))
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("QA_SEARCH_FAILED", "Failed to encode search request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let rows: Vec<MatchRow> = r.into_json().map_err(|e| {
                    AppError::new("QA_SEARCH_FAILED", "Failed to decode search response")
                        .with_details(e.to_string())
                })?;
                // Zero rows is an expected outcome, not a failure.
                Ok(rows
                    .into_iter()
                    .map(|row| RetrievedPassage {
                        spreadsheet_id: row.spreadsheet_id,
                        sheet_name: row.sheet_name,
                        a1_range: row.a1_range,
                        text: row.content,
                        similarity: row.similarity,
                        metadata: PassageMetadata {
                            spreadsheet_title: row.spreadsheet_title,
                            gid: row.gid,
                        },
                    })
                    .collect())
            }
            Ok(r) => Err(AppError::new("QA_SEARCH_FAILED", "Search request failed")
                .with_details(format!("status={}", r.status()))),
            Err(e) => Err(
                AppError::new("QA_SEARCH_FAILED", "Failed to call search endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}

/// Query parameters for the catalog read. The filter value is handed to
/// ureq's query builder, which percent-encodes it; the caller-supplied id
/// must never be spliced into the URL raw.
fn catalog_query(spreadsheet_id: Option<&str>) -> Vec<(&'static str, String)> {
    let mut pairs = vec![(
        "select",
        "spreadsheet_id,title,status,sheet_count,updated_at".to_string(),
    )];
    if let Some(id) = spreadsheet_id {
        pairs.push(("spreadsheet_id", format!("eq.{id}")));
    }
    pairs
}

impl IndexCatalog for HttpStore {
    fn list_documents(&self, spreadsheet_id: Option<&str>) -> Result<Vec<IndexRecord>, AppError> {
        let url = format!("{}/rest/v1/sheets", self.base_url);
        let mut req = ureq::get(&url)
            .timeout(std::time::Duration::from_secs(15))
            .set("apikey", &self.service_key)
            .set("Authorization", &format!("Bearer {}", self.service_key));
        for (name, value) in catalog_query(spreadsheet_id) {
            req = req.query(name, &value);
        }
        let resp = req.call();

        match resp {
            Ok(r) if r.status() == 200 => r.into_json().map_err(|e| {
                AppError::new("QA_CATALOG_FAILED", "Failed to decode catalog response")
                    .with_details(e.to_string())
            }),
            Ok(r) => Err(AppError::new("QA_CATALOG_FAILED", "Catalog request failed")
                .with_details(format!("status={}", r.status()))),
            Err(e) => Err(
                AppError::new("QA_CATALOG_FAILED", "Failed to call catalog endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_filter_stays_a_query_parameter() {
        let pairs = catalog_query(Some("doc&x#y z"));
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, "spreadsheet_id");
        // The id is carried verbatim in the pair; encoding happens in the
        // query builder, never by splicing into the URL string.
        assert_eq!(pairs[1].1, "eq.doc&x#y z");

        let pairs = catalog_query(None);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "select");
    }
}

