use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sheetqa_core::domain::IndexRecord;
use sheetqa_core::error::AppError;

pub mod http;

/// Optional locator fields the crawler attaches to a passage. Modeled as
/// typed optionals so absence is handled explicitly instead of leaking
/// nulls into URL construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassageMetadata {
    pub spreadsheet_title: Option<String>,
    pub gid: Option<String>,
}

/// One excerpt of indexed spreadsheet content, as returned by the ranked
/// retrieval function. The (spreadsheet_id, sheet_name, a1_range) triple
/// names the logical excerpt; read-only after retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedPassage {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub a1_range: String,
    pub text: String,
    pub similarity: f32,
    #[serde(default)]
    pub metadata: PassageMetadata,
}

impl RetrievedPassage {
    /// Stable dedup key over the identity triple. Field values are length
    /// prefixed before hashing so no two triples can collide by
    /// concatenation.
    pub fn key(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [&self.spreadsheet_id, &self.sheet_name, &self.a1_range] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        hex::encode(&hasher.finalize()[..16])
    }
}

/// Black-box ranked retrieval over the vector store.
pub trait PassageSearch {
    fn search(
        &self,
        query: &[f32],
        width: u32,
        spreadsheet_id: Option<&str>,
    ) -> Result<Vec<RetrievedPassage>, AppError>;
}

/// Read-only view of the crawler's per-spreadsheet catalog.
pub trait IndexCatalog {
    fn list_documents(&self, spreadsheet_id: Option<&str>) -> Result<Vec<IndexRecord>, AppError>;
}
