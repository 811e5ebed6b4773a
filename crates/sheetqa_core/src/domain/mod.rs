use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation. The caller sends the full history on every
/// request; nothing is persisted between requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Crawl state of one spreadsheet in the index catalog. Unknown upstream
/// values must not fail the request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    Indexed,
    Pending,
    InProgress,
    Error,
    #[serde(other)]
    Unknown,
}

impl CrawlStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CrawlStatus::Indexed => "indexed",
            CrawlStatus::Pending => "pending",
            CrawlStatus::InProgress => "in_progress",
            CrawlStatus::Error => "error",
            CrawlStatus::Unknown => "unknown",
        }
    }
}

/// Per-spreadsheet catalog entry written by the crawler. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexRecord {
    pub spreadsheet_id: String,
    pub title: Option<String>,
    pub status: CrawlStatus,
    pub sheet_count: Option<u32>,
    pub updated_at: Option<String>,
}
