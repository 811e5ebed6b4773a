use std::cell::Cell;

use sheetqa_ai::ask::{ask, AskRequest, Pipeline};
use sheetqa_ai::embeddings::Embedder;
use sheetqa_ai::introspect::answer_index_question;
use sheetqa_ai::llm::{ChatModel, ChatTurn};
use sheetqa_ai::store::{IndexCatalog, PassageSearch, RetrievedPassage};
use sheetqa_core::domain::{CrawlStatus, IndexRecord};
use sheetqa_core::error::AppError;

struct PanickingEmbedder;

impl Embedder for PanickingEmbedder {
    fn embed(&self, _model: &str, _input: &str) -> Result<Vec<f32>, AppError> {
        panic!("embedder must not be called for index questions");
    }
}

struct CountingSearch {
    calls: Cell<u32>,
}

impl PassageSearch for CountingSearch {
    fn search(
        &self,
        _query: &[f32],
        _width: u32,
        _spreadsheet_id: Option<&str>,
    ) -> Result<Vec<RetrievedPassage>, AppError> {
        self.calls.set(self.calls.get() + 1);
        Ok(Vec::new())
    }
}

struct PanickingChat;

impl ChatModel for PanickingChat {
    fn complete(&self, _model: &str, _messages: &[ChatTurn]) -> Result<String, AppError> {
        panic!("chat model must not be called for index questions");
    }
}

struct StaticCatalog(Vec<IndexRecord>);

impl IndexCatalog for StaticCatalog {
    fn list_documents(&self, spreadsheet_id: Option<&str>) -> Result<Vec<IndexRecord>, AppError> {
        Ok(match spreadsheet_id {
            Some(id) => self
                .0
                .iter()
                .filter(|r| r.spreadsheet_id == id)
                .cloned()
                .collect(),
            None => self.0.clone(),
        })
    }
}

fn record(id: &str, status: CrawlStatus) -> IndexRecord {
    IndexRecord {
        spreadsheet_id: id.to_string(),
        title: Some(format!("Sheet {id}")),
        status,
        sheet_count: Some(3),
        updated_at: Some("2026-08-01T00:00:00Z".to_string()),
    }
}

#[test]
fn index_question_bypasses_retriever_entirely() {
    let search = CountingSearch {
        calls: Cell::new(0),
    };
    let catalog = StaticCatalog(vec![
        record("doc1", CrawlStatus::Indexed),
        record("doc2", CrawlStatus::Pending),
    ]);
    let pipeline = Pipeline::new(
        &PanickingEmbedder,
        &search,
        &catalog,
        &PanickingChat,
        "embed",
        "chat",
    );

    let resp = ask(
        &pipeline,
        &AskRequest {
            question: Some("how many sheets are indexed?".to_string()),
            ..Default::default()
        },
    )
    .expect("ask");

    assert_eq!(search.calls.get(), 0);
    assert!(resp.citations.is_empty());
    assert!(resp.answer.contains("2 spreadsheets tracked"));
}

#[test]
fn status_summary_counts_every_bucket() {
    let catalog = StaticCatalog(vec![
        record("a", CrawlStatus::Indexed),
        record("b", CrawlStatus::Indexed),
        record("c", CrawlStatus::Indexed),
        record("d", CrawlStatus::Pending),
        record("e", CrawlStatus::InProgress),
        record("f", CrawlStatus::Error),
    ]);

    let resp = answer_index_question(&catalog, None).expect("answer");
    assert!(resp.answer.contains("6 spreadsheets tracked"));
    assert!(resp.answer.contains("Indexed 3, pending 1, in progress 1, errors 1."));
    // Largest bucket listed first.
    let by_status = resp.answer.find("By status: indexed: 3").expect("ordering");
    assert!(by_status > 0);
}

#[test]
fn evidence_is_synthesized_per_record_and_capped() {
    let records: Vec<IndexRecord> = (0..30)
        .map(|i| record(&format!("doc{i:02}"), CrawlStatus::Indexed))
        .collect();
    let catalog = StaticCatalog(records);

    let resp = answer_index_question(&catalog, None).expect("answer");
    assert!(resp.citations.is_empty());
    assert_eq!(resp.evidence.len(), 20);
    assert_eq!(resp.evidence[0].source, 1);
    assert_eq!(resp.evidence[19].source, 20);
    assert!(resp.evidence[0].preview.contains("status=indexed"));
}

#[test]
fn filter_narrows_the_summary_to_one_document() {
    let catalog = StaticCatalog(vec![
        record("doc1", CrawlStatus::Indexed),
        record("doc2", CrawlStatus::Error),
    ]);

    let resp = answer_index_question(&catalog, Some("doc2")).expect("answer");
    assert!(resp.answer.contains("1 spreadsheets tracked"));
    assert_eq!(resp.evidence.len(), 1);
    assert_eq!(resp.evidence[0].spreadsheet_id, "doc2");
}

#[test]
fn catalog_failure_propagates() {
    struct FailingCatalog;

    impl IndexCatalog for FailingCatalog {
        fn list_documents(
            &self,
            _spreadsheet_id: Option<&str>,
        ) -> Result<Vec<IndexRecord>, AppError> {
            Err(AppError::new("QA_CATALOG_FAILED", "catalog unavailable"))
        }
    }

    let err = answer_index_question(&FailingCatalog, None).expect_err("must fail");
    assert_eq!(err.code, "QA_CATALOG_FAILED");
}
