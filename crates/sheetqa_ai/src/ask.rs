use serde::{Deserialize, Serialize};

use sheetqa_core::domain::ConversationTurn;
use sheetqa_core::error::AppError;

use crate::answer::{self, AskResponse};
use crate::embeddings::Embedder;
use crate::introspect;
use crate::llm::ChatModel;
use crate::prompt::{self, Source};
use crate::query;
use crate::retrieve;
use crate::snippet;
use crate::store::{IndexCatalog, PassageSearch};

/// Answer returned when the search succeeds but nothing relevant is
/// indexed. Empty results are an expected outcome, not a failure.
pub const NOT_FOUND_ANSWER: &str =
    "I could not find anything about that in the indexed sheets.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub messages: Option<Vec<ConversationTurn>>,
    /// Back-compat single-turn form.
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub filter_spreadsheet_id: Option<String>,
}

/// Collaborators and model names for one request. Everything else is
/// request-scoped; the pipeline holds no mutable state.
pub struct Pipeline<'a> {
    pub embedder: &'a dyn Embedder,
    pub search: &'a dyn PassageSearch,
    pub catalog: &'a dyn IndexCatalog,
    pub chat: &'a dyn ChatModel,
    pub embed_model: &'a str,
    pub chat_model: &'a str,
    /// Route classifier for coverage/status questions. Swappable; defaults
    /// to the keyword heuristic.
    pub classify: fn(&str) -> bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        search: &'a dyn PassageSearch,
        catalog: &'a dyn IndexCatalog,
        chat: &'a dyn ChatModel,
        embed_model: &'a str,
        chat_model: &'a str,
    ) -> Self {
        Self {
            embedder,
            search,
            catalog,
            chat,
            embed_model,
            chat_model,
            classify: introspect::is_index_question,
        }
    }
}

/// Run one question through the full pipeline: formulate queries, retrieve
/// and rerank candidates, extract snippets, prompt the model, and shape the
/// answer. Collaborator failures propagate; nothing is retried.
pub fn ask(pipeline: &Pipeline<'_>, request: &AskRequest) -> Result<AskResponse, AppError> {
    let messages = request.messages.as_deref().unwrap_or(&[]);
    let question = query::current_question(messages, request.question.as_deref())
        .ok_or_else(|| {
            AppError::new(
                "QA_MISSING_QUESTION",
                "Request contains no user question to answer",
            )
        })?
        .to_string();

    // Meta-questions about the index answer from the catalog and never
    // touch semantic retrieval.
    if (pipeline.classify)(&question) {
        return introspect::answer_index_question(
            pipeline.catalog,
            request.filter_spreadsheet_id.as_deref(),
        );
    }

    let top_k = retrieve::clamp_top_k(request.top_k);
    let width = retrieve::candidate_width(top_k);
    let queries = query::retrieval_queries(messages, &question);

    let candidates = retrieve::gather_candidates(
        pipeline.embedder,
        pipeline.search,
        pipeline.embed_model,
        &queries,
        width,
        request.filter_spreadsheet_id.as_deref(),
    )?;

    if candidates.is_empty() {
        return Ok(AskResponse {
            answer: NOT_FOUND_ANSWER.to_string(),
            citations: Vec::new(),
            evidence: Vec::new(),
        });
    }

    // Truncation to the answer window happens only after combined scoring.
    let mut ranked = retrieve::rerank::rank(candidates, &question);
    ranked.truncate(top_k as usize);

    let sources: Vec<Source> = ranked
        .into_iter()
        .map(|r| {
            let snippet = snippet::extract(&r.passage.text, &question, snippet::DEFAULT_BUDGET);
            Source {
                passage: r.passage,
                snippet,
            }
        })
        .collect();

    let chat_messages = prompt::build_messages(messages, &question, &sources);
    let completion = pipeline.chat.complete(pipeline.chat_model, &chat_messages)?;

    Ok(answer::shape(&completion, &sources))
}
