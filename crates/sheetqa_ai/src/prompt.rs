use sheetqa_core::domain::{ConversationTurn, Role};

use crate::llm::ChatTurn;
use crate::query::HISTORY_WINDOW;
use crate::store::RetrievedPassage;

/// One passage actually shown to the model: the ranked passage plus its
/// extracted snippet. Citations and evidence are both projected from this
/// same set, in this same order.
#[derive(Debug, Clone)]
pub struct Source {
    pub passage: RetrievedPassage,
    pub snippet: String,
}

/// Exact sentence the model must emit when the sources lack the answer.
/// The answer shaper and tests key off this text.
pub const NOT_FOUND_SENTENCE: &str =
    "I could not find that in the indexed sheets.";

fn system_instruction() -> String {
    format!(
        "You answer questions about indexed spreadsheets.\n\
Rules:\n\
1) Answer ONLY from the numbered Sources provided in the final message. Do not use outside knowledge.\n\
2) Cite every claim with a bracketed source number matching the source's position, e.g. [1] or [2].\n\
3) Quote identifiers, names, dates and amounts exactly as they appear in the sources; do not paraphrase values.\n\
4) Conversation history is context for what is being asked; facts must come only from the Sources.\n\
5) If the sources do not contain the answer, reply exactly: \"{NOT_FOUND_SENTENCE}\""
    )
}

fn source_label(passage: &RetrievedPassage) -> String {
    passage
        .metadata
        .spreadsheet_title
        .clone()
        .unwrap_or_else(|| passage.spreadsheet_id.clone())
}

fn render_sources(sources: &[Source]) -> String {
    let mut out = String::from("Sources:\n");
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format!(
            "[{}] {} - {}!{}\n{}\n\n",
            i + 1,
            source_label(&source.passage),
            source.passage.sheet_name,
            source.passage.a1_range,
            source.snippet
        ));
    }
    out.push_str("Answer the question above using only these sources.");
    out
}

/// Compose the full message sequence: system instruction, a bounded window
/// of history, the current question, and the rendered sources last so the
/// model grounds the question it just saw. The source numbering here is the
/// single source of truth for what `[n]` means downstream.
pub fn build_messages(
    history: &[ConversationTurn],
    question: &str,
    sources: &[Source],
) -> Vec<ChatTurn> {
    let mut messages = vec![ChatTurn::system(system_instruction())];

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[start..] {
        messages.push(match turn.role {
            Role::User => ChatTurn::user(turn.content.clone()),
            Role::Assistant => ChatTurn::assistant(turn.content.clone()),
        });
    }

    messages.push(ChatTurn::user(format!("Question: {question}")));
    messages.push(ChatTurn::user(render_sources(sources)));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PassageMetadata, RetrievedPassage};

    fn source(id: &str, title: Option<&str>) -> Source {
        Source {
            passage: RetrievedPassage {
                spreadsheet_id: id.to_string(),
                sheet_name: "Roster".to_string(),
                a1_range: "A1:D20".to_string(),
                text: "Dana | Lead".to_string(),
                similarity: 0.9,
                metadata: PassageMetadata {
                    spreadsheet_title: title.map(str::to_string),
                    gid: None,
                },
            },
            snippet: "Dana | Lead".to_string(),
        }
    }

    #[test]
    fn system_instruction_pins_the_fallback_sentence() {
        let msgs = build_messages(&[], "q", &[]);
        assert_eq!(msgs[0].role, "system");
        assert!(msgs[0].content.contains(NOT_FOUND_SENTENCE));
    }

    #[test]
    fn sources_message_is_last_and_numbered() {
        let msgs = build_messages(&[], "who leads?", &[source("doc1", Some("Crew Roster"))]);
        let last = &msgs[msgs.len() - 1];
        assert_eq!(last.role, "user");
        assert!(last.content.contains("[1] Crew Roster - Roster!A1:D20"));
    }

    #[test]
    fn label_falls_back_to_spreadsheet_id() {
        let msgs = build_messages(&[], "who leads?", &[source("doc1", None)]);
        assert!(msgs[msgs.len() - 1].content.contains("[1] doc1 -"));
    }

    #[test]
    fn history_is_windowed() {
        let history: Vec<ConversationTurn> = (0..12)
            .map(|i| ConversationTurn {
                role: Role::User,
                content: format!("turn {i}"),
            })
            .collect();
        let msgs = build_messages(&history, "q", &[]);
        // system + 8 history + question + sources
        assert_eq!(msgs.len(), 11);
        assert_eq!(msgs[1].content, "turn 4");
    }
}
