use sheetqa_core::domain::{ConversationTurn, Role};

/// Trailing conversation window used for both query enrichment and the
/// prompt's history section.
pub const HISTORY_WINDOW: usize = 8;

/// Fixed framing so short follow-ups ("what about her?") still embed near
/// the spreadsheet rows they refer to.
const DOMAIN_PREAMBLE: &str = "Search query over indexed spreadsheets containing people, teams, \
projects, dates, locations, amounts and status fields.";

/// The question to answer: content of the most recent user turn, else the
/// caller's single-question fallback. Blank strings count as absent.
pub fn current_question<'a>(
    messages: &'a [ConversationTurn],
    fallback: Option<&'a str>,
) -> Option<&'a str> {
    let from_turns = messages
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| t.content.trim())
        .filter(|s| !s.is_empty());
    from_turns.or_else(|| fallback.map(str::trim).filter(|s| !s.is_empty()))
}

/// Synthetic query combining the domain preamble, a bounded trailing window
/// of the conversation and the current question. Improves recall for
/// context-dependent follow-ups without an extra model call.
pub fn enriched_query(messages: &[ConversationTurn], question: &str) -> String {
    let mut out = String::from(DOMAIN_PREAMBLE);
    out.push('\n');

    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    for turn in &messages[start..] {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        out.push_str(role);
        out.push_str(": ");
        out.push_str(turn.content.trim());
        out.push('\n');
    }

    out.push_str("question: ");
    out.push_str(question);
    out
}

/// Dual-query formulation: the enriched query for contextual recall plus
/// the raw question as a literal keyword anchor (enriched queries can drift
/// from exact term matches).
pub fn retrieval_queries(messages: &[ConversationTurn], question: &str) -> Vec<String> {
    vec![enriched_query(messages, question), question.to_string()]
}
