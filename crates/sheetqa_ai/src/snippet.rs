use crate::retrieve::rerank;

/// Default character budget for one evidence snippet.
pub const DEFAULT_BUDGET: usize = 700;

const TRUNCATION_MARKER: &str = " …";
const HEADER_SCAN_LINES: usize = 12;
const MAX_HIT_BLOCKS: usize = 5;
const FALLBACK_LINES: usize = 30;

fn looks_like_header(line: &str) -> bool {
    line.contains('|') || line.to_lowercase().starts_with("headers:")
}

/// Condense one passage into a keyword-focused excerpt for both the model
/// prompt and the user-facing evidence preview. Pure function.
///
/// Header-looking lines near the top are kept so table structure survives
/// even when the matching content sits far below; keyword hit lines carry
/// one line of context on each side, capped at a fixed number of blocks.
pub fn extract(text: &str, question: &str, max_chars: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let kws = rerank::keywords(question);

    let mut picked: Vec<&str> = Vec::new();

    for line in lines.iter().take(HEADER_SCAN_LINES).copied() {
        if looks_like_header(line) {
            picked.push(line);
        }
    }

    let mut blocks = 0usize;
    let mut i = 0usize;
    while i < lines.len() && blocks < MAX_HIT_BLOCKS {
        if rerank::keyword_hits(lines[i], &kws) > 0 {
            let start = i.saturating_sub(1);
            let end = (i + 1).min(lines.len() - 1);
            for line in lines[start..=end].iter().copied() {
                picked.push(line);
            }
            blocks += 1;
            // Skip past the context we just took so overlapping hits do not
            // emit the same block twice.
            i = end + 1;
        } else {
            i += 1;
        }
    }

    if blocks == 0 {
        // No lexical overlap at all; the match was purely semantic. Fall
        // back to the top of the passage so evidence is never empty.
        picked = lines.iter().take(FALLBACK_LINES).copied().collect();
    }

    // Header and hit windows often overlap; collapse adjacent repeats.
    let mut deduped: Vec<&str> = Vec::new();
    for line in picked {
        if deduped.last() != Some(&line) {
            deduped.push(line);
        }
    }

    truncate_chars(&deduped.join("\n"), max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}
