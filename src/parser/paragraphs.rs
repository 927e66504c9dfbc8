use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::element_text;

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

const LEAD_PARAGRAPHS: usize = 3;

/// Trimmed, non-empty paragraph texts under `container`, in document order.
pub fn collect(container: &ElementRef) -> Vec<String> {
    container
        .select(&PARAGRAPH)
        .map(|p| element_text(&p).trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// First few paragraphs, separated by a blank line.
pub fn lead_summary(paragraphs: &[String]) -> String {
    paragraphs
        .iter()
        .take(LEAD_PARAGRAPHS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Every paragraph joined by newlines, cut to the first `max_chars` characters.
/// The cut is not word-aware.
pub fn bounded_corpus(paragraphs: &[String], max_chars: usize) -> String {
    let full = paragraphs.join("\n");
    truncate_chars(&full, max_chars).to_string()
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
