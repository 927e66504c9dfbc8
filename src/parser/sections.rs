use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::element_text;

static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());

// "[edit]" appended by MediaWiki when the edit link sits inside the heading
static EDIT_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\s*edit\s*\]").unwrap());

/// Headings that describe page apparatus rather than article content.
const SKIPPED: &[&str] = &[
    "contents",
    "references",
    "external links",
    "see also",
    "notes",
    "bibliography",
];

/// Top-level section labels under `container`, in document order.
pub fn collect(container: &ElementRef) -> Vec<String> {
    container
        .select(&H2)
        .map(|h| clean_label(&element_text(&h)))
        .filter(|label| !is_skipped(label))
        .collect()
}

fn clean_label(raw: &str) -> String {
    EDIT_MARKER.replace_all(raw, "").trim().to_string()
}

fn is_skipped(label: &str) -> bool {
    let lower = label.to_lowercase();
    SKIPPED.contains(&lower.as_str())
}
