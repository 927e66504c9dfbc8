pub mod paragraphs;
pub mod sections;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use thiserror::Error;

/// Hard cap on the body corpus handed to the model, in characters.
pub const MAX_BODY_CHARS: usize = 25_000;

static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h1#firstHeading"));
static CONTENT_PRIMARY: LazyLock<Selector> = LazyLock::new(|| selector("div.mw-parser-output"));
static CONTENT_FALLBACK: LazyLock<Selector> = LazyLock::new(|| selector("div#mw-content-text"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDocument {
    pub title: String,
    pub summary: String,
    pub body: String,
    pub sections: Vec<String>,
}

/// Why a page produced no document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractFailure {
    #[error("request failed: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("no primary heading (h1#firstHeading)")]
    MissingHeading,
    #[error("no content container")]
    MissingContent,
}

/// Markup → document: heading → container → paragraphs → sections.
pub fn parse_article(html: &str) -> Result<ExtractedDocument, ExtractFailure> {
    let dom = Html::parse_document(html);

    let title = dom
        .select(&HEADING)
        .next()
        .map(|h| element_text(&h).trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ExtractFailure::MissingHeading)?;

    let container = dom
        .select(&CONTENT_PRIMARY)
        .next()
        .or_else(|| dom.select(&CONTENT_FALLBACK).next())
        .ok_or(ExtractFailure::MissingContent)?;

    let paras = paragraphs::collect(&container);

    Ok(ExtractedDocument {
        title,
        summary: paragraphs::lead_summary(&paras),
        body: paragraphs::bounded_corpus(&paras, MAX_BODY_CHARS),
        sections: sections::collect(&container),
    })
}

/// All descendant text of an element, concatenated.
pub(crate) fn element_text(el: &ElementRef) -> String {
    el.text().collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn article(paragraphs: &[String], headings: &[&str]) -> String {
        let mut html = String::from(
            r#"<html><body><h1 id="firstHeading">Test Article</h1><div id="mw-content-text"><div class="mw-parser-output">"#,
        );
        for p in paragraphs {
            html.push_str(&format!("<p>{}</p>", p));
        }
        for h in headings {
            html.push_str(&format!(
                r#"<div class="mw-heading"><h2>{}</h2><span class="mw-editsection">[<a>edit</a>]</span></div>"#,
                h
            ));
        }
        html.push_str("</div></div></body></html>");
        html
    }

    #[test]
    fn long_article_is_truncated_and_filtered() {
        let paras: Vec<String> = ["a", "b", "c", "d"].iter().map(|c| c.repeat(7_500)).collect();
        let html = article(&paras, &["History", "References"]);
        let doc = parse_article(&html).unwrap();

        assert_eq!(doc.title, "Test Article");
        assert_eq!(doc.summary, paras[..3].join("\n\n"));
        assert_eq!(doc.body.chars().count(), MAX_BODY_CHARS);
        let full = paras.join("\n");
        assert_eq!(doc.body, &full[..MAX_BODY_CHARS]);
        assert_eq!(doc.sections, vec!["History".to_string()]);
    }

    #[test]
    fn missing_heading_is_absent() {
        let html = r#"<html><body><div class="mw-parser-output"><p>Text</p></div></body></html>"#;
        assert_eq!(parse_article(html), Err(ExtractFailure::MissingHeading));
    }

    #[test]
    fn blank_heading_is_absent() {
        let html = r#"<h1 id="firstHeading">   </h1><div class="mw-parser-output"><p>Text</p></div>"#;
        assert_eq!(parse_article(html), Err(ExtractFailure::MissingHeading));
    }

    #[test]
    fn missing_container_is_absent() {
        let html = r#"<h1 id="firstHeading">Lonely</h1><div class="sidebar"><p>Text</p></div>"#;
        assert_eq!(parse_article(html), Err(ExtractFailure::MissingContent));
    }

    #[test]
    fn falls_back_to_content_text() {
        let html = r#"<h1 id="firstHeading">Fallback</h1>
            <div id="mw-content-text"><p>Only paragraph.</p><h2>Early life</h2></div>"#;
        let doc = parse_article(html).unwrap();
        assert_eq!(doc.summary, "Only paragraph.");
        assert_eq!(doc.body, "Only paragraph.");
        assert_eq!(doc.sections, vec!["Early life".to_string()]);
    }

    #[test]
    fn short_article_keeps_full_body() {
        let paras = vec!["One.".to_string(), "Two.".to_string()];
        let doc = parse_article(&article(&paras, &[])).unwrap();
        assert_eq!(doc.summary, "One.\n\nTwo.");
        assert_eq!(doc.body, "One.\nTwo.");
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn lovelace_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/ada_lovelace.html").unwrap();
        let doc = parse_article(&html).unwrap();

        assert_eq!(doc.title, "Ada Lovelace");
        assert!(doc.summary.starts_with("Augusta Ada King, Countess of Lovelace"));
        assert_eq!(doc.summary.split("\n\n").count(), 3);
        assert!(!doc.body.contains("\n\n"));
        assert_eq!(
            doc.sections,
            vec!["Biography", "Work", "Legacy"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn same_bytes_same_document() {
        let html = std::fs::read_to_string("tests/fixtures/ada_lovelace.html").unwrap();
        assert_eq!(parse_article(&html), parse_article(&html));
    }
}
