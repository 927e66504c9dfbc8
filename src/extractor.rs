use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::parser::{self, ExtractFailure, ExtractedDocument};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one fetch: an article, or the reason there is none.
#[derive(Debug)]
pub enum Extraction {
    Article(ExtractedDocument),
    Unavailable(ExtractFailure),
}

/// Single-page fetcher for MediaWiki-style articles. Stateless between calls.
#[derive(Clone)]
pub struct Extractor {
    client: reqwest::Client,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// GET `url` once and parse it. Never errors; failures come back as `Unavailable`.
    pub async fn fetch(&self, url: &str) -> Extraction {
        let start = Instant::now();
        let outcome = match self.download(url).await {
            Ok(html) => parser::parse_article(&html),
            Err(failure) => Err(failure),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(doc) => {
                info!(
                    url,
                    title = %doc.title,
                    body_chars = doc.body.chars().count(),
                    sections = doc.sections.len(),
                    elapsed_ms,
                    "Extracted article"
                );
                Extraction::Article(doc)
            }
            Err(failure) => {
                warn!(url, error = %failure, elapsed_ms, "Extraction failed");
                Extraction::Unavailable(failure)
            }
        }
    }

    async fn download(&self, url: &str) -> Result<String, ExtractFailure> {
        let response = self.client.get(url).send().await.map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractFailure::Status(status.as_u16()));
        }

        response.text().await.map_err(transport_failure)
    }
}

fn transport_failure(e: reqwest::Error) -> ExtractFailure {
    if e.is_timeout() {
        ExtractFailure::Timeout
    } else {
        ExtractFailure::Network(e.to_string())
    }
}

// ── Tests ──
