use rusqlite::Connection;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::db;
use crate::extractor::{Extraction, Extractor};
use crate::parser::ExtractFailure;
use crate::quiz::backend::GenerativeBackend;
use crate::quiz::synthesizer::QuizSynthesizer;

/// Caller-facing failures of a generate request. Fetch and synthesis
/// failures stay distinct so the user knows which step gave up.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("not a valid http(s) URL: {0}")]
    InvalidUrl(String),
    #[error("unable to retrieve content from the provided URL ({0})")]
    ContentUnavailable(ExtractFailure),
    #[error("missing API credentials for the generative backend")]
    MissingCredential,
    #[error("content analysis failed, try a different article")]
    AnalysisFailed,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Check that `raw` is an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<Url, PipelineError> {
    let url = Url::parse(raw.trim()).map_err(|_| PipelineError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(PipelineError::InvalidUrl(raw.to_string())),
    }
}

/// URL → extract → synthesize → persist. Returns the new quiz id.
pub async fn generate<B: GenerativeBackend>(
    conn: &Connection,
    extractor: &Extractor,
    synthesizer: &QuizSynthesizer<B>,
    raw_url: &str,
    credential: Option<&str>,
) -> Result<i64, PipelineError> {
    let url = validate_url(raw_url)?;
    let credential = credential
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(PipelineError::MissingCredential)?;

    info!(url = %url, "Targeting article");
    let doc = match extractor.fetch(url.as_str()).await {
        Extraction::Article(doc) => doc,
        Extraction::Unavailable(failure) => return Err(PipelineError::ContentUnavailable(failure)),
    };

    let dataset = synthesizer.synthesize(&doc.body, credential).await.into_dataset();
    if dataset.is_empty() {
        return Err(PipelineError::AnalysisFailed);
    }

    let id = db::save_quiz(conn, url.as_str(), &doc, &dataset)?;
    info!(quiz_id = id, questions = dataset.questions.len(), "Quiz stored");
    Ok(id)
}
