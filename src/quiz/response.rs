use super::QuizDataset;

/// Strip markdown fence baggage: surrounding whitespace, wrapping backticks,
/// and a leading `json` language tag.
pub fn strip_fence(raw: &str) -> &str {
    let inner = raw.trim().trim_matches('`').trim_start();
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

/// Decode cleaned model text into a dataset. Every field is required.
pub fn decode(raw: &str) -> Result<QuizDataset, serde_json::Error> {
    serde_json::from_str(strip_fence(raw))
}
