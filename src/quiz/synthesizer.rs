use thiserror::Error;
use tracing::{error, info, warn};

use super::backend::{BackendError, GenerativeBackend};
use super::prompt::{self, QUESTION_COUNT};
use super::{response, QuizDataset, LOGGED_ERROR_CHARS};

#[derive(Debug, Error)]
pub enum SynthesisFailure {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("backend returned an empty response")]
    EmptyResponse,
    #[error("response was not a valid quiz: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("no question had its answer among the options")]
    NoUsableQuestions,
}

/// Result of one synthesis call.
#[derive(Debug)]
pub enum Synthesis {
    Generated(QuizDataset),
    Fallback(SynthesisFailure),
}

impl Synthesis {
    /// The generated dataset, or the canonical empty one.
    pub fn into_dataset(self) -> QuizDataset {
        match self {
            Synthesis::Generated(ds) => ds,
            Synthesis::Fallback(_) => QuizDataset::empty(),
        }
    }
}

/// Corpus → quiz through a generative backend. Holds no per-call state.
pub struct QuizSynthesizer<B> {
    backend: B,
}

impl<B: GenerativeBackend> QuizSynthesizer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// One backend call, no retry. Failures are logged and folded into `Synthesis::Fallback`.
    pub async fn synthesize(&self, corpus: &str, credential: &str) -> Synthesis {
        match self.run(corpus, credential).await {
            Ok(dataset) => Synthesis::Generated(dataset),
            Err(failure) => {
                error!(
                    backend = self.backend.name(),
                    error = %crate::truncate(&failure.to_string(), LOGGED_ERROR_CHARS),
                    "Quiz synthesis failed, returning empty dataset"
                );
                Synthesis::Fallback(failure)
            }
        }
    }

    async fn run(&self, corpus: &str, credential: &str) -> Result<QuizDataset, SynthesisFailure> {
        let instruction = prompt::build(corpus);
        let raw = self.backend.generate_json(&instruction, credential).await?;
        if raw.trim().is_empty() {
            return Err(SynthesisFailure::EmptyResponse);
        }

        let mut dataset = response::decode(&raw)?;

        let dropped = dataset.retain_answerable();
        if dropped > 0 {
            warn!(
                backend = self.backend.name(),
                dropped,
                "Dropped questions whose answer is not among the options"
            );
        }
        if dataset.is_empty() {
            return Err(SynthesisFailure::NoUsableQuestions);
        }
        if dataset.questions.len() != QUESTION_COUNT {
            warn!(
                backend = self.backend.name(),
                expected = QUESTION_COUNT,
                got = dataset.questions.len(),
                "Unexpected question count"
            );
        }

        info!(
            backend = self.backend.name(),
            questions = dataset.questions.len(),
            topics = dataset.related_topics.len(),
            "Quiz synthesized"
        );
        Ok(dataset)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::quiz::fixtures;

    enum Script {
        Reply(String),
        Unauthorized,
    }

    /// Replays a scripted reply and records what it was sent.
    struct FakeBackend {
        script: Script,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl FakeBackend {
        fn reply(text: impl Into<String>) -> Self {
            Self {
                script: Script::Reply(text.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn unauthorized() -> Self {
            Self {
                script: Script::Unauthorized,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        async fn generate_json(&self, prompt: &str, credential: &str) -> Result<String, BackendError> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), credential.to_string()));
            match &self.script {
                Script::Reply(text) => Ok(text.clone()),
                Script::Unauthorized => Err(BackendError::Unauthorized(401)),
            }
        }
    }

    #[tokio::test]
    async fn fenced_json_yields_ten_questions() {
        let raw = format!("```json\n{}\n```", fixtures::payload(10));
        let synth = QuizSynthesizer::new(FakeBackend::reply(raw));

        let outcome = synth.synthesize("Some corpus.", "key-123").await;
        let Synthesis::Generated(ds) = outcome else {
            panic!("expected generated dataset");
        };
        assert_eq!(ds.questions.len(), 10);
        assert_eq!(ds.key_entities.people, vec!["Ada Lovelace", "Charles Babbage"]);
        assert_eq!(ds.related_topics.len(), 2);
    }

    #[tokio::test]
    async fn sends_corpus_and_credential_once() {
        let backend = FakeBackend::reply(fixtures::payload(10));
        let synth = QuizSynthesizer::new(backend);
        synth.synthesize("The corpus text.", "key-123").await;

        let seen = synth.backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.ends_with("The corpus text."));
        assert_eq!(seen[0].1, "key-123");
    }

    #[tokio::test]
    async fn auth_error_falls_back_to_empty() {
        let synth = QuizSynthesizer::new(FakeBackend::unauthorized());
        let outcome = synth.synthesize("corpus", "bad-key").await;

        assert!(matches!(
            outcome,
            Synthesis::Fallback(SynthesisFailure::Backend(BackendError::Unauthorized(401)))
        ));
        assert_eq!(outcome.into_dataset(), QuizDataset::empty());
    }

    #[tokio::test]
    async fn blank_reply_falls_back_to_empty() {
        let synth = QuizSynthesizer::new(FakeBackend::reply("  \n "));
        let outcome = synth.synthesize("corpus", "key").await;
        assert!(matches!(outcome, Synthesis::Fallback(SynthesisFailure::EmptyResponse)));
        assert_eq!(outcome.into_dataset(), QuizDataset::empty());
    }

    #[tokio::test]
    async fn malformed_json_falls_back_to_empty() {
        let payload = fixtures::payload(10);
        let synth = QuizSynthesizer::new(FakeBackend::reply(&payload[..120]));
        let outcome = synth.synthesize("corpus", "key").await;
        assert!(matches!(outcome, Synthesis::Fallback(SynthesisFailure::Malformed(_))));
        assert_eq!(outcome.into_dataset(), QuizDataset::empty());
    }

    #[tokio::test]
    async fn missing_required_field_is_not_partially_accepted() {
        let raw = r#"{"key_entities":{"people":["X"],"organizations":[],"locations":[]},"quiz":[]}"#;
        let synth = QuizSynthesizer::new(FakeBackend::reply(raw));
        let ds = synth.synthesize("corpus", "key").await.into_dataset();
        assert_eq!(ds, QuizDataset::empty());
    }

    #[tokio::test]
    async fn unanswerable_questions_are_dropped() {
        let mut value: serde_json::Value = serde_json::from_str(&fixtures::payload(10)).unwrap();
        value["quiz"][3]["answer"] = "Not an option".into();
        value["quiz"][7]["answer"] = "".into();
        let synth = QuizSynthesizer::new(FakeBackend::reply(value.to_string()));

        let ds = synth.synthesize("corpus", "key").await.into_dataset();
        assert_eq!(ds.questions.len(), 8);
        assert!(ds.questions.iter().all(|q| q.answer_in_options()));
    }

    #[tokio::test]
    async fn short_quiz_is_passed_through() {
        let synth = QuizSynthesizer::new(FakeBackend::reply(fixtures::payload(4)));
        let ds = synth.synthesize("corpus", "key").await.into_dataset();
        assert_eq!(ds.questions.len(), 4);
    }

    #[tokio::test]
    async fn all_unanswerable_falls_back_to_empty() {
        let mut value: serde_json::Value = serde_json::from_str(&fixtures::payload(3)).unwrap();
        for q in value["quiz"].as_array_mut().unwrap() {
            q["answer"] = "nope".into();
        }
        let synth = QuizSynthesizer::new(FakeBackend::reply(value.to_string()));

        let outcome = synth.synthesize("corpus", "key").await;
        assert!(matches!(outcome, Synthesis::Fallback(SynthesisFailure::NoUsableQuestions)));
        assert_eq!(outcome.into_dataset(), QuizDataset::empty());
    }

    #[tokio::test]
    async fn empty_question_list_falls_back_to_empty() {
        let synth = QuizSynthesizer::new(FakeBackend::reply(fixtures::payload(0)));
        let outcome = synth.synthesize("corpus", "key").await;
        assert!(matches!(outcome, Synthesis::Fallback(SynthesisFailure::NoUsableQuestions)));
        assert_eq!(outcome.into_dataset(), QuizDataset::empty());
    }
}
