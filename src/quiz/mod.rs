pub mod backend;
pub mod prompt;
pub mod response;
pub mod synthesizer;

use serde::{Deserialize, Serialize};

/// Backend error text is cut to this many characters before it is logged.
pub(crate) const LOGGED_ERROR_CHARS: usize = 200;

/// Named entities grouped into the three fixed categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntities {
    pub people: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub difficulty: String,
    pub explanation: String,
}

impl QuestionDraft {
    /// True when `answer` matches one of `options` (ignoring surrounding whitespace).
    pub fn answer_in_options(&self) -> bool {
        let answer = self.answer.trim();
        self.options.iter().any(|o| o.trim() == answer)
    }
}

/// Model output in its wire shape: `key_entities`, `quiz`, `related_topics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDataset {
    pub key_entities: KeyEntities,
    #[serde(rename = "quiz")]
    pub questions: Vec<QuestionDraft>,
    pub related_topics: Vec<String>,
}

impl QuizDataset {
    /// The well-formed zero-content dataset returned on any synthesis failure.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Drop questions whose answer is not among their options. Returns how many were dropped.
    pub fn retain_answerable(&mut self) -> usize {
        let before = self.questions.len();
        self.questions.retain(QuestionDraft::answer_in_options);
        before - self.questions.len()
    }
}
