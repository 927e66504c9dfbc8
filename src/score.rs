use std::collections::BTreeMap;

/// Outcome of grading one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graded {
    /// Per-question answer as recorded (None = unanswered).
    pub user_answers: Vec<Option<String>>,
    /// Whole-number percentage, None when the attempt was reset.
    pub score: Option<u32>,
}

/// Grade `answers` (question index → answer) against the correct answers.
/// An empty submission resets the attempt.
pub fn grade(correct: &[String], answers: &BTreeMap<usize, String>) -> Graded {
    if answers.is_empty() {
        return Graded {
            user_answers: vec![None; correct.len()],
            score: None,
        };
    }

    let user_answers: Vec<Option<String>> = (0..correct.len())
        .map(|i| answers.get(&i).cloned())
        .collect();

    let hits = correct
        .iter()
        .zip(&user_answers)
        .filter(|(expected, given)| given.as_deref() == Some(expected.as_str()))
        .count();

    let score = if correct.is_empty() {
        0
    } else {
        (hits * 100 / correct.len()) as u32
    };

    Graded {
        user_answers,
        score: Some(score),
    }
}

/// Parse `index=answer` pairs as typed on the command line.
pub fn parse_answers(pairs: &[String]) -> anyhow::Result<BTreeMap<usize, String>> {
    pairs
        .iter()
        .map(|pair| {
            let (idx, answer) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("expected INDEX=ANSWER, got {:?}", pair))?;
            let idx: usize = idx
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("bad question index in {:?}", pair))?;
            Ok((idx, answer.to_string()))
        })
        .collect()
}
