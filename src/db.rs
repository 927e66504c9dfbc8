use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use crate::parser::ExtractedDocument;
use crate::quiz::{KeyEntities, QuestionDraft, QuizDataset};
use crate::score::Graded;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS quizzes (
            id           INTEGER PRIMARY KEY,
            url          TEXT NOT NULL,
            title        TEXT NOT NULL,
            summary      TEXT NOT NULL,
            key_entities TEXT NOT NULL,
            sections     TEXT NOT NULL,
            score        INTEGER,
            created_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_quizzes_url ON quizzes(url);

        CREATE TABLE IF NOT EXISTS questions (
            id            INTEGER PRIMARY KEY,
            quiz_id       INTEGER NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
            position      INTEGER NOT NULL,
            question_text TEXT NOT NULL,
            options       TEXT NOT NULL,
            answer        TEXT NOT NULL,
            explanation   TEXT NOT NULL,
            difficulty    TEXT NOT NULL,
            user_answer   TEXT,
            UNIQUE(quiz_id, position)
        );
        CREATE INDEX IF NOT EXISTS idx_questions_quiz ON questions(quiz_id);

        CREATE TABLE IF NOT EXISTS related_topics (
            id          INTEGER PRIMARY KEY,
            quiz_id     INTEGER NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
            topic_name  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_topics_quiz ON related_topics(quiz_id);
        ",
    )?;
    Ok(())
}

// ── Saving ──

/// Persist a document and its dataset as one record. Returns the quiz id.
pub fn save_quiz(
    conn: &Connection,
    url: &str,
    doc: &ExtractedDocument,
    dataset: &QuizDataset,
) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let quiz_id;
    {
        tx.execute(
            "INSERT INTO quizzes (url, title, summary, key_entities, sections, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                url,
                doc.title,
                doc.summary,
                serde_json::to_string(&dataset.key_entities)?,
                serde_json::to_string(&doc.sections)?,
                Utc::now(),
            ],
        )?;
        quiz_id = tx.last_insert_rowid();

        let mut q_stmt = tx.prepare(
            "INSERT INTO questions
             (quiz_id, position, question_text, options, answer, explanation, difficulty)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for (pos, q) in dataset.questions.iter().enumerate() {
            q_stmt.execute(rusqlite::params![
                quiz_id,
                pos as i64,
                q.question,
                serde_json::to_string(&q.options)?,
                q.answer,
                q.explanation,
                q.difficulty,
            ])?;
        }

        let mut t_stmt =
            tx.prepare("INSERT INTO related_topics (quiz_id, topic_name) VALUES (?1, ?2)")?;
        for topic in &dataset.related_topics {
            t_stmt.execute(rusqlite::params![quiz_id, topic])?;
        }
    }
    tx.commit()?;
    Ok(quiz_id)
}

/// Store one graded attempt: per-question answers and the overall score.
pub fn save_attempt(conn: &Connection, quiz_id: i64, graded: &Graded) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "UPDATE questions SET user_answer = ?1 WHERE quiz_id = ?2 AND position = ?3",
        )?;
        for (pos, answer) in graded.user_answers.iter().enumerate() {
            stmt.execute(rusqlite::params![answer, quiz_id, pos as i64])?;
        }
        tx.execute(
            "UPDATE quizzes SET score = ?1 WHERE id = ?2",
            rusqlite::params![graded.score, quiz_id],
        )?;
    }
    tx.commit()?;
    Ok(())
}

// ── Reading ──

#[derive(Debug, Clone, Serialize)]
pub struct StoredQuestion {
    #[serde(flatten)]
    pub draft: QuestionDraft,
    pub user_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub key_entities: KeyEntities,
    pub sections: Vec<String>,
    pub score: Option<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "quiz")]
    pub questions: Vec<StoredQuestion>,
    pub related_topics: Vec<String>,
}

impl QuizRecord {
    pub fn correct_answers(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.draft.answer.clone()).collect()
    }
}

pub fn fetch_quiz(conn: &Connection, quiz_id: i64) -> Result<Option<QuizRecord>> {
    let head = conn
        .query_row(
            "SELECT id, url, title, summary, key_entities, sections, score, created_at
             FROM quizzes WHERE id = ?1",
            [quiz_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<u32>>(6)?,
                    row.get::<_, DateTime<Utc>>(7)?,
                ))
            },
        )
        .optional()?;

    let Some((id, url, title, summary, entities_json, sections_json, score, created_at)) = head
    else {
        return Ok(None);
    };

    let mut q_stmt = conn.prepare(
        "SELECT question_text, options, answer, difficulty, explanation, user_answer
         FROM questions WHERE quiz_id = ?1 ORDER BY position",
    )?;
    let raw_questions = q_stmt
        .query_map([quiz_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let questions = raw_questions
        .into_iter()
        .map(|(question, options, answer, difficulty, explanation, user_answer)| -> Result<StoredQuestion> {
            Ok(StoredQuestion {
                draft: QuestionDraft {
                    question,
                    options: serde_json::from_str(&options)
                        .context("Corrupt options column")?,
                    answer,
                    difficulty,
                    explanation,
                },
                user_answer,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut t_stmt =
        conn.prepare("SELECT topic_name FROM related_topics WHERE quiz_id = ?1 ORDER BY id")?;
    let related_topics = t_stmt
        .query_map([quiz_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(Some(QuizRecord {
        id,
        url,
        title,
        summary,
        key_entities: serde_json::from_str(&entities_json).context("Corrupt key_entities column")?,
        sections: serde_json::from_str(&sections_json).context("Corrupt sections column")?,
        score,
        created_at,
        questions,
        related_topics,
    }))
}

// ── History ──

pub struct HistoryRow {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub score: Option<u32>,
}

/// Stored quizzes, newest first.
pub fn fetch_history(conn: &Connection, limit: usize) -> Result<Vec<HistoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, url, title, created_at, score
         FROM quizzes
         ORDER BY created_at DESC, id DESC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(HistoryRow {
                id: row.get(0)?,
                url: row.get(1)?,
                title: row.get(2)?,
                created_at: row.get(3)?,
                score: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
