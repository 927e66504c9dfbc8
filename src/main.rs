mod db;
mod extractor;
mod parser;
mod pipeline;
mod quiz;
mod score;
mod settings;

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::extractor::{Extraction, Extractor};
use crate::quiz::backend::GeminiBackend;
use crate::quiz::synthesizer::QuizSynthesizer;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "wiki_quiz", about = "Turn a wiki article into a multiple-choice quiz")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an article, generate a quiz from it and store the result
    Generate {
        url: String,
        /// Credential for the generative backend
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Only run extraction and print what would be sent to the model
    Extract {
        url: String,
        /// Print the extracted document as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored quizzes, newest first
    History {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// Print a stored quiz
    Show {
        id: i64,
        /// Include correct answers and explanations
        #[arg(long)]
        reveal: bool,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record answers as INDEX=ANSWER pairs; no pairs resets the attempt
    Submit { id: i64, answers: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Generate { url, api_key } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let extractor = Extractor::new()?;
            let backend = GeminiBackend::new(
                &settings.backend_endpoint,
                &settings.model,
                settings.backend_timeout(),
            )?;
            let synthesizer = QuizSynthesizer::new(backend);

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
            spinner.set_message(format!("Generating quiz for {}", url));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let outcome =
                pipeline::generate(&conn, &extractor, &synthesizer, &url, api_key.as_deref()).await;
            spinner.finish_and_clear();

            let id = outcome?;
            match db::fetch_quiz(&conn, id)? {
                Some(rec) => print_quiz(&rec, false),
                None => anyhow::bail!("Quiz {} vanished after saving", id),
            }
            Ok(())
        }
        Commands::Extract { url, json } => {
            let url = pipeline::validate_url(&url)?;
            let extractor = Extractor::new()?;
            match extractor.fetch(url.as_str()).await {
                Extraction::Article(doc) if json => {
                    println!("{}", serde_json::to_string_pretty(&doc)?);
                    Ok(())
                }
                Extraction::Article(doc) => {
                    println!("{}", doc.title);
                    println!("{}\n", "=".repeat(doc.title.chars().count()));
                    println!("{}\n", doc.summary);
                    println!("Sections:  {}", doc.sections.join(", "));
                    println!("Body:      {} chars", doc.body.chars().count());
                    Ok(())
                }
                Extraction::Unavailable(failure) => {
                    anyhow::bail!("Unable to retrieve content: {}", failure)
                }
            }
        }
        Commands::History { limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_history(&conn, limit)?;
            if rows.is_empty() {
                println!("No quizzes yet. Run 'generate <url>' first.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<32} | {:<16} | {:>5} | {}",
                "ID", "Title", "Created", "Score", "URL"
            );
            println!("{}", "-".repeat(100));
            for r in &rows {
                let score = r.score.map(|s| format!("{}%", s)).unwrap_or_else(|| "-".into());
                println!(
                    "{:>4} | {:<32} | {:<16} | {:>5} | {}",
                    r.id,
                    truncate(&r.title, 32),
                    r.created_at.format("%Y-%m-%d %H:%M"),
                    score,
                    r.url
                );
            }
            Ok(())
        }
        Commands::Show { id, reveal, json } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            match db::fetch_quiz(&conn, id)? {
                Some(rec) if json => {
                    println!("{}", serde_json::to_string_pretty(&rec)?);
                    Ok(())
                }
                Some(rec) => {
                    print_quiz(&rec, reveal);
                    Ok(())
                }
                None => anyhow::bail!("Quiz {} not found", id),
            }
        }
        Commands::Submit { id, answers } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let Some(rec) = db::fetch_quiz(&conn, id)? else {
                anyhow::bail!("Quiz {} not found", id);
            };
            let answers = score::parse_answers(&answers)?;
            let graded = score::grade(&rec.correct_answers(), &answers);
            db::save_attempt(&conn, id, &graded)?;

            match graded.score {
                Some(s) => println!("Score: {}% ({} questions)", s, rec.questions.len()),
                None => println!("Attempt reset."),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn print_quiz(rec: &db::QuizRecord, reveal: bool) {
    println!("#{} {}", rec.id, rec.title);
    println!("{}\n", rec.url);
    println!("{}\n", rec.summary);

    if !rec.sections.is_empty() {
        println!("Sections: {}", rec.sections.join(", "));
    }
    let e = &rec.key_entities;
    println!("People: {}", e.people.join(", "));
    println!("Organizations: {}", e.organizations.join(", "));
    println!("Locations: {}\n", e.locations.join(", "));

    for (i, q) in rec.questions.iter().enumerate() {
        println!("{}. [{}] {}", i, q.draft.difficulty, q.draft.question);
        for opt in &q.draft.options {
            let mark = if reveal && *opt == q.draft.answer { "*" } else { " " };
            println!("   {} {}", mark, opt);
        }
        if let Some(given) = &q.user_answer {
            println!("   your answer: {}", given);
        }
        if reveal {
            println!("   {}", q.draft.explanation);
        }
    }

    if !rec.related_topics.is_empty() {
        println!("\nRelated: {}", rec.related_topics.join(", "));
    }
    if let Some(s) = rec.score {
        println!("Score: {}%", s);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
