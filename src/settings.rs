use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

/// Runtime settings: defaults, overridden by `WIKIQUIZ_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub model: String,
    pub backend_endpoint: String,
    pub backend_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(Config::builder().add_source(Environment::with_prefix("WIKIQUIZ")))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .set_default("db_path", "data/quiz.sqlite")?
            .set_default("model", "gemini-flash-latest")?
            .set_default(
                "backend_endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("backend_timeout_secs", 120)?
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }
}
