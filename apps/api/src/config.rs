use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_API_URL;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// How an uploaded PDF is handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Forward the file itself as a base64 document block.
    #[default]
    Document,
    /// Extract PDF text locally and send it inline.
    Text,
}

impl ExtractionMode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(ExtractionMode::Document),
            "text" => Ok(ExtractionMode::Text),
            other => bail!("EXTRACTION_MODE must be 'document' or 'text', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub extraction_mode: ExtractionMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            extraction_mode: match std::env::var("EXTRACTION_MODE") {
                Ok(raw) => ExtractionMode::parse(&raw)?,
                Err(_) => ExtractionMode::default(),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
