use anyhow::{bail, Context, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:*,http://127.0.0.1:*";
const DEFAULT_LOG_FILE: &str = "roast_my_resume.log";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub log_file: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
            allowed_origins: parse_origins(
                &std::env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
            port: parse_port(&std::env::var("PORT").unwrap_or_else(|_| "8000".to_string()))?,
            log_file: std::env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
        })
    }
}

/// Splits a comma-separated origin list, dropping blank entries.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .with_context(|| format!("PORT must be a valid port number, got '{raw}'"))
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}
