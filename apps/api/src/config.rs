use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// `huggingface_api_key` is deliberately NOT required at startup: the service
/// boots without it and the generation endpoint answers 503 until the key is
/// set, so the projects API stays usable while credentials are provisioned.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub huggingface_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub generation: GenerationSettings,
}

/// Tuning knobs for the b-roll generation loop.
///
/// Target count and validation strictness are configuration, not constants:
/// this has been run at both 10 and 20 prompts per script.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Exact number of shot prompts the model must return.
    pub prompt_count: usize,
    /// Total attempts before the loop gives up (one LLM call per attempt).
    pub max_attempts: u32,
    /// Sampling temperature. Low by default — validation wants repeatable JSON.
    pub temperature: f32,
    pub max_tokens: u32,
    /// When false, only structural checks run (array shape, count, fields);
    /// camera-language and category-diversity rules are skipped.
    pub strict_validation: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            prompt_count: 10,
            max_attempts: 3,
            temperature: 0.2,
            max_tokens: 2000,
            strict_validation: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            huggingface_api_key: std::env::var("HUGGINGFACE_API_KEY").unwrap_or_default(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            generation: GenerationSettings::from_env()?,
        })
    }
}

impl GenerationSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            prompt_count: parse_env("BROLL_PROMPT_COUNT", defaults.prompt_count)?,
            max_attempts: parse_env("BROLL_MAX_ATTEMPTS", defaults.max_attempts)?,
            temperature: parse_env("BROLL_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_env("BROLL_MAX_TOKENS", defaults.max_tokens)?,
            strict_validation: parse_env("BROLL_STRICT_VALIDATION", defaults.strict_validation)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' is not valid: '{raw}'")),
        Err(_) => Ok(default),
    }
}
