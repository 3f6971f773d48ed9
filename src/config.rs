//! Application configuration loaded from environment variables.
//!
//! Secrets (the model API key and the session signing secret) are read
//! once at startup and kept in memory for the life of the process.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the generative-language service
    pub gemini_api_key: String,
    /// Model name, e.g. `gemini-1.5-flash`
    pub gemini_model: String,
    /// HMAC key for signing session cookies (raw bytes)
    pub session_secret: Vec<u8>,
    /// SQLite connection string
    pub database_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GEMINI_API_KEY"))?,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            session_secret: env::var("SESSION_SECRET")
                .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?
                .into_bytes(),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data.db".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gemini_api_key: "test_api_key".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            session_secret: b"test_session_secret_32_bytes!!!!".to_vec(),
            database_url: "sqlite::memory:".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("GEMINI_API_KEY", "test_key");
        env::set_var("SESSION_SECRET", "test_session_secret_32_bytes!!!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.gemini_api_key, "test_key");
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite:data.db");
    }
}
