//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// The Gemini endpoint that speaks the OpenAI chat-completions protocol.
pub const DEFAULT_COMPLETION_API_BASE: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Absent keys are reported per request by the AI routes.
    pub gemini_api_key: Option<String>,
    pub completion_api_base: String,
    pub completion_model: String,
    pub webhook_secret: Option<String>,
    /// PEM-encoded RSA public key used to verify session tokens.
    pub jwt_public_key: Option<String>,
    pub cors_origin: String,
    pub history_cache_dir: PathBuf,
    /// The identity the `wizard` binary acts as.
    pub wizard_external_id: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Completion Settings ---
        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty());
        let completion_api_base = lookup("COMPLETION_API_BASE")
            .unwrap_or_else(|| DEFAULT_COMPLETION_API_BASE.to_string());
        let completion_model =
            lookup("COMPLETION_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string());

        // --- Load Identity Provider Settings ---
        let webhook_secret = lookup("CLERK_WEBHOOK_SECRET");
        let jwt_public_key = lookup("CLERK_JWT_PUBLIC_KEY");

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let history_cache_dir = lookup("HISTORY_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.cache"));
        let wizard_external_id = lookup("WIZARD_EXTERNAL_ID");

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            gemini_api_key,
            completion_api_base,
            completion_model,
            webhook_secret,
            jwt_public_key,
            cors_origin,
            history_cache_dir,
            wizard_external_id,
        })
    }
}
