use std::env;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mongo_url: String,
    pub db_name: String,
    pub gemini: GeminiSettings,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let cors_origins = optional("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            port,
            mongo_url: required("MONGO_URL")?,
            db_name: required("DB_NAME")?,
            gemini: GeminiSettings {
                api_key: required("GEMINI_API_KEY")?,
                base_url: optional("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                text_model: optional("GEMINI_TEXT_MODEL", DEFAULT_TEXT_MODEL),
                image_model: optional("GEMINI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            },
            cors_origins,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}
