// src/config.rs
use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::services::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::services::rate_limiter::{ParseLimitError, RateLimit, parse_limits};

pub const DEFAULT_PORT: u16 = 10000;
pub const SESSION_LIFETIME: Duration = Duration::from_secs(30 * 60);
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY not found in environment variables")]
    MissingApiKey,

    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),

    #[error("SECRET_KEY must be at least 32 bytes")]
    SecretTooShort,

    #[error("{var}: {source}")]
    InvalidLimit {
        var: &'static str,
        #[source]
        source: ParseLimitError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    fn from_var(value: Option<&str>) -> Self {
        match value {
            Some("development") => Environment::Development,
            _ => Environment::Production,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RateLimits {
    pub home: Vec<RateLimit>,
    pub chat: Vec<RateLimit>,
    pub default: Vec<RateLimit>,
    pub enabled: bool,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            home: limits_or_empty("100/day;30/hour"),
            chat: limits_or_empty("50/day;10/hour"),
            default: limits_or_empty("200/day;50/hour"),
            enabled: true,
        }
    }
}

fn limits_or_empty(s: &str) -> Vec<RateLimit> {
    parse_limits(s).unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub secret_key: Option<String>,
    pub port: u16,
    pub debug: bool,
    pub environment: Environment,
    pub rate_limits: RateLimits,
    /// Key rate limits on `X-Forwarded-For` instead of the socket peer.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_proxy: bool,
    pub session_lifetime: Duration,
}

impl Config {
    /// Development defaults with a placeholder key; used by tests and the console.
    pub fn for_development(api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: api_key.into(),
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            secret_key: None,
            port: DEFAULT_PORT,
            debug: false,
            environment: Environment::Development,
            rate_limits: RateLimits::default(),
            trust_proxy: false,
            session_lifetime: SESSION_LIFETIME,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Load the per-environment dotenv file (if present), then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_var(env::var("APP_ENV").ok().as_deref());
        let file = match environment {
            Environment::Development => ".env.development",
            Environment::Production => ".env.production",
        };
        if dotenvy::from_filename(file).is_ok() {
            tracing::debug!(file, "loaded environment file");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let environment = Environment::from_var(lookup("APP_ENV").as_deref());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let secret_key = lookup("SECRET_KEY").filter(|s| !s.is_empty());
        if secret_key.as_ref().is_some_and(|s| s.len() < MIN_SECRET_LEN) {
            return Err(ConfigError::SecretTooShort);
        }

        let mut rate_limits = RateLimits::default();
        for (var, slot) in [
            ("HOME_RATE_LIMIT", &mut rate_limits.home),
            ("CHAT_RATE_LIMIT", &mut rate_limits.chat),
            ("DEFAULT_RATE_LIMIT", &mut rate_limits.default),
        ] {
            if let Some(raw) = lookup(var) {
                *slot = parse_limits(&raw).map_err(|source| ConfigError::InvalidLimit { var, source })?;
            }
        }
        rate_limits.enabled = !(environment == Environment::Development
            && lookup("DISABLE_RATE_LIMITS").as_deref() == Some("1"));

        Ok(Self {
            openai_api_key,
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            secret_key,
            port,
            debug: lookup("DEBUG").as_deref() == Some("1"),
            environment,
            rate_limits,
            trust_proxy: lookup("TRUST_PROXY").as_deref() == Some("1"),
            session_lifetime: SESSION_LIFETIME,
        })
    }
}
