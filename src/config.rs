use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "travista";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AI_MAX_RETRIES: u32 = 2;
const DEFAULT_CONTEXT_TIMEOUT_MS: u64 = 3000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Startup refuses to continue without these.
pub const REQUIRED_VARS: [&str; 3] = ["JWT_SECRET", "MONGODB_URI", "OPENAI_API_KEY"];

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub mongodb_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub ai: AiConfig,
    pub context_timeout_ms: u64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]);

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            environment: get("RUST_ENV").unwrap_or_else(|| "development".to_string()),
            mongodb_uri: get("MONGODB_URI").unwrap_or_default(),
            database_name: get("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            jwt_secret: get("JWT_SECRET").unwrap_or_default(),
            ai: AiConfig {
                api_key: get("OPENAI_API_KEY").unwrap_or_default(),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                embedding_model: get("OPENAI_EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                timeout_secs: parse_or("AI_TIMEOUT_SECS", get("AI_TIMEOUT_SECS"), DEFAULT_AI_TIMEOUT_SECS)?,
                max_retries: parse_or("AI_MAX_RETRIES", get("AI_MAX_RETRIES"), DEFAULT_AI_MAX_RETRIES)?,
            },
            context_timeout_ms: parse_or(
                "CONTEXT_TIMEOUT_MS",
                get("CONTEXT_TIMEOUT_MS"),
                DEFAULT_CONTEXT_TIMEOUT_MS,
            )?,
            cors_origins,
        })
    }
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("JWT_SECRET", "secret"),
        ("MONGODB_URI", "mongodb://localhost:27017"),
        ("OPENAI_API_KEY", "sk-test"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.ai.model, "gpt-4");
        assert_eq!(config.ai.max_retries, 2);
        assert_eq!(config.database_name, "travista");
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_missing_secrets_listed_together() {
        let err = AppConfig::from_lookup(lookup_from(&[("MONGODB_URI", "mongodb://x")])).unwrap_err();
        match err {
            ConfigError::MissingVars(vars) => {
                assert_eq!(vars, vec!["JWT_SECRET", "OPENAI_API_KEY"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("JWT_SECRET", "   ");
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::MissingVars(_))
        ));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_cors_origins_split() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CORS_ORIGINS", "https://a.example, https://b.example,"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
    }
}
