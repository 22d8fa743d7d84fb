use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::SecondaryKind;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub queue: QueueSettings,
    pub staging: StagingSettings,
    pub analysis: AnalysisSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StagingSettings {
    pub root_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// Base URL of the vision backend; empty selects the mock gateway.
    pub base_url: String,
    pub api_key: String,
    pub secondary_kinds: Vec<SecondaryKind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Absent selects the in-memory job store (non-durable).
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Build settings from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parse_or("SERVER_PORT", 3000),
            },
            queue: QueueSettings {
                capacity: env_parse_or("QUEUE_CAPACITY", 64),
            },
            staging: StagingSettings {
                root_dir: PathBuf::from(env_or("STAGING_DIR", "./staging")),
            },
            analysis: AnalysisSettings {
                base_url: env_or("ANALYSIS_BASE_URL", ""),
                api_key: env_or("ANALYSIS_API_KEY", ""),
                secondary_kinds: parse_secondary_kinds(&env_or(
                    "ANALYSIS_SECONDARY_KINDS",
                    "text_extraction",
                )),
            },
            database: DatabaseSettings {
                url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
                max_connections: env_parse_or("DATABASE_MAX_CONNECTIONS", 5),
            },
            logging: LoggingSettings {
                level: env_or("LOG_LEVEL", "info"),
                enable_json: env_or("LOG_FORMAT", "text").to_lowercase() == "json",
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_secondary_kinds(raw: &str) -> Vec<SecondaryKind> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unknown secondary analysis kind");
                None
            }
        })
        .collect()
}
