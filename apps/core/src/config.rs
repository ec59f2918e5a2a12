use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

use crate::analysis::{IntensityPolicy, DEFAULT_CONCERN_LABEL};
use crate::error::AppError;

const ENV_DATABASE_URL: &str = "MINDSCOPE_DATABASE_URL";
const ENV_TAXONOMY_PATH: &str = "MINDSCOPE_TAXONOMY_PATH";
const ENV_LEXICON_PATH: &str = "MINDSCOPE_LEXICON_PATH";
const ENV_CONCERN_LABEL: &str = "MINDSCOPE_CONCERN_LABEL";
const ENV_USER_ID: &str = "MINDSCOPE_USER_ID";
const ENV_LOG_FORMAT: &str = "MINDSCOPE_LOG_FORMAT";
const ENV_INTENSITY_POLICY: &str = "MINDSCOPE_INTENSITY_POLICY";

/// The user entries are attributed to when the caller has no identity model
const DEFAULT_USER_ID: &str = "1";

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// Bunyan-style JSON lines
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("Unknown log format '{}'", other))),
        }
    }
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    /// SQLite URL for mirroring entries; `None` keeps the timeline in memory only.
    pub database_url: Option<String>,
    /// Taxonomy JSON file; `None` uses the embedded taxonomy.
    pub taxonomy_path: Option<PathBuf>,
    /// Valence lexicon file; `None` uses the embedded lexicon.
    pub lexicon_path: Option<PathBuf>,
    /// Span label the extractor keeps.
    #[validate(length(min = 1))]
    pub concern_label: String,
    /// User id attached to entries from the CLI.
    #[validate(length(min = 1))]
    pub user_id: String,
    pub log_format: LogFormat,
    pub intensity_policy: IntensityPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            taxonomy_path: None,
            lexicon_path: None,
            concern_label: DEFAULT_CONCERN_LABEL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            log_format: LogFormat::default(),
            intensity_policy: IntensityPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, after reading a `.env` file if present.
    pub fn load() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Load from the process environment only.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            database_url: non_empty_var(ENV_DATABASE_URL),
            taxonomy_path: non_empty_var(ENV_TAXONOMY_PATH).map(PathBuf::from),
            lexicon_path: non_empty_var(ENV_LEXICON_PATH).map(PathBuf::from),
            concern_label: env::var(ENV_CONCERN_LABEL).unwrap_or(defaults.concern_label),
            user_id: env::var(ENV_USER_ID).unwrap_or(defaults.user_id),
            log_format: non_empty_var(ENV_LOG_FORMAT)
                .map(|v| v.parse::<LogFormat>())
                .transpose()?
                .unwrap_or_default(),
            intensity_policy: non_empty_var(ENV_INTENSITY_POLICY)
                .map(|v| v.parse::<IntensityPolicy>())
                .transpose()?
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
