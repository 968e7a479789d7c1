use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::pipeline::extraction::{AnalysisEngine, RuleBasedEngine, RULE_BASED_ENGINE};

/// Application-level constants
pub const APP_NAME: &str = "MedInsight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_DB_PATH: &str = "MEDINSIGHT_DB_PATH";
pub const ENV_ENGINE: &str = "MEDINSIGHT_ENGINE";
pub const ENV_LOG: &str = "MEDINSIGHT_LOG";

/// ~/MedInsight/, falling back to the temp dir when no home is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

pub fn default_database_path() -> PathBuf {
    app_data_dir().join("medinsight.db")
}

/// Debug builds log the library at debug level.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "medinsight_lib=debug,medinsight=debug"
    } else {
        "medinsight_lib=info,medinsight=info"
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Unknown analysis engine: {0}")]
    UnknownEngine(String),
}

/// Which `AnalysisEngine` implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    #[default]
    RuleBased,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleBased => RULE_BASED_ENGINE,
        }
    }

    pub fn build(&self) -> Box<dyn AnalysisEngine + Send + Sync> {
        match self {
            Self::RuleBased => Box::new(RuleBasedEngine::new()),
        }
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rule_based" | "rule-based" | "rules" => Ok(Self::RuleBased),
            other => Err(ConfigError::UnknownEngine(other.to_string())),
        }
    }
}

/// Process configuration, resolved once at startup and passed down.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub engine: EngineKind,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            engine: EngineKind::default(),
            log_filter: default_log_filter().to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_DB_PATH) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(engine) = get(ENV_ENGINE) {
            config.engine = engine.parse()?;
        }
        if let Some(filter) = get(ENV_LOG) {
            config.log_filter = filter;
        }
        Ok(config)
    }
}
