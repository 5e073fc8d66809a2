//! Configuration management for deployorder
//!
//! Settings are read from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `DEPLOYORDER_LOG_LEVEL`: Logging level - default: "info"
//! - `DEPLOYORDER_TIE_BREAK`: Secondary sort key (registration|name) - default: "registration"
//! - `DEPLOYORDER_VERIFY_ORDER`: Re-check every computed order against the graph (true|false) - default: "false"
//! - `DEPLOYORDER_STAGES`: Comma-separated lifecycle stages in processing order -
//!   default: "parse,describe,classloader,real,installed"
//!
//! # Example
//!
//! ```no_run
//! use deployorder::DeployOrderConfig;
//!
//! let config = DeployOrderConfig::from_env().expect("Invalid environment");
//! config.validate().expect("Invalid configuration");
//! ```

use crate::sort::TieBreak;
use crate::stage;
use std::collections::HashSet;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_VERIFY_ORDER: bool = false;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid tie-break: {0}. Valid options: registration, name")]
    InvalidTieBreak(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOrderConfig {
    pub log_level: String,
    pub tie_break: TieBreak,
    pub verify_order: bool,
    /// Lifecycle stages in processing order
    pub stages: Vec<String>,
}

impl Default for DeployOrderConfig {
    /// Loads from the environment, falling back to built-in defaults when a
    /// variable cannot be parsed.
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring invalid environment configuration");
            Self::builtin()
        })
    }
}

impl DeployOrderConfig {
    /// Built-in defaults, ignoring the environment
    pub fn builtin() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            tie_break: TieBreak::default(),
            verify_order: DEFAULT_VERIFY_ORDER,
            stages: stage::standard_stages(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::builtin();

        let log_level = env::var("DEPLOYORDER_LOG_LEVEL")
            .unwrap_or(defaults.log_level)
            .to_lowercase();

        let tie_break = match env::var("DEPLOYORDER_TIE_BREAK") {
            Ok(v) => v
                .parse::<TieBreak>()
                .map_err(|_| ConfigError::InvalidTieBreak(v))?,
            Err(_) => defaults.tie_break,
        };

        let verify_order =
            parse_var::<bool>("DEPLOYORDER_VERIFY_ORDER")?.unwrap_or(defaults.verify_order);

        let stages = env::var("DEPLOYORDER_STAGES")
            .ok()
            .map(|v| parse_stage_list(&v))
            .unwrap_or(defaults.stages);

        Ok(Self {
            log_level,
            tie_break,
            verify_order,
            stages,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.stages.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one stage must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if stage.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "Stage names must not be empty".to_string(),
                ));
            }
            if !seen.insert(stage.as_str()) {
                return Err(ConfigError::ValidationFailed(format!(
                    "Stage '{}' is listed more than once",
                    stage
                )));
            }
        }

        Ok(())
    }
}

fn parse_var<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(v) => v.parse::<T>().map(Some).map_err(|e| ConfigError::ParseError {
            field: key.to_string(),
            error: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

fn parse_stage_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl fmt::Display for DeployOrderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deployorder Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Tie Break: {}", self.tie_break)?;
        writeln!(f, "  Verify Order: {}", self.verify_order)?;
        writeln!(f, "  Stages: {}", self.stages.join(" -> "))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = [
            EnvGuard::unset("DEPLOYORDER_LOG_LEVEL"),
            EnvGuard::unset("DEPLOYORDER_TIE_BREAK"),
            EnvGuard::unset("DEPLOYORDER_VERIFY_ORDER"),
            EnvGuard::unset("DEPLOYORDER_STAGES"),
        ];

        let config = DeployOrderConfig::default();

        assert_eq!(config, DeployOrderConfig::builtin());
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.tie_break, TieBreak::Registration);
        assert!(!config.verify_order);
        assert_eq!(config.stages, stage::standard_stages());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = [
            EnvGuard::set("DEPLOYORDER_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("DEPLOYORDER_TIE_BREAK", "name"),
            EnvGuard::set("DEPLOYORDER_VERIFY_ORDER", "true"),
            EnvGuard::set("DEPLOYORDER_STAGES", "parse, real ,"),
        ];

        let config = DeployOrderConfig::from_env().unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.tie_break, TieBreak::Name);
        assert!(config.verify_order);
        assert_eq!(config.stages, vec!["parse", "real"]);
    }

    #[test]
    #[serial]
    fn test_invalid_tie_break() {
        let _guard = EnvGuard::set("DEPLOYORDER_TIE_BREAK", "hash");

        let err = DeployOrderConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTieBreak(ref v) if v == "hash"));

        let fallback = DeployOrderConfig::default();
        assert_eq!(fallback.tie_break, TieBreak::Registration);
    }

    #[test]
    #[serial]
    fn test_invalid_verify_flag() {
        let _guard = EnvGuard::set("DEPLOYORDER_VERIFY_ORDER", "sometimes");

        let err = DeployOrderConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("DEPLOYORDER_VERIFY_ORDER"));
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let config = DeployOrderConfig {
            log_level: "loud".to_string(),
            ..DeployOrderConfig::builtin()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_stages() {
        let config = DeployOrderConfig {
            stages: vec![],
            ..DeployOrderConfig::builtin()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_duplicate_stage() {
        let config = DeployOrderConfig {
            stages: vec!["parse".to_string(), "parse".to_string()],
            ..DeployOrderConfig::builtin()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_config_display() {
        let display = DeployOrderConfig::builtin().to_string();
        assert!(display.contains("Deployorder Configuration:"));
        assert!(display.contains("parse -> describe"));
    }
}
