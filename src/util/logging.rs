//! Structured logging setup for deployorder
//!
//! Initializes the `tracing` subscriber used by the library and the CLI. Output
//! goes to stderr so that command output on stdout stays machine-readable.
//!
//! # Features
//!
//! - Console output with pretty formatting (default)
//! - Optional JSON output for production environments
//! - Environment-based configuration via `RUST_LOG`
//! - Thread-safe, can only be initialized once
//!
//! # Example
//!
//! ```no_run
//! use deployorder::util::logging;
//!
//! logging::init_from_env();
//!
//! tracing::info!(stage = "parse", "Registering deployers");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., deployorder::sort) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with locations and thread ids
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    /// Reads `DEPLOYORDER_LOG_LEVEL` (default info) and `DEPLOYORDER_LOG_JSON`
    /// (default false).
    pub fn from_env() -> Self {
        let level = env::var("DEPLOYORDER_LOG_LEVEL")
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);

        let use_json = env::var("DEPLOYORDER_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

/// Parses a log level, falling back to INFO for anything unrecognised.
///
/// ```
/// use deployorder::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            if let Ok(directive) = format!("deployorder={}", config.level).parse() {
                filter = filter.add_directive(directive);
            }
        }

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `DEPLOYORDER_LOG_LEVEL` and `DEPLOYORDER_LOG_JSON`.
pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("invalid"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.include_target);
        assert!(!config.include_location);
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert!(config.use_json);
        assert!(config.include_location);
        assert!(config.include_thread_ids);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.use_json);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_to_info() {
        let saved: Vec<(&str, Option<String>)> = ["DEPLOYORDER_LOG_LEVEL", "DEPLOYORDER_LOG_JSON"]
            .into_iter()
            .map(|key| (key, env::var(key).ok()))
            .collect();
        for (key, _) in &saved {
            env::remove_var(key);
        }

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);

        env::set_var("DEPLOYORDER_LOG_LEVEL", "trace");
        env::set_var("DEPLOYORDER_LOG_JSON", "true");
        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::TRACE);
        assert!(config.use_json);

        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_with_level() {
        assert_eq!(LoggingConfig::with_level(Level::WARN).level, Level::WARN);
    }
}
