//! Tracing/logging initialization.
//!
//! JSON logs by default (one object per line, with timestamps); plain text is
//! available for local runs via `LIBRIS_LOG_FORMAT=text`.

use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_VAR: &str = "LIBRIS_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// Parse a format name; anything unrecognized falls back to JSON.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "plain" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive string, e.g. `info,libris_lending=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Json,
        }
    }
}

impl ObservabilityConfig {
    /// Read `RUST_LOG` and `LIBRIS_LOG_FORMAT`, defaulting when unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            filter: lookup(EnvFilter::DEFAULT_ENV)
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(defaults.filter),
            format: lookup(LOG_FORMAT_VAR)
                .map(|raw| LogFormat::parse(&raw))
                .unwrap_or(defaults.format),
        }
    }
}

/// Initialize tracing/logging for the process from the environment.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with(&ObservabilityConfig::from_env());
}

/// Initialize tracing/logging with `config`.
///
/// An invalid filter falls back to `info` rather than failing startup.
pub fn init_with(config: &ObservabilityConfig) {
    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_defaults_to_json() {
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse(" Pretty "), LogFormat::Text);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("yaml"), LogFormat::Json);
    }

    #[test]
    fn config_reads_lookup_values() {
        let config = ObservabilityConfig::from_lookup(|key| match key {
            "RUST_LOG" => Some("debug,libris_lending=trace".to_string()),
            LOG_FORMAT_VAR => Some("text".to_string()),
            _ => None,
        });
        assert_eq!(config.filter, "debug,libris_lending=trace");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn blank_filter_uses_default() {
        let config = ObservabilityConfig::from_lookup(|key| match key {
            "RUST_LOG" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config, ObservabilityConfig::default());
    }

    #[test]
    fn init_is_idempotent() {
        init_with(&ObservabilityConfig::default());
        init_with(&ObservabilityConfig {
            filter: "not a [valid filter".to_string(),
            format: LogFormat::Text,
        });
    }
}
