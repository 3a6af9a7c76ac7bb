use std::path::Path;
use std::sync::Once;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

mod schema;

pub use schema::json_schema;

static TRACING_INIT: Once = Once::new();

/// Evaluator configuration loaded from TOML.
///
/// ```toml
/// [logging]
/// level = "debug"
/// json = false
///
/// [resolution]
/// max_conversion_depth = 64
///
/// [invocation]
/// allow_side_effects = true
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    /// Logging settings for the evaluator crates.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Type algebra and overload resolution limits.
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Live host access.
    #[serde(default)]
    pub invocation: InvocationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            // Anything else is an `EnvFilter` directive string.
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, merged with `RUST_LOG` when it is set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);
        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ResolutionConfig {
    /// Recursion bound for conversion checks between deeply nested generic types.
    ///
    /// Checks that exceed it answer "not convertible".
    #[serde(default = "ResolutionConfig::default_max_conversion_depth")]
    #[schemars(range(min = 1))]
    pub max_conversion_depth: usize,
}

impl ResolutionConfig {
    fn default_max_conversion_depth() -> usize {
        64
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_conversion_depth: Self::default_max_conversion_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InvocationConfig {
    /// When disabled, constructor and method calls and field stores are refused. Hover-style
    /// evaluation runs with this off.
    #[serde(default = "InvocationConfig::default_allow_side_effects")]
    pub allow_side_effects: bool,
}

impl InvocationConfig {
    fn default_allow_side_effects() -> bool {
        true
    }
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            allow_side_effects: Self::default_allow_side_effects(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a source snippet; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl EvalConfig {
    /// Parse and validate a TOML document.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: EvalConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::load_from_str(&text)?;
        tracing::debug!(
            target = "brew.config",
            path = %path.display(),
            allow_side_effects = config.invocation.allow_side_effects,
            "loaded evaluator config"
        );
        Ok(config)
    }

    /// Semantic checks the TOML grammar cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.max_conversion_depth == 0 {
            return Err(ConfigError::Invalid(
                "resolution.max_conversion_depth must be >= 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Installs the global `tracing` subscriber.
///
/// Safe to call more than once; only the first call has any effect. Library crates never call
/// this themselves.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(make_writer())
                        .with_ansi(false),
                )
                .try_init()
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(make_writer())
                        .with_ansi(false),
                )
                .try_init()
        };
        if let Err(err) = result {
            // Another subscriber was installed first (e.g. by the embedding process).
            tracing::debug!(target = "brew.config", error = %err, "tracing already initialized");
        }
    });
}

fn make_writer() -> BoxMakeWriter {
    // `cargo test` output capture only works for the stdlib's print macros.
    if cfg!(debug_assertions) {
        BoxMakeWriter::new(tracing_subscriber::fmt::writer::TestWriter::with_stderr)
    } else {
        BoxMakeWriter::new(std::io::stderr)
    }
}
