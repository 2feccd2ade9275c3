//! CLI configuration management
//!
//! Builds the effective configuration from CLI flags, environment variables,
//! the TOML configuration file and defaults, in that order of precedence.
//!
//! The configuration file is an engine configuration with an optional
//! `[cli]` table for the settings that only concern the binary:
//!
//! ```toml
//! version = 1
//! stress_severities = [0.01, 0.05, 0.10]
//!
//! [cli]
//! log_level = "debug"
//! format = "json"
//! ```

use crate::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tranche_core::EngineConfig;

/// Environment variable naming the configuration file.
pub const ENV_CONFIG: &str = "TRANCHE_CONFIG";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "TRANCHE_LOG_LEVEL";
/// Environment variable overriding the output format.
pub const ENV_FORMAT: &str = "TRANCHE_FORMAT";

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(CliError::InvalidFormat(s.to_string())),
        }
    }
}

/// Effective configuration for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Log level for the tracing subscriber
    pub log_level: LogLevel,
    /// Output format
    pub format: OutputFormat,
    /// Engine configuration
    pub engine: EngineConfig,
    /// File the engine configuration was loaded from
    pub source: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            format: OutputFormat::default(),
            engine: EngineConfig::default(),
            source: None,
        }
    }
}

/// CLI arguments relevant to configuration
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Output format override
    pub format: Option<String>,
    /// Shorthand for debug logging
    pub verbose: bool,
}

/// `[cli]` table of the configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliSection {
    log_level: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    cli: CliSection,
}

/// Load the engine configuration and `[cli]` table from a TOML file
fn load_file(path: &Path) -> Result<(EngineConfig, CliSection)> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let engine = EngineConfig::from_toml_str(&content)?;
    let file: ConfigFile = toml::from_str(&content).map_err(|e| {
        CliError::InvalidArgument(format!("Failed to parse [cli] table: {}", e))
    })?;
    Ok((engine, file.cli))
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig> {
    build_config_with_env(cli, |key| std::env::var(key).ok())
}

/// [`build_config`] with an explicit environment lookup
pub fn build_config_with_env<F>(cli: &CliArgs, env: F) -> Result<CliConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = CliConfig::default();

    // Config file
    let path = cli
        .config_file
        .clone()
        .or_else(|| env(ENV_CONFIG).map(PathBuf::from));
    if let Some(path) = path {
        let (engine, section) = load_file(&path)?;
        config.engine = engine;
        if let Some(level) = section.log_level {
            config.log_level = level.parse()?;
        }
        if let Some(format) = section.format {
            config.format = format.parse()?;
        }
        config.source = Some(path);
    }

    // Environment variables
    if let Some(level) = env(ENV_LOG_LEVEL) {
        config.log_level = level.parse()?;
    }
    if let Some(format) = env(ENV_FORMAT) {
        config.format = format.parse()?;
    }

    // CLI arguments
    if cli.verbose {
        config.log_level = LogLevel::Debug;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.parse()?;
    }
    if let Some(format) = &cli.format {
        config.format = format.parse()?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tranche_cli_{}_{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(format!("{}", LogLevel::Trace), "trace");
        assert_eq!(format!("{}", LogLevel::Warn), "warn");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("TABLE").unwrap(), OutputFormat::Table);
        assert!(matches!(
            OutputFormat::from_str("csv"),
            Err(CliError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_build_config_with_defaults() {
        let config = build_config_with_env(&CliArgs::default(), no_env).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_cli_overrides_env() {
        let env: HashMap<&str, &str> = [(ENV_LOG_LEVEL, "error"), (ENV_FORMAT, "json")].into();
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let config = build_config_with_env(&CliArgs::default(), lookup).unwrap();
        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(config.format, OutputFormat::Json);

        let cli = CliArgs {
            log_level: Some("trace".to_string()),
            format: Some("table".to_string()),
            ..Default::default()
        };
        let config = build_config_with_env(&cli, lookup).unwrap();
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.format, OutputFormat::Table);
    }

    #[test]
    fn test_verbose_sets_debug() {
        let cli = CliArgs {
            verbose: true,
            ..Default::default()
        };
        let config = build_config_with_env(&cli, no_env).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_file_layer() {
        let path = write_config(
            "file_layer",
            r#"
                stress_severities = [0.01, 0.02]

                [cli]
                log_level = "info"
                format = "json"
            "#,
        );
        let cli = CliArgs {
            config_file: Some(path.clone()),
            ..Default::default()
        };
        let config = build_config_with_env(&cli, no_env).unwrap();
        assert_eq!(config.engine.stress_severities, vec![0.01, 0.02]);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));

        // Environment beats the file
        let config = build_config_with_env(&cli, |key| {
            (key == ENV_LOG_LEVEL).then(|| "error".to_string())
        })
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Error);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_config_path_from_env() {
        let path = write_config("env_path", "stress_severities = [0.3]\n");
        let path_str = path.display().to_string();
        let config = build_config_with_env(&CliArgs::default(), |key| {
            (key == ENV_CONFIG).then(|| path_str.clone())
        })
        .unwrap();
        assert_eq!(config.engine.stress_severities, vec![0.3]);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let cli = CliArgs {
            config_file: Some(PathBuf::from("/nonexistent/tranche.toml")),
            ..Default::default()
        };
        assert!(matches!(
            build_config_with_env(&cli, no_env),
            Err(CliError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_engine_config_in_file() {
        let path = write_config("invalid_engine", "version = 7\n");
        let cli = CliArgs {
            config_file: Some(path.clone()),
            ..Default::default()
        };
        assert!(matches!(
            build_config_with_env(&cli, no_env),
            Err(CliError::Engine(_))
        ));
        std::fs::remove_file(path).unwrap();
    }
}
