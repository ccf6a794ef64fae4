//! Configuration management for termhop.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::session::SessionConfig;
use crate::transport::DEFAULT_SSH_PORT;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SSH connection settings.
    pub ssh: SshSection,
    /// Command execution settings.
    pub execution: ExecutionSection,
    /// Completion lookup settings.
    pub completion: CompletionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// SSH configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSection {
    /// Default port.
    pub port: u16,
    /// Connection timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SshSection {
    fn default() -> Self {
        Self {
            port: DEFAULT_SSH_PORT,
            timeout_secs: 10,
        }
    }
}

/// Command execution section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Per-command timeout in seconds.
    pub timeout_secs: u64,
    /// Shell program for local sessions.
    pub shell: Option<String>,
    /// Initial directory for local sessions.
    pub start_directory: Option<String>,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            shell: None,
            start_directory: None,
        }
    }
}

/// Completion lookup section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSection {
    /// Timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CompletionSection {
    fn default() -> Self {
        Self { timeout_secs: 2 }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup (for testing).
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(port) = lookup("TERMHOP_SSH_PORT").and_then(|v| v.trim().parse().ok()) {
            self.ssh.port = port;
        }
        if let Some(secs) = number("TERMHOP_SSH_TIMEOUT") {
            self.ssh.timeout_secs = secs;
        }
        if let Some(secs) = number("TERMHOP_COMMAND_TIMEOUT") {
            self.execution.timeout_secs = secs;
        }
        if let Some(secs) = number("TERMHOP_COMPLETION_TIMEOUT") {
            self.completion.timeout_secs = secs;
        }

        if let Some(level) = lookup("TERMHOP_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(port) = args.port {
            self.ssh.port = port;
        }
        if let Some(ref shell) = args.shell {
            self.execution.shell = Some(shell.clone());
        }
        if let Some(ref dir) = args.directory {
            self.execution.start_directory = Some(dir.clone());
        }
        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env();
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every operation fail immediately.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, secs) in [
            ("ssh.timeout_secs", self.ssh.timeout_secs),
            ("execution.timeout_secs", self.execution.timeout_secs),
            ("completion.timeout_secs", self.completion.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    /// Session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            connect_timeout: Duration::from_secs(self.ssh.timeout_secs),
            command_timeout: Duration::from_secs(self.execution.timeout_secs),
            completion_timeout: Duration::from_secs(self.completion.timeout_secs),
            shell: self.execution.shell.clone(),
            start_directory: self.execution.start_directory.clone(),
        }
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A value is out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
