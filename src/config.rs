// Configuration File Support
//
// This module provides configuration file parsing for the netops-mcp servers.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from the XDG config directory: ~/.config/netops-mcp/config.toml

use crate::tools::{DEFAULT_MAX_OUTPUT_BYTES, MANUAL_TIMEOUT_SECS, PROXY_TIMEOUT_SECS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Listener configuration
    pub server: ServerConfig,

    /// Curl proxy configuration
    pub curl: CurlConfig,

    /// BIG-IP connection settings
    pub bigip: BigIpConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// HTTP listener configuration shared by both servers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Port for the curl proxy server
    pub curl_port: u16,

    /// Port for the BIG-IP server
    pub bigip_port: u16,

    /// Path the MCP endpoint is mounted on
    pub path: String,

    /// Serve MCP without sessions (every request stands alone)
    pub stateless: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            curl_port: 8082,
            bigip_port: 8081,
            path: "/mcp".to_string(),
            stateless: true,
        }
    }
}

/// Curl proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurlConfig {
    /// Program to run (name on PATH or absolute path)
    pub program: String,

    /// Timeout in seconds for proxied invocations
    pub timeout_secs: u64,

    /// Timeout in seconds for each manual/help lookup
    pub manual_timeout_secs: u64,

    /// Maximum captured bytes per output stream
    pub max_output_bytes: usize,

    /// Working directory for the client process
    pub working_dir: Option<String>,
}

impl Default for CurlConfig {
    fn default() -> Self {
        Self {
            program: "curl".to_string(),
            timeout_secs: PROXY_TIMEOUT_SECS,
            manual_timeout_secs: MANUAL_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            working_dir: None,
        }
    }
}

/// BIG-IP connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BigIpConfig {
    /// Management host (`10.1.1.4`, `bigip.example.com:8443` or a full URL)
    pub host: Option<String>,

    /// Username for basic auth
    pub username: Option<String>,

    /// Password for basic auth
    pub password: Option<String>,

    /// Whether to verify the appliance's TLS certificate
    pub verify_tls: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BigIpConfig {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            password: None,
            verify_tls: false,
            timeout_secs: 30,
        }
    }
}

impl BigIpConfig {
    /// Ensure host and credentials are present
    ///
    /// # Errors
    ///
    /// Names the first missing setting and the environment variable that
    /// provides it.
    pub fn validate(&self) -> Result<()> {
        let required = [
            (&self.host, "host", "F5_HOST"),
            (&self.username, "username", "F5_USER"),
            (&self.password, "password", "F5_PASS"),
        ];
        for (value, name, var) in required {
            if value.as_deref().map_or(true, str::is_empty) {
                anyhow::bail!("BIG-IP {} is not configured (set {} or bigip.{})", name, var, name);
            }
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("BIG-IP timeout must be > 0");
        }
        Ok(())
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether to expose /metrics on the server
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            curl: CurlConfig::default(),
            bigip: BigIpConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, returns default configuration
    /// with environment overrides applied.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or if
    /// the result fails validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file from {:?}", path))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file from {:?}", path))?;

            tracing::info!("Loaded configuration from {:?}", path);
            config
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        let config = config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/netops-mcp/config.toml` on Linux
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "netops-mcp", "netops-mcp") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            // Fallback if XDG dirs cannot be determined
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config").join("netops-mcp").join("config.toml")
        }
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - NETOPS_LOG_LEVEL, NETOPS_LOG_FORMAT
    /// - NETOPS_BIND_HOST, NETOPS_CURL_PORT, NETOPS_BIGIP_PORT
    /// - NETOPS_CURL_PROGRAM, NETOPS_CURL_TIMEOUT_SECS
    /// - NETOPS_METRICS_ENABLED
    /// - F5_HOST, F5_USER, F5_PASS, F5_VERIFY_TLS
    ///
    /// Values that fail to parse are ignored.
    fn apply_env_overrides(mut self) -> Self {
        // Logging overrides
        if let Ok(level) = std::env::var("NETOPS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("NETOPS_LOG_FORMAT") {
            self.logging.format = format;
        }

        // Listener overrides
        if let Ok(host) = std::env::var("NETOPS_BIND_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NETOPS_CURL_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.curl_port = port;
            }
        }
        if let Ok(port) = std::env::var("NETOPS_BIGIP_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.bigip_port = port;
            }
        }

        // Curl overrides
        if let Ok(program) = std::env::var("NETOPS_CURL_PROGRAM") {
            self.curl.program = program;
        }
        if let Ok(secs) = std::env::var("NETOPS_CURL_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                if secs > 0 {
                    self.curl.timeout_secs = secs;
                }
            }
        }

        // Metrics overrides
        if let Ok(enabled) = std::env::var("NETOPS_METRICS_ENABLED") {
            self.metrics.enabled = enabled.parse().unwrap_or(self.metrics.enabled);
        }

        // BIG-IP settings use the appliance's conventional variable names
        if let Ok(host) = std::env::var("F5_HOST") {
            self.bigip.host = Some(host);
        }
        if let Ok(user) = std::env::var("F5_USER") {
            self.bigip.username = Some(user);
        }
        if let Ok(pass) = std::env::var("F5_PASS") {
            self.bigip.password = Some(pass);
        }
        if let Ok(verify) = std::env::var("F5_VERIFY_TLS") {
            self.bigip.verify_tls = verify.parse().unwrap_or(self.bigip.verify_tls);
        }

        self
    }

    /// Validate the configuration
    ///
    /// BIG-IP credentials are checked separately by [`BigIpConfig::validate`]
    /// since only the BIG-IP server needs them.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}. Must be one of: trace, debug, info, warn, error", self.logging.level),
        }

        // Validate logging format
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!("Invalid log format: {}. Must be one of: json, pretty, compact", self.logging.format),
        }

        // Validate listener
        if !self.server.path.starts_with('/') {
            anyhow::bail!("Server path must start with '/': {}", self.server.path);
        }

        // Validate curl proxy
        if self.curl.program.trim().is_empty() {
            anyhow::bail!("Curl program must not be empty");
        }
        if self.curl.timeout_secs == 0 || self.curl.manual_timeout_secs == 0 {
            anyhow::bail!("Curl timeouts must be > 0");
        }
        if self.curl.max_output_bytes == 0 {
            anyhow::bail!("Curl max_output_bytes must be > 0");
        }

        Ok(())
    }
}
