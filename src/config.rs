/*!
 * Configuration types for Meshlink
 */

use meshlink_connect::{ErrorPolicy, SessionOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MeshlinkError, Result};
use crate::path::NameTables;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the meshing application's gRPC server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-call timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Session identifier attached to every call
    #[serde(default)]
    pub session_id: Option<String>,

    /// What to do with transport errors (suppress, propagate)
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Paths under this prefix are executed as queries
    #[serde(default = "default_query_prefix")]
    pub query_prefix: String,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            session_id: None,
            error_policy: ErrorPolicy::default(),
            query_prefix: default_query_prefix(),
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_endpoint() -> String {
    "http://127.0.0.1:50055".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

fn default_query_prefix() -> String {
    "/query/".to_string()
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            MeshlinkError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MeshlinkError::Config(format!("cannot serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Configuration that surfaces every transport error
    pub fn strict_preset() -> Self {
        Self {
            error_policy: ErrorPolicy::Propagate,
            ..Default::default()
        }
    }

    /// Channel settings for `meshlink_connect::Session::connect`
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            endpoint: self.endpoint.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            session_id: self.session_id.clone(),
            error_policy: self.error_policy,
        }
    }

    /// Naming tables with this configuration's query namespace
    pub fn name_tables(&self) -> NameTables {
        NameTables::default().with_query_prefix(self.query_prefix.clone())
    }
}
