//! Settings file management

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;

/// Service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Deployment script configuration
    #[serde(default)]
    pub script: ScriptSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            server: ServerSettings::default(),
            script: ScriptSettings::default(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Deployment script settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSettings {
    /// Program to execute for a deployment attempt
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,

    /// Export request parameters as DEPLOY_* environment variables
    #[serde(default = "default_true")]
    pub forward_params: bool,
}

fn default_program() -> String {
    "/usr/local/bin/deploy.sh".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            forward_params: true,
        }
    }
}
