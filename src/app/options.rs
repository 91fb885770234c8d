//! Application configuration options

use std::time::Duration;

use crate::storage::layout::StorageLayout;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Storage configuration
    pub storage: StorageOptions,

    /// Server configuration
    pub server: ServerOptions,

    /// Deployment script configuration
    pub script: ScriptOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            storage: StorageOptions::default(),
            server: ServerOptions::default(),
            script: ScriptOptions::default(),
        }
    }
}

/// Lifecycle options for the service
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Storage configuration options
#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
    /// Storage layout paths
    pub layout: StorageLayout,
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Deployment script options
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Program to execute for a deployment attempt
    pub program: String,

    /// Arguments passed to the program
    pub args: Vec<String>,

    /// Export request parameters as DEPLOY_* environment variables
    pub forward_params: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            program: "/usr/local/bin/deploy.sh".to_string(),
            args: Vec::new(),
            forward_params: true,
        }
    }
}
