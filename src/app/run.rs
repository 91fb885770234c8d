//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::deploy::coordinator::{Coordinator, CoordinatorHandle};
use crate::deploy::runner::ShellLauncher;
use crate::errors::DeployerError;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::storage::store::StateStore;

/// Run the deployer service
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DeployerError> {
    info!("Initializing deployerd...");

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.lifecycle.clone());

    if let Err(e) = init(&options, shutdown_tx.clone(), &mut shutdown_manager).await {
        error!("Failed to start service: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    // Shutdown
    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    options: &AppOptions,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), DeployerError> {
    options.storage.layout.setup().await?;
    let store = StateStore::new(&options.storage.layout);

    let launcher = Arc::new(ShellLauncher::new(
        options.script.program.clone(),
        options.script.args.clone(),
        options.script.forward_params,
    ));

    info!("Initializing deployment coordinator...");
    let (coordinator, coordinator_join) = Coordinator::spawn(store, launcher).await;
    shutdown_manager.with_coordinator(coordinator.clone(), coordinator_join)?;

    info!("Initializing local HTTP server...");
    let server_state = ServerState::new(coordinator);
    let mut shutdown_rx = shutdown_tx.subscribe();
    let server_handle = serve(&options.server, Arc::new(server_state), async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;
    shutdown_manager.with_socket_server_handle(server_handle)?;

    Ok(())
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    lifecycle_options: LifecycleOptions,
    coordinator: Option<(CoordinatorHandle, JoinHandle<()>)>,
    socket_server_handle: Option<JoinHandle<Result<(), DeployerError>>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            shutdown_tx,
            lifecycle_options,
            coordinator: None,
            socket_server_handle: None,
        }
    }

    pub fn with_coordinator(
        &mut self,
        handle: CoordinatorHandle,
        join: JoinHandle<()>,
    ) -> Result<(), DeployerError> {
        if self.coordinator.is_some() {
            return Err(DeployerError::ShutdownError(
                "coordinator already set".to_string(),
            ));
        }
        self.coordinator = Some((handle, join));
        Ok(())
    }

    pub fn with_socket_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), DeployerError>>,
    ) -> Result<(), DeployerError> {
        if self.socket_server_handle.is_some() {
            return Err(DeployerError::ShutdownError(
                "server_handle already set".to_string(),
            ));
        }
        self.socket_server_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), DeployerError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            self.shutdown_impl(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.lifecycle_options.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), DeployerError> {
        info!("Shutting down deployerd...");

        // 1. Socket server (stops producing coordinator commands)
        if let Some(handle) = self.socket_server_handle.take() {
            handle
                .await
                .map_err(|e| DeployerError::ShutdownError(e.to_string()))??;
        }

        // 2. Coordinator
        if let Some((handle, join)) = self.coordinator.take() {
            handle.shutdown().await;
            join.await
                .map_err(|e| DeployerError::ShutdownError(e.to_string()))?;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
