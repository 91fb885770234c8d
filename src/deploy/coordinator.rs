//! Deployment job coordinator
//!
//! An actor owning the three shared values of the service: the status
//! scalar, the last-outcome scalar, and the log blob. HTTP handlers and the
//! process runner both talk to it through one mpsc mailbox, so every
//! mutation happens on a single logical owner even on a multi-threaded
//! runtime.
//!
//! The admission check is the core contract: while a deployment is in
//! flight, a second request is answered with the current state and never
//! spawns a second process.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::deploy::log_buffer::{LogBuffer, DEFAULT_TAIL_LINES};
use crate::deploy::runner::{DeployParams, RunnerEvent, ScriptLauncher, StreamSource};
use crate::deploy::status::{DeployStatus, LastOutcome};
use crate::errors::DeployerError;
use crate::storage::store::StateStore;
use crate::utils::generate_uuid;

/// Line the log blob is replaced with after a successful attempt
pub const SUCCESS_LOG_LINE: &str = "Deployment finished successfully.";

/// Mailbox capacity for the coordinator actor
const MAILBOX_CAPACITY: usize = 64;

/// Admission decision for a deployment request
#[derive(Debug, Clone)]
pub enum DeployDecision {
    /// A new attempt was started
    Started { status: DeployStatus },

    /// An attempt is already in flight; no process was spawned
    Rejected { status: DeployStatus, logs: String },
}

/// Snapshot of the coordinator state for status queries
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub status: DeployStatus,
    pub outcome: LastOutcome,
    pub logs: String,
}

enum CoordinatorMsg {
    Deploy {
        params: DeployParams,
        reply: oneshot::Sender<DeployDecision>,
    },
    Status {
        full: bool,
        reply: oneshot::Sender<StatusReport>,
    },
    Event(RunnerEvent),
    Shutdown,
}

/// Sender half handed to a launcher for one deployment attempt
///
/// Sends are best-effort: once the coordinator is gone (shutdown), events
/// are silently dropped.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::Sender<CoordinatorMsg>,
}

impl EventSink {
    pub async fn output(&self, source: StreamSource, line: String) {
        let _ = self
            .tx
            .send(CoordinatorMsg::Event(RunnerEvent::Output { source, line }))
            .await;
    }

    pub async fn exit(&self, code: i32) {
        let _ = self
            .tx
            .send(CoordinatorMsg::Event(RunnerEvent::Exit { code }))
            .await;
    }

    pub async fn spawn_failed(&self, error: String) {
        let _ = self
            .tx
            .send(CoordinatorMsg::Event(RunnerEvent::SpawnFailed { error }))
            .await;
    }
}

/// Cloneable handle for talking to the coordinator actor
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordinatorMsg>,
}

impl CoordinatorHandle {
    /// Request a deployment; never blocks on process completion
    pub async fn request_deploy(
        &self,
        params: DeployParams,
    ) -> Result<DeployDecision, DeployerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CoordinatorMsg::Deploy { params, reply })
            .await
            .map_err(|_| DeployerError::CoordinatorError("coordinator is gone".to_string()))?;
        rx.await
            .map_err(|_| DeployerError::CoordinatorError("coordinator dropped reply".to_string()))
    }

    /// Read current status, last outcome, and a log view
    pub async fn status(&self, full: bool) -> Result<StatusReport, DeployerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CoordinatorMsg::Status { full, reply })
            .await
            .map_err(|_| DeployerError::CoordinatorError("coordinator is gone".to_string()))?;
        rx.await
            .map_err(|_| DeployerError::CoordinatorError("coordinator dropped reply".to_string()))
    }

    /// Stop the actor loop
    pub async fn shutdown(&self) {
        let _ = self.tx.send(CoordinatorMsg::Shutdown).await;
    }
}

/// The coordinator actor
pub struct Coordinator {
    store: StateStore,
    launcher: Arc<dyn ScriptLauncher>,
    log: LogBuffer,
    status: DeployStatus,
    outcome: LastOutcome,
    attempt_id: Option<String>,
    tx: mpsc::Sender<CoordinatorMsg>,
    rx: mpsc::Receiver<CoordinatorMsg>,
}

impl Coordinator {
    /// Load persisted state and start the actor loop
    pub async fn spawn(
        store: StateStore,
        launcher: Arc<dyn ScriptLauncher>,
    ) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);

        let status = store.load_status().await;
        let outcome = store.load_outcome().await;
        let log = LogBuffer::from_contents(store.load_log().await);

        if status == DeployStatus::Deploying {
            // No lease expiry exists; a crash mid-deployment strands the
            // persisted status until it is manually reset.
            warn!("Status persisted as deploying at startup; a previous run may have been interrupted");
        }

        let mut coordinator = Self {
            store,
            launcher,
            log,
            status,
            outcome,
            attempt_id: None,
            tx: tx.clone(),
            rx,
        };

        let handle = CoordinatorHandle { tx };
        let join = tokio::spawn(async move {
            coordinator.run().await;
        });

        (handle, join)
    }

    async fn run(&mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                CoordinatorMsg::Deploy { params, reply } => {
                    let decision = self.handle_deploy(params).await;
                    let _ = reply.send(decision);
                }
                CoordinatorMsg::Status { full, reply } => {
                    let _ = reply.send(self.report(full));
                }
                CoordinatorMsg::Event(event) => {
                    self.handle_event(event).await;
                }
                CoordinatorMsg::Shutdown => {
                    info!("Coordinator shutting down...");
                    break;
                }
            }
        }
    }

    async fn handle_deploy(&mut self, params: DeployParams) -> DeployDecision {
        if self.status == DeployStatus::Deploying {
            info!("Deployment request rejected: an attempt is already in flight");
            return DeployDecision::Rejected {
                status: self.status,
                logs: self.log.tail_text(DEFAULT_TAIL_LINES),
            };
        }

        let attempt_id = generate_uuid();
        info!("Starting deployment attempt {}", attempt_id);

        self.status = DeployStatus::Deploying;
        self.store.save_status(self.status).await;

        self.log.clear();
        self.store.save_log("").await;

        self.attempt_id = Some(attempt_id);

        let sink = EventSink {
            tx: self.tx.clone(),
        };
        self.launcher.launch(&params, sink).await;

        DeployDecision::Started {
            status: self.status,
        }
    }

    async fn handle_event(&mut self, event: RunnerEvent) {
        match event {
            RunnerEvent::Output { source, line } => {
                if self.status != DeployStatus::Deploying {
                    debug!("Ignoring process output with no deployment in flight");
                    return;
                }

                // Diagnostic side channel, not part of the persisted contract
                info!("{}: {}", source.tag(), line);

                let tagged = format!("{}: {}\n", source.tag(), line);
                self.log.append(&tagged);
                self.store.append_log(&tagged).await;
            }
            RunnerEvent::Exit { code } => {
                if self.status != DeployStatus::Deploying {
                    debug!("Ignoring process exit with no deployment in flight");
                    return;
                }

                if code == 0 {
                    info!(
                        "Deployment attempt {} finished successfully",
                        self.attempt_label()
                    );
                    self.outcome = LastOutcome::Successful;
                    self.log.replace_with_line(SUCCESS_LOG_LINE);
                } else {
                    error!(
                        "Deployment attempt {} failed with exit code {}",
                        self.attempt_label(),
                        code
                    );
                    self.outcome = LastOutcome::Failed;
                    self.log.truncate_to_tail(DEFAULT_TAIL_LINES);
                }

                self.finish_attempt().await;
            }
            RunnerEvent::SpawnFailed { error } => {
                if self.status != DeployStatus::Deploying {
                    debug!("Ignoring spawn failure with no deployment in flight");
                    return;
                }

                error!("Failed to start deployment process: {}", error);
                self.log.append(&format!("{}\n", error));
                self.outcome = LastOutcome::Failed;
                self.log.truncate_to_tail(DEFAULT_TAIL_LINES);

                self.finish_attempt().await;
            }
        }
    }

    /// Persist outcome/log/status and return to the idle resting state
    async fn finish_attempt(&mut self) {
        self.store.save_outcome(self.outcome).await;
        self.store.save_log(self.log.contents()).await;

        self.status = DeployStatus::Idle;
        self.store.save_status(self.status).await;
        self.attempt_id = None;
    }

    fn report(&self, full: bool) -> StatusReport {
        let logs = if full {
            self.log.contents().to_string()
        } else {
            self.log.tail_text(DEFAULT_TAIL_LINES)
        };

        StatusReport {
            status: self.status,
            outcome: self.outcome,
            logs,
        }
    }

    fn attempt_label(&self) -> &str {
        self.attempt_id.as_deref().unwrap_or("unknown")
    }
}
