//! External deployment process runner
//!
//! The deployment script is an opaque collaborator: the service only
//! observes its stdout/stderr bytes and exit code, or the failure to start
//! it at all. Each stream is delivered in write order, but the interleaving
//! between stdout and stderr is whatever the OS hands us; it is not globally
//! ordered and the runner makes no attempt to fix that.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error};

use crate::deploy::coordinator::EventSink;

/// Origin stream of a captured output chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

impl StreamSource {
    pub fn tag(&self) -> &'static str {
        match self {
            StreamSource::Stdout => "STDOUT",
            StreamSource::Stderr => "STDERR",
        }
    }
}

/// Lifecycle events produced by one deployment attempt
#[derive(Debug, Clone)]
pub enum RunnerEvent {
    /// A line of process output
    Output { source: StreamSource, line: String },

    /// The process terminated with the given exit code
    Exit { code: i32 },

    /// The process could not be started at all
    SpawnFailed { error: String },
}

/// Parameters a caller may attach to a deployment request
#[derive(Debug, Clone, Default)]
pub struct DeployParams {
    pub image: Option<String>,
    pub domain: Option<String>,
    pub container_name: Option<String>,
    pub bucket: Option<String>,
}

impl DeployParams {
    /// Environment variables exported to the deployment script,
    /// one per present field
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = Vec::new();
        if let Some(image) = &self.image {
            vars.push(("DEPLOY_IMAGE", image.clone()));
        }
        if let Some(domain) = &self.domain {
            vars.push(("DEPLOY_DOMAIN", domain.clone()));
        }
        if let Some(container_name) = &self.container_name {
            vars.push(("DEPLOY_CONTAINER", container_name.clone()));
        }
        if let Some(bucket) = &self.bucket {
            vars.push(("DEPLOY_BUCKET", bucket.clone()));
        }
        vars
    }
}

/// Seam for launching the external deployment process
///
/// Implementations must return promptly: the attempt runs in the background
/// and reports back exclusively through the [`EventSink`]. Exactly one
/// terminal event (`Exit` or `SpawnFailed`) is delivered per launch, after
/// all `Output` events of the attempt.
#[async_trait]
pub trait ScriptLauncher: Send + Sync {
    async fn launch(&self, params: &DeployParams, sink: EventSink);
}

/// Launches the configured deployment script as a child process
pub struct ShellLauncher {
    program: String,
    args: Vec<String>,
    forward_params: bool,
}

impl ShellLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>, forward_params: bool) -> Self {
        Self {
            program: program.into(),
            args,
            forward_params,
        }
    }
}

#[async_trait]
impl ScriptLauncher for ShellLauncher {
    async fn launch(&self, params: &DeployParams, sink: EventSink) {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if self.forward_params {
            for (key, value) in params.env_vars() {
                cmd.env(key, value);
            }
        }

        debug!("Launching deployment script: {}", self.program);
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                let message = format!("Failed to start {}: {}", self.program, e);
                // Reported from a task so launch never blocks on the mailbox
                tokio::spawn(async move {
                    sink.spawn_failed(message).await;
                });
                return;
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        tokio::spawn(async move {
            // Drain both streams fully before reporting the exit, so Exit is
            // always the last event of the attempt.
            tokio::join!(
                stream_lines(stdout, StreamSource::Stdout, sink.clone()),
                stream_lines(stderr, StreamSource::Stderr, sink.clone()),
            );

            match child.wait().await {
                Ok(status) => {
                    sink.exit(status.code().unwrap_or(-1)).await;
                }
                Err(e) => {
                    error!("Failed to await deployment process: {}", e);
                    sink.spawn_failed(format!("Failed to await deployment process: {}", e))
                        .await;
                }
            }
        });
    }
}

async fn stream_lines<R>(pipe: Option<R>, source: StreamSource, sink: EventSink)
where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe else {
        return;
    };

    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        sink.output(source, line).await;
    }
}
