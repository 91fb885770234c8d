//! HTTP request handlers
//!
//! Stateless translations over the coordinator. Deployment and status
//! requests always answer 200; user-visible failure is carried in the
//! `status`/`message`/`logs` fields, never in HTTP status codes.

use std::sync::Arc;

use axum::{body::Bytes, extract::Query, extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::deploy::coordinator::DeployDecision;
use crate::deploy::runner::DeployParams;
use crate::deploy::status::{DeployStatus, LastOutcome};
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Liveness handler
pub async fn root_handler() -> &'static str {
    "Deployer service available"
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Deploy request parameters
///
/// All fields are optional; unknown or malformed bodies are treated as an
/// empty request rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct DeployRequest {
    pub image: Option<String>,
    pub domain: Option<String>,
    pub container_name: Option<String>,
    pub bucket: Option<String>,
}

/// Deploy response
#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub message: String,
    pub status: DeployStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

/// Deploy handler
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<impl IntoResponse, StatusCode> {
    let request = parse_deploy_request(&body);
    let params = DeployParams {
        image: request.image,
        domain: request.domain,
        container_name: request.container_name,
        bucket: request.bucket,
    };

    let decision = state
        .coordinator
        .request_deploy(params)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let response = match decision {
        DeployDecision::Started { status } => DeployResponse {
            message: "Deployment started.".to_string(),
            status,
            logs: None,
        },
        DeployDecision::Rejected { status, logs } => DeployResponse {
            message: "Deployment already in progress.".to_string(),
            status,
            logs: Some(logs),
        },
    };

    Ok(Json(response))
}

fn parse_deploy_request(body: &Bytes) -> DeployRequest {
    if body.is_empty() {
        return DeployRequest::default();
    }
    match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Ignoring malformed deploy request body: {}", e);
            DeployRequest::default()
        }
    }
}

/// Status query parameters
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub full: Option<String>,
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: DeployStatus,
    pub message: String,
    pub logs: String,
}

/// Status handler
pub async fn status_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let full = query.full.as_deref() == Some("true");

    let report = state
        .coordinator
        .status(full)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(StatusResponse {
        status: report.status,
        message: compose_status_message(report.status, report.outcome),
        logs: report.logs,
    }))
}

/// Compose the human-readable status message from status and last outcome
pub fn compose_status_message(status: DeployStatus, outcome: LastOutcome) -> String {
    match (status, outcome) {
        (DeployStatus::Deploying, _) => "Deployment is in progress.",
        (_, LastOutcome::Successful) => "The last deployment was successful.",
        (_, LastOutcome::Failed) => "The last deployment failed.",
        _ => "No deployment has been run yet.",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_default_state() {
        assert_eq!(
            compose_status_message(DeployStatus::Idle, LastOutcome::Unknown),
            "No deployment has been run yet."
        );
    }

    #[test]
    fn test_status_message_in_progress_wins() {
        assert_eq!(
            compose_status_message(DeployStatus::Deploying, LastOutcome::Failed),
            "Deployment is in progress."
        );
    }

    #[test]
    fn test_status_message_outcomes() {
        assert_eq!(
            compose_status_message(DeployStatus::Idle, LastOutcome::Successful),
            "The last deployment was successful."
        );
        assert_eq!(
            compose_status_message(DeployStatus::Idle, LastOutcome::Failed),
            "The last deployment failed."
        );
    }

    #[test]
    fn test_parse_deploy_request_lenient() {
        let empty = parse_deploy_request(&Bytes::new());
        assert!(empty.image.is_none());

        let bad = parse_deploy_request(&Bytes::from_static(b"not json"));
        assert!(bad.image.is_none());

        let ok = parse_deploy_request(&Bytes::from_static(
            br#"{"image": "registry.example.com/app:1.2", "domain": "app.example.com"}"#,
        ));
        assert_eq!(ok.image.as_deref(), Some("registry.example.com/app:1.2"));
        assert_eq!(ok.domain.as_deref(), Some("app.example.com"));
        assert!(ok.bucket.is_none());
    }
}
