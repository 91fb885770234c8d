//! Deployment status and outcome scalars

use serde::{Deserialize, Serialize};

/// Current deployment status
///
/// The resting state is always `Idle`; a failed run is recorded in
/// [`LastOutcome`], never here. `Unknown` only appears when the persisted
/// value cannot be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    /// No deployment in flight
    Idle,

    /// An external deployment process has been spawned and has not
    /// yet exited
    Deploying,

    /// Persisted status could not be interpreted
    Unknown,
}

impl DeployStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStatus::Idle => "idle",
            DeployStatus::Deploying => "deploying",
            DeployStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for DeployStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "idle" => DeployStatus::Idle,
            "deploying" => DeployStatus::Deploying,
            _ => DeployStatus::Unknown,
        })
    }
}

/// Outcome of the most recently completed deployment attempt
///
/// Written once per completed attempt and never cleared. `Unknown` means no
/// deployment has completed yet or the persisted value is unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastOutcome {
    Successful,
    Failed,
    Unknown,
}

impl LastOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LastOutcome::Successful => "successful",
            LastOutcome::Failed => "failed",
            LastOutcome::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for LastOutcome {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "successful" => LastOutcome::Successful,
            "failed" => LastOutcome::Failed,
            _ => LastOutcome::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!("idle".parse::<DeployStatus>().unwrap(), DeployStatus::Idle);
        assert_eq!(
            "deploying".parse::<DeployStatus>().unwrap(),
            DeployStatus::Deploying
        );
        assert_eq!(
            "garbage".parse::<DeployStatus>().unwrap(),
            DeployStatus::Unknown
        );
        assert_eq!(DeployStatus::Deploying.as_str(), "deploying");
    }

    #[test]
    fn test_outcome_roundtrip() {
        assert_eq!(
            "successful".parse::<LastOutcome>().unwrap(),
            LastOutcome::Successful
        );
        assert_eq!("failed".parse::<LastOutcome>().unwrap(), LastOutcome::Failed);
        assert_eq!("".parse::<LastOutcome>().unwrap(), LastOutcome::Unknown);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeployStatus::Idle).unwrap(),
            "\"idle\""
        );
        assert_eq!(
            serde_json::to_string(&LastOutcome::Failed).unwrap(),
            "\"failed\""
        );
    }
}
