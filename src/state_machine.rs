//! # Campaign Lifecycle State Machine
//!
//! Campaign status definitions and the pure transition function applied by
//! the dispatcher and orchestrator. The `Fail` event deliberately lands on
//! `Paused`: a campaign that hit a fatal orchestration error must never be
//! left `running` with no owner making progress.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised while validating or applying a lifecycle transition
#[derive(Debug, thiserror::Error)]
pub enum StateMachineError {
    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Internal state machine error: {0}")]
    Internal(String),
}

/// Campaign lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Campaign created but never started
    Draft,
    /// Campaign is being executed by exactly one active processor
    Running,
    /// Execution suspended at a contact boundary; resumable
    Paused,
    /// Every contact has a recorded result
    Completed,
}

impl CampaignStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if this is an active state (campaign is being processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Check if a start request is acceptable from this state
    pub fn can_accept_start(&self) -> bool {
        matches!(self, Self::Draft | Self::Paused)
    }
}

impl Default for CampaignStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "running" => Ok(Self::Running),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid campaign status: {s}")),
        }
    }
}

/// Events that drive campaign lifecycle transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignEvent {
    /// Owner requested execution (initial start or resume)
    Start,
    /// Owner requested suspension at the next contact boundary
    Pause,
    /// All contacts have results
    Complete,
    /// Fatal orchestration error; forces a resumable suspension
    Fail(String),
}

impl fmt::Display for CampaignEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Pause => write!(f, "pause"),
            Self::Complete => write!(f, "complete"),
            Self::Fail(_) => write!(f, "fail"),
        }
    }
}

/// Determine the target status for an event, or reject the transition
pub fn next_status(
    current: CampaignStatus,
    event: &CampaignEvent,
) -> Result<CampaignStatus, StateMachineError> {
    let target = match (current, event) {
        // Start and resume
        (CampaignStatus::Draft, CampaignEvent::Start) => CampaignStatus::Running,
        (CampaignStatus::Paused, CampaignEvent::Start) => CampaignStatus::Running,

        // Cooperative suspension
        (CampaignStatus::Running, CampaignEvent::Pause) => CampaignStatus::Paused,

        // Natural completion
        (CampaignStatus::Running, CampaignEvent::Complete) => CampaignStatus::Completed,

        // Liveness guarantee: fatal errors park the campaign, never strand it running
        (CampaignStatus::Running, CampaignEvent::Fail(_)) => CampaignStatus::Paused,

        (from, event) => {
            return Err(StateMachineError::InvalidTransition {
                from: from.to_string(),
                event: event.to_string(),
            })
        }
    };

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_transitions() {
        assert_eq!(
            next_status(CampaignStatus::Draft, &CampaignEvent::Start).unwrap(),
            CampaignStatus::Running
        );
        assert_eq!(
            next_status(CampaignStatus::Paused, &CampaignEvent::Start).unwrap(),
            CampaignStatus::Running
        );
    }

    #[test]
    fn test_start_rejected_when_running_or_completed() {
        assert!(next_status(CampaignStatus::Running, &CampaignEvent::Start).is_err());
        assert!(next_status(CampaignStatus::Completed, &CampaignEvent::Start).is_err());
    }

    #[test]
    fn test_pause_only_from_running() {
        assert_eq!(
            next_status(CampaignStatus::Running, &CampaignEvent::Pause).unwrap(),
            CampaignStatus::Paused
        );
        assert!(next_status(CampaignStatus::Draft, &CampaignEvent::Pause).is_err());
        assert!(next_status(CampaignStatus::Paused, &CampaignEvent::Pause).is_err());
        assert!(next_status(CampaignStatus::Completed, &CampaignEvent::Pause).is_err());
    }

    #[test]
    fn test_fail_forces_paused() {
        assert_eq!(
            next_status(
                CampaignStatus::Running,
                &CampaignEvent::Fail("store unreadable".to_string())
            )
            .unwrap(),
            CampaignStatus::Paused
        );
    }

    #[test]
    fn test_terminal_and_active_checks() {
        assert!(CampaignStatus::Completed.is_terminal());
        assert!(!CampaignStatus::Paused.is_terminal());
        assert!(CampaignStatus::Running.is_active());
        assert!(CampaignStatus::Draft.can_accept_start());
        assert!(CampaignStatus::Paused.can_accept_start());
        assert!(!CampaignStatus::Running.can_accept_start());
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(CampaignStatus::Running.to_string(), "running");
        assert_eq!(
            "paused".parse::<CampaignStatus>().unwrap(),
            CampaignStatus::Paused
        );
        assert!("unknown".parse::<CampaignStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let status = CampaignStatus::Running;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"running\"");

        let parsed: CampaignStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }
}
