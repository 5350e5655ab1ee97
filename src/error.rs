use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    CampaignNotFound(String),
    Conflict(String),
    ValidationError(String),
    StoreError(String),
    QueueError(String),
    GatewayError(String),
    StateTransitionError(String),
    OrchestrationError(String),
    ConfigurationError(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::CampaignNotFound(msg) => write!(f, "Campaign not found: {msg}"),
            EngineError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            EngineError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            EngineError::StoreError(msg) => write!(f, "Store error: {msg}"),
            EngineError::QueueError(msg) => write!(f, "Queue error: {msg}"),
            EngineError::GatewayError(msg) => write!(f, "Gateway error: {msg}"),
            EngineError::StateTransitionError(msg) => write!(f, "State transition error: {msg}"),
            EngineError::OrchestrationError(msg) => write!(f, "Orchestration error: {msg}"),
            EngineError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<crate::store::StoreError> for EngineError {
    fn from(err: crate::store::StoreError) -> Self {
        EngineError::StoreError(err.to_string())
    }
}

impl From<crate::queue::QueueError> for EngineError {
    fn from(err: crate::queue::QueueError) -> Self {
        EngineError::QueueError(err.to_string())
    }
}

impl From<crate::state_machine::StateMachineError> for EngineError {
    fn from(err: crate::state_machine::StateMachineError) -> Self {
        match err {
            crate::state_machine::StateMachineError::InvalidTransition { .. } => {
                EngineError::Conflict(err.to_string())
            }
            _ => EngineError::StateTransitionError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
