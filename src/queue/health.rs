//! Explicit queue-backend health state, consulted by the dispatcher when
//! choosing between the queue path and the direct fallback. The transition
//! to unavailable happens once, on the first connection failure, so the
//! fallback is logged exactly once instead of on every start request.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Queue backend availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueHealthState {
    Available = 0,
    Unavailable = 1,
}

impl From<u8> for QueueHealthState {
    fn from(value: u8) -> Self {
        match value {
            0 => QueueHealthState::Available,
            _ => QueueHealthState::Unavailable,
        }
    }
}

/// Atomic health flag shared between the dispatcher and anything that
/// observes backend failures
#[derive(Debug)]
pub struct QueueHealth {
    state: AtomicU8,
}

impl QueueHealth {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(QueueHealthState::Available as u8),
        }
    }

    pub fn state(&self) -> QueueHealthState {
        QueueHealthState::from(self.state.load(Ordering::Acquire))
    }

    pub fn is_available(&self) -> bool {
        self.state() == QueueHealthState::Available
    }

    /// Transition to unavailable. Returns true only for the call that
    /// performed the transition, so the caller can log the switch once.
    pub fn mark_unavailable(&self) -> bool {
        self.state.swap(QueueHealthState::Unavailable as u8, Ordering::AcqRel)
            == QueueHealthState::Available as u8
    }

    /// Restore availability (operator intervention or a successful probe)
    pub fn mark_available(&self) {
        self.state
            .store(QueueHealthState::Available as u8, Ordering::Release);
    }
}

impl Default for QueueHealth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_available() {
        let health = QueueHealth::new();
        assert!(health.is_available());
        assert_eq!(health.state(), QueueHealthState::Available);
    }

    #[test]
    fn test_transition_reported_once() {
        let health = QueueHealth::new();
        assert!(health.mark_unavailable());
        assert!(!health.mark_unavailable());
        assert!(!health.is_available());
    }

    #[test]
    fn test_recovery() {
        let health = QueueHealth::new();
        health.mark_unavailable();
        health.mark_available();
        assert!(health.is_available());
        // A later failure transitions (and reports) again
        assert!(health.mark_unavailable());
    }
}
