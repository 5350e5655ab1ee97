//! Per-contact outcome records: one [`MethodResult`] per channel attempted,
//! aggregated into one append-only [`CampaignResult`] per contact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gateway::{Channel, ProviderResponse};

/// Outcome of one channel attempt for one contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodStatus {
    Pending,
    Sent,
    Failed,
    /// Provider confirmed delivery (set by delivery callbacks, not the engine)
    Delivered,
}

impl MethodStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent | Self::Delivered)
    }
}

impl Default for MethodStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for MethodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Sent => write!(f, "sent"),
            Self::Failed => write!(f, "failed"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

/// Aggregate outcome across all channels attempted for one contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pending,
    /// At least one channel succeeded and at least one failed
    Partial,
    /// Every attempted channel succeeded
    Success,
    /// No attempted channel succeeded
    Failed,
}

impl OverallStatus {
    /// Success and partial both count toward the campaign's success tally
    pub fn counts_as_success(&self) -> bool {
        matches!(self, Self::Success | Self::Partial)
    }
}

impl Default for OverallStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Partial => write!(f, "partial"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The recorded outcome of one channel attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    pub method: Channel,
    pub status: MethodStatus,
    pub timestamp: DateTime<Utc>,
    /// Opaque provider acknowledgement on success
    pub response: Option<String>,
    /// Error description on failure
    pub error: Option<String>,
}

impl MethodResult {
    /// Record a successful send with the provider's acknowledgement
    pub fn sent(method: Channel, response: &ProviderResponse) -> Self {
        Self {
            method,
            status: MethodStatus::Sent,
            timestamp: Utc::now(),
            response: Some(response.to_string()),
            error: None,
        }
    }

    /// Record a failed attempt with a descriptive error
    pub fn failed<S: Into<String>>(method: Channel, error: S) -> Self {
        Self {
            method,
            status: MethodStatus::Failed,
            timestamp: Utc::now(),
            response: None,
            error: Some(error.into()),
        }
    }
}

/// The aggregate outcome for one contact, appended to the campaign once and
/// never mutated afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignResult {
    pub contact_name: String,
    /// Position in the campaign's contact list; results are appended in
    /// contact-list order
    pub contact_index: usize,
    pub methods: Vec<MethodResult>,
    pub overall_status: OverallStatus,
}

impl CampaignResult {
    pub fn new<S: Into<String>>(contact_name: S, contact_index: usize) -> Self {
        Self {
            contact_name: contact_name.into(),
            contact_index,
            methods: Vec::new(),
            overall_status: OverallStatus::Pending,
        }
    }

    /// Record one channel attempt and rederive the overall status
    pub fn record_method(&mut self, method: MethodResult) {
        self.methods.push(method);
        self.overall_status = derive_overall_status(&self.methods);
    }
}

/// Derive the contact-level status from its attempted methods
pub fn derive_overall_status(methods: &[MethodResult]) -> OverallStatus {
    if methods.is_empty() {
        return OverallStatus::Pending;
    }

    let succeeded = methods.iter().filter(|m| m.status.is_success()).count();
    if succeeded == methods.len() {
        OverallStatus::Success
    } else if succeeded > 0 {
        OverallStatus::Partial
    } else {
        OverallStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sent() -> MethodResult {
        MethodResult::sent(Channel::Sms, &ProviderResponse::new("queued"))
    }

    fn failed() -> MethodResult {
        MethodResult::failed(Channel::Email, "provider rejected")
    }

    #[test]
    fn test_overall_status_all_success() {
        assert_eq!(
            derive_overall_status(&[sent(), sent()]),
            OverallStatus::Success
        );
    }

    #[test]
    fn test_overall_status_partial() {
        assert_eq!(
            derive_overall_status(&[sent(), failed()]),
            OverallStatus::Partial
        );
    }

    #[test]
    fn test_overall_status_all_failed() {
        assert_eq!(
            derive_overall_status(&[failed(), failed()]),
            OverallStatus::Failed
        );
    }

    #[test]
    fn test_overall_status_no_attempts() {
        assert_eq!(derive_overall_status(&[]), OverallStatus::Pending);
    }

    #[test]
    fn test_partial_counts_as_success() {
        assert!(OverallStatus::Success.counts_as_success());
        assert!(OverallStatus::Partial.counts_as_success());
        assert!(!OverallStatus::Failed.counts_as_success());
        assert!(!OverallStatus::Pending.counts_as_success());
    }

    #[test]
    fn test_record_method_rederives_status() {
        let mut result = CampaignResult::new("Ada", 0);
        assert_eq!(result.overall_status, OverallStatus::Pending);

        result.record_method(sent());
        assert_eq!(result.overall_status, OverallStatus::Success);

        result.record_method(failed());
        assert_eq!(result.overall_status, OverallStatus::Partial);
    }

    #[test]
    fn test_method_result_serde_roundtrip() {
        let method = MethodResult::failed(Channel::Call, "no answer");
        let json = serde_json::to_string(&method).unwrap();
        let parsed: MethodResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, method);
    }

    proptest! {
        /// The derivation is exactly: success iff all attempts succeeded,
        /// failed iff none did, partial otherwise.
        #[test]
        fn prop_overall_status_matches_definition(outcomes in proptest::collection::vec(any::<bool>(), 1..6)) {
            let methods: Vec<MethodResult> = outcomes
                .iter()
                .map(|ok| if *ok { sent() } else { failed() })
                .collect();

            let derived = derive_overall_status(&methods);
            let successes = outcomes.iter().filter(|ok| **ok).count();

            let expected = if successes == outcomes.len() {
                OverallStatus::Success
            } else if successes > 0 {
                OverallStatus::Partial
            } else {
                OverallStatus::Failed
            };

            prop_assert_eq!(derived, expected);
        }
    }
}
