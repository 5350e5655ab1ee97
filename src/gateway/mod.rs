//! # Channel Gateway Boundary
//!
//! The engine does not implement delivery itself. It calls out to three
//! channel-send primitives provided by an external messaging gateway, and
//! everything the core depends on is captured by the [`ChannelGateway`]
//! trait. Production deployments adapt their provider client to this trait;
//! tests use the mock in [`crate::test_helpers`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Contact;

/// One delivery mechanism for a campaign contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Sms,
    Email,
    Call,
}

impl Channel {
    /// Fixed attempt order for multi-channel campaigns: sms, then email, then call
    pub const ORDERED: [Channel; 3] = [Channel::Sms, Channel::Email, Channel::Call];

    /// The contact field this channel requires
    pub fn required_field(&self) -> &'static str {
        match self {
            Channel::Sms | Channel::Call => "phone",
            Channel::Email => "email",
        }
    }

    /// Check whether the contact carries the field this channel needs
    pub fn supported_by(&self, contact: &Contact) -> bool {
        match self {
            Channel::Sms | Channel::Call => contact.phone.is_some(),
            Channel::Email => contact.email.is_some(),
        }
    }

    /// Error message recorded when the required contact field is missing
    pub fn missing_field_error(&self) -> &'static str {
        match self {
            Channel::Sms => "Phone number required for SMS",
            Channel::Call => "Phone number required for calls",
            Channel::Email => "Email address required for email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Sms => write!(f, "sms"),
            Channel::Email => write!(f, "email"),
            Channel::Call => write!(f, "call"),
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sms" => Ok(Channel::Sms),
            "email" => Ok(Channel::Email),
            "call" => Ok(Channel::Call),
            _ => Err(format!("Invalid channel: {s}")),
        }
    }
}

/// Voice settings forwarded to the gateway for call attempts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Provider voice identifier
    pub voice: String,
    /// BCP 47 language tag, e.g. "en-US"
    pub language: String,
    /// Optional scripted greeting played before the template body
    pub greeting: Option<String>,
}

/// Opaque provider acknowledgement recorded on successful sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Provider-assigned message/call identifier, when one is returned
    pub message_id: Option<String>,
    /// Free-form provider detail (status line, queue position, etc.)
    pub detail: String,
}

impl ProviderResponse {
    pub fn new<S: Into<String>>(detail: S) -> Self {
        Self {
            message_id: None,
            detail: detail.into(),
        }
    }

    pub fn with_message_id<S: Into<String>>(mut self, message_id: S) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}

impl fmt::Display for ProviderResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message_id {
            Some(id) => write!(f, "{} (id={id})", self.detail),
            None => write!(f, "{}", self.detail),
        }
    }
}

/// Errors surfaced by the external gateway client.
///
/// The distinction is informational: the Contact Processor records both
/// variants as terminal per-attempt outcomes and never retries a channel
/// send within a contact.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Transient provider error: {0}")]
    Transient(String),

    #[error("Permanent provider error: {0}")]
    Permanent(String),
}

impl GatewayError {
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Transient(_))
    }
}

/// The three channel-send primitives the engine depends on
#[async_trait]
pub trait ChannelGateway: Send + Sync {
    async fn send_sms(&self, body: &str, number: &str) -> Result<ProviderResponse, GatewayError>;

    async fn send_email(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
        is_html: bool,
    ) -> Result<ProviderResponse, GatewayError>;

    async fn send_call(
        &self,
        phone: &str,
        name: &str,
        voice: &VoiceConfig,
    ) -> Result<ProviderResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(phone: Option<&str>, email: Option<&str>) -> Contact {
        Contact {
            name: "Test".to_string(),
            phone: phone.map(String::from),
            email: email.map(String::from),
        }
    }

    #[test]
    fn test_channel_ordering_is_fixed() {
        assert_eq!(
            Channel::ORDERED,
            [Channel::Sms, Channel::Email, Channel::Call]
        );
    }

    #[test]
    fn test_required_fields() {
        let phone_only = contact(Some("+15551234567"), None);
        assert!(Channel::Sms.supported_by(&phone_only));
        assert!(Channel::Call.supported_by(&phone_only));
        assert!(!Channel::Email.supported_by(&phone_only));

        let email_only = contact(None, Some("a@example.com"));
        assert!(Channel::Email.supported_by(&email_only));
        assert!(!Channel::Sms.supported_by(&email_only));
    }

    #[test]
    fn test_missing_field_messages() {
        assert_eq!(
            Channel::Sms.missing_field_error(),
            "Phone number required for SMS"
        );
        assert_eq!(
            Channel::Email.missing_field_error(),
            "Email address required for email"
        );
    }

    #[test]
    fn test_channel_string_conversion() {
        assert_eq!(Channel::Call.to_string(), "call");
        assert_eq!("sms".parse::<Channel>().unwrap(), Channel::Sms);
        assert!("fax".parse::<Channel>().is_err());
    }

    #[test]
    fn test_provider_response_display() {
        let plain = ProviderResponse::new("queued");
        assert_eq!(plain.to_string(), "queued");

        let with_id = ProviderResponse::new("queued").with_message_id("SM123");
        assert_eq!(with_id.to_string(), "queued (id=SM123)");
    }
}
