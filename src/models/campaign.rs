//! The campaign document: contacts, template, voice settings, lifecycle
//! status, and the accumulating result list. The orchestrator is the sole
//! writer of `status`, `results`, and the counters while a campaign runs;
//! the owning user only requests start/pause transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::gateway::{Channel, VoiceConfig};
use crate::models::result::CampaignResult;
use crate::state_machine::CampaignStatus;

/// Which channels a campaign drives each contact through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    Sms,
    Email,
    Call,
    All,
}

impl CampaignType {
    /// The ordered channel set this campaign type attempts per contact
    pub fn channels(&self) -> &'static [Channel] {
        match self {
            CampaignType::Sms => &[Channel::Sms],
            CampaignType::Email => &[Channel::Email],
            CampaignType::Call => &[Channel::Call],
            CampaignType::All => &Channel::ORDERED,
        }
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignType::Sms => write!(f, "sms"),
            CampaignType::Email => write!(f, "email"),
            CampaignType::Call => write!(f, "call"),
            CampaignType::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for CampaignType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sms" => Ok(CampaignType::Sms),
            "email" => Ok(CampaignType::Email),
            "call" => Ok(CampaignType::Call),
            "all" => Ok(CampaignType::All),
            _ => Err(format!("Invalid campaign type: {s}")),
        }
    }
}

/// One recipient within a campaign. The name is required; phone and email
/// are channel-dependent and validated per attempt, not up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            phone: None,
            email: None,
        }
    }

    pub fn with_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Message content shared by every contact in a campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplate {
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

/// A batch outbound-communication job over an ordered set of contacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    pub contacts: Vec<Contact>,
    pub template: MessageTemplate,
    #[serde(default)]
    pub voice: VoiceConfig,
    /// Derived from the contact list; recomputed on every contact mutation
    pub total_contacts: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Append-only, in contact-list order; entries are never mutated
    pub results: Vec<CampaignResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new<S: Into<String>>(user_id: Uuid, name: S, campaign_type: CampaignType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            campaign_type,
            status: CampaignStatus::default(),
            contacts: Vec::new(),
            template: MessageTemplate::default(),
            voice: VoiceConfig::default(),
            total_contacts: 0,
            success_count: 0,
            failure_count: 0,
            results: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_voice(mut self, voice: VoiceConfig) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.set_contacts(contacts);
        self
    }

    /// Replace the contact list, recomputing the derived total
    pub fn set_contacts(&mut self, contacts: Vec<Contact>) {
        self.contacts = contacts;
        self.total_contacts = self.contacts.len();
        self.updated_at = Utc::now();
    }

    /// Append one contact, recomputing the derived total
    pub fn push_contact(&mut self, contact: Contact) {
        self.contacts.push(contact);
        self.total_contacts = self.contacts.len();
        self.updated_at = Utc::now();
    }

    /// The index of the next contact without a recorded result.
    ///
    /// Because results are append-only and in contact-list order, this is
    /// simply the result count; a paused campaign resumes from here.
    pub fn next_contact_index(&self) -> usize {
        self.results.len()
    }

    /// Completion is defined by count: every contact has a result
    pub fn is_complete(&self) -> bool {
        self.results.len() >= self.total_contacts
    }

    /// Append a contact's result and update the success/failure tallies
    pub fn record_result(&mut self, result: CampaignResult) {
        if result.overall_status.counts_as_success() {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        self.results.push(result);
        self.updated_at = Utc::now();
    }

    /// Structural validation applied before a campaign may start
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::ValidationError(
                "Campaign name must not be empty".to_string(),
            ));
        }
        if let Some(pos) = self.contacts.iter().position(|c| c.name.trim().is_empty()) {
            return Err(EngineError::ValidationError(format!(
                "Contact at index {pos} has no name"
            )));
        }
        if self.total_contacts != self.contacts.len() {
            return Err(EngineError::ValidationError(format!(
                "total_contacts {} does not match contact list length {}",
                self.total_contacts,
                self.contacts.len()
            )));
        }
        Ok(())
    }
}
