//! # Test Helpers
//!
//! In-process doubles for the external collaborators: a scriptable channel
//! gateway, a store with injectable failures, and a queue whose backend is
//! always unreachable. Used by the crate's own tests and available to
//! embedding applications for theirs.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::gateway::{ChannelGateway, GatewayError, ProviderResponse, VoiceConfig};
use crate::models::{Campaign, CampaignType, Contact, MessageTemplate};
use crate::queue::{JobEnvelope, JobQueue, QueueError, QueuedJob};
use crate::store::{CampaignStore, InMemoryCampaignStore, StoreError};

/// Scriptable gateway: succeeds by default, fails for configured
/// numbers/addresses, and records every call in order
#[derive(Debug, Default)]
pub struct MockGateway {
    fail_numbers: Vec<String>,
    fail_emails: Vec<String>,
    calls: Arc<Mutex<Vec<String>>>,
    sends: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject sms/call attempts to this number
    pub fn failing_number(mut self, number: impl Into<String>) -> Self {
        self.fail_numbers.push(number.into());
        self
    }

    /// Reject email attempts to this address
    pub fn failing_email(mut self, email: impl Into<String>) -> Self {
        self.fail_emails.push(email.into());
        self
    }

    /// Channel names in call order
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    /// (channel, recipient) pairs for successful sends only
    pub fn send_log(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.sends)
    }

    fn record(&self, channel: &str) {
        self.calls.lock().push(channel.to_string());
    }

    fn record_send(&self, channel: &str, recipient: &str) {
        self.sends
            .lock()
            .push((channel.to_string(), recipient.to_string()));
    }
}

#[async_trait]
impl ChannelGateway for MockGateway {
    async fn send_sms(&self, _body: &str, number: &str) -> Result<ProviderResponse, GatewayError> {
        self.record("sms");
        if self.fail_numbers.iter().any(|n| n == number) {
            return Err(GatewayError::Permanent(format!(
                "provider rejected number {number}"
            )));
        }
        self.record_send("sms", number);
        Ok(ProviderResponse::new("queued").with_message_id(format!("SM-{number}")))
    }

    async fn send_email(
        &self,
        _subject: &str,
        _body: &str,
        recipient: &str,
        _is_html: bool,
    ) -> Result<ProviderResponse, GatewayError> {
        self.record("email");
        if self.fail_emails.iter().any(|e| e == recipient) {
            return Err(GatewayError::Permanent(format!(
                "provider rejected address {recipient}"
            )));
        }
        self.record_send("email", recipient);
        Ok(ProviderResponse::new("accepted").with_message_id(format!("EM-{recipient}")))
    }

    async fn send_call(
        &self,
        phone: &str,
        _name: &str,
        _voice: &VoiceConfig,
    ) -> Result<ProviderResponse, GatewayError> {
        self.record("call");
        if self.fail_numbers.iter().any(|n| n == phone) {
            return Err(GatewayError::Permanent(format!(
                "provider rejected number {phone}"
            )));
        }
        self.record_send("call", phone);
        Ok(ProviderResponse::new("initiated").with_message_id(format!("CA-{phone}")))
    }
}

/// Store wrapper that injects a window of save failures: the first
/// `succeed_first` saves work, the next `failure_count` fail, then it
/// recovers. Finds always pass through.
pub struct FlakyStore {
    inner: InMemoryCampaignStore,
    saves_before_failure: AtomicI64,
    failures_remaining: AtomicI64,
}

impl FlakyStore {
    pub fn new(succeed_first: i64, failure_count: i64) -> Self {
        Self {
            inner: InMemoryCampaignStore::new(),
            saves_before_failure: AtomicI64::new(succeed_first),
            failures_remaining: AtomicI64::new(failure_count),
        }
    }
}

#[async_trait]
impl CampaignStore for FlakyStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, campaign: &Campaign) -> Result<(), StoreError> {
        if self.saves_before_failure.fetch_sub(1, Ordering::AcqRel) <= 0
            && self.failures_remaining.fetch_sub(1, Ordering::AcqRel) > 0
        {
            return Err(StoreError::Database("injected save failure".to_string()));
        }
        self.inner.save(campaign).await
    }
}

/// Queue whose backend is permanently unreachable; counts enqueue attempts
/// so tests can assert the dispatcher stopped consulting it
#[derive(Debug, Default)]
pub struct UnreachableQueue {
    enqueue_attempts: AtomicUsize,
}

impl UnreachableQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_attempts(&self) -> usize {
        self.enqueue_attempts.load(Ordering::Acquire)
    }
}

#[async_trait]
impl JobQueue for UnreachableQueue {
    async fn enqueue(
        &self,
        _queue: &str,
        _envelope: &JobEnvelope,
        _delay: Duration,
    ) -> Result<i64, QueueError> {
        self.enqueue_attempts.fetch_add(1, Ordering::AcqRel);
        Err(QueueError::Unreachable("connection refused".to_string()))
    }

    async fn poll(
        &self,
        _queue: &str,
        _visibility_timeout: Duration,
    ) -> Result<Option<QueuedJob>, QueueError> {
        Err(QueueError::Unreachable("connection refused".to_string()))
    }

    async fn ack(&self, _queue: &str, _msg_id: i64) -> Result<(), QueueError> {
        Err(QueueError::Unreachable("connection refused".to_string()))
    }

    async fn abandon(&self, _queue: &str, _msg_id: i64) -> Result<(), QueueError> {
        Err(QueueError::Unreachable("connection refused".to_string()))
    }
}

/// A campaign fixture with a filled template, ready to start
pub fn fixture_campaign(campaign_type: CampaignType, contacts: Vec<Contact>) -> Campaign {
    Campaign::new(Uuid::new_v4(), "Fixture campaign", campaign_type)
        .with_template(MessageTemplate {
            subject: "Hello".to_string(),
            body: "Hello from the campaign engine".to_string(),
            is_html: false,
        })
        .with_contacts(contacts)
}
