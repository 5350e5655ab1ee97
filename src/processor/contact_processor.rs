use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::PacingConfig;
use crate::gateway::{Channel, ChannelGateway, VoiceConfig};
use crate::models::{CampaignResult, Contact, MessageTemplate, MethodResult};

/// Drives one contact through an ordered channel set, recording one
/// [`MethodResult`] per attempt. Persistence is the orchestrator's
/// responsibility; the processor only returns the aggregate result.
pub struct ContactProcessor {
    gateway: Arc<dyn ChannelGateway>,
    pacing: PacingConfig,
}

impl ContactProcessor {
    pub fn new(gateway: Arc<dyn ChannelGateway>, pacing: PacingConfig) -> Self {
        Self { gateway, pacing }
    }

    /// Attempt every channel in the fixed order (sms, email, call), with the
    /// inter-channel delay between sends when more than one channel applies.
    pub async fn process_contact(
        &self,
        contact: &Contact,
        contact_index: usize,
        channels: &[Channel],
        template: &MessageTemplate,
        voice: &VoiceConfig,
    ) -> CampaignResult {
        let mut result = CampaignResult::new(contact.name.clone(), contact_index);

        for (position, channel) in channels.iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(self.pacing.inter_channel_delay()).await;
            }

            let method = self
                .attempt_channel(*channel, contact, template, voice)
                .await;

            match &method.error {
                Some(error) => warn!(
                    contact = %contact.name,
                    channel = %channel,
                    error = %error,
                    "Channel attempt failed"
                ),
                None => debug!(
                    contact = %contact.name,
                    channel = %channel,
                    "Channel attempt succeeded"
                ),
            }

            result.record_method(method);
        }

        result
    }

    /// One channel attempt: field presence check, then the gateway call.
    /// Gateway errors are absorbed into a failed MethodResult.
    async fn attempt_channel(
        &self,
        channel: Channel,
        contact: &Contact,
        template: &MessageTemplate,
        voice: &VoiceConfig,
    ) -> MethodResult {
        if !channel.supported_by(contact) {
            return MethodResult::failed(channel, channel.missing_field_error());
        }

        let outcome = match channel {
            Channel::Sms => {
                // Presence checked above
                let number = contact.phone.as_deref().unwrap_or_default();
                self.gateway.send_sms(&template.body, number).await
            }
            Channel::Email => {
                let recipient = contact.email.as_deref().unwrap_or_default();
                self.gateway
                    .send_email(&template.subject, &template.body, recipient, template.is_html)
                    .await
            }
            Channel::Call => {
                let phone = contact.phone.as_deref().unwrap_or_default();
                self.gateway.send_call(phone, &contact.name, voice).await
            }
        };

        match outcome {
            Ok(response) => MethodResult::sent(channel, &response),
            Err(error) => MethodResult::failed(channel, error.to_string()),
        }
    }
}
