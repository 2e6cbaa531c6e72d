//! Webhook controller: subscription handshake and inbound delivery.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::events::{self, ReceiveRequest, Skipped};
use super::signature;
use crate::core::config::{ChannelRegistry, Configuration};
use crate::core::dispatcher::Dispatcher;
use crate::core::models::UserIdentity;
use crate::errors::MessengerError;

pub const SUBSCRIBE_MODE: &str = "subscribe";
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

/// Query parameters of the handshake GET.
#[derive(Debug, Clone)]
pub struct Handshake<'a> {
    pub mode: &'a str,
    pub verify_token: &'a str,
    pub challenge: &'a str,
}

pub struct WebhookController {
    registry: Arc<dyn ChannelRegistry>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl WebhookController {
    pub fn new(registry: Arc<dyn ChannelRegistry>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    fn configuration(
        &self,
        channel_id: &str,
        locale: &str,
    ) -> Result<Arc<Configuration>, MessengerError> {
        self.registry
            .configuration(locale, channel_id)
            .ok_or_else(|| MessengerError::ChannelNotConfigured(channel_id.to_string()))
    }

    /// Answers the platform's subscription handshake with the challenge.
    ///
    /// # Errors
    ///
    /// `ChannelNotConfigured` when the channel is unknown (checked first), and
    /// `HandshakeTokenMismatch` unless the mode is `subscribe` and the token
    /// equals the channel's verify token.
    pub fn verify(
        &self,
        channel_id: &str,
        locale: &str,
        handshake: &Handshake<'_>,
    ) -> Result<String, MessengerError> {
        info!(channel_id, locale, mode = handshake.mode, "Webhook verification request");
        let config = self.configuration(channel_id, locale)?;

        if handshake.mode != SUBSCRIBE_MODE {
            warn!(channel_id, mode = handshake.mode, "Unexpected hub.mode");
            return Err(MessengerError::HandshakeTokenMismatch);
        }

        match config.verify_token() {
            Some(expected) if expected == handshake.verify_token => {
                info!(channel_id, "Webhook verified");
                Ok(handshake.challenge.to_string())
            }
            _ => {
                warn!(channel_id, "Verify token mismatch");
                Err(MessengerError::HandshakeTokenMismatch)
            }
        }
    }

    /// Authenticates and parses a raw delivery body, then processes it.
    ///
    /// The signature is only enforced for channels configured with an
    /// `app_secret`.
    pub async fn receive_raw(
        &self,
        channel_id: &str,
        locale: &str,
        body: &[u8],
        signature_header: Option<&str>,
    ) -> Result<&'static str, MessengerError> {
        let config = self.configuration(channel_id, locale)?;

        if let Some(secret) = config.app_secret() {
            let valid = signature_header
                .is_some_and(|sig| signature::verify_hub_signature(body, sig, secret));
            if !valid {
                warn!(channel_id, "Rejecting delivery with missing or bad signature");
                return Err(MessengerError::InvalidSignature);
            }
        }

        let text = std::str::from_utf8(body)
            .map_err(|e| MessengerError::Parse(format!("body is not UTF-8: {e}")))?;
        let batch = ReceiveRequest::parse(text)?;
        self.process(channel_id, locale, &batch).await
    }

    /// Forwards the first text message of every entry to the dispatcher.
    ///
    /// # Errors
    ///
    /// `ChannelNotConfigured` for unknown channels and `NotPageSubscription`
    /// when the batch is not a page subscription. Dispatcher failures are
    /// logged and do not affect the acknowledgement.
    pub async fn receive(
        &self,
        channel_id: &str,
        locale: &str,
        batch: &ReceiveRequest,
    ) -> Result<&'static str, MessengerError> {
        self.configuration(channel_id, locale)?;
        self.process(channel_id, locale, batch).await
    }

    async fn process(
        &self,
        channel_id: &str,
        locale: &str,
        batch: &ReceiveRequest,
    ) -> Result<&'static str, MessengerError> {
        if !batch.is_page() {
            warn!(channel_id, object = %batch.subscription, "Delivery is not a page subscription");
            return Err(MessengerError::NotPageSubscription(batch.subscription.clone()));
        }

        info!(channel_id, entries = batch.entry.len(), "Received webhook delivery");

        for entry in &batch.entry {
            // Only the first event of an entry is handled.
            if entry.messaging.len() > 1 {
                debug!(
                    channel_id,
                    entry_id = ?entry.id,
                    dropped = entry.messaging.len() - 1,
                    "Ignoring additional messaging events in entry"
                );
            }

            let event = match events::first_text_event(entry) {
                Ok(event) => event,
                Err(Skipped::MissingSender | Skipped::MissingMessageId) => {
                    warn!(channel_id, entry_id = ?entry.id, "Malformed messaging event skipped");
                    continue;
                }
                Err(reason) => {
                    debug!(channel_id, entry_id = ?entry.id, ?reason, "Nothing to forward");
                    continue;
                }
            };

            let user = UserIdentity::new(event.sender_external_id.clone(), channel_id, true);
            let message_id = event.message_id.clone();
            if let Err(e) = self.dispatcher.process_inbound(user, locale, event).await {
                error!(channel_id, %message_id, "Dispatcher failed to process message: {}", e);
            }
        }

        Ok(EVENT_RECEIVED)
    }
}
