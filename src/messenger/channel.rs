//! Outbound side of the Messenger channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use super::payload::{self, ActionRequest, SendRequest, SenderAction};
use crate::clients::graph_client::GraphClient;
use crate::core::config::{AppConfig, Configuration, DeliveryReporting};
use crate::core::models::{OutboundPayload, RichCard, Status, UserIdentity};
use crate::errors::MessengerError;

pub const PROFILE_FIELDS: &str = "name,email,profile_pic";

/// Operations the dispatch core uses to talk back to an end user.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send_text(&self, uid: &str, text: &str) -> Result<Status, MessengerError>;

    async fn send_rich_card(&self, uid: &str, card: &RichCard) -> Result<Status, MessengerError>;

    async fn send_list_text(&self, uid: &str, items: &[String]) -> Result<Status, MessengerError>;

    async fn send_list_rich_cards(
        &self,
        uid: &str,
        cards: &[RichCard],
    ) -> Result<Status, MessengerError>;

    async fn send_raw_payload(&self, uid: &str, body: &Value) -> Result<Status, MessengerError>;

    async fn typing_indicator(&self, uid: &str) -> Result<(), MessengerError>;

    async fn mark_seen(&self, uid: &str) -> Result<(), MessengerError>;

    /// Looks up the end user's profile; `None` when the lookup fails.
    async fn resolve_identity(&self, external_id: &str) -> Option<UserIdentity>;

    async fn send(&self, uid: &str, payload: &OutboundPayload) -> Result<Status, MessengerError> {
        match payload {
            OutboundPayload::Text { text } => self.send_text(uid, text).await,
            OutboundPayload::RichCard(card) => self.send_rich_card(uid, card).await,
            OutboundPayload::ListText { items } => self.send_list_text(uid, items).await,
            OutboundPayload::ListRichCards { cards } => self.send_list_rich_cards(uid, cards).await,
            OutboundPayload::Raw { body } => self.send_raw_payload(uid, body).await,
        }
    }
}

pub struct MessengerChannel {
    config: Arc<Configuration>,
    access_token: String,
    client: GraphClient,
    reporting: DeliveryReporting,
}

impl MessengerChannel {
    /// # Errors
    ///
    /// Returns `Config` when the configuration has no page access token.
    pub fn new(
        config: Arc<Configuration>,
        client: GraphClient,
        reporting: DeliveryReporting,
    ) -> Result<Self, MessengerError> {
        let access_token = config
            .page_access_token()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                MessengerError::Config(format!(
                    "channel '{}' has no page_access_token",
                    config.label
                ))
            })?
            .to_string();

        Ok(Self {
            config,
            access_token,
            client,
            reporting,
        })
    }

    /// Channel for `channel_id` using the Graph client and delivery reporting
    /// mode of the loaded configuration.
    ///
    /// # Errors
    ///
    /// `ChannelNotConfigured` for unknown channels, otherwise as [`Self::new`].
    pub fn from_config(config: &AppConfig, channel_id: &str) -> Result<Self, MessengerError> {
        let channel = config
            .channels
            .channel(channel_id)
            .ok_or_else(|| MessengerError::ChannelNotConfigured(channel_id.to_string()))?;
        let client = GraphClient::from_config(config)?;
        Self::new(channel, client, config.delivery_reporting)
    }

    async fn post<T: Serialize + Sync>(&self, payload: &T) -> Result<Status, MessengerError> {
        let outcome = self.client.post_message(&self.access_token, payload).await;

        match (self.reporting, outcome) {
            (_, Ok(resp)) if resp.is_success() => Ok(Status::Ok),
            (DeliveryReporting::Strict, Ok(resp)) => Ok(Status::Fault(resp.error_message())),
            (DeliveryReporting::Strict, Err(e)) => Err(e),
            (DeliveryReporting::Legacy, Ok(resp)) => {
                warn!(
                    channel = %self.config.label,
                    status = resp.status,
                    "Send rejected by platform, reporting OK (legacy delivery reporting)"
                );
                Ok(Status::Ok)
            }
            (DeliveryReporting::Legacy, Err(e)) => {
                error!(
                    channel = %self.config.label,
                    "Send failed, reporting OK (legacy delivery reporting): {}",
                    e
                );
                Ok(Status::Ok)
            }
        }
    }

    async fn post_action(&self, uid: &str, action: SenderAction) -> Result<(), MessengerError> {
        let request = ActionRequest::new(uid, action);
        match self.post(&request).await? {
            Status::Ok => {}
            Status::Fault(reason) => warn!(uid, ?action, %reason, "Sender action rejected"),
        }
        Ok(())
    }
}

#[cfg(feature = "debug-logs")]
fn masked(text: &str) -> String {
    text.to_string()
}

#[cfg(not(feature = "debug-logs"))]
fn masked(text: &str) -> String {
    format!("[{} chars]", text.chars().count())
}

#[async_trait]
impl MessageChannel for MessengerChannel {
    async fn send_text(&self, uid: &str, text: &str) -> Result<Status, MessengerError> {
        info!(uid, text = %masked(text), "Sending text");
        let request = SendRequest::response(uid, payload::text_message(text));
        self.post(&request).await
    }

    async fn send_rich_card(&self, uid: &str, card: &RichCard) -> Result<Status, MessengerError> {
        info!(uid, title = %masked(&card.title), "Sending rich card");
        let request = SendRequest::response(uid, payload::rich_card_message(card));
        self.post(&request).await
    }

    async fn send_list_text(&self, _uid: &str, _items: &[String]) -> Result<Status, MessengerError> {
        Err(MessengerError::UnsupportedPayload("send_list_text"))
    }

    async fn send_list_rich_cards(
        &self,
        _uid: &str,
        _cards: &[RichCard],
    ) -> Result<Status, MessengerError> {
        Err(MessengerError::UnsupportedPayload("send_list_rich_cards"))
    }

    async fn send_raw_payload(&self, _uid: &str, _body: &Value) -> Result<Status, MessengerError> {
        Err(MessengerError::UnsupportedPayload("send_raw_payload"))
    }

    async fn typing_indicator(&self, uid: &str) -> Result<(), MessengerError> {
        self.post_action(uid, SenderAction::TypingOn).await
    }

    async fn mark_seen(&self, uid: &str) -> Result<(), MessengerError> {
        self.post_action(uid, SenderAction::MarkSeen).await
    }

    async fn resolve_identity(&self, external_id: &str) -> Option<UserIdentity> {
        let profile = match self
            .client
            .get_profile(&self.access_token, external_id, PROFILE_FIELDS)
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                warn!(external_id, "Profile lookup failed: {}", e);
                return None;
            }
        };

        let field = |key: &str| {
            profile
                .get(key)
                .and_then(|v| v.as_str())
                .map(ToString::to_string)
        };

        let mut identity = UserIdentity::new(external_id, self.config.label.clone(), true);
        identity.name = field("name");
        identity.email = field("email");
        // The profile API does not expose phone numbers.
        identity.phone = None;
        Some(identity)
    }
}
