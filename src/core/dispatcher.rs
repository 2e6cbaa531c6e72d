//! Seam between the webhook controller and the dispatch core.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::models::{InboundEvent, UserIdentity};
use crate::errors::MessengerError;

/// Receives normalized inbound messages. Implemented by the dispatch core.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn process_inbound(
        &self,
        user: UserIdentity,
        locale: &str,
        event: InboundEvent,
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct InboundEnvelope<'a> {
    locale: &'a str,
    user: &'a UserIdentity,
    event: &'a InboundEvent,
}

/// Forwards inbound messages to an out-of-process dispatch core over HTTP.
pub struct HttpDispatcher {
    http: Client,
    url: String,
}

impl HttpDispatcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MessengerError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn process_inbound(
        &self,
        user: UserIdentity,
        locale: &str,
        event: InboundEvent,
    ) -> anyhow::Result<()> {
        let envelope = InboundEnvelope {
            locale,
            user: &user,
            event: &event,
        };

        let resp = self.http.post(&self.url).json(&envelope).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, message_id = %event.message_id, "dispatcher rejected inbound message");
            anyhow::bail!("dispatcher returned {status}: {body}");
        }

        debug!(message_id = %event.message_id, "inbound message forwarded to dispatcher");
        Ok(())
    }
}
