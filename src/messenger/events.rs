//! Inbound webhook payloads and their normalization.

use serde::Deserialize;
use serde_json::Value;

use crate::core::models::InboundEvent;
use crate::errors::MessengerError;

pub const PAGE_SUBSCRIPTION: &str = "page";

/// Body of a webhook delivery POST.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiveRequest {
    #[serde(rename = "object")]
    pub subscription: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub messaging: Vec<Value>,
    pub id: Option<String>,
    /// The platform sends epoch millis, older docs show strings.
    pub time: Option<Value>,
}

impl ReceiveRequest {
    pub fn parse(body: &str) -> Result<Self, MessengerError> {
        Ok(serde_json::from_str(body)?)
    }

    #[must_use]
    pub fn is_page(&self) -> bool {
        self.subscription == PAGE_SUBSCRIPTION
    }
}

fn str_at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    cur.as_str()
}

/// Why an entry produced nothing to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    NoEvents,
    MissingSender,
    NotAMessage,
    MissingMessageId,
    NoText,
}

/// Normalizes the first messaging event of an entry.
///
/// Only the first event is looked at; the rest of the entry is ignored.
pub fn first_text_event(entry: &Entry) -> Result<InboundEvent, Skipped> {
    let event = entry.messaging.first().ok_or(Skipped::NoEvents)?;

    let sender = str_at(event, &["sender", "id"]).ok_or(Skipped::MissingSender)?;
    let message = event.get("message").ok_or(Skipped::NotAMessage)?;
    let mid = str_at(message, &["mid"]).ok_or(Skipped::MissingMessageId)?;
    let text = message
        .get("text")
        .and_then(|t| t.as_str())
        .ok_or(Skipped::NoText)?;

    Ok(InboundEvent {
        sender_external_id: sender.to_string(),
        message_id: mid.to_string(),
        text: Some(text.to_string()),
    })
}
