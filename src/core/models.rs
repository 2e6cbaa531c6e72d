use serde::{Deserialize, Serialize};

/// Channel type reported on every identity produced by this adapter.
pub const CHANNEL_TYPE: &str = "MessengerChannel";

/// A quick-reply style action: the user taps `display` and `payload` comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub display: String,
    pub payload: String,
}

impl Reply {
    pub fn new(display: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            payload: payload.into(),
        }
    }
}

/// A user-actionable button attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    Reply(Reply),
    Click { display: String, url: String },
    Call { display: String, phone_number: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichCard {
    pub title: String,
    pub description: String,
    pub media_url: Option<String>,
    #[serde(default)]
    pub inside_actions: Vec<ClientAction>,
    #[serde(default)]
    pub float_actions: Vec<Reply>,
}

/// Channel-agnostic outbound payload as issued by the dispatch core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundPayload {
    Text { text: String },
    RichCard(RichCard),
    ListText { items: Vec<String> },
    ListRichCards { cards: Vec<RichCard> },
    Raw { body: serde_json::Value },
}

/// A normalized inbound message taken from one webhook entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub sender_external_id: String,
    pub message_id: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub channel_type: String,
    pub external_id: String,
    pub channel_label: String,
    pub verified: bool,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UserIdentity {
    pub fn new(external_id: impl Into<String>, channel_label: impl Into<String>, verified: bool) -> Self {
        Self {
            channel_type: CHANNEL_TYPE.to_string(),
            external_id: external_id.into(),
            channel_label: channel_label.into(),
            verified,
            name: None,
            email: None,
            phone: None,
        }
    }
}

/// Coarse outcome of an outbound send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// The platform answered but rejected the request.
    Fault(String),
}

impl Status {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}
