//! Send API payload builders.
//!
//! Each channel-agnostic message kind maps to exactly one Messenger wire shape.
//! See https://developers.facebook.com/docs/messenger-platform/send-messages

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::core::models::{ClientAction, Reply, RichCard};

pub const MESSAGING_TYPE_RESPONSE: &str = "RESPONSE";

#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendRequest {
    pub messaging_type: &'static str,
    pub recipient: Recipient,
    pub message: Value,
}

impl SendRequest {
    pub fn response(uid: &str, message: Value) -> Self {
        Self {
            messaging_type: MESSAGING_TYPE_RESPONSE,
            recipient: Recipient { id: uid.to_string() },
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
    MarkSeen,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest {
    pub recipient: Recipient,
    pub sender_action: SenderAction,
}

impl ActionRequest {
    pub fn new(uid: &str, sender_action: SenderAction) -> Self {
        Self {
            recipient: Recipient { id: uid.to_string() },
            sender_action,
        }
    }
}

/// Maps one action to a Messenger button object.
#[must_use]
pub fn button(action: &ClientAction) -> Value {
    match action {
        ClientAction::Reply(reply) => json!({
            "type": "postback",
            "title": reply.display,
            "payload": reply.payload,
        }),
        ClientAction::Click { display, url } => json!({
            "type": "web_url",
            "url": url,
            "title": display,
        }),
        ClientAction::Call {
            display,
            phone_number,
        } => json!({
            "type": "phone_number",
            "title": display,
            "payload": phone_number,
        }),
    }
}

#[must_use]
pub fn quick_reply(reply: &Reply) -> Value {
    json!({
        "content_type": "text",
        "title": reply.display,
        "payload": reply.payload,
    })
}

#[must_use]
pub fn text_message(text: &str) -> Value {
    json!({ "text": text })
}

/// Builds a generic-template message holding a single element.
///
/// `quick_replies` is only present when the card has float actions.
#[must_use]
pub fn rich_card_message(card: &RichCard) -> Value {
    let buttons: Vec<Value> = card.inside_actions.iter().map(button).collect();

    let element = json!({
        "title": card.title,
        "subtitle": card.description,
        "image_url": card.media_url,
        "buttons": buttons,
    });

    let mut message = Map::new();
    message.insert(
        "attachment".to_string(),
        json!({
            "type": "template",
            "payload": {
                "template_type": "generic",
                "elements": [element],
            }
        }),
    );

    if !card.float_actions.is_empty() {
        let replies: Vec<Value> = card.float_actions.iter().map(quick_reply).collect();
        message.insert("quick_replies".to_string(), Value::Array(replies));
    }

    Value::Object(message)
}
