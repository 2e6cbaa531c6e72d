use messenger_channel::core::models::{ClientAction, Reply, RichCard};
use messenger_channel::messenger::payload::{
    ActionRequest, SendRequest, SenderAction, button, quick_reply, rich_card_message,
    text_message,
};
use serde_json::json;

fn card(inside_actions: Vec<ClientAction>, float_actions: Vec<Reply>) -> RichCard {
    RichCard {
        title: "Pick one".to_string(),
        description: "Choose wisely".to_string(),
        media_url: Some("https://cdn.example.com/a.png".to_string()),
        inside_actions,
        float_actions,
    }
}

#[test]
fn test_reply_maps_to_postback_button() {
    let action = ClientAction::Reply(Reply::new("Yes", "YES_PAYLOAD"));
    assert_eq!(
        button(&action),
        json!({"type": "postback", "title": "Yes", "payload": "YES_PAYLOAD"})
    );
}

#[test]
fn test_click_maps_to_web_url_button() {
    let action = ClientAction::Click {
        display: "Open".to_string(),
        url: "https://example.com/x?y=1".to_string(),
    };
    assert_eq!(
        button(&action),
        json!({"type": "web_url", "title": "Open", "url": "https://example.com/x?y=1"})
    );
}

#[test]
fn test_call_maps_to_phone_number_button() {
    let action = ClientAction::Call {
        display: "Call us".to_string(),
        phone_number: "+15551234567".to_string(),
    };
    assert_eq!(
        button(&action),
        json!({"type": "phone_number", "title": "Call us", "payload": "+15551234567"})
    );
}

#[test]
fn test_quick_reply_shape() {
    assert_eq!(
        quick_reply(&Reply::new("Red", "COLOR_RED")),
        json!({"content_type": "text", "title": "Red", "payload": "COLOR_RED"})
    );
}

#[test]
fn test_rich_card_without_float_actions_has_no_quick_replies() {
    let message = rich_card_message(&card(
        vec![ClientAction::Reply(Reply::new("Yes", "YES_PAYLOAD"))],
        vec![],
    ));
    let body = serde_json::to_value(SendRequest::response("U1", message)).unwrap();

    assert_eq!(
        body["message"]["attachment"]["payload"]["elements"][0]["buttons"][0],
        json!({"type": "postback", "title": "Yes", "payload": "YES_PAYLOAD"})
    );
    assert!(body["message"].get("quick_replies").is_none());
    assert_eq!(body["messaging_type"], "RESPONSE");
    assert_eq!(body["recipient"], json!({"id": "U1"}));
}

#[test]
fn test_rich_card_element_fields() {
    let message = rich_card_message(&card(vec![], vec![]));

    assert_eq!(message["attachment"]["type"], "template");
    assert_eq!(message["attachment"]["payload"]["template_type"], "generic");

    let elements = message["attachment"]["payload"]["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0]["title"], "Pick one");
    assert_eq!(elements[0]["subtitle"], "Choose wisely");
    assert_eq!(elements[0]["image_url"], "https://cdn.example.com/a.png");
    assert_eq!(elements[0]["buttons"], json!([]));
}

#[test]
fn test_rich_card_with_float_actions_attaches_quick_replies_in_order() {
    let message = rich_card_message(&card(
        vec![
            ClientAction::Reply(Reply::new("Yes", "Y")),
            ClientAction::Click {
                display: "Docs".to_string(),
                url: "https://example.com".to_string(),
            },
        ],
        vec![Reply::new("Later", "LATER"), Reply::new("Never", "NEVER")],
    ));

    let buttons = message["attachment"]["payload"]["elements"][0]["buttons"]
        .as_array()
        .unwrap();
    assert_eq!(buttons.len(), 2);
    assert_eq!(buttons[1]["type"], "web_url");

    assert_eq!(
        message["quick_replies"],
        json!([
            {"content_type": "text", "title": "Later", "payload": "LATER"},
            {"content_type": "text", "title": "Never", "payload": "NEVER"}
        ])
    );
}

#[test]
fn test_missing_media_serializes_as_null_image() {
    let mut c = card(vec![], vec![]);
    c.media_url = None;
    let message = rich_card_message(&c);
    assert!(message["attachment"]["payload"]["elements"][0]["image_url"].is_null());
}

#[test]
fn test_text_and_action_requests() {
    let body = serde_json::to_value(SendRequest::response("U9", text_message("hello"))).unwrap();
    assert_eq!(
        body,
        json!({"messaging_type": "RESPONSE", "recipient": {"id": "U9"}, "message": {"text": "hello"}})
    );

    let typing = serde_json::to_value(ActionRequest::new("U9", SenderAction::TypingOn)).unwrap();
    assert_eq!(typing, json!({"recipient": {"id": "U9"}, "sender_action": "typing_on"}));

    let seen = serde_json::to_value(ActionRequest::new("U9", SenderAction::MarkSeen)).unwrap();
    assert_eq!(seen["sender_action"], "mark_seen");
}
