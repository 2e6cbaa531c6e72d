//! API Lambda handler - thin router in front of the webhook controller.
//!
//! This module handles:
//! - Route matching (`/{IChannel}/{MessengerChannel}/v1/{channelId}/{lang}`)
//! - Subscription handshake (GET)
//! - Event delivery (POST)

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use super::{helpers, parsing};
use crate::errors::MessengerError;
use crate::messenger::signature;
use crate::messenger::webhook::{Handshake, WebhookController};

pub const WRONG_VERIFY_TOKEN: &str = "Wrong Verify Token";
pub const NO_LONGER_ACTIVE: &str = "No longer active";
pub const NOT_A_PAGE: &str = "Not a page";

/// Lambda handler for the webhook entrypoint.
///
/// # Errors
///
/// Never returns `Err` for request-level problems; those become HTTP
/// responses so the platform sees a status code.
#[tracing::instrument(
    name = "webhook",
    level = "info",
    skip_all,
    fields(correlation_id = %Uuid::new_v4(), request_id = %event.context.request_id)
)]
pub async fn function_handler(
    controller: &WebhookController,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(route(controller, &event.payload).await)
}

/// Routes a raw API Gateway payload; split out so it can run without a Lambda context.
pub async fn route(controller: &WebhookController, payload: &Value) -> Value {
    let method = parsing::request_method(payload).unwrap_or("");
    let path = parsing::request_path(payload).unwrap_or("");
    info!(method, path, "API Lambda received request");

    let Some(route) = parsing::parse_channel_route(path) else {
        error!(path, "No route for path");
        return helpers::err_response(404, "Not found");
    };

    match method.to_ascii_uppercase().as_str() {
        "GET" => handle_verification(controller, &route, payload),
        "POST" => handle_delivery(controller, &route, payload).await,
        _ => helpers::err_response(405, "Method not allowed"),
    }
}

// ============================================================================
// Handshake
// ============================================================================

fn handle_verification(
    controller: &WebhookController,
    route: &parsing::ChannelRoute,
    payload: &Value,
) -> Value {
    let params = ["hub.mode", "hub.verify_token", "hub.challenge"]
        .map(|name| (name, parsing::query_param(payload, name)));

    let missing: Vec<&str> = params
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        error!(?missing, "Verification request missing query parameters");
        return helpers::err_response(400, &format!("Missing {}", missing.join(", ")));
    }

    let [mode, token, challenge] = params.map(|(_, v)| v.unwrap_or_default());
    let handshake = Handshake {
        mode: &mode,
        verify_token: &token,
        challenge: &challenge,
    };

    match controller.verify(&route.channel_id, &route.locale, &handshake) {
        Ok(challenge) => helpers::ok_text(&challenge),
        Err(MessengerError::ChannelNotConfigured(channel_id)) => {
            helpers::err_response(404, &format!("Did not find ::{channel_id}"))
        }
        Err(e @ MessengerError::HandshakeTokenMismatch) => {
            helpers::err_response(e.status_code(), WRONG_VERIFY_TOKEN)
        }
        Err(e) => helpers::err_response(e.status_code(), &e.to_string()),
    }
}

// ============================================================================
// Delivery
// ============================================================================

async fn handle_delivery(
    controller: &WebhookController,
    route: &parsing::ChannelRoute,
    payload: &Value,
) -> Value {
    let body = match parsing::request_body(payload) {
        Ok(body) => body,
        Err(e) => {
            error!("Invalid request body: {}", e);
            return helpers::err_response(e.status_code(), &e.to_string());
        }
    };

    let signature_header = payload
        .get("headers")
        .and_then(|h| parsing::get_header_value(h, signature::SIGNATURE_HEADER));

    match controller
        .receive_raw(&route.channel_id, &route.locale, &body, signature_header)
        .await
    {
        Ok(ack) => helpers::ok_text(ack),
        Err(e @ MessengerError::ChannelNotConfigured(_)) => {
            helpers::err_response(e.status_code(), NO_LONGER_ACTIVE)
        }
        Err(e @ MessengerError::NotPageSubscription(_)) => {
            helpers::err_response(e.status_code(), NOT_A_PAGE)
        }
        Err(e) => {
            error!("Delivery rejected: {}", e);
            helpers::err_response(e.status_code(), &e.to_string())
        }
    }
}
