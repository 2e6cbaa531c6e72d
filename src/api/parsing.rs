use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::MessengerError;

const CHANNEL_INTERFACES: [&str; 2] = ["IChannel", "io.opencui.channel.IChannel"];
const CHANNEL_IMPLS: [&str; 2] = ["MessengerChannel", "io.opencui.channel.MessengerChannel"];
const ROUTE_VERSION: &str = "v1";

/// Channel id and locale addressed by a webhook path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRoute {
    pub channel_id: String,
    pub locale: String,
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// HTTP method from either API Gateway payload format.
pub fn request_method(payload: &Value) -> Option<&str> {
    v_str(payload, &["requestContext", "http", "method"]).or_else(|| v_str(payload, &["httpMethod"]))
}

pub fn request_path(payload: &Value) -> Option<&str> {
    v_str(payload, &["rawPath"]).or_else(|| v_str(payload, &["path"]))
}

/// Matches `.../{IChannel}/{MessengerChannel}/v1/{channelId}/{lang}`.
///
/// Leading segments (such as an API Gateway stage) are ignored.
pub fn parse_channel_route(path: &str) -> Option<ChannelRoute> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 5 {
        return None;
    }

    let tail = &segments[segments.len() - 5..];
    let (iface, imp, version, channel_id, locale) = (tail[0], tail[1], tail[2], tail[3], tail[4]);

    if CHANNEL_INTERFACES.contains(&iface) && CHANNEL_IMPLS.contains(&imp) && version == ROUTE_VERSION
    {
        Some(ChannelRoute {
            channel_id: channel_id.to_string(),
            locale: locale.to_string(),
        })
    } else {
        None
    }
}

/// Reads a query parameter from `queryStringParameters`, falling back to
/// decoding `rawQueryString`.
pub fn query_param(payload: &Value, name: &str) -> Option<String> {
    if let Some(v) = v_str(payload, &["queryStringParameters", name]) {
        return Some(v.to_string());
    }

    let raw = v_str(payload, &["rawQueryString"])?;
    url::form_urlencoded::parse(raw.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Returns the raw request body bytes, decoding base64 when flagged.
pub fn request_body(payload: &Value) -> Result<Vec<u8>, MessengerError> {
    let body = match payload.get("body") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) => s,
        Some(_) => return Err(MessengerError::Parse("body is not a string".to_string())),
    };

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if encoded {
        STANDARD
            .decode(body)
            .map_err(|e| MessengerError::Parse(format!("invalid base64 body: {e}")))
    } else {
        Ok(body.as_bytes().to_vec())
    }
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}
