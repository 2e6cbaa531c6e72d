use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Checks an `X-Hub-Signature-256: sha256=<hex>` header against the raw body.
pub fn verify_hub_signature(request_body: &[u8], signature: &str, app_secret: &str) -> bool {
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        error!("Signature header missing sha256= prefix");
        return false;
    };

    let Ok(expected) = hex::decode(hex_digest) else {
        error!("Signature header is not valid hex");
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return false;
        }
    };
    mac.update(request_body);

    // verify_slice compares in constant time
    if mac.verify_slice(&expected).is_ok() {
        true
    } else {
        error!("Webhook signature verification failed");
        false
    }
}

pub fn compute_signature(request_body: &[u8], app_secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(request_body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
