use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("Channel is not configured: {0}")]
    ChannelNotConfigured(String),

    #[error("Webhook verify token mismatch")]
    HandshakeTokenMismatch,

    #[error("Unsupported webhook subscription object: {0}")]
    NotPageSubscription(String),

    #[error("Operation not supported by the Messenger channel: {0}")]
    UnsupportedPayload(&'static str),

    #[error("Webhook signature verification failed")]
    InvalidSignature,

    #[error("Failed to parse Messenger payload: {0}")]
    Parse(String),

    #[error("Request to the Graph API timed out: {0}")]
    Timeout(String),

    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    #[error("Failed to forward message to dispatcher: {0}")]
    Dispatch(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl MessengerError {
    /// HTTP status the webhook surface answers with for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            MessengerError::ChannelNotConfigured(_) | MessengerError::NotPageSubscription(_) => 404,
            MessengerError::HandshakeTokenMismatch => 403,
            MessengerError::InvalidSignature => 401,
            MessengerError::Parse(_) => 400,
            MessengerError::UnsupportedPayload(_) => 501,
            MessengerError::Timeout(_) => 504,
            MessengerError::Http(_) | MessengerError::Dispatch(_) => 502,
            MessengerError::Config(_) => 500,
        }
    }
}

impl From<reqwest::Error> for MessengerError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            MessengerError::Timeout(error.to_string())
        } else {
            MessengerError::Http(error.to_string())
        }
    }
}

impl From<serde_json::Error> for MessengerError {
    fn from(error: serde_json::Error) -> Self {
        MessengerError::Parse(error.to_string())
    }
}

impl From<anyhow::Error> for MessengerError {
    fn from(error: anyhow::Error) -> Self {
        MessengerError::Dispatch(error.to_string())
    }
}
