//! Graph API client
//!
//! Thin wrapper around `reqwest` for the Messenger Send API and profile
//! lookups. No retries: every call is a single round trip bounded by the
//! configured timeout.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::config::{
    AppConfig, DEFAULT_GRAPH_URL, DEFAULT_GRAPH_VERSION, DEFAULT_HTTP_TIMEOUT_SECS,
};
use crate::errors::MessengerError;

/// Raw answer from the Graph API, kept so callers can decide how to report it.
#[derive(Debug, Clone)]
pub struct GraphResponse {
    pub status: u16,
    pub body: String,
}

impl GraphResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Pulls `error.message` out of a Graph error body, falling back to the raw body.
    #[must_use]
    pub fn error_message(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}: {}", self.status, self.body))
    }
}

#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    base_url: String,
    version: String,
}

impl GraphClient {
    pub fn new(
        base_url: impl Into<String>,
        version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MessengerError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            version: version.into(),
        })
    }

    pub fn with_defaults() -> Result<Self, MessengerError> {
        Self::new(
            DEFAULT_GRAPH_URL,
            DEFAULT_GRAPH_VERSION,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        )
    }

    /// Client for the Graph URL, version and timeout of the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, MessengerError> {
        Self::new(
            config.graph_url.clone(),
            config.graph_version.clone(),
            config.http_timeout,
        )
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/me/messages", self.base_url, self.version)
    }

    /// POSTs a Send API payload to `/{version}/me/messages`.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` or `Http` when no response came back. A non-2xx
    /// response is not an error here; inspect [`GraphResponse::is_success`].
    pub async fn post_message<T: Serialize + ?Sized>(
        &self,
        access_token: &str,
        payload: &T,
    ) -> Result<GraphResponse, MessengerError> {
        let resp = self
            .http
            .post(self.messages_url())
            .query(&[("access_token", access_token)])
            .json(payload)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        if (200..300).contains(&status) {
            debug!(status, response = %body, "Graph API send response");
        } else {
            warn!(status, response = %body, "Graph API rejected send request");
        }

        Ok(GraphResponse { status, body })
    }

    /// Fetches selected fields of a user profile by PSID.
    pub async fn get_profile(
        &self,
        access_token: &str,
        psid: &str,
        fields: &str,
    ) -> Result<Value, MessengerError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(psid));
        let resp = self
            .http
            .get(url)
            .query(&[("fields", fields), ("access_token", access_token)])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(MessengerError::Http(format!(
                "profile lookup HTTP {status}: {body}"
            )));
        }

        Ok(resp.json::<Value>().await?)
    }
}
