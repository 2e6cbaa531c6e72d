use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::MessengerError;

pub const PAGE_ACCESS_TOKEN: &str = "page_access_token";
pub const VERIFY_TOKEN: &str = "verify_token";
pub const APP_SECRET: &str = "app_secret";

pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_GRAPH_VERSION: &str = "v11.0";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Per-channel secrets, loaded once and never mutated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    values: HashMap<String, Value>,
}

impl Configuration {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// String value for `key`; absent, null and non-string values read as `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn page_access_token(&self) -> Option<&str> {
        self.get(PAGE_ACCESS_TOKEN)
    }

    pub fn verify_token(&self) -> Option<&str> {
        self.get(VERIFY_TOKEN)
    }

    pub fn app_secret(&self) -> Option<&str> {
        self.get(APP_SECRET).filter(|s| !s.is_empty())
    }
}

/// How outbound sends report their outcome to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryReporting {
    /// Transport errors propagate; platform rejections become `Status::Fault`.
    #[default]
    Strict,
    /// Every outcome is logged and reported as `Status::Ok`.
    Legacy,
}

impl DeliveryReporting {
    pub fn parse(raw: &str) -> Result<Self, MessengerError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "strict" => Ok(Self::Strict),
            "legacy" => Ok(Self::Legacy),
            other => Err(MessengerError::Config(format!(
                "MESSENGER_DELIVERY_REPORTING: unknown mode '{other}'"
            ))),
        }
    }
}

/// Lookup of channel configurations by the channel id in the webhook path.
pub trait ChannelRegistry: Send + Sync {
    fn configuration(&self, locale: &str, channel_id: &str) -> Option<Arc<Configuration>>;
}

/// Registry backed by a fixed map; the locale is not part of the key.
#[derive(Debug, Clone, Default)]
pub struct StaticChannelRegistry {
    channels: HashMap<String, Arc<Configuration>>,
}

impl StaticChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_channel(mut self, channel_id: impl Into<String>, config: Configuration) -> Self {
        self.channels.insert(channel_id.into(), Arc::new(config));
        self
    }

    /// Parses `{"<channel id>": {"label": ..., "page_access_token": ..., ...}}`.
    pub fn from_json(raw: &str) -> Result<Self, MessengerError> {
        let parsed: HashMap<String, Configuration> = serde_json::from_str(raw)
            .map_err(|e| MessengerError::Config(format!("MESSENGER_CHANNELS: {e}")))?;

        let channels = parsed
            .into_iter()
            .map(|(id, mut config)| {
                if config.label.is_empty() {
                    config.label.clone_from(&id);
                }
                (id, Arc::new(config))
            })
            .collect();

        Ok(Self { channels })
    }

    pub fn channel(&self, channel_id: &str) -> Option<Arc<Configuration>> {
        self.channels.get(channel_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl ChannelRegistry for StaticChannelRegistry {
    fn configuration(&self, _locale: &str, channel_id: &str) -> Option<Arc<Configuration>> {
        self.channel(channel_id)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channels: StaticChannelRegistry,
    pub graph_url: String,
    pub graph_version: String,
    pub http_timeout: Duration,
    pub delivery_reporting: DeliveryReporting,
    pub dispatcher_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, MessengerError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source, e.g. a map in tests.
    pub fn from_vars<F>(var: F) -> Result<Self, MessengerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channels_raw = var("MESSENGER_CHANNELS")
            .ok_or_else(|| MessengerError::Config("MESSENGER_CHANNELS is not set".to_string()))?;

        let http_timeout = match var("MESSENGER_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                MessengerError::Config(format!("MESSENGER_HTTP_TIMEOUT_SECS: {e}"))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            channels: StaticChannelRegistry::from_json(&channels_raw)?,
            graph_url: var("MESSENGER_GRAPH_URL").unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string()),
            graph_version: var("MESSENGER_GRAPH_VERSION")
                .unwrap_or_else(|| DEFAULT_GRAPH_VERSION.to_string()),
            http_timeout: Duration::from_secs(http_timeout),
            delivery_reporting: DeliveryReporting::parse(
                &var("MESSENGER_DELIVERY_REPORTING").unwrap_or_default(),
            )?,
            dispatcher_url: var("DISPATCHER_URL"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_parses_channel_map_and_defaults_label() {
        let registry = StaticChannelRegistry::from_json(
            r#"{"page-1": {"page_access_token": "tok", "verify_token": "vt"},
                "page-2": {"label": "support", "page_access_token": "tok2", "verify_token": "vt2", "app_secret": "s"}}"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        let first = registry.configuration("en", "page-1").unwrap();
        assert_eq!(first.label, "page-1");
        assert_eq!(first.page_access_token(), Some("tok"));
        assert_eq!(first.verify_token(), Some("vt"));
        assert_eq!(first.app_secret(), None);

        let second = registry.configuration("zh", "page-2").unwrap();
        assert_eq!(second.label, "support");
        assert_eq!(second.app_secret(), Some("s"));
        assert!(registry.configuration("en", "missing").is_none());
    }

    #[test]
    fn registry_tolerates_non_string_values() {
        let registry = StaticChannelRegistry::from_json(
            r#"{"page-1": {"page_access_token": "tok", "verify_token": "vt", "app_secret": null, "retries": 3}}"#,
        )
        .unwrap();

        let config = registry.channel("page-1").unwrap();
        assert_eq!(config.page_access_token(), Some("tok"));
        assert_eq!(config.app_secret(), None);
        assert_eq!(config.get("retries"), None);
    }

    #[test]
    fn registry_rejects_malformed_json() {
        let err = StaticChannelRegistry::from_json("not json").unwrap_err();
        assert!(matches!(err, MessengerError::Config(_)));
    }

    #[test]
    fn delivery_reporting_modes() {
        assert_eq!(DeliveryReporting::parse("").unwrap(), DeliveryReporting::Strict);
        assert_eq!(DeliveryReporting::parse("Legacy").unwrap(), DeliveryReporting::Legacy);
        assert!(DeliveryReporting::parse("sometimes").is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn app_config_applies_defaults() {
        let config = AppConfig::from_vars(vars(&[("MESSENGER_CHANNELS", "{}")])).unwrap();

        assert!(config.channels.is_empty());
        assert_eq!(config.graph_url, DEFAULT_GRAPH_URL);
        assert_eq!(config.graph_version, DEFAULT_GRAPH_VERSION);
        assert_eq!(config.http_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        assert_eq!(config.delivery_reporting, DeliveryReporting::Strict);
        assert!(config.dispatcher_url.is_none());
    }

    #[test]
    fn app_config_reads_overrides() {
        let config = AppConfig::from_vars(vars(&[
            ("MESSENGER_CHANNELS", r#"{"page-1": {"page_access_token": "tok"}}"#),
            ("MESSENGER_GRAPH_URL", "http://localhost:8080"),
            ("MESSENGER_GRAPH_VERSION", "v19.0"),
            ("MESSENGER_HTTP_TIMEOUT_SECS", "3"),
            ("MESSENGER_DELIVERY_REPORTING", "legacy"),
            ("DISPATCHER_URL", "http://core/inbound"),
        ]))
        .unwrap();

        assert_eq!(config.channels.len(), 1);
        assert_eq!(config.graph_url, "http://localhost:8080");
        assert_eq!(config.graph_version, "v19.0");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.delivery_reporting, DeliveryReporting::Legacy);
        assert_eq!(config.dispatcher_url.as_deref(), Some("http://core/inbound"));
    }

    #[test]
    fn app_config_rejects_missing_channels_and_bad_values() {
        assert!(matches!(
            AppConfig::from_vars(vars(&[])),
            Err(MessengerError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_vars(vars(&[
                ("MESSENGER_CHANNELS", "{}"),
                ("MESSENGER_HTTP_TIMEOUT_SECS", "soon"),
            ])),
            Err(MessengerError::Config(_))
        ));
    }
}
