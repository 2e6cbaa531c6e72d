//! Messenger channel adapter for a conversational-AI dispatch core.
//!
//! This crate connects the dispatch core to the Messenger platform:
//! 1. An API Lambda that answers the webhook handshake and normalizes inbound
//!    deliveries before forwarding them to the dispatcher
//! 2. A channel that turns channel-agnostic outbound payloads (text, rich cards,
//!    quick replies) into Send API requests
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for the webhook endpoint
//! - reqwest for Graph API calls, bounded by a request timeout
//! - an injected `Dispatcher` so the bot core stays swappable
//! - Tokio for async runtime
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use messenger_channel::clients::GraphClient;
//! use messenger_channel::core::config::{Configuration, DeliveryReporting, PAGE_ACCESS_TOKEN};
//! use messenger_channel::core::models::{ClientAction, Reply, RichCard};
//! use messenger_channel::messenger::{MessageChannel, MessengerChannel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     messenger_channel::setup_logging();
//!
//!     let config = Configuration::new("support-page").with(PAGE_ACCESS_TOKEN, "EAAB...");
//!     let client = GraphClient::new("https://graph.facebook.com", "v11.0", Duration::from_secs(10))?;
//!     let channel = MessengerChannel::new(Arc::new(config), client, DeliveryReporting::Strict)?;
//!
//!     channel.typing_indicator("PSID").await?;
//!     let card = RichCard {
//!         title: "Order shipped".into(),
//!         description: "Arrives Tuesday".into(),
//!         media_url: None,
//!         inside_actions: vec![ClientAction::Reply(Reply::new("Track", "TRACK_ORDER"))],
//!         float_actions: vec![],
//!     };
//!     let status = channel.send_rich_card("PSID", &card).await?;
//!     println!("delivered: {}", status.is_ok());
//!
//!     Ok(())
//! }
//! ```
// Module declarations
pub mod api;
pub mod clients;
pub mod core;
pub mod errors;
pub mod messenger;

pub use errors::MessengerError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration, filtered by `RUST_LOG` (default `info`).
/// Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// messenger_channel::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
