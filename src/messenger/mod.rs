//! All Messenger-specific functionality

pub mod channel;
pub mod events;
pub mod payload;
pub mod signature;
pub mod webhook;

pub use channel::{MessageChannel, MessengerChannel};
pub use events::ReceiveRequest;
pub use webhook::{Handshake, WebhookController};
