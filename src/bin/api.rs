use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, service_fn};
use messenger_channel::core::config::AppConfig;
use messenger_channel::core::dispatcher::HttpDispatcher;
use messenger_channel::messenger::WebhookController;
use serde_json::Value;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    messenger_channel::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    if config.channels.is_empty() {
        warn!("MESSENGER_CHANNELS has no channels; every webhook request will answer 404");
    }
    info!(
        channels = config.channels.len(),
        graph_url = %config.graph_url,
        graph_version = %config.graph_version,
        delivery_reporting = ?config.delivery_reporting,
        "Configuration loaded"
    );

    let dispatcher_url = config.dispatcher_url.clone().ok_or_else(|| {
        error!("Config error: DISPATCHER_URL is not set");
        Error::from("DISPATCHER_URL is not set")
    })?;
    let dispatcher = HttpDispatcher::new(dispatcher_url, config.http_timeout)?;

    let controller = Arc::new(WebhookController::new(
        Arc::new(config.channels),
        Arc::new(dispatcher),
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let controller = Arc::clone(&controller);
        async move { messenger_channel::api::handler(&controller, event).await }
    }))
    .await
}
