use std::sync::Arc;

use event_unfurl_lambda_rust::config::Config;
use event_unfurl_lambda_rust::handler::{self, App};
use event_unfurl_lambda_rust::links::{LinkExtractor, LinkMatcher};
use event_unfurl_lambda_rust::refresher::Refresher;
use event_unfurl_lambda_rust::slack::SlackClient;
use event_unfurl_lambda_rust::source::HttpSource;
use event_unfurl_lambda_rust::store::EventStore;
use lambda_runtime::{Error, service_fn};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize structured logging with tracing
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_current_span(false)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .try_init();

    let config = Config::from_env()?;
    info!(config = ?config, "Loaded configuration");
    let matcher = LinkMatcher::new(&config.link_host)?;

    // Lookups miss until the first refresh cycle publishes.
    let store = EventStore::new();
    let refresher = Refresher::new(
        HttpSource::new(config.source_url.clone(), config.download_timeout),
        store.clone(),
        config.data_path.clone(),
        config.refresh_interval,
    )
    .spawn();

    let app = Arc::new(App::new(
        LinkExtractor::new(matcher, store),
        SlackClient::new(config.slack_bot_token, config.slack_api_base),
    ));

    let result = lambda_runtime::run(service_fn(move |event| handler::handler(Arc::clone(&app), event))).await;
    refresher.shutdown().await;
    result
}
