//! Inbox Note Lambda - files a quick note into the Notion inbox.
//!
//! Endpoints:
//! - POST / - `{ "note": "..." }` creates one inbox note
//! - OPTIONS / - CORS preflight

use api_gateway::dispatch::{respond_inbox, ProxyRequest};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{resolve_notion_token, Config, NotionClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct AppState {
    config: Config,
    notion: NotionClient,
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let request = ProxyRequest::from_lambda(&event);
    info!("Inbox note request: {}", request.method);

    respond_inbox(&state.notion, &state.config, &request).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let mut config = Config::from_env();
    if let Err(e) = resolve_notion_token(&mut config).await {
        error!(error = %e, "Failed to load Notion token from Secrets Manager");
    }
    let notion = NotionClient::from_config(&config);
    let state = Arc::new(AppState { config, notion });

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
