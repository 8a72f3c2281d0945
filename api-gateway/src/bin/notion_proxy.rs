//! Notion Proxy Lambda - the Bench Tracker app's only backend.
//!
//! Endpoints (all on one route, selected by `?action=`):
//! - GET - Open work orders with milestones and parts (`status` filters)
//! - GET workflows / todos / schema
//! - POST createProject, createMilestones, saveProgress, saveMilestones,
//!   saveParts, createWorkflow, createTodo
//! - PUT updateProject, updateMilestone, updateWorkflow, updateTodo
//! - DELETE deleteWorkflow
//! - OPTIONS - CORS preflight

use api_gateway::dispatch::{respond, ProxyRequest};
use chrono::Utc;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{resolve_notion_token, Config, NotionClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    config: Config,
    notion: NotionClient,
}

impl AppState {
    async fn new() -> Self {
        let mut config = Config::from_env();

        // A missing token is reported per request, so the function still starts
        if let Err(e) = resolve_notion_token(&mut config).await {
            error!(error = %e, "Failed to load Notion token from Secrets Manager");
        }

        let notion = NotionClient::from_config(&config);
        Self { config, notion }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let request = ProxyRequest::from_lambda(&event);
    info!(
        "Notion proxy request: {} action={}",
        request.method,
        request.param("action").unwrap_or("-")
    );

    respond(
        &state.notion,
        &state.config,
        &request,
        Utc::now().date_naive(),
    )
    .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
