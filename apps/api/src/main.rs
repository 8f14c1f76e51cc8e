mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod refinement;
mod routes;
mod state;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::refinement::collaborator::{ClaudeEditCollaborator, EditCollaborator};
use crate::refinement::tracker::{LoggingTracker, PipelineTracker, WebhookTracker};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Refit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO (plan artifact snapshots)
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize the generative collaborator
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    let collaborator: Arc<dyn EditCollaborator> = Arc::new(ClaudeEditCollaborator::new(llm));
    info!("Edit collaborator initialized (model: {})", llm_client::MODEL);

    // Lifecycle tracker: webhook when configured, logging otherwise
    let tracker: Arc<dyn PipelineTracker> = match &config.tracker_webhook_url {
        Some(url) => {
            info!("Pipeline tracker webhook: {url}");
            Arc::new(WebhookTracker::new(url.clone()))
        }
        None => Arc::new(LoggingTracker),
    };

    // Build app state
    let state = AppState {
        db,
        s3,
        config: config.clone(),
        collaborator,
        tracker,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "refit-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
