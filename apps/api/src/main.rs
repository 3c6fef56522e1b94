mod analysis;
mod applications;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::extractor::PdfTextExtractor;
use crate::analysis::rubric::RubricCatalog;
use crate::applications::store::PgApplicationStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(default_log_directive(&config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jobify API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgApplicationStore::new(db));

    // Compile rubric keyword tables
    let rubrics = RubricCatalog::new(config.rubric_dir.clone())?;
    let missing = rubrics.missing_documents();
    if missing.is_empty() {
        info!("Rubric corpus loaded from {}", rubrics.dir().display());
    } else {
        // Not fatal at startup: requests that select these roles fail with a 500.
        warn!(
            "Rubric corpus at {} is missing documents for roles: {:?}",
            rubrics.dir().display(),
            missing
        );
    }

    // Initialize LLM client
    let llm = LlmClient::new(
        config.gemini_api_base.clone(),
        config.gemini_model.clone(),
        config.gemini_api_key.clone(),
    );
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        config: config.clone(),
        rubrics: Arc::new(rubrics),
        extractor: Arc::new(PdfTextExtractor),
        model: Arc::new(llm),
        store,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // browser client is served from a separate origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Default filter when `RUST_LOG` is unset: this crate plus the HTTP trace layer.
fn default_log_directive(level: &str) -> String {
    format!("{}={level},tower_http={level}", env!("CARGO_CRATE_NAME"))
}
