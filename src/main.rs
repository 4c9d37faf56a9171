//! `PicTalk`: multimodal chat assistant
//!
//! Serves a single chat session over HTTP: text and image prompts go to a
//! Gemini model with a short window of prior exchanges as context;
//! finished conversations can be archived, reopened and exported as PDF.

mod api;
mod bitmap;
mod capture;
mod config;
mod context;
mod llm;
mod session;
mod store;
mod transcript;

use api::{create_router, AppState};
use config::AppConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pictalk=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;

    let llm = llm::from_config(&config)?;
    tracing::info!(
        model = %llm.model_id(),
        api_base = %config.api_base,
        request_timeout_secs = ?config.request_timeout.as_ref().map(Duration::as_secs),
        "Model gateway initialized"
    );

    let state = AppState::new(llm);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("PicTalk server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
