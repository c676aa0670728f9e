//! LapStory Server
//!
//! Connects to the live telemetry stream and serves race story highlights

use anyhow::Result;
use lapstory_server::{api, config::ServerConfig, ingest, state};
use lapstory_stream::StreamClient;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting LapStory Server");

    let config = ServerConfig::load()?;

    // Create application state
    let state = state::AppState::new(config.buffer_capacity);

    // Start ingest before connecting so no frame is missed
    tokio::spawn(ingest::run(state.clone(), state.subscribe()));

    let client = StreamClient::websocket(
        config.stream_url.clone(),
        config.stream.clone(),
        ingest::IngestHandler::new(state.clone()),
    )?;
    info!("Streaming telemetry from {}", config.stream_url);
    client.connect();

    // Build the router
    let app = api::create_router(state);

    // Start server
    info!("Server listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    client.close();
    info!("LapStory Server stopped");

    Ok(())
}
