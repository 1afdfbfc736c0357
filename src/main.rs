use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use audit_rag::server;
use audit_rag::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize()?;
    audit_rag::core::logging::init(&state.paths);

    // Warm up in the background; searches return empty results until ready.
    let rag = state.rag.clone();
    tokio::spawn(async move {
        if let Err(err) = rag.initialize().await {
            tracing::warn!("RAG warm-up failed ({}): {}", err.category(), err);
        }
    });

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(0);
    let bind_addr = format!("{}:{}", state.config.server_host(), port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("AUDIT_RAG_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state.clone());
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
