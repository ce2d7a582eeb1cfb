mod api;

use std::sync::Arc;

use api::state::AppState;
use relay_stream::HttpUpstream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relay_server=debug".into()),
        )
        .with_target(false)
        .init();

    let upstream = Arc::new(HttpUpstream::from_env()?);
    let state = AppState::new(upstream);

    let addr = std::env::var("RELAY_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "relay server listening");
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
