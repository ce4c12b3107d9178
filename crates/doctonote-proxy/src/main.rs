//! Rating proxy server binary.
//!
//! Reads `.env` when present, then `PORT`, `GOOGLE_MAPS_API_KEY` and
//! `PLACES_API_URL` from the environment.

use doctonote_proxy::{router, AppState, ProxyConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("doctonote_proxy=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ProxyConfig::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!("GOOGLE_MAPS_API_KEY is not set; rating requests will fail");
    }

    let addr = config.bind_addr();
    let app = router(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("-- Starting DoctoNote rating proxy on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
