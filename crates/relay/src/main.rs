use std::net::SocketAddr;

use relay::{build_router, config::load_settings, SubmissionRelay};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    if settings.sheets_url.is_none() {
        warn!("GOOGLE_SHEETS_URL is not set; every submission will fail until it is configured");
    }

    let relay = SubmissionRelay::new(settings.sheets_url)?;
    let app = build_router(relay);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "survey relay listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
