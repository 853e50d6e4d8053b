use anyhow::{Context, Result};
use tracing::info;

use textsmith_backend::app::{create_app, AppState};
use textsmith_backend::config::Settings;
use textsmith_backend::logging::init_logging;
use textsmith_backend::services::{MediaStore, ModelGateway};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("Failed to load configuration")?;
    init_logging(&settings.env);

    let gateway = ModelGateway::new(&settings)?;
    let media = MediaStore::new(&settings)?;

    let addr = settings.server_addr.clone();
    let state = AppState::new(settings, gateway, media);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {addr}");

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
