use anyhow::{Context, Result};
use api::{create_router, AppState};
use threat_analyst::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the logger so RUST_LOG can come from it.
    let dotenv_loaded = dotenv::dotenv().is_ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if !dotenv_loaded {
        log::warn!(".env file not found, using process environment");
    }

    let config = Config::from_env()?;
    let port = config.port;
    log::info!(
        "Uploads stored in {}, OpenAI endpoint {}",
        config.upload_dir.display(),
        config.openai_base_url
    );

    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    log::info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
