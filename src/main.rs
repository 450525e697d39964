use anyhow::Result;
use iso_shelf::{
    config::{AppConfig, Backend},
    routes::routes,
    services::{local_store::LocalStore, s3_store::S3Store, store::ObjectStore},
    state::AppState,
};
use std::{io::ErrorKind, sync::Arc};
use tokio::{fs, net::TcpListener};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!("Starting iso-shelf with config: {:?}", cfg);

    // --- Initialize object store ---
    let store: Arc<dyn ObjectStore> = match (cfg.backend, cfg.s3.clone()) {
        (Backend::S3, Some(settings)) => {
            tracing::info!("Using S3 bucket `{}`", settings.bucket);
            Arc::new(S3Store::connect(settings).await)
        }
        _ => {
            if fs::metadata(&cfg.storage_dir).await.is_err() {
                fs::create_dir_all(&cfg.storage_dir).await?;
                tracing::info!("Created storage directory at {}", cfg.storage_dir.display());
            }
            tracing::info!("Serving images from {}", cfg.storage_dir.display());
            Arc::new(LocalStore::new(cfg.storage_dir.clone()))
        }
    };

    // --- Build router ---
    let app = routes::app(AppState::new(store), &cfg.static_dir);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
