use std::sync::Arc;

use grant_report::server::{AppState, router};
use grant_report::storage::{DirectoryStore, ObjectStore, StorageConfig};
use grant_report::DocumentList;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store: Option<Arc<dyn ObjectStore>> = match StorageConfig::from_env() {
        Ok(config) => {
            let store = DirectoryStore::open(&config)
                .map_err(|e| anyhow::anyhow!("opening object store: {e}"))?;
            log::info!(
                "object store: {}/{}",
                config.root.display(),
                config.bucket
            );
            Some(Arc::new(store))
        }
        Err(e) => {
            log::warn!("{e}; report requests will fail until storage is configured");
            None
        }
    };

    let state = AppState {
        store,
        documents: DocumentList::default(),
    };

    let addr = std::env::var("REPORT_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
