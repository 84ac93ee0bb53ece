use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::info;

use bpjp_api::app::{create_app, AppState};
use bpjp_api::config::Config;
use bpjp_api::middleware::{init_metrics, logging::init_logging};
use bpjp_api::services::identity::{
    IdentityProvider, IdentityToolkitProvider, LocalIdentityProvider,
};
use bpjp_api::services::recommendation::Recommender;
use persistence::store::{FirestoreDocumentStore, MemoryDocumentStore, PgDocumentStore};
use persistence::{BlobStorage, DocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;
    config.validate()?;

    init_logging(&config.logging);
    init_metrics().context("failed to install metrics recorder")?;

    info!("Starting BPJP API v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config).await?;
    info!(backend = store.backend(), "Document store ready");

    let blobs = BlobStorage::from_config(
        &config.storage.blob_config()?,
        &config.storage.public_base_url,
    )?;

    let identity: Arc<dyn IdentityProvider> = match config.auth.provider.as_str() {
        "local" => Arc::new(LocalIdentityProvider::new()),
        "identity_toolkit" => Arc::new(IdentityToolkitProvider::new(&config.auth)?),
        other => bail!("unknown auth provider '{}'", other),
    };
    info!(provider = identity.name(), "Identity provider ready");

    let recommender = Recommender::from_config(&config.ai)?;
    if !recommender.has_model() {
        info!("No generative model configured, recommendations use the catalogue only");
    }

    let addr = config.socket_addr()?;
    let state = AppState::new(config, store, blobs, identity, recommender)
        .context("failed to build session token keys")?;
    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.store.backend.as_str() {
        "memory" => {
            let store = config
                .store
                .denied_collections
                .iter()
                .fold(MemoryDocumentStore::new(), |store, collection| {
                    store.deny_access(collection)
                });
            Arc::new(store)
        }
        "postgres" => {
            info!("Connecting to database and running migrations...");
            let pool = persistence::db::open(&config.store.database.to_pool_config()).await?;
            Arc::new(PgDocumentStore::new(pool))
        }
        "firestore" => Arc::new(FirestoreDocumentStore::new(
            config.store.firestore.to_store_config(),
        )?),
        other => bail!("unknown store backend '{}'", other),
    };
    Ok(store)
}
