use std::sync::Arc;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::database::hosted::HostedStore;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::{StoreError, TransactionStore};

/// Build the store selected by configuration. Called once at startup; the
/// result is shared by every request through the application state.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn TransactionStore>, StoreError> {
    let store: Arc<dyn TransactionStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Hosted => {
            let url = config
                .hosted_url
                .as_deref()
                .ok_or(StoreError::ConfigMissing("SUPABASE_URL"))?;
            let key = config
                .service_key
                .as_deref()
                .ok_or(StoreError::ConfigMissing("SUPABASE_SERVICE_ROLE_KEY"))?;
            Arc::new(HostedStore::new(url, key, &config.table)?)
        }
        StoreBackend::Postgres => Arc::new(PgStore::connect(config).await?),
    };

    info!("Using {} transaction store (table: {})", store.backend(), config.table);
    Ok(store)
}
