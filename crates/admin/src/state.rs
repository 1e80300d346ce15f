//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::google::GoogleOAuthClient;
use crate::services::inventory::InventoryStore;
use crate::storage::StorageClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration. The
/// inventory store is owned here, once per application instance; handlers
/// only mutate it through its methods.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    storage: StorageClient,
    google: GoogleOAuthClient,
    inventory: InventoryStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Admin configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let storage = StorageClient::new(&config.storage);
        let google = GoogleOAuthClient::new(&config.google);
        let inventory = InventoryStore::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
                google,
                inventory,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the object-store client.
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    /// Get a reference to the Google OAuth client.
    #[must_use]
    pub fn google(&self) -> &GoogleOAuthClient {
        &self.inner.google
    }

    /// Get a reference to the inventory store.
    #[must_use]
    pub fn inventory(&self) -> &InventoryStore {
        &self.inner.inventory
    }
}
