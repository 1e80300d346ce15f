//! Response cache for catalog reads.
//!
//! Browsing is by far the hottest path; the visible-listing query is cached
//! for a short TTL so storefront traffic does not hammer the database. The
//! admin service writes through its own connection, so a cached page may be
//! up to one TTL stale.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use pet_haven_core::Pet;

use crate::db::{PetRepository, RepositoryError};

/// How long a cached catalog page stays fresh.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Cache key for catalog queries.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    VisiblePets,
}

/// Short-TTL cache over the visible catalog.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Cache<CacheKey, Arc<Vec<Pet>>>,
}

impl CatalogCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(8)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// The visible catalog, newest first, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the underlying fetch fails; failures are
    /// never cached.
    pub async fn visible_pets(&self, pool: &PgPool) -> Result<Arc<Vec<Pet>>, RepositoryError> {
        if let Some(pets) = self.inner.get(&CacheKey::VisiblePets).await {
            return Ok(pets);
        }

        let pets = Arc::new(PetRepository::new(pool).list_visible().await?);
        self.inner.insert(CacheKey::VisiblePets, pets.clone()).await;
        Ok(pets)
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}
