//! Inventory store.
//!
//! Owns the in-memory, newest-first collection of listings backing the
//! back-office. All mutation goes through the store's methods (single
//! writer); each method calls the backend first and only reconciles the
//! local cache after the backend confirms, so the cache never runs ahead of
//! storage and no rollback path exists.

use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::instrument;

use pet_haven_core::{ColorVariant, Pet, PetId, PriceType, Species};

use crate::db::{NewPet, PetRepository, PetUpdate, RepositoryError};

// =============================================================================
// Local Cache
// =============================================================================

/// Newest-first collection of listings, keyed by id.
#[derive(Debug, Default)]
pub struct PetCache {
    pets: Vec<Pet>,
}

impl PetCache {
    /// Replace the whole collection.
    pub fn replace_all(&mut self, pets: Vec<Pet>) {
        self.pets = pets;
    }

    /// Current collection, in order.
    #[must_use]
    pub fn list(&self) -> &[Pet] {
        &self.pets
    }

    /// Lookup by id.
    #[must_use]
    pub fn get(&self, id: PetId) -> Option<&Pet> {
        self.pets.iter().find(|pet| pet.id == id)
    }

    /// Prepend a freshly created listing (newest-first ordering).
    pub fn prepend(&mut self, pet: Pet) {
        self.pets.insert(0, pet);
    }

    /// Reconcile an entry to match the backend's record.
    ///
    /// Replaces the cached entry in place; an entry missing from the cache
    /// is inserted at its chronological position.
    pub fn reconcile(&mut self, pet: Pet) {
        if let Some(existing) = self.pets.iter_mut().find(|p| p.id == pet.id) {
            *existing = pet;
            return;
        }
        let position = self
            .pets
            .iter()
            .position(|p| p.created_at <= pet.created_at)
            .unwrap_or(self.pets.len());
        self.pets.insert(position, pet);
    }

    /// Remove an entry. Removing an id that is not cached is a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn remove(&mut self, id: PetId) -> bool {
        let before = self.pets.len();
        self.pets.retain(|pet| pet.id != id);
        self.pets.len() != before
    }
}

// =============================================================================
// Partial Update Payload
// =============================================================================

/// Partial field set merged into an existing listing by `update`.
#[derive(Debug, Clone, Default)]
pub struct PetChanges {
    pub species: Option<Species>,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub price: Option<Decimal>,
    pub price_type: Option<PriceType>,
    pub images: Option<Vec<String>>,
    pub videos: Option<Vec<String>>,
    pub description: Option<String>,
    pub color_variants: Option<Vec<ColorVariant>>,
    pub in_stock: Option<bool>,
    pub is_visible: Option<bool>,
    pub featured: Option<bool>,
}

impl PetChanges {
    /// Merge these changes over the current record, producing the full
    /// column set to write.
    #[must_use]
    pub fn apply(self, current: Pet) -> PetUpdate {
        PetUpdate {
            species: self.species.unwrap_or(current.species),
            breed: self.breed.unwrap_or(current.breed),
            age: self.age.unwrap_or(current.age),
            price: self.price.unwrap_or(current.price),
            price_type: self.price_type.unwrap_or(current.price_type),
            images: self.images.unwrap_or(current.images),
            videos: self.videos.unwrap_or(current.videos),
            description: self.description.unwrap_or(current.description),
            color_variants: self.color_variants.unwrap_or(current.color_variants),
            in_stock: self.in_stock.unwrap_or(current.in_stock),
            is_visible: self.is_visible.unwrap_or(current.is_visible),
            featured: self.featured.unwrap_or(current.featured),
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// In-memory inventory store backed by the pets table.
pub struct InventoryStore {
    pool: PgPool,
    cache: RwLock<PetCache>,
    loaded: AtomicBool,
    loading: AtomicBool,
}

impl InventoryStore {
    /// Create an empty store; the collection is fetched lazily.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: RwLock::new(PetCache::default()),
            loaded: AtomicBool::new(false),
            loading: AtomicBool::new(false),
        }
    }

    /// Whether the first fetch is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    /// Fetch the collection if it has not been loaded yet.
    async fn ensure_loaded(&self) -> Result<(), RepositoryError> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }

        self.loading.store(true, Ordering::Relaxed);
        let result = PetRepository::new(&self.pool).list_all().await;
        self.loading.store(false, Ordering::Relaxed);

        let pets = result?;
        self.cache.write().await.replace_all(pets);
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }

    /// Refetch the collection from the backend, replacing the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the fetch fails.
    pub async fn refresh(&self) -> Result<(), RepositoryError> {
        let pets = PetRepository::new(&self.pool).list_all().await?;
        self.cache.write().await.replace_all(pets);
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }

    /// Current collection, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the initial fetch fails.
    pub async fn list(&self) -> Result<Vec<Pet>, RepositoryError> {
        self.ensure_loaded().await?;
        Ok(self.cache.read().await.list().to_vec())
    }

    /// Lookup by id; `None` is the distinct not-found state.
    ///
    /// Falls through to the backend when the id is not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a fetch fails.
    pub async fn get(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        self.ensure_loaded().await?;

        if let Some(pet) = self.cache.read().await.get(id).cloned() {
            return Ok(Some(pet));
        }

        let Some(pet) = PetRepository::new(&self.pool).get_by_id(id).await? else {
            return Ok(None);
        };
        self.cache.write().await.reconcile(pet.clone());
        Ok(Some(pet))
    }

    /// Flip the stock flag via the backend, then reconcile the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing doesn't exist; the
    /// cache is untouched on any error.
    #[instrument(skip(self))]
    pub async fn toggle_stock(&self, id: PetId) -> Result<Pet, RepositoryError> {
        let pet = PetRepository::new(&self.pool).toggle_stock(id).await?;
        self.cache.write().await.reconcile(pet.clone());
        Ok(pet)
    }

    /// Flip the visibility flag via the backend, then reconcile the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing doesn't exist; the
    /// cache is untouched on any error.
    #[instrument(skip(self))]
    pub async fn toggle_visibility(&self, id: PetId) -> Result<Pet, RepositoryError> {
        let pet = PetRepository::new(&self.pool).toggle_visibility(id).await?;
        self.cache.write().await.reconcile(pet.clone());
        Ok(pet)
    }

    /// Create a listing; the backend assigns id and timestamps. The result
    /// is prepended to the collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    #[instrument(skip(self, new))]
    pub async fn add(&self, new: NewPet) -> Result<Pet, RepositoryError> {
        let pet = PetRepository::new(&self.pool).insert(&new).await?;
        self.cache.write().await.prepend(pet.clone());
        Ok(pet)
    }

    /// Merge partial changes into a listing, remotely then locally.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing doesn't exist.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: PetId, changes: PetChanges) -> Result<Pet, RepositoryError> {
        let repo = PetRepository::new(&self.pool);
        let current = repo.get_by_id(id).await?.ok_or(RepositoryError::NotFound)?;
        let merged = changes.apply(current);
        let pet = repo.update(id, &merged).await?;
        self.cache.write().await.reconcile(pet.clone());
        Ok(pet)
    }

    /// Delete a listing, remotely then locally.
    ///
    /// Idempotent against "already deleted": the backend delete is always
    /// issued, and removing an id absent from the cache is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: PetId) -> Result<(), RepositoryError> {
        let removed_remotely = PetRepository::new(&self.pool).delete(id).await?;
        if !removed_remotely {
            tracing::debug!(%id, "delete on already-removed listing");
        }
        self.cache.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    fn pet(breed: &str, minutes_ago: i64) -> Pet {
        let created = Utc::now() - TimeDelta::minutes(minutes_ago);
        Pet {
            id: PetId::generate(),
            species: Species::Dog,
            breed: breed.to_owned(),
            age: "1 year".to_owned(),
            price: Decimal::new(10_000, 2),
            price_type: PriceType::Each,
            image: None,
            images: vec![],
            video: None,
            videos: vec![],
            description: "desc".to_owned(),
            color_variants: vec![],
            in_stock: true,
            is_visible: true,
            featured: false,
            created_at: created,
            updated_at: created,
            created_by: None,
        }
    }

    #[test]
    fn test_cache_remove_absent_id_is_noop() {
        let mut cache = PetCache::default();
        cache.replace_all(vec![pet("Beagle", 10)]);

        assert!(!cache.remove(PetId::generate()));
        assert_eq!(cache.list().len(), 1);
    }

    #[test]
    fn test_cache_prepend_keeps_newest_first() {
        let mut cache = PetCache::default();
        cache.replace_all(vec![pet("Old", 60)]);
        cache.prepend(pet("New", 0));

        assert_eq!(cache.list()[0].breed, "New");
        assert_eq!(cache.list()[1].breed, "Old");
    }

    #[test]
    fn test_cache_reconcile_replaces_in_place() {
        let mut cache = PetCache::default();
        let mut target = pet("Beagle", 10);
        cache.replace_all(vec![pet("Newer", 5), target.clone(), pet("Older", 20)]);

        target.in_stock = false;
        cache.reconcile(target.clone());

        assert_eq!(cache.list().len(), 3);
        assert!(!cache.get(target.id).unwrap().in_stock);
        assert_eq!(cache.list()[1].id, target.id);
    }

    #[test]
    fn test_cache_reconcile_inserts_missing_entry_chronologically() {
        let mut cache = PetCache::default();
        cache.replace_all(vec![pet("Newer", 5), pet("Older", 20)]);

        cache.reconcile(pet("Middle", 10));

        let breeds: Vec<&str> = cache.list().iter().map(|p| p.breed.as_str()).collect();
        assert_eq!(breeds, vec!["Newer", "Middle", "Older"]);
    }

    #[test]
    fn test_changes_apply_merges_partial_fields() {
        let current = pet("Beagle", 10);
        let changes = PetChanges {
            breed: Some("Terrier".to_owned()),
            in_stock: Some(false),
            ..PetChanges::default()
        };

        let merged = changes.apply(current.clone());
        assert_eq!(merged.breed, "Terrier");
        assert!(!merged.in_stock);
        // Untouched fields carry over.
        assert_eq!(merged.age, "1 year");
        assert_eq!(merged.price, current.price);
    }
}
