//! Pet listing repository for database operations.
//!
//! The write path owns the media invariant: the legacy `image`/`video`
//! columns always mirror the first entry of the ordered `images`/`videos`
//! arrays.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use pet_haven_core::{
    ColorVariant, Pet, PetId, PriceType, ProfileId, Species, legacy_media_mirror,
};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` pet queries.
#[derive(Debug, sqlx::FromRow)]
struct PetRow {
    id: Uuid,
    species: Species,
    breed: String,
    age: String,
    price: Decimal,
    price_type: PriceType,
    image: Option<String>,
    images: Vec<String>,
    video: Option<String>,
    videos: Vec<String>,
    description: String,
    color_variants: Json<Vec<ColorVariant>>,
    in_stock: bool,
    is_visible: bool,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: Option<Uuid>,
}

impl From<PetRow> for Pet {
    fn from(row: PetRow) -> Self {
        Self {
            id: PetId::new(row.id),
            species: row.species,
            breed: row.breed,
            age: row.age,
            price: row.price,
            price_type: row.price_type,
            image: row.image,
            images: row.images,
            video: row.video,
            videos: row.videos,
            description: row.description,
            color_variants: row.color_variants.0,
            in_stock: row.in_stock,
            is_visible: row.is_visible,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by.map(ProfileId::new),
        }
    }
}

const PET_COLUMNS: &str = "id, species, breed, age, price, price_type, image, images, video, \
                           videos, description, color_variants, in_stock, is_visible, featured, \
                           created_at, updated_at, created_by";

// =============================================================================
// Write Payloads
// =============================================================================

/// A draft listing without an ID; the database assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewPet {
    pub species: Species,
    pub breed: String,
    pub age: String,
    pub price: Decimal,
    pub price_type: PriceType,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub description: String,
    pub color_variants: Vec<ColorVariant>,
    pub in_stock: bool,
    pub is_visible: bool,
    pub featured: bool,
    pub created_by: Option<ProfileId>,
}

/// The full mutable column set of a listing, written by `update`.
///
/// Partial-field merges happen in the service layer; the repository always
/// writes a complete, already-merged record.
#[derive(Debug, Clone)]
pub struct PetUpdate {
    pub species: Species,
    pub breed: String,
    pub age: String,
    pub price: Decimal,
    pub price_type: PriceType,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub description: String,
    pub color_variants: Vec<ColorVariant>,
    pub in_stock: bool,
    pub is_visible: bool,
    pub featured: bool,
}

impl From<Pet> for PetUpdate {
    fn from(pet: Pet) -> Self {
        Self {
            species: pet.species,
            breed: pet.breed,
            age: pet.age,
            price: pet.price,
            price_type: pet.price_type,
            images: pet.images,
            videos: pet.videos,
            description: pet.description,
            color_variants: pet.color_variants,
            in_stock: pet.in_stock,
            is_visible: pet.is_visible,
            featured: pet.featured,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for pet listing database operations.
pub struct PetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PetRepository<'a> {
    /// Create a new pet repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Pet>, RepositoryError> {
        let rows = sqlx::query_as::<_, PetRow>(&format!(
            "SELECT {PET_COLUMNS} FROM pets ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a listing by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        let row = sqlx::query_as::<_, PetRow>(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a new listing. The database assigns id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, new: &NewPet) -> Result<Pet, RepositoryError> {
        let (image, video) = legacy_media_mirror(&new.images, &new.videos);

        let row = sqlx::query_as::<_, PetRow>(&format!(
            "INSERT INTO pets (species, breed, age, price, price_type, image, images, video, \
             videos, description, color_variants, in_stock, is_visible, featured, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {PET_COLUMNS}"
        ))
        .bind(new.species)
        .bind(&new.breed)
        .bind(&new.age)
        .bind(new.price)
        .bind(new.price_type)
        .bind(image)
        .bind(&new.images)
        .bind(video)
        .bind(&new.videos)
        .bind(&new.description)
        .bind(Json(&new.color_variants))
        .bind(new.in_stock)
        .bind(new.is_visible)
        .bind(new.featured)
        .bind(new.created_by.map(|id| id.as_uuid()))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Write a merged record over an existing listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: PetId, update: &PetUpdate) -> Result<Pet, RepositoryError> {
        let (image, video) = legacy_media_mirror(&update.images, &update.videos);

        let row = sqlx::query_as::<_, PetRow>(&format!(
            "UPDATE pets SET species = $1, breed = $2, age = $3, price = $4, price_type = $5, \
             image = $6, images = $7, video = $8, videos = $9, description = $10, \
             color_variants = $11, in_stock = $12, is_visible = $13, featured = $14
             WHERE id = $15
             RETURNING {PET_COLUMNS}"
        ))
        .bind(update.species)
        .bind(&update.breed)
        .bind(&update.age)
        .bind(update.price)
        .bind(update.price_type)
        .bind(image)
        .bind(&update.images)
        .bind(video)
        .bind(&update.videos)
        .bind(&update.description)
        .bind(Json(&update.color_variants))
        .bind(update.in_stock)
        .bind(update.is_visible)
        .bind(update.featured)
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Atomically flip the stock flag of a listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_stock(&self, id: PetId) -> Result<Pet, RepositoryError> {
        let row = sqlx::query_as::<_, PetRow>(&format!(
            "UPDATE pets SET in_stock = NOT in_stock WHERE id = $1 RETURNING {PET_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Atomically flip the visibility flag of a listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_visibility(&self, id: PetId) -> Result<Pet, RepositoryError> {
        let row = sqlx::query_as::<_, PetRow>(&format!(
            "UPDATE pets SET is_visible = NOT is_visible WHERE id = $1 RETURNING {PET_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a listing by its ID.
    ///
    /// Returns whether a row was actually removed. Deleting an id that is
    /// already gone is not an error; the operation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: PetId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
