//! Read-only pet listing repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use pet_haven_core::{ColorVariant, Pet, PetId, PriceType, ProfileId, Species};

use super::RepositoryError;

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

/// Repository for storefront pet queries.
pub struct PetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PetRepository<'a> {
    /// Create a new pet repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all visible listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_visible(&self) -> Result<Vec<Pet>, RepositoryError> {
        let rows = sqlx::query_as::<_, PetRow>(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE is_visible ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a visible listing by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_visible_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        let row = sqlx::query_as::<_, PetRow>(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE id = $1 AND is_visible"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
