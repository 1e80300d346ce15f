//! Pet listing domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. The media invariant lives here: when `images` is non-empty,
//! `images[0]` is the authoritative cover and the legacy `image` field is a
//! backward-compatible mirror of it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PetId, ProfileId, Species};

/// How the listed price is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "price_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// Price is per animal.
    #[default]
    Each,
    /// Price is for a bonded pair.
    Pair,
}

impl std::fmt::Display for PriceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Each => write!(f, "each"),
            Self::Pair => write!(f, "pair"),
        }
    }
}

/// An alternate media set for a color variation of a listing.
///
/// Selectable on the detail page; does not alter price or stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorVariant {
    /// Human-readable color name (e.g., "Golden").
    pub color_name: String,
    /// Hex color swatch (e.g., "#d4a017").
    pub color_hex: String,
    /// Variant image URLs, ordered.
    #[serde(default)]
    pub images: Vec<String>,
    /// Variant video URLs, ordered.
    #[serde(default)]
    pub videos: Vec<String>,
}

/// A pet listing (domain type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    /// Unique listing ID.
    pub id: PetId,
    /// Species of the pet.
    pub species: Species,
    /// Breed description.
    pub breed: String,
    /// Free-text age (e.g., "8 weeks").
    pub age: String,
    /// Listed price.
    pub price: Decimal,
    /// Whether the price is per animal or per pair.
    pub price_type: PriceType,
    /// Legacy single cover image URL; mirrors `images[0]` when set.
    pub image: Option<String>,
    /// Ordered image URLs; the first entry is the cover.
    pub images: Vec<String>,
    /// Legacy single video URL; mirrors `videos[0]` when set.
    pub video: Option<String>,
    /// Ordered video URLs.
    pub videos: Vec<String>,
    /// Listing description.
    pub description: String,
    /// Alternate media sets per color.
    pub color_variants: Vec<ColorVariant>,
    /// Whether the pet is currently in stock.
    pub in_stock: bool,
    /// Whether the listing is shown on the storefront.
    pub is_visible: bool,
    /// Whether the listing is featured on the home page.
    pub featured: bool,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
    /// When the listing was last updated.
    pub updated_at: DateTime<Utc>,
    /// Admin profile that created the listing, if recorded.
    pub created_by: Option<ProfileId>,
}

impl Pet {
    /// The authoritative cover image, if any.
    ///
    /// Prefers `images[0]`; falls back to the legacy `image` field for rows
    /// written before ordered media existed.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images
            .first()
            .map(String::as_str)
            .or(self.image.as_deref())
    }
}

/// Mirror the cover invariant onto the legacy single-media fields.
///
/// Returns `(image, video)` as they must be written alongside the ordered
/// lists: the legacy fields mirror the first entry of each list, or `None`
/// when the list is empty.
#[must_use]
pub fn legacy_media_mirror(
    images: &[String],
    videos: &[String],
) -> (Option<String>, Option<String>) {
    (images.first().cloned(), videos.first().cloned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pet_with_media(image: Option<&str>, images: &[&str]) -> Pet {
        Pet {
            id: PetId::generate(),
            species: Species::Dog,
            breed: "Beagle".to_owned(),
            age: "8 weeks".to_owned(),
            price: Decimal::new(25_000, 2),
            price_type: PriceType::Each,
            image: image.map(str::to_owned),
            images: images.iter().map(|s| (*s).to_owned()).collect(),
            video: None,
            videos: vec![],
            description: "Playful and healthy".to_owned(),
            color_variants: vec![],
            in_stock: true,
            is_visible: true,
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
        }
    }

    #[test]
    fn test_cover_prefers_ordered_list() {
        let pet = pet_with_media(Some("legacy.jpg"), &["cover.jpg", "second.jpg"]);
        assert_eq!(pet.cover_image(), Some("cover.jpg"));
    }

    #[test]
    fn test_cover_falls_back_to_legacy_field() {
        let pet = pet_with_media(Some("legacy.jpg"), &[]);
        assert_eq!(pet.cover_image(), Some("legacy.jpg"));
    }

    #[test]
    fn test_legacy_mirror_tracks_first_entries() {
        let images = vec!["a.jpg".to_owned(), "b.jpg".to_owned()];
        let videos: Vec<String> = vec![];
        let (image, video) = legacy_media_mirror(&images, &videos);
        assert_eq!(image.as_deref(), Some("a.jpg"));
        assert_eq!(video, None);
    }
}
