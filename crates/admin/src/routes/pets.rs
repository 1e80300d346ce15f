//! Inventory route handlers.
//!
//! Create and update accept multipart forms: text fields for the listing
//! plus repeatable `images`/`videos` file fields and (on update) repeatable
//! `existing_images`/`existing_videos` URL fields in the order the client
//! wants preserved — the first image is the cover. New files are staged,
//! validated individually, and uploaded before the listing row is written;
//! a failed upload aborts the save and the form stays retryable.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

use pet_haven_core::{ColorVariant, PetId, PriceType, Species};

use crate::db::{NewPet, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::inventory::PetChanges;
use crate::services::media::{MediaStaging, RejectedFile};
use crate::state::AppState;
use crate::storage::MediaKind;

/// List the full inventory, newest first.
///
/// # Route
///
/// `GET /pets`
pub async fn list(RequireAdmin(_admin): RequireAdmin, State(state): State<AppState>) -> Result<Response> {
    let pets = state.inventory().list().await?;

    Ok(Json(json!({
        "pets": pets,
        "loading": state.inventory().is_loading(),
    }))
    .into_response())
}

/// Get one listing; a missing id is a distinct 404 state.
///
/// # Route
///
/// `GET /pets/{id}`
pub async fn get(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PetId>,
) -> Result<Response> {
    let Some(pet) = state.inventory().get(id).await? else {
        return Err(AppError::NotFound("pet not found".to_string()));
    };

    Ok(Json(json!({ "pet": pet })).into_response())
}

/// Create a listing from a multipart form.
///
/// # Route
///
/// `POST /pets`
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let form = ListingForm::parse(multipart).await?;

    let species = parse_species(form.species.as_deref().unwrap_or_default())?;
    let breed = require_text("breed", form.breed.as_deref())?;
    let age = require_text("age", form.age.as_deref())?;
    let description = require_text("description", form.description.as_deref())?;
    let price = parse_price(form.price.as_deref().unwrap_or_default())?;
    let price_type = parse_price_type(form.price_type.as_deref())?;
    let color_variants = parse_color_variants(form.color_variants.as_deref())?;

    // All pending uploads must succeed before the listing row is written.
    let images = form.image_staging.upload_pending(state.storage()).await?;
    let videos = form.video_staging.upload_pending(state.storage()).await?;

    let pet = state
        .inventory()
        .add(NewPet {
            species,
            breed,
            age,
            price,
            price_type,
            images,
            videos,
            description,
            color_variants,
            in_stock: form.in_stock.unwrap_or(true),
            is_visible: form.is_visible.unwrap_or(true),
            featured: form.featured.unwrap_or(false),
            created_by: Some(admin.id),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "pet": pet,
            "rejected_files": rejected_json(&form.rejected),
        })),
    )
        .into_response())
}

/// Merge partial changes into a listing from a multipart form.
///
/// Media fields are only touched when the form carries them: the client
/// sends `existing_images` URLs in the order to keep (cover first) and any
/// new files; omitting every media field leaves media unchanged.
///
/// # Route
///
/// `PATCH /pets/{id}`
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PetId>,
    multipart: Multipart,
) -> Result<Response> {
    let form = ListingForm::parse(multipart).await?;

    let mut changes = PetChanges {
        species: form
            .species
            .as_deref()
            .map(parse_species)
            .transpose()?,
        breed: validate_optional_text("breed", form.breed)?,
        age: validate_optional_text("age", form.age)?,
        price: form.price.as_deref().map(parse_price).transpose()?,
        price_type: form
            .price_type
            .is_some()
            .then(|| parse_price_type(form.price_type.as_deref()))
            .transpose()?,
        description: validate_optional_text("description", form.description)?,
        color_variants: form
            .color_variants
            .is_some()
            .then(|| parse_color_variants(form.color_variants.as_deref()))
            .transpose()?,
        in_stock: form.in_stock,
        is_visible: form.is_visible,
        featured: form.featured,
        ..PetChanges::default()
    };

    if form.images_touched {
        changes.images = Some(form.image_staging.upload_pending(state.storage()).await?);
    }
    if form.videos_touched {
        changes.videos = Some(form.video_staging.upload_pending(state.storage()).await?);
    }

    let pet = state
        .inventory()
        .update(id, changes)
        .await
        .map_err(pet_not_found)?;

    Ok(Json(json!({
        "success": true,
        "pet": pet,
        "rejected_files": rejected_json(&form.rejected),
    }))
    .into_response())
}

/// Flip the stock flag.
///
/// # Route
///
/// `POST /pets/{id}/toggle-stock`
pub async fn toggle_stock(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PetId>,
) -> Result<Response> {
    let pet = state
        .inventory()
        .toggle_stock(id)
        .await
        .map_err(pet_not_found)?;

    Ok(Json(json!({ "success": true, "pet": pet })).into_response())
}

/// Flip the visibility flag.
///
/// # Route
///
/// `POST /pets/{id}/toggle-visibility`
pub async fn toggle_visibility(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PetId>,
) -> Result<Response> {
    let pet = state
        .inventory()
        .toggle_visibility(id)
        .await
        .map_err(pet_not_found)?;

    Ok(Json(json!({ "success": true, "pet": pet })).into_response())
}

/// Delete a listing. Idempotent against "already deleted".
///
/// # Route
///
/// `DELETE /pets/{id}`
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PetId>,
) -> Result<Response> {
    state.inventory().delete(id).await?;
    tracing::info!(%id, admin_id = %admin.id, "listing deleted");

    Ok(Json(json!({ "success": true })).into_response())
}

/// Map a missing listing to the 404 state; everything else stays a
/// repository error.
fn pet_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("pet not found".to_string()),
        other => AppError::Database(other),
    }
}

fn rejected_json(rejected: &[RejectedFile]) -> serde_json::Value {
    json!(
        rejected
            .iter()
            .map(|r| json!({ "filename": r.filename, "reason": r.reason.to_string() }))
            .collect::<Vec<_>>()
    )
}

// =============================================================================
// Multipart Form
// =============================================================================

/// Raw listing form as read from the multipart stream.
struct ListingForm {
    species: Option<String>,
    breed: Option<String>,
    age: Option<String>,
    price: Option<String>,
    price_type: Option<String>,
    description: Option<String>,
    color_variants: Option<String>,
    in_stock: Option<bool>,
    is_visible: Option<bool>,
    featured: Option<bool>,
    images_touched: bool,
    videos_touched: bool,
    image_staging: MediaStaging,
    video_staging: MediaStaging,
    rejected: Vec<RejectedFile>,
}

impl ListingForm {
    async fn parse(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self {
            species: None,
            breed: None,
            age: None,
            price: None,
            price_type: None,
            description: None,
            color_variants: None,
            in_stock: None,
            is_visible: None,
            featured: None,
            images_touched: false,
            videos_touched: false,
            image_staging: MediaStaging::new(MediaKind::Image),
            video_staging: MediaStaging::new(MediaKind::Video),
            rejected: Vec::new(),
        };
        let mut existing_images: Vec<String> = Vec::new();
        let mut existing_videos: Vec<String> = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "images" | "videos" => {
                    let filename = field.file_name().unwrap_or("upload").to_owned();
                    let content_type = field.content_type().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("failed to read file field: {e}"))
                    })?;

                    let file = crate::services::media::PendingFile {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    };

                    let staging = if name == "images" {
                        form.images_touched = true;
                        &mut form.image_staging
                    } else {
                        form.videos_touched = true;
                        &mut form.video_staging
                    };
                    form.rejected.extend(staging.add_files(vec![file]));
                }
                "existing_images" => {
                    form.images_touched = true;
                    let value = read_text(field).await?;
                    if !value.is_empty() {
                        existing_images.push(value);
                    }
                }
                "existing_videos" => {
                    form.videos_touched = true;
                    let value = read_text(field).await?;
                    if !value.is_empty() {
                        existing_videos.push(value);
                    }
                }
                "species" => form.species = Some(read_text(field).await?),
                "breed" => form.breed = Some(read_text(field).await?),
                "age" => form.age = Some(read_text(field).await?),
                "price" => form.price = Some(read_text(field).await?),
                "price_type" => form.price_type = Some(read_text(field).await?),
                "description" => form.description = Some(read_text(field).await?),
                "color_variants" => form.color_variants = Some(read_text(field).await?),
                "in_stock" => form.in_stock = Some(parse_bool(&read_text(field).await?)?),
                "is_visible" => form.is_visible = Some(parse_bool(&read_text(field).await?)?),
                "featured" => form.featured = Some(parse_bool(&read_text(field).await?)?),
                other => {
                    tracing::debug!(field = other, "ignoring unknown form field");
                }
            }
        }

        // Existing URLs come first, in client order (cover first); freshly
        // staged files follow. Staging preserves this order through upload.
        if !existing_images.is_empty() {
            let mut staging = MediaStaging::from_existing(MediaKind::Image, existing_images, 1);
            for item in form.image_staging.items() {
                if let crate::services::media::StagedItem::Pending(file) = item {
                    staging.add_files(vec![file.clone()]);
                }
            }
            form.image_staging = staging;
        }
        if !existing_videos.is_empty() {
            let mut staging = MediaStaging::from_existing(MediaKind::Video, existing_videos, 1);
            for item in form.video_staging.items() {
                if let crate::services::media::StagedItem::Pending(file) = item {
                    staging.add_files(vec![file.clone()]);
                }
            }
            form.video_staging = staging;
        }

        Ok(form)
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map(|s| s.trim().to_owned())
        .map_err(|e| AppError::BadRequest(format!("failed to read form field: {e}")))
}

// =============================================================================
// Form Validation
// =============================================================================

fn require_text(field: &str, value: Option<&str>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(AppError::Validation(format!("{field} must not be empty"))),
    }
}

fn validate_optional_text(field: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.is_empty() => Err(AppError::Validation(format!("{field} must not be empty"))),
        Some(v) => Ok(Some(v)),
    }
}

fn parse_species(raw: &str) -> Result<Species> {
    if raw.is_empty() {
        return Err(AppError::Validation("species must not be empty".to_string()));
    }
    Species::from_str(raw).map_err(AppError::Validation)
}

fn parse_price(raw: &str) -> Result<Decimal> {
    let price = Decimal::from_str(raw)
        .map_err(|_| AppError::Validation("price must be a number".to_string()))?;
    if price <= Decimal::ZERO {
        return Err(AppError::Validation(
            "price must be greater than zero".to_string(),
        ));
    }
    Ok(price)
}

fn parse_price_type(raw: Option<&str>) -> Result<PriceType> {
    match raw.unwrap_or("each") {
        "each" => Ok(PriceType::Each),
        "pair" => Ok(PriceType::Pair),
        other => Err(AppError::Validation(format!("invalid price type: {other}"))),
    }
}

fn parse_color_variants(raw: Option<&str>) -> Result<Vec<ColorVariant>> {
    match raw {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| AppError::Validation(format!("invalid color variants: {e}"))),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" | "" => Ok(false),
        other => Err(AppError::BadRequest(format!("invalid boolean: {other}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_must_be_positive_number() {
        assert!(parse_price("249.99").is_ok());
        assert!(matches!(parse_price("0"), Err(AppError::Validation(_))));
        assert!(matches!(parse_price("-3"), Err(AppError::Validation(_))));
        assert!(matches!(
            parse_price("not-a-number"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_species_constrained_to_known_set() {
        assert_eq!(parse_species("rabbit").unwrap(), Species::Rabbit);
        assert_eq!(parse_species("other").unwrap(), Species::Other);
        assert!(parse_species("").is_err());
        assert!(parse_species("unicorn").is_err());
    }

    #[test]
    fn test_required_text_rejects_empty() {
        assert!(require_text("breed", Some("Beagle")).is_ok());
        assert!(require_text("breed", Some("")).is_err());
        assert!(require_text("breed", None).is_err());
    }

    #[test]
    fn test_optional_text_passes_through_absence() {
        assert_eq!(validate_optional_text("age", None).unwrap(), None);
        assert!(validate_optional_text("age", Some(String::new())).is_err());
    }

    #[test]
    fn test_price_type_defaults_to_each() {
        assert_eq!(parse_price_type(None).unwrap(), PriceType::Each);
        assert_eq!(parse_price_type(Some("pair")).unwrap(), PriceType::Pair);
        assert!(parse_price_type(Some("dozen")).is_err());
    }

    #[test]
    fn test_color_variants_parse() {
        let json = r##"[{"color_name":"Golden","color_hex":"#d4a017","images":[],"videos":[]}]"##;
        let variants = parse_color_variants(Some(json)).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].color_name, "Golden");
        assert!(parse_color_variants(Some("not json")).is_err());
        assert!(parse_color_variants(None).unwrap().is_empty());
    }
}
