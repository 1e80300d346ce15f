//! Catalog route handlers.

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use pet_haven_core::PetId;

use crate::catalog::{self, CatalogFilter, SortOrder};
use crate::error::{AppError, Result};
use crate::share;
use crate::state::AppState;

/// Query parameters for the listing page.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Comma-separated breed selection.
    pub breeds: Option<String>,
    /// Sort order; defaults to newest-first.
    pub sort: Option<SortOrder>,
}

impl ListQuery {
    /// Convert the raw query into the pipeline's filter.
    fn to_filter(&self, full_bound: Decimal) -> CatalogFilter {
        let price_range = match (self.min_price, self.max_price) {
            (None, None) => None,
            (min, max) => Some((min.unwrap_or(Decimal::ZERO), max.unwrap_or(full_bound))),
        };

        let breeds: BTreeSet<String> = self
            .breeds
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|breed| !breed.is_empty())
            .map(str::to_owned)
            .collect();

        CatalogFilter {
            price_range,
            breeds,
        }
    }
}

/// Browse visible listings with filters and sort order.
///
/// The response carries the derived category hierarchy and the full price
/// bound so clients can build their filter controls from live inventory.
///
/// # Route
///
/// `GET /pets`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let inventory = state.catalog().visible_pets(state.pool()).await?;

    let price_bound = catalog::price_ceiling(&inventory);
    let filter = query.to_filter(price_bound);
    let sort = query.sort.unwrap_or_default();
    let pets = catalog::apply(&inventory, &filter, sort);

    Ok(Json(json!({
        "pets": pets,
        "categories": catalog::categories(&inventory),
        "price_ceiling": price_bound,
        "sort": sort,
    }))
    .into_response())
}

/// Listing detail with share links.
///
/// An unknown or hidden listing renders a distinct not-found state rather
/// than an error.
///
/// # Route
///
/// `GET /pets/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<PetId>,
) -> Result<Response> {
    let pet = crate::db::PetRepository::new(state.pool())
        .get_visible_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("pet not found".to_string()))?;

    let detail_url = share::detail_url(&state.config().base_url, pet.id);
    let whatsapp_url = state
        .config()
        .whatsapp_number
        .as_deref()
        .map(|number| share::whatsapp_link(number, &pet, &detail_url));

    Ok(Json(json!({
        "pet": pet,
        "share": {
            "detail_url": detail_url,
            "whatsapp_url": whatsapp_url,
            "qr_url": format!("{detail_url}/qr.png"),
        },
    }))
    .into_response())
}

/// Scannable code for a listing's detail URL, as a downloadable PNG.
///
/// # Route
///
/// `GET /pets/{id}/qr.png`
pub async fn qr(State(state): State<AppState>, Path(id): Path<PetId>) -> Result<Response> {
    // Only resolvable listings get a code.
    let pet = crate::db::PetRepository::new(state.pool())
        .get_visible_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("pet not found".to_string()))?;

    let detail_url = share::detail_url(&state.config().base_url, pet.id);
    let png = share::qr_png(&detail_url)
        .map_err(|e| AppError::Internal(format!("qr rendering failed: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"pet-{id}-qr.png\""),
            ),
        ],
        png,
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_to_filter_parses_breed_list() {
        let query = ListQuery {
            breeds: Some("Beagle, Terrier,,".to_owned()),
            ..ListQuery::default()
        };
        let filter = query.to_filter(Decimal::new(500, 0));
        assert_eq!(filter.breeds.len(), 2);
        assert!(filter.breeds.contains("Beagle"));
        assert!(filter.breeds.contains("Terrier"));
        assert!(filter.price_range.is_none());
    }

    #[test]
    fn test_query_half_open_range_fills_missing_bound() {
        let query = ListQuery {
            min_price: Some(Decimal::new(20, 0)),
            ..ListQuery::default()
        };
        let filter = query.to_filter(Decimal::new(500, 0));
        assert_eq!(
            filter.price_range,
            Some((Decimal::new(20, 0), Decimal::new(500, 0)))
        );
    }
}
