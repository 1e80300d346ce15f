//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health              - Liveness check
//! GET  /health/ready        - Readiness check (verifies database)
//!
//! # Catalog
//! GET  /pets                - Visible listings with filter/sort parameters
//! GET  /pets/{id}           - Listing detail with share links (404 when hidden/unknown)
//! GET  /pets/{id}/qr.png    - Scannable code for the detail URL (downloadable PNG)
//! ```

pub mod pets;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pets::index))
        .route("/{id}", get(pets::show))
        .route("/{id}/qr.png", get(pets::qr))
}

/// Compose the full application router.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/pets", pet_routes())
}
