//! HTTP route handlers for the admin service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (verifies database)
//!
//! # Auth
//! POST /auth/signup                 - Password signup (account starts pending)
//! POST /auth/login                  - Password login (approval gate)
//! POST /auth/logout                 - Destroy session
//! GET  /auth/google                 - Redirect to Google OAuth
//! GET  /auth/google/callback        - Handle OAuth callback
//!
//! # Inventory (requires approved admin)
//! GET    /pets                      - List inventory
//! POST   /pets                      - Create listing (multipart)
//! GET    /pets/{id}                 - Listing detail
//! PATCH  /pets/{id}                 - Partial update (multipart)
//! POST   /pets/{id}/toggle-stock    - Flip stock flag
//! POST   /pets/{id}/toggle-visibility - Flip visibility flag
//! DELETE /pets/{id}                 - Delete listing
//!
//! # Accounts (requires approved admin)
//! GET    /users                     - List accounts
//! POST   /users/{id}/approve        - Approve signup
//! POST   /users/{id}/reject         - Revoke approval
//! POST   /users/{id}/role           - Change role
//! DELETE /users/{id}                - Delete account (never your own)
//! ```

pub mod auth;
pub mod pets;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Largest accepted request body; must fit a full video upload batch.
const MAX_UPLOAD_BODY_BYTES: usize = 120 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/google", get(auth::google_login))
        .route("/google/callback", get(auth::google_callback))
}

/// Create the inventory routes router.
pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pets::list).post(pets::create))
        .route("/{id}", get(pets::get).patch(pets::update).delete(pets::delete))
        .route("/{id}/toggle-stock", post(pets::toggle_stock))
        .route("/{id}/toggle-visibility", post(pets::toggle_visibility))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
}

/// Create the account management routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/{id}", delete(users::delete))
        .route("/{id}/approve", post(users::approve))
        .route("/{id}/reject", post(users::reject))
        .route("/{id}/role", post(users::change_role))
}

/// Compose the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/pets", pet_routes())
        .nest("/users", user_routes())
}
