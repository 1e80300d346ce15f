//! Integration tests for Pet Haven.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p pet-haven-cli -- migrate
//!
//! # Start both services, then run the ignored tests
//! cargo test -p pet-haven-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_catalog` - Public catalog API tests
//! - `admin_auth` - Approval-gated authentication tests
//! - `admin_users` - Account management tests (delete-user status codes)

use reqwest::Client;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Create an HTTP client with a cookie store, so a login carries over to
/// subsequent requests.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client_with_cookies() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
