//! Authentication middleware and extractors.
//!
//! Provides the extractor that requires an authenticated, approved admin in
//! route handlers. The extractor runs the idle staleness check before
//! trusting a restored session, so a session idle past the threshold is
//! invalidated on first contact instead of silently resumed.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};
use crate::services::idle::{IdleTimeout, activity_write_due};

/// Extractor that requires admin authentication.
///
/// Returns 401 Unauthorized when no valid session exists or the session has
/// been idle past the threshold.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Error returned when admin authentication is required but missing.
pub enum AdminAuthRejection {
    /// No authenticated session.
    Unauthorized,
    /// Session existed but had been idle past the threshold; it has been
    /// invalidated.
    SessionExpired,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Unauthorized => "Authentication required",
            Self::SessionExpired => "Session expired due to inactivity, please sign in again",
        };
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        // Get the current admin from the session
        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        // Staleness check before the restored session is trusted.
        let now = Utc::now();
        let last_activity: Option<DateTime<Utc>> = session
            .get(session_keys::LAST_ACTIVITY)
            .await
            .ok()
            .flatten();

        if let Some(last_activity) = last_activity
            && IdleTimeout::default().is_expired(last_activity, now)
        {
            tracing::info!(admin_id = %admin.id, "idle session invalidated");
            let _ = session.flush().await;
            return Err(AdminAuthRejection::SessionExpired);
        }

        // Record activity, throttled to bound write volume.
        if activity_write_due(last_activity, now) {
            let _ = session.insert(session_keys::LAST_ACTIVITY, now).await;
        }

        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session after a successful login.
///
/// Also stamps the activity timestamp the idle check runs against.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await?;
    session
        .insert(session_keys::LAST_ACTIVITY, Utc::now())
        .await
}

/// Helper to clear the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
