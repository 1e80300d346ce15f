//! Authentication route handlers.
//!
//! Password signup/login plus the Google OAuth authorization-code flow.
//! Every sign-in path ends at the approval gate: a profile that is not an
//! approved admin never gets a session (fail-closed), and is told its
//! account is pending approval instead.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::auth::{AuthService, GateDecision};
use crate::state::AppState;

/// Signup form payload.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

/// Login form payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
}

/// Optional post-login destination for the OAuth flow.
#[derive(Debug, Deserialize)]
pub struct LoginStartQuery {
    pub return_to: Option<String>,
}

/// Generate a cryptographically random string for OAuth state.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Register a new account with email and password.
///
/// The account starts unapproved; it cannot sign in until approved.
///
/// # Route
///
/// `POST /auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());
    let profile = service
        .register_with_password(&request.email, &request.name, &request.password)
        .await?;

    tracing::info!(profile_id = %profile.id, "new signup pending approval");

    Ok(Json(json!({
        "success": true,
        "status": "pending_approval",
    }))
    .into_response())
}

/// Login with email and password.
///
/// # Route
///
/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    let profile = match service
        .login_with_password(&request.email, &request.password)
        .await
    {
        Ok(profile) => profile,
        Err(err) => {
            // Fail-closed: make sure nothing half-established survives a
            // denied login, then surface the error.
            let _ = session.flush().await;
            return Err(err.into());
        }
    };

    let admin = CurrentAdmin::from(&profile);
    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;
    set_sentry_user(&admin.id, Some(admin.email.as_str()));

    Ok(Json(json!({
        "success": true,
        "profile": {
            "id": admin.id,
            "email": admin.email,
            "name": admin.name,
            "role": admin.role,
        },
    }))
    .into_response())
}

/// Logout and destroy the session.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(session: Session) -> Result<Response> {
    let _ = clear_current_admin(&session).await;
    clear_sentry_user();
    Ok(Json(json!({ "success": true })).into_response())
}

/// Initiate Google OAuth login.
///
/// Generates a CSRF state parameter, stores it in the session, and
/// redirects to Google's authorization page.
///
/// # Route
///
/// `GET /auth/google`
pub async fn google_login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginStartQuery>,
) -> Response {
    let oauth_state = generate_random_string(32);

    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    if let Some(return_to) = query.return_to.filter(|to| to.starts_with('/'))
        && let Err(e) = session.insert(session_keys::RETURN_TO, &return_to).await
    {
        tracing::error!("Failed to store return destination: {}", e);
    }

    let redirect_uri = format!("{}/auth/google/callback", state.config().base_url);
    let auth_url = state.google().authorization_url(&redirect_uri, &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Google OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code, then
/// resolves-or-creates the profile for the Google account. The approval
/// gate decides where the browser ends up: approved admins land on their
/// intended destination, everyone else is signed out and sent back to the
/// login screen with a pending-approval flag.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // Check for OAuth errors from Google
    if let Some(error) = query.error {
        tracing::warn!("Google OAuth error: {}", error);
        return Redirect::to("/auth/login?error=google_denied").into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return Redirect::to("/auth/login?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Google OAuth callback missing state");
        return Redirect::to("/auth/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Google OAuth state mismatch");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    // Exchange code and resolve the Google account
    let redirect_uri = format!("{}/auth/google/callback", state.config().base_url);
    let google_user = match state.google().exchange_code(&code, &redirect_uri).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to exchange Google OAuth code: {}", e);
            return Redirect::to("/auth/login?error=token_exchange").into_response();
        }
    };

    let email = match pet_haven_core::Email::parse(&google_user.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::error!("Google returned invalid email: {}", e);
            return Redirect::to("/auth/login?error=token_exchange").into_response();
        }
    };

    // Resolve or lazily create the profile (race-tolerant upsert).
    let profile = match crate::db::ProfileRepository::new(state.pool())
        .upsert_google(
            &google_user.sub,
            &email,
            google_user.name.as_deref().unwrap_or(""),
        )
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            // Fail-closed: a profile we cannot load is treated as no profile.
            tracing::error!("Failed to resolve profile for Google account: {}", e);
            let _ = session.flush().await;
            return Redirect::to("/auth/login?error=profile").into_response();
        }
    };

    match GateDecision::for_profile(&profile) {
        GateDecision::Allow => {}
        GateDecision::PendingApproval => {
            // A valid token without approval must never be treated as
            // authenticated; destroy the session outright.
            tracing::info!(profile_id = %profile.id, "unapproved sign-in rejected");
            let _ = session.flush().await;
            return Redirect::to("/auth/login?error=pending_approval").into_response();
        }
    }

    let return_to: Option<String> = session
        .get(session_keys::RETURN_TO)
        .await
        .ok()
        .flatten();
    let _ = session.remove::<String>(session_keys::RETURN_TO).await;

    let admin = CurrentAdmin::from(&profile);
    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!("Failed to store session after OAuth login: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }
    set_sentry_user(&admin.id, Some(admin.email.as_str()));

    tracing::info!(profile_id = %profile.id, "admin authenticated via Google");

    Redirect::to(return_to.as_deref().unwrap_or("/")).into_response()
}
