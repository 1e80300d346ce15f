//! Account management route handlers.
//!
//! Approve/reject signups, change roles, and delete accounts. Privileged
//! operations re-verify the caller against the database instead of trusting
//! the session snapshot, and a caller can never delete or demote their own
//! authenticated account.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use pet_haven_core::{Profile, ProfileId, ProfileRole};

use crate::db::{ProfileRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Role-change payload.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: ProfileRole,
}

/// List all accounts, newest first.
///
/// # Route
///
/// `GET /users`
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Response> {
    let profiles = ProfileRepository::new(state.pool()).list_all().await?;
    Ok(Json(json!({ "users": profiles })).into_response())
}

/// Approve a pending signup.
///
/// # Route
///
/// `POST /users/{id}/approve`
pub async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProfileId>,
) -> Result<Response> {
    require_effective_admin(&state, &admin).await?;

    let profile = ProfileRepository::new(state.pool())
        .set_approved(id, true)
        .await
        .map_err(user_not_found)?;

    tracing::info!(target_id = %id, admin_id = %admin.id, "account approved");
    Ok(Json(json!({ "success": true, "user": profile })).into_response())
}

/// Revoke approval from an account.
///
/// # Route
///
/// `POST /users/{id}/reject`
pub async fn reject(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProfileId>,
) -> Result<Response> {
    require_effective_admin(&state, &admin).await?;
    forbid_self_action(&admin, id, "reject")?;

    let profile = ProfileRepository::new(state.pool())
        .set_approved(id, false)
        .await
        .map_err(user_not_found)?;

    tracing::info!(target_id = %id, admin_id = %admin.id, "account approval revoked");
    Ok(Json(json!({ "success": true, "user": profile })).into_response())
}

/// Change an account's role.
///
/// # Route
///
/// `POST /users/{id}/role`
pub async fn change_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProfileId>,
    Json(request): Json<RoleRequest>,
) -> Result<Response> {
    require_effective_admin(&state, &admin).await?;

    // Demoting yourself would lock you out of the surface you're using.
    if request.role != ProfileRole::Admin {
        forbid_self_action(&admin, id, "demote")?;
    }

    let profile = ProfileRepository::new(state.pool())
        .set_role(id, request.role)
        .await
        .map_err(user_not_found)?;

    tracing::info!(
        target_id = %id,
        admin_id = %admin.id,
        role = %request.role,
        "account role changed"
    );
    Ok(Json(json!({ "success": true, "user": profile })).into_response())
}

/// Delete an account.
///
/// Requires an authenticated, approved admin; self-deletion is rejected.
/// Responds `{"success":true}` or `{"error":"..."}`.
///
/// # Route
///
/// `DELETE /users/{id}`
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProfileId>,
) -> Result<Response> {
    require_effective_admin(&state, &admin).await?;
    forbid_self_action(&admin, id, "delete")?;

    ProfileRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(user_not_found)?;

    tracing::info!(target_id = %id, admin_id = %admin.id, "account deleted");
    Ok(Json(json!({ "success": true })).into_response())
}

/// Re-verify the caller against the database before a privileged action.
///
/// The session snapshot may be stale: an admin whose approval was revoked
/// mid-session must lose access immediately, not at next login.
async fn require_effective_admin(state: &AppState, admin: &CurrentAdmin) -> Result<Profile> {
    let profile = ProfileRepository::new(state.pool())
        .get_by_id(admin.id)
        .await?
        .ok_or_else(|| AppError::Forbidden(format!("caller profile {} no longer exists", admin.id)))?;

    if !profile.is_effective_admin() {
        return Err(AppError::Forbidden(format!(
            "caller {} is not an approved admin",
            admin.id
        )));
    }

    Ok(profile)
}

/// Reject operations an admin attempts against their own account.
fn forbid_self_action(admin: &CurrentAdmin, target: ProfileId, action: &str) -> Result<()> {
    if admin.id == target {
        return Err(AppError::BadRequest(format!(
            "you cannot {action} your own account"
        )));
    }
    Ok(())
}

fn user_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("user not found".to_string()),
        other => AppError::Database(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pet_haven_core::Email;

    fn current_admin(id: ProfileId) -> CurrentAdmin {
        CurrentAdmin {
            id,
            email: Email::parse("admin@example.com").unwrap(),
            name: "Admin".to_owned(),
            role: ProfileRole::Admin,
        }
    }

    #[test]
    fn test_self_action_is_rejected() {
        let id = ProfileId::generate();
        let admin = current_admin(id);
        assert!(forbid_self_action(&admin, id, "delete").is_err());
    }

    #[test]
    fn test_action_on_other_account_is_allowed() {
        let admin = current_admin(ProfileId::generate());
        assert!(forbid_self_action(&admin, ProfileId::generate(), "delete").is_ok());
    }
}
