//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use pet_haven_core::{Email, Profile, ProfileId, ProfileRole};

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's profile ID.
    pub id: ProfileId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
    /// Admin's role at login time; privileged actions re-verify against the
    /// database.
    pub role: ProfileRole,
}

impl From<&Profile> for CurrentAdmin {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            name: profile.name.clone(),
            role: profile.role,
        }
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the last persisted activity timestamp (idle expiry).
    pub const LAST_ACTIVITY: &str = "last_activity";

    /// Key for Google OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for the post-login destination.
    pub const RETURN_TO: &str = "return_to";
}
