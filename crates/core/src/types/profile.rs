//! Profile domain types.
//!
//! A profile is the account record behind every sign-in, whether it was
//! created by password signup or lazily on first OAuth login. Access to the
//! back-office is granted only to profiles that are *effectively admins*:
//! admin role **and** approved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, ProfileId};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "profile_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
    /// May manage inventory and accounts once approved.
    Admin,
    /// Default role for new signups; no back-office access.
    #[default]
    User,
}

impl std::fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for ProfileRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid profile role: {s}")),
        }
    }
}

/// An account profile (domain type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique profile ID (the authentication subject).
    pub id: ProfileId,
    /// Account email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: ProfileRole,
    /// Whether an existing admin has approved this account.
    pub is_approved: bool,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Whether this profile may use the back-office.
    ///
    /// An unapproved admin-role profile is treated identically to a
    /// non-admin for access purposes.
    #[must_use]
    pub fn is_effective_admin(&self) -> bool {
        self.role == ProfileRole::Admin && self.is_approved
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(role: ProfileRole, is_approved: bool) -> Profile {
        Profile {
            id: ProfileId::generate(),
            email: Email::parse("admin@example.com").unwrap(),
            name: "Test Admin".to_owned(),
            role,
            is_approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_admin_requires_role_and_approval() {
        assert!(profile(ProfileRole::Admin, true).is_effective_admin());
        assert!(!profile(ProfileRole::Admin, false).is_effective_admin());
        assert!(!profile(ProfileRole::User, true).is_effective_admin());
        assert!(!profile(ProfileRole::User, false).is_effective_admin());
    }

    #[test]
    fn test_role_display_from_str_roundtrip() {
        for role in [ProfileRole::Admin, ProfileRole::User] {
            let parsed: ProfileRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }
}
