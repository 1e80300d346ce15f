//! Authentication service.
//!
//! Provides password signup/login and the approval gate that every sign-in
//! path goes through. The gate is fail-closed: a profile that is not an
//! approved admin never yields an authenticated session, and repeated
//! attempts behave identically.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use pet_haven_core::{Email, Profile};

use crate::db::RepositoryError;
use crate::db::profiles::ProfileRepository;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Outcome of the approval gate for a freshly loaded profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Profile is an approved admin; a session may be established.
    Allow,
    /// Profile exists but is not an approved admin. The caller must make
    /// sure no session survives (sign out anything half-established) and
    /// surface a "pending approval" message.
    PendingApproval,
}

impl GateDecision {
    /// Decide access for a profile.
    ///
    /// An unapproved admin-role profile is treated identically to a
    /// non-admin profile.
    #[must_use]
    pub fn for_profile(profile: &Profile) -> Self {
        if profile.is_effective_admin() {
            Self::Allow
        } else {
            Self::PendingApproval
        }
    }
}

/// Authentication service.
///
/// Handles signup, password login, and the approval gate.
pub struct AuthService<'a> {
    profiles: ProfileRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool),
        }
    }

    /// Register a new account with email and password.
    ///
    /// The profile is created unapproved with the default role; it cannot
    /// sign in until an existing admin approves it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register_with_password(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Profile, AuthError> {
        // Validate email
        let email = Email::parse(email)?;

        // Validate password
        validate_password(password)?;

        // Hash password
        let password_hash = hash_password(password)?;

        let profile = self
            .profiles
            .create_with_password(&email, name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(profile)
    }

    /// Login with email and password.
    ///
    /// After credential verification the profile is re-read and the approval
    /// gate re-checked, so a stale cached profile can never bypass it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::PendingApproval` if the profile is not an approved
    /// admin; the caller must not establish a session.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Profile, AuthError> {
        // Validate email format
        let email = Email::parse(email)?;

        // Get profile with password hash
        let (profile, password_hash) = self
            .profiles
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Verify password
        verify_password(password, &password_hash)?;

        // Re-read the profile and re-check approval after verification.
        let profile = self
            .profiles
            .get_by_id(profile.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        match GateDecision::for_profile(&profile) {
            GateDecision::Allow => Ok(profile),
            GateDecision::PendingApproval => Err(AuthError::PendingApproval),
        }
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pet_haven_core::{ProfileId, ProfileRole};

    fn profile(role: ProfileRole, is_approved: bool) -> Profile {
        Profile {
            id: ProfileId::generate(),
            email: Email::parse("someone@example.com").unwrap(),
            name: "Someone".to_owned(),
            role,
            is_approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_gate_allows_only_approved_admins() {
        assert_eq!(
            GateDecision::for_profile(&profile(ProfileRole::Admin, true)),
            GateDecision::Allow
        );
        assert_eq!(
            GateDecision::for_profile(&profile(ProfileRole::Admin, false)),
            GateDecision::PendingApproval
        );
        assert_eq!(
            GateDecision::for_profile(&profile(ProfileRole::User, true)),
            GateDecision::PendingApproval
        );
    }

    #[test]
    fn test_gate_decision_is_stable_across_repeated_checks() {
        // Repeated attempts for the same unapproved profile must behave
        // identically.
        let p = profile(ProfileRole::Admin, false);
        for _ in 0..3 {
            assert_eq!(
                GateDecision::for_profile(&p),
                GateDecision::PendingApproval
            );
        }
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }
}
