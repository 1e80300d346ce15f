//! Profile repository for database operations.
//!
//! Profiles back both password and Google sign-in. Queries use the
//! runtime-checked sqlx API with private row types converted into domain
//! types via `TryFrom`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pet_haven_core::{Email, Profile, ProfileId, ProfileRole};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` profile queries.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    name: String,
    role: ProfileRole,
    is_approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: ProfileId::new(row.id),
            email,
            name: row.name,
            role: row.role,
            is_approved: row.is_approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row type for credential lookups (profile plus password hash).
#[derive(Debug, sqlx::FromRow)]
struct ProfileAuthRow {
    id: Uuid,
    email: String,
    name: String,
    role: ProfileRole,
    is_approved: bool,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const PROFILE_COLUMNS: &str = "id, email, name, role, is_approved, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a profile by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a profile by its email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a profile together with its password hash, by email.
    ///
    /// Returns `None` when no profile exists for the email or the profile has
    /// no password credential (OAuth-only account).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Profile, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileAuthRow>(
            "SELECT id, email, name, role, is_approved, password_hash, created_at, updated_at
             FROM profiles WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let Some(hash) = row.password_hash.clone() else {
            return Ok(None);
        };

        let profile = ProfileRow {
            id: row.id,
            email: row.email,
            name: row.name,
            role: row.role,
            is_approved: row.is_approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
        .try_into()?;

        Ok(Some((profile, hash)))
    }

    /// Create a profile with a password credential.
    ///
    /// New signups start as `role = user, is_approved = false` and must be
    /// approved by an existing admin before they can sign in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "INSERT INTO profiles (email, name, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Find or create the profile for a Google subject.
    ///
    /// First OAuth sign-in creates the row with `role = user,
    /// is_approved = false`. The upsert is tolerant of concurrent first
    /// sign-ins: a duplicate-key insert is treated as "already created" and
    /// the existing row is re-read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the queries fail.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn upsert_google(
        &self,
        google_sub: &str,
        email: &Email,
        name: &str,
    ) -> Result<Profile, RepositoryError> {
        // Fast path: subject already linked.
        let existing = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE google_sub = $1"
        ))
        .bind(google_sub)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = existing {
            return row.try_into();
        }

        // Link an existing password account with the same email.
        let linked = sqlx::query_as::<_, ProfileRow>(&format!(
            "UPDATE profiles SET google_sub = $1
             WHERE email = $2 AND google_sub IS NULL
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(google_sub)
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = linked {
            return row.try_into();
        }

        // First sign-in: create the pending profile. A concurrent creation
        // loses the race here; re-read instead of failing.
        let inserted = sqlx::query_as::<_, ProfileRow>(&format!(
            "INSERT INTO profiles (email, name, google_sub)
             VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(name)
        .bind(google_sub)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return row.try_into();
        }

        let reread = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE google_sub = $1 OR email = $2"
        ))
        .bind(google_sub)
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        reread
            .ok_or(RepositoryError::NotFound)
            .and_then(TryInto::try_into)
    }

    /// Update a profile's approval flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_approved(
        &self,
        id: ProfileId,
        is_approved: bool,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "UPDATE profiles SET is_approved = $1 WHERE id = $2 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(is_approved)
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Update a profile's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_role(
        &self,
        id: ProfileId,
        role: ProfileRole,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "UPDATE profiles SET role = $1 WHERE id = $2 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(role)
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a profile by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProfileId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
