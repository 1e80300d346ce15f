//! Admin account management commands.

use pet_haven_admin::db::ProfileRepository;
use pet_haven_core::{Email, ProfileRole};

use super::{CommandError, connect};

/// Create an approved admin account with a password credential.
///
/// # Errors
///
/// Returns `CommandError` if the email is invalid, already taken, or a
/// database operation fails.
pub async fn create(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let repo = ProfileRepository::new(&pool);

    let parsed = Email::parse(email)
        .map_err(|e| CommandError::Invalid(format!("invalid email: {e}")))?;

    let hash = pet_haven_admin::services::auth::hash_password(password)?;
    let profile = repo.create_with_password(&parsed, name, &hash).await?;

    // Bootstrap accounts skip the approval queue.
    repo.set_role(profile.id, ProfileRole::Admin).await?;
    let profile = repo.set_approved(profile.id, true).await?;

    tracing::info!(id = %profile.id, email = %profile.email, "admin account created and approved");
    Ok(())
}

/// Approve a pending signup by email.
///
/// # Errors
///
/// Returns `CommandError` if the account does not exist or a database
/// operation fails.
pub async fn approve(email: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let repo = ProfileRepository::new(&pool);

    let parsed = Email::parse(email)
        .map_err(|e| CommandError::Invalid(format!("invalid email: {e}")))?;

    let profile = repo
        .get_by_email(&parsed)
        .await?
        .ok_or_else(|| CommandError::Invalid(format!("no account for {email}")))?;

    let profile = repo.set_approved(profile.id, true).await?;

    tracing::info!(id = %profile.id, email = %profile.email, "account approved");
    Ok(())
}
