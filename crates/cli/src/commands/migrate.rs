//! Database migration command.
//!
//! Runs the embedded migrations from `crates/admin/migrations/` against the
//! database named by `ADMIN_DATABASE_URL` (or `DATABASE_URL`). Both services
//! share this database; the storefront only reads from it.

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the connection or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
