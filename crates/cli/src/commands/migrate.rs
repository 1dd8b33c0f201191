//! Database migration command.
//!
//! Applies `crates/admin/migrations/` in order. Already-applied migrations
//! are skipped, so running it twice is harmless.

use super::{CommandError, connect};

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
