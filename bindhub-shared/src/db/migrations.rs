/// Database migration runner
///
/// Migrations live in this crate's `migrations/` directory and are embedded
/// into the binary at build time, so deployments never need the files on
/// disk. Each migration is applied at most once, tracked by sqlx's
/// `_sqlx_migrations` table.
use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations
///
/// Safe to call on every startup; already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
