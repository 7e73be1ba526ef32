use tracing::info;

use crate::db::pool::DbPool;

/// The canonical schema definition. Also the source the natural-language
/// query prompt derives its table descriptions from.
pub const DB_SCHEMA: &str = include_str!("schema.sql");

/// Applies the schema to the database. Every statement uses
/// `IF NOT EXISTS`, so running this on every startup is safe.
pub fn run(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Starting database migrations");

    let conn = pool.get()?;
    conn.execute_batch(DB_SCHEMA)?;

    info!("Database migrations completed successfully");
    Ok(())
}
