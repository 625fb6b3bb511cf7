pub mod error;
pub mod repository;

pub use error::{Result, StorageError};
pub use repository::SqliteCourseContentRepository;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;

/// Opens the course content database read-only. The course content database
/// is treated as an external, already-populated source (spec §1 Non-goals);
/// this crate never writes to it.
pub async fn open_content_db_readonly(db_path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_path)?
        .create_if_missing(false)
        .read_only(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;
    tracing::info!(db_path, "course content database opened read-only");
    Ok(pool)
}

/// Creates (or opens) a course content database and runs its migrations.
/// Used by the CLI's offline script-generation tooling and by tests to
/// build fixture databases; never used against a live course database.
pub async fn init_content_db(db_path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_path)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(db_path, "course content database initialized");
    Ok(pool)
}
