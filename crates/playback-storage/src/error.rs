use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognised value '{value}' for column '{column}'")]
    InvalidEnumValue { column: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;
