#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("layer name must not be empty")]
    EmptyLayer,

    #[error("timestamp {0} is not a valid epoch millisecond value")]
    InvalidEpochMillis(i64),
}
