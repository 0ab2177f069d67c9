/// Errors surfaced by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("migration v{version:03} failed: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("schema version mismatch: applied v{applied}, expected v{expected}")]
    SchemaVersionMismatch { applied: u32, expected: u32 },

    #[error("connection pool exhausted")]
    ConnectionUnavailable,

    #[error("row not found: {what}")]
    NotFound { what: String },
}
