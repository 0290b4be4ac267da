//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │        busy/locked ⇒ Conflict (retried by the engine)          │
//! │       ▼                                                                 │
//! │  API collaborator maps to its status codes:                            │
//! │       NotFound / Domain(validation, funds) → 4xx                       │
//! │       Conflict (after retries) / everything else → 5xx                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use maskmart_core::CoreError;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and caller feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - User, pharmacy, or mask id doesn't exist
    /// - A mask exists but belongs to a different pharmacy than stated
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Domain rule violation surfaced by maskmart-core.
    ///
    /// Covers line-item validation failures and the funds gate. These are
    /// caller errors and definitive: no retry will change the outcome.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// A concurrent writer invalidated this attempt.
    ///
    /// ## When This Occurs
    /// - SQLite reports `database is locked` / busy while upgrading the
    ///   purchase transaction to a write
    ///
    /// The purchase engine retries these transparently a bounded number of
    /// times before surfacing them.
    #[error("concurrent modification: {0}")]
    Conflict(String),

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error. Callers must assume full rollback and no
    /// partial effect.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True for definitive caller errors that must not be retried.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, DbError::NotFound { .. } | DbError::Domain(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound       → DbError::NotFound
/// sqlx::Error::Database (locked) → DbError::Conflict
/// sqlx::Error::Database (FK)     → DbError::ForeignKeyViolation
/// sqlx::Error::PoolTimedOut      → DbError::PoolExhausted
/// Other                          → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports writer contention as SQLITE_BUSY /
                // SQLITE_LOCKED with a "database is locked" style message.
                if msg.contains("database is locked") || msg.contains("database table is locked") {
                    DbError::Conflict(msg.to_string())
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use maskmart_core::ValidationError;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Pharmacy", 42);
        assert_eq!(err.to_string(), "Pharmacy not found: 42");
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_domain_errors_pass_through() {
        let core: CoreError = ValidationError::NegativeAmount { amount: -1.0 }.into();
        let err: DbError = core.into();
        assert!(err.is_caller_error());
        // transparent: the core message is the db message
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_conflict_is_not_a_caller_error() {
        let err = DbError::Conflict("database is locked".to_string());
        assert!(!err.is_caller_error());
    }
}
