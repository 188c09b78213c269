//! Store error types.

use thiserror::Error;

/// Errors surfaced by the repository.
///
/// Every error bubbles to the caller; nothing is retried or downgraded to a
/// warning. The only non-error empty results are deleting a phone row that
/// does not exist and a search with no matches.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("No schema {0} in the database")]
    SchemaNotFound(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Query error: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".into()),
            sqlx::Error::Database(db_err) => {
                // 23503: foreign_key_violation
                if db_err.code().as_deref() == Some("23503") {
                    StoreError::ForeignKey(db_err.to_string())
                } else {
                    StoreError::Query(sqlx::Error::Database(db_err))
                }
            }
            other => StoreError::Query(other),
        }
    }
}
