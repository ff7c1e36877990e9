//! Store Errors

/// Errors raised by the persistence layer
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A record with the same key already exists
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// A row could not be mapped back to a domain value
    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// Status updates only move records out of Pending
    #[error("Refusing to move transaction {0} back to Pending")]
    NonTerminalUpdate(String),

    /// Failed records must say why
    #[error("Transaction {0} marked Failed without a reason")]
    MissingFailureReason(String),
}

impl StoreError {
    pub fn corrupt(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::CorruptRecord {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Map unique violations onto [`StoreError::Duplicate`]
    pub(crate) fn from_insert(err: sqlx::Error, key: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                Self::Duplicate(key.to_string())
            }
            _ => Self::Database(err),
        }
    }
}
