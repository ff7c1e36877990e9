//! Persistence layer
//!
//! Store traits consumed by the handlers, the settlement simulator and the
//! maintenance jobs, with in-memory and PostgreSQL implementations.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Session, Transaction, TransactionId, TransactionStatus, User};

pub use error::StoreError;
pub use memory::{InMemoryTransactionStore, InMemoryUserStore};
pub use postgres::{PgTransactionStore, PgUserStore};

/// Maximum number of records returned by [`TransactionStore::list_by_owner`]
pub const LIST_LIMIT: usize = 100;

/// Result of [`TransactionStore::update_status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated,
    NotFound,
    /// The record had already settled and was left untouched
    AlreadyTerminal(TransactionStatus),
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist a new record as-is
    async fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError>;

    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Newest first, at most [`LIST_LIMIT`] records
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>, StoreError>;

    /// Move a Pending record to a terminal status. Terminal records are never
    /// overwritten.
    async fn update_status(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
        failure_reason: Option<String>,
    ) -> Result<StatusUpdate, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn count_users(&self) -> Result<u64, StoreError>;

    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_session(&self, session: Session) -> Result<(), StoreError>;

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError>;

    /// Returns the number of sessions removed
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Validate a status change and normalize its failure reason.
///
/// Records never go back to Pending, `Success` carries no reason and
/// `Failed` must carry one.
fn check_transition(
    id: &TransactionId,
    status: TransactionStatus,
    failure_reason: Option<String>,
) -> Result<Option<String>, StoreError> {
    match status {
        TransactionStatus::Pending => Err(StoreError::NonTerminalUpdate(id.to_string())),
        TransactionStatus::Success => Ok(None),
        TransactionStatus::Failed => failure_reason
            .map(Some)
            .ok_or_else(|| StoreError::MissingFailureReason(id.to_string())),
    }
}
