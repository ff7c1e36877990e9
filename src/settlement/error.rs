//! Settlement Errors

use crate::domain::TransactionId;
use crate::random::RandomSourceError;
use crate::store::StoreError;

/// Reasons a single simulation could not record its outcome
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("Transaction {0} no longer exists")]
    NotFound(TransactionId),

    #[error("Transaction {0} already settled")]
    AlreadySettled(TransactionId),

    #[error("Random source failed: {0}")]
    Random(#[from] RandomSourceError),

    #[error("Store update failed: {0}")]
    Store(#[from] StoreError),
}
