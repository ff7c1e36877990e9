use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_transition, StatusUpdate, StoreError, TransactionStore, UserStore, LIST_LIMIT};
use crate::domain::{normalize_email, Session, Transaction, TransactionId, TransactionStatus, User};

/// A thread-safe in-memory transaction store.
///
/// Each `update_status` call holds the write lock for its whole
/// read-check-write, which gives it the same atomicity as the conditional
/// `UPDATE` of the PostgreSQL store.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transactions.read().await.is_empty()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&transaction.id) {
            return Err(StoreError::Duplicate(transaction.id.to_string()));
        }
        transactions.insert(transaction.id.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(id).cloned())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let transactions = self.transactions.read().await;
        let mut owned: Vec<Transaction> = transactions
            .values()
            .filter(|txn| txn.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        owned.truncate(LIST_LIMIT);
        Ok(owned)
    }

    async fn update_status(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
        failure_reason: Option<String>,
    ) -> Result<StatusUpdate, StoreError> {
        let failure_reason = check_transition(id, status, failure_reason)?;

        let mut transactions = self.transactions.write().await;
        let Some(txn) = transactions.get_mut(id) else {
            return Ok(StatusUpdate::NotFound);
        };
        if txn.status.is_terminal() {
            return Ok(StatusUpdate::AlreadyTerminal(txn.status));
        }

        txn.status = status;
        txn.failure_reason = failure_reason;
        Ok(StatusUpdate::Updated)
    }
}

/// A thread-safe in-memory store for users and their sessions.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate(user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn create_session(&self, session: Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(token_hash).cloned())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}
