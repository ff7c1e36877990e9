//! PostgreSQL stores
//!
//! Statuses, channels and roles are stored as TEXT and mapped back through
//! their `FromStr` impls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{check_transition, StatusUpdate, StoreError, TransactionStore, UserStore, LIST_LIMIT};
use crate::domain::{normalize_email, Session, Transaction, TransactionId, TransactionStatus, User};

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: String,
    owner_id: Uuid,
    sender: String,
    receiver: String,
    amount: Decimal,
    channel: String,
    ifsc: String,
    purpose: Option<String>,
    status: String,
    failure_reason: Option<String>,
    aml_flag: bool,
    high_value: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let channel = row
            .channel
            .parse()
            .map_err(|e| StoreError::corrupt(&row.id, e))?;
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::corrupt(&row.id, e))?;

        Ok(Transaction {
            id: TransactionId::from(row.id),
            owner: row.owner_id,
            sender: row.sender,
            receiver: row.receiver,
            amount: row.amount,
            channel,
            ifsc: row.ifsc,
            purpose: row.purpose,
            status,
            failure_reason: row.failure_reason,
            aml_flag: row.aml_flag,
            high_value: row.high_value,
            created_at: row.created_at,
        })
    }
}

const TRANSACTION_COLUMNS: &str = "id, owner_id, sender, receiver, amount, channel, ifsc, \
     purpose, status, failure_reason, aml_flag, high_value, created_at";

/// Transaction store backed by the `transactions` table
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        // Read the row back so callers see exactly what was persisted
        let sql = format!(
            "INSERT INTO transactions ({TRANSACTION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {TRANSACTION_COLUMNS}"
        );
        let row: TransactionRow = sqlx::query_as(&sql)
            .bind(transaction.id.as_str())
            .bind(transaction.owner)
            .bind(&transaction.sender)
            .bind(&transaction.receiver)
            .bind(transaction.amount)
            .bind(transaction.channel.as_str())
            .bind(&transaction.ifsc)
            .bind(&transaction.purpose)
            .bind(transaction.status.as_str())
            .bind(&transaction.failure_reason)
            .bind(transaction.aml_flag)
            .bind(transaction.high_value)
            .bind(transaction.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_insert(e, transaction.id.as_str()))?;

        Transaction::try_from(row)
    }

    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1");
        let row: Option<TransactionRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE owner_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
        );
        let rows: Vec<TransactionRow> = sqlx::query_as(&sql)
            .bind(owner)
            .bind(LIST_LIMIT as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn update_status(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
        failure_reason: Option<String>,
    ) -> Result<StatusUpdate, StoreError> {
        let failure_reason = check_transition(id, status, failure_reason)?;

        // The status guard makes the terminal check and the write one statement
        let rows_affected = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $2, failure_reason = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'Pending'
            "#,
        )
        .bind(id.as_str())
        .bind(status.as_str())
        .bind(&failure_reason)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected > 0 {
            return Ok(StatusUpdate::Updated);
        }

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM transactions WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match current {
            None => Ok(StatusUpdate::NotFound),
            Some(current) => {
                let current = current
                    .parse()
                    .map_err(|e| StoreError::corrupt(id.as_str(), e))?;
                Ok(StatusUpdate::AlreadyTerminal(current))
            }
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e| StoreError::corrupt(row.id.to_string(), e))?;

        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    token_hash: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            token_hash: row.token_hash,
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// User and session store backed by the `users` and `sessions` tables
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn count_users(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, &user.email))?;

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, role, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, role, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn create_session(&self, session: Session) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.token_hash)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "session"))?;

        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT token_hash, user_id, created_at, expires_at FROM sessions WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Session::from))
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
