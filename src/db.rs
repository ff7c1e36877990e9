//! Database module
//!
//! Connection checks, schema verification and first-run seeding.

use sqlx::PgPool;

use crate::auth::{hash_password, PasswordError};
use crate::clock::Clock;
use crate::domain::{User, UserRole};
use crate::store::{StoreError, UserStore};

/// Tables created by `migrations/`
const REQUIRED_TABLES: &[&str] = &["users", "sessions", "transactions"];

/// Accounts created on an empty user table: (email, name, role, password)
pub const DEFAULT_USERS: &[(&str, &str, UserRole, &str)] = &[
    ("admin@payinsight.com", "Admin User", UserRole::Admin, "admin123"),
    ("analyst@payinsight.com", "Payment Analyst", UserRole::Analyst, "analyst123"),
];

/// Failures while seeding the default users
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables 
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Create the default users when no user exists yet.
/// Returns how many users were inserted.
pub async fn seed_default_users(users: &dyn UserStore, clock: &dyn Clock) -> Result<usize, SeedError> {
    if users.count_users().await? > 0 {
        return Ok(0);
    }

    for (email, name, role, password) in DEFAULT_USERS {
        let user = User::new(email, *name, *role, hash_password(password)?, clock.now());
        users.create_user(user).await?;
        tracing::info!(email = %email, role = role.as_str(), "Seeded default user");
    }

    Ok(DEFAULT_USERS.len())
}
