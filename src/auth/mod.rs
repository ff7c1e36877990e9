//! Authentication
//!
//! Argon2 password verification and opaque bearer sessions. Tokens are
//! random and only their SHA-256 is persisted.

mod password;

use chrono::Duration;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::clock::Clock;
use crate::domain::{OperationContext, Session, User};
use crate::store::{StoreError, UserStore};

pub use password::{hash_password, verify_password, PasswordError};

const TOKEN_BYTES: usize = 32;

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or unknown token")]
    InvalidToken,

    #[error("Session expired")]
    SessionExpired,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fresh random bearer token, hex encoded
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// A freshly opened session. `token` is the only copy of the raw bearer token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: User,
    pub token: String,
    pub session: Session,
}

/// Check credentials and open a session
pub async fn login(
    users: &dyn UserStore,
    clock: &dyn Clock,
    email: &str,
    password: &str,
    ttl: Duration,
) -> Result<IssuedSession, AuthError> {
    let user = users
        .find_user_by_email(email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let token = generate_token();
    let now = clock.now();
    let session = Session {
        token_hash: hash_token(&token),
        user_id: user.id,
        created_at: now,
        expires_at: now + ttl,
    };
    users.create_session(session.clone()).await?;

    tracing::info!(user_id = %user.id, expires_at = %session.expires_at, "Session opened");

    Ok(IssuedSession {
        user,
        token,
        session,
    })
}

/// Resolve a bearer token to the caller's context
pub async fn authenticate(
    users: &dyn UserStore,
    clock: &dyn Clock,
    token: &str,
) -> Result<OperationContext, AuthError> {
    let session = users
        .find_session(&hash_token(token))
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if session.is_expired(clock.now()) {
        return Err(AuthError::SessionExpired);
    }

    let user = users
        .find_user(session.user_id)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    Ok(OperationContext::new().with_user(user.id, user.email, user.role))
}

/// Extract the token from an `Authorization: Bearer <token>` value
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
