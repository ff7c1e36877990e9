//! Login Handler

use std::sync::Arc;

use crate::auth;
use crate::clock::Clock;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::UserStore;

use super::{LoginCommand, LoginResult};

/// Handler for password logins
pub struct LoginHandler {
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    session_ttl: chrono::Duration,
}

impl LoginHandler {
    pub fn new(users: Arc<dyn UserStore>, clock: Arc<dyn Clock>, session_ttl: chrono::Duration) -> Self {
        Self {
            users,
            clock,
            session_ttl,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.clock.clone(), state.session_ttl)
    }

    pub async fn execute(&self, command: LoginCommand) -> Result<LoginResult, AppError> {
        if command.email.trim().is_empty() || command.password.is_empty() {
            return Err(AppError::InvalidRequest(
                "Email and password are required".to_string(),
            ));
        }

        let issued = auth::login(
            self.users.as_ref(),
            self.clock.as_ref(),
            &command.email,
            &command.password,
            self.session_ttl,
        )
        .await
        .map_err(|e| {
            if matches!(e, auth::AuthError::InvalidCredentials) {
                tracing::warn!(email = %command.email, "Login failed");
            }
            AppError::from(e)
        })?;

        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.session.expires_at,
            user: issued.user,
        })
    }
}
