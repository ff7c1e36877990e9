//! Operation Context
//!
//! Identity of the authenticated caller plus request tracing metadata.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserRole;

/// Context for an operation, used for ownership checks and tracing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationContext {
    /// Authenticated user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the authenticated user
    pub fn with_user(mut self, user_id: Uuid, email: impl Into<String>, role: UserRole) -> Self {
        self.user_id = Some(user_id);
        self.email = Some(email.into());
        self.role = Some(role);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let user_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let context = OperationContext::new()
            .with_user(user_id, "analyst@payinsight.com", UserRole::Analyst)
            .with_correlation_id(correlation_id);

        assert_eq!(context.user_id, Some(user_id));
        assert_eq!(context.role, Some(UserRole::Analyst));
        assert_eq!(context.correlation_id, Some(correlation_id));
    }
}
