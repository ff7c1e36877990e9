//! Command definitions
//!
//! Commands represent intentions to change the system state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{PaymentChannel, TransactionRequest, User};

// =========================================================================
// SubmitTransactionCommand
// =========================================================================

/// Command to submit a new payment transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTransactionCommand {
    pub sender: String,
    pub receiver: String,
    pub amount: Decimal,
    pub channel: PaymentChannel,
    pub ifsc: String,
    pub purpose: Option<String>,
}

impl SubmitTransactionCommand {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: Decimal,
        channel: PaymentChannel,
        ifsc: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            channel,
            ifsc: ifsc.into(),
            purpose: None,
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn into_request(self) -> TransactionRequest {
        TransactionRequest {
            sender: self.sender,
            receiver: self.receiver,
            amount: self.amount,
            channel: self.channel,
            ifsc: self.ifsc,
            purpose: self.purpose,
        }
    }
}

impl From<TransactionRequest> for SubmitTransactionCommand {
    fn from(request: TransactionRequest) -> Self {
        Self {
            sender: request.sender,
            receiver: request.receiver,
            amount: request.amount,
            channel: request.channel,
            ifsc: request.ifsc,
            purpose: request.purpose,
        }
    }
}

// =========================================================================
// LoginCommand
// =========================================================================

/// Command to open a session with email and password
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}
