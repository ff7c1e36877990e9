//! Transaction entity
//!
//! A submitted payment together with its validation flags and settlement status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::PaymentChannel;
use crate::validation::{normalize_ifsc, Verdict};

/// Transaction identifier, `TXN<unix seconds><6 hex chars>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a fresh identifier stamped with `now`
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
        Self(format!("TXN{}{}", now.timestamp(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settlement status. `Success` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Success => "Success",
            Self::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Success" => Ok(Self::Success),
            "Failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Transaction submission as received from the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender: String,
    pub receiver: String,
    pub amount: Decimal,
    pub channel: PaymentChannel,
    pub ifsc: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Persisted transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner: Uuid,
    pub sender: String,
    pub receiver: String,
    pub amount: Decimal,
    pub channel: PaymentChannel,
    pub ifsc: String,
    pub purpose: Option<String>,
    pub status: TransactionStatus,
    pub failure_reason: Option<String>,
    pub aml_flag: bool,
    pub high_value: bool,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build the record for a request that has just been evaluated.
    ///
    /// Accepted requests start `Pending`; rejected ones are born `Failed`
    /// with the rejection reason and are never settled.
    pub fn from_verdict(
        id: TransactionId,
        owner: Uuid,
        request: TransactionRequest,
        verdict: &Verdict,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (status, failure_reason) = match verdict.failure_reason {
            Some(reason) => (TransactionStatus::Failed, Some(reason.to_string())),
            None => (TransactionStatus::Pending, None),
        };

        Self {
            id,
            owner,
            sender: request.sender,
            receiver: request.receiver,
            amount: request.amount,
            channel: request.channel,
            ifsc: normalize_ifsc(&request.ifsc),
            purpose: request.purpose,
            status,
            failure_reason,
            aml_flag: verdict.flags.aml_flag,
            high_value: verdict.flags.high_value,
            created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}
