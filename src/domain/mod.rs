//! Domain module
//!
//! Core domain types: transactions, channels, users and the caller context.

pub mod channel;
pub mod context;
pub mod transaction;
pub mod user;

pub use channel::{PaymentChannel, UnknownChannel};
pub use context::OperationContext;
pub use transaction::{
    Transaction, TransactionId, TransactionRequest, TransactionStatus, UnknownStatus,
};
pub use user::{normalize_email, Session, UnknownRole, User, UserRole};
