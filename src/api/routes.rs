//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    OperationContext, PaymentChannel, Transaction, TransactionId, TransactionRequest,
    TransactionStatus, User, UserRole,
};
use crate::error::AppError;
use crate::handlers::{LoginCommand, LoginHandler, SubmitTransactionHandler};
use crate::state::AppState;

pub const API_VERSION_MESSAGE: &str = "PayInsight API v1.0.0";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub user_id: Uuid,
    pub sender: String,
    pub receiver: String,
    /// JSON number, as submitted
    #[serde(with = "rust_decimal::serde::float")]
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

impl From<Transaction> for TransactionResponse {
    fn from(txn: Transaction) -> Self {
        Self {
            id: txn.id,
            user_id: txn.owner,
            sender: txn.sender,
            receiver: txn.receiver,
            amount: txn.amount,
            channel: txn.channel,
            ifsc: txn.ifsc,
            purpose: txn.purpose,
            status: txn.status,
            failure_reason: txn.failure_reason,
            aml_flag: txn.aml_flag,
            high_value: txn.high_value,
            created_at: txn.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub code: PaymentChannel,
    pub description: String,
    pub timeline: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelsResponse {
    pub channels: Vec<ChannelInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub in_flight_settlements: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
}

// =========================================================================
// API Routers
// =========================================================================

/// Routes reachable without a session
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/channels", get(list_channels))
        .route("/auth/login", post(login))
}

/// Routes that need an authenticated `OperationContext`
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction).get(list_transactions))
        .route("/transactions/:transaction_id", get(get_transaction))
}

// =========================================================================
// POST /auth/login
// =========================================================================

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let handler = LoginHandler::from_state(&state);
    let result = handler
        .execute(LoginCommand::new(request.email, request.password))
        .await?;

    Ok(Json(LoginResponse {
        token: result.token,
        expires_at: result.expires_at,
        user: result.user.into(),
    }))
}

// =========================================================================
// POST /transactions
// =========================================================================

/// Submit a transaction. Rejections are still created, with status `Failed`.
async fn create_transaction(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let handler = SubmitTransactionHandler::from_state(&state);
    let transaction = handler.execute(request.into(), &context).await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

// =========================================================================
// GET /transactions
// =========================================================================

async fn list_transactions(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<TransactionListResponse>, AppError> {
    let owner = context.user_id.ok_or(AppError::Unauthenticated)?;

    let transactions: Vec<TransactionResponse> = state
        .transactions
        .list_by_owner(owner)
        .await?
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(TransactionListResponse {
        total: transactions.len(),
        transactions,
    }))
}

// =========================================================================
// GET /transactions/:transaction_id
// =========================================================================

/// Another user's transaction is reported as not found
async fn get_transaction(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, AppError> {
    let owner = context.user_id.ok_or(AppError::Unauthenticated)?;
    let id = TransactionId::from(transaction_id);

    let transaction = state
        .transactions
        .get(&id)
        .await?
        .filter(|txn| txn.owner == owner)
        .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))?;

    Ok(Json(transaction.into()))
}

// =========================================================================
// Public endpoints
// =========================================================================

async fn list_channels() -> Json<ChannelsResponse> {
    let channels = PaymentChannel::ALL
        .iter()
        .map(|channel| ChannelInfo {
            code: *channel,
            description: channel.description().to_string(),
            timeline: channel.processing_timeline().to_string(),
        })
        .collect();

    Json(ChannelsResponse { channels })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: state.clock.now(),
        in_flight_settlements: state.simulator.in_flight(),
    })
}

/// Service banner, mounted at both `/api` and `/api/`
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: API_VERSION_MESSAGE.to_string(),
        status: "running".to_string(),
    })
}
