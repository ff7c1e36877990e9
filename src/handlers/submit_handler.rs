//! Submit Transaction Handler
//!
//! Validates a submission, persists the record and hands accepted
//! transactions to the settlement simulator.

use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::{OperationContext, Transaction, TransactionId};
use crate::error::AppError;
use crate::settlement::SettlementSimulator;
use crate::state::AppState;
use crate::store::TransactionStore;
use crate::validation::Validator;

use super::SubmitTransactionCommand;

/// Handler for transaction submissions
pub struct SubmitTransactionHandler {
    store: Arc<dyn TransactionStore>,
    validator: Arc<Validator>,
    simulator: SettlementSimulator,
    clock: Arc<dyn Clock>,
}

impl SubmitTransactionHandler {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        validator: Arc<Validator>,
        simulator: SettlementSimulator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            validator,
            simulator,
            clock,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.transactions.clone(),
            state.validator.clone(),
            state.simulator.clone(),
            state.clock.clone(),
        )
    }

    /// Execute the submission.
    ///
    /// A rejected request is still persisted (as `Failed`) and returned; only
    /// store and random source failures surface as errors.
    pub async fn execute(
        &self,
        command: SubmitTransactionCommand,
        context: &OperationContext,
    ) -> Result<Transaction, AppError> {
        let owner = context.user_id.ok_or(AppError::Unauthenticated)?;

        let request = command.into_request();
        let verdict = self.validator.evaluate_request(&request)?;

        let now = self.clock.now();
        let transaction =
            Transaction::from_verdict(TransactionId::generate(now), owner, request, &verdict, now);

        let transaction = self.store.create(transaction).await?;

        if transaction.is_pending() {
            self.simulator.schedule(transaction.id.clone());
            tracing::info!(
                transaction_id = %transaction.id,
                owner = %owner,
                channel = %transaction.channel,
                amount = %transaction.amount,
                aml_flag = transaction.aml_flag,
                high_value = transaction.high_value,
                correlation_id = ?context.correlation_id,
                "Transaction accepted, settlement scheduled"
            );
        } else {
            tracing::info!(
                transaction_id = %transaction.id,
                owner = %owner,
                reason = transaction.failure_reason.as_deref().unwrap_or_default(),
                correlation_id = ?context.correlation_id,
                "Transaction rejected"
            );
        }

        Ok(transaction)
    }
}
