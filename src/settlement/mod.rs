//! Settlement simulation
//!
//! Every accepted transaction gets one detached task that waits a random
//! delay, decides a terminal outcome and writes it back by id. Nothing is
//! reported to the submitter: failures are logged and dropped, and a
//! simulation is never retried.

mod error;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::domain::{TransactionId, TransactionStatus};
use crate::random::{choose, uniform_duration, RandomSource, RandomSourceError};
use crate::store::{StatusUpdate, TransactionStore};

pub use error::SettlementError;

/// Post-hoc failure reasons, chosen uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettlementFailure {
    NetworkTimeout,
    BeneficiaryBankUnreachable,
    ProcessingError,
}

impl SettlementFailure {
    pub const ALL: [SettlementFailure; 3] = [
        Self::NetworkTimeout,
        Self::BeneficiaryBankUnreachable,
        Self::ProcessingError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "Network timeout",
            Self::BeneficiaryBankUnreachable => "Beneficiary bank unreachable",
            Self::ProcessingError => "Processing error",
        }
    }
}

impl std::fmt::Display for SettlementFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of one simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Success,
    Failed(SettlementFailure),
}

impl SettlementOutcome {
    pub fn status(&self) -> TransactionStatus {
        match self {
            Self::Success => TransactionStatus::Success,
            Self::Failed(_) => TransactionStatus::Failed,
        }
    }

    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success => None,
            Self::Failed(reason) => Some(reason.to_string()),
        }
    }
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Probability that a simulation ends in `Success`
    pub success_rate: f64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(15),
            success_rate: 0.85,
        }
    }
}

/// Schedules settlement simulations against a transaction store
#[derive(Clone)]
pub struct SettlementSimulator {
    store: Arc<dyn TransactionStore>,
    random: Arc<dyn RandomSource>,
    config: SettlementConfig,
    in_flight: Arc<AtomicUsize>,
}

/// Keeps the in-flight counter right even if a task is aborted
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SettlementSimulator {
    pub fn new(store: Arc<dyn TransactionStore>, random: Arc<dyn RandomSource>) -> Self {
        Self::with_config(store, random, SettlementConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn TransactionStore>,
        random: Arc<dyn RandomSource>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            store,
            random,
            config,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Simulations scheduled but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Spawn the simulation for a Pending transaction.
    ///
    /// Dropping the handle detaches the task; it still runs to completion.
    pub fn schedule(&self, id: TransactionId) -> JoinHandle<()> {
        let guard = InFlightGuard::enter(&self.in_flight);
        let simulator = self.clone();

        tracing::debug!(transaction_id = %id, "Settlement scheduled");

        tokio::spawn(async move {
            let _guard = guard;
            simulator.settle(id).await;
        })
    }

    /// Run one simulation inline, logging and swallowing any failure
    pub async fn settle(&self, id: TransactionId) -> Option<SettlementOutcome> {
        match self.run(&id).await {
            Ok(outcome) => {
                tracing::info!(
                    transaction_id = %id,
                    status = %outcome.status(),
                    reason = ?outcome.failure_reason(),
                    "Settlement recorded"
                );
                Some(outcome)
            }
            Err(SettlementError::AlreadySettled(_)) => {
                tracing::warn!(transaction_id = %id, "Settlement skipped, transaction already terminal");
                None
            }
            Err(e) => {
                tracing::error!(transaction_id = %id, error = %e, "Settlement simulation failed");
                None
            }
        }
    }

    async fn run(&self, id: &TransactionId) -> Result<SettlementOutcome, SettlementError> {
        let delay = uniform_duration(&*self.random, self.config.min_delay, self.config.max_delay)?;
        tokio::time::sleep(delay).await;

        let outcome = self.decide()?;
        match self
            .store
            .update_status(id, outcome.status(), outcome.failure_reason())
            .await?
        {
            StatusUpdate::Updated => Ok(outcome),
            StatusUpdate::NotFound => Err(SettlementError::NotFound(id.clone())),
            StatusUpdate::AlreadyTerminal(_) => Err(SettlementError::AlreadySettled(id.clone())),
        }
    }

    fn decide(&self) -> Result<SettlementOutcome, RandomSourceError> {
        if self.random.next_unit()? < self.config.success_rate {
            return Ok(SettlementOutcome::Success);
        }
        let reason = choose(&*self.random, &SettlementFailure::ALL)?;
        Ok(SettlementOutcome::Failed(*reason))
    }
}
