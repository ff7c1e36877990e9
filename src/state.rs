//! Shared application state
//!
//! Everything a request handler needs, wired once at startup.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::random::RandomSource;
use crate::settlement::SettlementSimulator;
use crate::store::{TransactionStore, UserStore};
use crate::validation::Validator;

#[derive(Clone)]
pub struct AppState {
    pub transactions: Arc<dyn TransactionStore>,
    pub users: Arc<dyn UserStore>,
    pub validator: Arc<Validator>,
    pub simulator: SettlementSimulator,
    pub clock: Arc<dyn Clock>,
    pub session_ttl: chrono::Duration,
}

impl AppState {
    /// Build the validator and simulator from configuration around the given
    /// stores, clock and random source
    pub fn new(
        config: &Config,
        transactions: Arc<dyn TransactionStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let validator = Validator::new(config.denylist(), config.fault_injection(), random.clone());
        let simulator =
            SettlementSimulator::with_config(transactions.clone(), random, config.settlement());

        Self {
            transactions,
            users,
            validator: Arc::new(validator),
            simulator,
            clock,
            session_ttl: config.session_ttl(),
        }
    }
}
