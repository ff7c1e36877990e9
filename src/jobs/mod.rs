//! Scheduled Jobs
//!
//! Background jobs for periodic maintenance tasks.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::clock::Clock;
use crate::store::{StoreError, UserStore};

// =========================================================================
// Expired Session Cleanup Job
// =========================================================================

/// Delete sessions whose expiry has passed
pub async fn cleanup_expired_sessions(
    users: &dyn UserStore,
    clock: &dyn Clock,
) -> Result<u64, JobError> {
    let rows_deleted = users.delete_expired_sessions(clock.now()).await?;

    if rows_deleted > 0 {
        tracing::info!(rows_deleted = rows_deleted, "Cleaned up expired sessions");
    }

    Ok(rows_deleted)
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval for expired session cleanup (default: 5 minutes)
    pub session_cleanup_interval: Duration,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            session_cleanup_interval: Duration::from_secs(300),
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    pub fn new(users: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(users, clock, JobSchedulerConfig::default())
    }

    pub fn with_config(
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        config: JobSchedulerConfig,
    ) -> Self {
        Self {
            users,
            clock,
            config,
        }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        tracing::info!(
            session_cleanup_secs = self.config.session_cleanup_interval.as_secs(),
            "Job scheduler started"
        );

        let mut session_interval = interval(self.config.session_cleanup_interval);

        loop {
            session_interval.tick().await;
            if let Err(e) = cleanup_expired_sessions(self.users.as_ref(), self.clock.as_ref()).await {
                tracing::error!(error = %e, "Session cleanup failed");
            }
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        match cleanup_expired_sessions(self.users.as_ref(), self.clock.as_ref()).await {
            Ok(count) => report.sessions_deleted = count,
            Err(e) => report.errors.push(format!("Session cleanup: {}", e)),
        }

        report.completed_at = self.clock.now();
        report
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub sessions_deleted: u64,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// =========================================================================
// Tests
// =========================================================================
