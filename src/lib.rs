//! PayInsight Library
//!
//! Transaction validation and simulated settlement behind an authenticated
//! HTTP API. Re-exports modules for integration testing and the binaries.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod random;
pub mod settlement;
pub mod state;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
