//! Command Handlers module
//!
//! Handlers orchestrate a single business operation across the validator,
//! the stores and the settlement simulator.

mod commands;
mod login_handler;
mod submit_handler;


pub use commands::*;
pub use login_handler::LoginHandler;
pub use submit_handler::SubmitTransactionHandler;
