pub mod config;
pub mod error;
pub mod ports;
pub mod types;

pub use config::Config;
pub use error::{ErrorCategory, GrantError, Result};
pub use ports::{Alerter, Clock, GrantStore, Severity, SystemClock, UpsertOutcome};
