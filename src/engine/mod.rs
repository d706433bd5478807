//! Lifecycle engine: the orchestrator and the operations built on it

pub mod actions;
pub mod executor;

pub use actions::ProvisionOptions;
pub use executor::{ExecutionContext, Orchestrator, Outcome, Report, Resolution};
