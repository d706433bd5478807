//! Per-operation flows built on the orchestrator
//!
//! - `init`: create a container definition interactively
//! - `provision`: create, mount, start and bootstrap an instance
//! - `login`: attach an interactive shell

pub mod init;
pub mod login;
pub mod provision;

/// Options for [`Orchestrator::provision`](crate::engine::Orchestrator::provision)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Log in once provisioning finishes
    pub login: bool,
}
