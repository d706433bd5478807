//! Collaborators on the container runtime side
//!
//! - `api`: status/start/stop against the LXD management API
//! - `launcher`: spawning and awaiting external processes
//! - `lxc`: the `lxc` command lines the orchestrator launches

pub mod api;
pub mod launcher;
pub mod lxc;
pub mod lxd;

pub use api::{InstanceState, InstanceStatus, LifecycleApi};
pub use launcher::{editor_command, CommandSpec, ExitOutcome, ProcessLauncher, SystemLauncher};
pub use lxc::Lxc;
pub use lxd::LxdClient;
