//! Container definitions on disk
//!
//! Each container is a directory under `<config root>/containers/` holding:
//! - `config.toml` with the project root and mount list
//! - the two bootstrap scripts run at provisioning time

mod mounts;
mod pending;
mod record;
mod registry;

pub use mounts::translate;
pub use pending::PendingDefinition;
pub use record::{validate_name, ContainerRecord};
pub use registry::Registry;
