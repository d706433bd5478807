//! Lifecycle API seam
//!
//! The orchestrator only ever asks the runtime three things: what state an
//! instance is in, to start it, and to stop it. Start and stop return once
//! the runtime reports the operation finished.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// Instance status as reported by the runtime, compared lower-cased
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Running,
    Stopped,
    /// Transitional or error states; never treated as running
    Other(String),
}

impl InstanceStatus {
    pub fn from_api(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "running" => InstanceStatus::Running,
            "stopped" => InstanceStatus::Stopped,
            other => InstanceStatus::Other(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, InstanceStatus::Running)
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Running => "running",
            InstanceStatus::Stopped => "stopped",
            InstanceStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device name -> device config (`type`, `source`, `path`, ...)
pub type Devices = BTreeMap<String, BTreeMap<String, String>>;

/// Live view of one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceState {
    pub status: InstanceStatus,
    pub devices: Devices,
}

impl InstanceState {
    pub fn new(status: InstanceStatus) -> Self {
        Self {
            status,
            devices: Devices::new(),
        }
    }

    /// Whether a disk device already maps `source` to `path`
    pub fn has_disk(&self, source: &Path, path: &Path) -> bool {
        self.devices.values().any(|device| {
            device.get("type").map(String::as_str) == Some("disk")
                && device.get("source").map(Path::new) == Some(source)
                && device.get("path").map(Path::new) == Some(path)
        })
    }
}

/// Request/response access to the runtime's management API
pub trait LifecycleApi {
    /// Current state of `name`, or `None` if no such instance exists
    fn instance(&self, name: &str) -> Result<Option<InstanceState>>;

    /// Start `name` and wait for the operation to complete
    fn start(&self, name: &str) -> Result<()>;

    /// Stop `name` and wait for the operation to complete
    fn stop(&self, name: &str) -> Result<()>;

    fn status(&self, name: &str) -> Result<Option<InstanceStatus>> {
        Ok(self.instance(name)?.map(|state| state.status))
    }
}
