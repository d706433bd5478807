//! Lifecycle orchestrator
//!
//! The runtime is the only source of truth for instance state: every
//! decision queries live status first and nothing is remembered locally.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ConfigLayout, Settings};
use crate::container::{validate_name, ContainerRecord, Registry};
use crate::error::{NookError, Result};
use crate::runtime::{ExitOutcome, InstanceStatus, LifecycleApi, Lxc, ProcessLauncher};

/// Everything an operation needs to know about this invocation
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub layout: ConfigLayout,
    pub settings: Settings,
    /// Directory the command was run from
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
    /// Editor command line used during `init`
    pub editor: String,
}

impl ExecutionContext {
    pub fn registry(&self) -> Registry {
        Registry::new(self.layout.containers_dir(), self.home.clone())
    }

    pub fn lxc(&self) -> Lxc {
        Lxc::new(self.settings.lxc.clone())
    }
}

/// How a container name was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Given with `--container`
    Explicit(String),
    /// Found by walking up from the working directory
    Derived(String),
    NotFound,
}

impl Resolution {
    pub fn name(&self) -> Option<&str> {
        match self {
            Resolution::Explicit(name) | Resolution::Derived(name) => Some(name),
            Resolution::NotFound => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Explicit(_) => "explicit",
            Resolution::Derived(_) => "derived",
            Resolution::NotFound => "none",
        }
    }
}

/// Result of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// No container was named and none owns the working directory
    NoContainer,
    /// The user backed out of an interactive step
    Cancelled,
    /// An interactive session ended
    Session(ExitOutcome),
    Report(Report),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Status(StatusReport),
    Containers { containers: Vec<ContainerSummary> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub name: String,
    /// `explicit` or `derived`
    pub resolved: String,
    pub project_path: String,
    /// Live runtime status, `missing` when the instance does not exist
    pub status: String,
    /// Where the working directory lands inside the container, if mounted
    pub container_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    pub name: String,
    pub project_path: String,
    pub mounts: usize,
    /// Owns the working directory
    pub current: bool,
}

/// Sequences lifecycle operations against the runtime
pub struct Orchestrator<'a> {
    pub(crate) ctx: &'a ExecutionContext,
    pub(crate) api: &'a dyn LifecycleApi,
    pub(crate) launcher: &'a dyn ProcessLauncher,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        ctx: &'a ExecutionContext,
        api: &'a dyn LifecycleApi,
        launcher: &'a dyn ProcessLauncher,
    ) -> Self {
        Self { ctx, api, launcher }
    }

    /// Use `explicit` as-is, otherwise derive a name from the working directory
    pub fn resolve(&self, explicit: Option<&str>) -> Result<Resolution> {
        if let Some(name) = explicit {
            validate_name(name)?;
            return Ok(Resolution::Explicit(name.to_string()));
        }

        let resolution = match self.ctx.registry().resolve_by_path(&self.ctx.cwd)? {
            Some(name) => Resolution::Derived(name),
            None => Resolution::NotFound,
        };
        debug!(cwd = %self.ctx.cwd.display(), resolution = resolution.kind(), "resolved");
        Ok(resolution)
    }

    /// Resolve and load the record, or `None` when nothing matched
    pub(crate) fn resolve_record(&self, explicit: Option<&str>) -> Result<Option<ContainerRecord>> {
        match self.resolve(explicit)?.name() {
            Some(name) => self.ctx.registry().load(name).map(Some),
            None => Ok(None),
        }
    }

    /// Start `name` unless it is already running
    pub fn ensure_running(&self, name: &str) -> Result<()> {
        match self.api.status(name)? {
            Some(InstanceStatus::Running) => {
                debug!(container = name, "already running");
                Ok(())
            }
            Some(status) => {
                info!(container = name, %status, "starting container");
                self.api.start(name)
            }
            None => Err(NookError::InstanceMissing(name.to_string())),
        }
    }

    /// Stop `name` if it is running
    pub fn ensure_stopped(&self, name: &str) -> Result<()> {
        match self.api.status(name)? {
            Some(InstanceStatus::Running) => {
                info!(container = name, "stopping container");
                self.api.stop(name)
            }
            Some(status) => {
                debug!(container = name, %status, "not running, nothing to stop");
                Ok(())
            }
            None => {
                debug!(container = name, "instance does not exist, nothing to stop");
                Ok(())
            }
        }
    }

    pub fn stop(&self, explicit: Option<&str>) -> Result<Outcome> {
        match self.resolve(explicit)?.name() {
            Some(name) => {
                self.ensure_stopped(name)?;
                Ok(Outcome::Completed)
            }
            None => Ok(Outcome::NoContainer),
        }
    }

    /// Describe the resolved container and its live status
    pub fn status(&self, explicit: Option<&str>) -> Result<Outcome> {
        let resolution = self.resolve(explicit)?;
        let Some(name) = resolution.name() else {
            return Ok(Outcome::NoContainer);
        };

        let record = self.ctx.registry().load(name)?;
        let status = self
            .api
            .status(name)?
            .map(|s| s.to_string())
            .unwrap_or_else(|| "missing".to_string());

        Ok(Outcome::Report(Report::Status(StatusReport {
            name: record.name.clone(),
            resolved: resolution.kind().to_string(),
            project_path: record.project_path.display().to_string(),
            status,
            container_path: record
                .container_path(&self.ctx.cwd)
                .map(|p| p.display().to_string()),
        })))
    }

    /// Every registered container; needs no runtime access
    pub fn list(&self) -> Result<Outcome> {
        let records = self.ctx.registry().load_all()?;
        let index = Registry::index(&records)?;
        let current = index.nearest_match(&self.ctx.cwd).map(|(_, name)| name.clone());

        let containers = records
            .iter()
            .map(|record| ContainerSummary {
                name: record.name.clone(),
                project_path: record.project_path.display().to_string(),
                mounts: record.mounts.len(),
                current: current.as_deref() == Some(record.name.as_str()),
            })
            .collect();

        Ok(Outcome::Report(Report::Containers { containers }))
    }
}
