//! Global settings (`settings.toml`)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{NookError, Result};

const SNAP_SOCKET: &str = "/var/snap/lxd/common/lxd/unix.socket";
const NATIVE_SOCKET: &str = "/var/lib/lxd/unix.socket";

/// Tool-wide settings. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// LXD unix socket; looked up in the environment and well-known paths when unset
    pub socket: Option<PathBuf>,
    /// Runtime CLI program
    pub lxc: String,
    /// Image passed to the create-instance request
    pub image: String,
    /// Profiles applied to every created instance
    pub profiles: Vec<String>,
    /// Unprivileged in-container account
    pub user: String,
    /// In-container directory for the default mount written by `init`
    pub mount_target: PathBuf,
    /// Host name whose resolution confirms outbound networking
    pub probe_host: String,
    /// Upper bound on the network wait. Unset waits forever.
    pub network_timeout_secs: Option<u64>,
    pub editor: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            socket: None,
            lxc: "lxc".to_string(),
            image: "ubuntu:24.04".to_string(),
            profiles: vec!["default".to_string()],
            user: "ubuntu".to_string(),
            mount_target: PathBuf::from("/workspace"),
            probe_host: "archive.ubuntu.com".to_string(),
            network_timeout_secs: None,
            editor: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(NookError::ReadConfig {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|source| NookError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })?;

        if !settings.mount_target.is_absolute() {
            return Err(NookError::InvalidConfig {
                path: path.to_path_buf(),
                message: format!(
                    "`mount-target` must be absolute, got `{}`",
                    settings.mount_target.display()
                ),
            });
        }

        Ok(settings)
    }

    /// The LXD socket to talk to.
    ///
    /// Order: `socket` setting, `$LXD_SOCKET`, `$LXD_DIR/unix.socket`, the snap
    /// socket if it exists, then the native package socket.
    pub fn socket_path(&self) -> PathBuf {
        if let Some(socket) = &self.socket {
            return socket.clone();
        }
        if let Some(socket) = std::env::var_os("LXD_SOCKET").filter(|v| !v.is_empty()) {
            return PathBuf::from(socket);
        }
        if let Some(dir) = std::env::var_os("LXD_DIR").filter(|v| !v.is_empty()) {
            return PathBuf::from(dir).join("unix.socket");
        }
        if Path::new(SNAP_SOCKET).exists() {
            return PathBuf::from(SNAP_SOCKET);
        }
        PathBuf::from(NATIVE_SOCKET)
    }

    /// Editor command line: `editor` setting, `$VISUAL`, `$EDITOR`, then `vi`
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| std::env::var("EDITOR").ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }

    pub fn network_timeout(&self) -> Option<Duration> {
        self.network_timeout_secs.map(Duration::from_secs)
    }
}
