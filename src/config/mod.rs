//! Configuration directory layout and global settings
//!
//! ```text
//! <root>/settings.toml
//! <root>/templates/bootstrap-root.sh     (optional template overrides)
//! <root>/templates/bootstrap-user.sh
//! <root>/containers/<name>/config.toml
//! <root>/containers/<name>/bootstrap-root.sh
//! <root>/containers/<name>/bootstrap-user.sh
//! ```

mod settings;
pub mod templates;

pub use settings::Settings;

use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration root
pub const CONFIG_DIR_ENV: &str = "NOOK_CONFIG_DIR";

pub const SETTINGS_FILE: &str = "settings.toml";
pub const CONTAINERS_DIR: &str = "containers";
pub const TEMPLATES_DIR: &str = "templates";
pub const CONFIG_FILE: &str = "config.toml";
pub const BOOTSTRAP_ROOT: &str = "bootstrap-root.sh";
pub const BOOTSTRAP_USER: &str = "bootstrap-user.sh";

/// Paths inside the configuration root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    root: PathBuf,
}

impl ConfigLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<config home>/nook`, falling back to `~/.config/nook`
    pub fn default_root(home: Option<&Path>) -> PathBuf {
        dirs::config_dir()
            .or_else(|| home.map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("nook")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn containers_dir(&self) -> PathBuf {
        self.root.join(CONTAINERS_DIR)
    }

    pub fn container_dir(&self, name: &str) -> PathBuf {
        self.containers_dir().join(name)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }
}

/// Expand a leading `~` against `home`.
///
/// Paths without the shorthand, or with no known home directory, come back
/// unchanged; callers decide whether the result is acceptable.
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    let expanded = shellexpand::tilde_with_context(raw, || home.and_then(Path::to_str));
    PathBuf::from(expanded.into_owned())
}
