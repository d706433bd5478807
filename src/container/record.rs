//! Container record definition
//!
//! A record is the on-disk definition of one container: the project root it
//! serves and the host directories bind-mounted into it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::config::{self, expand_home};
use crate::error::{NookError, Result};
use crate::resolver::PathMap;

/// Raw `config.toml` as written by users
#[derive(Debug, Deserialize)]
struct RecordFile {
    #[serde(rename = "project-path")]
    project_path: Option<String>,
    #[serde(default)]
    mounts: BTreeMap<String, String>,
}

/// A loaded and normalized container definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    /// Container name, also the LXD instance name
    pub name: String,
    /// Definition directory holding `config.toml` and the bootstrap scripts
    pub dir: PathBuf,
    /// Absolute host directory this container is for
    pub project_path: PathBuf,
    /// Host directory -> in-container directory
    pub mounts: PathMap<PathBuf>,
}

impl ContainerRecord {
    /// Load `<dir>/config.toml`, expanding `~` against `home`
    pub fn load(name: &str, dir: &Path, home: Option<&Path>) -> Result<Self> {
        let path = dir.join(config::CONFIG_FILE);
        let content = fs::read_to_string(&path).map_err(|source| NookError::ReadConfig {
            path: path.clone(),
            source,
        })?;

        Self::parse(name, dir, &content, home)
    }

    /// Parse and normalize a record from `config.toml` contents
    pub fn parse(name: &str, dir: &Path, content: &str, home: Option<&Path>) -> Result<Self> {
        let path = dir.join(config::CONFIG_FILE);
        let raw: RecordFile = toml::from_str(content).map_err(|source| NookError::ParseConfig {
            path: path.clone(),
            source,
        })?;

        let project_path = raw.project_path.ok_or_else(|| NookError::InvalidConfig {
            path: path.clone(),
            message: "missing required field `project-path`".to_string(),
        })?;
        let project_path = absolute(&path, "project-path", &project_path, home)?;

        let mut mounts = PathMap::new();
        for (source, target) in &raw.mounts {
            let source = absolute(&path, "mount source", source, home)?;
            let target = PathBuf::from(target);
            if !target.is_absolute() {
                return Err(NookError::InvalidConfig {
                    path,
                    message: format!("mount target `{}` must be absolute", target.display()),
                });
            }
            // "~/a" and "/home/u/a" can collide after expansion
            if mounts.insert(source.clone(), target).is_some() {
                return Err(NookError::InvalidConfig {
                    path,
                    message: format!("mount source `{}` is declared twice", source.display()),
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            project_path,
            mounts,
        })
    }

    pub fn bootstrap_root(&self) -> PathBuf {
        self.dir.join(config::BOOTSTRAP_ROOT)
    }

    pub fn bootstrap_user(&self) -> PathBuf {
        self.dir.join(config::BOOTSTRAP_USER)
    }
}

fn absolute(file: &Path, field: &str, raw: &str, home: Option<&Path>) -> Result<PathBuf> {
    let expanded = expand_home(raw, home);
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Err(NookError::InvalidConfig {
            path: file.to_path_buf(),
            message: format!("{field} `{raw}` must be an absolute path"),
        })
    }
}

/// Check a name against LXD's instance naming rules
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.len() > 63 {
        "name is longer than 63 characters"
    } else if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        "name must start with a letter"
    } else if name.ends_with('-') {
        "name must not end with a hyphen"
    } else if !Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,62}$")
        .map(|r| r.is_match(name))
        .unwrap_or(false)
    {
        "only letters, digits and hyphens are allowed"
    } else {
        return Ok(());
    };

    Err(NookError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
