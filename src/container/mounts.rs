//! Host path to in-container path translation

use std::path::{Path, PathBuf};

use super::record::ContainerRecord;

/// Map `host_path` into the container through its nearest declared mount.
///
/// `None` means the path is not under any mount, which callers treat as "no
/// starting directory", never as an error.
pub fn translate(record: &ContainerRecord, host_path: &Path) -> Option<PathBuf> {
    let (source, target) = record.mounts.nearest_match(host_path)?;
    let relative = host_path.strip_prefix(source).ok()?;

    if relative.as_os_str().is_empty() {
        Some(target.clone())
    } else {
        Some(target.join(relative))
    }
}

impl ContainerRecord {
    /// See [`translate`]
    pub fn container_path(&self, host_path: &Path) -> Option<PathBuf> {
        translate(self, host_path)
    }
}
