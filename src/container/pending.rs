//! All-or-nothing creation of definition directories
//!
//! A [`PendingDefinition`] owns a freshly created definition directory until
//! it is committed. Dropping it uncommitted removes the directory, and a
//! Ctrl+C while one is pending removes it before the process exits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use tracing::{debug, warn};

use crate::error::{NookError, Result};

/// Directory removed by the Ctrl+C handler, if any
static PENDING: Mutex<Option<PathBuf>> = Mutex::new(None);
static HANDLER: Once = Once::new();

/// Exit status used after an interrupted init
const INTERRUPTED_EXIT: i32 = 130;

#[derive(Debug)]
pub struct PendingDefinition {
    dir: PathBuf,
    committed: bool,
}

impl PendingDefinition {
    /// Create `dir` (and missing parents). Fails if `dir` already exists.
    pub fn create(dir: &Path) -> Result<Self> {
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::create_dir(dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(NookError::AlreadyExists(dir.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        }

        install_handler();
        if let Ok(mut pending) = PENDING.lock() {
            *pending = Some(dir.to_path_buf());
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            committed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Keep the directory
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        release(&self.dir);
        self.dir.clone()
    }
}

impl Drop for PendingDefinition {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        release(&self.dir);
        debug!(dir = %self.dir.display(), "removing unfinished container definition");
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "failed to remove unfinished definition");
        }
    }
}

fn release(dir: &Path) {
    if let Ok(mut pending) = PENDING.lock() {
        if pending.as_deref() == Some(dir) {
            *pending = None;
        }
    }
}

fn install_handler() {
    HANDLER.call_once(|| {
        let result = ctrlc::set_handler(|| {
            if let Some(dir) = remove_pending(&PENDING) {
                eprintln!("\nCancelled, removed {}", dir.display());
            }
            std::process::exit(INTERRUPTED_EXIT);
        });
        if let Err(e) = result {
            warn!("{}", NookError::Signal(e.to_string()));
        }
    });
}

/// Take and delete the directory registered in `slot`
fn remove_pending(slot: &Mutex<Option<PathBuf>>) -> Option<PathBuf> {
    let dir = slot.lock().ok().and_then(|mut pending| pending.take())?;
    if let Err(e) = fs::remove_dir_all(&dir) {
        warn!(dir = %dir.display(), error = %e, "failed to remove unfinished definition");
    }
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_drop_removes_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("containers").join("web");
        {
            let pending = PendingDefinition::create(&dir).unwrap();
            fs::write(pending.path().join("config.toml"), "x").unwrap();
            assert!(dir.exists());
        }
        assert!(!dir.exists());
    }

    #[test]
    fn test_commit_keeps_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("web");
        let pending = PendingDefinition::create(&dir).unwrap();
        assert_eq!(pending.commit(), dir);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_existing_directory_is_not_touched() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("web");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("config.toml"), "keep").unwrap();

        let err = PendingDefinition::create(&dir).unwrap_err();
        assert!(matches!(err, NookError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(dir.join("config.toml")).unwrap(), "keep");
    }

    #[test]
    fn test_interrupt_cleanup_empties_slot() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("web");
        fs::create_dir(&dir).unwrap();
        let slot = Mutex::new(Some(dir.clone()));

        assert_eq!(remove_pending(&slot), Some(dir.clone()));
        assert!(!dir.exists());
        // After commit nothing is pending and the interrupt only exits
        assert_eq!(remove_pending(&slot), None);
    }
}
