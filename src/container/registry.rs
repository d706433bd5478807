//! Container registry built from the configuration directory
//!
//! The registry is rebuilt on every invocation; nothing is cached between
//! runs. Building the project map loads every record, and one malformed
//! record fails the whole lookup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::record::ContainerRecord;
use crate::error::{NookError, Result};
use crate::resolver::PathMap;

/// Loads container records from `<config root>/containers`
#[derive(Debug, Clone)]
pub struct Registry {
    containers_dir: PathBuf,
    home: Option<PathBuf>,
}

impl Registry {
    pub fn new(containers_dir: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            containers_dir: containers_dir.into(),
            home,
        }
    }

    /// Names of all definition directories, sorted
    pub fn names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.containers_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(NookError::ReadConfig {
                    path: self.containers_dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => warn!(
                    dir = %entry.path().display(),
                    "skipping definition directory with a non UTF-8 name"
                ),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load a single record by name without building the full registry
    pub fn load(&self, name: &str) -> Result<ContainerRecord> {
        let dir = self.containers_dir.join(name);
        if !dir.is_dir() {
            return Err(NookError::ContainerNotFound {
                name: name.to_string(),
                dir: self.containers_dir.clone(),
            });
        }
        ContainerRecord::load(name, &dir, self.home.as_deref())
    }

    /// Load every record, failing on the first malformed one
    pub fn load_all(&self) -> Result<Vec<ContainerRecord>> {
        self.names()?
            .iter()
            .map(|name| self.load(name))
            .collect()
    }

    /// Map project roots to container names.
    ///
    /// Two records claiming the same root is a configuration error.
    pub fn project_map(&self) -> Result<PathMap<String>> {
        Self::index(&self.load_all()?)
    }

    /// Build the project-root map from already loaded records
    pub fn index(records: &[ContainerRecord]) -> Result<PathMap<String>> {
        let mut map = PathMap::new();
        for record in records {
            if let Some(first) = map.get(&record.project_path) {
                return Err(NookError::DuplicateProject {
                    path: record.project_path.clone(),
                    first: String::clone(first),
                    second: record.name.clone(),
                });
            }
            map.insert(record.project_path.clone(), record.name.clone());
        }
        Ok(map)
    }

    /// Name of the container whose project root is nearest above `path`
    pub fn resolve_by_path(&self, path: &Path) -> Result<Option<String>> {
        let map = self.project_map()?;
        let found = map.nearest_match(path);
        match found {
            Some((root, name)) => {
                debug!(path = %path.display(), root = %root.display(), container = %name, "resolved container");
                Ok(Some(name.clone()))
            }
            None => {
                debug!(path = %path.display(), registered = map.len(), "no project root above path");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_record(root: &Path, name: &str, config: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), config).unwrap();
    }

    fn registry(temp: &TempDir) -> Registry {
        Registry::new(temp.path(), Some(PathBuf::from("/home/tester")))
    }

    #[test]
    fn test_missing_containers_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let registry = Registry::new(temp.path().join("nope"), None);
        assert!(registry.names().unwrap().is_empty());
        assert_eq!(registry.resolve_by_path(Path::new("/a/b")).unwrap(), None);
    }

    #[test]
    fn test_deepest_project_wins() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "outer", "project-path = \"/a\"\n");
        write_record(temp.path(), "inner", "project-path = \"/a/b\"\n");
        let registry = registry(&temp);

        assert_eq!(
            registry.resolve_by_path(Path::new("/a/b/c")).unwrap(),
            Some("inner".to_string())
        );
        assert_eq!(
            registry.resolve_by_path(Path::new("/a/x")).unwrap(),
            Some("outer".to_string())
        );
        assert_eq!(registry.resolve_by_path(Path::new("/elsewhere")).unwrap(), None);
    }

    #[test]
    fn test_names_skip_plain_files() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "b", "project-path = \"/b\"\n");
        write_record(temp.path(), "a", "project-path = \"/a\"\n");
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(registry(&temp).names().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_record_fails_resolution() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "good", "project-path = \"/good\"\n");
        write_record(temp.path(), "bad", "[mounts]\n");

        let err = registry(&temp)
            .resolve_by_path(Path::new("/good/src"))
            .unwrap_err();
        assert!(matches!(err, NookError::InvalidConfig { .. }));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_record_dir_without_config_fails() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();
        let err = registry(&temp).load_all().unwrap_err();
        assert!(matches!(err, NookError::ReadConfig { .. }));
    }

    #[test]
    fn test_duplicate_project_path_rejected() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "one", "project-path = \"/p\"\n");
        write_record(temp.path(), "two", "project-path = \"/p/\"\n");

        let err = registry(&temp).project_map().unwrap_err();
        match err {
            NookError::DuplicateProject { first, second, .. } => {
                assert_eq!(first, "one");
                assert_eq!(second, "two");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_by_name_skips_other_records() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "good", "project-path = \"~/good\"\n");
        write_record(temp.path(), "bad", "not toml at all [");

        let record = registry(&temp).load("good").unwrap();
        assert_eq!(record.project_path, PathBuf::from("/home/tester/good"));
    }

    #[test]
    fn test_load_unknown_name() {
        let temp = TempDir::new().unwrap();
        let err = registry(&temp).load("ghost").unwrap_err();
        assert!(matches!(err, NookError::ContainerNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_directory_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "web", "project-path = \"/web\"\n");
        // Some filesystems refuse such names; nothing to check there
        if fs::create_dir(temp.path().join(OsStr::from_bytes(b"bad\xff"))).is_err() {
            return;
        }

        assert_eq!(registry(&temp).names().unwrap(), vec!["web"]);
        assert_eq!(registry(&temp).load_all().unwrap().len(), 1);
    }
}
