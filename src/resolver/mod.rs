//! Nearest-ancestor lookup over path-keyed mappings
//!
//! A [`PathMap`] backs both the registry's project-root lookup and a single
//! container's mount lookup. Queries walk from the given path up through its
//! parents, so deeper keys always win over shallower ones.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A mapping from absolute directory paths to values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMap<V> {
    entries: BTreeMap<PathBuf, V>,
}

impl<V> PathMap<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert a value, returning the one previously stored under `path`
    pub fn insert(&mut self, path: impl Into<PathBuf>, value: V) -> Option<V> {
        self.entries.insert(path.into(), value)
    }

    pub fn get(&self, path: &Path) -> Option<&V> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PathBuf, V> {
        self.entries.iter()
    }

    /// Find the deepest key that is `path` itself or one of its ancestors.
    ///
    /// Returns the matched key together with its value, or `None` once the
    /// walk passes the filesystem root without a hit.
    pub fn nearest_match(&self, path: &Path) -> Option<(&Path, &V)> {
        if self.entries.is_empty() {
            return None;
        }

        path.ancestors().find_map(|candidate| {
            self.entries
                .get_key_value(candidate)
                .map(|(key, value)| (key.as_path(), value))
        })
    }
}

impl<V> Default for PathMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Into<PathBuf>, V> FromIterator<(P, V)> for PathMap<V> {
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        let mut map = PathMap::new();
        for (path, value) in iter {
            map.insert(path, value);
        }
        map
    }
}

impl<'a, V> IntoIterator for &'a PathMap<V> {
    type Item = (&'a PathBuf, &'a V);
    type IntoIter = btree_map::Iter<'a, PathBuf, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
