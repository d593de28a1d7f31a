use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::types::FileSystem;
use super::util::normalize_path;

/// In-memory file system. Clones share the same tree, so a test can keep a
/// handle and edit files between iterations.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fs = Self::new();
        for (path, content) in files {
            fs.write(path, content);
        }
        fs
    }

    fn tree(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn write(&self, path: &str, content: &str) {
        self.tree().insert(normalize_path(path), content.to_string());
    }

    /// Returns whether the file existed.
    pub fn remove(&self, path: &str) -> bool {
        self.tree().remove(&normalize_path(path)).is_some()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &str) -> bool {
        let path = normalize_path(path);
        let dir_prefix = format!("{}/", path.trim_end_matches('/'));
        let tree = self.tree();
        tree.contains_key(&path) || tree.keys().any(|key| key.starts_with(&dir_prefix))
    }

    fn read_file(&self, path: &str) -> io::Result<String> {
        let path = normalize_path(path);
        self.tree().get(&path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("File not found: {}", path))
        })
    }

    fn list_files(&self, root: &str, skip_dir: &dyn Fn(&str) -> bool) -> io::Result<Vec<String>> {
        let root = normalize_path(root);
        let prefix = format!("{}/", root.trim_end_matches('/'));
        let tree = self.tree();

        let files = tree
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .filter(|key| {
                // Every intermediate directory between root and the file.
                let relative = &key[prefix.len()..];
                let mut dir = prefix.trim_end_matches('/').to_string();
                let mut segments: Vec<&str> = relative.split('/').collect();
                segments.pop();
                segments.into_iter().all(|segment| {
                    dir = format!("{}/{}", dir, segment);
                    !skip_dir(&dir)
                })
            })
            .cloned()
            .collect();
        Ok(files)
    }
}
