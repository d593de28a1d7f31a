use std::fs;
use std::io;
use std::path::Path;

use super::types::FileSystem;
use super::util::normalize_path;

/// File system backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileSystem;

impl NativeFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn walk(
        &self,
        dir: &Path,
        skip_dir: &dyn Fn(&str) -> bool,
        files: &mut Vec<String>,
    ) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let path_str = normalize_path(&path.to_string_lossy());
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                if !skip_dir(&path_str) {
                    self.walk(&path, skip_dir, files)?;
                }
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                files.push(path_str);
            }
        }
        Ok(())
    }
}

impl FileSystem for NativeFileSystem {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn read_file(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn list_files(&self, root: &str, skip_dir: &dyn Fn(&str) -> bool) -> io::Result<Vec<String>> {
        let mut files = Vec::new();
        self.walk(Path::new(root), skip_dir, &mut files)?;
        files.sort();
        Ok(files)
    }
}
