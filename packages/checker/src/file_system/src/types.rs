use std::io;

/// An abstraction over the read-only aspects of a file-system.
///
/// All paths are absolute and use `/` separators (see [`normalize_path`]).
///
/// [`normalize_path`]: super::util::normalize_path
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    fn read_file(&self, path: &str) -> io::Result<String>;

    /// Every file below `root`, recursively, in sorted order. Directories for
    /// which `skip_dir` returns true are not descended into.
    fn list_files(&self, root: &str, skip_dir: &dyn Fn(&str) -> bool) -> io::Result<Vec<String>>;
}
