// Dependency Tracking
//
// Tracks which files import which, so that a change to one file re-checks
// exactly the files whose dependency closure contains it.

use std::collections::{HashMap, HashSet};

/// File dependency graph.
#[derive(Debug, Default)]
pub struct FileDependencyGraph {
    /// Forward dependencies: file -> files it depends on.
    forward: HashMap<String, HashSet<String>>,
    /// Reverse dependencies: file -> files that depend on it.
    reverse: HashMap<String, HashSet<String>>,
}

impl FileDependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the outgoing edges of `file`.
    pub fn set_dependencies(&mut self, file: &str, dependencies: &[String]) {
        self.remove_outgoing(file);
        for dependency in dependencies {
            if dependency == file {
                continue;
            }
            self.forward
                .entry(file.to_string())
                .or_default()
                .insert(dependency.clone());
            self.reverse
                .entry(dependency.clone())
                .or_default()
                .insert(file.to_string());
        }
    }

    /// Forget the outgoing edges of `file`. Incoming edges stay: dependents
    /// still import the path, and will pick it up again if it reappears.
    pub fn remove_file(&mut self, file: &str) {
        self.remove_outgoing(file);
    }

    fn remove_outgoing(&mut self, file: &str) {
        if let Some(old) = self.forward.remove(file) {
            for dependency in old {
                if let Some(dependents) = self.reverse.get_mut(&dependency) {
                    dependents.remove(file);
                    if dependents.is_empty() {
                        self.reverse.remove(&dependency);
                    }
                }
            }
        }
    }

    pub fn get_dependencies(&self, file: &str) -> HashSet<String> {
        self.forward.get(file).cloned().unwrap_or_default()
    }

    pub fn get_dependents(&self, file: &str) -> HashSet<String> {
        self.reverse.get(file).cloned().unwrap_or_default()
    }

    /// Get transitive dependents (all files that depend on this file, recursively).
    pub fn get_transitive_dependents(&self, file: &str) -> HashSet<String> {
        let mut visited = HashSet::new();
        let mut queue = vec![file.to_string()];

        while let Some(current) = queue.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(dependents) = self.reverse.get(&current) {
                for dependent in dependents {
                    if !visited.contains(dependent) {
                        queue.push(dependent.clone());
                    }
                }
            }
        }

        visited.remove(file);
        visited
    }
}
