// Incremental Program State
//
// Owns the file records, the dependency graph and the snapshot version.
// `process_changes` folds everything that happened on disk since the last
// call into the state and re-checks only the files the changes can affect.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use ts::{CompilerOptions, Diagnostic};

use super::dependency_graph::FileDependencyGraph;
use super::diff::{IterationDiff, PendingChanges};
use super::imports::scan_imports;
use super::record::FileRecord;
use super::resolution::ModuleResolver;
use super::snapshot::ProgramSnapshot;
use crate::cancellation::CancellationToken;
use crate::config::ProjectConfiguration;
use crate::error::{CheckerError, Result};
use crate::file_system::{content_fingerprint, FileSystem};
use crate::typecheck::TypeCheckerAdapter;

/// Outcome of one successful `process_changes` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedChanges {
    /// Every diagnostic of the program, not only those of re-checked files.
    pub results: Vec<Diagnostic>,
    pub diff: IterationDiff,
}

/// What `refresh_records` observed. Updated files are in discovery order,
/// removed files in record order.
#[derive(Debug, Default)]
struct RecordRefresh {
    updated: Vec<String>,
    removed: Vec<String>,
    added_files: bool,
}

pub struct ProgramState {
    fs: Arc<dyn FileSystem>,
    config: ProjectConfiguration,
    /// Host overrides re-applied when the configuration is reloaded.
    overrides: CompilerOptions,
    resolver: ModuleResolver,
    records: IndexMap<String, FileRecord>,
    graph: FileDependencyGraph,
    global_diagnostics: Vec<Diagnostic>,
    /// Global diagnostics are stale.
    needs_global_check: bool,
    pending: PendingChanges,
    version: u64,
}

impl ProgramState {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        config: ProjectConfiguration,
        overrides: CompilerOptions,
        resolver: ModuleResolver,
    ) -> Self {
        Self {
            fs,
            config,
            overrides,
            resolver,
            records: IndexMap::new(),
            graph: FileDependencyGraph::new(),
            global_diagnostics: Vec::new(),
            needs_global_check: true,
            pending: PendingChanges::default(),
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config(&self) -> &ProjectConfiguration {
        &self.config
    }

    pub fn snapshot(&self) -> ProgramSnapshot<'_> {
        ProgramSnapshot {
            version: self.version,
            config: &self.config,
            records: &self.records,
        }
    }

    /// Records in discovery order.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    pub fn record(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path)
    }

    pub fn global_diagnostics(&self) -> &[Diagnostic] {
        &self.global_diagnostics
    }

    /// Bring the state up to date with the file system and re-check every
    /// affected file.
    ///
    /// A configuration that can no longer be read is fatal. An analyzer
    /// failure or a cancellation loses nothing: the observed changes stay
    /// pending and the unchecked files are retried on the next call.
    /// `token` is polled before the global check and before every file.
    pub fn process_changes(
        &mut self,
        adapter: &TypeCheckerAdapter,
        token: &CancellationToken,
    ) -> Result<ProcessedChanges> {
        let config_changed = self.reload_configuration_if_changed()?;

        let roots = self.config.root_files(self.fs.as_ref())?;
        let refresh = self.refresh_records(&roots);
        let changed = config_changed || !refresh.updated.is_empty() || !refresh.removed.is_empty();

        if changed {
            self.version += 1;
            self.needs_global_check = true;
            tracing::debug!(
                version = self.version,
                updated = refresh.updated.len(),
                removed = refresh.removed.len(),
                "program changed"
            );
        }

        for path in &refresh.updated {
            self.rescan_imports(path);
        }
        self.mark_affected(&refresh.updated, &refresh.removed, config_changed);
        if config_changed || refresh.added_files || !refresh.removed.is_empty() {
            self.reresolve_all(&refresh.updated);
        }

        self.check_pending_files(adapter, token)?;

        let diff = self.pending.take();
        Ok(ProcessedChanges {
            results: adapter.diagnostics(self),
            diff,
        })
    }

    /// Returns whether the configuration was reloaded.
    fn reload_configuration_if_changed(&mut self) -> Result<bool> {
        if !self.config.has_changed(self.fs.as_ref()) {
            return Ok(false);
        }

        let reloaded = ProjectConfiguration::load(
            self.fs.as_ref(),
            &self.config.config_path,
            &self.overrides,
        )
        .map_err(|error| {
            tracing::error!(config = %self.config.config_path, %error, "failed to reload project configuration");
            CheckerError::Configuration(error)
        })?;

        tracing::info!(config = %reloaded.config_path, "project configuration changed, re-checking all files");
        self.config = reloaded;
        Ok(true)
    }

    /// Read every root file whose content changed, create records for new
    /// files and forget the files that disappeared. A root that cannot be
    /// read counts as gone.
    fn refresh_records(&mut self, roots: &[String]) -> RecordRefresh {
        let next_version = self.version + 1;
        let mut refresh = RecordRefresh::default();
        let mut present: HashSet<&str> = HashSet::new();

        for path in roots {
            let text = match self.fs.read_file(path) {
                Ok(text) => text,
                Err(error) => {
                    tracing::warn!(file = %path, %error, "failed to read source file");
                    continue;
                }
            };
            present.insert(path.as_str());
            let fingerprint = content_fingerprint(&text);

            match self.records.get_mut(path) {
                Some(record) if record.fingerprint() == fingerprint => continue,
                Some(record) => {
                    *record = FileRecord::new(path.clone(), text, fingerprint, next_version);
                }
                None => {
                    self.records
                        .insert(path.clone(), FileRecord::new(path.clone(), text, fingerprint, next_version));
                    refresh.added_files = true;
                }
            }
            self.pending.mark_updated(path);
            refresh.updated.push(path.clone());
        }

        refresh.removed = self
            .records
            .keys()
            .filter(|path| !present.contains(path.as_str()))
            .cloned()
            .collect();
        for path in &refresh.removed {
            self.records.shift_remove(path);
            self.graph.remove_file(path);
            self.pending.mark_removed(path);
        }

        refresh
    }

    fn rescan_imports(&mut self, path: &str) {
        let Some(record) = self.records.get_mut(path) else {
            return;
        };
        record.imports = scan_imports(record.text());
        let resolved = self.resolve_imports_of(path);
        self.apply_resolution(path, resolved);
    }

    /// Resolve the imports of every record again. A file whose resolution
    /// changes must be re-checked even though its content did not change.
    fn reresolve_all(&mut self, already_resolved: &[String]) {
        let skip: HashSet<&String> = already_resolved.iter().collect();
        let paths: Vec<String> = self
            .records
            .keys()
            .filter(|path| !skip.contains(path))
            .cloned()
            .collect();

        for path in paths {
            let resolved = self.resolve_imports_of(&path);
            let changed = self
                .records
                .get(&path)
                .is_some_and(|record| record.resolved_imports != resolved);
            if changed {
                tracing::debug!(file = %path, "import resolution changed");
                self.apply_resolution(&path, resolved);
                let dependents = self.graph.get_transitive_dependents(&path);
                for affected in dependents.iter().chain(std::iter::once(&path)) {
                    if let Some(record) = self.records.get_mut(affected) {
                        record.needs_check = true;
                    }
                }
            }
        }
    }

    fn resolve_imports_of(&self, path: &str) -> Vec<String> {
        let Some(record) = self.records.get(path) else {
            return Vec::new();
        };
        let mut resolved: IndexSet<String> = IndexSet::new();
        for reference in &record.imports {
            if let Some(target) = self.resolver.resolve(
                reference,
                path,
                &self.config.compiler_options,
                &self.config.base_dir,
                self.fs.as_ref(),
            ) {
                if target != path {
                    resolved.insert(target);
                }
            }
        }
        resolved.into_iter().collect()
    }

    fn apply_resolution(&mut self, path: &str, resolved: Vec<String>) {
        self.graph.set_dependencies(path, &resolved);
        if let Some(record) = self.records.get_mut(path) {
            record.resolved_imports = resolved;
        }
    }

    fn mark_affected(&mut self, updated: &[String], removed: &[String], everything: bool) {
        if everything {
            for record in self.records.values_mut() {
                record.needs_check = true;
            }
            return;
        }

        let mut affected: HashSet<String> = updated.iter().cloned().collect();
        for path in updated.iter().chain(removed) {
            affected.extend(self.graph.get_transitive_dependents(path));
        }

        for path in affected {
            if let Some(record) = self.records.get_mut(&path) {
                record.needs_check = true;
            }
        }
    }

    fn check_pending_files(&mut self, adapter: &TypeCheckerAdapter, token: &CancellationToken) -> Result<()> {
        let snapshot = self.snapshot();

        let global = if self.needs_global_check {
            token.throw_if_cancellation_requested()?;
            Some(adapter.global_diagnostics(&snapshot)?)
        } else {
            None
        };

        let mut checked: Vec<(String, Vec<Diagnostic>)> = Vec::new();
        for record in self.records.values().filter(|record| record.needs_check) {
            if let Err(error) = token.throw_if_cancellation_requested() {
                tracing::debug!(checked = checked.len(), "type check cancelled");
                return Err(error);
            }
            let diagnostics = adapter.file_diagnostics(&snapshot, record.path())?;
            checked.push((record.path().to_string(), diagnostics));
        }

        tracing::debug!(checked = checked.len(), total = self.records.len(), "type checked files");

        if let Some(global) = global {
            self.global_diagnostics = global;
            self.needs_global_check = false;
        }
        for (path, diagnostics) in checked {
            if let Some(record) = self.records.get_mut(&path) {
                record.diagnostics = diagnostics;
                record.needs_check = false;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ProgramState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramState")
            .field("config", &self.config.config_path)
            .field("version", &self.version)
            .field("files", &self.records.len())
            .finish()
    }
}
