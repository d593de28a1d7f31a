// Program Tests

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use crate::cancellation::CancellationToken;
    use crate::config::ProjectConfiguration;
    use crate::error::CheckerError;
    use crate::file_system::{FileSystem, MemoryFileSystem};
    use crate::program::*;
    use crate::testing::RuleTypeChecker;
    use crate::typecheck::TypeCheckerAdapter;
    use pretty_assertions::assert_eq;
    use ts::CompilerOptions;

    const A: &str = "/p/src/a.ts";
    const B: &str = "/p/src/b.ts";
    const C: &str = "/p/src/c.ts";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn project() -> MemoryFileSystem {
        MemoryFileSystem::with_files([
            ("/p/tsconfig.json", "{}"),
            (A, "import { b } from './b';\nexport const a = b;\n"),
            (B, "export const b = 1;\n"),
            (C, "export const c = 2;\n"),
        ])
    }

    fn state_for(fs: &MemoryFileSystem) -> ProgramState {
        let config =
            ProjectConfiguration::load(fs, "/p/tsconfig.json", &CompilerOptions::default()).unwrap();
        ProgramState::new(
            Arc::new(fs.clone()),
            config,
            CompilerOptions::default(),
            ModuleResolver::default(),
        )
    }

    fn adapter_for(checker: &Arc<RuleTypeChecker>) -> TypeCheckerAdapter {
        TypeCheckerAdapter::new(Box::new(Arc::clone(checker)), false)
    }

    mod import_scanning_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_find_every_reference_form_in_order() {
            let text = r#"/// <reference types="node" />
/// <reference path="./globals.d.ts" />
import { a } from './a';
import { again } from './a';
import './side-effect';
export * from "./reexport";
const lazy = import('./lazy');
const legacy = require('./legacy');
"#;

            let references = scan_imports(text);
            let found: Vec<(&str, ReferenceKind)> = references
                .iter()
                .map(|reference| (reference.specifier.as_str(), reference.kind))
                .collect();

            assert_eq!(
                found,
                vec![
                    ("node", ReferenceKind::TypeReference),
                    ("./globals.d.ts", ReferenceKind::Path),
                    ("./a", ReferenceKind::Module),
                    ("./side-effect", ReferenceKind::Module),
                    ("./reexport", ReferenceKind::Module),
                    ("./lazy", ReferenceKind::Module),
                    ("./legacy", ReferenceKind::Module),
                ]
            );
        }

        #[test]
        fn should_find_multiline_named_imports() {
            let references = scan_imports("import {\n  one,\n  two,\n} from '../shared';\n");
            assert_eq!(
                references,
                vec![ImportReference {
                    specifier: "../shared".to_string(),
                    kind: ReferenceKind::Module,
                }]
            );
        }
    }

    mod resolution_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        fn resolve(fs: &MemoryFileSystem, options: &CompilerOptions, specifier: &str) -> Option<String> {
            let reference = ImportReference {
                specifier: specifier.to_string(),
                kind: ReferenceKind::Module,
            };
            ModuleResolver::default().resolve(&reference, A, options, "/p", fs)
        }

        #[test]
        fn should_probe_extensions_and_index_files() {
            let fs = MemoryFileSystem::with_files([
                (B, ""),
                ("/p/src/dir/index.ts", ""),
                ("/p/src/c.ts", ""),
                ("/p/src/types.d.ts", ""),
            ]);
            let options = CompilerOptions::default();

            assert_eq!(resolve(&fs, &options, "./b").as_deref(), Some(B));
            assert_eq!(resolve(&fs, &options, "./dir").as_deref(), Some("/p/src/dir/index.ts"));
            assert_eq!(resolve(&fs, &options, "./c.js").as_deref(), Some("/p/src/c.ts"));
            assert_eq!(resolve(&fs, &options, "./types").as_deref(), Some("/p/src/types.d.ts"));
            assert_eq!(resolve(&fs, &options, "./missing"), None);
        }

        #[test]
        fn should_resolve_js_only_when_allowed() {
            let fs = MemoryFileSystem::with_files([("/p/src/legacy.js", "")]);

            assert_eq!(resolve(&fs, &CompilerOptions::default(), "./legacy"), None);

            let options = CompilerOptions {
                allow_js: Some(true),
                ..Default::default()
            };
            assert_eq!(resolve(&fs, &options, "./legacy").as_deref(), Some("/p/src/legacy.js"));
        }

        #[test]
        fn should_resolve_paths_and_base_url() {
            let fs = MemoryFileSystem::with_files([
                ("/p/src/app/util.ts", ""),
                ("/p/src/shared/x.ts", ""),
            ]);
            let options = CompilerOptions {
                base_url: Some("src".to_string()),
                paths: Some(
                    [("@app/*".to_string(), vec!["app/*".to_string()])]
                        .into_iter()
                        .collect(),
                ),
                ..Default::default()
            };

            assert_eq!(resolve(&fs, &options, "@app/util").as_deref(), Some("/p/src/app/util.ts"));
            assert_eq!(resolve(&fs, &options, "shared/x").as_deref(), Some("/p/src/shared/x.ts"));
        }

        #[test]
        fn should_resolve_packages_through_their_types_entry() {
            let fs = MemoryFileSystem::with_files([
                ("/p/node_modules/lib/package.json", r#"{ "types": "dist/index.d.ts" }"#),
                ("/p/node_modules/lib/dist/index.d.ts", ""),
                ("/p/node_modules/@types/plain/index.d.ts", ""),
            ]);
            let options = CompilerOptions::default();

            assert_eq!(
                resolve(&fs, &options, "lib").as_deref(),
                Some("/p/node_modules/lib/dist/index.d.ts")
            );
            assert_eq!(
                resolve(&fs, &options, "plain").as_deref(),
                Some("/p/node_modules/@types/plain/index.d.ts")
            );
        }

        #[test]
        fn should_resolve_type_references_against_type_roots() {
            let fs = MemoryFileSystem::with_files([
                ("/p/node_modules/@types/node/index.d.ts", ""),
                ("/p/typings/custom/index.d.ts", ""),
            ]);
            let reference = |name: &str| ImportReference {
                specifier: name.to_string(),
                kind: ReferenceKind::TypeReference,
            };
            let resolver = ModuleResolver::default();

            assert_eq!(
                resolver
                    .resolve(&reference("node"), A, &CompilerOptions::default(), "/p", &fs)
                    .as_deref(),
                Some("/p/node_modules/@types/node/index.d.ts")
            );

            let options = CompilerOptions {
                type_roots: Some(vec!["./typings".to_string()]),
                ..Default::default()
            };
            assert_eq!(
                resolver.resolve(&reference("custom"), A, &options, "/p", &fs).as_deref(),
                Some("/p/typings/custom/index.d.ts")
            );
            assert_eq!(resolver.resolve(&reference("node"), A, &options, "/p", &fs), None);
        }

        struct VirtualModules;

        impl ModuleNameResolver for VirtualModules {
            fn resolve_module_name(&self, request: &ResolutionRequest<'_>) -> Option<String> {
                request
                    .specifier
                    .strip_prefix("virtual:")
                    .map(|name| format!("/p/src/virtual/{}.ts", name))
            }
        }

        #[test]
        fn should_consult_overrides_before_defaults() {
            let fs = MemoryFileSystem::with_files([(B, "")]);
            let resolver = ModuleResolver::new(
                ResolutionOverrides::default().with_module_name_resolver(Arc::new(VirtualModules)),
            );
            let options = CompilerOptions::default();
            let module = |specifier: &str| ImportReference {
                specifier: specifier.to_string(),
                kind: ReferenceKind::Module,
            };

            assert_eq!(
                resolver.resolve(&module("virtual:store"), A, &options, "/p", &fs).as_deref(),
                Some("/p/src/virtual/store.ts")
            );
            assert_eq!(
                resolver.resolve(&module("./b"), A, &options, "/p", &fs).as_deref(),
                Some(B)
            );
        }
    }

    mod dependency_graph_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_track_transitive_dependents() {
            let mut graph = FileDependencyGraph::new();
            graph.set_dependencies("a", &strings(&["b"]));
            graph.set_dependencies("b", &strings(&["c"]));
            graph.set_dependencies("d", &strings(&["c", "d"]));

            let mut dependents: Vec<String> = graph.get_transitive_dependents("c").into_iter().collect();
            dependents.sort();
            assert_eq!(dependents, strings(&["a", "b", "d"]));
            assert!(graph.get_dependencies("d").contains("c"));
            assert!(!graph.get_dependencies("d").contains("d"));
        }

        #[test]
        fn should_replace_outgoing_edges() {
            let mut graph = FileDependencyGraph::new();
            graph.set_dependencies("a", &strings(&["b"]));
            graph.set_dependencies("a", &strings(&["c"]));

            assert!(graph.get_dependents("b").is_empty());
            assert!(graph.get_dependents("c").contains("a"));
        }

        #[test]
        fn should_keep_incoming_edges_of_removed_file() {
            let mut graph = FileDependencyGraph::new();
            graph.set_dependencies("a", &strings(&["b"]));
            graph.set_dependencies("b", &strings(&["c"]));
            graph.remove_file("b");

            assert!(graph.get_dependents("b").contains("a"));
            assert!(graph.get_dependents("c").is_empty());
        }
    }

    mod diff_tests {
        use super::*;
        use pretty_assertions::assert_eq;
        use crate::program::src::diff::PendingChanges;

        #[test]
        fn should_dedupe_and_keep_sets_disjoint() {
            let diff = IterationDiff::new(strings(&["a", "b", "a", "c"]), strings(&["c", "d", "d"]));

            assert_eq!(diff.updated_files(), strings(&["a", "b"]).as_slice());
            assert_eq!(diff.removed_files(), strings(&["c", "d"]).as_slice());
        }

        #[test]
        fn should_keep_last_change_of_a_file() {
            let mut pending = PendingChanges::default();
            pending.mark_updated("a");
            pending.mark_removed("a");
            pending.mark_updated("b");
            pending.mark_removed("c");
            pending.mark_updated("c");

            let diff = pending.take();
            assert_eq!(diff.updated_files(), strings(&["b", "c"]).as_slice());
            assert_eq!(diff.removed_files(), strings(&["a"]).as_slice());
            assert!(pending.take().is_empty());
        }

        #[test]
        fn should_restore_invariants_when_deserialized() {
            let diff: IterationDiff =
                serde_json::from_str(r#"{ "updatedFiles": ["a", "a", "b"], "removedFiles": ["b"] }"#).unwrap();
            assert_eq!(diff, IterationDiff::new(strings(&["a"]), strings(&["b"])));
        }
    }

    mod process_changes_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_report_every_file_on_first_run() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);

            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert_eq!(processed.diff.updated_files(), strings(&[A, B, C]).as_slice());
            assert!(processed.diff.removed_files().is_empty());
            assert_eq!(checker.take_checked_files(), strings(&[A, B, C]));
            assert_eq!(state.version(), 1);
            assert_eq!(state.snapshot().dependencies(A), strings(&[B]).as_slice());
        }

        #[test]
        fn should_be_idempotent_without_changes() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new().with_rule("2;", 2322, "Type mismatch."));
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);

            let first = state.process_changes(&adapter, &CancellationToken::new()).unwrap();
            checker.take_checked_files();
            let second = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert_eq!(second.results, first.results);
            assert_eq!(second.results.len(), 1);
            assert!(second.diff.is_empty());
            assert!(checker.take_checked_files().is_empty());
            assert_eq!(state.version(), 1);
        }

        #[test]
        fn should_recheck_dependents_of_changed_file() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            state.process_changes(&adapter, &CancellationToken::new()).unwrap();
            checker.take_checked_files();

            fs.write(B, "export const b = 2;\n");
            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert_eq!(processed.diff.updated_files(), strings(&[B]).as_slice());
            assert_eq!(checker.take_checked_files(), strings(&[A, B]));
            assert_eq!(state.version(), 2);
            assert_eq!(state.record(B).unwrap().version(), 2);
            assert_eq!(state.record(A).unwrap().version(), 1);
        }

        #[test]
        fn should_forget_removed_files() {
            let fs = project();
            fs.write(C, "export const c: string = 2;\n");
            let checker = Arc::new(RuleTypeChecker::new().with_rule("2;", 2322, "Type mismatch."));
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            let first = state.process_changes(&adapter, &CancellationToken::new()).unwrap();
            assert_eq!(first.results.len(), 1);
            checker.take_checked_files();

            fs.remove(C);
            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert!(processed.diff.updated_files().is_empty());
            assert_eq!(processed.diff.removed_files(), strings(&[C]).as_slice());
            assert!(processed.results.is_empty());
            assert!(state.record(C).is_none());
            assert!(checker.take_checked_files().is_empty());
        }

        #[test]
        fn should_recheck_importers_of_removed_file() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new().with_import_checks());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            assert!(state.process_changes(&adapter, &CancellationToken::new()).unwrap().results.is_empty());
            checker.take_checked_files();

            fs.remove(B);
            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert_eq!(checker.take_checked_files(), strings(&[A]));
            assert_eq!(processed.results.len(), 1);
            assert_eq!(processed.results[0].code, 2307);
            assert_eq!(processed.results[0].file.as_deref(), Some(A));
            assert!(state.snapshot().dependencies(A).is_empty());
        }

        #[test]
        fn should_recheck_importers_when_missing_module_appears() {
            let fs = project();
            fs.write(A, "import { d } from './d';\nexport const a = d;\n");
            let checker = Arc::new(RuleTypeChecker::new().with_import_checks());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            assert_eq!(state.process_changes(&adapter, &CancellationToken::new()).unwrap().results.len(), 1);
            checker.take_checked_files();

            fs.write("/p/src/d.ts", "export const d = 4;\n");
            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert_eq!(processed.diff.updated_files(), strings(&["/p/src/d.ts"]).as_slice());
            assert_eq!(checker.take_checked_files(), strings(&[A, "/p/src/d.ts"]));
            assert!(processed.results.is_empty());
        }

        #[test]
        fn should_recheck_everything_when_configuration_changes() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            state.process_changes(&adapter, &CancellationToken::new()).unwrap();
            checker.take_checked_files();

            fs.write("/p/tsconfig.json", r#"{ "compilerOptions": { "strict": true } }"#);
            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert!(processed.diff.is_empty());
            assert_eq!(checker.take_checked_files(), strings(&[A, B, C]));
            assert_eq!(state.config().compiler_options.strict, Some(true));
            assert_eq!(state.version(), 2);
        }

        #[test]
        fn should_fail_with_configuration_error_when_config_breaks() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            fs.write("/p/tsconfig.json", "{ \"compilerOptions\": ");
            let result = state.process_changes(&adapter, &CancellationToken::new());

            assert!(matches!(result, Err(CheckerError::Configuration(_))));
        }

        #[test]
        fn should_keep_changes_pending_after_analysis_failure() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            fs.write(B, "export const b = 3;\n");
            checker.fail_on(Some(A));
            let failed = state.process_changes(&adapter, &CancellationToken::new());
            assert!(matches!(failed, Err(CheckerError::AnalysisFailure(_))));

            checker.fail_on(None);
            checker.take_checked_files();
            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert_eq!(processed.diff.updated_files(), strings(&[B]).as_slice());
            assert_eq!(checker.take_checked_files(), strings(&[A, B]));
        }

        #[test]
        fn should_keep_changes_pending_after_cancellation() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            let token = CancellationToken::new();
            checker.cancel_after(1, token.clone());

            let cancelled = state.process_changes(&adapter, &token);

            assert!(matches!(cancelled, Err(CheckerError::Cancelled)));
            assert_eq!(checker.take_checked_files(), strings(&[A]));

            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert_eq!(processed.diff.updated_files(), strings(&[A, B, C]).as_slice());
            assert_eq!(checker.take_checked_files(), strings(&[A, B, C]));
        }

        #[test]
        fn should_not_check_anything_with_cancelled_token() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let adapter = adapter_for(&checker);
            let mut state = state_for(&fs);
            let token = CancellationToken::new();
            token.request_cancellation();

            let cancelled = state.process_changes(&adapter, &token);

            assert!(matches!(cancelled, Err(CheckerError::Cancelled)));
            assert!(checker.take_checked_files().is_empty());
        }

        #[test]
        fn should_treat_unreadable_root_as_removed() {
            let fs = project();
            let unreadable = Arc::new(UnreadableFiles::new(fs.clone()));
            let config =
                ProjectConfiguration::load(&fs, "/p/tsconfig.json", &CompilerOptions::default()).unwrap();
            let mut state = ProgramState::new(
                unreadable.clone(),
                config,
                CompilerOptions::default(),
                ModuleResolver::default(),
            );
            let checker = Arc::new(RuleTypeChecker::new());
            let adapter = adapter_for(&checker);
            state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            unreadable.deny(C);
            let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

            assert!(state.record(C).is_none());
            assert_eq!(processed.diff.removed_files(), strings(&[C]).as_slice());
            assert!(processed.diff.updated_files().is_empty());
        }

        /// Lists every file of the wrapped file system but refuses to read
        /// the denied ones.
        struct UnreadableFiles {
            inner: MemoryFileSystem,
            denied: Mutex<Vec<String>>,
        }

        impl UnreadableFiles {
            fn new(inner: MemoryFileSystem) -> Self {
                Self { inner, denied: Mutex::new(Vec::new()) }
            }

            fn deny(&self, path: &str) {
                self.denied.lock().unwrap().push(path.to_string());
            }
        }

        impl FileSystem for UnreadableFiles {
            fn exists(&self, path: &str) -> bool {
                self.inner.exists(path)
            }

            fn read_file(&self, path: &str) -> io::Result<String> {
                if self.denied.lock().unwrap().iter().any(|denied| denied == path) {
                    return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
                }
                self.inner.read_file(path)
            }

            fn list_files(&self, root: &str, skip_dir: &dyn Fn(&str) -> bool) -> io::Result<Vec<String>> {
                self.inner.list_files(root, skip_dir)
            }
        }

        #[test]
        fn should_map_offsets_to_lines_and_columns() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let mut state = state_for(&fs);
            state.process_changes(&adapter_for(&checker), &CancellationToken::new()).unwrap();

            let record = state.record(A).unwrap();
            let offset = record.text().find("export").unwrap();
            assert_eq!(record.line_and_column(offset), (2, 1));
            assert_eq!(record.line_and_column(0), (1, 1));
            assert_eq!(record.line_and_column(usize::MAX), (3, 1));
        }

        #[test]
        fn should_map_lines_and_columns_back_to_offsets() {
            let fs = project();
            let checker = Arc::new(RuleTypeChecker::new());
            let mut state = state_for(&fs);
            state.process_changes(&adapter_for(&checker), &CancellationToken::new()).unwrap();

            let record = state.record(A).unwrap();
            let offset = record.text().find("export").unwrap();
            assert_eq!(record.offset_of(2, 1), offset);
            assert_eq!(record.line_and_column(record.offset_of(2, 3)), (2, 3));
            assert_eq!(record.offset_of(99, 1), record.text().len());
        }
    }
}
