// Type Checker Adapter Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::cancellation::CancellationToken;
    use crate::config::ProjectConfiguration;
    use crate::error::CheckerError;
    use crate::file_system::MemoryFileSystem;
    use crate::program::{ModuleResolver, ProgramSnapshot, ProgramState};
    use crate::testing::RuleTypeChecker;
    use crate::typecheck::*;
    use pretty_assertions::assert_eq;
    use ts::{CompilerOptions, Diagnostic, DiagnosticCategory};

    const A: &str = "/p/a.ts";

    fn state_with(source: &str) -> ProgramState {
        let fs = MemoryFileSystem::with_files([("/p/tsconfig.json", "{}"), (A, source)]);
        let config =
            ProjectConfiguration::load(&fs, "/p/tsconfig.json", &CompilerOptions::default()).unwrap();
        ProgramState::new(Arc::new(fs), config, CompilerOptions::default(), ModuleResolver::default())
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<i32> {
        diagnostics.iter().map(|diagnostic| diagnostic.code).collect()
    }

    /// Reports one unattributed diagnostic per file.
    struct Unattributed;

    impl TypeCheckCapability for Unattributed {
        fn semantic_diagnostics(&self, _: &ProgramSnapshot<'_>, _: &str) -> anyhow::Result<Vec<Diagnostic>> {
            Ok(vec![Diagnostic::warning(6133, "'x' is declared but never used.")])
        }

        fn syntactic_diagnostics(&self, _: &ProgramSnapshot<'_>, _: &str) -> anyhow::Result<Vec<Diagnostic>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn should_report_syntactic_before_semantic_when_enabled() {
        let checker = RuleTypeChecker::new().with_rule("BAD", 2304, "Cannot find name 'BAD'.");
        let adapter = TypeCheckerAdapter::new(Box::new(checker), true);
        let mut state = state_with("function f() {\n  BAD;\n");

        let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

        assert_eq!(codes(&processed.results), vec![1005, 2304]);
    }

    #[test]
    fn should_skip_syntactic_diagnostics_by_default() {
        let checker = RuleTypeChecker::new().with_rule("BAD", 2304, "Cannot find name 'BAD'.");
        let adapter = TypeCheckerAdapter::new(Box::new(checker), false);
        let mut state = state_with("function f() {\n  BAD;\n");

        let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

        assert_eq!(codes(&processed.results), vec![2304]);
    }

    #[test]
    fn should_attribute_diagnostics_to_checked_file() {
        let adapter = TypeCheckerAdapter::new(Box::new(Unattributed), false);
        let mut state = state_with("let x = 1;\n");

        let processed = state.process_changes(&adapter, &CancellationToken::new()).unwrap();

        assert_eq!(processed.results.len(), 1);
        assert_eq!(processed.results[0].file.as_deref(), Some(A));
        assert_eq!(processed.results[0].category, DiagnosticCategory::Warning);
    }

    #[test]
    fn should_put_global_diagnostics_first() {
        let checker = RuleTypeChecker::new()
            .with_rule("any", 7005, "Variable implicitly has an 'any' type.")
            .with_global_diagnostic(Diagnostic::error(5023, "Unknown compiler option 'foo'."));
        let adapter = TypeCheckerAdapter::new(Box::new(checker), false);
        let mut state = state_with("let value: any;\n");

        state.process_changes(&adapter, &CancellationToken::new()).unwrap();
        let diagnostics = adapter.diagnostics(&state);

        assert_eq!(codes(&diagnostics), vec![5023, 7005]);
        assert_eq!(diagnostics[0].file, None);
    }

    #[test]
    fn should_turn_capability_errors_into_analysis_failures() {
        let checker = RuleTypeChecker::new();
        checker.fail_on(Some(A));
        let adapter = TypeCheckerAdapter::new(Box::new(checker), false);
        let mut state = state_with("let x = 1;\n");

        let result = state.process_changes(&adapter, &CancellationToken::new());

        match result {
            Err(CheckerError::AnalysisFailure(error)) => {
                assert!(format!("{:#}", error).contains("type checker crashed on /p/a.ts"));
            }
            other => panic!("expected an analysis failure, got {:?}", other),
        }
    }
}
