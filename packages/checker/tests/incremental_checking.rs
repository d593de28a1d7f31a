use std::fs;
use std::path::Path;
use std::sync::Arc;

use checker::file_system::{normalize_path, NativeFileSystem};
use checker::lint::LintSeverity;
use checker::testing::{RuleLinter, RuleTypeChecker};
use checker::{CheckerOptions, CheckingService, IssueOrigin};
use pretty_assertions::assert_eq;

struct Project {
    _dir: tempfile::TempDir,
    root: String,
}

impl Project {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = normalize_path(&dir.path().to_string_lossy());
        let project = Self { _dir: dir, root };
        for (path, content) in files {
            project.write(path, content);
        }
        project
    }

    fn path(&self, relative: &str) -> String {
        format!("{}/{}", self.root, relative)
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = Path::new(&path).parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn remove(&self, relative: &str) {
        fs::remove_file(self.path(relative)).unwrap();
    }

    fn service(&self, checker: Arc<RuleTypeChecker>, linter: Option<Arc<RuleLinter>>) -> CheckingService {
        let options = CheckerOptions::new(self.path("tsconfig.json")).with_eslint(linter.is_some());
        CheckingService::new(
            options,
            Arc::new(NativeFileSystem::new()),
            Box::new(checker),
            linter.map(|linter| Box::new(linter) as Box<dyn checker::lint::LintCapability>),
        )
        .unwrap()
    }
}

fn summary(issues: &[checker::Issue]) -> Vec<(String, String)> {
    issues
        .iter()
        .map(|issue| (issue.file_path.clone().unwrap_or_default(), issue.code.clone()))
        .collect()
}

#[test]
fn should_follow_a_watch_session_on_disk() {
    let project = Project::new(&[
        (
            "tsconfig.json",
            r#"{
                // only sources are checked
                "include": ["src"],
            }"#,
        ),
        ("src/a.ts", "import { b } from './b';\nexport const a = b;\n"),
        ("src/b.ts", "var legacy = 1;\nexport const b = legacy;\n"),
        ("scripts/build.ts", "var ignored = true;\n"),
    ]);
    let a = project.path("src/a.ts");
    let b = project.path("src/b.ts");

    let checker = Arc::new(RuleTypeChecker::new().with_import_checks());
    let linter = Arc::new(
        RuleLinter::new(Arc::new(NativeFileSystem::new()))
            .with_rule("var ", "no-var", LintSeverity::Error, "Unexpected var."),
    );
    let mut service = project.service(Arc::clone(&checker), Some(Arc::clone(&linter)));

    let first = service.run_iteration().unwrap();
    assert_eq!(first.diff.updated_files(), [a.clone(), b.clone()].as_slice());
    assert_eq!(summary(&first.issues), vec![(b.clone(), "no-var".to_string())]);
    assert_eq!(first.issues[0].origin, IssueOrigin::EsLint);

    project.write("src/b.ts", "export const c = 1;\n");
    let second = service.run_iteration().unwrap();
    assert_eq!(second.diff.updated_files(), [b.clone()].as_slice());
    assert_eq!(summary(&second.issues), vec![(a.clone(), "TS2305".to_string())]);
    assert_eq!(checker.take_checked_files(), vec![a.clone(), b.clone(), a.clone(), b.clone()]);

    project.remove("src/b.ts");
    let third = service.run_iteration().unwrap();
    assert!(third.diff.updated_files().is_empty());
    assert_eq!(third.diff.removed_files(), [b.clone()].as_slice());
    assert_eq!(summary(&third.issues), vec![(a.clone(), "TS2307".to_string())]);

    project.write("src/b.ts", "export const b = 2;\n");
    let fourth = service.run_iteration().unwrap();
    assert_eq!(fourth.diff.updated_files(), [b.clone()].as_slice());
    assert!(fourth.issues.is_empty());
    assert_eq!(fourth.iteration, 4);

    let unchanged = service.run_iteration().unwrap();
    assert!(unchanged.diff.is_empty());
    assert!(unchanged.issues.is_empty());
    assert_eq!(linter.take_linted_files(), vec![a.clone(), b.clone(), b.clone(), b]);
}

#[test]
fn should_clear_issues_of_deleted_standalone_file() {
    let project = Project::new(&[
        ("tsconfig.json", "{}"),
        ("a.ts", "export const a = 1;\n"),
        ("b.ts", "var b: string = 1;\n"),
    ]);
    let b = project.path("b.ts");

    let checker = Arc::new(RuleTypeChecker::new().with_rule(": string = 1;", 2322, "Type mismatch."));
    let linter = Arc::new(
        RuleLinter::new(Arc::new(NativeFileSystem::new()))
            .with_rule("var ", "no-var", LintSeverity::Error, "Unexpected var."),
    );
    let mut service = project.service(checker, Some(linter));

    let first = service.run_iteration().unwrap();
    assert_eq!(
        summary(&first.issues),
        vec![(b.clone(), "no-var".to_string()), (b.clone(), "TS2322".to_string())]
    );
    let origins: Vec<IssueOrigin> = first.issues.iter().map(|issue| issue.origin).collect();
    assert_eq!(origins, vec![IssueOrigin::EsLint, IssueOrigin::TypeScript]);

    project.remove("b.ts");
    let second = service.run_iteration().unwrap();
    assert!(second.diff.updated_files().is_empty());
    assert_eq!(second.diff.removed_files(), [b].as_slice());
    assert!(second.issues.is_empty());
}

#[test]
fn should_pick_up_configuration_changes() {
    let project = Project::new(&[
        ("tsconfig.json", r#"{ "include": ["src"] }"#),
        ("src/a.ts", "export const a = 1;\n"),
        ("lib/extra.ts", "export const extra: string = 1;\n"),
    ]);
    let checker = Arc::new(RuleTypeChecker::new().with_rule(": string = 1;", 2322, "Type mismatch."));
    let mut service = project.service(Arc::clone(&checker), None);

    assert!(service.run_iteration().unwrap().issues.is_empty());

    project.write("tsconfig.json", r#"{ "include": ["src", "lib"] }"#);
    let report = service.run_iteration().unwrap();

    assert_eq!(report.diff.updated_files(), [project.path("lib/extra.ts")].as_slice());
    assert_eq!(summary(&report.issues), vec![(project.path("lib/extra.ts"), "TS2322".to_string())]);
}

#[test]
fn should_fail_session_when_configuration_is_removed() {
    let project = Project::new(&[
        ("tsconfig.json", "{}"),
        ("a.ts", "export const a = 1;\n"),
    ]);
    let mut service = project.service(Arc::new(RuleTypeChecker::new()), None);
    service.run_iteration().unwrap();

    project.remove("tsconfig.json");

    let error = service.run_iteration().unwrap_err();
    assert_eq!(error.kind(), checker::ErrorKind::Configuration);
    assert_eq!(service.state(), checker::ServiceState::Failed);
}
