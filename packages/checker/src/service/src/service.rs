use std::sync::Arc;

use super::report::IterationReport;
use super::state::{IterationPhase, ServiceState};
use crate::cancellation::CancellationToken;
use crate::config::{CheckerOptions, ProjectConfiguration};
use crate::error::{CheckerError, ConfigurationError, Result};
use crate::file_system::FileSystem;
use crate::issue::{issues_from_lint_reports, issues_from_ts_diagnostics, order_issues, Issue};
use crate::lint::{is_declaration_file, LintAdapter, LintCapability};
use crate::program::{IterationDiff, ModuleResolver, ProgramState, ResolutionOverrides};
use crate::typecheck::{TypeCheckCapability, TypeCheckerAdapter};

/// The iteration currently open.
#[derive(Debug)]
struct Iteration {
    id: u64,
    token: CancellationToken,
    /// Set by type checking, consumed by linting.
    diff: Option<IterationDiff>,
}

/// Incremental checking service.
///
/// One instance lives for a whole watch session. Every iteration follows
/// the same protocol: [`next_iteration`], then [`get_type_script_issues`],
/// then, when a linter is configured, [`get_es_lint_issues`].
///
/// [`next_iteration`]: CheckingService::next_iteration
/// [`get_type_script_issues`]: CheckingService::get_type_script_issues
/// [`get_es_lint_issues`]: CheckingService::get_es_lint_issues
pub struct CheckingService {
    options: CheckerOptions,
    fs: Arc<dyn FileSystem>,
    /// Loaded at construction, moved into the program state by the first
    /// iteration.
    config: Option<ProjectConfiguration>,
    resolution: ResolutionOverrides,
    program: Option<ProgramState>,
    type_checker: TypeCheckerAdapter,
    linter: Option<LintAdapter>,
    session_token: CancellationToken,
    iteration: Option<Iteration>,
    iterations_started: u64,
    state: ServiceState,
}

impl CheckingService {
    /// Load the project configuration and set up the analyzers. A linter is
    /// required exactly when `options.eslint` is set.
    pub fn new(
        options: CheckerOptions,
        fs: Arc<dyn FileSystem>,
        type_checker: Box<dyn TypeCheckCapability>,
        linter: Option<Box<dyn LintCapability>>,
    ) -> Result<Self> {
        options.validate()?;

        let linter = match (options.eslint, linter) {
            (true, Some(linter)) => Some(LintAdapter::new(linter)),
            (true, None) => {
                return Err(ConfigurationError::InvalidOption {
                    option: "eslint",
                    reason: "linting is enabled but no linter was supplied".to_string(),
                }
                .into())
            }
            (false, _) => None,
        };

        let config = ProjectConfiguration::load(fs.as_ref(), &options.tsconfig, &options.compiler_options)
            .map_err(|error| {
                tracing::error!(tsconfig = %options.tsconfig, %error, "failed to load project configuration");
                error
            })?;

        tracing::info!(
            tsconfig = %config.config_path,
            eslint = linter.is_some(),
            syntactic = options.check_syntactic_errors,
            "checking service created"
        );

        Ok(Self {
            type_checker: TypeCheckerAdapter::new(type_checker, options.check_syntactic_errors),
            options,
            fs,
            config: Some(config),
            resolution: ResolutionOverrides::default(),
            program: None,
            linter,
            session_token: CancellationToken::new(),
            iteration: None,
            iterations_started: 0,
            state: ServiceState::Created,
        })
    }

    /// Install host resolvers. Only effective before the first iteration.
    pub fn with_resolution_overrides(mut self, overrides: ResolutionOverrides) -> Self {
        self.resolution = overrides;
        self
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Identity of the open iteration, or of the last one.
    pub fn iteration(&self) -> u64 {
        self.iterations_started
    }

    pub fn has_linter(&self) -> bool {
        self.linter.is_some()
    }

    pub fn is_file_excluded(&self, path: &str) -> bool {
        match &self.linter {
            Some(linter) => linter.is_file_excluded(path),
            None => is_declaration_file(path),
        }
    }

    /// Open a new iteration. A still running iteration is cancelled first,
    /// and the program state is built on first use.
    pub fn next_iteration(&mut self) -> Result<CancellationToken> {
        self.ensure_usable()?;

        if let Some(previous) = self.iteration.take() {
            tracing::debug!(iteration = previous.id, "superseding running iteration");
            previous.token.request_cancellation();
            if let (Some(diff), Some(linter)) = (previous.diff, self.linter.as_mut()) {
                linter.defer(&diff);
            }
        }

        if self.state == ServiceState::Created {
            let Some(config) = self.config.take() else {
                return Err(CheckerError::Failed);
            };
            self.program = Some(ProgramState::new(
                Arc::clone(&self.fs),
                config,
                self.options.compiler_options.clone(),
                ModuleResolver::new(self.resolution.clone()),
            ));
        }

        self.iterations_started += 1;
        let token = self.session_token.child();
        self.iteration = Some(Iteration {
            id: self.iterations_started,
            token: token.clone(),
            diff: None,
        });
        self.state = ServiceState::Checking(IterationPhase::Opened);

        tracing::info!(iteration = self.iterations_started, "iteration started");
        Ok(token)
    }

    /// Bring the program up to date and return the type checker issues of
    /// the whole program, ordered.
    pub fn get_type_script_issues(&mut self) -> Result<Vec<Issue>> {
        self.ensure_usable()?;
        self.expect_phase(IterationPhase::Opened, "next_iteration")?;

        if self.iteration_token_cancelled() {
            self.finish_iteration("cancelled");
            return Err(CheckerError::Cancelled);
        }

        let token = self
            .iteration
            .as_ref()
            .map(|iteration| iteration.token.clone())
            .unwrap_or_default();
        let Some(program) = self.program.as_mut() else {
            return Err(CheckerError::Failed);
        };

        let processed = match program.process_changes(&self.type_checker, &token) {
            Ok(processed) => processed,
            Err(error) => return Err(self.fail_iteration(error)),
        };

        let issues = order_issues(issues_from_ts_diagnostics(&processed.results, &program.snapshot()));
        tracing::info!(
            iteration = self.iterations_started,
            updated = processed.diff.updated_files().len(),
            removed = processed.diff.removed_files().len(),
            issues = issues.len(),
            "type check finished"
        );

        if let Some(iteration) = self.iteration.as_mut() {
            iteration.diff = Some(processed.diff);
        }
        if self.linter.is_some() {
            self.state = ServiceState::Checking(IterationPhase::TypeChecked);
        } else {
            self.finish_iteration("completed");
        }
        Ok(issues)
    }

    /// Lint the files changed in this iteration and return the issues of
    /// every cached report, ordered.
    ///
    /// `token` is polled before each file; a cancelled update leaves the
    /// unvisited files for the next iteration.
    pub fn get_es_lint_issues(&mut self, token: &CancellationToken) -> Result<Vec<Issue>> {
        if self.linter.is_none() {
            return Err(CheckerError::NotEnabled);
        }
        self.ensure_usable()?;
        self.expect_phase(IterationPhase::TypeChecked, "get_type_script_issues")?;

        let diff = self
            .iteration
            .as_mut()
            .and_then(|iteration| iteration.diff.take())
            .unwrap_or_default();

        let Some(linter) = self.linter.as_mut() else {
            return Err(CheckerError::NotEnabled);
        };
        if let Err(error) = linter.update(&diff, token) {
            return Err(self.fail_iteration(error));
        }

        let issues = order_issues(issues_from_lint_reports(linter.reports()));
        tracing::info!(
            iteration = self.iterations_started,
            issues = issues.len(),
            "lint finished"
        );
        self.finish_iteration("completed");
        Ok(issues)
    }

    /// Drive one full iteration and merge the issues of both analyzers.
    pub fn run_iteration(&mut self) -> Result<IterationReport> {
        let token = self.next_iteration()?;
        self.complete_iteration(&token)
    }

    /// Like [`run_iteration`](Self::run_iteration), with both analyzers also
    /// observing a token owned by the caller.
    pub fn run_iteration_with_token(&mut self, token: &CancellationToken) -> Result<IterationReport> {
        let linked = self.next_iteration()?.linked_with(token);
        if let Some(iteration) = self.iteration.as_mut() {
            iteration.token = linked.clone();
        }
        if linked.is_cancellation_requested() {
            self.finish_iteration("cancelled");
            return Err(CheckerError::Cancelled);
        }
        self.complete_iteration(&linked)
    }

    fn complete_iteration(&mut self, token: &CancellationToken) -> Result<IterationReport> {
        let iteration = self.iterations_started;
        let mut issues = self.get_type_script_issues()?;
        let diff = self
            .iteration
            .as_ref()
            .and_then(|iteration| iteration.diff.clone())
            .unwrap_or_default();

        if self.has_linter() {
            issues.extend(self.get_es_lint_issues(token)?);
        }

        Ok(IterationReport {
            iteration,
            diff,
            issues: order_issues(issues),
        })
    }

    /// Cancel everything and release the session's resources. Safe to call
    /// more than once.
    pub fn dispose(&mut self) {
        if self.state == ServiceState::Disposed {
            return;
        }
        self.session_token.request_cancellation();
        self.iteration = None;
        self.program = None;
        self.config = None;
        if let Some(linter) = self.linter.as_mut() {
            linter.clear();
        }
        self.state = ServiceState::Disposed;
        tracing::info!(iterations = self.iterations_started, "checking service disposed");
    }

    fn ensure_usable(&self) -> Result<()> {
        match self.state {
            ServiceState::Failed => Err(CheckerError::Failed),
            ServiceState::Disposed => Err(CheckerError::Disposed),
            _ => Ok(()),
        }
    }

    fn expect_phase(&self, phase: IterationPhase, expected: &'static str) -> Result<()> {
        if self.state == ServiceState::Checking(phase) {
            Ok(())
        } else {
            Err(CheckerError::OutOfOrder {
                expected,
                actual: self.state.to_string(),
            })
        }
    }

    fn iteration_token_cancelled(&self) -> bool {
        self.iteration
            .as_ref()
            .is_some_and(|iteration| iteration.token.is_cancellation_requested())
    }

    /// Close the open iteration after `error`. A configuration error ends
    /// the session; anything else only ends the iteration.
    fn fail_iteration(&mut self, error: CheckerError) -> CheckerError {
        if let CheckerError::Configuration(_) = error {
            tracing::error!(%error, "checking service failed");
            self.iteration = None;
            self.state = ServiceState::Failed;
        } else if error.is_cancelled() {
            self.finish_iteration("cancelled");
        } else {
            tracing::warn!(%error, "iteration failed");
            self.finish_iteration("failed");
        }
        error
    }

    fn finish_iteration(&mut self, outcome: &'static str) {
        if let Some(iteration) = self.iteration.take() {
            tracing::debug!(iteration = iteration.id, outcome, "iteration finished");
        }
        self.state = ServiceState::Ready;
    }
}

impl Drop for CheckingService {
    fn drop(&mut self) {
        self.session_token.request_cancellation();
    }
}

impl std::fmt::Debug for CheckingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckingService")
            .field("state", &self.state)
            .field("iteration", &self.iterations_started)
            .field("program", &self.program)
            .field("linter", &self.linter)
            .finish_non_exhaustive()
    }
}
