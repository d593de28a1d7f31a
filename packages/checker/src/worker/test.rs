// Worker Tests

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::cancellation::{CancellationToken, CancellationTokenDescriptor};
    use crate::config::CheckerOptions;
    use crate::error::{ErrorKind, Result};
    use crate::file_system::MemoryFileSystem;
    use crate::program::ProgramSnapshot;
    use crate::service::CheckingService;
    use crate::testing::RuleTypeChecker;
    use crate::typecheck::TypeCheckCapability;
    use crate::worker::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use ts::Diagnostic;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn project() -> MemoryFileSystem {
        MemoryFileSystem::with_files([
            ("/p/tsconfig.json", "{}"),
            ("/p/a.ts", "let a: string = 1;\n"),
        ])
    }

    fn service_over(fs: MemoryFileSystem, checker: Box<dyn TypeCheckCapability>) -> Result<CheckingService> {
        CheckingService::new(CheckerOptions::new("/p/tsconfig.json"), Arc::new(fs), checker, None)
    }

    fn rule_checker() -> Box<dyn TypeCheckCapability> {
        Box::new(RuleTypeChecker::new().with_rule("1;", 2322, "Type 'number' is not assignable to type 'string'."))
    }

    struct Exploding;

    impl TypeCheckCapability for Exploding {
        fn semantic_diagnostics(&self, _: &ProgramSnapshot<'_>, _: &str) -> anyhow::Result<Vec<Diagnostic>> {
            panic!("boom");
        }

        fn syntactic_diagnostics(&self, _: &ProgramSnapshot<'_>, _: &str) -> anyhow::Result<Vec<Diagnostic>> {
            Ok(Vec::new())
        }
    }

    fn iterate_line(descriptor: CancellationTokenDescriptor) -> String {
        serde_json::to_string(&WorkerRequest::Iterate { token: descriptor }).unwrap()
    }

    fn serve_lines(input: &str, factory: impl FnOnce() -> Result<CheckingService>) -> Vec<WorkerResponse> {
        let mut output = Vec::new();
        serve(Cursor::new(input.to_string()), &mut output, factory).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    mod protocol_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_encode_requests_with_type_tag() {
            let iterate = serde_json::to_value(WorkerRequest::Iterate {
                token: CancellationTokenDescriptor::default(),
            })
            .unwrap();
            assert_eq!(
                iterate,
                json!({ "type": "iterate", "payload": { "token": { "markerFile": null, "cancelled": false } } })
            );
            assert_eq!(serde_json::to_value(WorkerRequest::Shutdown).unwrap(), json!({ "type": "shutdown" }));
        }

        #[test]
        fn should_encode_failures_with_stable_kind() {
            let response = WorkerResponse::from_result(Err(crate::error::CheckerError::NotEnabled));
            let value = serde_json::to_value(&response).unwrap();

            assert_eq!(value["type"], "failed");
            assert_eq!(value["payload"]["kind"], "not-enabled");
            assert_eq!(
                WorkerResponse::from_result(Err(crate::error::CheckerError::Cancelled)),
                WorkerResponse::Cancelled
            );
        }
    }

    mod thread_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_answer_iteration_requests() {
            let mut worker = CheckerWorker::spawn(|| service_over(project(), rule_checker()));

            worker.request_iteration().unwrap();
            let event = worker.recv_timeout(TIMEOUT).unwrap();

            match event {
                WorkerEvent::Response(WorkerResponse::Issues(report)) => {
                    assert_eq!(report.iteration, 1);
                    assert_eq!(report.issues.len(), 1);
                    assert_eq!(report.issues[0].code, "TS2322");
                }
                other => panic!("unexpected event {:?}", other),
            }
            worker.shutdown();
        }

        #[test]
        fn should_cancel_previous_token_on_new_request() {
            let mut worker = CheckerWorker::spawn(|| service_over(project(), rule_checker()));

            let first = worker.request_iteration().unwrap();
            let second = worker.request_iteration().unwrap();

            assert!(first.is_cancellation_requested());
            assert!(!second.is_cancellation_requested());
            for _ in 0..2 {
                assert!(matches!(worker.recv_timeout(TIMEOUT), Some(WorkerEvent::Response(_))));
            }
        }

        #[test]
        fn should_report_configuration_failure_for_every_request() {
            let mut worker = CheckerWorker::spawn(|| service_over(MemoryFileSystem::new(), rule_checker()));

            for _ in 0..2 {
                worker.request_iteration().unwrap();
                match worker.recv_timeout(TIMEOUT) {
                    Some(WorkerEvent::Response(WorkerResponse::Failed { kind, .. })) => {
                        assert_eq!(kind, ErrorKind::Configuration)
                    }
                    other => panic!("unexpected event {:?}", other),
                }
            }
        }

        #[test]
        fn should_report_death_when_service_panics() {
            let mut worker = CheckerWorker::spawn(|| service_over(project(), Box::new(Exploding)));

            worker.request_iteration().unwrap();

            match worker.recv_timeout(TIMEOUT) {
                Some(WorkerEvent::Died(message)) => assert_eq!(message, "boom"),
                other => panic!("unexpected event {:?}", other),
            }
            assert!(matches!(worker.recv_timeout(TIMEOUT), Some(WorkerEvent::Died(_))));
        }
    }

    mod serve_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_answer_each_request_and_skip_malformed_lines() {
            let input = format!(
                "{}\nnot json\n\n{}\n{}\n",
                iterate_line(CancellationTokenDescriptor::default()),
                iterate_line(CancellationTokenDescriptor::default()),
                serde_json::to_string(&WorkerRequest::Shutdown).unwrap(),
            );

            let responses = serve_lines(&input, || service_over(project(), rule_checker()));

            assert_eq!(responses.len(), 2);
            match (&responses[0], &responses[1]) {
                (WorkerResponse::Issues(first), WorkerResponse::Issues(second)) => {
                    assert_eq!(first.iteration, 1);
                    assert_eq!(first.diff.updated_files(), ["/p/a.ts".to_string()].as_slice());
                    assert_eq!(second.iteration, 2);
                    assert!(second.diff.is_empty());
                    assert_eq!(second.issues, first.issues);
                }
                other => panic!("unexpected responses {:?}", other),
            }
        }

        #[test]
        fn should_stop_at_shutdown() {
            let input = format!(
                "{}\n{}\n",
                serde_json::to_string(&WorkerRequest::Shutdown).unwrap(),
                iterate_line(CancellationTokenDescriptor::default()),
            );

            assert!(serve_lines(&input, || service_over(project(), rule_checker())).is_empty());
        }

        #[test]
        fn should_observe_cancellation_marker_of_host() {
            let dir = tempfile::tempdir().unwrap();
            let marker = dir.path().join("cancel.flag");
            let host_token = CancellationToken::with_marker_file(&marker);
            host_token.request_cancellation();
            assert!(marker.exists());

            let descriptor = CancellationTokenDescriptor {
                marker_file: Some(marker.clone()),
                cancelled: false,
            };
            let responses = serve_lines(&format!("{}\n", iterate_line(descriptor)), || {
                service_over(project(), rule_checker())
            });

            assert_eq!(responses, vec![WorkerResponse::Cancelled]);
            assert!(!marker.exists());
        }

        #[test]
        fn should_answer_with_construction_error() {
            let responses = serve_lines(
                &format!("{}\n", iterate_line(CancellationTokenDescriptor::default())),
                || service_over(MemoryFileSystem::new(), rule_checker()),
            );

            match responses.as_slice() {
                [WorkerResponse::Failed { kind, message }] => {
                    assert_eq!(*kind, ErrorKind::Configuration);
                    assert!(message.contains("tsconfig.json"));
                }
                other => panic!("unexpected responses {:?}", other),
            }
        }
    }
}
