#![cfg(unix)]

use schemavault_tool::{ChangelogTool, ProcessRunner, RunOptions, ToolError};

fn script(body: &str) -> Vec<String> {
    vec!["-c".to_string(), body.to_string()]
}

#[tokio::test]
async fn test_successful_run_captures_both_streams() {
    let runner = ProcessRunner::new("sh");

    let output = runner
        .run(&script("echo generated; echo warning >&2"), &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(output.stdout.trim(), "generated");
    assert_eq!(output.stderr.trim(), "warning");
}

#[tokio::test]
async fn test_nonzero_exit_carries_captured_output() {
    let runner = ProcessRunner::new("sh");

    let result = runner
        .run(
            &script("echo partial; echo 'Unknown database orders' >&2; exit 3"),
            &RunOptions::default(),
        )
        .await;

    match result {
        Err(err @ ToolError::Failed { .. }) => {
            assert_eq!(err.stdout().trim(), "partial");
            assert!(err.stderr().contains("Unknown database orders"));
            let message = err.to_string();
            assert!(message.contains("exit code 3"), "got: {}", message);
            assert!(message.contains("Unknown database orders"));
        }
        other => panic!("Expected Failed error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_binary_is_spawn_error() {
    let runner = ProcessRunner::new("/nonexistent/liquibase");

    let result = runner.run(&[], &RunOptions::default()).await;

    match result {
        Err(err @ ToolError::Spawn { .. }) => {
            assert_eq!(err.stdout(), "");
            assert_eq!(err.stderr(), "");
            assert!(err.to_string().contains("/nonexistent/liquibase"));
        }
        other => panic!("Expected Spawn error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_working_directory_and_environment_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("changelog.yaml"), "databaseChangeLog: []\n").unwrap();

    let runner = ProcessRunner::new("sh");
    let options = RunOptions {
        cwd: Some(dir.path().to_path_buf()),
        env: vec![("SCHEMAVAULT_TEST_VAR".to_string(), "present".to_string())],
    };

    let output = runner
        .run(
            &script("cat changelog.yaml; printf '%s' \"$SCHEMAVAULT_TEST_VAR\" >&2"),
            &options,
        )
        .await
        .unwrap();

    assert_eq!(output.stdout, "databaseChangeLog: []\n");
    assert_eq!(output.stderr, "present");
}
