//! Error path testing
//!
//! These tests check that failures are reported with the right error variant
//! and that whatever was read before a failure is not lost.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use testsum::clock::FakeClock;
use testsum::error::{Error, FormatError};
use testsum::event::TestEvent;
use testsum::execution::Execution;
use testsum::format::{new_event_formatter, EventFormatter, FormatOptions, FormatResult};
use testsum::gotest::GoTestCommand;
use testsum::run::{run, Input, RunOptions};
use testsum::scan::{scan_test_output, ScanConfig};
use testsum::summary::SummaryOptions;

const EVENTS: &str = concat!(
    r#"{"Action":"run","Package":"p","Test":"TestA"}"#,
    "\n",
    r#"{"Action":"fail","Package":"p","Test":"TestA","Elapsed":0.01}"#,
    "\n",
    r#"{"Action":"output","Package":"p","Output":"FAIL\n"}"#,
    "\n",
);

fn json_file_options(path: &Path, formats: &[&str]) -> RunOptions {
    RunOptions {
        formats: formats.iter().map(|name| name.to_string()).collect(),
        format_options: FormatOptions::default(),
        summary: SummaryOptions::default(),
        input: Input::JsonFile(path.to_path_buf()),
    }
}

fn run_capture(opts: &RunOptions) -> (testsum::Result<Execution>, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = run(opts, &mut out, &mut err, Arc::new(FakeClock::default()));
    (
        result,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn test_unknown_format_has_no_side_effects() {
    let temp = TempDir::new().unwrap();
    // the input would fail to open, so reaching it would change the error
    let opts = json_file_options(&temp.path().join("missing.json"), &["short", "bogus"]);

    let (result, out, err) = run_capture(&opts);
    match result {
        Err(Error::UnknownFormat(name)) => assert_eq!(name, "bogus"),
        other => panic!("unexpected result: {:?}", other.map(|e| e.total())),
    }
    assert!(out.is_empty());
    assert!(err.is_empty());
}

#[test]
fn test_missing_json_file() {
    let temp = TempDir::new().unwrap();
    let opts = json_file_options(&temp.path().join("missing.json"), &[]);
    let (result, out, _) = run_capture(&opts);
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(out.is_empty());
}

#[test]
fn test_decode_error_reports_line_and_keeps_state() {
    let mut stdout = Cursor::new(format!("{}{{\"Action\":\n{}", EVENTS, EVENTS));
    let mut stderr = Cursor::new(String::new());
    let mut out = Vec::new();
    let mut err = Vec::new();
    let handler = new_event_formatter(&["short"], &FormatOptions::default()).unwrap();

    let result = scan_test_output(ScanConfig {
        stdout: &mut stdout,
        stderr: &mut stderr,
        out: &mut out,
        err: &mut err,
        handler: handler.as_ref(),
        clock: Arc::new(FakeClock::default()),
    });

    let (execution, error) = result.unwrap_err().into_parts();
    match &error {
        Error::Decode { line, .. } => assert_eq!(line, "{\"Action\":"),
        other => panic!("unexpected error: {}", other),
    }
    assert!(error.to_string().contains("{\"Action\":"));
    assert_eq!(execution.total(), 1);
    assert_eq!(execution.failed().len(), 1);
    assert_eq!(String::from_utf8(out).unwrap(), "✖  p (0.01s)\n");
}

struct FailOnRun;

impl EventFormatter for FailOnRun {
    fn format(&self, event: &TestEvent, _exec: &Execution) -> FormatResult {
        if event.action.as_str() == "run" {
            return Err(FormatError::UnknownPackage {
                package: event.package.clone(),
                test: event.test.clone(),
            });
        }
        Ok(format!("{}\n", event.action))
    }
}

#[test]
fn test_formatter_errors_do_not_stop_the_loop() {
    let input = format!("{}{}", EVENTS, EVENTS);
    let mut stdout = Cursor::new(input);
    let mut stderr = Cursor::new(String::new());
    let mut out = Vec::new();
    let mut err = Vec::new();

    let result = scan_test_output(ScanConfig {
        stdout: &mut stdout,
        stderr: &mut stderr,
        out: &mut out,
        err: &mut err,
        handler: &FailOnRun,
        clock: Arc::new(FakeClock::default()),
    });

    let scan_err = result.unwrap_err();
    assert_eq!(scan_err.execution().total(), 2);
    match scan_err.error() {
        Error::Format(errors) => assert_eq!(errors.len(), 2),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "fail\noutput\nfail\noutput\n"
    );
}

#[cfg(unix)]
#[test]
fn test_raw_command_exit_code() {
    let temp = TempDir::new().unwrap();
    let events = temp.path().join("events.json");
    fs::write(&events, EVENTS).unwrap();

    let script = format!("cat '{}'; exit 4", events.display());
    let command = GoTestCommand::new(
        &["sh".to_string(), "-c".to_string(), script],
        true,
        temp.path(),
    )
    .unwrap();
    let opts = RunOptions {
        formats: Vec::new(),
        format_options: FormatOptions::default(),
        summary: SummaryOptions::default(),
        input: Input::Command(command),
    };

    let (result, out, _) = run_capture(&opts);
    let err = result.map(|e| e.total()).unwrap_err();
    assert_eq!(err.exit_code(), Some(4));
    assert!(out.contains("DONE 1 test, 1 failure in 0.000s"));
}

#[test]
fn test_raw_command_without_command() {
    let result = GoTestCommand::new(&[], true, Path::new("."));
    assert!(matches!(result, Err(Error::Config(_))));
}
