//! The event loop driving a test run
//!
//! [`scan_test_output`] reads the runner's JSON stream one line at a time,
//! applies each event to the [`Execution`], asks the formatter to render the
//! event against the updated state and writes the result before reading the
//! next line. The error stream is collected concurrently by
//! [`spawn_stderr_collector`].

use crate::clock::Clock;
use crate::error::{Error, FormatError, Result, ScanError};
use crate::event::parse_event;
use crate::execution::Execution;
use crate::format::EventFormatter;
use crate::stderr::spawn_stderr_collector;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Streams and formatter for one [`scan_test_output`] call.
pub struct ScanConfig<'a> {
    /// JSON event stream of the test runner.
    pub stdout: &'a mut dyn Read,
    /// Plain text error stream of the test runner.
    pub stderr: &'a mut (dyn Read + Send),
    /// Receives formatter output.
    pub out: &'a mut dyn Write,
    /// Receives the error stream, echoed line by line.
    pub err: &'a mut (dyn Write + Send),
    pub handler: &'a dyn EventFormatter,
    pub clock: Arc<dyn Clock>,
}

/// Reads both streams to the end and returns the final execution.
///
/// On a malformed event, a failed write, or formatter errors the execution
/// accumulated so far is returned inside the [`ScanError`]. Formatter errors do
/// not stop the loop; they are collected and reported once the stream ends.
/// When a read or decode error ends the scan early, the formatter errors seen
/// until then are kept in [`ScanError::format_errors`].
pub fn scan_test_output(config: ScanConfig<'_>) -> std::result::Result<Execution, ScanError> {
    let ScanConfig {
        stdout,
        stderr,
        out,
        err,
        handler,
        clock,
    } = config;

    let mut execution = Execution::new(clock);
    let mut format_errors = Vec::new();
    let (tx, rx) = mpsc::channel();

    let result = thread::scope(|scope| {
        let collector = spawn_stderr_collector(scope, stderr, err, tx);

        let mut reader = BufReader::new(stdout);
        let result = read_events(
            &mut reader,
            out,
            handler,
            &mut execution,
            &rx,
            &mut format_errors,
        );
        if result.is_err() {
            // keep a still running test binary from blocking on a full pipe
            if let Err(e) = io::copy(&mut reader, &mut io::sink()) {
                debug!("failed to drain test output: {}", e);
            }
        }

        match collector.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to read test error output: {}", e),
            Err(_) => warn!("test error output collector panicked"),
        }
        result
    });

    for line in rx.try_iter() {
        execution.add_error(line);
    }

    match result {
        Ok(()) if format_errors.is_empty() => Ok(execution),
        Ok(()) => Err(ScanError::new(execution, Error::Format(format_errors))),
        Err(e) => {
            for format_error in &format_errors {
                warn!("failed to format test output: {}", format_error);
            }
            Err(ScanError::new(execution, e).with_format_errors(format_errors))
        }
    }
}

fn read_events(
    reader: &mut impl BufRead,
    out: &mut dyn Write,
    handler: &dyn EventFormatter,
    execution: &mut Execution,
    errors: &Receiver<String>,
    format_errors: &mut Vec<FormatError>,
) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let raw = String::from_utf8_lossy(&buf);
        let raw = raw.trim_end_matches(['\r', '\n']);
        if raw.trim().is_empty() {
            continue;
        }

        for line in errors.try_iter() {
            execution.add_error(line);
        }

        let event = parse_event(raw).inspect_err(|e| debug!("{}", e))?;
        execution.add(&event);
        match handler.format(&event, execution) {
            Ok(text) => out.write_all(text.as_bytes())?,
            Err(e) => {
                debug!(package = %event.package, test = %event.test, "formatter failed: {}", e);
                out.write_all(e.output().as_bytes())?;
                format_errors.push(e);
            }
        }
    }
    out.flush()?;
    Ok(())
}
