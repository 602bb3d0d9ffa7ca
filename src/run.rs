//! A complete reporting run
//!
//! Resolves the formatter, starts the input, scans it to the end and prints
//! the summary. Used by the binary, and by tests that need the whole flow.

use crate::clock::Clock;
use crate::error::Result;
use crate::execution::Execution;
use crate::format::{new_event_formatter, EventFormatter, FormatOptions};
use crate::gotest::GoTestCommand;
use crate::scan::{scan_test_output, ScanConfig};
use crate::summary::{print_summary, SummaryOptions};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Where test events come from.
#[derive(Debug, Clone)]
pub enum Input {
    /// A file of previously recorded `go test -json` output.
    JsonFile(PathBuf),
    /// A test command to run.
    Command(GoTestCommand),
}

/// Everything a run needs besides its output sinks.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Formatter names; empty selects the default formatter.
    pub formats: Vec<String>,
    pub format_options: FormatOptions,
    pub summary: SummaryOptions,
    pub input: Input,
}

/// Run to completion, writing formatted events and the summary to `out` and
/// the test runner's error stream to `err`.
///
/// An unknown formatter name fails before any input is opened. When the
/// scan fails the summary of everything read so far is still printed. A
/// test command that exits non-zero is reported after the summary.
pub fn run(
    opts: &RunOptions,
    out: &mut dyn Write,
    err: &mut (dyn Write + Send),
    clock: Arc<dyn Clock>,
) -> Result<Execution> {
    let handler = new_event_formatter(&opts.formats, &opts.format_options)?;

    match &opts.input {
        Input::JsonFile(path) => {
            debug!("reading test events from {}", path.display());
            let mut stdout = File::open(path)?;
            let mut stderr = io::empty();
            scan_and_summarize(opts, &mut stdout, &mut stderr, out, err, handler.as_ref(), clock)
        }
        Input::Command(command) => {
            let mut process = command.spawn()?;
            let (mut stdout, mut stderr) = process.take_streams()?;
            let result = scan_and_summarize(
                opts,
                &mut stdout,
                &mut stderr,
                out,
                err,
                handler.as_ref(),
                clock,
            );
            drop(stdout);
            match result {
                Ok(execution) => {
                    process.wait()?;
                    Ok(execution)
                }
                Err(e) => {
                    if let Err(wait_err) = process.wait() {
                        debug!("{}", wait_err);
                    }
                    Err(e)
                }
            }
        }
    }
}

fn scan_and_summarize(
    opts: &RunOptions,
    stdout: &mut dyn Read,
    stderr: &mut (dyn Read + Send),
    out: &mut dyn Write,
    err: &mut (dyn Write + Send),
    handler: &dyn EventFormatter,
    clock: Arc<dyn Clock>,
) -> Result<Execution> {
    let result = scan_test_output(ScanConfig {
        stdout,
        stderr,
        out: &mut *out,
        err,
        handler,
        clock,
    });
    match result {
        Ok(execution) => {
            print_summary(out, &execution, &opts.summary)?;
            Ok(execution)
        }
        Err(scan_err) => {
            let (execution, error) = scan_err.into_parts();
            print_summary(out, &execution, &opts.summary)?;
            Err(error)
        }
    }
}
