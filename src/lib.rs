//! testsum - Live reporting for `go test -json` output
//!
//! testsum reads the stream of test events `go test -json` prints while tests
//! are running, keeps a running tally per package and per test, renders each
//! event in one of several human readable formats as it arrives, and prints a
//! summary of skipped tests, failures and errors once the run is over.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`event`]: Test event records as printed by `go test -json`
//! - [`execution`]: Aggregated per-package and per-test state of a run
//! - [`scan`]: The event loop reading the runner's output streams
//! - [`stderr`]: Concurrent collection of the runner's error stream
//! - [`format`]: Formatters rendering events, and the registry selecting them by name
//! - [`summary`]: The end of run report
//! - [`config`]: .testsum.conf configuration file parsing
//! - [`gotest`]: Running `go test` as a subprocess
//! - [`run`]: A complete run, as done by the `testsum` binary
//! - [`clock`]: Real and fake time sources
//! - [`error`]: Error types and Result alias
//!
//! # Example
//!
//! ```no_run
//! use std::io::{self, Cursor};
//! use std::sync::Arc;
//! use testsum::clock::SystemClock;
//! use testsum::format::{new_event_formatter, FormatOptions};
//! use testsum::scan::{scan_test_output, ScanConfig};
//! use testsum::summary::{print_summary, SummaryOptions};
//!
//! # fn main() -> testsum::error::Result<()> {
//! let handler = new_event_formatter(&["dots"], &FormatOptions::default())?;
//! let mut stdout = io::stdin();
//! let mut stderr = Cursor::new(Vec::new());
//!
//! let execution = scan_test_output(ScanConfig {
//!     stdout: &mut stdout,
//!     stderr: &mut stderr,
//!     out: &mut io::stdout(),
//!     err: &mut io::stderr(),
//!     handler: handler.as_ref(),
//!     clock: Arc::new(SystemClock),
//! })
//! .map_err(|e| e.into_parts().1)?;
//!
//! print_summary(&mut io::stdout(), &execution, &SummaryOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod execution;
pub mod format;
pub mod gotest;
pub mod run;
pub mod scan;
pub mod stderr;
pub mod summary;

pub use error::{Error, Result};
