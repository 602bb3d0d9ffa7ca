//! Aggregated state of a test run
//!
//! An [`Execution`] is built up one [`TestEvent`] at a time while the test
//! runner is still producing output. It only ever grows: counters are
//! incremented, lists and output buffers are appended to, and nothing is
//! removed or rewritten.

use crate::clock::Clock;
use crate::event::TestEvent;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub mod package;

pub use package::{
    status_line, status_line_elapsed, terminal_status, Package, PackageStatus, TestCase,
};

/// Execution of one or more test packages.
#[derive(Debug)]
pub struct Execution {
    started: DateTime<Utc>,
    clock: Arc<dyn Clock>,
    packages: BTreeMap<String, Package>,
    errors: Vec<String>,
}

impl Execution {
    /// Creates an empty execution and records `clock.now()` as its start time.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Execution {
            started: clock.now(),
            clock,
            packages: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Applies one event to the state.
    ///
    /// The package is created the first time any event names it.
    pub fn add(&mut self, event: &TestEvent) {
        self.packages
            .entry(event.package.clone())
            .or_default()
            .add(event);
    }

    /// Records a line from the runner's error stream.
    ///
    /// Compiler diagnostic headers (`# pkg`) are dropped.
    pub fn add_error(&mut self, line: impl Into<String>) {
        let line = line.into();
        if is_build_header(&line) {
            return;
        }
        self.errors.push(line);
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// All packages, sorted by name.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &Package)> {
        self.packages.iter().map(|(name, pkg)| (name.as_str(), pkg))
    }

    /// Output fragments of a test (or of the package for an empty test name).
    pub fn output(&self, package: &str, test: &str) -> &[String] {
        self.package(package)
            .map(|pkg| pkg.output(test))
            .unwrap_or_default()
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    /// Time elapsed since the execution started, according to its clock.
    pub fn elapsed(&self) -> Duration {
        (self.clock.now() - self.started)
            .to_std()
            .unwrap_or_default()
    }

    /// Number of tests that ran, across all packages.
    pub fn total(&self) -> usize {
        self.packages.values().map(Package::total).sum()
    }

    /// Failed tests, grouped by package in name order.
    pub fn failed(&self) -> Vec<&TestCase> {
        self.packages.values().flat_map(Package::failed).collect()
    }

    /// Skipped tests, grouped by package in name order.
    pub fn skipped(&self) -> Vec<&TestCase> {
        self.packages.values().flat_map(Package::skipped).collect()
    }

    /// Number of tests that passed. Never stored, always derived from the
    /// other counts.
    pub fn passed(&self) -> usize {
        self.packages.values().map(Package::passed).sum()
    }

    /// Names of packages that failed without a failing test.
    pub fn package_failures(&self) -> Vec<&str> {
        self.packages()
            .filter(|(_, pkg)| pkg.is_package_failure())
            .map(|(name, _)| name)
            .collect()
    }

    /// Lines collected from the error stream.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Returns true for the `# <package>` header `go build` prints before
/// compiler diagnostics.
pub fn is_build_header(line: &str) -> bool {
    line.starts_with("# ")
}
