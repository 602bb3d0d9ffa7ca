//! Per-package state and package lifecycle detection

use crate::event::{elapsed_duration, Action, TestEvent};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Name and elapsed time of a failed or skipped test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub package: String,
    pub test: String,
    pub elapsed: Duration,
}

impl TestCase {
    fn from_event(event: &TestEvent) -> Self {
        TestCase {
            package: event.package.clone(),
            test: event.test.clone(),
            elapsed: event.elapsed_duration(),
        }
    }
}

/// How a package finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// `ok  <pkg>` was reported.
    Passed,
    /// `?   <pkg> [no test files]` was reported.
    NoTests,
    /// The test binary ran and reported `FAIL`.
    Failed,
    /// The package never produced a runnable test binary, or exited without
    /// reporting any status at all.
    BuildFailed,
}

impl PackageStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, PackageStatus::Failed | PackageStatus::BuildFailed)
    }
}

/// Classifies a package-scope output fragment as a terminal status line.
///
/// Every formatter and the summary detect package completion through this
/// function; there is no other copy of the heuristic.
pub fn status_line(output: &str) -> Option<PackageStatus> {
    if output.starts_with("ok ") {
        return Some(PackageStatus::Passed);
    }
    if output.starts_with("? ") {
        return Some(PackageStatus::NoTests);
    }
    let line = output.trim_end_matches(['\r', '\n']);
    if line == "FAIL" || line.starts_with("FAIL\t") || line.starts_with("FAIL ") {
        if line.ends_with("[build failed]") || line.ends_with("[setup failed]") {
            return Some(PackageStatus::BuildFailed);
        }
        return Some(PackageStatus::Failed);
    }
    None
}

/// Extracts the trailing `<seconds>s` token of a status line such as
/// `ok  \texample.com/pkg\t0.010s`.
pub fn status_line_elapsed(output: &str) -> Option<Duration> {
    static ELAPSED: OnceLock<Option<Regex>> = OnceLock::new();
    let re = ELAPSED
        .get_or_init(|| Regex::new(r"\s(\d+(?:\.\d+)?)s\s*$").ok())
        .as_ref()?;
    let seconds: f64 = re.captures(output)?.get(1)?.as_str().parse().ok()?;
    Some(elapsed_duration(seconds))
}

/// Accumulated state of one test package.
#[derive(Debug, Default, Clone)]
pub struct Package {
    run: usize,
    failed: Vec<TestCase>,
    skipped: Vec<TestCase>,
    output: HashMap<String, Vec<String>>,
    /// First package-scope pass/fail/skip action seen.
    end: Option<Action>,
    /// Largest elapsed reported by any pass/fail/skip event of this package.
    elapsed: Duration,
}

impl Package {
    pub(crate) fn add(&mut self, event: &TestEvent) {
        match event.action {
            Action::Output | Action::Bench => {
                self.output
                    .entry(event.test.clone())
                    .or_default()
                    .push(event.output.clone());
                return;
            }
            Action::Pass | Action::Fail | Action::Skip => {
                self.elapsed = self.elapsed.max(event.elapsed_duration());
            }
            Action::Run | Action::Pause | Action::Cont | Action::Unknown => {}
        }

        if event.is_package_event() {
            if matches!(event.action, Action::Pass | Action::Fail | Action::Skip) {
                self.end.get_or_insert(event.action);
            }
            return;
        }

        match event.action {
            Action::Run => self.run += 1,
            Action::Fail => self.failed.push(TestCase::from_event(event)),
            Action::Skip => self.skipped.push(TestCase::from_event(event)),
            _ => {}
        }
    }

    /// Number of tests that started running.
    pub fn total(&self) -> usize {
        self.run
    }

    pub fn failed(&self) -> &[TestCase] {
        &self.failed
    }

    pub fn skipped(&self) -> &[TestCase] {
        &self.skipped
    }

    /// Tests that ran and neither failed nor were skipped.
    pub fn passed(&self) -> usize {
        self.run
            .saturating_sub(self.failed.len() + self.skipped.len())
    }

    /// Output fragments of one test, or of the package itself for an empty name.
    pub fn output(&self, test: &str) -> &[String] {
        self.output.get(test).map(Vec::as_slice).unwrap_or_default()
    }

    /// Largest elapsed time reported for the package so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Index of the first status line in the package-scope output.
    fn status_line_index(&self) -> Option<usize> {
        self.output("")
            .iter()
            .position(|fragment| status_line(fragment).is_some())
    }

    /// The package's completion status, if it has completed.
    pub fn status(&self) -> Option<PackageStatus> {
        if let Some(index) = self.status_line_index() {
            return status_line(&self.output("")[index]);
        }
        match self.end? {
            Action::Fail => Some(PackageStatus::BuildFailed),
            Action::Pass => Some(PackageStatus::Passed),
            Action::Skip => Some(PackageStatus::NoTests),
            _ => None,
        }
    }

    /// Returns true if the package failed without any single test failing,
    /// e.g. a build error or a test binary that exited early.
    pub fn is_package_failure(&self) -> bool {
        match self.status() {
            Some(PackageStatus::BuildFailed) => true,
            Some(PackageStatus::Failed) => self.failed.is_empty(),
            _ => false,
        }
    }
}

/// Returns the package status if `event` is the event that completed the
/// package. `pkg` must already include `event`.
///
/// The terminal event is the first package-scope status line, or a
/// package-scope pass/fail/skip when no status line was ever printed. At most
/// one event per package is terminal.
pub fn terminal_status(event: &TestEvent, pkg: &Package) -> Option<PackageStatus> {
    if !event.is_package_event() {
        return None;
    }
    match event.action {
        Action::Output => {
            let status = status_line(&event.output)?;
            let last = pkg.output("").len().checked_sub(1)?;
            (pkg.status_line_index() == Some(last)).then_some(status)
        }
        Action::Pass | Action::Fail | Action::Skip => {
            if pkg.status_line_index().is_some() || pkg.end != Some(event.action) {
                return None;
            }
            pkg.status()
        }
        _ => None,
    }
}
