//! End of run report
//!
//! The summary is printed once both streams have closed:
//!
//! ```text
//! DONE 13 tests, 1 skipped, 2 failures, 1 error in 3.512s
//!
//! === Skipped
//! === SKIP: pkg/more TestOnlySometimes (0.00s)
//!     good_test.go:27: the skip message
//!
//! === Failures
//! === FAIL: pkg/fs TestFileDo (1.41s)
//!     do_test.go:33 assertion failed
//!
//! === Errors
//! pkg/file.go:99:12: missing ',' before newline
//! ```

use crate::error::Error;
use crate::execution::{status_line, Execution};
use crate::format::{seconds, PackagePath};
use regex::Regex;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

/// Optional sections of the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummarySection {
    Skipped,
    Failed,
    Errors,
}

impl SummarySection {
    pub const ALL: [SummarySection; 3] = [
        SummarySection::Skipped,
        SummarySection::Failed,
        SummarySection::Errors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SummarySection::Skipped => "skipped",
            SummarySection::Failed => "failed",
            SummarySection::Errors => "errors",
        }
    }
}

impl fmt::Display for SummarySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummarySection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        SummarySection::ALL
            .into_iter()
            .find(|section| section.as_str() == s.trim())
            .ok_or_else(|| Error::Config(format!("unknown summary section {}", s)))
    }
}

/// Controls how the summary is rendered.
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    pub package_path: PackagePath,
    /// Sections left out of the report. The totals line is always printed.
    pub hide: Vec<SummarySection>,
}

impl SummaryOptions {
    fn shows(&self, section: SummarySection) -> bool {
        !self.hide.contains(&section)
    }
}

/// A failed or skipped entry of the report. An empty test name stands for
/// the package as a whole.
struct Entry<'a> {
    package: &'a str,
    test: &'a str,
    elapsed: Duration,
    body: String,
}

/// Writes the summary of a finished execution.
pub fn print_summary(
    out: &mut dyn Write,
    exec: &Execution,
    opts: &SummaryOptions,
) -> io::Result<()> {
    let skipped = skipped_entries(exec);
    let failed = failed_entries(exec);

    writeln!(out)?;
    write!(out, "DONE {}", count(exec.total(), "test", "tests"))?;
    if !skipped.is_empty() {
        write!(out, ", {} skipped", skipped.len())?;
    }
    if !failed.is_empty() {
        write!(out, ", {}", count(failed.len(), "failure", "failures"))?;
    }
    if !exec.errors().is_empty() {
        write!(out, ", {}", count(exec.errors().len(), "error", "errors"))?;
    }
    writeln!(out, " in {:.3}s", exec.elapsed().as_secs_f64())?;

    if opts.shows(SummarySection::Skipped) {
        write_entries(out, "Skipped", "SKIP", &skipped, &opts.package_path)?;
    }
    if opts.shows(SummarySection::Failed) {
        write_entries(out, "Failures", "FAIL", &failed, &opts.package_path)?;
    }
    if opts.shows(SummarySection::Errors) && !exec.errors().is_empty() {
        writeln!(out, "\n=== Errors")?;
        for line in exec.errors() {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}

fn skipped_entries(exec: &Execution) -> Vec<Entry<'_>> {
    exec.skipped()
        .into_iter()
        .map(|tc| Entry {
            package: &tc.package,
            test: &tc.test,
            elapsed: tc.elapsed,
            body: test_output(exec.output(&tc.package, &tc.test)),
        })
        .collect()
}

/// Package failures followed by failed tests, grouped by package name.
fn failed_entries(exec: &Execution) -> Vec<Entry<'_>> {
    let mut entries = Vec::new();
    for (name, pkg) in exec.packages() {
        if pkg.is_package_failure() {
            entries.push(Entry {
                package: name,
                test: "",
                elapsed: pkg.elapsed(),
                body: package_output(pkg.output("")),
            });
        }
        entries.extend(pkg.failed().iter().map(|tc| Entry {
            package: &tc.package,
            test: &tc.test,
            elapsed: tc.elapsed,
            body: test_output(pkg.output(&tc.test)),
        }));
    }
    entries
}

fn write_entries(
    out: &mut dyn Write,
    title: &str,
    verb: &str,
    entries: &[Entry<'_>],
    package_path: &PackagePath,
) -> io::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n=== {}", title)?;
    for entry in entries {
        writeln!(
            out,
            "=== {}: {} {} ({})",
            verb,
            package_path.relative(entry.package),
            entry.test,
            seconds(entry.elapsed)
        )?;
        out.write_all(entry.body.as_bytes())?;
        if !entry.body.is_empty() && !entry.body.ends_with('\n') {
            writeln!(out)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Lines the runner prints to frame a test's own output. Indented lines
/// belong to subtests and are kept.
fn is_framing_line(line: &str) -> bool {
    static FRAMING: OnceLock<Option<Regex>> = OnceLock::new();
    FRAMING
        .get_or_init(|| Regex::new(r"^(=== (RUN|PAUSE|CONT)\s|--- (FAIL|SKIP): )").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(line))
}

/// Output of a test without the runner's `=== RUN` / `--- FAIL:` framing.
fn test_output(fragments: &[String]) -> String {
    fragments
        .concat()
        .split_inclusive('\n')
        .filter(|line| !is_framing_line(line))
        .collect()
}

/// Package-scope output without the runner's status lines.
fn package_output(fragments: &[String]) -> String {
    fragments
        .concat()
        .split_inclusive('\n')
        .filter(|line| *line != "PASS\n" && status_line(line).is_none())
        .collect()
}
