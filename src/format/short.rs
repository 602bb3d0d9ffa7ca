//! One line per package, optionally one line per test

use super::{
    event_package, seconds, EventFormatter, FormatOptions, FormatResult, PackagePath, Palette,
};
use crate::event::{Action, TestEvent};
use crate::execution::{status_line, status_line_elapsed, terminal_status, Execution, PackageStatus};

/// Prints a line with a glyph, the package and its elapsed time when a
/// package finishes.
#[derive(Debug, Clone)]
pub struct ShortFormat {
    package_path: PackagePath,
    palette: Palette,
}

impl ShortFormat {
    pub fn new(opts: &FormatOptions) -> Self {
        ShortFormat {
            package_path: opts.package_path.clone(),
            palette: Palette::new(opts.color),
        }
    }
}

impl EventFormatter for ShortFormat {
    fn format(&self, event: &TestEvent, exec: &Execution) -> FormatResult {
        if !event.is_package_event() {
            return Ok(String::new());
        }
        let pkg = event_package(event, exec)?;
        let Some(status) = terminal_status(event, pkg) else {
            return Ok(String::new());
        };

        let glyph = match status {
            PackageStatus::Passed if pkg.total() == 0 => self.palette.skip("∅"),
            PackageStatus::Passed => self.palette.pass("✓"),
            PackageStatus::NoTests => self.palette.skip("∅"),
            PackageStatus::Failed | PackageStatus::BuildFailed => self.palette.fail("✖"),
        };

        let elapsed = status_line_elapsed(&event.output)
            .or_else(|| Some(event.elapsed_duration()).filter(|d| !d.is_zero()))
            .unwrap_or_else(|| pkg.elapsed());
        let elapsed = if elapsed.is_zero() {
            String::new()
        } else {
            format!(" ({})", seconds(elapsed))
        };

        Ok(format!(
            "{}  {}{}\n",
            glyph,
            self.package_path.relative(&event.package),
            elapsed
        ))
    }
}

/// Prints a line for every test that passes or fails, the output of failed
/// tests, and a line for every package.
#[derive(Debug, Clone)]
pub struct ShortVerboseFormat {
    package_path: PackagePath,
    palette: Palette,
}

impl ShortVerboseFormat {
    pub fn new(opts: &FormatOptions) -> Self {
        ShortVerboseFormat {
            package_path: opts.package_path.clone(),
            palette: Palette::new(opts.color),
        }
    }

    fn test_line(&self, result: &str, event: &TestEvent) -> String {
        format!(
            "{} {}.{} {}\n",
            result,
            self.package_path.relative(&event.package),
            event.test,
            event.elapsed_formatted()
        )
    }
}

/// Package-scope output that is not part of the runner's own status
/// reporting, e.g. a panic in `init` or compiler output.
fn is_package_failure_output(event: &TestEvent) -> bool {
    event.is_package_event()
        && event.action == Action::Output
        && event.output != "PASS\n"
        && status_line(&event.output).is_none()
}

impl EventFormatter for ShortVerboseFormat {
    fn format(&self, event: &TestEvent, exec: &Execution) -> FormatResult {
        if is_package_failure_output(event) {
            return Ok(event.output.clone());
        }

        let path = self.package_path.relative(&event.package);
        if event.is_package_event() {
            return Ok(match event.action {
                Action::Pass => format!("{} {}\n", self.palette.pass("PASS"), path),
                Action::Fail => format!("{} {}\n", self.palette.fail("FAIL"), path),
                Action::Skip => format!("{} {}\n", self.palette.skip("EMPTY"), path),
                _ => String::new(),
            });
        }

        Ok(match event.action {
            Action::Fail => {
                let pkg = event_package(event, exec)?;
                let mut out = pkg.output(&event.test).concat();
                out.push_str(&self.test_line(&self.palette.fail("FAIL"), event));
                out
            }
            Action::Pass => self.test_line(&self.palette.pass("PASS"), event),
            Action::Skip => self.test_line(&self.palette.skip("SKIP"), event),
            _ => String::new(),
        })
    }
}
