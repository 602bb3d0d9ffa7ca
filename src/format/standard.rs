//! Formats that mimic plain `go test` and `go test -v`

use super::{event_package, EventFormatter, FormatResult};
use crate::event::{Action, TestEvent};
use crate::execution::{status_line, terminal_status, Execution, PackageStatus};

/// Prints the output of every test, like `go test -v`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardVerboseFormat;

impl EventFormatter for StandardVerboseFormat {
    fn format(&self, event: &TestEvent, _exec: &Execution) -> FormatResult {
        match event.action {
            Action::Output | Action::Bench if !event.is_package_event() => {
                Ok(event.output.clone())
            }
            _ => Ok(String::new()),
        }
    }
}

/// Prints only the status lines of each package, like `go test`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardQuietFormat;

impl EventFormatter for StandardQuietFormat {
    fn format(&self, event: &TestEvent, exec: &Execution) -> FormatResult {
        if !event.is_package_event() {
            return Ok(String::new());
        }
        if event.action == Action::Output {
            if status_line(&event.output).is_some() {
                return Ok(event.output.clone());
            }
            return Ok(String::new());
        }

        // the package ended without printing a status line
        let pkg = event_package(event, exec)?;
        Ok(match terminal_status(event, pkg) {
            Some(PackageStatus::Passed) => format!("ok  \t{}\n", event.package),
            Some(PackageStatus::NoTests) => format!("?   \t{}\t[no test files]\n", event.package),
            Some(PackageStatus::Failed) => format!("FAIL\t{}\n", event.package),
            Some(PackageStatus::BuildFailed) => format!("FAIL\t{} [build failed]\n", event.package),
            None => String::new(),
        })
    }
}
