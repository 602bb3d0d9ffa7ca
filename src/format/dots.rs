//! One character per test

use super::{event_package, EventFormatter, FormatOptions, FormatResult, PackagePath, Palette};
use crate::event::{Action, TestEvent};
use crate::execution::Execution;

/// Prints `[<package>]` when a package starts running tests, then a glyph
/// for each finished test.
#[derive(Debug, Clone)]
pub struct DotsFormat {
    package_path: PackagePath,
    palette: Palette,
}

impl DotsFormat {
    pub fn new(opts: &FormatOptions) -> Self {
        DotsFormat {
            package_path: opts.package_path.clone(),
            palette: Palette::new(opts.color),
        }
    }
}

impl EventFormatter for DotsFormat {
    fn format(&self, event: &TestEvent, exec: &Execution) -> FormatResult {
        if event.is_package_event() {
            return Ok(String::new());
        }
        let pkg = event_package(event, exec)?;
        Ok(match event.action {
            Action::Run if pkg.total() == 1 => {
                format!("[{}]", self.package_path.relative(&event.package))
            }
            Action::Pass => self.palette.pass("·"),
            Action::Fail => self.palette.fail("✖"),
            Action::Skip => self.palette.skip("↷"),
            _ => String::new(),
        })
    }
}
