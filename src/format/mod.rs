//! Rendering of test events
//!
//! A formatter turns one event, together with the execution state that
//! already includes it, into text for the terminal. Formatters have no side
//! effects; the event loop writes whatever they return.
//!
//! Formatters are looked up by name through [`FormatName`], and several can be
//! composed into one with [`new_event_formatter`].

use crate::error::{Error, FormatError, Result};
use crate::event::TestEvent;
use crate::execution::{Execution, Package};
use console::Style;
use std::fmt;
use std::str::FromStr;

pub mod debug;
pub mod dots;
pub mod multi;
pub mod short;
pub mod standard;

pub use debug::DebugFormat;
pub use dots::DotsFormat;
pub use multi::MultiFormat;
pub use short::{ShortFormat, ShortVerboseFormat};
pub use standard::{StandardQuietFormat, StandardVerboseFormat};

/// Result of formatting a single event.
pub type FormatResult = std::result::Result<String, FormatError>;

/// Renders text for one event given the current execution state.
pub trait EventFormatter {
    fn format(&self, event: &TestEvent, exec: &Execution) -> FormatResult;
}

impl<F> EventFormatter for F
where
    F: Fn(&TestEvent, &Execution) -> FormatResult,
{
    fn format(&self, event: &TestEvent, exec: &Execution) -> FormatResult {
        self(event, exec)
    }
}

/// Shortens package names for display by stripping a common import path prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagePath {
    prefix: String,
}

impl PackagePath {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        PackagePath {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns `package` relative to the prefix, `.` for the prefix itself, or
    /// `package` unchanged when it lies outside the prefix.
    pub fn relative(&self, package: &str) -> String {
        if self.prefix.is_empty() {
            return package.to_string();
        }
        if package == self.prefix {
            return ".".to_string();
        }
        package
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(package)
            .to_string()
    }
}

/// Options shared by every formatter built from the registry.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    pub package_path: PackagePath,
    /// Style glyphs and status words with terminal colours.
    pub color: bool,
}

/// Terminal colours for pass/fail/skip markers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    color: bool,
}

impl Palette {
    pub(crate) fn new(color: bool) -> Self {
        Palette { color }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        style.force_styling(self.color).apply_to(text).to_string()
    }

    pub(crate) fn pass(&self, text: &str) -> String {
        self.paint(Style::new().green(), text)
    }

    pub(crate) fn fail(&self, text: &str) -> String {
        self.paint(Style::new().red(), text)
    }

    pub(crate) fn skip(&self, text: &str) -> String {
        self.paint(Style::new().yellow(), text)
    }
}

/// Looks up the package an event belongs to.
pub(crate) fn event_package<'a>(
    event: &TestEvent,
    exec: &'a Execution,
) -> std::result::Result<&'a Package, FormatError> {
    exec.package(&event.package)
        .ok_or_else(|| FormatError::UnknownPackage {
            package: event.package.clone(),
            test: event.test.clone(),
        })
}

/// Formats an elapsed duration in the `go test` style, ex `0.01s`.
pub(crate) fn seconds(elapsed: std::time::Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Names of the built-in formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatName {
    Debug,
    StandardVerbose,
    StandardQuiet,
    Dots,
    Short,
    ShortVerbose,
}

impl FormatName {
    pub const ALL: [FormatName; 6] = [
        FormatName::Debug,
        FormatName::StandardVerbose,
        FormatName::StandardQuiet,
        FormatName::Dots,
        FormatName::Short,
        FormatName::ShortVerbose,
    ];

    pub const DEFAULT: FormatName = FormatName::Short;

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatName::Debug => "debug",
            FormatName::StandardVerbose => "standard-verbose",
            FormatName::StandardQuiet => "standard-quiet",
            FormatName::Dots => "dots",
            FormatName::Short => "short",
            FormatName::ShortVerbose => "short-verbose",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FormatName::Debug => "print every event with all of its fields",
            FormatName::StandardVerbose => "default go test -v format",
            FormatName::StandardQuiet => "default go test format",
            FormatName::Dots => "print a character for each test",
            FormatName::Short => "print a line for each package",
            FormatName::ShortVerbose => "print a line for each test and package",
        }
    }

    /// Builds the formatter this name refers to.
    pub fn formatter(&self, opts: &FormatOptions) -> Box<dyn EventFormatter> {
        match self {
            FormatName::Debug => Box::new(DebugFormat),
            FormatName::StandardVerbose => Box::new(StandardVerboseFormat),
            FormatName::StandardQuiet => Box::new(StandardQuietFormat),
            FormatName::Dots => Box::new(DotsFormat::new(opts)),
            FormatName::Short => Box::new(ShortFormat::new(opts)),
            FormatName::ShortVerbose => Box::new(ShortVerboseFormat::new(opts)),
        }
    }
}

impl fmt::Display for FormatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FormatName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

/// Builds the formatter for one or more format names.
///
/// Every name is validated before anything is built, so an unknown name is
/// reported without side effects. No names selects [`FormatName::DEFAULT`];
/// several names are composed with [`MultiFormat`].
pub fn new_event_formatter<S: AsRef<str>>(
    names: &[S],
    opts: &FormatOptions,
) -> Result<Box<dyn EventFormatter>> {
    let names = names
        .iter()
        .map(|name| name.as_ref().trim().parse::<FormatName>())
        .collect::<Result<Vec<_>>>()?;

    Ok(match names.as_slice() {
        [] => FormatName::DEFAULT.formatter(opts),
        [name] => name.formatter(opts),
        _ => Box::new(MultiFormat::new(
            names.iter().map(|name| name.formatter(opts)).collect(),
        )),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::render;
    use super::*;
    use crate::event::Action;

    #[test]
    fn test_relative_package_path() {
        let path = PackagePath::new("github.com/gotestyourself/gotestyourself/testjson");
        assert_eq!(
            path.relative("github.com/gotestyourself/gotestyourself/testjson/extra/relpath"),
            "extra/relpath"
        );
        assert_eq!(
            path.relative("github.com/gotestyourself/gotestyourself/testjson"),
            "."
        );
        assert_eq!(
            path.relative("github.com/gotestyourself/gotestyourself/testjsonx"),
            "github.com/gotestyourself/gotestyourself/testjsonx"
        );
        assert_eq!(PackagePath::default().relative("a/b"), "a/b");
        assert_eq!(PackagePath::new("example.com/").relative("example.com/x"), "x");
    }

    #[test]
    fn test_format_names_round_trip() {
        for name in FormatName::ALL {
            assert_eq!(name.as_str().parse::<FormatName>().unwrap(), name);
        }
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = new_event_formatter(&["bogus"], &FormatOptions::default()).err();
        assert!(matches!(err, Some(Error::UnknownFormat(ref name)) if name == "bogus"));

        let err = new_event_formatter(&["dots", "bogus"], &FormatOptions::default()).err();
        assert!(matches!(err, Some(Error::UnknownFormat(_))));
    }

    #[test]
    fn test_default_format_is_short() {
        let formatter = new_event_formatter::<&str>(&[], &FormatOptions::default()).unwrap();
        let out = render(
            formatter.as_ref(),
            &[
                TestEvent::new(Action::Run, "p", "T"),
                TestEvent::new(Action::Output, "p", "").with_output("ok  \tp\t0.020s\n"),
            ],
        );
        assert_eq!(out, "✓  p (0.02s)\n");
    }

    #[test]
    fn test_composed_formats() {
        let formatter =
            new_event_formatter(&["dots", "standard-quiet"], &FormatOptions::default()).unwrap();
        let out = render(
            formatter.as_ref(),
            &[
                TestEvent::new(Action::Run, "p", "T"),
                TestEvent::new(Action::Pass, "p", "T"),
                TestEvent::new(Action::Output, "p", "").with_output("ok  \tp\t0.020s\n"),
            ],
        );
        assert_eq!(out, "[p]·ok  \tp\t0.020s\n");
    }

    #[test]
    fn test_closures_are_formatters() {
        let formatter = |event: &TestEvent, _: &Execution| -> FormatResult {
            Ok(event.action.to_string())
        };
        let out = render(&formatter, &[TestEvent::new(Action::Run, "p", "T")]);
        assert_eq!(out, "run");
    }

    #[test]
    fn test_palette_without_color_is_plain() {
        let palette = Palette::new(false);
        assert_eq!(palette.fail("✖"), "✖");
        assert_ne!(Palette::new(true).fail("✖"), "✖");
    }
}
