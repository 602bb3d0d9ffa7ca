//! Test events as written by `go test -json` and `go tool test2json`

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Action of a [`TestEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Run,
    Pause,
    Cont,
    Pass,
    Bench,
    Fail,
    Output,
    Skip,
    /// Any action this version does not know about. Ignored by the model.
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Run => "run",
            Action::Pause => "pause",
            Action::Cont => "cont",
            Action::Pass => "pass",
            Action::Bench => "bench",
            Action::Fail => "fail",
            Action::Output => "output",
            Action::Skip => "skip",
            Action::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record from the test runner's JSON stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestEvent {
    /// Time the event was emitted, RFC3339 encoded on the wire.
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    pub action: Action,
    #[serde(default)]
    pub package: String,
    /// Empty for events about the package as a whole.
    #[serde(default)]
    pub test: String,
    /// Elapsed time in seconds, set on pass/fail/skip.
    #[serde(default)]
    pub elapsed: f64,
    /// Output fragment, set on output/bench. Not guaranteed to be a full line.
    #[serde(default)]
    pub output: String,
}

impl TestEvent {
    /// Creates an event with no time, elapsed or output.
    pub fn new(action: Action, package: impl Into<String>, test: impl Into<String>) -> Self {
        TestEvent {
            time: None,
            action,
            package: package.into(),
            test: test.into(),
            elapsed: 0.0,
            output: String::new(),
        }
    }

    pub fn with_elapsed(mut self, elapsed: f64) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns true if the event describes a whole package rather than one test.
    pub fn is_package_event(&self) -> bool {
        self.test.is_empty()
    }

    /// Elapsed truncated to whole milliseconds.
    pub fn elapsed_duration(&self) -> Duration {
        elapsed_duration(self.elapsed)
    }

    /// Elapsed in the `go test` format, ex `(0.00s)`.
    pub fn elapsed_formatted(&self) -> String {
        format!("({:.2}s)", self.elapsed)
    }
}

/// Converts seconds to a duration truncated to whole milliseconds.
pub fn elapsed_duration(seconds: f64) -> Duration {
    // float to int casts saturate, so negative or NaN values become zero
    Duration::from_millis((seconds * 1000.0) as u64)
}

/// Decodes one line of the primary stream.
pub fn parse_event(raw: &str) -> Result<TestEvent> {
    serde_json::from_str(raw).map_err(|source| Error::Decode {
        line: raw.to_string(),
        source,
    })
}
