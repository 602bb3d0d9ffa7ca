//! Error types for testsum

use crate::execution::Execution;
use std::io;
use thiserror::Error;

/// Result type alias for testsum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testsum
#[derive(Error, Debug)]
pub enum Error {
    /// The requested output format is not one of the known formatter names.
    #[error("unknown format {0}")]
    UnknownFormat(String),

    /// A line on the primary stream was not a valid test event.
    #[error("failed to parse test output: {line}")]
    Decode {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// One or more formatters failed while rendering events.
    #[error("failed to format test output: {}", join_format_errors(.0))]
    Format(Vec<FormatError>),

    /// The supervised `go test` process exited with a non-zero status.
    #[error("{command} exited with status {}", display_code(.code))]
    Subprocess { command: String, code: Option<i32> },

    /// Configuration file error or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The test command could not be started.
    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Exit code of the test process, if this error came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Subprocess { code, .. } => Some(code.unwrap_or(1)),
            _ => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

fn join_format_errors(errors: &[FormatError]) -> String {
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    messages.join("; ")
}

/// Error returned by an event formatter for a single event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The formatter was handed an event for a package the execution has no state for.
    #[error("no state for package {package:?} (test {test:?})")]
    UnknownPackage { package: String, test: String },

    /// Several composed formatters failed on the same event.
    ///
    /// `output` holds the text produced by the formatters that did succeed.
    #[error("{}", join_format_errors(.errors))]
    Combined {
        errors: Vec<FormatError>,
        output: String,
    },
}

impl FormatError {
    /// Text that should still be written for the event despite the error.
    pub fn output(&self) -> &str {
        match self {
            FormatError::Combined { output, .. } => output,
            FormatError::UnknownPackage { .. } => "",
        }
    }
}

/// Failure of the stdout event loop.
///
/// The execution accumulated before the failure is always kept so callers can
/// still print a best-effort summary.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ScanError {
    execution: Box<Execution>,
    #[source]
    error: Error,
    /// Formatter errors collected before a read or decode failure ended the
    /// scan. Empty when `error` is itself [`Error::Format`].
    format_errors: Vec<FormatError>,
}

impl ScanError {
    pub(crate) fn new(execution: Execution, error: Error) -> Self {
        ScanError {
            execution: Box::new(execution),
            error,
            format_errors: Vec::new(),
        }
    }

    pub(crate) fn with_format_errors(mut self, errors: Vec<FormatError>) -> Self {
        self.format_errors = errors;
        self
    }

    /// The partial execution state.
    pub fn execution(&self) -> &Execution {
        &self.execution
    }

    /// The underlying error.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Formatter errors that preceded a fatal read or decode error.
    pub fn format_errors(&self) -> &[FormatError] {
        &self.format_errors
    }

    /// Split into the partial execution and the error.
    pub fn into_parts(self) -> (Execution, Error) {
        (*self.execution, self.error)
    }
}
