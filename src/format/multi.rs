//! Composition of several formatters

use super::{EventFormatter, FormatResult};
use crate::error::FormatError;
use crate::event::TestEvent;
use crate::execution::Execution;

/// Runs every formatter on every event and concatenates their output.
///
/// A failing formatter does not stop the others; all errors for an event are
/// returned together along with the output of the formatters that succeeded.
pub struct MultiFormat {
    formatters: Vec<Box<dyn EventFormatter>>,
}

impl MultiFormat {
    pub fn new(formatters: Vec<Box<dyn EventFormatter>>) -> Self {
        MultiFormat { formatters }
    }
}

impl EventFormatter for MultiFormat {
    fn format(&self, event: &TestEvent, exec: &Execution) -> FormatResult {
        let mut output = String::new();
        let mut errors = Vec::new();
        for formatter in &self.formatters {
            match formatter.format(event, exec) {
                Ok(text) => output.push_str(&text),
                Err(e) => {
                    output.push_str(e.output());
                    errors.push(e);
                }
            }
        }
        if errors.is_empty() {
            Ok(output)
        } else {
            Err(FormatError::Combined { errors, output })
        }
    }
}
