//! Raw dump of every event, for diagnosing the input stream

use super::{EventFormatter, FormatResult};
use crate::event::TestEvent;
use crate::execution::Execution;

/// Prints every field of every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebugFormat;

impl EventFormatter for DebugFormat {
    fn format(&self, event: &TestEvent, _exec: &Execution) -> FormatResult {
        Ok(format!(
            "{} {} {} ({:.3}) [{}] {}\n",
            event.package,
            event.test,
            event.action,
            event.elapsed,
            event.time.map(|t| t.timestamp()).unwrap_or_default(),
            event.output
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_event;
    use crate::format::test_support::render;

    #[test]
    fn test_debug_format() {
        let event = parse_event(
            r#"{"Time":"2018-03-22T22:33:35-04:00","Action":"fail","Package":"p","Test":"TestA","Elapsed":0.5}"#,
        )
        .unwrap();
        assert_eq!(
            render(&DebugFormat, &[event]),
            "p TestA fail (0.500) [1521772415] \n"
        );
    }
}
