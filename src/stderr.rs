//! Collection of the test runner's error stream
//!
//! The error stream is drained on its own thread. Each line is echoed to the
//! caller's error sink as soon as it arrives and handed to the event loop over
//! a channel, so the event loop remains the only writer of the
//! [`Execution`](crate::execution::Execution).

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::mpsc::Sender;
use std::thread::{Scope, ScopedJoinHandle};
use tracing::warn;

/// Spawn a scoped thread that forwards `stderr` line by line.
///
/// Every line is sent on `lines` without its newline and written to `echo`
/// with one. A failing `echo` is logged once and no longer written to; lines
/// are still read and sent. The returned handle resolves once `stderr`
/// reaches end of stream or fails to read.
pub fn spawn_stderr_collector<'scope, 'env, R, W>(
    scope: &'scope Scope<'scope, 'env>,
    stderr: R,
    echo: W,
    lines: Sender<String>,
) -> ScopedJoinHandle<'scope, io::Result<()>>
where
    R: Read + Send + 'scope,
    W: Write + Send + 'scope,
{
    scope.spawn(move || collect_lines(stderr, echo, lines))
}

fn collect_lines<R: Read, W: Write>(stderr: R, mut echo: W, lines: Sender<String>) -> io::Result<()> {
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    let mut echo_failed = false;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        // the event loop may already have given up on the run
        let _ = lines.send(line.to_string());

        // stop echoing but keep draining
        if echo_failed {
            continue;
        }
        if let Err(e) = echo_line(&mut echo, line) {
            warn!("failed to echo test error output: {}", e);
            echo_failed = true;
        }
    }
    Ok(())
}

fn echo_line<W: Write>(echo: &mut W, line: &str) -> io::Result<()> {
    echo.write_all(line.as_bytes())?;
    echo.write_all(b"\n")?;
    echo.flush()
}
