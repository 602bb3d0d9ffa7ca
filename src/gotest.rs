//! Running `go test`
//!
//! A thin wrapper around the test runner process: it builds the argument
//! list, spawns the process with both output streams captured and maps its
//! exit status to an error once the streams have been consumed.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use tracing::debug;

/// Arguments for `go test` given the user's extra arguments.
///
/// `-json` is added unless the arguments already ask for it, and `./...` is
/// used when there are no arguments at all.
pub fn go_test_cmd_args(args: &[String]) -> Vec<String> {
    let mut argv = vec!["go".to_string(), "test".to_string()];
    if args.is_empty() {
        argv.extend(["-json".to_string(), "./...".to_string()]);
        return argv;
    }
    if !has_json_arg(args) {
        argv.push("-json".to_string());
    }
    argv.extend(args.iter().cloned());
    argv
}

/// Returns true if `args` already contain the `-json` flag.
pub fn has_json_arg(args: &[String]) -> bool {
    args.iter().any(|arg| {
        matches!(
            arg.as_str(),
            "-json" | "--json" | "-json=true" | "--json=true"
        )
    })
}

/// A test command ready to be started.
#[derive(Debug, Clone)]
pub struct GoTestCommand {
    argv: Vec<String>,
    dir: PathBuf,
}

impl GoTestCommand {
    /// Create the command for `args`. With `raw` the arguments are the whole
    /// command line, otherwise they are passed on to `go test`.
    pub fn new(args: &[String], raw: bool, dir: &Path) -> Result<Self> {
        let argv = if raw {
            if args.is_empty() {
                return Err(Error::Config(
                    "--raw-command requires a command to run".to_string(),
                ));
            }
            args.to_vec()
        } else {
            go_test_cmd_args(args)
        };
        Ok(GoTestCommand {
            argv,
            dir: dir.to_path_buf(),
        })
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The command line as it would be typed in a shell, for messages.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }

    /// Start the command with stdout and stderr piped back to us.
    pub fn spawn(&self) -> Result<GoTestProcess> {
        debug!(dir = %self.dir.display(), "exec: {:?}", self.argv);
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| Error::CommandExecution("empty command line".to_string()))?;

        let child = Command::new(program)
            .args(args)
            .current_dir(&self.dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::CommandExecution(format!("Failed to spawn {}: {}", self.display(), e))
            })?;

        Ok(GoTestProcess {
            child,
            command: self.display(),
        })
    }
}

/// A running test command.
#[derive(Debug)]
pub struct GoTestProcess {
    child: Child,
    command: String,
}

impl GoTestProcess {
    /// Take ownership of the process's output streams. Can only be done once.
    pub fn take_streams(&mut self) -> Result<(ChildStdout, ChildStderr)> {
        let stdout = self.child.stdout.take();
        let stderr = self.child.stderr.take();
        match (stdout, stderr) {
            (Some(stdout), Some(stderr)) => Ok((stdout, stderr)),
            _ => Err(Error::CommandExecution(format!(
                "output streams of {} are not available",
                self.command
            ))),
        }
    }

    /// Wait for the process to exit. A non-zero status is an
    /// [`Error::Subprocess`].
    pub fn wait(mut self) -> Result<()> {
        let status = self.child.wait()?;
        debug!("{} exited: {}", self.command, status);
        if status.success() {
            return Ok(());
        }
        Err(Error::Subprocess {
            command: self.command,
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_go_test_cmd_args() {
        assert_eq!(go_test_cmd_args(&[]), ["go", "test", "-json", "./..."]);
        assert_eq!(
            go_test_cmd_args(&strings(&["-run", "TestFoo", "./pkg"])),
            ["go", "test", "-json", "-run", "TestFoo", "./pkg"]
        );
        assert_eq!(
            go_test_cmd_args(&strings(&["-json", "./pkg"])),
            ["go", "test", "-json", "./pkg"]
        );
        assert_eq!(
            go_test_cmd_args(&strings(&["--json"])),
            ["go", "test", "--json"]
        );
    }

    #[test]
    fn test_has_json_arg() {
        assert!(has_json_arg(&strings(&["-v", "-json"])));
        assert!(!has_json_arg(&strings(&["-v", "-jsonx"])));
        assert!(!has_json_arg(&[]));
    }

    #[test]
    fn test_raw_command_requires_args() {
        let result = GoTestCommand::new(&[], true, Path::new("."));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_raw_command_is_used_verbatim() {
        let cmd = GoTestCommand::new(&strings(&["sh", "-c", "true"]), true, Path::new(".")).unwrap();
        assert_eq!(cmd.argv(), ["sh", "-c", "true"]);
        assert_eq!(cmd.display(), "sh -c true");
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_and_wait_success() {
        let cmd = GoTestCommand::new(
            &strings(&["sh", "-c", "echo out; echo err >&2"]),
            true,
            Path::new("."),
        )
        .unwrap();
        let mut process = cmd.spawn().unwrap();
        let (mut stdout, mut stderr) = process.take_streams().unwrap();

        let mut out = String::new();
        stdout.read_to_string(&mut out).unwrap();
        let mut err = String::new();
        stderr.read_to_string(&mut err).unwrap();

        assert_eq!(out, "out\n");
        assert_eq!(err, "err\n");
        assert!(process.take_streams().is_err());
        process.wait().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_reports_exit_code() {
        let cmd = GoTestCommand::new(&strings(&["sh", "-c", "exit 3"]), true, Path::new(".")).unwrap();
        let mut process = cmd.spawn().unwrap();
        drop(process.take_streams().unwrap());
        let err = process.wait().unwrap_err();
        assert!(matches!(err, Error::Subprocess { code: Some(3), .. }));
        assert_eq!(err.exit_code(), Some(3));
        assert_eq!(err.to_string(), "sh -c exit 3 exited with status 3");
    }

    #[test]
    fn test_spawn_missing_program() {
        let cmd = GoTestCommand::new(
            &strings(&["testsum-no-such-program"]),
            true,
            Path::new("."),
        )
        .unwrap();
        assert!(matches!(cmd.spawn(), Err(Error::CommandExecution(_))));
    }
}
