// SPDX-License-Identifier: GPL-3.0-only

//! Process execution seam
//!
//! Every LVM call goes through [`CommandRunner`] so parsing and lifecycle
//! logic can be driven by scripted output in tests.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Result, SysError};

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process was killed by a signal
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Trimmed stderr, or stdout when stderr is empty.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Runs external programs and creates directories on behalf of the core.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion.
    ///
    /// A non-zero exit is NOT an error here; it is reported through
    /// [`CommandOutput::status`]. Errors mean the program could not be run
    /// at all (or the configured timeout fired).
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;

    /// `mkdir -p`
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Render a command line for logs and error messages.
pub fn render(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// [`CommandRunner`] backed by `std::process`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Runner that waits for each process as long as it takes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that kills a process still running after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let rendered = render(program, args);
        debug!(command = %rendered, "running");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|error| spawn_error(&rendered, error))?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let output = match self.timeout {
            Some(timeout) => wait_with_timeout(&rendered, child, stdout_pipe, stderr_pipe, timeout)?,
            None => wait_to_completion(child, stdout_pipe, stderr_pipe)?,
        };

        if !output.success() {
            warn!(command = %rendered, status = output.status, "command exited non-zero");
        }
        Ok(output)
    }
}

fn spawn_error(rendered: &str, error: io::Error) -> SysError {
    match error.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => SysError::ToolUnavailable {
            command: rendered.to_string(),
            reason: error.to_string(),
        },
        _ => SysError::Io(error),
    }
}

fn wait_to_completion(
    mut child: Child,
    stdout_pipe: Option<ChildStdout>,
    stderr_pipe: Option<ChildStderr>,
) -> Result<CommandOutput> {
    let stdout_handle = spawn_output_reader(stdout_pipe);
    let stderr_handle = spawn_output_reader(stderr_pipe);
    let status = child.wait()?;

    Ok(CommandOutput {
        status: status.code().unwrap_or(-1),
        stdout: join_reader(stdout_handle)?,
        stderr: join_reader(stderr_handle)?,
    })
}

fn wait_with_timeout(
    rendered: &str,
    mut child: Child,
    stdout_pipe: Option<ChildStdout>,
    stderr_pipe: Option<ChildStderr>,
    timeout: Duration,
) -> Result<CommandOutput> {
    let start = Instant::now();
    let stdout_handle = spawn_output_reader(stdout_pipe);
    let stderr_handle = spawn_output_reader(stderr_pipe);
    let mut exit_status = None;

    while start.elapsed() <= timeout {
        if let Some(status) = child.try_wait()? {
            exit_status = Some(status);
            break;
        }
        thread::sleep(Duration::from_millis(25));
    }

    let Some(status) = exit_status else {
        let _ = child.kill();
        let _ = child.wait();
        warn!(command = %rendered, ?timeout, "command killed after timeout");
        return Err(SysError::TimedOut {
            command: rendered.to_string(),
            timeout,
        });
    };

    Ok(CommandOutput {
        status: status.code().unwrap_or(-1),
        stdout: join_reader(stdout_handle)?,
        stderr: join_reader(stderr_handle)?,
    })
}

fn spawn_output_reader<R>(pipe: Option<R>) -> thread::JoinHandle<io::Result<String>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || -> io::Result<String> {
        let mut buf = Vec::new();
        if let Some(mut reader) = pipe {
            reader.read_to_end(&mut buf)?;
        }
        Ok(String::from_utf8_lossy(&buf).to_string())
    })
}

fn join_reader(handle: thread::JoinHandle<io::Result<String>>) -> Result<String> {
    let text = handle
        .join()
        .map_err(|_| SysError::Io(io::Error::other("output reader thread panicked")))??;
    Ok(text)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_command_context() {
        let args = vec!["--noheadings".to_string(), "-o".to_string(), "lv_name".to_string()];
        assert_eq!(render("lvs", &args), "lvs --noheadings -o lv_name");
        assert_eq!(render("lvm", &[]), "lvm");
    }

    #[test]
    fn diagnostic_prefers_stderr() {
        let output = CommandOutput {
            status: 5,
            stdout: "partial\n".to_string(),
            stderr: "  Volume group \"vg9\" not found\n".to_string(),
        };
        assert_eq!(output.diagnostic(), "Volume group \"vg9\" not found");

        let output = CommandOutput {
            status: 5,
            stdout: "only stdout\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.diagnostic(), "only stdout");
    }

    #[test]
    fn missing_program_is_tool_unavailable() {
        let err = SystemRunner::new()
            .run("lvsnap-definitely-not-installed", &[])
            .unwrap_err();
        assert!(matches!(err, SysError::ToolUnavailable { .. }));
    }

    #[test]
    fn captures_exit_status_and_streams() {
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];
        let output = SystemRunner::new().run("sh", &args).unwrap();
        assert_eq!(output.status, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn timeout_kills_hung_process() {
        let args = vec!["5".to_string()];
        let err = SystemRunner::with_timeout(Duration::from_millis(100))
            .run("sleep", &args)
            .unwrap_err();
        assert!(matches!(err, SysError::TimedOut { .. }));
    }
}
