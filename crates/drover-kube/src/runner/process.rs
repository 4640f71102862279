//! Runner that spawns real processes

use std::io;
use std::process::{Command, Stdio};
use std::thread;

use super::CommandRunner;
use crate::command::HelmCommand;
use crate::error::{KubeError, Result};

/// Spawns helm and copies its output into the command's sinks
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &HelmCommand) -> Result<()> {
        let program = command.program().display().to_string();
        tracing::debug!(%program, args = command.args().len(), "spawning");

        let mut child = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| KubeError::Spawn {
                program: program.clone(),
                source,
            })?;

        let child_stdout = child.stdout.take();
        let child_stderr = child.stderr.take();
        let mut stdout = command.stdout().clone();
        let mut stderr = command.stderr().clone();

        // Both pipes are drained concurrently so a chatty stderr cannot block stdout.
        let copied = thread::scope(|scope| -> io::Result<()> {
            let errors = scope.spawn(move || match child_stderr {
                Some(mut pipe) => io::copy(&mut pipe, &mut stderr).map(|_| ()),
                None => Ok(()),
            });

            if let Some(mut pipe) = child_stdout {
                io::copy(&mut pipe, &mut stdout)?;
            }

            errors
                .join()
                .map_err(|_| io::Error::other("stderr copy thread panicked"))?
        });

        // The pipes are closed by now, so helm cannot block on them; reap it before
        // reporting a copy failure.
        let status = child.wait()?;
        copied?;
        if status.success() {
            Ok(())
        } else {
            Err(KubeError::ExternalToolFailure {
                program,
                status: status.to_string(),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::command::StepContext;
    use drover_core::{CapturedOutput, Sink};
    use std::io::Write;
    use tempfile::TempDir;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn context(program: &str, stdout: &CapturedOutput, stderr: &CapturedOutput) -> StepContext {
        StepContext {
            namespace: String::new(),
            debug: false,
            helm_bin: program.into(),
            stdout: stdout.sink(),
            stderr: stderr.sink(),
        }
    }

    #[test]
    fn test_output_reaches_sinks() {
        let stdout = CapturedOutput::new();
        let stderr = CapturedOutput::new();
        let ctx = context("/bin/sh", &stdout, &stderr);
        let cmd = ctx.command(vec![
            "-c".to_string(),
            "echo out; echo err >&2".to_string(),
        ]);

        ProcessRunner::new().run(&cmd).unwrap();

        assert_eq!(stdout.contents(), "out\n");
        assert_eq!(stderr.contents(), "err\n");
    }

    #[test]
    fn test_nonzero_exit_is_tool_failure() {
        let ctx = context("/bin/sh", &CapturedOutput::new(), &CapturedOutput::new());
        let cmd = ctx.command(vec!["-c".to_string(), "exit 3".to_string()]);

        let err = ProcessRunner::new().run(&cmd).unwrap_err();
        assert!(matches!(err, KubeError::ExternalToolFailure { .. }));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let ctx = StepContext {
            namespace: String::new(),
            debug: false,
            helm_bin: "/nonexistent/helm".into(),
            stdout: Sink::null(),
            stderr: Sink::null(),
        };
        let cmd = ctx.command(vec!["help".to_string()]);

        let err = ProcessRunner::new().run(&cmd).unwrap_err();
        assert!(matches!(err, KubeError::Spawn { .. }));
    }

    #[test]
    fn test_sink_failure_still_waits_for_process() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("finished");
        let ctx = StepContext {
            namespace: String::new(),
            debug: false,
            helm_bin: "/bin/sh".into(),
            stdout: Sink::new(BrokenWriter),
            stderr: Sink::null(),
        };
        let cmd = ctx.command(vec![
            "-c".to_string(),
            format!("echo out; sleep 0.2; touch '{}'", marker.display()),
        ]);

        let err = ProcessRunner::new().run(&cmd).unwrap_err();

        assert!(matches!(err, KubeError::Io(_)));
        assert!(marker.exists());
    }
}
