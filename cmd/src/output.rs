use serde::Serialize;
use std::process::Output;
use std::time::Duration;

use crate::error::describe_exit;
use crate::{Command, CommandError};

/// Everything captured from a finished host command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub duration: Duration,
    pub dry_run: bool,
}

impl CommandOutput {
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
            ..Self::default()
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            ..Self::default()
        }
    }

    pub(crate) fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::succeeded("")
        }
    }

    pub(crate) fn from_process(output: Output, duration: Duration) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code(),
            duration,
            dry_run: false,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// `exit code N`, or a note that a signal ended the process.
    pub fn exit_label(&self) -> String {
        describe_exit(&self.exit_code)
    }

    /// Turns a non-zero exit into [`CommandError::Failure`].
    pub fn into_result(self, command: &Command) -> Result<Self, CommandError> {
        if self.success() {
            Ok(self)
        } else {
            Err(CommandError::Failure {
                command: command.to_string(),
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_stderr_verbatim() {
        let mut cmd = Command::new("virsh");
        cmd.args(["shutdown", "web01"]);
        let err = CommandOutput::failed(1, "error: domain is not running")
            .into_result(&cmd)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("virsh shutdown web01"));
        assert!(message.contains("exit code 1"));
        assert!(message.contains("error: domain is not running"));
    }

    #[test]
    fn success_passes_through() {
        let cmd = Command::new("true");
        let output = CommandOutput::succeeded("ok").into_result(&cmd).unwrap();
        assert_eq!(output.stdout, "ok");
    }
}
