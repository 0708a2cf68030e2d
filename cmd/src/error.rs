use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to spawn command {command}: {error}")]
    Spawn {
        command: String,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to write stdin of command {command}: {error}")]
    Stdin {
        command: String,
        #[source]
        error: std::io::Error,
    },

    #[error("failed waiting for command {command}: {error}")]
    Wait {
        command: String,
        #[source]
        error: std::io::Error,
    },

    #[error("command timed out after {}s: {command}", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("command failed: {command} ({})\n{stderr}", describe_exit(.exit_code))]
    Failure {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// Captured stderr, when the command ran far enough to produce any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Failure { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

pub(crate) fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_string(),
    }
}
