use nasvirt_cmd::{CommandError, CommandOutput};
use thiserror::Error;

use crate::types::ContainerState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unrecognized container state '{0}'")]
    UnknownState(String),

    #[error("no State line in lxc-info output")]
    MissingState,
}

#[derive(Error, Debug)]
pub enum LxcError {
    /// Returned once, from detection.
    #[error("lxc is unavailable: {reason}")]
    Unavailable { reason: String },

    /// Returned by every operation of a manager built without lxc.
    #[error("LXC is not enabled")]
    NotEnabled,

    #[error("invalid container request: {0}")]
    InvalidRequest(String),

    #[error("failed to {action}: {source}")]
    Command {
        action: String,
        #[source]
        source: CommandError,
    },

    #[error("command in container {name} failed ({})\n{}", .output.exit_label(), .output.stderr)]
    Exec { name: String, output: CommandOutput },

    #[error("container {name} must be running to access console (state: {state})")]
    NotRunning { name: String, state: ContainerState },

    #[error("failed to parse info for container {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
}

impl LxcError {
    /// Output captured from a command that ran inside a container, kept even
    /// when the command failed.
    pub fn output(&self) -> Option<&CommandOutput> {
        match self {
            LxcError::Exec { output, .. } => Some(output),
            _ => None,
        }
    }
}
