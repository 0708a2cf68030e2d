mod command;
mod error;
mod executor;
mod output;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::command::Command;
pub use crate::error::CommandError;
pub use crate::executor::{CommandExecutor, ExecutorConfig, SystemExecutor};
pub use crate::output::CommandOutput;
