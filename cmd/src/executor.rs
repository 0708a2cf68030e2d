use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::{Command, CommandError, CommandOutput};

/// Admin tools often live outside an unprivileged `PATH`.
const SYSTEM_PATHS: &str = "/usr/sbin:/sbin:/usr/bin:/bin:/usr/local/sbin:/usr/local/bin";

/// Runs host commands and captures their output.
///
/// Implementations never interpret what a command prints.
#[async_trait]
pub trait CommandExecutor: Debug + Send + Sync {
    /// Runs `command` to completion.
    ///
    /// A non-zero exit is still `Ok`: only failing to run the process at all
    /// (spawn, stdin, wait, timeout) is an error.
    async fn execute(&self, command: &Command) -> Result<CommandOutput, CommandError>;

    /// Whether `program` can be resolved on this host.
    fn command_exists(&self, program: &str) -> bool;

    /// Like [`execute`](Self::execute), with a non-zero exit mapped to
    /// [`CommandError::Failure`].
    async fn run(&self, command: &Command) -> Result<CommandOutput, CommandError> {
        self.execute(command).await?.into_result(command)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub timeout_secs: u64,
    pub dry_run: bool,
    pub sudo: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            dry_run: false,
            sudo: false,
        }
    }
}

/// Executes commands as real `tokio` child processes.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    default_timeout: Duration,
    dry_run: bool,
    sudo: bool,
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self::new(&ExecutorConfig::default())
    }
}

impl SystemExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            default_timeout: Duration::from_secs(config.timeout_secs),
            dry_run: config.dry_run,
            sudo: config.sudo,
        }
    }

    fn to_process(&self, command: &Command) -> tokio::process::Command {
        let program = resolve_program(command.get_program())
            .map(PathBuf::into_os_string)
            .unwrap_or_else(|| command.get_program().to_owned());

        let mut process = tokio::process::Command::new(program);
        process.args(command.get_args()).envs(command.get_envs());
        if let Some(dir) = command.get_current_dir() {
            process.current_dir(dir);
        }
        process
            .stdin(if command.get_stdin().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process
    }
}

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn execute(&self, command: &Command) -> Result<CommandOutput, CommandError> {
        let command = if self.sudo {
            command.clone().sudo()
        } else {
            command.clone()
        };
        let timeout = command.get_timeout().unwrap_or(self.default_timeout);

        if self.dry_run {
            info!("[dry-run] {command}");
            return Ok(CommandOutput::dry_run());
        }

        debug!("[exec] {command} (timeout {}s)", timeout.as_secs());

        let started = Instant::now();
        let mut child = self
            .to_process(&command)
            .spawn()
            .map_err(|error| CommandError::Spawn {
                command: command.to_string(),
                error,
            })?;

        let stdin = command.get_stdin().zip(child.stdin.take());
        let write_stdin = async move {
            let Some((input, mut pipe)) = stdin else {
                return Ok(());
            };
            match pipe.write_all(input).await {
                // The child stopped reading; its exit status and stderr say why.
                Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                result => result,
            }
        };

        // On timeout the child is dropped, which kills it.
        let (written, output) = tokio::time::timeout(timeout, async {
            tokio::join!(write_stdin, child.wait_with_output())
        })
        .await
        .map_err(|_| CommandError::Timeout {
            command: command.to_string(),
            timeout,
        })?;

        let output = output.map_err(|error| CommandError::Wait {
            command: command.to_string(),
            error,
        })?;
        written.map_err(|error| CommandError::Stdin {
            command: command.to_string(),
            error,
        })?;

        let output = CommandOutput::from_process(output, started.elapsed());
        debug!(
            "[exec] {command} exited with {:?} in {}ms",
            output.exit_code,
            output.duration.as_millis()
        );
        Ok(output)
    }

    fn command_exists(&self, program: &str) -> bool {
        resolve_program(OsStr::new(program)).is_some()
    }
}

fn resolve_program(program: &OsStr) -> Option<PathBuf> {
    which::which(program)
        .or_else(|_| which::which_in(program, Some(SYSTEM_PATHS), "/"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_does_not_spawn() {
        let executor = SystemExecutor::new(&ExecutorConfig {
            dry_run: true,
            ..ExecutorConfig::default()
        });
        let output = executor
            .execute(&Command::new("definitely-not-a-real-program"))
            .await
            .unwrap();
        assert!(output.dry_run);
        assert!(output.success());
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let executor = SystemExecutor::default();
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = executor.execute(&cmd).await.unwrap();
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        assert_eq!(output.exit_code, Some(3));

        let err = executor.run(&cmd).await.unwrap_err();
        assert_eq!(err.stderr(), Some("err"));
    }

    #[tokio::test]
    async fn feeds_stdin() {
        let executor = SystemExecutor::default();
        let mut cmd = Command::new("cat");
        cmd.stdin("hello");
        let output = executor.run(&cmd).await.unwrap();
        assert_eq!(output.stdout, "hello");
    }

    #[tokio::test]
    async fn timeout_covers_unread_stdin() {
        let executor = SystemExecutor::default();
        let mut cmd = Command::new("sleep");
        cmd.arg("5")
            .stdin(vec![b'x'; 1 << 20])
            .timeout(Duration::from_millis(100));
        let started = Instant::now();
        let err = executor.execute(&cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::Timeout { .. }), "{err}");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn early_exit_keeps_stderr_when_stdin_is_unread() {
        let executor = SystemExecutor::default();
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo 'chpasswd: permission denied' >&2; exit 1"])
            .stdin(vec![b'x'; 1 << 20]);
        let err = executor.run(&cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::Failure { exit_code: Some(1), .. }), "{err}");
        assert_eq!(err.stderr(), Some("chpasswd: permission denied"));
    }

    #[tokio::test]
    async fn times_out() {
        let executor = SystemExecutor::default();
        let mut cmd = Command::new("sleep");
        cmd.arg("5").timeout(Duration::from_millis(50));
        let err = executor.execute(&cmd).await.unwrap_err();
        assert!(matches!(err, CommandError::Timeout { .. }));
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error() {
        let executor = SystemExecutor::default();
        let err = executor
            .execute(&Command::new("definitely-not-a-real-program"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn command_exists_resolves_sh() {
        let executor = SystemExecutor::default();
        assert!(executor.command_exists("sh"));
        assert!(!executor.command_exists("definitely-not-a-real-program"));
    }
}
