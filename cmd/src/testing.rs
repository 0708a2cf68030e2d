//! A scripted [`CommandExecutor`] for exercising managers without host tools.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::{Command, CommandError, CommandExecutor, CommandOutput};

#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    Timeout,
}

#[derive(Debug, Clone)]
struct Rule {
    prefix: Vec<String>,
    reply: Reply,
}

/// Records every command and answers from rules matched on the argv prefix.
///
/// The most recently added matching rule wins. Unmatched commands succeed
/// with empty output.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    installed: Mutex<BTreeSet<String>>,
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Command>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `program` as resolvable by [`CommandExecutor::command_exists`].
    pub fn with_program(self, program: &str) -> Self {
        lock(&self.installed).insert(program.to_string());
        self
    }

    pub fn on<I, S>(&self, prefix: I, output: CommandOutput) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(prefix, Reply::Output(output))
    }

    pub fn on_success<I, S>(&self, prefix: I, stdout: &str) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on(prefix, CommandOutput::succeeded(stdout))
    }

    pub fn on_failure<I, S>(&self, prefix: I, stderr: &str) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on(prefix, CommandOutput::failed(1, stderr))
    }

    pub fn on_timeout<I, S>(&self, prefix: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(prefix, Reply::Timeout)
    }

    fn push<I, S>(&self, prefix: I, reply: Reply) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefix = prefix.into_iter().map(Into::into).collect();
        lock(&self.rules).push(Rule { prefix, reply });
        self
    }

    pub fn calls(&self) -> Vec<Command> {
        lock(&self.calls).clone()
    }

    /// Executed commands rendered as command lines.
    pub fn call_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn execute(&self, command: &Command) -> Result<CommandOutput, CommandError> {
        lock(&self.calls).push(command.clone());

        let argv = command.argv();
        let reply = lock(&self.rules)
            .iter()
            .rev()
            .find(|rule| argv.starts_with(&rule.prefix))
            .map(|rule| rule.reply.clone());

        match reply {
            None => Ok(CommandOutput::succeeded("")),
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Timeout) => Err(CommandError::Timeout {
                command: command.to_string(),
                timeout: command.get_timeout().unwrap_or(Duration::from_secs(30)),
            }),
        }
    }

    fn command_exists(&self, program: &str) -> bool {
        lock(&self.installed).contains(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn latest_matching_rule_wins() {
        let fake = FakeExecutor::new();
        fake.on_success(["virsh"], "generic")
            .on_success(["virsh", "domstate"], "running");

        let mut cmd = Command::new("virsh");
        cmd.args(["domstate", "web01"]);
        assert_eq!(fake.execute(&cmd).await.unwrap().stdout, "running");

        let mut cmd = Command::new("virsh");
        cmd.arg("list");
        assert_eq!(fake.execute(&cmd).await.unwrap().stdout, "generic");

        assert_eq!(fake.call_lines(), vec!["virsh domstate web01", "virsh list"]);
    }

    #[tokio::test]
    async fn run_maps_scripted_failure() {
        let fake = FakeExecutor::new();
        fake.on_failure(["lxc-start"], "no such container");
        let err = fake.run(&Command::new("lxc-start")).await.unwrap_err();
        assert_eq!(err.stderr(), Some("no such container"));
    }

    #[test]
    fn command_exists_only_for_installed_programs() {
        let fake = FakeExecutor::new().with_program("virsh");
        assert!(fake.command_exists("virsh"));
        assert!(!fake.command_exists("lxc-ls"));
        assert_eq!(fake.call_count(), 0);
    }
}
