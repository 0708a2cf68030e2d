use nasvirt_cmd::{Command, CommandError, CommandExecutor, CommandOutput};
use nasvirt_host::{Advisories, Capability, CreateReport, advisory};
use shell_escape::unix::escape;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::LxcConfig;
use crate::config_file::{
    AUTOSTART_DIRECTIVE, bridge_directives, cpu_limit_directive, memory_limit_directive,
    parse_config,
};
use crate::error::LxcError;
use crate::parse::{LIST_COLUMNS, parse_info, parse_list};
use crate::types::{
    Container, ContainerCreateRequest, ResolvedCreate, TEMPLATES, Template, validate_name,
};

/// Probed at detection; its absence disables the manager.
const LIST_TOOL: &str = "lxc-ls";

/// Drives lxc containers through the `lxc-*` host tools.
#[derive(Debug, Clone)]
pub struct LxcManager {
    executor: Arc<dyn CommandExecutor>,
    config: LxcConfig,
    capability: Capability,
}

impl LxcManager {
    /// Probes the host for lxc.
    ///
    /// A manager is always returned. When lxc is missing it is disabled and
    /// every operation fails with [`LxcError::NotEnabled`]; the second half
    /// of the pair says why.
    pub fn detect(
        executor: Arc<dyn CommandExecutor>,
        config: LxcConfig,
    ) -> (Self, Result<(), LxcError>) {
        if executor.command_exists(LIST_TOOL) {
            info!("[lxc] manager enabled");
            let manager = Self::with_capability(executor, config, Capability::Enabled);
            (manager, Ok(()))
        } else {
            let reason = format!("{LIST_TOOL} not found: install the lxc package");
            warn!("[lxc] {reason}, container features disabled");
            let capability = Capability::disabled(reason.clone());
            let manager = Self::with_capability(executor, config, capability);
            (manager, Err(LxcError::Unavailable { reason }))
        }
    }

    pub fn with_capability(
        executor: Arc<dyn CommandExecutor>,
        config: LxcConfig,
        capability: Capability,
    ) -> Self {
        Self {
            executor,
            config,
            capability,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capability.is_enabled()
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    fn ensure_enabled(&self) -> Result<(), LxcError> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(LxcError::NotEnabled)
        }
    }

    async fn run(&self, action: String, command: &Command) -> Result<CommandOutput, LxcError> {
        self.executor
            .run(command)
            .await
            .map_err(|source| LxcError::Command { action, source })
    }

    pub async fn list(&self) -> Result<Vec<Container>, LxcError> {
        self.ensure_enabled()?;

        let mut cmd = Command::new(LIST_TOOL);
        cmd.args(["-f", "-F", LIST_COLUMNS]);
        let output = self.run("list containers".to_string(), &cmd).await?;

        Ok(parse_list(&output.stdout))
    }

    pub async fn get(&self, name: &str) -> Result<Container, LxcError> {
        self.ensure_enabled()?;
        let name = validate_name(name)?;

        let output = self
            .run(
                format!("get info of container {name}"),
                &lxc_command("lxc-info", name),
            )
            .await?;
        let mut container = parse_info(name, &output.stdout).map_err(|source| LxcError::Parse {
            name: name.to_string(),
            source,
        })?;

        // The config file is a second, independent source: merge, never replace.
        let config_file = self.read_config_file(name).await;
        if let Some(contents) = advisory("read config file", name, config_file) {
            let facts = parse_config(&contents);
            container.autostart = container.autostart || facts.autostart;
            container.memory_limit_mb = facts.memory_limit_mb.or(container.memory_limit_mb);
            container.template = facts.template.or(container.template);
        }

        Ok(container)
    }

    async fn read_config_file(&self, name: &str) -> Result<String, CommandError> {
        let mut cmd = Command::new("cat");
        cmd.arg(self.config.config_file(name));
        Ok(self.executor.run(&cmd).await?.stdout)
    }

    async fn append_directive(&self, config_file: &Path, directive: &str) -> Result<(), CommandError> {
        let path = config_file.to_string_lossy();
        let script = format!(
            "echo {} >> {}",
            escape(Cow::Borrowed(directive)),
            escape(path)
        );
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script.as_str()]);
        self.executor.run(&cmd).await?;
        Ok(())
    }

    /// Creates a container from the `download` template.
    ///
    /// Limits, autostart, network and provisioning are applied afterwards as
    /// advisory steps: their failures are listed in the report, not returned.
    pub async fn create(&self, request: ContainerCreateRequest) -> Result<CreateReport, LxcError> {
        self.ensure_enabled()?;
        let request = request.resolve()?;
        let name = request.name.as_str();

        let mut cmd = Command::new("lxc-create");
        cmd.args(["-n", name, "-t", "download", "--"])
            .args(["--dist", request.template.as_str()])
            .args(["--release", request.release.as_str()])
            .args(["--arch", request.architecture.as_str()])
            .timeout(self.config.create_timeout());
        self.run(format!("create container {name}"), &cmd).await?;
        info!(
            "[lxc] created container {name} ({} {} {})",
            request.template, request.release, request.architecture
        );

        let mut advisories = Advisories::new(name);
        let config_file = self.config.config_file(name);

        if let Some(memory_mb) = request.memory_limit_mb {
            let directive = memory_limit_directive(memory_mb);
            let result = self.append_directive(&config_file, &directive).await;
            advisories.attempt("memory limit", result);
        }
        if let Some(cpus) = request.cpu_limit {
            let directive = cpu_limit_directive(cpus);
            let result = self.append_directive(&config_file, &directive).await;
            advisories.attempt("cpu limit", result);
        }
        if request.autostart {
            let result = self.append_directive(&config_file, AUTOSTART_DIRECTIVE).await;
            advisories.attempt("autostart", result);
        }
        if let Some(bridge) = &request.bridge {
            for directive in bridge_directives(bridge) {
                let result = self.append_directive(&config_file, &directive).await;
                if advisories.attempt("bridged network", result).is_none() {
                    break;
                }
            }
        }
        if request.needs_provisioning() {
            self.provision(&request, &mut advisories).await;
        }

        Ok(CreateReport::new(name, advisories))
    }

    /// Starts a fresh container and sets its root password and SSH key.
    async fn provision(&self, request: &ResolvedCreate, advisories: &mut Advisories) {
        let name = request.name.as_str();
        if advisories
            .attempt("start for provisioning", self.start(name).await)
            .is_none()
        {
            return;
        }
        tokio::time::sleep(self.config.provision_settle()).await;

        if let Some(password) = &request.root_password {
            let mut cmd = lxc_command("lxc-attach", name);
            cmd.args(["--", "chpasswd"])
                .stdin(format!("root:{password}\n"));
            let result = self.executor.run(&cmd).await;
            if advisories.attempt("root password", result).is_some() {
                info!("[lxc] set root password of {name}");
            }
        }

        if let Some(key) = &request.ssh_key {
            let script = format!(
                "mkdir -p /root/.ssh && chmod 700 /root/.ssh && echo {} >> /root/.ssh/authorized_keys && chmod 600 /root/.ssh/authorized_keys",
                escape(Cow::Borrowed(key.as_str()))
            );
            let result = self.executor.run(&attach_shell(name, &script)).await;
            if advisories.attempt("ssh key", result).is_some() {
                info!("[lxc] installed ssh key in {name}");
            }

            if matches!(request.template.as_str(), "ubuntu" | "debian") {
                let script = "apt-get update && DEBIAN_FRONTEND=noninteractive apt-get install -y openssh-server && systemctl enable --now ssh";
                let mut cmd = attach_shell(name, script);
                cmd.timeout(self.config.create_timeout());
                advisories.attempt("ssh server", self.executor.run(&cmd).await);
            }
        }
    }

    /// Force-stops (ignoring failure) and destroys a container.
    pub async fn delete(&self, name: &str) -> Result<(), LxcError> {
        self.ensure_enabled()?;
        let name = validate_name(name)?;

        advisory("force stop before delete", name, self.stop(name, true).await);

        let mut cmd = lxc_command("lxc-destroy", name);
        cmd.arg("-f");
        self.run(format!("delete container {name}"), &cmd).await?;

        info!("[lxc] deleted container {name}");
        Ok(())
    }

    pub async fn start(&self, name: &str) -> Result<(), LxcError> {
        self.ensure_enabled()?;
        let name = validate_name(name)?;

        self.run(
            format!("start container {name}"),
            &lxc_command("lxc-start", name),
        )
        .await?;

        info!("[lxc] started container {name}");
        Ok(())
    }

    /// Stops a container; `force` kills it instead of a clean shutdown.
    pub async fn stop(&self, name: &str, force: bool) -> Result<(), LxcError> {
        self.ensure_enabled()?;
        let name = validate_name(name)?;

        let mut cmd = lxc_command("lxc-stop", name);
        if force {
            cmd.arg("-k");
        }
        self.run(format!("stop container {name}"), &cmd).await?;

        info!("[lxc] stopped container {name} (force: {force})");
        Ok(())
    }

    pub async fn restart(&self, name: &str) -> Result<(), LxcError> {
        self.stop(name, false).await?;
        self.start(name).await?;

        info!("[lxc] restarted container {name}");
        Ok(())
    }

    pub async fn freeze(&self, name: &str) -> Result<(), LxcError> {
        self.ensure_enabled()?;
        let name = validate_name(name)?;

        self.run(
            format!("freeze container {name}"),
            &lxc_command("lxc-freeze", name),
        )
        .await?;

        info!("[lxc] froze container {name}");
        Ok(())
    }

    pub async fn unfreeze(&self, name: &str) -> Result<(), LxcError> {
        self.ensure_enabled()?;
        let name = validate_name(name)?;

        self.run(
            format!("unfreeze container {name}"),
            &lxc_command("lxc-unfreeze", name),
        )
        .await?;

        info!("[lxc] unfroze container {name}");
        Ok(())
    }

    /// Runs `command` through `sh -c` inside the container.
    ///
    /// On a non-zero exit the captured output is carried by
    /// [`LxcError::Exec`], see [`LxcError::output`].
    pub async fn exec_command(&self, name: &str, command: &str) -> Result<CommandOutput, LxcError> {
        self.ensure_enabled()?;
        let name = validate_name(name)?;
        if command.trim().is_empty() {
            return Err(LxcError::InvalidRequest("command is required".to_string()));
        }

        let cmd = attach_shell(name, command);
        let output = self
            .executor
            .execute(&cmd)
            .await
            .map_err(|source| LxcError::Command {
                action: format!("execute command in container {name}"),
                source,
            })?;

        if !output.success() {
            return Err(LxcError::Exec {
                name: name.to_string(),
                output,
            });
        }

        info!("[lxc] executed command in container {name}: {command}");
        Ok(output)
    }

    pub fn templates(&self) -> Result<&'static [Template], LxcError> {
        self.ensure_enabled()?;
        Ok(TEMPLATES)
    }

    /// The command a terminal layer should run to attach to the container.
    pub fn attach_console(&self, name: &str) -> Result<Command, LxcError> {
        self.ensure_enabled()?;
        let name = validate_name(name)?;
        Ok(lxc_command("lxc-attach", name))
    }

    /// Like [`attach_console`](Self::attach_console), but only for a container
    /// observed running.
    pub async fn console_url(&self, name: &str) -> Result<Command, LxcError> {
        let container = self.get(name).await?;
        if !container.is_running() {
            return Err(LxcError::NotRunning {
                name: container.name,
                state: container.state,
            });
        }
        self.attach_console(&container.name)
    }
}

fn lxc_command(program: &str, name: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(["-n", name]);
    cmd
}

fn attach_shell(name: &str, script: &str) -> Command {
    let mut cmd = lxc_command("lxc-attach", name);
    cmd.args(["--", "sh", "-c", script]);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerState, NetworkMode};
    use nasvirt_cmd::testing::FakeExecutor;
    use std::time::Duration;

    fn test_config() -> LxcConfig {
        LxcConfig {
            provision_settle_secs: 0,
            ..LxcConfig::default()
        }
    }

    fn enabled() -> (LxcManager, Arc<FakeExecutor>) {
        let fake = Arc::new(FakeExecutor::new().with_program("lxc-ls"));
        let (manager, detected) = LxcManager::detect(fake.clone(), test_config());
        assert!(detected.is_ok());
        (manager, fake)
    }

    #[tokio::test]
    async fn create_timeout_surfaces_as_command_error() {
        let (manager, fake) = enabled();
        fake.on_timeout(["lxc-create"]);

        let err = manager
            .create(ContainerCreateRequest::new("web01"))
            .await
            .unwrap_err();
        let LxcError::Command { action, source } = err else {
            panic!("expected command error");
        };
        assert_eq!(action, "create container web01");
        assert!(matches!(
            source,
            CommandError::Timeout { timeout, .. } if timeout == Duration::from_secs(600)
        ));
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_tool_disables_every_operation() {
        let fake = Arc::new(FakeExecutor::new());
        let (manager, detected) = LxcManager::detect(fake.clone(), test_config());

        assert!(matches!(detected, Err(LxcError::Unavailable { .. })));
        assert!(!manager.is_enabled());
        assert!(manager.capability().reason().is_some());

        let results: Vec<Result<(), LxcError>> = vec![
            manager.list().await.map(drop),
            manager.get("web01").await.map(drop),
            manager.create(ContainerCreateRequest::new("web01")).await.map(drop),
            manager.delete("web01").await,
            manager.start("web01").await,
            manager.stop("web01", true).await,
            manager.restart("web01").await,
            manager.freeze("web01").await,
            manager.unfreeze("web01").await,
            manager.exec_command("web01", "uptime").await.map(drop),
            manager.templates().map(drop),
            manager.attach_console("web01").map(drop),
            manager.console_url("web01").await.map(drop),
        ];
        for result in results {
            assert!(matches!(result, Err(LxcError::NotEnabled)));
        }
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn create_with_empty_name_never_reaches_host() {
        let (manager, fake) = enabled();
        let err = manager
            .create(ContainerCreateRequest::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, LxcError::InvalidRequest(_)));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn create_then_get_with_defaults() {
        let (manager, fake) = enabled();
        let request = ContainerCreateRequest {
            template: Some("ubuntu".to_string()),
            ..ContainerCreateRequest::new("web01")
        };

        let report = manager.create(request).await.unwrap();
        assert!(report.is_clean());
        assert_eq!(
            fake.call_lines(),
            vec![
                "lxc-create -n web01 -t download -- --dist ubuntu --release 22.04 --arch amd64"
            ]
        );
        assert_eq!(
            fake.calls()[0].get_timeout(),
            Some(std::time::Duration::from_secs(600))
        );

        fake.clear_calls();
        fake.on_success(
            ["lxc-info", "-n", "web01"],
            "Name: web01\nState: RUNNING\nPID: 1234\nIP: 10.0.3.5\n",
        );
        let container = manager.get("web01").await.unwrap();
        assert_eq!(container.state, ContainerState::Running);
        assert_eq!(container.pid, Some(1234));
        assert_eq!(container.ipv4.as_deref(), Some("10.0.3.5"));
        assert_eq!(
            fake.call_lines(),
            vec!["lxc-info -n web01", "cat /var/lib/lxc/web01/config"]
        );
    }

    #[tokio::test]
    async fn create_appends_requested_limits() {
        let (manager, fake) = enabled();
        let request = ContainerCreateRequest {
            memory_limit_mb: Some(512),
            cpu_limit: Some(2),
            autostart: true,
            ..ContainerCreateRequest::new("web01")
        };

        manager.create(request).await.unwrap();

        let lines = fake.call_lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            "sh -c echo 'lxc.cgroup2.memory.max = 512M' >> /var/lib/lxc/web01/config"
        );
        assert_eq!(
            lines[2],
            "sh -c echo 'lxc.cgroup2.cpu.max = 200000 100000' >> /var/lib/lxc/web01/config"
        );
        assert_eq!(
            lines[3],
            "sh -c echo 'lxc.start.auto = 1' >> /var/lib/lxc/web01/config"
        );
    }

    #[tokio::test]
    async fn failed_limit_is_reported_not_returned() {
        let (manager, fake) = enabled();
        fake.on_failure(["sh", "-c"], "sh: permission denied");
        let request = ContainerCreateRequest {
            memory_limit_mb: Some(512),
            autostart: true,
            ..ContainerCreateRequest::new("web01")
        };

        let report = manager.create(request).await.unwrap();

        assert_eq!(report.name, "web01");
        let steps: Vec<_> = report.advisories.iter().map(|a| a.step.as_str()).collect();
        assert_eq!(steps, vec!["memory limit", "autostart"]);
        assert!(report.advisories[0].message.contains("permission denied"));
    }

    #[tokio::test]
    async fn failed_create_skips_follow_ups() {
        let (manager, fake) = enabled();
        fake.on_failure(["lxc-create"], "lxc-create: web01: container already exists");
        let request = ContainerCreateRequest {
            memory_limit_mb: Some(512),
            ..ContainerCreateRequest::new("web01")
        };

        let err = manager.create(request).await.unwrap_err();
        assert!(err.to_string().contains("container already exists"));
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn bridged_network_appends_link() {
        let (manager, fake) = enabled();
        let request = ContainerCreateRequest {
            network: NetworkMode::Bridged {
                bridge: Some("vmbr1".to_string()),
            },
            ..ContainerCreateRequest::new("web01")
        };

        manager.create(request).await.unwrap();

        let lines = fake.call_lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("'lxc.net.0.link = vmbr1'"));
    }

    #[tokio::test]
    async fn provisioning_passes_password_on_stdin() {
        let (manager, fake) = enabled();
        let request = ContainerCreateRequest {
            template: Some("alpine".to_string()),
            root_password: Some("s3cret".to_string()),
            ssh_key: Some("ssh-ed25519 AAAA user@host".to_string()),
            ..ContainerCreateRequest::new("web01")
        };

        let report = manager.create(request).await.unwrap();
        assert!(report.is_clean());

        let calls = fake.calls();
        let lines = fake.call_lines();
        assert_eq!(lines[1], "lxc-start -n web01");
        assert_eq!(lines[2], "lxc-attach -n web01 -- chpasswd");
        assert_eq!(calls[2].get_stdin(), Some(&b"root:s3cret\n"[..]));
        assert!(lines.iter().all(|line| !line.contains("s3cret")));
        assert!(lines[3].contains("'ssh-ed25519 AAAA user@host' >> /root/.ssh/authorized_keys"));
        // alpine gets no openssh install
        assert_eq!(lines.len(), 4);
    }

    #[tokio::test]
    async fn provisioning_stops_when_start_fails() {
        let (manager, fake) = enabled();
        fake.on_failure(["lxc-start"], "failed to start");
        let request = ContainerCreateRequest {
            root_password: Some("s3cret".to_string()),
            ..ContainerCreateRequest::new("web01")
        };

        let report = manager.create(request).await.unwrap();
        assert_eq!(report.advisories.len(), 1);
        assert_eq!(report.advisories[0].step, "start for provisioning");
        assert_eq!(fake.call_count(), 2);
    }

    #[tokio::test]
    async fn delete_stops_first_and_ignores_stop_failure() {
        let (manager, fake) = enabled();
        fake.on_failure(["lxc-stop"], "web01 is not running");

        manager.delete("web01").await.unwrap();

        assert_eq!(
            fake.call_lines(),
            vec!["lxc-stop -n web01 -k", "lxc-destroy -n web01 -f"]
        );
    }

    #[tokio::test]
    async fn delete_surfaces_destroy_error() {
        let (manager, fake) = enabled();
        fake.on_failure(["lxc-stop"], "stop failed")
            .on_failure(["lxc-destroy"], "destroy failed: busy");

        let err = manager.delete("web01").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("destroy failed: busy"));
        assert!(!message.contains("stop failed"));
    }

    #[tokio::test]
    async fn lifecycle_commands() {
        let (manager, fake) = enabled();
        manager.start("web01").await.unwrap();
        manager.stop("web01", false).await.unwrap();
        manager.stop("web01", true).await.unwrap();
        manager.freeze("web01").await.unwrap();
        manager.unfreeze("web01").await.unwrap();
        assert_eq!(
            fake.call_lines(),
            vec![
                "lxc-start -n web01",
                "lxc-stop -n web01",
                "lxc-stop -n web01 -k",
                "lxc-freeze -n web01",
                "lxc-unfreeze -n web01",
            ]
        );
    }

    #[tokio::test]
    async fn start_error_includes_stderr() {
        let (manager, fake) = enabled();
        fake.on_failure(["lxc-start"], "lxc-start: web01: No container config specified");
        let err = manager.start("web01").await.unwrap_err();
        assert!(
            err.to_string()
                .contains("lxc-start: web01: No container config specified")
        );
    }

    #[tokio::test]
    async fn restart_short_circuits_on_stop_failure() {
        let (manager, fake) = enabled();
        fake.on_failure(["lxc-stop"], "timed out");
        assert!(manager.restart("web01").await.is_err());
        assert_eq!(fake.call_lines(), vec!["lxc-stop -n web01"]);

        fake.clear_calls();
        fake.on_success(["lxc-stop"], "");
        manager.restart("web01").await.unwrap();
        assert_eq!(
            fake.call_lines(),
            vec!["lxc-stop -n web01", "lxc-start -n web01"]
        );
    }

    #[tokio::test]
    async fn list_uses_pinned_columns() {
        let (manager, fake) = enabled();
        fake.on_success(
            ["lxc-ls"],
            "NAME STATE PID IPV4 IPV6 AUTOSTART\nweb01 RUNNING 1234 10.0.3.5 - 0\nbroken\n",
        );
        let containers = manager.list().await.unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(
            fake.call_lines(),
            vec!["lxc-ls -f -F NAME,STATE,PID,IPV4,IPV6,AUTOSTART"]
        );
    }

    #[tokio::test]
    async fn get_merges_config_file() {
        let (manager, fake) = enabled();
        fake.on_success(["lxc-info"], "State: STOPPED\n").on_success(
            ["cat"],
            "# Parameters passed to the template: --dist ubuntu --release 22.04 --arch amd64\nlxc.cgroup2.memory.max = 1024M\nlxc.start.auto = 1\n",
        );
        let container = manager.get("web01").await.unwrap();
        assert!(container.autostart);
        assert_eq!(container.memory_limit_mb, Some(1024));
        assert_eq!(container.template.as_deref(), Some("ubuntu"));
    }

    #[tokio::test]
    async fn get_tolerates_unreadable_config_file() {
        let (manager, fake) = enabled();
        fake.on_success(["lxc-info"], "State: RUNNING\n")
            .on_failure(["cat"], "Permission denied");
        let container = manager.get("web01").await.unwrap();
        assert!(!container.autostart);
    }

    #[tokio::test]
    async fn exec_returns_output_even_on_failure() {
        let (manager, fake) = enabled();
        fake.on(
            ["lxc-attach", "-n", "web01", "--", "sh", "-c"],
            CommandOutput {
                stdout: "partial".to_string(),
                stderr: "boom".to_string(),
                exit_code: Some(2),
                ..CommandOutput::default()
            },
        );

        let err = manager.exec_command("web01", "make").await.unwrap_err();
        let output = err.output().unwrap();
        assert_eq!(output.stdout, "partial");
        assert_eq!(output.exit_code, Some(2));
        assert!(err.to_string().contains("boom"));
        assert_eq!(fake.call_lines(), vec!["lxc-attach -n web01 -- sh -c make"]);
    }

    #[tokio::test]
    async fn console_requires_running_container() {
        let (manager, fake) = enabled();
        fake.on_success(["lxc-info"], "State: STOPPED\n");
        let err = manager.console_url("web01").await.unwrap_err();
        assert!(matches!(err, LxcError::NotRunning { .. }));

        fake.on_success(["lxc-info"], "State: RUNNING\n");
        let console = manager.console_url("web01").await.unwrap();
        assert_eq!(console.to_string(), "lxc-attach -n web01");
    }

    #[test]
    fn templates_are_static() {
        let fake = Arc::new(FakeExecutor::new().with_program("lxc-ls"));
        let (manager, _) = LxcManager::detect(fake.clone(), test_config());
        let templates = manager.templates().unwrap();
        assert!(templates.iter().any(|t| t.name == "ubuntu"));
        assert_eq!(fake.call_count(), 0);
    }
}
