use nasvirt_cmd::{Command, CommandExecutor, CommandOutput};
use nasvirt_host::{Advisories, Capability, CreateReport, advisory};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::LibvirtConfig;
use crate::domain::parse_domain;
use crate::error::LibvirtError;
use crate::parse::{parse_autostart, parse_uuids, parse_vnc_port};
use crate::types::{VirtualMachine, VmCreateRequest, VmState, validate_name};

const VIRSH: &str = "virsh";

/// Drives libvirt domains through `virsh`, `qemu-img` and `virt-install`.
#[derive(Debug, Clone)]
pub struct LibvirtManager {
    executor: Arc<dyn CommandExecutor>,
    config: LibvirtConfig,
    capability: Capability,
}

impl LibvirtManager {
    /// Probes for `virsh` and for the libvirt service being active.
    ///
    /// Either check failing yields a disabled manager plus the reason; the
    /// manager itself is always returned.
    pub async fn detect(
        executor: Arc<dyn CommandExecutor>,
        config: LibvirtConfig,
    ) -> (Self, Result<(), LibvirtError>) {
        let probed = probe(executor.as_ref(), &config).await;
        match probed {
            Ok(()) => {
                info!("[libvirt] manager enabled");
                (Self::with_capability(executor, config, Capability::Enabled), Ok(()))
            }
            Err(reason) => {
                warn!("[libvirt] {reason}, vm features disabled");
                let capability = Capability::disabled(reason.clone());
                let manager = Self::with_capability(executor, config, capability);
                (manager, Err(LibvirtError::Unavailable { reason }))
            }
        }
    }

    pub fn with_capability(
        executor: Arc<dyn CommandExecutor>,
        config: LibvirtConfig,
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

    fn ensure_enabled(&self) -> Result<(), LibvirtError> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(LibvirtError::NotEnabled)
        }
    }

    async fn run(&self, action: String, command: &Command) -> Result<CommandOutput, LibvirtError> {
        self.executor
            .run(command)
            .await
            .map_err(|source| LibvirtError::Command { action, source })
    }

    /// Every defined domain, running or not.
    ///
    /// A domain whose details cannot be read is logged and left out.
    pub async fn list(&self) -> Result<Vec<VirtualMachine>, LibvirtError> {
        self.ensure_enabled()?;

        let output = self
            .run("list vms".to_string(), &virsh(["list", "--all", "--uuid"]))
            .await?;

        let mut vms = Vec::new();
        for uuid in parse_uuids(&output.stdout) {
            match self.get(uuid).await {
                Ok(vm) => vms.push(vm),
                Err(error) => warn!("[libvirt] skipping vm {uuid}: {error}"),
            }
        }
        Ok(vms)
    }

    /// Looks a domain up by name or uuid.
    pub async fn get(&self, id: &str) -> Result<VirtualMachine, LibvirtError> {
        self.ensure_enabled()?;
        let id = validate_name(id)?;

        let output = self
            .run(format!("get vm {id}"), &virsh(["dumpxml", id]))
            .await?;
        let mut vm = parse_domain(&output.stdout).map_err(|source| LibvirtError::Xml {
            name: id.to_string(),
            source,
        })?;

        let state = self.executor.run(&virsh(["domstate", id])).await;
        vm.state = advisory("read state", id, state)
            .map(|output| VmState::new(output.stdout.trim()))
            .unwrap_or_else(VmState::unknown);

        let dominfo = self.executor.run(&virsh(["dominfo", id])).await;
        if let Some(autostart) =
            advisory("read autostart", id, dominfo).and_then(|output| parse_autostart(&output.stdout))
        {
            vm.autostart = autostart;
        }

        Ok(vm)
    }

    /// Creates a backing image, then defines and boots the domain.
    ///
    /// Enabling autostart afterwards is advisory; its failure is listed in
    /// the report.
    pub async fn create(&self, request: VmCreateRequest) -> Result<CreateReport, LibvirtError> {
        self.ensure_enabled()?;
        let request = request.resolve()?;
        let name = request.name.as_str();

        let disk_path = self.config.disk_path(name, &request.disk_format);
        let mut cmd = Command::new("qemu-img");
        cmd.args(["create", "-f", request.disk_format.as_str()])
            .arg(&disk_path)
            .arg(format!("{}G", request.disk_size_gb));
        self.run(format!("create disk image for vm {name}"), &cmd)
            .await?;
        info!(
            "[libvirt] created {}G disk image {}",
            request.disk_size_gb,
            disk_path.display()
        );

        let mut cmd = Command::new("virt-install");
        cmd.args(["--name", name])
            .arg("--memory")
            .arg(request.memory_mb.to_string())
            .arg("--vcpus")
            .arg(request.vcpus.to_string())
            .arg("--disk")
            .arg(format!(
                "path={},format={},bus=virtio",
                disk_path.display(),
                request.disk_format
            ))
            .args(["--os-variant", request.os_type.as_str()])
            .args(["--graphics", "vnc,listen=0.0.0.0", "--noautoconsole"])
            .arg("--network")
            .arg(request.network_arg());
        match &request.iso_path {
            Some(iso) => cmd.arg("--cdrom").arg(iso),
            None => cmd.args(["--boot", "hd", "--import"]),
        };
        cmd.timeout(self.config.install_timeout());
        self.run(format!("create vm {name}"), &cmd).await?;
        info!("[libvirt] created vm {name}");

        let mut advisories = Advisories::new(name);
        if request.autostart {
            let result = self.executor.run(&virsh(["autostart", name])).await;
            advisories.attempt("autostart", result);
        }

        Ok(CreateReport::new(name, advisories))
    }

    /// Force-stops (ignoring failure) and undefines a domain.
    pub async fn delete(&self, id: &str, delete_disks: bool) -> Result<(), LibvirtError> {
        self.ensure_enabled()?;
        let id = validate_name(id)?;

        advisory("force stop before delete", id, self.stop(id, true).await);

        let mut cmd = virsh(["undefine", id]);
        if delete_disks {
            cmd.arg("--remove-all-storage");
        }
        self.run(format!("delete vm {id}"), &cmd).await?;

        info!("[libvirt] deleted vm {id} (disks removed: {delete_disks})");
        Ok(())
    }

    pub async fn start(&self, id: &str) -> Result<(), LibvirtError> {
        self.ensure_enabled()?;
        let id = validate_name(id)?;

        self.run(format!("start vm {id}"), &virsh(["start", id]))
            .await?;

        info!("[libvirt] started vm {id}");
        Ok(())
    }

    /// `force` pulls the plug (`destroy`); otherwise the guest is asked to
    /// shut down.
    pub async fn stop(&self, id: &str, force: bool) -> Result<(), LibvirtError> {
        self.ensure_enabled()?;
        let id = validate_name(id)?;

        let subcommand = if force { "destroy" } else { "shutdown" };
        self.run(format!("stop vm {id}"), &virsh([subcommand, id]))
            .await?;

        info!("[libvirt] stopped vm {id} (force: {force})");
        Ok(())
    }

    pub async fn reboot(&self, id: &str) -> Result<(), LibvirtError> {
        self.ensure_enabled()?;
        let id = validate_name(id)?;

        self.run(format!("reboot vm {id}"), &virsh(["reboot", id]))
            .await?;

        info!("[libvirt] rebooted vm {id}");
        Ok(())
    }

    pub async fn vnc_port(&self, id: &str) -> Result<u16, LibvirtError> {
        self.ensure_enabled()?;
        let id = validate_name(id)?;

        let output = self
            .run(
                format!("get vnc display of vm {id}"),
                &virsh(["vncdisplay", id]),
            )
            .await?;

        parse_vnc_port(&output.stdout)
    }

    pub async fn set_autostart(&self, id: &str, enabled: bool) -> Result<(), LibvirtError> {
        self.ensure_enabled()?;
        let id = validate_name(id)?;

        let cmd = if enabled {
            virsh(["autostart", id])
        } else {
            virsh(["autostart", "--disable", id])
        };
        self.run(format!("set autostart of vm {id}"), &cmd).await?;

        info!("[libvirt] set autostart of vm {id} to {enabled}");
        Ok(())
    }
}

async fn probe(executor: &dyn CommandExecutor, config: &LibvirtConfig) -> Result<(), String> {
    if !executor.command_exists(VIRSH) {
        return Err(format!(
            "{VIRSH} not found: install the libvirt-clients package"
        ));
    }

    let service = config.service.as_str();
    let mut cmd = Command::new("systemctl");
    cmd.args(["is-active", service]);
    // `is-active` exits non-zero for inactive units; only stdout matters.
    match executor.execute(&cmd).await {
        Ok(output) if output.stdout.trim() == "active" => Ok(()),
        Ok(output) => Err(format!(
            "{service} is not running ({}): start the {service} service",
            output.stdout.trim()
        )),
        Err(error) => Err(format!("cannot query {service}: {error}")),
    }
}

fn virsh<'a>(args: impl IntoIterator<Item = &'a str>) -> Command {
    let mut cmd = Command::new(VIRSH);
    cmd.args(args);
    cmd
}
