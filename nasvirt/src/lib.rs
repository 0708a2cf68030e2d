mod config;
mod output;

use std::borrow::Cow;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Parser, Subcommand};
use nasvirt_cmd::{CommandExecutor, SystemExecutor};
use nasvirt_host::Capability;
use nasvirt_libvirt::{LibvirtError, LibvirtManager, VmCreateRequest};
use nasvirt_lxc::{ContainerCreateRequest, DEFAULT_BRIDGE, LxcError, LxcManager, NetworkMode};
use serde::Serialize;
use shell_escape::unix::escape;
use thiserror::Error;
use tokio::fs::read_to_string;
use tracing::info;

pub use crate::config::{Config, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "nasvirt", version, about = "Manage lxc containers and libvirt vms on this host")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long = "config", global = true, env = "NASVIRT_CONFIG")]
    pub config_path: Option<PathBuf>,

    #[arg(long = "log", global = true, default_value = "info")]
    pub log: String,

    /// Log host commands instead of running them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which managers are usable on this host
    Status,
    /// Manage lxc containers
    Containers {
        #[command(subcommand)]
        command: ContainersCommand,
    },
    /// Manage libvirt virtual machines
    Vms {
        #[command(subcommand)]
        command: VmsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContainersCommand {
    List,
    Get {
        name: String,
    },
    Create {
        name: String,

        #[arg(long)]
        template: Option<String>,

        #[arg(long)]
        release: Option<String>,

        #[arg(long = "arch")]
        architecture: Option<String>,

        /// Memory limit in MB.
        #[arg(long = "memory")]
        memory_limit_mb: Option<u64>,

        /// CPU limit in cores.
        #[arg(long = "cpus")]
        cpu_limit: Option<u32>,

        #[arg(long)]
        autostart: bool,

        /// Attach to a host bridge instead of lxcbr0 (default bridge: br0).
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_BRIDGE)]
        bridge: Option<String>,

        #[arg(long, env = "NASVIRT_ROOT_PASSWORD", hide_env_values = true)]
        root_password: Option<String>,

        /// Public key to install for root.
        #[arg(long)]
        ssh_key_file: Option<PathBuf>,
    },
    Delete {
        name: String,
    },
    Start {
        name: String,
    },
    Stop {
        name: String,

        #[arg(long)]
        force: bool,
    },
    Restart {
        name: String,
    },
    Freeze {
        name: String,
    },
    Unfreeze {
        name: String,
    },
    /// Run a shell command inside a container
    Exec {
        name: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Print the command that attaches to a running container
    Console {
        name: String,
    },
    /// List the templates offered for new containers
    Templates,
}

#[derive(Subcommand, Debug)]
pub enum VmsCommand {
    List,
    Get {
        id: String,
    },
    Create {
        name: String,

        #[arg(long = "memory")]
        memory_mb: Option<u64>,

        #[arg(long)]
        vcpus: Option<u32>,

        #[arg(long = "disk-size")]
        disk_size_gb: Option<u64>,

        #[arg(long)]
        disk_format: Option<String>,

        #[arg(long)]
        os_type: Option<String>,

        /// Install media; without it the new disk is booted directly.
        #[arg(long = "iso")]
        iso_path: Option<PathBuf>,

        /// `default` for libvirt's NAT network, otherwise a bridge name.
        #[arg(long)]
        network: Option<String>,

        #[arg(long)]
        autostart: bool,
    },
    Delete {
        id: String,

        #[arg(long)]
        delete_disks: bool,
    },
    Start {
        id: String,
    },
    Stop {
        id: String,

        #[arg(long)]
        force: bool,
    },
    Reboot {
        id: String,
    },
    VncPort {
        id: String,
    },
    #[command(group(ArgGroup::new("toggle").required(true).args(["enable", "disable"])))]
    Autostart {
        id: String,

        #[arg(long)]
        enable: bool,

        #[arg(long)]
        disable: bool,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lxc(#[from] LxcError),

    #[error(transparent)]
    Libvirt(#[from] LibvirtError),

    #[error("failed to read ssh key {path}: {source}")]
    ReadSshKey {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode json: {0}")]
    Json(#[from] serde_json::Error),
}

pub async fn get_config(cli: &Cli) -> Result<Config, AppError> {
    let mut config = Config::load(cli.config_path.as_deref()).await?;
    if cli.dry_run {
        config.executor.dry_run = true;
    }
    Ok(config)
}

struct Context {
    config: Config,
    executor: Arc<dyn CommandExecutor>,
    json: bool,
}

impl Context {
    /// Detects lxc. Commands that need it fail with the detection error.
    fn lxc(&self) -> (LxcManager, Result<(), LxcError>) {
        if self.config.executor.dry_run {
            info!("[dry-run] assuming lxc is installed");
            let manager = LxcManager::with_capability(
                self.executor.clone(),
                self.config.lxc.clone(),
                Capability::Enabled,
            );
            return (manager, Ok(()));
        }
        LxcManager::detect(self.executor.clone(), self.config.lxc.clone())
    }

    async fn libvirt(&self) -> (LibvirtManager, Result<(), LibvirtError>) {
        if self.config.executor.dry_run {
            info!("[dry-run] assuming libvirt is installed and running");
            let manager = LibvirtManager::with_capability(
                self.executor.clone(),
                self.config.libvirt.clone(),
                Capability::Enabled,
            );
            return (manager, Ok(()));
        }
        LibvirtManager::detect(self.executor.clone(), self.config.libvirt.clone()).await
    }

    fn print<T: Serialize>(&self, value: &T, table: impl FnOnce(&T)) -> Result<(), AppError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            table(value);
        }
        Ok(())
    }
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = get_config(&cli).await?;
    let executor: Arc<dyn CommandExecutor> = Arc::new(SystemExecutor::new(&config.executor));
    let ctx = Context {
        config,
        executor,
        json: cli.json,
    };

    match cli.command {
        Command::Status => cmd_status(&ctx).await,
        Command::Containers { command } => cmd_containers(&ctx, command).await,
        Command::Vms { command } => cmd_vms(&ctx, command).await,
    }
}

#[derive(Serialize)]
struct Status {
    lxc: Capability,
    libvirt: Capability,
}

async fn cmd_status(ctx: &Context) -> Result<(), AppError> {
    let (lxc, _) = ctx.lxc();
    let (libvirt, _) = ctx.libvirt().await;
    let status = Status {
        lxc: lxc.capability().clone(),
        libvirt: libvirt.capability().clone(),
    };
    ctx.print(&status, |status| {
        output::print_status(&status.lxc, &status.libvirt)
    })
}

async fn cmd_containers(ctx: &Context, command: ContainersCommand) -> Result<(), AppError> {
    let (lxc, detected) = ctx.lxc();
    detected?;

    match command {
        ContainersCommand::List => {
            let containers = lxc.list().await?;
            ctx.print(&containers, |c| output::print_containers(c))
        }
        ContainersCommand::Get { name } => {
            let container = lxc.get(&name).await?;
            ctx.print(&container, output::print_container)
        }
        ContainersCommand::Create {
            name,
            template,
            release,
            architecture,
            memory_limit_mb,
            cpu_limit,
            autostart,
            bridge,
            root_password,
            ssh_key_file,
        } => {
            let ssh_key = match ssh_key_file {
                Some(path) => Some(read_to_string(&path).await.map_err(|source| {
                    AppError::ReadSshKey {
                        path: path.clone(),
                        source,
                    }
                })?),
                None => None,
            };
            let network = match bridge {
                None => NetworkMode::Internal,
                bridge => NetworkMode::Bridged { bridge },
            };
            let request = ContainerCreateRequest {
                name,
                template,
                release,
                architecture,
                memory_limit_mb,
                cpu_limit,
                autostart,
                network,
                root_password,
                ssh_key,
            };
            let report = lxc.create(request).await?;
            ctx.print(&report, |r| output::print_report("container", r))
        }
        ContainersCommand::Delete { name } => Ok(lxc.delete(&name).await?),
        ContainersCommand::Start { name } => Ok(lxc.start(&name).await?),
        ContainersCommand::Stop { name, force } => Ok(lxc.stop(&name, force).await?),
        ContainersCommand::Restart { name } => Ok(lxc.restart(&name).await?),
        ContainersCommand::Freeze { name } => Ok(lxc.freeze(&name).await?),
        ContainersCommand::Unfreeze { name } => Ok(lxc.unfreeze(&name).await?),
        ContainersCommand::Exec { name, command } => {
            let command = shell_line(&command);
            let result = lxc.exec_command(&name, &command).await;
            let output = match &result {
                Ok(output) => Some(output),
                Err(error) => error.output(),
            };
            if let Some(output) = output {
                if !output.stdout.is_empty() {
                    println!("{}", output.stdout);
                }
                if !output.stderr.is_empty() {
                    eprintln!("{}", output.stderr);
                }
            }
            result.map(drop).map_err(AppError::from)
        }
        ContainersCommand::Console { name } => {
            let console = lxc.console_url(&name).await?;
            println!("{console}");
            Ok(())
        }
        ContainersCommand::Templates => {
            let templates = lxc.templates()?;
            ctx.print(&templates, |t| output::print_templates(t))
        }
    }
}

/// Joins argv into one shell line that splits back into the same words.
fn shell_line(args: &[String]) -> String {
    args.iter()
        .map(|arg| escape(Cow::Borrowed(arg.as_str())))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn cmd_vms(ctx: &Context, command: VmsCommand) -> Result<(), AppError> {
    let (libvirt, detected) = ctx.libvirt().await;
    detected?;

    match command {
        VmsCommand::List => {
            let vms = libvirt.list().await?;
            ctx.print(&vms, |vms| output::print_vms(vms))
        }
        VmsCommand::Get { id } => {
            let vm = libvirt.get(&id).await?;
            ctx.print(&vm, output::print_vm)
        }
        VmsCommand::Create {
            name,
            memory_mb,
            vcpus,
            disk_size_gb,
            disk_format,
            os_type,
            iso_path,
            network,
            autostart,
        } => {
            let request = VmCreateRequest {
                name,
                memory_mb,
                vcpus,
                disk_size_gb,
                disk_format,
                os_type,
                iso_path,
                network,
                autostart,
            };
            let report = libvirt.create(request).await?;
            ctx.print(&report, |r| output::print_report("vm", r))
        }
        VmsCommand::Delete { id, delete_disks } => Ok(libvirt.delete(&id, delete_disks).await?),
        VmsCommand::Start { id } => Ok(libvirt.start(&id).await?),
        VmsCommand::Stop { id, force } => Ok(libvirt.stop(&id, force).await?),
        VmsCommand::Reboot { id } => Ok(libvirt.reboot(&id).await?),
        VmsCommand::VncPort { id } => {
            let port = libvirt.vnc_port(&id).await?;
            ctx.print(&port, |port| println!("{port}"))
        }
        VmsCommand::Autostart {
            id,
            enable,
            disable: _,
        } => Ok(libvirt.set_autostart(&id, enable).await?),
    }
}
