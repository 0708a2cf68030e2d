use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{LxcError, ParseError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContainerState {
    Running,
    Stopped,
    Frozen,
}

impl FromStr for ContainerState {
    type Err = ParseError;

    /// Transitional states fold into the state they are heading for.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" | "STARTING" | "THAWED" => Ok(ContainerState::Running),
            "STOPPED" | "STOPPING" | "ABORTING" => Ok(ContainerState::Stopped),
            "FROZEN" | "FREEZING" => Ok(ContainerState::Frozen),
            _ => Err(ParseError::UnknownState(s.trim().to_string())),
        }
    }
}

impl Display for ContainerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ContainerState::Running => write!(f, "RUNNING"),
            ContainerState::Stopped => write!(f, "STOPPED"),
            ContainerState::Frozen => write!(f, "FROZEN"),
        }
    }
}

/// A container as observed on the host right now. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub name: String,
    pub state: ContainerState,
    pub pid: Option<u32>,
    pub memory_mb: Option<u64>,
    pub memory_limit_mb: Option<u64>,
    /// Cumulative CPU time reported by `lxc-info`.
    pub cpu_seconds: Option<f64>,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub autostart: bool,
    pub template: Option<String>,
}

impl Container {
    pub fn new(name: impl Into<String>, state: ContainerState) -> Self {
        Self {
            name: name.into(),
            state,
            pid: None,
            memory_mb: None,
            memory_limit_mb: None,
            cpu_seconds: None,
            ipv4: None,
            ipv6: None,
            autostart: false,
            template: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NetworkMode {
    /// The host's `lxcbr0` NAT bridge, as configured by the download template.
    #[default]
    Internal,
    Bridged {
        #[serde(default)]
        bridge: Option<String>,
    },
}

pub const DEFAULT_TEMPLATE: &str = "ubuntu";
pub const DEFAULT_RELEASE: &str = "22.04";
pub const DEFAULT_ARCH: &str = "amd64";
pub const DEFAULT_BRIDGE: &str = "br0";

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerCreateRequest {
    pub name: String,
    pub template: Option<String>,
    pub release: Option<String>,
    pub architecture: Option<String>,
    pub memory_limit_mb: Option<u64>,
    pub cpu_limit: Option<u32>,
    pub autostart: bool,
    pub network: NetworkMode,
    pub root_password: Option<String>,
    pub ssh_key: Option<String>,
}

impl fmt::Debug for ContainerCreateRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerCreateRequest")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("release", &self.release)
            .field("architecture", &self.architecture)
            .field("memory_limit_mb", &self.memory_limit_mb)
            .field("cpu_limit", &self.cpu_limit)
            .field("autostart", &self.autostart)
            .field("network", &self.network)
            .field("root_password", &self.root_password.as_ref().map(|_| "<redacted>"))
            .field("ssh_key", &self.ssh_key.is_some())
            .finish()
    }
}

impl ContainerCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validates the request and fills in defaults.
    pub(crate) fn resolve(self) -> Result<ResolvedCreate, LxcError> {
        let name = validate_name(&self.name)?.to_string();

        let or_default = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let bridge = match self.network {
            NetworkMode::Internal => None,
            NetworkMode::Bridged { bridge } => Some(or_default(bridge, DEFAULT_BRIDGE)),
        };

        Ok(ResolvedCreate {
            name,
            template: or_default(self.template, DEFAULT_TEMPLATE),
            release: or_default(self.release, DEFAULT_RELEASE),
            architecture: or_default(self.architecture, DEFAULT_ARCH),
            memory_limit_mb: self.memory_limit_mb.filter(|mb| *mb > 0),
            cpu_limit: self.cpu_limit.filter(|cpus| *cpus > 0),
            autostart: self.autostart,
            bridge,
            root_password: self.root_password.filter(|p| !p.is_empty()),
            ssh_key: self
                .ssh_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ResolvedCreate {
    pub name: String,
    pub template: String,
    pub release: String,
    pub architecture: String,
    pub memory_limit_mb: Option<u64>,
    pub cpu_limit: Option<u32>,
    pub autostart: bool,
    pub bridge: Option<String>,
    pub root_password: Option<String>,
    pub ssh_key: Option<String>,
}

impl fmt::Debug for ResolvedCreate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCreate")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("release", &self.release)
            .field("architecture", &self.architecture)
            .field("memory_limit_mb", &self.memory_limit_mb)
            .field("cpu_limit", &self.cpu_limit)
            .field("autostart", &self.autostart)
            .field("bridge", &self.bridge)
            .field("root_password", &self.root_password.as_ref().map(|_| "<redacted>"))
            .field("ssh_key", &self.ssh_key.is_some())
            .finish()
    }
}

impl ResolvedCreate {
    pub fn needs_provisioning(&self) -> bool {
        self.root_password.is_some() || self.ssh_key.is_some()
    }
}

/// Container names end up in host paths and command lines.
pub(crate) fn validate_name(name: &str) -> Result<&str, LxcError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LxcError::InvalidRequest(
            "container name is required".to_string(),
        ));
    }
    if name.starts_with('-') || name.contains('/') || name.contains(char::is_whitespace) {
        return Err(LxcError::InvalidRequest(format!(
            "invalid container name: {name:?}"
        )));
    }
    Ok(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub releases: &'static [&'static str],
    pub architectures: &'static [&'static str],
}

/// Distributions offered by the `download` template. Not queried from the host.
pub const TEMPLATES: &[Template] = &[
    Template {
        name: "ubuntu",
        description: "Ubuntu Linux",
        releases: &["20.04", "22.04", "24.04"],
        architectures: &["amd64", "arm64"],
    },
    Template {
        name: "debian",
        description: "Debian Linux",
        releases: &["bullseye", "bookworm"],
        architectures: &["amd64", "arm64"],
    },
    Template {
        name: "alpine",
        description: "Alpine Linux",
        releases: &["3.17", "3.18", "3.19"],
        architectures: &["amd64", "arm64"],
    },
    Template {
        name: "centos",
        description: "CentOS Linux",
        releases: &["7", "8", "9"],
        architectures: &["amd64", "arm64"],
    },
];
