use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use crate::error::LibvirtError;

/// Run state as `virsh domstate` words it: `running`, `shut off`, `paused`, ...
///
/// Kept as text; libvirt's vocabulary is the authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VmState(String);

impl VmState {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_running(&self) -> bool {
        self.0 == "running"
    }
}

impl Default for VmState {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Display for VmState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VmDisk {
    pub path: Option<String>,
    /// Not probed; image sizes need `qemu-img info` per disk.
    pub size_gb: Option<u64>,
    pub format: Option<String>,
    pub bus: Option<String>,
    /// `disk`, `cdrom`, ...
    pub device: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VmNetwork {
    /// `network`, `bridge`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub source: Option<String>,
    pub mac: Option<String>,
    pub model: Option<String>,
}

/// A domain as observed through `virsh` right now. Never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VirtualMachine {
    pub uuid: String,
    pub name: String,
    pub state: VmState,
    pub memory_mb: u64,
    pub vcpus: u32,
    pub disk_size_gb: Option<u64>,
    pub autostart: bool,
    pub os_type: String,
    pub architecture: String,
    pub disks: Vec<VmDisk>,
    pub networks: Vec<VmNetwork>,
}

pub const DEFAULT_MEMORY_MB: u64 = 2048;
pub const DEFAULT_VCPUS: u32 = 2;
pub const DEFAULT_DISK_SIZE_GB: u64 = 20;
pub const DEFAULT_DISK_FORMAT: &str = "qcow2";
pub const DEFAULT_OS_TYPE: &str = "linux";
/// Name of libvirt's NAT network. Any other value is taken as a bridge.
pub const DEFAULT_NETWORK: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VmCreateRequest {
    pub name: String,
    pub memory_mb: Option<u64>,
    pub vcpus: Option<u32>,
    pub disk_size_gb: Option<u64>,
    pub disk_format: Option<String>,
    pub os_type: Option<String>,
    /// Install media. Without it the new disk is imported and booted as is.
    pub iso_path: Option<PathBuf>,
    pub network: Option<String>,
    pub autostart: bool,
}

impl VmCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn resolve(self) -> Result<ResolvedVmCreate, LibvirtError> {
        let name = validate_name(&self.name)?.to_string();

        let or_default = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let disk_format = or_default(self.disk_format, DEFAULT_DISK_FORMAT);
        if !disk_format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LibvirtError::InvalidRequest(format!(
                "invalid disk format: {disk_format:?}"
            )));
        }

        Ok(ResolvedVmCreate {
            name,
            memory_mb: self.memory_mb.filter(|mb| *mb > 0).unwrap_or(DEFAULT_MEMORY_MB),
            vcpus: self.vcpus.filter(|n| *n > 0).unwrap_or(DEFAULT_VCPUS),
            disk_size_gb: self
                .disk_size_gb
                .filter(|gb| *gb > 0)
                .unwrap_or(DEFAULT_DISK_SIZE_GB),
            disk_format,
            os_type: or_default(self.os_type, DEFAULT_OS_TYPE),
            iso_path: self.iso_path.filter(|p| !p.as_os_str().is_empty()),
            network: or_default(self.network, DEFAULT_NETWORK),
            autostart: self.autostart,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedVmCreate {
    pub name: String,
    pub memory_mb: u64,
    pub vcpus: u32,
    pub disk_size_gb: u64,
    pub disk_format: String,
    pub os_type: String,
    pub iso_path: Option<PathBuf>,
    pub network: String,
    pub autostart: bool,
}

impl ResolvedVmCreate {
    /// Value of `virt-install --network`.
    pub fn network_arg(&self) -> String {
        if self.network == DEFAULT_NETWORK {
            format!("network={DEFAULT_NETWORK},model=virtio")
        } else {
            format!("bridge={},model=virtio", self.network)
        }
    }
}

/// A name or uuid, passed to `virsh` as a single argument.
pub(crate) fn validate_name(name: &str) -> Result<&str, LibvirtError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LibvirtError::InvalidRequest("vm name is required".to_string()));
    }
    if name.starts_with('-') || name.contains('/') || name.contains(char::is_whitespace) {
        return Err(LibvirtError::InvalidRequest(format!(
            "invalid vm name: {name:?}"
        )));
    }
    Ok(name)
}
