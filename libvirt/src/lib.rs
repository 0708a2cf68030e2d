//! Management of KVM virtual machines through libvirt's command line tools.

mod config;
mod domain;
mod error;
mod manager;
mod parse;
mod types;

pub use crate::config::LibvirtConfig;
pub use crate::domain::parse_domain;
pub use crate::error::LibvirtError;
pub use crate::manager::LibvirtManager;
pub use crate::parse::{VNC_BASE_PORT, parse_autostart, parse_vnc_port};
pub use crate::types::{
    DEFAULT_DISK_FORMAT, DEFAULT_DISK_SIZE_GB, DEFAULT_MEMORY_MB, DEFAULT_NETWORK,
    DEFAULT_OS_TYPE, DEFAULT_VCPUS, VirtualMachine, VmCreateRequest, VmDisk, VmNetwork, VmState,
};
