//! Management of lxc system containers through the `lxc-*` command line tools.

mod config;
mod config_file;
mod error;
mod manager;
mod parse;
mod types;

pub use crate::config::LxcConfig;
pub use crate::error::{LxcError, ParseError};
pub use crate::manager::LxcManager;
pub use crate::parse::{parse_info, parse_list};
pub use crate::types::{
    Container, ContainerCreateRequest, ContainerState, DEFAULT_ARCH, DEFAULT_BRIDGE,
    DEFAULT_RELEASE, DEFAULT_TEMPLATE, NetworkMode, TEMPLATES, Template,
};
