use nasvirt_cmd::ExecutorConfig;
use nasvirt_libvirt::LibvirtConfig;
use nasvirt_lxc::LxcConfig;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::read_to_string;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "nasvirt.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub executor: ExecutorConfig,
    pub lxc: LxcConfig,
    pub libvirt: LibvirtConfig,
}

impl Config {
    /// Loads `path`, or `nasvirt.toml` in the working directory.
    ///
    /// A file that does not exist gives the defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let path = if path.is_dir() {
            path.join(DEFAULT_CONFIG_FILE)
        } else {
            path.to_owned()
        };

        let string = match read_to_string(&path).await {
            Ok(string) => string,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                debug!("no config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        Self::parse(&path, &string)
    }

    fn parse(path: &Path, string: &str) -> Result<Self, ConfigError> {
        toml::from_str(string).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}
