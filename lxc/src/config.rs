use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LxcConfig {
    /// Directory holding one `<name>/config` per container.
    pub lxc_path: PathBuf,
    pub create_timeout_secs: u64,
    /// Wait between starting a new container and provisioning it.
    pub provision_settle_secs: u64,
}

impl Default for LxcConfig {
    fn default() -> Self {
        Self {
            lxc_path: PathBuf::from("/var/lib/lxc"),
            create_timeout_secs: 600,
            provision_settle_secs: 3,
        }
    }
}

impl LxcConfig {
    pub fn config_file(&self, name: &str) -> PathBuf {
        self.lxc_path.join(name).join("config")
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }

    pub fn provision_settle(&self) -> Duration {
        Duration::from_secs(self.provision_settle_secs)
    }
}
