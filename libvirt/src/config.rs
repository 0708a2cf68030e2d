use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibvirtConfig {
    /// Where backing disk images are created.
    pub images_dir: PathBuf,
    /// Unit probed with `systemctl is-active`. Modular installs use `virtqemud`.
    pub service: String,
    pub install_timeout_secs: u64,
}

impl Default for LibvirtConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("/var/lib/libvirt/images"),
            service: "libvirtd".to_string(),
            install_timeout_secs: 600,
        }
    }
}

impl LibvirtConfig {
    pub fn disk_path(&self, name: &str, format: &str) -> PathBuf {
        self.images_dir.join(format!("{name}.{format}"))
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }
}
