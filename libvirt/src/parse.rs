use nasvirt_host::labeled_value;

use crate::error::LibvirtError;

/// Display `:0` listens on this port.
pub const VNC_BASE_PORT: u16 = 5900;

/// Turns `virsh vncdisplay` output (`:3`, `127.0.0.1:3`) into a TCP port.
///
/// Anything without a numeric `:N` suffix is rejected rather than guessed.
pub fn parse_vnc_port(display: &str) -> Result<u16, LibvirtError> {
    let display = display.trim();
    let invalid = || LibvirtError::InvalidVncDisplay {
        display: display.to_string(),
    };

    let (_, number) = display.rsplit_once(':').ok_or_else(invalid)?;
    let number: u16 = number.parse().map_err(|_| invalid())?;
    VNC_BASE_PORT.checked_add(number).ok_or_else(invalid)
}

/// Reads the `Autostart:` line of `virsh dominfo` output.
pub fn parse_autostart(dominfo: &str) -> Option<bool> {
    dominfo
        .lines()
        .find_map(|line| labeled_value(line, "Autostart:"))
        .map(|value| value == "enable")
}

/// One uuid per line from `virsh list --all --uuid`.
pub fn parse_uuids(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
