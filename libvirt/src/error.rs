use nasvirt_cmd::CommandError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibvirtError {
    /// Returned once, from detection.
    #[error("libvirt is unavailable: {reason}")]
    Unavailable { reason: String },

    /// Returned by every operation of a manager built without libvirt.
    #[error("libvirt is not enabled")]
    NotEnabled,

    #[error("invalid vm request: {0}")]
    InvalidRequest(String),

    #[error("failed to {action}: {source}")]
    Command {
        action: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to parse domain xml of {name}: {source}")]
    Xml {
        name: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("invalid vnc display: {display:?}")]
    InvalidVncDisplay { display: String },
}
