use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Whether a manager's host tooling was found when it was constructed.
///
/// Fixed for the lifetime of the manager; detecting again means building a
/// new manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Capability {
    Enabled,
    Disabled { reason: String },
}

impl Capability {
    pub fn disabled(reason: impl Into<String>) -> Self {
        Capability::Disabled {
            reason: reason.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Capability::Enabled)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Capability::Enabled => None,
            Capability::Disabled { reason } => Some(reason),
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Enabled => write!(f, "enabled"),
            Capability::Disabled { reason } => write!(f, "disabled ({reason})"),
        }
    }
}
