//! Pieces shared by the container and VM managers.

mod advisory;
mod capability;
mod field;
mod memory;

pub use crate::advisory::*;
pub use crate::capability::*;
pub use crate::field::*;
pub use crate::memory::*;
