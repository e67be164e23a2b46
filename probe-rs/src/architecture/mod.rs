//! Architecture-specific debug drivers.
//!
//! Each submodule implements [`crate::core::CoreInterface`] for one family of
//! targets, on top of whatever transport-level primitives that family needs
//! (the ADIv5 DAP for [`arm`], raw JTAG for [`mips64`]).

pub mod arm;
pub mod mips64;
