//! Static register-file descriptions for the AArch32 and AArch64 core
//! variants this crate drives, looked up by [`crate::core::CoreRegisters`]
//! and addressed by [`crate::core::RegisterId`].

pub(crate) mod aarch32;
pub(crate) mod aarch64;
pub(crate) mod arm32_common;
