#![warn(missing_docs)]

use crate::architecture::arm::ArmError;
use crate::architecture::mips64::Mips64Error;
use crate::memory::MemoryNotAlignedError;
use crate::probe::DebugProbeError;

/// The overarching error type which contains all possible errors as variants.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum Error {
    /// An error with the usage of the probe occurred.
    Probe(#[from] DebugProbeError),

    /// An ARM specific error occurred.
    Arm(#[from] ArmError),

    /// A MIPS64 specific error occurred.
    Mips64(#[from] Mips64Error),

    /// The core with index {0} does not exist.
    CoreNotFound(usize),

    /// An operation did not complete within its allotted time.
    Timeout,

    /// A memory access was not aligned to the access width it requires.
    MemoryNotAligned(#[from] MemoryNotAlignedError),

    /// The requested feature requires one of the following architectures: {0:?}
    ArchitectureRequired(&'static [&'static str]),

    /// An operation could not be performed because it lacked the permission to do so: {0}
    ///
    /// This can for example happen when the core is locked and needs to be erased to be
    /// unlocked. Then the correct permission needs to be given to automatically unlock the
    /// core to prevent accidental erases.
    #[ignore_extra_doc_attributes]
    MissingPermissions(String),

    /// Another error occurred: {0}
    Other(String),
}
