//! Per-core-type debug entry/reset sequencing (SPEC_FULL §4.2, §4.5): the
//! handful of steps a target needs before its external debug registers
//! behave the way the rest of this crate assumes (OS lock cleared, CTI
//! gated and routed, halt/reset-catch enabled), factored out of the
//! architecture drivers so a vendor-specific target can override just the
//! step it needs to.

pub mod armv7a;
pub mod armv8a;

use std::{error::Error, sync::Arc};

use probe_rs_target::CoreType;

use crate::architecture::arm::{memory::ArmMemoryInterface, ArmError};

/// An error occurred when executing an ARM debug sequence.
#[derive(thiserror::Error, Debug)]
pub enum ArmDebugSequenceError {
    /// Debug base address is required but not specified
    #[error("Core access requires debug_base to be specified, but it is not")]
    DebugBaseNotSpecified,

    /// CTI base address is required but not specified
    #[error("Core access requires cti_base to be specified, but it is not")]
    CtiBaseNotSpecified,

    /// An error occurred in a debug sequence.
    #[error("An error occurred in a debug sequence: {0}")]
    SequenceSpecific(#[from] Box<dyn Error + Send + Sync + 'static>),
}

/// The default sequence used for targets that do not specify their own.
pub struct DefaultArmSequence(pub(crate) ());

impl DefaultArmSequence {
    /// Creates a new default ARM debug sequence.
    pub fn create() -> Arc<dyn ArmDebugSequence> {
        Arc::new(Self(()))
    }
}

impl ArmDebugSequence for DefaultArmSequence {}

/// Per-core-type hooks a vendor target description can override to bring its
/// core(s) into, and back out of, debug state.
///
/// The ADIv5 power-up sequence itself
/// ([`crate::architecture::arm::communication_interface::ArmCommunicationInterface::dap_dp_init`])
/// and flash/erase vendor handling are not part of this trait: the former
/// has no per-core variation to hook, the latter is out of scope for this
/// crate (SPEC_FULL §1).
pub trait ArmDebugSequence: Send + Sync {
    /// Initializes a core's external debug registers (OS lock, CTI routing,
    /// halt enable) so it can be driven through this crate's DAP-based
    /// drivers. Based on the `DebugCoreStart` step of the CoreSight debug
    /// sequence model.
    fn debug_core_start(
        &self,
        core: &mut dyn ArmMemoryInterface,
        core_type: CoreType,
        debug_base: Option<u64>,
        cti_base: Option<u64>,
    ) -> Result<(), ArmError> {
        match core_type {
            CoreType::Armv7ar => armv7a::core_start(core, debug_base),
            CoreType::Armv8a => armv8a::core_start(core, debug_base, cti_base),
            CoreType::Mips64 => Ok(()),
        }
    }

    /// Configures the core to halt as soon as it comes out of reset.
    /// Based on the `ResetCatchSet` step of the CoreSight debug sequence
    /// model.
    fn reset_catch_set(
        &self,
        core: &mut dyn ArmMemoryInterface,
        core_type: CoreType,
        debug_base: Option<u64>,
    ) -> Result<(), ArmError> {
        match core_type {
            CoreType::Armv7ar => armv7a::reset_catch_set(core, debug_base),
            CoreType::Armv8a => armv8a::reset_catch_set(core, debug_base),
            CoreType::Mips64 => Ok(()),
        }
    }

    /// Frees the hardware resource allocated by [`Self::reset_catch_set`].
    /// Based on the `ResetCatchClear` step of the CoreSight debug sequence
    /// model.
    fn reset_catch_clear(
        &self,
        core: &mut dyn ArmMemoryInterface,
        core_type: CoreType,
        debug_base: Option<u64>,
    ) -> Result<(), ArmError> {
        match core_type {
            CoreType::Armv7ar => armv7a::reset_catch_clear(core, debug_base),
            CoreType::Armv8a => armv8a::reset_catch_clear(core, debug_base),
            CoreType::Mips64 => Ok(()),
        }
    }

    /// Executes a warm reset that preserves the debug connection, via the
    /// core's own reset-request register, and waits for it to complete.
    /// Based on the `ResetSystem` step of the CoreSight debug sequence
    /// model.
    fn reset_system(
        &self,
        interface: &mut dyn ArmMemoryInterface,
        core_type: CoreType,
        debug_base: Option<u64>,
    ) -> Result<(), ArmError> {
        match core_type {
            CoreType::Armv7ar => armv7a::reset_system(interface, debug_base),
            CoreType::Armv8a => armv8a::reset_system(interface, debug_base),
            CoreType::Mips64 => Ok(()),
        }
    }

    /// Executed when the debugger session disconnects from the core.
    fn debug_core_stop(&self, _core: &mut dyn ArmMemoryInterface) -> Result<(), ArmError> {
        Ok(())
    }
}
