//! Per-core state that survives across attach/detach cycles, and the
//! `attach_*` constructors that turn it into a live [`Core`].

use crate::architecture::arm::core::armv7ar::Armv7ar;
use crate::architecture::arm::core::armv8a::Armv8a;
use crate::architecture::arm::core::{CortexARState, CortexAState};
use crate::architecture::arm::memory::ArmMemoryInterface;
use crate::architecture::arm::sequences::{ArmDebugSequence, DefaultArmSequence};
use crate::architecture::mips64::core::Mips64;
use crate::core::{Core, CoreInterface};
use crate::error::Error;
use crate::probe::JtagAccess;
use probe_rs_target::CoreType;
use std::sync::Arc;

/// The architecture-specific half of a core's persistent state.
///
/// Each ARM variant carries its own state struct (breakpoint bookkeeping,
/// register cache) so it survives a detach/re-attach cycle even though the
/// `CoreInterface` instance built on top of it does not.
#[derive(Debug)]
pub enum SpecificCoreState {
    /// An ARMv8-A core, driven through the ADIv5 DAP and the AArch64 DPM.
    Armv8a(CortexAState),
    /// An ARMv7-A or ARMv7-R core, driven through the ADIv5 DAP and CP14.
    Armv7ar(CortexARState),
    /// A MIPS64 core, driven through EJTAG PrAcc.
    Mips64,
}

impl SpecificCoreState {
    /// Creates the state matching a target description's core type.
    pub fn from_core_type(core_type: CoreType) -> Self {
        match core_type {
            CoreType::Armv8a => SpecificCoreState::Armv8a(CortexAState::new()),
            CoreType::Armv7ar => SpecificCoreState::Armv7ar(CortexARState::new()),
            CoreType::Mips64 => SpecificCoreState::Mips64,
        }
    }

    /// The core type this state was created for.
    pub fn core_type(&self) -> CoreType {
        match self {
            SpecificCoreState::Armv8a(_) => CoreType::Armv8a,
            SpecificCoreState::Armv7ar(_) => CoreType::Armv7ar,
            SpecificCoreState::Mips64 => CoreType::Mips64,
        }
    }
}

/// One core of an attached target: its index and which architecture drives
/// it. `Session` (not yet part of this crate) is expected to own one of
/// these per core listed in the target description.
#[derive(Debug)]
pub struct CombinedCoreState {
    id: usize,
    specific_state: SpecificCoreState,
}

impl CombinedCoreState {
    /// Creates the state for core `id`.
    pub fn new(id: usize, specific_state: SpecificCoreState) -> Self {
        Self { id, specific_state }
    }

    /// This core's index.
    pub fn id(&self) -> usize {
        self.id
    }

    /// This core's type.
    pub fn core_type(&self) -> CoreType {
        self.specific_state.core_type()
    }

    /// Attaches to an ARM core (`Armv8a` or `Armv7ar`) reachable through
    /// `memory`, whose external debug registers are mapped at `debug_base`
    /// (and, for `Armv8a`, whose CTI registers are mapped at `cti_base`).
    pub fn attach_arm<'probe>(
        &'probe mut self,
        memory: Box<dyn ArmMemoryInterface + 'probe>,
        debug_base: u64,
        cti_base: u64,
    ) -> Result<Core<'probe>, Error> {
        let sequence: Arc<dyn ArmDebugSequence> = DefaultArmSequence::create();
        let inner: Box<dyn CoreInterface + 'probe> = match &mut self.specific_state {
            SpecificCoreState::Armv8a(state) => Box::new(Armv8a::new(
                memory,
                state,
                debug_base,
                cti_base,
                sequence.clone(),
            )?),
            SpecificCoreState::Armv7ar(state) => Box::new(Armv7ar::new(
                memory,
                state,
                debug_base,
                sequence,
                CoreType::Armv7ar,
            )?),
            SpecificCoreState::Mips64 => {
                return Err(Error::ArchitectureRequired(&["arm"]));
            }
        };
        Ok(Core::new(self.id, inner))
    }

    /// Attaches to a MIPS64 core reachable over `probe`'s TAP `tap_index`.
    pub fn attach_mips64<'probe>(
        &self,
        probe: &'probe mut dyn JtagAccess,
        tap_index: usize,
    ) -> Result<Core<'probe>, Error> {
        match self.specific_state {
            SpecificCoreState::Mips64 => {
                let inner: Box<dyn CoreInterface + 'probe> = Box::new(Mips64::new(probe, tap_index));
                Ok(Core::new(self.id, inner))
            }
            _ => Err(Error::ArchitectureRequired(&["mips64"])),
        }
    }
}
