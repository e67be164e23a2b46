//! The ARM-specific half of the target façade (SPEC_FULL §4.2-§4.6): the
//! per-core state that survives a detach/re-attach cycle, and the concrete
//! [`crate::core::CoreInterface`] drivers built on top of the ADIv5 DAP.

pub(crate) mod armv7a_debug_regs;
pub mod armv7ar;
pub mod armv8a;
pub(crate) mod armv8a_debug_regs;
pub(crate) mod cache;
pub(crate) mod cti;
pub(crate) mod dpm;
pub(crate) mod instructions;
pub mod registers;

use crate::architecture::arm::memory::ArmMemoryInterface;
use crate::core::{CoreRegisters, RegisterValue};
use crate::CoreStatus;

/// The AArch64 / ARMv8-A half of a core's persistent state: breakpoint and
/// watchpoint unit counts, and whatever was already known about the core's
/// run state the last time it was touched.
///
/// Unlike the ARMv7-A/R driver, the ARMv8-A driver does not keep a register
/// value cache here: every GPR read/write goes through the DCC each time
/// (SPEC_FULL §4.3), so there is nothing to invalidate on detach beyond the
/// run state and unit counts below.
///
/// Held by [`crate::core::core_state::SpecificCoreState`] so it survives
/// across a [`crate::core::Core`] being dropped and re-attached.
#[derive(Debug)]
pub struct CortexAState {
    initialized: bool,

    /// The core's run state, as last observed through `EDSCR.STATUS`.
    pub(crate) current_state: CoreStatus,

    /// Number of hardware breakpoint comparators (`EDDFR.BRPs + 1`), read
    /// once on first attach.
    pub(crate) num_breakpoints: Option<u32>,

    /// Number of hardware watchpoint comparators (`EDDFR.WRPs + 1`), read
    /// once on first attach.
    pub(crate) num_watchpoints: Option<u32>,

    /// Caches whether EDITR-based instruction execution has already been
    /// unlocked for this session (the `EDLAR`/`OSLAR` unlock and CTI gating
    /// done in [`crate::architecture::arm::sequences::armv8a::core_start`]
    /// only need to happen once per power domain, not once per halt).
    pub(crate) itr_enabled: bool,
}

impl CortexAState {
    /// Creates an empty, not-yet-initialized state.
    pub fn new() -> Self {
        Self {
            initialized: false,
            current_state: CoreStatus::Unknown,
            num_breakpoints: None,
            num_watchpoints: None,
            itr_enabled: false,
        }
    }

    /// Whether this state has already been populated by a prior attach.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Marks this state as populated; called once the breakpoint/watchpoint
    /// unit counts have been read back from the core.
    pub fn initialize(&mut self) {
        self.initialized = true;
    }
}

impl Default for CortexAState {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of register slots backing [`CortexARState::register_cache`]: 16
/// GPRs + CPSR + FPSCR + 32 D-registers.
const AARCH32_REGISTER_CACHE_SIZE: usize = 51;

/// The AArch32 / ARMv7-A+ARMv7-R half of a core's persistent state: the
/// lazily-populated register cache `execute_instruction` reads through, and
/// the floating point register count read once per attach.
#[derive(Debug)]
pub struct CortexARState {
    initialized: bool,

    /// The core's run state, as last observed through `DBGDSCR.StatusFlags`.
    pub(crate) current_state: CoreStatus,

    /// One slot per register id in
    /// [`registers::aarch32::AARCH32_WITH_FP_32_CORE_REGISTERS`], each
    /// either unread (`None`) or `Some((value, dirty))`.
    pub(crate) register_cache: Vec<Option<(RegisterValue, bool)>>,

    /// Number of VFP D-registers implemented (0, 16 or 32), read once from
    /// `MVFR0` on first attach.
    pub(crate) fp_reg_count: usize,

    /// Number of hardware breakpoint comparators (`DBGDIDR.BRPs + 1`).
    pub(crate) num_breakpoints: Option<u32>,
}

impl CortexARState {
    /// Creates an empty, not-yet-initialized state.
    pub fn new() -> Self {
        Self {
            initialized: false,
            current_state: CoreStatus::Unknown,
            register_cache: vec![None; AARCH32_REGISTER_CACHE_SIZE],
            fp_reg_count: 0,
            num_breakpoints: None,
        }
    }

    /// Whether this state has already been populated by a prior attach.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Marks this state as populated; called once the register cache has
    /// been reset and the floating point register count read back.
    pub fn initialize(&mut self) {
        self.initialized = true;
    }
}

impl Default for CortexARState {
    fn default() -> Self {
        Self::new()
    }
}

/// Updates `current_state` and reflects the change to the memory interface,
/// so anything caching AP-level state (the ADI memory interface's CSW cache)
/// gets a chance to notice a halt/resume/reset transition.
pub(crate) fn update_core_status(
    memory: &mut dyn ArmMemoryInterface,
    current_state: &mut CoreStatus,
    new_status: CoreStatus,
) {
    if *current_state != new_status {
        tracing::debug!(
            "Core status changed: {:?} -> {:?}",
            current_state,
            new_status
        );
    }
    *current_state = new_status;
    memory.update_core_status(new_status);
}

/// Picks the register file matching the floating point extension a core
/// variant implements.
pub(crate) fn aarch32_core_registers(fp_reg_count: usize) -> &'static CoreRegisters {
    match fp_reg_count {
        32 => &registers::aarch32::AARCH32_WITH_FP_32_CORE_REGISTERS,
        16 => &registers::aarch32::AARCH32_WITH_FP_16_CORE_REGISTERS,
        _ => &registers::aarch32::AARCH32_CORE_REGISTERS,
    }
}
