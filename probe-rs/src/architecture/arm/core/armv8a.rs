//! The AArch64 / ARMv8-A target driver (SPEC_FULL §4.4): the `CoreInterface`
//! built on the DPM opcode pump (§4.3) and the CTI (§4.5) instead of the
//! ARMv7-A/R coprocessor-14 MCR/MRC debug loop.
//!
//! Every GPR access, every word of memory moved across the APB register
//! window, and every cache maintenance operation goes through [`Dpm`] one
//! instruction at a time; this driver's job is to sequence those opcodes
//! correctly around halt/resume and to decide which registers need writing
//! back before a resume.

use std::{sync::Arc, time::{Duration, Instant}};

use crate::{
    architecture::arm::{
        core::{
            armv8a_debug_regs::*,
            cache::{self, CacheInfo},
            cti::Cti,
            dpm::DpmSession,
            registers::aarch64::{AARCH64_CORE_REGISTERS, FP, PC, RA, SP},
        },
        memory::ArmMemoryInterface,
        sequences::ArmDebugSequence,
        ArmError,
    },
    core::{CoreRegisters, MemoryMappedRegister, RegisterId, RegisterValue},
    error::Error,
    Architecture, CoreInformation, CoreInterface, CoreRegister, CoreStatus, CoreType, Endian,
    InstructionSet, MemoryInterface, VectorCatchCondition,
};

use super::CortexAState;

/// Deadline for single-step polls and the generic "wait for a status bit"
/// loops that aren't already covered by a more specific timeout.
const OPERATION_TIMEOUT: Duration = Duration::from_millis(250);
/// Deadline for resume (EDPRSR.SDR) and CTI trigger-clear polls, matching
/// the "1-second deadline" called out for both in the resume sequence.
const RESTART_TIMEOUT: Duration = Duration::from_secs(1);

/// Index into the transient register cache each addressable register
/// occupies: X0-X30 (0-30), SP (31), PC (32), PSTATE (33).
const REGISTER_CACHE_SIZE: usize = 34;
const REG_SP: u16 = 31;
const REG_PC: u16 = 32;
const REG_PSTATE: u16 = 33;

mod opcodes {
    //! AArch64 opcodes used outside the DPM's own `mrs`/`msr dbgdtr_el0`
    //! helpers: the special-purpose debug registers for PC/PSTATE, current
    //! SP, software breakpoints, and the APB memory access loop.

    /// `mrs x0, dlr_el0` (the halted PE's saved PC).
    pub const MRS_DLR_EL0: u32 = 0xd538_4520;
    /// `msr dlr_el0, x0`
    pub const MSR_DLR_EL0: u32 = 0xd518_4520;
    /// `mrs x0, dspsr_el0` (the halted PE's saved PSTATE).
    pub const MRS_DSPSR_EL0: u32 = 0xd538_4500;
    /// `msr dspsr_el0, x0`
    pub const MSR_DSPSR_EL0: u32 = 0xd518_4500;

    /// `add x0, sp, #0` (the `mov x0, sp` alias; SP cannot be a source
    /// register for a plain register-move).
    pub const MOV_X0_SP: u32 = 0x9100_03e0;
    /// `add sp, x0, #0` (the `mov sp, x0` alias).
    pub const MOV_SP_X0: u32 = 0x9100_001f;

    /// `ldr x0, [x1], #8` (post-indexed, used to pull a 64-bit word off the
    /// target through X1 as the APB "memory pointer" register).
    pub const LDR_X0_X1_POST8: u32 = 0xf840_0420;
    /// `str x0, [x1], #8`
    pub const STR_X0_X1_POST8: u32 = 0xf800_0420;
    /// `ldr w0, [x1], #4`
    pub const LDR_W0_X1_POST4: u32 = 0xb840_0420;
    /// `str w0, [x1], #4`
    pub const STR_W0_X1_POST4: u32 = 0xb800_0420;
}

/// Errors specific to the ARMv8-A state machine.
#[derive(thiserror::Error, Debug)]
pub enum Armv8aError {
    /// Invalid register number
    #[error("Register number {0} is not valid for ARMv8-A")]
    InvalidRegisterNumber(u16),

    /// Not halted
    #[error("Core is running but operation requires it to be halted")]
    NotHalted,

    /// EDSCR.STATUS held a reserved bit pattern that doesn't correspond to
    /// any defined PE status.
    #[error("Core reported an invalid debug status 0b{0:06b}")]
    InvalidStatus(u8),

    /// The restart sequence ran to its deadline without EDPRSR.SDR setting,
    /// or the core came back up still reporting a halted, non-step status.
    #[error("Core failed to restart after a resume request")]
    FailedToRestart,
}

/// Interface for interacting with an ARMv8-A core (AArch64 execution state)
/// across ADIv5, driven through its DPM and CTI.
pub struct Armv8a<'probe> {
    memory: Box<dyn ArmMemoryInterface + 'probe>,

    state: &'probe mut CortexAState,

    debug_base: u64,
    cti_base: u64,

    sequence: Arc<dyn ArmDebugSequence>,

    /// One slot per register id in `0..REGISTER_CACHE_SIZE`; `None` means
    /// "not yet read since the last resume", matching the spec's "snapshot
    /// on debug entry, invalidate on resume" lifecycle rather than the
    /// ARMv7-A/R driver's lazy per-access cache.
    register_cache: Vec<Option<(RegisterValue, bool)>>,

    cache_info: Option<CacheInfo>,

    core_type: CoreType,

    /// Last EDSCR observed on closing a [`DpmSession`], kept for
    /// diagnostics; `status()`/`poll()` always re-read EDSCR themselves
    /// rather than trusting this shadow.
    edscr_shadow: Option<Edscr>,
}

impl<'probe> Armv8a<'probe> {
    pub(crate) fn new(
        mut memory: Box<dyn ArmMemoryInterface + 'probe>,
        state: &'probe mut CortexAState,
        debug_base: u64,
        cti_base: u64,
        sequence: Arc<dyn ArmDebugSequence>,
    ) -> Result<Self, Error> {
        if !state.itr_enabled {
            sequence.debug_core_start(
                &mut *memory,
                CoreType::Armv8a,
                Some(debug_base),
                Some(cti_base),
            )?;
            state.itr_enabled = true;
        }

        if !state.initialized() {
            let address = Edscr::get_mmio_address_from_base(debug_base)?;
            let edscr = Edscr(memory.read_word_32(address)?);

            tracing::debug!("State when connecting: {:x?}", edscr);

            state.current_state = if !edscr.is_valid_status() {
                tracing::warn!("Core reported an invalid debug status 0b{:06b} while connecting", edscr.status());
                CoreStatus::Unknown
            } else if edscr.halted() {
                CoreStatus::Halted(edscr.halt_reason())
            } else {
                CoreStatus::Running
            };
        }

        let mut core = Self {
            memory,
            state,
            debug_base,
            cti_base,
            sequence,
            register_cache: vec![None; REGISTER_CACHE_SIZE],
            cache_info: None,
            core_type: CoreType::Armv8a,
            edscr_shadow: None,
        };

        if matches!(core.state.current_state, CoreStatus::Halted(_)) {
            core.snapshot_registers()?;
        }

        if !core.state.initialized() {
            core.read_unit_counts()?;
            core.state.initialize();
        }

        Ok(core)
    }

    fn dpm(&mut self) -> Result<DpmSession<'_>, ArmError> {
        DpmSession::prepare(&mut *self.memory, self.debug_base, &mut self.edscr_shadow)
    }

    fn cti(&mut self) -> Cti<'_> {
        Cti::new(&mut *self.memory, self.cti_base)
    }

    fn edscr(&mut self) -> Result<Edscr, ArmError> {
        let address = Edscr::get_mmio_address_from_base(self.debug_base)?;
        Ok(Edscr(self.memory.read_word_32(address)?))
    }

    fn set_core_status(&mut self, new_status: CoreStatus) {
        self.memory.update_core_status(new_status);
        self.state.current_state = new_status;
    }

    fn read_unit_counts(&mut self) -> Result<(), Error> {
        let address = Eddfr::get_mmio_address_from_base(self.debug_base)?;
        let eddfr = Eddfr(self.memory.read_word_32(address)?);

        self.state.num_breakpoints = Some(eddfr.brps() + 1);
        self.state.num_watchpoints = Some(eddfr.wrps() + 1);

        Ok(())
    }

    fn reset_register_cache(&mut self) {
        self.register_cache = vec![None; REGISTER_CACHE_SIZE];
    }

    /// Reads X0..X30, SP, PC and PSTATE off the halted core and populates the
    /// cache, per the debug-entry procedure (SPEC_FULL §4.4 "Debug entry"
    /// step 2). X0 is read first because every later opcode clobbers it.
    fn snapshot_registers(&mut self) -> Result<(), ArmError> {
        self.reset_register_cache();

        for n in 0..=30u8 {
            let value = self.dpm()?.dpm().read_core_reg(n)?;
            self.register_cache[n as usize] = Some((value.into(), false));
        }

        let sp = self.dpm()?.dpm().instr_read_data_x0(opcodes::MOV_X0_SP)?;
        self.register_cache[REG_SP as usize] = Some((sp.into(), false));
        self.register_cache[0] = Some((self.dpm()?.dpm().read_core_reg(0)?.into(), false));

        let pc = self.dpm()?.dpm().instr_read_data_x0(opcodes::MRS_DLR_EL0)?;
        self.register_cache[REG_PC as usize] = Some((pc.into(), false));
        self.register_cache[0] = Some((self.dpm()?.dpm().read_core_reg(0)?.into(), false));

        let pstate = self.dpm()?.dpm().instr_read_data_x0(opcodes::MRS_DSPSR_EL0)?;
        self.register_cache[REG_PSTATE as usize] = Some(((pstate as u32).into(), false));
        self.register_cache[0] = Some((self.dpm()?.dpm().read_core_reg(0)?.into(), false));

        if self.cache_info.is_none() {
            self.cache_info = Some(cache::identify(self.dpm()?.dpm())?);
        }

        Ok(())
    }

    /// Writes every dirty cached register back to the core. PC and X30 are
    /// always treated as dirty (SPEC_FULL §4.4 "Resume" step 1), since a
    /// resume always needs to (re)establish where execution continues.
    fn writeback_registers(&mut self) -> Result<(), ArmError> {
        for n in 0..=30u16 {
            let force = n == RA.id.0;
            if let Some((value, dirty)) = self.register_cache[n as usize] {
                if dirty || force {
                    let value: u64 = value
                        .try_into()
                        .map_err(|_| ArmError::Other("register value did not fit in 64 bits".into()))?;
                    self.dpm()?.dpm().write_core_reg(n as u8, value)?;
                }
            }
        }

        if let Some((value, dirty)) = self.register_cache[REG_SP as usize] {
            if dirty {
                let value: u64 = value
                    .try_into()
                    .map_err(|_| ArmError::Other("register value did not fit in 64 bits".into()))?;
                self.dpm()?.dpm().write_core_reg(0, value)?;
                self.dpm()?.dpm().exec_opcode(opcodes::MOV_SP_X0)?;
            }
        }

        // PC is always dirty: re-establish it even if nothing touched it,
        // so a straight halt/resume with no register writes still resumes
        // at the address the core was halted at.
        if let Some((value, _)) = self.register_cache[REG_PC as usize] {
            let value: u64 = value
                .try_into()
                .map_err(|_| ArmError::Other("register value did not fit in 64 bits".into()))?;
            self.dpm()?.dpm().write_core_reg(0, value)?;
            self.dpm()?.dpm().exec_opcode(opcodes::MSR_DLR_EL0)?;
        }

        if let Some((value, dirty)) = self.register_cache[REG_PSTATE as usize] {
            if dirty {
                let value: u32 = value
                    .try_into()
                    .map_err(|_| ArmError::Other("register value did not fit in 32 bits".into()))?;
                self.dpm()?.dpm().write_core_reg(0, value as u64)?;
                self.dpm()?.dpm().exec_opcode(opcodes::MSR_DSPSR_EL0)?;
            }
        }

        Ok(())
    }

    /// Clears sticky EDSCR errors (ERR/sticky-pipeline-advance), as the
    /// first step of resuming after debug-entry register access may have
    /// tripped them.
    fn clear_sticky_errors(&mut self) -> Result<(), ArmError> {
        let address = Edrcr::get_mmio_address_from_base(self.debug_base)?;
        let mut edrcr = Edrcr(0);
        edrcr.set_cse(true);
        self.memory.write_word_32(address, edrcr.into())
    }

    fn available_breakpoint_units_inner(&mut self) -> Result<u32, Error> {
        if self.state.num_breakpoints.is_none() {
            self.read_unit_counts()?;
        }
        Ok(self.state.num_breakpoints.unwrap())
    }

    /// Performs `op` while the core is halted, halting it first if
    /// necessary and resuming it afterwards to restore the prior state.
    fn halted_access<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let was_running = !matches!(self.state.current_state, CoreStatus::Halted(_));

        if was_running {
            self.halt(OPERATION_TIMEOUT)?;
        }

        let result = op(self);

        if was_running {
            self.run()?;
        }

        result
    }

    /// Reads `len` bytes from `address` through the APB register window:
    /// the target address is staged in X1, then the DPM's opcode pump loads
    /// successive 8- or 4-byte chunks through X0 and the DCC (SPEC_FULL
    /// §4.4 "Memory access", APB path).
    fn read_apb(&mut self, address: u64, data: &mut [u8]) -> Result<(), ArmError> {
        if data.is_empty() {
            return Ok(());
        }

        self.dpm()?.dpm().write_core_reg(1, address)?;

        let mut chunks = data.chunks_exact_mut(8);
        for chunk in &mut chunks {
            self.dpm()?.dpm().exec_opcode(opcodes::LDR_X0_X1_POST8)?;
            let value = self.dpm()?.dpm().read_core_reg(0)?;
            chunk.copy_from_slice(&value.to_le_bytes());
        }

        let remainder = chunks.into_remainder();
        if remainder.len() == 4 {
            self.dpm()?.dpm().exec_opcode(opcodes::LDR_W0_X1_POST4)?;
            let value = self.dpm()?.dpm().read_core_reg(0)? as u32;
            remainder.copy_from_slice(&value.to_le_bytes());
        } else if !remainder.is_empty() {
            // Misaligned tail smaller than a word: read the enclosing word
            // and splice out the bytes we need.
            self.dpm()?.dpm().exec_opcode(opcodes::LDR_W0_X1_POST4)?;
            let value = (self.dpm()?.dpm().read_core_reg(0)? as u32).to_le_bytes();
            remainder.copy_from_slice(&value[..remainder.len()]);
        }

        self.dpm()?.dpm().exec_nop()?;
        self.clear_sticky_errors()?;

        Ok(())
    }

    /// Symmetric counterpart of [`Self::read_apb`].
    fn write_apb(&mut self, address: u64, data: &[u8]) -> Result<(), ArmError> {
        if data.is_empty() {
            return Ok(());
        }

        self.dpm()?.dpm().write_core_reg(1, address)?;

        let mut chunks = data.chunks_exact(8);
        for chunk in &mut chunks {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            self.dpm()?.dpm().write_core_reg(0, u64::from_le_bytes(buf))?;
            self.dpm()?.dpm().exec_opcode(opcodes::STR_X0_X1_POST8)?;
        }

        let remainder = chunks.remainder();
        if remainder.len() == 4 {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(remainder);
            self.dpm()?.dpm().write_core_reg(0, u32::from_le_bytes(buf) as u64)?;
            self.dpm()?.dpm().exec_opcode(opcodes::STR_W0_X1_POST4)?;
        } else if !remainder.is_empty() {
            // Misaligned tail: read-modify-write the enclosing word.
            let tail_offset = (data.len() - remainder.len()) as u64;
            let mut word = [0u8; 4];
            self.read_apb(address + tail_offset, &mut word)?;
            word[..remainder.len()].copy_from_slice(remainder);
            self.dpm()?.dpm().write_core_reg(1, address + tail_offset)?;
            self.dpm()?.dpm().write_core_reg(0, u32::from_le_bytes(word) as u64)?;
            self.dpm()?.dpm().exec_opcode(opcodes::STR_W0_X1_POST4)?;
        }

        self.dpm()?.dpm().exec_nop()?;
        self.clear_sticky_errors()?;

        Ok(())
    }
}

impl CoreInterface for Armv8a<'_> {
    fn wait_for_core_halted(&mut self, timeout: Duration) -> Result<(), Error> {
        let start = Instant::now();
        loop {
            if self.edscr()?.halted() {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(ArmError::Timeout.into());
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn core_halted(&mut self) -> Result<bool, Error> {
        Ok(self.edscr()?.halted())
    }

    fn status(&mut self) -> Result<CoreStatus, Error> {
        let edscr = self.edscr()?;

        if !edscr.is_valid_status() {
            return Err(ArmError::Armv8a(Armv8aError::InvalidStatus(edscr.status() as u8)).into());
        }

        let status = if edscr.halted() {
            CoreStatus::Halted(edscr.halt_reason())
        } else {
            CoreStatus::Running
        };

        self.set_core_status(status);
        Ok(status)
    }

    fn halt(&mut self, timeout: Duration) -> Result<CoreInformation, Error> {
        if !matches!(self.state.current_state, CoreStatus::Halted(_)) {
            self.cti().halt_single()?;
            self.wait_for_core_halted(timeout)?;
            self.cti().clear_debug_trigger()?;
            self.snapshot_registers()?;
        }

        let _ = self.status()?;

        let pc = self.read_core_reg(self.program_counter().into())?;
        Ok(CoreInformation { pc: pc.try_into()? })
    }

    fn run(&mut self) -> Result<(), Error> {
        if matches!(self.state.current_state, CoreStatus::Running) {
            return Ok(());
        }

        self.writeback_registers()?;
        self.clear_sticky_errors()?;

        self.cti().clear_debug_trigger()?;
        self.cti().arm_restart()?;
        self.cti().pulse_restart()?;

        let start = Instant::now();
        loop {
            let address = Edprsr::get_mmio_address_from_base(self.debug_base)?;
            let edprsr = Edprsr(self.memory.read_word_32(address)?);
            if edprsr.sdr() {
                break;
            }
            if start.elapsed() >= RESTART_TIMEOUT {
                return Err(ArmError::Armv8a(Armv8aError::FailedToRestart).into());
            }
        }

        if self.edscr()?.halted() {
            return Err(ArmError::Armv8a(Armv8aError::FailedToRestart).into());
        }

        self.reset_register_cache();
        self.set_core_status(CoreStatus::Running);
        let _ = self.status()?;

        Ok(())
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.sequence
            .reset_system(&mut *self.memory, CoreType::Armv8a, Some(self.debug_base))?;

        self.reset_register_cache();
        self.set_core_status(CoreStatus::Running);
        let _ = self.status()?;

        Ok(())
    }

    fn reset_and_halt(&mut self, timeout: Duration) -> Result<CoreInformation, Error> {
        self.sequence
            .reset_catch_set(&mut *self.memory, CoreType::Armv8a, Some(self.debug_base))?;
        self.sequence
            .reset_system(&mut *self.memory, CoreType::Armv8a, Some(self.debug_base))?;
        self.sequence
            .reset_catch_clear(&mut *self.memory, CoreType::Armv8a, Some(self.debug_base))?;

        self.wait_for_core_halted(timeout)?;
        self.snapshot_registers()?;

        let _ = self.status()?;

        let pc = self.read_core_reg(self.program_counter().into())?;
        Ok(CoreInformation { pc: pc.try_into()? })
    }

    fn step(&mut self) -> Result<CoreInformation, Error> {
        let address = Edecr::get_mmio_address_from_base(self.debug_base)?;
        let mut edecr = Edecr(self.memory.read_word_32(address)?);
        edecr.set_ss(true);
        self.memory.write_word_32(address, edecr.into())?;

        self.run()?;
        self.wait_for_core_halted(OPERATION_TIMEOUT)?;
        self.snapshot_registers()?;

        let mut edecr = Edecr(self.memory.read_word_32(address)?);
        edecr.set_ss(false);
        self.memory.write_word_32(address, edecr.into())?;

        let _ = self.status()?;

        let pc = self.read_core_reg(self.program_counter().into())?;
        Ok(CoreInformation { pc: pc.try_into()? })
    }

    fn read_core_reg(&mut self, address: RegisterId) -> Result<RegisterValue, Error> {
        let reg_num = address.0;

        if (reg_num as usize) < self.register_cache.len() {
            if let Some((value, _)) = self.register_cache[reg_num as usize] {
                return Ok(value);
            }
        }

        if reg_num as usize >= REGISTER_CACHE_SIZE {
            // Floating point / SIMD registers aren't modeled by this
            // driver; read as zero, matching the "FPU unavailable" stance
            // the ARMv7-A/R driver takes when FPEXC.EN is clear.
            return Ok(0u32.into());
        }

        if !matches!(self.state.current_state, CoreStatus::Halted(_)) {
            return Err(ArmError::CoreNotHalted.into());
        }

        self.snapshot_registers()?;

        self.register_cache[reg_num as usize]
            .map(|(value, _)| value)
            .ok_or_else(|| ArmError::Armv8a(Armv8aError::InvalidRegisterNumber(reg_num)).into())
    }

    fn write_core_reg(&mut self, address: RegisterId, value: RegisterValue) -> Result<(), Error> {
        let reg_num = address.0;

        if reg_num as usize >= REGISTER_CACHE_SIZE {
            // See read_core_reg: FP/SIMD writes are silently discarded.
            return Ok(());
        }

        if self.register_cache[reg_num as usize].is_none()
            && !matches!(self.state.current_state, CoreStatus::Halted(_))
        {
            return Err(ArmError::CoreNotHalted.into());
        }

        self.register_cache[reg_num as usize] = Some((value, true));
        Ok(())
    }

    fn available_breakpoint_units(&mut self) -> Result<u32, Error> {
        self.available_breakpoint_units_inner()
    }

    fn hw_breakpoints(&mut self) -> Result<Vec<Option<u64>>, Error> {
        let count = self.available_breakpoint_units()? as usize;
        let mut result = Vec::with_capacity(count);

        for index in 0..count {
            let bcr_addr = Dbgbcr::get_mmio_address_from_base(self.debug_base)? + index as u64 * 16;
            let bcr = Dbgbcr(self.memory.read_word_32(bcr_addr)?);

            if bcr.e() {
                let bvr_addr = Dbgbvr::get_mmio_address_from_base(self.debug_base)? + index as u64 * 16;
                let lo = self.memory.read_word_32(bvr_addr)? as u64;
                let hi = self.memory.read_word_32(bvr_addr + 4)? as u64;
                result.push(Some(lo | (hi << 32)));
            } else {
                result.push(None);
            }
        }

        Ok(result)
    }

    fn enable_breakpoints(&mut self, _state: bool) -> Result<(), Error> {
        // Breakpoints are always enabled once EDSCR.HDE is set, which the
        // core-start sequence already does once per session.
        Ok(())
    }

    fn set_hw_breakpoint(&mut self, bp_unit_index: usize, addr: u64) -> Result<(), Error> {
        let mut control = Dbgbcr(0);
        control.set_bt(0b0000);
        control.set_hmc(true);
        control.set_pmc(0b11);
        control.set_bas(0b1111);

        self.dpm()?.dpm()
            .bpwp_enable(bp_unit_index as u8, addr, control.into())?;

        Ok(())
    }

    fn clear_hw_breakpoint(&mut self, bp_unit_index: usize) -> Result<(), Error> {
        self.dpm()?.dpm().bpwp_disable(bp_unit_index as u8)?;
        Ok(())
    }

    fn registers(&self) -> &'static CoreRegisters {
        &AARCH64_CORE_REGISTERS
    }

    fn program_counter(&self) -> &'static CoreRegister {
        &PC
    }

    fn frame_pointer(&self) -> &'static CoreRegister {
        &FP
    }

    fn stack_pointer(&self) -> &'static CoreRegister {
        &SP
    }

    fn return_address(&self) -> &'static CoreRegister {
        &RA
    }

    fn hw_breakpoints_enabled(&self) -> bool {
        true
    }

    fn architecture(&self) -> Architecture {
        Architecture::Arm
    }

    fn core_type(&self) -> CoreType {
        self.core_type
    }

    fn instruction_set(&mut self) -> Result<InstructionSet, Error> {
        // ARMv8-A's AArch64 state is always fixed-width A64; Thumb/A32 only
        // exist under AArch32 (the `Armv7ar` driver's territory).
        Ok(InstructionSet::A64)
    }

    fn endianness(&mut self) -> Result<Endian, Error> {
        // Data endianness is controlled by SCTLR_ELx.EE, which every target
        // this driver supports leaves at its architectural reset value
        // (little).
        Ok(Endian::Little)
    }

    fn fpu_support(&mut self) -> Result<bool, Error> {
        Ok(false)
    }

    fn floating_point_register_count(&mut self) -> Result<usize, Error> {
        Ok(0)
    }

    #[tracing::instrument(skip(self))]
    fn reset_catch_set(&mut self) -> Result<(), Error> {
        self.halted_access(|core| {
            core.sequence.reset_catch_set(
                &mut *core.memory,
                CoreType::Armv8a,
                Some(core.debug_base),
            )?;
            Ok(())
        })
    }

    #[tracing::instrument(skip(self))]
    fn reset_catch_clear(&mut self) -> Result<(), Error> {
        self.halted_access(|core| {
            core.sequence.reset_catch_clear(
                &mut *core.memory,
                CoreType::Armv8a,
                Some(core.debug_base),
            )?;
            Ok(())
        })
    }

    #[tracing::instrument(skip(self))]
    fn debug_core_stop(&mut self) -> Result<(), Error> {
        if matches!(self.state.current_state, CoreStatus::Halted(_)) {
            self.writeback_registers()?;
        }

        self.sequence.debug_core_stop(&mut *self.memory)?;
        Ok(())
    }

    fn enable_vector_catch(&mut self, _condition: VectorCatchCondition) -> Result<(), Error> {
        Err(ArmError::NotImplemented("vector catch on ARMv8-A").into())
    }

    fn disable_vector_catch(&mut self, _condition: VectorCatchCondition) -> Result<(), Error> {
        Ok(())
    }

    fn is_64_bit(&self) -> bool {
        true
    }

    fn spill_registers(&mut self) -> Result<(), Error> {
        self.writeback_registers().map_err(Into::into)
    }
}

impl MemoryInterface for Armv8a<'_> {
    fn supports_native_64bit_access(&mut self) -> bool {
        true
    }

    fn read_word_64(&mut self, address: u64) -> Result<u64, Error> {
        self.halted_access(|core| {
            let mut bytes = [0u8; 8];
            core.read_apb(address, &mut bytes)?;
            Ok(u64::from_le_bytes(bytes))
        })
    }

    fn read_word_32(&mut self, address: u64) -> Result<u32, Error> {
        self.halted_access(|core| {
            let mut bytes = [0u8; 4];
            core.read_apb(address, &mut bytes)?;
            Ok(u32::from_le_bytes(bytes))
        })
    }

    fn read_word_16(&mut self, address: u64) -> Result<u16, Error> {
        self.halted_access(|core| {
            let mut bytes = [0u8; 2];
            core.read_apb(address, &mut bytes)?;
            Ok(u16::from_le_bytes(bytes))
        })
    }

    fn read_word_8(&mut self, address: u64) -> Result<u8, Error> {
        self.halted_access(|core| {
            let mut bytes = [0u8; 1];
            core.read_apb(address, &mut bytes)?;
            Ok(bytes[0])
        })
    }

    fn read(&mut self, address: u64, data: &mut [u8]) -> Result<(), Error> {
        self.halted_access(|core| core.read_apb(address, data).map_err(Into::into))
    }

    fn write_word_64(&mut self, address: u64, data: u64) -> Result<(), Error> {
        self.halted_access(|core| core.write_apb(address, &data.to_le_bytes()).map_err(Into::into))
    }

    fn write_word_32(&mut self, address: u64, data: u32) -> Result<(), Error> {
        self.halted_access(|core| core.write_apb(address, &data.to_le_bytes()).map_err(Into::into))
    }

    fn write_word_16(&mut self, address: u64, data: u16) -> Result<(), Error> {
        self.halted_access(|core| core.write_apb(address, &data.to_le_bytes()).map_err(Into::into))
    }

    fn write_word_8(&mut self, address: u64, data: u8) -> Result<(), Error> {
        self.halted_access(|core| core.write_apb(address, &[data]).map_err(Into::into))
    }

    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), Error> {
        self.halted_access(|core| core.write_apb(address, data).map_err(Into::into))
    }

    fn supports_8bit_transfers(&self) -> Result<bool, Error> {
        Ok(true)
    }

    fn flush(&mut self) -> Result<(), Error> {
        if let Some(info) = self.cache_info.clone() {
            let mut session = self.dpm()?;
            cache::flush_all(session.dpm(), &info)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        architecture::arm::{
            ap::ApAddress, communication_interface::ArmAccess, sequences::DefaultArmSequence,
            FullyQualifiedApAddress,
        },
    };

    const TEST_DEBUG_BASE: u64 = 0x8001_0000;
    const TEST_CTI_BASE: u64 = 0x8000_0000;

    /// A bare-bones in-memory `ArmMemoryInterface` that answers EDSCR as
    /// "halted, external debug request" and otherwise just stores whatever
    /// was last written to each word-aligned address, which is enough to
    /// exercise the register snapshot/writeback and status-decode paths
    /// without a real probe attached.
    struct MockMemory {
        words: std::collections::HashMap<u64, u32>,
    }

    impl MockMemory {
        fn new() -> Self {
            let mut words = std::collections::HashMap::new();
            let mut edscr = Edscr(0);
            edscr.set_status(0b010011);
            edscr.set_ite(true);
            words.insert(Edscr::get_mmio_address_from_base(TEST_DEBUG_BASE).unwrap(), edscr.into());

            words.insert(Eddfr::get_mmio_address_from_base(TEST_DEBUG_BASE).unwrap(), 0);

            Self { words }
        }
    }

    impl MemoryInterface<ArmError> for MockMemory {
        fn supports_native_64bit_access(&mut self) -> bool {
            false
        }

        fn read_word_32(&mut self, address: u64) -> Result<u32, ArmError> {
            Ok(*self.words.get(&address).unwrap_or(&0))
        }

        fn read_word_64(&mut self, address: u64) -> Result<u64, ArmError> {
            let lo = self.read_word_32(address)? as u64;
            let hi = self.read_word_32(address + 4)? as u64;
            Ok(lo | (hi << 32))
        }

        fn read_word_16(&mut self, _address: u64) -> Result<u16, ArmError> {
            unimplemented!()
        }

        fn read_word_8(&mut self, _address: u64) -> Result<u8, ArmError> {
            unimplemented!()
        }

        fn read(&mut self, _address: u64, _data: &mut [u8]) -> Result<(), ArmError> {
            unimplemented!()
        }

        fn write_word_64(&mut self, address: u64, data: u64) -> Result<(), ArmError> {
            self.write_word_32(address, data as u32)?;
            self.write_word_32(address + 4, (data >> 32) as u32)
        }

        fn write_word_32(&mut self, address: u64, data: u32) -> Result<(), ArmError> {
            self.words.insert(address, data);
            if let Ok(edscr_addr) = Edscr::get_mmio_address_from_base(TEST_DEBUG_BASE) {
                let mut edscr = Edscr(*self.words.get(&edscr_addr).unwrap_or(&0));
                edscr.set_ite(true);
                self.words.insert(edscr_addr, edscr.into());
            }
            Ok(())
        }

        fn write_word_16(&mut self, _address: u64, _data: u16) -> Result<(), ArmError> {
            unimplemented!()
        }

        fn write_word_8(&mut self, _address: u64, _data: u8) -> Result<(), ArmError> {
            unimplemented!()
        }

        fn write(&mut self, _address: u64, _data: &[u8]) -> Result<(), ArmError> {
            unimplemented!()
        }

        fn supports_8bit_transfers(&self) -> Result<bool, ArmError> {
            Ok(false)
        }

        fn flush(&mut self) -> Result<(), ArmError> {
            Ok(())
        }
    }

    impl ArmMemoryInterface for MockMemory {
        fn fully_qualified_address(&self) -> FullyQualifiedApAddress {
            FullyQualifiedApAddress::v1_with_default_dp(ApAddress::default())
        }

        fn base_address(&mut self) -> Result<u64, ArmError> {
            Ok(0)
        }

        fn generic_status(&mut self) -> Result<crate::architecture::arm::ap::Csw, ArmError> {
            Ok(Default::default())
        }

        fn get_arm_debug_interface(&mut self) -> Result<&mut dyn ArmAccess, ArmError> {
            Err(ArmError::NotImplemented("banked access unused by this mock"))
        }
    }

    fn new_core(memory: MockMemory, state: &mut CortexAState) -> Armv8a<'_> {
        Armv8a::new(
            Box::new(memory),
            state,
            TEST_DEBUG_BASE,
            TEST_CTI_BASE,
            DefaultArmSequence::create(),
        )
        .expect("core should attach against a halted mock")
    }

    #[test]
    fn attaches_in_halted_state_with_request_reason() {
        let mut state = CortexAState::new();
        let mut core = new_core(MockMemory::new(), &mut state);

        assert!(matches!(
            core.status().unwrap(),
            CoreStatus::Halted(crate::HaltReason::Request)
        ));
    }

    #[test]
    fn register_cache_reports_written_value_before_resume() {
        let mut state = CortexAState::new();
        let mut core = new_core(MockMemory::new(), &mut state);

        core.write_core_reg(RegisterId(3), 0x1234_5678u32.into())
            .unwrap();
        let value: u32 = core.read_core_reg(RegisterId(3)).unwrap().try_into().unwrap();
        assert_eq!(value, 0x1234_5678);
    }

    #[test]
    fn floating_point_registers_read_as_zero() {
        let mut state = CortexAState::new();
        let mut core = new_core(MockMemory::new(), &mut state);

        let value: u32 = core.read_core_reg(RegisterId(34)).unwrap().try_into().unwrap();
        assert_eq!(value, 0);
    }

    #[test]
    fn is_64_bit_and_instruction_set_are_fixed() {
        let mut state = CortexAState::new();
        let mut core = new_core(MockMemory::new(), &mut state);

        assert!(core.is_64_bit());
        assert_eq!(core.instruction_set().unwrap(), InstructionSet::A64);
    }
}
