//! The AArch64 Debug Programmer's Model: the opcode-execution engine every
//! other ARMv8-A operation (register access, cache maintenance, some memory
//! access) is built on top of (SPEC_FULL §4.3).
//!
//! The core, once halted, executes one instruction at a time handed to it
//! through EDITR ("memory access mode" is not used here; every transfer goes
//! through the instruction-transfer path so the same engine works whether or
//! not the AP has a dedicated memory port). A 64-bit GPR is moved to or from
//! the host across the Debug Communications Channel (`DBGDTR_EL0`) as two
//! 32-bit halves, gated by `EDSCR.TXfull`/`RXfull`.

use crate::architecture::arm::core::armv8a_debug_regs::{Edscr, Editr};
use crate::architecture::arm::memory::ArmMemoryInterface;
use crate::architecture::arm::ArmError;
use crate::MemoryMappedRegister;
use std::time::Duration;

/// Deadline for EDSCR handshake waits (`ITE`/`TXfull`/`RXfull` and the
/// session-open drain/wait), per SPEC_FULL §4.3/§5.
const DPM_TIMEOUT: Duration = Duration::from_secs(1);

mod opcodes {
    //! AArch64 `MRS`/`MSR` (system register) instruction words.
    //!
    //! Built from the system-register move instruction class
    //! (`1101_0101_0011 L op0 op1 CRn CRm op2 Rt`); the base words below
    //! already bake in the `op0`/`op1`/`CRn`/`CRm`/`op2` fields for
    //! `DBGDTR_EL0`, leaving only the 5-bit `Rt` operand to be ORed in.
    pub const MRS_DBGDTR_EL0: u32 = 0xd533_0500;
    pub const MSR_DBGDTR_EL0: u32 = 0xd513_0500;
    pub const NOP: u32 = 0xd503_201f;

    pub fn mrs_dbgdtr_el0(xt: u8) -> u32 {
        MRS_DBGDTR_EL0 | (xt as u32 & 0x1f)
    }

    pub fn msr_dbgdtr_el0(xt: u8) -> u32 {
        MSR_DBGDTR_EL0 | (xt as u32 & 0x1f)
    }
}

/// Drives the EDITR/DBGDTR opcode-execution engine for a single core.
pub struct Dpm<'i> {
    memory: &'i mut dyn ArmMemoryInterface,
    debug_base: u64,
}

impl<'i> Dpm<'i> {
    /// Wraps the memory interface of a core whose external debug registers
    /// start at `debug_base`.
    pub fn new(memory: &'i mut dyn ArmMemoryInterface, debug_base: u64) -> Self {
        Self { memory, debug_base }
    }

    fn edscr(&mut self) -> Result<Edscr, ArmError> {
        let address = Edscr::get_mmio_address_from_base(self.debug_base)?;
        Ok(Edscr(self.memory.read_word_32(address)?))
    }

    fn wait_ite(&mut self) -> Result<(), ArmError> {
        let start = std::time::Instant::now();
        loop {
            if self.edscr()?.ite() {
                return Ok(());
            }
            if start.elapsed() > DPM_TIMEOUT {
                return Err(ArmError::Timeout);
            }
        }
    }

    fn wait_txfull(&mut self) -> Result<(), ArmError> {
        let start = std::time::Instant::now();
        loop {
            if self.edscr()?.txfull() {
                return Ok(());
            }
            if start.elapsed() > DPM_TIMEOUT {
                return Err(ArmError::Timeout);
            }
        }
    }

    fn wait_rxfull_clear(&mut self) -> Result<(), ArmError> {
        let start = std::time::Instant::now();
        loop {
            if !self.edscr()?.rxfull() {
                return Ok(());
            }
            if start.elapsed() > DPM_TIMEOUT {
                return Err(ArmError::Timeout);
            }
        }
    }

    /// Executes a single AArch64 instruction on the halted core through
    /// EDITR, waiting for the instruction pipeline to be ready before and
    /// advance to complete after.
    pub fn exec_opcode(&mut self, opcode: u32) -> Result<(), ArmError> {
        self.wait_ite()?;
        let address = Editr::get_mmio_address_from_base(self.debug_base)?;
        self.memory.write_word_32(address, Editr(opcode).into())?;
        self.wait_ite()?;

        let edscr = self.edscr()?;
        if edscr.ito() {
            return Err(ArmError::Other(
                "instruction transfer overrun while executing opcode through EDITR".into(),
            ));
        }
        Ok(())
    }

    /// Reads a 64-bit AArch64 general purpose register (X0-X30) through the
    /// DCC.
    pub fn read_core_reg(&mut self, n: u8) -> Result<u64, ArmError> {
        use crate::architecture::arm::core::armv8a_debug_regs::Dbgdtrtx;

        self.exec_opcode(opcodes::msr_dbgdtr_el0(n))?;

        let address = Dbgdtrtx::get_mmio_address_from_base(self.debug_base)?;

        self.wait_txfull()?;
        let lo = self.memory.read_word_32(address)?;
        self.wait_txfull()?;
        let hi = self.memory.read_word_32(address)?;

        Ok(((hi as u64) << 32) | lo as u64)
    }

    /// Writes a 64-bit AArch64 general purpose register (X0-X30) through the
    /// DCC.
    pub fn write_core_reg(&mut self, n: u8, value: u64) -> Result<(), ArmError> {
        use crate::architecture::arm::core::armv8a_debug_regs::Dbgdtrrx;

        let address = Dbgdtrrx::get_mmio_address_from_base(self.debug_base)?;

        self.wait_rxfull_clear()?;
        self.memory.write_word_32(address, value as u32)?;
        self.wait_rxfull_clear()?;
        self.memory.write_word_32(address, (value >> 32) as u32)?;

        self.exec_opcode(opcodes::mrs_dbgdtr_el0(n))
    }

    /// Executes a NOP, used to flush the instruction pipeline (e.g. after a
    /// cache maintenance opcode that needs a following `dsb`).
    pub fn exec_nop(&mut self) -> Result<(), ArmError> {
        self.exec_opcode(opcodes::NOP)
    }

    /// Writes `data` to the DCC, then executes `opcode` (an instruction that
    /// itself consumes the DCC, e.g. `ldr x0, [dbgdtr_el0]`-style encodings
    /// that read it directly rather than through a GPR).
    ///
    /// DBGDTRTX_EL0 is not touched here: only the RX half is loaded before
    /// the opcode runs (H4.4.3).
    pub fn instr_write_data_dcc(&mut self, opcode: u32, data: u32) -> Result<(), ArmError> {
        use crate::architecture::arm::core::armv8a_debug_regs::Dbgdtrrx;

        let address = Dbgdtrrx::get_mmio_address_from_base(self.debug_base)?;
        self.wait_rxfull_clear()?;
        self.memory.write_word_32(address, data)?;
        self.exec_opcode(opcode)
    }

    /// 64-bit counterpart of [`Self::instr_write_data_dcc`]: writes the low
    /// word, then the high word, before executing `opcode`.
    pub fn instr_write_data_dcc_64(&mut self, opcode: u32, data: u64) -> Result<(), ArmError> {
        use crate::architecture::arm::core::armv8a_debug_regs::Dbgdtrrx;

        let address = Dbgdtrrx::get_mmio_address_from_base(self.debug_base)?;
        self.wait_rxfull_clear()?;
        self.memory.write_word_32(address, data as u32)?;
        self.wait_rxfull_clear()?;
        self.memory.write_word_32(address, (data >> 32) as u32)?;
        self.exec_opcode(opcode)
    }

    /// Loads `data` into X0 via the DCC, then executes `opcode` (which must
    /// consume X0). Callers must mark X0 dirty afterwards so a later resume
    /// restores its prior value (SPEC_FULL §4.3 invariant ii).
    pub fn instr_write_data_x0(&mut self, opcode: u32, data: u64) -> Result<(), ArmError> {
        self.write_core_reg(0, data)?;
        self.exec_opcode(opcode)
    }

    /// Executes `opcode`, then reads its 64-bit result back off the DCC
    /// (high word, then low word).
    pub fn instr_read_data_dcc_64(&mut self, opcode: u32) -> Result<u64, ArmError> {
        use crate::architecture::arm::core::armv8a_debug_regs::Dbgdtrtx;

        self.exec_opcode(opcode)?;

        let address = Dbgdtrtx::get_mmio_address_from_base(self.debug_base)?;
        self.wait_txfull()?;
        let hi = self.memory.read_word_32(address)?;
        self.wait_txfull()?;
        let lo = self.memory.read_word_32(address)?;

        Ok(((hi as u64) << 32) | lo as u64)
    }

    /// Executes `opcode` (which must leave its result in X0), moves X0 to
    /// the DCC with `msr dbgdtr_el0, x0`, then reads it back. Callers must
    /// mark X0 dirty afterwards.
    pub fn instr_read_data_x0(&mut self, opcode: u32) -> Result<u64, ArmError> {
        self.exec_opcode(opcode)?;
        self.exec_opcode(opcodes::msr_dbgdtr_el0(0))?;

        use crate::architecture::arm::core::armv8a_debug_regs::Dbgdtrtx;
        let address = Dbgdtrtx::get_mmio_address_from_base(self.debug_base)?;
        self.wait_txfull()?;
        let lo = self.memory.read_word_32(address)?;
        self.wait_txfull()?;
        let hi = self.memory.read_word_32(address)?;

        Ok(((hi as u64) << 32) | lo as u64)
    }

    /// Programs breakpoint comparator `index` (`DBGBVR<index>`/`DBGBCR<index>`)
    /// with the given address and control word, and enables it.
    pub fn bpwp_enable(&mut self, index: u8, address: u64, control: u32) -> Result<(), ArmError> {
        use crate::architecture::arm::core::armv8a_debug_regs::{Dbgbcr, Dbgbvr};

        let slot = index as u64 * 16;
        let bvr_addr = Dbgbvr::get_mmio_address_from_base(self.debug_base)? + slot;
        let bcr_addr = Dbgbcr::get_mmio_address_from_base(self.debug_base)? + slot;

        self.memory.write_word_32(bvr_addr, address as u32)?;
        self.memory.write_word_32(bvr_addr + 4, (address >> 32) as u32)?;

        let mut bcr = Dbgbcr(control);
        bcr.set_e(true);
        self.memory.write_word_32(bcr_addr, bcr.into())
    }

    /// Disables breakpoint comparator `index` by clearing its enable bit,
    /// leaving the address/control fields otherwise intact.
    pub fn bpwp_disable(&mut self, index: u8) -> Result<(), ArmError> {
        use crate::architecture::arm::core::armv8a_debug_regs::Dbgbcr;

        let bcr_addr = Dbgbcr::get_mmio_address_from_base(self.debug_base)? + index as u64 * 16;
        let mut bcr = Dbgbcr(self.memory.read_word_32(bcr_addr)?);
        bcr.set_e(false);
        self.memory.write_word_32(bcr_addr, bcr.into())
    }

    /// Access to the underlying memory interface, for callers (cache, CTI)
    /// that need plain memory-mapped register access alongside opcode
    /// execution.
    pub fn memory(&mut self) -> &mut dyn ArmMemoryInterface {
        self.memory
    }

    /// The debug register base address this DPM is bound to.
    pub fn debug_base(&self) -> u64 {
        self.debug_base
    }
}

/// RAII guard around a DPM "prepare"/"finish" scope (SPEC_FULL §4.3, §9):
/// `finish` is a drop-glue guarantee rather than a caller discipline.
pub struct DpmSession<'i> {
    dpm: Dpm<'i>,
    shadow: &'i mut Option<Edscr>,
}

impl<'i> DpmSession<'i> {
    /// Enters the session: waits for the instruction pipeline to be ready,
    /// drains a stale RX datum left over from an aborted prior transfer, and
    /// clears sticky overrun/error bits so opcode execution starts from a
    /// known-good state.
    pub fn prepare(
        memory: &'i mut dyn ArmMemoryInterface,
        debug_base: u64,
        shadow: &'i mut Option<Edscr>,
    ) -> Result<Self, ArmError> {
        use crate::architecture::arm::core::armv8a_debug_regs::{Dbgdtrrx, Edrcr};

        let mut dpm = Dpm::new(memory, debug_base);

        dpm.wait_ite()?;

        if dpm.edscr()?.rxfull() {
            let address = Dbgdtrrx::get_mmio_address_from_base(debug_base)?;
            dpm.memory().read_word_32(address)?;
        }

        let address = Edrcr::get_mmio_address_from_base(debug_base)?;
        let mut edrcr = Edrcr(0);
        edrcr.set_cse(true);
        edrcr.set_cpsa(true);
        dpm.memory().write_word_32(address, edrcr.into())?;

        Ok(Self { dpm, shadow })
    }

    /// Borrows the underlying [`Dpm`] for the duration of the session.
    pub fn dpm(&mut self) -> &mut Dpm<'i> {
        &mut self.dpm
    }
}

impl Drop for DpmSession<'_> {
    fn drop(&mut self) {
        // `finish`: re-read EDSCR and store it in the per-core shadow so the
        // next status poll sees the state the session left the core in,
        // even if the caller never asked for a fresh read itself. Nothing
        // useful can be done with an error here, so a failed re-read just
        // leaves the shadow stale.
        if let Ok(edscr) = self.dpm.edscr() {
            *self.shadow = Some(edscr);
        }
    }
}
