//! The target façade (SPEC_FULL §4.8): the [`CoreInterface`] trait every
//! architecture driver implements, and the [`Core`] wrapper the rest of the
//! crate programs against instead of a concrete driver type.

pub(crate) mod communication_interface;
pub mod core_state;
pub mod core_status;
#[macro_use]
pub mod memory_mapped_registers;
pub mod registers;

pub use communication_interface::CommunicationInterface;
pub use core_status::{BreakpointCause, CoreStatus, HaltReason, SemihostingCommand, VectorCatchCondition};
pub use memory_mapped_registers::{MemoryMappedRegister, RegisterAddressOutOfBounds};
pub use registers::{
    CoreRegister, CoreRegisters, RegisterDataType, RegisterId, RegisterRole, RegisterValue,
    RegisterValueResultExt, UnwindRule,
};

use crate::core::core_state::CombinedCoreState;
use crate::error::Error;
use crate::memory::MemoryInterface;
use probe_rs_target::{Architecture, CoreType};
use std::time::Duration;

/// The byte order a core's data accesses use.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

/// The instruction set a core is currently executing, where more than one is
/// selectable at runtime (AArch32 cores can switch between `A32` and
/// `Thumb2`; AArch64 and MIPS64 cores do not).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InstructionSet {
    /// AArch32 / ARMv7-A "ARM" instruction set: fixed 32-bit instructions.
    A32,
    /// AArch32 Thumb-2: mixed 16/32-bit instructions.
    Thumb2,
    /// AArch64 "A64" instruction set.
    A64,
    /// The MIPS64 instruction set.
    Mips64,
}

impl InstructionSet {
    /// Whether every instruction in this set is a fixed number of bytes wide.
    pub fn is_fixed_width(&self) -> bool {
        !matches!(self, InstructionSet::Thumb2)
    }
}

/// The program counter value at the time the core most recently halted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CoreInformation {
    /// The current value of the program counter.
    pub pc: u64,
}

/// The operations every architecture driver (`Armv8a`, `Armv7ar`, `Mips64`)
/// implements identically from the rest of the crate's point of view
/// (SPEC_FULL §4.8). Concrete drivers may of course differ wildly in how
/// they realize each operation.
///
/// Every driver also implements [`MemoryInterface`], so a `Box<dyn
/// CoreInterface>` gives the rest of the crate both register/control-plane
/// access and memory access through one trait object.
pub trait CoreInterface: MemoryInterface + std::fmt::Debug {
    /// Waits up to `timeout` for the core to reach the halted state,
    /// returning an error if it does not.
    fn wait_for_core_halted(&mut self, timeout: Duration) -> Result<(), Error>;

    /// Whether the core is currently halted.
    fn core_halted(&mut self) -> Result<bool, Error>;

    /// Refreshes and returns the core's current status.
    fn status(&mut self) -> Result<CoreStatus, Error>;

    /// Halts the core, waiting up to `timeout` for the halt to take effect.
    fn halt(&mut self, timeout: Duration) -> Result<CoreInformation, Error>;

    /// Resumes a halted core from its current program counter.
    fn run(&mut self) -> Result<(), Error>;

    /// Resets the core and leaves it running.
    fn reset(&mut self) -> Result<(), Error>;

    /// Resets the core and halts it as early as possible after reset.
    fn reset_and_halt(&mut self, timeout: Duration) -> Result<CoreInformation, Error>;

    /// Single-steps one instruction.
    fn step(&mut self) -> Result<CoreInformation, Error>;

    /// Reads a core register.
    fn read_core_reg(&mut self, address: RegisterId) -> Result<RegisterValue, Error>;

    /// Writes a core register.
    fn write_core_reg(&mut self, address: RegisterId, value: RegisterValue) -> Result<(), Error>;

    /// The number of hardware breakpoint comparators available.
    fn available_breakpoint_units(&mut self) -> Result<u32, Error>;

    /// The address currently installed in each hardware breakpoint
    /// comparator, or `None` for comparators that are disabled.
    fn hw_breakpoints(&mut self) -> Result<Vec<Option<u64>>, Error>;

    /// Globally enables or disables the hardware breakpoint comparators.
    fn enable_breakpoints(&mut self, state: bool) -> Result<(), Error>;

    /// Installs a hardware breakpoint at `addr` in comparator `unit_index`.
    fn set_hw_breakpoint(&mut self, unit_index: usize, addr: u64) -> Result<(), Error>;

    /// Clears the hardware breakpoint installed in comparator `unit_index`.
    fn clear_hw_breakpoint(&mut self, unit_index: usize) -> Result<(), Error>;

    /// The register set this core exposes.
    fn registers(&self) -> &'static CoreRegisters;

    /// This core's program counter register.
    fn program_counter(&self) -> &'static CoreRegister;

    /// This core's frame pointer register.
    fn frame_pointer(&self) -> &'static CoreRegister;

    /// This core's stack pointer register.
    fn stack_pointer(&self) -> &'static CoreRegister;

    /// This core's return address / link register.
    fn return_address(&self) -> &'static CoreRegister;

    /// Whether hardware breakpoints are currently enabled.
    fn hw_breakpoints_enabled(&self) -> bool;

    /// The architecture family this driver implements.
    fn architecture(&self) -> Architecture;

    /// The exact core type this driver implements.
    fn core_type(&self) -> CoreType;

    /// The instruction set the core is currently executing.
    fn instruction_set(&mut self) -> Result<InstructionSet, Error>;

    /// The byte order of this core's data accesses.
    fn endianness(&mut self) -> Result<Endian, Error>;

    /// Whether this core has a floating point unit.
    fn fpu_support(&mut self) -> Result<bool, Error>;

    /// The number of floating point registers this core exposes.
    fn floating_point_register_count(&mut self) -> Result<usize, Error>;

    /// Configures the core to halt, rather than run, immediately out of
    /// reset.
    fn reset_catch_set(&mut self) -> Result<(), Error>;

    /// Reverts [`CoreInterface::reset_catch_set`].
    fn reset_catch_clear(&mut self) -> Result<(), Error>;

    /// Disables debug while leaving the core itself running, releasing any
    /// debug resources that would otherwise stay claimed.
    fn debug_core_stop(&mut self) -> Result<(), Error>;

    /// Enables a vector catch for the given condition.
    fn enable_vector_catch(&mut self, condition: VectorCatchCondition) -> Result<(), Error>;

    /// Disables a vector catch for the given condition.
    fn disable_vector_catch(&mut self, condition: VectorCatchCondition) -> Result<(), Error>;

    /// Whether this core's general purpose registers are 64 bits wide.
    fn is_64_bit(&self) -> bool;

    /// Flushes any register writes the driver has deferred (e.g. to batch a
    /// burst of DCC traffic) out to the core.
    fn spill_registers(&mut self) -> Result<(), Error>;
}

/// A single software breakpoint location `run`/`step` temporarily clear and
/// reinstate around a target operation, as distinct from the hardware
/// comparators the architecture driver owns directly.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Breakpoint {
    pub(crate) address: u64,
    pub(crate) register_hw: usize,
}

/// A handle to a breakpoint set through [`Core::set_hw_breakpoint`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BreakpointId(pub(crate) usize);

/// A live connection to a single core of an attached target.
///
/// This is the type the rest of the crate (and its consumers) programs
/// against; `inner` is one of the three `CoreInterface` implementors
/// (`Armv8a`, `Armv7ar`, `Mips64`) boxed behind the trait so the rest of the
/// crate does not need to be generic over architecture.
pub struct Core<'probe> {
    id: usize,
    inner: Box<dyn CoreInterface + 'probe>,
    breakpoints: Vec<Breakpoint>,
}

impl<'probe> Core<'probe> {
    /// Wraps an architecture driver as core `id`.
    pub fn new(id: usize, inner: Box<dyn CoreInterface + 'probe>) -> Self {
        Self {
            id,
            inner,
            breakpoints: Vec::new(),
        }
    }

    /// This core's index within its target's `CombinedCoreState` list.
    pub fn id(&self) -> usize {
        self.id
    }

    /// See [`CoreInterface::status`].
    #[tracing::instrument(skip(self))]
    pub fn status(&mut self) -> Result<CoreStatus, Error> {
        self.inner.status()
    }

    /// See [`CoreInterface::halt`].
    #[tracing::instrument(skip(self))]
    pub fn halt(&mut self, timeout: Duration) -> Result<CoreInformation, Error> {
        self.inner.halt(timeout)
    }

    /// Resumes the core, temporarily lifting any software breakpoint sitting
    /// exactly on the current program counter so the core can step past it.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> Result<(), Error> {
        self.step_over_breakpoint_at_pc()?;
        self.inner.run()
    }

    /// See [`CoreInterface::reset`].
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) -> Result<(), Error> {
        self.inner.reset()
    }

    /// See [`CoreInterface::reset_and_halt`].
    #[tracing::instrument(skip(self))]
    pub fn reset_and_halt(&mut self, timeout: Duration) -> Result<CoreInformation, Error> {
        self.inner.reset_and_halt(timeout)
    }

    /// Single-steps, hopping over a software breakpoint at the current PC if
    /// there is one.
    #[tracing::instrument(skip(self))]
    pub fn step(&mut self) -> Result<CoreInformation, Error> {
        self.step_over_breakpoint_at_pc()?;
        self.inner.step()
    }

    fn step_over_breakpoint_at_pc(&mut self) -> Result<(), Error> {
        let pc_id = self.inner.program_counter().id();
        let pc: u64 = self.inner.read_core_reg(pc_id)?.try_into()?;

        if let Some(bp) = self.breakpoints.iter().find(|bp| bp.address == pc).copied() {
            self.inner.clear_hw_breakpoint(bp.register_hw)?;
            self.inner.step()?;
            self.inner.set_hw_breakpoint(bp.register_hw, bp.address)?;
        }
        Ok(())
    }

    /// See [`CoreInterface::read_core_reg`].
    pub fn read_core_reg(&mut self, address: impl Into<RegisterId>) -> Result<RegisterValue, Error> {
        self.inner.read_core_reg(address.into())
    }

    /// See [`CoreInterface::write_core_reg`].
    pub fn write_core_reg(
        &mut self,
        address: impl Into<RegisterId>,
        value: impl Into<RegisterValue>,
    ) -> Result<(), Error> {
        self.inner.write_core_reg(address.into(), value.into())
    }

    /// The architecture-specific register set.
    pub fn registers(&self) -> &'static CoreRegisters {
        self.inner.registers()
    }

    /// Reads a 32-bit word at `address`.
    pub fn read_word_32(&mut self, address: u64) -> Result<u32, Error> {
        self.inner.read_word_32(address)
    }

    /// Reads an 8-bit byte at `address`.
    pub fn read_word_8(&mut self, address: u64) -> Result<u8, Error> {
        self.inner.read_word_8(address)
    }

    /// Writes a 32-bit word at `address`.
    pub fn write_word_32(&mut self, address: u64, data: u32) -> Result<(), Error> {
        self.inner.write_word_32(address, data)
    }

    /// Writes an 8-bit byte at `address`.
    pub fn write_word_8(&mut self, address: u64, data: u8) -> Result<(), Error> {
        self.inner.write_word_8(address, data)
    }

    /// Reads a block of 32-bit words at `address`.
    pub fn read_32(&mut self, address: u64, data: &mut [u32]) -> Result<(), Error> {
        self.inner.read_32(address, data)
    }

    /// Writes a block of 32-bit words at `address`.
    pub fn write_32(&mut self, address: u64, data: &[u32]) -> Result<(), Error> {
        self.inner.write_32(address, data)
    }

    /// The number of hardware breakpoint comparators available.
    pub fn get_available_breakpoint_units(&mut self) -> Result<u32, Error> {
        self.inner.available_breakpoint_units()
    }

    /// Finds a free hardware breakpoint comparator index, if any.
    pub fn find_free_breakpoint_unit(&mut self) -> Result<usize, Error> {
        let available = self.get_available_breakpoint_units()? as usize;
        let used: Vec<usize> = self.breakpoints.iter().map(|bp| bp.register_hw).collect();
        (0..available)
            .find(|index| !used.contains(index))
            .ok_or_else(|| Error::Other("no free hardware breakpoint unit available".into()))
    }

    /// Installs a software-tracked hardware breakpoint at `address`, picking
    /// a free comparator automatically.
    pub fn set_hw_breakpoint(&mut self, address: u64) -> Result<(), Error> {
        let unit = self.find_free_breakpoint_unit()?;
        self.inner.set_hw_breakpoint(unit, address)?;
        self.breakpoints.push(Breakpoint {
            address,
            register_hw: unit,
        });
        Ok(())
    }

    /// Removes the software-tracked hardware breakpoint at `address`, if one
    /// is installed.
    pub fn clear_hw_breakpoint(&mut self, address: u64) -> Result<(), Error> {
        if let Some(index) = self.breakpoints.iter().position(|bp| bp.address == address) {
            let bp = self.breakpoints.remove(index);
            self.inner.clear_hw_breakpoint(bp.register_hw)?;
        }
        Ok(())
    }

    /// See [`CoreInterface::reset_catch_set`]/[`CoreInterface::reset_catch_clear`].
    pub fn assert_reset_catch(&mut self) -> Result<(), Error> {
        self.inner.reset_catch_set()
    }

    /// See [`CoreInterface::reset_catch_clear`].
    pub fn deassert_reset_catch(&mut self) -> Result<(), Error> {
        self.inner.reset_catch_clear()
    }

    /// See [`CoreInterface::debug_core_stop`].
    pub fn debug_core_stop(&mut self) -> Result<(), Error> {
        self.inner.debug_core_stop()
    }

    /// The architecture family this core belongs to.
    pub fn architecture(&self) -> Architecture {
        self.inner.architecture()
    }

    /// The exact core type.
    pub fn core_type(&self) -> CoreType {
        self.inner.core_type()
    }

    /// The instruction set the core is currently executing.
    pub fn instruction_set(&mut self) -> Result<InstructionSet, Error> {
        self.inner.instruction_set()
    }
}

/// Every attached core of a target, indexed by [`Core::id`].
pub struct CoreList(Vec<CombinedCoreState>);

impl CoreList {
    pub(crate) fn new(cores: Vec<CombinedCoreState>) -> Self {
        Self(cores)
    }

    /// The number of cores.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no cores (never true for an attached target, but
    /// kept for API symmetry).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
