//! A debug host CORE for driving targets through their vendor debug
//! interfaces: ARMv8-A over ADIv5 DAP + CTI, AArch32 (ARMv7-A/ARMv7-R) over
//! the same DAP, and MIPS64 over EJTAG PrAcc.
//!
//! This crate implements the target-facing half of a debugger: given a
//! transport that can already shift JTAG/SWD bits ([`probe::DapProbe`] /
//! [`probe::JtagAccess`]), it walks the CoreSight ROM table, drives each
//! core's external debug registers to halt/resume/step/read/write it, and
//! exposes the result as a uniform [`CoreInterface`] regardless of
//! architecture. Bringing up a concrete transport, programming flash, and
//! speaking GDB remote serial protocol are all out of scope; see
//! [`core::core_state::CombinedCoreState`] for where a higher layer plugs in.

#![allow(clippy::useless_let_if_seq)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::verbose_bit_mask)]

pub mod architecture;
mod core;
mod error;
mod memory;
mod probe;

pub use crate::core::{
    core_state::{CombinedCoreState, SpecificCoreState},
    memory_mapped_registers::{memory_mapped_bitfield_register, MemoryMappedRegister, RegisterAddressOutOfBounds},
    registers::{
        CoreRegister, CoreRegisters, RegisterDataType, RegisterId, RegisterRole, RegisterValue,
        RegisterValueResultExt, UnwindRule,
    },
    BreakpointId, CommunicationInterface, Core, CoreInformation, CoreInterface, CoreList,
    CoreStatus, Endian, HaltReason, InstructionSet, SemihostingCommand, VectorCatchCondition,
};
pub use crate::core::BreakpointCause;
pub use crate::error::Error;
pub use crate::memory::{Memory, MemoryInterface};
pub use crate::probe::{DapPort, DapProbe, DebugProbe, DebugProbeError, JtagAccess};
pub use probe_rs_target::{Architecture, CoreType};
