//! Types and functions for interacting with target memory.

pub(crate) mod adi_memory_interface;
pub mod romtable;

pub(crate) use adi_memory_interface::ADIMemoryInterface;

use crate::{CoreStatus, memory::MemoryInterface};

use super::{ap::Csw, communication_interface::ArmAccess, ArmError, FullyQualifiedApAddress};
pub use romtable::{Component, ComponentId, CoresightComponent, PeripheralType, RomTable};

/// A [`MemoryInterface`] bound to a specific MEM-AP, i.e. the thing
/// [`super::ArmProbeInterface::memory_interface`] hands back.
pub trait ArmMemoryInterface: MemoryInterface<ArmError> {
    /// The underlying MemoryAp address.
    fn fully_qualified_address(&self) -> FullyQualifiedApAddress;

    /// The underlying memory AP's base address (BASE/BASE2), used by the
    /// ROM-table walker to find the first CoreSight component.
    fn base_address(&mut self) -> Result<u64, ArmError>;

    /// The current value of CSW as last reflected by this AP (not cached).
    fn generic_status(&mut self) -> Result<Csw, ArmError>;

    /// Borrows the raw DP/AP transaction engine behind this memory
    /// interface, for callers that need banked register access alongside
    /// the ordinary `MemoryInterface` path (the AArch32 DPM's banked
    /// DTRRX/ITR/DSCR/DTRTX window).
    fn get_arm_debug_interface(&mut self) -> Result<&mut dyn ArmAccess, ArmError>;

    /// Inform the probe of the [`CoreStatus`] of the chip/core attached to
    /// the probe.
    ///
    /// This is infallible: it is usually only a visual indication (e.g. an
    /// LED) and a failure to update it should never abort a debug session.
    fn update_core_status(&mut self, _state: CoreStatus) {}
}
