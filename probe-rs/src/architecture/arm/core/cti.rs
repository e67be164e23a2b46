//! Cross Trigger Interface driver (SPEC_FULL §4.5): the channel/trigger
//! matrix an ARMv8-A core's CTI sits behind, used to halt and restart one
//! core or a whole SMP cluster in lock-step.
//!
//! Three channels are used by convention, matching
//! [`crate::architecture::arm::sequences::armv8a::core_start`]'s wiring:
//! Debug requests go out on channel 0, Restart requests on channel 1, and a
//! cross-halt fan-out (every core's halt trigger gated onto every other
//! core's Debug input) uses channel 2.

use crate::architecture::arm::core::armv8a_debug_regs::{
    CtiApppulse, CtiGate, CtiIntack, CtiOuten, CtiTrigoutstatus,
};
use crate::architecture::arm::memory::ArmMemoryInterface;
use crate::architecture::arm::ArmError;
use crate::MemoryMappedRegister;

/// Channel carrying the Debug (halt) request trigger.
pub const CHANNEL_DEBUG: u32 = 0;
/// Channel carrying the Restart trigger.
pub const CHANNEL_RESTART: u32 = 1;
/// Channel used to fan a halt out to every core in an SMP cluster.
pub const CHANNEL_CROSS_HALT: u32 = 2;

/// Thin wrapper around a single core's CTI register window.
pub struct Cti<'i> {
    memory: &'i mut dyn ArmMemoryInterface,
    cti_base: u64,
}

impl<'i> Cti<'i> {
    pub fn new(memory: &'i mut dyn ArmMemoryInterface, cti_base: u64) -> Self {
        Self { memory, cti_base }
    }

    fn read<R: crate::MemoryMappedRegister<u32>>(&mut self) -> Result<R, ArmError> {
        let address = R::get_mmio_address_from_base(self.cti_base)?;
        Ok(R::from(self.memory.read_word_32(address)?))
    }

    fn write<R: crate::MemoryMappedRegister<u32> + Into<u32>>(&mut self, reg: R) -> Result<(), ArmError> {
        let address = R::get_mmio_address_from_base(self.cti_base)?;
        self.memory.write_word_32(address, reg.into())
    }

    /// Gates `channel` onto the CTM (clears the corresponding CTIGATE bit,
    /// making channel events from this core visible to the other CTIs
    /// sharing the cross-trigger matrix).
    fn gate_channel(&mut self, channel: u32) -> Result<(), ArmError> {
        let mut gate: CtiGate = self.read()?;
        gate.set_en(channel as usize, 1);
        self.write(gate)
    }

    /// Routes an input channel to one of this CTI's trigger outputs by
    /// setting the bit in `CTIOUTEN<output>` for `channel`.
    fn route_output(&mut self, output: u32, channel: u32) -> Result<(), ArmError> {
        let address = CtiOuten::get_mmio_address_from_base(self.cti_base)? + (output as u64) * 4;
        let mut outen = CtiOuten(self.memory.read_word_32(address)?);
        outen.set_outen(channel as usize, 1);
        self.memory.write_word_32(address, outen.into())
    }

    /// Pulses `channel` through CTIAPPPULSE, generating a one-shot trigger
    /// event on it.
    fn pulse(&mut self, channel: u32) -> Result<(), ArmError> {
        let mut apppulse = CtiApppulse(0);
        apppulse.set_apppulse(channel as usize, 1);
        self.write(apppulse)
    }

    /// Acknowledges (clears) a latched output trigger on `channel`.
    fn acknowledge(&mut self, channel: u32) -> Result<(), ArmError> {
        let mut intack = CtiIntack(0);
        intack.set_ack(channel as usize, 1);
        self.write(intack)
    }

    /// Polls `CTITRIGOUTSTATUS` until `channel`'s bit clears, or times out.
    fn wait_trigout_clear(&mut self, channel: u32, deadline: std::time::Duration) -> Result<(), ArmError> {
        let start = std::time::Instant::now();
        loop {
            let status: CtiTrigoutstatus = self.read()?;
            if status.status(channel as usize) == 0 {
                return Ok(());
            }
            if start.elapsed() > deadline {
                return Err(ArmError::Timeout);
            }
        }
    }

    /// Requests a halt on this core alone: gates the Debug channel shut
    /// (ch0 stays local, not propagated to the CTM), routes it to this
    /// CTI's own Debug-request output, then pulses it.
    pub fn halt_single(&mut self) -> Result<(), ArmError> {
        let mut gate: CtiGate = self.read()?;
        gate.set_en(CHANNEL_DEBUG as usize, 0);
        self.write(gate)?;

        self.route_output(CHANNEL_DEBUG, CHANNEL_DEBUG)?;
        self.pulse(CHANNEL_DEBUG)
    }

    /// Wires this core's CTI into an SMP cross-halt group: any cross-halt
    /// event (channel 2) from any peer's CTI arrives here gated onto the
    /// CTM and re-emitted as a Debug-request to this core.
    pub fn enable_cross_halt(&mut self) -> Result<(), ArmError> {
        self.gate_channel(CHANNEL_CROSS_HALT)?;
        self.route_output(CHANNEL_DEBUG, CHANNEL_CROSS_HALT)
    }

    /// Clears a pending Debug trigger (acknowledges channel 0 and waits for
    /// `CTITRIGOUTSTATUS` to reflect the clear), matching the resume
    /// sequence's first step before a Restart pulse (SPEC_FULL §4.4
    /// "Resume").
    pub fn clear_debug_trigger(&mut self) -> Result<(), ArmError> {
        self.acknowledge(CHANNEL_DEBUG)?;
        self.wait_trigout_clear(CHANNEL_DEBUG, std::time::Duration::from_secs(1))
    }

    /// Gates and routes the Restart channel for this core, readying it to
    /// receive a Restart pulse from [`Self::pulse_restart`] without itself
    /// generating one.
    pub fn arm_restart(&mut self) -> Result<(), ArmError> {
        self.gate_channel(CHANNEL_RESTART)?;
        self.route_output(CHANNEL_RESTART, CHANNEL_RESTART)
    }

    /// Emits the actual Restart trigger pulse. Called once, on the last
    /// peer of an SMP restart, after every peer has been armed via
    /// [`Self::arm_restart`].
    pub fn pulse_restart(&mut self) -> Result<(), ArmError> {
        self.pulse(CHANNEL_RESTART)
    }
}
