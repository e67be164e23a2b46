//! EJTAG TAP-level primitives: instruction encodings and the Control/Address/
//! Data register triplet the PrAcc handshake is built from.
//!
//! Register bit layouts follow the EJTAG debug specification as commonly
//! implemented by MIPS cores of the PrAcc generation (EJTAG 2.0 - 2.6); no
//! vendor-specific quirks are modeled here beyond the `ejtag_version` hint
//! carried in the target description (`Mips64CoreAccessOptions`).

use crate::architecture::mips64::Mips64Error;
use crate::probe::JtagAccess;

/// EJTAG TAP instructions (values shifted into IR).
pub mod instr {
    /// Selects the IDCODE register.
    pub const IDCODE: u32 = 0x01;
    /// Selects the IMPCODE register (implementation-specific capability bits).
    pub const IMPCODE: u32 = 0x03;
    /// Selects the EJTAG Address register.
    pub const ADDRESS: u32 = 0x08;
    /// Selects the EJTAG Data register.
    pub const DATA: u32 = 0x09;
    /// Selects the EJTAG Control register.
    pub const CONTROL: u32 = 0x0a;
    /// Selects the "all" register (Address+Data+Control shifted together).
    pub const ALL: u32 = 0x0b;
    /// Puts the target into EJTAG debug boot mode.
    pub const EJTAGBOOT: u32 = 0x0c;
    /// Selects the FASTDATA register used for bulk memory transfer.
    pub const FASTDATA: u32 = 0x0e;
    /// BYPASS, as on any JTAG TAP.
    pub const BYPASS: u32 = 0xff;
}

bitfield::bitfield! {
    /// The EJTAG Control register (written/read through [`instr::CONTROL`]).
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct EjtagControl(u32);
    impl Debug;

    /// Reset occurred since this bit was last cleared (write 1 to clear).
    pub rocc, set_rocc: 31;
    /// Processor size of the pending PrAcc access: 2 = 32-bit, 3 = 64-bit.
    pub psz, _: 30, 29;
    /// The DSEG segment is accessible for debug use.
    pub vped, _: 25;
    /// Debug mode: the processor is stalled in the debug exception handler.
    pub dm, _: 3;
    /// A probe-induced debug exception is pending.
    pub dlock, set_dlock: 5;
    /// Processor read-not-write: 0 = target is fetching/loading (host supplies
    /// data), 1 = target is storing (host consumes data).
    pub prnw, _: 19;
    /// A PrAcc handshake step is pending; cleared by the host once served.
    pub pracc, set_pracc: 18;
    /// Processor reset request.
    pub prrst, set_prrst: 16;
    /// Peripheral reset request.
    pub perrst, set_perrst: 20;
    /// Debug interrupt exception request.
    pub ejtagbrk, set_ejtagbrk: 12;
    /// Synchronisation: set once the TAP has observed the current request.
    pub sync_, set_sync: 23;
}

impl From<u32> for EjtagControl {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<EjtagControl> for u32 {
    fn from(value: EjtagControl) -> Self {
        value.0
    }
}

/// The decoded access a stalled target is requesting of the host during a
/// PrAcc handshake step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PraccRequest {
    /// Address the target is fetching/loading from or storing to.
    pub address: u64,
    /// `true` if the target is storing (host must consume [`Self::address`]
    /// via a Data register read), `false` if it is fetching/loading (host
    /// must supply a value via a Data register write).
    pub is_store: bool,
    /// Decoded access width in bytes (4 or 8).
    pub width: u8,
}

/// Drives the Control/Address/Data register triplet of a single EJTAG TAP.
///
/// This is the MIPS equivalent of the ARM `DapAccess` trait boundary: the
/// primitive the PrAcc engine (`architecture::mips64::pracc`) is built on.
pub struct EjtagInterface<'probe> {
    probe: &'probe mut dyn JtagAccess,
    tap_index: usize,
}

impl<'probe> EjtagInterface<'probe> {
    /// Creates a new interface driving the TAP at `tap_index` on the scan
    /// chain reachable through `probe`.
    pub fn new(probe: &'probe mut dyn JtagAccess, tap_index: usize) -> Self {
        Self { probe, tap_index }
    }

    fn select(&mut self, instruction: u32) -> Result<(), Mips64Error> {
        self.probe
            .jtag_shift_ir(self.tap_index, instruction, 5)
            .map_err(Mips64Error::Probe)
    }

    /// Reads the EJTAG Control register.
    pub fn read_control(&mut self) -> Result<EjtagControl, Mips64Error> {
        self.select(instr::CONTROL)?;
        let value = self
            .probe
            .jtag_shift_dr(self.tap_index, 0, 32)
            .map_err(Mips64Error::Probe)?;
        Ok(EjtagControl::from(value as u32))
    }

    /// Writes the EJTAG Control register, returning the value shifted out
    /// (the register's previous contents, per the EJTAG spec's read-modify
    /// shift behavior).
    pub fn write_control(&mut self, value: EjtagControl) -> Result<EjtagControl, Mips64Error> {
        self.select(instr::CONTROL)?;
        let out = self
            .probe
            .jtag_shift_dr(self.tap_index, u32::from(value) as u64, 32)
            .map_err(Mips64Error::Probe)?;
        Ok(EjtagControl::from(out as u32))
    }

    /// Reads the 32-bit address the target issued for the pending PrAcc
    /// access.
    pub fn read_address(&mut self) -> Result<u32, Mips64Error> {
        self.select(instr::ADDRESS)?;
        Ok(self
            .probe
            .jtag_shift_dr(self.tap_index, 0, 32)
            .map_err(Mips64Error::Probe)? as u32)
    }

    /// Reads the EJTAG Data register (target is storing: this is the value it
    /// wrote).
    pub fn read_data(&mut self) -> Result<u32, Mips64Error> {
        self.select(instr::DATA)?;
        Ok(self
            .probe
            .jtag_shift_dr(self.tap_index, 0, 32)
            .map_err(Mips64Error::Probe)? as u32)
    }

    /// Writes the EJTAG Data register (target is fetching/loading: this is
    /// the value it will read).
    pub fn write_data(&mut self, value: u32) -> Result<(), Mips64Error> {
        self.select(instr::DATA)?;
        self.probe
            .jtag_shift_dr(self.tap_index, value as u64, 32)
            .map_err(Mips64Error::Probe)?;
        Ok(())
    }

    /// Reads the 64-bit EJTAG Data register (MIPS64 PrAcc transfers move a
    /// full doubleword per handshake step, not a 32-bit word).
    pub fn read_data64(&mut self) -> Result<u64, Mips64Error> {
        self.select(instr::DATA)?;
        self.probe
            .jtag_shift_dr(self.tap_index, 0, 64)
            .map_err(Mips64Error::Probe)
    }

    /// Writes the 64-bit EJTAG Data register.
    pub fn write_data64(&mut self, value: u64) -> Result<(), Mips64Error> {
        self.select(instr::DATA)?;
        self.probe
            .jtag_shift_dr(self.tap_index, value, 64)
            .map_err(Mips64Error::Probe)?;
        Ok(())
    }

    /// Streams `count` 32-bit words through the FASTDATA register for the
    /// bulk-transfer handler (`architecture::mips64::pracc::fastdata_xfer`).
    pub fn fastdata_shift(&mut self, value: u32) -> Result<u32, Mips64Error> {
        self.select(instr::FASTDATA)?;
        Ok(self
            .probe
            .jtag_shift_dr(self.tap_index, value as u64, 32)
            .map_err(Mips64Error::Probe)? as u32)
    }

    /// Idles the scan chain for 5 TCK cycles, per the PrAcc handshake step
    /// invariant ("clear the PRACC bit; add five tck idle cycles; continue").
    pub fn idle_5(&mut self) -> Result<(), Mips64Error> {
        self.probe.jtag_idle(5).map_err(Mips64Error::Probe)
    }

    /// Polls the Control register until `PRACC` is set, or `deadline` worth
    /// of attempts have been made.
    pub fn wait_for_pracc(&mut self, max_polls: usize) -> Result<EjtagControl, Mips64Error> {
        for _ in 0..max_polls {
            let ctrl = self.read_control()?;
            if ctrl.pracc() {
                return Ok(ctrl);
            }
        }
        Err(Mips64Error::Timeout)
    }

    /// Clears `PRACC` in the control register read at the start of this
    /// handshake step, letting the stalled target proceed, then idles the
    /// chain for the five cycles the target needs to notice.
    pub fn ack_pracc(&mut self, mut ctrl: EjtagControl) -> Result<(), Mips64Error> {
        ctrl.set_pracc(false);
        self.write_control(ctrl)?;
        self.idle_5()
    }
}
