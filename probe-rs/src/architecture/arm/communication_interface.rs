//! The ADIv5 DAP transaction engine (SPEC_FULL §4.1).
//!
//! Owns the selected AP index, the cached DP SELECT value, and the per-AP
//! CSW/TAR caches (the "DAP" data model of SPEC_FULL §3). Queues and
//! executes DP/AP register reads and writes over a [`DapProbe`] transport.

use std::collections::HashMap;
use std::fmt;

use crate::{
    architecture::arm::{
        ap::{AccessPortError, ApRegister, Cfg, MemoryAp},
        dp::{Abort, Ctrl, DebugPortError, DpRegister, Select},
        memory::{adi_memory_interface::ADIMemoryInterface, ArmMemoryInterface},
        ArmError,
    },
    probe::{DapPort, DapProbe, DebugProbeError},
};

/// The lowest-level ADIv5 primitive: raw pin/line-level sequences that bypass
/// register-level DP/AP transactions entirely (JTAG-to-SWD switch, line
/// reset). Transport backends that implement these are out of scope for this
/// crate (SPEC_FULL §1); the DAP engine still needs the trait bound to
/// satisfy the code paths that generalize over probe capabilities.
pub trait SwdSequence {
    /// Sends `bit_len` bits of `bits` (LSB first) over SWDIO.
    fn swj_sequence(&mut self, bit_len: u8, bits: u64) -> Result<(), DebugProbeError>;

    /// Drives debug port pins directly and returns the pins read back.
    fn swj_pins(
        &mut self,
        pin_out: u32,
        pin_select: u32,
        pin_wait: u32,
    ) -> Result<u32, DebugProbeError>;
}

/// Raw, address-based DP/AP register access: the primitive the DAP engine
/// and the AArch32 Debug Programmer's Model's banked-data-register window
/// are both built on (SPEC_FULL §4.1, §4.3).
pub trait DapAccess: SwdSequence {
    /// Reads a 32-bit DP register at the given 4-byte-aligned address.
    fn read_raw_dp_register(&mut self, address: u8) -> Result<u32, ArmError>;

    /// Writes a 32-bit DP register at the given 4-byte-aligned address.
    fn write_raw_dp_register(&mut self, address: u8, value: u32) -> Result<(), ArmError>;

    /// Reads a 32-bit register on `ap` at the given 4-byte-aligned address.
    fn read_raw_ap_register(
        &mut self,
        ap: &FullyQualifiedApAddress,
        address: u8,
    ) -> Result<u32, ArmError>;

    /// Writes a 32-bit register on `ap` at the given 4-byte-aligned address.
    fn write_raw_ap_register(
        &mut self,
        ap: &FullyQualifiedApAddress,
        address: u8,
        value: u32,
    ) -> Result<(), ArmError>;

    /// Reads the same AP register repeatedly into `values`, relying on
    /// TAR auto-increment between reads (used for DRW bulk transfer and for
    /// pumping the DCC in the AArch32 DPM).
    fn read_raw_ap_register_repeated(
        &mut self,
        ap: &FullyQualifiedApAddress,
        address: u8,
        values: &mut [u32],
    ) -> Result<(), ArmError> {
        for value in values.iter_mut() {
            *value = self.read_raw_ap_register(ap, address)?;
        }
        Ok(())
    }

    /// Writes the same AP register repeatedly from `values`, relying on TAR
    /// auto-increment between writes.
    fn write_raw_ap_register_repeated(
        &mut self,
        ap: &FullyQualifiedApAddress,
        address: u8,
        values: &[u32],
    ) -> Result<(), ArmError> {
        for &value in values {
            self.write_raw_ap_register(ap, address, value)?;
        }
        Ok(())
    }
}

/// An interface that may batch register writes and needs an explicit flush
/// point, e.g. before reading back a value that depends on a prior write.
pub trait FlushableArmAccess {
    /// Executes any queued transactions.
    fn flush(&mut self) -> Result<(), ArmError>;
}

/// Blanket object-safe bundle of the traits a memory interface needs to hold
/// onto as a trait object.
pub trait ArmAccess: DapAccess + FlushableArmAccess {}
impl<T: DapAccess + FlushableArmAccess + ?Sized> ArmAccess for T {}

/// The probe-facing entry point into the ARM debug architecture: a DAP with
/// the ability to hand out memory interfaces onto its MEM-APs.
pub trait ArmProbeInterface: DapAccess + FlushableArmAccess + Send {
    /// Returns a memory interface driving the MEM-AP at `access_port`.
    fn memory_interface(
        &mut self,
        access_port: &FullyQualifiedApAddress,
    ) -> Result<Box<dyn ArmMemoryInterface + '_>, ArmError>;
}

/// Uniquely identifies a MEM-AP: in this crate's ADIv5-only addressing model
/// this is just the AP index behind the single default DP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullyQualifiedApAddress {
    ap: u8,
}

impl FullyQualifiedApAddress {
    /// Addresses AP `ap` behind the (only) default DP.
    pub fn v1_with_default_dp(ap: u8) -> Self {
        Self { ap }
    }

    /// The raw AP index.
    pub fn ap(&self) -> u8 {
        self.ap
    }
}

impl fmt::Display for FullyQualifiedApAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AP{:#x}", self.ap)
    }
}

/// Errors that can occur while talking to the DAP, below the `ArmError`
/// level of abstraction (transport + protocol failures).
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum DapError {
    /// The probe reported a transport-level error.
    Probe(#[from] DebugProbeError),

    /// A Debug Port specific error occurred.
    DebugPort(#[from] DebugPortError),

    /// An Access Port specific error occurred.
    AccessPort(#[from] AccessPortError),
}

/// The queued DP/AP transaction engine, parameterized over the concrete
/// transport. Single-threaded, single-DP: see SPEC_FULL §5.
pub struct ArmCommunicationInterface<P> {
    probe: P,
    current_select: Select,
    select_valid: bool,
    aps: HashMap<u8, MemoryAp>,
}

impl<P: fmt::Debug> fmt::Debug for ArmCommunicationInterface<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmCommunicationInterface")
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

impl<P: DapProbe> ArmCommunicationInterface<P> {
    /// Wraps a raw transport in the DAP transaction engine.
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            current_select: Select(0),
            select_valid: false,
            aps: HashMap::new(),
        }
    }

    /// Gives back the wrapped transport.
    pub fn into_probe(self) -> P {
        self.probe
    }

    /// Reads a 32-bit DP register.
    #[tracing::instrument(skip(self))]
    pub fn read_dp_register<R: DpRegister>(&mut self) -> Result<R, ArmError> {
        self.select_dp_bank(R::BANK)?;
        let value = self
            .probe
            .raw_read_register(DapPort::Dp, R::ADDRESS)
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))?;
        tracing::debug!("Read DP register {}: {:#010x}", R::NAME, value);
        Ok(R::from(value))
    }

    /// Writes a 32-bit DP register.
    #[tracing::instrument(skip(self, register))]
    pub fn write_dp_register<R: DpRegister>(&mut self, register: R) -> Result<(), ArmError> {
        self.select_dp_bank(R::BANK)?;
        let value: u32 = register.into();
        tracing::debug!("Writing DP register {}: {:#010x}", R::NAME, value);
        self.probe
            .raw_write_register(DapPort::Dp, R::ADDRESS, value)
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))
    }

    fn select_dp_bank(&mut self, bank: u8) -> Result<(), ArmError> {
        if self.select_valid && self.current_select.dp_bank_sel() == bank as u32 {
            return Ok(());
        }
        let mut select = self.current_select;
        select.set_dp_bank_sel(bank as u32);
        self.write_select(select)
    }

    fn write_select(&mut self, select: Select) -> Result<(), ArmError> {
        self.probe
            .raw_write_register(DapPort::Dp, Select::ADDRESS, select.into())
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))?;
        self.current_select = select;
        self.select_valid = true;
        Ok(())
    }

    fn select_ap_bank(&mut self, ap: u8, bank: u8) -> Result<(), ArmError> {
        if self.select_valid
            && self.current_select.ap_sel() == ap as u32
            && self.current_select.ap_bank_sel() == bank as u32
        {
            return Ok(());
        }
        let mut select = self.current_select;
        select.set_ap_sel(ap as u32);
        select.set_ap_bank_sel(bank as u32);
        self.write_select(select)
    }

    /// Reads a 32-bit AP register.
    #[tracing::instrument(skip(self))]
    pub fn read_ap_register<R: ApRegister>(&mut self, ap: u8) -> Result<R, ArmError> {
        self.select_ap_bank(ap, R::ADDRESS >> 4)?;
        let value = self
            .probe
            .raw_read_register(DapPort::Ap(ap), R::ADDRESS)
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))?;
        tracing::debug!("Read AP{} register {}: {:#010x}", ap, R::NAME, value);
        Ok(R::from(value))
    }

    /// Writes a 32-bit AP register.
    #[tracing::instrument(skip(self, register))]
    pub fn write_ap_register<R: ApRegister>(
        &mut self,
        ap: u8,
        register: R,
    ) -> Result<(), ArmError> {
        self.select_ap_bank(ap, R::ADDRESS >> 4)?;
        let value: u32 = register.into();
        tracing::debug!("Writing AP{} register {}: {:#010x}", ap, R::NAME, value);
        self.probe
            .raw_write_register(DapPort::Ap(ap), R::ADDRESS, value)
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))
    }

    /// Brings up the debug and system power domains and enables overrun
    /// detection, per SPEC_FULL §4.1 `dap_dp_init`.
    #[tracing::instrument(skip(self))]
    pub fn dap_dp_init(&mut self) -> Result<(), ArmError> {
        // Clear any sticky error left over from a previous session.
        let mut abort = Abort(0);
        abort.set_stkerrclr(true);
        abort.set_stkcmpclr(true);
        abort.set_orunerrclr(true);
        abort.set_wderrclr(true);
        self.write_dp_register(abort)?;

        let mut ctrl = Ctrl(0);
        ctrl.set_csyspwrupreq(true);
        ctrl.set_cdbgpwrupreq(true);
        ctrl.set_orundetect(true);
        self.write_dp_register(ctrl)?;

        const ATTEMPTS: usize = 10;
        for attempt in 0..ATTEMPTS {
            let ctrl: Ctrl = self.read_dp_register()?;
            if ctrl.csyspwrupack() && ctrl.cdbgpwrupack() {
                return Ok(());
            }
            tracing::debug!("dap_dp_init: power-up not yet acked, attempt {attempt}");
        }

        Err(ArmError::Dap(DapError::DebugPort(
            DebugPortError::TargetPowerUpFailed,
        )))
    }

    /// Ensures a [`MemoryAp`] record exists for `address`, reading its CFG
    /// register to learn its capabilities the first time it is seen.
    #[tracing::instrument(skip(self))]
    pub fn ensure_memory_ap(
        &mut self,
        address: &FullyQualifiedApAddress,
    ) -> Result<(), ArmError> {
        if self.aps.contains_key(&address.ap()) {
            return Ok(());
        }
        let cfg: Cfg = self.read_ap_register(address.ap())?;
        let mut ap = MemoryAp::new(address.clone());
        ap.configure(cfg);
        self.aps.insert(address.ap(), ap);
        Ok(())
    }

    pub(crate) fn memory_ap_mut(&mut self, ap: u8) -> &mut MemoryAp {
        self.aps
            .entry(ap)
            .or_insert_with(|| MemoryAp::new(FullyQualifiedApAddress::v1_with_default_dp(ap)))
    }
}

impl<P: DapProbe> SwdSequence for ArmCommunicationInterface<P> {
    fn swj_sequence(&mut self, _bit_len: u8, _bits: u64) -> Result<(), DebugProbeError> {
        Err(DebugProbeError::Other(
            "raw SWD sequences are not supported by this transport".into(),
        ))
    }

    fn swj_pins(
        &mut self,
        _pin_out: u32,
        _pin_select: u32,
        _pin_wait: u32,
    ) -> Result<u32, DebugProbeError> {
        Err(DebugProbeError::Other(
            "raw pin access is not supported by this transport".into(),
        ))
    }
}

impl<P: DapProbe> DapAccess for ArmCommunicationInterface<P> {
    fn read_raw_dp_register(&mut self, address: u8) -> Result<u32, ArmError> {
        self.select_dp_bank(address >> 4)?;
        self.probe
            .raw_read_register(DapPort::Dp, address)
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))
    }

    fn write_raw_dp_register(&mut self, address: u8, value: u32) -> Result<(), ArmError> {
        self.select_dp_bank(address >> 4)?;
        self.probe
            .raw_write_register(DapPort::Dp, address, value)
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))
    }

    fn read_raw_ap_register(
        &mut self,
        ap: &FullyQualifiedApAddress,
        address: u8,
    ) -> Result<u32, ArmError> {
        self.select_ap_bank(ap.ap(), address >> 4)?;
        self.probe
            .raw_read_register(DapPort::Ap(ap.ap()), address)
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))
    }

    fn write_raw_ap_register(
        &mut self,
        ap: &FullyQualifiedApAddress,
        address: u8,
        value: u32,
    ) -> Result<(), ArmError> {
        self.select_ap_bank(ap.ap(), address >> 4)?;
        self.probe
            .raw_write_register(DapPort::Ap(ap.ap()), address, value)
            .map_err(|e| ArmError::Dap(DapError::Probe(e)))
    }
}

impl<P: DapProbe> FlushableArmAccess for ArmCommunicationInterface<P> {
    /// No command queuing is implemented by this transport abstraction
    /// (every register access is synchronous); `flush` is a no-op kept for
    /// interface parity with SPEC_FULL §4.1's `run`.
    fn flush(&mut self) -> Result<(), ArmError> {
        Ok(())
    }
}

impl<P: DapProbe + Send + 'static> ArmProbeInterface for ArmCommunicationInterface<P> {
    /// Returns a [`ADIMemoryInterface`] that performs bulk memory reads and
    /// writes through the given MEM-AP.
    fn memory_interface(
        &mut self,
        address: &FullyQualifiedApAddress,
    ) -> Result<Box<dyn ArmMemoryInterface + '_>, ArmError> {
        self.ensure_memory_ap(address)?;
        let memory_ap = self
            .aps
            .get(&address.ap())
            .expect("ensure_memory_ap just inserted this entry")
            .clone();
        Ok(Box::new(ADIMemoryInterface::new(self, memory_ap)))
    }
}

/// Identifies the chip behind a DAP by reading DPIDR, used for logging and
/// diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmChipInfo {
    /// JEP-106 designer code.
    pub designer: u16,
    /// DPIDR part number field.
    pub part: u8,
}

impl fmt::Display for ArmChipInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "designer {:#05x}, DP part {:#04x}",
            self.designer, self.part
        )
    }
}
