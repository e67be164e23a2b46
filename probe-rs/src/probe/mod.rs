//! The transport boundary: the trait contract a debug probe driver must
//! satisfy for the core to drive a target over it.
//!
//! Concrete transport drivers (CMSIS-DAP, ST-Link, J-Link, ...) are outside
//! the scope of this crate; only the trait boundary and a test-only mock
//! live here.

use std::fmt;

/// The register bank a DAP transaction targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DapPort {
    /// The Debug Port itself.
    Dp,
    /// An Access Port, addressed by its index (0..=255).
    Ap(u8),
}

/// Errors a debug probe driver can report.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum DebugProbeError {
    /// An error occurred in the USB communication with the probe.
    Usb,

    /// The probe does not support JTAG.
    JtagNotSupportedOnProbe,

    /// The debug probe reported a transfer fault for register {1:#x} on {0:?}.
    TransferFault(DapPort, u8),

    /// The operation timed out.
    Timeout,

    /// The probe is not attached to a target.
    NotAttached,

    /// An error specific to this probe implementation occurred: {0}
    Other(String),
}

/// The minimal contract a debug probe must satisfy: attach/detach and a
/// target-level reset line. Everything DAP-specific lives in [`DapProbe`].
pub trait DebugProbe: fmt::Debug + Send {
    /// Human readable probe name, for logging.
    fn get_name(&self) -> &str;

    /// Enters debug mode.
    fn attach(&mut self) -> Result<(), DebugProbeError>;

    /// Leaves debug mode.
    fn detach(&mut self) -> Result<(), DebugProbeError>;

    /// Asserts and deasserts the target's hardware reset line.
    fn target_reset(&mut self) -> Result<(), DebugProbeError>;
}

/// A probe capable of raw ADIv5 DP/AP register transactions.
///
/// This is the single primitive the DAP transaction engine
/// (`architecture::arm::communication_interface`) is built on: everything
/// else (queuing, CSW/TAR caching, bulk transfer) lives above this trait.
pub trait DapProbe: DebugProbe {
    /// Reads a 32-bit register on the given port at the given 4-byte-aligned
    /// address (0..=0xfc).
    fn raw_read_register(&mut self, port: DapPort, address: u8) -> Result<u32, DebugProbeError>;

    /// Writes a 32-bit register on the given port at the given 4-byte-aligned
    /// address (0..=0xfc).
    fn raw_write_register(
        &mut self,
        port: DapPort,
        address: u8,
        value: u32,
    ) -> Result<(), DebugProbeError>;
}

/// A probe capable of raw JTAG IR/DR scans against a single TAP in the scan
/// chain. This is the primitive the EJTAG PrAcc engine
/// (`architecture::mips64`) is built on: select an EJTAG register through an
/// IR scan, then shift data in/out of it through a DR scan.
pub trait JtagAccess: DebugProbe {
    /// Shifts `ir_len` bits of `instruction` into the instruction register of
    /// the TAP at `tap_index`, leaving every other TAP on the chain in BYPASS.
    fn jtag_shift_ir(
        &mut self,
        tap_index: usize,
        instruction: u32,
        ir_len: u8,
    ) -> Result<(), DebugProbeError>;

    /// Shifts `bit_len` bits of `data` (LSB first) through the data register
    /// currently selected on the TAP at `tap_index`, returning the bits
    /// shifted out while `data` was shifted in.
    fn jtag_shift_dr(
        &mut self,
        tap_index: usize,
        data: u64,
        bit_len: u8,
    ) -> Result<u64, DebugProbeError>;

    /// Idles the scan chain for `cycles` TCK periods (used to give the target
    /// time to process a PrAcc handshake step between DR scans).
    fn jtag_idle(&mut self, cycles: usize) -> Result<(), DebugProbeError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;

    /// An in-memory fake of a DAP transport, for unit tests.
    #[derive(Debug, Default)]
    pub struct MockDapProbe {
        pub dp_registers: HashMap<u8, u32>,
        pub ap_registers: HashMap<(u8, u8), u32>,
    }

    impl MockDapProbe {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DebugProbe for MockDapProbe {
        fn get_name(&self) -> &str {
            "mock probe"
        }

        fn attach(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }

        fn detach(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }

        fn target_reset(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }
    }

    impl DapProbe for MockDapProbe {
        fn raw_read_register(
            &mut self,
            port: DapPort,
            address: u8,
        ) -> Result<u32, DebugProbeError> {
            Ok(match port {
                DapPort::Dp => *self.dp_registers.get(&address).unwrap_or(&0),
                DapPort::Ap(ap) => *self.ap_registers.get(&(ap, address)).unwrap_or(&0),
            })
        }

        fn raw_write_register(
            &mut self,
            port: DapPort,
            address: u8,
            value: u32,
        ) -> Result<(), DebugProbeError> {
            match port {
                DapPort::Dp => {
                    self.dp_registers.insert(address, value);
                }
                DapPort::Ap(ap) => {
                    self.ap_registers.insert((ap, address), value);
                }
            }
            Ok(())
        }
    }

    /// An in-memory fake of a JTAG transport driving a single EJTAG TAP, for
    /// unit tests of the MIPS64 PrAcc engine.
    #[derive(Debug, Default)]
    pub struct MockJtagProbe {
        pub last_ir: Option<u32>,
        pub dr_writes: Vec<(u32, u64)>,
    }

    impl MockJtagProbe {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DebugProbe for MockJtagProbe {
        fn get_name(&self) -> &str {
            "mock jtag probe"
        }

        fn attach(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }

        fn detach(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }

        fn target_reset(&mut self) -> Result<(), DebugProbeError> {
            Ok(())
        }
    }

    impl JtagAccess for MockJtagProbe {
        fn jtag_shift_ir(
            &mut self,
            _tap_index: usize,
            instruction: u32,
            _ir_len: u8,
        ) -> Result<(), DebugProbeError> {
            self.last_ir = Some(instruction);
            Ok(())
        }

        fn jtag_shift_dr(
            &mut self,
            _tap_index: usize,
            data: u64,
            bit_len: u8,
        ) -> Result<u64, DebugProbeError> {
            self.dr_writes.push((self.last_ir.unwrap_or(0), data));
            Ok(data & (u64::MAX >> (64 - bit_len.max(1))))
        }

        fn jtag_idle(&mut self, _cycles: usize) -> Result<(), DebugProbeError> {
            Ok(())
        }
    }
}
