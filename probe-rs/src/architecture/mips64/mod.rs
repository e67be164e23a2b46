//! MIPS64 target support, driven through the EJTAG PrAcc (Processor Access)
//! protocol.
//!
//! Unlike ARM, a MIPS EJTAG target has no memory-mapped debug bus a host can
//! transact against directly. Instead, once the core is stalled in debug
//! mode, a small piece of code is uploaded into a fixed, abstract memory
//! window and single-stepped by the target itself; each fetch/load/store the
//! target issues against that window is served one at a time by the host
//! over JTAG. [`pracc`] implements that handshake, [`ejtag`] the TAP-level
//! primitives it is built on, and [`core`] the [`crate::core::CoreInterface`]
//! implementor that exposes it as a regular target driver.

pub(crate) mod core;
pub mod ejtag;
pub mod pracc;
pub mod registers;

pub use self::core::Mips64;
pub use ejtag::EjtagInterface;

/// MIPS64/EJTAG specific errors.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum Mips64Error {
    /// A timeout occurred while polling the EJTAG PRACC handshake.
    Timeout,

    /// The debug probe encountered an error.
    Probe(#[from] crate::probe::DebugProbeError),

    /// The target issued a PrAcc access at address {0:#x}, which is outside
    /// every region the PrAcc engine serves (code, param-in, param-out,
    /// stack).
    AddressOutOfRange(u64),

    /// The target issued a PrAcc access with an unsupported size/offset
    /// combination (PSZ={psz}, address offset={offset}).
    UnsupportedAccessSize {
        /// The decoded `PSZ` field of the EJTAG control register.
        psz: u8,
        /// `address & 0x7`.
        offset: u8,
    },
    /// The PrAcc code stream completed without ever making progress; the
    /// target re-fetched `PRACC_TEXT` immediately.
    ProgramDidNotStart,

    /// The core must be halted (stalled in debug mode) for this operation.
    CoreNotHalted,

    /// The CP0 register {reg}/{sel} could not be accessed: {reason}
    Cp0Access {
        /// CP0 register number.
        reg: u32,
        /// CP0 register select.
        sel: u32,
        /// Human readable failure reason.
        reason: &'static str,
    },

    /// Unable to create a hardware breakpoint: all {0} IBS comparators are in use.
    NoBreakpointUnitAvailable(usize),

    /// Another MIPS64 error occurred: {0}
    Other(String),
}
