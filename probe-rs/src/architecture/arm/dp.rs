//! ADIv5 Debug Port registers and addressing.

/// Errors specific to Debug Port access.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum DebugPortError {
    /// The target reported a sticky error (CTRL/STAT.STICKYERR) during a DP transaction.
    StickyError,

    /// The target reported a sticky orun error (CTRL/STAT.STICKYORUN).
    StickyOrun,

    /// Power-up of the debug and system domains did not complete within the timeout.
    TargetPowerUpFailed,

    /// Register {0:#x} is not a valid Debug Port register address.
    InvalidRegisterAddress(u8),
}

/// 4-byte-aligned register addresses on the DP (the low two bits of the
/// address are always zero and select is used to pick the bank).
pub trait DpRegister: memory_mapped_like::DpRegisterSealed {
    /// The address of the register, 0..=0xc.
    const ADDRESS: u8;
    /// The DP register bank this register lives in (SELECT.DPBANKSEL).
    const BANK: u8;
    /// Human readable register name, for logging.
    const NAME: &'static str;
}

mod memory_mapped_like {
    pub trait DpRegisterSealed {}
}

macro_rules! dp_register {
    ($(#[$outer:meta])* $name:ident, $address:expr, $bank:expr, $reg_name:expr, impl From; $($rest:tt)*) => {
        bitfield::bitfield! {
            $(#[$outer])*
            #[derive(Copy, Clone, PartialEq, Eq)]
            pub struct $name(u32);
            impl Debug;
            $($rest)*
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl memory_mapped_like::DpRegisterSealed for $name {}

        impl DpRegister for $name {
            const ADDRESS: u8 = $address;
            const BANK: u8 = $bank;
            const NAME: &'static str = $reg_name;
        }
    };
}

dp_register! {
    /// DPIDR - Debug Port Identification Register (read-only).
    Dpidr, 0x0, 0, "DPIDR", impl From;
    pub revision, _: 31, 28;
    pub part_no, _: 27, 20;
    pub min, _: 16;
    pub version, _: 15, 12;
    pub designer, _: 11, 1;
}

dp_register! {
    /// ABORT - writing bits here aborts a stalled transaction and clears
    /// sticky error flags.
    Abort, 0x0, 0, "ABORT", impl From;
    pub orunerrclr, set_orunerrclr: 4;
    pub wderrclr, set_wderrclr: 3;
    pub stkerrclr, set_stkerrclr: 2;
    pub stkcmpclr, set_stkcmpclr: 1;
    pub dapabort, set_dapabort: 0;
}

dp_register! {
    /// CTRL/STAT - Control/Status register.
    Ctrl, 0x4, 0, "CTRL/STAT", impl From;
    pub csyspwrupack, _: 31;
    pub csyspwrupreq, set_csyspwrupreq: 30;
    pub cdbgpwrupack, _: 29;
    pub cdbgpwrupreq, set_cdbgpwrupreq: 28;
    pub cdbgrstack, _: 27;
    pub cdbgrstreq, set_cdbgrstreq: 26;
    pub trn_cnt, set_trn_cnt: 23, 12;
    pub mask_lane, set_mask_lane: 11, 8;
    pub wdata_err, _: 7;
    pub read_ok, _: 6;
    pub stickyerr, _: 5;
    pub stickycmp, _: 4;
    pub trn_mode, set_trn_mode: 3, 2;
    pub stickyorun, _: 1;
    pub orundetect, set_orundetect: 0;
}

dp_register! {
    /// SELECT - selects the current AP and the register bank on both the AP
    /// and the DP.
    Select, 0x8, 0, "SELECT", impl From;
    pub ap_sel, set_ap_sel: 31, 24;
    pub ap_bank_sel, set_ap_bank_sel: 7, 4;
    pub dp_bank_sel, set_dp_bank_sel: 3, 0;
}

dp_register! {
    /// RDBUFF - the last value read over the DP, latched for a dummy read.
    Rdbuff, 0xc, 0, "RDBUFF", impl From;
    pub value, _: 31, 0;
}
