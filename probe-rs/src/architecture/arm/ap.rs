//! ADIv5 MEM-AP registers and per-AP record state.

use crate::architecture::arm::communication_interface::DapAccess;
use crate::architecture::arm::{ArmError, FullyQualifiedApAddress};

/// Errors specific to Access Port access.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum AccessPortError {
    /// Failed to read register {register} from AP {address:?}
    RegisterRead {
        /// Name of the register.
        register: &'static str,
        /// Address of the AP.
        address: FullyQualifiedApAddress,
    },

    /// Failed to write register {register} to AP {address:?}
    RegisterWrite {
        /// Name of the register.
        register: &'static str,
        /// Address of the AP.
        address: FullyQualifiedApAddress,
    },

    /// The AP with address {0:?} does not exist.
    ApDoesNotExist(FullyQualifiedApAddress),

    /// The AP with address {0:?} is not a MEM-AP.
    NotAMemoryAp(FullyQualifiedApAddress),
}

/// Register addresses on an AP, 4-byte aligned, 0..=0xfc, banked via
/// SELECT.APBANKSEL the same way DP registers are banked via DPBANKSEL.
pub trait ApRegister: Copy + From<u32> + Into<u32> {
    /// The low byte of the register address (bits [7:0] of the full offset).
    const ADDRESS: u8;
    /// Register name, for logging.
    const NAME: &'static str;
}

macro_rules! ap_register {
    ($(#[$outer:meta])* $name:ident, $address:expr, $reg_name:expr, impl From; $($rest:tt)*) => {
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

        impl ApRegister for $name {
            const ADDRESS: u8 = $address;
            const NAME: &'static str = $reg_name;
        }
    };
}

/// The access width of a MEM-AP transfer, CSW.SIZE.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataSize {
    /// 8 bits.
    U8,
    /// 16 bits.
    U16,
    /// 32 bits.
    U32,
    /// 64 bits, only available when the AP has the large-data extension.
    U64,
}

impl DataSize {
    pub(crate) fn csw_encoding(self) -> u32 {
        match self {
            DataSize::U8 => 0b000,
            DataSize::U16 => 0b001,
            DataSize::U32 => 0b010,
            DataSize::U64 => 0b011,
        }
    }

    /// The number of bytes transferred by one access of this size.
    pub fn byte_size(self) -> usize {
        match self {
            DataSize::U8 => 1,
            DataSize::U16 => 2,
            DataSize::U32 => 4,
            DataSize::U64 => 8,
        }
    }
}

ap_register! {
    /// CSW - Control/Status Word.
    Csw, 0x00, "CSW", impl From;
    pub dbg_sw_enable, set_dbg_sw_enable: 31;
    pub prot, set_prot: 30, 28;
    pub spiden, set_spiden: 23;
    pub mode, set_mode: 11, 8;
    pub trin_prog, _: 7;
    pub device_en, _: 6;
    pub addr_inc, set_addr_inc: 5, 4;
    pub size, set_size: 2, 0;
}

impl Csw {
    /// AddrInc: off.
    pub const ADDR_INC_OFF: u32 = 0b00;
    /// AddrInc: single (increment TAR by the access size after each transfer).
    pub const ADDR_INC_SINGLE: u32 = 0b01;
    /// AddrInc: packed (pack several sub-word transfers into one DRW word).
    pub const ADDR_INC_PACKED: u32 = 0b10;

    pub(crate) fn set_data_size(&mut self, size: DataSize) {
        self.set_size(size.csw_encoding());
    }
}

ap_register! {
    /// TAR - Transfer Address Register, low 32 bits.
    Tar, 0x04, "TAR", impl From;
    pub address, set_address: 31, 0;
}

ap_register! {
    /// TAR2 - Transfer Address Register, high 32 bits (LPAE).
    Tar2, 0x08, "TAR2", impl From;
    pub address_hi, set_address_hi: 31, 0;
}

ap_register! {
    /// DRW - Data Read/Write.
    Drw, 0x0c, "DRW", impl From;
    pub data, set_data: 31, 0;
}

ap_register! {
    /// BD0 - Banked Data 0, a window onto the word at the address in TAR.
    Bd0, 0x10, "BD0", impl From;
    pub data, set_data: 31, 0;
}

ap_register! {
    /// BD1 - Banked Data 1, a window onto the word at TAR+4.
    Bd1, 0x14, "BD1", impl From;
    pub data, set_data: 31, 0;
}

ap_register! {
    /// BD2 - Banked Data 2, a window onto the word at TAR+8.
    Bd2, 0x18, "BD2", impl From;
    pub data, set_data: 31, 0;
}

ap_register! {
    /// BD3 - Banked Data 3, a window onto the word at TAR+12.
    Bd3, 0x1c, "BD3", impl From;
    pub data, set_data: 31, 0;
}

ap_register! {
    /// BASE - Debug Base Address, high part (LPAE).
    Base2, 0xf0, "BASE2", impl From;
    pub base_hi, _: 31, 0;
}

ap_register! {
    /// BASE - Debug Base Address.
    Base, 0xf8, "BASE", impl From;
    pub base_addr, _: 31, 12;
    pub format, _: 1;
    pub present, _: 0;
}

ap_register! {
    /// CFG - Configuration register (large-address/large-data/big-endian).
    Cfg, 0xf4, "CFG", impl From;
    pub large_data, _: 2;
    pub large_address, _: 1;
    pub big_endian, _: 0;
}

ap_register! {
    /// IDR - Identification Register (read-only).
    Idr, 0xfc, "IDR", impl From;
    pub revision, _: 31, 28;
    pub jep106_continuation, _: 27, 24;
    pub jep106_id, _: 23, 17;
    pub class, _: 16, 13;
    pub variant, _: 7, 4;
    pub ap_type, _: 3, 0;
}

/// Upper-case aliases matching the ADIv5 spec's own register names, for call
/// sites that spell them out that way (banked-data window registers used by
/// the AArch32 DPM's APB access path).
#[allow(non_camel_case_types)]
pub type BD0 = Bd0;
#[allow(non_camel_case_types)]
pub type BD1 = Bd1;
#[allow(non_camel_case_types)]
pub type BD2 = Bd2;
#[allow(non_camel_case_types)]
pub type BD3 = Bd3;
#[allow(non_camel_case_types)]
pub type TAR = Tar;
#[allow(non_camel_case_types)]
pub type TAR2 = Tar2;
#[allow(non_camel_case_types)]
pub type CSW = Csw;

/// The record of a single MEM-AP: its fixed address plus the host-side state
/// that tracks what was last written so redundant writes can be skipped.
///
/// Per SPEC_FULL §3: "CSW and TAR cached values must reflect the last-queued
/// write to the corresponding AP register; any out-of-band write invalidates
/// the cache."
#[derive(Debug, Clone)]
pub struct MemoryAp {
    address: FullyQualifiedApAddress,
    cached_csw: Option<Csw>,
    cached_tar: Option<u64>,
    large_data_extension: bool,
    large_address_extension: bool,
    only_32bit_data_size: bool,
    packed_transfers: bool,
    ti_be_32_quirk: bool,
}

impl MemoryAp {
    /// Creates a new, uncached MEM-AP record for the given address.
    pub fn new(address: FullyQualifiedApAddress) -> Self {
        Self {
            address,
            cached_csw: None,
            cached_tar: None,
            large_data_extension: false,
            large_address_extension: false,
            only_32bit_data_size: false,
            packed_transfers: false,
            ti_be_32_quirk: false,
        }
    }

    /// The address of this AP.
    pub fn ap_address(&self) -> &FullyQualifiedApAddress {
        &self.address
    }

    /// Records capability bits read from CFG, called once during AP setup.
    pub fn configure(&mut self, cfg: Cfg) {
        self.large_data_extension = cfg.large_data();
        self.large_address_extension = cfg.large_address();
    }

    /// Marks this AP as supporting only 32-bit transfers (pre-ADIv5.2 MEM-APs
    /// without byte/halfword support, or a quirky implementation).
    pub fn set_only_32bit_data_size(&mut self, only_32bit: bool) {
        self.only_32bit_data_size = only_32bit;
    }

    /// Marks this AP as supporting the packed-transfer fast path.
    pub fn set_packed_transfers(&mut self, packed: bool) {
        self.packed_transfers = packed;
    }

    /// Marks this AP as a TI BE-32 variant (byte lane swap quirk).
    pub fn set_ti_be_32_quirk(&mut self, quirk: bool) {
        self.ti_be_32_quirk = quirk;
    }

    pub fn has_large_data_extension(&self) -> bool {
        self.large_data_extension
    }

    pub fn has_large_address_extension(&self) -> bool {
        self.large_address_extension
    }

    pub fn supports_only_32bit_data_size(&self) -> bool {
        self.only_32bit_data_size
    }

    pub fn supports_packed_transfers(&self) -> bool {
        self.packed_transfers
    }

    pub fn ti_be_32_quirk(&self) -> bool {
        self.ti_be_32_quirk
    }

    /// Returns the CSW to write for a transfer of `size` with the given
    /// auto-increment mode, or `None` if the cached value already matches
    /// (the caching rule from SPEC_FULL §4.1).
    pub fn csw_for(&mut self, size: DataSize, addr_inc: u32) -> Option<Csw> {
        let mut csw = Csw(0);
        csw.set_data_size(size);
        csw.set_addr_inc(addr_inc);
        if self.cached_csw == Some(csw) {
            None
        } else {
            self.cached_csw = Some(csw);
            Some(csw)
        }
    }

    /// Returns the TAR to write for `address`, or `None` if the cached TAR
    /// already matches and auto-increment is off.
    pub fn tar_for(&mut self, address: u64, addr_inc_on: bool) -> Option<u64> {
        if !addr_inc_on && self.cached_tar == Some(address) {
            None
        } else {
            self.cached_tar = Some(address);
            Some(address)
        }
    }

    /// Invalidates the cached CSW/TAR, e.g. after an out-of-band write or a
    /// detected transfer error.
    pub fn invalidate_cache(&mut self) {
        self.cached_csw = None;
        self.cached_tar = None;
    }

    /// Advances the cached TAR by `bytes`, used after an auto-incrementing
    /// bulk transfer so the next chunk's `tar_for` call can skip the write
    /// only when it genuinely matches (it never will while auto-increment is
    /// on, per the caching rule, but this keeps the cache a truthful mirror).
    pub fn advance_cached_tar(&mut self, bytes: u64) {
        if let Some(tar) = &mut self.cached_tar {
            *tar = tar.wrapping_add(bytes);
        }
    }

    /// Writes CSW for `size` if it differs from the cached value.
    pub fn try_set_datasize<I: DapAccess + ?Sized>(
        &mut self,
        interface: &mut I,
        size: DataSize,
    ) -> Result<(), ArmError> {
        if let Some(csw) = self.csw_for(size, Csw::ADDR_INC_SINGLE) {
            interface.write_raw_ap_register(&self.address, Csw::ADDRESS, csw.into())?;
        }
        Ok(())
    }

    /// Writes TAR (and TAR2, if this AP has the large-address extension) if
    /// it differs from the cached value.
    pub fn set_target_address<I: DapAccess + ?Sized>(
        &mut self,
        interface: &mut I,
        address: u64,
    ) -> Result<(), ArmError> {
        if let Some(tar) = self.tar_for(address, false) {
            if self.large_address_extension {
                interface.write_raw_ap_register(&self.address, Tar2::ADDRESS, (tar >> 32) as u32)?;
            }
            interface.write_raw_ap_register(&self.address, Tar::ADDRESS, tar as u32)?;
        }
        Ok(())
    }

    /// Reads `values.len()` words from DRW, relying on TAR auto-increment.
    pub fn read_data<I: DapAccess + ?Sized>(
        &mut self,
        interface: &mut I,
        values: &mut [u32],
    ) -> Result<(), ArmError> {
        interface.read_raw_ap_register_repeated(&self.address, Drw::ADDRESS, values)
    }

    /// Writes `values` to DRW, relying on TAR auto-increment.
    pub fn write_data<I: DapAccess + ?Sized>(
        &mut self,
        interface: &mut I,
        values: &[u32],
    ) -> Result<(), ArmError> {
        interface.write_raw_ap_register_repeated(&self.address, Drw::ADDRESS, values)
    }

    /// Reads the live CSW value from the AP (not the cached one).
    pub fn generic_status<I: DapAccess + ?Sized>(&mut self, interface: &mut I) -> Result<Csw, ArmError> {
        let raw = interface.read_raw_ap_register(&self.address, Csw::ADDRESS)?;
        Ok(Csw::from(raw))
    }

    /// Reads the CoreSight debug base address (BASE/BASE2) for this AP.
    pub fn base_address<I: DapAccess + ?Sized>(&mut self, interface: &mut I) -> Result<u64, ArmError> {
        let base: Base = interface
            .read_raw_ap_register(&self.address, Base::ADDRESS)?
            .into();
        if !base.present() {
            return Err(ArmError::ApDoesNotExist(self.address.clone()));
        }
        let mut base_addr = (base.base_addr() as u64) << 12;
        if self.large_address_extension {
            let base2: Base2 = interface
                .read_raw_ap_register(&self.address, Base2::ADDRESS)?
                .into();
            base_addr |= (base2.base_hi() as u64) << 32;
        }
        Ok(base_addr)
    }
}

/// Calculates the maximum number of bytes that can be transferred starting
/// at `address` before the 10-bit TAR auto-increment block wraps.
pub(crate) fn autoincr_max_bytes(address: u64) -> usize {
    const AUTOINCR_BLOCK: u64 = 0x400;
    (AUTOINCR_BLOCK - (address % AUTOINCR_BLOCK)) as usize
}
