//! Core registers are described by [`CoreRegister`]: a stable [`RegisterId`]
//! the architecture driver uses to address the register, the set of
//! [`RegisterRole`]s it plays (a register can be both "X0" and "argument 0"),
//! its [`RegisterDataType`], and an [`UnwindRule`] consumed by stack
//! unwinding. [`CoreRegisters`] collects the whole set for one core variant
//! (e.g. AArch32 with no FPU, with 16 D-registers, or with 32).

use crate::Error;
use std::{cmp::Ordering, convert::Infallible};

type Result<T, E = Error> = std::result::Result<T, E>;

/// The type of data stored in a register, with its width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterDataType {
    /// Unsigned integer data of the given bit width.
    UnsignedInteger(u8),
    /// Floating point data of the given bit width.
    FloatingPoint(u8),
}

impl RegisterDataType {
    /// The width of this register, in bits.
    pub fn bit_width(&self) -> u8 {
        match self {
            RegisterDataType::UnsignedInteger(bits) => *bits,
            RegisterDataType::FloatingPoint(bits) => *bits,
        }
    }
}

/// A role a register plays, beyond just being "register number N". A single
/// [`CoreRegister`] commonly carries more than one: the AArch64 `X0` is both
/// `Core("X0")` and `Argument("a0")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterRole {
    /// The register's plain architectural name, e.g. `"X0"` or `"CPSR"`.
    Core(&'static str),
    /// The processor status register (CPSR/PSTATE/etc.).
    ProcessorStatus,
    /// The floating point status/control register (FPSCR/FPCR).
    FloatingPointStatus,
    /// A floating point / SIMD register.
    FloatingPoint,
    /// The program counter.
    ProgramCounter,
    /// The frame pointer.
    FramePointer,
    /// The stack pointer.
    StackPointer,
    /// The return address / link register.
    ReturnAddress,
    /// The nth argument register, per the platform calling convention.
    Argument(&'static str),
    /// The nth return-value register, per the platform calling convention.
    Return(&'static str),
    /// A role that doesn't fit any of the above, named for documentation.
    Other(&'static str),
}

/// How a register should be treated while unwinding a call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwindRule {
    /// The register is not preserved across a call; an unwinder cannot rely
    /// on its value once it has stepped past the current frame.
    Clear,
    /// The register is callee-saved; an unwinder can recover its caller's
    /// value from the stack frame.
    Preserve,
}

/// Describes one core register: its identity, the roles it plays, and how it
/// should be formatted and unwound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreRegister {
    /// Every role this register plays (at least one).
    pub roles: &'static [RegisterRole],
    /// The value the architecture driver uses to address this register.
    pub id: RegisterId,
    /// The data this register holds.
    pub data_type: RegisterDataType,
    /// How this register behaves across a call, for stack unwinding.
    pub unwind_rule: UnwindRule,
}

impl CoreRegister {
    /// This register's [`RegisterId`].
    pub fn id(&self) -> RegisterId {
        self.id
    }

    /// This register's primary (first) [`RegisterRole::Core`] name, if it has
    /// one.
    pub fn name(&self) -> &'static str {
        self.roles
            .iter()
            .find_map(|role| match role {
                RegisterRole::Core(name) => Some(*name),
                _ => None,
            })
            .unwrap_or("unknown")
    }

    /// Whether this register plays the given role.
    pub fn has_role(&self, role: RegisterRole) -> bool {
        self.roles.contains(&role)
    }

    /// The size, in bits, of this register.
    pub fn size_in_bits(&self) -> usize {
        self.data_type.bit_width() as usize
    }

    /// The size, in bytes, of this register.
    pub fn size_in_bytes(&self) -> usize {
        (self.size_in_bits() + 7) / 8
    }
}

impl From<&CoreRegister> for RegisterId {
    fn from(register: &CoreRegister) -> RegisterId {
        register.id
    }
}

impl From<CoreRegister> for RegisterId {
    fn from(register: CoreRegister) -> RegisterId {
        register.id
    }
}

/// The location of a CPU register. Not an actual memory address, but a core
/// specific location that represents a specific core register.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct RegisterId(pub u16);

impl From<RegisterId> for u32 {
    fn from(value: RegisterId) -> Self {
        u32::from(value.0)
    }
}

impl From<u16> for RegisterId {
    fn from(value: u16) -> Self {
        RegisterId(value)
    }
}

impl From<usize> for RegisterId {
    fn from(value: usize) -> Self {
        RegisterId(value as u16)
    }
}

/// The full set of registers a core variant exposes, e.g. "AArch32 with no
/// FPU" versus "AArch32 with a 32 x D-register FPU".
#[derive(Debug, PartialEq, Eq)]
pub struct CoreRegisters {
    core_registers: Vec<&'static CoreRegister>,
}

impl CoreRegisters {
    /// Collects a register set from its member registers.
    pub fn new(core_registers: Vec<&'static CoreRegister>) -> Self {
        Self { core_registers }
    }

    /// Iterates over every register in this set.
    pub fn all(&self) -> impl Iterator<Item = &'static CoreRegister> + '_ {
        self.core_registers.iter().copied()
    }

    /// The number of registers in this set.
    pub fn len(&self) -> usize {
        self.core_registers.len()
    }

    /// Whether this set has no registers (never true for a real core).
    pub fn is_empty(&self) -> bool {
        self.core_registers.is_empty()
    }

    /// Finds the register carrying the given id, if any.
    pub fn by_id(&self, id: RegisterId) -> Option<&'static CoreRegister> {
        self.core_registers.iter().copied().find(|r| r.id == id)
    }

    /// Finds the first register that plays the given role.
    pub fn by_role(&self, role: RegisterRole) -> Option<&'static CoreRegister> {
        self.core_registers.iter().copied().find(|r| r.has_role(role))
    }

    /// Finds a register by its [`RegisterRole::Core`] name.
    pub fn by_name(&self, name: &str) -> Option<&'static CoreRegister> {
        self.core_registers.iter().copied().find(|r| r.name() == name)
    }
}

/// A value of a core register.
///
/// Creating a new `RegisterValue` should be done using From or Into.
/// Converting a value back to a primitive type can be done with either
/// a match arm or TryInto
#[derive(Debug, Clone, Copy)]
pub enum RegisterValue {
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit unsigned integer
    U64(u64),
    /// 128-bit unsigned integer, often used with SIMD / FP
    U128(u128),
}

impl RegisterValue {
    /// A helper function to increment an address by a fixed number of bytes.
    pub fn increment_address(&mut self, bytes: usize) -> Result<(), Error> {
        match self {
            RegisterValue::U32(value) => {
                if let Some(reg_val) = value.checked_add(bytes as u32) {
                    *value = reg_val;
                    Ok(())
                } else {
                    Err(Error::Other(format!(
                        "Overflow error: Attempting to add {bytes} bytes to Register value {self}"
                    )))
                }
            }
            RegisterValue::U64(value) => {
                if let Some(reg_val) = value.checked_add(bytes as u64) {
                    *value = reg_val;
                    Ok(())
                } else {
                    Err(Error::Other(format!(
                        "Overflow error: Attempting to add {bytes} bytes to Register value {self}"
                    )))
                }
            }
            RegisterValue::U128(value) => {
                if let Some(reg_val) = value.checked_add(bytes as u128) {
                    *value = reg_val;
                    Ok(())
                } else {
                    Err(Error::Other(format!(
                        "Overflow error: Attempting to add {bytes} bytes to Register value {self}"
                    )))
                }
            }
        }
    }

    /// A helper function to determine if the contained register value is equal to the maximum value that can be stored in that datatype.
    pub fn is_max_value(&self) -> bool {
        match self {
            RegisterValue::U32(register_value) => *register_value == u32::MAX,
            RegisterValue::U64(register_value) => *register_value == u64::MAX,
            RegisterValue::U128(register_value) => *register_value == u128::MAX,
        }
    }

    /// A helper function to determine if the contained register value is zero.
    pub fn is_zero(&self) -> bool {
        matches!(
            self,
            RegisterValue::U32(0) | RegisterValue::U64(0) | RegisterValue::U128(0)
        )
    }
}

impl Default for RegisterValue {
    fn default() -> Self {
        // Smallest data storage as default.
        RegisterValue::U32(0_u32)
    }
}

impl PartialOrd for RegisterValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let self_value = match self {
            RegisterValue::U32(self_value) => *self_value as u128,
            RegisterValue::U64(self_value) => *self_value as u128,
            RegisterValue::U128(self_value) => *self_value,
        };
        let other_value = match other {
            RegisterValue::U32(other_value) => *other_value as u128,
            RegisterValue::U64(other_value) => *other_value as u128,
            RegisterValue::U128(other_value) => *other_value,
        };
        self_value.partial_cmp(&other_value)
    }
}

impl PartialEq for RegisterValue {
    fn eq(&self, other: &Self) -> bool {
        let self_value = match self {
            RegisterValue::U32(self_value) => *self_value as u128,
            RegisterValue::U64(self_value) => *self_value as u128,
            RegisterValue::U128(self_value) => *self_value,
        };
        let other_value = match other {
            RegisterValue::U32(other_value) => *other_value as u128,
            RegisterValue::U64(other_value) => *other_value as u128,
            RegisterValue::U128(other_value) => *other_value,
        };
        self_value == other_value
    }
}

impl core::fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RegisterValue::U32(register_value) => write!(f, "{register_value:#010x}"),
            RegisterValue::U64(register_value) => write!(f, "{register_value:#018x}"),
            RegisterValue::U128(register_value) => write!(f, "{register_value:#034x}"),
        }
    }
}

impl From<u32> for RegisterValue {
    fn from(val: u32) -> Self {
        Self::U32(val)
    }
}

impl From<u64> for RegisterValue {
    fn from(val: u64) -> Self {
        Self::U64(val)
    }
}

impl From<u128> for RegisterValue {
    fn from(val: u128) -> Self {
        Self::U128(val)
    }
}

impl TryInto<u32> for RegisterValue {
    type Error = crate::Error;

    fn try_into(self) -> Result<u32, Self::Error> {
        match self {
            Self::U32(v) => Ok(v),
            Self::U64(v) => v
                .try_into()
                .map_err(|_| crate::Error::Other(format!("Value '{v}' too large for u32"))),
            Self::U128(v) => v
                .try_into()
                .map_err(|_| crate::Error::Other(format!("Value '{v}' too large for u32"))),
        }
    }
}

impl TryInto<u64> for RegisterValue {
    type Error = crate::Error;

    fn try_into(self) -> Result<u64, Self::Error> {
        match self {
            Self::U32(v) => Ok(v.into()),
            Self::U64(v) => Ok(v),
            Self::U128(v) => v
                .try_into()
                .map_err(|_| crate::Error::Other(format!("Value '{v}' too large for u64"))),
        }
    }
}

impl TryInto<u128> for RegisterValue {
    type Error = crate::Error;

    fn try_into(self) -> Result<u128, Self::Error> {
        match self {
            Self::U32(v) => Ok(v.into()),
            Self::U64(v) => Ok(v.into()),
            Self::U128(v) => Ok(v),
        }
    }
}

/// Extension trait to support converting errors
/// from TryInto calls into [probe_rs::Error]
pub trait RegisterValueResultExt<T> {
    /// Convert [Result<T,E>] into `Result<T, probe_rs::Error>`
    fn into_crate_error(self) -> Result<T, Error>;
}

/// No translation conversion case
impl<T> RegisterValueResultExt<T> for Result<T, Error> {
    fn into_crate_error(self) -> Result<T, Error> {
        self
    }
}

/// Convert from Error = Infallible to Error = probe_rs::Error
impl<T> RegisterValueResultExt<T> for Result<T, Infallible> {
    fn into_crate_error(self) -> Result<T, Error> {
        Ok(self.unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_REG: CoreRegister = CoreRegister {
        roles: &[RegisterRole::Core("X0"), RegisterRole::Argument("a0")],
        id: RegisterId(0),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    };

    #[test]
    fn core_register_exposes_its_primary_name_and_size() {
        assert_eq!(TEST_REG.name(), "X0");
        assert_eq!(TEST_REG.size_in_bits(), 64);
        assert_eq!(TEST_REG.size_in_bytes(), 8);
        assert!(TEST_REG.has_role(RegisterRole::Argument("a0")));
    }

    #[test]
    fn core_registers_look_up_by_id_role_and_name() {
        let set = CoreRegisters::new(vec![&TEST_REG]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.by_id(RegisterId(0)), Some(&TEST_REG));
        assert_eq!(set.by_name("X0"), Some(&TEST_REG));
        assert_eq!(set.by_role(RegisterRole::Argument("a0")), Some(&TEST_REG));
        assert_eq!(set.by_id(RegisterId(99)), None);
    }

    #[test]
    fn register_value_converts_between_widths() {
        let value: RegisterValue = 0x1234u32.into();
        let as_u64: u64 = value.try_into().unwrap();
        assert_eq!(as_u64, 0x1234);
    }
}
