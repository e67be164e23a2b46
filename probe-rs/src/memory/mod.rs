//! Types and functions for interacting with target memory.

use crate::architecture::arm::{ArmError, FullyQualifiedApAddress, memory::ArmMemoryInterface};

/// An address was not aligned to the access width it was attempted at.
#[derive(Debug, Clone, Copy, thiserror::Error, docsplay::Display)]
#[display("Address {address:#010x} is not aligned to the required {alignment} byte boundary.")]
pub struct MemoryNotAlignedError {
    /// The address that was accessed.
    pub address: u64,
    /// The required alignment, in bytes.
    pub alignment: usize,
}

/// A bulk transfer was given a buffer whose length did not match the
/// transfer's width requirement.
#[derive(Debug, Clone, Copy, thiserror::Error, docsplay::Display)]
#[display("Data length {actual} is not a multiple of {expected_multiple_of} bytes.")]
pub struct InvalidDataLengthError {
    /// The length that was passed in, in bytes.
    pub actual: usize,
    /// The width the length should have been a multiple of.
    pub expected_multiple_of: usize,
}

/// An interface to be implemented for drivers that allow target memory access.
///
/// Implementors only need to provide the non-default methods; word-at-a-time
/// helpers (`read_word_32`, `write_word_8`, ...) are derived from the block
/// variants.
pub trait MemoryInterface<E = crate::error::Error> {
    /// Does this interface support native 64-bit wide accesses.
    ///
    /// If false all 64-bit operations may be split into 32 or 8 bit operations.
    /// Most callers will not need to pivot on this, but it can be useful for
    /// picking the fastest bulk data transfer method.
    fn supports_native_64bit_access(&mut self) -> bool;

    /// Read a block of 64 bit words at `address`.
    ///
    /// The number of words read is `data.len()`. `address` must be a multiple of 8.
    fn read_64(&mut self, address: u64, data: &mut [u64]) -> Result<(), E>;

    /// Read a block of 32 bit words at `address`.
    ///
    /// The number of words read is `data.len()`. `address` must be a multiple of 4.
    fn read_32(&mut self, address: u64, data: &mut [u32]) -> Result<(), E>;

    /// Read a block of 16 bit words at `address`.
    ///
    /// The number of words read is `data.len()`. `address` must be a multiple of 2.
    fn read_16(&mut self, address: u64, data: &mut [u16]) -> Result<(), E>;

    /// Read a block of 8 bit words at `address`.
    fn read_8(&mut self, address: u64, data: &mut [u8]) -> Result<(), E>;

    /// Read a block of bytes at `address`, without requiring any particular alignment.
    ///
    /// May use wider accesses internally, so should only be used on memory that has
    /// no read side effects.
    fn read(&mut self, address: u64, data: &mut [u8]) -> Result<(), E>;

    /// Write a block of 64 bit words at `address`.
    ///
    /// The number of words written is `data.len()`. `address` must be a multiple of 8.
    fn write_64(&mut self, address: u64, data: &[u64]) -> Result<(), E>;

    /// Write a block of 32 bit words at `address`.
    ///
    /// The number of words written is `data.len()`. `address` must be a multiple of 4.
    fn write_32(&mut self, address: u64, data: &[u32]) -> Result<(), E>;

    /// Write a block of 16 bit words at `address`.
    ///
    /// The number of words written is `data.len()`. `address` must be a multiple of 2.
    fn write_16(&mut self, address: u64, data: &[u16]) -> Result<(), E>;

    /// Write a block of 8 bit words at `address`.
    fn write_8(&mut self, address: u64, data: &[u8]) -> Result<(), E>;

    /// Write a block of bytes at `address`, without requiring any particular alignment.
    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), E>;

    /// Returns whether the current platform supports native 8 bit transfers.
    fn supports_8bit_transfers(&self) -> Result<bool, E>;

    /// Flush any outstanding operations.
    ///
    /// For performance, debug probe implementations may choose to batch writes; to
    /// assure that any such batched writes have in fact been issued, `flush` can be
    /// called. Takes no arguments, but may return failure if a batched operation fails.
    fn flush(&mut self) -> Result<(), E>;

    /// Reads a 64 bit word from `address`.
    fn read_word_64(&mut self, address: u64) -> Result<u64, E> {
        let mut buff = [0];
        self.read_64(address, &mut buff)?;
        Ok(buff[0])
    }

    /// Reads a 32 bit word from `address`.
    fn read_word_32(&mut self, address: u64) -> Result<u32, E> {
        let mut buff = [0];
        self.read_32(address, &mut buff)?;
        Ok(buff[0])
    }

    /// Reads a 16 bit word from `address`.
    fn read_word_16(&mut self, address: u64) -> Result<u16, E> {
        let mut buff = [0];
        self.read_16(address, &mut buff)?;
        Ok(buff[0])
    }

    /// Reads an 8 bit word from `address`.
    fn read_word_8(&mut self, address: u64) -> Result<u8, E> {
        let mut buff = [0];
        self.read_8(address, &mut buff)?;
        Ok(buff[0])
    }

    /// Writes a 64 bit word to `address`.
    fn write_word_64(&mut self, address: u64, data: u64) -> Result<(), E> {
        self.write_64(address, &[data])
    }

    /// Writes a 32 bit word to `address`.
    fn write_word_32(&mut self, address: u64, data: u32) -> Result<(), E> {
        self.write_32(address, &[data])
    }

    /// Writes a 16 bit word to `address`.
    fn write_word_16(&mut self, address: u64, data: u16) -> Result<(), E> {
        self.write_16(address, &[data])
    }

    /// Writes an 8 bit word to `address`.
    fn write_word_8(&mut self, address: u64, data: u8) -> Result<(), E> {
        self.write_8(address, &[data])
    }
}

impl<T, E> MemoryInterface<E> for &mut T
where
    T: MemoryInterface<E>,
{
    fn supports_native_64bit_access(&mut self) -> bool {
        (*self).supports_native_64bit_access()
    }

    fn read_64(&mut self, address: u64, data: &mut [u64]) -> Result<(), E> {
        (*self).read_64(address, data)
    }

    fn read_32(&mut self, address: u64, data: &mut [u32]) -> Result<(), E> {
        (*self).read_32(address, data)
    }

    fn read_16(&mut self, address: u64, data: &mut [u16]) -> Result<(), E> {
        (*self).read_16(address, data)
    }

    fn read_8(&mut self, address: u64, data: &mut [u8]) -> Result<(), E> {
        (*self).read_8(address, data)
    }

    fn read(&mut self, address: u64, data: &mut [u8]) -> Result<(), E> {
        (*self).read(address, data)
    }

    fn write_64(&mut self, address: u64, data: &[u64]) -> Result<(), E> {
        (*self).write_64(address, data)
    }

    fn write_32(&mut self, address: u64, data: &[u32]) -> Result<(), E> {
        (*self).write_32(address, data)
    }

    fn write_16(&mut self, address: u64, data: &[u16]) -> Result<(), E> {
        (*self).write_16(address, data)
    }

    fn write_8(&mut self, address: u64, data: &[u8]) -> Result<(), E> {
        (*self).write_8(address, data)
    }

    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), E> {
        (*self).write(address, data)
    }

    fn supports_8bit_transfers(&self) -> Result<bool, E> {
        MemoryInterface::supports_8bit_transfers(&**self)
    }

    fn flush(&mut self) -> Result<(), E> {
        (*self).flush()
    }
}

/// A handle to target memory through a specific MEM-AP.
///
/// This is a thin convenience wrapper around a boxed [`ArmMemoryInterface`]; most
/// code should be generic over `MemoryInterface<ArmError>` instead and only reach
/// for the concrete type when it needs [`Memory::fully_qualified_address`] or
/// [`Memory::base_address`].
pub struct Memory<'probe> {
    inner: Box<dyn ArmMemoryInterface + 'probe>,
}

impl<'probe> Memory<'probe> {
    /// Wraps an [`ArmMemoryInterface`] handle.
    pub fn new(inner: impl ArmMemoryInterface + 'probe) -> Memory<'probe> {
        Self {
            inner: Box::new(inner),
        }
    }

    /// The AP this handle reads and writes through.
    pub fn fully_qualified_address(&self) -> FullyQualifiedApAddress {
        self.inner.fully_qualified_address()
    }

    /// The AP's CoreSight base address (BASE/BASE2).
    pub fn base_address(&mut self) -> Result<u64, ArmError> {
        self.inner.base_address()
    }

    /// Borrows the underlying [`ArmMemoryInterface`].
    pub fn as_arm_memory_interface_mut(&mut self) -> &mut dyn ArmMemoryInterface {
        self.inner.as_mut()
    }
}

impl MemoryInterface<ArmError> for Memory<'_> {
    fn supports_native_64bit_access(&mut self) -> bool {
        self.inner.supports_native_64bit_access()
    }

    fn read_64(&mut self, address: u64, data: &mut [u64]) -> Result<(), ArmError> {
        self.inner.read_64(address, data)
    }

    fn read_32(&mut self, address: u64, data: &mut [u32]) -> Result<(), ArmError> {
        self.inner.read_32(address, data)
    }

    fn read_16(&mut self, address: u64, data: &mut [u16]) -> Result<(), ArmError> {
        self.inner.read_16(address, data)
    }

    fn read_8(&mut self, address: u64, data: &mut [u8]) -> Result<(), ArmError> {
        self.inner.read_8(address, data)
    }

    fn read(&mut self, address: u64, data: &mut [u8]) -> Result<(), ArmError> {
        self.inner.read(address, data)
    }

    fn write_64(&mut self, address: u64, data: &[u64]) -> Result<(), ArmError> {
        self.inner.write_64(address, data)
    }

    fn write_32(&mut self, address: u64, data: &[u32]) -> Result<(), ArmError> {
        self.inner.write_32(address, data)
    }

    fn write_16(&mut self, address: u64, data: &[u16]) -> Result<(), ArmError> {
        self.inner.write_16(address, data)
    }

    fn write_8(&mut self, address: u64, data: &[u8]) -> Result<(), ArmError> {
        self.inner.write_8(address, data)
    }

    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), ArmError> {
        self.inner.write(address, data)
    }

    fn supports_8bit_transfers(&self) -> Result<bool, ArmError> {
        self.inner.supports_8bit_transfers()
    }

    fn flush(&mut self) -> Result<(), ArmError> {
        self.inner.flush()
    }
}

/// Validates that an address fits in 32 bits, for platforms whose address space is that narrow.
pub(crate) fn valid_32bit_address(address: u64) -> Result<u32, ArmError> {
    crate::architecture::arm::valid_32bit_arm_address(address)
}
