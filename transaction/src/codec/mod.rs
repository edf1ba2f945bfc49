//! The wire format.
//!
//! A message is laid out as:
//!
//! * a version byte `0x80 | version`, absent for legacy messages;
//! * the header: three `u8` counts;
//! * the static accounts, a compact-u16 count of 32-byte addresses;
//! * the 32-byte lifetime token;
//! * the instructions, each a program index, compact-u16 prefixed account
//!   indices and compact-u16 prefixed data;
//! * for versioned messages only, the address table lookups.
//!
//! A transaction prefixes the message with a compact-u16 count of 64-byte
//! signature slots, zero-filled where a signature is missing.

pub mod message;
pub mod short_vec;
pub mod transaction;

pub use {
    message::{decode_message, encode_message},
    transaction::{decode_transaction, encode_transaction},
};

use txforge_error::CodecError;

/// Cursor over an input buffer.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }

    pub(crate) fn peek_u8(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    pub(crate) fn read_bytes(
        &mut self,
        len: usize,
        what: &'static str,
    ) -> Result<&'a [u8], CodecError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(CodecError::UnexpectedEndOfInput {
                what,
                offset: self.offset,
            })?;
        let bytes = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    pub(crate) fn read_u8(&mut self, what: &'static str) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1, what)?[0])
    }

    pub(crate) fn read_array<const N: usize>(
        &mut self,
        what: &'static str,
    ) -> Result<[u8; N], CodecError> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_bytes(N, what)?);
        Ok(array)
    }

    pub(crate) fn read_len(&mut self) -> Result<usize, CodecError> {
        let (len, consumed) = short_vec::decode_len(self.remaining(), self.offset)?;
        self.offset += consumed;
        Ok(len)
    }

    /// A compact-u16 prefixed byte array.
    pub(crate) fn read_short_vec(&mut self, what: &'static str) -> Result<Vec<u8>, CodecError> {
        let len = self.read_len()?;
        Ok(self.read_bytes(len, what)?.to_vec())
    }
}

/// Append a compact-u16 prefixed byte array.
pub(crate) fn write_short_vec(bytes: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
    short_vec::encode_len(bytes.len(), out)?;
    out.extend_from_slice(bytes);
    Ok(())
}
