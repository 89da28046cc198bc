// Path: crates/types/src/tlv.rs
//! The TLV wire codec shared by every packet type in the kernel.
//!
//! NDN encodes every packet as nested Type-Length-Value elements whose
//! type and length fields use the VAR-NUMBER scheme: one byte for values
//! below 253, and 3/5/9-byte forms introduced by 253/254/255. Centralizing
//! the codec in the base `types` crate ensures all components agree on the
//! exact wire representation.

use crate::error::TlvError;

/// Assigned TLV-TYPE numbers (NDN packet format v0.3).
#[allow(missing_docs)]
pub mod number {
    pub const IMPLICIT_SHA256_DIGEST_COMPONENT: u32 = 1;
    pub const INTEREST: u32 = 5;
    pub const DATA: u32 = 6;
    pub const NAME: u32 = 7;
    pub const GENERIC_NAME_COMPONENT: u32 = 8;
    pub const NONCE: u32 = 10;
    pub const INTEREST_LIFETIME: u32 = 12;
    pub const MUST_BE_FRESH: u32 = 18;
    pub const META_INFO: u32 = 20;
    pub const CONTENT: u32 = 21;
    pub const SIGNATURE_INFO: u32 = 22;
    pub const SIGNATURE_VALUE: u32 = 23;
    pub const CONTENT_TYPE: u32 = 24;
    pub const FRESHNESS_PERIOD: u32 = 25;
    pub const FINAL_BLOCK_ID: u32 = 26;
    pub const SIGNATURE_TYPE: u32 = 27;
    pub const KEY_LOCATOR: u32 = 28;
    pub const KEY_DIGEST: u32 = 29;
    pub const FORWARDING_HINT: u32 = 30;
    pub const KEYWORD_NAME_COMPONENT: u32 = 32;
    pub const CAN_BE_PREFIX: u32 = 33;
    pub const APPLICATION_PARAMETERS: u32 = 36;
    pub const SIGNATURE_NONCE: u32 = 38;
    pub const SIGNATURE_TIME: u32 = 40;
    pub const SIGNATURE_SEQ_NUM: u32 = 42;
    pub const INTEREST_SIGNATURE_INFO: u32 = 44;
    pub const INTEREST_SIGNATURE_VALUE: u32 = 46;
    pub const SEGMENT_NAME_COMPONENT: u32 = 50;
    pub const BYTE_OFFSET_NAME_COMPONENT: u32 = 52;
    pub const VERSION_NAME_COMPONENT: u32 = 54;
    pub const TIMESTAMP_NAME_COMPONENT: u32 = 56;
    pub const SEQUENCE_NUM_NAME_COMPONENT: u32 = 58;
    pub const VALIDITY_PERIOD: u32 = 253;
    pub const NOT_BEFORE: u32 = 254;
    pub const NOT_AFTER: u32 = 255;
    pub const ADDITIONAL_DESCRIPTION: u32 = 258;
    pub const DESCRIPTION_ENTRY: u32 = 512;
    pub const DESCRIPTION_KEY: u32 = 513;
    pub const DESCRIPTION_VALUE: u32 = 514;

    // Management protocol.
    pub const CONTROL_RESPONSE: u32 = 101;
    pub const STATUS_CODE: u32 = 102;
    pub const STATUS_TEXT: u32 = 103;
    pub const CONTROL_PARAMETERS: u32 = 104;
}

/// Assigned ContentType values.
#[allow(missing_docs)]
pub mod content_type {
    pub const BLOB: u32 = 0;
    pub const LINK: u32 = 1;
    pub const KEY: u32 = 2;
    pub const NACK: u32 = 3;
}

/// Writes a VAR-NUMBER into `out`.
pub fn write_var_number(out: &mut Vec<u8>, n: u64) {
    if n < 253 {
        out.push(n as u8);
    } else if n <= u64::from(u16::MAX) {
        out.push(253);
        out.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= u64::from(u32::MAX) {
        out.push(254);
        out.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        out.push(255);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

/// Reads a VAR-NUMBER from the front of `buf`, returning the value and the
/// number of bytes consumed.
pub fn read_var_number(buf: &[u8]) -> Result<(u64, usize), TlvError> {
    let first = *buf.first().ok_or(TlvError::UnexpectedEnd)?;
    match first {
        0..=252 => Ok((u64::from(first), 1)),
        253 => {
            let bytes: [u8; 2] = buf
                .get(1..3)
                .ok_or(TlvError::UnexpectedEnd)?
                .try_into()
                .map_err(|_| TlvError::UnexpectedEnd)?;
            Ok((u64::from(u16::from_be_bytes(bytes)), 3))
        }
        254 => {
            let bytes: [u8; 4] = buf
                .get(1..5)
                .ok_or(TlvError::UnexpectedEnd)?
                .try_into()
                .map_err(|_| TlvError::UnexpectedEnd)?;
            Ok((u64::from(u32::from_be_bytes(bytes)), 5))
        }
        255 => {
            let bytes: [u8; 8] = buf
                .get(1..9)
                .ok_or(TlvError::UnexpectedEnd)?
                .try_into()
                .map_err(|_| TlvError::UnexpectedEnd)?;
            Ok((u64::from_be_bytes(bytes), 9))
        }
    }
}

/// Encodes a non-negative integer in the shortest of 1/2/4/8 bytes.
pub fn encode_non_negative_integer(n: u64) -> Vec<u8> {
    if n <= u64::from(u8::MAX) {
        vec![n as u8]
    } else if n <= u64::from(u16::MAX) {
        (n as u16).to_be_bytes().to_vec()
    } else if n <= u64::from(u32::MAX) {
        (n as u32).to_be_bytes().to_vec()
    } else {
        n.to_be_bytes().to_vec()
    }
}

/// Decodes a non-negative integer from a 1/2/4/8-byte value.
pub fn decode_non_negative_integer(value: &[u8]) -> Result<u64, TlvError> {
    match value.len() {
        1 => Ok(u64::from(value[0])),
        2 => Ok(u64::from(u16::from_be_bytes([value[0], value[1]]))),
        4 => {
            let bytes: [u8; 4] = value.try_into().map_err(|_| TlvError::UnexpectedEnd)?;
            Ok(u64::from(u32::from_be_bytes(bytes)))
        }
        8 => {
            let bytes: [u8; 8] = value.try_into().map_err(|_| TlvError::UnexpectedEnd)?;
            Ok(u64::from_be_bytes(bytes))
        }
        n => Err(TlvError::InvalidIntegerLength(n)),
    }
}

/// One TLV element: a type number and an opaque value.
///
/// A `Block` does not interpret its value; packet types parse nested
/// elements through [`Block::elements`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    tlv_type: u32,
    value: Vec<u8>,
}

impl Block {
    /// Creates a block from a type number and value bytes.
    pub fn new(tlv_type: u32, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tlv_type,
            value: value.into(),
        }
    }

    /// Creates an empty block (zero-length value).
    pub fn empty(tlv_type: u32) -> Self {
        Self {
            tlv_type,
            value: Vec::new(),
        }
    }

    /// Creates a block whose value is a non-negative integer.
    pub fn from_non_negative_integer(tlv_type: u32, n: u64) -> Self {
        Self {
            tlv_type,
            value: encode_non_negative_integer(n),
        }
    }

    /// The TLV-TYPE of this block.
    pub fn tlv_type(&self) -> u32 {
        self.tlv_type
    }

    /// The value bytes of this block.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consumes the block, returning its value bytes.
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Interprets the value as a non-negative integer.
    pub fn to_non_negative_integer(&self) -> Result<u64, TlvError> {
        decode_non_negative_integer(&self.value)
    }

    /// Length of the full wire encoding (type + length + value).
    pub fn encoded_len(&self) -> usize {
        var_number_len(u64::from(self.tlv_type))
            + var_number_len(self.value.len() as u64)
            + self.value.len()
    }

    /// Appends the full wire encoding to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        write_var_number(out, u64::from(self.tlv_type));
        write_var_number(out, self.value.len() as u64);
        out.extend_from_slice(&self.value);
    }

    /// Returns the full wire encoding.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }

    /// Reads one block from the front of `buf`, returning it together with
    /// the number of bytes consumed.
    pub fn from_wire(buf: &[u8]) -> Result<(Self, usize), TlvError> {
        let (tlv_type, type_len) = read_var_number(buf)?;
        let tlv_type =
            u32::try_from(tlv_type).map_err(|_| TlvError::InvalidVarNumber)?;
        let rest = &buf[type_len..];
        let (length, length_len) = read_var_number(rest)?;
        let length = usize::try_from(length).map_err(|_| TlvError::InvalidVarNumber)?;
        let value_start = type_len + length_len;
        let available = buf.len().saturating_sub(value_start);
        if length > available {
            return Err(TlvError::LengthOverflow {
                declared: length,
                available,
            });
        }
        let value = buf[value_start..value_start + length].to_vec();
        Ok((Self { tlv_type, value }, value_start + length))
    }

    /// Reads exactly one block occupying the whole of `buf`.
    pub fn from_slice(buf: &[u8]) -> Result<Self, TlvError> {
        let (block, consumed) = Self::from_wire(buf)?;
        if consumed != buf.len() {
            return Err(TlvError::InvalidValue(format!(
                "{} trailing bytes after TLV element",
                buf.len() - consumed
            )));
        }
        Ok(block)
    }

    /// Parses the value as a sequence of nested blocks.
    pub fn elements(&self) -> Result<Vec<Block>, TlvError> {
        parse_elements(&self.value)
    }
}

/// Parses `buf` as a sequence of consecutive TLV elements.
pub fn parse_elements(buf: &[u8]) -> Result<Vec<Block>, TlvError> {
    let mut elements = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let (block, consumed) = Block::from_wire(&buf[offset..])?;
        elements.push(block);
        offset += consumed;
    }
    Ok(elements)
}

fn var_number_len(n: u64) -> usize {
    if n < 253 {
        1
    } else if n <= u64::from(u16::MAX) {
        3
    } else if n <= u64::from(u32::MAX) {
        5
    } else {
        9
    }
}
