// Path: crates/crypto/src/transform/hex.rs
//! Hexadecimal encode/decode filters.

use crate::transform::base::Transform;
use ndn_types::error::TransformErrorKind;

/// Streaming lower-case hex encoder.
pub struct HexEncode;

impl Transform for HexEncode {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        out.extend_from_slice(hex::encode(input).as_bytes());
        Ok(input.len())
    }
}

/// Creates a hex encoder.
pub fn hex_encode() -> HexEncode {
    HexEncode
}

/// Streaming hex decoder; an odd number of digits is an error.
pub struct HexDecode {
    carry: Option<u8>,
}

fn nibble(digit: u8) -> Result<u8, TransformErrorKind> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(TransformErrorKind::InvalidInput(format!(
            "invalid hex digit 0x{other:02x}"
        ))),
    }
}

impl Transform for HexDecode {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        for &digit in input {
            match self.carry.take() {
                Some(high) => out.push(high << 4 | nibble(digit)?),
                None => self.carry = Some(nibble(digit)?),
            }
        }
        Ok(input.len())
    }

    fn finalize(&mut self, out: &mut Vec<u8>) -> Result<(), TransformErrorKind> {
        let _ = out;
        if self.carry.is_some() {
            return Err(TransformErrorKind::InvalidInput(
                "odd number of hex digits".into(),
            ));
        }
        Ok(())
    }
}

/// Creates a hex decoder.
pub fn hex_decode() -> HexDecode {
    HexDecode { carry: None }
}
