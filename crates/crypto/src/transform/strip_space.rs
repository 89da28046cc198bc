// Path: crates/crypto/src/transform/strip_space.rs
//! A filter that removes ASCII whitespace from its input.

use crate::transform::base::Transform;
use ndn_types::error::TransformErrorKind;

const WHITESPACE: &[u8] = b" \x0c\n\r\t\x0b";

/// Removes space, form feed, newline, carriage return, tab, and vertical
/// tab from the stream.
pub struct StripSpace;

impl Transform for StripSpace {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        out.extend(input.iter().copied().filter(|b| !WHITESPACE.contains(b)));
        Ok(input.len())
    }
}

/// Creates a whitespace-stripping filter.
pub fn strip_space() -> StripSpace {
    StripSpace
}
