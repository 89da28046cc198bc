// Path: crates/crypto/src/transform/digest_filter.rs
//! A filter computing a message digest over the whole stream.

use crate::digest::Hasher;
use crate::transform::base::Transform;
use ndn_api::crypto::DigestAlgorithm;
use ndn_types::error::TransformErrorKind;

/// Absorbs the stream and emits the digest on finalize.
pub struct DigestFilter {
    hasher: Option<Hasher>,
    algorithm: DigestAlgorithm,
}

impl Transform for DigestFilter {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        let _ = out;
        match self.hasher.as_mut() {
            Some(hasher) => hasher.update(input),
            None => return Err(TransformErrorKind::InputClosed),
        }
        Ok(input.len())
    }

    fn finalize(&mut self, out: &mut Vec<u8>) -> Result<(), TransformErrorKind> {
        let hasher = self
            .hasher
            .take()
            .unwrap_or_else(|| Hasher::new(self.algorithm));
        out.extend_from_slice(&hasher.finalize());
        Ok(())
    }
}

/// Creates a digest filter for `algorithm`.
pub fn digest_filter(algorithm: DigestAlgorithm) -> DigestFilter {
    DigestFilter {
        hasher: Some(Hasher::new(algorithm)),
        algorithm,
    }
}
