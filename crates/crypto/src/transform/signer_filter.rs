// Path: crates/crypto/src/transform/signer_filter.rs
//! A filter that signs the whole stream with a private key.

use crate::key::PrivateKey;
use crate::transform::base::Transform;
use ndn_api::crypto::DigestAlgorithm;
use ndn_types::error::TransformErrorKind;

/// Absorbs the stream and emits the signature on finalize.
pub struct SignerFilter<'a> {
    key: &'a PrivateKey,
    algorithm: DigestAlgorithm,
    buffer: Vec<u8>,
    done: bool,
}

impl Transform for SignerFilter<'_> {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        let _ = out;
        if self.done {
            return Err(TransformErrorKind::InputClosed);
        }
        self.buffer.extend_from_slice(input);
        Ok(input.len())
    }

    fn finalize(&mut self, out: &mut Vec<u8>) -> Result<(), TransformErrorKind> {
        self.done = true;
        let signature = self
            .key
            .sign(self.algorithm, &self.buffer)
            .map_err(TransformErrorKind::Crypto)?;
        self.buffer.clear();
        out.extend_from_slice(&signature);
        Ok(())
    }
}

/// Creates a signer filter over `key` using `algorithm`.
pub fn signer_filter(algorithm: DigestAlgorithm, key: &PrivateKey) -> SignerFilter<'_> {
    SignerFilter {
        key,
        algorithm,
        buffer: Vec::new(),
        done: false,
    }
}
