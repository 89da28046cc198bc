// Path: crates/crypto/src/transform/verifier_filter.rs
//! A filter that verifies a signature over the whole stream.

use crate::key::{PrivateKey, PublicKey};
use crate::transform::base::Transform;
use ndn_api::crypto::DigestAlgorithm;
use ndn_types::error::TransformErrorKind;

enum VerifierKey<'a> {
    Public(&'a PublicKey),
    // HMAC verification recomputes the MAC with the shared secret.
    Hmac(&'a PrivateKey),
}

/// Absorbs the stream and emits one byte on finalize: 1 when the
/// signature verifies, 0 otherwise.
pub struct VerifierFilter<'a> {
    key: VerifierKey<'a>,
    algorithm: DigestAlgorithm,
    signature: Vec<u8>,
    buffer: Vec<u8>,
    done: bool,
}

impl Transform for VerifierFilter<'_> {
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
        let ok = match &self.key {
            VerifierKey::Public(key) => key
                .verify(self.algorithm, &self.buffer, &self.signature)
                .map_err(TransformErrorKind::Crypto)?,
            VerifierKey::Hmac(key) => {
                let expected = key
                    .sign(self.algorithm, &self.buffer)
                    .map_err(TransformErrorKind::Crypto)?;
                expected == self.signature
            }
        };
        self.buffer.clear();
        out.push(u8::from(ok));
        Ok(())
    }
}

/// Creates a verifier filter checking `signature` under a public key.
pub fn verifier_filter<'a>(
    algorithm: DigestAlgorithm,
    key: &'a PublicKey,
    signature: &[u8],
) -> VerifierFilter<'a> {
    VerifierFilter {
        key: VerifierKey::Public(key),
        algorithm,
        signature: signature.to_vec(),
        buffer: Vec::new(),
        done: false,
    }
}

/// Creates a verifier filter checking an HMAC under the shared secret.
pub fn verifier_filter_hmac<'a>(
    algorithm: DigestAlgorithm,
    key: &'a PrivateKey,
    signature: &[u8],
) -> VerifierFilter<'a> {
    VerifierFilter {
        key: VerifierKey::Hmac(key),
        algorithm,
        signature: signature.to_vec(),
        buffer: Vec::new(),
        done: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{generate_private_key, KeyParams};
    use crate::transform::base::buffer_source;
    use crate::transform::sinks::bool_sink;
    use ndn_api::crypto::KeyType;

    #[test]
    fn verifies_good_and_rejects_bad() {
        let key = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let public = key.derive_public_key().unwrap();
        let signature = key.sign(DigestAlgorithm::Sha256, b"payload").unwrap();

        let mut ok = false;
        buffer_source(b"payload".to_vec())
            .pipe(verifier_filter(DigestAlgorithm::Sha256, &public, &signature))
            .run(bool_sink(&mut ok))
            .unwrap();
        assert!(ok);

        let mut ok = true;
        buffer_source(b"tampered".to_vec())
            .pipe(verifier_filter(DigestAlgorithm::Sha256, &public, &signature))
            .run(bool_sink(&mut ok))
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn hmac_verification_roundtrip() {
        let key = PrivateKey::from_raw(KeyType::Hmac, &[9u8; 32]).unwrap();
        let mac = key.sign(DigestAlgorithm::Sha256, b"keyed").unwrap();

        let mut ok = false;
        buffer_source(b"keyed".to_vec())
            .pipe(verifier_filter_hmac(DigestAlgorithm::Sha256, &key, &mac))
            .run(bool_sink(&mut ok))
            .unwrap();
        assert!(ok);
    }
}
