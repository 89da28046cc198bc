// Path: crates/crypto/src/digest.rs
//! Message-digest helpers shared by the digest filter and the
//! verification primitives.

use blake2::{Blake2b512, Blake2s256};
use ndn_api::crypto::DigestAlgorithm;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

/// An incremental hasher over any supported [`DigestAlgorithm`].
pub enum Hasher {
    #[allow(missing_docs)]
    Sha224(Sha224),
    #[allow(missing_docs)]
    Sha256(Sha256),
    #[allow(missing_docs)]
    Sha384(Sha384),
    #[allow(missing_docs)]
    Sha512(Sha512),
    #[allow(missing_docs)]
    Sha3_224(Sha3_224),
    #[allow(missing_docs)]
    Sha3_256(Sha3_256),
    #[allow(missing_docs)]
    Sha3_384(Sha3_384),
    #[allow(missing_docs)]
    Sha3_512(Sha3_512),
    #[allow(missing_docs)]
    Blake2b512(Blake2b512),
    #[allow(missing_docs)]
    Blake2s256(Blake2s256),
}

impl Hasher {
    /// Creates a hasher for `algorithm`.
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha224 => Self::Sha224(Sha224::new()),
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Sha384 => Self::Sha384(Sha384::new()),
            DigestAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
            DigestAlgorithm::Sha3_224 => Self::Sha3_224(Sha3_224::new()),
            DigestAlgorithm::Sha3_256 => Self::Sha3_256(Sha3_256::new()),
            DigestAlgorithm::Sha3_384 => Self::Sha3_384(Sha3_384::new()),
            DigestAlgorithm::Sha3_512 => Self::Sha3_512(Sha3_512::new()),
            DigestAlgorithm::Blake2b512 => Self::Blake2b512(Blake2b512::new()),
            DigestAlgorithm::Blake2s256 => Self::Blake2s256(Blake2s256::new()),
        }
    }

    /// Absorbs more input.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha224(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Sha3_224(h) => h.update(data),
            Self::Sha3_256(h) => h.update(data),
            Self::Sha3_384(h) => h.update(data),
            Self::Sha3_512(h) => h.update(data),
            Self::Blake2b512(h) => h.update(data),
            Self::Blake2s256(h) => h.update(data),
        }
    }

    /// Produces the digest.
    pub fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha224(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha384(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
            Self::Sha3_224(h) => h.finalize().to_vec(),
            Self::Sha3_256(h) => h.finalize().to_vec(),
            Self::Sha3_384(h) => h.finalize().to_vec(),
            Self::Sha3_512(h) => h.finalize().to_vec(),
            Self::Blake2b512(h) => h.finalize().to_vec(),
            Self::Blake2s256(h) => h.finalize().to_vec(),
        }
    }
}

/// One-shot digest of `data` under `algorithm`.
pub fn compute(algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// One-shot SHA-256, the workhorse digest of the packet formats.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_answer() {
        // SHA-256 of the empty string.
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_sizes_match_declared() {
        for algorithm in [
            DigestAlgorithm::Sha224,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
            DigestAlgorithm::Sha3_224,
            DigestAlgorithm::Sha3_256,
            DigestAlgorithm::Sha3_384,
            DigestAlgorithm::Sha3_512,
            DigestAlgorithm::Blake2b512,
            DigestAlgorithm::Blake2s256,
        ] {
            assert_eq!(
                compute(algorithm, b"abc").len(),
                algorithm.digest_size(),
                "{algorithm}"
            );
        }
    }

    #[test]
    fn incremental_equals_one_shot() {
        let mut hasher = Hasher::new(DigestAlgorithm::Sha384);
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hasher.finalize(), compute(DigestAlgorithm::Sha384, b"hello world"));
    }
}
