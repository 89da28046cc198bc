// Path: crates/api/src/security.rs
//! The signing collaborator seam.
//!
//! Persistent identity storage is out of scope for the kernel; anything
//! that can sign packets (a real key-chain backend, or the in-memory
//! key chain used by tests) implements [`KeyChain`].

use crate::crypto::DigestAlgorithm;
use ndn_types::error::CryptoError;
use ndn_types::{Data, Interest, Name, SignedInterestFormat};

/// Selects the signer for an outgoing packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignerType {
    /// The key chain's default identity.
    #[default]
    Default,
    /// The default key of the named identity.
    Identity(Name),
    /// The named key.
    Key(Name),
    /// The named certificate.
    Certificate(Name),
    /// No key: a DigestSha256 integrity signature.
    Sha256,
}

/// Signing parameters: which signer, and which digest algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInfo {
    /// The signer selector.
    pub signer: SignerType,
    /// Digest algorithm for the signature computation.
    pub digest: DigestAlgorithm,
}

impl Default for SigningInfo {
    fn default() -> Self {
        Self {
            signer: SignerType::Default,
            digest: DigestAlgorithm::Sha256,
        }
    }
}

impl SigningInfo {
    /// Sign with the default key of `identity`.
    pub fn with_identity(identity: Name) -> Self {
        Self {
            signer: SignerType::Identity(identity),
            ..Self::default()
        }
    }

    /// Sign with the named key.
    pub fn with_key(key_name: Name) -> Self {
        Self {
            signer: SignerType::Key(key_name),
            ..Self::default()
        }
    }

    /// Sign with a DigestSha256 integrity signature.
    pub fn with_sha256() -> Self {
        Self {
            signer: SignerType::Sha256,
            ..Self::default()
        }
    }
}

/// The signing collaborator.
pub trait KeyChain: Send + Sync {
    /// Signs `data` in place: fills SignatureInfo (signature type and key
    /// locator) and SignatureValue.
    fn sign_data(&self, data: &mut Data, info: &SigningInfo) -> Result<(), CryptoError>;

    /// Signs `interest` in place according to `format`.
    ///
    /// For v0.3, the signature elements are placed at packet level; for
    /// v0.2, the timestamp, nonce, SignatureInfo, and SignatureValue are
    /// appended as name components.
    fn sign_interest(
        &self,
        interest: &mut Interest,
        info: &SigningInfo,
        format: SignedInterestFormat,
    ) -> Result<(), CryptoError>;
}
