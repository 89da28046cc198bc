// Path: crates/crypto/src/transform/hmac_filter.rs
//! A filter computing a keyed MAC over the whole stream.

use crate::transform::base::Transform;
use hmac::{Hmac, Mac};
use ndn_api::crypto::DigestAlgorithm;
use ndn_types::error::{CryptoError, TransformErrorKind};
use sha2::{Sha224, Sha256, Sha384, Sha512};

enum AnyHmac {
    Sha224(Hmac<Sha224>),
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

impl AnyHmac {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha224(mac) => mac.update(data),
            Self::Sha256(mac) => mac.update(data),
            Self::Sha384(mac) => mac.update(data),
            Self::Sha512(mac) => mac.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha224(mac) => mac.finalize().into_bytes().to_vec(),
            Self::Sha256(mac) => mac.finalize().into_bytes().to_vec(),
            Self::Sha384(mac) => mac.finalize().into_bytes().to_vec(),
            Self::Sha512(mac) => mac.finalize().into_bytes().to_vec(),
        }
    }
}

/// Absorbs the stream and emits the HMAC on finalize.
pub struct HmacFilter {
    mac: Option<AnyHmac>,
}

impl Transform for HmacFilter {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        let _ = out;
        match self.mac.as_mut() {
            Some(mac) => mac.update(input),
            None => return Err(TransformErrorKind::InputClosed),
        }
        Ok(input.len())
    }

    fn finalize(&mut self, out: &mut Vec<u8>) -> Result<(), TransformErrorKind> {
        match self.mac.take() {
            Some(mac) => {
                out.extend_from_slice(&mac.finalize());
                Ok(())
            }
            None => Err(TransformErrorKind::InputClosed),
        }
    }
}

/// One-shot HMAC used by the filter and by HMAC signatures.
pub fn compute_hmac(
    algorithm: DigestAlgorithm,
    key: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut mac = new_mac(algorithm, key)?;
    mac.update(data);
    Ok(mac.finalize())
}

fn new_mac(algorithm: DigestAlgorithm, key: &[u8]) -> Result<AnyHmac, CryptoError> {
    let invalid = |_| CryptoError::InvalidKey("HMAC key rejected".into());
    match algorithm {
        DigestAlgorithm::Sha224 => Ok(AnyHmac::Sha224(
            Hmac::new_from_slice(key).map_err(invalid)?,
        )),
        DigestAlgorithm::Sha256 => Ok(AnyHmac::Sha256(
            Hmac::new_from_slice(key).map_err(invalid)?,
        )),
        DigestAlgorithm::Sha384 => Ok(AnyHmac::Sha384(
            Hmac::new_from_slice(key).map_err(invalid)?,
        )),
        DigestAlgorithm::Sha512 => Ok(AnyHmac::Sha512(
            Hmac::new_from_slice(key).map_err(invalid)?,
        )),
        other => Err(CryptoError::UnsupportedAlgorithm(format!(
            "HMAC over {other} is not supported"
        ))),
    }
}

/// Creates an HMAC filter for `algorithm` keyed with `key`.
pub fn hmac_filter(algorithm: DigestAlgorithm, key: &[u8]) -> Result<HmacFilter, CryptoError> {
    Ok(HmacFilter {
        mac: Some(new_mac(algorithm, key)?),
    })
}
