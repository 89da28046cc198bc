// Path: crates/crypto/src/key/params.rs
//! Key generation parameters.

use ndn_api::crypto::KeyType;
use ndn_types::error::CryptoError;

const EC_CURVE_BITS: [usize; 4] = [224, 256, 384, 521];
const MIN_RSA_BITS: usize = 2048;

/// Parameters for [`generate_private_key`](super::generate_private_key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyParams {
    /// RSA with the given modulus size; at least 2048 bits.
    Rsa {
        /// Modulus size in bits.
        bits: usize,
    },
    /// ECDSA over a NIST named curve: 224, 256, 384, or 521 bits.
    Ec {
        /// Curve size in bits.
        bits: usize,
    },
    /// HMAC with a random key of the given size; a positive multiple of 8.
    Hmac {
        /// Key size in bits.
        bits: usize,
    },
}

impl KeyParams {
    /// The key type these parameters produce.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Rsa { .. } => KeyType::Rsa,
            Self::Ec { .. } => KeyType::Ec,
            Self::Hmac { .. } => KeyType::Hmac,
        }
    }

    /// Rejects unsupported sizes.
    pub fn validate(&self) -> Result<(), CryptoError> {
        match *self {
            Self::Rsa { bits } if bits < MIN_RSA_BITS => Err(CryptoError::InvalidKeyParams(
                format!("RSA key size must be at least {MIN_RSA_BITS} bits, got {bits}"),
            )),
            Self::Ec { bits } if !EC_CURVE_BITS.contains(&bits) => Err(
                CryptoError::InvalidKeyParams(format!("unsupported EC curve size {bits}")),
            ),
            Self::Hmac { bits } if bits == 0 || bits % 8 != 0 => {
                Err(CryptoError::InvalidKeyParams(format!(
                    "HMAC key size must be a positive multiple of 8, got {bits}"
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert!(KeyParams::Rsa { bits: 2048 }.validate().is_ok());
        assert!(KeyParams::Rsa { bits: 1024 }.validate().is_err());
        for bits in [224, 256, 384, 521] {
            assert!(KeyParams::Ec { bits }.validate().is_ok());
        }
        assert!(KeyParams::Ec { bits: 512 }.validate().is_err());
        assert!(KeyParams::Hmac { bits: 256 }.validate().is_ok());
        assert!(KeyParams::Hmac { bits: 0 }.validate().is_err());
        assert!(KeyParams::Hmac { bits: 12 }.validate().is_err());
    }
}
