// Path: crates/crypto/src/key/mod.rs
//! Private and public key material.
//!
//! Keys are value types constructed by loaders; the PKCS#1/PKCS#8
//! containers (plain and password-encrypted) are handled here, as is key
//! generation. All OID dispatch lives in this module so the rest of the
//! kernel never touches DER internals.

mod params;
mod private;
mod public;

pub use params::KeyParams;
pub use private::{generate_private_key, PrivateKey};
pub use public::PublicKey;

use const_oid::ObjectIdentifier;

pub(crate) const OID_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
pub(crate) const OID_EC_PUBLIC_KEY: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
pub(crate) const OID_SECP224R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.33");
pub(crate) const OID_SECP256R1: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
pub(crate) const OID_SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
pub(crate) const OID_SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

/// Encodes binary key material as 64-column-wrapped Base64 text.
pub(crate) fn to_base64_text(der: &[u8]) -> Result<String, ndn_types::error::CryptoError> {
    use crate::transform::{base64_encode, buffer_source, stream_sink};
    let mut out = Vec::new();
    buffer_source(der.to_vec())
        .pipe(base64_encode(true))
        .run(stream_sink(&mut out))
        .map_err(|e| ndn_types::error::CryptoError::Io(e.to_string()))?;
    String::from_utf8(out).map_err(|e| ndn_types::error::CryptoError::Io(e.to_string()))
}

/// Decodes Base64 text (whitespace tolerated) into binary key material.
pub(crate) fn from_base64_text(text: &[u8]) -> Result<Vec<u8>, ndn_types::error::CryptoError> {
    use crate::transform::{base64_decode, buffer_source, stream_sink, strip_space};
    let mut out = Vec::new();
    buffer_source(text.to_vec())
        .pipe(strip_space())
        .pipe(base64_decode())
        .run(stream_sink(&mut out))
        .map_err(|e| {
            ndn_types::error::CryptoError::InvalidKey(format!("invalid base64 key material: {e}"))
        })?;
    Ok(out)
}
