// Path: crates/crypto/src/key/public.rs
//! The public key: SubjectPublicKeyInfo-backed RSA or EC material.

use super::{
    from_base64_text, to_base64_text, OID_EC_PUBLIC_KEY, OID_RSA_ENCRYPTION, OID_SECP224R1,
    OID_SECP256R1, OID_SECP384R1, OID_SECP521R1,
};
use crate::digest;
use der::Decode;
use ndn_api::crypto::{DigestAlgorithm, KeyType};
use ndn_types::error::CryptoError;
use rand::rngs::OsRng;
use rsa::{Oaep, RsaPublicKey};
use signature::hazmat::PrehashVerifier;
use signature::Verifier;
use spki::{DecodePublicKey, SubjectPublicKeyInfoRef};

#[derive(Clone)]
enum EcPublic {
    P224(p224::PublicKey),
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

#[derive(Clone)]
enum PublicMaterial {
    Rsa(RsaPublicKey),
    Ec(EcPublic),
}

/// A public key loaded from SubjectPublicKeyInfo DER.
#[derive(Clone)]
pub struct PublicKey {
    material: PublicMaterial,
}

fn invalid<E: std::fmt::Display>(e: E) -> CryptoError {
    CryptoError::InvalidKey(e.to_string())
}

impl PublicKey {
    /// Loads from SubjectPublicKeyInfo DER.
    pub fn from_public_key_der(der: &[u8]) -> Result<Self, CryptoError> {
        let info = SubjectPublicKeyInfoRef::from_der(der).map_err(invalid)?;
        let material = match info.algorithm.oid {
            OID_RSA_ENCRYPTION => {
                PublicMaterial::Rsa(RsaPublicKey::from_public_key_der(der).map_err(invalid)?)
            }
            OID_EC_PUBLIC_KEY => {
                let curve = info.algorithm.parameters_oid().map_err(invalid)?;
                PublicMaterial::Ec(match curve {
                    OID_SECP224R1 => {
                        EcPublic::P224(p224::PublicKey::from_public_key_der(der).map_err(invalid)?)
                    }
                    OID_SECP256R1 => {
                        EcPublic::P256(p256::PublicKey::from_public_key_der(der).map_err(invalid)?)
                    }
                    OID_SECP384R1 => {
                        EcPublic::P384(p384::PublicKey::from_public_key_der(der).map_err(invalid)?)
                    }
                    OID_SECP521R1 => {
                        EcPublic::P521(p521::PublicKey::from_public_key_der(der).map_err(invalid)?)
                    }
                    other => {
                        return Err(CryptoError::InvalidKey(format!(
                            "unsupported EC curve OID {other}"
                        )))
                    }
                })
            }
            other => {
                return Err(CryptoError::InvalidKey(format!(
                    "unsupported public key algorithm OID {other}"
                )))
            }
        };
        Ok(Self { material })
    }

    /// Loads from Base64-wrapped SubjectPublicKeyInfo DER.
    pub fn from_public_key_base64(text: &[u8]) -> Result<Self, CryptoError> {
        Self::from_public_key_der(&from_base64_text(text)?)
    }

    /// Loads an RSA key from PKCS#1 (RSAPublicKey) DER.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self, CryptoError> {
        use rsa::pkcs1::DecodeRsaPublicKey;
        let key = RsaPublicKey::from_pkcs1_der(der).map_err(invalid)?;
        Ok(Self {
            material: PublicMaterial::Rsa(key),
        })
    }

    /// Saves as PKCS#1 (RSAPublicKey) DER; RSA only.
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>, CryptoError> {
        use rsa::pkcs1::EncodeRsaPublicKey;
        match &self.material {
            PublicMaterial::Rsa(key) => Ok(key.to_pkcs1_der().map_err(invalid)?.into_vec()),
            PublicMaterial::Ec(_) => Err(CryptoError::UnsupportedOperation {
                key_type: "EC",
                operation: "savePkcs1",
            }),
        }
    }

    /// Saves as SubjectPublicKeyInfo DER.
    pub fn to_public_key_der(&self) -> Result<Vec<u8>, CryptoError> {
        use spki::EncodePublicKey;
        let document = match &self.material {
            PublicMaterial::Rsa(key) => key.to_public_key_der().map_err(invalid)?,
            PublicMaterial::Ec(EcPublic::P224(key)) => key.to_public_key_der().map_err(invalid)?,
            PublicMaterial::Ec(EcPublic::P256(key)) => key.to_public_key_der().map_err(invalid)?,
            PublicMaterial::Ec(EcPublic::P384(key)) => key.to_public_key_der().map_err(invalid)?,
            PublicMaterial::Ec(EcPublic::P521(key)) => key.to_public_key_der().map_err(invalid)?,
        };
        Ok(document.as_bytes().to_vec())
    }

    /// Saves as Base64-wrapped SubjectPublicKeyInfo DER.
    pub fn to_public_key_base64(&self) -> Result<String, CryptoError> {
        to_base64_text(&self.to_public_key_der()?)
    }

    /// The kind of material held.
    pub fn key_type(&self) -> KeyType {
        match &self.material {
            PublicMaterial::Rsa(_) => KeyType::Rsa,
            PublicMaterial::Ec(_) => KeyType::Ec,
        }
    }

    /// Key size in bits: modulus bits for RSA, curve bits for EC.
    pub fn key_size(&self) -> usize {
        use rsa::traits::PublicKeyParts;
        match &self.material {
            PublicMaterial::Rsa(key) => key.n().bits(),
            PublicMaterial::Ec(EcPublic::P224(_)) => 224,
            PublicMaterial::Ec(EcPublic::P256(_)) => 256,
            PublicMaterial::Ec(EcPublic::P384(_)) => 384,
            PublicMaterial::Ec(EcPublic::P521(_)) => 521,
        }
    }

    /// Encrypts with RSA-OAEP; RSA only.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.material {
            PublicMaterial::Rsa(key) => key
                .encrypt(&mut OsRng, Oaep::new::<sha2::Sha256>(), plaintext)
                .map_err(|e| CryptoError::CipherFailed(e.to_string())),
            PublicMaterial::Ec(_) => Err(CryptoError::UnsupportedOperation {
                key_type: "EC",
                operation: "encrypt",
            }),
        }
    }

    /// Verifies `signature` over `data` (DER signature for ECDSA).
    pub fn verify(
        &self,
        algorithm: DigestAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        match &self.material {
            PublicMaterial::Rsa(key) => verify_rsa(key, algorithm, data, signature),
            PublicMaterial::Ec(key) => Ok(verify_ec(key, algorithm, data, signature)),
        }
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("key_type", &self.key_type())
            .field("key_size", &self.key_size())
            .finish_non_exhaustive()
    }
}

fn verify_rsa(
    key: &RsaPublicKey,
    algorithm: DigestAlgorithm,
    data: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    let Ok(signature) = Signature::try_from(signature) else {
        return Ok(false);
    };
    match algorithm {
        DigestAlgorithm::Sha256 => {
            let verifier = VerifyingKey::<sha2::Sha256>::new(key.clone());
            Ok(verifier.verify(data, &signature).is_ok())
        }
        DigestAlgorithm::Sha384 => {
            let verifier = VerifyingKey::<sha2::Sha384>::new(key.clone());
            Ok(verifier.verify(data, &signature).is_ok())
        }
        DigestAlgorithm::Sha512 => {
            let verifier = VerifyingKey::<sha2::Sha512>::new(key.clone());
            Ok(verifier.verify(data, &signature).is_ok())
        }
        other => Err(CryptoError::UnsupportedAlgorithm(format!(
            "RSA verification over {other} is not supported"
        ))),
    }
}

fn verify_ec(key: &EcPublic, algorithm: DigestAlgorithm, data: &[u8], signature: &[u8]) -> bool {
    let prehash = digest::compute(algorithm, data);
    match key {
        EcPublic::P224(public) => {
            let Ok(signature) = p224::ecdsa::Signature::from_der(signature) else {
                return false;
            };
            p224::ecdsa::VerifyingKey::from(public)
                .verify_prehash(&prehash, &signature)
                .is_ok()
        }
        EcPublic::P256(public) => {
            let Ok(signature) = p256::ecdsa::Signature::from_der(signature) else {
                return false;
            };
            p256::ecdsa::VerifyingKey::from(public)
                .verify_prehash(&prehash, &signature)
                .is_ok()
        }
        EcPublic::P384(public) => {
            let Ok(signature) = p384::ecdsa::Signature::from_der(signature) else {
                return false;
            };
            p384::ecdsa::VerifyingKey::from(public)
                .verify_prehash(&prehash, &signature)
                .is_ok()
        }
        EcPublic::P521(public) => {
            let Ok(signature) = p521::ecdsa::Signature::from_der(signature) else {
                return false;
            };
            p521::ecdsa::VerifyingKey::from(ecdsa::VerifyingKey::<p521::NistP521>::from(public))
                .verify_prehash(&prehash, &signature)
                .is_ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{generate_private_key, KeyParams};

    #[test]
    fn sign_verify_ec_roundtrip() {
        let private = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let public = private.derive_public_key().unwrap();
        let message = b"sign me";

        let signature = private.sign(DigestAlgorithm::Sha256, message).unwrap();
        assert!(public
            .verify(DigestAlgorithm::Sha256, message, &signature)
            .unwrap());
        assert!(!public
            .verify(DigestAlgorithm::Sha256, b"tampered", &signature)
            .unwrap());
        assert!(!public
            .verify(DigestAlgorithm::Sha256, message, &[0u8; 16])
            .unwrap());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let signer = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let other = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let signature = signer.sign(DigestAlgorithm::Sha256, b"msg").unwrap();
        assert!(!other
            .derive_public_key()
            .unwrap()
            .verify(DigestAlgorithm::Sha256, b"msg", &signature)
            .unwrap());
    }

    #[test]
    fn spki_roundtrip() {
        let private = generate_private_key(&KeyParams::Ec { bits: 384 }).unwrap();
        let public = private.derive_public_key().unwrap();
        let der = public.to_public_key_der().unwrap();
        let reloaded = PublicKey::from_public_key_der(&der).unwrap();
        assert_eq!(reloaded.key_type(), KeyType::Ec);
        assert_eq!(reloaded.key_size(), 384);
        assert_eq!(reloaded.to_public_key_der().unwrap(), der);
    }

    #[test]
    fn base64_load_tolerates_whitespace() {
        let private = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let public = private.derive_public_key().unwrap();
        let text = public.to_public_key_base64().unwrap();
        let loaded = PublicKey::from_public_key_base64(text.as_bytes()).unwrap();
        assert_eq!(
            loaded.to_public_key_der().unwrap(),
            public.to_public_key_der().unwrap()
        );
    }
}
