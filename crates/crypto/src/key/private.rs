// Path: crates/crypto/src/key/private.rs
//! The private key: RSA, EC (named curve), or HMAC material.

use super::public::PublicKey;
use super::{
    from_base64_text, to_base64_text, KeyParams, OID_EC_PUBLIC_KEY, OID_RSA_ENCRYPTION,
    OID_SECP224R1, OID_SECP256R1, OID_SECP384R1, OID_SECP521R1,
};
use crate::digest;
use crate::transform::hmac_filter::compute_hmac;
use der::Decode;
use ndn_api::crypto::{DigestAlgorithm, KeyType};
use ndn_types::error::CryptoError;
use pkcs8::{DecodePrivateKey, EncodePrivateKey, EncryptedPrivateKeyInfo, PrivateKeyInfo};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey};
use signature::hazmat::PrehashSigner;
use signature::{SignatureEncoding, Signer};
use zeroize::Zeroizing;

const PBKDF2_ITERATIONS: u32 = 100_000;

#[derive(Clone)]
pub(crate) enum EcPrivate {
    P224(p224::SecretKey),
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl EcPrivate {
    fn curve_bits(&self) -> usize {
        match self {
            Self::P224(_) => 224,
            Self::P256(_) => 256,
            Self::P384(_) => 384,
            Self::P521(_) => 521,
        }
    }
}

#[derive(Clone)]
enum KeyMaterial {
    Rsa(Box<RsaPrivateKey>),
    Ec(EcPrivate),
    // Raw HMAC bytes are scrubbed on drop; RSA/EC material is zeroized
    // by its own crate.
    Hmac(Zeroizing<Vec<u8>>),
}

/// A private key holding RSA, EC, or HMAC material.
#[derive(Clone)]
pub struct PrivateKey {
    material: KeyMaterial,
}

fn invalid<E: std::fmt::Display>(e: E) -> CryptoError {
    CryptoError::InvalidKey(e.to_string())
}

impl PrivateKey {
    /// Loads an RSA key from PKCS#1 DER.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self, CryptoError> {
        let key = RsaPrivateKey::from_pkcs1_der(der).map_err(invalid)?;
        Ok(Self {
            material: KeyMaterial::Rsa(Box::new(key)),
        })
    }

    /// Loads an RSA key from Base64-wrapped PKCS#1 DER.
    pub fn from_pkcs1_base64(text: &[u8]) -> Result<Self, CryptoError> {
        Self::from_pkcs1_der(&from_base64_text(text)?)
    }

    /// Loads an RSA or EC key from unencrypted PKCS#8 DER.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CryptoError> {
        let info = PrivateKeyInfo::from_der(der).map_err(invalid)?;
        match info.algorithm.oid {
            OID_RSA_ENCRYPTION => {
                let key = RsaPrivateKey::from_pkcs8_der(der).map_err(invalid)?;
                Ok(Self {
                    material: KeyMaterial::Rsa(Box::new(key)),
                })
            }
            OID_EC_PUBLIC_KEY => {
                let curve = info.algorithm.parameters_oid().map_err(invalid)?;
                let material = match curve {
                    OID_SECP224R1 => {
                        EcPrivate::P224(p224::SecretKey::from_pkcs8_der(der).map_err(invalid)?)
                    }
                    OID_SECP256R1 => {
                        EcPrivate::P256(p256::SecretKey::from_pkcs8_der(der).map_err(invalid)?)
                    }
                    OID_SECP384R1 => {
                        EcPrivate::P384(p384::SecretKey::from_pkcs8_der(der).map_err(invalid)?)
                    }
                    OID_SECP521R1 => {
                        EcPrivate::P521(p521::SecretKey::from_pkcs8_der(der).map_err(invalid)?)
                    }
                    other => {
                        return Err(CryptoError::InvalidKey(format!(
                            "unsupported EC curve OID {other}"
                        )))
                    }
                };
                Ok(Self {
                    material: KeyMaterial::Ec(material),
                })
            }
            other => Err(CryptoError::InvalidKey(format!(
                "unsupported PKCS#8 algorithm OID {other}"
            ))),
        }
    }

    /// Loads an RSA or EC key from Base64-wrapped unencrypted PKCS#8 DER.
    pub fn from_pkcs8_base64(text: &[u8]) -> Result<Self, CryptoError> {
        Self::from_pkcs8_der(&from_base64_text(text)?)
    }

    /// Loads a key from password-encrypted PKCS#8 DER.
    pub fn from_encrypted_pkcs8_der(der: &[u8], password: &[u8]) -> Result<Self, CryptoError> {
        let encrypted = EncryptedPrivateKeyInfo::from_der(der).map_err(invalid)?;
        let document = encrypted
            .decrypt(password)
            .map_err(|_| CryptoError::BadPassword)?;
        Self::from_pkcs8_der(document.as_bytes())
    }

    /// Loads a key from password-encrypted PKCS#8 DER, obtaining the
    /// passphrase from `password_fn`.
    pub fn from_encrypted_pkcs8_der_with(
        der: &[u8],
        password_fn: impl FnOnce() -> Vec<u8>,
    ) -> Result<Self, CryptoError> {
        Self::from_encrypted_pkcs8_der(der, &password_fn())
    }

    /// Wraps raw key bytes; only HMAC keys have a raw form.
    pub fn from_raw(key_type: KeyType, bytes: &[u8]) -> Result<Self, CryptoError> {
        match key_type {
            KeyType::Hmac => {
                if bytes.is_empty() {
                    return Err(CryptoError::InvalidKey("empty HMAC key".into()));
                }
                Ok(Self {
                    material: KeyMaterial::Hmac(Zeroizing::new(bytes.to_vec())),
                })
            }
            other => Err(CryptoError::UnsupportedOperation {
                key_type: key_type_name(other),
                operation: "loadRaw",
            }),
        }
    }

    /// The kind of material held.
    pub fn key_type(&self) -> KeyType {
        match &self.material {
            KeyMaterial::Rsa(_) => KeyType::Rsa,
            KeyMaterial::Ec(_) => KeyType::Ec,
            KeyMaterial::Hmac(_) => KeyType::Hmac,
        }
    }

    /// Key size in bits: modulus bits for RSA, curve bits for EC, key bits
    /// for HMAC.
    pub fn key_size(&self) -> usize {
        match &self.material {
            KeyMaterial::Rsa(key) => key.n().bits(),
            KeyMaterial::Ec(key) => key.curve_bits(),
            KeyMaterial::Hmac(key) => key.len() * 8,
        }
    }

    /// Saves as PKCS#1 DER; RSA only.
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>, CryptoError> {
        match &self.material {
            KeyMaterial::Rsa(key) => Ok(key.to_pkcs1_der().map_err(invalid)?.as_bytes().to_vec()),
            _ => Err(self.unsupported("savePkcs1")),
        }
    }

    /// Saves as Base64-wrapped PKCS#1 DER; RSA only.
    pub fn to_pkcs1_base64(&self) -> Result<String, CryptoError> {
        to_base64_text(&self.to_pkcs1_der()?)
    }

    /// Saves as unencrypted PKCS#8 DER; RSA and EC only.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(self.to_pkcs8_document()?.as_bytes().to_vec())
    }

    /// Saves as Base64-wrapped unencrypted PKCS#8 DER.
    pub fn to_pkcs8_base64(&self) -> Result<String, CryptoError> {
        to_base64_text(&self.to_pkcs8_der()?)
    }

    /// Saves as password-encrypted PKCS#8 DER, using PBKDF2-SHA256 with
    /// AES-256-CBC.
    pub fn to_encrypted_pkcs8_der(&self, password: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let document = self.to_pkcs8_document()?;
        let mut salt = [0u8; 16];
        let mut iv = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);
        let parameters =
            pkcs8::pkcs5::pbes2::Parameters::pbkdf2_sha256_aes256cbc(PBKDF2_ITERATIONS, &salt, &iv)
                .map_err(|e| CryptoError::CipherFailed(e.to_string()))?;
        let info: pkcs8::PrivateKeyInfo = document.decode_msg().map_err(invalid)?;
        let encrypted = info
            .encrypt_with_params(parameters, password)
            .map_err(|e| CryptoError::CipherFailed(e.to_string()))?;
        Ok(encrypted.as_bytes().to_vec())
    }

    /// Saves as Base64-wrapped password-encrypted PKCS#8 DER.
    pub fn to_encrypted_pkcs8_base64(&self, password: &[u8]) -> Result<String, CryptoError> {
        to_base64_text(&self.to_encrypted_pkcs8_der(password)?)
    }

    fn to_pkcs8_document(&self) -> Result<pkcs8::SecretDocument, CryptoError> {
        match &self.material {
            KeyMaterial::Rsa(key) => key.to_pkcs8_der().map_err(invalid),
            KeyMaterial::Ec(EcPrivate::P224(key)) => key.to_pkcs8_der().map_err(invalid),
            KeyMaterial::Ec(EcPrivate::P256(key)) => key.to_pkcs8_der().map_err(invalid),
            KeyMaterial::Ec(EcPrivate::P384(key)) => key.to_pkcs8_der().map_err(invalid),
            KeyMaterial::Ec(EcPrivate::P521(key)) => key.to_pkcs8_der().map_err(invalid),
            KeyMaterial::Hmac(_) => Err(self.unsupported("savePkcs8")),
        }
    }

    /// Derives the public key as SubjectPublicKeyInfo DER; RSA and EC only.
    pub fn derive_public_key(&self) -> Result<PublicKey, CryptoError> {
        PublicKey::from_public_key_der(&self.public_key_der()?)
    }

    /// The SubjectPublicKeyInfo DER of the corresponding public key.
    pub fn public_key_der(&self) -> Result<Vec<u8>, CryptoError> {
        use spki::EncodePublicKey;
        let document = match &self.material {
            KeyMaterial::Rsa(key) => rsa::RsaPublicKey::from(key.as_ref())
                .to_public_key_der()
                .map_err(invalid)?,
            KeyMaterial::Ec(EcPrivate::P224(key)) => {
                key.public_key().to_public_key_der().map_err(invalid)?
            }
            KeyMaterial::Ec(EcPrivate::P256(key)) => {
                key.public_key().to_public_key_der().map_err(invalid)?
            }
            KeyMaterial::Ec(EcPrivate::P384(key)) => {
                key.public_key().to_public_key_der().map_err(invalid)?
            }
            KeyMaterial::Ec(EcPrivate::P521(key)) => {
                key.public_key().to_public_key_der().map_err(invalid)?
            }
            KeyMaterial::Hmac(_) => return Err(self.unsupported("derivePublicKey")),
        };
        Ok(document.as_bytes().to_vec())
    }

    /// Decrypts RSA-OAEP ciphertext; RSA only.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.material {
            KeyMaterial::Rsa(key) => key
                .decrypt(Oaep::new::<sha2::Sha256>(), ciphertext)
                .map_err(|e| CryptoError::CipherFailed(e.to_string())),
            _ => Err(self.unsupported("decrypt")),
        }
    }

    /// Signs `data`, returning the raw signature bytes (DER for ECDSA).
    pub fn sign(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.material {
            KeyMaterial::Rsa(key) => sign_rsa(key, algorithm, data),
            KeyMaterial::Ec(key) => sign_ec(key, algorithm, data),
            KeyMaterial::Hmac(key) => compute_hmac(algorithm, key, data),
        }
    }

    /// Digest of the raw key material; HMAC only.
    pub fn key_digest(&self, algorithm: DigestAlgorithm) -> Result<Vec<u8>, CryptoError> {
        match &self.material {
            KeyMaterial::Hmac(key) => Ok(digest::compute(algorithm, key)),
            _ => Err(self.unsupported("getKeyDigest")),
        }
    }

    /// The raw key bytes; HMAC only.
    pub fn raw_key(&self) -> Result<&[u8], CryptoError> {
        match &self.material {
            KeyMaterial::Hmac(key) => Ok(key),
            _ => Err(self.unsupported("raw key access")),
        }
    }

    fn unsupported(&self, operation: &'static str) -> CryptoError {
        CryptoError::UnsupportedOperation {
            key_type: key_type_name(self.key_type()),
            operation,
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_type", &self.key_type())
            .field("key_size", &self.key_size())
            .finish_non_exhaustive()
    }
}

fn key_type_name(key_type: KeyType) -> &'static str {
    match key_type {
        KeyType::Rsa => "RSA",
        KeyType::Ec => "EC",
        KeyType::Hmac => "HMAC",
        KeyType::None => "NONE",
    }
}

fn sign_rsa(
    key: &RsaPrivateKey,
    algorithm: DigestAlgorithm,
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    use rsa::pkcs1v15::SigningKey;
    let failed = |e: signature::Error| CryptoError::SignFailed(e.to_string());
    match algorithm {
        DigestAlgorithm::Sha256 => {
            let signer = SigningKey::<sha2::Sha256>::new(key.clone());
            Ok(signer.try_sign(data).map_err(failed)?.to_vec())
        }
        DigestAlgorithm::Sha384 => {
            let signer = SigningKey::<sha2::Sha384>::new(key.clone());
            Ok(signer.try_sign(data).map_err(failed)?.to_vec())
        }
        DigestAlgorithm::Sha512 => {
            let signer = SigningKey::<sha2::Sha512>::new(key.clone());
            Ok(signer.try_sign(data).map_err(failed)?.to_vec())
        }
        other => Err(CryptoError::UnsupportedAlgorithm(format!(
            "RSA signing over {other} is not supported"
        ))),
    }
}

fn sign_ec(key: &EcPrivate, algorithm: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let prehash = digest::compute(algorithm, data);
    let failed = |e: signature::Error| CryptoError::SignFailed(e.to_string());
    match key {
        EcPrivate::P224(secret) => {
            let signer = p224::ecdsa::SigningKey::from(secret);
            let signature: p224::ecdsa::Signature =
                signer.sign_prehash(&prehash).map_err(failed)?;
            Ok(signature.to_der().to_vec())
        }
        EcPrivate::P256(secret) => {
            let signer = p256::ecdsa::SigningKey::from(secret);
            let signature: p256::ecdsa::Signature =
                signer.sign_prehash(&prehash).map_err(failed)?;
            Ok(signature.to_der().to_vec())
        }
        EcPrivate::P384(secret) => {
            let signer = p384::ecdsa::SigningKey::from(secret);
            let signature: p384::ecdsa::Signature =
                signer.sign_prehash(&prehash).map_err(failed)?;
            Ok(signature.to_der().to_vec())
        }
        EcPrivate::P521(secret) => {
            let signer =
                p521::ecdsa::SigningKey::from(ecdsa::SigningKey::<p521::NistP521>::from(secret));
            let signature: p521::ecdsa::Signature =
                signer.sign_prehash(&prehash).map_err(failed)?;
            Ok(signature.to_der().to_vec())
        }
    }
}

/// Generates a fresh private key; parameters are validated first.
pub fn generate_private_key(params: &KeyParams) -> Result<PrivateKey, CryptoError> {
    params.validate()?;
    let material = match *params {
        KeyParams::Rsa { bits } => {
            let key = RsaPrivateKey::new(&mut OsRng, bits)
                .map_err(|e| CryptoError::SignFailed(format!("RSA generation failed: {e}")))?;
            KeyMaterial::Rsa(Box::new(key))
        }
        KeyParams::Ec { bits } => KeyMaterial::Ec(match bits {
            224 => EcPrivate::P224(p224::SecretKey::random(&mut OsRng)),
            256 => EcPrivate::P256(p256::SecretKey::random(&mut OsRng)),
            384 => EcPrivate::P384(p384::SecretKey::random(&mut OsRng)),
            // validate() restricts to the four named curves
            _ => EcPrivate::P521(p521::SecretKey::random(&mut OsRng)),
        }),
        KeyParams::Hmac { bits } => {
            let mut key = Zeroizing::new(vec![0u8; bits / 8]);
            OsRng.fill_bytes(&mut key);
            KeyMaterial::Hmac(key)
        }
    };
    Ok(PrivateKey { material })
}
