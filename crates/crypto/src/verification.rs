// Path: crates/crypto/src/verification.rs
//! Signing and verification over packet signed portions.
//!
//! These helpers connect the packet model to the key primitives: they
//! compute the signed range for the packet at hand and run it through the
//! transform pipeline. Verification returns plain `bool`; malformed
//! signatures or mismatched key material verify as `false`.

use crate::digest;
use crate::key::{PrivateKey, PublicKey};
use crate::transform::{bool_sink, buffer_source, verifier_filter, verifier_filter_hmac};
use ndn_api::crypto::{DigestAlgorithm, KeyType};
use ndn_types::error::CryptoError;
use ndn_types::tlv::number;
use ndn_types::{Block, Certificate, Data, Interest, SignatureType, SignedInterestFormat};

/// The signature type produced by a key of the given type.
pub fn signature_type_for_key(key_type: KeyType) -> Result<SignatureType, CryptoError> {
    match key_type {
        KeyType::Rsa => Ok(SignatureType::Sha256WithRsa),
        KeyType::Ec => Ok(SignatureType::Sha256WithEcdsa),
        KeyType::Hmac => Ok(SignatureType::HmacWithSha256),
        KeyType::None => Ok(SignatureType::DigestSha256),
    }
}

fn verify_bytes(key: &PublicKey, algorithm: DigestAlgorithm, data: &[u8], sig: &[u8]) -> bool {
    let mut ok = false;
    buffer_source(data.to_vec())
        .pipe(verifier_filter(algorithm, key, sig))
        .run(bool_sink(&mut ok))
        .is_ok()
        && ok
}

fn verify_bytes_hmac(key: &PrivateKey, algorithm: DigestAlgorithm, data: &[u8], sig: &[u8]) -> bool {
    let mut ok = false;
    buffer_source(data.to_vec())
        .pipe(verifier_filter_hmac(algorithm, key, sig))
        .run(bool_sink(&mut ok))
        .is_ok()
        && ok
}

/// Verifies a Data signature under a public key.
pub fn verify_data_signature(data: &Data, key: &PublicKey) -> bool {
    let Ok(portion) = data.signed_portion() else {
        return false;
    };
    verify_bytes(key, DigestAlgorithm::Sha256, &portion, data.signature_value())
}

/// Verifies a DigestSha256 Data packet.
pub fn verify_data_digest(data: &Data) -> bool {
    let Ok(portion) = data.signed_portion() else {
        return false;
    };
    digest::sha256(&portion).as_slice() == data.signature_value()
}

/// Verifies an HMAC-signed Data packet under the shared secret.
pub fn verify_data_with_hmac(data: &Data, key: &PrivateKey) -> bool {
    let Ok(portion) = data.signed_portion() else {
        return false;
    };
    verify_bytes_hmac(key, DigestAlgorithm::Sha256, &portion, data.signature_value())
}

/// Verifies a Data signature under the public key of `certificate`.
pub fn verify_data_with_certificate(data: &Data, certificate: &Certificate) -> bool {
    let Ok(key) = PublicKey::from_public_key_der(certificate.public_key()) else {
        return false;
    };
    verify_data_signature(data, &key)
}

/// Verifies a signed Interest under a public key.
pub fn verify_interest_signature(
    interest: &Interest,
    key: &PublicKey,
    format: SignedInterestFormat,
) -> bool {
    let Ok(portion) = interest.signed_portion(format) else {
        return false;
    };
    let sig_value = match format {
        SignedInterestFormat::V03 => match interest.signature_value() {
            Some(value) => value.to_vec(),
            None => return false,
        },
        SignedInterestFormat::V02 => match interest.v02_signature_value() {
            Ok(value) => value,
            Err(_) => return false,
        },
    };
    verify_bytes(key, DigestAlgorithm::Sha256, &portion, &sig_value)
}

/// Verifies a signed Interest under the public key of `certificate`.
pub fn verify_interest_with_certificate(
    interest: &Interest,
    certificate: &Certificate,
    format: SignedInterestFormat,
) -> bool {
    let Ok(key) = PublicKey::from_public_key_der(certificate.public_key()) else {
        return false;
    };
    verify_interest_signature(interest, &key, format)
}

/// Signs `data` in place over its signed portion.
///
/// The SignatureInfo must already be set; its signature type selects the
/// computation (DigestSha256 needs no key and ignores `key`).
pub fn sign_data(data: &mut Data, key: Option<&PrivateKey>) -> Result<(), CryptoError> {
    let info = data
        .signature_info()
        .ok_or_else(|| CryptoError::SignFailed("SignatureInfo is not set".into()))?;
    let sig_type = info.sig_type();
    let portion = data
        .signed_portion()
        .map_err(|e| CryptoError::SignFailed(e.to_string()))?;
    let value = compute_signature(sig_type, key, &portion)?;
    data.set_signature_value(value);
    Ok(())
}

/// Signs a v0.3 Interest in place; the InterestSignatureInfo must be set.
pub fn sign_interest_v03(interest: &mut Interest, key: Option<&PrivateKey>) -> Result<(), CryptoError> {
    let info = interest
        .signature_info()
        .ok_or_else(|| CryptoError::SignFailed("InterestSignatureInfo is not set".into()))?;
    let sig_type = info.sig_type();
    let portion = interest
        .signed_portion(SignedInterestFormat::V03)
        .map_err(|e| CryptoError::SignFailed(e.to_string()))?;
    let value = compute_signature(sig_type, key, &portion)?;
    interest.set_signature_value(value);
    Ok(())
}

/// Completes a v0.2 signed Interest: appends the SignatureInfo component,
/// signs all present components, and appends the SignatureValue component.
///
/// The caller has already appended the timestamp and nonce components.
pub fn append_v02_signature(
    interest: &mut Interest,
    sig_info: &ndn_types::SignatureInfo,
    key: Option<&PrivateKey>,
) -> Result<(), CryptoError> {
    let sig_type = sig_info.sig_type();
    let name = interest.name().clone().append(ndn_types::Component::generic(
        sig_info.to_block(number::SIGNATURE_INFO).encode(),
    ));
    interest.set_name(name);

    let portion: Vec<u8> = interest
        .name()
        .components()
        .iter()
        .flat_map(|c| c.to_block().encode())
        .collect();
    let value = compute_signature(sig_type, key, &portion)?;

    let name = interest.name().clone().append(ndn_types::Component::generic(
        Block::new(number::SIGNATURE_VALUE, value).encode(),
    ));
    interest.set_name(name);
    Ok(())
}

fn compute_signature(
    sig_type: SignatureType,
    key: Option<&PrivateKey>,
    portion: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    match sig_type {
        SignatureType::DigestSha256 => Ok(digest::sha256(portion).to_vec()),
        SignatureType::Sha256WithRsa
        | SignatureType::Sha256WithEcdsa
        | SignatureType::HmacWithSha256 => {
            let key = key.ok_or_else(|| {
                CryptoError::SignFailed(format!("{sig_type} requires a private key"))
            })?;
            key.sign(DigestAlgorithm::Sha256, portion)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{generate_private_key, KeyParams};
    use ndn_types::{KeyLocator, Name, SignatureInfo};

    fn unsigned_data() -> Data {
        let mut data = Data::new(Name::from_uri("/app/datum").unwrap());
        data.set_content(b"content".to_vec());
        data
    }

    #[test]
    fn sign_and_verify_data_ec() {
        let key = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let mut data = unsigned_data();
        data.set_signature_info(
            SignatureInfo::new(SignatureType::Sha256WithEcdsa)
                .with_key_locator(KeyLocator::Name(Name::from_uri("/app/KEY/1").unwrap())),
        );
        sign_data(&mut data, Some(&key)).unwrap();

        let public = key.derive_public_key().unwrap();
        assert!(verify_data_signature(&data, &public));

        data.set_content(b"tampered".to_vec());
        assert!(!verify_data_signature(&data, &public));
    }

    #[test]
    fn digest_sha256_data() {
        let mut data = unsigned_data();
        data.set_signature_info(SignatureInfo::new(SignatureType::DigestSha256));
        sign_data(&mut data, None).unwrap();
        assert!(verify_data_digest(&data));

        data.set_content(b"tampered".to_vec());
        assert!(!verify_data_digest(&data));
    }

    #[test]
    fn hmac_data_roundtrip() {
        let key = PrivateKey::from_raw(KeyType::Hmac, &[5u8; 32]).unwrap();
        let mut data = unsigned_data();
        data.set_signature_info(SignatureInfo::new(SignatureType::HmacWithSha256));
        sign_data(&mut data, Some(&key)).unwrap();
        assert!(verify_data_with_hmac(&data, &key));

        let other = PrivateKey::from_raw(KeyType::Hmac, &[6u8; 32]).unwrap();
        assert!(!verify_data_with_hmac(&data, &other));
    }

    #[test]
    fn sign_and_verify_interest_v03() {
        let key = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let mut interest = Interest::new(Name::from_uri("/app/cmd").unwrap());
        interest.set_signature_info(
            SignatureInfo::new(SignatureType::Sha256WithEcdsa)
                .with_key_locator(KeyLocator::Name(Name::from_uri("/app/KEY/1").unwrap())),
        );
        sign_interest_v03(&mut interest, Some(&key)).unwrap();

        let public = key.derive_public_key().unwrap();
        assert!(verify_interest_signature(
            &interest,
            &public,
            SignedInterestFormat::V03
        ));
    }

    #[test]
    fn sign_and_verify_interest_v02() {
        let key = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let mut interest = Interest::new(
            Name::from_uri("/app/cmd")
                .unwrap()
                .append(ndn_types::Component::number(1_000))
                .append(ndn_types::Component::generic(vec![0xAA; 8])),
        );
        let info = SignatureInfo::new(SignatureType::Sha256WithEcdsa)
            .with_key_locator(KeyLocator::Name(Name::from_uri("/app/KEY/1").unwrap()));
        append_v02_signature(&mut interest, &info, Some(&key)).unwrap();

        assert_eq!(
            interest.detect_signed_format(),
            Some(SignedInterestFormat::V02)
        );
        let public = key.derive_public_key().unwrap();
        assert!(verify_interest_signature(
            &interest,
            &public,
            SignedInterestFormat::V02
        ));
    }

    #[test]
    fn missing_key_is_an_error() {
        let mut data = unsigned_data();
        data.set_signature_info(SignatureInfo::new(SignatureType::Sha256WithEcdsa));
        assert!(sign_data(&mut data, None).is_err());
    }
}
