// Path: crates/types/src/certificate.rs
//! The NDN Certificate: a Data packet with an enforced naming convention.
//!
//! A certificate name follows `/<identity>/KEY/<keyId>/<issuerId>/<version>`.
//! The content is the subject's public key as SubjectPublicKeyInfo DER, the
//! ContentType is Key, and the SignatureInfo carries a ValidityPeriod.

use crate::data::Data;
use crate::error::{CertificateError, TlvError};
use crate::name::{Component, Name};
use crate::tlv::content_type;
use crate::validity_period::ValidityPeriod;
use chrono::{DateTime, Utc};

/// Offset of the version component, from the end of the name.
pub const VERSION_OFFSET: isize = -1;
/// Offset of the issuer-id component, from the end of the name.
pub const ISSUER_ID_OFFSET: isize = -2;
/// Offset of the key-id component, from the end of the name.
pub const KEY_ID_OFFSET: isize = -3;
/// Offset of the `KEY` literal component, from the end of the name.
pub const KEY_COMPONENT_OFFSET: isize = -4;
/// Minimum number of components in a certificate name.
pub const MIN_CERT_NAME_LENGTH: usize = 4;
/// Minimum number of components in a key name.
pub const MIN_KEY_NAME_LENGTH: usize = 2;

/// The literal `KEY` name component.
pub fn key_component() -> Component {
    Component::generic(b"KEY".to_vec())
}

/// The default issuer id used for self-signed certificates.
pub fn default_issuer_id() -> Component {
    Component::generic(b"NA".to_vec())
}

/// True when `name` follows the certificate naming convention.
pub fn is_valid_certificate_name(name: &Name) -> bool {
    name.len() >= MIN_CERT_NAME_LENGTH
        && name.get(KEY_COMPONENT_OFFSET) == Some(&key_component())
}

/// Extracts the identity prefix from a certificate name.
pub fn extract_identity_from_cert_name(name: &Name) -> Result<Name, CertificateError> {
    if !is_valid_certificate_name(name) {
        return Err(CertificateError::InvalidName(name.clone()));
    }
    Ok(name.get_prefix(KEY_COMPONENT_OFFSET))
}

/// Extracts the key name (identity + `KEY` + keyId) from a certificate name.
pub fn extract_key_name_from_cert_name(name: &Name) -> Result<Name, CertificateError> {
    if !is_valid_certificate_name(name) {
        return Err(CertificateError::InvalidName(name.clone()));
    }
    Ok(name.get_prefix(KEY_ID_OFFSET + 1))
}

/// A Data packet interpreted as a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    data: Data,
}

impl Certificate {
    /// Interprets a Data packet as a certificate, enforcing the naming
    /// convention, ContentType Key, a set FreshnessPeriod (zero accepted),
    /// non-empty content, and a present ValidityPeriod.
    pub fn from_data(data: Data) -> Result<Self, CertificateError> {
        if !is_valid_certificate_name(data.name()) {
            return Err(CertificateError::InvalidName(data.name().clone()));
        }
        if data.content_type() != content_type::KEY {
            return Err(CertificateError::InvalidContentType(data.content_type()));
        }
        if data.freshness_period().is_none() {
            return Err(CertificateError::MissingFreshnessPeriod);
        }
        if data.content().is_empty() {
            return Err(CertificateError::EmptyContent);
        }
        let has_validity = data
            .signature_info()
            .and_then(|info| info.validity_period())
            .is_some();
        if !has_validity {
            return Err(CertificateError::MissingValidityPeriod);
        }
        Ok(Self { data })
    }

    /// Decodes a certificate from a Data wire encoding.
    pub fn wire_decode(buf: &[u8]) -> Result<Self, CertificateError> {
        Self::from_data(Data::wire_decode(buf)?)
    }

    /// The full wire encoding.
    pub fn wire_encode(&self) -> Result<Vec<u8>, TlvError> {
        self.data.wire_encode()
    }

    /// The underlying Data packet.
    pub fn as_data(&self) -> &Data {
        &self.data
    }

    /// Consumes the certificate, returning the underlying Data.
    pub fn into_data(self) -> Data {
        self.data
    }

    /// The certificate name.
    pub fn name(&self) -> &Name {
        self.data.name()
    }

    /// The key name: identity + `KEY` + keyId.
    pub fn key_name(&self) -> Name {
        self.name().get_prefix(KEY_ID_OFFSET + 1)
    }

    /// The identity prefix.
    pub fn identity(&self) -> Name {
        self.name().get_prefix(KEY_COMPONENT_OFFSET)
    }

    /// The key-id component.
    pub fn key_id(&self) -> &Component {
        self.name().at(KEY_ID_OFFSET)
    }

    /// The issuer-id component.
    pub fn issuer_id(&self) -> &Component {
        self.name().at(ISSUER_ID_OFFSET)
    }

    /// The subject's public key: SubjectPublicKeyInfo DER bytes.
    pub fn public_key(&self) -> &[u8] {
        self.data.content()
    }

    /// The validity window.
    pub fn validity_period(&self) -> &ValidityPeriod {
        // Presence is enforced at construction.
        self.data
            .signature_info()
            .and_then(|info| info.validity_period())
            .expect("certificate construction enforces a ValidityPeriod")
    }

    /// True when `not_before ≤ now ≤ not_after`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.validity_period().is_valid(now)
    }

    /// A custom SignatureInfo extension by TLV type.
    pub fn extension(&self, tlv_type: u32) -> Result<&crate::tlv::Block, CertificateError> {
        self.data
            .signature_info()
            .and_then(|info| info.custom_tlv(tlv_type))
            .ok_or(CertificateError::ExtensionNotFound(tlv_type))
    }

    /// True when the key locator names this certificate's own key.
    pub fn is_self_signed(&self) -> bool {
        self.data
            .signature_info()
            .and_then(|info| info.key_locator())
            .and_then(|locator| locator.as_name())
            .is_some_and(|locator_name| {
                *locator_name == self.key_name() || *locator_name == *self.name()
            })
    }
}

impl TryFrom<Data> for Certificate {
    type Error = CertificateError;

    fn try_from(data: Data) -> Result<Self, Self::Error> {
        Self::from_data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature_info::{KeyLocator, SignatureInfo, SignatureType};
    use chrono::TimeZone;
    use std::time::Duration;

    fn sample_validity() -> ValidityPeriod {
        ValidityPeriod::new(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2040, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn sample_cert_data(name: &str) -> Data {
        let mut data = Data::new(Name::from_uri(name).unwrap());
        data.set_content_type(content_type::KEY)
            .set_freshness_period(Some(Duration::from_secs(3600)))
            .set_content(vec![0x30, 0x82, 0x01, 0x0A])
            .set_signature_info(
                SignatureInfo::new(SignatureType::Sha256WithEcdsa)
                    .with_key_locator(KeyLocator::Name(
                        Name::from_uri("/issuer/KEY/%01").unwrap(),
                    ))
                    .with_validity_period(sample_validity()),
            )
            .set_signature_value(vec![0x55; 32]);
        data
    }

    #[test]
    fn accepts_conventional_name() {
        let cert = Certificate::from_data(sample_cert_data("/acme/unit/KEY/%01/self/v=1")).unwrap();
        assert_eq!(cert.identity(), Name::from_uri("/acme/unit").unwrap());
        assert_eq!(
            cert.key_name(),
            Name::from_uri("/acme/unit/KEY/%01").unwrap()
        );
        assert_eq!(cert.issuer_id().value(), b"self");
    }

    #[test]
    fn rejects_unconventional_name() {
        assert!(matches!(
            Certificate::from_data(sample_cert_data("/acme/no-key-marker/v=1")),
            Err(CertificateError::InvalidName(_))
        ));
    }

    #[test]
    fn rejects_wrong_content_type() {
        let mut data = sample_cert_data("/acme/KEY/%01/self/v=1");
        data.set_content_type(content_type::BLOB);
        assert!(matches!(
            Certificate::from_data(data),
            Err(CertificateError::InvalidContentType(_))
        ));
    }

    #[test]
    fn rejects_missing_validity_period() {
        let mut data = sample_cert_data("/acme/KEY/%01/self/v=1");
        data.set_signature_info(SignatureInfo::new(SignatureType::Sha256WithEcdsa));
        assert!(matches!(
            Certificate::from_data(data),
            Err(CertificateError::MissingValidityPeriod)
        ));
    }

    #[test]
    fn zero_freshness_accepted_at_construction() {
        let mut data = sample_cert_data("/acme/KEY/%01/self/v=1");
        data.set_freshness_period(Some(Duration::ZERO));
        assert!(Certificate::from_data(data).is_ok());
    }

    #[test]
    fn wire_roundtrip() {
        let cert = Certificate::from_data(sample_cert_data("/acme/KEY/%01/self/v=1")).unwrap();
        let wire = cert.wire_encode().unwrap();
        assert_eq!(Certificate::wire_decode(&wire).unwrap(), cert);
    }

    #[test]
    fn key_name_extraction_matches_prefix() {
        let name = Name::from_uri("/acme/unit/KEY/%01/self/v=7").unwrap();
        assert_eq!(
            extract_key_name_from_cert_name(&name).unwrap(),
            name.get_prefix(-2)
        );
        assert_eq!(
            extract_identity_from_cert_name(&name).unwrap(),
            Name::from_uri("/acme/unit").unwrap()
        );
        assert!(extract_key_name_from_cert_name(&Name::from_uri("/too/short").unwrap()).is_err());
    }

    #[test]
    fn self_signed_detection() {
        let mut data = sample_cert_data("/acme/KEY/%01/self/v=1");
        data.set_signature_info(
            SignatureInfo::new(SignatureType::Sha256WithEcdsa)
                .with_key_locator(KeyLocator::Name(Name::from_uri("/acme/KEY/%01").unwrap()))
                .with_validity_period(sample_validity()),
        );
        let cert = Certificate::from_data(data).unwrap();
        assert!(cert.is_self_signed());
    }
}
