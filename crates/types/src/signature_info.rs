// Path: crates/types/src/signature_info.rs
//! SignatureInfo, KeyLocator, and signature-type assignments.

use crate::error::TlvError;
use crate::name::Name;
use crate::tlv::{number, Block};
use crate::validity_period::ValidityPeriod;
use chrono::{DateTime, TimeZone, Utc};

/// Assigned SignatureType values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SignatureType {
    /// Integrity-only SHA-256 digest, no key.
    DigestSha256 = 0,
    /// RSA (PKCS#1 v1.5) over a SHA-256 digest.
    Sha256WithRsa = 1,
    /// ECDSA over a SHA-256 digest.
    Sha256WithEcdsa = 3,
    /// HMAC-SHA-256.
    HmacWithSha256 = 4,
}

impl SignatureType {
    /// Decodes an assigned value.
    pub fn from_u64(n: u64) -> Result<Self, TlvError> {
        match n {
            0 => Ok(Self::DigestSha256),
            1 => Ok(Self::Sha256WithRsa),
            3 => Ok(Self::Sha256WithEcdsa),
            4 => Ok(Self::HmacWithSha256),
            other => Err(TlvError::InvalidValue(format!(
                "unknown SignatureType {other}"
            ))),
        }
    }
}

impl std::fmt::Display for SignatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DigestSha256 => "DigestSha256",
            Self::Sha256WithRsa => "SignatureSha256WithRsa",
            Self::Sha256WithEcdsa => "SignatureSha256WithEcdsa",
            Self::HmacWithSha256 => "SignatureHmacWithSha256",
        })
    }
}

/// Identifies the signing key: by name or by key digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLocator {
    /// The signer's key or certificate name.
    Name(Name),
    /// SHA-256 digest of the signer's public key.
    KeyDigest(Vec<u8>),
}

impl KeyLocator {
    /// Encodes as a KeyLocator TLV element.
    pub fn to_block(&self) -> Block {
        let mut value = Vec::new();
        match self {
            Self::Name(name) => name.to_block().encode_into(&mut value),
            Self::KeyDigest(digest) => {
                Block::new(number::KEY_DIGEST, digest.clone()).encode_into(&mut value)
            }
        }
        Block::new(number::KEY_LOCATOR, value)
    }

    /// Decodes from a KeyLocator TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        if block.tlv_type() != number::KEY_LOCATOR {
            return Err(TlvError::UnexpectedType {
                expected: number::KEY_LOCATOR,
                got: block.tlv_type(),
            });
        }
        let elements = block.elements()?;
        let inner = elements
            .first()
            .ok_or(TlvError::MissingElement(number::NAME))?;
        match inner.tlv_type() {
            number::NAME => Ok(Self::Name(Name::from_block(inner)?)),
            number::KEY_DIGEST => Ok(Self::KeyDigest(inner.value().to_vec())),
            other => Err(TlvError::UnrecognizedElement(other)),
        }
    }

    /// The locator name, when this is a Name locator.
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Self::Name(name) => Some(name),
            Self::KeyDigest(_) => None,
        }
    }
}

impl std::fmt::Display for KeyLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "Name={name}"),
            Self::KeyDigest(digest) => write!(f, "KeyDigest={}", hex::encode(digest)),
        }
    }
}

/// The SignatureInfo element of a Data packet or signed Interest.
///
/// Signed Interests (v0.3) may additionally carry SignatureTime,
/// SignatureSeqNum, and SignatureNonce. Sub-elements with TLV type ≥ 128
/// that this structure does not model are preserved verbatim, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    sig_type: SignatureType,
    key_locator: Option<KeyLocator>,
    time: Option<DateTime<Utc>>,
    seq_num: Option<u64>,
    nonce: Option<Vec<u8>>,
    validity_period: Option<ValidityPeriod>,
    custom_tlvs: Vec<Block>,
}

impl SignatureInfo {
    /// Creates a SignatureInfo of the given type with no optional fields.
    pub fn new(sig_type: SignatureType) -> Self {
        Self {
            sig_type,
            key_locator: None,
            time: None,
            seq_num: None,
            nonce: None,
            validity_period: None,
            custom_tlvs: Vec::new(),
        }
    }

    /// The signature type.
    pub fn sig_type(&self) -> SignatureType {
        self.sig_type
    }

    /// The key locator, if present.
    pub fn key_locator(&self) -> Option<&KeyLocator> {
        self.key_locator.as_ref()
    }

    /// Sets the key locator.
    pub fn set_key_locator(&mut self, locator: Option<KeyLocator>) -> &mut Self {
        self.key_locator = locator;
        self
    }

    /// Builder form of [`SignatureInfo::set_key_locator`].
    pub fn with_key_locator(mut self, locator: KeyLocator) -> Self {
        self.key_locator = Some(locator);
        self
    }

    /// SignatureTime, if present.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Sets SignatureTime (millisecond precision on the wire).
    pub fn set_time(&mut self, time: Option<DateTime<Utc>>) -> &mut Self {
        self.time = time;
        self
    }

    /// SignatureSeqNum, if present.
    pub fn seq_num(&self) -> Option<u64> {
        self.seq_num
    }

    /// Sets SignatureSeqNum.
    pub fn set_seq_num(&mut self, seq_num: Option<u64>) -> &mut Self {
        self.seq_num = seq_num;
        self
    }

    /// SignatureNonce, if present.
    pub fn nonce(&self) -> Option<&[u8]> {
        self.nonce.as_deref()
    }

    /// Sets SignatureNonce.
    pub fn set_nonce(&mut self, nonce: Option<Vec<u8>>) -> &mut Self {
        self.nonce = nonce;
        self
    }

    /// The ValidityPeriod, if present.
    pub fn validity_period(&self) -> Option<&ValidityPeriod> {
        self.validity_period.as_ref()
    }

    /// Sets the ValidityPeriod.
    pub fn set_validity_period(&mut self, period: Option<ValidityPeriod>) -> &mut Self {
        self.validity_period = period;
        self
    }

    /// Builder form of [`SignatureInfo::set_validity_period`].
    pub fn with_validity_period(mut self, period: ValidityPeriod) -> Self {
        self.validity_period = Some(period);
        self
    }

    /// Returns the first preserved sub-element of the given TLV type.
    pub fn custom_tlv(&self, tlv_type: u32) -> Option<&Block> {
        self.custom_tlvs.iter().find(|b| b.tlv_type() == tlv_type)
    }

    /// Adds or replaces a preserved sub-element (TLV type must be ≥ 128).
    pub fn set_custom_tlv(&mut self, block: Block) -> Result<(), TlvError> {
        if block.tlv_type() < 128 {
            return Err(TlvError::InvalidValue(
                "custom SignatureInfo sub-TLV type must be >= 128".into(),
            ));
        }
        if let Some(existing) = self
            .custom_tlvs
            .iter_mut()
            .find(|b| b.tlv_type() == block.tlv_type())
        {
            *existing = block;
        } else {
            self.custom_tlvs.push(block);
        }
        Ok(())
    }

    /// Encodes with the given container type: SignatureInfo (22) for Data
    /// packets, InterestSignatureInfo (44) for signed Interests.
    pub fn to_block(&self, container_type: u32) -> Block {
        let mut value = Vec::new();
        Block::from_non_negative_integer(number::SIGNATURE_TYPE, self.sig_type as u64)
            .encode_into(&mut value);
        if let Some(locator) = &self.key_locator {
            locator.to_block().encode_into(&mut value);
        }
        if let Some(nonce) = &self.nonce {
            Block::new(number::SIGNATURE_NONCE, nonce.clone()).encode_into(&mut value);
        }
        if let Some(time) = self.time {
            Block::from_non_negative_integer(
                number::SIGNATURE_TIME,
                time.timestamp_millis().max(0) as u64,
            )
            .encode_into(&mut value);
        }
        if let Some(seq_num) = self.seq_num {
            Block::from_non_negative_integer(number::SIGNATURE_SEQ_NUM, seq_num)
                .encode_into(&mut value);
        }
        if let Some(period) = &self.validity_period {
            period.to_block().encode_into(&mut value);
        }
        for custom in &self.custom_tlvs {
            custom.encode_into(&mut value);
        }
        Block::new(container_type, value)
    }

    /// Decodes from a SignatureInfo or InterestSignatureInfo element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        if block.tlv_type() != number::SIGNATURE_INFO
            && block.tlv_type() != number::INTEREST_SIGNATURE_INFO
        {
            return Err(TlvError::UnexpectedType {
                expected: number::SIGNATURE_INFO,
                got: block.tlv_type(),
            });
        }
        let mut sig_type = None;
        let mut info = Self::new(SignatureType::DigestSha256);
        for element in block.elements()? {
            match element.tlv_type() {
                number::SIGNATURE_TYPE => {
                    sig_type = Some(SignatureType::from_u64(element.to_non_negative_integer()?)?);
                }
                number::KEY_LOCATOR => {
                    info.key_locator = Some(KeyLocator::from_block(&element)?);
                }
                number::SIGNATURE_NONCE => {
                    info.nonce = Some(element.value().to_vec());
                }
                number::SIGNATURE_TIME => {
                    let millis = element.to_non_negative_integer()?;
                    let time = Utc
                        .timestamp_millis_opt(millis as i64)
                        .single()
                        .ok_or_else(|| {
                            TlvError::InvalidValue(format!("SignatureTime {millis} out of range"))
                        })?;
                    info.time = Some(time);
                }
                number::SIGNATURE_SEQ_NUM => {
                    info.seq_num = Some(element.to_non_negative_integer()?);
                }
                number::VALIDITY_PERIOD => {
                    info.validity_period = Some(ValidityPeriod::from_block(&element)?);
                }
                other if other >= 128 => info.custom_tlvs.push(element),
                other => return Err(TlvError::UnrecognizedElement(other)),
            }
        }
        info.sig_type = sig_type.ok_or(TlvError::MissingElement(number::SIGNATURE_TYPE))?;
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn roundtrip_with_all_fields() {
        let mut info = SignatureInfo::new(SignatureType::Sha256WithEcdsa)
            .with_key_locator(KeyLocator::Name(Name::from_uri("/id/KEY/1").unwrap()));
        info.set_time(Some(Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap()));
        info.set_seq_num(Some(7));
        info.set_nonce(Some(vec![1, 2, 3, 4, 5, 6, 7, 8]));
        info.set_custom_tlv(Block::new(200, b"opaque".to_vec())).unwrap();

        let block = info.to_block(number::INTEREST_SIGNATURE_INFO);
        let decoded = SignatureInfo::from_block(&block).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn custom_tlvs_preserved_in_order() {
        let mut info = SignatureInfo::new(SignatureType::Sha256WithRsa);
        info.set_custom_tlv(Block::new(300, b"a".to_vec())).unwrap();
        info.set_custom_tlv(Block::new(130, b"b".to_vec())).unwrap();

        let decoded =
            SignatureInfo::from_block(&info.to_block(number::SIGNATURE_INFO)).unwrap();
        let types: Vec<u32> = decoded
            .custom_tlvs
            .iter()
            .map(|b| b.tlv_type())
            .collect();
        assert_eq!(types, vec![300, 130]);
    }

    #[test]
    fn rejects_low_custom_type() {
        let mut info = SignatureInfo::new(SignatureType::DigestSha256);
        assert!(info.set_custom_tlv(Block::new(99, Vec::new())).is_err());
    }

    #[test]
    fn rejects_missing_signature_type() {
        let block = Block::new(number::SIGNATURE_INFO, Vec::new());
        assert!(matches!(
            SignatureInfo::from_block(&block),
            Err(TlvError::MissingElement(_))
        ));
    }
}
