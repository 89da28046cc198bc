// Path: crates/types/src/data.rs
//! The Data packet.

use crate::error::TlvError;
use crate::name::{Component, Name};
use crate::signature_info::SignatureInfo;
use crate::tlv::{self, content_type, number, Block};
use std::time::Duration;

/// A Data packet: Name, MetaInfo, Content, and signature.
///
/// The signed portion is the concatenation of the Name, MetaInfo, Content,
/// and SignatureInfo TLVs, exactly as they appear in the wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    name: Name,
    content_type: u32,
    freshness_period: Option<Duration>,
    final_block_id: Option<Component>,
    content: Vec<u8>,
    sig_info: Option<SignatureInfo>,
    sig_value: Vec<u8>,
}

impl Data {
    /// Creates an unsigned Data packet with the given name.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            content_type: content_type::BLOB,
            freshness_period: None,
            final_block_id: None,
            content: Vec::new(),
            sig_info: None,
            sig_value: Vec::new(),
        }
    }

    /// The packet name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Replaces the packet name.
    pub fn set_name(&mut self, name: Name) -> &mut Self {
        self.name = name;
        self
    }

    /// The ContentType (default Blob).
    pub fn content_type(&self) -> u32 {
        self.content_type
    }

    /// Sets the ContentType.
    pub fn set_content_type(&mut self, content_type: u32) -> &mut Self {
        self.content_type = content_type;
        self
    }

    /// The FreshnessPeriod; `None` when not set.
    pub fn freshness_period(&self) -> Option<Duration> {
        self.freshness_period
    }

    /// Sets the FreshnessPeriod.
    pub fn set_freshness_period(&mut self, period: Option<Duration>) -> &mut Self {
        self.freshness_period = period;
        self
    }

    /// The FinalBlockId component, if set.
    pub fn final_block_id(&self) -> Option<&Component> {
        self.final_block_id.as_ref()
    }

    /// Sets the FinalBlockId component.
    pub fn set_final_block_id(&mut self, component: Option<Component>) -> &mut Self {
        self.final_block_id = component;
        self
    }

    /// The content bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Sets the content bytes.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) -> &mut Self {
        self.content = content.into();
        self
    }

    /// The SignatureInfo, if the packet has been signed or prepared.
    pub fn signature_info(&self) -> Option<&SignatureInfo> {
        self.sig_info.as_ref()
    }

    /// Sets the SignatureInfo.
    pub fn set_signature_info(&mut self, info: SignatureInfo) -> &mut Self {
        self.sig_info = Some(info);
        self
    }

    /// The raw SignatureValue bytes.
    pub fn signature_value(&self) -> &[u8] {
        &self.sig_value
    }

    /// Sets the SignatureValue bytes.
    pub fn set_signature_value(&mut self, value: impl Into<Vec<u8>>) -> &mut Self {
        self.sig_value = value.into();
        self
    }

    fn meta_info_block(&self) -> Option<Block> {
        if self.content_type == content_type::BLOB
            && self.freshness_period.is_none()
            && self.final_block_id.is_none()
        {
            return None;
        }
        let mut value = Vec::new();
        if self.content_type != content_type::BLOB {
            Block::from_non_negative_integer(number::CONTENT_TYPE, u64::from(self.content_type))
                .encode_into(&mut value);
        }
        if let Some(period) = self.freshness_period {
            Block::from_non_negative_integer(number::FRESHNESS_PERIOD, period.as_millis() as u64)
                .encode_into(&mut value);
        }
        if let Some(component) = &self.final_block_id {
            let mut inner = Vec::new();
            component.to_block().encode_into(&mut inner);
            Block::new(number::FINAL_BLOCK_ID, inner).encode_into(&mut value);
        }
        Some(Block::new(number::META_INFO, value))
    }

    /// The signed portion: Name, MetaInfo, Content, and SignatureInfo TLVs.
    pub fn signed_portion(&self) -> Result<Vec<u8>, TlvError> {
        let info = self
            .sig_info
            .as_ref()
            .ok_or(TlvError::MissingElement(number::SIGNATURE_INFO))?;
        let mut out = Vec::new();
        self.name.to_block().encode_into(&mut out);
        if let Some(meta) = self.meta_info_block() {
            meta.encode_into(&mut out);
        }
        if !self.content.is_empty() {
            Block::new(number::CONTENT, self.content.clone()).encode_into(&mut out);
        }
        info.to_block(number::SIGNATURE_INFO).encode_into(&mut out);
        Ok(out)
    }

    /// The full wire encoding; requires SignatureInfo to be present.
    pub fn wire_encode(&self) -> Result<Vec<u8>, TlvError> {
        let mut value = self.signed_portion()?;
        Block::new(number::SIGNATURE_VALUE, self.sig_value.clone()).encode_into(&mut value);
        Ok(Block::new(number::DATA, value).encode())
    }

    /// Decodes a Data packet occupying the whole buffer.
    pub fn wire_decode(buf: &[u8]) -> Result<Self, TlvError> {
        Self::from_block(&Block::from_slice(buf)?)
    }

    /// Decodes from a Data TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        if block.tlv_type() != number::DATA {
            return Err(TlvError::UnexpectedType {
                expected: number::DATA,
                got: block.tlv_type(),
            });
        }
        let mut name = None;
        let mut data = Self::new(Name::new());
        let mut sig_value = None;
        for element in block.elements()? {
            match element.tlv_type() {
                number::NAME => name = Some(Name::from_block(&element)?),
                number::META_INFO => data.decode_meta_info(&element)?,
                number::CONTENT => data.content = element.into_value(),
                number::SIGNATURE_INFO => {
                    data.sig_info = Some(SignatureInfo::from_block(&element)?)
                }
                number::SIGNATURE_VALUE => sig_value = Some(element.into_value()),
                other => return Err(TlvError::UnrecognizedElement(other)),
            }
        }
        data.name = name.ok_or(TlvError::MissingElement(number::NAME))?;
        data.sig_value = sig_value.ok_or(TlvError::MissingElement(number::SIGNATURE_VALUE))?;
        if data.sig_info.is_none() {
            return Err(TlvError::MissingElement(number::SIGNATURE_INFO));
        }
        Ok(data)
    }

    fn decode_meta_info(&mut self, block: &Block) -> Result<(), TlvError> {
        for element in block.elements()? {
            match element.tlv_type() {
                number::CONTENT_TYPE => {
                    self.content_type = element.to_non_negative_integer()? as u32;
                }
                number::FRESHNESS_PERIOD => {
                    self.freshness_period =
                        Some(Duration::from_millis(element.to_non_negative_integer()?));
                }
                number::FINAL_BLOCK_ID => {
                    let inner = element.elements()?;
                    let component = inner
                        .first()
                        .ok_or(TlvError::MissingElement(number::GENERIC_NAME_COMPONENT))?;
                    self.final_block_id = Some(Component::from_block(component)?);
                }
                other => return Err(TlvError::UnrecognizedElement(other)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature_info::{KeyLocator, SignatureType};

    fn sample_data() -> Data {
        let mut data = Data::new(Name::from_uri("/app/blob/v=1").unwrap());
        data.set_content_type(content_type::BLOB)
            .set_freshness_period(Some(Duration::from_secs(1)))
            .set_final_block_id(Some(Component::segment(1)))
            .set_content(b"payload".to_vec())
            .set_signature_info(
                SignatureInfo::new(SignatureType::Sha256WithEcdsa)
                    .with_key_locator(KeyLocator::Name(Name::from_uri("/app/KEY/1").unwrap())),
            )
            .set_signature_value(vec![0xAB; 32]);
        data
    }

    #[test]
    fn wire_roundtrip() {
        let data = sample_data();
        let wire = data.wire_encode().unwrap();
        let decoded = Data::wire_decode(&wire).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn signed_portion_excludes_signature_value() {
        let data = sample_data();
        let portion = data.signed_portion().unwrap();
        let wire = data.wire_encode().unwrap();
        // The signed portion is a strict prefix of the Data TLV value.
        let outer = Block::from_slice(&wire).unwrap();
        assert!(outer.value().starts_with(&portion));
        assert!(outer.value().len() > portion.len());
    }

    #[test]
    fn unsigned_data_cannot_encode() {
        let data = Data::new(Name::from_uri("/x").unwrap());
        assert!(data.wire_encode().is_err());
    }

    #[test]
    fn zero_freshness_survives_roundtrip() {
        let mut data = sample_data();
        data.set_freshness_period(Some(Duration::ZERO));
        let decoded = Data::wire_decode(&data.wire_encode().unwrap()).unwrap();
        assert_eq!(decoded.freshness_period(), Some(Duration::ZERO));
    }
}
