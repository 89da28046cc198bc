// Path: crates/types/src/interest.rs
//! The Interest packet, including both signed-Interest wire shapes.

use crate::error::TlvError;
use crate::name::Name;
use crate::signature_info::SignatureInfo;
use crate::tlv::{number, Block};
use std::time::Duration;

/// The default InterestLifetime.
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_secs(4);

/// Discriminates the two signed-Interest wire shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignedInterestFormat {
    /// Legacy command Interests: timestamp, nonce, SignatureInfo, and
    /// SignatureValue appended as name components.
    V02,
    /// Packet-level InterestSignatureInfo/InterestSignatureValue fields.
    V03,
}

/// Name-layout constants for legacy (v0.2) command Interests.
pub mod command_interest {
    /// Minimum number of name components of a signed command name.
    pub const MIN_SIZE: usize = 4;
    /// Offset of the timestamp component (from the end).
    pub const POS_TIMESTAMP: isize = -4;
    /// Offset of the nonce component (from the end).
    pub const POS_NONCE: isize = -3;
    /// Offset of the SignatureInfo component (from the end).
    pub const POS_SIG_INFO: isize = -2;
    /// Offset of the SignatureValue component (from the end).
    pub const POS_SIG_VALUE: isize = -1;
}

/// An Interest packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    name: Name,
    can_be_prefix: bool,
    must_be_fresh: bool,
    forwarding_hint: Vec<Name>,
    nonce: Option<u32>,
    lifetime: Duration,
    app_parameters: Option<Vec<u8>>,
    sig_info: Option<SignatureInfo>,
    sig_value: Option<Vec<u8>>,
}

impl Interest {
    /// Creates an Interest for the given name with default selectors.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            can_be_prefix: false,
            must_be_fresh: false,
            forwarding_hint: Vec::new(),
            nonce: None,
            lifetime: DEFAULT_INTEREST_LIFETIME,
            app_parameters: None,
            sig_info: None,
            sig_value: None,
        }
    }

    /// The Interest name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Replaces the Interest name.
    pub fn set_name(&mut self, name: Name) -> &mut Self {
        self.name = name;
        self
    }

    /// CanBePrefix selector.
    pub fn can_be_prefix(&self) -> bool {
        self.can_be_prefix
    }

    /// Sets CanBePrefix.
    pub fn set_can_be_prefix(&mut self, value: bool) -> &mut Self {
        self.can_be_prefix = value;
        self
    }

    /// MustBeFresh selector.
    pub fn must_be_fresh(&self) -> bool {
        self.must_be_fresh
    }

    /// Sets MustBeFresh.
    pub fn set_must_be_fresh(&mut self, value: bool) -> &mut Self {
        self.must_be_fresh = value;
        self
    }

    /// The forwarding hint: names of routable prefixes toward the
    /// producer.
    pub fn forwarding_hint(&self) -> &[Name] {
        &self.forwarding_hint
    }

    /// Sets the forwarding hint.
    pub fn set_forwarding_hint(&mut self, hint: Vec<Name>) -> &mut Self {
        self.forwarding_hint = hint;
        self
    }

    /// The nonce, if set.
    pub fn nonce(&self) -> Option<u32> {
        self.nonce
    }

    /// Sets the nonce.
    pub fn set_nonce(&mut self, nonce: Option<u32>) -> &mut Self {
        self.nonce = nonce;
        self
    }

    /// The InterestLifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sets the InterestLifetime.
    pub fn set_lifetime(&mut self, lifetime: Duration) -> &mut Self {
        self.lifetime = lifetime;
        self
    }

    /// The ApplicationParameters, if present.
    pub fn app_parameters(&self) -> Option<&[u8]> {
        self.app_parameters.as_deref()
    }

    /// Sets the ApplicationParameters.
    pub fn set_app_parameters(&mut self, parameters: Option<Vec<u8>>) -> &mut Self {
        self.app_parameters = parameters;
        self
    }

    /// The InterestSignatureInfo (v0.3), if present.
    pub fn signature_info(&self) -> Option<&SignatureInfo> {
        self.sig_info.as_ref()
    }

    /// Sets the InterestSignatureInfo (v0.3).
    pub fn set_signature_info(&mut self, info: SignatureInfo) -> &mut Self {
        self.sig_info = Some(info);
        self
    }

    /// The InterestSignatureValue (v0.3), if present.
    pub fn signature_value(&self) -> Option<&[u8]> {
        self.sig_value.as_deref()
    }

    /// Sets the InterestSignatureValue (v0.3).
    pub fn set_signature_value(&mut self, value: Vec<u8>) -> &mut Self {
        self.sig_value = Some(value);
        self
    }

    /// Detects which signed-Interest shape this packet carries, if any.
    ///
    /// A packet-level InterestSignatureInfo marks v0.3. Otherwise a name
    /// whose penultimate component parses as a SignatureInfo TLV marks the
    /// legacy v0.2 shape.
    pub fn detect_signed_format(&self) -> Option<SignedInterestFormat> {
        if self.sig_info.is_some() {
            return Some(SignedInterestFormat::V03);
        }
        if self.name.len() >= command_interest::MIN_SIZE && self.v02_signature_info().is_ok() {
            return Some(SignedInterestFormat::V02);
        }
        None
    }

    /// Extracts the SignatureInfo of a legacy (v0.2) signed Interest from
    /// the penultimate name component.
    pub fn v02_signature_info(&self) -> Result<SignatureInfo, TlvError> {
        let component = self
            .name
            .get(command_interest::POS_SIG_INFO)
            .ok_or(TlvError::MissingElement(number::SIGNATURE_INFO))?;
        SignatureInfo::from_block(&Block::from_slice(component.value())?)
    }

    /// Extracts the SignatureValue of a legacy (v0.2) signed Interest from
    /// the last name component.
    pub fn v02_signature_value(&self) -> Result<Vec<u8>, TlvError> {
        let component = self
            .name
            .get(command_interest::POS_SIG_VALUE)
            .ok_or(TlvError::MissingElement(number::SIGNATURE_VALUE))?;
        let block = Block::from_slice(component.value())?;
        if block.tlv_type() != number::SIGNATURE_VALUE {
            return Err(TlvError::UnexpectedType {
                expected: number::SIGNATURE_VALUE,
                got: block.tlv_type(),
            });
        }
        Ok(block.into_value())
    }

    /// The signed byte range for the given signed-Interest format.
    ///
    /// - v0.2: all name-component TLVs except the last (SignatureValue).
    /// - v0.3: all name-component TLVs, then the ApplicationParameters TLV
    ///   (if present), then the InterestSignatureInfo TLV.
    pub fn signed_portion(&self, format: SignedInterestFormat) -> Result<Vec<u8>, TlvError> {
        let mut out = Vec::new();
        match format {
            SignedInterestFormat::V02 => {
                if self.name.is_empty() {
                    return Err(TlvError::MissingElement(number::NAME));
                }
                for component in &self.name.components()[..self.name.len() - 1] {
                    component.to_block().encode_into(&mut out);
                }
            }
            SignedInterestFormat::V03 => {
                let info = self
                    .sig_info
                    .as_ref()
                    .ok_or(TlvError::MissingElement(number::INTEREST_SIGNATURE_INFO))?;
                for component in self.name.components() {
                    component.to_block().encode_into(&mut out);
                }
                if let Some(parameters) = &self.app_parameters {
                    Block::new(number::APPLICATION_PARAMETERS, parameters.clone())
                        .encode_into(&mut out);
                }
                info.to_block(number::INTEREST_SIGNATURE_INFO)
                    .encode_into(&mut out);
            }
        }
        Ok(out)
    }

    /// The full wire encoding.
    pub fn wire_encode(&self) -> Vec<u8> {
        let mut value = Vec::new();
        self.name.to_block().encode_into(&mut value);
        if self.can_be_prefix {
            Block::empty(number::CAN_BE_PREFIX).encode_into(&mut value);
        }
        if self.must_be_fresh {
            Block::empty(number::MUST_BE_FRESH).encode_into(&mut value);
        }
        if !self.forwarding_hint.is_empty() {
            let mut hint = Vec::new();
            for name in &self.forwarding_hint {
                name.to_block().encode_into(&mut hint);
            }
            Block::new(number::FORWARDING_HINT, hint).encode_into(&mut value);
        }
        if let Some(nonce) = self.nonce {
            Block::new(number::NONCE, nonce.to_be_bytes().to_vec()).encode_into(&mut value);
        }
        if self.lifetime != DEFAULT_INTEREST_LIFETIME {
            Block::from_non_negative_integer(
                number::INTEREST_LIFETIME,
                self.lifetime.as_millis() as u64,
            )
            .encode_into(&mut value);
        }
        if let Some(parameters) = &self.app_parameters {
            Block::new(number::APPLICATION_PARAMETERS, parameters.clone())
                .encode_into(&mut value);
        }
        if let Some(info) = &self.sig_info {
            info.to_block(number::INTEREST_SIGNATURE_INFO)
                .encode_into(&mut value);
        }
        if let Some(sig_value) = &self.sig_value {
            Block::new(number::INTEREST_SIGNATURE_VALUE, sig_value.clone())
                .encode_into(&mut value);
        }
        Block::new(number::INTEREST, value).encode()
    }

    /// Decodes an Interest occupying the whole buffer.
    pub fn wire_decode(buf: &[u8]) -> Result<Self, TlvError> {
        Self::from_block(&Block::from_slice(buf)?)
    }

    /// Decodes from an Interest TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        if block.tlv_type() != number::INTEREST {
            return Err(TlvError::UnexpectedType {
                expected: number::INTEREST,
                got: block.tlv_type(),
            });
        }
        let mut name = None;
        let mut interest = Self::new(Name::new());
        for element in block.elements()? {
            match element.tlv_type() {
                number::NAME => name = Some(Name::from_block(&element)?),
                number::CAN_BE_PREFIX => interest.can_be_prefix = true,
                number::MUST_BE_FRESH => interest.must_be_fresh = true,
                number::FORWARDING_HINT => {
                    for name in element.elements()? {
                        interest.forwarding_hint.push(Name::from_block(&name)?);
                    }
                }
                number::NONCE => {
                    let bytes: [u8; 4] = element
                        .value()
                        .try_into()
                        .map_err(|_| TlvError::InvalidValue("Nonce must be 4 bytes".into()))?;
                    interest.nonce = Some(u32::from_be_bytes(bytes));
                }
                number::INTEREST_LIFETIME => {
                    interest.lifetime =
                        Duration::from_millis(element.to_non_negative_integer()?);
                }
                number::APPLICATION_PARAMETERS => {
                    interest.app_parameters = Some(element.into_value());
                }
                number::INTEREST_SIGNATURE_INFO => {
                    interest.sig_info = Some(SignatureInfo::from_block(&element)?);
                }
                number::INTEREST_SIGNATURE_VALUE => {
                    interest.sig_value = Some(element.into_value());
                }
                other => return Err(TlvError::UnrecognizedElement(other)),
            }
        }
        interest.name = name.ok_or(TlvError::MissingElement(number::NAME))?;
        Ok(interest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Component;
    use crate::signature_info::{KeyLocator, SignatureType};

    #[test]
    fn wire_roundtrip() {
        let mut interest = Interest::new(Name::from_uri("/app/cmd").unwrap());
        interest
            .set_can_be_prefix(true)
            .set_must_be_fresh(true)
            .set_forwarding_hint(vec![Name::from_uri("/hub/site").unwrap()])
            .set_nonce(Some(0xDEADBEEF))
            .set_lifetime(Duration::from_secs(2));
        let decoded = Interest::wire_decode(&interest.wire_encode()).unwrap();
        assert_eq!(decoded, interest);
    }

    #[test]
    fn v03_signed_portion_covers_parameters_and_info() {
        let mut interest = Interest::new(Name::from_uri("/app/cmd").unwrap());
        interest.set_app_parameters(Some(b"params".to_vec()));
        interest.set_signature_info(
            SignatureInfo::new(SignatureType::Sha256WithEcdsa)
                .with_key_locator(KeyLocator::Name(Name::from_uri("/id/KEY/1").unwrap())),
        );
        let portion = interest.signed_portion(SignedInterestFormat::V03).unwrap();
        assert!(!portion.is_empty());
        // Changing the parameters must change the signed portion.
        interest.set_app_parameters(Some(b"tampered".to_vec()));
        assert_ne!(
            portion,
            interest.signed_portion(SignedInterestFormat::V03).unwrap()
        );
    }

    #[test]
    fn v02_signed_portion_excludes_last_component() {
        let info = SignatureInfo::new(SignatureType::Sha256WithEcdsa);
        let name = Name::from_uri("/app/cmd")
            .unwrap()
            .append(Component::number(1_000))
            .append(Component::generic(vec![0; 8]))
            .append(Component::generic(
                info.to_block(number::SIGNATURE_INFO).encode(),
            ))
            .append(Component::generic(
                Block::new(number::SIGNATURE_VALUE, vec![1, 2, 3]).encode(),
            ));
        let interest = Interest::new(name);

        assert_eq!(
            interest.detect_signed_format(),
            Some(SignedInterestFormat::V02)
        );
        assert_eq!(interest.v02_signature_info().unwrap(), info);
        assert_eq!(interest.v02_signature_value().unwrap(), vec![1, 2, 3]);

        let portion = interest.signed_portion(SignedInterestFormat::V02).unwrap();
        let full: usize = interest
            .name()
            .components()
            .iter()
            .map(|c| c.to_block().encoded_len())
            .sum();
        let last = interest.name().at(-1).to_block().encoded_len();
        assert_eq!(portion.len(), full - last);
    }

    #[test]
    fn unsigned_interest_has_no_format() {
        let interest = Interest::new(Name::from_uri("/plain/fetch").unwrap());
        assert_eq!(interest.detect_signed_format(), None);
    }

    #[test]
    fn default_lifetime_omitted_from_wire() {
        let interest = Interest::new(Name::from_uri("/x").unwrap());
        let decoded = Interest::wire_decode(&interest.wire_encode()).unwrap();
        assert_eq!(decoded.lifetime(), DEFAULT_INTEREST_LIFETIME);
    }
}
