// Path: crates/types/src/additional_description.rs
//! An ordered mapping of UTF-8 keys to UTF-8 values, embedded in a
//! certificate's SignatureInfo as an AdditionalDescription sub-TLV.

use crate::error::TlvError;
use crate::tlv::{number, Block};

/// Ordered (key, value) description entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionalDescription {
    entries: Vec<(String, String)>,
}

impl AdditionalDescription {
    /// Creates an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends or replaces the entry for `key`, preserving insertion order.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// The value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encodes as an AdditionalDescription TLV element.
    pub fn to_block(&self) -> Block {
        let mut value = Vec::new();
        for (key, entry_value) in &self.entries {
            let mut entry = Vec::new();
            Block::new(number::DESCRIPTION_KEY, key.as_bytes().to_vec()).encode_into(&mut entry);
            Block::new(number::DESCRIPTION_VALUE, entry_value.as_bytes().to_vec())
                .encode_into(&mut entry);
            Block::new(number::DESCRIPTION_ENTRY, entry).encode_into(&mut value);
        }
        Block::new(number::ADDITIONAL_DESCRIPTION, value)
    }

    /// Decodes from an AdditionalDescription TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        if block.tlv_type() != number::ADDITIONAL_DESCRIPTION {
            return Err(TlvError::UnexpectedType {
                expected: number::ADDITIONAL_DESCRIPTION,
                got: block.tlv_type(),
            });
        }
        let mut description = Self::new();
        for entry in block.elements()? {
            if entry.tlv_type() != number::DESCRIPTION_ENTRY {
                return Err(TlvError::UnexpectedType {
                    expected: number::DESCRIPTION_ENTRY,
                    got: entry.tlv_type(),
                });
            }
            let mut key = None;
            let mut value = None;
            for field in entry.elements()? {
                match field.tlv_type() {
                    number::DESCRIPTION_KEY => key = Some(utf8(field.value())?),
                    number::DESCRIPTION_VALUE => value = Some(utf8(field.value())?),
                    other => return Err(TlvError::UnrecognizedElement(other)),
                }
            }
            description.entries.push((
                key.ok_or(TlvError::MissingElement(number::DESCRIPTION_KEY))?,
                value.ok_or(TlvError::MissingElement(number::DESCRIPTION_VALUE))?,
            ));
        }
        Ok(description)
    }
}

fn utf8(bytes: &[u8]) -> Result<String, TlvError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| TlvError::InvalidValue("description entry is not UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_order() {
        let mut description = AdditionalDescription::new();
        description.set("issuer", "ops");
        description.set("purpose", "testing");
        description.set("issuer", "security-ops");

        let decoded = AdditionalDescription::from_block(&description.to_block()).unwrap();
        let entries: Vec<_> = decoded.iter().collect();
        assert_eq!(
            entries,
            vec![("issuer", "security-ops"), ("purpose", "testing")]
        );
    }

    #[test]
    fn rejects_non_utf8() {
        let mut entry = Vec::new();
        Block::new(number::DESCRIPTION_KEY, vec![0xFF, 0xFE]).encode_into(&mut entry);
        Block::new(number::DESCRIPTION_VALUE, b"x".to_vec()).encode_into(&mut entry);
        let mut value = Vec::new();
        Block::new(number::DESCRIPTION_ENTRY, entry).encode_into(&mut value);
        let block = Block::new(number::ADDITIONAL_DESCRIPTION, value);
        assert!(AdditionalDescription::from_block(&block).is_err());
    }
}
