// Path: crates/types/src/name.rs
//! Hierarchical names and typed name components.
//!
//! A [`Name`] is an ordered sequence of [`Component`]s. Components are
//! opaque byte strings tagged with a TLV type; the v0.3 naming conventions
//! assign dedicated types to version, segment, timestamp, byte-offset, and
//! sequence-number components.

use crate::error::TlvError;
use crate::tlv::{self, number, Block};
use std::fmt;
use std::str::FromStr;

/// One name component: a TLV type and opaque value bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    tlv_type: u32,
    value: Vec<u8>,
}

impl Component {
    /// Creates a GenericNameComponent from raw bytes.
    pub fn generic(value: impl Into<Vec<u8>>) -> Self {
        Self {
            tlv_type: number::GENERIC_NAME_COMPONENT,
            value: value.into(),
        }
    }

    /// Creates a component with an explicit TLV type.
    pub fn typed(tlv_type: u32, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tlv_type,
            value: value.into(),
        }
    }

    /// Creates a KeywordNameComponent.
    pub fn keyword(value: impl Into<Vec<u8>>) -> Self {
        Self::typed(number::KEYWORD_NAME_COMPONENT, value)
    }

    /// Creates a VersionNameComponent carrying `n`.
    pub fn version(n: u64) -> Self {
        Self::typed(
            number::VERSION_NAME_COMPONENT,
            tlv::encode_non_negative_integer(n),
        )
    }

    /// Creates a SegmentNameComponent carrying `n`.
    pub fn segment(n: u64) -> Self {
        Self::typed(
            number::SEGMENT_NAME_COMPONENT,
            tlv::encode_non_negative_integer(n),
        )
    }

    /// Creates a TimestampNameComponent carrying `micros`.
    pub fn timestamp(micros: u64) -> Self {
        Self::typed(
            number::TIMESTAMP_NAME_COMPONENT,
            tlv::encode_non_negative_integer(micros),
        )
    }

    /// Creates a SequenceNumNameComponent carrying `n`.
    pub fn sequence_number(n: u64) -> Self {
        Self::typed(
            number::SEQUENCE_NUM_NAME_COMPONENT,
            tlv::encode_non_negative_integer(n),
        )
    }

    /// Creates a GenericNameComponent carrying a non-negative integer,
    /// as used by the legacy command-Interest timestamp.
    pub fn number(n: u64) -> Self {
        Self::generic(tlv::encode_non_negative_integer(n))
    }

    /// The component's TLV type.
    pub fn tlv_type(&self) -> u32 {
        self.tlv_type
    }

    /// The component's value bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// True for GenericNameComponent.
    pub fn is_generic(&self) -> bool {
        self.tlv_type == number::GENERIC_NAME_COMPONENT
    }

    /// True for VersionNameComponent.
    pub fn is_version(&self) -> bool {
        self.tlv_type == number::VERSION_NAME_COMPONENT
    }

    /// True for SegmentNameComponent.
    pub fn is_segment(&self) -> bool {
        self.tlv_type == number::SEGMENT_NAME_COMPONENT
    }

    /// True for TimestampNameComponent.
    pub fn is_timestamp(&self) -> bool {
        self.tlv_type == number::TIMESTAMP_NAME_COMPONENT
    }

    /// True for SequenceNumNameComponent.
    pub fn is_sequence_number(&self) -> bool {
        self.tlv_type == number::SEQUENCE_NUM_NAME_COMPONENT
    }

    /// True when the value decodes as a non-negative integer.
    pub fn is_number(&self) -> bool {
        matches!(self.value.len(), 1 | 2 | 4 | 8)
    }

    /// Interprets the value as a non-negative integer.
    pub fn to_number(&self) -> Result<u64, TlvError> {
        tlv::decode_non_negative_integer(&self.value)
    }

    /// Encodes this component as one TLV element.
    pub fn to_block(&self) -> Block {
        Block::new(self.tlv_type, self.value.clone())
    }

    /// Decodes a component from one TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        // Any type is structurally acceptable as a name component except
        // the container types themselves.
        if block.tlv_type() == number::NAME {
            return Err(TlvError::UnexpectedType {
                expected: number::GENERIC_NAME_COMPONENT,
                got: block.tlv_type(),
            });
        }
        Ok(Self {
            tlv_type: block.tlv_type(),
            value: block.value().to_vec(),
        })
    }

    /// NDN canonical order: by type, then by length, then lexicographically.
    fn canonical_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.tlv_type
            .cmp(&other.tlv_type)
            .then(self.value.len().cmp(&other.value.len()))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical_cmp(other)
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn percent_encode(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    if bytes.is_empty() {
        return f.write_str("...");
    }
    for &b in bytes {
        if is_unreserved(b) {
            write!(f, "{}", b as char)?;
        } else {
            write!(f, "%{b:02X}")?;
        }
    }
    Ok(())
}

fn percent_decode(text: &str) -> Result<Vec<u8>, TlvError> {
    if text == "..." {
        return Ok(Vec::new());
    }
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let pair = bytes
                .get(i + 1..i + 3)
                .ok_or_else(|| TlvError::InvalidValue("truncated percent-escape".into()))?;
            let hex = std::str::from_utf8(pair)
                .map_err(|_| TlvError::InvalidValue("invalid percent-escape".into()))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| TlvError::InvalidValue("invalid percent-escape".into()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tlv_type {
            number::GENERIC_NAME_COMPONENT => percent_encode(f, &self.value),
            number::IMPLICIT_SHA256_DIGEST_COMPONENT => {
                write!(f, "sha256digest={}", hex::encode(&self.value))
            }
            number::VERSION_NAME_COMPONENT if self.is_number() => {
                write!(f, "v={}", self.to_number().map_err(|_| fmt::Error)?)
            }
            number::SEGMENT_NAME_COMPONENT if self.is_number() => {
                write!(f, "seg={}", self.to_number().map_err(|_| fmt::Error)?)
            }
            number::TIMESTAMP_NAME_COMPONENT if self.is_number() => {
                write!(f, "t={}", self.to_number().map_err(|_| fmt::Error)?)
            }
            number::SEQUENCE_NUM_NAME_COMPONENT if self.is_number() => {
                write!(f, "seq={}", self.to_number().map_err(|_| fmt::Error)?)
            }
            other => {
                write!(f, "{other}=")?;
                percent_encode(f, &self.value)
            }
        }
    }
}

impl FromStr for Component {
    type Err = TlvError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if let Some((prefix, rest)) = text.split_once('=') {
            let numeric = |rest: &str| -> Result<u64, TlvError> {
                rest.parse::<u64>()
                    .map_err(|_| TlvError::InvalidValue(format!("invalid number `{rest}`")))
            };
            return match prefix {
                "v" => Ok(Self::version(numeric(rest)?)),
                "seg" => Ok(Self::segment(numeric(rest)?)),
                "t" => Ok(Self::timestamp(numeric(rest)?)),
                "seq" => Ok(Self::sequence_number(numeric(rest)?)),
                "sha256digest" => {
                    let digest = hex::decode(rest)
                        .map_err(|e| TlvError::InvalidValue(format!("invalid digest: {e}")))?;
                    Ok(Self::typed(number::IMPLICIT_SHA256_DIGEST_COMPONENT, digest))
                }
                _ => {
                    if let Ok(tlv_type) = prefix.parse::<u32>() {
                        Ok(Self::typed(tlv_type, percent_decode(rest)?))
                    } else {
                        // `=` inside a generic component value
                        Ok(Self::generic(percent_decode(text)?))
                    }
                }
            };
        }
        Ok(Self::generic(percent_decode(text)?))
    }
}

/// A hierarchical NDN name: an ordered sequence of components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// Creates an empty name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URI such as `/app/v=3/seg=0` into a name.
    pub fn from_uri(uri: &str) -> Result<Self, TlvError> {
        let trimmed = uri.trim();
        let path = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let mut components = Vec::new();
        if !path.is_empty() {
            for part in path.split('/') {
                components.push(part.parse()?);
            }
        }
        Ok(Self { components })
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when the name has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component at `index`; negative indices count from the end.
    pub fn get(&self, index: isize) -> Option<&Component> {
        let len = self.components.len() as isize;
        let idx = if index < 0 { len + index } else { index };
        if idx < 0 {
            return None;
        }
        self.components.get(idx as usize)
    }

    /// Component at `index`; negative indices count from the end.
    ///
    /// # Panics
    /// Panics when the index is out of range. Prefer [`Name::get`] outside
    /// of tests.
    pub fn at(&self, index: isize) -> &Component {
        self.get(index).expect("name component index out of range")
    }

    /// The components as a slice.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// First `count` components (`count ≥ 0`), or all but the last
    /// `-count` components (`count < 0`).
    pub fn get_prefix(&self, count: isize) -> Name {
        let len = self.components.len() as isize;
        let take = if count < 0 { len + count } else { count.min(len) };
        let take = take.max(0) as usize;
        Self {
            components: self.components[..take].to_vec(),
        }
    }

    /// Components `[start, end)` as a new name.
    pub fn slice(&self, start: usize, end: usize) -> Name {
        let end = end.min(self.components.len());
        let start = start.min(end);
        Self {
            components: self.components[start..end].to_vec(),
        }
    }

    /// Appends one component.
    pub fn append(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Appends a GenericNameComponent from a UTF-8 string.
    pub fn append_str(self, s: &str) -> Self {
        self.append(Component::generic(s.as_bytes().to_vec()))
    }

    /// Appends a VersionNameComponent.
    pub fn append_version(self, n: u64) -> Self {
        self.append(Component::version(n))
    }

    /// Appends a SegmentNameComponent.
    pub fn append_segment(self, n: u64) -> Self {
        self.append(Component::segment(n))
    }

    /// Appends a SequenceNumNameComponent.
    pub fn append_sequence_number(self, n: u64) -> Self {
        self.append(Component::sequence_number(n))
    }

    /// Appends all components of `other`.
    pub fn append_name(mut self, other: &Name) -> Self {
        self.components.extend_from_slice(&other.components);
        self
    }

    /// Pushes one component in place.
    pub fn push(&mut self, component: Component) {
        self.components.push(component);
    }

    /// True when every component of `self` prefixes `other` in order.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.components.len() <= other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(a, b)| a == b)
    }

    /// Encodes as a Name TLV element.
    pub fn to_block(&self) -> Block {
        let mut value = Vec::new();
        for component in &self.components {
            component.to_block().encode_into(&mut value);
        }
        Block::new(number::NAME, value)
    }

    /// Wire encoding of the Name TLV.
    pub fn encode(&self) -> Vec<u8> {
        self.to_block().encode()
    }

    /// Decodes from a Name TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        if block.tlv_type() != number::NAME {
            return Err(TlvError::UnexpectedType {
                expected: number::NAME,
                got: block.tlv_type(),
            });
        }
        let mut components = Vec::new();
        for element in block.elements()? {
            components.push(Component::from_block(&element)?);
        }
        Ok(Self { components })
    }

    /// Decodes a Name TLV occupying the whole buffer.
    pub fn from_wire(buf: &[u8]) -> Result<Self, TlvError> {
        Self::from_block(&Block::from_slice(buf)?)
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NDN canonical order: component-wise, shorter name first on ties.
        for (a, b) in self.components.iter().zip(&other.components) {
            let ordering = a.cmp(b);
            if ordering != std::cmp::Ordering::Equal {
                return ordering;
            }
        }
        self.components.len().cmp(&other.components.len())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = TlvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl From<Component> for Name {
    fn from(component: Component) -> Self {
        Self {
            components: vec![component],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_roundtrip() {
        let name = Name::from_uri("/hello/world/v=3/seg=0").unwrap();
        assert_eq!(name.len(), 4);
        assert!(name.at(2).is_version());
        assert!(name.at(3).is_segment());
        assert_eq!(name.to_string(), "/hello/world/v=3/seg=0");
        assert_eq!(Name::from_uri(&name.to_string()).unwrap(), name);
    }

    #[test]
    fn uri_percent_encoding() {
        let name = Name::new().append(Component::generic(vec![0x80, 0x00]));
        assert_eq!(name.to_string(), "/%80%00");
        assert_eq!(Name::from_uri("/%80%00").unwrap(), name);
    }

    #[test]
    fn empty_name_is_slash() {
        assert_eq!(Name::new().to_string(), "/");
        assert_eq!(Name::from_uri("/").unwrap(), Name::new());
    }

    #[test]
    fn wire_roundtrip() {
        let name = Name::from_uri("/a/b/v=12345678").unwrap();
        let wire = name.encode();
        assert_eq!(Name::from_wire(&wire).unwrap(), name);
    }

    #[test]
    fn prefix_relations() {
        let base = Name::from_uri("/a/b").unwrap();
        let longer = Name::from_uri("/a/b/c").unwrap();
        assert!(base.is_prefix_of(&longer));
        assert!(base.is_prefix_of(&base));
        assert!(!longer.is_prefix_of(&base));
        assert!(!Name::from_uri("/a/x").unwrap().is_prefix_of(&longer));
    }

    #[test]
    fn negative_indexing() {
        let name = Name::from_uri("/a/b/c/d").unwrap();
        assert_eq!(name.at(-1).value(), b"d");
        assert_eq!(name.at(-4).value(), b"a");
        assert!(name.get(-5).is_none());
        assert_eq!(name.get_prefix(-2), Name::from_uri("/a/b").unwrap());
        assert_eq!(name.get_prefix(1), Name::from_uri("/a").unwrap());
    }

    #[test]
    fn canonical_order() {
        let a = Name::from_uri("/a").unwrap();
        let ab = Name::from_uri("/a/b").unwrap();
        let b = Name::from_uri("/b").unwrap();
        assert!(a < ab);
        assert!(ab < b);
        // shorter value sorts first regardless of content
        let short = Name::new().append(Component::generic(b"z".to_vec()));
        let long = Name::new().append(Component::generic(b"aa".to_vec()));
        assert!(short < long);
    }

    #[test]
    fn empty_component_dots() {
        let name = Name::new().append(Component::generic(Vec::new()));
        assert_eq!(name.to_string(), "/...");
        assert_eq!(Name::from_uri("/...").unwrap(), name);
    }
}
