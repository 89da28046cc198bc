// Path: crates/types/src/validity_period.rs
//! The certificate validity window carried inside SignatureInfo.

use crate::error::TlvError;
use crate::tlv::{number, Block};
use chrono::{DateTime, NaiveDateTime, Utc};

const ISO_COMPACT: &str = "%Y%m%dT%H%M%S";

/// An inclusive `[not_before, not_after]` validity window.
///
/// Encoded as a ValidityPeriod TLV holding NotBefore and NotAfter
/// sub-elements, each an ISO-8601 compact UTC timestamp
/// (`YYYYMMDDTHHMMSS`). Sub-second precision is dropped on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityPeriod {
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl ValidityPeriod {
    /// Creates a window; `not_before` after `not_after` yields an always-invalid window.
    pub fn new(not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        Self {
            not_before,
            not_after,
        }
    }

    /// Start of the window.
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the window.
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// True when `not_before ≤ now ≤ not_after`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }

    /// Encodes as a ValidityPeriod TLV element.
    pub fn to_block(&self) -> Block {
        let mut value = Vec::new();
        Block::new(
            number::NOT_BEFORE,
            self.not_before.format(ISO_COMPACT).to_string().into_bytes(),
        )
        .encode_into(&mut value);
        Block::new(
            number::NOT_AFTER,
            self.not_after.format(ISO_COMPACT).to_string().into_bytes(),
        )
        .encode_into(&mut value);
        Block::new(number::VALIDITY_PERIOD, value)
    }

    /// Decodes from a ValidityPeriod TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        if block.tlv_type() != number::VALIDITY_PERIOD {
            return Err(TlvError::UnexpectedType {
                expected: number::VALIDITY_PERIOD,
                got: block.tlv_type(),
            });
        }
        let mut not_before = None;
        let mut not_after = None;
        for element in block.elements()? {
            match element.tlv_type() {
                number::NOT_BEFORE => not_before = Some(parse_timestamp(element.value())?),
                number::NOT_AFTER => not_after = Some(parse_timestamp(element.value())?),
                other => return Err(TlvError::UnrecognizedElement(other)),
            }
        }
        Ok(Self {
            not_before: not_before.ok_or(TlvError::MissingElement(number::NOT_BEFORE))?,
            not_after: not_after.ok_or(TlvError::MissingElement(number::NOT_AFTER))?,
        })
    }
}

fn parse_timestamp(value: &[u8]) -> Result<DateTime<Utc>, TlvError> {
    let text = std::str::from_utf8(value)
        .map_err(|_| TlvError::InvalidValue("timestamp is not UTF-8".into()))?;
    let naive = NaiveDateTime::parse_from_str(text, ISO_COMPACT)
        .map_err(|e| TlvError::InvalidValue(format!("invalid timestamp `{text}`: {e}")))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}
