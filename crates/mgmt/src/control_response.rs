// Path: crates/mgmt/src/control_response.rs
//! The ControlCommand response.

use ndn_types::error::TlvError;
use ndn_types::tlv::{number, Block};

/// A management status reply: code, text, optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    code: u32,
    text: String,
    body: Option<Block>,
}

impl Default for ControlResponse {
    fn default() -> Self {
        Self {
            code: 200,
            text: "OK".into(),
            body: None,
        }
    }
}

impl ControlResponse {
    /// Creates a response with the given status code and text.
    pub fn new(code: u32, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            body: None,
        }
    }

    /// The status code.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Sets the status code.
    pub fn set_code(mut self, code: u32) -> Self {
        self.code = code;
        self
    }

    /// The status text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sets the status text.
    pub fn set_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// The body block, if any.
    pub fn body(&self) -> Option<&Block> {
        self.body.as_ref()
    }

    /// Sets the body block.
    pub fn set_body(mut self, body: Block) -> Self {
        self.body = Some(body);
        self
    }

    /// Encodes as a ControlResponse TLV element (type 101).
    pub fn to_block(&self) -> Block {
        let mut value = Vec::new();
        Block::from_non_negative_integer(number::STATUS_CODE, u64::from(self.code))
            .encode_into(&mut value);
        Block::new(number::STATUS_TEXT, self.text.as_bytes().to_vec()).encode_into(&mut value);
        if let Some(body) = &self.body {
            body.encode_into(&mut value);
        }
        Block::new(number::CONTROL_RESPONSE, value)
    }

    /// Decodes from a ControlResponse TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        if block.tlv_type() != number::CONTROL_RESPONSE {
            return Err(TlvError::UnexpectedType {
                expected: number::CONTROL_RESPONSE,
                got: block.tlv_type(),
            });
        }
        let elements = block.elements()?;
        let mut iter = elements.into_iter();

        let code_block = iter.next().ok_or(TlvError::MissingElement(number::STATUS_CODE))?;
        if code_block.tlv_type() != number::STATUS_CODE {
            return Err(TlvError::UnexpectedType {
                expected: number::STATUS_CODE,
                got: code_block.tlv_type(),
            });
        }
        let code = code_block.to_non_negative_integer()? as u32;

        let text_block = iter.next().ok_or(TlvError::MissingElement(number::STATUS_TEXT))?;
        if text_block.tlv_type() != number::STATUS_TEXT {
            return Err(TlvError::UnexpectedType {
                expected: number::STATUS_TEXT,
                got: text_block.tlv_type(),
            });
        }
        let text = String::from_utf8(text_block.into_value())
            .map_err(|_| TlvError::InvalidValue("StatusText is not UTF-8".into()))?;

        Ok(Self {
            code,
            text,
            body: iter.next(),
        })
    }
}
