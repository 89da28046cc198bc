// Path: crates/mgmt/src/control_parameters.rs
//! Parameters of a ControlCommand request.
//!
//! Each command family defines its own concrete parameter type; the
//! dispatcher only needs decoding (via the per-command parser closure),
//! semantic validation, and downcasting for handlers.

use ndn_types::error::TlvError;
use ndn_types::tlv::Block;
use std::any::Any;

/// The capability set the dispatcher requires of command parameters.
pub trait ControlParametersBase: Send + Sync {
    /// Re-encodes the parameters.
    fn wire_encode(&self) -> Block;

    /// Downcast support for command handlers.
    fn as_any(&self) -> &dyn Any;
}

/// Parameters kept as the raw TLV block, for commands that defer
/// interpretation to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameters(pub Block);

impl RawParameters {
    /// Decodes from the name component carrying the parameters block.
    pub fn from_component_value(value: &[u8]) -> Result<Self, TlvError> {
        Ok(Self(Block::from_slice(value)?))
    }
}

impl ControlParametersBase for RawParameters {
    fn wire_encode(&self) -> Block {
        self.0.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
