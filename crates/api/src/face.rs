// Path: crates/api/src/face.rs
//! The face: the I/O collaborator that exchanges Interests and Data with
//! the network. The kernel never implements a transport; it consumes this
//! trait.

use crate::security::SigningInfo;
use async_trait::async_trait;
use ndn_types::error::FaceError;
use ndn_types::{Data, Interest, Name};

/// Handle for a prefix registration performed through a face.
///
/// Dropping the handle does not unregister; call
/// [`Face::unregister_prefix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredPrefixHandle {
    /// Face-assigned registration id.
    pub id: u64,
    /// The registered prefix.
    pub prefix: Name,
}

/// A pluggable Interest/Data I/O engine.
///
/// `express_interest` resolves with the matching Data, or fails with
/// [`FaceError::Nack`] or [`FaceError::Timeout`] — the Interest's own
/// lifetime bounds the wait. All methods are driven from the single
/// cooperative event loop; implementations must not require exclusive
/// access.
#[async_trait]
pub trait Face: Send + Sync {
    /// Expresses an Interest and awaits Data, Nack, or timeout.
    async fn express_interest(&self, interest: &Interest) -> Result<Data, FaceError>;

    /// Sends a Data packet toward the network.
    async fn put_data(&self, data: &Data) -> Result<(), FaceError>;

    /// Registers a prefix with the forwarder, signing the registration
    /// command with `signing`.
    async fn register_prefix(
        &self,
        prefix: &Name,
        signing: &SigningInfo,
    ) -> Result<RegisteredPrefixHandle, FaceError>;

    /// Removes a registration previously returned by
    /// [`Face::register_prefix`].
    async fn unregister_prefix(&self, handle: RegisteredPrefixHandle) -> Result<(), FaceError>;
}
