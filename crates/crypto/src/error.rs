// Path: crates/crypto/src/error.rs
//! Local error types for the `ndn-crypto` crate.

// Re-export the canonical error types from the central types crate.
pub use ndn_types::error::{CryptoError, TransformError, TransformErrorKind};
