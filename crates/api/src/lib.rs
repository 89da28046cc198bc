// Path: crates/api/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # NDN Kernel API
//!
//! Trait seams shared across the workspace: the [`face::Face`] I/O
//! collaborator, the [`security::KeyChain`] signing collaborator, the
//! [`time::Clock`] source, and the crypto algorithm identifiers. Keeping
//! the seams here lets implementation crates depend on interfaces rather
//! than on each other.

/// Cryptographic algorithm identifiers shared between signers and policies.
pub mod crypto;
/// Canonical error re-exports.
pub mod error;
/// The face: the I/O object that exchanges Interests and Data.
pub mod face;
/// Signing collaborator seam and signing parameters.
pub mod security;
/// Pluggable time source.
pub mod time;
