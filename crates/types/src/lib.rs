// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # NDN Kernel Types
//!
//! This crate is the foundational library for the NDN client kernel,
//! containing the packet data model, the TLV wire codec, and all core
//! error types.
//!
//! ## Architectural Role
//!
//! As the base crate, `ndn-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This structure
//! prevents circular dependencies and provides a stable, canonical
//! definition for shared types like `Name`, `Interest`, `Data`,
//! `Certificate`, and the error enums.

/// The maximum size in bytes of an NDN packet on the wire.
pub const MAX_NDN_PACKET_SIZE: usize = 8800;

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::TlvError> = std::result::Result<T, E>;

/// Ordered mapping of UTF-8 keys to UTF-8 values embedded in SignatureInfo.
pub mod additional_description;
/// The NDN Certificate: a Data packet with an enforced naming convention.
pub mod certificate;
/// Data packet.
pub mod data;
/// A unified set of all error types used across the workspace.
pub mod error;
/// Interest packet, including both signed-Interest wire shapes.
pub mod interest;
/// Hierarchical names and typed name components.
pub mod name;
/// SignatureInfo, KeyLocator, and signature-type assignments.
pub mod signature_info;
/// The TLV wire codec: var-numbers, blocks, and assigned numbers.
pub mod tlv;
/// Certificate validity window.
pub mod validity_period;

pub use additional_description::AdditionalDescription;
pub use certificate::Certificate;
pub use data::Data;
pub use interest::{Interest, SignedInterestFormat};
pub use name::{Component, Name};
pub use signature_info::{KeyLocator, SignatureInfo, SignatureType};
pub use tlv::Block;
pub use validity_period::ValidityPeriod;
