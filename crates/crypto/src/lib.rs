// Path: crates/crypto/src/lib.rs
//! # NDN Kernel Cryptography
//!
//! The streaming transform pipeline (sources, filters, sinks), private and
//! public key material, and packet signing/verification primitives.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

/// Message-digest helpers shared by filters and verification.
pub mod digest;
/// Local error types for the `ndn-crypto` crate.
pub mod error;
/// Private/public key material, key parameters, and key generation.
pub mod key;
/// The streaming transform pipeline.
pub mod transform;
/// Signing and verification over packet signed portions.
pub mod verification;

pub use key::{generate_private_key, KeyParams, PrivateKey, PublicKey};
pub use ndn_api::crypto::{DigestAlgorithm, KeyType};
