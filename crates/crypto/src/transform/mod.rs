// Path: crates/crypto/src/transform/mod.rs
//! The streaming transform pipeline.
//!
//! A chain has three kinds of module: a source (no predecessor), zero or
//! more filters, and a sink (no successor). A chain is assembled with a
//! builder and pumped when the sink is bound:
//!
//! ```ignore
//! buffer_source(data).pipe(base64_encode(true)).run(stream_sink(&mut out))?;
//! ```
//!
//! A [`StepSource`](base::StepSource) chain is armed instead of pumped;
//! input is delivered with explicit `write`/`end` calls. Every module
//! carries a monotonic chain index; a failing module reports that index in
//! its [`TransformError`](ndn_types::error::TransformError).

pub mod base;
pub mod base64;
pub mod block_cipher;
pub mod digest_filter;
pub mod hex;
pub mod hmac_filter;
pub mod signer_filter;
pub mod sinks;
pub mod strip_space;
pub mod verifier_filter;

pub use base::{buffer_source, step_source, stream_source, Sink, StepSource, Transform};
pub use base64::{base64_decode, base64_encode};
pub use block_cipher::{block_cipher, BlockCipherAlgorithm, CipherOperator};
pub use digest_filter::digest_filter;
pub use hex::{hex_decode, hex_encode};
pub use hmac_filter::hmac_filter;
pub use signer_filter::signer_filter;
pub use sinks::{bool_sink, stream_sink};
pub use strip_space::strip_space;
pub use verifier_filter::{verifier_filter, verifier_filter_hmac};
