// Path: crates/api/src/error.rs
// Re-export all core error types from the central types crate.
pub use ndn_types::error::{
    CertificateError, ConfigError, CryptoError, DispatchError, ErrorCode, FaceError, NackReason,
    TlvError, TransformError, TransformErrorKind, ValidationError, ValidationErrorCode,
};
