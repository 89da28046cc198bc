// Path: crates/types/src/error/mod.rs
//! Core error types for the NDN client kernel.

use crate::name::Name;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised by the TLV wire codec.
#[derive(Debug, Clone, Error)]
pub enum TlvError {
    /// The buffer ended before a complete TLV element was read.
    #[error("Unexpected end of input while decoding TLV")]
    UnexpectedEnd,
    /// A var-number used a reserved or non-minimal encoding.
    #[error("Invalid TLV var-number encoding")]
    InvalidVarNumber,
    /// The element's declared length exceeds the enclosing buffer.
    #[error("TLV length {declared} exceeds available {available} bytes")]
    LengthOverflow {
        /// Length declared by the element.
        declared: usize,
        /// Bytes remaining in the buffer.
        available: usize,
    },
    /// An element of an unexpected TLV type was encountered.
    #[error("Unexpected TLV type {got}, expecting {expected}")]
    UnexpectedType {
        /// The TLV type required by the grammar.
        expected: u32,
        /// The TLV type found on the wire.
        got: u32,
    },
    /// A required element is missing from the enclosing structure.
    #[error("Missing required TLV element of type {0}")]
    MissingElement(u32),
    /// An unrecognized element that cannot be ignored was encountered.
    #[error("Unrecognized TLV element of type {0}")]
    UnrecognizedElement(u32),
    /// A non-negative integer field had an invalid width.
    #[error("Invalid non-negative integer length {0}")]
    InvalidIntegerLength(usize),
    /// The element's value is structurally invalid.
    #[error("Invalid TLV value: {0}")]
    InvalidValue(String),
}

impl ErrorCode for TlvError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedEnd => "TLV_UNEXPECTED_END",
            Self::InvalidVarNumber => "TLV_INVALID_VAR_NUMBER",
            Self::LengthOverflow { .. } => "TLV_LENGTH_OVERFLOW",
            Self::UnexpectedType { .. } => "TLV_UNEXPECTED_TYPE",
            Self::MissingElement(_) => "TLV_MISSING_ELEMENT",
            Self::UnrecognizedElement(_) => "TLV_UNRECOGNIZED_ELEMENT",
            Self::InvalidIntegerLength(_) => "TLV_INVALID_INTEGER_LENGTH",
            Self::InvalidValue(_) => "TLV_INVALID_VALUE",
        }
    }
}

/// Errors raised while interpreting a Data packet as a Certificate.
#[derive(Debug, Clone, Error)]
pub enum CertificateError {
    /// The Data name does not follow `/<identity>/KEY/<keyId>/<issuerId>/<version>`.
    #[error("Name does not follow the certificate naming convention: {0}")]
    InvalidName(Name),
    /// The Data ContentType is not Key.
    #[error("Expecting ContentType Key, got {0}")]
    InvalidContentType(u32),
    /// The Data carries no FreshnessPeriod.
    #[error("FreshnessPeriod is not set")]
    MissingFreshnessPeriod,
    /// The Data content is empty.
    #[error("Content is empty")]
    EmptyContent,
    /// The SignatureInfo carries no ValidityPeriod.
    #[error("ValidityPeriod is missing from SignatureInfo")]
    MissingValidityPeriod,
    /// A requested SignatureInfo extension is absent.
    #[error("TLV-TYPE {0} sub-element does not exist in SignatureInfo")]
    ExtensionNotFound(u32),
    /// The underlying Data failed to decode.
    #[error("Malformed certificate wire encoding: {0}")]
    Wire(#[from] TlvError),
}

impl ErrorCode for CertificateError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidName(_) => "CERT_INVALID_NAME",
            Self::InvalidContentType(_) => "CERT_INVALID_CONTENT_TYPE",
            Self::MissingFreshnessPeriod => "CERT_MISSING_FRESHNESS",
            Self::EmptyContent => "CERT_EMPTY_CONTENT",
            Self::MissingValidityPeriod => "CERT_MISSING_VALIDITY",
            Self::ExtensionNotFound(_) => "CERT_EXTENSION_NOT_FOUND",
            Self::Wire(_) => "CERT_MALFORMED_WIRE",
        }
    }
}

/// Errors raised by key material handling and low-level crypto operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The supplied key material could not be parsed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// The operation is not defined for this key type.
    #[error("Operation not supported for {key_type} keys: {operation}")]
    UnsupportedOperation {
        /// The key type the operation was attempted on.
        key_type: &'static str,
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// Key generation parameters were rejected.
    #[error("Invalid key parameters: {0}")]
    InvalidKeyParams(String),
    /// The requested digest or signature algorithm is not supported.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// A signing operation failed.
    #[error("Signing failed: {0}")]
    SignFailed(String),
    /// An encryption or decryption operation failed.
    #[error("Cipher operation failed: {0}")]
    CipherFailed(String),
    /// The password supplied for an encrypted container was wrong.
    #[error("Cannot decrypt private key container (wrong password?)")]
    BadPassword,
    /// An I/O error occurred while loading or saving key material.
    #[error("Key I/O error: {0}")]
    Io(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "CRYPTO_INVALID_KEY",
            Self::UnsupportedOperation { .. } => "CRYPTO_UNSUPPORTED_OPERATION",
            Self::InvalidKeyParams(_) => "CRYPTO_INVALID_KEY_PARAMS",
            Self::UnsupportedAlgorithm(_) => "CRYPTO_UNSUPPORTED_ALGORITHM",
            Self::SignFailed(_) => "CRYPTO_SIGN_FAILED",
            Self::CipherFailed(_) => "CRYPTO_CIPHER_FAILED",
            Self::BadPassword => "CRYPTO_BAD_PASSWORD",
            Self::Io(_) => "CRYPTO_IO_ERROR",
        }
    }
}

/// An error inside a transform chain, localized to the failing module.
#[derive(Debug, Error)]
#[error("Transform error at module #{index}: {kind}")]
pub struct TransformError {
    /// Zero-based index of the failing module within the chain.
    pub index: usize,
    /// What went wrong.
    pub kind: TransformErrorKind,
}

impl TransformError {
    /// Creates an error attributed to the module at `index`.
    pub fn new(index: usize, kind: TransformErrorKind) -> Self {
        Self { index, kind }
    }
}

/// The failure categories of a transform module.
#[derive(Debug, Error)]
pub enum TransformErrorKind {
    /// Input was written after `end()` closed the module.
    #[error("module input is closed")]
    InputClosed,
    /// The module received structurally invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The module was configured with invalid parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// An underlying cryptographic operation failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// Writing to the terminal sink failed.
    #[error("sink I/O error: {0}")]
    SinkIo(String),
}

impl ErrorCode for TransformError {
    fn code(&self) -> &'static str {
        match self.kind {
            TransformErrorKind::InputClosed => "TRANSFORM_INPUT_CLOSED",
            TransformErrorKind::InvalidInput(_) => "TRANSFORM_INVALID_INPUT",
            TransformErrorKind::InvalidConfiguration(_) => "TRANSFORM_INVALID_CONFIGURATION",
            TransformErrorKind::Crypto(_) => "TRANSFORM_CRYPTO_ERROR",
            TransformErrorKind::SinkIo(_) => "TRANSFORM_SINK_IO",
        }
    }
}

/// Validation failure taxonomy shared by policies, fetchers, and the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum ValidationErrorCode {
    NoError = 0,
    InvalidSignature = 1,
    MalformedSignature = 2,
    InvalidKeyLocator = 3,
    PolicyError = 4,
    ExpiredCert = 5,
    MalformedCert = 6,
    CannotRetrieveCert = 7,
    CachedCert = 8,
    LoopDetected = 9,
    ExceededDepthLimit = 10,
    ImplementationError = 11,
}

impl std::fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoError => "NO_ERROR",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::MalformedSignature => "MALFORMED_SIGNATURE",
            Self::InvalidKeyLocator => "INVALID_KEY_LOCATOR",
            Self::PolicyError => "POLICY_ERROR",
            Self::ExpiredCert => "EXPIRED_CERT",
            Self::MalformedCert => "MALFORMED_CERT",
            Self::CannotRetrieveCert => "CANNOT_RETRIEVE_CERT",
            Self::CachedCert => "CACHED_CERT",
            Self::LoopDetected => "LOOP_DETECTED",
            Self::ExceededDepthLimit => "EXCEEDED_DEPTH_LIMIT",
            Self::ImplementationError => "IMPLEMENTATION_ERROR",
        })
    }
}

/// A terminal validation failure: a code, a message, and optionally the
/// name of the violating packet or certificate.
#[derive(Debug, Clone, Error)]
pub struct ValidationError {
    /// The taxonomy code.
    pub code: ValidationErrorCode,
    /// Human-readable detail.
    pub message: String,
    /// Name of the violating packet or certificate, when known.
    pub name: Option<Name>,
}

impl ValidationError {
    /// Creates an error with the given code and message.
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            name: None,
        }
    }

    /// Attaches the name of the violating packet or certificate.
    pub fn with_name(mut self, name: Name) -> Self {
        self.name = Some(name);
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self.code {
            ValidationErrorCode::NoError => "VALIDATION_NO_ERROR",
            ValidationErrorCode::InvalidSignature => "VALIDATION_INVALID_SIGNATURE",
            ValidationErrorCode::MalformedSignature => "VALIDATION_MALFORMED_SIGNATURE",
            ValidationErrorCode::InvalidKeyLocator => "VALIDATION_INVALID_KEY_LOCATOR",
            ValidationErrorCode::PolicyError => "VALIDATION_POLICY_ERROR",
            ValidationErrorCode::ExpiredCert => "VALIDATION_EXPIRED_CERT",
            ValidationErrorCode::MalformedCert => "VALIDATION_MALFORMED_CERT",
            ValidationErrorCode::CannotRetrieveCert => "VALIDATION_CANNOT_RETRIEVE_CERT",
            ValidationErrorCode::CachedCert => "VALIDATION_CACHED_CERT",
            ValidationErrorCode::LoopDetected => "VALIDATION_LOOP_DETECTED",
            ValidationErrorCode::ExceededDepthLimit => "VALIDATION_EXCEEDED_DEPTH_LIMIT",
            ValidationErrorCode::ImplementationError => "VALIDATION_IMPLEMENTATION_ERROR",
        }
    }
}

/// Reason attached to a network-layer or producer-generated Nack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NackReason {
    Congestion,
    Duplicate,
    NoRoute,
    Unspecified,
}

impl std::fmt::Display for NackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Congestion => "Congestion",
            Self::Duplicate => "Duplicate",
            Self::NoRoute => "NoRoute",
            Self::Unspecified => "Unspecified",
        })
    }
}

/// Errors surfaced by the Face I/O collaborator.
#[derive(Debug, Clone, Error)]
pub enum FaceError {
    /// The Interest lifetime elapsed without a response.
    #[error("Interest timed out")]
    Timeout,
    /// A Nack was received for the expressed Interest.
    #[error("Nack received: {0}")]
    Nack(NackReason),
    /// The face has been shut down.
    #[error("Face is closed")]
    Closed,
    /// A transport-level failure.
    #[error("Transport error: {0}")]
    Transport(String),
    /// Prefix registration was refused by the forwarder.
    #[error("Prefix registration failed: {0}")]
    RegistrationFailed(String),
}

impl ErrorCode for FaceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "FACE_TIMEOUT",
            Self::Nack(_) => "FACE_NACK",
            Self::Closed => "FACE_CLOSED",
            Self::Transport(_) => "FACE_TRANSPORT_ERROR",
            Self::RegistrationFailed(_) => "FACE_REGISTRATION_FAILED",
        }
    }
}

/// Errors raised by the management dispatcher and its contexts.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A new top-level prefix overlaps an existing one.
    #[error("Top-level prefix {0} overlaps an existing top-level prefix")]
    TopPrefixOverlap(Name),
    /// A relPrefix overlaps an existing relPrefix.
    #[error("Relative prefix {0} overlaps an existing relative prefix")]
    RelPrefixOverlap(Name),
    /// A handler was registered after the first top-level prefix was added.
    #[error("Cannot register handlers after a top-level prefix has been added")]
    TopPrefixPresent,
    /// A dataset context method was invoked in the wrong state.
    #[error("Invalid dataset context transition: {0}")]
    InvalidContextState(&'static str),
    /// The dataset prefix violates its structural requirements.
    #[error("Invalid dataset prefix: {0}")]
    InvalidDatasetPrefix(String),
    /// Prefix registration through the face failed.
    #[error(transparent)]
    Face(#[from] FaceError),
    /// Signing an outgoing packet failed.
    #[error("Failed to sign outgoing Data: {0}")]
    Signing(#[from] CryptoError),
}

impl ErrorCode for DispatchError {
    fn code(&self) -> &'static str {
        match self {
            Self::TopPrefixOverlap(_) => "DISPATCH_TOP_PREFIX_OVERLAP",
            Self::RelPrefixOverlap(_) => "DISPATCH_REL_PREFIX_OVERLAP",
            Self::TopPrefixPresent => "DISPATCH_TOP_PREFIX_PRESENT",
            Self::InvalidContextState(_) => "DISPATCH_INVALID_CONTEXT_STATE",
            Self::InvalidDatasetPrefix(_) => "DISPATCH_INVALID_DATASET_PREFIX",
            Self::Face(_) => "DISPATCH_FACE_ERROR",
            Self::Signing(_) => "DISPATCH_SIGNING_FAILED",
        }
    }
}

/// Errors raised while loading a declarative validator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not syntactically valid.
    #[error("Config syntax error at line {line}: {message}")]
    Syntax {
        /// One-based line number of the offending token.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// A section or property is missing or has an invalid value.
    #[error("Invalid config: {0}")]
    Invalid(String),
    /// A referenced anchor file could not be read or parsed.
    #[error("Cannot load trust anchor from {path}: {message}")]
    AnchorLoad {
        /// Path of the anchor file or directory.
        path: String,
        /// What went wrong.
        message: String,
    },
    /// An NDN regex pattern failed to compile.
    #[error("Invalid NDN regex `{pattern}`: {message}")]
    Regex {
        /// The offending pattern.
        pattern: String,
        /// What went wrong.
        message: String,
    },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "CONFIG_SYNTAX_ERROR",
            Self::Invalid(_) => "CONFIG_INVALID",
            Self::AnchorLoad { .. } => "CONFIG_ANCHOR_LOAD_FAILED",
            Self::Regex { .. } => "CONFIG_INVALID_REGEX",
        }
    }
}
