// Path: crates/security/src/policy/mod.rs
//! The validation policy framework.
//!
//! A policy inspects a packet and exits in exactly one of three ways:
//! `Err(ValidationError)` (terminal reject), `Ok(None)` (accept, no
//! further certificate needed), or `Ok(Some(request))` (fetch that
//! certificate and re-enter). Policies stack: a composite policy holds an
//! inner policy and delegates explicitly; `set_inner_policy` appends at
//! the bottom of the chain.

pub mod accept_all;
pub mod command_interest;
pub mod config;
pub mod signed_interest;
pub mod simple_hierarchy;

pub use accept_all::AcceptAllPolicy;
pub use command_interest::{CommandInterestOptions, CommandInterestPolicy};
pub use config::ConfigPolicy;
pub use signed_interest::{SignedInterestOptions, SignedInterestPolicy};
pub use simple_hierarchy::SimpleHierarchyPolicy;

use crate::request::CertificateRequest;
use crate::state::ValidationState;
use ndn_types::error::{ValidationError, ValidationErrorCode};
use ndn_types::{
    Certificate, Data, Interest, KeyLocator, Name, SignatureInfo, SignedInterestFormat,
};

/// What a policy decided: `None` accepts outright, `Some` demands a
/// certificate.
pub type PolicyAction = Option<CertificateRequest>;

/// A validation policy over Data packets, Interests, and certificates.
pub trait ValidationPolicy: Send + Sync {
    /// Checks a Data packet against the policy.
    fn check_data(
        &self,
        data: &Data,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError>;

    /// Checks an Interest against the policy.
    fn check_interest(
        &self,
        interest: &Interest,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError>;

    /// Checks a certificate against the policy. Defaults to the Data
    /// check, certificates being Data packets.
    fn check_certificate(
        &self,
        certificate: &Certificate,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        self.check_data(certificate.as_data(), state)
    }

    /// Appends `inner` at the bottom of this policy's chain.
    ///
    /// Policies without an inner slot reject the call.
    fn set_inner_policy(
        &mut self,
        inner: Box<dyn ValidationPolicy>,
    ) -> Result<(), ValidationError> {
        let _ = inner;
        Err(ValidationError::new(
            ValidationErrorCode::ImplementationError,
            "policy does not accept an inner policy",
        ))
    }
}

/// Extracts the SignatureInfo of a signed Interest according to the
/// format tag on `state`.
pub fn get_signature_info(
    interest: &Interest,
    state: &ValidationState,
) -> Result<SignatureInfo, ValidationError> {
    match state.format_tag() {
        Some(SignedInterestFormat::V03) => interest
            .signature_info()
            .cloned()
            .ok_or_else(|| malformed(interest, "missing InterestSignatureInfo")),
        Some(SignedInterestFormat::V02) => interest
            .v02_signature_info()
            .map_err(|e| malformed(interest, &e.to_string())),
        None => Err(malformed(interest, "Interest is not signed")),
    }
}

fn malformed(interest: &Interest, detail: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorCode::MalformedSignature,
        format!("Signed Interest `{}`: {detail}", interest.name()),
    )
    .with_name(interest.name().clone())
}

/// Extracts the KeyLocator name; every signed packet this kernel accepts
/// must locate its key by Name.
pub fn get_key_locator_name(
    sig_info: &SignatureInfo,
    subject: &Name,
) -> Result<Name, ValidationError> {
    match sig_info.key_locator() {
        Some(KeyLocator::Name(name)) => Ok(name.clone()),
        Some(KeyLocator::KeyDigest(_)) => Err(ValidationError::new(
            ValidationErrorCode::InvalidKeyLocator,
            format!("KeyLocator of `{subject}` is not a Name"),
        )
        .with_name(subject.clone())),
        None => Err(ValidationError::new(
            ValidationErrorCode::InvalidKeyLocator,
            format!("`{subject}` lacks a KeyLocator"),
        )
        .with_name(subject.clone())),
    }
}

/// Extracts the identity prefix from a key, certificate, or identity name
/// found in a KeyLocator.
pub fn extract_identity_from_key_locator(locator: &Name) -> Name {
    use ndn_types::certificate as cert;
    if cert::is_valid_certificate_name(locator) {
        return locator.get_prefix(cert::KEY_COMPONENT_OFFSET);
    }
    // Key name: /<identity>/KEY/<keyId>
    let key_marker = cert::key_component();
    if locator.len() >= 2 && locator.get(-2) == Some(&key_marker) {
        return locator.get_prefix(-2);
    }
    locator.clone()
}
