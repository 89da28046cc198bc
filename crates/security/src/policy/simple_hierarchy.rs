// Path: crates/security/src/policy/simple_hierarchy.rs
//! A policy requiring the signer's identity to be a prefix of the packet
//! name.

use super::{
    extract_identity_from_key_locator, get_key_locator_name, get_signature_info, PolicyAction,
    ValidationPolicy,
};
use crate::request::CertificateRequest;
use crate::state::ValidationState;
use ndn_types::error::{ValidationError, ValidationErrorCode};
use ndn_types::{Data, Interest};

/// Accepts a packet when the key-locator identity is an ancestor of the
/// packet name, and demands that signer's certificate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleHierarchyPolicy;

impl SimpleHierarchyPolicy {
    fn check(
        &self,
        packet_name: &ndn_types::Name,
        locator: &ndn_types::Name,
    ) -> Result<PolicyAction, ValidationError> {
        let identity = extract_identity_from_key_locator(locator);
        if identity.is_prefix_of(packet_name) {
            Ok(Some(CertificateRequest::new(locator.clone())))
        } else {
            Err(ValidationError::new(
                ValidationErrorCode::PolicyError,
                format!("signer `{identity}` does not own prefix of `{packet_name}`"),
            )
            .with_name(packet_name.clone()))
        }
    }
}

impl ValidationPolicy for SimpleHierarchyPolicy {
    fn check_data(
        &self,
        data: &Data,
        _state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        let info = data.signature_info().ok_or_else(|| {
            ValidationError::new(
                ValidationErrorCode::MalformedSignature,
                format!("`{}` is not signed", data.name()),
            )
        })?;
        let locator = get_key_locator_name(info, data.name())?;
        self.check(data.name(), &locator)
    }

    fn check_interest(
        &self,
        interest: &Interest,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        let info = get_signature_info(interest, state)?;
        let locator = get_key_locator_name(&info, interest.name())?;
        self.check(interest.name(), &locator)
    }
}
