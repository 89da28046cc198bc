// Path: crates/security/src/policy/accept_all.rs
//! A policy that accepts every packet without key verification.

use super::{PolicyAction, ValidationPolicy};
use crate::state::ValidationState;
use ndn_types::error::ValidationError;
use ndn_types::{Data, Interest};

/// Accepts everything. Useful as the innermost policy of a guard chain
/// and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllPolicy;

impl ValidationPolicy for AcceptAllPolicy {
    fn check_data(
        &self,
        _data: &Data,
        _state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        Ok(None)
    }

    fn check_interest(
        &self,
        _interest: &Interest,
        _state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        Ok(None)
    }
}
