// Path: crates/security/src/request.rs
//! The certificate request a policy emits when it needs a further
//! certificate to continue validation.

use ndn_types::{Interest, Name};
use std::time::Duration;

/// Default number of fetch attempts for one certificate.
pub const DEFAULT_RETRIES: u32 = 3;

/// A request to retrieve the certificate under a name prefix.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    /// The Interest to express: certificate name prefix, CanBePrefix and
    /// MustBeFresh set.
    pub interest: Interest,
    /// Remaining retry budget after Nacks and timeouts.
    pub retries_left: u32,
}

impl CertificateRequest {
    /// Builds a request for the certificate under `name`.
    pub fn new(name: Name) -> Self {
        let mut interest = Interest::new(name);
        interest.set_can_be_prefix(true).set_must_be_fresh(true);
        Self {
            interest,
            retries_left: DEFAULT_RETRIES,
        }
    }

    /// Overrides the fetch Interest lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.interest.set_lifetime(lifetime);
        self
    }

    /// Attaches caller-requested forwarding hints to the fetch Interest.
    pub fn with_forwarding_hint(mut self, hint: Vec<Name>) -> Self {
        self.interest.set_forwarding_hint(hint);
        self
    }

    /// The requested certificate name prefix.
    pub fn name(&self) -> &Name {
        self.interest.name()
    }
}
