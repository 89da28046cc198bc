// Path: crates/security/src/state.rs
//! Per-validation state.
//!
//! One `ValidationState` lives for the duration of one `validate` call.
//! It tracks the original packet, the signed-Interest format tag, the
//! recursion depth, the set of certificate names already requested on
//! this chain (loop prevention), and a pending-mutation list of effects
//! that run only if the whole validation succeeds — the replay guards use
//! it to insert their records on final success only.

use ndn_types::{Certificate, Data, Interest, Name, SignedInterestFormat};
use std::collections::HashSet;

/// The packet a validation was started for.
#[derive(Debug, Clone)]
pub enum OriginalPacket {
    /// A Data packet.
    Data(Data),
    /// A (signed) Interest.
    Interest(Interest),
}

/// Mutable state threaded through one validation call.
pub struct ValidationState {
    packet: OriginalPacket,
    format_tag: Option<SignedInterestFormat>,
    depth: usize,
    requested: HashSet<Name>,
    chain: Vec<Certificate>,
    success_hooks: Vec<Box<dyn FnOnce() + Send>>,
}

impl ValidationState {
    /// Creates state for a Data validation.
    pub fn for_data(data: Data) -> Self {
        Self {
            packet: OriginalPacket::Data(data),
            format_tag: None,
            depth: 0,
            requested: HashSet::new(),
            chain: Vec::new(),
            success_hooks: Vec::new(),
        }
    }

    /// Creates state for an Interest validation, tagging the detected
    /// signed-Interest format.
    pub fn for_interest(interest: Interest) -> Self {
        let format_tag = interest.detect_signed_format();
        Self {
            packet: OriginalPacket::Interest(interest),
            format_tag,
            depth: 0,
            requested: HashSet::new(),
            chain: Vec::new(),
            success_hooks: Vec::new(),
        }
    }

    /// The packet under validation.
    pub fn packet(&self) -> &OriginalPacket {
        &self.packet
    }

    /// The signed-Interest format tag, set for Interest validations.
    pub fn format_tag(&self) -> Option<SignedInterestFormat> {
        self.format_tag
    }

    /// Overrides the format tag.
    pub fn set_format_tag(&mut self, tag: SignedInterestFormat) {
        self.format_tag = Some(tag);
    }

    /// Current certificate-chain recursion depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Increments the recursion depth.
    pub fn increment_depth(&mut self) {
        self.depth += 1;
    }

    /// Records that the certificate under `name` has been requested on
    /// this chain. Returns `false` when it was already requested — a loop.
    pub fn mark_requested(&mut self, name: &Name) -> bool {
        self.requested.insert(name.clone())
    }

    /// Appends a validated link to the in-flight chain.
    pub fn push_chain(&mut self, certificate: Certificate) {
        self.chain.push(certificate);
    }

    /// The certificate chain accumulated so far, leaf first.
    pub fn chain(&self) -> &[Certificate] {
        &self.chain
    }

    /// Defers an effect until the whole validation succeeds.
    pub fn defer_on_success(&mut self, hook: Box<dyn FnOnce() + Send>) {
        self.success_hooks.push(hook);
    }

    /// Runs the deferred effects; called by the validator on terminal
    /// success only.
    pub fn run_success_hooks(&mut self) {
        for hook in self.success_hooks.drain(..) {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_types::Name;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn requested_names_detect_loops() {
        let mut state =
            ValidationState::for_data(Data::new(Name::from_uri("/x").unwrap()));
        let name = Name::from_uri("/k1/KEY/%01").unwrap();
        assert!(state.mark_requested(&name));
        assert!(!state.mark_requested(&name));
    }

    #[test]
    fn success_hooks_run_once_on_demand() {
        let mut state =
            ValidationState::for_data(Data::new(Name::from_uri("/x").unwrap()));
        let counter = Arc::new(AtomicUsize::new(0));
        let hook_counter = counter.clone();
        state.defer_on_success(Box::new(move || {
            hook_counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        state.run_success_hooks();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        state.run_success_hooks();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
