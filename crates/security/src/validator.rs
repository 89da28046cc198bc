// Path: crates/security/src/validator.rs
//! The validator core.
//!
//! Orchestrates policy → fetch → verify recursion. A policy decision
//! either accepts a packet, rejects it, or names the certificate needed
//! next; the validator resolves that certificate from trust anchors, the
//! trusted cache, the untrusted cache, or the fetcher, validates the
//! certificate's own chain by re-entering the policy, and finally
//! verifies the original packet's signature under the resolved
//! certificate. Certificates whose chains validate are promoted to the
//! trusted cache; fetched certificates that fail are quarantined in the
//! untrusted cache.

use crate::anchors::TrustAnchorContainer;
use crate::cache::{CertificateCache, DEFAULT_TRUSTED_TTL, DEFAULT_UNTRUSTED_TTL};
use crate::fetcher::CertificateFetcher;
use crate::policy::ValidationPolicy;
use crate::request::CertificateRequest;
use crate::state::ValidationState;
use futures::future::BoxFuture;
use futures::FutureExt;
use ndn_api::time::{Clock, SystemClock};
use ndn_crypto::verification;
use ndn_types::error::{ValidationError, ValidationErrorCode};
use ndn_types::{Certificate, Data, Interest, SignatureType, SignedInterestFormat};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default limit on certificate-chain depth.
pub const DEFAULT_MAX_DEPTH: usize = 25;

/// The packet validation engine.
pub struct Validator {
    policy: Box<dyn ValidationPolicy>,
    fetcher: Box<dyn CertificateFetcher>,
    anchors: TrustAnchorContainer,
    verified_certs: CertificateCache,
    unverified_certs: CertificateCache,
    max_depth: usize,
    clock: Arc<dyn Clock>,
}

impl Validator {
    /// Creates a validator with the system clock.
    pub fn new(policy: Box<dyn ValidationPolicy>, fetcher: Box<dyn CertificateFetcher>) -> Self {
        Self::with_clock(policy, fetcher, Arc::new(SystemClock))
    }

    /// Creates a validator with an explicit clock (used by tests).
    pub fn with_clock(
        policy: Box<dyn ValidationPolicy>,
        fetcher: Box<dyn CertificateFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            policy,
            fetcher,
            anchors: TrustAnchorContainer::with_clock(Arc::clone(&clock)),
            verified_certs: CertificateCache::with_clock(DEFAULT_TRUSTED_TTL, Arc::clone(&clock)),
            unverified_certs: CertificateCache::with_clock(
                DEFAULT_UNTRUSTED_TTL,
                Arc::clone(&clock),
            ),
            max_depth: DEFAULT_MAX_DEPTH,
            clock,
        }
    }

    /// The configured chain-depth limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Sets the chain-depth limit.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Adds a static trust anchor.
    pub fn load_anchor(&self, certificate: Certificate) {
        self.anchors.insert(certificate);
    }

    /// Adds a trust anchor directory, rescanned at `refresh` cadence.
    pub fn load_anchor_dir(&self, path: PathBuf, refresh: Option<Duration>) {
        self.anchors.insert_dir(path, refresh);
    }

    /// The trust anchor container.
    pub fn anchors(&self) -> &TrustAnchorContainer {
        &self.anchors
    }

    /// Removes every trust anchor.
    pub fn reset_anchors(&self) {
        self.anchors.clear();
    }

    /// Empties the trusted certificate cache; subsequent validations must
    /// refetch intermediate certificates.
    pub fn reset_verified_certificates(&self) {
        self.verified_certs.clear();
    }

    /// Validates a Data packet. The returned future resolves exactly once
    /// with success or the first failure.
    pub async fn validate_data(&self, data: &Data) -> Result<(), ValidationError> {
        let mut state = ValidationState::for_data(data.clone());
        let action = self.policy.check_data(data, &mut state)?;
        match action {
            None => self.verify_unkeyed_data(data)?,
            Some(request) => {
                let certificate = self.request_certificate(request, &mut state).await?;
                if !verification::verify_data_with_certificate(data, &certificate) {
                    return Err(ValidationError::new(
                        ValidationErrorCode::InvalidSignature,
                        format!("signature of `{}` does not verify", data.name()),
                    )
                    .with_name(data.name().clone()));
                }
            }
        }
        state.run_success_hooks();
        tracing::debug!(name = %data.name(), "data validated");
        Ok(())
    }

    /// Validates a (signed) Interest.
    pub async fn validate_interest(&self, interest: &Interest) -> Result<(), ValidationError> {
        let mut state = ValidationState::for_interest(interest.clone());
        let format = state.format_tag();
        let action = self.policy.check_interest(interest, &mut state)?;
        match action {
            None => self.verify_unkeyed_interest(interest, format)?,
            Some(request) => {
                let format = format.ok_or_else(|| {
                    ValidationError::new(
                        ValidationErrorCode::MalformedSignature,
                        format!("`{}` is not a signed Interest", interest.name()),
                    )
                })?;
                let certificate = self.request_certificate(request, &mut state).await?;
                if !verification::verify_interest_with_certificate(interest, &certificate, format)
                {
                    return Err(ValidationError::new(
                        ValidationErrorCode::InvalidSignature,
                        format!("signature of `{}` does not verify", interest.name()),
                    )
                    .with_name(interest.name().clone()));
                }
            }
        }
        state.run_success_hooks();
        tracing::debug!(name = %interest.name(), "interest validated");
        Ok(())
    }

    // A policy that accepts without naming a certificate owns the
    // decision; only DigestSha256 packets still get their digest checked.
    fn verify_unkeyed_data(&self, data: &Data) -> Result<(), ValidationError> {
        let is_digest = data
            .signature_info()
            .map(|info| info.sig_type() == SignatureType::DigestSha256)
            .unwrap_or(false);
        if is_digest && !verification::verify_data_digest(data) {
            return Err(ValidationError::new(
                ValidationErrorCode::InvalidSignature,
                format!("digest of `{}` does not verify", data.name()),
            )
            .with_name(data.name().clone()));
        }
        Ok(())
    }

    fn verify_unkeyed_interest(
        &self,
        interest: &Interest,
        format: Option<SignedInterestFormat>,
    ) -> Result<(), ValidationError> {
        let is_digest = format == Some(SignedInterestFormat::V03)
            && interest
                .signature_info()
                .map(|info| info.sig_type() == SignatureType::DigestSha256)
                .unwrap_or(false);
        if is_digest {
            let ok = interest
                .signed_portion(SignedInterestFormat::V03)
                .map(|portion| {
                    interest.signature_value()
                        == Some(ndn_crypto::digest::sha256(&portion).as_slice())
                })
                .unwrap_or(false);
            if !ok {
                return Err(ValidationError::new(
                    ValidationErrorCode::InvalidSignature,
                    format!("digest of `{}` does not verify", interest.name()),
                )
                .with_name(interest.name().clone()));
            }
        }
        Ok(())
    }

    /// Resolves a certificate request: anchors, then caches, then the
    /// fetcher; a fetched certificate has its own chain validated before
    /// it is returned and promoted to the trusted cache.
    fn request_certificate<'a>(
        &'a self,
        request: CertificateRequest,
        state: &'a mut ValidationState,
    ) -> BoxFuture<'a, Result<Certificate, ValidationError>> {
        async move {
            let name = request.name().clone();

            if state.depth() >= self.max_depth {
                return Err(ValidationError::new(
                    ValidationErrorCode::ExceededDepthLimit,
                    format!("certificate chain longer than {}", self.max_depth),
                )
                .with_name(name));
            }
            if !state.mark_requested(&name) {
                return Err(ValidationError::new(
                    ValidationErrorCode::LoopDetected,
                    format!("certificate `{name}` already on the in-flight chain"),
                )
                .with_name(name));
            }
            state.increment_depth();

            if let Some(anchor) = self.anchors.find(&name) {
                tracing::debug!(name = %name, "resolved from trust anchors");
                return Ok(anchor);
            }
            if let Some(certificate) = self.verified_certs.find(&name) {
                tracing::debug!(name = %name, "resolved from trusted cache");
                return Ok(certificate);
            }

            let candidate = match self.unverified_certs.find(&name) {
                Some(certificate) => certificate,
                None => self.fetcher.fetch(&request).await?,
            };

            match self.validate_candidate(&candidate, state).await {
                Ok(()) => {
                    self.verified_certs.insert(candidate.clone());
                    Ok(candidate)
                }
                Err(e) => {
                    // Quarantine so immediate retries do not refetch.
                    self.unverified_certs.insert(candidate);
                    Err(e)
                }
            }
        }
        .boxed()
    }

    async fn validate_candidate(
        &self,
        candidate: &Certificate,
        state: &mut ValidationState,
    ) -> Result<(), ValidationError> {
        if !candidate.is_valid(self.clock.system_now()) {
            return Err(ValidationError::new(
                ValidationErrorCode::ExpiredCert,
                format!("certificate `{}` is outside its validity period", candidate.name()),
            )
            .with_name(candidate.name().clone()));
        }
        state.push_chain(candidate.clone());
        let action = self.policy.check_certificate(candidate, state)?;
        match action {
            // The policy accepted the certificate outright (e.g. bypass).
            None => Ok(()),
            Some(next) => {
                let issuer = self.request_certificate(next, state).await?;
                if !verification::verify_data_with_certificate(candidate.as_data(), &issuer) {
                    return Err(ValidationError::new(
                        ValidationErrorCode::InvalidSignature,
                        format!("chain link `{}` does not verify", candidate.name()),
                    )
                    .with_name(candidate.name().clone()));
                }
                Ok(())
            }
        }
    }
}
