// Path: crates/security/src/fetcher/network.rs
//! The network strategy: express an Interest for the certificate, with
//! retries on Nack and timeout.

use super::CertificateFetcher;
use crate::request::CertificateRequest;
use async_trait::async_trait;
use ndn_api::face::Face;
use ndn_types::error::{FaceError, ValidationError, ValidationErrorCode};
use ndn_types::{Certificate, Interest};
use std::sync::Arc;
use std::time::Duration;

/// Fetches certificates over a face.
pub struct NetworkFetcher {
    face: Arc<dyn Face>,
    interest_lifetime: Option<Duration>,
}

impl NetworkFetcher {
    /// Creates a fetcher expressing Interests on `face`.
    pub fn new(face: Arc<dyn Face>) -> Self {
        Self {
            face,
            interest_lifetime: None,
        }
    }

    /// Overrides the lifetime of every fetch Interest.
    pub fn with_interest_lifetime(mut self, lifetime: Duration) -> Self {
        self.interest_lifetime = Some(lifetime);
        self
    }
}

#[async_trait]
impl CertificateFetcher for NetworkFetcher {
    async fn fetch(&self, request: &CertificateRequest) -> Result<Certificate, ValidationError> {
        let mut interest: Interest = request.interest.clone();
        if let Some(lifetime) = self.interest_lifetime {
            interest.set_lifetime(lifetime);
        }
        let name = interest.name().clone();

        let mut attempts_left = request.retries_left + 1;
        while attempts_left > 0 {
            attempts_left -= 1;
            match self.face.express_interest(&interest).await {
                Ok(data) => {
                    // Zero freshness is acceptable in a stored certificate
                    // but not in one served from the network.
                    if data.freshness_period().unwrap_or(Duration::ZERO) == Duration::ZERO {
                        return Err(ValidationError::new(
                            ValidationErrorCode::MalformedCert,
                            format!("fetched certificate `{}` is not fresh", data.name()),
                        )
                        .with_name(data.name().clone()));
                    }
                    return Certificate::from_data(data).map_err(|e| {
                        ValidationError::new(
                            ValidationErrorCode::MalformedCert,
                            format!("fetched packet is not a certificate: {e}"),
                        )
                        .with_name(name.clone())
                    });
                }
                Err(FaceError::Timeout) | Err(FaceError::Nack(_)) => {
                    tracing::debug!(
                        name = %name,
                        attempts_left,
                        "certificate fetch attempt failed, retrying"
                    );
                }
                Err(e) => {
                    return Err(ValidationError::new(
                        ValidationErrorCode::CannotRetrieveCert,
                        format!("face error while fetching `{name}`: {e}"),
                    )
                    .with_name(name));
                }
            }
        }
        Err(ValidationError::new(
            ValidationErrorCode::CannotRetrieveCert,
            format!("retries exhausted fetching `{name}`"),
        )
        .with_name(name))
    }
}
