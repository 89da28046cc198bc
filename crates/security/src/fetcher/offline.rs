// Path: crates/security/src/fetcher/offline.rs
//! The offline strategy: never fetches.

use super::CertificateFetcher;
use crate::request::CertificateRequest;
use async_trait::async_trait;
use ndn_types::error::{ValidationError, ValidationErrorCode};
use ndn_types::Certificate;

/// Fails every fetch. Validation then relies entirely on anchors and
/// caches.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

#[async_trait]
impl CertificateFetcher for OfflineFetcher {
    async fn fetch(&self, request: &CertificateRequest) -> Result<Certificate, ValidationError> {
        Err(ValidationError::new(
            ValidationErrorCode::CannotRetrieveCert,
            format!("cannot fetch `{}` in offline mode", request.name()),
        )
        .with_name(request.name().clone()))
    }
}
