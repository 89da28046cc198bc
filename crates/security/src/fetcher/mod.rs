// Path: crates/security/src/fetcher/mod.rs
//! Certificate fetching strategies.

pub mod network;
pub mod offline;

pub use network::NetworkFetcher;
pub use offline::OfflineFetcher;

use crate::request::CertificateRequest;
use async_trait::async_trait;
use ndn_types::error::ValidationError;
use ndn_types::Certificate;

/// Resolves a certificate request, by whatever means the strategy has.
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    /// Fetches the certificate named by `request`.
    async fn fetch(&self, request: &CertificateRequest) -> Result<Certificate, ValidationError>;
}
