// Path: crates/security/src/cache.rs
//! A TTL-indexed certificate cache.
//!
//! The validator keeps two instances: a trusted cache for certificates
//! whose chains validated (long TTL) and an untrusted cache quarantining
//! fetched certificates that failed, so immediate retries do not hammer
//! the network.

use ndn_api::time::{Clock, SystemClock};
use ndn_types::{Certificate, Name};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default time-to-live of the trusted certificate cache.
pub const DEFAULT_TRUSTED_TTL: Duration = Duration::from_secs(3600);
/// Default time-to-live of the untrusted certificate cache.
pub const DEFAULT_UNTRUSTED_TTL: Duration = Duration::from_secs(300);

struct Entry {
    certificate: Certificate,
    expires_at: Duration,
}

/// A keyed set of certificates with freshness eviction.
pub struct CertificateCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<Vec<Entry>>,
}

impl CertificateCache {
    /// Creates a cache with the given TTL and the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with the given TTL and clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Stores `certificate` with the current insertion timestamp.
    pub fn insert(&self, certificate: Certificate) {
        let expires_at = self.clock.steady_now() + self.ttl;
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        tracing::debug!(name = %certificate.name(), "caching certificate");
        entries.push(Entry {
            certificate,
            expires_at,
        });
    }

    /// Returns the most recently inserted, unexpired certificate whose
    /// name has `prefix` as a prefix. Expired entries are purged.
    pub fn find(&self, prefix: &Name) -> Option<Certificate> {
        let now = self.clock.steady_now();
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        entries.retain(|entry| entry.expires_at > now);
        entries
            .iter()
            .rev()
            .find(|entry| prefix.is_prefix_of(entry.certificate.name()))
            .map(|entry| entry.certificate.clone())
    }

    /// Drops every entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        let now = self.clock.steady_now();
        self.entries
            .lock()
            .map(|entries| entries.iter().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    /// True when the cache holds no unexpired entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_types::tlv::content_type;
    use ndn_types::{Data, KeyLocator, SignatureInfo, SignatureType, ValidityPeriod};

    fn make_cert(name: &str) -> Certificate {
        let mut data = Data::new(Name::from_uri(name).unwrap());
        data.set_content_type(content_type::KEY)
            .set_freshness_period(Some(Duration::from_secs(3600)))
            .set_content(vec![0x30, 0x01, 0x02])
            .set_signature_info(
                SignatureInfo::new(SignatureType::Sha256WithEcdsa)
                    .with_key_locator(KeyLocator::Name(Name::from_uri("/i/KEY/x").unwrap()))
                    .with_validity_period(ValidityPeriod::new(
                        chrono::Utc::now() - chrono::Duration::days(1),
                        chrono::Utc::now() + chrono::Duration::days(1),
                    )),
            )
            .set_signature_value(vec![0; 32]);
        Certificate::from_data(data).unwrap()
    }

    #[test]
    fn find_by_prefix_prefers_most_recent() {
        let cache = CertificateCache::new(Duration::from_secs(60));
        cache.insert(make_cert("/app/KEY/%01/self/v=1"));
        cache.insert(make_cert("/app/KEY/%01/self/v=2"));

        let found = cache
            .find(&Name::from_uri("/app/KEY/%01").unwrap())
            .unwrap();
        assert_eq!(found.name(), &Name::from_uri("/app/KEY/%01/self/v=2").unwrap());
        assert!(cache.find(&Name::from_uri("/other").unwrap()).is_none());
    }

    #[test]
    fn clear_empties_cache() {
        let cache = CertificateCache::new(Duration::from_secs(60));
        cache.insert(make_cert("/app/KEY/%01/self/v=1"));
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
