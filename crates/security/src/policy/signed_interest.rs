// Path: crates/security/src/policy/signed_interest.rs
//! Replay guard for v0.3 signed Interests.
//!
//! A strict superset of the command-Interest guard: timestamp
//! monotonicity, sequence-number monotonicity, and nonce uniqueness
//! against the last N observed nonces, each individually switchable.
//! Records are inserted on final validation success only.

use super::{get_key_locator_name, get_signature_info, PolicyAction, ValidationPolicy};
use crate::state::ValidationState;
use chrono::{DateTime, Utc};
use ndn_api::time::{Clock, SystemClock};
use ndn_types::error::{ValidationError, ValidationErrorCode};
use ndn_types::{Certificate, Data, Interest, Name, SignedInterestFormat};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Configuration of the signed-Interest guard.
#[derive(Debug, Clone, Copy)]
pub struct SignedInterestOptions {
    /// Enforce SignatureTime presence and monotonicity.
    pub should_validate_timestamps: bool,
    /// Enforce SignatureSeqNum presence and monotonicity.
    pub should_validate_seq_nums: bool,
    /// Enforce SignatureNonce presence and uniqueness.
    pub should_validate_nonces: bool,
    /// Maximum tolerated |now − SignatureTime|.
    pub timestamp_grace_period: Duration,
    /// Record cap: −1 unlimited, 0 disables record keeping, else the cap.
    pub max_record_count: i64,
    /// Per-key cap on remembered nonces: −1 unlimited, 0 disables.
    pub max_nonce_record_count: i64,
}

impl Default for SignedInterestOptions {
    fn default() -> Self {
        Self {
            should_validate_timestamps: true,
            should_validate_seq_nums: false,
            should_validate_nonces: true,
            timestamp_grace_period: Duration::from_secs(120),
            max_record_count: 1000,
            max_nonce_record_count: 1000,
        }
    }
}

struct InterestRecord {
    key_name: Name,
    timestamp: Option<DateTime<Utc>>,
    seq_num: Option<u64>,
    nonce_set: HashSet<Vec<u8>>,
    nonce_order: VecDeque<Vec<u8>>,
    last_refreshed: Duration,
}

struct RecordStore {
    // Refresh order: oldest-refreshed at the front.
    queue: VecDeque<InterestRecord>,
}

impl RecordStore {
    fn find(&self, key_name: &Name) -> Option<&InterestRecord> {
        self.queue.iter().find(|r| r.key_name == *key_name)
    }

    fn upsert(
        &mut self,
        key_name: Name,
        timestamp: Option<DateTime<Utc>>,
        seq_num: Option<u64>,
        nonce: Option<Vec<u8>>,
        now: Duration,
        options: &SignedInterestOptions,
    ) {
        let mut record = match self.queue.iter().position(|r| r.key_name == key_name) {
            Some(index) => match self.queue.remove(index) {
                Some(record) => record,
                None => return,
            },
            None => InterestRecord {
                key_name,
                timestamp: None,
                seq_num: None,
                nonce_set: HashSet::new(),
                nonce_order: VecDeque::new(),
                last_refreshed: now,
            },
        };
        record.last_refreshed = now;
        if timestamp.is_some() {
            record.timestamp = timestamp;
        }
        if seq_num.is_some() {
            record.seq_num = seq_num;
        }
        if options.should_validate_nonces && options.max_nonce_record_count != 0 {
            if let Some(nonce) = nonce {
                if record.nonce_set.insert(nonce.clone()) {
                    record.nonce_order.push_back(nonce);
                }
                if options.max_nonce_record_count >= 0 {
                    while record.nonce_order.len() > options.max_nonce_record_count as usize {
                        if let Some(evicted) = record.nonce_order.pop_front() {
                            record.nonce_set.remove(&evicted);
                        }
                    }
                }
            }
        }
        self.queue.push_back(record);

        if options.max_record_count >= 0 {
            while self.queue.len() > options.max_record_count as usize {
                self.queue.pop_front();
            }
        }
    }
}

/// The signed-Interest replay guard; checks apply to v0.3 Interests and
/// everything else is delegated to the inner policy.
pub struct SignedInterestPolicy {
    options: SignedInterestOptions,
    inner: Box<dyn ValidationPolicy>,
    clock: Arc<dyn Clock>,
    records: Arc<Mutex<RecordStore>>,
}

impl SignedInterestPolicy {
    /// Wraps `inner` with the default options.
    pub fn new(inner: Box<dyn ValidationPolicy>) -> Self {
        Self::with_options(inner, SignedInterestOptions::default())
    }

    /// Wraps `inner` with explicit options.
    pub fn with_options(inner: Box<dyn ValidationPolicy>, options: SignedInterestOptions) -> Self {
        Self::with_clock(inner, options, Arc::new(SystemClock))
    }

    /// Wraps `inner` with explicit options and clock.
    pub fn with_clock(
        inner: Box<dyn ValidationPolicy>,
        options: SignedInterestOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            options,
            inner,
            clock,
            records: Arc::new(Mutex::new(RecordStore {
                queue: VecDeque::new(),
            })),
        }
    }

    fn check_incoming(
        &self,
        interest: &Interest,
        state: &mut ValidationState,
    ) -> Result<(), ValidationError> {
        let sig_info = get_signature_info(interest, state)?;
        let key_name = get_key_locator_name(&sig_info, interest.name())?;
        let timestamp = sig_info.time();
        let seq_num = sig_info.seq_num();
        let nonce = sig_info.nonce().map(|n| n.to_vec());

        let policy_error = |message: String| {
            Err(ValidationError::new(ValidationErrorCode::PolicyError, message)
                .with_name(key_name.clone()))
        };

        let Ok(records) = self.records.lock() else {
            return Err(ValidationError::new(
                ValidationErrorCode::ImplementationError,
                "replay record store poisoned",
            ));
        };
        let record = records.find(&key_name);

        if self.options.should_validate_timestamps {
            let Some(timestamp) = timestamp else {
                return policy_error("Timestamp is required by policy but is not present".into());
            };
            let now = self.clock.system_now();
            let grace = chrono::Duration::from_std(self.options.timestamp_grace_period)
                .unwrap_or_else(|_| chrono::Duration::seconds(120));
            if timestamp < now - grace || timestamp > now + grace {
                return policy_error(format!(
                    "Timestamp is outside the grace period for key {key_name}"
                ));
            }
            if let Some(last) = record.and_then(|r| r.timestamp) {
                if timestamp <= last {
                    return policy_error(format!("Timestamp is reordered for key {key_name}"));
                }
            }
        }

        if self.options.should_validate_seq_nums {
            let Some(seq_num) = seq_num else {
                return policy_error(
                    "Sequence number is required by policy but is not present".into(),
                );
            };
            if let Some(last) = record.and_then(|r| r.seq_num) {
                if seq_num <= last {
                    return policy_error(format!(
                        "Sequence number is reordered for key {key_name}"
                    ));
                }
            }
        }

        if self.options.should_validate_nonces {
            let Some(nonce) = &nonce else {
                return policy_error("Nonce is required by policy but is not present".into());
            };
            if record.is_some_and(|r| r.nonce_set.contains(nonce)) {
                return policy_error(format!(
                    "Nonce matches previously-seen nonce for key {key_name}"
                ));
            }
        }
        drop(records);

        if self.options.max_record_count != 0 {
            let records = Arc::clone(&self.records);
            let clock = Arc::clone(&self.clock);
            let options = self.options;
            state.defer_on_success(Box::new(move || {
                if let Ok(mut records) = records.lock() {
                    records.upsert(
                        key_name,
                        timestamp,
                        seq_num,
                        nonce,
                        clock.steady_now(),
                        &options,
                    );
                }
            }));
        }
        Ok(())
    }
}

impl ValidationPolicy for SignedInterestPolicy {
    fn check_data(
        &self,
        data: &Data,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        self.inner.check_data(data, state)
    }

    fn check_interest(
        &self,
        interest: &Interest,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        if state.format_tag() == Some(SignedInterestFormat::V03) {
            self.check_incoming(interest, state)?;
        }
        self.inner.check_interest(interest, state)
    }

    fn check_certificate(
        &self,
        certificate: &Certificate,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        self.inner.check_certificate(certificate, state)
    }

    fn set_inner_policy(
        &mut self,
        inner: Box<dyn ValidationPolicy>,
    ) -> Result<(), ValidationError> {
        self.inner.set_inner_policy(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::AcceptAllPolicy;
    use ndn_types::{KeyLocator, SignatureInfo, SignatureType};

    fn interest_with(
        time: Option<DateTime<Utc>>,
        seq: Option<u64>,
        nonce: Option<Vec<u8>>,
    ) -> Interest {
        let mut interest = Interest::new(Name::from_uri("/app/CMD").unwrap());
        let mut info = SignatureInfo::new(SignatureType::Sha256WithEcdsa)
            .with_key_locator(KeyLocator::Name(Name::from_uri("/id/KEY/%01").unwrap()));
        info.set_time(time).set_seq_num(seq).set_nonce(nonce);
        interest.set_signature_info(info);
        interest.set_signature_value(vec![0; 32]);
        interest
    }

    fn check(
        policy: &SignedInterestPolicy,
        interest: &Interest,
    ) -> Result<PolicyAction, ValidationError> {
        let mut state = ValidationState::for_interest(interest.clone());
        let result = policy.check_interest(interest, &mut state);
        if result.is_ok() {
            state.run_success_hooks();
        }
        result
    }

    #[test]
    fn nonce_replay_is_rejected() {
        let policy = SignedInterestPolicy::new(Box::new(AcceptAllPolicy));
        let first = interest_with(Some(Utc::now()), None, Some(vec![1, 2, 3, 4]));
        assert!(check(&policy, &first).is_ok());

        let replay = interest_with(
            Some(Utc::now() + chrono::Duration::milliseconds(10)),
            None,
            Some(vec![1, 2, 3, 4]),
        );
        let err = check(&policy, &replay).unwrap_err();
        assert_eq!(err.code, ValidationErrorCode::PolicyError);

        let fresh = interest_with(
            Some(Utc::now() + chrono::Duration::milliseconds(20)),
            None,
            Some(vec![5, 6, 7, 8]),
        );
        assert!(check(&policy, &fresh).is_ok());
    }

    #[test]
    fn missing_required_fields_fail() {
        let policy = SignedInterestPolicy::new(Box::new(AcceptAllPolicy));
        // Missing timestamp.
        assert!(check(&policy, &interest_with(None, None, Some(vec![1]))).is_err());
        // Missing nonce.
        assert!(check(&policy, &interest_with(Some(Utc::now()), None, None)).is_err());
    }

    #[test]
    fn sequence_numbers_must_increase_when_enforced() {
        let options = SignedInterestOptions {
            should_validate_seq_nums: true,
            should_validate_nonces: false,
            ..SignedInterestOptions::default()
        };
        let policy = SignedInterestPolicy::with_options(Box::new(AcceptAllPolicy), options);

        let t0 = Utc::now();
        assert!(check(&policy, &interest_with(Some(t0), Some(5), None)).is_ok());
        let newer = t0 + chrono::Duration::milliseconds(5);
        assert!(check(&policy, &interest_with(Some(newer), Some(5), None)).is_err());
        let newest = t0 + chrono::Duration::milliseconds(10);
        assert!(check(&policy, &interest_with(Some(newest), Some(6), None)).is_ok());
    }

    #[test]
    fn nonce_window_evicts_oldest() {
        let options = SignedInterestOptions {
            should_validate_timestamps: false,
            max_nonce_record_count: 2,
            ..SignedInterestOptions::default()
        };
        let policy = SignedInterestPolicy::with_options(Box::new(AcceptAllPolicy), options);

        for nonce in [vec![1u8], vec![2], vec![3]] {
            assert!(check(&policy, &interest_with(None, None, Some(nonce))).is_ok());
        }
        // Nonce [1] has been evicted from the 2-deep window.
        assert!(check(&policy, &interest_with(None, None, Some(vec![1]))).is_ok());
        // Nonce [3] is still in the window.
        assert!(check(&policy, &interest_with(None, None, Some(vec![3]))).is_err());
    }

    #[test]
    fn v02_interests_bypass_v03_checks() {
        let policy = SignedInterestPolicy::new(Box::new(AcceptAllPolicy));
        let info = SignatureInfo::new(SignatureType::Sha256WithEcdsa)
            .with_key_locator(KeyLocator::Name(Name::from_uri("/id/KEY/%01").unwrap()));
        let name = Name::from_uri("/app/CMD")
            .unwrap()
            .append(ndn_types::Component::number(1))
            .append(ndn_types::Component::generic(vec![0; 8]))
            .append(ndn_types::Component::generic(
                info.to_block(ndn_types::tlv::number::SIGNATURE_INFO).encode(),
            ))
            .append(ndn_types::Component::generic(
                ndn_types::Block::new(ndn_types::tlv::number::SIGNATURE_VALUE, vec![0; 32])
                    .encode(),
            ));
        let interest = Interest::new(name);
        assert!(check(&policy, &interest).is_ok());
    }
}
