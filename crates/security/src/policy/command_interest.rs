// Path: crates/security/src/policy/command_interest.rs
//! Replay guard for command Interests.
//!
//! Tracks the last accepted timestamp per signing key. The record is
//! inserted only when the whole validation succeeds, via the state's
//! pending-mutation list, so a rejected Interest never advances the
//! replay window.

use super::{get_key_locator_name, get_signature_info, PolicyAction, ValidationPolicy};
use crate::state::ValidationState;
use chrono::{DateTime, TimeZone, Utc};
use ndn_api::time::{Clock, SystemClock};
use ndn_types::error::{ValidationError, ValidationErrorCode};
use ndn_types::interest::command_interest;
use ndn_types::{Certificate, Data, Interest, Name, SignedInterestFormat};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Configuration of the command-Interest guard.
#[derive(Debug, Clone, Copy)]
pub struct CommandInterestOptions {
    /// Maximum tolerated |now − timestamp|; clamped to non-negative.
    pub grace_period: Duration,
    /// Record cap: −1 unlimited, 0 disables replay tracking, else the cap.
    pub max_records: i64,
    /// Records not refreshed within this period are expired.
    pub record_lifetime: Duration,
}

impl Default for CommandInterestOptions {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(120),
            max_records: 1000,
            record_lifetime: Duration::from_secs(3600),
        }
    }
}

struct TimestampRecord {
    key_name: Name,
    timestamp: DateTime<Utc>,
    last_refreshed: Duration,
}

pub(crate) struct RecordQueue {
    // Refresh order: oldest-refreshed at the front.
    queue: VecDeque<TimestampRecord>,
}

impl RecordQueue {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    fn cleanup(&mut self, now: Duration, lifetime: Duration, max_records: i64) {
        if let Some(expiring) = now.checked_sub(lifetime) {
            while self
                .queue
                .front()
                .is_some_and(|record| record.last_refreshed <= expiring)
            {
                self.queue.pop_front();
            }
        }
        if max_records >= 0 {
            while self.queue.len() > max_records as usize {
                self.queue.pop_front();
            }
        }
    }

    fn find(&self, key_name: &Name) -> Option<DateTime<Utc>> {
        self.queue
            .iter()
            .find(|record| record.key_name == *key_name)
            .map(|record| record.timestamp)
    }

    fn insert(&mut self, key_name: Name, timestamp: DateTime<Utc>, now: Duration) {
        self.queue.retain(|record| record.key_name != key_name);
        self.queue.push_back(TimestampRecord {
            key_name,
            timestamp,
            last_refreshed: now,
        });
    }
}

/// The command-Interest replay guard; delegates everything else to its
/// inner policy.
pub struct CommandInterestPolicy {
    options: CommandInterestOptions,
    inner: Box<dyn ValidationPolicy>,
    clock: Arc<dyn Clock>,
    records: Arc<Mutex<RecordQueue>>,
}

impl CommandInterestPolicy {
    /// Wraps `inner` with the default options.
    pub fn new(inner: Box<dyn ValidationPolicy>) -> Self {
        Self::with_options(inner, CommandInterestOptions::default())
    }

    /// Wraps `inner` with explicit options.
    pub fn with_options(inner: Box<dyn ValidationPolicy>, options: CommandInterestOptions) -> Self {
        Self::with_clock(inner, options, Arc::new(SystemClock))
    }

    /// Wraps `inner` with explicit options and clock.
    pub fn with_clock(
        inner: Box<dyn ValidationPolicy>,
        options: CommandInterestOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            options,
            inner,
            clock,
            records: Arc::new(Mutex::new(RecordQueue::new())),
        }
    }

    fn parse_timestamp(
        &self,
        interest: &Interest,
        state: &ValidationState,
    ) -> Result<(Name, DateTime<Utc>), ValidationError> {
        let sig_info = get_signature_info(interest, state)?;
        let timestamp = match state.format_tag() {
            Some(SignedInterestFormat::V03) => sig_info.time().ok_or_else(|| {
                ValidationError::new(
                    ValidationErrorCode::PolicyError,
                    format!(
                        "Signed Interest `{}` lacks required SignatureTime element",
                        interest.name()
                    ),
                )
            })?,
            _ => {
                let name = interest.name();
                if name.len() < command_interest::MIN_SIZE {
                    return Err(ValidationError::new(
                        ValidationErrorCode::PolicyError,
                        format!("Command Interest name too short `{name}`"),
                    ));
                }
                let component = name.get(command_interest::POS_TIMESTAMP).ok_or_else(|| {
                    ValidationError::new(
                        ValidationErrorCode::PolicyError,
                        format!("Command Interest `{name}` lacks timestamp component"),
                    )
                })?;
                let millis = component.to_number().map_err(|_| {
                    ValidationError::new(
                        ValidationErrorCode::PolicyError,
                        format!("Command Interest `{name}` lacks numeric timestamp"),
                    )
                })?;
                chrono::Utc
                    .timestamp_millis_opt(millis as i64)
                    .single()
                    .ok_or_else(|| {
                        ValidationError::new(
                            ValidationErrorCode::PolicyError,
                            format!("Command Interest `{name}` timestamp out of range"),
                        )
                    })?
            }
        };
        let key_name = get_key_locator_name(&sig_info, interest.name())?;
        Ok((key_name, timestamp))
    }

    fn check_timestamp(
        &self,
        state: &mut ValidationState,
        key_name: Name,
        timestamp: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let steady_now = self.clock.steady_now();
        let now = self.clock.system_now();

        let last_timestamp = {
            let Ok(mut records) = self.records.lock() else {
                return Err(ValidationError::new(
                    ValidationErrorCode::ImplementationError,
                    "replay record store poisoned",
                ));
            };
            records.cleanup(
                steady_now,
                self.options.record_lifetime,
                self.options.max_records,
            );
            records.find(&key_name)
        };

        let grace = chrono::Duration::from_std(self.options.grace_period)
            .unwrap_or_else(|_| chrono::Duration::seconds(120));
        if timestamp < now - grace || timestamp > now + grace {
            return Err(ValidationError::new(
                ValidationErrorCode::PolicyError,
                format!("Timestamp is outside the grace period for key {key_name}"),
            )
            .with_name(key_name));
        }

        if let Some(last) = last_timestamp {
            if timestamp <= last {
                return Err(ValidationError::new(
                    ValidationErrorCode::PolicyError,
                    format!("Timestamp is reordered for key {key_name}"),
                )
                .with_name(key_name));
            }
        }

        if self.options.max_records != 0 {
            let records = Arc::clone(&self.records);
            let clock = Arc::clone(&self.clock);
            state.defer_on_success(Box::new(move || {
                if let Ok(mut records) = records.lock() {
                    records.insert(key_name, timestamp, clock.steady_now());
                }
            }));
        }
        Ok(())
    }
}

impl ValidationPolicy for CommandInterestPolicy {
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
        let (key_name, timestamp) = self.parse_timestamp(interest, state)?;
        self.check_timestamp(state, key_name, timestamp)?;
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
    use ndn_types::{Component, KeyLocator, SignatureInfo, SignatureType};

    fn signed_interest(key: &str, at: DateTime<Utc>) -> Interest {
        let mut interest = Interest::new(Name::from_uri("/app/CMD").unwrap());
        let mut info = SignatureInfo::new(SignatureType::Sha256WithEcdsa)
            .with_key_locator(KeyLocator::Name(Name::from_uri(key).unwrap()));
        info.set_time(Some(at));
        interest.set_signature_info(info);
        interest.set_signature_value(vec![0; 32]);
        interest
    }

    fn check(
        policy: &CommandInterestPolicy,
        interest: &Interest,
        commit: bool,
    ) -> Result<PolicyAction, ValidationError> {
        let mut state = ValidationState::for_interest(interest.clone());
        let result = policy.check_interest(interest, &mut state);
        if commit && result.is_ok() {
            state.run_success_hooks();
        }
        result
    }

    #[test]
    fn replayed_timestamp_is_rejected_after_success() {
        let policy = CommandInterestPolicy::new(Box::new(AcceptAllPolicy));
        let interest = signed_interest("/id/KEY/%01", Utc::now());

        assert!(check(&policy, &interest, true).is_ok());
        let err = check(&policy, &interest, true).unwrap_err();
        assert_eq!(err.code, ValidationErrorCode::PolicyError);
    }

    #[test]
    fn record_not_inserted_without_final_success() {
        let policy = CommandInterestPolicy::new(Box::new(AcceptAllPolicy));
        let interest = signed_interest("/id/KEY/%01", Utc::now());

        // No success hooks run: the same timestamp stays acceptable.
        assert!(check(&policy, &interest, false).is_ok());
        assert!(check(&policy, &interest, true).is_ok());
    }

    #[test]
    fn stale_timestamp_outside_grace_fails() {
        let policy = CommandInterestPolicy::new(Box::new(AcceptAllPolicy));
        let stale = signed_interest("/id/KEY/%01", Utc::now() - chrono::Duration::seconds(300));
        assert!(check(&policy, &stale, true).is_err());

        let future = signed_interest("/id/KEY/%01", Utc::now() + chrono::Duration::seconds(300));
        assert!(check(&policy, &future, true).is_err());
    }

    #[test]
    fn newer_timestamp_is_accepted() {
        let policy = CommandInterestPolicy::new(Box::new(AcceptAllPolicy));
        let t0 = Utc::now();
        assert!(check(&policy, &signed_interest("/id/KEY/%01", t0), true).is_ok());
        let newer = t0 + chrono::Duration::milliseconds(5);
        assert!(check(&policy, &signed_interest("/id/KEY/%01", newer), true).is_ok());
    }

    #[test]
    fn keys_are_tracked_independently() {
        let policy = CommandInterestPolicy::new(Box::new(AcceptAllPolicy));
        let at = Utc::now();
        assert!(check(&policy, &signed_interest("/a/KEY/%01", at), true).is_ok());
        assert!(check(&policy, &signed_interest("/b/KEY/%01", at), true).is_ok());
    }

    #[test]
    fn expired_record_allows_lower_timestamp_again() {
        use ndn_test_utils::VirtualClock;

        let clock = Arc::new(VirtualClock::new());
        let options = CommandInterestOptions {
            grace_period: Duration::from_secs(10_000),
            record_lifetime: Duration::from_secs(100),
            ..CommandInterestOptions::default()
        };
        let policy = CommandInterestPolicy::with_clock(
            Box::new(AcceptAllPolicy),
            options,
            clock.clone(),
        );

        let t0 = clock.system_now();
        let high = signed_interest("/id/KEY/%01", t0 + chrono::Duration::seconds(90));
        assert!(check(&policy, &high, true).is_ok());

        // A lower timestamp is a reorder while the record lives.
        let low = signed_interest("/id/KEY/%01", t0 + chrono::Duration::seconds(10));
        assert!(check(&policy, &low, true).is_err());

        // After the record lifetime passes unrefreshed, it is evicted and
        // the lower timestamp becomes acceptable again.
        clock.advance(Duration::from_secs(200));
        assert!(check(&policy, &low, true).is_ok());
    }

    #[test]
    fn legacy_v02_timestamp_component_is_parsed() {
        let policy = CommandInterestPolicy::new(Box::new(AcceptAllPolicy));
        let now_millis = Utc::now().timestamp_millis() as u64;
        let info = SignatureInfo::new(SignatureType::Sha256WithEcdsa)
            .with_key_locator(KeyLocator::Name(Name::from_uri("/id/KEY/%01").unwrap()));
        let name = Name::from_uri("/app/CMD")
            .unwrap()
            .append(Component::number(now_millis))
            .append(Component::generic(vec![0xAB; 8]))
            .append(Component::generic(
                info.to_block(ndn_types::tlv::number::SIGNATURE_INFO).encode(),
            ))
            .append(Component::generic(
                ndn_types::Block::new(ndn_types::tlv::number::SIGNATURE_VALUE, vec![0; 32])
                    .encode(),
            ));
        let interest = Interest::new(name);
        assert_eq!(
            interest.detect_signed_format(),
            Some(SignedInterestFormat::V02)
        );
        assert!(check(&policy, &interest, true).is_ok());
        // Same legacy timestamp replayed.
        assert!(check(&policy, &interest, true).is_err());
    }
}
