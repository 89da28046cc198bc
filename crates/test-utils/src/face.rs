// Path: crates/test-utils/src/face.rs
//! A scriptable face for tests.

use async_trait::async_trait;
use ndn_api::face::{Face, RegisteredPrefixHandle};
use ndn_api::security::SigningInfo;
use ndn_types::error::FaceError;
use ndn_types::{Data, Interest, Name};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A face that answers Interests from a configured response set and
/// records everything sent through it.
#[derive(Default)]
pub struct MockFace {
    responses: Mutex<Vec<Data>>,
    scripted_errors: Mutex<VecDeque<FaceError>>,
    expressed: Mutex<Vec<Interest>>,
    sent_data: Mutex<Vec<Data>>,
    registered: Mutex<Vec<Name>>,
    next_handle: AtomicU64,
}

impl MockFace {
    /// Creates an empty face: every Interest times out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a Data packet served to Interests whose name prefixes it.
    pub fn add_response(&self, data: Data) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push(data);
        }
    }

    /// Queues an error consumed by the next `express_interest` call,
    /// before the response set is consulted.
    pub fn push_error(&self, error: FaceError) {
        if let Ok(mut errors) = self.scripted_errors.lock() {
            errors.push_back(error);
        }
    }

    /// Every Interest expressed so far.
    pub fn expressed_interests(&self) -> Vec<Interest> {
        self.expressed.lock().map(|i| i.clone()).unwrap_or_default()
    }

    /// Number of Interests expressed so far.
    pub fn expressed_count(&self) -> usize {
        self.expressed.lock().map(|i| i.len()).unwrap_or(0)
    }

    /// Every Data packet sent so far.
    pub fn sent_data(&self) -> Vec<Data> {
        self.sent_data.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Prefixes registered through this face.
    pub fn registered_prefixes(&self) -> Vec<Name> {
        self.registered.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Drops recorded traffic (responses stay).
    pub fn clear_traffic(&self) {
        if let Ok(mut expressed) = self.expressed.lock() {
            expressed.clear();
        }
        if let Ok(mut sent) = self.sent_data.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl Face for MockFace {
    async fn express_interest(&self, interest: &Interest) -> Result<Data, FaceError> {
        if let Ok(mut expressed) = self.expressed.lock() {
            expressed.push(interest.clone());
        }
        if let Some(error) = self
            .scripted_errors
            .lock()
            .ok()
            .and_then(|mut errors| errors.pop_front())
        {
            return Err(error);
        }
        let found = self.responses.lock().ok().and_then(|responses| {
            responses
                .iter()
                .rev()
                .find(|data| interest.name().is_prefix_of(data.name()))
                .cloned()
        });
        found.ok_or(FaceError::Timeout)
    }

    async fn put_data(&self, data: &Data) -> Result<(), FaceError> {
        if let Ok(mut sent) = self.sent_data.lock() {
            sent.push(data.clone());
        }
        Ok(())
    }

    async fn register_prefix(
        &self,
        prefix: &Name,
        _signing: &SigningInfo,
    ) -> Result<RegisteredPrefixHandle, FaceError> {
        if let Ok(mut registered) = self.registered.lock() {
            registered.push(prefix.clone());
        }
        Ok(RegisteredPrefixHandle {
            id: self.next_handle.fetch_add(1, Ordering::SeqCst),
            prefix: prefix.clone(),
        })
    }

    async fn unregister_prefix(&self, handle: RegisteredPrefixHandle) -> Result<(), FaceError> {
        if let Ok(mut registered) = self.registered.lock() {
            registered.retain(|prefix| *prefix != handle.prefix);
        }
        Ok(())
    }
}
