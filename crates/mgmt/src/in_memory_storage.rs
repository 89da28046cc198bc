// Path: crates/mgmt/src/in_memory_storage.rs
//! A FIFO in-memory Data store for retransmissions.

use ndn_types::{Data, Interest};
use std::collections::VecDeque;

/// Default capacity of the dispatcher's storage.
pub const DEFAULT_CAPACITY: usize = 256;

/// Bounded FIFO store: when full, the oldest entry is evicted.
pub struct InMemoryStorageFifo {
    capacity: usize,
    entries: VecDeque<Data>,
}

impl InMemoryStorageFifo {
    /// Creates a store holding up to `capacity` packets.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Inserts a packet, evicting the oldest when over capacity.
    pub fn insert(&mut self, data: Data) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(data);
    }

    /// Finds a stored packet satisfying `interest`: the Interest name is
    /// a prefix of the Data name, and equals it unless CanBePrefix.
    pub fn find(&self, interest: &Interest) -> Option<&Data> {
        self.entries.iter().find(|data| {
            interest.name().is_prefix_of(data.name())
                && (interest.can_be_prefix() || interest.name().len() == data.name().len())
        })
    }

    /// Number of stored packets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every stored packet.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_types::{Name, SignatureInfo, SignatureType};

    fn data(name: &str) -> Data {
        let mut data = Data::new(Name::from_uri(name).unwrap());
        data.set_signature_info(SignatureInfo::new(SignatureType::DigestSha256));
        data
    }

    #[test]
    fn exact_and_prefix_lookup() {
        let mut storage = InMemoryStorageFifo::new(8);
        storage.insert(data("/root/test/v=1/seg=0"));

        let mut exact = Interest::new(Name::from_uri("/root/test/v=1/seg=0").unwrap());
        assert!(storage.find(&exact).is_some());

        let mut prefix = Interest::new(Name::from_uri("/root/test").unwrap());
        assert!(storage.find(&prefix).is_none());
        prefix.set_can_be_prefix(true);
        assert!(storage.find(&prefix).is_some());

        exact.set_name(Name::from_uri("/root/other").unwrap());
        assert!(storage.find(&exact).is_none());
    }

    #[test]
    fn fifo_eviction_at_capacity() {
        let mut storage = InMemoryStorageFifo::new(2);
        storage.insert(data("/a"));
        storage.insert(data("/b"));
        storage.insert(data("/c"));
        assert_eq!(storage.len(), 2);
        assert!(storage
            .find(&Interest::new(Name::from_uri("/a").unwrap()))
            .is_none());
        assert!(storage
            .find(&Interest::new(Name::from_uri("/c").unwrap()))
            .is_some());
    }
}
