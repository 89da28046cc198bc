// Path: crates/security/src/anchors.rs
//! The trust anchor container.
//!
//! Anchors come from two kinds of group: static certificates inserted
//! directly (or loaded once from a file or Base64 string), and directory
//! groups that are rescanned at a configured cadence, with certificates
//! added and removed to track the directory contents.

use crate::io;
use ndn_api::time::{Clock, SystemClock};
use ndn_types::{Certificate, Name};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct DirGroup {
    path: PathBuf,
    refresh: Option<Duration>,
    last_scan: Option<Duration>,
    certificates: Vec<Certificate>,
}

impl DirGroup {
    fn rescan(&mut self) {
        let mut certificates = Vec::new();
        let entries = match std::fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot scan anchor directory");
                self.certificates = certificates;
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match io::load_certificate(&path) {
                Ok(certificate) => certificates.push(certificate),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping non-certificate file");
                }
            }
        }
        tracing::debug!(
            path = %self.path.display(),
            count = certificates.len(),
            "refreshed anchor directory"
        );
        self.certificates = certificates;
    }

    fn maybe_rescan(&mut self, now: Duration) {
        let due = match (self.last_scan, self.refresh) {
            (None, _) => true,
            (Some(last), Some(refresh)) => now.saturating_sub(last) >= refresh,
            (Some(_), None) => false,
        };
        if due {
            self.rescan();
            self.last_scan = Some(now);
        }
    }
}

struct State {
    static_anchors: Vec<Certificate>,
    dir_groups: Vec<DirGroup>,
}

/// Holds the certificates trusted a priori.
pub struct TrustAnchorContainer {
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl Default for TrustAnchorContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl TrustAnchorContainer {
    /// Creates an empty container using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty container with the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(State {
                static_anchors: Vec::new(),
                dir_groups: Vec::new(),
            }),
        }
    }

    /// Adds a static anchor.
    pub fn insert(&self, certificate: Certificate) {
        if let Ok(mut state) = self.state.lock() {
            state.static_anchors.push(certificate);
        }
    }

    /// Adds a directory group, rescanned every `refresh` (once, when
    /// `refresh` is `None`).
    pub fn insert_dir(&self, path: PathBuf, refresh: Option<Duration>) {
        if let Ok(mut state) = self.state.lock() {
            state.dir_groups.push(DirGroup {
                path,
                refresh,
                last_scan: None,
                certificates: Vec::new(),
            });
        }
    }

    /// Finds an anchor whose name has `prefix` as a prefix.
    pub fn find(&self, prefix: &Name) -> Option<Certificate> {
        let now = self.clock.steady_now();
        let mut state = self.state.lock().ok()?;
        for group in &mut state.dir_groups {
            group.maybe_rescan(now);
        }
        state
            .static_anchors
            .iter()
            .chain(state.dir_groups.iter().flat_map(|g| g.certificates.iter()))
            .find(|cert| prefix.is_prefix_of(cert.name()))
            .cloned()
    }

    /// True when `key_name` (or a longer prefix) names an anchor.
    pub fn contains(&self, key_name: &Name) -> bool {
        self.find(key_name).is_some()
    }

    /// Removes every anchor and directory group.
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.static_anchors.clear();
            state.dir_groups.clear();
        }
    }

    /// Number of currently loaded anchors.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .map(|state| {
                state.static_anchors.len()
                    + state
                        .dir_groups
                        .iter()
                        .map(|g| g.certificates.len())
                        .sum::<usize>()
            })
            .unwrap_or(0)
    }

    /// True when no anchors are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
