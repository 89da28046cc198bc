// Path: crates/mgmt/src/status_dataset_context.rs
//! The segmenting response context handed to Status Dataset handlers.
//!
//! A handler appends raw bytes; the context slices them into segments no
//! larger than [`MAX_PAYLOAD_LENGTH`] under `<prefix>/<version>`, with
//! the final-block marker on the last segment. The state machine is
//! strict: `set_prefix` only before any output, `append`/`end` only until
//! finalized, `reject` only before any output.

use crate::control_response::ControlResponse;
use ndn_types::error::DispatchError;
use ndn_types::{Component, Interest, Name, MAX_NDN_PACKET_SIZE};

/// Maximum payload of one dataset segment, leaving headroom for the
/// name, meta info, and signature of the enclosing packet.
pub const MAX_PAYLOAD_LENGTH: usize = MAX_NDN_PACKET_SIZE - 800;

/// One emitted segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Full segment name: `<prefix>/<version>/<segment>`.
    pub name: Name,
    /// Segment payload.
    pub content: Vec<u8>,
    /// True on the last segment of the dataset.
    pub is_final_block: bool,
}

/// What the context produced, drained by the dispatcher after the
/// handler completes.
#[derive(Debug)]
pub enum DatasetOutput {
    /// The response segments, in order.
    Segments(Vec<Segment>),
    /// A producer-generated Nack wrapping this response.
    Reject(ControlResponse),
    /// The handler finished without calling `end` or `reject`.
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    Responded,
    Finalized,
}

/// Context for generating the response to one Status Dataset request.
pub struct StatusDatasetContext {
    interest_name: Name,
    prefix: Name,
    version: u64,
    buffer: Vec<u8>,
    segment_no: u64,
    state: State,
    segments: Vec<Segment>,
    nack: Option<ControlResponse>,
}

impl StatusDatasetContext {
    /// Creates a context for `interest`; `version` (a timestamp-derived
    /// number chosen by the dispatcher) is appended to prefixes lacking a
    /// version component.
    pub fn new(interest: &Interest, version: u64) -> Self {
        let interest_name = interest.name().clone();
        let prefix = interest_name.clone().append_version(version);
        Self {
            interest_name,
            prefix,
            version,
            buffer: Vec::new(),
            segment_no: 0,
            state: State::Initial,
            segments: Vec::new(),
            nack: None,
        }
    }

    /// The segment name prefix: with a version component, without a
    /// segment component.
    pub fn prefix(&self) -> &Name {
        &self.prefix
    }

    /// Changes the response prefix. The prefix must start with the
    /// request name and must not contain a segment component; a version
    /// component is appended when absent.
    pub fn set_prefix(&mut self, prefix: Name) -> Result<&mut Self, DispatchError> {
        if self.state != State::Initial {
            return Err(DispatchError::InvalidContextState(
                "cannot call set_prefix() after append/end/reject",
            ));
        }
        if !self.interest_name.is_prefix_of(&prefix) {
            return Err(DispatchError::InvalidDatasetPrefix(format!(
                "`{prefix}` does not start with the request name `{}`",
                self.interest_name
            )));
        }
        if prefix.get(-1).is_some_and(Component::is_segment) {
            return Err(DispatchError::InvalidDatasetPrefix(format!(
                "`{prefix}` must not contain a segment component"
            )));
        }
        self.prefix = if prefix.get(-1).is_some_and(Component::is_version) {
            prefix
        } else {
            prefix.append_version(self.version)
        };
        Ok(self)
    }

    /// Appends bytes to the response, flushing full segments as the
    /// internal buffer reaches [`MAX_PAYLOAD_LENGTH`].
    pub fn append(&mut self, mut bytes: &[u8]) -> Result<(), DispatchError> {
        if self.state == State::Finalized {
            return Err(DispatchError::InvalidContextState(
                "cannot call append() on a finalized context",
            ));
        }
        self.state = State::Responded;

        while !bytes.is_empty() {
            if self.buffer.len() == MAX_PAYLOAD_LENGTH {
                self.flush_segment(false);
            }
            let take = bytes.len().min(MAX_PAYLOAD_LENGTH - self.buffer.len());
            self.buffer.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];
        }
        Ok(())
    }

    /// Finalizes the response, emitting the last segment with the
    /// final-block marker.
    pub fn end(&mut self) -> Result<(), DispatchError> {
        if self.state == State::Finalized {
            return Err(DispatchError::InvalidContextState(
                "cannot call end() on a finalized context",
            ));
        }
        self.state = State::Finalized;
        self.flush_segment(true);
        Ok(())
    }

    /// Rejects the request with a producer-generated Nack. Allowed only
    /// before any output.
    pub fn reject(&mut self, response: ControlResponse) -> Result<(), DispatchError> {
        if self.state != State::Initial {
            return Err(DispatchError::InvalidContextState(
                "cannot call reject() after append/end",
            ));
        }
        self.state = State::Finalized;
        self.nack = Some(response);
        Ok(())
    }

    fn flush_segment(&mut self, is_final_block: bool) {
        let name = self.prefix.clone().append_segment(self.segment_no);
        self.segment_no += 1;
        self.segments.push(Segment {
            name,
            content: std::mem::take(&mut self.buffer),
            is_final_block,
        });
    }

    /// Drains what the handler produced.
    pub fn into_output(self) -> DatasetOutput {
        match (self.state, self.nack) {
            (State::Finalized, Some(response)) => DatasetOutput::Reject(response),
            (State::Finalized, None) => DatasetOutput::Segments(self.segments),
            _ => DatasetOutput::Incomplete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(uri: &str) -> StatusDatasetContext {
        StatusDatasetContext::new(&Interest::new(Name::from_uri(uri).unwrap()), 7)
    }

    fn segments(context: StatusDatasetContext) -> Vec<Segment> {
        match context.into_output() {
            DatasetOutput::Segments(segments) => segments,
            other => panic!("expected segments, got {other:?}"),
        }
    }

    #[test]
    fn single_segment_dataset() {
        let mut ctx = context("/root/status");
        ctx.append(b"hello dataset").unwrap();
        ctx.end().unwrap();

        let segments = segments(ctx);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_final_block);
        assert_eq!(segments[0].content, b"hello dataset");
        assert_eq!(
            segments[0].name,
            Name::from_uri("/root/status").unwrap().append_version(7).append_segment(0)
        );
    }

    #[test]
    fn large_append_splits_into_segments() {
        let mut ctx = context("/root/status");
        let blob = vec![0x5Au8; 10_000];
        ctx.append(&blob).unwrap();
        ctx.end().unwrap();

        let segments = segments(ctx);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].content.len(), MAX_PAYLOAD_LENGTH);
        assert!(!segments[0].is_final_block);
        assert!(segments[1].is_final_block);
        let total: Vec<u8> = segments
            .iter()
            .flat_map(|s| s.content.iter().copied())
            .collect();
        assert_eq!(total, blob);
    }

    #[test]
    fn empty_dataset_emits_one_final_segment() {
        let mut ctx = context("/root/status");
        ctx.end().unwrap();
        let segments = segments(ctx);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_final_block);
        assert!(segments[0].content.is_empty());
    }

    #[test]
    fn set_prefix_rules() {
        let mut ctx = context("/root/status");
        // Must start with the request name.
        assert!(ctx.set_prefix(Name::from_uri("/elsewhere").unwrap()).is_err());
        // Must not end with a segment component.
        assert!(ctx
            .set_prefix(Name::from_uri("/root/status/seg=0").unwrap())
            .is_err());
        // Version appended when missing.
        ctx.set_prefix(Name::from_uri("/root/status/extra").unwrap())
            .unwrap();
        assert!(ctx.prefix().at(-1).is_version());
        // Explicit version kept.
        ctx.set_prefix(Name::from_uri("/root/status/v=42").unwrap())
            .unwrap();
        assert_eq!(ctx.prefix().at(-1).to_number().unwrap(), 42);

        // Not allowed once responded.
        ctx.append(b"x").unwrap();
        assert!(ctx.set_prefix(Name::from_uri("/root/status").unwrap()).is_err());
    }

    #[test]
    fn strict_state_machine() {
        let mut ctx = context("/root/status");
        ctx.append(b"x").unwrap();
        // reject() after append fails.
        assert!(ctx.reject(ControlResponse::new(400, "Bad")).is_err());
        ctx.end().unwrap();
        // Everything after end fails.
        assert!(ctx.append(b"y").is_err());
        assert!(ctx.end().is_err());

        let mut ctx = context("/root/status");
        ctx.reject(ControlResponse::new(400, "Bad")).unwrap();
        assert!(ctx.append(b"y").is_err());
        match ctx.into_output() {
            DatasetOutput::Reject(response) => assert_eq!(response.code(), 400),
            other => panic!("expected reject, got {other:?}"),
        }
    }

    #[test]
    fn unfinished_context_is_incomplete() {
        let mut ctx = context("/root/status");
        ctx.append(b"partial").unwrap();
        assert!(matches!(ctx.into_output(), DatasetOutput::Incomplete));
    }
}
