// Path: crates/crypto/src/transform/sinks.rs
//! Terminal chain modules.

use crate::transform::base::Sink;
use ndn_types::error::TransformErrorKind;
use std::io::Write;

/// Writes chain output into an [`std::io::Write`].
pub struct StreamSink<W: Write> {
    writer: W,
}

impl<W: Write> Sink for StreamSink<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransformErrorKind> {
        self.writer
            .write_all(buf)
            .map_err(|e| TransformErrorKind::SinkIo(e.to_string()))?;
        Ok(buf.len())
    }

    fn end(&mut self) -> Result<(), TransformErrorKind> {
        self.writer
            .flush()
            .map_err(|e| TransformErrorKind::SinkIo(e.to_string()))
    }
}

/// Creates a sink writing into `writer`.
pub fn stream_sink<W: Write>(writer: W) -> StreamSink<W> {
    StreamSink { writer }
}

/// Captures a boolean result: the first byte written, interpreted as
/// non-zero → `true`. Subsequent bytes are discarded.
pub struct BoolSink<'a> {
    flag: &'a mut bool,
    seen: bool,
}

impl Sink for BoolSink<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransformErrorKind> {
        if !self.seen {
            if let Some(&first) = buf.first() {
                *self.flag = first != 0;
                self.seen = true;
            }
        }
        Ok(buf.len())
    }
}

/// Creates a sink capturing a boolean into `flag`.
pub fn bool_sink(flag: &mut bool) -> BoolSink<'_> {
    BoolSink { flag, seen: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::base::buffer_source;

    #[test]
    fn bool_sink_captures_first_byte_only() {
        let mut result = false;
        buffer_source(vec![1u8, 0, 0])
            .run(bool_sink(&mut result))
            .unwrap();
        assert!(result);

        let mut result = true;
        buffer_source(vec![0u8, 1])
            .run(bool_sink(&mut result))
            .unwrap();
        assert!(!result);
    }

    #[test]
    fn stream_sink_collects_bytes() {
        let mut out = Vec::new();
        buffer_source(b"bytes".to_vec())
            .run(stream_sink(&mut out))
            .unwrap();
        assert_eq!(out, b"bytes");
    }
}
