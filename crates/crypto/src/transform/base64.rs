// Path: crates/crypto/src/transform/base64.rs
//! Base64 encode/decode filters.

use crate::transform::base::Transform;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ndn_types::error::TransformErrorKind;

const LINE_WIDTH: usize = 64;

/// Streaming Base64 encoder, optionally wrapping output at 64 columns.
pub struct Base64Encode {
    want_newline: bool,
    carry: Vec<u8>,
    column: usize,
}

impl Base64Encode {
    fn emit(&mut self, encoded: &str, out: &mut Vec<u8>) {
        if !self.want_newline {
            out.extend_from_slice(encoded.as_bytes());
            return;
        }
        for &byte in encoded.as_bytes() {
            out.push(byte);
            self.column += 1;
            if self.column == LINE_WIDTH {
                out.push(b'\n');
                self.column = 0;
            }
        }
    }
}

impl Transform for Base64Encode {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        self.carry.extend_from_slice(input);
        let whole = self.carry.len() - self.carry.len() % 3;
        if whole > 0 {
            let rest = self.carry.split_off(whole);
            let encoded = STANDARD.encode(&self.carry);
            self.emit(&encoded, out);
            self.carry = rest;
        }
        Ok(input.len())
    }

    fn finalize(&mut self, out: &mut Vec<u8>) -> Result<(), TransformErrorKind> {
        if !self.carry.is_empty() {
            let encoded = STANDARD.encode(&self.carry);
            self.carry.clear();
            self.emit(&encoded, out);
        }
        if self.want_newline && self.column > 0 {
            out.push(b'\n');
            self.column = 0;
        }
        Ok(())
    }
}

/// Creates a Base64 encoder; `want_newline` wraps output at 64 columns.
pub fn base64_encode(want_newline: bool) -> Base64Encode {
    Base64Encode {
        want_newline,
        carry: Vec::new(),
        column: 0,
    }
}

/// Streaming Base64 decoder; line breaks in the input are skipped.
pub struct Base64Decode {
    buffer: Vec<u8>,
}

impl Transform for Base64Decode {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        let _ = out;
        self.buffer
            .extend(input.iter().copied().filter(|b| *b != b'\n' && *b != b'\r'));
        Ok(input.len())
    }

    fn finalize(&mut self, out: &mut Vec<u8>) -> Result<(), TransformErrorKind> {
        let decoded = STANDARD
            .decode(&self.buffer)
            .map_err(|e| TransformErrorKind::InvalidInput(format!("invalid base64: {e}")))?;
        self.buffer.clear();
        out.extend_from_slice(&decoded);
        Ok(())
    }
}

/// Creates a Base64 decoder.
pub fn base64_decode() -> Base64Decode {
    Base64Decode { buffer: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::base::{buffer_source, step_source};
    use crate::transform::sinks::stream_sink;

    #[test]
    fn encode_decode_roundtrip() {
        let input: Vec<u8> = (0..255u8).collect();
        let mut encoded = Vec::new();
        buffer_source(input.clone())
            .pipe(base64_encode(false))
            .run(stream_sink(&mut encoded))
            .unwrap();

        let mut decoded = Vec::new();
        buffer_source(encoded)
            .pipe(base64_decode())
            .run(stream_sink(&mut decoded))
            .unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn newline_mode_wraps_at_64_columns() {
        let mut encoded = Vec::new();
        buffer_source(vec![0u8; 96])
            .pipe(base64_encode(true))
            .run(stream_sink(&mut encoded))
            .unwrap();
        let text = String::from_utf8(encoded).unwrap();
        let lines: Vec<&str> = text.trim_end().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 64);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn decoder_skips_line_breaks() {
        let mut decoded = Vec::new();
        buffer_source(b"aGVs\nbG8=\n".to_vec())
            .pipe(base64_decode())
            .run(stream_sink(&mut decoded))
            .unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn stepwise_encode_matches_one_shot() {
        let mut stepwise = Vec::new();
        {
            let mut source = step_source()
                .pipe(base64_encode(false))
                .attach(stream_sink(&mut stepwise));
            source.write(b"h").unwrap();
            source.write(b"ell").unwrap();
            source.write(b"o world").unwrap();
            source.end().unwrap();
        }

        let mut oneshot = Vec::new();
        buffer_source(b"hello world".to_vec())
            .pipe(base64_encode(false))
            .run(stream_sink(&mut oneshot))
            .unwrap();
        assert_eq!(stepwise, oneshot);
    }

    #[test]
    fn invalid_base64_reports_decoder_index() {
        let mut decoded = Vec::new();
        let err = buffer_source(b"@@invalid@@".to_vec())
            .pipe(base64_decode())
            .run(stream_sink(&mut decoded))
            .unwrap_err();
        assert_eq!(err.index, 1);
    }
}
