// Path: crates/crypto/src/transform/base.rs
//! Chain machinery: the module traits, the builder, and the sources.

use ndn_types::error::{TransformError, TransformErrorKind};
use std::io::Read;

const STREAM_CHUNK: usize = 2048;

/// A filter module: consumes bytes, produces bytes.
///
/// `convert` returns the number of input bytes accepted; the chain keeps
/// calling until everything is accepted. Produced bytes are appended to
/// `out` and flushed to the successor before more input arrives.
/// `finalize` flushes any retained state once input ends.
pub trait Transform {
    /// Processes a chunk of input, appending output to `out`.
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind>;

    /// Flushes retained output after the end of input.
    fn finalize(&mut self, out: &mut Vec<u8>) -> Result<(), TransformErrorKind> {
        let _ = out;
        Ok(())
    }
}

/// A terminal module: consumes bytes, produces nothing.
pub trait Sink {
    /// Accepts bytes, returning how many were consumed.
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransformErrorKind>;

    /// Notifies the sink that no more input will arrive.
    fn end(&mut self) -> Result<(), TransformErrorKind> {
        Ok(())
    }
}

/// An assembled chain of filters terminated by a sink.
///
/// Module indices: the source is 0, filters are 1..=n, the sink is n+1.
struct Chain<'a> {
    filters: Vec<Box<dyn Transform + 'a>>,
    sink: Box<dyn Sink + 'a>,
    ended: bool,
}

impl<'a> Chain<'a> {
    fn new(filters: Vec<Box<dyn Transform + 'a>>, sink: Box<dyn Sink + 'a>) -> Self {
        Self {
            filters,
            sink,
            ended: false,
        }
    }

    fn sink_index(&self) -> usize {
        self.filters.len() + 1
    }

    /// Feeds `input` into the module at `stage` (0 = first filter) and
    /// propagates everything produced downstream.
    fn feed_from(&mut self, stage: usize, input: &[u8]) -> Result<(), TransformError> {
        let mut current = input.to_vec();
        for index in stage..self.filters.len() {
            if current.is_empty() {
                return Ok(());
            }
            let mut produced = Vec::new();
            let mut offset = 0;
            while offset < current.len() {
                let remaining = current.get(offset..).unwrap_or_default();
                let accepted = match self.filters.get_mut(index) {
                    Some(filter) => filter
                        .convert(remaining, &mut produced)
                        .map_err(|kind| TransformError::new(index + 1, kind))?,
                    None => break,
                };
                // A module may accept 0 bytes and defer; retrying with the
                // same input must eventually make progress.
                offset += accepted;
            }
            current = produced;
        }
        if current.is_empty() {
            return Ok(());
        }
        let sink_index = self.sink_index();
        let mut offset = 0;
        while offset < current.len() {
            let remaining = current.get(offset..).unwrap_or_default();
            let accepted = self
                .sink
                .write(remaining)
                .map_err(|kind| TransformError::new(sink_index, kind))?;
            if accepted == 0 {
                return Err(TransformError::new(
                    sink_index,
                    TransformErrorKind::SinkIo("sink accepted no bytes".into()),
                ));
            }
            offset += accepted;
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransformError> {
        if self.ended {
            return Err(TransformError::new(0, TransformErrorKind::InputClosed));
        }
        self.feed_from(0, data)
    }

    /// Ends the chain: finalizes every filter in order, propagating each
    /// tail downstream, then ends the sink. Idempotent.
    fn end(&mut self) -> Result<(), TransformError> {
        if self.ended {
            return Ok(());
        }
        self.ended = true;
        for index in 0..self.filters.len() {
            let mut tail = Vec::new();
            if let Some(filter) = self.filters.get_mut(index) {
                filter
                    .finalize(&mut tail)
                    .map_err(|kind| TransformError::new(index + 1, kind))?;
            }
            self.feed_from(index + 1, &tail)?;
        }
        let sink_index = self.sink_index();
        self.sink
            .end()
            .map_err(|kind| TransformError::new(sink_index, kind))
    }
}

enum SourceKind<'a> {
    Buffer(Vec<u8>),
    Stream(Box<dyn Read + 'a>),
}

/// Builder for a chain fed by a buffer or stream source.
pub struct ChainBuilder<'a> {
    source: SourceKind<'a>,
    filters: Vec<Box<dyn Transform + 'a>>,
}

impl<'a> ChainBuilder<'a> {
    /// Appends a filter module.
    pub fn pipe(mut self, filter: impl Transform + 'a) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Binds the sink and pumps the source through the chain.
    pub fn run(self, sink: impl Sink + 'a) -> Result<(), TransformError> {
        let mut chain = Chain::new(self.filters, Box::new(sink));
        match self.source {
            SourceKind::Buffer(data) => {
                chain.write(&data)?;
            }
            SourceKind::Stream(mut reader) => {
                let mut buf = vec![0u8; STREAM_CHUNK];
                loop {
                    let n = reader.read(&mut buf).map_err(|e| {
                        TransformError::new(0, TransformErrorKind::InvalidInput(e.to_string()))
                    })?;
                    if n == 0 {
                        break;
                    }
                    chain.write(buf.get(..n).unwrap_or_default())?;
                }
            }
        }
        chain.end()
    }
}

/// A source fed by one in-memory buffer.
pub fn buffer_source<'a>(data: impl Into<Vec<u8>>) -> ChainBuilder<'a> {
    ChainBuilder {
        source: SourceKind::Buffer(data.into()),
        filters: Vec::new(),
    }
}

/// A source fed by an [`std::io::Read`] stream.
pub fn stream_source<'a>(reader: impl Read + 'a) -> ChainBuilder<'a> {
    ChainBuilder {
        source: SourceKind::Stream(Box::new(reader)),
        filters: Vec::new(),
    }
}

/// Builder for a chain fed step by step through a [`StepSource`].
pub struct StepSourceBuilder<'a> {
    filters: Vec<Box<dyn Transform + 'a>>,
}

impl<'a> StepSourceBuilder<'a> {
    /// Appends a filter module.
    pub fn pipe(mut self, filter: impl Transform + 'a) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Binds the sink and arms the chain; nothing flows until `write`.
    pub fn attach(self, sink: impl Sink + 'a) -> StepSource<'a> {
        StepSource {
            chain: Chain::new(self.filters, Box::new(sink)),
        }
    }
}

/// A source that accepts input step by step and is closed explicitly.
pub struct StepSource<'a> {
    chain: Chain<'a>,
}

impl StepSource<'_> {
    /// Writes a chunk of input into the chain.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, TransformError> {
        self.chain.write(data)?;
        Ok(data.len())
    }

    /// Closes the input. Only the first invocation takes effect.
    pub fn end(&mut self) -> Result<(), TransformError> {
        self.chain.end()
    }
}

/// Creates a step-source chain builder.
pub fn step_source<'a>() -> StepSourceBuilder<'a> {
    StepSourceBuilder {
        filters: Vec::new(),
    }
}
