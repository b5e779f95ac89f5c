//! Sink: renders records to an output stream in order.

use std::io::{self, BufWriter, Write};

use tracing::debug;

use crate::config::FailurePolicy;
use crate::error::{PipelineError, ReadError, Result};
use crate::record::Record;

/// What the producer should do after the sink accepted a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep sending.
    Continue,
    /// The current file failed and was skipped; its sequence is over.
    Skipped,
    /// The output went away; stop the whole run.
    Closed,
}

/// Writes rendered lines, one per record, each followed by `\n`.
pub struct Sink<W: Write> {
    out: BufWriter<W>,
    policy: FailurePolicy,
    buffer: Vec<u8>,
    lines_written: usize,
    failures: Vec<ReadError>,
    closed: bool,
}

impl<W: Write> Sink<W> {
    pub fn new(out: W, policy: FailurePolicy) -> Self {
        Self {
            out: BufWriter::new(out),
            policy,
            buffer: Vec::with_capacity(256),
            lines_written: 0,
            failures: Vec::new(),
            closed: false,
        }
    }

    /// Handle one record.
    ///
    /// A failure record stops the run under [`FailurePolicy::Abort`]; under
    /// [`FailurePolicy::Skip`] it is kept for the run summary and ends only
    /// the current file. A broken pipe on the output is reported as
    /// [`Flow::Closed`] rather than an error.
    pub fn accept(&mut self, record: Record) -> Result<Flow> {
        if self.closed {
            return Ok(Flow::Closed);
        }

        let line = match record {
            Ok(line) => line,
            Err(e) => {
                return match self.policy {
                    FailurePolicy::Abort => Err(PipelineError::Read(e)),
                    FailurePolicy::Skip => {
                        debug!(error = %e, "skipping rest of file");
                        self.failures.push(e);
                        Ok(Flow::Skipped)
                    }
                };
            }
        };

        self.buffer.clear();
        line.render_into(&mut self.buffer);
        self.buffer.push(b'\n');
        match self.out.write_all(&self.buffer) {
            Ok(()) => {
                self.lines_written += 1;
                Ok(Flow::Continue)
            }
            Err(e) => self.write_failed(e),
        }
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        match self.out.flush() {
            Ok(()) => Ok(()),
            Err(e) => self.write_failed(e).map(|_| ()),
        }
    }

    fn write_failed(&mut self, e: io::Error) -> Result<Flow> {
        if e.kind() == io::ErrorKind::BrokenPipe {
            self.closed = true;
            Ok(Flow::Closed)
        } else {
            Err(PipelineError::Write(e))
        }
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Failures recorded under [`FailurePolicy::Skip`], in order.
    pub fn failures(&self) -> &[ReadError] {
        &self.failures
    }

    pub fn take_failures(&mut self) -> Vec<ReadError> {
        std::mem::take(&mut self.failures)
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|e| PipelineError::Write(e.into_error()))
    }
}
