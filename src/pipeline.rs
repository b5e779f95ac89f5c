//! Pipeline composer.
//!
//! A [`Pipeline`] is built once per run from [`Options`]. Its stage instances
//! are reused for every file, so stage state (the numbering counter, the
//! squeeze state) lives exactly as long as the pipeline, and each file is
//! streamed through the same chain in invocation order.
//!
//! ```
//! use pipecat::{CancelToken, FailurePolicy, LineSource, Options, Pipeline, Sink};
//! use std::io::Cursor;
//!
//! let options = Options { squeeze_blank: true, number: true, ..Options::default() };
//! let mut pipeline = Pipeline::from_options(&options);
//! let mut sink = Sink::new(Vec::new(), FailurePolicy::Abort);
//!
//! let source = LineSource::from_reader("input", Cursor::new("a\n\n\nb\n"));
//! pipeline.run_source(source, &mut sink, &CancelToken::new()).unwrap();
//!
//! assert_eq!(sink.into_inner().unwrap(), b"1: a\n2: \n3: b\n");
//! ```

use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::{ExecutorKind, Options};
use crate::error::{PipelineError, ReadError, Result};
use crate::executor::{execute_pull, execute_threaded};
use crate::sink::{Flow, Sink};
use crate::source::LineSource;
use crate::stage::{LineCounter, Stage, build_stage};

/// Totals for a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files opened or attempted, including failed ones.
    pub files: usize,
    /// Lines produced by the sources, before any stage dropped them.
    pub lines_read: usize,
    pub lines_written: usize,
    /// Failures skipped under `FailurePolicy::Skip`, in encounter order.
    pub failures: Vec<ReadError>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn files_failed(&self) -> usize {
        self.failures.len()
    }
}

/// An ordered chain of stages plus the options that shaped it.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    options: Options,
    lines_read: usize,
}

impl Pipeline {
    /// Build the stage chain for `options` in canonical order.
    ///
    /// The single line counter is moved into whichever numbering stage is
    /// enabled.
    pub fn from_options(options: &Options) -> Self {
        let mut counter = Some(LineCounter::new());
        let stages: Vec<Box<dyn Stage>> = options
            .stage_kinds()
            .into_iter()
            .map(|kind| build_stage(kind, &mut counter))
            .collect();

        let pipeline = Self {
            stages,
            options: options.clone(),
            lines_read: 0,
        };
        debug!(stages = ?pipeline.stage_names(), executor = ?options.executor, "built pipeline");
        pipeline
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Total lines pulled from every source this pipeline has run.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Stream one source through the stages into `sink`.
    pub fn run_source<R: Read + Send, W: Write>(
        &mut self,
        source: LineSource<R>,
        sink: &mut Sink<W>,
        cancel: &CancelToken,
    ) -> Result<Flow> {
        for stage in self.stages.iter_mut() {
            stage.start_file(self.options.numbering_scope);
        }
        let mut read = 0;
        let source = source
            .with_max_line_len(self.options.max_line_len)
            .inspect(|record| {
                if record.is_ok() {
                    read += 1;
                }
            });
        let result = match self.options.executor {
            ExecutorKind::Threaded => execute_threaded(source, &mut self.stages, sink, cancel),
            ExecutorKind::Pull => execute_pull(source, &mut self.stages, sink, cancel),
        };
        self.lines_read += read;
        result
    }

    /// Open `path` and stream it through the stages into `sink`.
    pub fn run_file<W: Write>(
        &mut self,
        path: &Path,
        sink: &mut Sink<W>,
        cancel: &CancelToken,
    ) -> Result<Flow> {
        let before = sink.lines_written();
        let flow = self.run_source(LineSource::open(path), sink, cancel)?;
        debug!(
            path = %path.display(),
            lines = sink.lines_written() - before,
            ?flow,
            "finished file"
        );
        Ok(flow)
    }

    /// Process `paths` sequentially in the given order.
    ///
    /// Output written before an error is flushed before the error is
    /// returned. Under `FailurePolicy::Skip` the run completes and the
    /// skipped failures are reported in the summary.
    pub fn run<P: AsRef<Path>, W: Write>(
        &mut self,
        paths: &[P],
        sink: &mut Sink<W>,
        cancel: &CancelToken,
    ) -> Result<RunSummary> {
        let before = sink.lines_written();
        let read_before = self.lines_read;
        let mut summary = RunSummary::default();

        let result = self.run_files(paths, sink, cancel, &mut summary);
        let flushed = sink.flush();
        result?;
        flushed?;

        summary.lines_read = self.lines_read - read_before;
        summary.lines_written = sink.lines_written() - before;
        summary.failures = sink.take_failures();
        Ok(summary)
    }

    fn run_files<P: AsRef<Path>, W: Write>(
        &mut self,
        paths: &[P],
        sink: &mut Sink<W>,
        cancel: &CancelToken,
        summary: &mut RunSummary,
    ) -> Result<()> {
        for path in paths {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            summary.files += 1;
            if self.run_file(path.as_ref(), sink, cancel)? == Flow::Closed {
                debug!("output closed, stopping");
                break;
            }
        }
        Ok(())
    }
}
