//! Run configuration.
//!
//! `Options` is the resolved form of the command line; the library never
//! reads argv or the environment itself.

use crate::stage::StageKind;

/// What the sink does when a file's sequence ends in a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the whole run at the first failure.
    #[default]
    Abort,
    /// End the failed file's output, log it, and continue with the next file.
    Skip,
}

/// Lifetime of the line-numbering counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberingScope {
    /// One continuous count across every file of the run.
    #[default]
    Run,
    /// Restart at 1 for each file.
    File,
}

/// Which scheduler moves records from source to sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutorKind {
    /// One thread per source and stage, joined by rendezvous channels.
    #[default]
    Threaded,
    /// Record-at-a-time iterator chain on the calling thread.
    Pull,
}

/// Everything needed to build and run a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub squeeze_blank: bool,
    pub number: bool,
    pub number_nonblank: bool,
    pub show_ends: bool,
    pub show_tabs: bool,
    pub failure_policy: FailurePolicy,
    pub numbering_scope: NumberingScope,
    pub executor: ExecutorKind,
    /// Lines longer than this many bytes are scan errors.
    pub max_line_len: Option<usize>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve enabled flags into the canonical stage order:
    /// squeeze, tabs, numbering, ends. Number-nonblank wins over number.
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        let mut kinds = Vec::with_capacity(4);
        if self.squeeze_blank {
            kinds.push(StageKind::SqueezeBlank);
        }
        if self.show_tabs {
            kinds.push(StageKind::ShowTabs);
        }
        if self.number_nonblank {
            kinds.push(StageKind::NumberNonblank);
        } else if self.number {
            kinds.push(StageKind::NumberAll);
        }
        if self.show_ends {
            kinds.push(StageKind::ShowEnds);
        }
        kinds
    }
}
