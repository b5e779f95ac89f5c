//! Stage trait and the line transformations built on it.
//!
//! Each `Stage` processes one line at a time, returning it (possibly
//! decorated) or `None` when the line is suppressed. No stage ever produces
//! more than one line per input line, and stages never see failure records:
//! the executors forward those around them.

use crate::config::NumberingScope;
use crate::record::Line;

/// Literal appended to every line by [`ShowEndsStage`].
pub const END_MARKER: &str = "$";

/// Replacement for a horizontal tab (byte `0x09`) used by [`ShowTabsStage`].
pub const TAB_MARKER: &str = "^I";

/// Label separator for [`NumberAllStage`]: `"<n>: "`.
pub const NUMBER_ALL_SEPARATOR: &str = ": ";

/// Label separator for [`NumberNonblankStage`]: `"<n>:"`, with no trailing
/// space.
pub const NUMBER_NONBLANK_SEPARATOR: &str = ":";

/// A pipeline stage that processes lines one at a time.
pub trait Stage: Send {
    /// Process a single line. `None` drops it from the stream.
    fn process(&mut self, line: Line) -> Option<Line>;

    /// The display name of this stage.
    fn name(&self) -> &str;

    /// Called before the first line of every input file.
    fn start_file(&mut self, _scope: NumberingScope) {}
}

/// The stages a pipeline can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    SqueezeBlank,
    ShowTabs,
    NumberAll,
    NumberNonblank,
    ShowEnds,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::SqueezeBlank => "SQUEEZE",
            StageKind::ShowTabs => "TABS",
            StageKind::NumberAll => "NUMBER",
            StageKind::NumberNonblank => "NUMBER-NONBLANK",
            StageKind::ShowEnds => "ENDS",
        }
    }
}

/// Running count of numbered lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineCounter {
    n: usize,
}

impl LineCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the new value (first call returns 1).
    pub fn advance(&mut self) -> usize {
        self.n += 1;
        self.n
    }

    /// The last value handed out, 0 if none.
    pub fn current(&self) -> usize {
        self.n
    }

    pub fn reset(&mut self) {
        self.n = 0;
    }
}

// ---------------------------------------------------------------------------
// Stage implementations
// ---------------------------------------------------------------------------

/// SQUEEZE - collapses runs of blank lines to one.
///
/// The state is whether the last line this stage let through was blank, so
/// it carries across files when the same stage serves a whole run. The first
/// blank line of a run is kept.
#[derive(Debug, Default)]
pub struct SqueezeBlankStage {
    last_emitted_blank: bool,
}

impl Stage for SqueezeBlankStage {
    fn process(&mut self, line: Line) -> Option<Line> {
        if line.is_blank() && self.last_emitted_blank {
            return None;
        }
        self.last_emitted_blank = line.is_blank();
        Some(line)
    }

    fn name(&self) -> &str {
        StageKind::SqueezeBlank.name()
    }
}

/// TABS - registers a tab to `^I` substitution on every line.
#[derive(Debug, Default)]
pub struct ShowTabsStage;

impl Stage for ShowTabsStage {
    fn process(&mut self, mut line: Line) -> Option<Line> {
        line.add_substitution(b"\t", TAB_MARKER.as_bytes());
        Some(line)
    }

    fn name(&self) -> &str {
        StageKind::ShowTabs.name()
    }
}

/// NUMBER - labels every line, blank or not.
#[derive(Debug, Default)]
pub struct NumberAllStage {
    counter: LineCounter,
}

impl NumberAllStage {
    pub fn new(counter: LineCounter) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> &LineCounter {
        &self.counter
    }
}

impl Stage for NumberAllStage {
    fn process(&mut self, mut line: Line) -> Option<Line> {
        let n = self.counter.advance();
        line.push_prefix(&format!("{n}{NUMBER_ALL_SEPARATOR}"));
        Some(line)
    }

    fn name(&self) -> &str {
        StageKind::NumberAll.name()
    }

    fn start_file(&mut self, scope: NumberingScope) {
        if scope == NumberingScope::File {
            self.counter.reset();
        }
    }
}

/// NUMBER-NONBLANK - labels only lines with content.
#[derive(Debug, Default)]
pub struct NumberNonblankStage {
    counter: LineCounter,
}

impl NumberNonblankStage {
    pub fn new(counter: LineCounter) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> &LineCounter {
        &self.counter
    }
}

impl Stage for NumberNonblankStage {
    fn process(&mut self, mut line: Line) -> Option<Line> {
        if !line.is_blank() {
            let n = self.counter.advance();
            line.push_prefix(&format!("{n}{NUMBER_NONBLANK_SEPARATOR}"));
        }
        Some(line)
    }

    fn name(&self) -> &str {
        StageKind::NumberNonblank.name()
    }

    fn start_file(&mut self, scope: NumberingScope) {
        if scope == NumberingScope::File {
            self.counter.reset();
        }
    }
}

/// ENDS - appends `$` to every line.
#[derive(Debug, Default)]
pub struct ShowEndsStage;

impl Stage for ShowEndsStage {
    fn process(&mut self, mut line: Line) -> Option<Line> {
        line.push_suffix(END_MARKER);
        Some(line)
    }

    fn name(&self) -> &str {
        StageKind::ShowEnds.name()
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create a `Stage` for `kind`.
///
/// Numbering stages take the counter out of `counter`; a later numbering
/// stage built from the same slot starts from a fresh counter.
pub fn build_stage(kind: StageKind, counter: &mut Option<LineCounter>) -> Box<dyn Stage> {
    match kind {
        StageKind::SqueezeBlank => Box::new(SqueezeBlankStage::default()),
        StageKind::ShowTabs => Box::new(ShowTabsStage),
        StageKind::NumberAll => Box::new(NumberAllStage::new(counter.take().unwrap_or_default())),
        StageKind::NumberNonblank => {
            Box::new(NumberNonblankStage::new(counter.take().unwrap_or_default()))
        }
        StageKind::ShowEnds => Box::new(ShowEndsStage),
    }
}
