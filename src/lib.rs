//! # pipecat
//!
//! A line-oriented text filter built from a chain of streaming stages.
//!
//! Each input file is read lazily, one line at a time, and every line flows
//! through the enabled stages before it is rendered to the output:
//!
//! - **Squeeze-blank**: collapse runs of blank lines to one
//! - **Show-tabs**: render tab characters as `^I`
//! - **Number / number-nonblank**: prefix lines with a running count
//! - **Show-ends**: mark the end of each line with `$`
//!
//! Stages only decorate a line (prefix, suffix, substitutions); the sink
//! applies the decorations when it writes the line. Read failures travel
//! down the same stream as the `Err` arm of a [`Record`], so the sink sees
//! them exactly where reading stopped.
//!
//! ## Example
//!
//! ```
//! use pipecat::{Line, Stage, stage::ShowTabsStage, stage::ShowEndsStage};
//!
//! let mut stages: Vec<Box<dyn Stage>> = vec![Box::new(ShowTabsStage), Box::new(ShowEndsStage)];
//! let line = pipecat::push_through_stages(Line::from("a\tb"), &mut stages).unwrap();
//!
//! assert_eq!(line.render_lossy(), "a^Ib$");
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod source;
pub mod stage;

pub use cancel::CancelToken;
pub use config::{ExecutorKind, FailurePolicy, NumberingScope, Options};
pub use error::{PipelineError, ReadError};
pub use executor::{StageChain, execute_pull, execute_threaded, push_through_stages};
pub use pipeline::{Pipeline, RunSummary};
pub use record::{Line, Record, Substitution};
pub use sink::{Flow, Sink};
pub use source::LineSource;
pub use stage::{LineCounter, Stage, StageKind, build_stage};
