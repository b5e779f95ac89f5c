//! Error types for reading, transforming, and writing records.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A terminal failure while producing the lines of one file.
///
/// Carried downstream as the `Err` arm of a [`Record`](crate::Record) so that
/// it reaches the sink in the position where reading stopped.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("can't open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't scan '{}' at line {line}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },
}

impl ReadError {
    /// Path of the file whose sequence ended with this error.
    pub fn path(&self) -> &Path {
        match self {
            ReadError::Open { path, .. } | ReadError::Scan { path, .. } => path,
        }
    }
}

/// Errors that end a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("write error: {0}")]
    Write(#[source] io::Error),

    #[error("pipeline cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
