//! Line source: a lazy sequence of records read from one file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::mem;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ReadError;
use crate::record::{Line, Record};

enum State<R> {
    Reading(BufReader<R>),
    OpenFailed(io::Error),
    Done,
}

/// Reads a file line by line, yielding one [`Record`] per physical line.
///
/// Lines are split on `\n`; a `\r` directly before the terminator is dropped
/// and a final unterminated line is still a line. The sequence ends either
/// at EOF or after a single `Err` record. The reader is dropped as soon as
/// the sequence ends, or when the source itself is dropped.
pub struct LineSource<R: Read = File> {
    path: PathBuf,
    state: State<R>,
    max_line_len: Option<usize>,
    lines_read: usize,
    buffer: Vec<u8>,
}

impl LineSource<File> {
    /// Open `path` for reading. An open failure is not returned here; it
    /// becomes the first and only record of the sequence.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match File::open(&path) {
            Ok(file) => {
                debug!(path = %path.display(), "opened input");
                State::Reading(BufReader::new(file))
            }
            Err(e) => State::OpenFailed(e),
        };
        Self::with_state(path, state)
    }
}

impl<R: Read> LineSource<R> {
    /// Read lines from any reader. `path` labels errors.
    pub fn from_reader<P: Into<PathBuf>>(path: P, reader: R) -> Self {
        Self::with_state(path.into(), State::Reading(BufReader::new(reader)))
    }

    fn with_state(path: PathBuf, state: State<R>) -> Self {
        Self {
            path,
            state,
            max_line_len: None,
            lines_read: 0,
            buffer: Vec::with_capacity(256),
        }
    }

    /// Treat any line longer than `limit` bytes as a scan error.
    pub fn with_max_line_len(mut self, limit: Option<usize>) -> Self {
        self.max_line_len = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines produced so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let State::Reading(reader) = &mut self.state else {
            return Ok(None);
        };

        self.buffer.clear();
        let n = match self.max_line_len {
            // Two extra bytes leave room for "\r\n" after a maximal line.
            Some(limit) => reader
                .by_ref()
                .take((limit as u64).saturating_add(2))
                .read_until(b'\n', &mut self.buffer)?,
            None => reader.read_until(b'\n', &mut self.buffer)?,
        };
        if n == 0 {
            return Ok(None);
        }

        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
        }
        if self.buffer.last() == Some(&b'\r') {
            self.buffer.pop();
        }

        if let Some(limit) = self.max_line_len
            && self.buffer.len() > limit
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line exceeds {limit} bytes"),
            ));
        }

        Ok(Some(mem::take(&mut self.buffer)))
    }
}

impl<R: Read> Iterator for LineSource<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        match mem::replace(&mut self.state, State::Done) {
            State::Done => return None,
            State::OpenFailed(source) => {
                return Some(Err(ReadError::Open {
                    path: self.path.clone(),
                    source,
                }));
            }
            reading @ State::Reading(_) => self.state = reading,
        }

        match self.read_line() {
            Ok(Some(content)) => {
                self.lines_read += 1;
                Some(Ok(Line::new(content)))
            }
            Ok(None) => {
                self.state = State::Done;
                debug!(path = %self.path.display(), lines = self.lines_read, "input exhausted");
                None
            }
            Err(source) => {
                self.state = State::Done;
                Some(Err(ReadError::Scan {
                    path: self.path.clone(),
                    line: self.lines_read + 1,
                    source,
                }))
            }
        }
    }
}
