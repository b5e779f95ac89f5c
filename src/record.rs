//! The unit flowing through a pipeline.
//!
//! A [`Line`] is one physical line of input plus the rendering metadata the
//! stages accumulate on it. Stages never rewrite `content` directly: they add
//! a prefix, a suffix, or a substitution, and the sink applies all of them at
//! render time.

use crate::error::ReadError;

/// One item of a pipeline stream: a line, or the terminal failure of the
/// file it came from.
pub type Record = Result<Line, ReadError>;

/// A literal byte-string replacement applied to line content at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub from: Vec<u8>,
    pub to: Vec<u8>,
}

/// One input line and its pending decorations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    content: Vec<u8>,
    prefix: String,
    suffix: String,
    substitutions: Vec<Substitution>,
}

impl Line {
    /// Create a line from raw content (without its line terminator).
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Raw content as read from the file.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// True when the line has no content at all.
    pub fn is_blank(&self) -> bool {
        self.content.is_empty()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    /// Append text to the prefix rendered before the content.
    pub fn push_prefix(&mut self, text: &str) {
        self.prefix.push_str(text);
    }

    /// Append text to the suffix rendered after the content.
    pub fn push_suffix(&mut self, text: &str) {
        self.suffix.push_str(text);
    }

    /// Register a replacement. Earlier registrations win when two patterns
    /// match at the same position. Empty patterns are ignored.
    pub fn add_substitution(&mut self, from: &[u8], to: &[u8]) {
        if from.is_empty() {
            return;
        }
        self.substitutions.push(Substitution {
            from: from.to_vec(),
            to: to.to_vec(),
        });
    }

    /// Render `prefix`, substituted content, and `suffix` without a line
    /// terminator.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.prefix.len() + self.content.len() + self.suffix.len());
        self.render_into(&mut out);
        out
    }

    /// Render into an existing buffer, appending to whatever it holds.
    pub fn render_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.prefix.as_bytes());
        self.substitute_into(out);
        out.extend_from_slice(self.suffix.as_bytes());
    }

    /// Lossy UTF-8 rendering, convenient for logs and tests.
    pub fn render_lossy(&self) -> String {
        String::from_utf8_lossy(&self.render()).into_owned()
    }

    // Single left-to-right pass: matches never overlap and replaced text is
    // not rescanned.
    fn substitute_into(&self, out: &mut Vec<u8>) {
        if self.substitutions.is_empty() {
            out.extend_from_slice(&self.content);
            return;
        }

        let content = &self.content;
        let mut i = 0;
        'scan: while i < content.len() {
            let rest = &content[i..];
            for sub in &self.substitutions {
                if rest.starts_with(&sub.from) {
                    out.extend_from_slice(&sub.to);
                    i += sub.from.len();
                    continue 'scan;
                }
            }
            out.push(content[i]);
            i += 1;
        }
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Line::new(s.as_bytes())
    }
}
