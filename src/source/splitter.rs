// ABOUTME: Splits a dump stream into executable statements on the `;` delimiter
// ABOUTME: Positional matching only; quotes and comments are not recognised

use crate::error::{DumpError, Result};
use std::fmt;
use std::io::{self, BufRead};

pub const DELIMITER: u8 = b';';

const INSERT_PREFIX: &str = "INSERT INTO";

/// One trimmed statement from a dump stream
///
/// The text keeps the terminating delimiter when one was read, so it can be
/// executed exactly as it appeared in the dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(String);

impl Statement {
    /// Build a statement from raw text, applying the dump trimming rule
    pub fn new(raw: &str) -> Self {
        Self(trim_statement(raw).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Statement text without its trailing delimiter
    pub fn body(&self) -> &str {
        self.0
            .strip_suffix(DELIMITER as char)
            .unwrap_or(&self.0)
    }

    /// Whether the statement starts with exactly `INSERT INTO`
    pub fn is_insert(&self) -> bool {
        self.0.starts_with(INSERT_PREFIX)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip leading newlines, then surrounding whitespace
///
/// # Examples
///
/// ```
/// # use seren_mysqldump::source::splitter::trim_statement;
/// assert_eq!(trim_statement("\n\n  SELECT 1;\n"), "SELECT 1;");
/// assert_eq!(trim_statement(trim_statement(" A; ")), "A;");
/// ```
pub fn trim_statement(raw: &str) -> &str {
    raw.trim_start_matches('\n').trim()
}

/// Whether `text` holds nothing but blank lines and `--` comment lines
fn is_comment_only(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

/// What to do with text after the last delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingFragment {
    /// Drop it; dumps written without a final `;` replay as before
    #[default]
    Discard,
    /// Fail with `DumpError::IncompleteStatement`
    Reject,
}

/// Lazy statement sequence over a buffered reader
///
/// Ends after the last delimiter, after a trailing fragment, or after the first
/// read error. It never restarts.
pub struct StatementSplitter<R> {
    reader: R,
    trailing: TrailingFragment,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> StatementSplitter<R> {
    pub fn new(reader: R) -> Self {
        Self::with_trailing(reader, TrailingFragment::default())
    }

    pub fn with_trailing(reader: R, trailing: TrailingFragment) -> Self {
        Self {
            reader,
            trailing,
            buf: Vec::new(),
            done: false,
        }
    }

    fn read_unit(&mut self) -> Option<Result<Statement>> {
        self.buf.clear();
        let read = match self.reader.read_until(DELIMITER, &mut self.buf) {
            Ok(read) => read,
            Err(e) => {
                self.done = true;
                return Some(Err(DumpError::Io(e)));
            }
        };

        if read == 0 {
            self.done = true;
            return None;
        }

        let terminated = self.buf.last() == Some(&DELIMITER);
        let text = match std::str::from_utf8(&self.buf) {
            Ok(text) => text,
            Err(e) => {
                self.done = true;
                return Some(Err(DumpError::Io(io::Error::new(io::ErrorKind::InvalidData, e))));
            }
        };

        if !terminated {
            self.done = true;
            let fragment = trim_statement(text);
            if is_comment_only(fragment) {
                return None;
            }
            return match self.trailing {
                TrailingFragment::Discard => {
                    tracing::debug!(
                        "Discarding {} byte(s) after the last statement delimiter",
                        fragment.len()
                    );
                    None
                }
                TrailingFragment::Reject => Some(Err(DumpError::IncompleteStatement {
                    fragment: fragment.to_string(),
                })),
            };
        }

        Some(Ok(Statement::new(text)))
    }
}

impl<R: BufRead> Iterator for StatementSplitter<R> {
    type Item = Result<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.read_unit()? {
                // A lone delimiter is not a statement
                Ok(statement) if statement.body().trim().is_empty() => continue,
                other => return Some(other),
            }
        }
        None
    }
}
