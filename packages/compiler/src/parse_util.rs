//! Parse Utilities
//!
//! Source files, locations and spans attached to template nodes and IR ops.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: String, url: String) -> Self {
        ParseSourceFile { content, url }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseLocation {
    pub file: ParseSourceFile,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: ParseSourceFile, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Returns a location `delta` characters away, tracking line and column changes.
    pub fn move_by(&self, delta: i64) -> ParseLocation {
        let source = self.file.content.as_bytes();
        let len = source.len();
        let mut offset = self.offset.min(len);
        let mut line = self.line;
        let mut col = self.col;
        let mut delta = delta;

        while offset > 0 && delta < 0 {
            offset -= 1;
            delta += 1;
            if source[offset] == b'\n' {
                line = line.saturating_sub(1);
                col = match source[..offset].iter().rposition(|&ch| ch == b'\n') {
                    Some(prior_line) => offset - prior_line,
                    None => offset,
                };
            } else {
                col = col.saturating_sub(1);
            }
        }

        while offset < len && delta > 0 {
            let ch = source[offset];
            offset += 1;
            delta -= 1;
            if ch == b'\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }

        ParseLocation::new(self.file.clone(), offset, line, col)
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
    #[serde(default)]
    pub details: Option<String>,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan {
            start,
            end,
            details: None,
        }
    }

    /// Span covering `[start, end)` of `content`, computing line/column from the text.
    pub fn from_offsets(file: &ParseSourceFile, start: usize, end: usize) -> Self {
        let origin = ParseLocation::new(file.clone(), 0, 0, 0);
        ParseSourceSpan::new(origin.move_by(start as i64), origin.move_by(end as i64))
    }

    /// The source text covered by this span.
    pub fn text(&self) -> &str {
        let content = &self.start.file.content;
        let start = self.start.offset.min(content.len());
        let end = self.end.offset.clamp(start, content.len());
        content.get(start..end).unwrap_or_default()
    }
}

impl fmt::Display for ParseSourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
