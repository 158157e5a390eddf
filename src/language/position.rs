//! Conversions between byte offsets and LSP positions
//!
//! All syntax spans in this crate are byte offsets into the document text.
//! LSP positions count UTF-16 code units per line, so every conversion goes through
//! a [`LineIndex`] built once per text generation.

use std::ops::Range as ByteSpan;
use tower_lsp::lsp_types::{Position, Range};

/// Line start table for one version of a document's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        Self {
            line_starts: Self::calculate_line_starts(content),
            len: content.len(),
        }
    }

    /// Calculate line start positions for efficient position calculations
    fn calculate_line_starts(content: &str) -> Vec<usize> {
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        line_starts
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert byte offset to LSP position
    ///
    /// Offsets past the end of the text clamp to the end. Offsets in the middle of a
    /// multi-byte character count the character as not yet reached.
    pub fn position_of(&self, content: &str, byte_offset: usize) -> Position {
        let byte_offset = byte_offset.min(self.len);
        let line = match self.line_starts.binary_search(&byte_offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];

        let mut character = 0u32;
        for (i, ch) in content[line_start..].char_indices() {
            if line_start + i >= byte_offset || ch == '\n' {
                break;
            }
            character += ch.len_utf16() as u32;
        }

        Position {
            line: line as u32,
            character,
        }
    }

    /// Convert LSP position to byte offset
    ///
    /// A line past the end maps to the end of the text, a column past the end of its
    /// line maps to the end of that line.
    pub fn offset_of(&self, content: &str, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.line_starts.len() {
            return self.len;
        }

        let line_start = self.line_starts[line];
        let line_end = if line + 1 < self.line_starts.len() {
            self.line_starts[line + 1] - 1
        } else {
            self.len
        };
        let line_content = &content[line_start..line_end];

        let mut utf16_count = 0u32;
        for (byte_offset, ch) in line_content.char_indices() {
            if utf16_count >= position.character {
                return line_start + byte_offset;
            }
            utf16_count += ch.len_utf16() as u32;
        }

        line_end
    }

    /// Convert a byte span to an LSP range
    pub fn range_of(&self, content: &str, span: &ByteSpan<usize>) -> Range {
        Range {
            start: self.position_of(content, span.start),
            end: self.position_of(content, span.end),
        }
    }
}

/// Convert byte offset to LSP position without a prebuilt index
pub fn byte_to_position(byte_offset: usize, content: &str) -> Position {
    LineIndex::new(content).position_of(content, byte_offset)
}

/// Convert LSP position to byte offset without a prebuilt index
pub fn position_to_byte_offset(content: &str, position: Position) -> usize {
    LineIndex::new(content).offset_of(content, position)
}
