//! SCSS Document
//!
//! Represents a single stylesheet or host document with its content, parsed outline and version.
//!
//! Host documents (Vue, Svelte, Astro) are parsed through their projection, so every
//! span in the outline is also a valid byte offset into the host text. Positions are
//! always computed on the host text, because that is what the editor shows.

use std::sync::Arc;

use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent, Url};

use crate::language::document::DocumentVersion;
use crate::language::embedded::{self, EmbeddedRegion, LanguageKind};
use crate::language::position::LineIndex;
use crate::scss::parser::ScssParser;
use crate::scss::syntax::{Span, Stylesheet};

#[derive(Debug, Clone)]
pub struct ScssDocument {
    pub uri: Url,
    pub kind: LanguageKind,
    pub version: DocumentVersion,
    /// Whether the editor owns the text
    pub is_open: bool,
    /// Host text as the editor or the file system has it
    content: String,
    line_index: LineIndex,
    /// Projected stylesheet text, only for host documents with a style region
    projection: Option<embedded::ProjectedDocument>,
    /// Outline of the current text, possibly with syntax errors
    stylesheet: Option<Arc<Stylesheet>>,
    /// Outline of the latest text that parsed without errors
    last_good: Option<Arc<Stylesheet>>,
}

impl ScssDocument {
    /// Create a new document, unparsed
    pub fn new(uri: Url, kind: LanguageKind, content: String, version: DocumentVersion) -> Self {
        let line_index = LineIndex::new(&content);
        Self {
            uri,
            kind,
            version,
            is_open: false,
            content,
            line_index,
            projection: None,
            stylesheet: None,
            last_good: None,
        }
    }

    /// Parse the current content
    pub fn parse(&mut self, parser: &ScssParser) {
        self.projection = if self.kind.is_host() {
            embedded::project(&self.content)
        } else {
            None
        };

        let text = match (self.kind.is_host(), &self.projection) {
            (false, _) => Some(self.content.as_str()),
            (true, Some(projection)) => Some(projection.text.as_str()),
            (true, None) => None,
        };

        match text {
            Some(text) => {
                let stylesheet = Arc::new(parser.parse(text));
                if !stylesheet.has_errors() {
                    self.last_good = Some(stylesheet.clone());
                }
                self.stylesheet = Some(stylesheet);
            }
            None => {
                // a host without a style region has nothing to keep
                self.stylesheet = None;
                self.last_good = None;
            }
        }
    }

    /// Replace the whole content
    pub fn set_content(&mut self, content: String, version: DocumentVersion, parser: &ScssParser) {
        self.line_index = LineIndex::new(&content);
        self.content = content;
        self.version = version;
        self.parse(parser);
    }

    /// Apply incremental changes to the document
    pub fn apply_changes(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: DocumentVersion,
        parser: &ScssParser,
    ) {
        self.version = version;

        for change in changes {
            if let Some(range) = change.range {
                let start_byte = self.offset_at(range.start);
                let end_byte = self.offset_at(range.end).max(start_byte);
                self.content.replace_range(start_byte..end_byte, &change.text);
            } else {
                self.content = change.text;
            }
            // later changes are relative to the text after this one
            self.line_index = LineIndex::new(&self.content);
        }

        self.parse(parser);
    }

    /// Current document content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Text the outline was parsed from
    pub fn stylesheet_text(&self) -> Option<&str> {
        match (&self.projection, self.kind.is_host()) {
            (_, false) => Some(&self.content),
            (Some(projection), true) => Some(&projection.text),
            (None, true) => None,
        }
    }

    /// Style region of a host document
    pub fn region(&self) -> Option<EmbeddedRegion> {
        self.projection.as_ref().map(|p| p.region)
    }

    /// Outline of the current text
    pub fn stylesheet(&self) -> Option<&Arc<Stylesheet>> {
        self.stylesheet.as_ref()
    }

    /// Outline to index: the current one unless it has errors and an older good one exists
    pub fn indexed_stylesheet(&self) -> Option<Arc<Stylesheet>> {
        match &self.stylesheet {
            Some(current) if current.has_errors() => {
                self.last_good.clone().or_else(|| Some(current.clone()))
            }
            current => current.clone(),
        }
    }

    /// Whether the current text has syntax errors
    pub fn has_errors(&self) -> bool {
        self.stylesheet.as_ref().is_some_and(|s| s.has_errors())
    }

    pub fn offset_at(&self, position: Position) -> usize {
        self.line_index.offset_of(&self.content, position)
    }

    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position_of(&self.content, offset)
    }

    pub fn range_of(&self, span: &Span) -> Range {
        self.line_index.range_of(&self.content, span)
    }

    /// Byte offset of a position if it falls inside the stylesheet part of the document
    pub fn stylesheet_offset_at(&self, position: Position) -> Option<usize> {
        let offset = self.offset_at(position);
        if !self.kind.is_host() {
            return Some(offset);
        }
        self.region()?.to_host_offset(offset)
    }
}
