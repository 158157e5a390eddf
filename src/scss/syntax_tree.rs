//! SCSS syntax tree
//!
//! Stylesheets are parsed with raffia. Its typed tree is serialized into one uniform
//! node view, so the outline parser walks it by node kind and byte span the same way
//! a tree-sitter tree is walked.
//!
//! raffia stops at the first fatal error. To still get a tree for text being edited,
//! the failing statement is blanked out with spaces (byte offsets are kept) and the
//! text is parsed again. Blocks left open at the end are closed with synthetic braces.

use log::{debug, warn};
use raffia::{Parser, Syntax, ast::Stylesheet};
use serde_json::Value;

use crate::scss::constants::MAX_SYNTAX_RECOVERIES;
use crate::scss::syntax::{Severity, Span, SyntaxDiagnostic};

/// Parsed stylesheet text
#[derive(Debug)]
pub struct SyntaxTree {
    root: Value,
    /// Length of the source text; synthetic braces lie past it
    len: usize,
}

/// Result of parsing with recovery
#[derive(Debug)]
pub struct ParseResult {
    /// `None` when no amount of recovery produced a tree
    pub tree: Option<SyntaxTree>,
    pub diagnostics: Vec<SyntaxDiagnostic>,
}

impl SyntaxTree {
    /// Parse SCSS text, recovering from syntax errors
    pub fn parse(source: &str) -> ParseResult {
        let mut text = source.to_string();
        let mut diagnostics = Vec::new();

        for _ in 0..MAX_SYNTAX_RECOVERIES {
            let (offset, detail) = {
                let mut parser = Parser::new(&text, Syntax::Scss);
                match parser.parse::<Stylesheet>() {
                    Ok(stylesheet) => {
                        let tree = match serde_json::to_value(&stylesheet) {
                            Ok(root) => Some(SyntaxTree {
                                root,
                                len: source.len(),
                            }),
                            Err(e) => {
                                warn!("Failed to serialize syntax tree: {}", e);
                                None
                            }
                        };
                        return ParseResult { tree, diagnostics };
                    }
                    Err(error) => (error.span.start, format!("{:?}", error.kind)),
                }
            };

            debug!("Syntax error at {}: {}", offset, detail);
            match recover(&mut text, source.len(), offset, &detail) {
                Some(diagnostic) => diagnostics.push(diagnostic),
                None => {
                    let end = offset.min(source.len());
                    diagnostics.push(error_diagnostic(end..end, "syntax-error", describe(&detail)));
                    return ParseResult {
                        tree: None,
                        diagnostics,
                    };
                }
            }
        }

        warn!("Giving up on a stylesheet after {} syntax errors", MAX_SYNTAX_RECOVERIES);
        ParseResult {
            tree: None,
            diagnostics,
        }
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            value: &self.root,
            len: self.len,
        }
    }
}

/// One node of the tree
#[derive(Debug, Clone, Copy)]
pub struct SyntaxNode<'t> {
    value: &'t Value,
    len: usize,
}

impl<'t> SyntaxNode<'t> {
    /// Node kind, lowercase without separators: `SassVariable` is `sassvariable`
    pub fn kind(&self) -> String {
        self.value
            .get("type")
            .and_then(Value::as_str)
            .map(normalize_kind)
            .unwrap_or_default()
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind() == kind
    }

    /// Byte span, clamped to the source text
    pub fn span(&self) -> Span {
        let offset = |key: &str| {
            self.value
                .get("span")
                .and_then(|span| span.get(key))
                .and_then(Value::as_u64)
                .map_or(0, |offset| (offset as usize).min(self.len))
        };
        offset("start")..offset("end")
    }

    /// Nodes directly below this one, in source order
    pub fn children(&self) -> Vec<SyntaxNode<'t>> {
        let mut nodes = Vec::new();
        if let Some(fields) = self.value.as_object() {
            for (key, value) in fields {
                if key != "span" && key != "type" {
                    collect_nodes(value, self.len, &mut nodes);
                }
            }
        }
        nodes.sort_by_key(|node| node.span().start);
        nodes
    }

    /// Nodes of a kind below this one, not looking into nested blocks
    pub fn find_all(&self, kind: &str) -> Vec<SyntaxNode<'t>> {
        let mut found = Vec::new();
        for child in self.children() {
            if child.is(kind) {
                found.push(child);
            } else if !child.is("simpleblock") {
                found.extend(child.find_all(kind));
            }
        }
        found
    }

    /// The block this node opens, if any
    pub fn block(&self) -> Option<SyntaxNode<'t>> {
        self.children().into_iter().find(|child| child.is("simpleblock"))
    }
}

fn collect_nodes<'t>(value: &'t Value, len: usize, out: &mut Vec<SyntaxNode<'t>>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, len, out);
            }
        }
        Value::Object(fields) if fields.contains_key("type") => out.push(SyntaxNode { value, len }),
        // enum wrappers and other untyped containers
        Value::Object(fields) => {
            for (key, value) in fields {
                if key != "span" {
                    collect_nodes(value, len, out);
                }
            }
        }
        _ => {}
    }
}

fn normalize_kind(kind: &str) -> String {
    kind.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// `ExpectRightParen` becomes `expect right paren`
fn describe(detail: &str) -> String {
    let name: String = detail.chars().take_while(char::is_ascii_alphanumeric).collect();
    let mut words = String::new();
    for c in name.chars() {
        if c.is_ascii_uppercase() && !words.is_empty() {
            words.push(' ');
        }
        words.push(c.to_ascii_lowercase());
    }
    if words.is_empty() {
        "Syntax error".to_string()
    } else {
        format!("Syntax error: {}", words)
    }
}

fn error_diagnostic(span: Span, code: &'static str, message: String) -> SyntaxDiagnostic {
    SyntaxDiagnostic {
        span,
        severity: Severity::Error,
        code,
        message,
    }
}

fn is_boundary(c: char) -> bool {
    matches!(c, ';' | '{' | '}')
}

/// Statement text around a failure: back to the previous `;`, `{` or `}`, forward to
/// the next one on the same line
fn failed_statement(text: &str, offset: usize) -> Span {
    let start = text[..offset].rfind(is_boundary).map_or(0, |i| i + 1);
    let line_end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    let end = text[offset..line_end]
        .find(is_boundary)
        .map_or(line_end, |i| offset + i);
    start..end
}

fn blank(text: &mut String, span: Span) {
    let spaces: String = text[span.clone()]
        .chars()
        .map(|c| match c {
            '\n' | '\r' => c.to_string(),
            _ => " ".repeat(c.len_utf8()),
        })
        .collect();
    text.replace_range(span, &spaces);
}

fn unclosed_blocks(text: &str) -> usize {
    let opened = text.matches('{').count();
    let closed = text.matches('}').count();
    opened.saturating_sub(closed)
}

/// Patch `text` so the next parse gets past the failure at `offset`
fn recover(text: &mut String, source_len: usize, offset: usize, detail: &str) -> Option<SyntaxDiagnostic> {
    let mut offset = offset.min(source_len);
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    if offset < source_len {
        let statement = failed_statement(&text[..source_len], offset);
        if !text[statement.clone()].trim().is_empty() {
            blank(text, statement.clone());
            return Some(error_diagnostic(statement, "syntax-error", describe(detail)));
        }
        let stray = text[offset..].chars().next().filter(|c| !c.is_whitespace())?;
        let span = offset..offset + stray.len_utf8();
        blank(text, span.clone());
        return Some(match stray {
            '}' => error_diagnostic(span, "unexpected-brace", "Unexpected \"}\"".to_string()),
            _ => error_diagnostic(span, "syntax-error", describe(detail)),
        });
    }

    if unclosed_blocks(text) > 0 {
        text.push('}');
        return Some(error_diagnostic(
            source_len..source_len,
            "unclosed-block",
            "Expected \"}\"".to_string(),
        ));
    }

    // the last statement runs into the end of the text
    let statement = failed_statement(&text[..source_len], source_len);
    if text[statement.clone()].trim().is_empty() {
        return None;
    }
    blank(text, statement.clone());
    Some(error_diagnostic(statement, "syntax-error", describe(detail)))
}
