//! Workspace symbols and module edges
//!
//! These are the values the symbol graph stores per document. They are derived from
//! one [`Stylesheet`] generation and replaced together on every reparse.

use std::path::Path;

use crate::scss::constants::BUILTIN_MODULE_PREFIX;
use crate::scss::syntax::{Declaration, ModuleRule, ModuleRuleKind, Span, SymbolKind};

/// Interned document identity, an index into the symbol graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub usize);

/// A top level declaration visible to other documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Name as declared, without sigil or forward prefix
    pub name: String,
    pub document: DocumentId,
    /// Span of the name including its sigil
    pub name_span: Span,
    /// Span of the whole declaration
    pub span: Span,
    pub raw: String,
    pub parameters: Option<String>,
    pub doc: Option<String>,
}

impl Symbol {
    pub fn from_declaration(document: DocumentId, declaration: &Declaration) -> Self {
        Self {
            kind: declaration.kind,
            name: declaration.name.clone(),
            document,
            name_span: declaration.name_span.clone(),
            span: declaration.span.clone(),
            raw: declaration.raw.clone(),
            parameters: declaration.parameters.clone(),
            doc: declaration.doc.clone(),
        }
    }

    /// Private members are not visible through `@use` and `@forward`
    pub fn is_private(&self) -> bool {
        is_private_name(&self.name)
    }

    pub fn display_name(&self) -> String {
        self.kind.display_name(&self.name)
    }
}

pub fn is_private_name(name: &str) -> bool {
    name.starts_with('-') || name.starts_with('_')
}

/// Namespace a `@use` binds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    Named(String),
    /// `@use ... as *`
    Wildcard,
}

impl Namespace {
    pub fn matches(&self, name: &str) -> bool {
        matches!(self, Namespace::Named(namespace) if namespace == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    Use {
        namespace: Namespace,
    },
    Forward {
        prefix: Option<String>,
        show: Vec<String>,
        hide: Vec<String>,
    },
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeTarget {
    Document(DocumentId),
    /// `sass:<module>`
    BuiltIn(String),
    /// No file matched the link
    Unresolved,
}

/// A `@use`, `@forward` or `@import` link from one document to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEdge {
    pub kind: EdgeKind,
    /// Link as written
    pub link: String,
    pub link_span: Span,
    pub target: EdgeTarget,
}

impl ModuleEdge {
    pub fn from_rule(rule: &ModuleRule, target: EdgeTarget) -> Self {
        let kind = match rule.kind {
            ModuleRuleKind::Use => EdgeKind::Use {
                namespace: match rule.namespace.as_deref() {
                    Some("*") => Namespace::Wildcard,
                    Some(alias) => Namespace::Named(alias.to_string()),
                    None => Namespace::Named(default_namespace(&rule.link)),
                },
            },
            ModuleRuleKind::Forward => EdgeKind::Forward {
                prefix: rule.prefix.clone(),
                show: rule.show.clone(),
                hide: rule.hide.clone(),
            },
            ModuleRuleKind::Import => EdgeKind::Import,
        };
        Self {
            kind,
            link: rule.link.clone(),
            link_span: rule.link_span.clone(),
            target,
        }
    }

    pub fn target_document(&self) -> Option<DocumentId> {
        match self.target {
            EdgeTarget::Document(id) => Some(id),
            _ => None,
        }
    }
}

/// Namespace `@use` binds when no `as` clause is given
///
/// The last path segment without partial underscore or extension, `math` for `sass:math`.
pub fn default_namespace(link: &str) -> String {
    if let Some(module) = link.strip_prefix(BUILTIN_MODULE_PREFIX) {
        return module.to_string();
    }
    let file_name = link.rsplit('/').next().unwrap_or(link);
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    stem.strip_prefix('_').unwrap_or(stem).to_string()
}

/// Whether a forward's `show`/`hide` filters let an outward name through
pub fn forward_allows(kind: SymbolKind, outward_name: &str, show: &[String], hide: &[String]) -> bool {
    let listed = kind.display_name(outward_name);
    if !show.is_empty() {
        return show.iter().any(|s| *s == listed);
    }
    !hide.iter().any(|h| *h == listed)
}
