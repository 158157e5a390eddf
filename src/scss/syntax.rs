//! SCSS outline syntax
//!
//! The parser does not build a full expression tree. It produces the outline that the
//! index needs: declarations, module rules, reference sites, SassDoc comments and
//! syntax problems, all addressed by byte spans into the (projected) document text.

use std::ops::Range;

/// Byte span into the document text
pub type Span = Range<usize>;

/// Kind of a workspace-visible symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Variable,
    Mixin,
    Function,
    Placeholder,
}

impl SymbolKind {
    /// The sigil written in front of the name in source
    pub fn sigil(self) -> &'static str {
        match self {
            SymbolKind::Variable => "$",
            SymbolKind::Placeholder => "%",
            SymbolKind::Mixin | SymbolKind::Function => "",
        }
    }

    /// Human readable label used in hover texts
    pub fn label(self) -> &'static str {
        match self {
            SymbolKind::Variable => "Variable",
            SymbolKind::Mixin => "Mixin",
            SymbolKind::Function => "Function",
            SymbolKind::Placeholder => "Placeholder",
        }
    }

    /// Name as written in source, e.g. `$primary` or `%button`
    pub fn display_name(self, name: &str) -> String {
        format!("{}{}", self.sigil(), name)
    }
}

/// A variable, mixin, function or placeholder declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: SymbolKind,
    /// Name without sigil
    pub name: String,
    /// Span of the name including its sigil
    pub name_span: Span,
    /// Span of the whole declaration, body included
    pub span: Span,
    /// Declaration text shown in hovers, e.g. `$variable: 'value';` or `@mixin mixin()`
    pub raw: String,
    /// Raw parameter list of mixins and functions, without parentheses
    pub parameters: Option<String>,
    /// SassDoc comment written right above the declaration
    pub doc: Option<String>,
    /// Block the declaration is visible in; `None` for top level declarations
    pub scope: Option<Span>,
}

impl Declaration {
    pub fn is_top_level(&self) -> bool {
        self.scope.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleRuleKind {
    Use,
    Forward,
    Import,
}

impl ModuleRuleKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ModuleRuleKind::Use => "@use",
            ModuleRuleKind::Forward => "@forward",
            ModuleRuleKind::Import => "@import",
        }
    }
}

/// A top level `@use`, `@forward` or `@import` link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRule {
    pub kind: ModuleRuleKind,
    /// Link as written, without quotes
    pub link: String,
    /// Span of the link text, without quotes
    pub link_span: Span,
    pub span: Span,
    /// `@use ... as <namespace>`; `*` for the wildcard namespace
    pub namespace: Option<String>,
    /// `@forward ... as <prefix>*`
    pub prefix: Option<String>,
    /// `@forward ... show` list, variables keep their `$`
    pub show: Vec<String>,
    /// `@forward ... hide` list, variables keep their `$`
    pub hide: Vec<String>,
}

/// A place where a symbol is used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: SymbolKind,
    /// `ns` in `ns.$x` or `ns.mixin`
    pub namespace: Option<String>,
    /// Name without sigil
    pub name: String,
    /// Span of the whole reference, namespace included
    pub span: Span,
    /// Span of the name including its sigil
    pub name_span: Span,
    /// Index of the local declaration shadowing the name, if any
    pub local: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A syntax problem found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    pub span: Span,
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

/// Outline of one stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub declarations: Vec<Declaration>,
    pub module_rules: Vec<ModuleRule>,
    pub references: Vec<Reference>,
    /// Spans of `///` comment lines
    pub doc_comments: Vec<Span>,
    pub diagnostics: Vec<SyntaxDiagnostic>,
}

impl Stylesheet {
    /// Whether parsing hit an error severe enough to distrust the outline
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn top_level_declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.is_top_level())
    }

    /// Reference whose span contains the offset, the end included
    pub fn reference_at(&self, offset: usize) -> Option<&Reference> {
        self.references
            .iter()
            .find(|r| r.span.start <= offset && offset <= r.span.end)
    }

    /// Declaration whose name span contains the offset, the end included
    pub fn declaration_at(&self, offset: usize) -> Option<(usize, &Declaration)> {
        self.declarations
            .iter()
            .enumerate()
            .find(|(_, d)| d.name_span.start <= offset && offset <= d.name_span.end)
    }

    /// Module rule whose link contains the offset, the end included
    pub fn module_rule_at(&self, offset: usize) -> Option<&ModuleRule> {
        self.module_rules
            .iter()
            .find(|m| m.link_span.start <= offset && offset <= m.link_span.end)
    }

    /// `///` comment line containing the offset
    pub fn doc_comment_at(&self, offset: usize) -> Option<&Span> {
        self.doc_comments
            .iter()
            .find(|span| span.start <= offset && offset <= span.end)
    }
}
