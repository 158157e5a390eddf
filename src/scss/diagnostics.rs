//! SCSS Diagnostics
//!
//! Syntax problems from the parser plus module links that lead nowhere.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Url};

use crate::scss::builtins;
use crate::scss::constants::{BUILTIN_MODULE_PREFIX, DIAGNOSTIC_SOURCE};
use crate::scss::document::ScssDocument;
use crate::scss::syntax::{Severity, Span};
use crate::scss::workspace::ScssWorkspace;

pub struct ScssDiagnostics;

impl ScssDiagnostics {
    pub fn new() -> Self {
        Self
    }

    /// Diagnostics of a known document, empty for unknown ones
    pub fn analyze(&self, workspace: &ScssWorkspace, uri: &Url) -> Vec<Diagnostic> {
        let Some(document) = workspace.documents.get(uri) else {
            return Vec::new();
        };
        let Some(stylesheet) = document.stylesheet() else {
            return Vec::new();
        };

        let mut diagnostics: Vec<Diagnostic> = stylesheet
            .diagnostics
            .iter()
            .map(|d| {
                let severity = match d.severity {
                    Severity::Error => DiagnosticSeverity::ERROR,
                    Severity::Warning => DiagnosticSeverity::WARNING,
                };
                create_diagnostic(document, &d.span, severity, d.code, d.message.clone())
            })
            .collect();

        for rule in &stylesheet.module_rules {
            if let Some(module) = rule.link.strip_prefix(BUILTIN_MODULE_PREFIX) {
                if !builtins::is_known_module(module) {
                    diagnostics.push(create_diagnostic(
                        document,
                        &rule.link_span,
                        DiagnosticSeverity::WARNING,
                        "unknown-module",
                        format!("Unknown built-in module '{}'", rule.link),
                    ));
                }
                continue;
            }
            if workspace.resolve_link_path(uri, &rule.link).is_none() {
                diagnostics.push(create_diagnostic(
                    document,
                    &rule.link_span,
                    DiagnosticSeverity::WARNING,
                    "unresolved-link",
                    format!("Can't find stylesheet to {}: '{}'", rule.kind.keyword().trim_start_matches('@'), rule.link),
                ));
            }
        }
        diagnostics
    }
}

impl Default for ScssDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

fn create_diagnostic(
    document: &ScssDocument,
    span: &Span,
    severity: DiagnosticSeverity,
    code: &str,
    message: String,
) -> Diagnostic {
    Diagnostic {
        range: document.range_of(span),
        severity: Some(severity),
        code: Some(NumberOrString::String(code.to_string())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message,
        ..Default::default()
    }
}
