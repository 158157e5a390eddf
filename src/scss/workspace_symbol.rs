//! SCSS Workspace Symbol Provider

use tower_lsp::lsp_types::{SymbolInformation, SymbolKind as LspSymbolKind};

use crate::scss::symbols::Symbol;
use crate::scss::syntax::SymbolKind;
use crate::scss::workspace::ScssWorkspace;

/// How well a symbol name matches a query, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchQuality {
    Exact,
    Prefix,
    Substring,
}

fn match_quality(name: &str, query: &str) -> Option<MatchQuality> {
    let name = name.to_lowercase();
    if name == query {
        Some(MatchQuality::Exact)
    } else if name.starts_with(query) {
        Some(MatchQuality::Prefix)
    } else if name.contains(query) {
        Some(MatchQuality::Substring)
    } else {
        None
    }
}

pub fn lsp_symbol_kind(kind: SymbolKind) -> LspSymbolKind {
    match kind {
        SymbolKind::Variable => LspSymbolKind::VARIABLE,
        SymbolKind::Mixin | SymbolKind::Function => LspSymbolKind::FUNCTION,
        SymbolKind::Placeholder => LspSymbolKind::CLASS,
    }
}

pub struct ScssWorkspaceSymbolProvider;

impl ScssWorkspaceSymbolProvider {
    pub fn new() -> Self {
        Self
    }

    /// Every indexed symbol whose name contains the query, ignoring case
    ///
    /// Exact matches come first, then prefix matches, then the rest; ties by name.
    pub fn symbols(&self, workspace: &ScssWorkspace, query: &str) -> Vec<SymbolInformation> {
        let query = query.to_lowercase();
        let mut matches: Vec<(MatchQuality, String, &Symbol)> = workspace
            .graph
            .all_symbols()
            .filter_map(|symbol| {
                let display_name = symbol.display_name();
                let quality = match_quality(&symbol.name, &query)
                    .into_iter()
                    .chain(match_quality(&display_name, &query))
                    .min()?;
                Some((quality, display_name, symbol))
            })
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        matches
            .into_iter()
            .filter_map(|(_, name, symbol)| {
                let location = workspace.location_of(symbol.document, &symbol.name_span)?;
                #[allow(deprecated)]
                let information = SymbolInformation {
                    name,
                    kind: lsp_symbol_kind(symbol.kind),
                    tags: None,
                    deprecated: None,
                    location,
                    container_name: None,
                };
                Some(information)
            })
            .collect()
    }
}

impl Default for ScssWorkspaceSymbolProvider {
    fn default() -> Self {
        Self::new()
    }
}
