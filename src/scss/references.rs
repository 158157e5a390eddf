//! SCSS References Provider
//!
//! Finds every place a symbol is used. Only documents that can see the declaring
//! document through module links are searched, and every candidate site is resolved
//! again so that equally named symbols elsewhere are not reported.

use std::collections::{HashSet, VecDeque};

use tower_lsp::lsp_types::{Location, Position, Url};

use crate::scss::resolver::{Resolved, Resolver};
use crate::scss::symbols::{DocumentId, Symbol};
use crate::scss::workspace::{QueryContext, ScssWorkspace};

pub struct ScssReferencesProvider;

impl ScssReferencesProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn references(
        &self,
        workspace: &ScssWorkspace,
        uri: &Url,
        position: Position,
        include_declaration: bool,
    ) -> Vec<Location> {
        let Some(context) = workspace.query(uri, position) else {
            return Vec::new();
        };
        let resolver = Resolver::new(&workspace.graph);

        let symbol = if let Some(reference) = context.stylesheet.reference_at(context.offset) {
            if let Some(index) = reference.local {
                return local_references(&context, uri, index, include_declaration);
            }
            let Some(id) = context.id else {
                return Vec::new();
            };
            resolver
                .resolve_reference(id, reference)
                .into_iter()
                .find_map(|resolved| resolved.symbol())
        } else if let Some((index, declaration)) = context.stylesheet.declaration_at(context.offset) {
            if !declaration.is_top_level() {
                return local_references(&context, uri, index, include_declaration);
            }
            context.id.and_then(|id| {
                workspace
                    .graph
                    .symbols(id)
                    .iter()
                    .find(|s| s.name_span == declaration.name_span)
            })
        } else {
            None
        };

        match symbol {
            Some(symbol) => workspace_references(workspace, &resolver, symbol, include_declaration),
            None => Vec::new(),
        }
    }
}

impl Default for ScssReferencesProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn local_references(context: &QueryContext<'_>, uri: &Url, index: usize, include_declaration: bool) -> Vec<Location> {
    let mut locations = Vec::new();
    if include_declaration {
        if let Some(declaration) = context.stylesheet.declarations.get(index) {
            locations.push(Location::new(uri.clone(), context.document.range_of(&declaration.name_span)));
        }
    }
    locations.extend(
        context
            .stylesheet
            .references
            .iter()
            .filter(|r| r.local == Some(index))
            .map(|r| Location::new(uri.clone(), context.document.range_of(&r.name_span))),
    );
    locations
}

/// The declaring document and everything that links to it, directly or not
fn consumers(workspace: &ScssWorkspace, declaring: DocumentId) -> Vec<DocumentId> {
    let mut seen = HashSet::from([declaring]);
    let mut queue = VecDeque::from([declaring]);
    let mut order = Vec::new();
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for dependent in workspace.graph.dependents(id) {
            if seen.insert(dependent) {
                queue.push_back(dependent);
            }
        }
    }
    order
}

fn workspace_references(
    workspace: &ScssWorkspace,
    resolver: &Resolver<'_>,
    symbol: &Symbol,
    include_declaration: bool,
) -> Vec<Location> {
    let mut locations = Vec::new();
    if include_declaration {
        locations.extend(workspace.location_of(symbol.document, &symbol.name_span));
    }
    let target = Resolved::Symbol(symbol);

    for id in consumers(workspace, symbol.document) {
        let Some(document) = workspace.document_of(id) else {
            continue;
        };
        let Some(stylesheet) = document.stylesheet() else {
            continue;
        };
        // prefixed forwards only ever add to the front of a name
        let candidates = stylesheet.references.iter().filter(|r| {
            r.kind == symbol.kind && r.local.is_none() && r.name.ends_with(&symbol.name)
        });
        for reference in candidates {
            let matches = resolver
                .resolve_reference(id, reference)
                .iter()
                .any(|resolved| resolved.same_target(&target));
            if matches {
                locations.push(Location::new(
                    document.uri.clone(),
                    document.range_of(&reference.name_span),
                ));
            }
        }
    }
    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestWorkspace;
    use tower_lsp::lsp_types::Range;

    fn references(test: &TestWorkspace, relative: &str, needle: &str, nth: usize, include: bool) -> Vec<(Url, Range)> {
        let position = test.position(relative, needle, nth, 1);
        ScssReferencesProvider::new()
            .references(&test.workspace, &test.uri(relative), position, include)
            .into_iter()
            .map(|l| (l.uri, l.range))
            .collect()
    }

    fn range(line: u32, start: u32, end: u32) -> Range {
        Range::new(Position::new(line, start), Position::new(line, end))
    }

    #[test]
    fn test_references_across_namespaces_and_forwards() {
        let test = TestWorkspace::with_files(&[
            ("_b.scss", "$x: 1;\n.b { width: $x; }"),
            ("_a.scss", "@forward 'b' as pre-*;"),
            ("c.scss", "@use 'a';\n.c { width: a.$pre-x; }"),
            ("d.scss", "@use 'b' as bee;\n.d { width: bee.$x; }"),
            ("unrelated.scss", "$x: 2;\n.u { width: $x; }"),
        ]);

        let found = references(&test, "_b.scss", "$x", 0, true);
        assert_eq!(
            found,
            vec![
                (test.uri("_b.scss"), range(0, 0, 2)),
                (test.uri("_b.scss"), range(1, 12, 14)),
                (test.uri("d.scss"), range(1, 16, 18)),
                (test.uri("c.scss"), range(1, 14, 20)),
            ]
        );
    }

    #[test]
    fn test_references_from_a_reference_without_declaration() {
        let test = TestWorkspace::with_files(&[
            ("main.scss", "@import 'mixins';\n.a { @include button; }\n.b { @include button; }"),
            ("_mixins.scss", "@mixin button {}"),
        ]);

        let found = references(&test, "main.scss", "button", 1, false);
        assert_eq!(
            found,
            vec![(test.uri("main.scss"), range(1, 14, 20)), (test.uri("main.scss"), range(2, 14, 20))]
        );
    }

    #[test]
    fn test_local_references() {
        let test = TestWorkspace::with_files(&[(
            "main.scss",
            "$size: 1;\n@mixin m($size) { width: $size; height: $size; }\n.a { width: $size; }",
        )]);

        let found = references(&test, "main.scss", "$size", 1, true);
        assert_eq!(
            found,
            vec![
                (test.uri("main.scss"), range(1, 9, 14)),
                (test.uri("main.scss"), range(1, 25, 30)),
                (test.uri("main.scss"), range(1, 40, 45)),
            ]
        );

        let top = references(&test, "main.scss", "$size", 0, false);
        assert_eq!(top, vec![(test.uri("main.scss"), range(2, 12, 17))]);
    }

    #[test]
    fn test_unresolved_symbols_have_no_references() {
        let test = TestWorkspace::with_files(&[("main.scss", ".a { width: $nope; }")]);
        assert!(references(&test, "main.scss", "$nope", 0, true).is_empty());
    }
}
