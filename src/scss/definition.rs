//! SCSS Definition Provider
//!
//! Go to definition for symbol references, declarations and module links.

use tower_lsp::lsp_types::{Location, Position, Range, Url};

use crate::scss::resolver::Resolver;
use crate::scss::workspace::ScssWorkspace;

pub struct ScssDefinitionProvider;

impl ScssDefinitionProvider {
    pub fn new() -> Self {
        Self
    }

    /// Declarations for the symbol or link at a position
    ///
    /// Ambiguous references (the same name merged from several imports) return every
    /// candidate, the one the compiler would pick first.
    pub fn definition(&self, workspace: &ScssWorkspace, uri: &Url, position: Position) -> Vec<Location> {
        let Some(context) = workspace.query(uri, position) else {
            return Vec::new();
        };

        if let Some(rule) = context.stylesheet.module_rule_at(context.offset) {
            let Some(id) = context.id else {
                return Vec::new();
            };
            let target = workspace
                .graph
                .edges(id)
                .iter()
                .find(|edge| edge.link_span == rule.link_span)
                .and_then(|edge| edge.target_document());
            return target
                .map(|target| {
                    let start = Position::new(0, 0);
                    Location::new(workspace.graph.uri(target).clone(), Range::new(start, start))
                })
                .into_iter()
                .collect();
        }

        if let Some(reference) = context.stylesheet.reference_at(context.offset) {
            if let Some(index) = reference.local {
                return context
                    .stylesheet
                    .declarations
                    .get(index)
                    .map(|d| Location::new(uri.clone(), context.document.range_of(&d.name_span)))
                    .into_iter()
                    .collect();
            }
            let Some(id) = context.id else {
                return Vec::new();
            };
            return Resolver::new(&workspace.graph)
                .resolve_reference(id, reference)
                .iter()
                .filter_map(|resolved| resolved.symbol())
                .filter_map(|symbol| workspace.location_of(symbol.document, &symbol.name_span))
                .collect();
        }

        if let Some((_, declaration)) = context.stylesheet.declaration_at(context.offset) {
            let range = context.document.range_of(&declaration.name_span);
            return vec![Location::new(uri.clone(), range)];
        }

        Vec::new()
    }
}

impl Default for ScssDefinitionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestWorkspace;

    fn definitions(test: &TestWorkspace, relative: &str, needle: &str, nth: usize, delta: u32) -> Vec<Location> {
        let position = test.position(relative, needle, nth, delta);
        ScssDefinitionProvider::new().definition(&test.workspace, &test.uri(relative), position)
    }

    #[test]
    fn test_definition_through_namespace() {
        let test = TestWorkspace::with_files(&[
            ("a.scss", "@use 'b' as ns;\n.a { color: ns.$x; }"),
            ("_b.scss", "\n$x: 1;"),
        ]);

        let locations = definitions(&test, "a.scss", "ns.$x", 0, 4);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].uri, test.uri("_b.scss"));
        assert_eq!(locations[0].range, Range::new(Position::new(1, 0), Position::new(1, 2)));
    }

    #[test]
    fn test_ambiguous_imports_return_every_candidate() {
        let test = TestWorkspace::with_files(&[
            ("main.scss", "@import 'one', 'two';\n.a { color: $dup; }"),
            ("_one.scss", "$dup: 1;"),
            ("_two.scss", "$dup: 2;"),
        ]);

        let uris: Vec<Url> = definitions(&test, "main.scss", "$dup", 0, 1)
            .into_iter()
            .map(|l| l.uri)
            .collect();
        assert_eq!(uris, vec![test.uri("_one.scss"), test.uri("_two.scss")]);
    }

    #[test]
    fn test_definition_of_module_link() {
        let test = TestWorkspace::with_files(&[
            ("main.scss", "@use 'theme/colors';\n@use 'sass:math';"),
            ("theme/_colors.scss", "$red: red;"),
        ]);

        let locations = definitions(&test, "main.scss", "colors", 0, 1);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].uri, test.uri("theme/_colors.scss"));
        assert_eq!(locations[0].range.start, Position::new(0, 0));

        assert!(definitions(&test, "main.scss", "sass:math", 0, 1).is_empty());
    }

    #[test]
    fn test_local_definition() {
        let test = TestWorkspace::with_files(&[("main.scss", "$x: 0;\n@mixin m($x) { width: $x; }")]);

        let locations = definitions(&test, "main.scss", "$x", 2, 1);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].range.start, Position::new(1, 9));
    }

    #[test]
    fn test_builtins_have_no_location() {
        let test = TestWorkspace::with_files(&[("main.scss", ".a { width: round(1.5); }")]);
        assert!(definitions(&test, "main.scss", "round", 0, 1).is_empty());
    }
}
