//! SCSS Hover Provider
//!
//! Shows the declaration behind the symbol under the cursor:
//! - Workspace symbols as their declaration text and the file they are declared in
//! - Built-in module members with their description and a link to the Sass reference
//! - SassDoc annotations inside `///` comments

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position, Url};

use crate::scss::builtins::{self, BuiltinMember};
use crate::scss::constants::HOVER_SEPARATOR;
use crate::scss::resolver::{Resolved, Resolver};
use crate::scss::syntax::{Span, SymbolKind};
use crate::scss::workspace::{QueryContext, ScssWorkspace, display_path};

/// Provides hover information for SCSS symbols
pub struct ScssHoverProvider;

impl ScssHoverProvider {
    pub fn new() -> Self {
        Self
    }

    /// Hover for a position, `None` when there is nothing to show
    pub fn hover(&self, workspace: &ScssWorkspace, uri: &Url, position: Position) -> Option<Hover> {
        let context = workspace.query(uri, position)?;

        if let Some(comment) = context.stylesheet.doc_comment_at(context.offset) {
            return self.annotation_hover(&context, comment);
        }

        if let Some(reference) = context.stylesheet.reference_at(context.offset) {
            let range = context.document.range_of(&reference.name_span);
            if let Some(index) = reference.local {
                let declaration = context.stylesheet.declarations.get(index)?;
                let content = declaration_markdown(
                    &declaration.raw,
                    declaration.kind,
                    declaration.doc.as_deref(),
                    &display_path(uri, uri),
                );
                return Some(markdown(content, Some(range)));
            }

            let resolver = Resolver::new(&workspace.graph);
            let resolved = resolver.resolve_reference(context.id?, reference);
            let content = match resolved.first()? {
                Resolved::Symbol(symbol) => {
                    let declared_in = display_path(uri, workspace.graph.uri(symbol.document));
                    // forwarded symbols are shown under the name they are used with
                    let raw = rename_raw(&symbol.raw, symbol.kind, &symbol.name, &reference.name);
                    declaration_markdown(&raw, symbol.kind, symbol.doc.as_deref(), &declared_in)
                }
                Resolved::BuiltIn(member) => builtin_markdown(member),
            };
            return Some(markdown(content, Some(range)));
        }

        let (_, declaration) = context.stylesheet.declaration_at(context.offset)?;
        let content = declaration_markdown(
            &declaration.raw,
            declaration.kind,
            declaration.doc.as_deref(),
            &display_path(uri, uri),
        );
        Some(markdown(content, Some(context.document.range_of(&declaration.name_span))))
    }

    fn annotation_hover(&self, context: &QueryContext<'_>, comment: &Span) -> Option<Hover> {
        let (written, span) = annotation_at(context.text, comment, context.offset)?;
        let annotation = builtins::lookup_annotation(written)?;
        let content = format!(
            "@{}\n{}\n[SassDoc reference]({})",
            written,
            HOVER_SEPARATOR,
            annotation.link()
        );
        Some(markdown(content, Some(context.document.range_of(&span))))
    }
}

impl Default for ScssHoverProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn markdown(value: String, range: Option<tower_lsp::lsp_types::Range>) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range,
    }
}

/// Markdown for a declaration: the code, the SassDoc text and where it is declared
pub fn declaration_markdown(raw: &str, kind: SymbolKind, doc: Option<&str>, declared_in: &str) -> String {
    let mut content = format!("```scss\n{}\n```\n{}\n", raw, HOVER_SEPARATOR);
    if let Some(doc) = doc {
        content.push_str(doc);
        content.push_str("\n\n");
    }
    content.push_str(&format!("{} declared in {}", kind.label(), declared_in));
    content
}

pub fn builtin_markdown(member: &BuiltinMember) -> String {
    format!("{}\n\n[Sass reference]({})", member.description, member.link())
}

/// Declaration text with the declared name replaced
fn rename_raw(raw: &str, kind: SymbolKind, name: &str, new_name: &str) -> String {
    if name == new_name {
        return raw.to_string();
    }
    let (old, new) = match kind {
        SymbolKind::Mixin | SymbolKind::Function => (format!(" {}", name), format!(" {}", new_name)),
        SymbolKind::Variable | SymbolKind::Placeholder => (kind.display_name(name), kind.display_name(new_name)),
    };
    raw.replacen(&old, &new, 1)
}

/// `@name` of an annotation in a `///` comment containing `offset`
fn annotation_at<'t>(text: &'t str, comment: &Span, offset: usize) -> Option<(&'t str, Span)> {
    let line = text.get(comment.clone())?;
    let is_name_char = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';

    let mut search = 0;
    while let Some(found) = line[search..].find('@') {
        let at = search + found;
        let name_len = line[at + 1..]
            .find(|c: char| !is_name_char(c))
            .unwrap_or(line.len() - at - 1);
        let start = comment.start + at;
        let end = start + 1 + name_len;
        if name_len > 0 && start <= offset && offset <= end {
            return Some((&line[at + 1..at + 1 + name_len], start..end));
        }
        search = at + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestWorkspace;

    fn hover_text(test: &TestWorkspace, relative: &str, needle: &str, nth: usize, delta: u32) -> Option<String> {
        let position = test.position(relative, needle, nth, delta);
        ScssHoverProvider::new()
            .hover(&test.workspace, &test.uri(relative), position)
            .map(|hover| match hover.contents {
                HoverContents::Markup(markup) => markup.value,
                other => panic!("Unexpected hover contents {:?}", other),
            })
    }

    #[test]
    fn test_variable_hover() {
        let test = TestWorkspace::with_files(&[
            ("hover/_variables.scss", "$variable: 'value';"),
            ("hover/main.scss", "@use 'variables' as *;\n.a { content: $variable; }"),
        ]);

        assert_eq!(
            hover_text(&test, "hover/main.scss", "$variable", 0, 2).as_deref(),
            Some("```scss\n$variable: 'value';\n```\n____\nVariable declared in _variables.scss")
        );
    }

    #[test]
    fn test_mixin_and_function_hover_with_relative_paths() {
        let test = TestWorkspace::with_files(&[
            ("styles/main.scss", "@import 'includes/mixins', '../functions';\n.a { @include mixin; width: function(); }"),
            ("styles/includes/_mixins.scss", "@mixin mixin() {}"),
            ("_functions.scss", "@function function() { @return 1; }"),
        ]);

        assert_eq!(
            hover_text(&test, "styles/main.scss", "@include mixin", 0, 10).as_deref(),
            Some("```scss\n@mixin mixin()\n```\n____\nMixin declared in includes/_mixins.scss")
        );
        assert_eq!(
            hover_text(&test, "styles/main.scss", "function()", 0, 1).as_deref(),
            Some("```scss\n@function function()\n```\n____\nFunction declared in ../_functions.scss")
        );
    }

    #[test]
    fn test_hover_through_namespace_and_prefix() {
        let test = TestWorkspace::with_files(&[
            ("_mixins.scss", "@mixin mixin() {}"),
            ("_forwarded.scss", "@forward 'mixins' as mix-*;"),
            ("main.scss", "@use 'forwarded' as ns;\n.a { @include ns.mix-mixin; }"),
        ]);

        assert_eq!(
            hover_text(&test, "main.scss", "mix-mixin", 0, 2).as_deref(),
            Some("```scss\n@mixin mix-mixin()\n```\n____\nMixin declared in _mixins.scss")
        );
    }

    #[test]
    fn test_sassdoc_is_shown() {
        let test = TestWorkspace::with_files(&[(
            "main.scss",
            "/// Primary brand color\n$brand: red;\n.a { color: $brand; }",
        )]);

        assert_eq!(
            hover_text(&test, "main.scss", "$brand", 1, 1).as_deref(),
            Some("```scss\n$brand: red;\n```\n____\nPrimary brand color\n\nVariable declared in main.scss")
        );
    }

    #[test]
    fn test_builtin_hover() {
        let test = TestWorkspace::with_files(&[(
            "main.scss",
            "@use 'sass:math';\n.a { width: math.round(1.5); height: round(2.5); }",
        )]);
        let expected = "Rounds $number to the nearest whole number.\n\n[Sass reference](https://sass-lang.com/documentation/modules/math#round)";

        assert_eq!(hover_text(&test, "main.scss", "round", 0, 1).as_deref(), Some(expected));
        assert_eq!(hover_text(&test, "main.scss", "round", 1, 1).as_deref(), Some(expected));
    }

    #[test]
    fn test_sassdoc_annotation_hover() {
        let test = TestWorkspace::with_files(&[(
            "main.scss",
            "/// Some text\n/// @type Color\n/// @param {Number} $n\n$brand: red;",
        )]);

        assert_eq!(
            hover_text(&test, "main.scss", "@type", 0, 2).as_deref(),
            Some("@type\n____\n[SassDoc reference](http://sassdoc.com/annotations/#type)")
        );
        assert_eq!(
            hover_text(&test, "main.scss", "@param", 0, 1).as_deref(),
            Some("@param\n____\n[SassDoc reference](http://sassdoc.com/annotations/#parameter)")
        );
        assert_eq!(hover_text(&test, "main.scss", "Some text", 0, 2), None);
    }

    #[test]
    fn test_declaration_and_local_hover() {
        let test = TestWorkspace::with_files(&[(
            "main.scss",
            "$top: 1;\n@mixin m($size) { width: $size; }",
        )]);

        assert_eq!(
            hover_text(&test, "main.scss", "$top", 0, 1).as_deref(),
            Some("```scss\n$top: 1;\n```\n____\nVariable declared in main.scss")
        );
        let local = hover_text(&test, "main.scss", "$size", 1, 1).unwrap();
        assert!(local.ends_with("Variable declared in main.scss"));
    }

    #[test]
    fn test_unresolved_reference_has_no_hover() {
        let test = TestWorkspace::with_files(&[("main.scss", ".a { color: $missing; }")]);
        assert_eq!(hover_text(&test, "main.scss", "$missing", 0, 1), None);
    }

    #[test]
    fn test_hover_in_host_document() {
        let test = TestWorkspace::with_files(&[
            ("_variables.scss", "$variable: 'value';"),
            (
                "AppButton.vue",
                "<template>\n  <button>é</button>\n</template>\n<style lang=\"scss\">\n@use 'variables' as *;\n.btn { content: $variable; }\n</style>\n",
            ),
        ]);

        assert_eq!(
            hover_text(&test, "AppButton.vue", "$variable", 0, 3).as_deref(),
            Some("```scss\n$variable: 'value';\n```\n____\nVariable declared in _variables.scss")
        );
        assert_eq!(hover_text(&test, "AppButton.vue", "button", 0, 1), None);
    }
}
