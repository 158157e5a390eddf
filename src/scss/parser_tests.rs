use super::*;
use crate::scss::syntax::{ModuleRuleKind, SymbolKind};

fn parse(content: &str) -> Stylesheet {
    ScssParser::new().parse(content)
}

#[test]
fn test_variable_declarations_and_references() {
    let sheet = parse("$a: 1;\n$b:   $a + 1 ;");

    assert!(!sheet.has_errors());
    assert_eq!(sheet.declarations.len(), 2);
    assert_eq!(sheet.declarations[0].raw, "$a: 1;");
    assert_eq!(sheet.declarations[1].raw, "$b: $a + 1;");
    assert!(sheet.declarations.iter().all(|d| d.is_top_level()));

    assert_eq!(sheet.references.len(), 1);
    let reference = &sheet.references[0];
    assert_eq!(reference.kind, SymbolKind::Variable);
    assert_eq!(reference.name, "a");
    assert_eq!(reference.local, None);
}

#[test]
fn test_mixin_parameters_are_locals() {
    let content = "@mixin button($size, $color: $primary) {\n  $local: $size * 2;\n  padding: $local;\n  color: $color;\n}\n";
    let sheet = parse(content);

    let mixin = &sheet.declarations[0];
    assert_eq!(mixin.kind, SymbolKind::Mixin);
    assert_eq!(mixin.name, "button");
    assert_eq!(mixin.raw, "@mixin button($size, $color: $primary)");
    assert_eq!(mixin.parameters.as_deref(), Some("$size, $color: $primary"));
    assert_eq!(mixin.span, 0..content.trim_end().len());
    assert!(mixin.is_top_level());

    let names: Vec<&str> = sheet.declarations.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["button", "size", "color", "local"]);
    assert_eq!(sheet.top_level_declarations().count(), 1);

    let body = content.find('{').unwrap()..content.trim_end().len();
    assert_eq!(sheet.declarations[1].scope, Some(body.clone()));
    assert_eq!(sheet.declarations[3].scope, Some(body));

    let refs: Vec<(&str, Option<usize>)> = sheet
        .references
        .iter()
        .map(|r| (r.name.as_str(), r.local))
        .collect();
    assert_eq!(
        refs,
        vec![("primary", None), ("size", Some(1)), ("local", Some(3)), ("color", Some(2))]
    );
}

#[test]
fn test_callable_without_parameters() {
    let sheet = parse("@mixin mixin {}\n@function double($n) { @return $n * 2; }");
    assert_eq!(sheet.declarations[0].raw, "@mixin mixin()");
    assert_eq!(sheet.declarations[1].raw, "@function double($n)");
    assert_eq!(sheet.declarations[1].kind, SymbolKind::Function);
    assert_eq!(sheet.references[0].local, Some(2));
}

#[test]
fn test_namespaced_references() {
    let content = "@use \"sass:math\";\n@use \"src/variables\" as vars;\n.a { width: math.div(vars.$gap, 2); @include vars.mixin; }";
    let sheet = parse(content);

    assert_eq!(sheet.module_rules.len(), 2);
    assert_eq!(sheet.module_rules[0].link, "sass:math");
    assert_eq!(sheet.module_rules[0].namespace, None);
    assert_eq!(sheet.module_rules[1].namespace.as_deref(), Some("vars"));
    assert_eq!(&content[sheet.module_rules[1].link_span.clone()], "src/variables");

    let refs: Vec<(SymbolKind, Option<&str>, &str)> = sheet
        .references
        .iter()
        .map(|r| (r.kind, r.namespace.as_deref(), r.name.as_str()))
        .collect();
    assert_eq!(
        refs,
        vec![
            (SymbolKind::Function, Some("math"), "div"),
            (SymbolKind::Variable, Some("vars"), "gap"),
            (SymbolKind::Mixin, Some("vars"), "mixin"),
        ]
    );

    let gap = &sheet.references[1];
    assert_eq!(&content[gap.span.clone()], "vars.$gap");
    assert_eq!(&content[gap.name_span.clone()], "$gap");
}

#[test]
fn test_pseudo_classes_are_not_function_calls() {
    let sheet = parse(".a:not(.b) { color:darken($c, 10%); }");
    let names: Vec<&str> = sheet.references.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["darken", "c"]);
}

#[test]
fn test_keyword_arguments_are_not_references() {
    let sheet = parse(".a { @include button($size: $large); }");
    let names: Vec<&str> = sheet.references.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["button", "large"]);
}

#[test]
fn test_forward_prefix_show_and_hide() {
    let sheet = parse(
        "@forward \"src/list\" as list-* hide list-reset, $list-horizontal-padding;\n@forward 'a' show $x, mix;",
    );

    let first = &sheet.module_rules[0];
    assert_eq!(first.kind, ModuleRuleKind::Forward);
    assert_eq!(first.prefix.as_deref(), Some("list-"));
    assert_eq!(first.hide, vec!["list-reset", "$list-horizontal-padding"]);

    let second = &sheet.module_rules[1];
    assert_eq!(second.link, "a");
    assert_eq!(second.show, vec!["$x", "mix"]);
}

#[test]
fn test_use_wildcard_namespace() {
    let sheet = parse("@use 'theme' as *;\n@use 'theme2' with ($primary: $brand);");
    assert_eq!(sheet.module_rules[0].namespace.as_deref(), Some("*"));
    assert_eq!(sheet.references.len(), 1);
    assert_eq!(sheet.references[0].name, "brand");
}

#[test]
fn test_import_skips_plain_css() {
    let sheet = parse("@import \"a\", \"b.css\", 'c', \"https://fonts.example/x\";");
    let links: Vec<&str> = sheet.module_rules.iter().map(|m| m.link.as_str()).collect();
    assert_eq!(links, vec!["a", "c"]);
    assert!(sheet.module_rules.iter().all(|m| m.kind == ModuleRuleKind::Import));
}

#[test]
fn test_placeholders_and_extend() {
    let sheet = parse("%message { border: 1px; }\n.ok { @extend %message; }");
    assert_eq!(sheet.declarations.len(), 1);
    assert_eq!(sheet.declarations[0].kind, SymbolKind::Placeholder);
    assert_eq!(sheet.declarations[0].name, "message");
    assert_eq!(sheet.declarations[0].raw, "%message");

    assert_eq!(sheet.references.len(), 1);
    assert_eq!(sheet.references[0].kind, SymbolKind::Placeholder);
    assert_eq!(sheet.references[0].name, "message");
}

#[test]
fn test_sassdoc_attaches_to_next_declaration() {
    let sheet = parse("/// Primary brand color\n/// @type Color\n$brand: #f00;\n\n$plain: 1;");
    assert_eq!(sheet.doc_comments.len(), 2);
    assert_eq!(sheet.declarations[0].doc.as_deref(), Some("Primary brand color\n@type Color"));
    assert_eq!(sheet.declarations[1].doc, None);
}

#[test]
fn test_local_shadowing() {
    let sheet = parse("$x: 1;\n.a { $x: 2; width: $x; }\n.b { width: $x; }");
    assert_eq!(sheet.references[0].local, Some(1));
    assert_eq!(sheet.references[1].local, None);
    assert!(!sheet.declarations[1].is_top_level());
}

#[test]
fn test_global_flag_assigns_instead_of_declaring() {
    let sheet = parse(".a { $x: 1 !global; }");
    assert!(sheet.declarations.is_empty());
    assert_eq!(sheet.references.len(), 1);
}

#[test]
fn test_each_variables_are_locals() {
    let sheet = parse("@each $name, $glyph in $icons { .#{$name} { content: $glyph; } }");
    let refs: Vec<(&str, Option<usize>)> = sheet
        .references
        .iter()
        .map(|r| (r.name.as_str(), r.local))
        .collect();
    assert_eq!(refs, vec![("icons", None), ("name", Some(0)), ("glyph", Some(1))]);
    assert!(!sheet.has_errors());
}

#[test]
fn test_url_is_not_a_function_reference() {
    let sheet = parse("$bg: url(//cdn/x.png); // note");
    assert!(sheet.references.is_empty());
    assert_eq!(sheet.declarations[0].raw, "$bg: url(//cdn/x.png);");
}

#[test]
fn test_errors_keep_partial_outline() {
    let sheet = parse("$ok: 1;\n.a { color: red;\n$after: foo(1;");
    assert!(sheet.has_errors());
    let codes: Vec<&str> = sheet.diagnostics.iter().map(|d| d.code).collect();
    assert!(codes.contains(&"unclosed-block"));
    assert!(codes.contains(&"syntax-error"));
    assert_eq!(sheet.declarations[0].raw, "$ok: 1;");
}

#[test]
fn test_broken_statement_inside_mixin_keeps_locals() {
    let content = "$size: 1px;\n@mixin m($gap) { $inner: 2; width: $ }\n.b { height: $size }";
    let sheet = parse(content);

    assert!(sheet.has_errors());
    let names: Vec<&str> = sheet.declarations.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["size", "m", "gap", "inner"]);
    let body = content.find('{').unwrap()..content.find('}').unwrap() + 1;
    assert_eq!(sheet.declarations[3].scope, Some(body));
    assert_eq!(sheet.references.last().map(|r| r.name.as_str()), Some("size"));
}

#[test]
fn test_unexpected_closing_brace() {
    let sheet = parse("$a: 1;\n}\n$b: 2;");
    assert!(sheet.has_errors());
    assert_eq!(sheet.diagnostics[0].code, "unexpected-brace");
    assert_eq!(sheet.top_level_declarations().count(), 2);
}

#[test]
fn test_lookups_by_offset() {
    let content = "@use 'vars';\n$a: vars.$b;";
    let sheet = parse(content);

    let b = content.find("$b").unwrap();
    assert_eq!(sheet.reference_at(b + 1).map(|r| r.name.as_str()), Some("b"));
    let a = content.find("$a").unwrap();
    assert_eq!(sheet.declaration_at(a).map(|(i, _)| i), Some(0));
    assert_eq!(sheet.module_rule_at(6).map(|m| m.link.as_str()), Some("vars"));
}
