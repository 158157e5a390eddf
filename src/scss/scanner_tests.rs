use super::*;
use crate::scss::settings::ScssSettings;
use crate::scss::symbols::EdgeKind;
use crate::test_utils::TestWorkspace;

fn symbol_names(test: &TestWorkspace, relative: &str) -> Vec<String> {
    test.workspace
        .graph
        .symbols(test.id(relative))
        .iter()
        .map(|s| s.display_name())
        .collect()
}

#[test]
fn test_link_candidates_order() {
    let candidates: Vec<String> = link_candidates(Path::new("/ws/b"))
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        candidates,
        vec![
            "/ws/_b.scss",
            "/ws/b.scss",
            "/ws/_b.sass",
            "/ws/b.sass",
            "/ws/b/_index.scss",
            "/ws/b/index.scss",
            "/ws/_b.css",
            "/ws/b.css",
        ]
    );

    let candidates = link_candidates(Path::new("/ws/_b.scss"));
    assert_eq!(candidates, vec![PathBuf::from("/ws/_b.scss"), PathBuf::from("/ws/b.scss")]);
}

#[test]
fn test_scan_indexes_top_level_symbols_and_links() {
    let test = TestWorkspace::with_files(&[
        ("main.scss", "@use \"variables\";\n@use 'sass:math';\n.a { $local: 1; }"),
        ("_variables.scss", "$x: 1;\n@mixin m($p) { $inner: $p; }\n%ph { a: b; }\n@function f() { @return 1; }"),
    ]);

    assert_eq!(symbol_names(&test, "_variables.scss"), vec!["$x", "m", "%ph", "f"]);
    assert!(symbol_names(&test, "main.scss").is_empty());

    let edges = test.workspace.graph.edges(test.id("main.scss"));
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].target, EdgeTarget::Document(test.id("_variables.scss")));
    assert!(matches!(&edges[0].kind, EdgeKind::Use { .. }));
    assert_eq!(edges[1].target, EdgeTarget::BuiltIn("math".to_string()));
}

#[test]
fn test_index_files_and_relative_links() {
    let test = TestWorkspace::with_files(&[
        ("styles/main.scss", "@use '../theme';\n@import 'parts/button';"),
        ("theme/_index.scss", "$primary: red;"),
        ("styles/parts/_button.scss", "@mixin button {}"),
    ]);

    let edges = test.workspace.graph.edges(test.id("styles/main.scss"));
    assert_eq!(edges[0].target, EdgeTarget::Document(test.id("theme/_index.scss")));
    assert_eq!(edges[1].target, EdgeTarget::Document(test.id("styles/parts/_button.scss")));
}

#[test]
fn test_failures_do_not_abort_the_batch() {
    let mut test = TestWorkspace::new();
    let good = test.write("good.scss", "$ok: 1;");
    let broken = test.write("broken.scss", "$kept: 1;\n.a {");
    let missing = test.path("missing.scss");

    let report = test.workspace.scan(&[missing.clone(), broken.clone(), good]);

    assert_eq!(report.indexed, 2);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].path, missing);
    assert!(matches!(report.failures[0].error, ScssError::Io { .. }));
    assert_eq!(report.failures[1].path, broken);
    assert!(matches!(report.failures[1].error, ScssError::Parse { .. }));

    assert_eq!(symbol_names(&test, "good.scss"), vec!["$ok"]);
    assert_eq!(symbol_names(&test, "broken.scss"), vec!["$kept"]);
}

#[test]
fn test_parse_failure_keeps_last_good_symbols() {
    let mut test = TestWorkspace::with_files(&[("a.scss", "$a: 1;\n$b: 2;")]);

    test.open("a.scss", "$a: 1;\n$b: 2;\n$c: 'unterminated");
    assert_eq!(symbol_names(&test, "a.scss"), vec!["$a", "$b"]);

    test.open("a.scss", "$a: 1;\n$c: 3;");
    assert_eq!(symbol_names(&test, "a.scss"), vec!["$a", "$c"]);
}

#[test]
fn test_rescan_is_idempotent() {
    let mut test = TestWorkspace::with_files(&[
        ("a.scss", "@use 'b' as ns;\n$a: ns.$x;"),
        ("_b.scss", "$x: 1;"),
    ]);
    let first: Vec<_> = test
        .workspace
        .graph
        .documents()
        .into_iter()
        .map(|id| test.workspace.graph.entry(id).cloned())
        .collect();

    test.scan();
    let second: Vec<_> = test
        .workspace
        .graph
        .documents()
        .into_iter()
        .map(|id| test.workspace.graph.entry(id).cloned())
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_update_touches_only_one_document() {
    let mut test = TestWorkspace::with_files(&[("a.scss", "$a: 1;"), ("b.scss", "$b: 1;")]);
    let before = test.workspace.graph.entry(test.id("b.scss")).cloned();

    test.open("a.scss", "$changed: 1;");

    assert_eq!(symbol_names(&test, "a.scss"), vec!["$changed"]);
    assert_eq!(test.workspace.graph.entry(test.id("b.scss")).cloned(), before);
}

#[test]
fn test_host_documents_are_indexed_through_projection() {
    let test = TestWorkspace::with_files(&[(
        "components/App.vue",
        "<template><div/></template>\n<style lang=\"scss\">\n$app-color: blue;\n</style>\n",
    )]);
    assert_eq!(symbol_names(&test, "components/App.vue"), vec!["$app-color"]);
}

#[test]
fn test_removal_cascades_and_relinks() {
    let mut test = TestWorkspace::with_files(&[("a.scss", "@use 'b';"), ("_b.scss", "$x: 1;")]);
    let a = test.id("a.scss");
    let b = test.id("_b.scss");

    let deleted = test.delete("_b.scss");
    let touched = test.workspace.remove_paths(&[deleted]);

    assert!(touched.contains(&test.uri("_b.scss")));
    assert!(touched.contains(&test.uri("a.scss")));
    assert!(test.workspace.graph.entry(b).is_none());
    assert!(!test.workspace.documents.contains(&test.uri("_b.scss")));
    assert_eq!(test.workspace.graph.edges(a)[0].target, EdgeTarget::Unresolved);
    assert!(test.workspace.graph.all_symbols().all(|s| s.document != b));
}

#[test]
fn test_removing_a_directory() {
    let mut test = TestWorkspace::with_files(&[("lib/_a.scss", "$a: 1;"), ("lib/_b.scss", "$b: 1;"), ("c.scss", "$c: 1;")]);
    let deleted = test.delete("lib");
    let touched = test.workspace.remove_paths(&[deleted]);
    assert_eq!(touched.len(), 2);
    assert_eq!(test.workspace.graph.all_symbols().count(), 1);
}

#[test]
fn test_created_file_relinks_dangling_edges() {
    let mut test = TestWorkspace::with_files(&[("a.scss", "@use 'later';")]);
    let a = test.id("a.scss");
    assert_eq!(test.workspace.graph.edges(a)[0].target, EdgeTarget::Unresolved);

    let created = test.write("_later.scss", "$late: 1;");
    test.workspace.rescan_paths(&[created]);

    assert_eq!(test.workspace.graph.edges(a)[0].target, EdgeTarget::Document(test.id("_later.scss")));
}

#[test]
fn test_imported_files_outside_the_scan_are_indexed() {
    let files = [
        ("main.scss", "@use '~lib/colors';"),
        ("node_modules/lib/_colors.scss", "$brand: red;"),
    ];

    let test = TestWorkspace::with_files(&files);
    assert_eq!(symbol_names(&test, "node_modules/lib/_colors.scss"), vec!["$brand"]);

    let mut test = TestWorkspace::with_settings(ScssSettings {
        scan_imported_files: false,
        ..Default::default()
    });
    for (relative, content) in files {
        test.write(relative, content);
    }
    test.scan();
    let colors = test.workspace.graph.id(&test.uri("node_modules/lib/_colors.scss")).unwrap();
    assert!(!test.workspace.graph.contains(colors));
}

#[test]
fn test_cyclic_links_scan_completes() {
    let test = TestWorkspace::with_files(&[("_x.scss", "@use 'y';\n$x: 1;"), ("_y.scss", "@use 'x';\n$y: 1;")]);
    let x = test.id("_x.scss");
    let y = test.id("_y.scss");
    assert_eq!(test.workspace.graph.edges(x)[0].target, EdgeTarget::Document(y));
    assert_eq!(test.workspace.graph.edges(y)[0].target, EdgeTarget::Document(x));
}

#[test]
fn test_close_reloads_from_disk() {
    let mut test = TestWorkspace::with_files(&[("_a.scss", "$disk: 1;")]);
    test.open("_a.scss", "$edited: 1;");
    assert_eq!(symbol_names(&test, "_a.scss"), vec!["$edited"]);

    let touched = test.workspace.close(&test.uri("_a.scss"));

    assert_eq!(touched, vec![test.uri("_a.scss")]);
    assert!(!test.workspace.documents.is_open(&test.uri("_a.scss")));
    assert_eq!(symbol_names(&test, "_a.scss"), vec!["$disk"]);
}

#[test]
fn test_close_forgets_unsaved_documents() {
    let mut test = TestWorkspace::with_files(&[("main.scss", "@use 'draft';")]);
    test.open("_draft.scss", "$draft: 1;");
    test.workspace.update(&test.uri("main.scss"));
    let main = test.id("main.scss");
    assert_eq!(test.workspace.graph.edges(main)[0].target, EdgeTarget::Document(test.id("_draft.scss")));

    let touched = test.workspace.close(&test.uri("_draft.scss"));

    assert!(touched.contains(&test.uri("main.scss")));
    assert!(!test.workspace.documents.contains(&test.uri("_draft.scss")));
    assert_eq!(test.workspace.graph.edges(main)[0].target, EdgeTarget::Unresolved);
}
