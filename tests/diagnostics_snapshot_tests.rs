//! Snapshot tests for semantic diagnostics.
//!
//! Each diagnostic is rendered on one line as `module:line:col: code message`, which keeps the snapshots stable
//! across changes to the graphical renderer.

use asthra::config::AnalyzerConfig;
use asthra::frontend::module::SourceModule;
use asthra::frontend::pipeline;

fn render_diagnostics(modules: &[(&str, &str)]) -> String {
    let sources = modules.iter().map(|(name, src)| SourceModule::new(*name, *src)).collect();
    let compilation = pipeline::run(sources, &AnalyzerConfig::default());
    compilation
        .diagnostics()
        .iter()
        .map(|(index, d)| {
            format!(
                "{}:{}:{}: {} {}",
                compilation.modules[*index].name,
                d.span.line,
                d.span.col,
                d.kind.code(),
                d.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn snapshot_semantic_errors_in_source_order() {
    let source = r#"package demo;
pub enum Color { Red, Green, Blue }
pub fn pick(c: Color) -> i32 {
    match c {
        Color.Red => 1,
        Color.Green => 2
    }
    let total: i32 = missing;
    total = 3;
    return total;
}
"#;
    insta::assert_snapshot!(render_diagnostics(&[("demo", source)]), @r"
    demo:4:5: asthra::exhaustiveness Non-exhaustive match: missing patterns for Color.Blue
    demo:8:22: asthra::unresolved Unknown symbol 'missing'
    demo:9:5: asthra::mutability Cannot assign to 'total' - binding is immutable
    ");
}

#[test]
fn snapshot_import_cycle() {
    let modules = [
        ("a", "package a;\nimport \"./b\";\n"),
        ("b", "package b;\nimport \"./a\";\n"),
    ];
    insta::assert_snapshot!(render_diagnostics(&modules), @r"
    a:2:1: asthra::import_cycle Import cycle detected: a -> b -> a
    b:2:1: asthra::import_cycle Import cycle detected: b -> a -> b
    ");
}

#[test]
fn snapshot_clean_program_has_no_diagnostics() {
    let source = "package demo;\npub fn main(none) -> void { log(\"ok\"); }\n";
    insta::assert_snapshot!(render_diagnostics(&[("demo", source)]), @"");
}
