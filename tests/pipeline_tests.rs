//! End-to-end tests of the multi-module front end.
//!
//! Each test hands a set of in-memory modules to `pipeline::run` and inspects the combined diagnostics, the
//! analysis schedule, and the per-module results.

use asthra::config::AnalyzerConfig;
use asthra::frontend::diagnostics::ErrorKind;
use asthra::frontend::module::SourceModule;
use asthra::frontend::pipeline::{self, Compilation};
use asthra::frontend::resolver::ResolveError;
use pretty_assertions::assert_eq;

fn run(modules: &[(&str, &str)]) -> Compilation {
    run_with(modules, &AnalyzerConfig::default())
}

fn run_with(modules: &[(&str, &str)], config: &AnalyzerConfig) -> Compilation {
    let sources = modules.iter().map(|(name, src)| SourceModule::new(*name, *src)).collect();
    pipeline::run(sources, config)
}

fn kinds_of(compilation: &Compilation, module: &str) -> Vec<ErrorKind> {
    let index = compilation.module_index(module).expect("module exists");
    compilation.module_diagnostics(index).iter().map(|d| d.kind).collect()
}

// ============================================================================
// Cross-module analysis
// ============================================================================

#[test]
fn test_cross_module_call_is_type_checked() {
    let geo = "package geo;\npub fn area(side: i32) -> i32 { return side * side; }\n";
    let ok = run(&[
        ("geo", geo),
        ("main", "package main;\nimport \"./geo\";\npub fn main(none) -> i32 { return geo.area(3); }\n"),
    ]);
    assert!(!ok.has_errors(), "{:#?}", ok.diagnostics());

    let bad = run(&[
        ("geo", geo),
        ("main", "package main;\nimport \"./geo\";\npub fn main(none) -> i32 { return geo.area(true); }\n"),
    ]);
    assert_eq!(kinds_of(&bad, "main"), vec![ErrorKind::TypeMismatch]);
    assert_eq!(kinds_of(&bad, "geo"), vec![]);
}

#[test]
fn test_private_member_is_not_visible_from_other_modules() {
    let compilation = run(&[
        ("util", "package util;\npriv fn helper(none) -> i32 { return 1; }\n"),
        ("app", "package app;\nimport \"./util\";\npub fn f(none) -> i32 { return util.helper(); }\n"),
    ]);
    let index = compilation.module_index("app").expect("app");
    let diagnostics = compilation.module_diagnostics(index);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::Visibility);
    assert!(diagnostics[0].message.contains("'helper'"));
}

#[test]
fn test_unknown_member_of_imported_module() {
    let compilation = run(&[
        ("util", "package util;\npub fn one(none) -> i32 { return 1; }\n"),
        ("app", "package app;\nimport \"./util\";\npub fn f(none) -> i32 { return util.two(); }\n"),
    ]);
    assert_eq!(kinds_of(&compilation, "app"), vec![ErrorKind::Unresolved]);
}

#[test]
fn test_aliased_import_binds_alias() {
    let compilation = run(&[
        ("net/http", "package http;\npub fn status(none) -> i32 { return 200; }\n"),
        (
            "net/server",
            "package server;\nimport \"./http\" as web;\npub fn f(none) -> i32 { return web.status(); }\n",
        ),
    ]);
    assert!(!compilation.has_errors(), "{:#?}", compilation.diagnostics());
}

#[test]
fn test_external_imports_are_opaque() {
    let compilation = run(&[(
        "app",
        "package app;\nimport \"stdlib/io\";\npub fn f(none) -> void { io.print(\"hello\"); }\n",
    )]);
    assert!(!compilation.has_errors(), "{:#?}", compilation.diagnostics());
}

// ============================================================================
// Scheduling and failure isolation
// ============================================================================

#[test]
fn test_analysis_follows_dependency_waves() {
    let compilation = run(&[
        ("c", "package c;\nimport \"./b\";\npub fn f(none) -> i32 { return b.g(); }\n"),
        ("b", "package b;\nimport \"./a\";\npub fn g(none) -> i32 { return a.h(); }\n"),
        ("a", "package a;\npub fn h(none) -> i32 { return 1; }\n"),
    ]);
    assert!(!compilation.has_errors(), "{:#?}", compilation.diagnostics());
    let waves: Vec<Vec<&str>> = compilation
        .graph
        .waves()
        .iter()
        .map(|wave| wave.iter().map(|&i| compilation.modules[i].name.as_str()).collect())
        .collect();
    assert_eq!(waves, vec![vec!["a"], vec!["b"], vec!["c"]]);
    assert!(compilation.analyzed.iter().all(Option::is_some));
}

#[test]
fn test_import_cycle_skips_members_only() {
    let compilation = run(&[
        ("a", "package a;\nimport \"./b\";\n"),
        ("b", "package b;\nimport \"./a\";\n"),
        ("c", "package c;\npub fn f(none) -> i32 { return missing; }\n"),
    ]);
    assert_eq!(compilation.resolve_errors.len(), 2);
    assert!(
        compilation
            .resolve_errors
            .iter()
            .all(|e| matches!(e, ResolveError::CyclicImport { .. }))
    );
    assert!(compilation.analyzed[0].is_none());
    assert!(compilation.analyzed[1].is_none());
    assert_eq!(kinds_of(&compilation, "a"), vec![ErrorKind::ImportCycle]);
    // The unrelated module is still analysed and its own error reported.
    assert_eq!(kinds_of(&compilation, "c"), vec![ErrorKind::Unresolved]);
}

#[test]
fn test_dependents_of_broken_modules_are_still_analysed() {
    let compilation = run(&[
        ("broken", "package broken;\npub fn f(none) -> i32 { return 1 }\n"),
        ("app", "package app;\nimport \"./broken\";\npub fn g(none) -> i32 { return broken.f(); }\n"),
    ]);
    let broken = compilation.module_index("broken").expect("broken");
    let app = compilation.module_index("app").expect("app");
    assert!(compilation.analyzed[broken].is_none());
    assert!(compilation.analyzed[app].is_some());
    let broken_kinds = kinds_of(&compilation, "broken");
    assert!(!broken_kinds.is_empty());
    assert!(broken_kinds.iter().all(|k| *k == ErrorKind::Syntax));
    assert_eq!(kinds_of(&compilation, "app"), vec![]);
}

#[test]
fn test_alias_collision_is_reported() {
    let compilation = run(&[
        ("a", "package a;\n"),
        ("b", "package b;\n"),
        ("main", "package main;\nimport \"./a\" as util;\nimport \"./b\" as util;\n"),
    ]);
    assert!(
        compilation
            .resolve_errors
            .iter()
            .any(|e| matches!(e, ResolveError::AliasCollision { alias, .. } if alias == "util"))
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_error_cap_is_per_module() {
    let noisy = "package noisy;\npub fn f(none) -> void { let a: i32 = u1; let b: i32 = u2; let c: i32 = u3; }\n";
    let compilation = run_with(
        &[("noisy", noisy), ("other", "package other;\npub fn g(none) -> i32 { return v; }\n")],
        &AnalyzerConfig::default().with_max_errors(1),
    );
    let noisy_result = compilation.analyzed[0].as_ref().expect("analysed");
    assert_eq!(noisy_result.diagnostics.len(), 1);
    assert_eq!(noisy_result.suppressed, 2);
    assert_eq!(kinds_of(&compilation, "other"), vec![ErrorKind::Unresolved]);
    assert_eq!(compilation.error_count(), 4);
}

#[test]
fn test_entry_module_can_be_named_explicitly() {
    let source = "package app;\npub fn main(code: i32) -> void { }\n";
    let default = run(&[("app", source)]);
    assert!(!default.has_errors());

    let explicit = run_with(&[("app", source)], &AnalyzerConfig::default().with_entry_module("app"));
    assert_eq!(kinds_of(&explicit, "app"), vec![ErrorKind::TypeMismatch]);
}

#[test]
fn test_sequential_run_matches_parallel_run() {
    let modules = [
        ("a", "package a;\npub fn one(none) -> i32 { return 1; }\n"),
        ("b", "package b;\nimport \"./a\";\npub fn two(none) -> string { return a.one(); }\n"),
        ("c", "package c;\nimport \"./a\";\npub fn three(none) -> i32 { let x: i32 = 1; x = 3; return x; }\n"),
    ];
    let parallel = run(&modules);
    let sequential = run_with(&modules, &AnalyzerConfig::default().with_parallel(false));
    assert_eq!(parallel.diagnostics(), sequential.diagnostics());
    assert_eq!(parallel.error_count(), 2);
}
