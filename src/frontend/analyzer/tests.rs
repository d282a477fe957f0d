//! Analyzer unit tests.

use super::*;
use crate::frontend::diagnostics::ErrorKind;
use crate::frontend::parser;
use asthra_core::lang::types::PrimitiveId;
use pretty_assertions::assert_eq;

fn parse_program(source: &str) -> Program {
    let parsed = parser::parse_source(source, FileId(0));
    assert!(parsed.errors.is_empty(), "unexpected syntax errors: {:?}", parsed.errors);
    parsed.program
}

fn analyze_str(source: &str) -> AnalyzedModule {
    analyze(&parse_program(source), &AnalyzerConfig::default())
}

fn kinds(analyzed: &AnalyzedModule) -> Vec<ErrorKind> {
    analyzed.diagnostics.iter().map(|e| e.kind).collect()
}

fn assert_clean(source: &str) {
    let analyzed = analyze_str(source);
    assert!(analyzed.diagnostics.is_empty(), "unexpected diagnostics: {:#?}", analyzed.diagnostics);
}

fn assert_single(source: &str, kind: ErrorKind) -> CompileError {
    let analyzed = analyze_str(source);
    assert_eq!(kinds(&analyzed), vec![kind], "diagnostics: {:#?}", analyzed.diagnostics);
    analyzed.diagnostics.into_iter().next().expect("one diagnostic")
}

fn function_body<'p>(program: &'p Program, name: &str) -> &'p Block {
    program
        .declarations
        .iter()
        .find_map(|decl| match &decl.node {
            Declaration::Function(f) if f.name.node == name => Some(&f.body),
            _ => None,
        })
        .expect("function not found")
}

// ========================================
// Well-formed programs
// ========================================

#[test]
fn test_well_formed_module_has_no_diagnostics() {
    assert_clean(
        r#"package t;
pub struct Point { x: i32, y: i32 }
pub enum Shape { Circle(i32), Square(i32), Empty }
impl Point {
    pub fn new(x: i32, y: i32) -> Point { return Point { x: x, y: y }; }
    pub fn sum(self) -> i32 { return self.x + self.y; }
}
priv const LIMIT: i32 = 10 * 2;
pub fn area(s: Shape) -> i32 {
    match s {
        Shape.Circle(r) => { return r * r * 3; }
        Shape.Square(side) => { return side * side; }
        Shape.Empty => { return 0; }
    }
    return 0;
}
pub fn main(none) -> void {
    let p: Point = Point::new(1, 2);
    let total: i32 = p.sum() + LIMIT;
    let mut acc: i64 = 0;
    for i in range(10) { acc = acc + 1; }
    if total > 3 { log("big"); } else { log("small"); }
}
"#,
    );
}

#[test]
fn test_analysis_is_idempotent() {
    let program = parse_program(
        r#"package t;
pub enum Color { Red, Green, Blue }
pub fn pick(c: Color) -> i32 {
    match c {
        Color.Red => { return 1; }
        _ => { return 2; }
    }
    return 0;
}
"#,
    );
    let config = AnalyzerConfig::default();
    let first = analyze(&program, &config);
    let second = analyze(&program, &config);
    assert!(first.diagnostics.is_empty());
    assert!(second.diagnostics.is_empty());
    assert_eq!(first.symbols, second.symbols);
    assert_eq!(first.runtime, second.runtime);
}

#[test]
fn test_expression_types_are_recorded() {
    let program = parse_program("package t;\npub fn f(none) -> void { let x: u8 = 7; }");
    let analyzed = analyze(&program, &AnalyzerConfig::default());
    let Statement::Let(let_stmt) = &function_body(&program, "f")[0].node else {
        panic!("expected let");
    };
    assert_eq!(
        analyzed.info.expr_type(let_stmt.value.span),
        Some(&ResolvedType::Primitive(PrimitiveId::U8))
    );
}

// ========================================
// Name resolution
// ========================================

#[test]
fn test_unknown_symbol_is_reported() {
    let error = assert_single("package t;\npub fn f(none) -> void { let x: i32 = y; }", ErrorKind::Unresolved);
    assert!(error.message.contains("'y'"));
}

#[test]
fn test_duplicate_top_level_declaration() {
    let error = assert_single(
        "package t;\npub fn f(none) -> void { }\npub fn f(none) -> void { }",
        ErrorKind::DuplicateDeclaration,
    );
    assert_eq!(error.notes.len(), 1);
}

#[test]
fn test_block_scopes_end_at_closing_brace() {
    let error = assert_single(
        "package t;\npub fn f(none) -> i32 { if true { let inner: i32 = 1; } return inner; }",
        ErrorKind::Unresolved,
    );
    assert!(error.message.contains("inner"));
}

#[test]
fn test_user_function_shadows_predeclared_log() {
    let analyzed = analyze_str(
        r#"package t;
pub fn log(level: string, msg: string) -> void { }
pub fn main(none) -> void { log("INFO", "x"); }
"#,
    );
    assert!(analyzed.diagnostics.is_empty(), "{:#?}", analyzed.diagnostics);
    let targets: Vec<&CallTarget> = analyzed.info.call_targets.values().collect();
    assert_eq!(targets.len(), 1);
    assert!(matches!(
        targets[0],
        CallTarget::Function { name, predeclared: false, .. } if name == "log"
    ));
    // The predeclared single-argument form is hidden too.
    assert_single(
        "package t;\npub fn log(level: string, msg: string) -> void { }\npub fn main(none) -> void { log(\"x\"); }",
        ErrorKind::Arity,
    );
}

#[test]
fn test_predeclared_overloads_are_chosen_by_argument_count() {
    assert_clean("package t;\npub fn f(none) -> void { let a: []i32 = range(1, 5); let b: []i32 = range(3); }");
    let error = assert_single("package t;\npub fn f(none) -> void { let a: []i32 = range(1, 2, 3); }", ErrorKind::Arity);
    assert!(error.message.contains("1 or 2"), "{}", error.message);
}

#[test]
fn test_unknown_field_on_struct() {
    let error = assert_single(
        "package t;\npub struct P { x: i32 }\npub fn f(p: P) -> i32 { return p.z; }",
        ErrorKind::Unresolved,
    );
    assert!(error.message.contains("'z'"));
}

// ========================================
// Mutability
// ========================================

#[test]
fn test_assignment_to_mutable_binding_is_allowed() {
    assert_clean("package t;\npub fn f(none) -> i32 { let mut x: i32 = 1; x = 2; return x; }");
}

#[test]
fn test_assignment_to_immutable_binding_reports_at_assignment() {
    let source = "package t;\npub fn f(none) -> i32 { let x: i32 = 1; x = 2; return x; }";
    let program = parse_program(source);
    let analyzed = analyze(&program, &AnalyzerConfig::default());
    assert_eq!(kinds(&analyzed), vec![ErrorKind::Mutability]);
    let assign_span = function_body(&program, "f")[1].span;
    assert_eq!(analyzed.diagnostics[0].span, assign_span);
    assert_eq!(analyzed.diagnostics[0].hints.len(), 1);
}

#[test]
fn test_assignment_to_parameter_is_rejected() {
    let error = assert_single("package t;\npub fn f(n: i32) -> void { n = 2; }", ErrorKind::Mutability);
    assert!(error.message.contains("parameter 'n'"));
}

#[test]
fn test_assignment_to_self_field_is_rejected() {
    assert_single(
        "package t;\npub struct C { n: i32 }\nimpl C { pub fn bump(self) -> void { self.n = 1; } }",
        ErrorKind::Mutability,
    );
}

#[test]
fn test_field_assignment_follows_root_binding() {
    assert_single(
        "package t;\npub struct P { x: i32 }\npub fn f(none) -> void { let p: P = P { x: 0 }; p.x = 1; }",
        ErrorKind::Mutability,
    );
    assert_clean("package t;\npub struct P { x: i32 }\npub fn f(none) -> void { let mut p: P = P { x: 0 }; p.x = 1; }");
}

#[test]
fn test_mutable_pointer_to_immutable_binding_is_rejected() {
    assert_single(
        "package t;\npub fn f(none) -> void { let x: i32 = 1; let p: *mut i32 = &mut x; }",
        ErrorKind::Mutability,
    );
}

#[test]
fn test_assignment_through_const_pointer_is_rejected() {
    let error = assert_single(
        "package t;\npub fn f(none) -> void { let x: i32 = 1; unsafe { let p: *const i32 = &x; *p = 2; } }",
        ErrorKind::Mutability,
    );
    assert!(error.message.contains("*const"));
}

// ========================================
// Unsafe
// ========================================

#[test]
fn test_dereference_requires_unsafe() {
    let error = assert_single(
        "package t;\npub fn f(p: *mut i32) -> i32 { return *p; }",
        ErrorKind::TypeMismatch,
    );
    assert!(error.message.contains("unsafe"));
    assert_clean("package t;\npub fn f(p: *mut i32) -> i32 { unsafe { return *p; } }");
}

#[test]
fn test_extern_call_requires_unsafe() {
    let source = |body: &str| {
        format!("package t;\npub extern \"libc\" fn abs(n: i32) -> i32;\npub fn f(none) -> i32 {{ {} }}", body)
    };
    assert_single(&source("return abs(1);"), ErrorKind::TypeMismatch);
    assert_clean(&source("unsafe { return abs(1); }"));
}

// ========================================
// Types
// ========================================

#[test]
fn test_let_type_mismatch() {
    let error = assert_single("package t;\npub fn f(none) -> void { let s: string = true; }", ErrorKind::TypeMismatch);
    assert!(error.message.contains("'string'"));
}

#[test]
fn test_integer_literal_range_follows_declared_type() {
    assert_single("package t;\npub fn f(none) -> void { let b: u8 = 300; }", ErrorKind::TypeMismatch);
    assert_clean("package t;\npub fn f(none) -> void { let b: u8 = 255; let c: i8 = -128; }");
    assert_single("package t;\npub fn f(none) -> void { let c: i8 = -129; }", ErrorKind::TypeMismatch);
}

#[test]
fn test_condition_must_be_bool() {
    assert_single("package t;\npub fn f(none) -> void { if 1 { log(\"x\"); } }", ErrorKind::TypeMismatch);
}

#[test]
fn test_return_type_is_checked() {
    assert_single("package t;\npub fn f(none) -> i32 { return \"no\"; }", ErrorKind::TypeMismatch);
}

#[test]
fn test_missing_return_is_reported_unless_body_diverges() {
    assert_single("package t;\npub fn f(none) -> i32 { log(\"x\"); }", ErrorKind::TypeMismatch);
    assert_clean("package t;\npub fn g(none) -> i32 { panic(\"no\"); }");
}

#[test]
fn test_option_is_never_unwrapped_implicitly() {
    let error = assert_single(
        "package t;\npub fn f(none) -> void { let o: Option<i32> = Option.Some(1); let x: i32 = o; }",
        ErrorKind::TypeMismatch,
    );
    assert_eq!(error.hints.len(), 1);
}

#[test]
fn test_generic_arity_is_checked() {
    let error = assert_single(
        "package t;\npub struct Wrapper<T> { value: T }\npub fn f(w: Wrapper<i32, bool>) -> void { }",
        ErrorKind::Arity,
    );
    assert!(error.message.contains("expects 1"));
}

#[test]
fn test_generic_function_infers_type_arguments() {
    let source = |target: &str| {
        format!(
            "package t;\npub fn first<T>(xs: []T) -> T {{ return xs[0]; }}\npub fn f(nums: []i32) -> void {{ let v: {} = first(nums); }}",
            target
        )
    };
    assert_clean(&source("i32"));
    assert_single(&source("string"), ErrorKind::TypeMismatch);
}

#[test]
fn test_type_parameter_is_not_assignable_to_concrete_types() {
    assert_single("package t;\npub fn f<T>(x: T) -> i32 { return x; }", ErrorKind::TypeMismatch);
    assert_single("package t;\npub fn g<T>(x: T) -> void { let y: bool = x; }", ErrorKind::TypeMismatch);
    assert_single("package t;\npub fn h<T>(x: T) -> void { let z: T = 5; }", ErrorKind::TypeMismatch);
    assert_clean("package t;\npub fn id<T>(x: T) -> T { let y: T = x; return y; }");
}

#[test]
fn test_distinct_type_parameters_do_not_mix() {
    assert_single("package t;\npub fn f<A, B>(a: A, b: B) -> A { return b; }", ErrorKind::TypeMismatch);
}

#[test]
fn test_generic_call_inside_generic_function() {
    assert_clean(
        "package t;\npub fn id<T>(x: T) -> T { return x; }\npub fn twice<U>(u: U) -> U { return id(id(u)); }",
    );
}

#[test]
fn test_struct_containing_itself_by_value_is_rejected() {
    let error = assert_single("package t;\npub struct A { a: A }", ErrorKind::TypeMismatch);
    assert!(error.message.contains("infinite size"), "{}", error.message);
    assert_eq!(error.hints.len(), 1);

    // Mutual recursion through an enum payload reports both declarations.
    let analyzed = analyze_str("package t;\npub struct Node { next: Link }\npub enum Link { More(Node), End }");
    assert_eq!(kinds(&analyzed), vec![ErrorKind::TypeMismatch, ErrorKind::TypeMismatch]);
}

#[test]
fn test_recursion_behind_pointer_is_allowed() {
    assert_clean("package t;\npub struct List { value: i32, next: *mut List }");
    assert_clean("package t;\npub struct Tree { children: []Tree }");
}

#[test]
fn test_tuple_arity_mismatch() {
    assert_single("package t;\npub fn f(none) -> void { let t: (i32, i32) = (1, 2, 3); }", ErrorKind::Arity);
}

#[test]
fn test_struct_literal_fields_are_checked() {
    let analyzed = analyze_str(
        "package t;\npub struct P { x: i32, y: i32 }\npub fn f(none) -> void { let p: P = P { x: 1, z: 2 }; }",
    );
    // Unknown field 'z' and missing field 'y'.
    assert_eq!(analyzed.diagnostics.len(), 2, "{:#?}", analyzed.diagnostics);
}

// ========================================
// Concurrency
// ========================================

#[test]
fn test_spawn_with_handle_and_await() {
    let source = |target: &str| {
        format!(
            "package t;\npub fn compute(n: i32) -> i32 {{ return n * 2; }}\npub fn f(none) -> void {{ spawn_with_handle h = compute(2); let r: {} = await h; spawn compute(1); }}",
            target
        )
    };
    assert_clean(&source("i32"));
    assert_single(&source("string"), ErrorKind::TypeMismatch);
}

#[test]
fn test_spawn_discards_the_callee_result() {
    assert_clean(
        "package t;\npub fn work(none) -> void { }\npub fn count(n: i32) -> i32 { return n; }\npub fn f(none) -> void { spawn work(); spawn count(3); }",
    );
}

#[test]
fn test_await_requires_task_handle() {
    let error = assert_single("package t;\npub fn f(none) -> void { let x: i32 = await 5; }", ErrorKind::TypeMismatch);
    assert!(error.message.contains("task handle"));
}

// ========================================
// Exhaustiveness
// ========================================

fn color_match(arms: &str) -> String {
    format!(
        "package t;\npub enum Color {{ Red, Green, Blue }}\npub fn f(c: Color) -> i32 {{\n    match c {{\n{}\n    }}\n    return 0;\n}}\n",
        arms
    )
}

#[test]
fn test_exhaustive_enum_match() {
    assert_clean(&color_match("Color.Red => 1,\nColor.Green => 2,\nColor.Blue => 3"));
}

#[test]
fn test_missing_variant_is_reported_once() {
    let error = assert_single(&color_match("Color.Red => 1,\nColor.Green => 2"), ErrorKind::Exhaustiveness);
    assert!(error.message.contains("Color.Blue"), "{}", error.message);
    assert!(!error.message.contains("Color.Red"));
}

#[test]
fn test_arm_after_wildcard_is_unreachable() {
    let error = assert_single(&color_match("_ => 1,\nColor.Red => 2"), ErrorKind::Exhaustiveness);
    assert!(error.message.contains("Unreachable"));
}

#[test]
fn test_option_match_needs_none_arm() {
    let error = assert_single(
        "package t;\npub fn f(o: Option<i32>) -> void { match o { Option.Some(v) => { log(\"some\"); } } }",
        ErrorKind::Exhaustiveness,
    );
    assert!(error.message.contains("Option.None"), "{}", error.message);
}

#[test]
fn test_nested_tuple_witness() {
    let error = assert_single(
        "package t;\npub fn f(a: bool, b: bool) -> void { match (a, b) { (true, _) => 1, (false, true) => 2 } }",
        ErrorKind::Exhaustiveness,
    );
    assert!(error.message.contains("(false, false)"), "{}", error.message);
}

#[test]
fn test_match_on_open_types_is_not_checked_for_coverage() {
    assert_clean("package t;\npub fn f(n: i32) -> void { match n { 1 => 1, 2 => 2 } }");
}

// ========================================
// Annotations
// ========================================

#[test]
fn test_conflicting_transfer_annotations_on_extern_param() {
    let analyzed = analyze_str("package t;\npub extern fn consume(#[transfer_full] #[borrowed] ptr: *mut u8) -> void;");
    assert_eq!(kinds(&analyzed), vec![ErrorKind::AnnotationConflict], "{:#?}", analyzed.diagnostics);

    let id = analyzed.symbols.lookup_global("consume").expect("consume is declared");
    let Some(SymbolKind::Function(info)) = analyzed.symbols.get(id).map(|s| &s.kind) else {
        panic!("expected function symbol");
    };
    assert_eq!(
        info.signatures[0].params[0].ty,
        ResolvedType::Pointer(PointerMutability::Mut, Box::new(ResolvedType::Primitive(PrimitiveId::U8)))
    );
}

#[test]
fn test_borrowed_is_rejected_on_return() {
    assert_single(
        "package t;\npub extern fn make(none) -> #[borrowed] *mut u8;",
        ErrorKind::AnnotationConflict,
    );
}

#[test]
fn test_invalid_annotation_arguments() {
    assert_single("package t;\n#[ownership(rc)]\npub struct S { x: i32 }", ErrorKind::AnnotationConflict);
    assert_single(
        "package t;\n#[human_review(urgent)]\npub fn f(none) -> void { }",
        ErrorKind::AnnotationConflict,
    );
    assert_clean("package t;\n#[human_review(high)]\npub fn f(none) -> void { }");
}

#[test]
fn test_misplaced_annotation() {
    let error = assert_single("package t;\n#[constant_time]\npub struct S { x: i32 }", ErrorKind::AnnotationConflict);
    assert!(error.message.contains("constant_time"));
}

#[test]
fn test_constant_time_rejects_if() {
    let source = "package t;\n#[constant_time]\npub fn eq(a: i32, b: i32) -> i32 { if a == b { return 1; } return 0; }";
    let error = assert_single(source, ErrorKind::AnnotationConflict);
    assert!(error.message.contains("'if' statement"), "{}", error.message);
    assert_clean("package t;\npub fn eq(a: i32, b: i32) -> i32 { if a == b { return 1; } return 0; }");
}

#[test]
fn test_constant_time_rejects_match() {
    let source = "package t;\npub enum Bit { Zero, One }\n#[constant_time]\npub fn f(b: Bit) -> i32 {\n    match b { Bit.Zero => { return 0; } Bit.One => { return 1; } }\n    return 0;\n}";
    let error = assert_single(source, ErrorKind::AnnotationConflict);
    assert!(error.message.contains("'match' statement"), "{}", error.message);
}

#[test]
fn test_constant_time_rejects_for() {
    let source = "package t;\n#[constant_time]\npub fn f(xs: []i32) -> void { for x in xs { log(\"x\"); } }";
    let error = assert_single(source, ErrorKind::AnnotationConflict);
    assert!(error.message.contains("'for' loop"), "{}", error.message);
}

#[test]
fn test_constant_time_rejects_division_by_non_constant() {
    let div = assert_single(
        "package t;\n#[constant_time]\npub fn f(a: i32, b: i32) -> i32 { return a / b; }",
        ErrorKind::AnnotationConflict,
    );
    assert!(div.message.contains("Division"), "{}", div.message);
    let rem = assert_single(
        "package t;\n#[constant_time]\npub fn f(a: i32, b: i32) -> i32 { return a % b; }",
        ErrorKind::AnnotationConflict,
    );
    assert!(rem.message.contains("Modulo"), "{}", rem.message);
    assert_clean("package t;\n#[constant_time]\npub fn f(a: i32) -> i32 { return a / 2 + a % (4); }");
}

#[test]
fn test_constant_time_rejects_non_constant_index() {
    let error = assert_single(
        "package t;\n#[constant_time]\npub fn f(xs: []i32, i: usize) -> i32 { return xs[i]; }",
        ErrorKind::AnnotationConflict,
    );
    assert!(error.message.contains("non-constant index"), "{}", error.message);
    assert_clean("package t;\n#[constant_time]\npub fn f(xs: []i32) -> i32 { return xs[0]; }");
}

#[test]
fn test_constant_time_applies_to_methods() {
    let source = "package t;\npub struct K { v: i32 }\nimpl K {\n    #[constant_time]\n    pub fn pick(self, d: i32) -> i32 { return self.v / d; }\n}";
    assert_single(source, ErrorKind::AnnotationConflict);
}

#[test]
fn test_ownership_on_binding_requires_allocation() {
    let error = assert_single(
        "package t;\npub fn f(none) -> void { #[ownership(gc)] let x: i32 = 5; }",
        ErrorKind::AnnotationConflict,
    );
    assert!(error.message.contains("'x'"), "{}", error.message);
    assert_clean(
        "package t;\npub struct P { x: i32 }\npub fn f(none) -> void { #[ownership(c)] let p: P = P { x: 1 }; #[ownership(gc)] let xs: [2]i32 = [1, 2]; }",
    );
}

// ========================================
// Const evaluation
// ========================================

#[test]
fn test_const_folding_feeds_array_sizes() {
    let analyzed = analyze_str("package t;\npriv const N: usize = 2 + 2;\npub fn f(none) -> void { let a: [N]i32 = [0; N]; }");
    assert!(analyzed.diagnostics.is_empty(), "{:#?}", analyzed.diagnostics);
    assert_eq!(analyzed.info.const_value("N"), Some(&ConstValue::Int(4)));
}

#[test]
fn test_const_cycle_is_detected() {
    let analyzed = analyze_str("package t;\npriv const A: i32 = B;\npriv const B: i32 = A;");
    assert!(!analyzed.diagnostics.is_empty());
    assert!(analyzed.diagnostics.iter().all(|e| e.kind == ErrorKind::ConstEval));
    assert!(analyzed.diagnostics[0].message.contains("A -> B -> A"), "{}", analyzed.diagnostics[0].message);
}

#[test]
fn test_const_rejects_non_const_names() {
    assert_single(
        "package t;\npub fn g(none) -> i32 { return 1; }\npriv const C: i32 = g;",
        ErrorKind::ConstEval,
    );
}

#[test]
fn test_sizeof_folds_struct_layout() {
    let analyzed = analyze_str("package t;\npub struct P { a: u8, b: i32 }\npriv const N: usize = sizeof(P);");
    assert!(analyzed.diagnostics.is_empty(), "{:#?}", analyzed.diagnostics);
    assert_eq!(analyzed.info.const_value("N"), Some(&ConstValue::Int(8)));
}

#[test]
fn test_sizeof_of_recursive_struct_is_an_error_not_a_crash() {
    let analyzed = analyze_str("package t;\npub struct A { a: A }\npub const N: usize = sizeof(A);");
    assert_eq!(kinds(&analyzed), vec![ErrorKind::TypeMismatch, ErrorKind::ConstEval], "{:#?}", analyzed.diagnostics);
    assert!(analyzed.diagnostics[1].message.contains("no known size"));
}

#[test]
fn test_const_depth_limit_is_configurable() {
    let program = parse_program("package t;\npriv const C: i32 = B + 1;\npriv const B: i32 = A + 1;\npriv const A: i32 = 1;");
    let shallow = analyze(&program, &AnalyzerConfig::default().with_const_eval_depth(1));
    assert!(shallow.diagnostics.iter().any(|e| e.kind == ErrorKind::ConstEval));
    let deep = analyze(&program, &AnalyzerConfig::default());
    assert!(deep.diagnostics.is_empty());
    assert_eq!(deep.info.const_value("C"), Some(&ConstValue::Int(3)));
}

// ========================================
// Entry point and limits
// ========================================

#[test]
fn test_main_signature_is_checked_in_entry_module() {
    let error = assert_single("package main;\npub fn main(x: i32) -> i32 { return x; }", ErrorKind::TypeMismatch);
    assert!(error.message.contains("'main'"));
    assert_clean("package main;\npub fn main(none) -> i32 { return 0; }");
    // Outside the entry module, `main` is an ordinary function.
    assert_clean("package t;\npub fn main(x: i32) -> i32 { return x; }");
}

#[test]
fn test_error_cap_counts_suppressed_errors() {
    let program = parse_program(
        "package t;\npub fn f(none) -> void { let a: i32 = u1; let b: i32 = u2; let c: i32 = u3; let d: i32 = u4; let e: i32 = u5; }",
    );
    let analyzed = analyze(&program, &AnalyzerConfig::default().with_max_errors(2));
    assert_eq!(analyzed.diagnostics.len(), 2);
    assert_eq!(analyzed.suppressed, 3);
    assert_eq!(analyzed.error_count(), 5);
}

// ========================================
// Runtime requirements
// ========================================

#[test]
fn test_runtime_requirements_for_gc_values() {
    let analyzed = analyze_str(
        "package t;\npub struct P { x: i32 }\npub fn f(none) -> void { let p: P = P { x: 1 }; log(\"hi\"); }",
    );
    assert!(analyzed.diagnostics.is_empty(), "{:#?}", analyzed.diagnostics);
    let expected: BTreeSet<RuntimeSymbol> = [
        RuntimeSymbol::Alloc,
        RuntimeSymbol::GcRegisterRoot,
        RuntimeSymbol::GcUnregisterRoot,
        RuntimeSymbol::Log,
        RuntimeSymbol::StringCreate,
        RuntimeSymbol::StringFree,
    ]
    .into_iter()
    .collect();
    assert_eq!(analyzed.runtime, expected);
}

#[test]
fn test_runtime_requirements_for_c_owned_values() {
    let analyzed = analyze_str(
        "package t;\n#[ownership(c)]\npub struct P { x: i32 }\npub fn f(none) -> void { let p: P = P { x: 1 }; }",
    );
    assert!(analyzed.diagnostics.is_empty(), "{:#?}", analyzed.diagnostics);
    let expected: BTreeSet<RuntimeSymbol> = [RuntimeSymbol::Alloc, RuntimeSymbol::Free].into_iter().collect();
    assert_eq!(analyzed.runtime, expected);
}
