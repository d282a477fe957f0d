#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on the structural disambiguation rules (tuples, slices, enum construction, generics) and on
/// the parser's error recovery behavior (many independent errors per run, no cascades).
mod tests {
    use super::*;
    use crate::diagnostics::ErrorKind;
    use crate::lexer;
    use pretty_assertions::assert_eq;

    fn parse_str(source: &str) -> Parsed {
        let lexed = lexer::lex(source);
        assert!(lexed.errors.is_empty(), "lexical errors: {:?}", lexed.errors);
        parse(&lexed.tokens)
    }

    fn parse_ok(source: &str) -> Program {
        let parsed = parse_str(source);
        assert!(parsed.errors.is_empty(), "unexpected errors: {:#?}", parsed.errors);
        parsed.program
    }

    /// Parse `expr` as the value of a `let` inside a function and return it.
    fn parse_expr(expr: &str) -> Expr {
        let source = format!("package t;\npub fn f(none) -> void {{ let v: i32 = {}; }}", expr);
        let program = parse_ok(&source);
        let Declaration::Function(f) = &program.declarations[0].node else {
            panic!("expected function");
        };
        let Statement::Let(let_stmt) = &f.body[0].node else {
            panic!("expected let");
        };
        let_stmt.value.node.clone()
    }

    fn body_of(program: &Program) -> &Block {
        match &program.declarations[0].node {
            Declaration::Function(f) => &f.body,
            other => panic!("expected function, got {:?}", other),
        }
    }

    // ---- program structure ---------------------------------------------------

    #[test]
    fn test_parse_package_and_imports() {
        let program = parse_ok(
            r#"package app;
import "stdlib/io";
import "github.com/user/repo" as repo;
import "./local";
"#,
        );
        assert_eq!(program.package.node, "app");
        assert_eq!(program.imports.len(), 3);
        assert_eq!(program.imports[1].node.path, "github.com/user/repo");
        assert_eq!(program.imports[1].node.alias.as_ref().map(|a| a.node.as_str()), Some("repo"));
    }

    #[test]
    fn test_missing_package_is_reported() {
        let parsed = parse_str("pub fn f(none) -> void { }");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("package"));
    }

    #[test]
    fn test_parse_function() {
        let program = parse_ok("package t;\npub fn add(a: i32, b: i32) -> i32 { return a + b; }");
        match &program.declarations[0].node {
            Declaration::Function(f) => {
                assert_eq!(f.name.node, "add");
                assert_eq!(f.visibility, Visibility::Public);
                assert_eq!(f.params.len(), 2);
                assert_eq!(f.return_type.node, Type::Primitive(PrimitiveId::I32));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_visibility_reports_and_continues() {
        let parsed = parse_str("package t;\nfn f(none) -> void { }\npub fn g(none) -> void { }");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("Missing visibility"));
        assert_eq!(parsed.errors[0].hints, vec!["Add 'pub' or 'priv' before the declaration".to_string()]);
        assert_eq!(parsed.program.declarations.len(), 2);
    }

    #[test]
    fn test_empty_parameter_list_requires_none() {
        let parsed = parse_str("package t;\npub fn f() -> void { }");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].hints, vec!["Use 'none' for empty parameter lists".to_string()]);
        assert_eq!(parsed.program.declarations.len(), 1);
    }

    #[test]
    fn test_parse_struct_enum_and_none_bodies() {
        let program = parse_ok(
            r#"package t;
pub struct Point { x: i32, pub y: i32 }
priv struct Empty { none }
pub enum Shape<T> { Circle(T), Rect(T, T), Dot }
pub enum Never0 { none }
pub enum Code { Ok = 0, Bad = 1 }
"#,
        );
        assert_eq!(program.declarations.len(), 5);
        match &program.declarations[2].node {
            Declaration::Enum(e) => {
                assert_eq!(e.type_params.len(), 1);
                assert_eq!(e.variants.len(), 3);
                assert_eq!(e.variants[1].node.payload.len(), 2);
            }
            other => panic!("expected enum, got {:?}", other),
        }
        match &program.declarations[1].node {
            Declaration::Struct(s) => assert!(s.fields.is_empty()),
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_struct_body_without_none() {
        let parsed = parse_str("package t;\npub struct S { }");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("struct bodies"));
    }

    #[test]
    fn test_type_parameter_constraints_rejected() {
        let parsed = parse_str("package t;\npub struct Box1<T: Copy> { value: T }");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("constraints"));
    }

    #[test]
    fn test_parse_extern_with_annotations() {
        let program = parse_ok(
            r#"package t;
pub extern "libc" fn malloc(size: usize) -> #[transfer_full] *mut void;
pub extern fn free(#[transfer_full] ptr: *mut void) -> void;
"#,
        );
        match &program.declarations[0].node {
            Declaration::Extern(x) => {
                assert_eq!(x.library.as_deref(), Some("libc"));
                assert_eq!(x.return_annotations.len(), 1);
                assert_eq!(x.return_annotations[0].name, "transfer_full");
            }
            other => panic!("expected extern, got {:?}", other),
        }
        match &program.declarations[1].node {
            Declaration::Extern(x) => {
                assert_eq!(x.library, None);
                assert_eq!(x.params[0].node.annotations[0].name, "transfer_full");
            }
            other => panic!("expected extern, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_impl_block_with_receiver() {
        let program = parse_ok(
            r#"package t;
pub struct Counter { n: i32 }
impl Counter {
    pub fn new(none) -> Counter { return Counter { n: 0 }; }
    pub fn get(self) -> i32 { return self.n; }
}
"#,
        );
        match &program.declarations[1].node {
            Declaration::Impl(i) => {
                assert_eq!(i.target.node, "Counter");
                assert_eq!(i.methods.len(), 2);
                assert!(i.methods[0].node.receiver.is_none());
                assert!(i.methods[1].node.receiver.is_some());
            }
            other => panic!("expected impl, got {:?}", other),
        }
    }

    #[test]
    fn test_self_outside_method_is_error() {
        let parsed = parse_str("package t;\npub fn f(self) -> void { }");
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_annotation_forms() {
        let program = parse_ok(
            r#"package t;
#[human_review(high)]
#[doc(summary = "adds", since = 1)]
#[ownership(gc)]
#[custom_tag]
#[deprecated(none)]
pub fn f(none) -> void { }
"#,
        );
        let anns = program.declarations[0].node.annotations();
        assert_eq!(anns.len(), 5);
        assert_eq!(anns[0].first_word().as_deref(), Some("high"));
        assert!(matches!(&anns[1].args, AnnotationArgs::Named(pairs) if pairs.len() == 2));
        assert_eq!(anns[3].args, AnnotationArgs::Empty);
        assert_eq!(anns[4].args, AnnotationArgs::Empty);
    }

    #[test]
    fn test_at_annotation_is_rejected_with_hint() {
        let parsed = parse_str("package t;\n@constant_time pub fn f(none) -> void { }");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].hints, vec!["Use '#[constant_time]' annotation syntax".to_string()]);
        assert_eq!(parsed.program.declarations.len(), 1);
    }

    // ---- types ----------------------------------------------------------------

    #[test]
    fn test_parse_types() {
        let program = parse_ok(
            r#"package t;
pub fn f(a: []u8, b: [4]i32, c: *const u8, d: Result<i32, string>, e: Option<Option<i32>>, g: (i32, bool), h: Pair<i32, f64>, t: TaskHandle<i32>) -> void { }
"#,
        );
        let Declaration::Function(f) = &program.declarations[0].node else {
            panic!("expected function");
        };
        let rendered: Vec<String> = f.params.iter().map(|p| p.node.ty.node.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "[]u8",
                "[_]i32",
                "*const u8",
                "Result<i32, string>",
                "Option<Option<i32>>",
                "(i32, bool)",
                "Pair<i32, f64>",
                "TaskHandle<i32>",
            ]
        );
    }

    #[test]
    fn test_unit_type_is_rejected() {
        let parsed = parse_str("package t;\npub fn f(none) -> () { }");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("'()' is not a type"));
    }

    // ---- expressions ----------------------------------------------------------

    #[test]
    fn test_tuple_needs_two_elements() {
        assert!(matches!(parse_expr("(1, 2)"), Expr::Tuple(elems) if elems.len() == 2));
        assert!(matches!(parse_expr("(1)"), Expr::Paren(inner) if inner.node == Expr::Literal(Literal::Int(1))));
        assert_eq!(parse_expr("()"), Expr::Literal(Literal::Unit));
    }

    #[test]
    fn test_slice_forms_differ_from_index() {
        assert!(matches!(parse_expr("a[0]"), Expr::Index(_, _)));
        assert!(matches!(parse_expr("a[:]"), Expr::Slice(_, ref b) if b.is_full()));
        assert!(matches!(parse_expr("a[1:3]"), Expr::Slice(_, ref b) if b.start.is_some() && b.end.is_some()));
        assert!(matches!(parse_expr("a[1:]"), Expr::Slice(_, ref b) if b.start.is_some() && b.end.is_none()));
        assert!(matches!(parse_expr("a[:3]"), Expr::Slice(_, ref b) if b.start.is_none() && b.end.is_some()));
    }

    #[test]
    fn test_precedence_tiers() {
        // a + b * c  =>  a + (b * c)
        let Expr::Binary(_, op, rhs) = parse_expr("a + b * c") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(rhs.node, Expr::Binary(_, BinaryOp::Mul, _)));

        // shift binds looser than additive: a << b + c  =>  a << (b + c)
        let Expr::Binary(_, op, rhs) = parse_expr("a << b + c") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Shl);
        assert!(matches!(rhs.node, Expr::Binary(_, BinaryOp::Add, _)));

        // equality is looser than relational: a == b < c  =>  a == (b < c)
        let Expr::Binary(_, op, _) = parse_expr("a == b < c") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Eq);

        // || is loosest, left-associative chains
        let Expr::Binary(lhs, op, _) = parse_expr("a || b || c && d") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(lhs.node, Expr::Binary(_, BinaryOp::Or, _)));
    }

    #[test]
    fn test_unary_prefix_combinations() {
        let Expr::Unary(prefix, _) = parse_expr("-*p") else {
            panic!("expected unary");
        };
        assert_eq!(prefix.logical, Some(LogicalPrefix::Neg));
        assert_eq!(prefix.pointer, Some(PointerPrefix::Deref));

        let Expr::Unary(prefix, _) = parse_expr("&mut x") else {
            panic!("expected unary");
        };
        assert_eq!(prefix.pointer, Some(PointerPrefix::AddressOfMut));
    }

    #[test]
    fn test_stuttered_prefixes_are_syntax_errors() {
        for source in ["!!x", "--x", "**p", "&&x", "~~x"] {
            let program = format!("package t;\npub fn f(none) -> void {{ let v: i32 = {}; }}", source);
            let parsed = parse_str(&program);
            assert_eq!(parsed.errors.len(), 1, "{}: {:?}", source, parsed.errors);
            assert_eq!(parsed.errors[0].kind, ErrorKind::Syntax);
            assert!(parsed.errors[0].message.contains("Repeated prefix"), "{}", source);
        }
    }

    #[test]
    fn test_enum_constructor_and_builtin_wrappers() {
        match parse_expr("Color.Red") {
            Expr::EnumConstructor(c) => {
                assert_eq!(c.head.node, "Color");
                assert_eq!(c.variant.node, "Red");
                assert!(c.args.is_none());
            }
            other => panic!("expected enum constructor, got {:?}", other),
        }
        match parse_expr("Result.Ok(42)") {
            Expr::EnumConstructor(c) => {
                assert_eq!(c.head.node, "Result");
                assert_eq!(c.args.map(|a| a.len()), Some(1));
            }
            other => panic!("expected enum constructor, got {:?}", other),
        }
        assert!(matches!(parse_expr("Option.None"), Expr::EnumConstructor(_)));
    }

    #[test]
    fn test_associated_calls_with_and_without_type_args() {
        match parse_expr("Vec::new(none)") {
            Expr::AssociatedCall(call) => {
                assert_eq!(call.type_name.node, "Vec");
                assert!(call.type_args.is_empty());
                assert!(call.args.is_empty());
            }
            other => panic!("expected associated call, got {:?}", other),
        }
        match parse_expr("Pair<i32, Option<i32>>::make(1, 2)") {
            Expr::AssociatedCall(call) => {
                assert_eq!(call.type_args.len(), 2);
                assert_eq!(call.args.len(), 2);
            }
            other => panic!("expected associated call, got {:?}", other),
        }
    }

    #[test]
    fn test_less_than_is_not_generic() {
        assert!(matches!(parse_expr("a < b"), Expr::Binary(_, BinaryOp::Lt, _)));
        assert!(matches!(parse_expr("a < b > c"), Expr::Binary(_, BinaryOp::Gt, _)));
    }

    #[test]
    fn test_tuple_index_and_nested_tuple_index() {
        assert!(matches!(parse_expr("t.0"), Expr::TupleIndex(_, 0)));
        match parse_expr("t.0.1") {
            Expr::TupleIndex(inner, 1) => assert!(matches!(inner.node, Expr::TupleIndex(_, 0))),
            other => panic!("expected nested tuple index, got {:?}", other),
        }
    }

    #[test]
    fn test_struct_literal_and_generic_struct_literal() {
        assert!(matches!(parse_expr("Point { x: 1, y: 2 }"), Expr::StructLiteral(s) if s.fields.len() == 2));
        assert!(matches!(parse_expr("Box1<i32> { value: 1 }"), Expr::StructLiteral(s) if s.type_args.len() == 1));
    }

    #[test]
    fn test_struct_literal_not_in_if_head() {
        let program = parse_ok("package t;\npub fn f(x: i32) -> void { if x { return (); } }");
        assert!(matches!(body_of(&program)[0].node, Statement::If(_)));
    }

    #[test]
    fn test_arrays() {
        assert!(matches!(parse_expr("[none]"), Expr::Array(elems) if elems.is_empty()));
        assert!(matches!(parse_expr("[1, 2, 3]"), Expr::Array(elems) if elems.len() == 3));
        assert!(matches!(parse_expr("[0; 16]"), Expr::ArrayRepeat(_, _)));
    }

    #[test]
    fn test_empty_array_requires_none() {
        let parsed = parse_str("package t;\npub fn f(none) -> void { let a: []i32 = []; }");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("array literals"));
    }

    #[test]
    fn test_call_argument_forms() {
        assert!(matches!(parse_expr("f()"), Expr::Call(_, args) if args.is_empty()));
        assert!(matches!(parse_expr("f(none)"), Expr::Call(_, args) if args.is_empty()));
        let parsed = parse_str("package t;\npub fn f(none) -> void { g(void); }");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].hints, vec!["Use 'none' for empty argument lists".to_string()]);
    }

    #[test]
    fn test_sizeof_and_await() {
        assert!(matches!(parse_expr("sizeof(i64)"), Expr::Sizeof(_)));
        assert!(matches!(parse_expr("await h"), Expr::Await(_)));
    }

    // ---- statements -----------------------------------------------------------

    #[test]
    fn test_statement_forms() {
        let program = parse_ok(
            r#"package t;
pub fn f(xs: []i32) -> void {
    let mut total: i32 = 0;
    total = total + 1;
    for x in xs { total = total + x; }
    if let Option.Some(v) = find(xs) { log("found"); } else { log("missing"); }
    spawn worker(1);
    spawn_with_handle h = compute(2);
    unsafe { let p: *mut i32 = &mut total; *p = 3; }
    { break; }
    continue;
    return ();
}
"#,
        );
        let kinds: Vec<&str> = body_of(&program)
            .iter()
            .map(|s| match &s.node {
                Statement::Let(_) => "let",
                Statement::Assign(_) => "assign",
                Statement::For(_) => "for",
                Statement::IfLet(_) => "if-let",
                Statement::Spawn(_) => "spawn",
                Statement::SpawnWithHandle(_) => "spawn_with_handle",
                Statement::Unsafe(_) => "unsafe",
                Statement::Block(_) => "block",
                Statement::Continue => "continue",
                Statement::Return(_) => "return",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "let",
                "assign",
                "for",
                "if-let",
                "spawn",
                "spawn_with_handle",
                "unsafe",
                "block",
                "continue",
                "return"
            ]
        );
    }

    #[test]
    fn test_let_requires_type_annotation() {
        let parsed = parse_str("package t;\npub fn f(none) -> void { let x = 1; }");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].hints[0].contains("let x: Type = value;"));
    }

    #[test]
    fn test_else_binds_to_nearest_if() {
        let program = parse_ok(
            "package t;\npub fn f(a: bool, b: bool) -> void { if a { if b { return (); } else { return (); } } }",
        );
        let Statement::If(outer) = &body_of(&program)[0].node else {
            panic!("expected if");
        };
        assert!(outer.else_branch.is_none());
        let Statement::If(inner) = &outer.then_block[0].node else {
            panic!("expected nested if");
        };
        assert!(inner.else_branch.is_some());
    }

    #[test]
    fn test_else_if_chain() {
        let program = parse_ok(
            "package t;\npub fn f(a: i32) -> void { if a == 1 { } else if a == 2 { } else { } }",
        );
        let Statement::If(stmt) = &body_of(&program)[0].node else {
            panic!("expected if");
        };
        match &stmt.else_branch {
            Some(ElseBranch::If(nested)) => {
                assert!(matches!(&nested.node, Statement::If(i) if matches!(i.else_branch, Some(ElseBranch::Block(_)))))
            }
            other => panic!("expected else-if, got {:?}", other),
        }
    }

    #[test]
    fn test_match_arms_and_patterns() {
        let program = parse_ok(
            r#"package t;
pub fn f(s: Shape) -> i32 {
    match s {
        Shape.Circle(r) => { return r; }
        Shape.Rect(w, _) => w,
        Shape.Dot(none) => 0,
        Shape.Pair((a, b)) => a,
        _ => 1
    }
    return 0;
}
"#,
        );
        let Statement::Match(m) = &body_of(&program)[0].node else {
            panic!("expected match");
        };
        assert_eq!(m.arms.len(), 5);
        assert!(matches!(m.arms[0].node.body, MatchBody::Block(_)));
        assert!(matches!(
            &m.arms[1].node.pattern.node,
            Pattern::EnumVariant { args, .. } if args.len() == 2 && args[1].node == Pattern::Wildcard
        ));
        assert!(matches!(&m.arms[3].node.pattern.node, Pattern::EnumVariant { args, .. } if matches!(args[0].node, Pattern::Tuple(_))));
        assert_eq!(m.arms[4].node.pattern.node, Pattern::Wildcard);
    }

    #[test]
    fn test_double_colon_in_pattern_has_hint() {
        let parsed = parse_str(
            "package t;\npub fn f(c: Color) -> void { match c { Color::Red => { } _ => { } } }",
        );
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].hints, vec!["Use '.' instead of '::' for enum variants".to_string()]);
    }

    #[test]
    fn test_return_without_value_is_error() {
        let parsed = parse_str("package t;\npub fn f(none) -> void { return; }");
        assert_eq!(parsed.errors.len(), 1);
    }

    // ---- recovery -------------------------------------------------------------

    #[test]
    fn test_multiple_independent_statement_errors() {
        let parsed = parse_str(
            r#"package t;
pub fn f(none) -> void {
    let a: i32 = ;
    let b: i32 = 2;
    let c: i32 = * ;
    let d: i32 = 4;
}
pub fn g(none) -> void { }
"#,
        );
        assert_eq!(parsed.errors.len(), 2, "{:#?}", parsed.errors);
        assert_eq!(parsed.program.declarations.len(), 2);
        let body = body_of(&parsed.program);
        assert_eq!(body.len(), 2, "valid statements survive recovery");
    }

    #[test]
    fn test_broken_declaration_does_not_cascade() {
        let parsed = parse_str(
            r#"package t;
pub fn 123(none) -> void { let x: i32 = 1; }
pub struct S { a: i32 }
priv const C: i32 = 1;
"#,
        );
        assert_eq!(parsed.errors.len(), 1, "{:#?}", parsed.errors);
        assert_eq!(parsed.program.declarations.len(), 2);
    }

    #[test]
    fn test_deeply_nested_parentheses_report_one_error() {
        let depth = 20_000;
        let source = format!(
            "package t;\npub fn f(none) -> void {{ let v: i32 = {}1{}; }}\npub fn g(none) -> void {{ }}\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let parsed = parse_str(&source);
        assert_eq!(parsed.errors.len(), 1, "{:#?}", parsed.errors);
        assert_eq!(parsed.errors[0].kind, ErrorKind::Syntax);
        assert!(parsed.errors[0].message.contains("Nesting too deep"));
        assert_eq!(parsed.program.declarations.len(), 2);
    }

    #[test]
    fn test_deeply_nested_blocks_report_one_error() {
        let depth = 5_000;
        let source = format!(
            "package t;\npub fn f(none) -> void {{ {}{} }}\npub fn g(none) -> void {{ }}\n",
            "if true { ".repeat(depth),
            "}".repeat(depth)
        );
        let parsed = parse_str(&source);
        assert_eq!(parsed.errors.len(), 1, "{:#?}", parsed.errors);
        assert!(parsed.errors[0].message.contains("Nesting too deep"));
        assert_eq!(parsed.program.declarations.len(), 2);
    }

    #[test]
    fn test_nesting_below_the_limit_parses() {
        let expr = format!("{}1{}", "(".repeat(MAX_NESTING_DEPTH / 2), ")".repeat(MAX_NESTING_DEPTH / 2));
        assert!(matches!(parse_expr(&expr), Expr::Paren(_)));
    }

    #[test]
    fn test_empty_token_stream_does_not_panic() {
        let parsed = parse(&[]);
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.program.declarations.is_empty());
    }

    #[test]
    fn test_parse_source_combines_lexical_and_syntax_errors() {
        let parsed = parse_source("package t;\npub fn f(none) -> void { let x: i32 = $; }", FileId(3));
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].kind, ErrorKind::Lexical);
        assert_eq!(parsed.errors[1].kind, ErrorKind::Syntax);
        assert_eq!(parsed.errors[0].span.file, FileId(3));
    }
}
