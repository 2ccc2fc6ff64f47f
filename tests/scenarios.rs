//! End-to-end parse scenarios exercised against the public API only.

use asthra_frontend::ast::{ArrayLiteralKind, NodeKind};
use asthra_frontend::diagnostics::RecoveryMode;
use asthra_frontend::parser::{parse_program, ParseOptions};

fn parse(src: &str) -> (Option<asthra_frontend::Node>, asthra_frontend::DiagnosticSink) {
    parse_program(src, ParseOptions::new("t.asthra"))
}

#[test]
fn scenario_1_minimal_program_with_return() {
    let (program, sink) = parse("package test; pub fn main(none) -> i32 { return 42; }");
    assert!(sink.is_empty(), "expected no diagnostics, got {:?}", sink.into_vec());
    let program = program.expect("program should parse");
    let NodeKind::Program { declarations, .. } = &program.kind else {
        panic!("expected a program node");
    };
    assert_eq!(declarations.len(), 1);
    let NodeKind::FunctionDecl { name, return_type, body, .. } = &declarations[0].kind else {
        panic!("expected a function declaration");
    };
    assert_eq!(name, "main");
    assert!(matches!(&return_type.kind, NodeKind::BaseType(t) if t == "i32"));
    let NodeKind::Block { statements } = &body.kind else {
        panic!("expected a block body");
    };
    assert_eq!(statements.len(), 1);
    let NodeKind::ReturnStmt { value } = &statements[0].kind else {
        panic!("expected a return statement");
    };
    assert!(matches!(&value.as_ref().unwrap().kind, NodeKind::IntegerLiteral(42)));
}

#[test]
fn scenario_2_missing_semicolon_is_reported() {
    let (_, sink) = parse(r#"package main; pub fn main(none) -> void { log("Missing semicolon") return (); }"#);
    assert!(sink.iter().any(|d| d.message.contains("expected ';'")));
}

#[test]
fn scenario_3_missing_visibility_is_reported() {
    let (_, sink) = parse(
        "package test; fn helper(none) -> void { return (); } \
         pub fn main(none) -> void { helper(); return (); }",
    );
    assert!(sink.iter().any(|d| d.message.contains("expected visibility modifier")));
}

#[test]
fn scenario_4_missing_type_annotation_is_reported() {
    let (_, sink) = parse("package test; pub fn main(none) -> i32 { let x = 42; return x; }");
    assert!(sink.iter().any(|d| d.message.contains("type annotation")));
}

#[test]
fn scenario_5_double_colon_enum_access_is_rejected() {
    let (_, sink) = parse(
        "package test; pub enum Status { Active, Inactive } \
         pub fn main(none) -> i32 { let s: Status = Status::Active; return 0; }",
    );
    assert!(sink.iter().any(|d| d.message.contains("Invalid postfix '::' usage")));
}

#[test]
fn scenario_6_internal_import_is_denied() {
    let (_, sink) = parse(r#"package test; import "internal/secret"; pub fn main(none) -> i32 { return 0; }"#);
    assert!(sink.iter().any(|d| d.kind == "invalid-import-path:internal-access-denied"));
}

#[test]
fn scenario_7_array_literal_and_index_access() {
    let (program, sink) = parse(
        "package test; pub fn main(none) -> i32 { let arr: [3]i32 = [1, 2, 3]; return arr[2]; }",
    );
    assert!(sink.is_empty(), "expected no diagnostics, got {:?}", sink.into_vec());
    let program = program.expect("program should parse");
    let main_fn = program
        .find_by_kind_and_name("function-decl", "main")
        .expect("main function should exist");
    let NodeKind::FunctionDecl { body, .. } = &main_fn.kind else {
        unreachable!();
    };
    let NodeKind::Block { statements } = &body.kind else {
        unreachable!();
    };
    let NodeKind::LetStmt { init, .. } = &statements[0].kind else {
        panic!("expected a let statement");
    };
    let NodeKind::ArrayLiteral { kind } = &init.as_ref().unwrap().kind else {
        panic!("expected an array literal initializer");
    };
    let ArrayLiteralKind::Elements(elements) = kind else {
        panic!("expected an element-list array literal");
    };
    assert_eq!(elements.len(), 3);

    let NodeKind::ReturnStmt { value } = &statements[1].kind else {
        panic!("expected a return statement");
    };
    let NodeKind::IndexAccess { base, index } = &value.as_ref().unwrap().kind else {
        panic!("expected an index-access expression");
    };
    assert!(matches!(&base.kind, NodeKind::Identifier(name) if name == "arr"));
    assert!(matches!(&index.kind, NodeKind::IntegerLiteral(2)));
}

#[test]
fn scenario_8_generic_enum_construction_disambiguates_from_comparison() {
    let (program, sink) = parse(
        "package test; pub enum Option<T> { Some(T), None } \
         pub fn main(none) -> i32 { let o: Option<i32> = Option<i32>.Some(42); return 0; }",
    );
    assert!(sink.is_empty(), "expected no diagnostics, got {:?}", sink.into_vec());
    let program = program.expect("program should parse");
    let main_fn = program
        .find_by_kind_and_name("function-decl", "main")
        .expect("main function should exist");
    let NodeKind::FunctionDecl { body, .. } = &main_fn.kind else {
        unreachable!();
    };
    let NodeKind::Block { statements } = &body.kind else {
        unreachable!();
    };
    let NodeKind::LetStmt { init, .. } = &statements[0].kind else {
        panic!("expected a let statement");
    };
    let NodeKind::EnumVariantExpr { enum_name, variant_name, args } = &init.as_ref().unwrap().kind else {
        panic!("expected an enum-variant construction, got {:?}", init.as_ref().unwrap().kind);
    };
    assert_eq!(enum_name, "Option");
    assert_eq!(variant_name, "Some");
    assert_eq!(args.len(), 1);
}

#[test]
fn strict_mode_stops_at_the_first_fatal_error() {
    let options = ParseOptions::new("t.asthra").with_recovery(RecoveryMode::Strict);
    let (program, sink) = parse_program("package test; fn bad(none) -> void { return (); }", options);
    assert!(program.is_none());
    assert_eq!(sink.len(), 1);
}

#[test]
fn type_alias_is_rejected_as_not_yet_implemented() {
    let (_, sink) = parse("package test; type Meters = i32; pub fn main(none) -> i32 { return 0; }");
    assert!(sink.iter().any(|d| d.message.contains("not yet implemented")));

    let (_, sink) = parse("package test; pub type Meters = i32; pub fn main(none) -> i32 { return 0; }");
    assert!(sink.iter().any(|d| d.message.contains("not yet implemented")));
}

#[test]
fn dot_call_on_a_type_name_is_rejected() {
    let (_, sink) = parse(
        "package test; pub struct Point { x: i32 } \
         pub fn main(none) -> i32 { Point.new(1); return 0; }",
    );
    assert!(sink.iter().any(|d| d.kind == "type-dot-call-rejected"));
}

#[test]
fn lexes_raw_multiline_string_prefix_before_identifier() {
    let (program, sink) = parse(r####"package test; pub fn main(none) -> void { let s: string = r"""a\nb"""; return (); }"####);
    assert!(sink.is_empty(), "expected no diagnostics, got {:?}", sink.into_vec());
    let program = program.expect("program should parse");
    let main_fn = program
        .find_by_kind_and_name("function-decl", "main")
        .expect("main function should exist");
    let NodeKind::FunctionDecl { body, .. } = &main_fn.kind else {
        unreachable!();
    };
    let NodeKind::Block { statements } = &body.kind else {
        unreachable!();
    };
    let NodeKind::LetStmt { init, .. } = &statements[0].kind else {
        panic!("expected a let statement");
    };
    assert!(matches!(&init.as_ref().unwrap().kind, NodeKind::StringLiteral(s) if s == "a\\nb"));
}

#[test]
fn clone_then_pretty_print_matches_the_original() {
    let (program, sink) = parse("package test; pub fn main(none) -> i32 { return 42; }");
    assert!(sink.is_empty());
    let program = program.unwrap();
    let cloned = program.clone();
    assert_eq!(program.pretty_print(), cloned.pretty_print());
}

/// A batch of small source fixtures described as JSON, in the spirit of
/// the benchmark harness's JSON-driven test data: each entry names a
/// program and whether it is expected to parse cleanly.
#[test]
fn json_described_fixture_batch_parses_as_expected() {
    let fixtures = r#"[
        {"source": "package a; pub fn f(none) -> void { return (); }", "should_parse_cleanly": true},
        {"source": "package a; pub struct Point { x: i32, y: i32 }", "should_parse_cleanly": true},
        {"source": "package a; priv const MAX: i32 = 10;", "should_parse_cleanly": true},
        {"source": "package a; struct Point { x: i32 }", "should_parse_cleanly": false},
        {"source": "package a; pub fn f() -> void { return (); }", "should_parse_cleanly": false}
    ]"#;

    let cases: serde_json::Value = serde_json::from_str(fixtures).expect("fixture JSON must parse");
    for case in cases.as_array().expect("fixtures must be a JSON array") {
        let source = case["source"].as_str().expect("each fixture needs a 'source' string");
        let expect_clean = case["should_parse_cleanly"].as_bool().expect("each fixture needs a bool flag");
        let (_, sink) = parse(source);
        assert_eq!(
            sink.is_empty(),
            expect_clean,
            "mismatch for {source:?}: diagnostics = {:?}",
            sink.into_vec()
        );
    }
}
