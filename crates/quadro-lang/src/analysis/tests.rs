//! Semantic checker tests, one section per error code plus the accepted forms.

use crate::analysis;
use crate::error::{Error, ErrorCode};
use crate::syntax::lexer::Lexer;
use crate::syntax::parser::Parser;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn check(src: &str) -> Result<(), Error> {
    let tokens = Lexer::new(src).tokenize().expect("lex failed");
    let program = Parser::new(tokens).parse().expect("parse failed");
    analysis::check(&program)
}

fn check_ok(src: &str) {
    if let Err(e) = check(src) {
        panic!("expected check to succeed, got {e}");
    }
}

fn check_err(src: &str) -> Error {
    match check(src) {
        Ok(()) => panic!("expected check to fail"),
        Err(e) => e,
    }
}

fn has_code(err: &Error, code: ErrorCode) -> bool {
    err.code == code
}

fn has_message(err: &Error, substr: &str) -> bool {
    err.message.contains(substr)
}

// ─── Accepted programs ───────────────────────────────────────────────────────

#[test]
fn empty_program() {
    check_ok("");
}

#[test]
fn declarations_of_every_type() {
    check_ok(r#"
        seisu n = 3;
        ronri b = shinri;
        rippotai c = { 1, 2, 3, uso };
        hairetsu grid = { 2, n };
        hairetsu list = { 1, 2, 3 };
    "#);
}

#[test]
fn uninitialised_scalars() {
    check_ok("seisu n; ronri b; { n = 1; b = uso; }");
}

#[test]
fn int_initialiser_for_bool_is_accepted() {
    check_ok("ronri flag = 1;");
    check_ok("ronri flag = o_0;");
}

#[test]
fn shadowing_in_nested_block() {
    check_ok("seisu a = 1; { seisu a = 2; { ronri a = uso; } }");
}

#[test]
fn robot_commands_and_sequences() {
    check_ok(r#"
        {
            seisu d = o_0;
            o_o;
            >_<;
            rippotai here = *_*;
            seisu x = here => x;
            ronri busy = here => busy;
            hairetsu seen = { o_0; >_<; ^_^; };
            seisu first = seen[0, 0, 0] => x;
            hairetsu shape = jigen seen;
        }
    "#);
}

#[test]
fn logic_and_comparison() {
    check_ok(r#"
        seisu a = 1;
        seisu b = 2;
        ronri r = a < b ^ ~ b > a v shinri;
    "#);
}

#[test]
fn type_equality_accepts_keywords_and_expressions() {
    check_ok("seisu a; ronri same = ruikei { a, seisu }; ronri other = ruikei { *_*, a + 1 };");
}

#[test]
fn for_loop_variable_is_int() {
    check_ok("seisu total; { shuki i = 1 : 3 kido total = total + i; shushi }");
}

#[test]
fn recursion_is_allowed() {
    check_ok(r#"
        seisu kansu walk(seisu n) kido
            sorenara n > 0 kido
                o_o;
                walk(n - 1);
            shushi
        shushi
        { walk(3); }
    "#);
}

#[test]
fn closures_see_outer_names() {
    check_ok(r#"
        seisu steps;
        seisu kansu step() kido steps = steps + 1; shushi
        { step(); }
    "#);
}

#[test]
fn bool_parameter_accepts_int_argument() {
    check_ok("seisu kansu f(ronri b) kido shushi { f(1); }");
}

#[test]
fn indexed_assignment() {
    check_ok("hairetsu g = { 2, 2 }; { g[0, 1] = 5; g[1, 1] = g[0, 1] + 1; }");
}

// ─── S001: undeclared identifier ─────────────────────────────────────────────

#[test]
fn s001_undeclared_variable() {
    let err = check_err("{ seisu a = b + 1; }");
    assert!(has_code(&err, ErrorCode::S001));
    assert!(has_message(&err, "`b`"));
}

#[test]
fn s001_assignment_to_undeclared() {
    let err = check_err("{ ghost = 1; }");
    assert!(has_code(&err, ErrorCode::S001));
}

#[test]
fn s001_undeclared_function() {
    let err = check_err("{ go(); }");
    assert!(has_code(&err, ErrorCode::S001));
}

#[test]
fn s001_variable_out_of_scope() {
    let err = check_err("{ { seisu inner = 1; } inner = 2; }");
    assert!(has_code(&err, ErrorCode::S001));
}

#[test]
fn s001_loop_variable_out_of_scope() {
    let err = check_err("{ shuki i = 1 : 2 kido shushi i = 3; }");
    assert!(has_code(&err, ErrorCode::S001));
}

#[test]
fn s001_inside_type_equality() {
    let err = check_err("ronri r = ruikei { nope, seisu };");
    assert!(has_code(&err, ErrorCode::S001));
}

#[test]
fn s001_reports_line() {
    let err = check_err("{\n  seisu a = 1;\n  a = missing;\n}");
    assert_eq!(err.line, 3);
}

// ─── S002: type mismatch ─────────────────────────────────────────────────────

#[test]
fn s002_bool_into_int() {
    let err = check_err("seisu n = shinri;");
    assert!(has_code(&err, ErrorCode::S002));
    assert!(has_message(&err, "seisu"));
}

#[test]
fn s002_bool_assigned_to_int() {
    let err = check_err("seisu n; ronri b = uso; { n = b; }");
    assert!(has_code(&err, ErrorCode::S002));
}

#[test]
fn s002_cell_into_int() {
    let err = check_err("seisu n = *_*;");
    assert!(has_code(&err, ErrorCode::S002));
}

#[test]
fn s002_arithmetic_on_bool() {
    let err = check_err("seisu n = shinri + 1;");
    assert!(has_code(&err, ErrorCode::S002));
    assert!(has_message(&err, "`+`"));
}

#[test]
fn s002_logic_on_int() {
    let err = check_err("ronri b = 1 ^ shinri;");
    assert!(has_code(&err, ErrorCode::S002));
}

#[test]
fn s002_if_condition_must_be_bool() {
    let err = check_err("{ sorenara o_0 kido o_o; shushi }");
    assert!(has_code(&err, ErrorCode::S002));
    assert!(has_message(&err, "sorenara"));
}

#[test]
fn s002_for_bounds_must_be_int() {
    let err = check_err("{ shuki i = shinri : 3 kido shushi }");
    assert!(has_code(&err, ErrorCode::S002));
}

#[test]
fn s002_field_on_non_cell() {
    let err = check_err("seisu n = 1; seisu x = n => x;");
    assert!(has_code(&err, ErrorCode::S002));
}

#[test]
fn s002_cell_literal_coordinate() {
    let err = check_err("rippotai c = { shinri, 0, 0, uso };");
    assert!(has_code(&err, ErrorCode::S002));
}

#[test]
fn s002_argument_type() {
    let err = check_err("seisu kansu f(seisu n) kido shushi { f(shinri); }");
    assert!(has_code(&err, ErrorCode::S002));
    assert!(has_message(&err, "argument 1"));
}

#[test]
fn s002_indexed_store_must_be_int() {
    let err = check_err("hairetsu g = { 2 }; { g[0] = shinri; }");
    assert!(has_code(&err, ErrorCode::S002));
}

#[test]
fn s002_array_dimension_must_be_int() {
    let err = check_err("hairetsu g = { uso };");
    assert!(has_code(&err, ErrorCode::S002));
}

// ─── S003: redeclaration ─────────────────────────────────────────────────────

#[test]
fn s003_same_scope() {
    let err = check_err("seisu a = 1; seisu a = 2;");
    assert!(has_code(&err, ErrorCode::S003));
    assert!(has_message(&err, "`a`"));
}

#[test]
fn s003_same_block() {
    let err = check_err("{ seisu a; ronri a; }");
    assert!(has_code(&err, ErrorCode::S003));
}

#[test]
fn s003_duplicate_parameter() {
    let err = check_err("seisu kansu f(seisu a, seisu a) kido shushi");
    assert!(has_code(&err, ErrorCode::S003));
}

#[test]
fn s003_function_and_variable() {
    let err = check_err("seisu f; seisu kansu f() kido shushi");
    assert!(has_code(&err, ErrorCode::S003));
}

#[test]
fn s003_local_shadowing_parameter() {
    let err = check_err("seisu kansu f(seisu a) kido seisu a; shushi");
    assert!(has_code(&err, ErrorCode::S003));
}

// ─── S004: assignment to constant ────────────────────────────────────────────

#[test]
fn s004_literal_initialised_is_constant() {
    let err = check_err("seisu limit = 10; { limit = 11; }");
    assert!(has_code(&err, ErrorCode::S004));
    assert!(has_message(&err, "constant"));
}

#[test]
fn s004_bool_literal_is_constant() {
    let err = check_err("ronri on = shinri; { on = uso; }");
    assert!(has_code(&err, ErrorCode::S004));
}

#[test]
fn computed_initialiser_is_mutable() {
    check_ok("seisu limit = 10 + 0; { limit = 11; }");
}

#[test]
fn s004_assignment_to_function() {
    let err = check_err("seisu kansu f() kido shushi { f = 1; }");
    assert!(has_code(&err, ErrorCode::S004));
    assert!(has_message(&err, "function"));
}

// ─── S005: argument count ────────────────────────────────────────────────────

#[test]
fn s005_too_few_arguments() {
    let err = check_err("seisu kansu f(seisu a, seisu b) kido shushi { f(1); }");
    assert!(has_code(&err, ErrorCode::S005));
    assert!(has_message(&err, "2 argument"));
}

#[test]
fn s005_too_many_arguments() {
    let err = check_err("seisu kansu f() kido shushi { f(1); }");
    assert!(has_code(&err, ErrorCode::S005));
}

// ─── S006: not callable ──────────────────────────────────────────────────────

#[test]
fn s006_calling_a_variable() {
    let err = check_err("seisu n; { n(); }");
    assert!(has_code(&err, ErrorCode::S006));
}

// ─── S007: not an array ──────────────────────────────────────────────────────

#[test]
fn s007_indexing_a_scalar() {
    let err = check_err("seisu n; seisu m = n[0];");
    assert!(has_code(&err, ErrorCode::S007));
}

#[test]
fn s007_dims_of_a_cell() {
    let err = check_err("rippotai c = *_*; hairetsu d = jigen c;");
    assert!(has_code(&err, ErrorCode::S007));
}

#[test]
fn s007_indexed_assignment_to_scalar() {
    let err = check_err("seisu n; { n[0] = 1; }");
    assert!(has_code(&err, ErrorCode::S007));
}

// ─── Ordering ────────────────────────────────────────────────────────────────

#[test]
fn first_error_wins() {
    let err = check_err("{ a = 1; seisu b = shinri + 1; }");
    assert!(has_code(&err, ErrorCode::S001));
}

#[test]
fn error_codes_are_semantic() {
    let err = check_err("seisu a; seisu a;");
    assert!(err.code.is_semantic());
    assert_eq!(err.to_string(), "[S003] 1:10: `a` is already declared in this scope");
}
