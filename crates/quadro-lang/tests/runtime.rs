//! Runtime behaviour tests.
//!
//! Tests the full stack: compile → execute against a robot in a small maze.
//! Globals and the robot are inspected after the run.

use glam::IVec3;
use pretty_assertions::assert_eq;
use quadro_lang::{compile, execute, run, ErrorCode, Globals, Maze, QuadroError, Robot, Value};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// 3×3×1, wall at (1,1,0), exit at (2,2,0), start at the origin.
const MAZE: &str = "
3 3 1
000
010
000
1
2 2 0
0 0 0
";

fn robot() -> Robot {
    Robot::new(MAZE.parse::<Maze>().unwrap_or_else(|e| panic!("bad maze: {e}")))
}

fn exec(src: &str) -> (Globals, Robot) {
    let program = compile(src).unwrap_or_else(|e| panic!("compile failed: {e}"));
    let mut robot = robot();
    let globals = execute(&program, &mut robot).unwrap_or_else(|e| panic!("run failed: {e}"));
    (globals, robot)
}

fn int(globals: &Globals, name: &str) -> i64 {
    match globals.get(name) {
        Some(Value::Int(n)) => n,
        other => panic!("expected Int for '{name}', got: {other:?}"),
    }
}

fn boolean(globals: &Globals, name: &str) -> bool {
    match globals.get(name) {
        Some(Value::Bool(b)) => b,
        other => panic!("expected Bool for '{name}', got: {other:?}"),
    }
}

// ─── Robot ───────────────────────────────────────────────────────────────────

#[test]
fn measure_forward_from_start() {
    let (g, _) = exec("seisu d; { d = o_0; }");
    assert_eq!(int(&g, "d"), 2);
}

#[test]
fn forward_then_right_crashes_into_the_wall() {
    let (g, robot) = exec("seisu d; rippotai here = *_*; { o_o; >_>; here = *_*; d = o_0; }");
    assert!(robot.is_crashed());
    assert_eq!(robot.coords(), IVec3::new(1, 0, 0));
    assert_eq!(int(&g, "d"), 0);
    match g.get("here") {
        Some(Value::Cell(c)) => {
            assert_eq!(c.pos, IVec3::new(1, 0, 0));
            assert!(!c.busy);
        }
        other => panic!("expected a cell, got {other:?}"),
    }
}

#[test]
fn moves_after_a_crash_are_ignored() {
    let (_, robot) = exec("{ o_o; >_>; ~_~; ~_~; o_o; }");
    assert!(robot.is_crashed());
    assert_eq!(robot.coords(), IVec3::new(1, 0, 0));
}

#[test]
fn position_fields() {
    let (g, _) = exec("seisu x; seisu y; ronri busy = 1 < 2; { >_>; >_>; x = *_* => x; y = *_* => y; busy = *_* => busy; }");
    assert_eq!(int(&g, "x"), 0);
    assert_eq!(int(&g, "y"), 2);
    assert!(!boolean(&g, "busy"));
}

#[test]
fn move_yields_zero() {
    let (g, robot) = exec("seisu m = 5 + 0; { m = o_o; }");
    assert_eq!(int(&g, "m"), 0);
    assert_eq!(robot.coords(), IVec3::X);
}

// ─── Declarations and values ─────────────────────────────────────────────────

#[test]
fn default_values() {
    let (g, _) = exec("seisu n; ronri b;");
    assert_eq!(int(&g, "n"), 0);
    assert!(!boolean(&g, "b"));
}

#[test]
fn int_into_bool_narrows() {
    let (g, _) = exec("ronri b = 7; ronri z = 0 * 3;");
    assert!(boolean(&g, "b"));
    assert!(!boolean(&g, "z"));
}

#[test]
fn arithmetic_and_logic() {
    let (g, _) = exec(r#"
        seisu a = 2 + 3 * 4;
        seisu b = (2 + 3) * 4;
        seisu c = 10 - 4 - 3;
        ronri p = a < b ^ ~ c > 5;
        ronri q = uso v a > b;
    "#);
    assert_eq!(int(&g, "a"), 14);
    assert_eq!(int(&g, "b"), 20);
    assert_eq!(int(&g, "c"), 3);
    assert!(boolean(&g, "p"));
    assert!(!boolean(&g, "q"));
}

#[test]
fn hex_literals() {
    let (g, _) = exec("seisu h = xFF + x10;");
    assert_eq!(int(&g, "h"), 271);
}

#[test]
fn cell_literal_fields() {
    let (g, _) = exec("rippotai c = { 1, 2, 3, shinri }; seisu s = c => x + c => y * c => z; ronri full = c => busy;");
    assert_eq!(int(&g, "s"), 7);
    assert!(boolean(&g, "full"));
}

#[test]
fn arrays_and_dims() {
    let (g, _) = exec(r#"
        hairetsu grid = { 2, 3 };
        hairetsu shape = jigen grid;
        seisu v;
        {
            grid[1, 2] = 7;
            v = grid[1, 2] + grid[0, 0];
        }
    "#);
    assert_eq!(int(&g, "v"), 7);
    assert_eq!(g.get("shape"), Some(Value::Array(vec![Value::Int(2), Value::Int(3)])));
}

#[test]
fn dims_keep_sizes_after_an_empty_level() {
    let (g, _) = exec("hairetsu empty = { 0, 4 }; hairetsu d = jigen empty;");
    assert_eq!(g.get("empty"), Some(Value::Array(Vec::new())));
    assert_eq!(g.get("d"), Some(Value::Array(vec![Value::Int(0), Value::Int(4)])));
}

#[test]
fn dims_follow_a_reassigned_array() {
    let (g, _) = exec("hairetsu list = { 0, 4 }; hairetsu d = { 1 }; { list = { 1, 2, 3 }; d = jigen list; }");
    assert_eq!(g.get("d"), Some(Value::Array(vec![Value::Int(3)])));
}

#[test]
fn array_literal() {
    let (g, _) = exec("hairetsu list = { 1 }; { list = { 1, 2 + 3, shinri }; }");
    assert_eq!(
        g.get("list"),
        Some(Value::Array(vec![Value::Int(1), Value::Int(5), Value::Bool(true)]))
    );
}

#[test]
fn partial_index_into_int_fails() {
    let mut robot = robot();
    let err = run("seisu n;\nhairetsu g = { 2, 2 };\n{\n  n = g[0];\n}", &mut robot).unwrap_err();
    match err {
        QuadroError::Runtime(e) => {
            assert_eq!(e.line, 4);
            assert!(e.message.contains("cannot convert"), "{}", e.message);
        }
        other => panic!("expected runtime error, got {other:?}"),
    }
}

#[test]
fn oversized_array_is_a_runtime_error() {
    let mut robot = robot();
    let err = run("{\n  hairetsu big = { x7FFFFFFFFFFFFFFF };\n}", &mut robot).unwrap_err();
    match err {
        QuadroError::Runtime(e) => {
            assert_eq!(e.line, 2);
            assert!(e.message.contains("too large"), "{}", e.message);
        }
        other => panic!("expected runtime error, got {other:?}"),
    }
}

#[test]
fn type_equality() {
    let (g, _) = exec("seisu a; hairetsu s = { 1 }; ronri t = ruikei { a, seisu }; ronri f = ruikei { s, rippotai };");
    assert!(boolean(&g, "t"));
    assert!(!boolean(&g, "f"));
}

#[test]
fn type_equality_does_not_run_commands() {
    let (g, robot) = exec("ronri t; { t = ruikei { o_o, seisu }; }");
    assert!(boolean(&g, "t"));
    assert_eq!(robot.coords(), IVec3::ZERO);
}

// ─── Control flow ────────────────────────────────────────────────────────────

#[test]
fn if_runs_only_when_true() {
    let (g, _) = exec("seisu n; { sorenara 1 < 2 kido n = n + 1; shushi sorenara 2 < 1 kido n = n + 10; shushi }");
    assert_eq!(int(&g, "n"), 1);
}

#[test]
fn for_is_inclusive() {
    let (g, _) = exec("seisu total; { shuki i = 1 : 4 kido total = total + i; shushi }");
    assert_eq!(int(&g, "total"), 10);
}

#[test]
fn for_with_start_after_end_runs_zero_times() {
    let (g, robot) = exec("seisu n; { shuki i = 5 : 1 kido n = n + 1; o_o; shushi }");
    assert_eq!(int(&g, "n"), 0);
    assert_eq!(robot.coords(), IVec3::ZERO);
}

#[test]
fn for_drives_the_robot() {
    let (_, robot) = exec("{ shuki i = 1 : 2 kido >_>; shushi }");
    assert_eq!(robot.coords(), IVec3::new(0, 2, 0));
    assert!(!robot.is_crashed());
}

#[test]
fn block_scopes_shadow() {
    let (g, _) = exec("seisu a = 1; { seisu a = 2; } seisu b = a + 0;");
    assert_eq!(int(&g, "b"), 1);
}

// ─── Functions ───────────────────────────────────────────────────────────────

#[test]
fn call_yields_zero_and_runs_body() {
    let (g, robot) = exec(r#"
        seisu calls;
        seisu result = 9 + 0;
        seisu kansu go(seisu n) kido
            calls = calls + n;
            o_o;
        shushi
        { result = go(3); }
    "#);
    assert_eq!(int(&g, "calls"), 3);
    assert_eq!(int(&g, "result"), 0);
    assert_eq!(robot.coords(), IVec3::X);
}

#[test]
fn recursion() {
    let (g, robot) = exec(r#"
        seisu depth;
        seisu kansu walk(seisu n) kido
            sorenara n > 0 kido
                depth = depth + 1;
                >_>;
                walk(n - 1);
            shushi
        shushi
        { walk(2); }
    "#);
    assert_eq!(int(&g, "depth"), 2);
    assert_eq!(robot.coords(), IVec3::new(0, 2, 0));
}

#[test]
fn closures_use_the_defining_scope() {
    let (g, _) = exec(r#"
        seisu seen;
        {
            seisu k = 5;
            seisu kansu peek() kido seen = k; shushi
            {
                seisu k = 100;
                peek();
            }
        }
    "#);
    assert_eq!(int(&g, "seen"), 5);
}

#[test]
fn closures_in_a_loop_see_that_iteration() {
    let (g, _) = exec(r#"
        seisu total;
        {
            shuki i = 1 : 3 kido
                seisu kansu add() kido total = total + i; shushi
                add();
            shushi
        }
    "#);
    assert_eq!(int(&g, "total"), 6);
}

#[test]
fn bool_parameter_narrows_int_argument() {
    let (g, _) = exec(r#"
        ronri got;
        seisu kansu f(ronri b) kido got = b; shushi
        { f(4); }
    "#);
    assert!(boolean(&g, "got"));
}

// ─── Stop-if outside a Sequence ──────────────────────────────────────────────

#[test]
fn stop_if_ends_the_enclosing_block_only() {
    let (g, robot) = exec(r#"
        seisu after;
        {
            o_o;
            o_0;
            >_<;
            ~_~;
        }
        { after = 1; }
    "#);
    assert_eq!(robot.coords(), IVec3::X);
    assert_eq!(int(&g, "after"), 1);
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn compile_errors_stop_before_execution() {
    let mut robot = robot();
    let err = run("{ o_o; } { seisu a; seisu a; }", &mut robot).unwrap_err();
    match err {
        QuadroError::Compile(e) => assert_eq!(e.code, ErrorCode::S003),
        other => panic!("expected compile error, got {other:?}"),
    }
    assert_eq!(robot.coords(), IVec3::ZERO);
}

#[test]
fn lexical_error() {
    let err = compile("seisu a = 1 $ 2;").unwrap_err();
    assert_eq!(err.code, ErrorCode::L001);
}

#[test]
fn syntax_error() {
    let err = compile("seisu = 1;").unwrap_err();
    assert!(err.code.is_syntactic());
}

#[test]
fn runtime_error_aborts_with_line() {
    let mut robot = robot();
    let err = run("hairetsu g = { 1 };\n{\n  g[5] = 1;\n}", &mut robot).unwrap_err();
    match err {
        QuadroError::Runtime(e) => assert_eq!(e.line, 3),
        other => panic!("expected runtime error, got {other:?}"),
    }
}

#[test]
fn bad_maze_is_reported() {
    let err: QuadroError = "2 2 1\n00\n".parse::<Maze>().unwrap_err().into();
    assert!(matches!(err, QuadroError::Maze(_)));
    assert!(err.to_string().starts_with("invalid maze"));
}
