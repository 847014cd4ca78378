use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn rox() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("rox"))
}

fn script(source: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", source).unwrap();
    file
}

#[test]
fn tokenize_prints_one_token_per_line() {
    let file = script("var x = 42;");

    rox()
        .arg("tokenize")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::eq(
            "VAR var null\nIDENTIFIER x null\nEQUAL = null\nNUMBER 42 42.0\nSEMICOLON ; null\nEOF  null\n",
        ));
}

#[test]
fn tokenize_emits_json() {
    let file = script("\"hi\"");

    rox()
        .args(["tokenize", "--json"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"STRING\""))
        .stdout(predicate::str::contains("\"literal\": \"hi\""));
}

#[test]
fn tokenize_exits_65_on_scan_error() {
    let file = script("1 $ 2");

    rox()
        .arg("tokenize")
        .arg(file.path())
        .assert()
        .code(65)
        .stdout(predicate::str::contains("NUMBER 2 2.0"))
        .stderr(predicate::str::contains(
            "[line 1] Error: Unexpected character: '$'.",
        ));
}

#[test]
fn parse_prints_ast() {
    let file = script("print 1 + 2 * 3;");

    rox()
        .arg("parse")
        .arg(file.path())
        .assert()
        .success()
        .stdout("(print (+ 1.0 (* 2.0 3.0)))\n");
}

#[test]
fn parse_exits_65_on_syntax_error() {
    let file = script("print (1;");

    rox()
        .arg("parse")
        .arg(file.path())
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Expect ')' after expression."));
}

#[test]
fn run_executes_program() {
    let file = script("fun sq(n) { return n * n; }\nprint sq(12);");

    rox()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("144\n");
}

#[test]
fn run_exits_65_on_static_error() {
    let file = script("print \"never\";\nreturn 1;");

    rox()
        .arg("run")
        .arg(file.path())
        .assert()
        .code(65)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Can't return from top-level code."));
}

#[test]
fn run_exits_70_on_runtime_error() {
    let file = script("print \"before\";\nprint -nil;");

    rox()
        .arg("run")
        .arg(file.path())
        .assert()
        .code(70)
        .stdout("before\n")
        .stderr(predicate::str::contains(
            "[line 2] Runtime error at '-': Operand must be a number.",
        ));
}

#[test]
fn run_feeds_stdin_to_read_line() {
    let file = script("var name = readLine(); print \"hello \" + name;");

    rox()
        .arg("run")
        .arg(file.path())
        .write_stdin("world\n")
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn run_fails_for_missing_file() {
    rox()
        .args(["run", "no_such_script.lox"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open file"));
}

#[test]
fn log_flag_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let file = script("print 1;");

    rox()
        .current_dir(dir.path())
        .args(["--log", "run"])
        .arg(file.path())
        .assert()
        .success()
        .stdout("1\n");

    assert!(dir.path().join("app.log").exists());
}

#[test]
fn repl_exits_on_eof() {
    rox().write_stdin("").assert().success();
}

#[test]
fn repl_keeps_state_between_lines() {
    rox()
        .arg("repl")
        .write_stdin("var a = 20;\nprint a + 22;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));
}

#[test]
fn repl_recovers_after_error() {
    rox()
        .write_stdin("print nil + 1;\nprint \"still here\";\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Runtime error"))
        .stdout(predicate::str::contains("still here"));
}
