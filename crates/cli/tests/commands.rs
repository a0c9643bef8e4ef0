use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const COUNTER: &str = r#"import { useState } from 'react';

export function Counter({ step }) {
  const [count, setCount] = useState(0);
  return <button onClick={() => setCount(count + step)}>{count}</button>;
}
"#;

#[allow(deprecated)]
fn ctxlog(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ctxlog").expect("binary");
    cmd.current_dir(workdir).env_remove("RUST_LOG");
    cmd
}

fn run_json(workdir: &Path, args: &[&str]) -> (bool, Value) {
    let output = ctxlog(workdir)
        .arg("--json")
        .args(args)
        .output()
        .expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), body)
}

#[test]
fn contexts_json_lists_scopes() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("Counter.jsx"), COUNTER).unwrap();

    let (ok, body) = run_json(temp.path(), &["contexts", "Counter.jsx"]);
    assert!(ok, "{body}");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["language"], "jsx");

    let contexts = body["data"]["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts[0]["name"], "Counter");
    assert_eq!(contexts[0]["kind"], "component");
    assert_eq!(contexts[0]["variables"]["props"][0], "step");
    assert_eq!(contexts[0]["variables"]["state"][0], "count");
    assert_eq!(contexts[0]["insertPosition"]["line"], 4);
    assert_eq!(contexts[1]["parent"], 0);
}

#[test]
fn at_reports_parent_chain_in_text() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("Counter.jsx"), COUNTER).unwrap();

    ctxlog(temp.path())
        .args(["at", "Counter.jsx", "--line", "5", "--column", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anonymous (function)"))
        .stdout(predicate::str::contains("parents: Counter"))
        .stdout(predicate::str::contains("Parent (Counter): state: count"));
}

#[test]
fn render_prints_the_statement() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("Counter.jsx"), COUNTER).unwrap();

    ctxlog(temp.path())
        .args(["render", "Counter.jsx", "--line", "4"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "console.log('[Counter.jsx > Counter]', { props: { step }, state: { count } });\n",
        ));
}

#[test]
fn insert_writes_the_file() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("math.js");
    fs::write(&file, "function add(a, b) {\n  return a + b;\n}\n").unwrap();

    ctxlog(temp.path())
        .args(["--preset", "minimal", "insert", "math.js", "--cursor", "2:3", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted 1 statement into math.js"));

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "function add(a, b) {\n  console.log('[math.js > add]', { args: { a, b } });\n  return a + b;\n}\n"
    );
}

#[test]
fn insert_without_scope_fails() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("flat.js"), "const a = 1;\n").unwrap();

    let (ok, body) = run_json(temp.path(), &["insert", "flat.js", "--cursor", "1"]);
    assert!(!ok);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "no_context");
}

#[test]
fn parse_failure_exits_non_zero() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("broken.ts"), "function broken( {").unwrap();

    let (ok, body) = run_json(temp.path(), &["contexts", "broken.ts"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "parse_error");

    ctxlog(temp.path())
        .args(["contexts", "broken.ts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error at"));
}

#[test]
fn config_file_in_workdir_is_picked_up() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join(".ctxlog.toml"),
        "logFunction = \"logger\"\nlogLevel = \"debug\"\nlogTemplate = \"${functionName}\"\n",
    )
    .unwrap();

    ctxlog(temp.path())
        .args(["wrap", "user.id"])
        .assert()
        .success()
        .stdout(predicate::eq("logger.debug({ user.id });\n"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("bad.json"), r#"{ "logLevl": "warn" }"#).unwrap();

    let (ok, body) = run_json(temp.path(), &["--config", "bad.json", "wrap", "x"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "invalid_config");
}

#[test]
fn language_override_is_validated() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("plain.txt"), "function f(a) { return a; }\n").unwrap();

    let (ok, body) = run_json(temp.path(), &["--language", "coffee", "contexts", "plain.txt"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "invalid_request");

    let (ok, body) = run_json(temp.path(), &["--language", "js", "contexts", "plain.txt"]);
    assert!(ok, "{body}");
    assert_eq!(body["data"]["language"], "javascript");
    assert_eq!(body["data"]["contexts"][0]["name"], "f");
}

#[test]
fn suggest_lists_line_identifiers() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("calc.ts"),
        "function calc(n: number) {\n  const total = sum(n, rate);\n  return total;\n}\n",
    )
    .unwrap();

    ctxlog(temp.path())
        .args(["suggest", "calc.ts", "--line", "2"])
        .assert()
        .success()
        .stdout(predicate::eq("total\nn\nrate\n"));
}

#[test]
fn scan_skips_ignored_and_unsupported_files() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("build")).unwrap();
    fs::write(root.join(".gitignore"), "build/\n").unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("src/a.js"), "function a(x) { return x; }\n").unwrap();
    fs::write(root.join("src/b.tsx"), "const B = () => <div />;\n").unwrap();
    fs::write(root.join("src/broken.js"), "function (\n").unwrap();
    fs::write(root.join("src/notes.md"), "# notes\n").unwrap();
    fs::write(root.join("build/out.js"), "function out() {}\n").unwrap();

    let (ok, body) = run_json(root, &["scan", "."]);
    assert!(ok, "{body}");
    let files: Vec<&str> = body["data"]["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|file| file["path"].as_str().unwrap())
        .collect();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("a.js"));
    assert!(files[1].ends_with("b.tsx"));

    let errors = body["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0]["path"].as_str().unwrap().ends_with("broken.js"));
}

const CALC: &str = "function add(a, b) {\n  return a + b;\n}\n\nconst double = (n) => {\n  return n * 2;\n};\n";

#[test]
fn insert_all_logs_every_scope_once() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("calc.js");
    fs::write(&file, CALC).unwrap();

    ctxlog(temp.path())
        .args(["--preset", "minimal", "insert", "calc.js", "--all", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted 2 statements into calc.js"));

    let expected = "function add(a, b) {\n  console.log('[calc.js > add]', { args: { a, b } });\n  return a + b;\n}\n\nconst double = (n) => {\n  console.log('[calc.js > double]', { args: { n } });\n  return n * 2;\n};\n";
    assert_eq!(fs::read_to_string(&file).unwrap(), expected);

    let (ok, body) = run_json(
        temp.path(),
        &["--preset", "minimal", "insert", "calc.js", "--all", "--write"],
    );
    assert!(ok, "{body}");
    assert_eq!(body["data"]["insertions"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["duplicates"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["written"], false);
    assert_eq!(fs::read_to_string(&file).unwrap(), expected);
}

#[test]
fn insert_all_conflicts_with_cursor() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("calc.js"), CALC).unwrap();

    ctxlog(temp.path())
        .args(["insert", "calc.js", "--all", "--cursor", "2"])
        .assert()
        .failure();
    ctxlog(temp.path())
        .args(["insert", "calc.js"])
        .assert()
        .failure();
}

#[test]
fn insert_skips_statement_already_present() {
    let temp = tempdir().unwrap();
    let logged = "function add(a, b) {\n  console.log('[math.js > add]', { args: { a, b } });\n  return a + b;\n}\n";
    fs::write(temp.path().join("math.js"), logged).unwrap();

    let (ok, body) = run_json(
        temp.path(),
        &["--preset", "minimal", "insert", "math.js", "--cursor", "3:3"],
    );
    assert!(ok, "{body}");
    assert_eq!(body["data"]["insertions"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["duplicates"][0]["context"], "add");
    assert_eq!(body["data"]["content"], logged);
}

#[test]
fn insert_adds_logger_import_once() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join(".ctxlog.json"),
        r#"{ "logFunction": "logger", "logItems": ["args"], "customLoggerImportStatement": "import { logger } from './logger';" }"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("math.js"),
        "function add(a, b) {\n  return a + b;\n}\n",
    )
    .unwrap();

    ctxlog(temp.path())
        .args(["insert", "math.js", "--cursor", "2"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "import { logger } from './logger';\nfunction add(a, b) {\n  logger.log('[math.js > add]', { args: { a, b } });\n  return a + b;\n}\n",
        ));

    fs::write(
        temp.path().join("math.js"),
        "import { logger } from './logger';\nfunction add(a, b) {\n  return a + b;\n}\n",
    )
    .unwrap();
    let (ok, body) = run_json(temp.path(), &["insert", "math.js", "--cursor", "3"]);
    assert!(ok, "{body}");
    assert!(body["data"]["importAdded"].is_null());
    assert_eq!(
        body["data"]["content"],
        "import { logger } from './logger';\nfunction add(a, b) {\n  logger.log('[math.js > add]', { args: { a, b } });\n  return a + b;\n}\n"
    );
}

#[test]
fn clean_removes_tagged_statements() {
    let temp = tempdir().unwrap();
    let original = "function add(a, b) {\n  return a + b;\n}\n";
    let file = temp.path().join("math.js");
    fs::write(
        temp.path().join(".ctxlog.toml"),
        "logTag = \"// @ctxlog\"\nwrapInDevCheck = true\nlogItems = [\"args\"]\n",
    )
    .unwrap();
    fs::write(&file, original).unwrap();

    ctxlog(temp.path())
        .args(["insert", "math.js", "--cursor", "2", "--write"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "function add(a, b) {\n  if (process.env.NODE_ENV !== 'production') {\n    console.log('[math.js > add]', { args: { a, b } });\n  } // @ctxlog\n  return a + b;\n}\n"
    );

    ctxlog(temp.path())
        .args(["clean", "math.js", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 3 lines from math.js"));
    assert_eq!(fs::read_to_string(&file).unwrap(), original);

    ctxlog(temp.path())
        .args(["clean", "math.js", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0 lines from math.js"));
}

#[test]
fn clean_requires_a_log_tag() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("math.js"), "function f() {}\n").unwrap();

    let (ok, body) = run_json(temp.path(), &["clean", "math.js"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "invalid_config");
}

#[test]
fn scan_text_counts_components() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("a.js"), "function a(x) { return x; }\n").unwrap();
    fs::write(temp.path().join("b.tsx"), "const B = () => <div />;\n").unwrap();

    ctxlog(temp.path())
        .args(["scan", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2 files, 2 scopes (1 component), 0 errors",
        ));
}
