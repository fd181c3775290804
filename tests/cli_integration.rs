//! CLI integration tests using assert_cmd to exercise the actual binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MODEL_VARS: [&str; 9] = [
    "OPENROUTER_API_KEY",
    "OPENAI_API_KEY",
    "OPENROUTER_MODEL",
    "OPENAI_MODEL",
    "OPENROUTER_SUPERVISOR_MODEL",
    "OPENROUTER_CUSTOMER_MODEL",
    "OPENROUTER_CLASSIFIER_MODEL",
    "OPENROUTER_BASE_URL",
    "OPENAI_BASE_URL",
];

fn scopebridge(base: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scopebridge").unwrap();
    cmd.arg("--base-dir").arg(base.path());
    for var in MODEL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn base_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("admin")).unwrap();
    std::fs::create_dir_all(tmp.path().join("docs")).unwrap();
    tmp
}

// ---------------------------------------------------------------------------
// Single turns
// ---------------------------------------------------------------------------

#[test]
fn cli_admin_once_offline() {
    let tmp = base_dir();
    scopebridge(&tmp)
        .args(["--mode", "admin", "--model-mode", "offline", "--once", "list files"])
        .assert()
        .success()
        .stdout("supervisor handled: list files\n");
}

#[test]
fn cli_admin_docs_request_is_bridged() {
    let tmp = base_dir();
    scopebridge(&tmp)
        .args(["--mode", "admin", "--once", "Read docs for user"])
        .assert()
        .success()
        .stdout("customer-service handled: Read docs for user\n");
}

#[test]
fn cli_user_once_offline() {
    let tmp = base_dir();
    scopebridge(&tmp)
        .args(["--mode", "user", "--model-mode", "offline", "--once", "hello"])
        .assert()
        .success()
        .stdout("customer-service handled: hello\n");
}

#[test]
fn cli_empty_admin_input() {
    let tmp = base_dir();
    scopebridge(&tmp)
        .args(["--mode", "admin", "--model-mode", "offline", "--once", "  "])
        .assert()
        .success()
        .stdout("Empty admin input.\n");
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[test]
fn cli_online_without_credentials_fails() {
    let tmp = base_dir();
    scopebridge(&tmp)
        .args(["--mode", "admin", "--model-mode", "online", "--once", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("online model mode requested"));
}

#[test]
fn cli_rejects_unknown_model_mode() {
    let tmp = base_dir();
    scopebridge(&tmp)
        .args(["--mode", "admin", "--model-mode", "cloud", "--once", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown model mode"));
}

#[test]
fn cli_reports_bad_config_file() {
    let tmp = base_dir();
    std::fs::write(tmp.path().join("scopebridge.yml"), "agent: [not, a, map").unwrap();
    scopebridge(&tmp)
        .args(["--mode", "user", "--model-mode", "offline", "--once", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config parse error"));
}

// ---------------------------------------------------------------------------
// Interactive loop
// ---------------------------------------------------------------------------

#[test]
fn cli_loop_runs_until_quit() {
    let tmp = base_dir();
    scopebridge(&tmp)
        .args(["--mode", "admin", "--model-mode", "offline"])
        .write_stdin("list files\n\nquit\nnever reached\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("admin> supervisor handled: list files"))
        .stdout(predicate::str::contains("never reached").not());
}

#[test]
fn cli_loop_stops_at_eof() {
    let tmp = base_dir();
    scopebridge(&tmp)
        .args(["--mode", "user", "--model-mode", "offline"])
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout("user> customer-service handled: hello\nuser> ");
}
