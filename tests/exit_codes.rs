use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

fn todokit_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_todokit"));
    cmd.env("HOME", home);
    cmd.env_remove("TODOKIT_CONFIG");
    cmd.env_remove("TODOKIT_LOG");
    cmd.env_remove("TODOKIT_UI_COLOR");
    cmd.env_remove("TODOKIT_DATA_DIR");
    cmd.env_remove("TODOKIT_SCOPE_TODOS_BY_USER");
    cmd.env_remove("TODOKIT_REPORT_FORMAT");
    cmd.env_remove("TODOKIT_REPORT_OUTPUT_DIR");
    cmd.env_remove("TODOKIT_REPORT_RESULTS_DIR");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    todokit_cmd(home).args(args).output().expect("run todokit")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home = std::env::temp_dir().join(format!("todokit-exit-test-{}-{seq}", std::process::id()));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

#[test]
fn completion_unknown_shell_exits_2() {
    let home = make_temp_home();
    let out = run(&home, &["completion", "nope"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn completion_known_shell_succeeds() {
    let home = make_temp_home();
    let out = run(&home, &["completion", "bash"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("todokit"));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn todo_commands_without_session_exit_3() {
    let home = make_temp_home();
    for args in [
        &["list"][..],
        &["add", "x"][..],
        &["toggle", "1"][..],
        &["rm", "1"][..],
        &["whoami"][..],
    ] {
        let out = run(&home, args);
        assert_eq!(out.status.code(), Some(3), "args={args:?}");
        assert!(
            String::from_utf8_lossy(&out.stderr).contains("not logged in"),
            "args={args:?}"
        );
    }
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn invalid_config_exits_2() {
    let home = make_temp_home();
    let cfg = home.join(".config/todokit/config.toml");
    std::fs::create_dir_all(cfg.parent().expect("parent")).expect("mkdirs");
    std::fs::write(&cfg, b"[ui]\ncolor = \"sometimes\"\n").expect("write");
    let out = run(&home, &["list"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn missing_explicit_config_exits_2() {
    let home = make_temp_home();
    let out = run(&home, &["--config", "/nonexistent/todokit.toml", "list"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn invalid_env_override_exits_2() {
    let home = make_temp_home();
    let out = todokit_cmd(&home)
        .env("TODOKIT_REPORT_FORMAT", "pdf")
        .args(["report", "show"])
        .output()
        .expect("run todokit");
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn malformed_ingest_exits_2_and_missing_file_exits_10() {
    let home = make_temp_home();
    let bad = home.join("bad.json");
    std::fs::write(&bad, b"{\"nope\": true}").expect("write");
    let out = run(&home, &["report", "ingest", bad.to_str().expect("utf8")]);
    assert_eq!(out.status.code(), Some(2));

    let missing = home.join("missing.json");
    let out = run(&home, &["report", "ingest", missing.to_str().expect("utf8")]);
    assert_eq!(out.status.code(), Some(10));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn non_numeric_id_is_a_usage_error() {
    let home = make_temp_home();
    let out = run(&home, &["toggle", "abc"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}
