use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdash-{nanos}-{name}"))
}

fn run_interactive(input: &str) -> (std::process::Output, String) {
    let exe = env!("CARGO_BIN_EXE_taskdash");
    let data_dir = temp_dir("cli-interactive");

    let mut child = Command::new(exe)
        .env("TASKDASH_DATA_DIR", &data_dir)
        .env("TASKDASH_CONFIG_PATH", data_dir.join("config.json"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    let output = child
        .wait_with_output()
        .expect("failed to read interactive output");

    let tasks = std::fs::read_to_string(data_dir.join("tasks.json")).unwrap_or_default();
    std::fs::remove_dir_all(&data_dir).ok();
    (output, tasks)
}

#[test]
fn interactive_help_shows_usage() {
    let (output, _) = run_interactive("help\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
}

#[test]
fn interactive_invalid_command_prints_error_and_continues() {
    let (output, _) = run_interactive("nope\nlist\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stdout.contains("No tasks yet."));
}

#[test]
fn interactive_session_shares_one_repository() {
    let (output, tasks) = run_interactive(
        "add \"Write report\" --priority medium\nadd \"Water plants\" --recurring daily\ndone 1\nlist\nquit\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Completed task: Write report"));

    let stored: serde_json::Value = serde_json::from_str(&tasks).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["task"], "Water plants");
}

#[test]
fn interactive_unterminated_quote_reports_error() {
    let (output, _) = run_interactive("add \"oops\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unterminated quote"));
}

#[test]
fn interactive_rejects_data_dir_override() {
    let other_dir = temp_dir("cli-interactive-other");
    let (output, tasks) = run_interactive(&format!(
        "add \"Write report\" --config-override data_dir={}\nadd \"Call bank\"\nexit\n",
        other_dir.display()
    ));
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(!other_dir.exists());

    let stored: serde_json::Value = serde_json::from_str(&tasks).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["task"], "Call bank");
}
