//! Process-level behaviour of the binary

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_static_server"));
    cmd.env_remove("PORT")
        .env_remove("ROOT_DIR")
        .env_remove("FILE_PATH")
        .args(["--config", "no-such-config-file"]);
    cmd
}

#[test]
fn bind_conflict_exits_non_zero() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port().to_string();
    let root = tempfile::tempdir().unwrap();

    let mut child = command()
        .args(["--host", "127.0.0.1", "--port", &port])
        .arg("--root-dir")
        .arg(root.path())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("server kept running on an occupied port");
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    assert!(!status.success());
    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to bind"), "stderr: {stderr}");

    // The first listener is untouched
    assert!(std::net::TcpStream::connect(occupied.local_addr().unwrap()).is_ok());
}

#[test]
fn show_config_reflects_overrides() {
    let output = command()
        .args(["--port", "9123", "--file-path", "index.html", "--show-config"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port = 9123"), "stdout: {stdout}");
    assert!(stdout.contains("file_path = \"index.html\""), "stdout: {stdout}");
}

#[test]
fn conflicting_modes_are_rejected() {
    let output = command()
        .args(["--root-dir", "static", "--file-path", "index.html"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}
