use std::io::Read;
use std::process::Command;
use std::thread;
use std::time::Duration;

use assert_cmd::prelude::*;
use crossbeam_channel::unbounded;
use predicates::prelude::*;
use tempfile::tempdir;
use tiny_http::{Response, Server};

#[test]
fn prints_version() {
    let exe = env!("CARGO_BIN_EXE_feed-actions");
    let output = Command::new(exe)
        .arg("--version")
        .output()
        .expect("run feed-actions --version");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "stdout was: {}",
        stdout.trim()
    );
}

#[test]
fn prints_help() {
    Command::cargo_bin("feed-actions")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("feed-actions"))
        .stdout(predicate::str::contains("delete-comment"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn unknown_command_is_a_usage_error() {
    Command::cargo_bin("feed-actions")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown command"));
}

#[test]
fn dash_h_as_password_is_sent_not_treated_as_help() {
    let server = Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("ip listener");
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let _ = tx.send(body);
            let _ = request.respond(Response::from_string("").with_status_code(409));
        }
    });

    let dir = tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(
        &config,
        format!("server:\n  base_url: http://{addr}/\n  cookie: csrftoken=abc\n"),
    )
    .unwrap();

    Command::cargo_bin("feed-actions")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .args(["change-password", "old", "-h", "-h"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Verifique os dados informados!"))
        .stdout(predicate::str::contains("COMMANDS:").not());

    let body = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("password change was sent");
    assert_eq!(
        body,
        "old_password=old&new_password=-h&verification_password=-h"
    );
}
