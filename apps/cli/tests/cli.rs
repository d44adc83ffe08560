use std::{
    io::{Read, Write},
    net::TcpListener,
    sync::mpsc,
    thread,
    time::Duration,
};

use assert_cmd::Command;
use predicates::prelude::*;

fn safescan(work_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("safescan").unwrap();
    cmd.current_dir(work_dir)
        .env("RUST_LOG", "safescan=debug,safescan_core=debug")
        .arg("--work-dir")
        .arg(work_dir);
    cmd
}

#[test]
fn thumbnail_without_url_prints_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    safescan(dir.path())
        .arg("thumbnail")
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn frames_in_empty_dir_prints_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    safescan(dir.path())
        .arg("frames")
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn missing_work_dir_prints_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("safescan").unwrap();
    cmd.current_dir(dir.path())
        .args(["--work-dir", "does/not/exist", "frames"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn speech_scans_without_audio_print_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    for scan in ["transcript", "quick-speech", "full-speech"] {
        safescan(dir.path())
            .arg(scan)
            .assert()
            .success()
            .stdout("[]\n")
            .stderr(predicate::str::contains("No audio at"));
    }
}

#[test]
fn bad_arguments_still_print_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    safescan(dir.path())
        .arg("not-a-scan")
        .assert()
        .success()
        .stdout("[]\n");

    let mut cmd = Command::cargo_bin("safescan").unwrap();
    cmd.current_dir(dir.path())
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn broken_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("safescan.json"), "{ not json").unwrap();

    safescan(dir.path())
        .arg("frames")
        .assert()
        .success()
        .stdout("[]\n")
        .stderr(predicate::str::contains("using defaults"));
}

#[test]
fn unreachable_thumbnail_prints_empty_array_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    safescan(dir.path())
        .args(["thumbnail", "http://127.0.0.1:9/thumbnail.jpg"])
        .assert()
        .success()
        .stdout("[]\n");

    assert!(!dir.path().join("thumbnail.jpg").exists());
}

/// Local server answering every request with 404
fn not_found_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
    });
    format!("http://{}/thumbnail.jpg", addr)
}

#[test]
fn missing_thumbnail_prints_empty_array_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    safescan(dir.path())
        .args(["thumbnail", &not_found_url()])
        .assert()
        .success()
        .stdout("[]\n")
        .stderr(predicate::str::contains("404"));

    assert!(!dir.path().join("thumbnail.jpg").exists());
}

#[test]
fn title_scan_prints_flags() {
    let dir = tempfile::tempdir().unwrap();
    safescan(dir.path())
        .args(["title", "Haunted house tour"])
        .assert()
        .success()
        .stdout("[\"title contains dangerous term: \\\"haunted\\\"\"]\n");

    safescan(dir.path())
        .args(["title", "Counting songs for toddlers"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[cfg(unix)]
#[test]
fn sigterm_during_download_prints_empty_array() {
    let dir = tempfile::tempdir().unwrap();

    // accepts the connection and never answers
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/thumbnail.jpg", listener.local_addr().unwrap());
    let (accepted, connected) = mpsc::channel();
    thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            let _ = accepted.send(());
            thread::sleep(Duration::from_secs(30));
            drop(stream);
        }
    });

    let child = std::process::Command::new(assert_cmd::cargo::cargo_bin("safescan"))
        .current_dir(dir.path())
        .arg("--work-dir")
        .arg(dir.path())
        .args(["thumbnail", &url])
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .spawn()
        .unwrap();

    connected.recv_timeout(Duration::from_secs(10)).unwrap();
    thread::sleep(Duration::from_millis(300));
    let status = std::process::Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "[]\n");
    assert!(!dir.path().join("thumbnail.jpg").exists());
}

#[test]
fn help_is_not_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    safescan(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quick-speech"));
}
