#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

/// `rangelog` command isolated inside `home` (config, database, fallback).
pub fn rlg(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("rangelog");
    cmd.env("RANGELOG_HOME", home).env_remove("RANGELOG_LOG");
    for var in ["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Fresh, initialized home directory.
pub fn setup_home() -> TempDir {
    let home = tempfile::tempdir().expect("tempdir");
    rlg(home.path()).arg("init").assert().success();
    home
}

/// Record one measurement through the CLI.
pub fn add_entry(home: &Path, odometer: &str, range: &str) {
    rlg(home)
        .args(["add", "--odometer", odometer, "--range", range])
        .assert()
        .success();
}

/// Read the pending count printed by `pending --count`.
pub fn pending_count(home: &Path) -> usize {
    let out = rlg(home)
        .args(["pending", "--count"])
        .output()
        .expect("run pending");
    assert!(out.status.success());
    String::from_utf8_lossy(&out.stdout)
        .trim()
        .parse()
        .expect("numeric pending count")
}

pub fn set_url(home: &Path, url: &str) {
    rlg(home)
        .args(["config", "--set-url", url])
        .assert()
        .success();
}

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn read_request(stream: &mut impl Read) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).expect("read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let len = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Minimal collector answering exactly one request with `status` and `body`.
///
/// Returns the URL to post to and a handle yielding the raw request.
pub fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let body = body.to_string();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let request = read_request(&mut stream);
        let reason = if status < 300 { "OK" } else { "Error" };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write response");
        request
    });

    (format!("http://{addr}/exec"), handle)
}
