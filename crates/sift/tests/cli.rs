// ABOUTME: Integration tests for the sift CLI binary.
// ABOUTME: Tests HTML file extraction, output formats, heuristics files and URL fetching.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Test Page</title></head>
<body>
<div id="content"><p>Alpha, beta.</p></div>
<div class="sidebar"><p>ad</p></div>
</body>
</html>"#;

fn sift_cmd() -> Command {
    Command::cargo_bin("sift").unwrap()
}

fn write_article(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("test.html");
    fs::write(&path, ARTICLE).unwrap();
    path
}

#[test]
fn extracts_text_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_article(&temp_dir);

    sift_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--format")
        .arg("text")
        .assert()
        .success()
        .stdout(predicate::eq("Alpha, beta.\n"));
}

#[test]
fn extracts_markup_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_article(&temp_dir);

    sift_cmd()
        .arg("--html")
        .arg(&html_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<div id='content'><p>Alpha, beta.</p></div>",
        ))
        .stdout(predicate::str::contains("sidebar").not());
}

#[test]
fn reads_stdin() {
    assert_cmd::Command::cargo_bin("sift")
        .unwrap()
        .arg("--html")
        .arg("-")
        .arg("-f")
        .arg("txt")
        .write_stdin(ARTICLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha, beta."));
}

#[test]
fn json_output_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_article(&temp_dir);
    let output_path = temp_dir.path().join("output.json");

    sift_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com/story")
        .arg("--json")
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success();

    let output: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(output["domain"], "example.com");
    assert_eq!(output["tag"], "div");
    assert_eq!(output["text"], "Alpha, beta.");
    assert_eq!(output["word_count"], 2);
}

#[test]
fn timing_flag_prints_elapsed() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_article(&temp_dir);

    sift_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--timing")
        .assert()
        .success()
        .stderr(predicate::str::contains("elapsed:"))
        .stderr(predicate::str::contains("ms"));
}

#[test]
fn dump_heuristics_round_trips_through_file() {
    let output = sift_cmd()
        .arg("--dump-heuristics")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let temp_dir = TempDir::new().unwrap();
    let rules_path = temp_dir.path().join("rules.json");
    fs::write(&rules_path, &output).unwrap();
    let html_path = write_article(&temp_dir);

    sift_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--heuristics")
        .arg(&rules_path)
        .arg("-f")
        .arg("text")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha, beta."));
}

#[test]
fn invalid_heuristics_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let rules_path = temp_dir.path().join("rules.json");
    fs::write(&rules_path, "{}").unwrap();
    let html_path = write_article(&temp_dir);

    sift_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--heuristics")
        .arg(&rules_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn missing_file_fails() {
    sift_cmd()
        .arg("--html")
        .arg("/nonexistent/page.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn fetches_multiple_urls() {
    let server = MockServer::start();

    let mock1 = server.mock(|when, then| {
        when.method(GET).path("/page1");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><div><p>Page One, here.</p></div></body></html>");
    });

    let mock2 = server.mock(|when, then| {
        when.method(GET).path("/page2");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><div><p>Page Two, here.</p></div></body></html>");
    });

    let output = sift_cmd()
        .arg("--allow-private-networks")
        .arg("--json")
        .arg(server.url("/page1"))
        .arg(server.url("/page2"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    mock1.assert();
    mock2.assert();

    let results: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["text"], "Page One, here.");
    assert_eq!(results[1]["text"], "Page Two, here.");
}

#[test]
fn fetch_failure_exits_nonzero() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("nope");
    });

    sift_cmd()
        .arg("--allow-private-networks")
        .arg(server.url("/missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetch error"));
    mock.assert();
}

#[test]
fn private_network_blocked_by_default() {
    let server = MockServer::start();

    sift_cmd()
        .arg(server.url("/page"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("SSRF blocked"));
}

#[test]
fn no_args_fails() {
    sift_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one URL is required"));
}

#[test]
fn html_and_urls_conflict() {
    sift_cmd()
        .arg("--html")
        .arg("page.html")
        .arg("https://example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot use both"));
}
