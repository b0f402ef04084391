//! Offline contract tests for the `webintel` binary: argument validation
//! and credential checks that must fail before any network traffic.

use assert_cmd::Command;
use predicates::prelude::*;

fn webintel() -> Command {
    let mut cmd = Command::cargo_bin("webintel").unwrap();
    cmd.env_remove("WEBINTEL_API_KEY").env_remove("TAVILY_API_KEY");
    cmd
}

#[test]
fn help_lists_all_subcommands() {
    webintel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("deep-search"))
        .stdout(predicate::str::contains("crawl"))
        .stdout(predicate::str::contains("map"))
        .stdout(predicate::str::contains("research"));
}

#[test]
fn missing_credential_exits_1_with_message_on_stderr() {
    webintel()
        .args(["search", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("WEBINTEL_API_KEY"));
}

#[test]
fn blank_credential_counts_as_missing() {
    webintel()
        .env("TAVILY_API_KEY", "   ")
        .args(["deep-search", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("WEBINTEL_API_KEY"));
}

#[test]
fn extract_rejects_oversized_batches_before_any_request() {
    let urls: Vec<String> = (0..21).map(|i| format!("https://example.com/{i}")).collect();
    let mut cmd = webintel();
    cmd.env("WEBINTEL_API_KEY", "test-key").arg("extract");
    for u in &urls {
        cmd.arg(u);
    }
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("maximum 20 URLs"));
}

#[test]
fn research_rejects_malformed_output_schema() {
    webintel()
        .env("WEBINTEL_API_KEY", "test-key")
        .args(["research", "topic", "--output-schema", "{not json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--output-schema"));
}

#[test]
fn crawl_rejects_an_unparseable_url() {
    webintel()
        .env("WEBINTEL_API_KEY", "test-key")
        .args(["crawl", "not a url"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid URL"));
}

#[test]
fn search_rejects_an_unknown_topic() {
    webintel()
        .env("WEBINTEL_API_KEY", "test-key")
        .args(["search", "q", "--topic", "sports"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
