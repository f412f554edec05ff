//! CLI pipeline tests
//!
//! `cargo test -p aries-cli --test cli_test`

use aries_cli::{load_settings, run_once, Args};
use aries_foundation::Error;
use clap::Parser;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn args(argv: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("aries").chain(argv.iter().copied())).unwrap()
}

#[tokio::test]
async fn test_echo_through_repo_path() {
    let dir = TempDir::new().unwrap();
    let args = args(&[
        "--repo",
        "handlers/echo/",
        "\"hi\"",
        "{\"a\":1}",
        "2024-01-01",
    ]);

    let envelope = run_once(&args, dir.path()).await.unwrap();

    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({
            "input": {
                "task": "hi",
                "config": {"a": 1},
                "executionDate": "2024-01-01T00:00:00.000Z",
            }
        })
    );
}

#[tokio::test]
async fn test_invalid_date_is_null_in_output() {
    let dir = TempDir::new().unwrap();
    let args = args(&["--repo", "echo", "plain", "plain", "not-a-date"]);

    let envelope = run_once(&args, dir.path()).await.unwrap();

    assert_eq!(envelope.input["executionDate"], Value::Null);
    assert_eq!(envelope.input["task"], json!("plain"));
}

#[tokio::test]
async fn test_wrong_arity() {
    let dir = TempDir::new().unwrap();
    let args = args(&["--repo", "echo", "only-one"]);

    let err = run_once(&args, dir.path()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InvalidArity {
            expected: 3,
            actual: 1
        })
    ));
}

#[tokio::test]
async fn test_unknown_repo() {
    let dir = TempDir::new().unwrap();
    let args = args(&["--repo", "nowhere/reports", "t", "{}", "2024-01-01"]);

    let err = run_once(&args, dir.path()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::ModuleNotFound(_))
    ));
}

#[tokio::test]
async fn test_configured_tunnel_failure_stops_run() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("tunnel.json");
    fs::write(
        &settings,
        r#"{ "tunnel": { "program": "/nonexistent/aries-vpn", "readyTimeoutSecs": 5 } }"#,
    )
    .unwrap();
    let settings_arg = settings.to_string_lossy().to_string();

    let args = args(&[
        "--settings",
        &settings_arg,
        "--repo",
        "echo",
        "t",
        r#"{"connection": {"vpnConnection": "office"}}"#,
        "2024-01-01",
    ]);

    let err = run_once(&args, dir.path()).await.unwrap_err();

    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Tunnel(_))));
}

#[test]
fn test_override_settings_file_is_applied_last() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join(".aries");
    fs::create_dir_all(&project).unwrap();
    fs::write(
        project.join("settings.json"),
        r#"{ "aws": { "region": "us-east-1" } }"#,
    )
    .unwrap();
    let extra = dir.path().join("extra.json");
    fs::write(&extra, r#"{ "aws": { "region": "eu-central-1" } }"#).unwrap();

    let settings = load_settings(dir.path(), None);
    assert_eq!(settings.aws.region.as_deref(), Some("us-east-1"));

    let settings = load_settings(dir.path(), Some(Path::new(&extra)));
    assert_eq!(settings.aws.region.as_deref(), Some("eu-central-1"));
}
