//! End-to-end runs against a mock Story API.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serde_json::json;
use storycheck::{Cli, RunStatus, execute, run};
use storycheck_domain::{CaseOutcome, RunReport, TokenSource};
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "jwt-from-login";
const BEARER: &str = "Bearer jwt-from-login";
const CREATED_ID: &str = "story-42";

/// Writes a config file pointing at `server` and returns a CLI using it.
fn cli_for(server: &MockServer, dir: &TempDir, extra: &str) -> Cli {
    let path = dir.path().join("storycheck.toml");
    std::fs::write(
        &path,
        format!(
            "base_url = \"{}\"\nuser_name = \"tester\"\npassword = \"s3cret\"\ntimeout_ms = 5000\n{extra}",
            server.uri()
        ),
    )
    .unwrap();

    Cli {
        config: Some(path),
        ..Cli::default()
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/User/Login"))
        .and(body_json(json!({"userName": "tester", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": TOKEN})))
        .expect(1..)
        .mount(server)
        .await;
}

/// Mounts a Story API that behaves like the real one for `stories`.
async fn mount_story_api(server: &MockServer, stories: serde_json::Value) {
    // Missing required fields; mounted first so it wins over the generic create
    Mock::given(method("POST"))
        .and(path("/Story/Add"))
        .and(header("authorization", BEARER))
        .and(body_partial_json(json!({"title": "", "description": ""})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": {"Title": ["The Title field is required."]}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Story/Add"))
        .and(header("authorization", BEARER))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "title": "My First Story",
            "description": "This is a test story created via API",
            "status": "Pending"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"msg": "Successfully created!"})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Story/All"))
        .and(header("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(stories))
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/Story/Edit"))
        .and(query_param("storyId", CREATED_ID))
        .and(header("authorization", BEARER))
        .and(body_json(json!({
            "title": "Edited Story Title",
            "description": "This story has been updated",
            "status": "InProgress"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"msg": "Edited successfully"})),
        )
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/Story/Delete"))
        .and(query_param("storyId", CREATED_ID))
        .and(header("authorization", BEARER))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"msg": "The story is deleted!"})),
        )
        .mount(server)
        .await;

    for verb in ["PUT", "DELETE"] {
        Mock::given(method(verb))
            .and(query_param("storyId", "123"))
            .and(header("authorization", BEARER))
            .respond_with(ResponseTemplate::new(400).set_body_string("There is no such story!"))
            .mount(server)
            .await;
    }
}

fn outcomes(report: &RunReport) -> Vec<(u8, &'static str)> {
    report
        .cases
        .iter()
        .map(|c| (c.sequence, c.outcome.label()))
        .collect()
}

#[tokio::test]
async fn test_full_run_passes_against_well_behaved_api() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_story_api(
        &server,
        json!([
            {"id": 7, "title": "Older story"},
            {"id": CREATED_ID, "title": "My First Story", "status": "Pending"}
        ]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let report = execute(&cli_for(&server, &dir, "")).await.unwrap();

    assert_eq!(
        outcomes(&report),
        (1..=7).map(|seq| (seq, "PASS")).collect::<Vec<_>>()
    );
    assert_eq!(report.token_source, TokenSource::Login);
    assert_eq!(report.requests_sent, 7);
    assert_eq!(
        report.case(2).unwrap().captured_story_id.as_deref(),
        Some(CREATED_ID)
    );
    assert!(
        report
            .cases
            .iter()
            .all(|c| matches!(c.status, Some(200 | 400)))
    );
}

#[tokio::test]
async fn test_title_locator_skips_later_stories() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_story_api(
        &server,
        json!([
            {"id": CREATED_ID, "title": "My First Story"},
            {"id": "someone-else", "title": "Created concurrently"}
        ]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut cli = cli_for(&server, &dir, "story_locator = \"title\"\n");
    cli.only = vec![1, 2, 3, 4];

    assert_eq!(run(&cli).await, RunStatus::Passed);
}

#[tokio::test]
async fn test_empty_list_fails_edit_and_delete_without_sending_them() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_story_api(&server, json!([])).await;

    let dir = TempDir::new().unwrap();
    let mut cli = cli_for(&server, &dir, "");
    cli.only = vec![2, 3, 4];

    let report = execute(&cli).await.unwrap();

    assert_eq!(
        outcomes(&report),
        vec![(2, "FAIL"), (3, "SKIP"), (4, "SKIP")]
    );
    assert_eq!(report.requests_sent, 1);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/Story/Edit"));
    assert!(requests.iter().all(|r| r.url.path() != "/Story/Delete"));

    assert_eq!(run(&cli).await, RunStatus::CasesFailed);
}

#[tokio::test]
async fn test_delete_non_existing_story_is_repeatable() {
    let server = MockServer::start().await;
    mount_story_api(&server, json!([])).await;

    let dir = TempDir::new().unwrap();
    let mut cli = cli_for(&server, &dir, &format!("access_token = \"{TOKEN}\"\n"));
    cli.only = vec![7];

    let first = execute(&cli).await.unwrap();
    let second = execute(&cli).await.unwrap();

    for report in [&first, &second] {
        let case = report.case(7).unwrap();
        assert_eq!(case.outcome, CaseOutcome::Passed);
        assert_eq!(case.status, Some(400));
        assert_eq!(report.token_source, TokenSource::Configured);
    }
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn test_create_without_fields_fails_when_api_accepts_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Story/Add"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"msg": "Successfully created!"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cli = cli_for(&server, &dir, "access_token = \"static\"\n");
    cli.only = vec![5];

    let report = execute(&cli).await.unwrap();
    let case = report.case(5).unwrap();

    assert_eq!(case.outcome, CaseOutcome::Failed);
    let failure = case.failures().next().unwrap();
    assert!(
        failure
            .error
            .as_deref()
            .unwrap()
            .starts_with("Expected status 400, got 200")
    );
}

#[tokio::test]
async fn test_rejected_login_aborts_before_any_case() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/User/Login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(wiremock::matchers::path_regex("^/Story/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cli = cli_for(&server, &dir, "");

    let error = execute(&cli).await.unwrap_err();
    assert!(error.to_string().contains("status 401"));
    assert_eq!(run(&cli).await, RunStatus::SetupFailed);
}

#[tokio::test]
async fn test_json_report_is_written() {
    let server = MockServer::start().await;
    mount_story_api(&server, json!([])).await;

    let dir = TempDir::new().unwrap();
    let report_path: PathBuf = dir.path().join("out").join("report.json");
    let mut cli = cli_for(&server, &dir, &format!("access_token = \"{TOKEN}\"\n"));
    cli.only = vec![6, 7];
    cli.json_report = Some(report_path.clone());

    assert_eq!(run(&cli).await, RunStatus::Passed);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["requests_sent"], 2);
    assert_eq!(written["cases"][0]["sequence"], 6);
    assert_eq!(written["cases"][1]["outcome"], "passed");
}

#[tokio::test]
async fn test_missing_credentials_is_a_setup_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storycheck.toml");
    std::fs::write(&path, format!("base_url = \"{}\"\n", server.uri())).unwrap();

    let cli = Cli {
        config: Some(path),
        ..Cli::default()
    };

    assert_eq!(run(&cli).await, RunStatus::SetupFailed);
    assert!(server.received_requests().await.unwrap().is_empty());
}
