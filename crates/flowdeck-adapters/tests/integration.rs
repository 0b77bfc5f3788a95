//! Integration tests for the flowdeck-adapters crate.
//!
//! These tests exercise the local file source and the GitHub source (against
//! a mock HTTP server) through the capability traits, the way the catalog
//! consumes them.

use std::sync::Arc;

use flowdeck_adapters::{
    ExecutionControl, FileSource, GitHubSource, LocalWorkflowSource, RepositoryKey,
};
use mockito::Matcher;

fn write_checkout() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let workflows = dir.path().join(".github").join("workflows");
    std::fs::create_dir_all(&workflows).unwrap();
    std::fs::write(
        workflows.join("ci.yml"),
        "name: CI\non: [push]\njobs:\n  test: {}\n",
    )
    .unwrap();
    std::fs::write(workflows.join("docs.yaml"), "on: push\njobs: {}\n").unwrap();
    std::fs::write(workflows.join("action.json"), "{}").unwrap();
    dir
}

#[tokio::test]
async fn local_source_through_trait_object() {
    let dir = write_checkout();
    let source: Arc<dyn FileSource> = Arc::new(LocalWorkflowSource::new(dir.path()));
    let repo = RepositoryKey::new("acme", "site");

    let files = source
        .list_definition_files(&repo, ".github/workflows")
        .await
        .unwrap();
    assert_eq!(files.len(), 2);

    let raw = source.read_file_content(&repo, &files[0].path).await.unwrap();
    assert!(raw.starts_with("name: CI"));
}

#[tokio::test]
async fn custom_extensions_are_honored() {
    let dir = write_checkout();
    let source = LocalWorkflowSource::new(dir.path()).with_extensions(vec!["json".into()]);
    let files = source
        .list_definition_files(&RepositoryKey::new("acme", "site"), "/.github/workflows/")
        .await
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "action.json");
    assert_eq!(files[0].path, ".github/workflows/action.json");
}

#[tokio::test]
async fn traversal_is_rejected() {
    let dir = write_checkout();
    let source = LocalWorkflowSource::new(dir.path());
    let result = source
        .read_file_content(&RepositoryKey::new("acme", "site"), "../secrets.yml")
        .await;
    assert!(result.is_err());
}

// ═══════════════════════════════════════════════════════════════════════
//  GitHub source
// ═══════════════════════════════════════════════════════════════════════

const NOT_FOUND: &str = r#"{"message":"Not Found"}"#;

fn github(server: &mockito::ServerGuard) -> GitHubSource {
    GitHubSource::new()
        .with_base_url(&server.url())
        .with_token("ghp_test")
}

#[tokio::test]
async fn missing_repository_is_an_error_not_an_empty_list() {
    let mut server = mockito::Server::new_async().await;
    let contents = server
        .mock("GET", "/repos/typo-owner/no-such-repo/contents/.github/workflows")
        .with_status(404)
        .with_body(NOT_FOUND)
        .create_async()
        .await;
    let repository = server
        .mock("GET", "/repos/typo-owner/no-such-repo")
        .with_status(404)
        .with_body(NOT_FOUND)
        .create_async()
        .await;

    let repo = RepositoryKey::new("typo-owner", "no-such-repo");
    let err = github(&server)
        .list_definition_files(&repo, ".github/workflows")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("repository typo-owner/no-such-repo"));

    contents.assert_async().await;
    repository.assert_async().await;
}

#[tokio::test]
async fn missing_directory_in_existing_repository_is_empty() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/acme/site/contents/.github/workflows")
        .with_status(404)
        .with_body(NOT_FOUND)
        .create_async()
        .await;
    server
        .mock("GET", "/repos/acme/site")
        .with_status(200)
        .with_body(r#"{"full_name":"acme/site"}"#)
        .create_async()
        .await;

    let files = github(&server)
        .list_definition_files(&RepositoryKey::new("acme", "site"), ".github/workflows")
        .await
        .unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn listing_is_filtered_to_definition_files() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/acme/site/contents/.github/workflows")
        .match_header("authorization", "Bearer ghp_test")
        .with_status(200)
        .with_body(
            r#"[
                {"name": "ci.yml", "path": ".github/workflows/ci.yml", "type": "file"},
                {"name": "notes.md", "path": ".github/workflows/notes.md", "type": "file"}
            ]"#,
        )
        .create_async()
        .await;

    let files = github(&server)
        .list_definition_files(&RepositoryKey::new("acme", "site"), ".github/workflows")
        .await
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, ".github/workflows/ci.yml");
}

#[tokio::test]
async fn reserved_characters_in_file_names_are_encoded() {
    let mut server = mockito::Server::new_async().await;
    let read = server
        .mock("GET", "/repos/acme/site/contents/.github/workflows/deploy%23prod.yml")
        .with_status(200)
        .with_body("name: Deploy\non: push\njobs: {}\n")
        .create_async()
        .await;
    let runs = server
        .mock("GET", "/repos/acme/site/actions/workflows/deploy%23prod.yml/runs")
        .match_query(Matcher::UrlEncoded("per_page".into(), "1".into()))
        .with_status(200)
        .with_body(
            r#"{"total_count": 1, "workflow_runs": [{
                "id": 9, "status": "completed", "conclusion": "success",
                "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:05:00Z",
                "html_url": "https://github.com/acme/site/actions/runs/9",
                "run_number": 3, "head_sha": "abc", "event": "push"
            }]}"#,
        )
        .create_async()
        .await;

    let source = github(&server);
    let repo = RepositoryKey::new("acme", "site");

    let raw = source
        .read_file_content(&repo, ".github/workflows/deploy#prod.yml")
        .await
        .unwrap();
    assert!(raw.starts_with("name: Deploy"));

    let found = source.list_executions(&repo, "deploy#prod.yml", 1).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 9);

    read.assert_async().await;
    runs.assert_async().await;
}
