//! HTTP-level tests of the GitHub store against a wiremock server,
//! including full pipeline runs over the wire.

use std::fs;
use tempfile::TempDir;

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use canopy::config::SyncOptions;
use canopy::store::github::GitHubStore;
use canopy::store::{NewPullRequest, ObjectStore, StoreError};
use canopy::sync::sync;

fn store_for(server: &MockServer) -> GitHubStore {
    GitHubStore::with_api_base("t0ken", "octocat", "site", server.uri())
}

#[tokio::test]
async fn get_reference_parses_and_strips_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/ref/heads/master"))
        .and(header("authorization", "Bearer t0ken"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": { "sha": "c0", "type": "commit" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let reference = store.get_reference("heads/master").await.unwrap();
    assert_eq!(reference.ref_name, "heads/master");
    assert_eq!(reference.sha, "c0");
}

#[tokio::test]
async fn missing_reference_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/ref/heads/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
        )
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store.get_reference("heads/gone").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn unauthorized_maps_to_auth_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
        )
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store.get_reference("heads/master").await;
    assert!(matches!(result, Err(StoreError::AuthFailed(_))));
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "message": "API rate limit" })),
        )
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store.get_tree("t0").await;
    assert!(matches!(result, Err(StoreError::RateLimited)));
}

#[tokio::test]
async fn create_blob_ships_base64_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/blobs"))
        .and(body_json(json!({
            "content": "aGVsbG8=",
            "encoding": "base64"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "b1" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let sha = store.create_blob(b"hello").await.unwrap();
    assert_eq!(sha, "b1");
}

#[tokio::test]
async fn create_reference_posts_fully_qualified_ref() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/refs"))
        .and(body_json(json!({
            "ref": "refs/heads/deploy",
            "sha": "c0"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/deploy",
            "object": { "sha": "c0", "type": "commit" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let reference = store.create_reference("heads/deploy", "c0").await.unwrap();
    assert_eq!(reference.sha, "c0");
}

#[tokio::test]
async fn update_reference_patches_sha() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/repos/octocat/site/git/refs/heads/master"))
        .and(body_json(json!({ "sha": "c1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": { "sha": "c1", "type": "commit" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let reference = store.update_reference("heads/master", "c1").await.unwrap();
    assert_eq!(reference.sha, "c1");
}

#[tokio::test]
async fn create_commit_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/commits"))
        .and(body_json(json!({
            "message": "Publish",
            "tree": "t1",
            "parents": ["c0"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "c1",
            "message": "Publish",
            "tree": { "sha": "t1" },
            "parents": [{ "sha": "c0" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let commit = store
        .create_commit("Publish", "t1", &["c0".to_string()])
        .await
        .unwrap();
    assert_eq!(commit.sha, "c1");
    assert_eq!(commit.tree, "t1");
    assert_eq!(commit.parents, vec!["c0".to_string()]);
}

#[tokio::test]
async fn duplicate_pull_request_maps_to_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/pulls"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
            "errors": [
                { "resource": "PullRequest",
                  "message": "A pull request already exists for octocat:deploy." }
            ]
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store
        .create_pull_request(NewPullRequest {
            head: "deploy".into(),
            base: "master".into(),
            title: "Publish".into(),
            body: None,
        })
        .await;
    assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
}

#[tokio::test]
async fn other_validation_failures_stay_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/pulls"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
            "errors": [{ "message": "base field is invalid" }]
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store
        .create_pull_request(NewPullRequest {
            head: "deploy".into(),
            base: "nope".into(),
            title: "Publish".into(),
            body: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(StoreError::ApiError { status: 422, .. })
    ));
}

/// Full pipeline over the wire: one local file lands under `assets` on a
/// repository whose root tree is empty.
#[tokio::test]
async fn pipeline_publishes_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/ref/heads/master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": { "sha": "c0", "type": "commit" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/commits/c0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "c0",
            "message": "init",
            "tree": { "sha": "t0" },
            "parents": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/trees/t0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "t0",
            "tree": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/blobs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "b1" })))
        .expect(1)
        .mount(&server)
        .await;
    // Leaf tree: the one containing the uploaded file.
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/trees"))
        .and(body_string_contains("index.html"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "t-leaf",
            "tree": [
                { "path": "index.html", "mode": "100644", "type": "blob", "sha": "b1" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    // Root tree: the one linking `assets` to the leaf.
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/trees"))
        .and(body_string_contains("assets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "t-root",
            "tree": [
                { "path": "assets", "mode": "040000", "type": "tree", "sha": "t-leaf" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/commits"))
        .and(body_json(json!({
            "message": "Publish assets",
            "tree": "t-root",
            "parents": ["c0"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "c1",
            "message": "Publish assets",
            "tree": { "sha": "t-root" },
            "parents": [{ "sha": "c0" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/repos/octocat/site/git/refs/heads/master"))
        .and(body_json(json!({ "sha": "c1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": { "sha": "c1", "type": "commit" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.html"), "<html>").unwrap();

    let store = store_for(&server);
    let options =
        SyncOptions::new("octocat", "site", dir.path(), "assets", "Publish assets").quiet(true);
    let outcome = sync(&store, &options).await.unwrap();

    assert_eq!(outcome.commit.as_deref(), Some("c1"));
    assert_eq!(outcome.root_tree, "t-root");
    assert!(!outcome.unchanged());
}

/// No-op over the wire: recreating identical content yields the original
/// root hash, so no commit or reference endpoint is ever called (none is
/// mounted - a call would 404 and fail the sync).
#[tokio::test]
async fn pipeline_detects_no_op_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/ref/heads/master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": { "sha": "c0", "type": "commit" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/commits/c0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "c0",
            "message": "init",
            "tree": { "sha": "t0" },
            "parents": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/trees/t0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "t0",
            "tree": [
                { "path": "assets", "mode": "040000", "type": "tree", "sha": "t-leaf" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/site/git/trees/t-leaf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "t-leaf",
            "tree": [
                { "path": "index.html", "mode": "100644", "type": "blob", "sha": "b1" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/blobs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "b1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/trees"))
        .and(body_string_contains("index.html"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "t-leaf",
            "tree": [
                { "path": "index.html", "mode": "100644", "type": "blob", "sha": "b1" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/site/git/trees"))
        .and(body_string_contains("assets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "t0",
            "tree": [
                { "path": "assets", "mode": "040000", "type": "tree", "sha": "t-leaf" }
            ]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.html"), "<html>").unwrap();

    let store = store_for(&server);
    let options =
        SyncOptions::new("octocat", "site", dir.path(), "assets", "Publish assets").quiet(true);
    let outcome = sync(&store, &options).await.unwrap();

    assert!(outcome.unchanged());
    assert_eq!(outcome.root_tree, "t0");
    assert!(outcome.commit.is_none());
}
