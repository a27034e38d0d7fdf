//! store::github
//!
//! GitHub implementation of the object store using the Git Data API.
//!
//! # Design
//!
//! All four object kinds map onto the REST Git Data endpoints
//! (`git/blobs`, `git/trees`, `git/commits`, `git/refs`) plus `pulls` for
//! merge requests. Blob content ships base64-encoded so arbitrary bytes
//! survive the JSON transport.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation returns
//! `StoreError::RateLimited` when limits are hit and does not retry;
//! a sync is safe to re-run wholesale because every object write is
//! content-addressed.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{NewPullRequest, ObjectStore, StoreError};
use super::types::{Commit, PullRequest, Reference, Tree, TreeEntry};

/// Default GitHub API base URL.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "canopy";

/// GitHub object store.
///
/// Holds the repository identity and credential; one instance serves one
/// repository. The API base is configurable for GitHub Enterprise (and for
/// pointing tests at a local mock server).
pub struct GitHubStore {
    /// HTTP client for making requests
    client: Client,
    /// OAuth or personal access token
    token: String,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubStore")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubStore {
    /// Create a store for `owner/repo` authenticated with `token`.
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a store with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise installations
    /// (e.g. `https://github.example.com/api/v3`).
    pub fn with_api_base(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.into(),
        }
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .map_err(|_| StoreError::AuthFailed("token contains invalid characters".into()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, StoreError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| StoreError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, StoreError> {
        // Flatten the top-level message plus any nested validation errors;
        // duplicate-PR detail lives in the nested list.
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.flatten(),
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => StoreError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => StoreError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => StoreError::NotFound(message),
            StatusCode::UNPROCESSABLE_ENTITY if is_already_exists(&message) => {
                StoreError::AlreadyExists(message)
            }
            StatusCode::UNPROCESSABLE_ENTITY => StoreError::ApiError {
                status: status.as_u16(),
                message,
            },
            StatusCode::TOO_MANY_REQUESTS => StoreError::RateLimited,
            _ if status.is_server_error() => StoreError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => StoreError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, StoreError> {
        let response = self
            .client
            .get(url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self
            .client
            .post(url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn patch_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self
            .client
            .patch(url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl ObjectStore for GitHubStore {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_reference(&self, ref_name: &str) -> Result<Reference, StoreError> {
        let url = self.repo_url(&format!("git/ref/{}", ref_name));
        let gh: GitHubReference = self.get_json(&url).await?;
        Ok(gh.into())
    }

    async fn create_reference(&self, ref_name: &str, sha: &str) -> Result<Reference, StoreError> {
        let url = self.repo_url("git/refs");
        let body = CreateReferenceBody {
            ref_name: format!("refs/{}", ref_name),
            sha,
        };
        let gh: GitHubReference = self.post_json(&url, &body).await?;
        Ok(gh.into())
    }

    async fn update_reference(&self, ref_name: &str, sha: &str) -> Result<Reference, StoreError> {
        let url = self.repo_url(&format!("git/refs/{}", ref_name));
        let body = UpdateReferenceBody { sha };
        let gh: GitHubReference = self.patch_json(&url, &body).await?;
        Ok(gh.into())
    }

    async fn get_commit(&self, sha: &str) -> Result<Commit, StoreError> {
        let url = self.repo_url(&format!("git/commits/{}", sha));
        let gh: GitHubCommit = self.get_json(&url).await?;
        Ok(gh.into())
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<Commit, StoreError> {
        let url = self.repo_url("git/commits");
        let body = CreateCommitBody {
            message,
            tree,
            parents,
        };
        let gh: GitHubCommit = self.post_json(&url, &body).await?;
        Ok(gh.into())
    }

    async fn get_tree(&self, sha: &str) -> Result<Tree, StoreError> {
        let url = self.repo_url(&format!("git/trees/{}", sha));
        self.get_json(&url).await
    }

    async fn create_tree(&self, entries: &[TreeEntry]) -> Result<Tree, StoreError> {
        let url = self.repo_url("git/trees");
        let body = CreateTreeBody { tree: entries };
        self.post_json(&url, &body).await
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, StoreError> {
        let url = self.repo_url("git/blobs");
        let body = CreateBlobBody {
            content: BASE64.encode(content),
            encoding: "base64",
        };
        let created: CreatedObject = self.post_json(&url, &body).await?;
        Ok(created.sha)
    }

    async fn create_pull_request(
        &self,
        request: NewPullRequest,
    ) -> Result<PullRequest, StoreError> {
        let url = self.repo_url("pulls");
        let body = CreatePullBody {
            title: &request.title,
            body: request.body.as_deref(),
            head: &request.head,
            base: &request.base,
        };
        let gh: GitHubPullRequest = self.post_json(&url, &body).await?;
        Ok(gh.into())
    }
}

/// Whether a 422 validation message denotes a duplicate pull request.
fn is_already_exists(message: &str) -> bool {
    message.to_ascii_lowercase().contains("already exist")
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a reference.
#[derive(Serialize)]
struct CreateReferenceBody<'a> {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: &'a str,
}

/// Request body for updating a reference.
#[derive(Serialize)]
struct UpdateReferenceBody<'a> {
    sha: &'a str,
}

/// Request body for creating a commit.
#[derive(Serialize)]
struct CreateCommitBody<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
}

/// Request body for creating a tree.
#[derive(Serialize)]
struct CreateTreeBody<'a> {
    tree: &'a [TreeEntry],
}

/// Request body for creating a blob.
#[derive(Serialize)]
struct CreateBlobBody {
    content: String,
    encoding: &'static str,
}

/// Request body for creating a pull request.
#[derive(Serialize)]
struct CreatePullBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    head: &'a str,
    base: &'a str,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
    #[serde(default)]
    errors: Vec<GitHubErrorDetail>,
}

/// Nested validation error detail.
#[derive(Deserialize)]
struct GitHubErrorDetail {
    message: Option<String>,
}

impl GitHubErrorResponse {
    /// Combine the top-level message with nested detail messages.
    fn flatten(self) -> String {
        let details: Vec<String> = self
            .errors
            .into_iter()
            .filter_map(|e| e.message)
            .collect();
        if details.is_empty() {
            self.message
        } else {
            format!("{}: {}", self.message, details.join("; "))
        }
    }
}

/// GitHub reference response format.
#[derive(Deserialize)]
struct GitHubReference {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubRefObject,
}

/// Target object of a reference.
#[derive(Deserialize)]
struct GitHubRefObject {
    sha: String,
}

impl From<GitHubReference> for Reference {
    fn from(gh: GitHubReference) -> Self {
        // The API reports fully qualified names ("refs/heads/x"); callers
        // work with the short form ("heads/x").
        let ref_name = gh
            .ref_name
            .strip_prefix("refs/")
            .unwrap_or(&gh.ref_name)
            .to_string();
        Reference {
            ref_name,
            sha: gh.object.sha,
        }
    }
}

/// GitHub commit response format.
#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    message: String,
    tree: GitHubTreeRef,
    #[serde(default)]
    parents: Vec<GitHubParentRef>,
}

#[derive(Deserialize)]
struct GitHubTreeRef {
    sha: String,
}

#[derive(Deserialize)]
struct GitHubParentRef {
    sha: String,
}

impl From<GitHubCommit> for Commit {
    fn from(gh: GitHubCommit) -> Self {
        Commit {
            sha: gh.sha,
            tree: gh.tree.sha,
            parents: gh.parents.into_iter().map(|p| p.sha).collect(),
            message: gh.message,
        }
    }
}

/// Response for blob creation.
#[derive(Deserialize)]
struct CreatedObject {
    sha: String,
}

/// GitHub PR response format.
#[derive(Deserialize)]
struct GitHubPullRequest {
    number: u64,
    html_url: String,
    title: String,
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(gh: GitHubPullRequest) -> Self {
        PullRequest {
            number: gh.number,
            url: gh.html_url,
            title: gh.title,
        }
    }
}
