//! Contents API seam and its reqwest implementation.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::spec::{
    C_API_BASE_DEFAULT, C_USER_AGENT, SpecCreateFileBody, SpecCreateFileEnvelope,
    SpecCreateFileRequest, SpecCreatedContent, UploadError,
};

/// Anything that can create a file in a repository.
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// Create `request.path` with `request.content` in one commit.
    async fn create_file(
        &self,
        request: &SpecCreateFileRequest,
    ) -> Result<SpecCreatedContent, UploadError>;
}

/// GitHub REST client authenticated with a personal access token.
#[derive(Debug, Clone)]
pub struct GithubContentsClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl GithubContentsClient {
    /// Client against the public API.
    pub fn new(token: impl Into<String>) -> Result<Self, UploadError> {
        Self::with_api_base(token, C_API_BASE_DEFAULT)
    }

    /// Client against a custom API root (GitHub Enterprise, test servers).
    pub fn with_api_base(
        token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, UploadError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(UploadError::MissingToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .user_agent(C_USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Endpoint for one repository path.
    pub fn derive_contents_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!("{}/repos/{owner}/{repo}/contents/{path}", self.api_base)
    }
}

#[async_trait]
impl ContentsApi for GithubContentsClient {
    async fn create_file(
        &self,
        request: &SpecCreateFileRequest,
    ) -> Result<SpecCreatedContent, UploadError> {
        let url = self.derive_contents_url(&request.owner, &request.repo, &request.path);
        let body = SpecCreateFileBody {
            message: &request.message,
            content: STANDARD.encode(&request.content),
            branch: &request.branch,
            author: &request.author,
            committer: &request.committer,
        };

        tracing::debug!(url = %url, n_bytes = request.content.len(), "PUT contents");
        let resp = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), path = %request.path, "Contents API rejected upload");
            return Err(UploadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: SpecCreateFileEnvelope = resp.json().await?;
        Ok(envelope.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecCommitIdentity;

    #[test]
    fn blank_token_is_rejected() {
        assert!(matches!(
            GithubContentsClient::new("  "),
            Err(UploadError::MissingToken)
        ));
    }

    #[test]
    fn contents_url_trims_api_base() {
        let client = GithubContentsClient::with_api_base("t", "http://localhost:9/").unwrap();
        assert_eq!(
            client.derive_contents_url("o", "r", "20240309/a.png"),
            "http://localhost:9/repos/o/r/contents/20240309/a.png"
        );
    }

    #[test]
    fn request_body_is_base64_with_identities() {
        let who = SpecCommitIdentity {
            name: "o".to_string(),
            email: "o@example.com".to_string(),
            date: "2024-03-09T10:00:00+00:00".to_string(),
        };
        let body = SpecCreateFileBody {
            message: "m",
            content: STANDARD.encode(b"hello"),
            branch: "main",
            author: &who,
            committer: &who,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["content"], "aGVsbG8=");
        assert_eq!(value["branch"], "main");
        assert_eq!(value["author"]["email"], "o@example.com");
        assert_eq!(value["committer"]["date"], "2024-03-09T10:00:00+00:00");
    }

    #[test]
    fn created_content_parses_from_envelope() {
        let raw = r#"{"content":{"path":"d/a.png","sha":"abc","html_url":"https://x"},"commit":{}}"#;
        let envelope: SpecCreateFileEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.content.path, "d/a.png");
        assert_eq!(envelope.content.sha.as_deref(), Some("abc"));
    }
}
