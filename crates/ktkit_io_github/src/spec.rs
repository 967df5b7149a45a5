//! Upload options, request/response models and errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GitHub REST API root.
pub const C_API_BASE_DEFAULT: &str = "https://api.github.com";
/// Raw content host used to build download links.
pub const C_RAW_BASE_DEFAULT: &str = "https://raw.githubusercontent.com";
/// Remote directory naming (chrono strftime), one directory per day.
pub const C_PATH_FORMAT_DEFAULT: &str = "%Y%m%d";
/// User agent sent with every API call.
pub const C_USER_AGENT: &str = concat!("ktkit/", env!("CARGO_PKG_VERSION"));

////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Target repository and commit metadata for one upload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecUploadOptions {
    /// Repository owner; also used as author/committer name.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Target branch.
    pub branch: String,
    /// Commit message for every created file.
    pub commit_message: String,
    /// Author/committer email.
    pub email: String,
    /// strftime pattern for the remote directory.
    pub path_format: String,
    /// API root.
    pub api_base: String,
    /// Raw content root.
    pub raw_base: String,
}

impl Default for SpecUploadOptions {
    fn default() -> Self {
        Self {
            owner: "kazma233".to_string(),
            repo: "static".to_string(),
            branch: "master".to_string(),
            commit_message: "upload file via kt".to_string(),
            email: "kazma233@outlook.com".to_string(),
            path_format: C_PATH_FORMAT_DEFAULT.to_string(),
            api_base: C_API_BASE_DEFAULT.to_string(),
            raw_base: C_RAW_BASE_DEFAULT.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Models

/// Author/committer block of a contents API commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecCommitIdentity {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// RFC 3339 timestamp.
    pub date: String,
}

/// One "create file" call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCreateFileRequest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Path inside the repository.
    pub path: String,
    /// Commit message.
    pub message: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
    /// Target branch.
    pub branch: String,
    /// Commit author.
    pub author: SpecCommitIdentity,
    /// Commit committer.
    pub committer: SpecCommitIdentity,
}

/// JSON body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(crate) struct SpecCreateFileBody<'a> {
    pub(crate) message: &'a str,
    pub(crate) content: String,
    pub(crate) branch: &'a str,
    pub(crate) author: &'a SpecCommitIdentity,
    pub(crate) committer: &'a SpecCommitIdentity,
}

/// Created file as echoed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SpecCreatedContent {
    /// Path inside the repository.
    pub path: String,
    /// Blob SHA of the new file.
    #[serde(default)]
    pub sha: Option<String>,
    /// Browser link.
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpecCreateFileEnvelope {
    pub(crate) content: SpecCreatedContent,
}

/// Local file and where it ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecUploadedFile {
    /// Uploaded local file.
    pub path_local: PathBuf,
    /// Path inside the repository.
    pub path_remote: String,
    /// Direct download link.
    pub url_raw: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Upload failure; the run stops at the first one.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No API token was configured.
    #[error("missing GitHub token (pass --token or set GITHUB_TOKEN)")]
    MissingToken,
    /// strftime pattern the clock cannot render.
    #[error("invalid path format: {0}")]
    InvalidPathFormat(String),
    /// Input path does not exist.
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),
    /// Reading a local file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Local path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success API response.
    #[error("GitHub API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
