//! Upload local files to a GitHub repository through the contents API.
//!
//! Each file lands under `<date dir>/<uuid>[.<ext>]` and is returned with its
//! raw download URL. The HTTP side sits behind [`ContentsApi`] so uploads can
//! be driven against any implementation.

pub mod client;
pub mod spec;
pub mod upload;
mod util;

pub use client::{ContentsApi, GithubContentsClient};
pub use spec::{
    C_API_BASE_DEFAULT, C_PATH_FORMAT_DEFAULT, C_RAW_BASE_DEFAULT, SpecCommitIdentity,
    SpecCreateFileRequest, SpecCreatedContent, SpecUploadOptions, SpecUploadedFile, UploadError,
};
pub use upload::{collect_upload_files, upload_file, upload_path};
pub use util::{derive_raw_url, derive_remote_path};
