//! Upload one file or a whole directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat};

use crate::client::ContentsApi;
use crate::spec::{
    SpecCommitIdentity, SpecCreateFileRequest, SpecUploadOptions, SpecUploadedFile, UploadError,
};
use crate::util::{
    derive_file_extension, derive_raw_url, derive_remote_dir, derive_remote_path, derive_upload_id,
};

/// Upload `path` (a file, or every file under a directory).
///
/// Files go up one at a time in sorted order; the first failure aborts the run
/// and files already created stay in the repository.
pub async fn upload_path<A>(
    api: &A,
    path: &Path,
    options: &SpecUploadOptions,
) -> Result<Vec<SpecUploadedFile>, UploadError>
where
    A: ContentsApi + ?Sized,
{
    derive_remote_dir(&Local::now(), &options.path_format)?;
    let l_files = collect_upload_files(path)?;
    tracing::info!(path = %path.display(), n_files = l_files.len(), "Uploading");

    let mut l_uploaded = Vec::with_capacity(l_files.len());
    for path_file in l_files {
        match upload_file(api, &path_file, options).await {
            Ok(uploaded) => l_uploaded.push(uploaded),
            Err(e) => {
                tracing::error!(path = %path_file.display(), error = %e, "Upload failed");
                return Err(e);
            }
        }
    }
    Ok(l_uploaded)
}

/// Upload a single file under a fresh remote name.
pub async fn upload_file<A>(
    api: &A,
    path_file: &Path,
    options: &SpecUploadOptions,
) -> Result<SpecUploadedFile, UploadError>
where
    A: ContentsApi + ?Sized,
{
    let now = Local::now();
    let content = tokio::fs::read(path_file)
        .await
        .map_err(|source| UploadError::Io {
            path: path_file.to_path_buf(),
            source,
        })?;

    let request = derive_create_request(path_file, content, options, &now)?;
    let created = api.create_file(&request).await?;
    let path_remote = if created.path.is_empty() {
        request.path
    } else {
        created.path
    };
    let url_raw = derive_raw_url(
        &options.raw_base,
        &options.owner,
        &options.repo,
        &options.branch,
        &path_remote,
    );
    tracing::info!(path = %path_file.display(), url = %url_raw, "Uploaded");

    Ok(SpecUploadedFile {
        path_local: path_file.to_path_buf(),
        path_remote,
        url_raw,
    })
}

fn derive_create_request(
    path_file: &Path,
    content: Vec<u8>,
    options: &SpecUploadOptions,
    now: &DateTime<Local>,
) -> Result<SpecCreateFileRequest, UploadError> {
    let c_dir = derive_remote_dir(now, &options.path_format)?;
    let ext = derive_file_extension(path_file);
    let path = derive_remote_path(&c_dir, &derive_upload_id(), ext.as_deref());

    let identity = SpecCommitIdentity {
        name: options.owner.clone(),
        email: options.email.clone(),
        date: now.to_rfc3339_opts(SecondsFormat::Secs, false),
    };
    Ok(SpecCreateFileRequest {
        owner: options.owner.clone(),
        repo: options.repo.clone(),
        path,
        message: options.commit_message.clone(),
        content,
        branch: options.branch.clone(),
        author: identity.clone(),
        committer: identity,
    })
}

/// Files to upload for `path`, sorted; directories are walked recursively.
pub fn collect_upload_files(path: &Path) -> Result<Vec<PathBuf>, UploadError> {
    let meta = fs::metadata(path).map_err(|_| UploadError::PathNotFound(path.to_path_buf()))?;
    if meta.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut l_files = Vec::new();
    let mut l_stack = vec![path.to_path_buf()];
    while let Some(dir) = l_stack.pop() {
        let read_dir = fs::read_dir(&dir).map_err(|source| UploadError::Io {
            path: dir.clone(),
            source,
        })?;
        for entry in read_dir {
            let entry = entry.map_err(|source| UploadError::Io {
                path: dir.clone(),
                source,
            })?;
            let path_entry = entry.path();
            // Linked directories are not descended into.
            let b_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            if b_dir {
                l_stack.push(path_entry);
            } else if path_entry.is_file() {
                l_files.push(path_entry);
            }
        }
    }
    l_files.sort();
    Ok(l_files)
}
