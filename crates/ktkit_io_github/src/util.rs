use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, TimeZone};

use crate::spec::UploadError;

/// Extension of the file name (text after its last `.`), if any.
pub fn derive_file_extension(path: &Path) -> Option<String> {
    let c_name = path.file_name()?.to_string_lossy();
    let (c_stem, c_ext) = c_name.rsplit_once('.')?;
    if c_stem.is_empty() || c_ext.is_empty() {
        return None;
    }
    Some(c_ext.to_string())
}

/// Render the remote directory for `now`.
pub fn derive_remote_dir<Tz>(now: &DateTime<Tz>, path_format: &str) -> Result<String, UploadError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut c_dir = String::new();
    write!(c_dir, "{}", now.format(path_format))
        .map_err(|_| UploadError::InvalidPathFormat(path_format.to_string()))?;
    Ok(c_dir)
}

/// `<dir>/<id>[.<ext>]`.
pub fn derive_remote_path(c_dir: &str, id: &str, ext: Option<&str>) -> String {
    let c_file = match ext {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    };
    if c_dir.is_empty() {
        return c_file;
    }
    format!("{}/{c_file}", c_dir.trim_end_matches('/'))
}

/// `<raw_base>/<owner>/<repo>/<branch>/<path>`.
pub fn derive_raw_url(raw_base: &str, owner: &str, repo: &str, branch: &str, path: &str) -> String {
    format!(
        "{}/{owner}/{repo}/{branch}/{path}",
        raw_base.trim_end_matches('/')
    )
}

/// Fresh collision-free file id.
pub fn derive_upload_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn file_extension_uses_last_dot_of_file_name() {
        assert_eq!(
            derive_file_extension(Path::new("dir.v2/archive.tar.gz")),
            Some("gz".to_string())
        );
        assert_eq!(derive_file_extension(Path::new("dir.v2/README")), None);
        assert_eq!(derive_file_extension(Path::new(".bashrc")), None);
        assert_eq!(derive_file_extension(Path::new("trailing.")), None);
    }

    #[test]
    fn remote_dir_follows_strftime() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();
        assert_eq!(derive_remote_dir(&now, "%Y%m%d").unwrap(), "20240309");
        assert_eq!(derive_remote_dir(&now, "img/%Y/%m").unwrap(), "img/2024/03");
        assert!(matches!(
            derive_remote_dir(&now, "%Q"),
            Err(UploadError::InvalidPathFormat(_))
        ));
    }

    #[test]
    fn remote_path_omits_missing_extension() {
        assert_eq!(derive_remote_path("20240309", "abc", Some("png")), "20240309/abc.png");
        assert_eq!(derive_remote_path("20240309/", "abc", None), "20240309/abc");
        assert_eq!(derive_remote_path("", "abc", None), "abc");
    }

    #[test]
    fn raw_url_joins_repo_coordinates() {
        assert_eq!(
            derive_raw_url(
                "https://raw.githubusercontent.com/",
                "kazma233",
                "static",
                "master",
                "20240309/abc.png"
            ),
            "https://raw.githubusercontent.com/kazma233/static/master/20240309/abc.png"
        );
    }

    #[test]
    fn upload_ids_are_unique_hex() {
        let id_a = derive_upload_id();
        let id_b = derive_upload_id();
        assert_ne!(id_a, id_b);
        assert_eq!(id_a.len(), 32);
        assert!(id_a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
