//! Digest option models and top-level error types.

use std::fmt;
use std::path::PathBuf;

/// Default read block size in bytes.
pub const N_SIZE_CHUNK_DEFAULT: usize = 10240;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumDigestPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `digest_file` / `digest_tree`.
#[derive(Debug, Clone)]
pub struct SpecDigestOptions {
    /// Bytes read per block; progress is reported once per block.
    pub size_chunk: usize,
    /// Include patterns applied to file basename.
    pub patterns_include_files: Option<Vec<String>>,
    /// Exclude patterns applied to file basename.
    pub patterns_exclude_files: Option<Vec<String>>,
    /// Exclude patterns applied to directory basename.
    pub patterns_exclude_dirs: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumDigestPatternMode,
    /// Maximum directory depth to descend (`1` = direct children only).
    pub depth_limit: Option<usize>,
    /// Maximum worker threads for the hashing stage.
    pub num_workers_max: Option<usize>,
    /// Hash the targets of symlinked files instead of skipping them.
    pub if_follow_symlinks: bool,
}

impl Default for SpecDigestOptions {
    fn default() -> Self {
        Self {
            size_chunk: N_SIZE_CHUNK_DEFAULT,
            patterns_include_files: None,
            patterns_exclude_files: None,
            patterns_exclude_dirs: None,
            rule_pattern: EnumDigestPatternMode::Glob,
            depth_limit: None,
            num_workers_max: None,
            if_follow_symlinks: false,
        }
    }
}

/// MD5 and SHA-1 of one file, as uppercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFileDigest {
    /// Hashed file.
    pub path: PathBuf,
    /// Number of bytes read.
    pub n_bytes: u64,
    /// MD5 digest.
    pub md5: String,
    /// SHA-1 digest.
    pub sha1: String,
}

/// Progress snapshot emitted after each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecDigestProgress {
    /// Bytes consumed so far.
    pub n_bytes_read: u64,
    /// File size at open time.
    pub n_bytes_total: u64,
}

impl SpecDigestProgress {
    /// Completed fraction in `[0, 1]`; an empty file counts as complete.
    pub fn ratio(&self) -> f64 {
        if self.n_bytes_total == 0 {
            return 1.0;
        }
        (self.n_bytes_read as f64 / self.n_bytes_total as f64).min(1.0)
    }
}

/// One per-file failure with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDigestError {
    /// Failed file path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors (input validation / setup stage).
#[derive(Debug)]
pub enum DigestError {
    /// Block size of zero.
    InvalidChunkSize,
    /// Depth limit of zero.
    InvalidDepthLimit,
    /// Invalid include/exclude pattern.
    InvalidPattern(String),
    /// Input path does not exist.
    PathNotFound(PathBuf),
    /// Reading the input failed.
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChunkSize => write!(f, "Arg `size_chunk` must be >= 1."),
            Self::InvalidDepthLimit => write!(f, "Arg `depth_limit` must be >= 1 or None."),
            Self::InvalidPattern(msg) => write!(f, "{msg}"),
            Self::PathNotFound(path) => write!(f, "Path not found: {}", path.display()),
            Self::Io { path, message } => {
                write!(f, "Failed to read {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for DigestError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_ratio_handles_empty_file() {
        let progress = SpecDigestProgress {
            n_bytes_read: 0,
            n_bytes_total: 0,
        };
        assert_eq!(progress.ratio(), 1.0);

        let progress = SpecDigestProgress {
            n_bytes_read: 5,
            n_bytes_total: 20,
        };
        assert_eq!(progress.ratio(), 0.25);
    }

    #[test]
    fn digest_error_display_names_path() {
        let err = DigestError::PathNotFound(PathBuf::from("/tmp/missing.bin"));
        assert_eq!(err.to_string(), "Path not found: /tmp/missing.bin");
    }
}
