//! Digest report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{SpecDigestError, SpecFileDigest};

/// Aggregate counters, digests and diagnostics for one `digest_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportDigest {
    /// Total scanned file entries.
    pub cnt_scanned: u64,
    /// Number of scanned files that matched filters.
    pub cnt_matched: u64,
    /// Number of files hashed successfully.
    pub cnt_digested: u64,
    /// Number of entries skipped (symlinks, special files).
    pub cnt_skipped: u64,
    /// Bytes hashed across all files.
    pub n_bytes_total: u64,
    /// Per-file digests, sorted by path.
    pub files: Vec<SpecFileDigest>,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
    /// Per-file failures.
    pub errors: Vec<SpecDigestError>,
}

impl ReportDigest {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_digested".to_string(), self.cnt_digested);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("n_bytes_total".to_string(), self.n_bytes_total);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scanned={} matched={} digested={} skipped={} bytes={} errors={} warnings={}",
            dict_counts["cnt_scanned"],
            dict_counts["cnt_matched"],
            dict_counts["cnt_digested"],
            dict_counts["cnt_skipped"],
            dict_counts["n_bytes_total"],
            dict_counts["cnt_errors"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[CHECK]"))
    }
}

/// Mutable accumulator for digest statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportDigestBuilder {
    cnt_scanned: u64,
    cnt_matched: u64,
    cnt_skipped: u64,
    files: Vec<SpecFileDigest>,
    warnings: Vec<String>,
    errors: Vec<SpecDigestError>,
}

impl ReportDigestBuilder {
    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    /// Increment matched count by one.
    pub fn add_matched(&mut self) {
        self.cnt_matched += 1;
    }

    /// Increment skipped count by one.
    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Record one successful digest.
    pub fn add_digest(&mut self, digest: SpecFileDigest) {
        self.files.push(digest);
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.errors.push(SpecDigestError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(mut self) -> ReportDigest {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        self.errors.sort_by(|a, b| a.path.cmp(&b.path));
        ReportDigest {
            cnt_scanned: self.cnt_scanned,
            cnt_matched: self.cnt_matched,
            cnt_digested: self.files.len() as u64,
            cnt_skipped: self.cnt_skipped,
            n_bytes_total: self.files.iter().map(|d| d.n_bytes).sum(),
            files: self.files,
            warnings: self.warnings,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_digest(path: &str, n_bytes: u64) -> SpecFileDigest {
        SpecFileDigest {
            path: PathBuf::from(path),
            n_bytes,
            md5: String::new(),
            sha1: String::new(),
        }
    }

    #[test]
    fn report_builder_sorts_files_and_sums_bytes() {
        let mut builder = ReportDigestBuilder::default();
        builder.add_scanned();
        builder.add_scanned();
        builder.add_scanned();
        builder.add_matched();
        builder.add_matched();
        builder.add_skipped();
        builder.add_digest(create_digest("b.txt", 7));
        builder.add_digest(create_digest("a.txt", 3));
        builder.add_warning("w".to_string());

        let report = builder.build();
        assert_eq!(report.files[0].path, PathBuf::from("a.txt"));
        assert_eq!(report.cnt_digested, 2);
        assert_eq!(report.n_bytes_total, 10);

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_scanned"], 3);
        assert_eq!(dict_counts["cnt_errors"], 0);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[CHECK]");
        assert_eq!(
            txt,
            "[CHECK] scanned=3 matched=2 digested=2 skipped=1 bytes=10 errors=0 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }
}
