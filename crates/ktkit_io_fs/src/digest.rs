//! Streaming MD5/SHA-1 digests over files and directory trees.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use sha1::Sha1;
use tracing::{debug, info};

use crate::report::{ReportDigest, ReportDigestBuilder};
use crate::spec::{DigestError, SpecDigestOptions, SpecDigestProgress, SpecFileDigest};
use crate::util::{SpecDigestPatterns, calculate_worker_limit, is_depth_within_limit};

#[derive(Debug)]
struct SpecDigestContext {
    spec_dg_options: SpecDigestOptions,
    spec_dg_pats: SpecDigestPatterns,
    builder_dg_report: ReportDigestBuilder,
    l_tasks_file: Vec<PathBuf>,
}

/// Hash one file in `size_chunk` blocks, calling `on_progress` after each block.
///
/// Digests are returned as uppercase hex.
pub fn digest_file<P, F>(
    path_file: P,
    spec_dg_options: &SpecDigestOptions,
    on_progress: F,
) -> Result<SpecFileDigest, DigestError>
where
    P: AsRef<Path>,
    F: FnMut(&SpecDigestProgress),
{
    let path_file = path_file.as_ref();
    if spec_dg_options.size_chunk == 0 {
        return Err(DigestError::InvalidChunkSize);
    }
    let map_io_err = |e: io::Error| DigestError::Io {
        path: path_file.to_path_buf(),
        message: e.to_string(),
    };

    let file = File::open(path_file).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DigestError::PathNotFound(path_file.to_path_buf()),
        _ => map_io_err(e),
    })?;
    let n_bytes_total = file.metadata().map_err(map_io_err)?.len();

    let (n_bytes, md5, sha1) =
        digest_reader(file, spec_dg_options.size_chunk, n_bytes_total, on_progress)
            .map_err(map_io_err)?;
    debug!(path = %path_file.display(), n_bytes, "file digested");
    Ok(SpecFileDigest {
        path: path_file.to_path_buf(),
        n_bytes,
        md5,
        sha1,
    })
}

/// Hash everything `reader` yields; returns `(bytes, md5, sha1)`.
pub fn digest_reader<R, F>(
    mut reader: R,
    size_chunk: usize,
    n_bytes_total: u64,
    mut on_progress: F,
) -> io::Result<(u64, String, String)>
where
    R: Read,
    F: FnMut(&SpecDigestProgress),
{
    let mut hasher_md5 = Md5::new();
    let mut hasher_sha1 = Sha1::new();
    let mut buf = vec![0u8; size_chunk.max(1)];
    let mut n_bytes_read: u64 = 0;

    loop {
        let n_read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher_md5.update(&buf[..n_read]);
        hasher_sha1.update(&buf[..n_read]);
        n_bytes_read += n_read as u64;
        on_progress(&SpecDigestProgress {
            n_bytes_read,
            n_bytes_total: n_bytes_total.max(n_bytes_read),
        });
    }

    Ok((
        n_bytes_read,
        hex::encode_upper(hasher_md5.finalize()),
        hex::encode_upper(hasher_sha1.finalize()),
    ))
}

/// Hash a file, or every matching file under a directory.
///
/// Setup failures (missing path, zero block size, bad pattern) are returned as
/// [`DigestError`]; per-file failures are collected in the report.
pub fn digest_tree<P>(path: P, spec_dg_options: SpecDigestOptions) -> Result<ReportDigest, DigestError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if spec_dg_options.size_chunk == 0 {
        return Err(DigestError::InvalidChunkSize);
    }
    if spec_dg_options.depth_limit == Some(0) {
        return Err(DigestError::InvalidDepthLimit);
    }
    if !path.exists() {
        return Err(DigestError::PathNotFound(path.to_path_buf()));
    }

    let spec_dg_pats = SpecDigestPatterns::from_raw(
        spec_dg_options.patterns_include_files.as_deref(),
        spec_dg_options.patterns_exclude_files.as_deref(),
        spec_dg_options.patterns_exclude_dirs.as_deref(),
        spec_dg_options.rule_pattern,
    )?;

    let mut spec_dg_ctx = SpecDigestContext {
        spec_dg_options,
        spec_dg_pats,
        builder_dg_report: ReportDigestBuilder::default(),
        l_tasks_file: Vec::new(),
    };

    if path.is_dir() {
        walk_directory(path, 0, &mut spec_dg_ctx);
    } else {
        spec_dg_ctx.builder_dg_report.add_scanned();
        spec_dg_ctx.builder_dg_report.add_matched();
        spec_dg_ctx.l_tasks_file.push(path.to_path_buf());
    }
    flush_digest_tasks(&mut spec_dg_ctx);

    let report = spec_dg_ctx.builder_dg_report.build();
    info!("{report}");
    Ok(report)
}

fn flush_digest_tasks(spec_dg_ctx: &mut SpecDigestContext) {
    let l_tasks_file = std::mem::take(&mut spec_dg_ctx.l_tasks_file);
    if l_tasks_file.is_empty() {
        return;
    }

    let spec_dg_options = &spec_dg_ctx.spec_dg_options;
    let run_task = |path_file: PathBuf| {
        let res_digest = digest_file(&path_file, spec_dg_options, |_| {});
        (path_file, res_digest)
    };

    let n_workers_max = calculate_worker_limit(spec_dg_options.num_workers_max);
    let l_results = if n_workers_max <= 1 || l_tasks_file.len() == 1 {
        l_tasks_file.into_iter().map(run_task).collect::<Vec<_>>()
    } else {
        match ThreadPoolBuilder::new().num_threads(n_workers_max).build() {
            Ok(thread_pool) => {
                thread_pool.install(|| l_tasks_file.into_par_iter().map(run_task).collect())
            }
            Err(_) => {
                spec_dg_ctx.builder_dg_report.add_warning(format!(
                    "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial digest."
                ));
                l_tasks_file.into_iter().map(run_task).collect()
            }
        }
    };

    for (path_file, res_digest) in l_results {
        match res_digest {
            Ok(digest) => spec_dg_ctx.builder_dg_report.add_digest(digest),
            Err(e) => spec_dg_ctx
                .builder_dg_report
                .add_error(path_file, e.to_string()),
        }
    }
}

fn walk_directory(path_root: &Path, n_depth_relative: usize, spec_dg_ctx: &mut SpecDigestContext) {
    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            spec_dg_ctx.builder_dg_report.add_warning(format!(
                "Failed to read directory {} ({e})",
                path_root.display()
            ));
            return;
        }
    };

    let mut l_dirs: Vec<(String, PathBuf)> = Vec::new();
    let mut l_files: Vec<(String, PathBuf)> = Vec::new();
    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_dg_ctx.builder_dg_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_root.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let c_name = entry.file_name().to_string_lossy().to_string();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_dg_ctx
                    .builder_dg_report
                    .add_warning(format!("Failed to inspect {} ({e})", path_entry.display()));
                continue;
            }
        };

        if cfg_file_type.is_dir() {
            l_dirs.push((c_name, path_entry));
        } else if cfg_file_type.is_file()
            || (cfg_file_type.is_symlink() && path_entry.is_file())
        {
            l_files.push((c_name, path_entry));
        } else {
            spec_dg_ctx.builder_dg_report.add_scanned();
            spec_dg_ctx.builder_dg_report.add_skipped();
            spec_dg_ctx
                .builder_dg_report
                .add_warning(format!("Special file skipped: {}", path_entry.display()));
        }
    }

    l_dirs.sort();
    l_files.sort();

    for (c_name, path_file) in l_files {
        spec_dg_ctx.builder_dg_report.add_scanned();
        if spec_dg_ctx.spec_dg_pats.should_skip_file(&c_name) {
            continue;
        }
        spec_dg_ctx.builder_dg_report.add_matched();

        let b_is_symlink = fs::symlink_metadata(&path_file)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if b_is_symlink && !spec_dg_ctx.spec_dg_options.if_follow_symlinks {
            spec_dg_ctx.builder_dg_report.add_skipped();
            continue;
        }
        spec_dg_ctx.l_tasks_file.push(path_file);
    }

    // Files inside a child directory sit two levels below `path_root`'s depth.
    if !is_depth_within_limit(n_depth_relative + 2, spec_dg_ctx.spec_dg_options.depth_limit) {
        return;
    }
    for (c_name, path_dir) in l_dirs {
        if spec_dg_ctx.spec_dg_pats.should_skip_dir(&c_name) {
            continue;
        }
        walk_directory(&path_dir, n_depth_relative + 1, spec_dg_ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumDigestPatternMode;

    const C_MD5_ABC: &str = "900150983CD24FB0D6963F7D28E17F72";
    const C_SHA1_ABC: &str = "A9993E364706816ABA3E25717850C26C9CD0D89D";

    fn write_bytes(path: &Path, data: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, data).unwrap();
    }

    #[test]
    fn digest_reader_known_vectors() {
        let (n_bytes, md5, sha1) = digest_reader(&b"abc"[..], 10240, 3, |_| {}).unwrap();
        assert_eq!(n_bytes, 3);
        assert_eq!(md5, C_MD5_ABC);
        assert_eq!(sha1, C_SHA1_ABC);

        let (n_bytes, md5, sha1) = digest_reader(&b""[..], 10240, 0, |_| {}).unwrap();
        assert_eq!(n_bytes, 0);
        assert_eq!(md5, "D41D8CD98F00B204E9800998ECF8427E");
        assert_eq!(sha1, "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709");
    }

    #[test]
    fn digest_reader_is_chunk_size_independent() {
        let data = b"The quick brown fox jumps over the lazy dog";
        for size_chunk in [1usize, 2, 7, 64, 10240] {
            let (_, md5, sha1) = digest_reader(&data[..], size_chunk, 43, |_| {}).unwrap();
            assert_eq!(md5, "9E107D9D372BB6826BD81D3542A419D6");
            assert_eq!(sha1, "2FD4E1C67A2D28FCED849EE1BB76E7391B93EB12");
        }
    }

    #[test]
    fn digest_reader_reports_progress_per_block() {
        let mut l_progress = Vec::new();
        digest_reader(&b"abcde"[..], 2, 5, |p| l_progress.push(p.n_bytes_read)).unwrap();
        assert_eq!(l_progress, vec![2, 4, 5]);
    }

    #[test]
    fn digest_file_known_answer_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path_file = dir.path().join("abc.txt");
        write_bytes(&path_file, b"abc");

        let mut n_calls = 0;
        let digest = digest_file(&path_file, &SpecDigestOptions::default(), |p| {
            n_calls += 1;
            assert_eq!(p.n_bytes_total, 3);
        })
        .unwrap();
        assert_eq!(digest.md5, C_MD5_ABC);
        assert_eq!(digest.sha1, C_SHA1_ABC);
        assert_eq!(n_calls, 1);

        assert!(matches!(
            digest_file(dir.path().join("missing"), &SpecDigestOptions::default(), |_| {}),
            Err(DigestError::PathNotFound(_))
        ));
        let spec_zero = SpecDigestOptions {
            size_chunk: 0,
            ..Default::default()
        };
        assert!(matches!(
            digest_file(&path_file, &spec_zero, |_| {}),
            Err(DigestError::InvalidChunkSize)
        ));
    }

    #[test]
    fn digest_tree_walks_sorted_with_filters() {
        let dir = tempfile::tempdir().unwrap();
        write_bytes(&dir.path().join("b.txt"), b"abc");
        write_bytes(&dir.path().join("a.txt"), b"");
        write_bytes(&dir.path().join("skip.log"), b"x");
        write_bytes(&dir.path().join("sub/c.txt"), b"abc");
        write_bytes(&dir.path().join(".git/d.txt"), b"abc");

        let spec_dg_options = SpecDigestOptions {
            patterns_include_files: Some(vec!["*.txt".to_string()]),
            patterns_exclude_dirs: Some(vec![".git".to_string()]),
            num_workers_max: Some(2),
            ..Default::default()
        };
        let report = digest_tree(dir.path(), spec_dg_options).unwrap();

        let l_names: Vec<PathBuf> = report
            .files
            .iter()
            .map(|d| d.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            l_names,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("sub/c.txt")
            ]
        );
        assert_eq!(report.cnt_scanned, 4);
        assert_eq!(report.cnt_matched, 3);
        assert_eq!(report.n_bytes_total, 6);
        assert_eq!(report.files[1].md5, C_MD5_ABC);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn digest_tree_depth_limit_stops_descent() {
        let dir = tempfile::tempdir().unwrap();
        write_bytes(&dir.path().join("top.bin"), b"1");
        write_bytes(&dir.path().join("l1/mid.bin"), b"2");
        write_bytes(&dir.path().join("l1/l2/deep.bin"), b"3");

        let report = digest_tree(
            dir.path(),
            SpecDigestOptions {
                depth_limit: Some(2),
                num_workers_max: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(report.cnt_digested, 2);
    }

    #[test]
    fn digest_tree_single_file_and_setup_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path_file = dir.path().join("one.bin");
        write_bytes(&path_file, b"abc");

        let report = digest_tree(&path_file, SpecDigestOptions::default()).unwrap();
        assert_eq!(report.cnt_digested, 1);
        assert_eq!(report.files[0].sha1, C_SHA1_ABC);

        assert!(matches!(
            digest_tree(dir.path().join("nope"), SpecDigestOptions::default()),
            Err(DigestError::PathNotFound(_))
        ));
        assert!(matches!(
            digest_tree(
                dir.path(),
                SpecDigestOptions {
                    patterns_include_files: Some(vec!["[".to_string()]),
                    rule_pattern: EnumDigestPatternMode::Regex,
                    ..Default::default()
                }
            ),
            Err(DigestError::InvalidPattern(_))
        ));
        assert!(matches!(
            digest_tree(
                dir.path(),
                SpecDigestOptions {
                    depth_limit: Some(0),
                    ..Default::default()
                }
            ),
            Err(DigestError::InvalidDepthLimit)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn digest_tree_skips_symlinks_unless_followed() {
        let dir = tempfile::tempdir().unwrap();
        write_bytes(&dir.path().join("real.txt"), b"abc");
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let report = digest_tree(dir.path(), SpecDigestOptions::default()).unwrap();
        assert_eq!(report.cnt_digested, 1);
        assert_eq!(report.cnt_skipped, 1);

        let report = digest_tree(
            dir.path(),
            SpecDigestOptions {
                if_follow_symlinks: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(report.cnt_digested, 2);
    }
}
