use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{DigestError, EnumDigestPatternMode};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeDigestPatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypeDigestPatternSeq {
    fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
            Self::Glob(v) => v.iter().any(|p| p.is_match(value)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(value)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpecDigestPatterns {
    pub(crate) patterns_include_files: Option<TypeDigestPatternSeq>,
    pub(crate) patterns_exclude_files: Option<TypeDigestPatternSeq>,
    pub(crate) patterns_exclude_dirs: Option<TypeDigestPatternSeq>,
}

impl SpecDigestPatterns {
    pub(crate) fn from_raw(
        patterns_include_files: Option<&[String]>,
        patterns_exclude_files: Option<&[String]>,
        patterns_exclude_dirs: Option<&[String]>,
        rule_pattern: EnumDigestPatternMode,
    ) -> Result<Self, DigestError> {
        Ok(Self {
            patterns_include_files: _compile(patterns_include_files, rule_pattern)?,
            patterns_exclude_files: _compile(patterns_exclude_files, rule_pattern)?,
            patterns_exclude_dirs: _compile(patterns_exclude_dirs, rule_pattern)?,
        })
    }

    pub(crate) fn should_skip_file(&self, name_file: &str) -> bool {
        should_exclude_by_patterns(
            name_file,
            self.patterns_include_files.as_ref(),
            self.patterns_exclude_files.as_ref(),
        )
    }

    pub(crate) fn should_skip_dir(&self, name_dir: &str) -> bool {
        should_exclude_by_patterns(name_dir, None, self.patterns_exclude_dirs.as_ref())
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumDigestPatternMode,
) -> Result<Option<TypeDigestPatternSeq>, DigestError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumDigestPatternMode::Literal => {
            Ok(Some(TypeDigestPatternSeq::Literal(patterns.to_vec())))
        }
        EnumDigestPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| {
                        DigestError::InvalidPattern(format!(
                            "Invalid pattern in include/exclude: {e}"
                        ))
                    })?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypeDigestPatternSeq::Glob(l_glob)))
        }
        EnumDigestPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| {
                    DigestError::InvalidPattern(format!("Invalid pattern in include/exclude: {e}"))
                })?;
                l_regex.push(regex);
            }
            Ok(Some(TypeDigestPatternSeq::Regex(l_regex)))
        }
    }
}

pub(crate) fn should_exclude_by_patterns(
    value: &str,
    patterns_include: Option<&TypeDigestPatternSeq>,
    patterns_exclude: Option<&TypeDigestPatternSeq>,
) -> bool {
    let b_included = patterns_include.is_none_or(|p| p.is_match(value));
    let b_excluded = patterns_exclude.is_some_and(|p| p.is_match(value));
    !b_included || b_excluded
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Misc

pub(crate) fn is_depth_within_limit(depth_value: usize, depth_limit: Option<usize>) -> bool {
    depth_limit.is_none_or(|limit| depth_value <= limit)
}

pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

/// Format a byte count in mebibytes with two decimals (`1.50M`).
pub fn format_size_mib(n_bytes: u64) -> String {
    format!("{:.2}M", n_bytes as f64 / (1024.0 * 1024.0))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
