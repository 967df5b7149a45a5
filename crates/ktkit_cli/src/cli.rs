//! `kt` command line: argument definitions and per-command handlers.
//!
//! Library crates do the work; this module only maps flags onto their options
//! and prints results.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use ktkit_io_fs::{
    EnumDigestPatternMode, N_SIZE_CHUNK_DEFAULT, ReportDigest, SpecDigestOptions, SpecFileDigest,
    digest_file, digest_tree, format_size_mib,
};
use ktkit_io_github::{
    C_PATH_FORMAT_DEFAULT, GithubContentsClient, SpecUploadOptions, UploadError, upload_path,
};
use ktkit_io_xlsx::{JsonSchemaSource, SpecLayoutOptions, export_schema_to_path};

use crate::progress::TextGauge;

/// Small file utilities: hashing, schema export, GitHub upload.
#[derive(Debug, Parser)]
#[command(name = "kt", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print MD5 and SHA-1 of a file (or of every file under a directory)
    Check {
        /// File or directory path
        #[arg(short, long, default_value = "./demo")]
        path: PathBuf,
        /// Bytes read per block
        #[arg(long, default_value_t = N_SIZE_CHUNK_DEFAULT)]
        step: usize,
        /// Only hash files whose name matches (directories only)
        #[arg(long)]
        include: Vec<String>,
        /// Skip files whose name matches (directories only)
        #[arg(long)]
        exclude: Vec<String>,
        /// How include/exclude patterns are interpreted
        #[arg(long, value_enum, default_value_t = PatternMode::Glob)]
        mode: PatternMode,
    },
    /// Export a schema dump to `<schema>.xlsx` (index + detail sheets)
    Db2excel {
        /// JSON schema dump
        #[arg(short, long)]
        input: PathBuf,
        /// Output file stem; defaults to the dump's schema name
        #[arg(short, long)]
        schema: Option<String>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Blank rows after each detail block
        #[arg(long, default_value_t = 0)]
        spacer: u32,
    },
    /// Upload a file or directory to a GitHub repository
    U2g {
        /// File or directory path
        #[arg(short, long, default_value = "./u2g")]
        path: PathBuf,
        /// Remote directory datetime format (strftime)
        #[arg(short, long, default_value = C_PATH_FORMAT_DEFAULT)]
        format: String,
        /// Commit author email
        #[arg(short, long)]
        email: Option<String>,
        /// Commit message
        #[arg(short, long)]
        commit: Option<String>,
        /// Repository owner
        #[arg(short, long)]
        owner: Option<String>,
        /// Repository name
        #[arg(short, long)]
        repo: Option<String>,
        /// Target branch
        #[arg(short, long)]
        branch: Option<String>,
        /// Personal access token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternMode {
    Glob,
    Regex,
    Literal,
}

impl From<PatternMode> for EnumDigestPatternMode {
    fn from(mode: PatternMode) -> Self {
        match mode {
            PatternMode::Glob => Self::Glob,
            PatternMode::Regex => Self::Regex,
            PatternMode::Literal => Self::Literal,
        }
    }
}

/// Dispatch one parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check {
            path,
            step,
            include,
            exclude,
            mode,
        } => {
            let options = SpecDigestOptions {
                size_chunk: step,
                patterns_include_files: (!include.is_empty()).then_some(include),
                patterns_exclude_files: (!exclude.is_empty()).then_some(exclude),
                rule_pattern: mode.into(),
                ..Default::default()
            };
            run_check(&path, options)
        }
        Commands::Db2excel {
            input,
            schema,
            out_dir,
            spacer,
        } => run_db2excel(&input, schema.as_deref(), &out_dir, spacer),
        Commands::U2g {
            path,
            format,
            email,
            commit,
            owner,
            repo,
            branch,
            token,
        } => {
            let defaults = SpecUploadOptions::default();
            let options = SpecUploadOptions {
                owner: owner.unwrap_or(defaults.owner),
                repo: repo.unwrap_or(defaults.repo),
                branch: branch.unwrap_or(defaults.branch),
                commit_message: commit.unwrap_or(defaults.commit_message),
                email: email.unwrap_or(defaults.email),
                path_format: format,
                ..defaults
            };
            run_u2g(&path, token, options).await
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region Check

fn run_check(path: &Path, options: SpecDigestOptions) -> Result<()> {
    if path.is_dir() {
        let report = digest_tree(path, options)?;
        print_report(&report);
        if report.error_count() > 0 {
            bail!("{} file(s) could not be hashed", report.error_count());
        }
        return Ok(());
    }

    let mut gauge = TextGauge::stderr();
    let res = digest_file(path, &options, |p| gauge.render(p));
    gauge.finish();
    let digest = res?;
    print_file_digest(&digest, options.size_chunk);
    Ok(())
}

fn print_file_digest(digest: &SpecFileDigest, size_chunk: usize) {
    println!(
        "read file size: {}(step by {size_chunk})",
        format_size_mib(digest.n_bytes)
    );
    println!("[ md5]: {}", digest.md5);
    println!("[sha1]: {}", digest.sha1);
}

fn print_report(report: &ReportDigest) {
    for digest in &report.files {
        println!("{}", digest.path.display());
        println!("[ md5]: {}", digest.md5);
        println!("[sha1]: {}", digest.sha1);
    }
    for err in &report.errors {
        eprintln!("error: {}: {}", err.path.display(), err.exception);
    }
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    println!("{report}");
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Db2excel

fn run_db2excel(input: &Path, schema: Option<&str>, out_dir: &Path, spacer: u32) -> Result<()> {
    let mut source = JsonSchemaSource::from_path(input)
        .with_context(|| format!("failed to load schema dump {}", input.display()))?;
    let path_file_out = derive_output_path(out_dir, schema.or(source.schema_name()));

    let options = SpecLayoutOptions {
        n_rows_spacer_after_table: spacer,
        ..Default::default()
    };
    let report = export_schema_to_path(&mut source, options, &path_file_out)
        .with_context(|| format!("failed to export {}", path_file_out.display()))?;
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    println!(
        "exported {} table(s), {} field(s) to {}",
        report.tables.len(),
        report.n_fields_total(),
        path_file_out.display()
    );
    Ok(())
}

/// `<out_dir>/<schema>.xlsx`, keeping only the last component of `schema`.
fn derive_output_path(out_dir: &Path, schema: Option<&str>) -> PathBuf {
    let c_stem = schema
        .and_then(|c| Path::new(c).file_name())
        .and_then(|c| c.to_str())
        .unwrap_or("schema");
    out_dir.join(format!("{c_stem}.xlsx"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region U2g

async fn run_u2g(path: &Path, token: Option<String>, options: SpecUploadOptions) -> Result<()> {
    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or(UploadError::MissingToken)?;
    let client = GithubContentsClient::with_api_base(token, options.api_base.clone())?;

    let l_uploaded = upload_path(&client, path, &options).await?;
    for uploaded in &l_uploaded {
        println!("{}", uploaded.url_raw);
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
