//! `ktkit_io_fs`:
//! streaming file digests for the `check` command.
//!
//! - `digest` : block-wise MD5/SHA-1 hashing and tree traversal
//! - `spec`   : enums/options/errors
//! - `report` : run-time report model
//! - `util`   : shared helper functions

pub mod digest;
pub mod report;
pub mod spec;
mod util;

pub use digest::{digest_file, digest_reader, digest_tree};
pub use report::{ReportDigest, ReportDigestBuilder};
pub use spec::{
    DigestError, EnumDigestPatternMode, N_SIZE_CHUNK_DEFAULT, SpecDigestError, SpecDigestOptions,
    SpecDigestProgress, SpecFileDigest,
};
pub use util::format_size_mib;
