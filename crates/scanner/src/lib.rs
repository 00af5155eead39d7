//! Project scanning
//!
//! A scan classifies a project root, discovers its `.sol` files, parses
//! them on the rayon pool and runs the [`signatures::SignatureEngine`] over
//! the parsed units. Per-file failures are recovered and reported as
//! diagnostics on the [`ScanResult`]; only a bad root, or a cancellation
//! when partial results are not wanted, fails the scan.

pub mod error;
pub mod options;
pub mod result;
pub mod scanner;

pub use error::ScanError;
pub use options::{CancellationToken, ScanOptions, DEFAULT_MAX_FILE_SIZE};
pub use result::{ScanResult, SubProjectResult};
pub use scanner::Scanner;

use std::path::Path;

/// Scan one project with default options
pub fn scan_project(root: impl AsRef<Path>) -> Result<ScanResult, ScanError> {
    Scanner::default().scan_project(root)
}

/// Scan every sub-project under `root` with default options
pub fn scan_all_sub_projects(root: impl AsRef<Path>) -> Result<SubProjectResult, ScanError> {
    Scanner::default().scan_all_sub_projects(root)
}
