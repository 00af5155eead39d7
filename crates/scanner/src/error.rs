use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a scan before it produces a result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("scan root {} does not exist or is not a directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("scan cancelled")]
    Cancelled,
}
