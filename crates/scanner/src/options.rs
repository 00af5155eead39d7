use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Files larger than this are reported and skipped
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Knobs for one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Parse files and sub-projects on the rayon pool
    pub parallel: bool,
    /// On cancellation, return what was parsed so far instead of an error
    pub partial_on_cancel: bool,
    /// Per-file size limit in bytes; `None` disables the check
    pub max_file_size: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            partial_on_cancel: false,
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
        }
    }
}

/// Cooperative cancellation flag, checked before each file is parsed
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
    }
}
