/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Scan completed, no selector collisions
    Success = 0,
    /// Scan completed with at least one selector collision
    CollisionsFound = 1,
    /// The scan itself failed (bad root, cancelled, export failure)
    ScanError = 2,
    /// Invalid configuration file or arguments
    ConfigError = 3,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn as_code(&self) -> i32 {
        *self as i32
    }

    /// Exit the process with this code
    pub fn exit(&self) -> ! {
        std::process::exit(self.as_code())
    }

    /// Code for a finished scan
    pub fn for_scan(has_collisions: bool, fail_on_collision: bool) -> Self {
        if has_collisions && fail_on_collision {
            ExitCode::CollisionsFound
        } else {
            ExitCode::Success
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(ExitCode::CollisionsFound.as_code(), 1);
        assert_eq!(ExitCode::ScanError.as_code(), 2);
        assert_eq!(ExitCode::ConfigError.as_code(), 3);
    }

    #[test]
    fn test_for_scan() {
        assert_eq!(ExitCode::for_scan(false, true), ExitCode::Success);
        assert_eq!(ExitCode::for_scan(true, true), ExitCode::CollisionsFound);
        assert_eq!(ExitCode::for_scan(true, false), ExitCode::Success);
    }
}
