//! Project and sub-project scans

use crate::error::ScanError;
use crate::options::{CancellationToken, ScanOptions};
use crate::result::{ScanResult, SubProjectResult};
use ast::{Diagnostic, DiagnosticKind, SourceUnit};
use parser::{ParseError, Parser};
use project::{discover_sub_projects, ProjectInfo};
use rayon::prelude::*;
use signatures::SignatureEngine;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// What one file contributed to a scan
enum FileOutcome {
    Parsed(SourceUnit),
    Failed(Diagnostic),
    Skipped,
}

/// Per-file outcomes reduced into one batch
#[derive(Default)]
struct ParsedBatch {
    units: Vec<SourceUnit>,
    diagnostics: Vec<Diagnostic>,
    files_scanned: usize,
    cancelled: bool,
}

impl ParsedBatch {
    fn push(mut self, outcome: FileOutcome) -> Self {
        match outcome {
            FileOutcome::Parsed(unit) => {
                self.files_scanned += 1;
                self.units.push(unit);
            }
            FileOutcome::Failed(diagnostic) => {
                self.files_scanned += 1;
                self.diagnostics.push(diagnostic);
            }
            FileOutcome::Skipped => self.cancelled = true,
        }
        self
    }
}

/// Scans projects with a fixed set of options and one cancellation token
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Share an existing cancellation token with this scanner
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan the project rooted at `root`. Fails only when `root` is not a
    /// directory, or on cancellation when partial results are not wanted.
    pub fn scan_project(&self, root: impl AsRef<Path>) -> Result<ScanResult, ScanError> {
        let root = check_root(root.as_ref())?;
        let start = Instant::now();

        let result = self.scan_resolved(&root)?;
        info!(
            "Scanned {} ({}): {} contracts in {} files in {:.2?}",
            root.display(),
            result.project.framework,
            result.total_contracts,
            result.files_scanned,
            start.elapsed()
        );
        Ok(result)
    }

    /// Discover every sub-project under `root`, scan each one and combine
    /// the results
    pub fn scan_all_sub_projects(
        &self,
        root: impl AsRef<Path>,
    ) -> Result<SubProjectResult, ScanError> {
        let root = check_root(root.as_ref())?;
        let start = Instant::now();

        let roots = discover_sub_projects(&root);
        info!("Found {} sub-project(s) under {}", roots.len(), root.display());

        let sub_projects: Vec<ScanResult> = if self.options.parallel {
            roots
                .par_iter()
                .map(|dir| self.scan_resolved(dir))
                .collect::<Result<_, _>>()?
        } else {
            roots
                .iter()
                .map(|dir| self.scan_resolved(dir))
                .collect::<Result<_, _>>()?
        };

        let (combined_info, _) = ProjectInfo::resolve(&root);
        let result = SubProjectResult::combine(root, combined_info, sub_projects);
        info!(
            "Scanned {} sub-project(s): {} contracts in {} files in {:.2?}",
            result.sub_projects.len(),
            result.combined.total_contracts,
            result.combined.files_scanned,
            start.elapsed()
        );
        Ok(result)
    }

    fn scan_resolved(&self, root: &Path) -> Result<ScanResult, ScanError> {
        let (info, mut diagnostics) = ProjectInfo::resolve(root);
        let files = info.solidity_files();
        debug!(
            "{}: {} as {}, {} Solidity files",
            root.display(),
            info.framework,
            info.source_root.display(),
            files.len()
        );

        let batch = self.parse_files(&files);
        if batch.cancelled {
            if !self.options.partial_on_cancel {
                return Err(ScanError::Cancelled);
            }
            warn!(
                "Scan of {} cancelled after {} of {} files",
                root.display(),
                batch.files_scanned,
                files.len()
            );
        }

        diagnostics.extend(batch.diagnostics);
        for unit in &batch.units {
            diagnostics.extend(unit.diagnostics.iter().cloned());
        }

        let output = SignatureEngine::new(&batch.units).run();
        Ok(ScanResult::from_engine(
            info,
            output,
            batch.files_scanned,
            diagnostics,
            batch.cancelled,
        ))
    }

    fn parse_files(&self, files: &[PathBuf]) -> ParsedBatch {
        let parser = match self.options.max_file_size {
            Some(limit) => Parser::new().with_max_file_size(limit),
            None => Parser::new(),
        };

        let outcomes: Vec<FileOutcome> = if self.options.parallel {
            files
                .par_iter()
                .map(|file| self.parse_one(&parser, file))
                .collect()
        } else {
            files.iter().map(|file| self.parse_one(&parser, file)).collect()
        };

        outcomes.into_iter().fold(ParsedBatch::default(), ParsedBatch::push)
    }

    fn parse_one(&self, parser: &Parser, file: &Path) -> FileOutcome {
        if self.cancel.is_cancelled() {
            return FileOutcome::Skipped;
        }

        match parser.parse_file(file) {
            Ok(unit) => {
                debug!("Parsed {}: {} contracts", file.display(), unit.contracts.len());
                FileOutcome::Parsed(unit)
            }
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                FileOutcome::Failed(file_diagnostic(&e))
            }
        }
    }
}

fn file_diagnostic(error: &ParseError) -> Diagnostic {
    let kind = if error.is_unparseable() {
        DiagnosticKind::UnparseableFile
    } else {
        DiagnosticKind::UnreadableFile
    };
    let diagnostic = Diagnostic::new(kind, error.to_string()).in_file(error.file());
    match error.line() {
        Some(line) => diagnostic.at_line(line),
        None => diagnostic,
    }
}

fn check_root(root: &Path) -> Result<PathBuf, ScanError> {
    if root.is_dir() {
        Ok(root.to_path_buf())
    } else {
        Err(ScanError::InvalidRoot(root.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Token.sol");
        std::fs::write(&file, "contract Token {}").unwrap();

        let scanner = Scanner::default();
        assert_eq!(
            scanner.scan_project(&file).unwrap_err(),
            ScanError::InvalidRoot(file.clone())
        );
        assert!(matches!(
            scanner.scan_all_sub_projects(temp.path().join("missing")),
            Err(ScanError::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_unparseable_file_is_a_diagnostic() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("Good.sol"), "contract Good { function f() external {} }")
            .unwrap();
        std::fs::write(temp.path().join("Bad.sol"), "contract Bad { /* never closed").unwrap();

        let result = Scanner::default().scan_project(temp.path()).unwrap();
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.total_contracts, 1);
        let diagnostic = result
            .diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::UnparseableFile)
            .unwrap();
        assert_eq!(diagnostic.file.as_deref(), Some(temp.path().join("Bad.sol").as_path()));
        assert_eq!(diagnostic.line, Some(1));
    }

    #[test]
    fn test_oversized_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("Big.sol"), "contract Big {}".repeat(10)).unwrap();

        let options = ScanOptions {
            max_file_size: Some(16),
            ..ScanOptions::default()
        };
        let result = Scanner::new(options).scan_project(temp.path()).unwrap();
        assert_eq!(result.total_contracts, 0);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnreadableFile);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let temp = TempDir::new().unwrap();
        for i in 0..8 {
            std::fs::write(
                temp.path().join(format!("C{}.sol", i)),
                format!("contract C{i} {{ function f{i}(uint256 x) external {{}} }}"),
            )
            .unwrap();
        }

        let parallel = Scanner::default().scan_project(temp.path()).unwrap();
        let sequential = Scanner::new(ScanOptions {
            parallel: false,
            ..ScanOptions::default()
        })
        .scan_project(temp.path())
        .unwrap();
        assert_eq!(parallel, sequential);
    }
}
