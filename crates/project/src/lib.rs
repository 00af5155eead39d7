//! Project classification and source discovery
//!
//! This crate classifies a directory as a Foundry, Hardhat, Truffle or plain
//! Solidity project, reads the framework layout, and finds the `.sol` files
//! and nested sub-projects under it.

pub mod config;
pub mod detector;
pub mod discovery;

pub use config::{FoundryConfig, HardhatConfig, ProjectConfig, TruffleConfig};
pub use detector::{detect_framework, has_solidity_files, marker_framework, Framework};
pub use discovery::{discover_sub_projects, DiscoveryContext, ProjectDiscovery};

use ast::{Diagnostic, DiagnosticKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory names skipped at any depth
pub const EXCLUDED_NAMES: &[&str] = &["node_modules"];

/// Vendored and build directories, relative to a project root
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "lib",
    "out",
    "cache",
    "artifacts",
    "build",
    "broadcast",
    "dependencies",
    "typechain",
    "typechain-types",
    "coverage",
];

/// Errors that can occur while reading a project
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Project path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Result type for project operations
pub type ProjectResult<T> = Result<T, ProjectError>;

/// A classified project root and the layout its sources follow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub framework: Framework,
    pub root: PathBuf,
    /// Directory the `.sol` files are discovered under
    pub source_root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solc_version: Option<String>,
    /// Framework-specific output and library directories, relative to `root`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_dirs: Vec<String>,
}

impl ProjectInfo {
    /// Classify `path` and read its framework config. A broken config is an
    /// error here; see [`ProjectInfo::resolve`] for the lenient variant.
    pub fn load(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ProjectError::NotADirectory(root));
        }

        let framework = detect_framework(&root);
        let config = ProjectConfig::load(framework, &root)?;
        let (info, _) = Self::from_config(root, framework, &config);
        Ok(info)
    }

    /// Classify `path`, falling back to framework defaults when the config
    /// cannot be read. Fallbacks are reported as diagnostics.
    pub fn resolve(path: impl AsRef<Path>) -> (Self, Vec<Diagnostic>) {
        let root = path.as_ref().to_path_buf();
        let framework = detect_framework(&root);
        let mut diagnostics = Vec::new();

        let config = match ProjectConfig::load(framework, &root) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}; using {} defaults", e, framework);
                let mut diagnostic = Diagnostic::new(
                    DiagnosticKind::ConfigFallback,
                    format!("{}; using {} defaults", e, framework),
                );
                if let ProjectError::ConfigParse { path, .. } = &e {
                    diagnostic = diagnostic.in_file(path);
                }
                diagnostics.push(diagnostic);
                ProjectConfig::defaults(framework)
            }
        };

        let (info, fallback) = Self::from_config(root, framework, &config);
        diagnostics.extend(fallback);
        (info, diagnostics)
    }

    fn from_config(
        root: PathBuf,
        framework: Framework,
        config: &ProjectConfig,
    ) -> (Self, Option<Diagnostic>) {
        let mut fallback = None;

        let source_root = match config.source_dir() {
            Some(dir) => {
                let configured = join_relative(&root, dir);
                if configured.is_dir() {
                    configured
                } else {
                    tracing::warn!(
                        "Source directory {} not found, searching project root",
                        configured.display()
                    );
                    fallback = Some(Diagnostic::new(
                        DiagnosticKind::ConfigFallback,
                        format!(
                            "source directory {} not found; scanning {}",
                            configured.display(),
                            root.display()
                        ),
                    ));
                    root.clone()
                }
            }
            None if framework == Framework::Unknown => ["src", "contracts"]
                .iter()
                .map(|dir| root.join(dir))
                .find(|dir| dir.is_dir())
                .unwrap_or_else(|| root.clone()),
            None => root.clone(),
        };

        let info = Self {
            framework,
            solc_version: config.solc_version().map(str::to_string),
            excluded_dirs: config
                .exclude_dirs()
                .into_iter()
                .map(normalize_relative)
                .filter(|dir| !dir.is_empty())
                .collect(),
            source_root,
            root,
        };

        tracing::debug!(
            "Classified {} as {} (sources in {})",
            info.root.display(),
            info.framework,
            info.source_root.display()
        );
        (info, fallback)
    }

    /// Directories to skip while walking this project, as absolute paths:
    /// the default vendored/build dirs plus the configured ones
    pub fn excluded_paths(&self) -> Vec<PathBuf> {
        let mut paths = default_excluded_paths(&self.root);
        for dir in &self.excluded_dirs {
            let path = self.root.join(dir);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// All `.sol` files of this project, sorted
    pub fn solidity_files(&self) -> Vec<PathBuf> {
        ProjectDiscovery::new(self).discover_solidity_files()
    }
}

/// True for directory names that are skipped wherever they appear
pub fn is_excluded_name(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_NAMES.contains(&name)
}

pub(crate) fn default_excluded_paths(root: &Path) -> Vec<PathBuf> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|dir| root.join(dir)).collect()
}

fn normalize_relative(dir: &str) -> String {
    dir.trim_start_matches("./").trim_end_matches('/').to_string()
}

fn join_relative(root: &Path, dir: &str) -> PathBuf {
    match normalize_relative(dir).as_str() {
        "" | "." => root.to_path_buf(),
        dir => root.join(dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = ProjectInfo::load(temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, ProjectError::NotADirectory(_)));
    }

    #[test]
    fn test_foundry_source_root() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("foundry.toml"),
            "[profile.default]\nsrc = \"./contracts\"\nout = \"forge-out\"\n",
        )
        .unwrap();
        std::fs::create_dir(temp.path().join("contracts")).unwrap();

        let info = ProjectInfo::load(temp.path()).unwrap();
        assert_eq!(info.framework, Framework::Foundry);
        assert_eq!(info.source_root, temp.path().join("contracts"));
        assert_eq!(info.excluded_dirs, vec!["forge-out", "lib"]);
    }

    #[test]
    fn test_missing_source_dir_falls_back_to_root() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("hardhat.config.js"), "module.exports = {}").unwrap();

        let (info, diagnostics) = ProjectInfo::resolve(temp.path());
        assert_eq!(info.framework, Framework::Hardhat);
        assert_eq!(info.source_root, temp.path());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ConfigFallback);
    }

    #[test]
    fn test_broken_config_resolves_with_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("foundry.toml"), "[profile.default\n").unwrap();
        std::fs::create_dir(temp.path().join("src")).unwrap();

        assert!(ProjectInfo::load(temp.path()).is_err());

        let (info, diagnostics) = ProjectInfo::resolve(temp.path());
        assert_eq!(info.source_root, temp.path().join("src"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].file.as_deref(),
            Some(temp.path().join("foundry.toml").as_path())
        );
    }

    #[test]
    fn test_unknown_probes_src_then_contracts() {
        let temp = TempDir::new().unwrap();
        let info = ProjectInfo::load(temp.path()).unwrap();
        assert_eq!(info.framework, Framework::Unknown);
        assert_eq!(info.source_root, temp.path());

        std::fs::create_dir(temp.path().join("contracts")).unwrap();
        let info = ProjectInfo::load(temp.path()).unwrap();
        assert_eq!(info.source_root, temp.path().join("contracts"));

        std::fs::create_dir(temp.path().join("src")).unwrap();
        let info = ProjectInfo::load(temp.path()).unwrap();
        assert_eq!(info.source_root, temp.path().join("src"));
    }

    #[test]
    fn test_is_excluded_name() {
        assert!(is_excluded_name("node_modules"));
        assert!(is_excluded_name(".git"));
        assert!(!is_excluded_name("lib"));
        assert!(!is_excluded_name("build"));
        assert!(!is_excluded_name("contracts"));
    }

    #[test]
    fn test_excluded_paths_are_rooted() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("foundry.toml"),
            "[profile.default]\nout = \"forge-out\"\nlibs = [\"lib\", \"vendor\"]\n",
        )
        .unwrap();

        let info = ProjectInfo::load(temp.path()).unwrap();
        let excluded = info.excluded_paths();

        assert!(excluded.contains(&temp.path().join("lib")));
        assert!(excluded.contains(&temp.path().join("build")));
        assert!(excluded.contains(&temp.path().join("forge-out")));
        assert!(excluded.contains(&temp.path().join("vendor")));
        assert!(!excluded.contains(&temp.path().join("src/lib")));
        assert_eq!(
            excluded.iter().filter(|p| p.ends_with("lib")).count(),
            1
        );
    }
}
