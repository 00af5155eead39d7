//! Framework configuration parsing

pub mod foundry;
pub mod hardhat;
pub mod truffle;

pub use foundry::FoundryConfig;
pub use hardhat::HardhatConfig;
pub use truffle::TruffleConfig;

use crate::detector::Framework;
use crate::ProjectError;
use std::path::Path;

/// Unified project configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectConfig {
    Foundry(FoundryConfig),
    Hardhat(HardhatConfig),
    Truffle(TruffleConfig),
    Plain,
    Unknown,
}

impl ProjectConfig {
    /// Read the configuration for `framework` from `root`
    pub fn load(framework: Framework, root: &Path) -> Result<Self, ProjectError> {
        Ok(match framework {
            Framework::Foundry => ProjectConfig::Foundry(FoundryConfig::load(root)?),
            Framework::Hardhat => ProjectConfig::Hardhat(HardhatConfig::load(root)?),
            Framework::Truffle => ProjectConfig::Truffle(TruffleConfig::load(root)?),
            Framework::Plain => ProjectConfig::Plain,
            Framework::Unknown => ProjectConfig::Unknown,
        })
    }

    /// Defaults for `framework`, used when its config cannot be read
    pub fn defaults(framework: Framework) -> Self {
        match framework {
            Framework::Foundry => ProjectConfig::Foundry(FoundryConfig::default()),
            Framework::Hardhat => ProjectConfig::Hardhat(HardhatConfig::default()),
            Framework::Truffle => ProjectConfig::Truffle(TruffleConfig::default()),
            Framework::Plain => ProjectConfig::Plain,
            Framework::Unknown => ProjectConfig::Unknown,
        }
    }

    /// Configured source directory relative to the project root. `None`
    /// means the root itself, or for unknown layouts a probe of `src` then
    /// `contracts`.
    pub fn source_dir(&self) -> Option<&str> {
        match self {
            ProjectConfig::Foundry(config) => Some(&config.src),
            ProjectConfig::Hardhat(config) => Some(&config.sources),
            ProjectConfig::Truffle(config) => Some(&config.contracts_directory),
            ProjectConfig::Plain | ProjectConfig::Unknown => None,
        }
    }

    /// Output and library directories the framework writes or vendors
    pub fn exclude_dirs(&self) -> Vec<&str> {
        match self {
            ProjectConfig::Foundry(config) => {
                let mut dirs = vec![config.out.as_str()];
                dirs.extend(config.libs.iter().map(|s| s.as_str()));
                dirs
            }
            ProjectConfig::Hardhat(config) => {
                vec![config.artifacts.as_str(), config.cache.as_str()]
            }
            ProjectConfig::Truffle(config) => vec![config.contracts_build_directory.as_str()],
            ProjectConfig::Plain | ProjectConfig::Unknown => vec![],
        }
    }

    /// Compiler version pinned by the config
    pub fn solc_version(&self) -> Option<&str> {
        match self {
            ProjectConfig::Foundry(config) => config.solc_version.as_deref(),
            ProjectConfig::Hardhat(config) => config.solidity_version.as_deref(),
            ProjectConfig::Truffle(config) => config.solc_version.as_deref(),
            ProjectConfig::Plain | ProjectConfig::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclude_dirs() {
        let foundry = ProjectConfig::defaults(Framework::Foundry);
        assert_eq!(foundry.exclude_dirs(), vec!["out", "lib"]);

        let hardhat = ProjectConfig::defaults(Framework::Hardhat);
        assert_eq!(hardhat.exclude_dirs(), vec!["artifacts", "cache"]);

        assert!(ProjectConfig::Plain.exclude_dirs().is_empty());
    }

    #[test]
    fn test_source_dir() {
        assert_eq!(ProjectConfig::defaults(Framework::Foundry).source_dir(), Some("src"));
        assert_eq!(
            ProjectConfig::defaults(Framework::Truffle).source_dir(),
            Some("contracts")
        );
        assert_eq!(ProjectConfig::Unknown.source_dir(), None);
    }
}
