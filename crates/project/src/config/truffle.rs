//! Truffle configuration parser

use super::hardhat::capture;
use crate::detector::TRUFFLE_CONFIG_FILES;
use crate::ProjectError;
use std::path::Path;

/// Truffle project layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruffleConfig {
    /// Source directory (default: "contracts")
    pub contracts_directory: String,
    /// Build directory (default: "build")
    pub contracts_build_directory: String,
    /// compilers.solc.version
    pub solc_version: Option<String>,
}

impl Default for TruffleConfig {
    fn default() -> Self {
        Self {
            contracts_directory: "contracts".to_string(),
            contracts_build_directory: "build".to_string(),
            solc_version: None,
        }
    }
}

impl TruffleConfig {
    /// Load Truffle configuration from a project directory
    pub fn load(project_root: &Path) -> Result<Self, ProjectError> {
        let mut config = Self::default();

        if let Some(config_path) = TRUFFLE_CONFIG_FILES
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.exists())
        {
            let content = std::fs::read_to_string(&config_path)?;
            config.parse_config_content(&content);
        }

        tracing::debug!("Loaded Truffle config: {:?}", config);
        Ok(config)
    }

    fn parse_config_content(&mut self, content: &str) {
        if let Some(dir) = capture(r#"contracts_directory:\s*["']([^"']+)["']"#, content) {
            self.contracts_directory = dir;
        }
        if let Some(dir) = capture(r#"contracts_build_directory:\s*["']([^"']+)["']"#, content) {
            self.contracts_build_directory = dir;
        }
        // compilers: { solc: { version: "0.8.19" } }
        self.solc_version = capture(
            r#"solc:\s*\{[^}]*?version:\s*["']([^"']+)["']"#,
            content,
        )
        .or(self.solc_version.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_truffle_config() {
        let temp = TempDir::new().unwrap();
        let config_content = r#"
module.exports = {
  contracts_directory: "./solidity",
  contracts_build_directory: "./abis",
  networks: {
    development: { host: "127.0.0.1", port: 8545, network_id: "*" },
  },
  compilers: {
    solc: {
      version: "0.8.21",
      settings: { optimizer: { enabled: false } },
    },
  },
};
"#;
        std::fs::write(temp.path().join("truffle-config.js"), config_content).unwrap();

        let config = TruffleConfig::load(temp.path()).unwrap();
        assert_eq!(config.contracts_directory, "./solidity");
        assert_eq!(config.contracts_build_directory, "./abis");
        assert_eq!(config.solc_version, Some("0.8.21".to_string()));
    }

    #[test]
    fn test_defaults_without_overrides() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("truffle.js"), "module.exports = {};").unwrap();

        let config = TruffleConfig::load(temp.path()).unwrap();
        assert_eq!(config, TruffleConfig::default());
    }
}
