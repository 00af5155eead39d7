//! Hardhat configuration parser
//!
//! Uses regex-based parsing for JavaScript/TypeScript config files.

use crate::detector::HARDHAT_CONFIG_FILES;
use crate::ProjectError;
use regex::Regex;
use std::path::Path;

/// Hardhat project layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardhatConfig {
    /// Source directory (default: "contracts")
    pub sources: String,
    /// Artifacts directory (default: "artifacts")
    pub artifacts: String,
    /// Cache directory (default: "cache")
    pub cache: String,
    /// Solidity compiler version
    pub solidity_version: Option<String>,
}

impl Default for HardhatConfig {
    fn default() -> Self {
        Self {
            sources: "contracts".to_string(),
            artifacts: "artifacts".to_string(),
            cache: "cache".to_string(),
            solidity_version: None,
        }
    }
}

impl HardhatConfig {
    /// Load Hardhat configuration from a project directory
    pub fn load(project_root: &Path) -> Result<Self, ProjectError> {
        let mut config = Self::default();

        if let Some(config_path) = HARDHAT_CONFIG_FILES
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.exists())
        {
            let content = std::fs::read_to_string(&config_path)?;
            config.parse_config_content(&content);
        }

        tracing::debug!("Loaded Hardhat config: {:?}", config);
        Ok(config)
    }

    /// Parse configuration from file content using regex
    fn parse_config_content(&mut self, content: &str) {
        // solidity: "0.8.20" or solidity: { version: "0.8.20" } or compilers: [{ version: ... }]
        let version_patterns = [
            r#"solidity:\s*["']([0-9]+\.[0-9]+\.[0-9]+)["']"#,
            r#"solidity:\s*\{\s*version:\s*["']([0-9]+\.[0-9]+\.[0-9]+)["']"#,
            r#"version:\s*["']([0-9]+\.[0-9]+\.[0-9]+)["']"#,
        ];
        self.solidity_version = version_patterns
            .iter()
            .find_map(|pattern| capture(pattern, content))
            .or(self.solidity_version.take());

        // paths: { sources: "contracts", artifacts: "artifacts", cache: "cache" }
        if let Some(sources) = capture(r#"sources:\s*["']([^"']+)["']"#, content) {
            self.sources = sources;
        }
        if let Some(artifacts) = capture(r#"artifacts:\s*["']([^"']+)["']"#, content) {
            self.artifacts = artifacts;
        }
        if let Some(cache) = capture(r#"cache:\s*["']([^"']+)["']"#, content) {
            self.cache = cache;
        }
    }
}

/// First capture group of `pattern` in `content`
pub(crate) fn capture(pattern: &str, content: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config_content = r#"
module.exports = {
    solidity: "0.8.20",
};
"#;
        std::fs::write(temp.path().join("hardhat.config.js"), config_content).unwrap();

        let config = HardhatConfig::load(temp.path()).unwrap();
        assert_eq!(config.sources, "contracts");
        assert_eq!(config.solidity_version, Some("0.8.20".to_string()));
    }

    #[test]
    fn test_load_typescript_config() {
        let temp = TempDir::new().unwrap();
        let config_content = r#"
import { HardhatUserConfig } from "hardhat/config";

const config: HardhatUserConfig = {
    solidity: {
        version: "0.8.19",
        settings: {
            optimizer: {
                enabled: true,
                runs: 200,
            },
        },
    },
    paths: {
        sources: "./src",
        tests: "./tests",
        artifacts: "./build",
    },
};

export default config;
"#;
        std::fs::write(temp.path().join("hardhat.config.ts"), config_content).unwrap();

        let config = HardhatConfig::load(temp.path()).unwrap();
        assert_eq!(config.sources, "./src");
        assert_eq!(config.artifacts, "./build");
        assert_eq!(config.cache, "cache");
        assert_eq!(config.solidity_version, Some("0.8.19".to_string()));
    }

    #[test]
    fn test_parse_solidity_version() {
        let mut config = HardhatConfig::default();

        config.parse_config_content(r#"solidity: "0.8.20""#);
        assert_eq!(config.solidity_version, Some("0.8.20".to_string()));

        config.solidity_version = None;
        config.parse_config_content(r#"solidity: { version: "0.8.19" }"#);
        assert_eq!(config.solidity_version, Some("0.8.19".to_string()));
    }

    #[test]
    fn test_no_config_file() {
        let temp = TempDir::new().unwrap();

        let config = HardhatConfig::load(temp.path()).unwrap();
        assert_eq!(config, HardhatConfig::default());
    }
}
