//! Foundry configuration parser
//!
//! Reads the layout keys of `[profile.default]` in foundry.toml.

use crate::ProjectError;
use serde::Deserialize;
use std::path::Path;

/// Foundry project layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundryConfig {
    /// Source directory (default: "src")
    pub src: String,
    /// Output directory (default: "out")
    pub out: String,
    /// Library directories (default: ["lib"])
    pub libs: Vec<String>,
    /// Solidity compiler version pin
    pub solc_version: Option<String>,
}

impl Default for FoundryConfig {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            out: "out".to_string(),
            libs: vec!["lib".to_string()],
            solc_version: None,
        }
    }
}

/// Raw TOML structure for foundry.toml
#[derive(Debug, Deserialize)]
struct FoundryToml {
    profile: Option<ProfileSection>,
}

#[derive(Debug, Deserialize)]
struct ProfileSection {
    default: Option<ProfileConfig>,
}

#[derive(Debug, Deserialize)]
struct ProfileConfig {
    src: Option<String>,
    out: Option<String>,
    libs: Option<Vec<String>>,
    solc_version: Option<String>,
    solc: Option<String>,
}

impl FoundryConfig {
    /// Load Foundry configuration from a project directory
    pub fn load(project_root: &Path) -> Result<Self, ProjectError> {
        let config_path = project_root.join("foundry.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::parse(&content).map_err(|message| ProjectError::ConfigParse {
            path: config_path.clone(),
            message,
        })?;

        tracing::debug!("Loaded Foundry config: {:?}", config);
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, String> {
        let toml: FoundryToml = toml::from_str(content).map_err(|e| e.to_string())?;
        let mut config = Self::default();

        if let Some(default) = toml.profile.and_then(|p| p.default) {
            if let Some(src) = default.src {
                config.src = src;
            }
            if let Some(out) = default.out {
                config.out = out;
            }
            if let Some(libs) = default.libs {
                config.libs = libs;
            }
            // solc_version takes precedence over solc
            config.solc_version = default.solc_version.or(default.solc);
        }

        Ok(config)
    }
}
