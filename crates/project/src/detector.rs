//! Framework detection for Solidity projects
//!
//! Classifies a directory by the marker files at its root, in a fixed
//! precedence order.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Hardhat config file names, checked in this order
pub const HARDHAT_CONFIG_FILES: &[&str] = &[
    "hardhat.config.ts",
    "hardhat.config.js",
    "hardhat.config.cjs",
    "hardhat.config.mjs",
];

/// Truffle config file names, checked in this order
pub const TRUFFLE_CONFIG_FILES: &[&str] = &["truffle-config.js", "truffle.js"];

/// Supported project layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// Foundry project (foundry.toml)
    Foundry,
    /// Hardhat project (hardhat.config.*)
    Hardhat,
    /// Truffle project (truffle-config.js)
    Truffle,
    /// Solidity files at the root, no framework
    Plain,
    /// Nothing recognisable
    Unknown,
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Framework::Foundry => write!(f, "foundry"),
            Framework::Hardhat => write!(f, "hardhat"),
            Framework::Truffle => write!(f, "truffle"),
            Framework::Plain => write!(f, "plain"),
            Framework::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Framework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "foundry" | "forge" => Ok(Framework::Foundry),
            "hardhat" | "hh" => Ok(Framework::Hardhat),
            "truffle" => Ok(Framework::Truffle),
            "plain" | "none" => Ok(Framework::Plain),
            "unknown" => Ok(Framework::Unknown),
            other => Err(format!("unknown framework '{}'", other)),
        }
    }
}

/// Classify the directory at `path`
pub fn detect_framework(path: &Path) -> Framework {
    if let Some(framework) = marker_framework(path) {
        return framework;
    }

    if has_solidity_files(path) {
        return Framework::Plain;
    }

    Framework::Unknown
}

/// Framework named by a marker file at the root of `path`, if any. Plain
/// directories of `.sol` files carry no marker.
pub fn marker_framework(path: &Path) -> Option<Framework> {
    if path.join("foundry.toml").is_file() {
        return Some(Framework::Foundry);
    }

    if HARDHAT_CONFIG_FILES.iter().any(|f| path.join(f).is_file()) {
        return Some(Framework::Hardhat);
    }

    if TRUFFLE_CONFIG_FILES.iter().any(|f| path.join(f).is_file()) {
        return Some(Framework::Truffle);
    }

    // package.json with a framework dependency
    if let Ok(content) = std::fs::read_to_string(path.join("package.json")) {
        if content.contains("\"hardhat\"") {
            return Some(Framework::Hardhat);
        }
        if content.contains("\"truffle\"") {
            return Some(Framework::Truffle);
        }
    }

    None
}

/// True when `.sol` files sit directly in `path`
pub fn has_solidity_files(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.path().is_file() && e.path().extension().is_some_and(|ext| ext == "sol"))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_foundry() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("foundry.toml"), "[profile.default]").unwrap();

        assert_eq!(detect_framework(temp.path()), Framework::Foundry);
    }

    #[test]
    fn test_detect_hardhat_js() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("hardhat.config.js"), "module.exports = {}").unwrap();

        assert_eq!(detect_framework(temp.path()), Framework::Hardhat);
    }

    #[test]
    fn test_detect_hardhat_mjs() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("hardhat.config.mjs"), "export default {}").unwrap();

        assert_eq!(detect_framework(temp.path()), Framework::Hardhat);
    }

    #[test]
    fn test_detect_truffle() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("truffle-config.js"), "module.exports = {}").unwrap();

        assert_eq!(detect_framework(temp.path()), Framework::Truffle);
    }

    #[test]
    fn test_foundry_wins_over_hardhat() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("hardhat.config.ts"), "export default {}").unwrap();
        std::fs::write(temp.path().join("foundry.toml"), "[profile.default]").unwrap();

        assert_eq!(detect_framework(temp.path()), Framework::Foundry);
    }

    #[test]
    fn test_detect_from_package_json() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{"devDependencies": {"truffle": "^5.11.0"}}"#,
        )
        .unwrap();

        assert_eq!(detect_framework(temp.path()), Framework::Truffle);
    }

    #[test]
    fn test_detect_plain_and_unknown() {
        let temp = TempDir::new().unwrap();
        assert_eq!(detect_framework(temp.path()), Framework::Unknown);

        std::fs::write(temp.path().join("Token.sol"), "contract Token {}").unwrap();
        assert_eq!(detect_framework(temp.path()), Framework::Plain);
        assert_eq!(marker_framework(temp.path()), None);
    }

    #[test]
    fn test_framework_from_str() {
        assert_eq!("foundry".parse::<Framework>(), Ok(Framework::Foundry));
        assert_eq!("Foundry".parse::<Framework>(), Ok(Framework::Foundry));
        assert_eq!("forge".parse::<Framework>(), Ok(Framework::Foundry));
        assert_eq!("hh".parse::<Framework>(), Ok(Framework::Hardhat));
        assert_eq!("truffle".parse::<Framework>(), Ok(Framework::Truffle));
        assert_eq!("plain".parse::<Framework>(), Ok(Framework::Plain));
        assert!("brownie".parse::<Framework>().is_err());
    }
}
