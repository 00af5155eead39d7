use anyhow::{anyhow, Context, Result};
use output::{ColorMode, ExportFormat, ExportOptions};
use scanner::ScanOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names probed in the working directory, in order
pub const CONFIG_FILE_NAMES: &[&str] = &[".sigscan.yml", ".sigscan.yaml"];

/// Main configuration structure for sigscan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigscanConfig {
    /// Scan settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// How projects are scanned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Parse files and sub-projects in parallel
    pub parallel: bool,

    /// Keep partial results when a scan is cancelled
    pub partial_on_cancel: bool,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: u64,

    /// Discover and scan nested sub-projects
    pub sub_projects: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            partial_on_cancel: false,
            max_file_size: scanner::DEFAULT_MAX_FILE_SIZE,
            sub_projects: true,
        }
    }
}

/// What gets exported and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output formats to produce
    pub formats: Vec<ExportFormat>,

    /// Directory for `signatures.<ext>` files (stdout if not set)
    pub output_dir: Option<PathBuf>,

    pub include_internal: bool,
    pub include_private: bool,
    pub include_events: bool,
    pub include_errors: bool,

    /// Pretty-print JSON
    pub pretty: bool,

    /// Enable colors in text output
    pub colors: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: vec![ExportFormat::Text],
            output_dir: None,
            include_internal: false,
            include_private: false,
            include_events: true,
            include_errors: true,
            pretty: true,
            colors: true,
        }
    }
}

impl SigscanConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: SigscanConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Load an explicit config file, or the first default location that
    /// exists. An explicit file that fails to load is an error; a broken
    /// default location is skipped with a warning.
    pub fn load_from_defaults_and_file(config_file: Option<&Path>) -> Result<Self> {
        if let Some(file) = config_file {
            let config = Self::load_from_file(file)?;
            tracing::info!("Loaded configuration from: {}", file.display());
            return Ok(config);
        }

        for path in Self::default_locations() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from: {}", path.display());
                    return Ok(config);
                }
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                }
            }
        }

        Ok(Self::default())
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = CONFIG_FILE_NAMES.iter().map(PathBuf::from).collect();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sigscan").join("config.yml"));
        }
        paths
    }

    /// Create a default configuration file
    pub fn create_default_config_file<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scan.max_file_size == 0 {
            return Err(anyhow!("Max file size must be greater than 0"));
        }

        if self.output.formats.is_empty() {
            return Err(anyhow!("At least one output format is required"));
        }

        if let Some(dir) = &self.output.output_dir {
            if dir.is_file() {
                return Err(anyhow!(
                    "Output directory {} is an existing file",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    pub fn to_scan_options(&self) -> ScanOptions {
        ScanOptions {
            parallel: self.scan.parallel,
            partial_on_cancel: self.scan.partial_on_cancel,
            max_file_size: Some(self.scan.max_file_size),
        }
    }

    pub fn to_export_options(&self) -> ExportOptions {
        ExportOptions {
            formats: self.output.formats.clone(),
            output_dir: self.output.output_dir.clone(),
            include_internal: self.output.include_internal,
            include_private: self.output.include_private,
            include_events: self.output.include_events,
            include_errors: self.output.include_errors,
            pretty: self.output.pretty,
            color: if self.output.colors {
                ColorMode::Auto
            } else {
                ColorMode::Never
            },
        }
    }
}
