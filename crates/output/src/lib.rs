//! Export of scan results as JSON, text or CSV
//!
//! The scanner always produces complete records. [`ExportOptions`] decides
//! which of them reach the output, and [`Exporter`] renders the filtered
//! [`Report`] in each requested format.

pub mod console;
pub mod csv;
pub mod json;
pub mod report;

pub use self::console::{ColorMode, ConsoleFormatter};
pub use csv::CsvFormatter;
pub use json::{JsonError, JsonFormatter};
pub use report::{ContractView, ProjectView, Report};

use scanner::{ScanResult, SubProjectResult};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Text,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
            ExportFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" | "console" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

/// What to export and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub formats: Vec<ExportFormat>,
    /// Write `signatures.<ext>` here; print to stdout when `None`
    pub output_dir: Option<PathBuf>,
    pub include_internal: bool,
    pub include_private: bool,
    pub include_events: bool,
    pub include_errors: bool,
    pub pretty: bool,
    pub color: ColorMode,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            formats: vec![ExportFormat::Text],
            output_dir: None,
            include_internal: false,
            include_private: false,
            include_events: true,
            include_errors: true,
            pretty: true,
            color: ColorMode::Auto,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Json(#[from] JsonError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}

/// Renders and writes reports according to [`ExportOptions`]
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export a single project scan. Returns the files written.
    pub fn export_scan(&self, result: &ScanResult) -> Result<Vec<PathBuf>, ExportError> {
        self.export(&Report::from_scan(result, &self.options))
    }

    /// Export every sub-project of a multi-project scan
    pub fn export_sub_projects(
        &self,
        result: &SubProjectResult,
    ) -> Result<Vec<PathBuf>, ExportError> {
        self.export(&Report::from_sub_projects(result, &self.options))
    }

    /// Render `report` in `format`
    pub fn render(&self, report: &Report<'_>, format: ExportFormat) -> Result<String, ExportError> {
        Ok(match format {
            ExportFormat::Json => JsonFormatter::new()
                .with_pretty_print(self.options.pretty)
                .format(report)?,
            ExportFormat::Text => {
                // files never carry escape codes
                let color = match self.options.output_dir {
                    Some(_) => ColorMode::Never,
                    None => self.options.color,
                };
                ConsoleFormatter::new(color).format(report)
            }
            ExportFormat::Csv => CsvFormatter::new().format(report),
        })
    }

    fn export(&self, report: &Report<'_>) -> Result<Vec<PathBuf>, ExportError> {
        let mut written = Vec::new();

        for &format in &self.options.formats {
            let rendered = self.render(report, format)?;
            match &self.options.output_dir {
                Some(dir) => {
                    let path = write_output(dir, format, &rendered)?;
                    tracing::info!("Wrote {} output to {}", format, path.display());
                    written.push(path);
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{}", rendered).map_err(ExportError::Stdout)?;
                }
            }
        }

        Ok(written)
    }
}

fn write_output(dir: &Path, format: ExportFormat, content: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("signatures.{}", format.extension()));
    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&path, content))
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
