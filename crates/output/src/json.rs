use crate::report::{ContractView, ProjectView, Report};
use ast::{ContractKind, Diagnostic, DiagnosticKind, StateMutability, Visibility};
use chrono::{DateTime, Utc};
use project::Framework;
use serde::Serialize;
use signatures::{Origin, SignatureKind, SignatureRecord};
use std::path::Path;

/// JSON output formatter for signature reports
#[derive(Debug)]
pub struct JsonFormatter {
    include_metadata: bool,
    include_statistics: bool,
    pretty_print: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter with default settings
    pub fn new() -> Self {
        Self {
            include_metadata: true,
            include_statistics: true,
            pretty_print: true,
        }
    }

    /// Configure whether to include metadata in output
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Configure whether to include statistics in output
    pub fn with_statistics(mut self, include: bool) -> Self {
        self.include_statistics = include;
        self
    }

    /// Configure whether to pretty print the JSON
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Format a report as a JSON string
    pub fn format(&self, report: &Report<'_>) -> Result<String, JsonError> {
        let output = self.create_output(report);

        if self.pretty_print {
            serde_json::to_string_pretty(&output).map_err(JsonError::SerializationError)
        } else {
            serde_json::to_string(&output).map_err(JsonError::SerializationError)
        }
    }

    fn create_output<'a>(&self, report: &'a Report<'a>) -> JsonOutput<'a> {
        JsonOutput {
            version: "1.0.0",
            metadata: self.include_metadata.then(|| self.create_metadata(report)),
            statistics: self.include_statistics.then(|| self.create_statistics(report)),
            projects: report.projects.iter().map(convert_project).collect(),
            diagnostics: report.diagnostics().collect(),
        }
    }

    fn create_metadata<'a>(&self, report: &'a Report<'a>) -> JsonMetadata<'a> {
        JsonMetadata {
            tool_name: "sigscan",
            tool_version: env!("CARGO_PKG_VERSION"),
            generated_at: Utc::now(),
            root: report.root,
        }
    }

    fn create_statistics(&self, report: &Report<'_>) -> JsonStatistics {
        let mut stats = JsonStatistics {
            projects: report.projects.len(),
            files_scanned: report.files_scanned(),
            contracts: report.total_contracts(),
            ..JsonStatistics::default()
        };

        for project in &report.projects {
            stats.external_functions += project.result.external_functions;
            stats.internal_functions += project.result.internal_functions;
            stats.events += project.result.events;
            stats.errors += project.result.errors;
        }
        stats.records_exported = report.records().count();

        for diagnostic in report.diagnostics() {
            stats.diagnostics += 1;
            if diagnostic.kind == DiagnosticKind::SelectorCollision {
                stats.collisions += 1;
            }
        }
        stats
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_project<'a>(project: &'a ProjectView<'a>) -> JsonProject<'a> {
    let info = &project.result.project;
    JsonProject {
        root: &info.root,
        framework: info.framework,
        source_root: &info.source_root,
        solc_version: info.solc_version.as_deref(),
        cancelled: project.result.cancelled,
        contracts: project.contracts.iter().map(convert_contract).collect(),
        file_level: project.file_level.iter().map(|r| convert_record(r)).collect(),
    }
}

fn convert_contract<'a>(view: &'a ContractView<'a>) -> JsonContract<'a> {
    JsonContract {
        name: &view.contract.name,
        kind: view.contract.kind,
        file: &view.contract.file,
        bases: &view.contract.bases,
        records: view.records.iter().map(|r| convert_record(r)).collect(),
    }
}

fn convert_record(record: &SignatureRecord) -> JsonRecord<'_> {
    JsonRecord {
        kind: record.kind,
        name: &record.name,
        signature: record.signature(),
        selector: record.selector(),
        visibility: record.visibility,
        mutability: record.mutability,
        file: &record.file,
        line: record.line,
        origin: &record.origin,
        anonymous: record.anonymous,
    }
}

/// Main JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMetadata<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<JsonStatistics>,
    pub projects: Vec<JsonProject<'a>>,
    pub diagnostics: Vec<&'a Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct JsonMetadata<'a> {
    pub tool_name: &'static str,
    pub tool_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub root: &'a Path,
}

#[derive(Debug, Default, Serialize)]
pub struct JsonStatistics {
    pub projects: usize,
    pub files_scanned: usize,
    pub contracts: usize,
    pub external_functions: usize,
    pub internal_functions: usize,
    pub events: usize,
    pub errors: usize,
    pub records_exported: usize,
    pub collisions: usize,
    pub diagnostics: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonProject<'a> {
    pub root: &'a Path,
    pub framework: Framework,
    pub source_root: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solc_version: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
    pub contracts: Vec<JsonContract<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_level: Vec<JsonRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonContract<'a> {
    pub name: &'a str,
    pub kind: ContractKind,
    pub file: &'a Path,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub bases: &'a [String],
    pub records: Vec<JsonRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonRecord<'a> {
    pub kind: SignatureKind,
    pub name: &'a str,
    pub signature: &'a str,
    pub selector: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutability: Option<StateMutability>,
    pub file: &'a Path,
    pub line: usize,
    pub origin: &'a Origin,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub anonymous: bool,
}

/// Errors that can occur during JSON formatting
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("Failed to serialize JSON: {0}")]
    SerializationError(#[from] serde_json::Error),
}
