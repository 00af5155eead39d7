//! Structured diagnostics for recovered parse and resolution problems
//!
//! Nothing below the scan root aborts a scan. Per-file and per-declaration
//! failures become a [`Diagnostic`] attached to the result instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Unterminated comment or string literal; whole file skipped
    UnparseableFile,
    /// The file could not be read
    UnreadableFile,
    /// Unbalanced delimiters or an unexpected keyword sequence in one construct
    MalformedDeclaration,
    /// Mapping or internal function type in an externally visible parameter list
    InvalidParameterType,
    /// A struct, enum or contract name that is not in scope
    UnresolvableType,
    /// Two different signatures share a 4-byte selector
    SelectorCollision,
    /// A function declared without a visibility keyword
    ImplicitVisibility,
    /// Repeated visibility or mutability keywords on one function
    DuplicateModifier,
    /// An inherited base contract not found in the project
    UnknownBase,
    /// A framework config that could not be read; defaults were used
    ConfigFallback,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::UnparseableFile => "unparseable-file",
            DiagnosticKind::UnreadableFile => "unreadable-file",
            DiagnosticKind::MalformedDeclaration => "malformed-declaration",
            DiagnosticKind::InvalidParameterType => "invalid-parameter-type",
            DiagnosticKind::UnresolvableType => "unresolvable-type",
            DiagnosticKind::SelectorCollision => "selector-collision",
            DiagnosticKind::ImplicitVisibility => "implicit-visibility",
            DiagnosticKind::DuplicateModifier => "duplicate-modifier",
            DiagnosticKind::UnknownBase => "unknown-base",
            DiagnosticKind::ConfigFallback => "config-fallback",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "info"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            file: None,
            line: None,
        }
    }

    pub fn in_file(mut self, file: impl AsRef<Path>) -> Self {
        self.file = Some(file.as_ref().to_path_buf());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_severity(mut self, severity: DiagnosticSeverity) -> Self {
        self.severity = severity;
        self
    }
}

impl DiagnosticKind {
    fn default_severity(&self) -> DiagnosticSeverity {
        match self {
            DiagnosticKind::UnparseableFile
            | DiagnosticKind::UnreadableFile
            | DiagnosticKind::InvalidParameterType
            | DiagnosticKind::UnresolvableType => DiagnosticSeverity::Error,
            DiagnosticKind::MalformedDeclaration
            | DiagnosticKind::SelectorCollision
            | DiagnosticKind::DuplicateModifier
            | DiagnosticKind::ConfigFallback => DiagnosticSeverity::Warning,
            DiagnosticKind::ImplicitVisibility | DiagnosticKind::UnknownBase => {
                DiagnosticSeverity::Info
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}: ", file.display(), line)?,
            (Some(file), None) => write!(f, "{}: ", file.display())?,
            _ => {}
        }
        write!(f, "{} [{}]: {}", self.severity, self.kind, self.message)
    }
}
