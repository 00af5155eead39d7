use ast::DiagnosticKind;
use thiserror::Error;

/// Why a declared type has no ABI-canonical form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("{ty} cannot appear in an ABI signature: {reason}")]
    InvalidParameterType { ty: String, reason: String },

    #[error("unknown type or constant '{name}'")]
    Unresolvable { name: String },

    #[error("struct {name} contains itself")]
    StructCycle { name: String },
}

impl TypeError {
    pub fn invalid(ty: impl ToString, reason: impl Into<String>) -> Self {
        TypeError::InvalidParameterType {
            ty: ty.to_string(),
            reason: reason.into(),
        }
    }

    /// Diagnostic attached when a declaration is dropped for this error
    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            TypeError::InvalidParameterType { .. } | TypeError::StructCycle { .. } => {
                DiagnosticKind::InvalidParameterType
            }
            TypeError::Unresolvable { .. } => DiagnosticKind::UnresolvableType,
        }
    }
}

pub type TypeResult<T> = Result<T, TypeError>;
