//! Declaration model for Solidity source units
//!
//! The parser fills these types from raw source text; the signature engine
//! resolves the [`TypeRef`]s they carry into ABI-canonical types.

pub mod diagnostics;
pub mod location;
pub mod nodes;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSeverity};
pub use location::Position;
pub use nodes::{
    ArrayLength, ConstantDecl, ContractKind, ContractUnit, ElementaryType, EnumDecl, ErrorDecl,
    EventDecl, FunctionDecl, Parameter, SourceUnit, SpecialFunction, StateMutability,
    StateVariableGetter, StructDecl, StructField, TypeRef, UserTypeDecl, Visibility,
};
