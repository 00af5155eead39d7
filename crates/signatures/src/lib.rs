//! Canonical ABI signatures and selectors for parsed Solidity declarations
//!
//! [`SignatureEngine`] takes the [`ast::SourceUnit`]s of one project,
//! resolves every parameter type through a project-wide [`TypeIndex`] and
//! emits immutable [`SignatureRecord`]s grouped by contract.

pub mod canonical;
pub mod engine;
pub mod error;
pub mod record;
pub mod scope;
pub mod selector;

pub use canonical::Canonicalizer;
pub use engine::{
    find_collisions, find_file_level_collisions, ContractSignatures, EngineOutput, SignatureEngine,
};
pub use error::{TypeError, TypeResult};
pub use record::{Origin, SignatureKind, SignatureRecord};
pub use scope::{ContractRef, Scope, TypeEntity, TypeIndex};
pub use selector::{canonical_signature, event_topic, function_selector, keccak256, selector_bytes};
