use crate::selector::{canonical_signature, event_topic, function_selector};
use ast::{StateMutability, Visibility};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Function,
    Event,
    Error,
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureKind::Function => write!(f, "function"),
            SignatureKind::Event => write!(f, "event"),
            SignatureKind::Error => write!(f, "error"),
        }
    }
}

/// How a record came to be part of a contract's interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "base", rename_all = "lowercase")]
pub enum Origin {
    Declared,
    /// Copied from a base contract that declares it
    Inherited(String),
    /// Compiler-generated accessor of a public state variable
    Getter,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Declared => write!(f, "declared"),
            Origin::Inherited(base) => write!(f, "inherited from {}", base),
            Origin::Getter => write!(f, "getter"),
        }
    }
}

/// One function, event or error with its canonical signature and selector.
///
/// The selector is derived from the signature when the record is built and
/// neither can change afterwards. Only the sub-project provenance may be
/// assigned later. Deserialization recomputes the selector and rejects a
/// record whose stored selector does not match its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecord")]
pub struct SignatureRecord {
    pub name: String,
    signature: String,
    selector: String,
    pub kind: SignatureKind,
    /// `None` for events and errors
    pub visibility: Option<Visibility>,
    /// `None` for events and errors
    pub mutability: Option<StateMutability>,
    /// `None` for file-level events and errors
    pub contract: Option<String>,
    pub file: PathBuf,
    pub line: usize,
    pub origin: Origin,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub anonymous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project: Option<PathBuf>,
}

/// Serialized shape of [`SignatureRecord`], checked before it becomes one
#[derive(Deserialize)]
struct StoredRecord {
    name: String,
    signature: String,
    selector: String,
    kind: SignatureKind,
    visibility: Option<Visibility>,
    mutability: Option<StateMutability>,
    contract: Option<String>,
    file: PathBuf,
    line: usize,
    origin: Origin,
    #[serde(default)]
    anonymous: bool,
    #[serde(default)]
    project: Option<PathBuf>,
}

impl TryFrom<StoredRecord> for SignatureRecord {
    type Error = String;

    fn try_from(stored: StoredRecord) -> Result<Self, Self::Error> {
        let well_formed = stored
            .signature
            .strip_prefix(stored.name.as_str())
            .is_some_and(|rest| rest.starts_with('(') && rest.ends_with(')'));
        if !well_formed {
            return Err(format!(
                "signature {} does not belong to {}",
                stored.signature, stored.name
            ));
        }

        let selector = derive_selector(stored.kind, &stored.signature);
        if selector != stored.selector {
            return Err(format!(
                "selector {} does not match {} (expected {})",
                stored.selector, stored.signature, selector
            ));
        }

        Ok(Self {
            name: stored.name,
            signature: stored.signature,
            selector,
            kind: stored.kind,
            visibility: stored.visibility,
            mutability: stored.mutability,
            contract: stored.contract,
            file: stored.file,
            line: stored.line,
            origin: stored.origin,
            anonymous: stored.anonymous,
            project: stored.project,
        })
    }
}

fn derive_selector(kind: SignatureKind, signature: &str) -> String {
    match kind {
        SignatureKind::Event => event_topic(signature),
        SignatureKind::Function | SignatureKind::Error => function_selector(signature),
    }
}

impl SignatureRecord {
    /// Build a record from canonical parameter types in declared order
    pub fn new<S: AsRef<str>>(
        kind: SignatureKind,
        name: impl Into<String>,
        parameter_types: &[S],
        file: impl AsRef<Path>,
        line: usize,
    ) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, parameter_types);
        let selector = derive_selector(kind, &signature);

        Self {
            name,
            signature,
            selector,
            kind,
            visibility: None,
            mutability: None,
            contract: None,
            file: file.as_ref().to_path_buf(),
            line,
            origin: Origin::Declared,
            anonymous: false,
            project: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_mutability(mut self, mutability: StateMutability) -> Self {
        self.mutability = Some(mutability);
        self
    }

    pub fn in_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(contract.into());
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Canonical `name(type1,type2,...)`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `0x` + 8 hex digits for functions and errors, `0x` + 64 for events
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Sub-project this record was scanned in, when aggregated across several
    pub fn project(&self) -> Option<&Path> {
        self.project.as_deref()
    }

    pub fn set_project(&mut self, project: impl AsRef<Path>) {
        self.project = Some(project.as_ref().to_path_buf());
    }

    /// Public or external function, i.e. reachable through the ABI
    pub fn is_externally_callable(&self) -> bool {
        self.kind == SignatureKind::Function
            && self.visibility.is_some_and(|v| v.is_externally_callable())
    }

    pub fn is_inherited(&self) -> bool {
        matches!(self.origin, Origin::Inherited(_))
    }
}

impl fmt::Display for SignatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.selector, self.kind, self.signature)
    }
}
