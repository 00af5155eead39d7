use crate::canonical::Canonicalizer;
use crate::record::{Origin, SignatureKind, SignatureRecord};
use crate::scope::{ContractRef, Scope, TypeIndex};
use crate::selector::selector_bytes;
use ast::{
    ContractKind, Diagnostic, DiagnosticKind, DiagnosticSeverity, Parameter, SourceUnit,
    StateMutability, Visibility,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Records of one contract, its own declarations first, then inherited ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSignatures {
    pub name: String,
    pub kind: ContractKind,
    pub file: PathBuf,
    pub bases: Vec<String>,
    pub records: Vec<SignatureRecord>,
    /// Sub-project the contract was scanned in, set during aggregation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<PathBuf>,
}

impl ContractSignatures {
    pub fn functions(&self) -> impl Iterator<Item = &SignatureRecord> {
        self.records
            .iter()
            .filter(|r| r.kind == SignatureKind::Function)
    }

    pub fn find(&self, signature: &str) -> Option<&SignatureRecord> {
        self.records.iter().find(|r| r.signature() == signature)
    }

    /// Tag this contract and all of its records with a sub-project path
    pub fn assign_project(&mut self, project: &Path) {
        self.project = Some(project.to_path_buf());
        for record in &mut self.records {
            record.set_project(project);
        }
    }
}

/// Everything derived from one set of source units
#[derive(Debug, Default)]
pub struct EngineOutput {
    pub contracts: Vec<ContractSignatures>,
    /// File-level events and errors
    pub file_level: Vec<SignatureRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns parsed source units into signature records
pub struct SignatureEngine<'a> {
    index: TypeIndex<'a>,
}

impl<'a> SignatureEngine<'a> {
    /// Registers every declaration of every unit before anything is resolved
    pub fn new(units: &'a [SourceUnit]) -> Self {
        Self {
            index: TypeIndex::new(units),
        }
    }

    pub fn index(&self) -> &TypeIndex<'a> {
        &self.index
    }

    pub fn run(&self) -> EngineOutput {
        let mut output = EngineOutput::default();
        let canonicalizer = Canonicalizer::new(&self.index);

        let mut declared: Vec<(ContractRef<'a>, Vec<SignatureRecord>)> = Vec::new();
        for &unit in self.index.units() {
            for contract in &unit.contracts {
                let owner = ContractRef { unit, contract };
                let records = self.declared_records(&canonicalizer, owner, &mut output.diagnostics);
                declared.push((owner, records));
            }
            let file_level = self.file_level_records(&canonicalizer, unit, &mut output.diagnostics);
            output
                .diagnostics
                .extend(find_file_level_collisions(&file_level, &unit.path));
            output.file_level.extend(file_level);
        }

        let by_key: HashMap<(&Path, &str), usize> = declared
            .iter()
            .enumerate()
            .map(|(i, (owner, _))| ((owner.unit.path.as_path(), owner.contract.name.as_str()), i))
            .collect();

        for (owner, own) in &declared {
            let mut records = own.clone();
            let mut present: HashSet<(SignatureKind, String)> = records
                .iter()
                .map(|r| (r.kind, r.signature().to_string()))
                .collect();

            let walk = self.index.bases(*owner);
            for base in &walk.found {
                let key = (base.unit.path.as_path(), base.contract.name.as_str());
                let Some(&i) = by_key.get(&key) else { continue };
                for record in &declared[i].1 {
                    if record.visibility == Some(Visibility::Private) {
                        continue;
                    }
                    if present.insert((record.kind, record.signature().to_string())) {
                        records.push(
                            record
                                .clone()
                                .in_contract(&owner.contract.name)
                                .with_origin(Origin::Inherited(base.contract.name.clone())),
                        );
                    }
                }
            }

            for missing in &walk.missing {
                output.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::UnknownBase,
                        format!(
                            "base {} of {} is not part of the project, its members are not inherited",
                            missing, owner.contract.name
                        ),
                    )
                    .in_file(&owner.unit.path)
                    .at_line(owner.contract.position.line()),
                );
            }

            let signatures = ContractSignatures {
                name: owner.contract.name.clone(),
                kind: owner.contract.kind,
                file: owner.unit.path.clone(),
                bases: owner.contract.bases.clone(),
                records,
                project: None,
            };
            output.diagnostics.extend(find_collisions(&signatures));
            output.contracts.push(signatures);
        }

        debug!(
            "Derived signatures for {} contracts and {} file-level declarations",
            output.contracts.len(),
            output.file_level.len()
        );
        output
    }

    /// Records for the declarations written in the contract body itself
    fn declared_records(
        &self,
        canonicalizer: &Canonicalizer<'_, 'a>,
        owner: ContractRef<'a>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<SignatureRecord> {
        let contract = owner.contract;
        let scope = owner.scope();
        let file = &owner.unit.path;
        let mut records = Vec::new();

        for function in &contract.functions {
            let line = function.position.line();
            match canonicalizer.canonicalize_all(param_types(&function.parameters), scope) {
                Ok(types) => records.push(
                    SignatureRecord::new(SignatureKind::Function, &function.name, &types, file, line)
                        .with_visibility(function.visibility)
                        .with_mutability(function.mutability)
                        .in_contract(&contract.name),
                ),
                Err(err) => {
                    // Internal functions may legitimately take storage mappings
                    let severity = if function.visibility.is_externally_callable() {
                        DiagnosticSeverity::Error
                    } else {
                        DiagnosticSeverity::Info
                    };
                    diagnostics.push(
                        Diagnostic::new(
                            err.diagnostic_kind(),
                            format!("dropping function {}.{}: {}", contract.name, function.name, err),
                        )
                        .with_severity(severity)
                        .in_file(file)
                        .at_line(line),
                    );
                }
            }
        }

        for getter in &contract.getters {
            let line = getter.position.line();
            match canonicalizer.getter_inputs(&getter.ty, scope) {
                Ok(types) => records.push(
                    SignatureRecord::new(SignatureKind::Function, &getter.name, &types, file, line)
                        .with_visibility(Visibility::Public)
                        .with_mutability(StateMutability::View)
                        .in_contract(&contract.name)
                        .with_origin(Origin::Getter),
                ),
                Err(err) => diagnostics.push(
                    Diagnostic::new(
                        err.diagnostic_kind(),
                        format!("dropping getter {}.{}: {}", contract.name, getter.name, err),
                    )
                    .in_file(file)
                    .at_line(line),
                ),
            }
        }

        for event in &contract.events {
            if let Some(record) = self.event_record(canonicalizer, event, scope, diagnostics) {
                records.push(record.in_contract(&contract.name));
            }
        }

        for error in &contract.errors {
            if let Some(record) = self.error_record(canonicalizer, error, scope, diagnostics) {
                records.push(record.in_contract(&contract.name));
            }
        }

        records.sort_by_key(|r| r.line);
        records
    }

    fn file_level_records(
        &self,
        canonicalizer: &Canonicalizer<'_, 'a>,
        unit: &'a SourceUnit,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<SignatureRecord> {
        let scope = Scope::file(unit);
        let mut records: Vec<SignatureRecord> = unit
            .events
            .iter()
            .filter_map(|event| self.event_record(canonicalizer, event, scope, diagnostics))
            .collect();
        records.extend(
            unit.errors
                .iter()
                .filter_map(|error| self.error_record(canonicalizer, error, scope, diagnostics)),
        );
        records.sort_by_key(|r| r.line);
        records
    }

    fn event_record(
        &self,
        canonicalizer: &Canonicalizer<'_, 'a>,
        event: &ast::EventDecl,
        scope: Scope<'a>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<SignatureRecord> {
        let line = event.position.line();
        match canonicalizer.canonicalize_all(param_types(&event.parameters), scope) {
            Ok(types) => Some(
                SignatureRecord::new(SignatureKind::Event, &event.name, &types, &scope.unit.path, line)
                    .anonymous(event.anonymous),
            ),
            Err(err) => {
                diagnostics.push(
                    Diagnostic::new(
                        err.diagnostic_kind(),
                        format!("dropping event {}: {}", event.name, err),
                    )
                    .in_file(&scope.unit.path)
                    .at_line(line),
                );
                None
            }
        }
    }

    fn error_record(
        &self,
        canonicalizer: &Canonicalizer<'_, 'a>,
        error: &ast::ErrorDecl,
        scope: Scope<'a>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<SignatureRecord> {
        let line = error.position.line();
        match canonicalizer.canonicalize_all(param_types(&error.parameters), scope) {
            Ok(types) => Some(SignatureRecord::new(
                SignatureKind::Error,
                &error.name,
                &types,
                &scope.unit.path,
                line,
            )),
            Err(err) => {
                diagnostics.push(
                    Diagnostic::new(
                        err.diagnostic_kind(),
                        format!("dropping error {}: {}", error.name, err),
                    )
                    .in_file(&scope.unit.path)
                    .at_line(line),
                );
                None
            }
        }
    }
}

fn param_types(parameters: &[Parameter]) -> impl Iterator<Item = &ast::TypeRef> {
    parameters.iter().map(|p| &p.ty)
}

/// Different signatures sharing a 4-byte selector among the externally
/// callable functions of a contract, or among its errors
pub fn find_collisions(contract: &ContractSignatures) -> Vec<Diagnostic> {
    [SignatureKind::Function, SignatureKind::Error]
        .into_iter()
        .flat_map(|kind| collisions_of_kind(&contract.records, kind, &contract.name, &contract.file))
        .collect()
}

/// Different file-level errors of one source file sharing a 4-byte selector
pub fn find_file_level_collisions(records: &[SignatureRecord], file: &Path) -> Vec<Diagnostic> {
    let owner = file.display().to_string();
    collisions_of_kind(records, SignatureKind::Error, &owner, file)
}

fn collisions_of_kind(
    records: &[SignatureRecord],
    kind: SignatureKind,
    owner: &str,
    file: &Path,
) -> Vec<Diagnostic> {
    let mut by_selector: BTreeMap<[u8; 4], Vec<&SignatureRecord>> = BTreeMap::new();
    let candidates = records.iter().filter(|r| match kind {
        SignatureKind::Function => r.is_externally_callable(),
        _ => r.kind == kind,
    });
    for record in candidates {
        let group = by_selector.entry(selector_bytes(record.signature())).or_default();
        if group.iter().all(|r| r.signature() != record.signature()) {
            group.push(record);
        }
    }

    by_selector
        .values()
        .filter(|g| g.len() > 1)
        .map(|group| {
            let signatures: Vec<&str> = group.iter().map(|r| r.signature()).collect();
            Diagnostic::new(
                DiagnosticKind::SelectorCollision,
                format!(
                    "{} {} share selector {} in {}",
                    kind,
                    signatures.join(" and "),
                    group[0].selector(),
                    owner
                ),
            )
            .in_file(file)
            .at_line(group[1].line)
        })
        .collect()
}
