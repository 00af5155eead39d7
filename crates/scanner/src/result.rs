//! Aggregated scan results

use ast::Diagnostic;
use project::ProjectInfo;
use serde::Serialize;
use signatures::{ContractSignatures, EngineOutput, SignatureKind, SignatureRecord};
use std::path::PathBuf;

/// Everything extracted from one project root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub project: ProjectInfo,
    pub contracts: Vec<ContractSignatures>,
    /// File-level events and errors
    pub file_level: Vec<SignatureRecord>,
    pub files_scanned: usize,
    pub total_contracts: usize,
    /// Declared public/external functions and public getters
    pub external_functions: usize,
    /// Declared internal/private functions
    pub internal_functions: usize,
    pub events: usize,
    pub errors: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// True when the scan stopped early and this result is partial
    pub cancelled: bool,
}

impl ScanResult {
    /// Result for a project with nothing scanned yet
    pub fn empty(project: ProjectInfo) -> Self {
        Self {
            project,
            contracts: Vec::new(),
            file_level: Vec::new(),
            files_scanned: 0,
            total_contracts: 0,
            external_functions: 0,
            internal_functions: 0,
            events: 0,
            errors: 0,
            diagnostics: Vec::new(),
            cancelled: false,
        }
    }

    pub(crate) fn from_engine(
        project: ProjectInfo,
        output: EngineOutput,
        files_scanned: usize,
        mut diagnostics: Vec<Diagnostic>,
        cancelled: bool,
    ) -> Self {
        diagnostics.extend(output.diagnostics);

        let mut result = Self {
            total_contracts: output.contracts.len(),
            contracts: output.contracts,
            file_level: output.file_level,
            files_scanned,
            diagnostics,
            cancelled,
            ..Self::empty(project)
        };
        result.count_records();
        result
    }

    /// Inherited copies are not counted; each declaration counts once in
    /// the contract that declares it.
    fn count_records(&mut self) {
        let own = self
            .contracts
            .iter()
            .flat_map(|c| &c.records)
            .filter(|r| !r.is_inherited())
            .chain(&self.file_level);

        for record in own {
            match record.kind {
                SignatureKind::Function if record.is_externally_callable() => {
                    self.external_functions += 1
                }
                SignatureKind::Function => self.internal_functions += 1,
                SignatureKind::Event => self.events += 1,
                SignatureKind::Error => self.errors += 1,
            }
        }
    }

    /// Every record of every contract followed by the file-level ones
    pub fn records(&self) -> impl Iterator<Item = &SignatureRecord> {
        self.contracts
            .iter()
            .flat_map(|c| &c.records)
            .chain(&self.file_level)
    }

    pub fn total_functions(&self) -> usize {
        self.external_functions + self.internal_functions
    }

    pub fn has_collisions(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == ast::DiagnosticKind::SelectorCollision)
    }

    /// Fold a sub-project result into this one, tagging its records with
    /// the sub-project root
    pub(crate) fn absorb(&mut self, sub: &ScanResult) {
        let provenance = sub.project.root.as_path();
        self.contracts.extend(sub.contracts.iter().cloned().map(|mut c| {
            c.assign_project(provenance);
            c
        }));
        self.file_level
            .extend(sub.file_level.iter().cloned().map(|mut r| {
                r.set_project(provenance);
                r
            }));
        self.diagnostics.extend(sub.diagnostics.iter().cloned());

        self.files_scanned += sub.files_scanned;
        self.total_contracts += sub.total_contracts;
        self.external_functions += sub.external_functions;
        self.internal_functions += sub.internal_functions;
        self.events += sub.events;
        self.errors += sub.errors;
        self.cancelled |= sub.cancelled;
    }
}

/// One result per sub-project plus their union
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubProjectResult {
    pub root: PathBuf,
    pub sub_projects: Vec<ScanResult>,
    /// Union of all sub-project records, each tagged with its sub-project
    pub combined: ScanResult,
}

impl SubProjectResult {
    pub(crate) fn combine(root: PathBuf, combined_info: ProjectInfo, sub_projects: Vec<ScanResult>) -> Self {
        let mut combined = ScanResult::empty(combined_info);
        for sub in &sub_projects {
            combined.absorb(sub);
        }
        Self {
            root,
            sub_projects,
            combined,
        }
    }
}
