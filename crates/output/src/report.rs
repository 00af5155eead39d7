//! Filtered view over scan results shared by every formatter

use crate::ExportOptions;
use ast::{Diagnostic, Visibility};
use scanner::{ScanResult, SubProjectResult};
use signatures::{ContractSignatures, SignatureKind, SignatureRecord};
use std::path::Path;

/// One contract with the records that passed the filters
#[derive(Debug)]
pub struct ContractView<'a> {
    pub contract: &'a ContractSignatures,
    pub records: Vec<&'a SignatureRecord>,
}

/// One project with its filtered contracts
#[derive(Debug)]
pub struct ProjectView<'a> {
    pub result: &'a ScanResult,
    pub contracts: Vec<ContractView<'a>>,
    pub file_level: Vec<&'a SignatureRecord>,
}

impl ProjectView<'_> {
    pub fn records(&self) -> impl Iterator<Item = &SignatureRecord> + '_ {
        self.contracts
            .iter()
            .flat_map(|c| c.records.iter().copied())
            .chain(self.file_level.iter().copied())
    }
}

/// Everything a formatter renders
#[derive(Debug)]
pub struct Report<'a> {
    pub root: &'a Path,
    pub projects: Vec<ProjectView<'a>>,
}

impl<'a> Report<'a> {
    pub fn from_scan(result: &'a ScanResult, options: &ExportOptions) -> Self {
        Self {
            root: &result.project.root,
            projects: vec![ProjectView::new(result, options)],
        }
    }

    pub fn from_sub_projects(result: &'a SubProjectResult, options: &ExportOptions) -> Self {
        Self {
            root: &result.root,
            projects: result
                .sub_projects
                .iter()
                .map(|sub| ProjectView::new(sub, options))
                .collect(),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &SignatureRecord> + '_ {
        self.projects.iter().flat_map(|p| p.records())
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.projects.iter().flat_map(|p| &p.result.diagnostics)
    }

    pub fn total_contracts(&self) -> usize {
        self.projects.iter().map(|p| p.result.total_contracts).sum()
    }

    pub fn files_scanned(&self) -> usize {
        self.projects.iter().map(|p| p.result.files_scanned).sum()
    }
}

impl<'a> ProjectView<'a> {
    fn new(result: &'a ScanResult, options: &ExportOptions) -> Self {
        let contracts = result
            .contracts
            .iter()
            .map(|contract| ContractView {
                contract,
                records: contract
                    .records
                    .iter()
                    .filter(|r| options.includes(r))
                    .collect(),
            })
            .collect();

        Self {
            result,
            contracts,
            file_level: result.file_level.iter().filter(|r| options.includes(r)).collect(),
        }
    }
}

impl ExportOptions {
    /// Whether `record` passes the include filters
    pub fn includes(&self, record: &SignatureRecord) -> bool {
        match record.kind {
            SignatureKind::Event => self.include_events,
            SignatureKind::Error => self.include_errors,
            SignatureKind::Function => match record.visibility {
                Some(Visibility::Internal) => self.include_internal,
                Some(Visibility::Private) => self.include_private,
                _ => true,
            },
        }
    }
}
