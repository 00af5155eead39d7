use crate::report::{ContractView, ProjectView, Report};
use ast::{Diagnostic, DiagnosticKind, DiagnosticSeverity};
use ::console::{style, Color, Term};
use signatures::{SignatureKind, SignatureRecord};

/// Plain-text formatter with one table per contract
#[derive(Debug)]
pub struct ConsoleFormatter {
    color_mode: ColorMode,
    term: Term,
}

/// Color mode configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Always use colors
    Always,
    /// Never use colors
    Never,
    /// Auto-detect TTY support
    #[default]
    Auto,
}

impl ConsoleFormatter {
    pub fn new(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            term: Term::stdout(),
        }
    }

    pub fn format(&self, report: &Report<'_>) -> String {
        let mut output = Vec::new();

        for project in &report.projects {
            output.push(self.format_project_header(project));
            output.push(String::new());

            for view in &project.contracts {
                output.push(self.format_contract(view));
                output.push(String::new());
            }

            if !project.file_level.is_empty() {
                output.push(self.paint(style("File-level declarations").bold()));
                output.push(self.format_table(&project.file_level));
                output.push(String::new());
            }
        }

        let diagnostics: Vec<&Diagnostic> = report.diagnostics().collect();
        if !diagnostics.is_empty() {
            output.push(self.paint(style("Diagnostics").bold()));
            for diagnostic in &diagnostics {
                output.push(self.format_diagnostic(diagnostic));
            }
            output.push(String::new());
        }

        output.push(self.format_summary(report, &diagnostics));
        output.join("\n")
    }

    fn format_project_header(&self, project: &ProjectView<'_>) -> String {
        let info = &project.result.project;
        let mut header = format!(
            "{} {} ({})",
            self.paint(style("Project").cyan().bold()),
            self.paint(style(info.root.display()).bold()),
            info.framework
        );
        if let Some(version) = &info.solc_version {
            header.push_str(&format!(" solc {}", version));
        }
        if project.result.cancelled {
            header.push_str(&format!(" {}", self.paint(style("[partial]").yellow())));
        }
        header
    }

    fn format_contract(&self, view: &ContractView<'_>) -> String {
        let contract = view.contract;
        let mut title = format!(
            "{} {} {}",
            self.paint(style(&contract.name).bold()),
            self.paint(style(format!("({})", contract.kind)).dim()),
            self.paint(style(contract.file.display()).dim())
        );
        if !contract.bases.is_empty() {
            title.push_str(&format!(" is {}", contract.bases.join(", ")));
        }

        if view.records.is_empty() {
            return format!("{}\n  {}", title, self.paint(style("(no records)").dim()));
        }
        format!("{}\n{}", title, self.format_table(&view.records))
    }

    fn format_table(&self, records: &[&SignatureRecord]) -> String {
        let selector_width = records.iter().map(|r| r.selector().len()).max().unwrap_or(10);
        let signature_width = records
            .iter()
            .map(|r| r.signature().len())
            .max()
            .unwrap_or(9)
            .max("SIGNATURE".len());

        let mut lines = vec![self.paint(
            style(format!(
                "  {:<sw$}  {:<8}  {:<gw$}  {:<10}  {}",
                "SELECTOR",
                "KIND",
                "SIGNATURE",
                "VISIBILITY",
                "ORIGIN",
                sw = selector_width,
                gw = signature_width
            ))
            .dim(),
        )];

        for record in records {
            let visibility = record
                .visibility
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            // pad before styling so escape codes do not skew the columns
            let selector = format!("{:<width$}", record.selector(), width = selector_width);
            let kind = format!("{:<8}", record.kind.to_string());
            lines.push(format!(
                "  {}  {}  {:<gw$}  {:<10}  {}",
                self.paint(style(selector).fg(kind_color(record.kind))),
                kind,
                record.signature(),
                visibility,
                record.origin,
                gw = signature_width
            ));
        }
        lines.join("\n")
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let color = match diagnostic.severity {
            DiagnosticSeverity::Error => Color::Red,
            DiagnosticSeverity::Warning => Color::Yellow,
            DiagnosticSeverity::Info => Color::Blue,
        };
        let location = match (&diagnostic.file, diagnostic.line) {
            (Some(file), Some(line)) => format!("{}:{}", file.display(), line),
            (Some(file), None) => file.display().to_string(),
            _ => String::new(),
        };
        format!(
            "  {} [{}] {} {}",
            self.paint(style(format!("{:<7}", diagnostic.severity)).fg(color).bold()),
            diagnostic.kind,
            diagnostic.message,
            self.paint(style(location).dim())
        )
    }

    fn format_summary(&self, report: &Report<'_>, diagnostics: &[&Diagnostic]) -> String {
        let collisions = diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::SelectorCollision)
            .count();
        let summary = format!(
            "{} project(s), {} files, {} contracts, {} records exported, {} collision(s)",
            report.projects.len(),
            report.files_scanned(),
            report.total_contracts(),
            report.records().count(),
            collisions
        );
        if collisions > 0 {
            self.paint(style(summary).fg(Color::Yellow).bold())
        } else {
            self.paint(style(summary).fg(Color::Green).bold())
        }
    }

    fn paint<D: std::fmt::Display>(&self, styled: ::console::StyledObject<D>) -> String {
        styled.force_styling(self.should_use_colors()).to_string()
    }

    fn should_use_colors(&self) -> bool {
        match self.color_mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => self.term.is_term() && self.term.features().colors_supported(),
        }
    }
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

fn kind_color(kind: SignatureKind) -> Color {
    match kind {
        SignatureKind::Function => Color::Green,
        SignatureKind::Event => Color::Cyan,
        SignatureKind::Error => Color::Magenta,
    }
}
