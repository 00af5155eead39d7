use crate::report::Report;
use signatures::SignatureRecord;
use std::path::Path;

const HEADER: &str = "project,contract,kind,name,signature,selector,visibility,mutability,origin,file,line";

/// One row per exported record
#[derive(Debug, Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, report: &Report<'_>) -> String {
        let mut csv = format!("{}\n", HEADER);

        for project in &report.projects {
            let root = &project.result.project.root;
            for view in &project.contracts {
                for record in &view.records {
                    csv.push_str(&row(root, Some(&view.contract.name), record));
                }
            }
            for record in &project.file_level {
                csv.push_str(&row(root, None, record));
            }
        }

        csv
    }
}

fn row(project: &Path, contract: Option<&str>, record: &SignatureRecord) -> String {
    let fields = [
        project.display().to_string(),
        contract.unwrap_or_default().to_string(),
        record.kind.to_string(),
        record.name.clone(),
        record.signature().to_string(),
        record.selector().to_string(),
        record.visibility.map(|v| v.to_string()).unwrap_or_default(),
        record.mutability.map(|m| m.to_string()).unwrap_or_default(),
        record.origin.to_string(),
        record.file.display().to_string(),
        record.line.to_string(),
    ];
    let escaped: Vec<String> = fields.iter().map(|f| escape(f)).collect();
    format!("{}\n", escaped.join(","))
}

/// Quote a field when it holds a separator, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_result;
    use crate::ExportOptions;

    #[test]
    fn test_escape() {
        assert_eq!(escape("setValue(uint256)"), "setValue(uint256)");
        assert_eq!(escape("transfer(address,uint256)"), "\"transfer(address,uint256)\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_one_row_per_record() {
        let result = sample_result();
        let options = ExportOptions::default();
        let report = Report::from_scan(&result, &options);

        let csv = CsvFormatter::new().format(&report);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], HEADER);
        assert_eq!(lines.len(), 1 + report.records().count());
        assert!(lines
            .iter()
            .any(|l| l.contains(",Store,function,setValue,setValue(uint256),0x55241077,public,")));
    }
}
