use serde::Serialize;
use std::{fmt, path::Path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "no issues");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

/// Directory must exist at the time of the check; symlinks are followed.
pub fn check_directory(report: &mut ValidationReport, field: &str, path: &Path) {
    if !path.is_dir() {
        report.push(
            field,
            format!("`{}` does not exist or is not a directory", path.display()),
        );
    }
}

/// A directive value is written verbatim after `Key: `, so it must stay on one line.
pub fn check_directive_value(report: &mut ValidationReport, field: &str, value: &str) {
    if value.contains(['\n', '\r']) {
        report.push(field, "value must not contain line breaks");
    }
}

pub fn check_variable(report: &mut ValidationReport, field: &str, key: &str, value: &str) {
    if key.is_empty() {
        report.push(field, "variable name must not be empty");
    } else if key.contains('=') {
        report.push(field, format!("variable name `{}` must not contain `=`", key));
    }
    check_directive_value(report, &format!("{}.{}", field, key), key);
    check_directive_value(report, &format!("{}.{}", field, key), value);
}

/// The file name is reused in both the temp and spool directories, so it
/// has to be a single normal path segment.
pub fn check_file_name(report: &mut ValidationReport, field: &str, name: &str) {
    if name.is_empty() || name == "." || name == ".." {
        report.push(field, format!("`{}` is not a usable file name", name));
    } else if name.contains(['/', '\\', '\0']) {
        report.push(field, format!("`{}` must be a single path segment", name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let mut report = ValidationReport::default();
        assert_eq!(report.to_string(), "no issues");
        report.push("call.channel", "must not be empty");
        report.push("spool_dir", "missing");
        assert_eq!(
            report.to_string(),
            "call.channel: must not be empty; spool_dir: missing"
        );
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_check_file_name() {
        let mut report = ValidationReport::default();
        check_file_name(&mut report, "filename", "wakeup.call");
        assert!(report.is_empty());

        for bad in ["", ".", "..", "a/b.call", "../x.call"] {
            let mut report = ValidationReport::default();
            check_file_name(&mut report, "filename", bad);
            assert_eq!(report.issues.len(), 1, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_check_variable() {
        let mut report = ValidationReport::default();
        check_variable(&mut report, "variables", "greeting", "hello world");
        assert!(report.is_empty());

        check_variable(&mut report, "variables", "a=b", "x");
        check_variable(&mut report, "variables", "", "x");
        check_variable(&mut report, "variables", "k", "line\nbreak");
        assert_eq!(report.issues.len(), 3);
    }

    #[test]
    fn test_check_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = ValidationReport::default();
        check_directory(&mut report, "spool_dir", dir.path());
        assert!(report.is_empty());

        check_directory(&mut report, "spool_dir", &dir.path().join("missing"));
        assert_eq!(report.issues[0].field, "spool_dir");
    }
}
