//! Findings to LSP diagnostics

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

use crate::location;
use crate::rule::{Finding, Issue, RULE_ERRORED};
use crate::rules::schema::{JSON_SCHEMA_VALIDATION, YAML_LOAD_ERROR};

/// Value of `Diagnostic::source` for everything this server publishes
pub const SOURCE: &str = "ghlint";

/// Issues that make the file unusable are errors; everything else warns
pub fn severity_for(issue: &Issue) -> DiagnosticSeverity {
    if *issue == RULE_ERRORED || *issue == YAML_LOAD_ERROR || *issue == JSON_SCHEMA_VALIDATION {
        DiagnosticSeverity::ERROR
    } else {
        DiagnosticSeverity::WARNING
    }
}

/// Collects diagnostics for one document
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic for a finding
    pub fn add_finding(&mut self, finding: &Finding) {
        let location = finding.location();
        self.diagnostics.push(Diagnostic {
            range: Range {
                start: to_lsp(location.start()),
                end: to_lsp(location.end()),
            },
            severity: Some(severity_for(finding.issue())),
            code: Some(NumberOrString::String(finding.issue().id.to_string())),
            code_description: None,
            source: Some(SOURCE.to_string()),
            message: finding.message().to_string(),
            related_information: None,
            tags: None,
            data: None,
        });
    }

    pub fn extend<'a>(&mut self, findings: impl IntoIterator<Item = &'a Finding>) {
        for finding in findings {
            self.add_finding(finding);
        }
    }

    /// Convert into the final list of diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// 1-based line/column to the 0-based LSP position
fn to_lsp(position: location::Position) -> Position {
    Position {
        line: (position.line.get() - 1) as u32,
        character: (position.column.get() - 1) as u32,
    }
}
