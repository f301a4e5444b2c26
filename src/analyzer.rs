//! Runs rule sets over files

use tracing::{debug, info};

use crate::model::File;
use crate::rule::{Finding, Rule, SafeRule};
use crate::rule_set::RuleSet;

/// Drives every rule of every rule set over every file.
///
/// Findings come out grouped by file, then by rule set, then by rule, in the
/// order each was given. Each rule instance sees exactly one file.
#[derive(Debug, Default)]
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, files: &[File], rule_sets: &[RuleSet]) -> Vec<Finding> {
        info!(
            "Analyzing {} files with {} rule sets",
            files.len(),
            rule_sets.len()
        );

        let mut findings = Vec::new();
        for file in files {
            let before = findings.len();
            for rule_set in rule_sets {
                for rule in rule_set.create_rules() {
                    let mut rule = SafeRule::new(rule);
                    findings.extend(rule.check(file));
                }
            }
            debug!(
                "{}: {} findings",
                file.path(),
                findings.len() - before
            );
        }

        info!("Analysis complete: {} findings", findings.len());
        findings
    }
}
