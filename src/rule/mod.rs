//! Rules, the issues they detect and the findings they report

mod safe;

use std::fmt;

use crate::location::{Locatable, Location};
use crate::model::File;

pub use safe::{SafeRule, RULE_ERRORED};

/// A YAML snippet illustrating an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    pub content: &'static str,
    pub explanation: &'static str,
}

/// A category of problem, shared by every finding of that kind.
///
/// Issues are static catalog data. Two issues are equal when their ids are.
#[derive(Debug, Clone, Copy)]
pub struct Issue {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub compliant: &'static [Example],
    pub non_compliant: &'static [Example],
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Issue {}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id)
    }
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    rule: String,
    issue: &'static Issue,
    location: Location,
    message: String,
}

impl Finding {
    pub fn new(
        rule: impl Into<String>,
        issue: &'static Issue,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            issue,
            location,
            message: message.into(),
        }
    }

    /// Name of the rule that produced this finding
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn issue(&self) -> &'static Issue {
        self.issue
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {}",
            self.location.file(),
            self.location.start(),
            self.issue.id,
            self.message
        )
    }
}

/// A check run against one file at a time.
///
/// Rules are stateful: a fresh instance is created for every file, so
/// state accumulated by `check` never leaks into the next file.
pub trait Rule {
    fn name(&self) -> &str;

    /// Every issue `check` can report
    fn issues(&self) -> Vec<&'static Issue>;

    fn check(&mut self, file: &File) -> Vec<Finding>;
}

/// Collects the findings of one rule during a traversal
#[derive(Debug)]
pub struct Reporting {
    rule: String,
    findings: Vec<Finding>,
}

impl Reporting {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            findings: Vec::new(),
        }
    }

    /// Record a finding located at `context`
    pub fn report(
        &mut self,
        issue: &'static Issue,
        context: &impl Locatable,
        message: impl Into<String>,
    ) {
        self.findings.push(Finding::new(
            self.rule.clone(),
            issue,
            context.location(),
            message,
        ));
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}
