//! Jobs without `timeout-minutes`

use crate::model::{File, NormalJob};
use crate::rule::{Example, Finding, Issue, Reporting, Rule};
use crate::visitor::{self, Visitor};

pub const NAME: &str = "missing-job-timeout";

pub static MISSING_JOB_TIMEOUT: Issue = Issue {
    id: "MissingJobTimeout",
    title: "Job has no timeout",
    description: "Without `timeout-minutes` a stuck job keeps its runner busy for the \
                  default of 6 hours.",
    compliant: &[Example {
        content: "on: push\n\
                  jobs:\n\
                  \x20 build:\n\
                  \x20   runs-on: ubuntu-latest\n\
                  \x20   timeout-minutes: 15\n\
                  \x20   steps:\n\
                  \x20     - run: make\n",
        explanation: "The job is cancelled after 15 minutes.",
    }],
    non_compliant: &[Example {
        content: "on: push\n\
                  jobs:\n\
                  \x20 build:\n\
                  \x20   runs-on: ubuntu-latest\n\
                  \x20   steps:\n\
                  \x20     - run: make\n",
        explanation: "A hanging `make` holds the runner until GitHub kills it.",
    }],
};

/// Reports jobs that run steps without `timeout-minutes`
#[derive(Debug, Default)]
pub struct MissingJobTimeoutRule;

impl Rule for MissingJobTimeoutRule {
    fn name(&self) -> &str {
        "MissingJobTimeoutRule"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&MISSING_JOB_TIMEOUT]
    }

    fn check(&mut self, file: &File) -> Vec<Finding> {
        visitor::check(self, file)
    }
}

impl Visitor for MissingJobTimeoutRule {
    fn visit_normal_job(&mut self, reporting: &mut Reporting, job: NormalJob<'_>) {
        if !job.has_timeout() {
            reporting.report(
                &MISSING_JOB_TIMEOUT,
                &job,
                format!("Job[{}] is missing `timeout-minutes`", job.id()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawFile;

    fn check(text: &str) -> Vec<Finding> {
        MissingJobTimeoutRule.check(&File::new(RawFile::new("ci.yml", text)))
    }

    #[test]
    fn test_reports_each_job_without_timeout() {
        let findings = check(
            "on: push\njobs:\n  a:\n    runs-on: x\n  b:\n    runs-on: x\n    timeout-minutes: 5\n  c:\n    runs-on: x\n",
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].message(), "Job[a] is missing `timeout-minutes`");
        assert_eq!(findings[0].location().start().to_string(), "4:5");
        assert_eq!(findings[1].message(), "Job[c] is missing `timeout-minutes`");
    }

    #[test]
    fn test_expression_timeout_counts() {
        let findings = check(
            "on: push\njobs:\n  a:\n    runs-on: x\n    timeout-minutes: ${{ inputs.timeout }}\n",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_reusable_workflow_calls_are_ignored() {
        let findings = check("on: push\njobs:\n  a:\n    uses: ./.github/workflows/x.yml\n");
        assert!(findings.is_empty());
    }
}
