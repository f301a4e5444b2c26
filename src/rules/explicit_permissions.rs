//! Jobs that rely on default or inherited permissions

use crate::model::{File, Job};
use crate::rule::{Example, Finding, Issue, Reporting, Rule};
use crate::visitor::{self, Visitor};

pub const NAME: &str = "explicit-job-permissions";

pub static MISSING_JOB_PERMISSIONS: Issue = Issue {
    id: "MissingJobPermissions",
    title: "Job has no explicit permissions",
    description: "A job without `permissions` receives the repository default token \
                  scopes, which are often write-all. Declaring them per job keeps each \
                  token to what the job needs.",
    compliant: &[Example {
        content: "on: push\n\
                  jobs:\n\
                  \x20 build:\n\
                  \x20   runs-on: ubuntu-latest\n\
                  \x20   permissions:\n\
                  \x20     contents: read\n\
                  \x20   steps:\n\
                  \x20     - uses: actions/checkout@v4\n",
        explanation: "The job only reads repository contents.",
    }],
    non_compliant: &[
        Example {
            content: "on: push\n\
                      jobs:\n\
                      \x20 build:\n\
                      \x20   runs-on: ubuntu-latest\n\
                      \x20   steps:\n\
                      \x20     - uses: actions/checkout@v4\n",
            explanation: "The token scopes depend on repository settings.",
        },
        Example {
            content: "on: push\n\
                      permissions: read-all\n\
                      jobs:\n\
                      \x20 build:\n\
                      \x20   runs-on: ubuntu-latest\n\
                      \x20   steps:\n\
                      \x20     - uses: actions/checkout@v4\n",
            explanation: "Workflow-level permissions apply to every job alike; \
                          declare them on the job instead.",
        },
    ],
};

/// Reports jobs that do not declare `permissions`
#[derive(Debug, Default)]
pub struct ExplicitJobPermissionsRule;

impl Rule for ExplicitJobPermissionsRule {
    fn name(&self) -> &str {
        "ExplicitJobPermissionsRule"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&MISSING_JOB_PERMISSIONS]
    }

    fn check(&mut self, file: &File) -> Vec<Finding> {
        visitor::check(self, file)
    }
}

impl Visitor for ExplicitJobPermissionsRule {
    fn visit_job(&mut self, reporting: &mut Reporting, job: Job<'_>) {
        if job.has_permissions() {
            return;
        }
        let message = if job.workflow().has_permissions() {
            format!(
                "Job[{}] should have explicit permissions instead of inheriting the workflow's",
                job.id()
            )
        } else {
            format!("Job[{}] is missing explicit permissions", job.id())
        };
        reporting.report(&MISSING_JOB_PERMISSIONS, &job, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawFile;

    fn check(text: &str) -> Vec<Finding> {
        ExplicitJobPermissionsRule.check(&File::new(RawFile::new("ci.yml", text)))
    }

    #[test]
    fn test_job_without_permissions() {
        let findings = check("on: push\njobs:\n  a:\n    runs-on: x\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message(), "Job[a] is missing explicit permissions");
    }

    #[test]
    fn test_workflow_permissions_are_not_enough() {
        let findings = check("on: push\npermissions: {}\njobs:\n  a:\n    runs-on: x\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message().contains("inheriting the workflow's"));
    }

    #[test]
    fn test_scalar_and_empty_permissions_are_explicit() {
        let findings = check(
            "on: push\njobs:\n  a:\n    runs-on: x\n    permissions: read-all\n  b:\n    runs-on: x\n    permissions: {}\n",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_reusable_workflow_calls_are_checked() {
        let findings = check("on: push\njobs:\n  call:\n    uses: ./.github/workflows/x.yml\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location().start().to_string(), "4:5");
    }
}
