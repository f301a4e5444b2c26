//! Step ids reused within one job or action

use std::collections::HashSet;

use crate::location::Locatable;
use crate::model::{Action, ActionStep, File, NormalJob, Step};
use crate::rule::{Example, Finding, Issue, Reporting, Rule};
use crate::visitor::{self, Visitor};

pub const NAME: &str = "duplicate-step-id";

pub static DUPLICATE_STEP_ID: Issue = Issue {
    id: "DuplicateStepId",
    title: "Step id is not unique",
    description: "Step ids must be unique within a job or a composite action. \
                  GitHub refuses to run a workflow that repeats one.",
    compliant: &[Example {
        content: "on: push\n\
                  jobs:\n\
                  \x20 build:\n\
                  \x20   runs-on: ubuntu-latest\n\
                  \x20   steps:\n\
                  \x20     - id: checkout\n\
                  \x20       uses: actions/checkout@v4\n\
                  \x20     - id: build\n\
                  \x20       run: make\n",
        explanation: "Every step has its own id.",
    }],
    non_compliant: &[Example {
        content: "on: push\n\
                  jobs:\n\
                  \x20 build:\n\
                  \x20   runs-on: ubuntu-latest\n\
                  \x20   steps:\n\
                  \x20     - id: build\n\
                  \x20       run: make\n\
                  \x20     - id: build\n\
                  \x20       run: make install\n",
        explanation: "`steps.build.outputs` would be ambiguous.",
    }],
};

/// Reports step ids repeated inside one job or composite action
#[derive(Debug, Default)]
pub struct DuplicateStepIdRule {
    /// Ids seen in the job or action being visited
    seen: HashSet<String>,
}

impl DuplicateStepIdRule {
    fn record(
        &mut self,
        reporting: &mut Reporting,
        id: Option<&str>,
        step: &impl Locatable,
        scope: &str,
    ) {
        let Some(id) = id else {
            return;
        };
        if !self.seen.insert(id.to_string()) {
            reporting.report(
                &DUPLICATE_STEP_ID,
                step,
                format!("Step id '{id}' is used more than once in {scope}"),
            );
        }
    }
}

impl Rule for DuplicateStepIdRule {
    fn name(&self) -> &str {
        "DuplicateStepIdRule"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&DUPLICATE_STEP_ID]
    }

    fn check(&mut self, file: &File) -> Vec<Finding> {
        visitor::check(self, file)
    }
}

impl Visitor for DuplicateStepIdRule {
    fn visit_normal_job(&mut self, _: &mut Reporting, _: NormalJob<'_>) {
        self.seen.clear();
    }

    fn visit_step(&mut self, reporting: &mut Reporting, step: Step<'_>) {
        let scope = format!("job '{}'", step.job().id());
        self.record(reporting, step.id(), &step, &scope);
    }

    fn visit_action(&mut self, _: &mut Reporting, _: &Action) {
        self.seen.clear();
    }

    fn visit_action_step(&mut self, reporting: &mut Reporting, step: ActionStep<'_>) {
        self.record(reporting, step.id(), &step, "the action");
    }
}
