//! Structural validation of workflow and action files
//!
//! A hand-written subset of the published GitHub Actions schemas: required
//! keys, unknown keys, empty collections and repeated mapping keys.

use crate::location::{FileIdentifier, Location};
use crate::model::{
    Action, ActionStep, File, InvalidContent, NormalJob, ReusableWorkflowCallJob, RunActionStep,
    Runs, Step, Workflow,
};
use crate::parser::{YamlNode, YamlTree};
use crate::rule::{Example, Finding, Issue, Reporting, Rule};
use crate::schema::{actions, workflows};
use crate::visitor::{self, Visitor};

pub const NAME: &str = "schema";

pub static JSON_SCHEMA_VALIDATION: Issue = Issue {
    id: "JsonSchemaValidation",
    title: "File does not match the schema",
    description: "Workflow and action files must follow the structure GitHub accepts. \
                  Unknown keys, missing required keys and empty job or step lists are \
                  rejected when the workflow runs, or silently ignored.",
    compliant: &[Example {
        content: "on: push\n\
                  jobs:\n\
                  \x20 build:\n\
                  \x20   runs-on: ubuntu-latest\n\
                  \x20   steps:\n\
                  \x20     - run: make\n",
        explanation: "A trigger and one job with a runner and a step.",
    }],
    non_compliant: &[
        Example {
            content: "on: push\njobs: {}\n",
            explanation: "A workflow must define at least one job.",
        },
        Example {
            content: "on: push\n\
                      jobs:\n\
                      \x20 build:\n\
                      \x20   runs-on: ubuntu-latest\n\
                      \x20   step:\n\
                      \x20     - run: make\n",
            explanation: "`step` is not a job keyword; the step list is ignored.",
        },
    ],
};

pub static YAML_LOAD_ERROR: Issue = Issue {
    id: "YamlLoadError",
    title: "File could not be loaded",
    description: "The file is not valid YAML, or its structure cannot be read as a \
                  workflow or an action. No other rule can check it.",
    compliant: &[Example {
        content: "on: push\n\
                  jobs:\n\
                  \x20 build:\n\
                  \x20   runs-on: ubuntu-latest\n\
                  \x20   steps:\n\
                  \x20     - run: make\n",
        explanation: "Well-formed YAML with a recognizable structure.",
    }],
    non_compliant: &[
        Example {
            content: "on: push\n\
                      jobs:\n\
                      \x20 build:\n\
                      \x20   runs-on: *\n",
            explanation: "An alias without a name is a YAML syntax error.",
        },
        Example {
            content: "on: push\n\
                      jobs:\n\
                      \x20 build:\n\
                      \x20   runs-on: ubuntu-latest\n\
                      \x20   steps:\n\
                      \x20     - name: Nothing to do\n",
            explanation: "A step must either `run` a script or `uses` an action.",
        },
    ],
};

/// Reports files that do not have the shape GitHub expects
#[derive(Debug, Default)]
pub struct SchemaRule;

impl Rule for SchemaRule {
    fn name(&self) -> &str {
        "SchemaRule"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&JSON_SCHEMA_VALIDATION, &YAML_LOAD_ERROR]
    }

    fn check(&mut self, file: &File) -> Vec<Finding> {
        visitor::check(self, file)
    }
}

impl Visitor for SchemaRule {
    fn visit_invalid_content(&mut self, reporting: &mut Reporting, content: &InvalidContent) {
        reporting.report(&YAML_LOAD_ERROR, content, content.error().to_string());
    }

    fn visit_workflow(&mut self, reporting: &mut Reporting, workflow: &Workflow) {
        let file = workflow.file();
        let root = workflow.node();
        report_duplicate_keys(reporting, file, workflow.tree());

        for key in workflows::REQUIRED_WORKFLOW_KEYS {
            if !root.contains_key(key) {
                reporting.report(
                    &JSON_SCHEMA_VALIDATION,
                    workflow,
                    format!("Workflow must define '{key}'"),
                );
            }
        }
        report_unknown_keys(reporting, file, root, workflows::is_workflow_key, "workflow");

        if let Some(jobs) = root.get("jobs") {
            if jobs.is_empty() {
                reporting.report(
                    &JSON_SCHEMA_VALIDATION,
                    &located(file, jobs),
                    "Workflow must define at least one job",
                );
            }
        }
    }

    fn visit_normal_job(&mut self, reporting: &mut Reporting, job: NormalJob<'_>) {
        let file = job.workflow().file();
        let node = job.node();
        if !node.contains_key("runs-on") {
            reporting.report(
                &JSON_SCHEMA_VALIDATION,
                &job,
                format!("Job '{}' must define 'runs-on'", job.id()),
            );
        }
        if let Some(steps) = node.get("steps") {
            if steps.is_empty() {
                reporting.report(
                    &JSON_SCHEMA_VALIDATION,
                    &located(file, steps),
                    format!("Job '{}' must have at least one step", job.id()),
                );
            }
        }
        let context = format!("job '{}'", job.id());
        report_unknown_keys(
            reporting,
            file,
            node,
            |key| workflows::is_job_key(key, false),
            &context,
        );
    }

    fn visit_reusable_workflow_call_job(
        &mut self,
        reporting: &mut Reporting,
        job: ReusableWorkflowCallJob<'_>,
    ) {
        let context = format!("job '{}'", job.id());
        report_unknown_keys(
            reporting,
            job.workflow().file(),
            job.node(),
            |key| workflows::is_job_key(key, true),
            &context,
        );
    }

    fn visit_step(&mut self, reporting: &mut Reporting, step: Step<'_>) {
        let job = step.job();
        let context = format!("step {} of job '{}'", step.index(), job.id());
        report_unknown_keys(
            reporting,
            job.workflow().file(),
            step.node(),
            workflows::is_step_key,
            &context,
        );
    }

    fn visit_action(&mut self, reporting: &mut Reporting, action: &Action) {
        let file = action.file();
        let root = action.node();
        report_duplicate_keys(reporting, file, action.tree());

        for key in actions::REQUIRED_ACTION_KEYS {
            if !root.contains_key(key) {
                reporting.report(
                    &JSON_SCHEMA_VALIDATION,
                    action,
                    format!("Action must define '{key}'"),
                );
            }
        }
        report_unknown_keys(reporting, file, root, actions::is_action_key, "action");

        let runs = action.runs();
        let allowed = actions::runs_keys(runs.using());
        report_unknown_keys(reporting, file, runs.node(), |key| allowed.contains(&key), "runs");
        if let Runs::Composite(composite) = runs {
            if composite.steps().next().is_none() {
                reporting.report(
                    &JSON_SCHEMA_VALIDATION,
                    &located(file, runs.node()),
                    "Composite action must have at least one step",
                );
            }
        }
    }

    fn visit_action_step(&mut self, reporting: &mut Reporting, step: ActionStep<'_>) {
        let context = format!("step {}", step.index());
        report_unknown_keys(
            reporting,
            step.action().file(),
            step.node(),
            actions::is_composite_step_key,
            &context,
        );
    }

    fn visit_run_action_step(&mut self, reporting: &mut Reporting, step: RunActionStep<'_>) {
        if step.shell().is_none() {
            reporting.report(
                &JSON_SCHEMA_VALIDATION,
                &step,
                format!("Composite action step {} must define 'shell'", step.index()),
            );
        }
    }
}

fn located(file: &FileIdentifier, node: YamlNode<'_>) -> Location {
    node.location(file)
}

fn report_unknown_keys(
    reporting: &mut Reporting,
    file: &FileIdentifier,
    node: YamlNode<'_>,
    allowed: impl Fn(&str) -> bool,
    context: &str,
) {
    for (key, _) in node.entries() {
        match key.as_str() {
            Some(name) if allowed(name) => {}
            Some(name) => reporting.report(
                &JSON_SCHEMA_VALIDATION,
                &located(file, key),
                format!("Unknown key '{name}' in {context}"),
            ),
            None => reporting.report(
                &JSON_SCHEMA_VALIDATION,
                &located(file, key),
                format!("Keys in {context} must be strings"),
            ),
        }
    }
}

fn report_duplicate_keys(reporting: &mut Reporting, file: &FileIdentifier, tree: &YamlTree) {
    for key in tree.duplicate_keys() {
        reporting.report(
            &JSON_SCHEMA_VALIDATION,
            &located(file, key),
            format!(
                "Duplicate key '{}'; only the first occurrence is used",
                key.as_str().unwrap_or_default()
            ),
        );
    }
}
