//! Traversal of the object model
//!
//! [`walk`] owns the traversal order; a [`Visitor`] only overrides the hooks
//! it cares about. Every hook defaults to doing nothing, and overriding one
//! never stops the walk from reaching the children.
//!
//! Order: file, then content. For a workflow, each job in declaration order
//! (`visit_job` then the kind-specific hook), and for normal jobs each step
//! in sequence order (`visit_step` then the kind-specific hook). For an
//! action, its `runs` block, then each composite step likewise.

use crate::model::{
    Action, ActionStep, Content, File, InvalidContent, Job, NormalJob, ReusableWorkflowCallJob,
    Runs, RunActionStep, RunStep, Step, UsesActionStep, UsesStep, Workflow,
};
use crate::rule::{Finding, Reporting, Rule};

#[allow(unused_variables)]
pub trait Visitor {
    fn visit_file(&mut self, reporting: &mut Reporting, file: &File) {}

    fn visit_invalid_content(&mut self, reporting: &mut Reporting, content: &InvalidContent) {}

    fn visit_workflow(&mut self, reporting: &mut Reporting, workflow: &Workflow) {}

    fn visit_job(&mut self, reporting: &mut Reporting, job: Job<'_>) {}

    fn visit_normal_job(&mut self, reporting: &mut Reporting, job: NormalJob<'_>) {}

    fn visit_reusable_workflow_call_job(
        &mut self,
        reporting: &mut Reporting,
        job: ReusableWorkflowCallJob<'_>,
    ) {
    }

    fn visit_step(&mut self, reporting: &mut Reporting, step: Step<'_>) {}

    fn visit_run_step(&mut self, reporting: &mut Reporting, step: RunStep<'_>) {}

    fn visit_uses_step(&mut self, reporting: &mut Reporting, step: UsesStep<'_>) {}

    fn visit_action(&mut self, reporting: &mut Reporting, action: &Action) {}

    fn visit_runs(&mut self, reporting: &mut Reporting, runs: Runs<'_>) {}

    fn visit_action_step(&mut self, reporting: &mut Reporting, step: ActionStep<'_>) {}

    fn visit_run_action_step(&mut self, reporting: &mut Reporting, step: RunActionStep<'_>) {}

    fn visit_uses_action_step(&mut self, reporting: &mut Reporting, step: UsesActionStep<'_>) {}
}

/// Visit `file` and everything it contains
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, reporting: &mut Reporting, file: &File) {
    visitor.visit_file(reporting, file);
    match file.content() {
        Content::Workflow(workflow) => walk_workflow(visitor, reporting, workflow),
        Content::Action(action) => walk_action(visitor, reporting, action),
        Content::Invalid(invalid) => visitor.visit_invalid_content(reporting, invalid),
    }
}

fn walk_workflow<V: Visitor + ?Sized>(
    visitor: &mut V,
    reporting: &mut Reporting,
    workflow: &Workflow,
) {
    visitor.visit_workflow(reporting, workflow);
    for job in workflow.jobs() {
        visitor.visit_job(reporting, job);
        match job {
            Job::Normal(job) => {
                visitor.visit_normal_job(reporting, job);
                for step in job.steps() {
                    walk_step(visitor, reporting, step);
                }
            }
            Job::ReusableWorkflowCall(job) => {
                visitor.visit_reusable_workflow_call_job(reporting, job);
            }
        }
    }
}

fn walk_step<V: Visitor + ?Sized>(visitor: &mut V, reporting: &mut Reporting, step: Step<'_>) {
    visitor.visit_step(reporting, step);
    match step {
        Step::Run(step) => visitor.visit_run_step(reporting, step),
        Step::Uses(step) => visitor.visit_uses_step(reporting, step),
    }
}

fn walk_action<V: Visitor + ?Sized>(visitor: &mut V, reporting: &mut Reporting, action: &Action) {
    visitor.visit_action(reporting, action);
    let runs = action.runs();
    visitor.visit_runs(reporting, runs);
    let Runs::Composite(runs) = runs else {
        return;
    };
    for step in runs.steps() {
        visitor.visit_action_step(reporting, step);
        match step {
            ActionStep::Run(step) => visitor.visit_run_action_step(reporting, step),
            ActionStep::Uses(step) => visitor.visit_uses_action_step(reporting, step),
        }
    }
}

/// Run a visitor-based rule over `file` and collect what it reports
pub fn check<R: Visitor + Rule>(rule: &mut R, file: &File) -> Vec<Finding> {
    let mut reporting = Reporting::new(rule.name());
    walk(rule, &mut reporting, file);
    reporting.into_findings()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawFile;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Visitor for Recorder {
        fn visit_file(&mut self, _: &mut Reporting, file: &File) {
            self.events.push(format!("file {}", file.path()));
        }

        fn visit_invalid_content(&mut self, _: &mut Reporting, _: &InvalidContent) {
            self.events.push("invalid".to_string());
        }

        fn visit_workflow(&mut self, _: &mut Reporting, _: &Workflow) {
            self.events.push("workflow".to_string());
        }

        fn visit_job(&mut self, _: &mut Reporting, job: Job<'_>) {
            self.events.push(format!("job {}", job.id()));
        }

        fn visit_normal_job(&mut self, _: &mut Reporting, job: NormalJob<'_>) {
            self.events.push(format!("normal {}", job.id()));
        }

        fn visit_reusable_workflow_call_job(
            &mut self,
            _: &mut Reporting,
            job: ReusableWorkflowCallJob<'_>,
        ) {
            self.events.push(format!("reusable {}", job.id()));
        }

        fn visit_step(&mut self, _: &mut Reporting, step: Step<'_>) {
            self.events
                .push(format!("step {}/{}", step.job().id(), step.index()));
        }

        fn visit_run_step(&mut self, _: &mut Reporting, step: RunStep<'_>) {
            self.events.push(format!("run {}", step.run()));
        }

        fn visit_uses_step(&mut self, _: &mut Reporting, step: UsesStep<'_>) {
            self.events.push(format!("uses {}", step.uses()));
        }

        fn visit_action(&mut self, _: &mut Reporting, action: &Action) {
            self.events
                .push(format!("action {}", action.name().unwrap_or_default()));
        }

        fn visit_runs(&mut self, _: &mut Reporting, runs: Runs<'_>) {
            self.events.push(format!("runs {}", runs.using()));
        }

        fn visit_action_step(&mut self, _: &mut Reporting, step: ActionStep<'_>) {
            self.events.push(format!("action step {}", step.index()));
        }

        fn visit_run_action_step(&mut self, _: &mut Reporting, step: RunActionStep<'_>) {
            self.events.push(format!("run {}", step.run()));
        }

        fn visit_uses_action_step(&mut self, _: &mut Reporting, step: UsesActionStep<'_>) {
            self.events.push(format!("uses {}", step.uses()));
        }
    }

    fn record(path: &str, text: &str) -> Vec<String> {
        let file = File::new(RawFile::new(path, text));
        let mut recorder = Recorder::default();
        let mut reporting = Reporting::new("Recorder");
        walk(&mut recorder, &mut reporting, &file);
        recorder.events
    }

    #[test]
    fn test_workflow_order() {
        let events = record(
            "ci.yml",
            r#"
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - run: make
  deploy:
    uses: org/repo/.github/workflows/deploy.yml@main
"#,
        );
        assert_eq!(
            events,
            vec![
                "file ci.yml",
                "workflow",
                "job build",
                "normal build",
                "step build/0",
                "uses actions/checkout@v4",
                "step build/1",
                "run make",
                "job deploy",
                "reusable deploy",
            ]
        );
    }

    #[test]
    fn test_every_step_of_every_job_is_visited() {
        let mut text = String::from("on: push\njobs:\n");
        for job in 0..3 {
            text.push_str(&format!("  job{job}:\n    runs-on: x\n    steps:\n"));
            for step in 0..4 {
                text.push_str(&format!("      - run: echo {job}-{step}\n"));
            }
        }

        let events = record("grid.yml", &text);
        let steps: Vec<_> = events.iter().filter(|e| e.starts_with("step ")).collect();
        assert_eq!(steps.len(), 12);
        for job in 0..3 {
            for step in 0..4 {
                let expected = format!("step job{job}/{step}");
                assert!(steps.iter().any(|e| **e == expected), "missing {expected}");
            }
        }
    }

    #[test]
    fn test_composite_action_steps() {
        let events = record(
            "action.yml",
            r#"
name: Setup
description: d
runs:
  using: composite
  steps:
    - run: ./setup.sh
      shell: bash
    - uses: actions/cache@v4
"#,
        );
        assert_eq!(
            events,
            vec![
                "file action.yml",
                "action Setup",
                "runs composite",
                "action step 0",
                "run ./setup.sh",
                "action step 1",
                "uses actions/cache@v4",
            ]
        );
    }

    #[test]
    fn test_javascript_action_has_no_steps() {
        let events = record(
            "action.yml",
            "name: A\ndescription: d\nruns:\n  using: node20\n  main: index.js\n",
        );
        assert_eq!(events, vec!["file action.yml", "action A", "runs node20"]);
    }

    #[test]
    fn test_docker_action_runs_is_visited() {
        let events = record(
            "action.yml",
            "name: D\ndescription: d\nruns:\n  using: docker\n  image: Dockerfile\n",
        );
        assert_eq!(events, vec!["file action.yml", "action D", "runs docker"]);
    }

    #[test]
    fn test_invalid_content() {
        let events = record("broken.yml", "x: *");
        assert_eq!(events, vec!["file broken.yml", "invalid"]);
    }
}
