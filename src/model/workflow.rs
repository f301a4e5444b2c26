//! Workflow files: jobs and steps

use std::collections::BTreeMap;
use std::ops::Range;

use crate::location::{FileIdentifier, Locatable, Location};
use crate::parser::{NodeId, YamlNode, YamlTree};

use super::content::InvalidContent;
use super::step::{classify_steps, Defaults, StepKind, StepSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    Normal,
    ReusableWorkflowCall,
}

/// Arena entry for one job
#[derive(Debug, Clone)]
struct JobSlot {
    id: String,
    node: NodeId,
    kind: JobKind,
    /// Range of this job's entries in `Workflow::steps`
    steps: Range<usize>,
}

/// A workflow definition (`.github/workflows/*.yml`)
#[derive(Debug)]
pub struct Workflow {
    file: FileIdentifier,
    tree: YamlTree,
    root: NodeId,
    jobs: Vec<JobSlot>,
    steps: Vec<StepSlot>,
}

impl Workflow {
    /// Classify every job and step of a tree whose root has a `jobs` key
    pub(crate) fn build(
        file: FileIdentifier,
        tree: YamlTree,
        root: NodeId,
    ) -> Result<Workflow, InvalidContent> {
        let (jobs, steps) = classify_jobs(&file, tree.node(root))?;
        Ok(Workflow {
            file,
            tree,
            root,
            jobs,
            steps,
        })
    }

    /// Identifier of the file this workflow was read from
    pub fn file(&self) -> &FileIdentifier {
        &self.file
    }

    pub fn tree(&self) -> &YamlTree {
        &self.tree
    }

    /// The root mapping
    pub fn node(&self) -> YamlNode<'_> {
        self.tree.node(self.root)
    }

    pub fn name(&self) -> Option<&str> {
        self.node().get("name").and_then(|n| n.as_str())
    }

    /// The `on` trigger node
    pub fn on(&self) -> Option<YamlNode<'_>> {
        self.node().get("on")
    }

    pub fn env(&self) -> Option<BTreeMap<String, String>> {
        self.node().get("env").and_then(|n| n.string_map())
    }

    /// Scoped permissions; `None` when absent or written as a single scalar
    pub fn permissions(&self) -> Option<BTreeMap<String, String>> {
        self.node().get("permissions").and_then(|n| n.string_map())
    }

    /// Whether a `permissions` key is present in any form
    pub fn has_permissions(&self) -> bool {
        self.node().contains_key("permissions")
    }

    pub fn defaults(&self) -> Option<Defaults> {
        Defaults::from_parent(self.node())
    }

    /// Jobs in the order they are declared
    pub fn jobs(&self) -> impl Iterator<Item = Job<'_>> + '_ {
        (0..self.jobs.len()).map(move |slot| Job::at(self, slot))
    }

    /// The job with the given id
    pub fn job(&self, id: &str) -> Option<Job<'_>> {
        self.jobs
            .iter()
            .position(|job| job.id == id)
            .map(|slot| Job::at(self, slot))
    }

    pub fn location(&self) -> Location {
        self.node().location(&self.file)
    }
}

impl Locatable for Workflow {
    fn location(&self) -> Location {
        Workflow::location(self)
    }
}

fn classify_jobs(
    file: &FileIdentifier,
    root: YamlNode<'_>,
) -> Result<(Vec<JobSlot>, Vec<StepSlot>), InvalidContent> {
    let mut jobs: Vec<JobSlot> = Vec::new();
    let mut steps = Vec::new();

    let Some(jobs_node) = root.get("jobs") else {
        return Ok((jobs, steps));
    };
    if !jobs_node.is_mapping() {
        let located = if jobs_node.is_null() {
            root.key("jobs").unwrap_or(jobs_node)
        } else {
            jobs_node
        };
        return Err(InvalidContent::semantic(
            file,
            located,
            "'jobs' must be a mapping of job ids to jobs",
        ));
    }

    for (key, job) in jobs_node.entries() {
        let Some(id) = key.as_str() else {
            return Err(InvalidContent::semantic(file, key, "job id must be a string"));
        };
        if jobs.iter().any(|existing| existing.id == id) {
            // Repeated ids are reported by the schema rule; the first declaration wins
            continue;
        }
        if !job.is_mapping() {
            let located = if job.is_null() { key } else { job };
            return Err(InvalidContent::semantic(
                file,
                located,
                format!("job '{id}' must be a mapping"),
            ));
        }

        let slot = jobs.len();
        let is_call = job.contains_key("uses")
            && !job.contains_key("runs-on")
            && !job.contains_key("steps");
        let first_step = steps.len();
        let kind = if is_call {
            JobKind::ReusableWorkflowCall
        } else {
            classify_steps(file, job.get("steps"), slot, &mut steps)?;
            JobKind::Normal
        };
        jobs.push(JobSlot {
            id: id.to_string(),
            node: job.id(),
            kind,
            steps: first_step..steps.len(),
        });
    }
    Ok((jobs, steps))
}

/// A job of a workflow
#[derive(Debug, Clone, Copy)]
pub enum Job<'a> {
    /// A job with `runs-on` and `steps`
    Normal(NormalJob<'a>),
    /// A job calling another workflow via `uses`
    ReusableWorkflowCall(ReusableWorkflowCallJob<'a>),
}

impl<'a> Job<'a> {
    fn at(workflow: &'a Workflow, slot: usize) -> Self {
        match workflow.jobs[slot].kind {
            JobKind::Normal => Job::Normal(NormalJob { workflow, slot }),
            JobKind::ReusableWorkflowCall => {
                Job::ReusableWorkflowCall(ReusableWorkflowCallJob { workflow, slot })
            }
        }
    }

    pub fn workflow(&self) -> &'a Workflow {
        match self {
            Job::Normal(job) => job.workflow(),
            Job::ReusableWorkflowCall(job) => job.workflow(),
        }
    }

    /// The job's key in the `jobs` mapping
    pub fn id(&self) -> &'a str {
        match self {
            Job::Normal(job) => job.id(),
            Job::ReusableWorkflowCall(job) => job.id(),
        }
    }

    pub fn node(&self) -> YamlNode<'a> {
        match self {
            Job::Normal(job) => job.node(),
            Job::ReusableWorkflowCall(job) => job.node(),
        }
    }
}

/// A job that runs its own steps
#[derive(Debug, Clone, Copy)]
pub struct NormalJob<'a> {
    workflow: &'a Workflow,
    slot: usize,
}

impl<'a> NormalJob<'a> {
    fn slot(&self) -> &'a JobSlot {
        &self.workflow.jobs[self.slot]
    }

    pub fn workflow(&self) -> &'a Workflow {
        self.workflow
    }

    pub fn id(&self) -> &'a str {
        &self.slot().id
    }

    pub fn node(&self) -> YamlNode<'a> {
        self.workflow.tree.node(self.slot().node)
    }

    /// Steps in sequence order
    pub fn steps(&self) -> impl Iterator<Item = Step<'a>> + 'a {
        let workflow = self.workflow;
        self.slot().steps.clone().map(move |slot| Step::at(workflow, slot))
    }

    /// Step at a 0-based position
    pub fn step(&self, index: usize) -> Option<Step<'a>> {
        self.steps().nth(index)
    }

    pub fn defaults(&self) -> Option<Defaults> {
        Defaults::from_parent(self.node())
    }

    pub fn timeout_minutes(&self) -> Option<u32> {
        self.node()
            .get("timeout-minutes")
            .and_then(|n| n.as_str())
            .and_then(|value| value.trim().parse().ok())
    }

    /// Whether `timeout-minutes` is present, including expression values
    pub fn has_timeout(&self) -> bool {
        self.node().contains_key("timeout-minutes")
    }

    /// The `runs-on` node
    pub fn runs_on(&self) -> Option<YamlNode<'a>> {
        self.node().get("runs-on")
    }
}

/// A job calling a reusable workflow
#[derive(Debug, Clone, Copy)]
pub struct ReusableWorkflowCallJob<'a> {
    workflow: &'a Workflow,
    slot: usize,
}

impl<'a> ReusableWorkflowCallJob<'a> {
    fn slot(&self) -> &'a JobSlot {
        &self.workflow.jobs[self.slot]
    }

    pub fn workflow(&self) -> &'a Workflow {
        self.workflow
    }

    pub fn id(&self) -> &'a str {
        &self.slot().id
    }

    pub fn node(&self) -> YamlNode<'a> {
        self.workflow.tree.node(self.slot().node)
    }

    /// The called workflow reference
    pub fn uses(&self) -> &'a str {
        self.node()
            .get("uses")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
    }

    pub fn with(&self) -> Option<BTreeMap<String, String>> {
        self.node().get("with").and_then(|n| n.string_map())
    }

    /// The `secrets` node (`inherit` or a mapping)
    pub fn secrets(&self) -> Option<YamlNode<'a>> {
        self.node().get("secrets")
    }
}

job_accessors!(Job, NormalJob, ReusableWorkflowCallJob);

/// A step of a normal job
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    Run(RunStep<'a>),
    Uses(UsesStep<'a>),
}

impl<'a> Step<'a> {
    fn at(workflow: &'a Workflow, slot: usize) -> Self {
        match workflow.steps[slot].kind {
            StepKind::Run => Step::Run(RunStep { workflow, slot }),
            StepKind::Uses => Step::Uses(UsesStep { workflow, slot }),
        }
    }

    /// The job this step belongs to
    pub fn job(&self) -> NormalJob<'a> {
        match self {
            Step::Run(step) => step.job(),
            Step::Uses(step) => step.job(),
        }
    }

    /// 0-based position in the job's steps
    pub fn index(&self) -> usize {
        match self {
            Step::Run(step) => step.index(),
            Step::Uses(step) => step.index(),
        }
    }

    pub fn node(&self) -> YamlNode<'a> {
        match self {
            Step::Run(step) => step.node(),
            Step::Uses(step) => step.node(),
        }
    }

    fn file(&self) -> &'a FileIdentifier {
        &self.job().workflow().file
    }
}

/// Generates the parent/index/node plumbing of a workflow step view
macro_rules! workflow_step_view {
    ($ty:ident) => {
        impl<'a> $ty<'a> {
            fn slot(&self) -> &'a StepSlot {
                &self.workflow.steps[self.slot]
            }

            /// The job this step belongs to
            pub fn job(&self) -> NormalJob<'a> {
                NormalJob {
                    workflow: self.workflow,
                    slot: self.slot().owner,
                }
            }

            /// 0-based position in the job's steps
            pub fn index(&self) -> usize {
                self.slot().index
            }

            pub fn node(&self) -> YamlNode<'a> {
                self.workflow.tree.node(self.slot().node)
            }

            fn file(&self) -> &'a FileIdentifier {
                &self.workflow.file
            }
        }
    };
}

/// A step running a shell script
#[derive(Debug, Clone, Copy)]
pub struct RunStep<'a> {
    workflow: &'a Workflow,
    slot: usize,
}

workflow_step_view!(RunStep);

impl<'a> RunStep<'a> {
    /// The script body
    pub fn run(&self) -> &'a str {
        self.node()
            .get("run")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
    }

    /// The `run` value node
    pub fn run_node(&self) -> Option<YamlNode<'a>> {
        self.node().get("run")
    }

    pub fn shell(&self) -> Option<&'a str> {
        self.node().get("shell").and_then(|n| n.as_str())
    }

    pub fn working_directory(&self) -> Option<&'a str> {
        self.node()
            .get("working-directory")
            .and_then(|n| n.as_str())
    }
}

/// A step invoking an action
#[derive(Debug, Clone, Copy)]
pub struct UsesStep<'a> {
    workflow: &'a Workflow,
    slot: usize,
}

workflow_step_view!(UsesStep);

impl<'a> UsesStep<'a> {
    /// The action reference (e.g., "actions/checkout@v4")
    pub fn uses(&self) -> &'a str {
        self.node()
            .get("uses")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
    }

    /// Action inputs from `with`
    pub fn with(&self) -> Option<BTreeMap<String, String>> {
        self.node().get("with").and_then(|n| n.string_map())
    }
}

step_accessors!(Step, RunStep, UsesStep);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Content;
    use assert_matches::assert_matches;

    fn workflow(text: &str) -> Workflow {
        match Content::load(&FileIdentifier::new("test.yml"), text) {
            Content::Workflow(workflow) => workflow,
            other => panic!("expected a workflow, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_workflow() {
        let wf = workflow(
            "on: push\njobs:\n  example:\n    runs-on: ubuntu-latest\n    steps:\n      - run: echo \"Example\"",
        );
        let jobs: Vec<_> = wf.jobs().collect();
        assert_eq!(jobs.len(), 1);
        let Job::Normal(job) = jobs[0] else {
            panic!("expected a normal job");
        };
        assert_eq!(job.id(), "example");

        let steps: Vec<_> = job.steps().collect();
        assert_eq!(steps.len(), 1);
        let Step::Run(step) = steps[0] else {
            panic!("expected a run step");
        };
        assert_eq!(step.run(), "echo \"Example\"");
        assert_eq!(step.index(), 0);
        assert_eq!(step.job().id(), "example");
    }

    #[test]
    fn test_jobs_keep_declaration_order() {
        let wf = workflow(
            "on: push\njobs:\n  zeta:\n    runs-on: x\n  alpha:\n    runs-on: x\n  mid:\n    uses: o/r/.github/workflows/w.yml@v1\n",
        );
        let ids: Vec<_> = wf.jobs().map(|j| j.id()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
        assert_matches!(wf.job("mid"), Some(Job::ReusableWorkflowCall(_)));
        assert!(wf.job("missing").is_none());
    }

    #[test]
    fn test_empty_jobs_map() {
        let wf = workflow("on: push\njobs: {}");
        assert_eq!(wf.jobs().count(), 0);
    }

    #[test]
    fn test_reusable_call_needs() {
        let wf = workflow("on: push\njobs:\n  call:\n    uses: reusable/workflow.yml\n");
        let job = wf.job("call").unwrap();
        assert_matches!(job, Job::ReusableWorkflowCall(_));
        assert_eq!(job.needs(), None);

        let wf = workflow(
            "on: push\njobs:\n  call:\n    uses: reusable/workflow.yml\n    needs: [b, a]\n",
        );
        let Some(Job::ReusableWorkflowCall(call)) = wf.job("call") else {
            panic!("expected a reusable workflow call");
        };
        assert_eq!(call.needs(), Some(vec!["b".to_string(), "a".to_string()]));
        assert_eq!(call.uses(), "reusable/workflow.yml");
        assert!(call.secrets().is_none());
    }

    #[test]
    fn test_reusable_call_secrets() {
        let wf = workflow(
            "on: push\njobs:\n  call:\n    uses: o/r/.github/workflows/w.yml@v1\n    secrets: inherit\n",
        );
        let Some(Job::ReusableWorkflowCall(call)) = wf.job("call") else {
            panic!("expected a reusable workflow call");
        };
        assert_eq!(call.secrets().and_then(|s| s.as_str()), Some("inherit"));
    }

    #[test]
    fn test_uses_with_steps_is_normal_job() {
        let wf = workflow(
            "on: push\njobs:\n  odd:\n    uses: x/y@v1\n    steps:\n      - run: echo\n",
        );
        assert_matches!(wf.job("odd"), Some(Job::Normal(_)));
    }

    #[test]
    fn test_step_accessors() {
        let wf = workflow(
            r#"
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    timeout-minutes: 15
    defaults:
      run:
        shell: bash
    steps:
      - uses: actions/checkout@v4
        with:
          fetch-depth: 0
      - name: Test
        id: test
        if: github.event_name == 'push'
        run: cargo test
        shell: bash
        working-directory: crates
        env:
          RUST_LOG: debug
"#,
        );
        let Some(Job::Normal(job)) = wf.job("build") else {
            panic!("expected a normal job");
        };
        assert_eq!(job.timeout_minutes(), Some(15));
        assert_eq!(
            job.defaults().and_then(|d| d.shell),
            Some("bash".to_string())
        );

        let Some(Step::Uses(checkout)) = job.step(0) else {
            panic!("expected a uses step");
        };
        assert_eq!(checkout.uses(), "actions/checkout@v4");
        assert_eq!(
            checkout.with().and_then(|w| w.get("fetch-depth").cloned()),
            Some("0".to_string())
        );

        let Some(Step::Run(test)) = job.step(1) else {
            panic!("expected a run step");
        };
        assert_eq!(test.index(), 1);
        assert_eq!(test.name(), Some("Test"));
        assert_eq!(test.id(), Some("test"));
        assert_eq!(test.condition(), Some("github.event_name == 'push'"));
        assert_eq!(test.shell(), Some("bash"));
        assert_eq!(test.working_directory(), Some("crates"));
        assert_eq!(
            test.env().and_then(|e| e.get("RUST_LOG").cloned()),
            Some("debug".to_string())
        );
    }

    #[test]
    fn test_workflow_level_accessors() {
        let wf = workflow(
            "name: CI\non: [push]\nenv:\n  A: '1'\npermissions:\n  contents: read\njobs: {}\n",
        );
        assert_eq!(wf.name(), Some("CI"));
        assert!(wf.on().map_or(false, |on| on.is_sequence()));
        assert_eq!(wf.env().map(|e| e.len()), Some(1));
        assert_eq!(
            wf.permissions().and_then(|p| p.get("contents").cloned()),
            Some("read".to_string())
        );
        assert!(wf.has_permissions());
    }

    #[test]
    fn test_scalar_permissions() {
        let wf = workflow("on: push\npermissions: read-all\njobs:\n  a:\n    runs-on: x\n");
        assert!(wf.has_permissions());
        assert!(wf.permissions().is_none());
    }

    #[test]
    fn test_entity_locations() {
        let wf = workflow("on: push\njobs:\n  a:\n    runs-on: x\n    steps:\n      - run: one\n");
        let job = wf.job("a").unwrap();
        assert_eq!(job.location().start().to_string(), "4:5");
        let Job::Normal(job) = job else {
            panic!("expected a normal job");
        };
        let step = job.step(0).unwrap();
        assert_eq!(step.location().start().to_string(), "6:9");
        assert_eq!(step.location().end().to_string(), "6:17");
    }

    #[test]
    fn test_duplicate_job_ids_keep_first() {
        let wf = workflow("on: push\njobs:\n  a:\n    runs-on: first\n  a:\n    runs-on: second\n");
        assert_eq!(wf.jobs().count(), 1);
        let Some(Job::Normal(job)) = wf.job("a") else {
            panic!("expected a normal job");
        };
        assert_eq!(job.runs_on().and_then(|n| n.as_str()), Some("first"));
    }
}
