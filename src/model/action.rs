//! Action definition files (`action.yml`)

use std::collections::BTreeMap;

use crate::location::{FileIdentifier, Locatable, Location};
use crate::parser::{NodeId, YamlNode, YamlTree};

use super::content::InvalidContent;
use super::step::{classify_steps, StepKind, StepSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunsKind {
    Composite,
    JavaScript,
    Docker,
}

/// An action definition: composite, JavaScript or Docker
#[derive(Debug)]
pub struct Action {
    file: FileIdentifier,
    tree: YamlTree,
    root: NodeId,
    runs: NodeId,
    kind: RunsKind,
    steps: Vec<StepSlot>,
}

impl Action {
    /// Classify the `runs` block of a tree whose root has a `runs` key
    pub(crate) fn build(
        file: FileIdentifier,
        tree: YamlTree,
        root: NodeId,
    ) -> Result<Action, InvalidContent> {
        let (runs, kind, steps) = classify_runs(&file, tree.node(root))?;
        Ok(Action {
            file,
            tree,
            root,
            runs,
            kind,
            steps,
        })
    }

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

    pub fn description(&self) -> Option<&str> {
        self.node().get("description").and_then(|n| n.as_str())
    }

    /// Input ids in declaration order
    pub fn inputs(&self) -> Vec<&str> {
        self.node()
            .get("inputs")
            .map(|n| n.keys().collect())
            .unwrap_or_default()
    }

    /// Output ids in declaration order
    pub fn outputs(&self) -> Vec<&str> {
        self.node()
            .get("outputs")
            .map(|n| n.keys().collect())
            .unwrap_or_default()
    }

    pub fn runs(&self) -> Runs<'_> {
        match self.kind {
            RunsKind::Composite => Runs::Composite(CompositeRuns { action: self }),
            RunsKind::JavaScript => Runs::JavaScript(JavaScriptRuns { action: self }),
            RunsKind::Docker => Runs::Docker(DockerRuns { action: self }),
        }
    }

    pub fn location(&self) -> Location {
        self.node().location(&self.file)
    }

    fn runs_node(&self) -> YamlNode<'_> {
        self.tree.node(self.runs)
    }
}

impl Locatable for Action {
    fn location(&self) -> Location {
        Action::location(self)
    }
}

fn classify_runs(
    file: &FileIdentifier,
    root: YamlNode<'_>,
) -> Result<(NodeId, RunsKind, Vec<StepSlot>), InvalidContent> {
    let mut steps = Vec::new();
    let Some(runs) = root.get("runs") else {
        return Err(InvalidContent::semantic(file, root, "action has no 'runs'"));
    };
    if !runs.is_mapping() {
        let located = if runs.is_null() {
            root.key("runs").unwrap_or(runs)
        } else {
            runs
        };
        return Err(InvalidContent::semantic(file, located, "'runs' must be a mapping"));
    }

    let using = runs.get("using");
    let kind = match using.and_then(|n| n.as_str()) {
        Some("composite") => {
            classify_steps(file, runs.get("steps"), 0, &mut steps)?;
            RunsKind::Composite
        }
        Some("docker") => RunsKind::Docker,
        Some(other) if other.starts_with("node") => RunsKind::JavaScript,
        Some(other) => {
            return Err(InvalidContent::semantic(
                file,
                using.unwrap_or(runs),
                format!("unsupported 'runs.using' value '{other}'"),
            ));
        }
        None => {
            return Err(InvalidContent::semantic(
                file,
                runs,
                "'runs' must declare 'using'",
            ));
        }
    };
    Ok((runs.id(), kind, steps))
}

/// How an action is executed
#[derive(Debug, Clone, Copy)]
pub enum Runs<'a> {
    Composite(CompositeRuns<'a>),
    JavaScript(JavaScriptRuns<'a>),
    Docker(DockerRuns<'a>),
}

impl<'a> Runs<'a> {
    pub fn node(&self) -> YamlNode<'a> {
        self.action().runs_node()
    }

    pub fn action(&self) -> &'a Action {
        match self {
            Runs::Composite(runs) => runs.action,
            Runs::JavaScript(runs) => runs.action,
            Runs::Docker(runs) => runs.action,
        }
    }

    /// Value of `runs.using`
    pub fn using(&self) -> &'a str {
        self.node()
            .get("using")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
    }
}

/// `runs.using: composite`
#[derive(Debug, Clone, Copy)]
pub struct CompositeRuns<'a> {
    action: &'a Action,
}

impl<'a> CompositeRuns<'a> {
    pub fn action(&self) -> &'a Action {
        self.action
    }

    /// Steps in sequence order
    pub fn steps(&self) -> impl Iterator<Item = ActionStep<'a>> + 'a {
        let action = self.action;
        (0..action.steps.len()).map(move |slot| ActionStep::at(action, slot))
    }

    /// Step at a 0-based position
    pub fn step(&self, index: usize) -> Option<ActionStep<'a>> {
        self.steps().nth(index)
    }
}

/// `runs.using: node*`
#[derive(Debug, Clone, Copy)]
pub struct JavaScriptRuns<'a> {
    action: &'a Action,
}

impl<'a> JavaScriptRuns<'a> {
    pub fn action(&self) -> &'a Action {
        self.action
    }

    /// Entry point script
    pub fn main(&self) -> Option<&'a str> {
        self.action.runs_node().get("main").and_then(|n| n.as_str())
    }

    pub fn pre(&self) -> Option<&'a str> {
        self.action.runs_node().get("pre").and_then(|n| n.as_str())
    }

    pub fn post(&self) -> Option<&'a str> {
        self.action.runs_node().get("post").and_then(|n| n.as_str())
    }
}

/// `runs.using: docker`
#[derive(Debug, Clone, Copy)]
pub struct DockerRuns<'a> {
    action: &'a Action,
}

impl<'a> DockerRuns<'a> {
    pub fn action(&self) -> &'a Action {
        self.action
    }

    /// `Dockerfile` or a `docker://` image reference
    pub fn image(&self) -> Option<&'a str> {
        self.action.runs_node().get("image").and_then(|n| n.as_str())
    }

    pub fn args(&self) -> Vec<String> {
        self.action
            .runs_node()
            .get("args")
            .and_then(|n| n.string_list())
            .unwrap_or_default()
    }
}

/// A step of a composite action
#[derive(Debug, Clone, Copy)]
pub enum ActionStep<'a> {
    Run(RunActionStep<'a>),
    Uses(UsesActionStep<'a>),
}

impl<'a> ActionStep<'a> {
    fn at(action: &'a Action, slot: usize) -> Self {
        match action.steps[slot].kind {
            StepKind::Run => ActionStep::Run(RunActionStep { action, slot }),
            StepKind::Uses => ActionStep::Uses(UsesActionStep { action, slot }),
        }
    }

    pub fn action(&self) -> &'a Action {
        match self {
            ActionStep::Run(step) => step.action(),
            ActionStep::Uses(step) => step.action(),
        }
    }

    /// 0-based position in the composite steps
    pub fn index(&self) -> usize {
        match self {
            ActionStep::Run(step) => step.index(),
            ActionStep::Uses(step) => step.index(),
        }
    }

    pub fn node(&self) -> YamlNode<'a> {
        match self {
            ActionStep::Run(step) => step.node(),
            ActionStep::Uses(step) => step.node(),
        }
    }

    fn file(&self) -> &'a FileIdentifier {
        &self.action().file
    }
}

macro_rules! action_step_view {
    ($ty:ident) => {
        impl<'a> $ty<'a> {
            fn slot(&self) -> &'a StepSlot {
                &self.action.steps[self.slot]
            }

            /// The action this step belongs to
            pub fn action(&self) -> &'a Action {
                self.action
            }

            /// 0-based position in the composite steps
            pub fn index(&self) -> usize {
                self.slot().index
            }

            pub fn node(&self) -> YamlNode<'a> {
                self.action.tree.node(self.slot().node)
            }

            fn file(&self) -> &'a FileIdentifier {
                &self.action.file
            }
        }
    };
}

/// A composite step running a shell script
#[derive(Debug, Clone, Copy)]
pub struct RunActionStep<'a> {
    action: &'a Action,
    slot: usize,
}

action_step_view!(RunActionStep);

impl<'a> RunActionStep<'a> {
    pub fn run(&self) -> &'a str {
        self.node()
            .get("run")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
    }

    pub fn run_node(&self) -> Option<YamlNode<'a>> {
        self.node().get("run")
    }

    /// Required for composite run steps
    pub fn shell(&self) -> Option<&'a str> {
        self.node().get("shell").and_then(|n| n.as_str())
    }

    pub fn working_directory(&self) -> Option<&'a str> {
        self.node()
            .get("working-directory")
            .and_then(|n| n.as_str())
    }
}

/// A composite step invoking another action
#[derive(Debug, Clone, Copy)]
pub struct UsesActionStep<'a> {
    action: &'a Action,
    slot: usize,
}

action_step_view!(UsesActionStep);

impl<'a> UsesActionStep<'a> {
    pub fn uses(&self) -> &'a str {
        self.node()
            .get("uses")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
    }

    pub fn with(&self) -> Option<BTreeMap<String, String>> {
        self.node().get("with").and_then(|n| n.string_map())
    }
}

step_accessors!(ActionStep, RunActionStep, UsesActionStep);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Content, ContentError};
    use assert_matches::assert_matches;

    fn load(text: &str) -> Content {
        Content::load(&FileIdentifier::new("action.yml"), text)
    }

    fn action(text: &str) -> Action {
        match load(text) {
            Content::Action(action) => action,
            other => panic!("expected an action, got {other:?}"),
        }
    }

    #[test]
    fn test_composite_action() {
        let action = action(
            r#"
name: Setup
description: Sets things up
inputs:
  version:
    description: Tool version
  cache:
    description: Enable cache
outputs:
  cache-hit:
    description: Whether the cache was restored
    value: ${{ steps.cache.outputs.cache-hit }}
runs:
  using: composite
  steps:
    - uses: actions/setup-node@v4
      with:
        node-version: ${{ inputs.version }}
    - run: npm ci
      shell: bash
"#,
        );
        assert_eq!(action.name(), Some("Setup"));
        assert_eq!(action.description(), Some("Sets things up"));
        assert_eq!(action.inputs(), vec!["version", "cache"]);
        assert_eq!(action.outputs(), vec!["cache-hit"]);

        let Runs::Composite(runs) = action.runs() else {
            panic!("expected composite runs");
        };
        let steps: Vec<_> = runs.steps().collect();
        assert_eq!(steps.len(), 2);
        assert_matches!(steps[0], ActionStep::Uses(_));
        let ActionStep::Run(run) = steps[1] else {
            panic!("expected a run step");
        };
        assert_eq!(run.index(), 1);
        assert_eq!(run.run(), "npm ci");
        assert_eq!(run.shell(), Some("bash"));
        assert_eq!(run.action().name(), Some("Setup"));
    }

    #[test]
    fn test_javascript_action() {
        let action = action("name: A\ndescription: d\nruns:\n  using: node20\n  main: dist/index.js\n  post: dist/cleanup.js\n");
        let runs = action.runs();
        assert_eq!(runs.using(), "node20");
        let Runs::JavaScript(js) = runs else {
            panic!("expected JavaScript runs");
        };
        assert_eq!(js.main(), Some("dist/index.js"));
        assert_eq!(js.pre(), None);
        assert_eq!(js.post(), Some("dist/cleanup.js"));
        assert!(action.outputs().is_empty());
    }

    #[test]
    fn test_docker_action() {
        let action = action(
            "name: A\ndescription: d\nruns:\n  using: docker\n  image: Dockerfile\n  args: [a, b]\n",
        );
        let Runs::Docker(docker) = action.runs() else {
            panic!("expected Docker runs");
        };
        assert_eq!(docker.image(), Some("Dockerfile"));
        assert_eq!(docker.args(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_unknown_using_is_semantic_error() {
        let content = load("name: A\ndescription: d\nruns:\n  using: python\n");
        let invalid = content.as_invalid().expect("should be invalid");
        assert_eq!(
            invalid.error(),
            &ContentError::Semantic {
                message: "unsupported 'runs.using' value 'python'".to_string()
            }
        );
        assert_eq!(invalid.location().start().to_string(), "4:10");
    }

    #[test]
    fn test_runs_not_a_mapping() {
        let content = load("name: A\nruns: composite\n");
        assert_matches!(
            content.as_invalid().map(|i| i.error()),
            Some(ContentError::Semantic { .. })
        );
    }
}
