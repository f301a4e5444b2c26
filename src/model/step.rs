//! Step classification shared by workflows and composite actions

use crate::location::FileIdentifier;
use crate::parser::{NodeId, YamlNode};

use super::content::InvalidContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepKind {
    Run,
    Uses,
}

/// Arena entry for one step
#[derive(Debug, Clone)]
pub(crate) struct StepSlot {
    /// Index of the owning job slot (always 0 for action steps)
    pub(crate) owner: usize,
    /// 0-based position in the owner's `steps` sequence
    pub(crate) index: usize,
    pub(crate) node: NodeId,
    pub(crate) kind: StepKind,
}

/// Classify every item of a `steps` sequence, appending to `slots`.
///
/// A missing or null `steps` yields no steps; anything else that is not a
/// sequence of mappings with exactly one of `run` / `uses` is invalid.
pub(crate) fn classify_steps(
    file: &FileIdentifier,
    steps: Option<YamlNode<'_>>,
    owner: usize,
    slots: &mut Vec<StepSlot>,
) -> Result<(), InvalidContent> {
    let Some(steps) = steps.filter(|n| !n.is_null()) else {
        return Ok(());
    };
    if !steps.is_sequence() {
        return Err(InvalidContent::semantic(
            file,
            steps,
            "'steps' must be a sequence",
        ));
    }
    for (index, step) in steps.items().enumerate() {
        let kind = classify_step(file, step, index)?;
        slots.push(StepSlot {
            owner,
            index,
            node: step.id(),
            kind,
        });
    }
    Ok(())
}

fn classify_step(
    file: &FileIdentifier,
    step: YamlNode<'_>,
    index: usize,
) -> Result<StepKind, InvalidContent> {
    if !step.is_mapping() {
        return Err(InvalidContent::semantic(
            file,
            step,
            format!("step {index} must be a mapping"),
        ));
    }
    match (step.contains_key("run"), step.contains_key("uses")) {
        (true, false) => Ok(StepKind::Run),
        (false, true) => Ok(StepKind::Uses),
        (true, true) => Err(InvalidContent::semantic(
            file,
            step,
            format!("step {index} has both 'run' and 'uses'"),
        )),
        (false, false) => Err(InvalidContent::semantic(
            file,
            step,
            format!("step {index} has neither 'run' nor 'uses'"),
        )),
    }
}

/// Values of a `defaults.run` block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub shell: Option<String>,
    pub working_directory: Option<String>,
}

impl Defaults {
    /// Read `defaults.run` from a workflow or job node
    pub(crate) fn from_parent(node: YamlNode<'_>) -> Option<Self> {
        let run = node.get("defaults")?.get("run")?;
        Some(Self {
            shell: run.get("shell").and_then(|n| n.as_str()).map(str::to_string),
            working_directory: run
                .get("working-directory")
                .and_then(|n| n.as_str())
                .map(str::to_string),
        })
    }
}
