//! Typed object model for workflow and action files
//!
//! A [`File`] lazily classifies its YAML into a [`Content`]: a [`Workflow`],
//! an [`Action`] or an [`InvalidContent`]. Jobs and steps are lightweight
//! views holding a borrow of their root plus an index into its arena, so
//! parent navigation is O(1) and every accessor reads the node tree directly.

/// Accessors shared by every step kind, workflow and action alike.
///
/// The target type must provide `node()` and `file()`.
macro_rules! step_accessors {
    ($($ty:ident),+ $(,)?) => {$(
        impl<'a> $ty<'a> {
            /// Value of the step's `name` key
            pub fn name(&self) -> Option<&'a str> {
                self.node().get("name").and_then(|n| n.as_str())
            }

            /// Value of the step's `id` key
            pub fn id(&self) -> Option<&'a str> {
                self.node().get("id").and_then(|n| n.as_str())
            }

            /// The step's `if` condition
            pub fn condition(&self) -> Option<&'a str> {
                self.node().get("if").and_then(|n| n.as_str())
            }

            pub fn env(&self) -> Option<::std::collections::BTreeMap<String, String>> {
                self.node().get("env").and_then(|n| n.string_map())
            }

            pub fn location(&self) -> $crate::location::Location {
                self.node().location(self.file())
            }
        }

        impl $crate::location::Locatable for $ty<'_> {
            fn location(&self) -> $crate::location::Location {
                $ty::location(self)
            }
        }
    )+};
}

/// Accessors shared by both job kinds.
///
/// The target type must provide `node()` and `workflow()`.
macro_rules! job_accessors {
    ($($ty:ident),+ $(,)?) => {$(
        impl<'a> $ty<'a> {
            /// Value of the job's `name` key
            pub fn name(&self) -> Option<&'a str> {
                self.node().get("name").and_then(|n| n.as_str())
            }

            pub fn env(&self) -> Option<::std::collections::BTreeMap<String, String>> {
                self.node().get("env").and_then(|n| n.string_map())
            }

            /// Scoped permissions; `None` when absent or written as a single scalar
            pub fn permissions(&self) -> Option<::std::collections::BTreeMap<String, String>> {
                self.node().get("permissions").and_then(|n| n.string_map())
            }

            /// Whether a `permissions` key is present in any form
            pub fn has_permissions(&self) -> bool {
                self.node().contains_key("permissions")
            }

            /// The job's `if` condition
            pub fn condition(&self) -> Option<&'a str> {
                self.node().get("if").and_then(|n| n.as_str())
            }

            /// Job ids from `needs`, in declaration order
            pub fn needs(&self) -> Option<Vec<String>> {
                self.node().get("needs").and_then(|n| n.string_list())
            }

            pub fn location(&self) -> $crate::location::Location {
                self.node().location(self.workflow().file())
            }
        }

        impl $crate::location::Locatable for $ty<'_> {
            fn location(&self) -> $crate::location::Location {
                $ty::location(self)
            }
        }
    )+};
}

mod action;
mod content;
mod file;
mod step;
mod workflow;

pub use action::{
    Action, ActionStep, CompositeRuns, DockerRuns, JavaScriptRuns, RunActionStep, Runs,
    UsesActionStep,
};
pub use content::{Content, ContentError, InvalidContent};
pub use file::{File, RawFile};
pub use step::Defaults;
pub use workflow::{
    Job, NormalJob, ReusableWorkflowCallJob, RunStep, Step, UsesStep, Workflow,
};
