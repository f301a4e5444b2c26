//! Content classification
//!
//! Classification is structural: a root mapping with `jobs` is a workflow,
//! one with `runs` is an action. Everything that cannot be modelled becomes
//! an [`InvalidContent`] value instead of an error.

use thiserror::Error;
use tracing::debug;

use crate::location::{FileIdentifier, Locatable, Location, LocationError};
use crate::parser::{ParseError, YamlNode, YamlTree};

use super::action::Action;
use super::workflow::Workflow;

/// The classified interpretation of one file
#[derive(Debug)]
pub enum Content {
    Workflow(Workflow),
    Action(Action),
    Invalid(InvalidContent),
}

impl Content {
    /// Parse and classify `text`
    pub(crate) fn load(file: &FileIdentifier, text: &str) -> Content {
        let tree = match YamlTree::parse(text) {
            Ok(tree) => tree,
            Err(err) => {
                debug!("YAML load failed for {}: {}", file, err);
                return Content::Invalid(InvalidContent::from_parse_error(file, text, err));
            }
        };

        let Some(root) = tree.root() else {
            return Content::Invalid(InvalidContent::new(
                ContentError::Unrecognized {
                    message: "file contains no YAML document".to_string(),
                },
                Location::whole_file(file.clone(), text),
            ));
        };
        if !root.is_mapping() {
            return Content::Invalid(InvalidContent::new(
                ContentError::Unrecognized {
                    message: "root node must be a mapping".to_string(),
                },
                root.location(file),
            ));
        }

        let root_id = root.id();
        if root.contains_key("jobs") {
            match Workflow::build(file.clone(), tree, root_id) {
                Ok(workflow) => Content::Workflow(workflow),
                Err(invalid) => Content::Invalid(invalid),
            }
        } else if root.contains_key("runs") {
            match Action::build(file.clone(), tree, root_id) {
                Ok(action) => Content::Action(action),
                Err(invalid) => Content::Invalid(invalid),
            }
        } else {
            let location = root.location(file);
            Content::Invalid(InvalidContent::new(
                ContentError::Unrecognized {
                    message: "expected a workflow ('jobs') or an action ('runs')".to_string(),
                },
                location,
            ))
        }
    }

    /// Location of the whole content (root node, or the invalid region)
    pub fn location(&self) -> Location {
        match self {
            Content::Workflow(workflow) => workflow.location(),
            Content::Action(action) => action.location(),
            Content::Invalid(invalid) => invalid.location(),
        }
    }

    pub fn as_workflow(&self) -> Option<&Workflow> {
        match self {
            Content::Workflow(workflow) => Some(workflow),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Content::Action(action) => Some(action),
            _ => None,
        }
    }

    pub fn as_invalid(&self) -> Option<&InvalidContent> {
        match self {
            Content::Invalid(invalid) => Some(invalid),
            _ => None,
        }
    }
}

impl Locatable for Content {
    fn location(&self) -> Location {
        Content::location(self)
    }
}

/// Why a file could not be modelled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// The text is not well-formed YAML
    #[error("invalid YAML syntax: {message} at line {line} column {column}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// Well-formed YAML with a wrongly shaped or typed node
    #[error("{message}")]
    Semantic { message: String },

    /// Neither a workflow nor an action
    #[error("unrecognized file: {message}")]
    Unrecognized { message: String },

    /// A node position could not be derived
    #[error("cannot locate node: {0}")]
    Location(LocationError),
}

/// A file that could not be classified, with the error that caused it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidContent {
    error: ContentError,
    location: Location,
}

impl InvalidContent {
    pub fn new(error: ContentError, location: Location) -> Self {
        Self { error, location }
    }

    /// A semantic error located at `node`
    pub(crate) fn semantic(
        file: &FileIdentifier,
        node: YamlNode<'_>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            ContentError::Semantic {
                message: message.into(),
            },
            node.location(file),
        )
    }

    fn from_parse_error(file: &FileIdentifier, text: &str, err: ParseError) -> Self {
        let error = match err {
            ParseError::Syntax {
                message,
                line,
                column,
            } => ContentError::Syntax {
                message,
                line,
                column,
            },
            ParseError::Location(err) => ContentError::Location(err),
        };
        Self::new(error, Location::whole_file(file.clone(), text))
    }

    pub fn error(&self) -> &ContentError {
        &self.error
    }

    pub fn location(&self) -> Location {
        self.location.clone()
    }
}

impl Locatable for InvalidContent {
    fn location(&self) -> Location {
        InvalidContent::location(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Position;
    use assert_matches::assert_matches;

    fn load(text: &str) -> Content {
        Content::load(&FileIdentifier::new("test.yml"), text)
    }

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column).unwrap()
    }

    #[test]
    fn test_workflow_is_recognized() {
        assert_matches!(load("on: push\njobs: {}\n"), Content::Workflow(_));
    }

    #[test]
    fn test_action_is_recognized() {
        let text = "name: A\ndescription: d\nruns:\n  using: node20\n  main: index.js\n";
        assert_matches!(load(text), Content::Action(_));
    }

    #[test]
    fn test_syntax_error_spans_whole_file() {
        let content = load("x: *");
        let invalid = content.as_invalid().expect("should be invalid");
        assert_matches!(invalid.error(), ContentError::Syntax { line: 1, .. });
        assert_eq!(invalid.location().start(), pos(1, 1));
        assert_eq!(invalid.location().end(), pos(1, 5));
    }

    #[test]
    fn test_unrecognized_mapping() {
        let content = load("key: value\n");
        let invalid = content.as_invalid().expect("should be invalid");
        assert_matches!(invalid.error(), ContentError::Unrecognized { .. });
        assert_eq!(invalid.location().start(), pos(1, 1));
        assert_eq!(invalid.location().end(), pos(1, 11));
    }

    #[test]
    fn test_non_mapping_root() {
        let content = load("- item1\n- item2");
        assert_matches!(
            content.as_invalid().map(|i| i.error()),
            Some(ContentError::Unrecognized { .. })
        );
    }

    #[test]
    fn test_empty_file() {
        let content = load("");
        let invalid = content.as_invalid().expect("should be invalid");
        assert_matches!(invalid.error(), ContentError::Unrecognized { .. });
        assert_eq!(invalid.location().end(), pos(1, 1));
    }

    #[test]
    fn test_jobs_not_a_mapping_is_semantic() {
        let content = load("on: push\njobs:\n  - build\n");
        let invalid = content.as_invalid().expect("should be invalid");
        assert_matches!(invalid.error(), ContentError::Semantic { .. });
        assert_eq!(invalid.location().start(), pos(3, 3));
    }

    #[test]
    fn test_step_without_run_or_uses_is_semantic() {
        let text = "on: push\njobs:\n  build:\n    runs-on: x\n    steps:\n      - name: nothing\n";
        let content = load(text);
        let invalid = content.as_invalid().expect("should be invalid");
        assert_eq!(
            invalid.error(),
            &ContentError::Semantic {
                message: "step 0 has neither 'run' nor 'uses'".to_string()
            }
        );
        assert_eq!(invalid.location().start(), pos(6, 9));
    }

    #[test]
    fn test_content_location_matches_root() {
        let content = load("on: push\njobs: {}");
        assert_eq!(content.location().start(), pos(1, 1));
        assert_eq!(content.location().end(), pos(2, 9));
    }
}
