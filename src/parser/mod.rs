//! Parser module for YAML loading and expression handling

pub mod expressions;
mod node;
mod yaml;

pub use node::{NodeId, NodeKind, ScalarStyle, YamlNode, YamlTree};
pub use yaml::ParseError;
