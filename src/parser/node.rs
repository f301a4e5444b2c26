//! Positioned YAML node tree
//!
//! All nodes of one document live in a single arena; children and alias
//! targets are referenced by index. [`YamlNode`] is a cheap copyable view
//! into the arena.

use std::collections::{BTreeMap, BTreeSet};

use crate::location::{FileIdentifier, Location, Span};

/// Index of a node inside its [`YamlTree`]
pub type NodeId = usize;

/// The kind of a YAML node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
    /// An alias (`*name`) pointing at an anchored node
    Alias,
}

/// How a scalar was written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeContent {
    Scalar { value: String, style: ScalarStyle },
    Sequence(Vec<NodeId>),
    Mapping(Vec<(NodeId, NodeId)>),
    Alias(NodeId),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) content: NodeContent,
    /// Char offset of the first character
    pub(crate) start: usize,
    /// Char offset one past the last character
    pub(crate) end: usize,
    pub(crate) span: Span,
}

/// One parsed YAML document
#[derive(Debug, Clone, Default)]
pub struct YamlTree {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: Option<NodeId>,
    /// Key nodes that repeat an earlier key of the same mapping
    pub(crate) duplicate_keys: Vec<NodeId>,
}

impl YamlTree {
    /// The document root, or `None` for an empty document
    pub fn root(&self) -> Option<YamlNode<'_>> {
        self.root.map(|id| self.node(id))
    }

    /// View of the node with the given id
    ///
    /// # Panics
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> YamlNode<'_> {
        assert!(id < self.nodes.len(), "node {id} is not part of this tree");
        YamlNode { tree: self, id }
    }

    /// Mapping keys that were declared more than once, in source order
    pub fn duplicate_keys(&self) -> impl Iterator<Item = YamlNode<'_>> + '_ {
        self.duplicate_keys.iter().map(move |&id| self.node(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A view of one node of a [`YamlTree`]
#[derive(Debug, Clone, Copy)]
pub struct YamlNode<'a> {
    tree: &'a YamlTree,
    id: NodeId,
}

impl<'a> YamlNode<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a YamlTree {
        self.tree
    }

    /// The kind of this node, without following aliases
    pub fn kind(&self) -> NodeKind {
        match self.data().content {
            NodeContent::Scalar { .. } => NodeKind::Scalar,
            NodeContent::Sequence(_) => NodeKind::Sequence,
            NodeContent::Mapping(_) => NodeKind::Mapping,
            NodeContent::Alias(_) => NodeKind::Alias,
        }
    }

    /// Follow an alias to its anchored node; other nodes resolve to themselves
    pub fn resolve(self) -> YamlNode<'a> {
        match self.data().content {
            NodeContent::Alias(target) => YamlNode {
                tree: self.tree,
                id: target,
            },
            _ => self,
        }
    }

    pub fn is_mapping(&self) -> bool {
        self.resolve().kind() == NodeKind::Mapping
    }

    pub fn is_sequence(&self) -> bool {
        self.resolve().kind() == NodeKind::Sequence
    }

    pub fn is_scalar(&self) -> bool {
        self.resolve().kind() == NodeKind::Scalar
    }

    /// Whether this is a plain `null`, `~` or empty scalar
    pub fn is_null(&self) -> bool {
        match &self.resolve().data().content {
            NodeContent::Scalar {
                value,
                style: ScalarStyle::Plain,
            } => matches!(value.as_str(), "" | "~" | "null" | "Null" | "NULL"),
            _ => false,
        }
    }

    /// Scalar style, if this is a scalar
    pub fn style(&self) -> Option<ScalarStyle> {
        match &self.resolve().data().content {
            NodeContent::Scalar { style, .. } => Some(*style),
            _ => None,
        }
    }

    /// Text of a non-null scalar
    pub fn as_str(&self) -> Option<&'a str> {
        if self.is_null() {
            return None;
        }
        match &self.resolve().data().content {
            NodeContent::Scalar { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    /// Value for `key` in a mapping; the first entry wins when keys repeat
    pub fn get(&self, key: &str) -> Option<YamlNode<'a>> {
        self.entries()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Key node for `key` in a mapping
    pub fn key(&self, key: &str) -> Option<YamlNode<'a>> {
        self.entries()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(k, _)| k)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Item at `index` in a sequence
    pub fn at(&self, index: usize) -> Option<YamlNode<'a>> {
        self.items().nth(index)
    }

    /// Key/value pairs of a mapping in source order; empty for other kinds
    pub fn entries(&self) -> impl Iterator<Item = (YamlNode<'a>, YamlNode<'a>)> + 'a {
        let tree = self.tree;
        let entries: &'a [(NodeId, NodeId)] = match &self.resolve().data().content {
            NodeContent::Mapping(entries) => entries,
            _ => &[],
        };
        entries
            .iter()
            .map(move |&(k, v)| (YamlNode { tree, id: k }, YamlNode { tree, id: v }))
    }

    /// Scalar keys of a mapping in source order
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.entries().filter_map(|(k, _)| k.as_str())
    }

    /// Items of a sequence in source order; empty for other kinds
    pub fn items(&self) -> impl Iterator<Item = YamlNode<'a>> + 'a {
        let tree = self.tree;
        let items: &'a [NodeId] = match &self.resolve().data().content {
            NodeContent::Sequence(items) => items,
            _ => &[],
        };
        items.iter().map(move |&id| YamlNode { tree, id })
    }

    /// Number of entries or items; zero for scalars
    pub fn len(&self) -> usize {
        match &self.resolve().data().content {
            NodeContent::Mapping(entries) => entries.len(),
            NodeContent::Sequence(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A mapping of scalars to scalars; non-scalar values are skipped and
    /// the first entry wins when keys repeat
    pub fn string_map(&self) -> Option<BTreeMap<String, String>> {
        if !self.is_mapping() {
            return None;
        }
        let mut seen = BTreeSet::new();
        let mut map = BTreeMap::new();
        for (k, v) in self.entries() {
            let Some(key) = k.as_str() else { continue };
            if !seen.insert(key) {
                continue;
            }
            let value = if v.is_null() { Some("") } else { v.as_str() };
            if let Some(value) = value {
                map.insert(key.to_string(), value.to_string());
            }
        }
        Some(map)
    }

    /// A single scalar or a sequence of scalars, in declaration order
    pub fn string_list(&self) -> Option<Vec<String>> {
        if let Some(value) = self.as_str() {
            return Some(vec![value.to_string()]);
        }
        if !self.is_sequence() {
            return None;
        }
        Some(
            self.items()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        )
    }

    /// Source range of this node as written (aliases are not followed)
    pub fn span(&self) -> Span {
        self.data().span
    }

    /// Char offsets `[start, end)` of this node in the source text
    pub fn offsets(&self) -> (usize, usize) {
        let data = self.data();
        (data.start, data.end)
    }

    pub fn location(&self, file: &FileIdentifier) -> Location {
        Location::from_span(file.clone(), self.span())
    }
}
