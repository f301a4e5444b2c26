//! YAML loading with source positions
//!
//! `yaml-rust2` reports a start mark for every parse event. Events are
//! buffered and assembled into a [`YamlTree`]; end positions are derived from
//! the source text since the event stream only carries starts.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

use crate::location::{LineIndex, LocationError, Span};

use super::node::{NodeContent, NodeData, NodeId, ScalarStyle, YamlTree};

/// Errors produced while loading a YAML document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text is not well-formed YAML
    #[error("{message} at line {line} column {column}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// A node span could not be derived in order
    #[error("invalid node span: {0}")]
    Location(#[from] LocationError),
}

impl From<ScanError> for ParseError {
    fn from(err: ScanError) -> Self {
        let marker = err.marker();
        ParseError::Syntax {
            message: err.info().to_string(),
            line: marker.line().max(1),
            column: marker.col() + 1,
        }
    }
}

impl YamlTree {
    /// Parse the first document of `text`
    pub fn parse(text: &str) -> Result<YamlTree, ParseError> {
        let mut buffer = EventBuffer::default();
        let mut parser = Parser::new(text.chars());
        parser.load(&mut buffer, false)?;

        TreeBuilder {
            chars: text.chars().collect(),
            lines: LineIndex::new(text),
            events: buffer.events,
            cursor: 0,
            tree: YamlTree::default(),
            anchors: HashMap::new(),
        }
        .build()
    }
}

#[derive(Default)]
struct EventBuffer {
    events: Vec<(Event, usize)>,
}

impl MarkedEventReceiver for EventBuffer {
    fn on_event(&mut self, event: Event, mark: Marker) {
        self.events.push((event, mark.index()));
    }
}

struct TreeBuilder {
    chars: Vec<char>,
    lines: LineIndex,
    events: Vec<(Event, usize)>,
    cursor: usize,
    tree: YamlTree,
    /// Parser anchor ids to the nodes they label
    anchors: HashMap<usize, NodeId>,
}

impl TreeBuilder {
    fn build(mut self) -> Result<YamlTree, ParseError> {
        while let Some(event) = self.peek() {
            if starts_node(event) {
                let root = self.build_node()?;
                self.tree.root = Some(root);
                break;
            }
            self.cursor += 1;
        }
        Ok(self.tree)
    }

    fn peek(&self) -> Option<&Event> {
        self.events.get(self.cursor).map(|(event, _)| event)
    }

    /// Char offset of the next unconsumed event, or the end of text
    fn next_mark(&self) -> usize {
        self.events
            .get(self.cursor)
            .map_or(self.chars.len(), |(_, mark)| *mark)
    }

    fn take(&mut self) -> Result<(Event, usize), ParseError> {
        match self.events.get(self.cursor) {
            Some((event, mark)) => {
                let taken = (event.clone(), *mark);
                self.cursor += 1;
                Ok(taken)
            }
            None => Err(self.truncated()),
        }
    }

    fn truncated(&self) -> ParseError {
        let end = self.lines.end_of_text();
        ParseError::Syntax {
            message: "unexpected end of YAML event stream".to_string(),
            line: end.line.get(),
            column: end.column.get(),
        }
    }

    fn build_node(&mut self) -> Result<NodeId, ParseError> {
        let (event, start) = self.take()?;
        match event {
            Event::Scalar(value, style, anchor, ..) => {
                let end = self.scalar_end(start, &value, &style);
                let content = NodeContent::Scalar {
                    value,
                    style: scalar_style(&style),
                };
                let id = self.push(content, start, end)?;
                self.register(anchor, id);
                Ok(id)
            }
            Event::SequenceStart(anchor, ..) => {
                let id = self.push(NodeContent::Sequence(Vec::new()), start, start)?;
                self.register(anchor, id);
                let mut items = Vec::new();
                loop {
                    if matches!(self.peek(), Some(Event::SequenceEnd)) {
                        let (_, close) = self.take()?;
                        let end = self.collection_end(start, '[', close, items.last().copied());
                        return self.finish(id, NodeContent::Sequence(items), start, end);
                    }
                    items.push(self.build_node()?);
                }
            }
            Event::MappingStart(anchor, ..) => {
                let id = self.push(NodeContent::Mapping(Vec::new()), start, start)?;
                self.register(anchor, id);
                let mut entries = Vec::new();
                let mut seen = HashSet::new();
                loop {
                    if matches!(self.peek(), Some(Event::MappingEnd)) {
                        let (_, close) = self.take()?;
                        let last = entries.last().map(|&(_, value)| value);
                        let end = self.collection_end(start, '{', close, last);
                        return self.finish(id, NodeContent::Mapping(entries), start, end);
                    }
                    let key = self.build_node()?;
                    if let NodeContent::Scalar { value, .. } = &self.tree.nodes[key].content {
                        if !seen.insert(value.clone()) {
                            self.tree.duplicate_keys.push(key);
                        }
                    }
                    let value = self.build_node()?;
                    entries.push((key, value));
                }
            }
            Event::Alias(anchor) => {
                let target = self.anchors.get(&anchor).copied().ok_or_else(|| {
                    let position = self.lines.position(start);
                    ParseError::Syntax {
                        message: format!("alias refers to unknown anchor #{anchor}"),
                        line: position.line.get(),
                        column: position.column.get(),
                    }
                })?;
                let end = self.alias_end(start);
                self.push(NodeContent::Alias(target), start, end)
            }
            other => {
                let position = self.lines.position(start);
                Err(ParseError::Syntax {
                    message: format!("unexpected YAML event {other:?}"),
                    line: position.line.get(),
                    column: position.column.get(),
                })
            }
        }
    }

    fn register(&mut self, anchor: usize, id: NodeId) {
        if anchor > 0 {
            self.anchors.insert(anchor, id);
        }
    }

    fn span(&self, start: usize, end: usize) -> Result<Span, ParseError> {
        Ok(Span::new(
            self.lines.position(start),
            self.lines.position(end),
        )?)
    }

    fn push(&mut self, content: NodeContent, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let span = self.span(start, end)?;
        self.tree.nodes.push(NodeData {
            content,
            start,
            end,
            span,
        });
        Ok(self.tree.nodes.len() - 1)
    }

    fn finish(
        &mut self,
        id: NodeId,
        content: NodeContent,
        start: usize,
        end: usize,
    ) -> Result<NodeId, ParseError> {
        let span = self.span(start, end)?;
        let node = &mut self.tree.nodes[id];
        node.content = content;
        node.end = end;
        node.span = span;
        Ok(id)
    }

    /// Flow collections end after their closing bracket, block ones with their last child
    fn collection_end(&self, start: usize, flow_open: char, close: usize, last: Option<NodeId>) -> usize {
        if self.chars.get(start) == Some(&flow_open) {
            return (close + 1).min(self.chars.len()).max(start);
        }
        last.map_or(start, |child| self.tree.nodes[child].end.max(start))
    }

    fn scalar_end(&self, start: usize, value: &str, style: &TScalarStyle) -> usize {
        match style {
            TScalarStyle::SingleQuoted => return self.quoted_end(start, '\''),
            TScalarStyle::DoubleQuoted => return self.quoted_end(start, '"'),
            TScalarStyle::Plain if !value.contains('\n') => {
                let width = value.chars().count();
                if self.source_matches(start, value) {
                    return start + width;
                }
                if value == "~" {
                    // Empty scalar synthesized by the parser for a missing value
                    return start;
                }
            }
            _ => {}
        }
        self.trimmed_end(start)
    }

    fn source_matches(&self, start: usize, value: &str) -> bool {
        let mut source = self.chars.iter().skip(start);
        value.chars().all(|ch| source.next() == Some(&ch))
    }

    fn quoted_end(&self, start: usize, quote: char) -> usize {
        let mut i = start + 1;
        while i < self.chars.len() {
            match self.chars[i] {
                '\\' if quote == '"' => i += 2,
                ch if ch == quote => {
                    if quote == '\'' && self.chars.get(i + 1) == Some(&'\'') {
                        i += 2;
                        continue;
                    }
                    return i + 1;
                }
                _ => i += 1,
            }
        }
        self.chars.len()
    }

    /// End of a scalar that spans lines: back off from the next event over whitespace
    fn trimmed_end(&self, start: usize) -> usize {
        let mut end = self.next_mark().min(self.chars.len());
        while end > start && self.chars[end - 1].is_whitespace() {
            end -= 1;
        }
        end.max(start)
    }

    fn alias_end(&self, start: usize) -> usize {
        let mut end = start + 1;
        while let Some(&ch) = self.chars.get(end) {
            if ch.is_whitespace() || matches!(ch, ',' | '[' | ']' | '{' | '}') {
                break;
            }
            end += 1;
        }
        end.min(self.chars.len())
    }
}

fn starts_node(event: &Event) -> bool {
    matches!(
        event,
        Event::Scalar(..) | Event::SequenceStart(..) | Event::MappingStart(..) | Event::Alias(..)
    )
}

fn scalar_style(style: &TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        TScalarStyle::Literal => ScalarStyle::Literal,
        TScalarStyle::Folded => ScalarStyle::Folded,
        _ => ScalarStyle::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_valid_yaml() {
        let tree = YamlTree::parse("key: value\nlist:\n  - item1\n  - item2").unwrap();
        let root = tree.root().unwrap();
        assert_eq!(root.get("list").map(|l| l.len()), Some(2));
    }

    #[test]
    fn test_parse_unterminated_alias() {
        let err = YamlTree::parse("x: *").unwrap_err();
        assert_matches!(err, ParseError::Syntax { line: 1, .. });
    }

    #[test]
    fn test_parse_invalid_yaml_indentation() {
        let err = YamlTree::parse("key: value\n  bad: indentation").unwrap_err();
        assert_matches!(err, ParseError::Syntax { line: 2, .. });
    }

    #[test]
    fn test_parse_unclosed_quote() {
        assert_matches!(
            YamlTree::parse("key: \"unclosed"),
            Err(ParseError::Syntax { .. })
        );
    }

    #[test]
    fn test_unknown_anchor() {
        assert_matches!(
            YamlTree::parse("a: *nothing\n"),
            Err(ParseError::Syntax { .. })
        );
    }

    #[test]
    fn test_only_first_document_is_loaded() {
        let tree = YamlTree::parse("a: 1\n---\nb: 2\n").unwrap();
        let root = tree.root().unwrap();
        assert!(root.contains_key("a"));
        assert!(!root.contains_key("b"));
    }

    #[test]
    fn test_syntax_error_display() {
        let err = ParseError::Syntax {
            message: "mapping values are not allowed in this context".to_string(),
            line: 2,
            column: 6,
        };
        assert_eq!(
            err.to_string(),
            "mapping values are not allowed in this context at line 2 column 6"
        );
    }

    #[test]
    fn test_parse_comment_only() {
        let tree = YamlTree::parse("# This is a comment\n# Another comment").unwrap();
        assert!(tree.root().is_none());
        assert!(tree.is_empty());
    }
}
