// Copyright 2023 Marsh J. Ray
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Builds a node tree from `yaml_rust` parser events, keeping each scalar's
//! style and tag so later resolution can tell `2001-07-23` from `"2001-07-23"`.

use std::collections::HashMap;

use yaml_rust::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust::scanner::{Marker, ScanError, TScalarStyle, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    /// Quoted, literal or folded.
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScalar {
    pub text: String,
    pub style: ScalarStyle,
    /// `(handle, suffix)`, e.g. `("!!", "str")`.
    pub tag: Option<(String, String)>,
}

impl RawScalar {
    /// Returns the suffix of a `!!` (core schema) tag.
    pub fn core_tag(&self) -> Option<&str> {
        match &self.tag {
            Some((handle, suffix)) if handle == "!!" => Some(suffix),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNode {
    Scalar(RawScalar),
    Seq(Vec<RawNode>),
    /// Entries in document order, keys of any shape.
    Map(Vec<(RawNode, RawNode)>),
}

impl RawNode {
    fn null() -> Self {
        RawNode::Scalar(RawScalar {
            text: "~".to_string(),
            style: ScalarStyle::Plain,
            tag: None,
        })
    }
}

/// Parses the first document in `src`. Returns `None` for an empty stream.
pub fn load_first_document(src: &str) -> Result<Option<RawNode>, ScanError> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new(src.chars());
    parser.load(&mut builder, false)?;
    Ok(builder.root)
}

#[derive(Default)]
struct TreeBuilder {
    /// Open collections with their anchor ids.
    stack: Vec<(RawNode, usize)>,
    /// One pending key slot per open mapping.
    pending_keys: Vec<Option<RawNode>>,
    anchors: HashMap<usize, RawNode>,
    root: Option<RawNode>,
}

impl TreeBuilder {
    fn close_node(&mut self, node: RawNode, anchor_id: usize) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        let Some((parent, _)) = self.stack.last_mut() else {
            if self.root.is_none() {
                self.root = Some(node);
            }
            return;
        };

        match parent {
            RawNode::Seq(items) => items.push(node),
            RawNode::Map(entries) => {
                let pending = self
                    .pending_keys
                    .last_mut()
                    .expect("a key slot for every open mapping");
                match pending.take() {
                    None => *pending = Some(node),
                    Some(key) => entries.push((key, node)),
                }
            }
            RawNode::Scalar(_) => unreachable!("scalars are never pushed as parents"),
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event, _mark: Marker) {
        match ev {
            Event::Scalar(text, style, anchor_id, tag) => {
                let style = match style {
                    TScalarStyle::Plain | TScalarStyle::Any => ScalarStyle::Plain,
                    _ => ScalarStyle::Explicit,
                };
                let tag = match tag {
                    Some(TokenType::Tag(handle, suffix)) => Some((handle, suffix)),
                    _ => None,
                };
                self.close_node(RawNode::Scalar(RawScalar { text, style, tag }), anchor_id);
            }
            Event::SequenceStart(anchor_id) => {
                self.stack.push((RawNode::Seq(Vec::new()), anchor_id));
            }
            Event::MappingStart(anchor_id) => {
                self.stack.push((RawNode::Map(Vec::new()), anchor_id));
                self.pending_keys.push(None);
            }
            Event::SequenceEnd | Event::MappingEnd => {
                if matches!(ev, Event::MappingEnd) {
                    self.pending_keys.pop();
                }
                if let Some((node, anchor_id)) = self.stack.pop() {
                    self.close_node(node, anchor_id);
                }
            }
            Event::Alias(anchor_id) => {
                // The parser rejects unknown anchors before emitting an alias.
                let node = self.anchors.get(&anchor_id).cloned().unwrap_or_else(|| {
                    log::warn!("alias to unregistered anchor {anchor_id}");
                    RawNode::null()
                });
                self.close_node(node, 0);
            }
            _ => {}
        }
    }
}
