// Copyright 2023 Marsh J. Ray
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! YAML documents whose mapping keys may be sequences (or other non-scalars).
//!
//! Such keys are collapsed here into plain string keys, merge keys (`<<`) are
//! applied, and plain timestamp-looking scalars are resolved into dates, so the
//! result fits ordinary string-keyed structures like JSON objects.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use yaml_rust::Yaml;

use crate::timestamp::{resolve_timestamp, Timestamp};
use crate::yaml_tree::{load_first_document, RawNode, RawScalar, ScalarStyle};

/// The document the demo parses.
pub const TEAMS_YAML: &str = "
? - Detroit Tigers
  - Chicago cubs
: - 2001-07-23

? [ New York Yankees,
    Atlanta Braves ]
: [ 2001-07-02, 2001-08-12,
    2001-08-14 ]
";

#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("invalid YAML: {0}")]
    Syntax(#[from] yaml_rust::ScanError),

    #[error("document root is {found}, expected a mapping")]
    NotAMapping { found: &'static str },

    #[error("more than one key collapses to {key:?}")]
    DuplicateKey { key: String },

    #[error("merge key `<<` needs a mapping or a sequence of mappings, found {found}")]
    BadMerge { found: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Seq(Vec<Node>),
    Map(Mapping),
}

impl Node {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match *self {
            Node::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Timestamp> for Node {
    fn from(ts: Timestamp) -> Self {
        match ts {
            Timestamp::Date(date) => Node::Date(date),
            Timestamp::DateTime(date_time) => Node::DateTime(date_time),
        }
    }
}

/// String-keyed mapping in document order. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn insert_new(&mut self, key: String, node: Node) -> Result<(), ParseFailure> {
        if self.get(&key).is_some() {
            return Err(ParseFailure::DuplicateKey { key });
        }
        self.entries.push((key, node));
        Ok(())
    }

    /// Adds the entries of `source` whose keys are not present yet.
    fn merge_from(&mut self, source: Mapping) {
        for (key, node) in source.entries {
            if self.get(&key).is_none() {
                self.entries.push((key, node));
            }
        }
    }
}

/// A parsed and normalized document. The root is always a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Mapping,
}

impl Document {
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Converts into JSON. Dates become strings, non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing into a `Value` only fails for non-string map keys, and
        // every key here is already a string.
        serde_json::to_value(&self.root).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(&self.root, ron::ser::PrettyConfig::default())
    }
}

/// Parses the first document in `src` and collapses non-scalar keys into
/// strings.
pub fn parse_document(src: &str) -> Result<Document, ParseFailure> {
    let Some(raw) = load_first_document(src)? else {
        return Err(ParseFailure::NotAMapping { found: "null" });
    };

    let RawNode::Map(entries) = &raw else {
        return Err(ParseFailure::NotAMapping {
            found: kind_name(&raw),
        });
    };

    let root = normalize_mapping(entries)?;
    log::debug!("parsed document with {} top-level entries", root.len());
    Ok(Document { root })
}

/// Parses `src`, writing the structure to `out` or a diagnostic to `err`.
///
/// Returns the document if parsing succeeded. Nothing is written to `out` on
/// failure.
pub fn run_demo<O, E>(src: &str, out: &mut O, err: &mut E) -> std::io::Result<Option<Document>>
where
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    match parse_document(src) {
        Ok(document) => {
            writeln!(out, "{document}")?;
            Ok(Some(document))
        }
        Err(parse_failure) => {
            log::debug!("run_demo: {parse_failure:?}");
            writeln!(err, "error: {parse_failure}")?;
            Ok(None)
        }
    }
}

fn kind_name(raw: &RawNode) -> &'static str {
    match raw {
        RawNode::Seq(_) => "a sequence",
        RawNode::Map(_) => "a mapping",
        RawNode::Scalar(scalar) => match resolve_scalar(scalar) {
            Node::Null => "null",
            Node::Bool(_) => "a boolean",
            Node::Int(_) | Node::Float(_) => "a number",
            Node::Date(_) | Node::DateTime(_) => "a timestamp",
            _ => "a string",
        },
    }
}

/// Resolves a scalar the way YAML 1.1 does.
///
/// Only plain scalars are candidates for null, bool, number and timestamp.
/// Quoted, literal and folded scalars are strings, and so is anything tagged
/// `!!str`. `!!timestamp` forces timestamp resolution regardless of style.
fn resolve_scalar(scalar: &RawScalar) -> Node {
    match scalar.core_tag() {
        Some("str") => return Node::Str(scalar.text.clone()),
        Some("timestamp") => {
            return match resolve_timestamp(&scalar.text) {
                Some(ts) => ts.into(),
                None => Node::Str(scalar.text.clone()),
            }
        }
        _ => {}
    }

    if scalar.style != ScalarStyle::Plain {
        return Node::Str(scalar.text.clone());
    }

    if let Some(ts) = resolve_timestamp(&scalar.text) {
        return ts.into();
    }

    match Yaml::from_str(&scalar.text) {
        Yaml::Null => Node::Null,
        Yaml::Boolean(b) => Node::Bool(b),
        Yaml::Integer(i) => Node::Int(i),
        // Integers past i64::MAX land here too.
        real @ Yaml::Real(_) => Node::Float(real.as_f64().unwrap_or(f64::NAN)),
        _ => Node::Str(scalar.text.clone()),
    }
}

fn is_merge_key(key: &RawNode) -> bool {
    match key {
        RawNode::Scalar(scalar) => {
            scalar.text == "<<"
                && (scalar.core_tag() == Some("merge")
                    || (scalar.tag.is_none() && scalar.style == ScalarStyle::Plain))
        }
        _ => false,
    }
}

/// Collects the mappings a `<<` value refers to, in precedence order.
fn merge_sources(value: &RawNode) -> Result<Vec<Mapping>, ParseFailure> {
    match value {
        RawNode::Map(entries) => Ok(vec![normalize_mapping(entries)?]),
        RawNode::Seq(items) => items
            .iter()
            .map(|item| match item {
                RawNode::Map(entries) => normalize_mapping(entries),
                other => Err(ParseFailure::BadMerge {
                    found: kind_name(other),
                }),
            })
            .collect(),
        other => Err(ParseFailure::BadMerge {
            found: kind_name(other),
        }),
    }
}

/// Explicit entries win over merged ones; among merged mappings, earlier ones
/// win. Merged entries follow the explicit ones.
fn normalize_mapping(entries: &[(RawNode, RawNode)]) -> Result<Mapping, ParseFailure> {
    let mut normalized = Mapping::default();
    let mut merged = Vec::new();

    for (key, value) in entries {
        if is_merge_key(key) {
            merged.extend(merge_sources(value)?);
            continue;
        }

        let key_text = key_text(key);
        if !matches!(key, RawNode::Scalar(_)) {
            log::trace!("collapsed {} key to {key_text:?}", kind_name(key));
        }
        normalized.insert_new(key_text, to_node(value)?)?;
    }

    for source in merged {
        normalized.merge_from(source);
    }
    Ok(normalized)
}

/// Renders a key of any shape as a single string.
///
/// Sequences join their elements with `,` (recursively, so nesting flattens),
/// null renders empty and mappings render as `{k: v, ...}`. Scalar keys keep
/// their source text unless they resolve to null, a bool or a number.
fn key_text(key: &RawNode) -> String {
    match key {
        RawNode::Scalar(scalar) => match resolve_scalar(scalar) {
            Node::Null => String::new(),
            Node::Bool(b) => b.to_string(),
            Node::Int(i) => i.to_string(),
            Node::Float(x) => x.to_string(),
            _ => scalar.text.clone(),
        },
        RawNode::Seq(items) => items.iter().map(key_text).collect::<Vec<_>>().join(","),
        RawNode::Map(entries) => {
            let inner = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", key_text(k), key_text(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{inner}}}")
        }
    }
}

fn to_node(raw: &RawNode) -> Result<Node, ParseFailure> {
    Ok(match raw {
        RawNode::Scalar(scalar) => resolve_scalar(scalar),
        RawNode::Seq(items) => Node::Seq(items.iter().map(to_node).collect::<Result<_, _>>()?),
        RawNode::Map(entries) => Node::Map(normalize_mapping(entries)?),
    })
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Float(x) => serializer.serialize_f64(*x),
            Node::Str(s) => serializer.serialize_str(s),
            Node::Date(date) => date.serialize(serializer),
            Node::DateTime(date_time) => date_time.serialize(serializer),
            Node::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(mapping) => mapping.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, 0)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_mapping(f, &self.root, 0)
    }
}

const INDENT: &str = "  ";

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    match node {
        Node::Null => f.write_str("null"),
        Node::Bool(b) => write!(f, "{b}"),
        Node::Int(i) => write!(f, "{i}"),
        Node::Float(x) => write!(f, "{x:?}"),
        Node::Str(s) => write!(f, "{s:?}"),
        Node::Date(date) => write!(f, "{date}"),
        Node::DateTime(date_time) => {
            f.write_str(&date_time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        Node::Seq(items) if items.is_empty() => f.write_str("[]"),
        Node::Seq(items) => {
            f.write_str("[\n")?;
            for item in items {
                write_indent(f, depth + 1)?;
                write_node(f, item, depth + 1)?;
                f.write_str(",\n")?;
            }
            write_indent(f, depth)?;
            f.write_str("]")
        }
        Node::Map(mapping) => write_mapping(f, mapping, depth),
    }
}

fn write_mapping(f: &mut fmt::Formatter<'_>, mapping: &Mapping, depth: usize) -> fmt::Result {
    if mapping.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{\n")?;
    for (key, node) in mapping.iter() {
        write_indent(f, depth + 1)?;
        write!(f, "{key:?}: ")?;
        write_node(f, node, depth + 1)?;
        f.write_str(",\n")?;
    }
    write_indent(f, depth)?;
    f.write_str("}")
}
