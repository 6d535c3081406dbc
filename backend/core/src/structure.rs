//! Conversion of flat, override-resolved keys into a nested document.
//!
//! Keys follow `ident(.ident|[digits])*`. A `.` descends into a map and a
//! `[n]` into a list, which is padded with nulls up to `n`.
//!
//! When a key needs to descend through a name that already holds a scalar
//! (both `org.x` and `org.x.y` present, as in logging levels), the rest of
//! the key is stored verbatim as one compound key in the map where the
//! collision happened: `{org: {x: "1", "x.y": "2"}}`. The same document is
//! produced whichever of the two keys arrives first, at any depth.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::types::PropertyMap;

/// Synthetic top-level key wrapping documents whose root is not a map.
pub const DOCUMENT_KEY: &str = "document";

/// Largest list index a key may address.
pub const MAX_INDEX: usize = 65_535;

/// A node of the nested document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Map(NodeMap),
    List(Vec<Node>),
    Leaf(Value),
    /// Placeholder for list slots below the highest assigned index.
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Map,
    List,
    Leaf,
    Null,
}

impl Node {
    fn kind(&self) -> NodeKind {
        match self {
            Node::Map(_) => NodeKind::Map,
            Node::List(_) => NodeKind::List,
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Null => NodeKind::Null,
        }
    }

    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert into a JSON value, keeping map insertion order.
    pub fn into_value(self) -> Value {
        match self {
            Node::Map(map) => Value::Object(
                map.entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_value()))
                    .collect(),
            ),
            Node::List(items) => Value::Array(items.into_iter().map(Node::into_value).collect()),
            Node::Leaf(value) => value,
            Node::Null => Value::Null,
        }
    }
}

/// Insertion-ordered map of document nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeMap {
    entries: Vec<(String, Node)>,
    index: HashMap<String, usize>,
}

impl PartialEq for NodeMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        let idx = *self.index.get(key)?;
        Some(&mut self.entries[idx].1)
    }

    /// Insert or replace; a replaced entry keeps its position.
    pub fn insert(&mut self, key: String, node: Node) -> Option<Node> {
        match self.index.get(&key) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].1, node)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, node));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn kind_of(&self, key: &str) -> Option<NodeKind> {
        self.get(key).map(Node::kind)
    }

    /// Return the node under `key`, inserting `make()` when vacant or null.
    fn vacant_or(&mut self, key: &str, make: fn() -> Node) -> &mut Node {
        if matches!(self.kind_of(key), None | Some(NodeKind::Null)) {
            self.insert(key.to_string(), make());
        }
        let idx = self.index[key];
        &mut self.entries[idx].1
    }
}

/// One token of a flat key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Name(&'a str),
    Index(usize),
}

/// What the cursor expects to read next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Name,
    Index,
    End,
}

/// Left-to-right scanner over one flat key.
///
/// Each step yields the next segment together with the byte offset where it
/// starts, so the unread remainder of the key is always recoverable.
#[derive(Debug, Clone)]
struct KeyCursor<'a> {
    key: &'a str,
    pos: usize,
    pending: Pending,
}

impl<'a> KeyCursor<'a> {
    fn new(key: &'a str) -> Self {
        Self {
            key,
            pos: 0,
            pending: Pending::Name,
        }
    }

    fn next_segment(&mut self) -> Result<Option<(usize, Segment<'a>)>> {
        match self.pending {
            Pending::End => Ok(None),
            Pending::Name => self.read_name().map(Some),
            Pending::Index => self.read_index().map(Some),
        }
    }

    fn read_name(&mut self) -> Result<(usize, Segment<'a>)> {
        let start = self.pos;
        let rest = &self.key[start..];
        let end = rest.find(|c: char| c == '.' || c == '[').map_or(self.key.len(), |i| start + i);
        if end == start {
            return Err(EngineError::invalid_key(
                self.key,
                format!("empty name at position {start}"),
            ));
        }
        self.pending = match self.key.as_bytes().get(end) {
            None => Pending::End,
            Some(b'.') => Pending::Name,
            Some(_) => Pending::Index,
        };
        self.pos = end + 1;
        Ok((start, Segment::Name(&self.key[start..end])))
    }

    fn read_index(&mut self) -> Result<(usize, Segment<'a>)> {
        // `start` points at the opening bracket.
        let start = self.pos - 1;
        let digits_start = self.pos;
        let rest = &self.key[digits_start..];
        let close = rest
            .find(']')
            .map(|i| digits_start + i)
            .ok_or_else(|| EngineError::invalid_key(self.key, "unterminated '['"))?;
        let digits = &self.key[digits_start..close];
        if digits.is_empty() {
            return Err(EngineError::invalid_key(self.key, "empty index"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::invalid_key(
                self.key,
                format!("non-numeric index '{digits}'"),
            ));
        }
        let index = digits
            .parse::<usize>()
            .ok()
            .filter(|&i| i <= MAX_INDEX)
            .ok_or_else(|| EngineError::invalid_key(self.key, "index out of range"))?;

        self.pending = match self.key.as_bytes().get(close + 1) {
            None => Pending::End,
            Some(b'.') => Pending::Name,
            Some(b'[') => Pending::Index,
            Some(_) => {
                return Err(EngineError::invalid_key(
                    self.key,
                    format!("unexpected character after ']' at position {}", close + 1),
                ));
            }
        };
        self.pos = close + 2;
        Ok((start, Segment::Index(index)))
    }
}

/// Tokenize and validate a flat key.
fn parse_key(key: &str) -> Result<Vec<(usize, Segment<'_>)>> {
    let mut cursor = KeyCursor::new(key);
    let mut segments = Vec::new();
    while let Some(segment) = cursor.next_segment()? {
        segments.push(segment);
    }
    Ok(segments)
}

/// Builds nested documents from flat property maps.
#[derive(Debug, Clone, Default)]
pub struct StructureBuilder {
    unwrap_document: bool,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promote `X` to the root when the result is exactly `{"document": X}`.
    pub fn unwrap_document(mut self, unwrap: bool) -> Self {
        self.unwrap_document = unwrap;
        self
    }

    pub fn build(&self, flat: &PropertyMap) -> Result<Node> {
        self.build_reporting_unwrap(flat).map(|(node, _)| node)
    }

    /// Like [`build`](Self::build), also reporting whether the `document`
    /// wrapper was removed.
    pub fn build_reporting_unwrap(&self, flat: &PropertyMap) -> Result<(Node, bool)> {
        let mut root = NodeMap::new();
        for (key, value) in flat {
            let segments = parse_key(key)?;
            let ctx = Insert {
                key,
                segments: &segments,
            };
            ctx.into_map(&mut root, 0, value.clone())?;
        }

        if self.unwrap_document && root.len() == 1 {
            if let Some(Node::Map(_) | Node::List(_) | Node::Leaf(_)) = root.get(DOCUMENT_KEY) {
                let (_, node) = root.entries.remove(0);
                return Ok((node, true));
            }
        }
        Ok((Node::Map(root), false))
    }

    /// Build and convert straight to a JSON value.
    pub fn build_value(&self, flat: &PropertyMap) -> Result<Value> {
        self.build(flat).map(Node::into_value)
    }
}

/// Insertion of one parsed key.
struct Insert<'k> {
    key: &'k str,
    segments: &'k [(usize, Segment<'k>)],
}

impl Insert<'_> {
    fn remainder(&self, at: usize) -> String {
        self.key[self.segments[at].0..].to_string()
    }

    fn into_map(&self, map: &mut NodeMap, at: usize, value: Value) -> Result<()> {
        let Segment::Name(name) = self.segments[at].1 else {
            return Err(EngineError::invalid_key(self.key, "expected a name"));
        };

        let Some(&(_, next)) = self.segments.get(at + 1) else {
            self.assign_in_map(map, name, value);
            return Ok(());
        };

        let occupant = map.kind_of(name);
        match (next, occupant) {
            (Segment::Name(_), None | Some(NodeKind::Null | NodeKind::Map)) => {
                match map.vacant_or(name, || Node::Map(NodeMap::new())) {
                    Node::Map(child) => self.into_map(child, at + 1, value),
                    _ => unreachable!("vacant_or returned a non-map for a map slot"),
                }
            }
            (Segment::Index(_), None | Some(NodeKind::Null | NodeKind::List)) => {
                match map.vacant_or(name, || Node::List(Vec::new())) {
                    Node::List(child) => self.into_list(child, at + 1, value),
                    _ => unreachable!("vacant_or returned a non-list for a list slot"),
                }
            }
            _ => {
                // Name already taken by an incompatible node: keep the rest
                // of the key together as one compound key at this level.
                map.insert(self.remainder(at), Node::Leaf(value));
                Ok(())
            }
        }
    }

    fn assign_in_map(&self, map: &mut NodeMap, name: &str, value: Value) {
        if let Some(displaced @ (Node::Map(_) | Node::List(_))) =
            map.insert(name.to_string(), Node::Leaf(value))
        {
            hoist(map, name, displaced);
        }
    }

    fn into_list(&self, list: &mut Vec<Node>, at: usize, value: Value) -> Result<()> {
        let Segment::Index(index) = self.segments[at].1 else {
            return Err(EngineError::invalid_key(self.key, "expected an index"));
        };
        if list.len() <= index {
            let len = index
                .checked_add(1)
                .ok_or_else(|| EngineError::invalid_key(self.key, "index out of range"))?;
            list.resize(len, Node::Null);
        }
        let slot = &mut list[index];

        match (self.segments.get(at + 1).map(|s| s.1), slot.kind()) {
            (None, NodeKind::Map | NodeKind::List) => Err(EngineError::invalid_key(
                self.key,
                format!("element [{index}] already holds a nested value"),
            )),
            (None, _) => {
                *slot = Node::Leaf(value);
                Ok(())
            }
            (Some(Segment::Name(_)), NodeKind::Null | NodeKind::Map) => {
                if *slot == Node::Null {
                    *slot = Node::Map(NodeMap::new());
                }
                match slot {
                    Node::Map(child) => self.into_map(child, at + 1, value),
                    _ => unreachable!("list slot was just made a map"),
                }
            }
            (Some(Segment::Index(_)), NodeKind::Null | NodeKind::List) => {
                if *slot == Node::Null {
                    *slot = Node::List(Vec::new());
                }
                match slot {
                    Node::List(child) => self.into_list(child, at + 1, value),
                    _ => unreachable!("list slot was just made a list"),
                }
            }
            (Some(_), _) => Err(EngineError::invalid_key(
                self.key,
                format!("element [{index}] conflicts with another key"),
            )),
        }
    }
}

/// Re-insert the leaves of a node displaced from `path` as compound keys of
/// `map`, so `x: {y: {z: 1}}` becomes `"x.y.z": 1`.
fn hoist(map: &mut NodeMap, path: &str, node: Node) {
    match node {
        Node::Map(children) => {
            for (child, node) in children.entries {
                hoist(map, &format!("{path}.{child}"), node);
            }
        }
        Node::List(items) => {
            for (idx, node) in items.into_iter().enumerate() {
                hoist(map, &format!("{path}[{idx}]"), node);
            }
        }
        Node::Leaf(value) => {
            map.insert(path.to_string(), Node::Leaf(value));
        }
        Node::Null => {}
    }
}
