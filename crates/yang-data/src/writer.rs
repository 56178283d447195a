//! Streaming construction of normalized trees.
//!
//! Producers emit `start_*` / `end_node` events into a
//! [`NormalizedNodeStreamWriter`]. [`NormalizedNodeResult`] turns a stream
//! into a [`NormalizedNode`]; [`write_normalized_node`] turns a node back into
//! a stream.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::node::{
    AnyDataNode, DataContainerNode, LeafNode, LeafSetNode, MapNode, NormalizedNode,
    UnkeyedListNode,
};
use crate::path::PathArgument;
use crate::qname::QName;
use crate::value::Value;

/// Stream writer errors.
#[derive(Debug, Error, PartialEq)]
pub enum WriterError {
    #[error("end_node without an open node")]
    NoOpenNode,
    #[error("{child} cannot be placed inside {parent}")]
    InvalidChild {
        parent: &'static str,
        child: &'static str,
    },
    #[error("duplicate child {0}")]
    DuplicateChild(String),
    #[error("value event outside of a leaf or anydata node")]
    UnexpectedValue,
    #[error("node {0} was closed without a value")]
    MissingValue(String),
    #[error("the stream produced more than one root node")]
    MultipleRoots,
    #[error("the stream is incomplete")]
    Incomplete,
}

/// Receiver of tree construction events.
pub trait NormalizedNodeStreamWriter {
    fn start_container_node(&mut self, name: &QName) -> Result<(), WriterError>;
    fn start_choice_node(&mut self, name: &QName) -> Result<(), WriterError>;
    fn start_map_node(&mut self, name: &QName, ordered: bool) -> Result<(), WriterError>;
    /// `identifier` carries the entry's key predicates.
    fn start_map_entry_node(&mut self, identifier: &PathArgument) -> Result<(), WriterError>;
    fn start_unkeyed_list(&mut self, name: &QName) -> Result<(), WriterError>;
    fn start_unkeyed_list_item(&mut self, name: &QName) -> Result<(), WriterError>;
    fn start_leaf_set(&mut self, name: &QName, ordered: bool) -> Result<(), WriterError>;
    /// Must be followed by exactly one [`scalar_value`](Self::scalar_value).
    fn start_leaf_set_entry_node(&mut self, name: &QName) -> Result<(), WriterError>;
    /// Must be followed by exactly one [`scalar_value`](Self::scalar_value).
    fn start_leaf_node(&mut self, name: &QName) -> Result<(), WriterError>;
    /// Must be followed by exactly one [`anydata_value`](Self::anydata_value).
    fn start_anydata_node(&mut self, name: &QName) -> Result<(), WriterError>;
    fn scalar_value(&mut self, value: Value) -> Result<(), WriterError>;
    fn anydata_value(&mut self, body: serde_json::Value) -> Result<(), WriterError>;
    fn end_node(&mut self) -> Result<(), WriterError>;

    /// Emits a complete subtree. Builders may keep `node` itself instead of
    /// copying it.
    fn node(&mut self, node: &Arc<NormalizedNode>) -> Result<(), WriterError> {
        write_normalized_node(self, node)
    }
}

// ── Result builder ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Container,
    Choice,
    MapEntry,
    UnkeyedEntry,
}

#[derive(Debug)]
enum Frame {
    Container(ContainerKind, DataContainerNode),
    Map(MapNode),
    Unkeyed(UnkeyedListNode),
    LeafSet(LeafSetNode),
    Leaf {
        name: QName,
        entry: bool,
        value: Option<Value>,
    },
    AnyData {
        name: QName,
        body: Option<serde_json::Value>,
    },
}

impl Frame {
    fn kind(&self) -> &'static str {
        match self {
            Frame::Container(ContainerKind::Container, _) => "container",
            Frame::Container(ContainerKind::Choice, _) => "choice",
            Frame::Container(ContainerKind::MapEntry, _) => "map entry",
            Frame::Container(ContainerKind::UnkeyedEntry, _) => "unkeyed list entry",
            Frame::Map(_) => "map",
            Frame::Unkeyed(_) => "unkeyed list",
            Frame::LeafSet(_) => "leaf-set",
            Frame::Leaf { entry: true, .. } => "leaf-set entry",
            Frame::Leaf { .. } => "leaf",
            Frame::AnyData { .. } => "anydata",
        }
    }

    fn finish(self) -> Result<NormalizedNode, WriterError> {
        Ok(match self {
            Frame::Container(ContainerKind::Container, n) => NormalizedNode::Container(n),
            Frame::Container(ContainerKind::Choice, n) => NormalizedNode::Choice(n),
            Frame::Container(ContainerKind::MapEntry, n) => NormalizedNode::MapEntry(n),
            Frame::Container(ContainerKind::UnkeyedEntry, n) => NormalizedNode::UnkeyedListEntry(n),
            Frame::Map(n) => NormalizedNode::Map(n),
            Frame::Unkeyed(n) => NormalizedNode::UnkeyedList(n),
            Frame::LeafSet(n) => NormalizedNode::LeafSet(n),
            Frame::Leaf { name, entry, value } => {
                let value = value.ok_or_else(|| WriterError::MissingValue(name.to_string()))?;
                let leaf = LeafNode { name, value };
                if entry {
                    NormalizedNode::LeafSetEntry(leaf)
                } else {
                    NormalizedNode::Leaf(leaf)
                }
            }
            Frame::AnyData { name, body } => {
                let body = body.ok_or_else(|| WriterError::MissingValue(name.to_string()))?;
                NormalizedNode::AnyData(AnyDataNode { name, body })
            }
        })
    }

    fn attach(&mut self, child: Arc<NormalizedNode>) -> Result<(), WriterError> {
        let parent = self.kind();
        let invalid = |child: &NormalizedNode| WriterError::InvalidChild {
            parent,
            child: child.kind(),
        };
        match self {
            Frame::Container(_, container) => match child.as_ref() {
                NormalizedNode::MapEntry(_)
                | NormalizedNode::UnkeyedListEntry(_)
                | NormalizedNode::LeafSetEntry(_) => Err(invalid(&child)),
                _ => {
                    let id = child.identifier();
                    if container.children.contains_key(&id) {
                        return Err(WriterError::DuplicateChild(id.to_string()));
                    }
                    container.children.insert(id, child);
                    Ok(())
                }
            },
            Frame::Map(map) => {
                let id = match child.as_ref() {
                    NormalizedNode::MapEntry(entry) => entry.identifier.clone(),
                    _ => return Err(invalid(&child)),
                };
                if map.entries.contains_key(&id) {
                    return Err(WriterError::DuplicateChild(id.to_string()));
                }
                map.entries.insert(id, child);
                Ok(())
            }
            Frame::Unkeyed(list) => match child.as_ref() {
                NormalizedNode::UnkeyedListEntry(_) => {
                    list.entries.push(child);
                    Ok(())
                }
                _ => Err(invalid(&child)),
            },
            Frame::LeafSet(set) => match child.as_ref() {
                NormalizedNode::LeafSetEntry(entry) => {
                    set.values.insert(entry.value.clone());
                    Ok(())
                }
                _ => Err(invalid(&child)),
            },
            Frame::Leaf { .. } | Frame::AnyData { .. } => Err(invalid(&child)),
        }
    }
}

/// Collects a stream of events into a single root node.
#[derive(Debug, Default)]
pub struct NormalizedNodeResult {
    stack: Vec<Frame>,
    result: Option<NormalizedNode>,
}

impl NormalizedNodeResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.stack.is_empty() && self.result.is_some()
    }

    /// The finished root node.
    pub fn into_result(self) -> Result<NormalizedNode, WriterError> {
        if !self.stack.is_empty() {
            return Err(WriterError::Incomplete);
        }
        self.result.ok_or(WriterError::Incomplete)
    }

    fn complete(&mut self, node: Arc<NormalizedNode>) -> Result<(), WriterError> {
        match self.stack.last_mut() {
            Some(parent) => parent.attach(node),
            None => {
                self.result = Some(Arc::unwrap_or_clone(node));
                Ok(())
            }
        }
    }

    fn push(&mut self, frame: Frame) -> Result<(), WriterError> {
        if self.stack.is_empty() && self.result.is_some() {
            return Err(WriterError::MultipleRoots);
        }
        self.stack.push(frame);
        Ok(())
    }
}

impl NormalizedNodeStreamWriter for NormalizedNodeResult {
    fn start_container_node(&mut self, name: &QName) -> Result<(), WriterError> {
        self.push(Frame::Container(
            ContainerKind::Container,
            NormalizedNode::container(name.clone()),
        ))
    }

    fn start_choice_node(&mut self, name: &QName) -> Result<(), WriterError> {
        self.push(Frame::Container(
            ContainerKind::Choice,
            NormalizedNode::container(name.clone()),
        ))
    }

    fn start_map_node(&mut self, name: &QName, ordered: bool) -> Result<(), WriterError> {
        self.push(Frame::Map(MapNode {
            name: name.clone(),
            ordered,
            entries: IndexMap::new(),
        }))
    }

    fn start_map_entry_node(&mut self, identifier: &PathArgument) -> Result<(), WriterError> {
        self.push(Frame::Container(
            ContainerKind::MapEntry,
            DataContainerNode::new(identifier.clone()),
        ))
    }

    fn start_unkeyed_list(&mut self, name: &QName) -> Result<(), WriterError> {
        self.push(Frame::Unkeyed(UnkeyedListNode {
            name: name.clone(),
            entries: Vec::new(),
        }))
    }

    fn start_unkeyed_list_item(&mut self, name: &QName) -> Result<(), WriterError> {
        self.push(Frame::Container(
            ContainerKind::UnkeyedEntry,
            NormalizedNode::container(name.clone()),
        ))
    }

    fn start_leaf_set(&mut self, name: &QName, ordered: bool) -> Result<(), WriterError> {
        self.push(Frame::LeafSet(LeafSetNode {
            name: name.clone(),
            ordered,
            values: IndexSet::new(),
        }))
    }

    fn start_leaf_set_entry_node(&mut self, name: &QName) -> Result<(), WriterError> {
        self.push(Frame::Leaf {
            name: name.clone(),
            entry: true,
            value: None,
        })
    }

    fn start_leaf_node(&mut self, name: &QName) -> Result<(), WriterError> {
        self.push(Frame::Leaf {
            name: name.clone(),
            entry: false,
            value: None,
        })
    }

    fn start_anydata_node(&mut self, name: &QName) -> Result<(), WriterError> {
        self.push(Frame::AnyData {
            name: name.clone(),
            body: None,
        })
    }

    fn scalar_value(&mut self, value: Value) -> Result<(), WriterError> {
        match self.stack.last_mut() {
            Some(Frame::Leaf { value: slot, .. }) if slot.is_none() => {
                *slot = Some(value);
                Ok(())
            }
            _ => Err(WriterError::UnexpectedValue),
        }
    }

    fn anydata_value(&mut self, body: serde_json::Value) -> Result<(), WriterError> {
        match self.stack.last_mut() {
            Some(Frame::AnyData { body: slot, .. }) if slot.is_none() => {
                *slot = Some(body);
                Ok(())
            }
            _ => Err(WriterError::UnexpectedValue),
        }
    }

    fn end_node(&mut self) -> Result<(), WriterError> {
        let frame = self.stack.pop().ok_or(WriterError::NoOpenNode)?;
        let node = frame.finish()?;
        self.complete(Arc::new(node))
    }

    fn node(&mut self, node: &Arc<NormalizedNode>) -> Result<(), WriterError> {
        if self.stack.is_empty() && self.result.is_some() {
            return Err(WriterError::MultipleRoots);
        }
        self.complete(node.clone())
    }
}

// ── Node → stream ───────────────────────────────────────────────────────────

/// Emits `node` and its subtree as stream events.
pub fn write_normalized_node<W: NormalizedNodeStreamWriter + ?Sized>(
    writer: &mut W,
    node: &NormalizedNode,
) -> Result<(), WriterError> {
    match node {
        NormalizedNode::Container(n) => {
            writer.start_container_node(n.identifier.name())?;
            write_children(writer, n)?;
        }
        NormalizedNode::Choice(n) => {
            writer.start_choice_node(n.identifier.name())?;
            write_children(writer, n)?;
        }
        NormalizedNode::MapEntry(n) => {
            writer.start_map_entry_node(&n.identifier)?;
            write_children(writer, n)?;
        }
        NormalizedNode::UnkeyedListEntry(n) => {
            writer.start_unkeyed_list_item(n.identifier.name())?;
            write_children(writer, n)?;
        }
        NormalizedNode::Map(n) => {
            writer.start_map_node(&n.name, n.ordered)?;
            for entry in n.entries.values() {
                write_normalized_node(writer, entry)?;
            }
        }
        NormalizedNode::UnkeyedList(n) => {
            writer.start_unkeyed_list(&n.name)?;
            for entry in &n.entries {
                write_normalized_node(writer, entry)?;
            }
        }
        NormalizedNode::LeafSet(n) => {
            writer.start_leaf_set(&n.name, n.ordered)?;
            for value in &n.values {
                writer.start_leaf_set_entry_node(&n.name)?;
                writer.scalar_value(value.clone())?;
                writer.end_node()?;
            }
        }
        NormalizedNode::LeafSetEntry(n) => {
            writer.start_leaf_set_entry_node(&n.name)?;
            writer.scalar_value(n.value.clone())?;
        }
        NormalizedNode::Leaf(n) => {
            writer.start_leaf_node(&n.name)?;
            writer.scalar_value(n.value.clone())?;
        }
        NormalizedNode::AnyData(n) => {
            writer.start_anydata_node(&n.name)?;
            writer.anydata_value(n.body.clone())?;
        }
    }
    writer.end_node()
}

fn write_children<W: NormalizedNodeStreamWriter + ?Sized>(
    writer: &mut W,
    container: &DataContainerNode,
) -> Result<(), WriterError> {
    for child in container.children.values() {
        write_normalized_node(writer, child)?;
    }
    Ok(())
}
