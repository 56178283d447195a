//! Normalized data tree.
//!
//! Children are reference counted so that a subtree can be shared by many
//! holders (views, caches, synthetic containers) without copying.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::path::PathArgument;
use crate::qname::QName;
use crate::value::Value;

/// Children of a data container, keyed by their identifier.
pub type Children = IndexMap<PathArgument, Arc<NormalizedNode>>;

/// A container, choice, keyed list entry or unkeyed list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataContainerNode {
    pub identifier: PathArgument,
    pub children: Children,
}

impl DataContainerNode {
    pub fn new(identifier: PathArgument) -> Self {
        Self {
            identifier,
            children: Children::new(),
        }
    }

    pub fn child(&self, arg: &PathArgument) -> Option<&Arc<NormalizedNode>> {
        self.children.get(arg)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn with_child(mut self, child: NormalizedNode) -> Self {
        self.children.insert(child.identifier(), Arc::new(child));
        self
    }
}

/// A keyed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapNode {
    pub name: QName,
    pub ordered: bool,
    pub entries: IndexMap<PathArgument, Arc<NormalizedNode>>,
}

/// An unkeyed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnkeyedListNode {
    pub name: QName,
    pub entries: Vec<Arc<NormalizedNode>>,
}

/// A leaf-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSetNode {
    pub name: QName,
    pub ordered: bool,
    pub values: IndexSet<Value>,
}

/// A single leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub name: QName,
    pub value: Value,
}

/// An anydata node carrying an opaque document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyDataNode {
    pub name: QName,
    pub body: serde_json::Value,
}

/// A node of the normalized tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedNode {
    Container(DataContainerNode),
    Choice(DataContainerNode),
    Map(MapNode),
    MapEntry(DataContainerNode),
    UnkeyedList(UnkeyedListNode),
    UnkeyedListEntry(DataContainerNode),
    LeafSet(LeafSetNode),
    LeafSetEntry(LeafNode),
    Leaf(LeafNode),
    AnyData(AnyDataNode),
}

impl NormalizedNode {
    pub fn container(name: QName) -> DataContainerNode {
        DataContainerNode::new(PathArgument::NodeIdentifier(name))
    }

    pub fn leaf(name: QName, value: impl Into<Value>) -> Self {
        Self::Leaf(LeafNode {
            name,
            value: value.into(),
        })
    }

    /// The identifier this node is stored under in its parent.
    pub fn identifier(&self) -> PathArgument {
        match self {
            Self::Container(n)
            | Self::Choice(n)
            | Self::MapEntry(n)
            | Self::UnkeyedListEntry(n) => n.identifier.clone(),
            Self::Map(n) => PathArgument::NodeIdentifier(n.name.clone()),
            Self::UnkeyedList(n) => PathArgument::NodeIdentifier(n.name.clone()),
            Self::LeafSet(n) => PathArgument::NodeIdentifier(n.name.clone()),
            Self::LeafSetEntry(n) => PathArgument::NodeWithValue {
                name: n.name.clone(),
                value: n.value.clone(),
            },
            Self::Leaf(n) => PathArgument::NodeIdentifier(n.name.clone()),
            Self::AnyData(n) => PathArgument::NodeIdentifier(n.name.clone()),
        }
    }

    pub fn name(&self) -> QName {
        self.identifier().name().clone()
    }

    /// The container body of containers, choices and list entries.
    pub fn as_data_container(&self) -> Option<&DataContainerNode> {
        match self {
            Self::Container(n)
            | Self::Choice(n)
            | Self::MapEntry(n)
            | Self::UnkeyedListEntry(n) => Some(n),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::Choice(_) => "choice",
            Self::Map(_) => "map",
            Self::MapEntry(_) => "map entry",
            Self::UnkeyedList(_) => "unkeyed list",
            Self::UnkeyedListEntry(_) => "unkeyed list entry",
            Self::LeafSet(_) => "leaf-set",
            Self::LeafSetEntry(_) => "leaf-set entry",
            Self::Leaf(_) => "leaf",
            Self::AnyData(_) => "anydata",
        }
    }
}
