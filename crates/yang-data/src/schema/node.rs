//! Schema nodes and their builder.

use std::sync::Arc;

use super::types::TypeDefinition;
use crate::qname::QName;

/// Leaf properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSchema {
    pub type_: TypeDefinition,
    /// Lexical default value.
    pub default: Option<String>,
    pub mandatory: bool,
}

/// The statement a schema node was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNodeKind {
    Container { presence: bool },
    List { keys: Vec<QName>, ordered: bool },
    Choice,
    Case,
    Leaf(LeafSchema),
    LeafList { type_: TypeDefinition, ordered: bool },
    AnyData,
    Notification,
    Rpc,
    Action,
    Input,
    Output,
}

impl SchemaNodeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Container { .. } => "container",
            Self::List { .. } => "list",
            Self::Choice => "choice",
            Self::Case => "case",
            Self::Leaf(_) => "leaf",
            Self::LeafList { .. } => "leaf-list",
            Self::AnyData => "anydata",
            Self::Notification => "notification",
            Self::Rpc => "rpc",
            Self::Action => "action",
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// An immutable node of the compiled schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    pub qname: QName,
    pub kind: SchemaNodeKind,
    pub children: Vec<Arc<SchemaNode>>,
}

impl SchemaNode {
    pub fn container(qname: QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(qname, SchemaNodeKind::Container { presence: false })
    }

    pub fn presence_container(qname: QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(qname, SchemaNodeKind::Container { presence: true })
    }

    /// A list; an empty `keys` declares an unkeyed list.
    pub fn list(qname: QName, keys: impl IntoIterator<Item = QName>) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(
            qname,
            SchemaNodeKind::List {
                keys: keys.into_iter().collect(),
                ordered: false,
            },
        )
    }

    pub fn choice(qname: QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(qname, SchemaNodeKind::Choice)
    }

    pub fn case(qname: QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(qname, SchemaNodeKind::Case)
    }

    pub fn leaf(qname: QName, type_: TypeDefinition) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(
            qname,
            SchemaNodeKind::Leaf(LeafSchema {
                type_,
                default: None,
                mandatory: false,
            }),
        )
    }

    pub fn leaf_list(qname: QName, type_: TypeDefinition) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(
            qname,
            SchemaNodeKind::LeafList {
                type_,
                ordered: false,
            },
        )
    }

    pub fn anydata(qname: QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(qname, SchemaNodeKind::AnyData)
    }

    pub fn notification(qname: QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(qname, SchemaNodeKind::Notification)
    }

    pub fn rpc(qname: QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(qname, SchemaNodeKind::Rpc)
    }

    pub fn action(qname: QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(qname, SchemaNodeKind::Action)
    }

    /// Input of an rpc or action, named `input` in the operation's module.
    pub fn input(operation: &QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(operation.module.qname("input"), SchemaNodeKind::Input)
    }

    pub fn output(operation: &QName) -> SchemaNodeBuilder {
        SchemaNodeBuilder::new(operation.module.qname("output"), SchemaNodeKind::Output)
    }

    /// Direct child with exactly this name.
    pub fn child(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.children.iter().find(|c| &c.qname == qname)
    }

    /// Direct children with this local name, in declaration order.
    pub fn children_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Arc<SchemaNode>> {
        self.children
            .iter()
            .filter(move |c| c.qname.local_name() == local_name)
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, SchemaNodeKind::Choice)
    }

    pub fn is_case(&self) -> bool {
        matches!(self.kind, SchemaNodeKind::Case)
    }

    /// Key leaf names of a keyed list, in declaration order.
    pub fn list_keys(&self) -> &[QName] {
        match &self.kind {
            SchemaNodeKind::List { keys, .. } => keys,
            _ => &[],
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafSchema> {
        match &self.kind {
            SchemaNodeKind::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }
}

/// Builder for [`SchemaNode`].
#[derive(Debug, Clone)]
pub struct SchemaNodeBuilder {
    qname: QName,
    kind: SchemaNodeKind,
    children: Vec<Arc<SchemaNode>>,
}

impl SchemaNodeBuilder {
    fn new(qname: QName, kind: SchemaNodeKind) -> Self {
        Self {
            qname,
            kind,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: impl Into<Arc<SchemaNode>>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Arc<SchemaNode>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Marks a list or leaf-list as `ordered-by user`.
    pub fn ordered(mut self) -> Self {
        match &mut self.kind {
            SchemaNodeKind::List { ordered, .. } | SchemaNodeKind::LeafList { ordered, .. } => {
                *ordered = true
            }
            _ => {}
        }
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        if let SchemaNodeKind::Leaf(leaf) = &mut self.kind {
            leaf.default = Some(value.into());
        }
        self
    }

    pub fn mandatory(mut self) -> Self {
        if let SchemaNodeKind::Leaf(leaf) = &mut self.kind {
            leaf.mandatory = true;
        }
        self
    }

    pub fn build(self) -> Arc<SchemaNode> {
        Arc::new(SchemaNode {
            qname: self.qname,
            kind: self.kind,
            children: self.children,
        })
    }
}

impl From<SchemaNodeBuilder> for Arc<SchemaNode> {
    fn from(builder: SchemaNodeBuilder) -> Self {
        builder.build()
    }
}
