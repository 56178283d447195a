//! The codec context tree.
//!
//! One [`CodecContext`] exists per object type (and per leaf accessor) for the
//! lifetime of the owning [`BindingCodecTree`](crate::BindingCodecTree).
//! Contexts are built on first use and never change afterwards, except for
//! child slots that are filled lazily.

pub mod choice;
pub mod data_object;
pub mod leaf;
pub mod list;

use std::sync::Arc;

use yang_data::{NormalizedNode, PathArgument, QName};

pub use choice::ChoiceContext;
pub use data_object::DataObjectContext;
pub use leaf::{LeafContext, LeafSetContext, OpaqueContext};
pub use list::ListContext;

use crate::binding::{BindingValue, DataObject, ObjectType, PathStep, TypeName};
use crate::error::{CodecError, Result};
use crate::view::ObjectView;

/// A node of the codec tree.
#[derive(Debug)]
pub enum CodecContext {
    Leaf(LeafContext),
    LeafSet(LeafSetContext),
    /// Presence container.
    Container(DataObjectContext),
    /// Non-presence container; reads as an empty instance when absent.
    StructuralContainer(DataObjectContext),
    List(ListContext),
    KeyedList(ListContext),
    Choice(ChoiceContext),
    Case(DataObjectContext),
    Augmentation(DataObjectContext),
    Notification(DataObjectContext),
    /// Rpc or action input and output.
    ContainerLike(DataObjectContext),
    Opaque(OpaqueContext),
}

impl CodecContext {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::LeafSet(_) => "leaf-list",
            Self::Container(_) => "container",
            Self::StructuralContainer(_) => "structural container",
            Self::List(_) => "list",
            Self::KeyedList(_) => "keyed list",
            Self::Choice(_) => "choice",
            Self::Case(_) => "case",
            Self::Augmentation(_) => "augmentation",
            Self::Notification(_) => "notification",
            Self::ContainerLike(_) => "input/output",
            Self::Opaque(_) => "anydata",
        }
    }

    /// Tree name of the node this context reads; `None` for cases and
    /// augmentations, which have no node of their own.
    pub fn qname(&self) -> Option<&QName> {
        match self {
            Self::Leaf(c) => Some(c.qname()),
            Self::LeafSet(c) => Some(c.qname()),
            Self::Opaque(c) => Some(c.qname()),
            Self::List(c) | Self::KeyedList(c) => Some(c.qname()),
            Self::Choice(c) => Some(c.qname()),
            Self::Container(c)
            | Self::StructuralContainer(c)
            | Self::Case(c)
            | Self::Augmentation(c)
            | Self::Notification(c)
            | Self::ContainerLike(c) => c.qname(),
        }
    }

    /// Object type of this context; lists report their entry type.
    pub fn object_type(&self) -> Option<&ObjectType> {
        match self {
            Self::Choice(c) => Some(c.object_type()),
            _ => self.as_data_object().map(DataObjectContext::object_type),
        }
    }

    /// The context reading data containers; the entry context for lists.
    pub fn as_data_object(&self) -> Option<&DataObjectContext> {
        match self {
            Self::Container(c)
            | Self::StructuralContainer(c)
            | Self::Case(c)
            | Self::Augmentation(c)
            | Self::Notification(c)
            | Self::ContainerLike(c) => Some(c),
            Self::List(l) | Self::KeyedList(l) => Some(l.entry()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListContext> {
        match self {
            Self::List(l) | Self::KeyedList(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&ChoiceContext> {
        match self {
            Self::Choice(c) => Some(c),
            _ => None,
        }
    }

    /// True for contexts whose instances are written as a container node.
    pub(crate) fn is_container_like(&self) -> bool {
        matches!(
            self,
            Self::Container(_)
                | Self::StructuralContainer(_)
                | Self::Notification(_)
                | Self::ContainerLike(_)
        )
    }

    /// Reads `node` as the value this context produces.
    ///
    /// Data containers and list entries become [`ObjectView`]s sharing
    /// `node`. An empty choice node reads as absent.
    pub fn deserialize(
        self: &Arc<Self>,
        node: &Arc<NormalizedNode>,
    ) -> Result<Option<BindingValue>> {
        match (self.as_ref(), node.as_ref()) {
            (Self::Leaf(c), n) => c.deserialize(n).map(Some),
            (Self::LeafSet(c), n) => c.deserialize(n).map(Some),
            (Self::Opaque(c), n) => c.deserialize(n).map(Some),
            (Self::Choice(c), _) => c.deserialize(node),
            (
                Self::Container(_)
                | Self::StructuralContainer(_)
                | Self::Notification(_)
                | Self::ContainerLike(_),
                NormalizedNode::Container(_),
            )
            | (Self::Case(_), NormalizedNode::Choice(_))
            | (Self::Augmentation(_), NormalizedNode::Container(_))
            | (Self::KeyedList(_), NormalizedNode::MapEntry(_))
            | (Self::List(_), NormalizedNode::UnkeyedListEntry(_)) => {
                self.view(node).map(|object| Some(BindingValue::Object(object)))
            }
            (Self::KeyedList(list) | Self::List(list), n) => {
                let entries = list
                    .entries(n)?
                    .into_iter()
                    .map(|entry| self.view(entry))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Some(BindingValue::List(entries)))
            }
            (ctx, n) => Err(CodecError::MalformedData(format!(
                "{} {} cannot read {} {}",
                ctx.kind(),
                ctx.object_type().map(|t| t.name().to_string()).unwrap_or_default(),
                n.kind(),
                n.name()
            ))),
        }
    }

    fn view(self: &Arc<Self>, node: &Arc<NormalizedNode>) -> Result<Arc<dyn DataObject>> {
        Ok(Arc::new(ObjectView::new(self.clone(), node.clone())?))
    }

    /// Writes `value` as the tree node this context produces.
    pub fn serialize(self: &Arc<Self>, value: &BindingValue) -> Result<NormalizedNode> {
        match self.as_ref() {
            Self::Leaf(c) => c.serialize(value),
            Self::LeafSet(c) => c.serialize(value),
            Self::Opaque(c) => c.serialize(value),
            _ => {
                let tree = self.tree()?;
                crate::stream::serialize_value(self, value, tree.registry())
            }
        }
    }

    fn tree(&self) -> Result<Arc<crate::tree::TreeInner>> {
        match self {
            Self::Choice(c) => c.tree(),
            _ => self
                .as_data_object()
                .ok_or_else(|| CodecError::Internal(format!("{} has no owning tree", self.kind())))?
                .tree(),
        }
    }

    pub fn child_by_tree_argument(&self, arg: &PathArgument) -> Result<Arc<CodecContext>> {
        match self {
            Self::Choice(c) => c.child_by_tree_argument(arg),
            _ => self.require_data_object()?.child_by_tree_argument(arg),
        }
    }

    /// Resolves the child addressed by `step`, appending the tree arguments
    /// it maps to.
    pub fn child_by_path_step(
        &self,
        step: &PathStep,
        builder: &mut Vec<PathArgument>,
    ) -> Result<Arc<CodecContext>> {
        match self {
            Self::Choice(c) => c.child_by_path_step(step, builder),
            _ => self.require_data_object()?.child_by_path_step(step, builder),
        }
    }

    /// Resolves a child by its object type, descending into augmentations
    /// and choice cases.
    pub fn stream_child(&self, type_name: &TypeName) -> Result<Arc<CodecContext>> {
        match self {
            Self::Choice(c) => c.stream_child(type_name),
            _ => self.require_data_object()?.stream_child(type_name),
        }
    }

    pub fn leaf_child(&self, name: &str) -> Result<Arc<CodecContext>> {
        self.require_data_object()?.leaf_child(name)
    }

    fn require_data_object(&self) -> Result<&DataObjectContext> {
        self.as_data_object().ok_or_else(|| {
            CodecError::IncorrectNesting(format!(
                "{} {} has no children",
                self.kind(),
                self.qname().map(ToString::to_string).unwrap_or_default()
            ))
        })
    }

    /// Appends the tree arguments addressing this context through `step`.
    pub(crate) fn add_tree_arguments(
        &self,
        step: &PathStep,
        builder: &mut Vec<PathArgument>,
    ) -> Result<()> {
        match self {
            Self::Case(_) | Self::Augmentation(_) => Ok(()),
            Self::KeyedList(list) => {
                builder.push(PathArgument::node(list.qname().clone()));
                match step.key() {
                    Some(key) => builder.push(list.entry_argument(key)?),
                    None => builder.push(PathArgument::node(list.qname().clone())),
                }
                Ok(())
            }
            Self::List(list) => {
                if step.key().is_some() {
                    return Err(CodecError::MalformedPath(format!(
                        "{step} addresses unkeyed list {} by key",
                        list.qname()
                    )));
                }
                builder.push(PathArgument::node(list.qname().clone()));
                builder.push(PathArgument::node(list.qname().clone()));
                Ok(())
            }
            Self::Container(_)
            | Self::StructuralContainer(_)
            | Self::Notification(_)
            | Self::ContainerLike(_)
            | Self::Choice(_) => {
                if step.key().is_some() {
                    return Err(CodecError::MalformedPath(format!(
                        "{step} carries a key but {} is not a list",
                        self.kind()
                    )));
                }
                if let Some(qname) = self.qname() {
                    builder.push(PathArgument::node(qname.clone()));
                }
                Ok(())
            }
            Self::Leaf(_) | Self::LeafSet(_) | Self::Opaque(_) => {
                Err(CodecError::MalformedPath(format!(
                    "{step} cannot address {} {}",
                    self.kind(),
                    self.qname().map(ToString::to_string).unwrap_or_default()
                )))
            }
        }
    }
}

/// Whether `candidate` can stand in for `local`: same capabilities and the
/// same accessors with the same kinds.
pub(crate) fn is_substitution(candidate: &ObjectType, local: &ObjectType) -> bool {
    candidate.capabilities == local.capabilities
        && candidate.accessors.len() == local.accessors.len()
        && candidate
            .accessors
            .iter()
            .zip(&local.accessors)
            .all(|(a, b)| a.property == b.property && a.kind == b.kind)
}
