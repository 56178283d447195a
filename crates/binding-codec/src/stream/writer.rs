//! Adapter from object-level events to tree events.

use std::sync::Arc;

use yang_data::{NormalizedNode, NormalizedNodeStreamWriter, QName, WriterError};

use super::BindingStreamEventWriter;
use crate::binding::{BindingValue, Key, ObjectType, TypeName};
use crate::context::CodecContext;
use crate::error::{CodecError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// Container, choice, notification, input or output.
    Node,
    List,
    Entry,
    LeafSet,
    /// Case or augmentation; no tree node of its own.
    Transparent,
}

#[derive(Debug)]
struct Frame {
    ctx: Arc<CodecContext>,
    kind: FrameKind,
}

/// Translates [`BindingStreamEventWriter`] events into
/// [`NormalizedNodeStreamWriter`] events.
///
/// The first event must open the object the writer was created for.
pub struct BindingToNormalizedStreamWriter<'a> {
    root: Arc<CodecContext>,
    delegate: &'a mut dyn NormalizedNodeStreamWriter,
    stack: Vec<Frame>,
}

impl<'a> BindingToNormalizedStreamWriter<'a> {
    pub fn new(root: Arc<CodecContext>, delegate: &'a mut dyn NormalizedNodeStreamWriter) -> Self {
        Self {
            root,
            delegate,
            stack: Vec::new(),
        }
    }

    /// Context of the child object `type_name` of the current node.
    fn child_context(&self, type_name: &TypeName) -> Result<Arc<CodecContext>> {
        match self.stack.last() {
            None => {
                if self.root.object_type().map(ObjectType::name) == Some(type_name) {
                    Ok(self.root.clone())
                } else {
                    Err(CodecError::IncorrectNesting(format!(
                        "{type_name} cannot start a stream for {}",
                        self.root.object_type().map(|t| t.name().to_string()).unwrap_or_default()
                    )))
                }
            }
            Some(frame) => match frame.kind {
                FrameKind::List | FrameKind::LeafSet => Err(CodecError::IncorrectNesting(format!(
                    "{type_name} cannot be a direct child of a list"
                ))),
                _ => frame.ctx.stream_child(type_name),
            },
        }
    }

    /// Context holding leaf-like children of the current node.
    fn parent(&self) -> Result<&Arc<CodecContext>> {
        match self.stack.last() {
            Some(Frame {
                ctx,
                kind: FrameKind::Node | FrameKind::Entry | FrameKind::Transparent,
            }) => Ok(ctx),
            _ => Err(CodecError::IncorrectNesting("leaf outside of an open object".into())),
        }
    }

    /// The list whose entry is being started.
    fn open_list(&self) -> Result<Arc<CodecContext>> {
        match self.stack.last() {
            None => Ok(self.root.clone()),
            Some(Frame {
                ctx,
                kind: FrameKind::List,
            }) => Ok(ctx.clone()),
            Some(_) => Err(CodecError::IncorrectNesting("list entry outside of a list".into())),
        }
    }

    fn push(&mut self, ctx: Arc<CodecContext>, kind: FrameKind) {
        self.stack.push(Frame { ctx, kind });
    }
}

fn tree_name(ctx: &CodecContext) -> Result<QName> {
    ctx.qname()
        .cloned()
        .ok_or_else(|| CodecError::Internal(format!("a {} context has no tree name", ctx.kind())))
}

fn unexpected(ctx: &CodecContext, event: &str) -> CodecError {
    CodecError::IncorrectNesting(format!(
        "{event} cannot open {} {}",
        ctx.kind(),
        ctx.object_type().map(|t| t.name().to_string()).unwrap_or_default()
    ))
}

impl BindingStreamEventWriter for BindingToNormalizedStreamWriter<'_> {
    fn start_container_node(&mut self, type_name: &TypeName) -> Result<()> {
        let ctx = self.child_context(type_name)?;
        if !ctx.is_container_like() {
            return Err(unexpected(&ctx, "start_container_node"));
        }
        self.delegate.start_container_node(&tree_name(&ctx)?)?;
        self.push(ctx, FrameKind::Node);
        Ok(())
    }

    fn start_map_node(&mut self, type_name: &TypeName) -> Result<()> {
        let ctx = self.child_context(type_name)?;
        let CodecContext::KeyedList(list) = ctx.as_ref() else {
            return Err(unexpected(&ctx, "start_map_node"));
        };
        self.delegate.start_map_node(list.qname(), list.is_ordered())?;
        self.push(ctx, FrameKind::List);
        Ok(())
    }

    fn start_map_entry_node(&mut self, key: &Key) -> Result<()> {
        let ctx = self.open_list()?;
        let CodecContext::KeyedList(list) = ctx.as_ref() else {
            return Err(unexpected(&ctx, "start_map_entry_node"));
        };
        let arg = list.entry_argument(key)?;
        self.delegate.start_map_entry_node(&arg)?;
        self.push(ctx, FrameKind::Entry);
        Ok(())
    }

    fn start_unkeyed_list(&mut self, type_name: &TypeName) -> Result<()> {
        let ctx = self.child_context(type_name)?;
        let CodecContext::List(list) = ctx.as_ref() else {
            return Err(unexpected(&ctx, "start_unkeyed_list"));
        };
        self.delegate.start_unkeyed_list(list.qname())?;
        self.push(ctx, FrameKind::List);
        Ok(())
    }

    fn start_unkeyed_list_item(&mut self) -> Result<()> {
        let ctx = self.open_list()?;
        let CodecContext::List(list) = ctx.as_ref() else {
            return Err(unexpected(&ctx, "start_unkeyed_list_item"));
        };
        self.delegate.start_unkeyed_list_item(list.qname())?;
        self.push(ctx, FrameKind::Entry);
        Ok(())
    }

    fn start_choice_node(&mut self, type_name: &TypeName) -> Result<()> {
        let ctx = self.child_context(type_name)?;
        let CodecContext::Choice(choice) = ctx.as_ref() else {
            return Err(unexpected(&ctx, "start_choice_node"));
        };
        self.delegate.start_choice_node(choice.qname())?;
        self.push(ctx, FrameKind::Node);
        Ok(())
    }

    fn start_case(&mut self, type_name: &TypeName) -> Result<()> {
        let ctx = self.child_context(type_name)?;
        if !matches!(ctx.as_ref(), CodecContext::Case(_)) {
            return Err(unexpected(&ctx, "start_case"));
        }
        self.push(ctx, FrameKind::Transparent);
        Ok(())
    }

    fn start_augmentation_node(&mut self, type_name: &TypeName) -> Result<()> {
        let ctx = self.child_context(type_name)?;
        if !matches!(ctx.as_ref(), CodecContext::Augmentation(_)) {
            return Err(unexpected(&ctx, "start_augmentation_node"));
        }
        self.push(ctx, FrameKind::Transparent);
        Ok(())
    }

    fn leaf_node(&mut self, name: &str, value: &BindingValue) -> Result<()> {
        let ctx = self.parent()?.leaf_child(name)?;
        let CodecContext::Leaf(leaf) = ctx.as_ref() else {
            return Err(unexpected(&ctx, "leaf_node"));
        };
        let value = leaf.serialize_value(value)?;
        self.delegate.start_leaf_node(leaf.qname())?;
        self.delegate.scalar_value(value)?;
        self.delegate.end_node()?;
        Ok(())
    }

    fn start_leaf_set(&mut self, name: &str) -> Result<()> {
        let ctx = self.parent()?.leaf_child(name)?;
        let CodecContext::LeafSet(set) = ctx.as_ref() else {
            return Err(unexpected(&ctx, "start_leaf_set"));
        };
        self.delegate.start_leaf_set(set.qname(), set.is_ordered())?;
        self.push(ctx, FrameKind::LeafSet);
        Ok(())
    }

    fn leaf_set_entry_node(&mut self, value: &BindingValue) -> Result<()> {
        let Some(Frame {
            ctx,
            kind: FrameKind::LeafSet,
        }) = self.stack.last()
        else {
            return Err(CodecError::IncorrectNesting(
                "leaf-list entry outside of a leaf-list".into(),
            ));
        };
        let CodecContext::LeafSet(set) = ctx.as_ref() else {
            return Err(unexpected(ctx, "leaf_set_entry_node"));
        };
        let value = set.serialize_value(value)?;
        self.delegate.start_leaf_set_entry_node(set.qname())?;
        self.delegate.scalar_value(value)?;
        self.delegate.end_node()?;
        Ok(())
    }

    fn anydata_node(&mut self, name: &str, value: &BindingValue) -> Result<()> {
        let ctx = self.parent()?.leaf_child(name)?;
        let CodecContext::Opaque(opaque) = ctx.as_ref() else {
            return Err(unexpected(&ctx, "anydata_node"));
        };
        let body = opaque.body(value)?.clone();
        self.delegate.start_anydata_node(opaque.qname())?;
        self.delegate.anydata_value(body)?;
        self.delegate.end_node()?;
        Ok(())
    }

    fn end_node(&mut self) -> Result<()> {
        let frame = self.stack.pop().ok_or(WriterError::NoOpenNode)?;
        if frame.kind != FrameKind::Transparent {
            self.delegate.end_node()?;
        }
        Ok(())
    }

    fn normalized_node(&mut self, node: &Arc<NormalizedNode>) -> Result<()> {
        Ok(self.delegate.node(node)?)
    }
}
