//! Lazily decoded objects backed by tree nodes.

use std::fmt;
use std::sync::{Arc, OnceLock};

use yang_data::{DataContainerNode, NormalizedNode};

use crate::binding::{AccessorKind, Augmentations, BindingValue, DataObject, Key, ObjectType};
use crate::context::{CodecContext, DataObjectContext};
use crate::error::{CodecError, Result};

/// An object reading its properties from a tree node on demand.
///
/// Every property is decoded at most once per view. Concurrent first reads
/// may decode twice; the first stored value is the one every reader sees.
pub struct ObjectView {
    ctx: Arc<CodecContext>,
    type_: ObjectType,
    node: Arc<NormalizedNode>,
    memo: Box<[OnceLock<Option<BindingValue>>]>,
    key: OnceLock<Option<Key>>,
    augmentations: OnceLock<Augmentations>,
}

impl ObjectView {
    pub fn new(ctx: Arc<CodecContext>, node: Arc<NormalizedNode>) -> Result<Self> {
        let data = ctx.as_data_object().ok_or_else(|| {
            CodecError::Internal(format!("a {} context cannot back an object", ctx.kind()))
        })?;
        if node.as_data_container().is_none() {
            return Err(CodecError::MalformedData(format!(
                "{} cannot be read from {} {}",
                data.object_type().name(),
                node.kind(),
                node.name()
            )));
        }
        let memo = (0..data.object_type().accessors.len())
            .map(|_| OnceLock::new())
            .collect();
        Ok(Self {
            type_: data.object_type().clone(),
            ctx,
            node,
            memo,
            key: OnceLock::new(),
            augmentations: OnceLock::new(),
        })
    }

    pub fn node(&self) -> &Arc<NormalizedNode> {
        &self.node
    }

    pub fn context(&self) -> &Arc<CodecContext> {
        &self.ctx
    }

    fn data(&self) -> Result<&DataObjectContext> {
        self.ctx
            .as_data_object()
            .ok_or_else(|| CodecError::Internal("view context lost its data object".into()))
    }

    fn container(&self) -> Result<&DataContainerNode> {
        self.node
            .as_data_container()
            .ok_or_else(|| CodecError::Internal("view node is not a data container".into()))
    }

    /// Like [`get`](DataObject::get), but an absent non-presence container
    /// reads as its shared empty instance.
    pub fn nonnull(&self, property: &str) -> Result<BindingValue> {
        let data = self.data()?;
        let (index, accessor) = data
            .object_type()
            .accessor(property)
            .ok_or_else(|| no_property(data.object_type(), property))?;
        if !matches!(accessor.kind, AccessorKind::Container(_)) {
            return Err(CodecError::InvalidArgument(format!(
                "{}.{property} is not a container",
                data.object_type().name()
            )));
        }
        if let Some(value) = self.get(property)? {
            return Ok(value);
        }
        let child = data.child_at(index)?;
        let empty = data.tree()?.empty_instance(&child)?;
        Ok(BindingValue::Object(empty))
    }
}

impl DataObject for ObjectView {
    fn implemented_type(&self) -> &ObjectType {
        &self.type_
    }

    fn get(&self, property: &str) -> Result<Option<BindingValue>> {
        let data = self.data()?;
        let (index, _) = data
            .object_type()
            .accessor(property)
            .ok_or_else(|| no_property(data.object_type(), property))?;
        let slot = &self.memo[index];
        if let Some(value) = slot.get() {
            return Ok(value.clone());
        }
        let value = data.read_child(index, self.container()?)?;
        let _ = slot.set(value);
        Ok(slot.get().cloned().flatten())
    }

    fn key(&self) -> Result<Option<Key>> {
        if let Some(key) = self.key.get() {
            return Ok(key.clone());
        }
        let key = match self.ctx.as_list() {
            Some(list) => list.key_of(&self.container()?.identifier)?,
            None => None,
        };
        let _ = self.key.set(key);
        Ok(self.key.get().cloned().flatten())
    }

    fn augmentations(&self) -> Result<Augmentations> {
        if let Some(augmentations) = self.augmentations.get() {
            return Ok(augmentations.clone());
        }
        let augmentations = self.data()?.read_augmentations(self.container()?)?;
        let _ = self.augmentations.set(augmentations);
        Ok(self.augmentations.get().cloned().unwrap_or_default())
    }

    fn backing_node(&self) -> Option<&Arc<NormalizedNode>> {
        Some(&self.node)
    }
}

impl fmt::Debug for ObjectView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectView")
            .field("type", self.type_.name())
            .field("node", &self.node)
            .finish()
    }
}

fn no_property(type_: &ObjectType, property: &str) -> CodecError {
    CodecError::InvalidArgument(format!("{} has no property {property}", type_.name()))
}
