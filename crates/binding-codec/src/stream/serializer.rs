//! Object serializers and their per-type registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::BindingStreamEventWriter;
use crate::binding::{AccessorKind, BindingValue, DataObject, ObjectKind, ObjectType, TypeName};
use crate::cache::{CachingSerializer, NodeCache};
use crate::error::{CodecError, Result};

/// Emits the events describing one object.
pub trait DataObjectSerializer: fmt::Debug + Send + Sync {
    fn serialize(
        &self,
        object: &Arc<dyn DataObject>,
        writer: &mut dyn BindingStreamEventWriter,
        registry: &SerializerRegistry,
    ) -> Result<()>;
}

/// Walks an object's accessors in declaration order, then its
/// augmentations.
#[derive(Debug)]
pub struct ObjectSerializer {
    type_: ObjectType,
}

impl ObjectSerializer {
    pub fn new(type_: ObjectType) -> Self {
        Self { type_ }
    }

    /// Objects of these kinds own a whole tree node, so a backing node can be
    /// emitted as is.
    fn owns_node(&self) -> bool {
        matches!(
            self.type_.kind,
            ObjectKind::Container
                | ObjectKind::ListEntry
                | ObjectKind::Notification
                | ObjectKind::Input
                | ObjectKind::Output
        )
    }

    fn start(
        &self,
        object: &dyn DataObject,
        writer: &mut dyn BindingStreamEventWriter,
    ) -> Result<()> {
        let name = self.type_.name();
        match &self.type_.kind {
            ObjectKind::Container
            | ObjectKind::Notification
            | ObjectKind::Input
            | ObjectKind::Output => writer.start_container_node(name),
            ObjectKind::ListEntry if self.type_.key.is_some() => {
                let key = object.key()?.ok_or_else(|| {
                    CodecError::InvalidArgument(format!("{name} entry has no key"))
                })?;
                writer.start_map_entry_node(&key)
            }
            ObjectKind::ListEntry => writer.start_unkeyed_list_item(),
            ObjectKind::Case { .. } => writer.start_case(name),
            ObjectKind::Augmentation { .. } => writer.start_augmentation_node(name),
            ObjectKind::Choice => Err(CodecError::InvalidArgument(format!(
                "choice {name} has no instances of its own"
            ))),
        }
    }
}

fn mismatch(owner: &TypeName, property: &str, expected: &str, value: &BindingValue) -> CodecError {
    CodecError::InvalidArgument(format!(
        "{owner}.{property} expects {expected}, got {}",
        value.kind()
    ))
}

impl DataObjectSerializer for ObjectSerializer {
    fn serialize(
        &self,
        object: &Arc<dyn DataObject>,
        writer: &mut dyn BindingStreamEventWriter,
        registry: &SerializerRegistry,
    ) -> Result<()> {
        if self.owns_node() {
            if let Some(node) = object.backing_node() {
                return writer.normalized_node(node);
            }
        }
        let owner = self.type_.name();
        self.start(object.as_ref(), writer)?;
        for accessor in &self.type_.accessors {
            let Some(value) = object.get(&accessor.property)? else {
                continue;
            };
            let property = accessor.property.as_str();
            match (&accessor.kind, &value) {
                (AccessorKind::Leaf, value) => writer.leaf_node(&accessor.yang_name, value)?,
                (AccessorKind::AnyData, value) => writer.anydata_node(&accessor.yang_name, value)?,
                (AccessorKind::LeafList, BindingValue::LeafList(values)) => {
                    if values.is_empty() {
                        continue;
                    }
                    writer.start_leaf_set(&accessor.yang_name)?;
                    for value in values {
                        writer.leaf_set_entry_node(value)?;
                    }
                    writer.end_node()?;
                }
                (AccessorKind::Container(_), BindingValue::Object(child)) => {
                    registry.serialize(child, writer)?
                }
                (AccessorKind::Choice(choice), BindingValue::Object(case)) => {
                    writer.start_choice_node(choice)?;
                    registry.serialize(case, writer)?;
                    writer.end_node()?;
                }
                (AccessorKind::List(entry_type), BindingValue::List(entries)) => {
                    let Some(first) = entries.first() else {
                        continue;
                    };
                    if first.implemented_type().key.is_some() {
                        writer.start_map_node(entry_type)?;
                    } else {
                        writer.start_unkeyed_list(entry_type)?;
                    }
                    for entry in entries {
                        registry.serialize(entry, writer)?;
                    }
                    writer.end_node()?;
                }
                (AccessorKind::LeafList, value) => {
                    return Err(mismatch(owner, property, "leaf-list values", value))
                }
                (AccessorKind::Container(_) | AccessorKind::Choice(_), value) => {
                    return Err(mismatch(owner, property, "an object", value))
                }
                (AccessorKind::List(_), value) => {
                    return Err(mismatch(owner, property, "a list of objects", value))
                }
            }
        }
        for augmentation in object.augmentations()?.values() {
            registry.serialize(augmentation, writer)?;
        }
        writer.end_node()
    }
}

fn poisoned<T>(_: T) -> CodecError {
    CodecError::Internal("serializer registry lock poisoned".into())
}

/// Serializers by object type, created on first use.
///
/// Types with a cache get a caching serializer; every other type walks its
/// accessors.
#[derive(Debug)]
pub struct SerializerRegistry {
    serializers: RwLock<HashMap<TypeName, Arc<dyn DataObjectSerializer>>>,
    caches: HashMap<TypeName, Arc<NodeCache>>,
}

impl SerializerRegistry {
    pub(crate) fn new(caches: HashMap<TypeName, Arc<NodeCache>>) -> Self {
        Self {
            serializers: RwLock::new(HashMap::new()),
            caches,
        }
    }

    pub(crate) fn cache(&self, type_name: &TypeName) -> Option<&Arc<NodeCache>> {
        self.caches.get(type_name)
    }

    pub fn has_cache(&self, type_name: &TypeName) -> bool {
        self.caches.contains_key(type_name)
    }

    pub fn serializer_for(&self, type_: &ObjectType) -> Result<Arc<dyn DataObjectSerializer>> {
        if let Some(found) = self.serializers.read().map_err(poisoned)?.get(type_.name()) {
            return Ok(found.clone());
        }
        let created: Arc<dyn DataObjectSerializer> = match self.caches.get(type_.name()) {
            Some(cache) => Arc::new(CachingSerializer::new(cache.clone())),
            None => Arc::new(ObjectSerializer::new(type_.clone())),
        };
        let mut serializers = self.serializers.write().map_err(poisoned)?;
        Ok(serializers.entry(type_.name().clone()).or_insert(created).clone())
    }

    /// Serializes `object` with the serializer of its type.
    pub fn serialize(
        &self,
        object: &Arc<dyn DataObject>,
        writer: &mut dyn BindingStreamEventWriter,
    ) -> Result<()> {
        self.serializer_for(object.implemented_type())?
            .serialize(object, writer, self)
    }
}
