//! The data object contract and an eagerly populated implementation.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use yang_data::NormalizedNode;

use super::object_type::{KeyDef, ObjectType, TypeName};
use super::value::BindingValue;
use crate::error::{CodecError, Result};

/// Augmentations attached to an object, keyed by augmentation type.
pub type Augmentations = IndexMap<TypeName, Arc<dyn DataObject>>;

/// An instance of an [`ObjectType`].
///
/// Implemented by [`ObjectValue`] for objects built in memory and by
/// [`ObjectView`](crate::view::ObjectView) for objects backed by a tree node.
pub trait DataObject: fmt::Debug + Send + Sync {
    fn implemented_type(&self) -> &ObjectType;

    /// Value of `property`, `None` when absent.
    fn get(&self, property: &str) -> Result<Option<BindingValue>>;

    /// Key of a keyed list entry.
    fn key(&self) -> Result<Option<Key>>;

    fn augmentations(&self) -> Result<Augmentations>;

    /// Tree node backing this object, if any.
    fn backing_node(&self) -> Option<&Arc<NormalizedNode>> {
        None
    }
}

/// Value-based equality across implementations.
///
/// Errors raised while reading either side make the objects unequal.
pub fn data_equals(a: &dyn DataObject, b: &dyn DataObject) -> bool {
    if std::ptr::eq(
        a as *const dyn DataObject as *const u8,
        b as *const dyn DataObject as *const u8,
    ) {
        return true;
    }
    let ty = a.implemented_type();
    if ty.name() != b.implemented_type().name() {
        return false;
    }
    for accessor in &ty.accessors {
        match (a.get(&accessor.property), b.get(&accessor.property)) {
            (Ok(x), Ok(y)) if x == y => {}
            _ => return false,
        }
    }
    match (a.key(), b.key()) {
        (Ok(x), Ok(y)) if x == y => {}
        _ => return false,
    }
    match (a.augmentations(), b.augmentations()) {
        (Ok(x), Ok(y)) => {
            x.len() == y.len()
                && x.iter().all(|(name, aug)| {
                    y.get(name)
                        .is_some_and(|other| data_equals(aug.as_ref(), other.as_ref()))
                })
        }
        _ => false,
    }
}

/// Identity of a list entry: leaf values in key-constructor order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    type_name: TypeName,
    values: Vec<(String, BindingValue)>,
}

impl Key {
    /// Builds a key from named components, sorting them into constructor
    /// order.
    pub fn new<'a>(
        type_name: impl Into<TypeName>,
        values: impl IntoIterator<Item = (&'a str, BindingValue)>,
    ) -> Self {
        let mut values: Vec<(String, BindingValue)> = values
            .into_iter()
            .map(|(p, v)| (p.to_string(), v))
            .collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            type_name: type_name.into(),
            values,
        }
    }

    /// Builds a key from positional constructor arguments.
    pub fn from_constructor(def: &KeyDef, args: Vec<BindingValue>) -> Result<Self> {
        let order = def.constructor_order();
        if order.len() != args.len() {
            return Err(CodecError::InvalidArgument(format!(
                "key {} takes {} components, got {}",
                def.type_name,
                order.len(),
                args.len()
            )));
        }
        Ok(Self {
            type_name: def.type_name.clone(),
            values: order
                .into_iter()
                .map(str::to_string)
                .zip(args)
                .collect(),
        })
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn get(&self, property: &str) -> Option<&BindingValue> {
        self.values
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v)
    }

    /// Components in constructor order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &BindingValue)> {
        self.values.iter().map(|(p, v)| (p.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An object whose properties are held in memory.
#[derive(Debug, Clone)]
pub struct ObjectValue {
    type_: ObjectType,
    values: IndexMap<String, BindingValue>,
    key: Option<Key>,
    augmentations: Augmentations,
}

impl ObjectValue {
    pub fn builder(type_: &ObjectType) -> ObjectBuilder {
        ObjectBuilder {
            type_: type_.clone(),
            values: IndexMap::new(),
            key: None,
            augmentations: Augmentations::new(),
        }
    }
}

impl DataObject for ObjectValue {
    fn implemented_type(&self) -> &ObjectType {
        &self.type_
    }

    fn get(&self, property: &str) -> Result<Option<BindingValue>> {
        if self.type_.accessor(property).is_none() {
            return Err(CodecError::InvalidArgument(format!(
                "{} has no property {property}",
                self.type_.name()
            )));
        }
        Ok(self.values.get(property).cloned())
    }

    fn key(&self) -> Result<Option<Key>> {
        Ok(self.key.clone())
    }

    fn augmentations(&self) -> Result<Augmentations> {
        Ok(self.augmentations.clone())
    }
}

/// Builder for [`ObjectValue`].
#[derive(Debug, Clone)]
pub struct ObjectBuilder {
    type_: ObjectType,
    values: IndexMap<String, BindingValue>,
    key: Option<Key>,
    augmentations: Augmentations,
}

impl ObjectBuilder {
    pub fn set(mut self, property: &str, value: impl Into<BindingValue>) -> Self {
        self.values.insert(property.to_string(), value.into());
        self
    }

    pub fn key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn augmentation(mut self, augmentation: Arc<dyn DataObject>) -> Self {
        self.augmentations
            .insert(augmentation.implemented_type().name().clone(), augmentation);
        self
    }

    /// Validates property names and reconciles the key with the key leaves.
    pub fn build(mut self) -> Result<Arc<dyn DataObject>> {
        for property in self.values.keys() {
            if self.type_.accessor(property).is_none() {
                return Err(CodecError::InvalidArgument(format!(
                    "{} has no property {property}",
                    self.type_.name()
                )));
            }
        }
        for name in self.augmentations.keys() {
            if !self.type_.augmentable {
                return Err(CodecError::InvalidArgument(format!(
                    "{} is not augmentable, cannot attach {name}",
                    self.type_.name()
                )));
            }
        }
        if let Some(def) = &self.type_.key {
            match &self.key {
                Some(key) => {
                    for (property, value) in key.values() {
                        self.values
                            .entry(property.to_string())
                            .or_insert_with(|| value.clone());
                    }
                }
                None => {
                    let mut args = Vec::with_capacity(def.properties.len());
                    for property in def.constructor_order() {
                        let value = self.values.get(property).cloned().ok_or_else(|| {
                            CodecError::InvalidArgument(format!(
                                "{} is missing key component {property}",
                                self.type_.name()
                            ))
                        })?;
                        args.push(value);
                    }
                    self.key = Some(Key::from_constructor(def, args)?);
                }
            }
        }
        Ok(Arc::new(ObjectValue {
            type_: self.type_,
            values: self.values,
            key: self.key,
            augmentations: self.augmentations,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::object_type::ObjectKind;

    fn entry_type() -> ObjectType {
        ObjectType::builder("t.Entry", ObjectKind::ListEntry)
            .leaf("name")
            .leaf("id")
            .leaf("descr")
            .key("t.EntryKey", ["name", "id"])
            .build()
    }

    #[test]
    fn builder_derives_key_in_constructor_order() {
        let obj = ObjectValue::builder(&entry_type())
            .set("name", "a")
            .set("id", 7)
            .build()
            .unwrap();
        let key = obj.key().unwrap().unwrap();
        let order: Vec<&str> = key.values().map(|(p, _)| p).collect();
        assert_eq!(order, vec!["id", "name"]);
        assert_eq!(key.get("id"), Some(&BindingValue::from(7)));
    }

    #[test]
    fn builder_rejects_missing_key_component() {
        let err = ObjectValue::builder(&entry_type())
            .set("name", "a")
            .build()
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidArgument(_)));
    }

    #[test]
    fn builder_fills_key_leaves_from_key() {
        let key = Key::new(
            "t.EntryKey",
            [("name", BindingValue::from("a")), ("id", BindingValue::from(1))],
        );
        let obj = ObjectValue::builder(&entry_type()).key(key).build().unwrap();
        assert_eq!(obj.get("name").unwrap(), Some(BindingValue::from("a")));
    }

    #[test]
    fn equality_ignores_property_insertion_order() {
        let a = ObjectValue::builder(&entry_type())
            .set("name", "a")
            .set("id", 1)
            .build()
            .unwrap();
        let b = ObjectValue::builder(&entry_type())
            .set("id", 1)
            .set("name", "a")
            .build()
            .unwrap();
        assert!(data_equals(a.as_ref(), b.as_ref()));
    }
}
