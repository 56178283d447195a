//! Key codec: list-entry predicates to and from [`Key`]s.

use yang_data::{PathArgument, QName, SchemaNode, SchemaNodeKind};

use super::{CodecEnv, ValueCodec};
use crate::binding::{AccessorKind, BindingValue, Key, KeyDef, ObjectType};
use crate::error::{CodecError, Result};

#[derive(Debug, Clone)]
struct KeyComponent {
    qname: QName,
    property: String,
    codec: ValueCodec,
}

/// How predicate values map onto constructor arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyShape {
    Single,
    /// `positions[i]` is the constructor position of the `i`-th declared key
    /// leaf. `None` when declaration order already is constructor order.
    Multi { positions: Option<Vec<usize>> },
}

/// Codec for the key of one keyed list.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    list: QName,
    def: KeyDef,
    /// In schema-declared key order.
    components: Vec<KeyComponent>,
    shape: KeyShape,
}

impl KeyCodec {
    pub(crate) fn new(list: &SchemaNode, entry: &ObjectType, env: &CodecEnv) -> Result<Self> {
        if !matches!(list.kind, SchemaNodeKind::List { .. }) {
            return Err(CodecError::IncorrectNesting(format!("{} is not a list", list.qname)));
        }

        let def = entry.key.clone().ok_or_else(|| {
            CodecError::IncorrectNesting(format!(
                "{} mirrors keyed list {} but declares no key",
                entry.name(),
                list.qname
            ))
        })?;
        let keys = list.list_keys();
        let mut components = Vec::with_capacity(keys.len());
        for qname in keys {
            let leaf = list
                .child(qname)
                .and_then(|c| c.as_leaf())
                .ok_or_else(|| {
                    CodecError::IncorrectNesting(format!(
                        "key {qname} of {} is not a leaf",
                        list.qname
                    ))
                })?;
            let accessor = entry
                .accessors
                .iter()
                .find(|a| a.yang_name == qname.local_name() && a.kind == AccessorKind::Leaf)
                .ok_or_else(|| {
                    CodecError::IncorrectNesting(format!(
                        "key leaf {qname} has no property in {}",
                        entry.name()
                    ))
                })?;
            components.push(KeyComponent {
                qname: qname.clone(),
                property: accessor.property.clone(),
                codec: ValueCodec::new(&leaf.type_, env)?,
            });
        }

        let mut declared: Vec<&str> = components.iter().map(|c| c.property.as_str()).collect();
        declared.sort_unstable();
        if declared != def.constructor_order() {
            return Err(CodecError::IncorrectNesting(format!(
                "key {} does not match the key leaves of {}",
                def.type_name, list.qname
            )));
        }

        let shape = if components.len() == 1 {
            KeyShape::Single
        } else {
            let order = def.constructor_order();
            let positions: Vec<usize> = components
                .iter()
                .map(|c| order.iter().position(|p| *p == c.property).unwrap_or_default())
                .collect();
            let identity = positions.iter().enumerate().all(|(i, p)| i == *p);
            KeyShape::Multi {
                positions: (!identity).then_some(positions),
            }
        };

        Ok(Self {
            list: list.qname.clone(),
            def,
            components,
            shape,
        })
    }

    pub fn shape(&self) -> &KeyShape {
        &self.shape
    }

    /// Key leaf names in schema-declared order.
    pub fn key_leaves(&self) -> impl Iterator<Item = &QName> {
        self.components.iter().map(|c| &c.qname)
    }

    pub fn deserialize(&self, arg: &PathArgument) -> Result<Key> {
        let PathArgument::NodeIdentifierWithPredicates { name, keys } = arg else {
            return Err(CodecError::MalformedPath(format!(
                "{arg} is not an entry of keyed list {}",
                self.list
            )));
        };
        if name != &self.list {
            return Err(CodecError::MalformedPath(format!(
                "{arg} is not an entry of keyed list {}",
                self.list
            )));
        }
        let mut values = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let raw = keys.get(&component.qname).ok_or_else(|| {
                CodecError::InvalidArgument(format!(
                    "{arg} is missing key component {}",
                    component.qname
                ))
            })?;
            values.push(component.codec.deserialize(raw)?);
        }
        let args = match &self.shape {
            KeyShape::Single | KeyShape::Multi { positions: None } => values,
            KeyShape::Multi {
                positions: Some(positions),
            } => {
                let mut slots: Vec<Option<BindingValue>> = vec![None; values.len()];
                for (value, position) in values.into_iter().zip(positions) {
                    slots[*position] = Some(value);
                }
                slots.into_iter().flatten().collect()
            }
        };
        Key::from_constructor(&self.def, args)
    }

    pub fn serialize(&self, key: &Key) -> Result<PathArgument> {
        let mut predicates = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let value = key.get(&component.property).ok_or_else(|| {
                CodecError::InvalidArgument(format!(
                    "key {} is missing component {}",
                    key.type_name(),
                    component.property
                ))
            })?;
            predicates.push((component.qname.clone(), component.codec.serialize(value)?));
        }
        Ok(PathArgument::with_predicates(self.list.clone(), predicates))
    }
}
