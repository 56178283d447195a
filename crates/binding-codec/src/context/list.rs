//! Keyed and unkeyed list contexts.

use std::sync::Arc;

use yang_data::{NormalizedNode, PathArgument, QName, SchemaNode, SchemaNodeKind};

use super::data_object::DataObjectContext;
use crate::binding::{Key, ObjectType};
use crate::codec::KeyCodec;
use crate::error::{CodecError, Result};
use crate::runtime::ResolvedSchema;
use crate::tree::TreeInner;

/// A list; entries are read through the entry context.
#[derive(Debug)]
pub struct ListContext {
    entry: DataObjectContext,
    key: Option<KeyCodec>,
    qname: QName,
    ordered: bool,
}

impl ListContext {
    pub(crate) fn new(
        type_: ObjectType,
        schema: Arc<SchemaNode>,
        tree: &TreeInner,
    ) -> Result<Self> {
        let SchemaNodeKind::List { keys, ordered } = &schema.kind else {
            return Err(CodecError::IncorrectNesting(format!(
                "{} mirrors {} {}, expected a list",
                type_.name(),
                schema.kind.keyword(),
                schema.qname
            )));
        };
        let key = if keys.is_empty() {
            None
        } else {
            Some(KeyCodec::new(&schema, &type_, &tree.env())?)
        };
        Ok(Self {
            qname: schema.qname.clone(),
            ordered: *ordered,
            key,
            entry: DataObjectContext::new(type_, ResolvedSchema::Node(schema), tree)?,
        })
    }

    pub fn entry(&self) -> &DataObjectContext {
        &self.entry
    }

    pub fn key_codec(&self) -> Option<&KeyCodec> {
        self.key.as_ref()
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn is_keyed(&self) -> bool {
        self.key.is_some()
    }

    /// Key of the entry stored under `arg`.
    pub fn key_of(&self, arg: &PathArgument) -> Result<Option<Key>> {
        self.key.as_ref().map(|codec| codec.deserialize(arg)).transpose()
    }

    pub fn entry_argument(&self, key: &Key) -> Result<PathArgument> {
        let codec = self.key.as_ref().ok_or_else(|| {
            CodecError::MalformedPath(format!("{} is not a keyed list", self.qname))
        })?;
        codec.serialize(key)
    }

    /// Entries of a map or unkeyed list node, in tree order.
    pub(crate) fn entries<'a>(
        &self,
        node: &'a NormalizedNode,
    ) -> Result<Vec<&'a Arc<NormalizedNode>>> {
        match (node, self.is_keyed()) {
            (NormalizedNode::Map(map), true) => Ok(map.entries.values().collect()),
            (NormalizedNode::UnkeyedList(list), false) => Ok(list.entries.iter().collect()),
            (other, keyed) => Err(CodecError::MalformedData(format!(
                "expected {} {}, got {} {}",
                if keyed { "map" } else { "unkeyed list" },
                self.qname,
                other.kind(),
                other.name()
            ))),
        }
    }
}
