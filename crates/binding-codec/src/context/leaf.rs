//! Leaf, leaf-list and anydata contexts.

use std::sync::OnceLock;

use yang_data::{
    LeafNode, LeafSetNode, NormalizedNode, QName, QNameModule, SchemaNode, SchemaNodeKind, Value,
};

use crate::binding::{Accessor, BindingValue};
use crate::codec::{CodecEnv, ValueCodec};
use crate::error::{CodecError, Result};

/// A single leaf.
#[derive(Debug)]
pub struct LeafContext {
    qname: QName,
    property: String,
    codec: ValueCodec,
    default: Option<String>,
    mandatory: bool,
    parsed_default: OnceLock<Option<BindingValue>>,
}

impl LeafContext {
    pub(crate) fn new(schema: &SchemaNode, accessor: &Accessor, env: &CodecEnv) -> Result<Self> {
        let SchemaNodeKind::Leaf(leaf) = &schema.kind else {
            return Err(CodecError::IncorrectNesting(format!("{} is not a leaf", schema.qname)));
        };
        Ok(Self {
            qname: schema.qname.clone(),
            property: accessor.property.clone(),
            codec: ValueCodec::new(&leaf.type_, env)?,
            default: leaf.default.clone(),
            mandatory: leaf.mandatory,
            parsed_default: OnceLock::new(),
        })
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    fn module(&self) -> &QNameModule {
        &self.qname.module
    }

    /// The parsed schema default, computed once.
    pub fn schema_default(&self) -> Result<Option<BindingValue>> {
        if let Some(parsed) = self.parsed_default.get() {
            return Ok(parsed.clone());
        }
        let parsed = match &self.default {
            Some(text) => Some(self.codec.parse(text, self.module())?),
            None => None,
        };
        let _ = self.parsed_default.set(parsed);
        Ok(self.parsed_default.get().cloned().flatten())
    }

    pub fn deserialize_value(&self, value: &Value) -> Result<BindingValue> {
        self.codec.deserialize(value)
    }

    pub fn serialize_value(&self, value: &BindingValue) -> Result<Value> {
        self.codec.serialize(value)
    }

    pub(crate) fn deserialize(&self, node: &NormalizedNode) -> Result<BindingValue> {
        match node {
            NormalizedNode::Leaf(leaf) => self.deserialize_value(&leaf.value),
            other => Err(CodecError::MalformedData(format!(
                "expected leaf {}, got {} {}",
                self.qname,
                other.kind(),
                other.name()
            ))),
        }
    }

    pub(crate) fn serialize(&self, value: &BindingValue) -> Result<NormalizedNode> {
        Ok(NormalizedNode::Leaf(LeafNode {
            name: self.qname.clone(),
            value: self.serialize_value(value)?,
        }))
    }
}

/// A leaf-list.
#[derive(Debug)]
pub struct LeafSetContext {
    qname: QName,
    property: String,
    codec: ValueCodec,
    ordered: bool,
}

impl LeafSetContext {
    pub(crate) fn new(schema: &SchemaNode, accessor: &Accessor, env: &CodecEnv) -> Result<Self> {
        let SchemaNodeKind::LeafList { type_, ordered } = &schema.kind else {
            return Err(CodecError::IncorrectNesting(format!(
                "{} is not a leaf-list",
                schema.qname
            )));
        };
        Ok(Self {
            qname: schema.qname.clone(),
            property: accessor.property.clone(),
            codec: ValueCodec::new(type_, env)?,
            ordered: *ordered,
        })
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn serialize_value(&self, value: &BindingValue) -> Result<Value> {
        self.codec.serialize(value)
    }

    pub fn deserialize_value(&self, value: &Value) -> Result<BindingValue> {
        self.codec.deserialize(value)
    }

    pub(crate) fn deserialize(&self, node: &NormalizedNode) -> Result<BindingValue> {
        match node {
            NormalizedNode::LeafSet(set) => set
                .values
                .iter()
                .map(|v| self.codec.deserialize(v))
                .collect::<Result<Vec<_>>>()
                .map(BindingValue::LeafList),
            NormalizedNode::LeafSetEntry(entry) => self.codec.deserialize(&entry.value),
            other => Err(CodecError::MalformedData(format!(
                "expected leaf-list {}, got {} {}",
                self.qname,
                other.kind(),
                other.name()
            ))),
        }
    }

    pub(crate) fn serialize(&self, value: &BindingValue) -> Result<NormalizedNode> {
        let BindingValue::LeafList(values) = value else {
            return Err(CodecError::InvalidArgument(format!(
                "leaf-list {} expects a list of values, got {}",
                self.qname,
                value.kind()
            )));
        };
        Ok(NormalizedNode::LeafSet(LeafSetNode {
            name: self.qname.clone(),
            ordered: self.ordered,
            values: values
                .iter()
                .map(|v| self.codec.serialize(v))
                .collect::<Result<_>>()?,
        }))
    }
}

/// An anydata node, passed through as an opaque document.
#[derive(Debug)]
pub struct OpaqueContext {
    qname: QName,
    property: String,
}

impl OpaqueContext {
    pub(crate) fn new(schema: &SchemaNode, accessor: &Accessor) -> Result<Self> {
        if !matches!(schema.kind, SchemaNodeKind::AnyData) {
            return Err(CodecError::IncorrectNesting(format!("{} is not anydata", schema.qname)));
        }
        Ok(Self {
            qname: schema.qname.clone(),
            property: accessor.property.clone(),
        })
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub(crate) fn deserialize(&self, node: &NormalizedNode) -> Result<BindingValue> {
        match node {
            NormalizedNode::AnyData(any) => Ok(BindingValue::Opaque(any.body.clone())),
            other => Err(CodecError::MalformedData(format!(
                "expected anydata {}, got {} {}",
                self.qname,
                other.kind(),
                other.name()
            ))),
        }
    }

    pub(crate) fn body<'a>(&self, value: &'a BindingValue) -> Result<&'a serde_json::Value> {
        match value {
            BindingValue::Opaque(body) => Ok(body),
            other => Err(CodecError::InvalidArgument(format!(
                "anydata {} expects an opaque document, got {}",
                self.qname,
                other.kind()
            ))),
        }
    }

    pub(crate) fn serialize(&self, value: &BindingValue) -> Result<NormalizedNode> {
        Ok(NormalizedNode::AnyData(yang_data::AnyDataNode {
            name: self.qname.clone(),
            body: self.body(value)?.clone(),
        }))
    }
}
