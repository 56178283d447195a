//! Codecs of `yang-data` templates.
//!
//! A template instance is a standalone tree rooted at the template's
//! container. It never appears in the data tree and is never augmented.

use std::sync::Arc;

use yang_data::{NormalizedNode, YangDataName};

use crate::binding::{BindingValue, DataObject, ObjectType};
use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::tree::TreeInner;

/// Translates instances of one template.
#[derive(Debug, Clone)]
pub struct YangDataCodec {
    name: YangDataName,
    ctx: Arc<CodecContext>,
    tree: Arc<TreeInner>,
}

impl YangDataCodec {
    pub(crate) fn new(
        name: YangDataName,
        ctx: Arc<CodecContext>,
        tree: Arc<TreeInner>,
    ) -> Result<Self> {
        if !ctx.is_container_like() {
            return Err(CodecError::IncorrectNesting(format!(
                "yang-data {name} is mirrored by a {}, expected a container",
                ctx.kind()
            )));
        }
        Ok(Self { name, ctx, tree })
    }

    pub fn name(&self) -> &YangDataName {
        &self.name
    }

    pub fn object_type(&self) -> Result<&ObjectType> {
        self.ctx.object_type().ok_or_else(|| {
            CodecError::Internal(format!("yang-data {} has no object type", self.name))
        })
    }

    pub fn context(&self) -> &Arc<CodecContext> {
        &self.ctx
    }

    /// Serializes `object` into the template's container node.
    pub fn to_normalized(&self, object: &Arc<dyn DataObject>) -> Result<NormalizedNode> {
        let expected = self.object_type()?;
        if object.implemented_type() != expected {
            return Err(CodecError::InvalidArgument(format!(
                "{} is not an instance of yang-data {}",
                object.implemented_type().name(),
                self.name
            )));
        }
        self.tree.serialize_with(&self.ctx, object, self.tree.registry())
    }

    /// Reads the template's container node as an object.
    pub fn from_normalized(&self, node: &Arc<NormalizedNode>) -> Result<Arc<dyn DataObject>> {
        match self.ctx.deserialize(node)? {
            Some(BindingValue::Object(object)) => Ok(object),
            _ => Err(CodecError::MalformedData(format!(
                "node does not hold yang-data {}",
                self.name
            ))),
        }
    }
}
