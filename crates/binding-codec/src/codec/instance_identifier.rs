//! Instance-identifier codec: tree paths as leaf values.

use std::sync::Weak;

use yang_data::Value;

use crate::binding::BindingValue;
use crate::error::{CodecError, Result};
use crate::tree::{BindingCodecTree, TreeInner};

/// Converts between [`Value::InstanceIdentifier`] and
/// [`BindingValue::InstanceIdentifier`], including leaf and leaf-list
/// property addressing.
#[derive(Debug, Clone)]
pub struct InstanceIdentifierCodec {
    tree: Weak<TreeInner>,
}

impl InstanceIdentifierCodec {
    pub(crate) fn new(tree: Weak<TreeInner>) -> Self {
        Self { tree }
    }

    fn tree(&self) -> Result<BindingCodecTree> {
        BindingCodecTree::upgrade(&self.tree)
    }

    pub fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::InstanceIdentifier(_))
    }

    pub fn serialize(&self, value: &BindingValue) -> Result<Value> {
        let BindingValue::InstanceIdentifier(path) = value else {
            return Err(CodecError::InvalidArgument(format!(
                "expected an instance identifier, got {}",
                value.kind()
            )));
        };
        Ok(Value::InstanceIdentifier(self.tree()?.to_yang_path(path)?))
    }

    pub fn deserialize(&self, value: &Value) -> Result<BindingValue> {
        let Value::InstanceIdentifier(path) = value else {
            return Err(CodecError::InvalidArgument(format!(
                "expected an instance identifier, got {}",
                value.kind()
            )));
        };
        self.tree()?
            .to_binding_path(path)?
            .map(BindingValue::InstanceIdentifier)
            .ok_or_else(|| {
                CodecError::InvalidArgument(format!("{path} has no object-model representation"))
            })
    }
}
