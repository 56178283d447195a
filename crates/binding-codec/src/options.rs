//! Codec tree configuration.

use std::fmt;
use std::sync::Arc;

use crate::binding::BindingValue;
use crate::context::LeafContext;
use crate::error::{CodecError, Result};

/// Supplies the value of a leaf that is absent from a tree node.
pub trait LeafDefaults: fmt::Debug + Send + Sync {
    /// `Ok(None)` means the leaf reads as absent.
    fn default_for(&self, leaf: &LeafContext) -> Result<Option<BindingValue>>;
}

/// Schema-declared defaults. Absent mandatory leaves are an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaDefaults;

impl LeafDefaults for SchemaDefaults {
    fn default_for(&self, leaf: &LeafContext) -> Result<Option<BindingValue>> {
        if leaf.is_mandatory() {
            return Err(CodecError::InvalidArgument(format!(
                "mandatory leaf {} is missing",
                leaf.qname()
            )));
        }
        leaf.schema_default()
    }
}

/// Options for [`BindingCodecTree::with_options`](crate::BindingCodecTree::with_options).
#[derive(Debug, Clone)]
pub struct CodecOptions {
    pub leaf_defaults: Arc<dyn LeafDefaults>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            leaf_defaults: Arc::new(SchemaDefaults),
        }
    }
}
