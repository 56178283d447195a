//! Object-level event streams and their translation into tree events.
//!
//! Serializers walk objects and emit [`BindingStreamEventWriter`] events;
//! [`BindingToNormalizedStreamWriter`] turns those into
//! [`NormalizedNodeStreamWriter`](yang_data::NormalizedNodeStreamWriter)
//! events by consulting the codec tree.

pub mod serializer;
pub mod writer;

use std::sync::Arc;

use yang_data::{NormalizedNode, NormalizedNodeResult};

pub use serializer::{DataObjectSerializer, ObjectSerializer, SerializerRegistry};
pub use writer::BindingToNormalizedStreamWriter;

use crate::binding::{BindingValue, Key, TypeName};
use crate::context::CodecContext;
use crate::error::{CodecError, Result};

/// Receiver of object-level serialization events.
///
/// Every `start_*` call is matched by one [`end_node`](Self::end_node).
/// Leaf-like properties are named by their schema local name.
pub trait BindingStreamEventWriter {
    fn start_container_node(&mut self, type_name: &TypeName) -> Result<()>;
    /// Starts a keyed list.
    fn start_map_node(&mut self, type_name: &TypeName) -> Result<()>;
    fn start_map_entry_node(&mut self, key: &Key) -> Result<()>;
    fn start_unkeyed_list(&mut self, type_name: &TypeName) -> Result<()>;
    fn start_unkeyed_list_item(&mut self) -> Result<()>;
    fn start_choice_node(&mut self, type_name: &TypeName) -> Result<()>;
    fn start_case(&mut self, type_name: &TypeName) -> Result<()>;
    fn start_augmentation_node(&mut self, type_name: &TypeName) -> Result<()>;
    fn leaf_node(&mut self, name: &str, value: &BindingValue) -> Result<()>;
    fn start_leaf_set(&mut self, name: &str) -> Result<()>;
    fn leaf_set_entry_node(&mut self, value: &BindingValue) -> Result<()>;
    fn anydata_node(&mut self, name: &str, value: &BindingValue) -> Result<()>;
    fn end_node(&mut self) -> Result<()>;
    /// Emits an already built subtree in place of the events producing it.
    fn normalized_node(&mut self, node: &Arc<NormalizedNode>) -> Result<()>;
}

/// Serializes a value produced by a container, list or choice context.
pub(crate) fn serialize_value(
    ctx: &Arc<CodecContext>,
    value: &BindingValue,
    registry: &SerializerRegistry,
) -> Result<NormalizedNode> {
    let mut result = NormalizedNodeResult::new();
    {
        let mut writer = BindingToNormalizedStreamWriter::new(ctx.clone(), &mut result);
        match (ctx.as_ref(), value) {
            (CodecContext::Choice(choice), BindingValue::Object(case)) => {
                writer.start_choice_node(choice.object_type().name())?;
                registry.serialize(case, &mut writer)?;
                writer.end_node()?;
            }
            (
                CodecContext::KeyedList(list) | CodecContext::List(list),
                BindingValue::List(entries),
            ) => {
                let type_name = list.entry().object_type().name();
                if list.is_keyed() {
                    writer.start_map_node(type_name)?;
                } else {
                    writer.start_unkeyed_list(type_name)?;
                }
                for entry in entries {
                    registry.serialize(entry, &mut writer)?;
                }
                writer.end_node()?;
            }
            (_, BindingValue::Object(object)) => registry.serialize(object, &mut writer)?,
            (ctx, other) => {
                return Err(CodecError::InvalidArgument(format!(
                    "a {} context cannot write a {} value",
                    ctx.kind(),
                    other.kind()
                )))
            }
        }
    }
    Ok(result.into_result()?)
}
