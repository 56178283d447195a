//! The statically-typed object model.
//!
//! [`ObjectType`]s describe shapes, [`DataObject`]s are instances of them and
//! [`InstanceIdentifier`]s address them from the data root.

pub mod data_object;
pub mod instance_identifier;
pub mod object_type;
pub mod value;

pub use data_object::{data_equals, Augmentations, DataObject, Key, ObjectBuilder, ObjectValue};
pub use instance_identifier::{BindingPath, InstanceIdentifier, PathStep};
pub use object_type::{
    Accessor, AccessorKind, KeyDef, ObjectKind, ObjectType, ObjectTypeBuilder, ObjectTypeDef,
    SchemaLocator, SchemaScope, TypeName,
};
pub use value::{BindingValue, BitsValue, EnumValue, Identity, UnionValue};
