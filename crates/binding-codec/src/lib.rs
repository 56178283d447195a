//! `binding-codec`: translation between schema-typed binding objects and
//! normalized data trees.
//!
//! A [`BindingCodecTree`] is built over a [`BindingRuntimeContext`] (a schema
//! plus the object types mirroring it). It lazily builds one
//! [`CodecContext`] per object type and uses them to:
//!
//! - serialize [`DataObject`]s into [`NormalizedNode`](yang_data::NormalizedNode)s
//!   through an event stream ([`stream`]);
//! - read tree nodes back as lazily decoded [`ObjectView`]s;
//! - translate [`InstanceIdentifier`]s to and from
//!   [`YangInstanceIdentifier`](yang_data::YangInstanceIdentifier)s;
//! - translate standalone `yang-data` template instances ([`template`]);
//! - cache produced nodes for repeated inputs ([`cache`]).

pub mod binding;
pub mod cache;
pub mod codec;
pub mod context;
pub mod error;
pub mod options;
mod path;
pub mod runtime;
pub mod stream;
pub mod template;
pub mod tree;
pub mod view;

pub use binding::{
    data_equals, Accessor, AccessorKind, Augmentations, BindingPath, BindingValue, BitsValue,
    DataObject, EnumValue, Identity, InstanceIdentifier, Key, ObjectBuilder, ObjectKind,
    ObjectType, ObjectValue, PathStep, TypeName, UnionValue,
};
pub use cache::CachingCodec;
pub use codec::{IdentityCodec, InstanceIdentifierCodec, KeyCodec, ValueCodec};
pub use context::CodecContext;
pub use error::{CodecError, Result};
pub use options::{CodecOptions, LeafDefaults, SchemaDefaults};
pub use runtime::BindingRuntimeContext;
pub use stream::{BindingStreamEventWriter, BindingToNormalizedStreamWriter};
pub use template::YangDataCodec;
pub use tree::BindingCodecTree;
pub use view::ObjectView;
