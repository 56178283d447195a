//! `yang-data`: schema model and normalized data tree.
//!
//! This crate holds the pieces the binding codec consumes but does not own:
//! the compiled schema ([`schema`]), the generic data tree ([`node`]), tree
//! addressing ([`path`]), typed leaf values ([`value`]) and the streaming
//! tree-builder contract ([`writer`]).

pub mod node;
pub mod path;
pub mod qname;
pub mod schema;
pub mod value;
pub mod writer;

pub use node::{
    AnyDataNode, Children, DataContainerNode, LeafNode, LeafSetNode, MapNode, NormalizedNode,
    UnkeyedListNode,
};
pub use path::{PathArgument, YangInstanceIdentifier};
pub use qname::{QName, QNameModule};
pub use schema::{
    AugmentationSchema, Module, SchemaContext, SchemaError, SchemaNode, SchemaNodeKind,
    TypeDefinition, TypeKind, YangDataName, YangDataSchema,
};
pub use value::{Decimal64, Value};
pub use writer::{
    write_normalized_node, NormalizedNodeResult, NormalizedNodeStreamWriter, WriterError,
};
