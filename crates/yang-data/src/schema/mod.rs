//! Compiled schema model.
//!
//! Schemas are assembled programmatically: build [`SchemaNode`]s with the
//! builder constructors, group them into [`Module`]s and hand the modules to
//! [`SchemaContext::new`].

pub mod context;
pub mod node;
pub mod types;

pub use context::{
    format_path, AugmentationSchema, IdentitySchema, Module, ModuleBuilder, SchemaContext,
    SchemaError, YangDataName, YangDataSchema,
};
pub use node::{LeafSchema, SchemaNode, SchemaNodeBuilder, SchemaNodeKind};
pub use types::{Bit, EnumPair, TypeDefinition, TypeKind};
