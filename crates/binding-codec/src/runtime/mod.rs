//! The binding runtime: the schema plus every object type mirroring it.
//!
//! This is the type-loading oracle the codec tree consults. It is immutable
//! once built and shared behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use yang_data::schema::format_path;
use yang_data::{
    AugmentationSchema, QName, QNameModule, SchemaContext, SchemaNode, YangDataName,
};

use crate::binding::{ObjectKind, ObjectType, SchemaLocator, SchemaScope, TypeName};
use crate::error::{CodecError, Result};

/// Schema element an object type resolves to.
#[derive(Debug, Clone)]
pub enum ResolvedSchema {
    Node(Arc<SchemaNode>),
    Augment(Arc<AugmentationSchema>),
}

impl ResolvedSchema {
    /// Schema children instantiated under the object's tree node.
    pub fn children(&self) -> &[Arc<SchemaNode>] {
        match self {
            Self::Node(node) => &node.children,
            Self::Augment(aug) => &aug.children,
        }
    }

    pub fn as_node(&self) -> Option<&Arc<SchemaNode>> {
        match self {
            Self::Node(node) => Some(node),
            Self::Augment(_) => None,
        }
    }
}

/// Schema plus object types.
#[derive(Debug)]
pub struct BindingRuntimeContext {
    schema: Arc<SchemaContext>,
    types: IndexMap<TypeName, ObjectType>,
    by_path: HashMap<Vec<QName>, TypeName>,
    by_augment: HashMap<(QNameModule, usize), TypeName>,
    by_yang_data: HashMap<(YangDataName, Vec<QName>), TypeName>,
    identities: HashMap<QName, TypeName>,
}

impl BindingRuntimeContext {
    pub fn builder(schema: SchemaContext) -> BindingRuntimeBuilder {
        BindingRuntimeBuilder {
            schema,
            types: Vec::new(),
            identities: Vec::new(),
        }
    }

    pub fn schema(&self) -> &SchemaContext {
        &self.schema
    }

    /// Fails with [`CodecError::MissingClass`] for unknown names.
    pub fn load_type(&self, name: &TypeName) -> Result<ObjectType> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::MissingClass(name.to_string()))
    }

    pub fn types(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values()
    }

    /// The object type mirroring the schema node at `path`.
    pub fn type_at(&self, path: &[QName]) -> Option<&ObjectType> {
        self.by_path.get(path).and_then(|name| self.types.get(name))
    }

    /// The object type mirroring the node at `path` within `scope`.
    pub fn type_in(&self, scope: &SchemaScope, path: &[QName]) -> Option<&ObjectType> {
        match scope {
            SchemaScope::Data => self.type_at(path),
            SchemaScope::YangData(name) => self
                .by_yang_data
                .get(&(name.clone(), path.to_vec()))
                .and_then(|t| self.types.get(t)),
        }
    }

    /// The object type of the container of template `name`.
    pub fn yang_data_type(&self, name: &YangDataName) -> Option<&ObjectType> {
        let template = self.schema.yang_data(name)?;
        self.type_in(
            &SchemaScope::YangData(name.clone()),
            std::slice::from_ref(&template.container.qname),
        )
    }

    /// The object type generated for the `index`-th augment of `module`.
    pub fn augmentation_type(&self, module: &QNameModule, index: usize) -> Option<&ObjectType> {
        self.by_augment
            .get(&(module.clone(), index))
            .and_then(|name| self.types.get(name))
    }

    /// Resolves the schema element of `type_`.
    ///
    /// A missing module is [`CodecError::MissingSchema`]; so is a path or
    /// augment that does not exist in a present module.
    pub fn resolve_schema(&self, type_: &ObjectType) -> Result<ResolvedSchema> {
        match &type_.schema {
            SchemaLocator::Path(path) => {
                let first = path.first().ok_or_else(|| {
                    CodecError::MissingSchema(format!("{} has an empty schema path", type_.name()))
                })?;
                if self.schema.module(&first.module).is_none() {
                    return Err(CodecError::MissingSchema(format!(
                        "module {} of {} is not loaded",
                        first.module,
                        type_.name()
                    )));
                }
                self.schema
                    .find_node(path)
                    .map(ResolvedSchema::Node)
                    .ok_or_else(|| {
                        CodecError::MissingSchema(format!(
                            "no schema node {} for {}",
                            format_path(path),
                            type_.name()
                        ))
                    })
            }
            SchemaLocator::Augment { module, index } => {
                let owner = self.schema.module(module).ok_or_else(|| {
                    CodecError::MissingSchema(format!(
                        "module {module} of {} is not loaded",
                        type_.name()
                    ))
                })?;
                owner
                    .augmentations
                    .get(*index)
                    .cloned()
                    .map(ResolvedSchema::Augment)
                    .ok_or_else(|| {
                        CodecError::MissingSchema(format!(
                            "module {} has no augment #{index} for {}",
                            owner.name,
                            type_.name()
                        ))
                    })
            }
            SchemaLocator::YangData { name, path } => {
                let template = self.schema.yang_data(name).ok_or_else(|| {
                    CodecError::MissingSchema(format!(
                        "yang-data {name} of {} is not loaded",
                        type_.name()
                    ))
                })?;
                template
                    .find_node(path)
                    .map(ResolvedSchema::Node)
                    .ok_or_else(|| {
                        CodecError::MissingSchema(format!(
                            "no node {} in yang-data {name} for {}",
                            format_path(path),
                            type_.name()
                        ))
                    })
            }
        }
    }

    /// Every case type declaring `choice` as its choice, wherever its schema
    /// lives.
    pub fn case_types(&self, choice: &TypeName) -> Vec<ObjectType> {
        self.types
            .values()
            .filter(|t| matches!(&t.kind, ObjectKind::Case { choice: c } if c == choice))
            .cloned()
            .collect()
    }

    pub fn augmentations_for(&self, target: &[QName]) -> Vec<Arc<AugmentationSchema>> {
        self.schema.augmentations_targeting(target)
    }

    /// Augmentations of the node at `target` within `scope`. Templates are
    /// never augmented.
    pub fn augmentations_in(
        &self,
        scope: &SchemaScope,
        target: &[QName],
    ) -> Vec<Arc<AugmentationSchema>> {
        match scope {
            SchemaScope::Data => self.augmentations_for(target),
            SchemaScope::YangData(_) => Vec::new(),
        }
    }

    /// Every augmentation type declared against `target`.
    pub fn types_augmenting(&self, target: &TypeName) -> Vec<ObjectType> {
        self.types
            .values()
            .filter(|t| matches!(&t.kind, ObjectKind::Augmentation { target: x } if x == target))
            .cloned()
            .collect()
    }

    /// Object type name of an identity.
    pub fn identity_type(&self, qname: &QName) -> Option<&TypeName> {
        self.identities.get(qname)
    }

    /// Identity implemented by an object type name.
    pub fn identity_qname(&self, type_name: &TypeName) -> Option<&QName> {
        self.identities
            .iter()
            .find(|(_, t)| *t == type_name)
            .map(|(q, _)| q)
    }
}

/// Builder for [`BindingRuntimeContext`].
#[derive(Debug)]
pub struct BindingRuntimeBuilder {
    schema: SchemaContext,
    types: Vec<ObjectType>,
    identities: Vec<(QName, TypeName)>,
}

impl BindingRuntimeBuilder {
    pub fn object_type(mut self, type_: ObjectType) -> Self {
        self.types.push(type_);
        self
    }

    pub fn object_types(mut self, types: impl IntoIterator<Item = ObjectType>) -> Self {
        self.types.extend(types);
        self
    }

    pub fn identity(mut self, qname: QName, type_name: impl Into<TypeName>) -> Self {
        self.identities.push((qname, type_name.into()));
        self
    }

    pub fn build(self) -> Arc<BindingRuntimeContext> {
        let mut types = IndexMap::with_capacity(self.types.len());
        let mut by_path = HashMap::new();
        let mut by_augment = HashMap::new();
        let mut by_yang_data = HashMap::new();
        for type_ in self.types {
            match &type_.schema {
                SchemaLocator::Path(path) => {
                    by_path.insert(path.clone(), type_.name().clone());
                }
                SchemaLocator::Augment { module, index } => {
                    by_augment.insert((module.clone(), *index), type_.name().clone());
                }
                SchemaLocator::YangData { name, path } => {
                    by_yang_data.insert((name.clone(), path.clone()), type_.name().clone());
                }
            }
            types.insert(type_.name().clone(), type_);
        }
        Arc::new(BindingRuntimeContext {
            schema: Arc::new(self.schema),
            types,
            by_path,
            by_augment,
            by_yang_data,
            identities: self.identities.into_iter().collect(),
        })
    }
}
