//! Object types: the statically known shapes mirroring schema elements.
//!
//! An [`ObjectType`] is what a generated class would be in a language with
//! code generation: a named type with an ordered list of accessors, each
//! bound to a schema child by local name.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use yang_data::{QName, QNameModule, YangDataName};

/// Fully qualified name of an object type, e.g. `org.example.top.Foo`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the last `.`.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// What schema statement an object type mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Container,
    ListEntry,
    Choice,
    Case { choice: TypeName },
    Augmentation { target: TypeName },
    Notification,
    Input,
    Output,
}

/// Where the schema for a type lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaLocator {
    /// Absolute schema path, including choice and case steps.
    Path(Vec<QName>),
    /// The `index`-th augment declared by `module`.
    Augment { module: QNameModule, index: usize },
    /// Path inside a `yang-data` template, starting at its container.
    YangData { name: YangDataName, path: Vec<QName> },
}

/// Namespace a schema path is resolved in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaScope {
    /// The data tree, including operations and notifications.
    Data,
    YangData(YangDataName),
}

impl SchemaLocator {
    pub fn scope(&self) -> SchemaScope {
        match self {
            Self::YangData { name, .. } => SchemaScope::YangData(name.clone()),
            Self::Path(_) | Self::Augment { .. } => SchemaScope::Data,
        }
    }

    /// Path of the located node within its scope; empty for augments.
    pub fn path(&self) -> &[QName] {
        match self {
            Self::Path(path) | Self::YangData { path, .. } => path,
            Self::Augment { .. } => &[],
        }
    }
}

/// What an accessor returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorKind {
    Leaf,
    LeafList,
    Container(TypeName),
    List(TypeName),
    Choice(TypeName),
    AnyData,
}

impl AccessorKind {
    /// The object type of container, list and choice accessors.
    pub fn child_type(&self) -> Option<&TypeName> {
        match self {
            Self::Container(t) | Self::List(t) | Self::Choice(t) => Some(t),
            Self::Leaf | Self::LeafList | Self::AnyData => None,
        }
    }
}

/// A named accessor bound to a schema child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub property: String,
    /// Local name of the schema child.
    pub yang_name: String,
    pub kind: AccessorKind,
}

/// Key declaration of a keyed list entry type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDef {
    pub type_name: TypeName,
    /// Leaf properties making up the key, in any order.
    pub properties: Vec<String>,
}

impl KeyDef {
    /// Property order of the key constructor: alphabetical.
    pub fn constructor_order(&self) -> Vec<&str> {
        let mut props: Vec<&str> = self.properties.iter().map(String::as_str).collect();
        props.sort_unstable();
        props
    }
}

/// Definition of an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTypeDef {
    pub name: TypeName,
    pub kind: ObjectKind,
    pub schema: SchemaLocator,
    pub accessors: Vec<Accessor>,
    /// Implemented interfaces, such as reused grouping types.
    pub capabilities: BTreeSet<TypeName>,
    pub key: Option<KeyDef>,
    pub augmentable: bool,
}

/// Shared handle to an [`ObjectTypeDef`]. Equality is by name.
#[derive(Clone)]
pub struct ObjectType(Arc<ObjectTypeDef>);

impl ObjectType {
    pub fn builder(name: impl Into<TypeName>, kind: ObjectKind) -> ObjectTypeBuilder {
        ObjectTypeBuilder {
            def: ObjectTypeDef {
                name: name.into(),
                kind,
                schema: SchemaLocator::Path(Vec::new()),
                accessors: Vec::new(),
                capabilities: BTreeSet::new(),
                key: None,
                augmentable: false,
            },
        }
    }

    pub fn name(&self) -> &TypeName {
        &self.0.name
    }

    pub fn accessor(&self, property: &str) -> Option<(usize, &Accessor)> {
        self.0
            .accessors
            .iter()
            .enumerate()
            .find(|(_, a)| a.property == property)
    }

    /// Types of container, list and choice children.
    pub fn child_types(&self) -> impl Iterator<Item = &TypeName> {
        self.0.accessors.iter().filter_map(|a| a.kind.child_type())
    }

    pub fn is_augmentation(&self) -> bool {
        matches!(self.0.kind, ObjectKind::Augmentation { .. })
    }
}

impl Deref for ObjectType {
    type Target = ObjectTypeDef;

    fn deref(&self) -> &ObjectTypeDef {
        &self.0
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for ObjectType {}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectType({})", self.0.name)
    }
}

/// Builder for [`ObjectType`].
#[derive(Debug, Clone)]
pub struct ObjectTypeBuilder {
    def: ObjectTypeDef,
}

impl ObjectTypeBuilder {
    pub fn schema_path(mut self, path: impl IntoIterator<Item = QName>) -> Self {
        self.def.schema = SchemaLocator::Path(path.into_iter().collect());
        self
    }

    pub fn augment_of(mut self, module: QNameModule, index: usize) -> Self {
        self.def.schema = SchemaLocator::Augment { module, index };
        self
    }

    /// Places the type inside the template `name`; `path` starts at the
    /// template's container.
    pub fn yang_data_path(
        mut self,
        name: YangDataName,
        path: impl IntoIterator<Item = QName>,
    ) -> Self {
        self.def.schema = SchemaLocator::YangData {
            name,
            path: path.into_iter().collect(),
        };
        self
    }

    fn accessor(mut self, property: &str, yang_name: &str, kind: AccessorKind) -> Self {
        self.def.accessors.push(Accessor {
            property: property.to_string(),
            yang_name: yang_name.to_string(),
            kind,
        });
        self
    }

    pub fn leaf(self, name: &str) -> Self {
        self.accessor(name, name, AccessorKind::Leaf)
    }

    /// A leaf whose property name differs from the schema name.
    pub fn leaf_as(self, property: &str, yang_name: &str) -> Self {
        self.accessor(property, yang_name, AccessorKind::Leaf)
    }

    pub fn leaf_list(self, name: &str) -> Self {
        self.accessor(name, name, AccessorKind::LeafList)
    }

    pub fn container(self, name: &str, type_name: impl Into<TypeName>) -> Self {
        self.accessor(name, name, AccessorKind::Container(type_name.into()))
    }

    pub fn list(self, name: &str, type_name: impl Into<TypeName>) -> Self {
        self.accessor(name, name, AccessorKind::List(type_name.into()))
    }

    pub fn choice(self, name: &str, type_name: impl Into<TypeName>) -> Self {
        self.accessor(name, name, AccessorKind::Choice(type_name.into()))
    }

    pub fn anydata(self, name: &str) -> Self {
        self.accessor(name, name, AccessorKind::AnyData)
    }

    pub fn capability(mut self, name: impl Into<TypeName>) -> Self {
        self.def.capabilities.insert(name.into());
        self
    }

    pub fn key<'a>(
        mut self,
        type_name: impl Into<TypeName>,
        properties: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.def.key = Some(KeyDef {
            type_name: type_name.into(),
            properties: properties.into_iter().map(str::to_string).collect(),
        });
        self
    }

    pub fn augmentable(mut self) -> Self {
        self.def.augmentable = true;
        self
    }

    pub fn build(self) -> ObjectType {
        ObjectType(Arc::new(self.def))
    }
}
