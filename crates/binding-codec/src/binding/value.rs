//! Object-model values returned by accessors.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

use yang_data::{QName, Value};

use super::data_object::{data_equals, DataObject};
use super::instance_identifier::BindingPath;
use super::object_type::TypeName;

/// A member of a generated enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub name: String,
    pub value: i32,
}

/// A bits value, as the set of positions that are switched on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitsValue {
    positions: BTreeSet<u32>,
}

impl BitsValue {
    pub fn new(positions: impl IntoIterator<Item = u32>) -> Self {
        Self {
            positions: positions.into_iter().collect(),
        }
    }

    pub fn is_set(&self, position: u32) -> bool {
        self.positions.contains(&position)
    }

    pub fn positions(&self) -> impl Iterator<Item = u32> + '_ {
        self.positions.iter().copied()
    }
}

/// A union value tagged with the member type that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionValue {
    /// Member type name, see [`yang_data::TypeDefinition::type_name`].
    pub member: String,
    pub value: Box<BindingValue>,
}

impl UnionValue {
    pub fn new(member: impl Into<String>, value: impl Into<BindingValue>) -> Self {
        Self {
            member: member.into(),
            value: Box::new(value.into()),
        }
    }
}

#[derive(Debug)]
struct IdentityInner {
    qname: QName,
    type_name: TypeName,
}

/// An identity singleton.
///
/// Instances are handed out by the identity codec, which keeps one instance
/// per identity for the life of the codec tree.
#[derive(Clone)]
pub struct Identity(Arc<IdentityInner>);

impl Identity {
    pub(crate) fn new(qname: QName, type_name: TypeName) -> Self {
        Self(Arc::new(IdentityInner { qname, type_name }))
    }

    pub fn qname(&self) -> &QName {
        &self.0.qname
    }

    pub fn type_name(&self) -> &TypeName {
        &self.0.type_name
    }

    /// Same singleton, not merely the same identity.
    pub fn ptr_eq(&self, other: &Identity) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.qname == other.0.qname
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.qname.hash(state);
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0.type_name)
    }
}

/// A value produced by an object accessor.
#[derive(Debug, Clone)]
pub enum BindingValue {
    Scalar(Value),
    Enum(EnumValue),
    Bits(BitsValue),
    Union(UnionValue),
    Identity(Identity),
    InstanceIdentifier(BindingPath),
    Object(Arc<dyn DataObject>),
    List(Vec<Arc<dyn DataObject>>),
    LeafList(Vec<BindingValue>),
    Opaque(serde_json::Value),
}

impl BindingValue {
    pub fn as_object(&self) -> Option<&Arc<dyn DataObject>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Arc<dyn DataObject>]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Enum(_) => "enumeration",
            Self::Bits(_) => "bits",
            Self::Union(_) => "union",
            Self::Identity(_) => "identity",
            Self::InstanceIdentifier(_) => "instance identifier",
            Self::Object(_) => "object",
            Self::List(_) => "list",
            Self::LeafList(_) => "leaf-list",
            Self::Opaque(_) => "opaque",
        }
    }
}

impl PartialEq for BindingValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Bits(a), Self::Bits(b)) => a == b,
            (Self::Union(a), Self::Union(b)) => a == b,
            (Self::Identity(a), Self::Identity(b)) => a == b,
            (Self::InstanceIdentifier(a), Self::InstanceIdentifier(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => data_equals(a.as_ref(), b.as_ref()),
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| data_equals(x.as_ref(), y.as_ref()))
            }
            (Self::LeafList(a), Self::LeafList(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for BindingValue {}

/// Leaf variants hash their content; objects, paths and opaque values hash
/// only their variant.
impl Hash for BindingValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Scalar(v) => v.hash(state),
            Self::Enum(v) => v.hash(state),
            Self::Bits(v) => v.hash(state),
            Self::Union(v) => {
                v.member.hash(state);
                v.value.hash(state);
            }
            Self::Identity(v) => v.hash(state),
            Self::LeafList(v) => v.hash(state),
            Self::List(v) => v.len().hash(state),
            Self::InstanceIdentifier(_) | Self::Object(_) | Self::Opaque(_) => {}
        }
    }
}

impl From<Value> for BindingValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for BindingValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Value::from(value))
    }
}

impl From<String> for BindingValue {
    fn from(value: String) -> Self {
        Self::Scalar(Value::from(value))
    }
}

impl From<bool> for BindingValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Value::Bool(value))
    }
}

impl From<i32> for BindingValue {
    fn from(value: i32) -> Self {
        Self::Scalar(Value::Int32(value))
    }
}

impl From<i64> for BindingValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Value::Int64(value))
    }
}

impl From<u32> for BindingValue {
    fn from(value: u32) -> Self {
        Self::Scalar(Value::Uint32(value))
    }
}

impl From<EnumValue> for BindingValue {
    fn from(value: EnumValue) -> Self {
        Self::Enum(value)
    }
}

impl From<BitsValue> for BindingValue {
    fn from(value: BitsValue) -> Self {
        Self::Bits(value)
    }
}

impl From<UnionValue> for BindingValue {
    fn from(value: UnionValue) -> Self {
        Self::Union(value)
    }
}

impl From<Identity> for BindingValue {
    fn from(value: Identity) -> Self {
        Self::Identity(value)
    }
}

impl From<BindingPath> for BindingValue {
    fn from(value: BindingPath) -> Self {
        Self::InstanceIdentifier(value)
    }
}

impl From<Arc<dyn DataObject>> for BindingValue {
    fn from(value: Arc<dyn DataObject>) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Arc<dyn DataObject>>> for BindingValue {
    fn from(value: Vec<Arc<dyn DataObject>>) -> Self {
        Self::List(value)
    }
}

impl From<serde_json::Value> for BindingValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Opaque(value)
    }
}
