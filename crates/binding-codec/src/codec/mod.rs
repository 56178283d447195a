//! Value codecs: conversions between tree leaf values and object-model
//! values, one codec per leaf type.

pub mod identity;
pub mod instance_identifier;
pub mod key;
pub mod scalar;
pub mod union;

use std::sync::{Arc, Weak};

use yang_data::{QNameModule, TypeDefinition, TypeKind, Value};

pub use identity::{IdentityCodec, IdentityRefCodec};
pub use instance_identifier::InstanceIdentifierCodec;
pub use key::KeyCodec;
pub use scalar::{BitsCodec, EnumCodec, ScalarCodec};
pub use union::UnionCodec;

use crate::binding::BindingValue;
use crate::error::{CodecError, Result};
use crate::tree::TreeInner;

/// What value codecs need from the owning codec tree.
#[derive(Debug, Clone)]
pub(crate) struct CodecEnv {
    pub identities: Arc<IdentityCodec>,
    pub tree: Weak<TreeInner>,
}

/// Codec for one leaf type.
#[derive(Debug, Clone)]
pub enum ValueCodec {
    Scalar(ScalarCodec),
    Enumeration(EnumCodec),
    Bits(BitsCodec),
    Union(UnionCodec),
    IdentityRef(IdentityRefCodec),
    InstanceIdentifier(InstanceIdentifierCodec),
}

impl ValueCodec {
    pub(crate) fn new(type_: &TypeDefinition, env: &CodecEnv) -> Result<Self> {
        Ok(match &type_.kind {
            TypeKind::Enumeration(members) => Self::Enumeration(EnumCodec::new(members)),
            TypeKind::Bits(bits) => Self::Bits(BitsCodec::new(bits)),
            TypeKind::Union(members) => {
                let members = members
                    .iter()
                    .map(|m| Ok((m.type_name().to_string(), Self::new(m, env)?)))
                    .collect::<Result<Vec<_>>>()?;
                Self::Union(UnionCodec::new(type_.type_name(), members))
            }
            TypeKind::IdentityRef { bases } => {
                Self::IdentityRef(IdentityRefCodec::new(env.identities.clone(), bases))
            }
            TypeKind::InstanceIdentifier => {
                Self::InstanceIdentifier(InstanceIdentifierCodec::new(env.tree.clone()))
            }
            kind => Self::Scalar(ScalarCodec::new(kind)?),
        })
    }

    /// Static acceptance check: whether `value` has a shape this codec can
    /// decode at all.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Scalar(c) => c.accepts(value),
            Self::Enumeration(c) => c.accepts(value),
            Self::Bits(c) => c.accepts(value),
            Self::Union(c) => c.accepts(value),
            Self::IdentityRef(c) => c.accepts(value),
            Self::InstanceIdentifier(c) => c.accepts(value),
        }
    }

    /// Object-model value to tree value.
    pub fn serialize(&self, value: &BindingValue) -> Result<Value> {
        match self {
            Self::Scalar(c) => c.serialize(value),
            Self::Enumeration(c) => c.serialize(value),
            Self::Bits(c) => c.serialize(value),
            Self::Union(c) => c.serialize(value),
            Self::IdentityRef(c) => c.serialize(value),
            Self::InstanceIdentifier(c) => c.serialize(value),
        }
    }

    /// Tree value to object-model value.
    pub fn deserialize(&self, value: &Value) -> Result<BindingValue> {
        match self {
            Self::Scalar(c) => c.deserialize(value),
            Self::Enumeration(c) => c.deserialize(value),
            Self::Bits(c) => c.deserialize(value),
            Self::Union(c) => c.deserialize(value),
            Self::IdentityRef(c) => c.deserialize(value),
            Self::InstanceIdentifier(c) => c.deserialize(value),
        }
    }

    /// Parses a lexical value, as found in schema defaults. Identity names
    /// without a known prefix are resolved in `module`.
    pub fn parse(&self, text: &str, module: &QNameModule) -> Result<BindingValue> {
        match self {
            Self::Scalar(c) => c.parse(text),
            Self::Enumeration(c) => c.parse(text),
            Self::Bits(c) => c.parse(text),
            Self::Union(c) => c.parse(text, module),
            Self::IdentityRef(c) => c.parse(text, module),
            Self::InstanceIdentifier(_) => Err(CodecError::InvalidArgument(format!(
                "instance-identifier literal {text:?} cannot be parsed without a prefix context"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> CodecEnv {
        let schema = yang_data::SchemaContext::new([]).unwrap();
        let runtime = crate::runtime::BindingRuntimeContext::builder(schema).build();
        CodecEnv {
            identities: Arc::new(IdentityCodec::new(runtime)),
            tree: Weak::new(),
        }
    }

    #[test]
    fn union_prefers_first_accepting_member() {
        let codec = ValueCodec::new(
            &TypeDefinition::union([TypeDefinition::int32(), TypeDefinition::string()]),
            &env(),
        )
        .unwrap();
        let BindingValue::Union(u) = codec.deserialize(&Value::Int32(5)).unwrap() else {
            panic!("expected a union value");
        };
        assert_eq!(u.member, "int32");
        let BindingValue::Union(u) = codec.deserialize(&Value::from("5")).unwrap() else {
            panic!("expected a union value");
        };
        assert_eq!(u.member, "string");
    }

    #[test]
    fn union_swallows_member_failures() {
        let codec = ValueCodec::new(
            &TypeDefinition::union([
                TypeDefinition::enumeration([("auto", 0)]),
                TypeDefinition::string(),
            ]),
            &env(),
        )
        .unwrap();
        let BindingValue::Union(u) = codec.deserialize(&Value::from("manual")).unwrap() else {
            panic!("expected a union value");
        };
        assert_eq!(u.member, "string");
    }

    #[test]
    fn union_without_match_fails() {
        let codec = ValueCodec::new(
            &TypeDefinition::union([TypeDefinition::int32(), TypeDefinition::boolean()]),
            &env(),
        )
        .unwrap();
        let err = codec.deserialize(&Value::from("x")).unwrap_err();
        assert!(matches!(err, CodecError::NoCodecMatched { .. }));
    }

    #[test]
    fn instance_identifier_literals_are_rejected() {
        let codec = ValueCodec::new(&TypeDefinition::instance_identifier(), &env()).unwrap();
        assert!(codec.parse("/a:b", &QNameModule::new("urn:x")).is_err());
    }
}
