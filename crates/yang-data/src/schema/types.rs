//! Leaf type definitions.

use crate::qname::QName;

/// A named enumeration member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumPair {
    pub name: String,
    pub value: i32,
}

/// A named bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bit {
    pub name: String,
    pub position: u32,
}

/// The built-in type at the root of a type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Decimal64 { fraction_digits: u8 },
    String { patterns: Vec<String> },
    Binary,
    Empty,
    Enumeration(Vec<EnumPair>),
    Bits(Vec<Bit>),
    Union(Vec<TypeDefinition>),
    IdentityRef { bases: Vec<QName> },
    InstanceIdentifier,
}

impl TypeKind {
    /// The built-in keyword naming this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Decimal64 { .. } => "decimal64",
            Self::String { .. } => "string",
            Self::Binary => "binary",
            Self::Empty => "empty",
            Self::Enumeration(_) => "enumeration",
            Self::Bits(_) => "bits",
            Self::Union(_) => "union",
            Self::IdentityRef { .. } => "identityref",
            Self::InstanceIdentifier => "instance-identifier",
        }
    }
}

/// A leaf type: a built-in kind, optionally named by a typedef.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: Option<QName>,
    pub kind: TypeKind,
}

impl TypeDefinition {
    pub fn builtin(kind: TypeKind) -> Self {
        Self { name: None, kind }
    }

    pub fn typedef(name: QName, kind: TypeKind) -> Self {
        Self {
            name: Some(name),
            kind,
        }
    }

    /// The typedef's local name, or the built-in keyword.
    pub fn type_name(&self) -> &str {
        match &self.name {
            Some(name) => name.local_name(),
            None => self.kind.keyword(),
        }
    }

    pub fn boolean() -> Self {
        Self::builtin(TypeKind::Boolean)
    }

    pub fn int32() -> Self {
        Self::builtin(TypeKind::Int32)
    }

    pub fn int64() -> Self {
        Self::builtin(TypeKind::Int64)
    }

    pub fn uint8() -> Self {
        Self::builtin(TypeKind::Uint8)
    }

    pub fn uint32() -> Self {
        Self::builtin(TypeKind::Uint32)
    }

    pub fn string() -> Self {
        Self::builtin(TypeKind::String {
            patterns: Vec::new(),
        })
    }

    pub fn pattern_string(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::builtin(TypeKind::String {
            patterns: patterns.into_iter().map(Into::into).collect(),
        })
    }

    pub fn decimal64(fraction_digits: u8) -> Self {
        Self::builtin(TypeKind::Decimal64 { fraction_digits })
    }

    pub fn binary() -> Self {
        Self::builtin(TypeKind::Binary)
    }

    pub fn empty() -> Self {
        Self::builtin(TypeKind::Empty)
    }

    pub fn enumeration<'a>(members: impl IntoIterator<Item = (&'a str, i32)>) -> Self {
        Self::builtin(TypeKind::Enumeration(
            members
                .into_iter()
                .map(|(name, value)| EnumPair {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        ))
    }

    pub fn bits<'a>(bits: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        Self::builtin(TypeKind::Bits(
            bits.into_iter()
                .map(|(name, position)| Bit {
                    name: name.to_string(),
                    position,
                })
                .collect(),
        ))
    }

    pub fn union(members: impl IntoIterator<Item = TypeDefinition>) -> Self {
        Self::builtin(TypeKind::Union(members.into_iter().collect()))
    }

    pub fn identityref(base: QName) -> Self {
        Self::builtin(TypeKind::IdentityRef { bases: vec![base] })
    }

    pub fn instance_identifier() -> Self {
        Self::builtin(TypeKind::InstanceIdentifier)
    }
}
