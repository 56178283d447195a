//! Built-in scalar, enumeration and bits codecs.

use std::collections::BTreeSet;

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use regex::Regex;
use yang_data::schema::{Bit, EnumPair};
use yang_data::{Decimal64, TypeKind, Value};

use crate::binding::{BindingValue, BitsValue, EnumValue};
use crate::error::{CodecError, Result};

/// Pass-through codec for built-in types, verifying the value shape.
#[derive(Debug, Clone)]
pub struct ScalarCodec {
    kind: TypeKind,
    patterns: Vec<Regex>,
}

impl ScalarCodec {
    pub(crate) fn new(kind: &TypeKind) -> Result<Self> {
        let patterns = match kind {
            TypeKind::String { patterns } => patterns
                .iter()
                .map(|p| {
                    Regex::new(&format!("^(?:{p})$")).map_err(|e| {
                        CodecError::InvalidArgument(format!("invalid pattern {p:?}: {e}"))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };
        Ok(Self {
            kind: kind.clone(),
            patterns,
        })
    }

    /// Whether `value` has the variant this type produces.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.kind() != self.kind.keyword() {
            return false;
        }
        match (&self.kind, value) {
            (TypeKind::Decimal64 { fraction_digits }, Value::Decimal64(d)) => {
                d.scale == *fraction_digits
            }
            _ => true,
        }
    }

    pub fn check(&self, value: &Value) -> Result<()> {
        if !self.accepts(value) {
            return Err(CodecError::InvalidArgument(format!(
                "expected a {} value, got {} {value:?}",
                self.kind.keyword(),
                value.kind()
            )));
        }
        if let Value::String(s) = value {
            if let Some(p) = self.patterns.iter().find(|p| !p.is_match(s)) {
                return Err(CodecError::InvalidArgument(format!(
                    "{s:?} does not match pattern {}",
                    p.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn serialize(&self, value: &BindingValue) -> Result<Value> {
        match value {
            BindingValue::Scalar(v) => {
                self.check(v)?;
                Ok(v.clone())
            }
            other => Err(CodecError::InvalidArgument(format!(
                "expected a {} value, got {}",
                self.kind.keyword(),
                other.kind()
            ))),
        }
    }

    pub fn deserialize(&self, value: &Value) -> Result<BindingValue> {
        self.check(value)?;
        Ok(BindingValue::Scalar(value.clone()))
    }

    /// Parses a lexical value such as a schema default.
    pub fn parse(&self, text: &str) -> Result<BindingValue> {
        let invalid = || {
            CodecError::InvalidArgument(format!("{text:?} is not a valid {}", self.kind.keyword()))
        };
        let value = match &self.kind {
            TypeKind::Boolean => match text {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(invalid()),
            },
            TypeKind::Int8 => Value::Int8(text.parse().map_err(|_| invalid())?),
            TypeKind::Int16 => Value::Int16(text.parse().map_err(|_| invalid())?),
            TypeKind::Int32 => Value::Int32(text.parse().map_err(|_| invalid())?),
            TypeKind::Int64 => Value::Int64(text.parse().map_err(|_| invalid())?),
            TypeKind::Uint8 => Value::Uint8(text.parse().map_err(|_| invalid())?),
            TypeKind::Uint16 => Value::Uint16(text.parse().map_err(|_| invalid())?),
            TypeKind::Uint32 => Value::Uint32(text.parse().map_err(|_| invalid())?),
            TypeKind::Uint64 => Value::Uint64(text.parse().map_err(|_| invalid())?),
            TypeKind::Decimal64 { fraction_digits } => {
                Value::Decimal64(Decimal64::parse(text, *fraction_digits).ok_or_else(invalid)?)
            }
            TypeKind::String { .. } => Value::String(text.to_string()),
            TypeKind::Binary => Value::Binary(B64.decode(text.trim()).map_err(|_| invalid())?),
            TypeKind::Empty => Value::Empty,
            _ => return Err(invalid()),
        };
        self.deserialize(&value)
    }
}

/// Maps enumeration names to generated enum values.
#[derive(Debug, Clone)]
pub struct EnumCodec {
    members: Vec<EnumPair>,
}

impl EnumCodec {
    pub(crate) fn new(members: &[EnumPair]) -> Self {
        Self {
            members: members.to_vec(),
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::String(_))
    }

    pub fn serialize(&self, value: &BindingValue) -> Result<Value> {
        let BindingValue::Enum(e) = value else {
            return Err(CodecError::InvalidArgument(format!(
                "expected an enumeration value, got {}",
                value.kind()
            )));
        };
        self.members
            .iter()
            .find(|m| m.name == e.name && m.value == e.value)
            .map(|m| Value::String(m.name.clone()))
            .ok_or_else(|| CodecError::InvalidArgument(format!("unknown enum member {}", e.name)))
    }

    pub fn deserialize(&self, value: &Value) -> Result<BindingValue> {
        let name = value.as_str().ok_or_else(|| {
            CodecError::InvalidArgument(format!("expected an enum name, got {}", value.kind()))
        })?;
        self.parse(name)
    }

    pub fn parse(&self, name: &str) -> Result<BindingValue> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| {
                BindingValue::Enum(EnumValue {
                    name: m.name.clone(),
                    value: m.value,
                })
            })
            .ok_or_else(|| CodecError::InvalidArgument(format!("unknown enum member {name}")))
    }
}

/// Maps bit names to bit positions.
#[derive(Debug, Clone)]
pub struct BitsCodec {
    bits: Vec<Bit>,
}

impl BitsCodec {
    pub(crate) fn new(bits: &[Bit]) -> Self {
        Self {
            bits: bits.to_vec(),
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Bits(_))
    }

    pub fn serialize(&self, value: &BindingValue) -> Result<Value> {
        let BindingValue::Bits(bits) = value else {
            return Err(CodecError::InvalidArgument(format!(
                "expected a bits value, got {}",
                value.kind()
            )));
        };
        let mut names = BTreeSet::new();
        for position in bits.positions() {
            let bit = self
                .bits
                .iter()
                .find(|b| b.position == position)
                .ok_or_else(|| {
                    CodecError::InvalidArgument(format!("unknown bit position {position}"))
                })?;
            names.insert(bit.name.clone());
        }
        Ok(Value::Bits(names))
    }

    pub fn deserialize(&self, value: &Value) -> Result<BindingValue> {
        let Value::Bits(names) = value else {
            return Err(CodecError::InvalidArgument(format!(
                "expected bits, got {}",
                value.kind()
            )));
        };
        self.from_names(names.iter().map(String::as_str))
    }

    /// Parses a space separated list of bit names.
    pub fn parse(&self, text: &str) -> Result<BindingValue> {
        self.from_names(text.split_whitespace())
    }

    fn from_names<'a>(&self, names: impl Iterator<Item = &'a str>) -> Result<BindingValue> {
        let mut positions = Vec::new();
        for name in names {
            let bit = self
                .bits
                .iter()
                .find(|b| b.name == name)
                .ok_or_else(|| CodecError::InvalidArgument(format!("unknown bit {name}")))?;
            positions.push(bit.position);
        }
        Ok(BindingValue::Bits(BitsValue::new(positions)))
    }
}
