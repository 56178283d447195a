//! Union codec.

use yang_data::{QNameModule, Value};

use super::ValueCodec;
use crate::binding::{BindingValue, UnionValue};
use crate::error::{CodecError, Result};

/// Ordered member codecs of a union type.
#[derive(Debug, Clone)]
pub struct UnionCodec {
    name: String,
    members: Vec<(String, ValueCodec)>,
}

impl UnionCodec {
    pub(crate) fn new(name: impl Into<String>, members: Vec<(String, ValueCodec)>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.members.iter().any(|(_, codec)| codec.accepts(value))
    }

    /// The first member that produces a value wins.
    ///
    /// A tagged [`UnionValue`] only matches members of its own name; any
    /// other value is offered to every member in order.
    pub fn serialize(&self, value: &BindingValue) -> Result<Value> {
        let (tag, inner) = match value {
            BindingValue::Union(u) => (Some(u.member.as_str()), u.value.as_ref()),
            other => (None, other),
        };
        self.members
            .iter()
            .filter(|(name, _)| tag.map_or(true, |t| t == name))
            .find_map(|(_, codec)| codec.serialize(inner).ok())
            .ok_or_else(|| self.no_match(format!("{inner:?}")))
    }

    /// Tries members in declared order, skipping those whose static check
    /// rejects `value` and swallowing member failures.
    pub fn deserialize(&self, value: &Value) -> Result<BindingValue> {
        for (name, codec) in &self.members {
            if !codec.accepts(value) {
                continue;
            }
            if let Ok(member) = codec.deserialize(value) {
                return Ok(BindingValue::Union(UnionValue {
                    member: name.clone(),
                    value: Box::new(member),
                }));
            }
        }
        Err(self.no_match(format!("{value:?}")))
    }

    pub fn parse(&self, text: &str, module: &QNameModule) -> Result<BindingValue> {
        for (name, codec) in &self.members {
            if let Ok(member) = codec.parse(text, module) {
                return Ok(BindingValue::Union(UnionValue {
                    member: name.clone(),
                    value: Box::new(member),
                }));
            }
        }
        Err(self.no_match(text.to_string()))
    }

    fn no_match(&self, value: String) -> CodecError {
        CodecError::NoCodecMatched {
            union: self.name.clone(),
            value,
        }
    }
}
