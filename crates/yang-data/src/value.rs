//! Leaf values of the normalized tree.
//!
//! Values are already typed: an `int32` leaf always carries [`Value::Int32`],
//! never a string. All variants are hashable and totally ordered so that they
//! can appear inside list-entry predicates and leaf-set entry identifiers.

use std::collections::BTreeSet;
use std::fmt;

use base64::{engine::general_purpose::STANDARD as B64, Engine};

use crate::path::YangInstanceIdentifier;
use crate::qname::QName;

/// A fixed-point decimal: `unscaled / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decimal64 {
    pub unscaled: i64,
    pub scale: u8,
}

impl Decimal64 {
    pub fn new(unscaled: i64, scale: u8) -> Self {
        Self { unscaled, scale }
    }

    /// Parses `[-]digits[.digits]` at exactly `scale` fraction digits.
    ///
    /// Returns `None` when the literal has more fraction digits than `scale`
    /// or does not fit into 64 bits.
    pub fn parse(text: &str, scale: u8) -> Option<Self> {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if frac_part.len() > scale as usize
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let mut unscaled: i64 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            unscaled = unscaled.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        }
        for _ in frac_part.len()..scale as usize {
            unscaled = unscaled.checked_mul(10)?;
        }
        Some(Self {
            unscaled: if negative { -unscaled } else { unscaled },
            scale,
        })
    }
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        let divisor = 10u64.pow(u32::from(self.scale));
        let magnitude = self.unscaled.unsigned_abs();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            magnitude / divisor,
            magnitude % divisor,
            width = self.scale as usize
        )
    }
}

/// A typed leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Empty,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Decimal64(Decimal64),
    String(String),
    Binary(Vec<u8>),
    /// Names of the bits that are set.
    Bits(BTreeSet<String>),
    /// An identity reference.
    QName(QName),
    InstanceIdentifier(YangInstanceIdentifier),
}

impl Value {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Bool(_) => "boolean",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Uint8(_) => "uint8",
            Self::Uint16(_) => "uint16",
            Self::Uint32(_) => "uint32",
            Self::Uint64(_) => "uint64",
            Self::Decimal64(_) => "decimal64",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Bits(_) => "bits",
            Self::QName(_) => "identityref",
            Self::InstanceIdentifier(_) => "instance-identifier",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Uint32(value)
    }
}

impl From<QName> for Value {
    fn from(value: QName) -> Self {
        Self::QName(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("[empty]"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Decimal64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Binary(v) => f.write_str(&B64.encode(v)),
            Self::Bits(v) => {
                let names: Vec<&str> = v.iter().map(String::as_str).collect();
                f.write_str(&names.join(" "))
            }
            Self::QName(v) => write!(f, "{v}"),
            Self::InstanceIdentifier(v) => write!(f, "{v}"),
        }
    }
}
