//! Tree-level addressing: path arguments and instance identifiers.

use std::collections::BTreeMap;
use std::fmt;

use crate::qname::QName;
use crate::value::Value;

/// One step of a [`YangInstanceIdentifier`], also used as the key of a child
/// inside a data container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathArgument {
    /// A container, choice, leaf, list (as a whole) or unkeyed entry.
    NodeIdentifier(QName),
    /// A keyed list entry.
    NodeIdentifierWithPredicates {
        name: QName,
        keys: BTreeMap<QName, Value>,
    },
    /// A leaf-set entry.
    NodeWithValue { name: QName, value: Value },
}

impl PathArgument {
    pub fn node(name: QName) -> Self {
        Self::NodeIdentifier(name)
    }

    pub fn with_predicates(name: QName, keys: impl IntoIterator<Item = (QName, Value)>) -> Self {
        Self::NodeIdentifierWithPredicates {
            name,
            keys: keys.into_iter().collect(),
        }
    }

    pub fn with_value(name: QName, value: Value) -> Self {
        Self::NodeWithValue { name, value }
    }

    /// The node type named by this argument.
    pub fn name(&self) -> &QName {
        match self {
            Self::NodeIdentifier(name) => name,
            Self::NodeIdentifierWithPredicates { name, .. } => name,
            Self::NodeWithValue { name, .. } => name,
        }
    }

    /// Drops predicates or values, leaving a plain node identifier.
    pub fn to_node_identifier(&self) -> PathArgument {
        Self::NodeIdentifier(self.name().clone())
    }
}

impl fmt::Display for PathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeIdentifier(name) => write!(f, "{name}"),
            Self::NodeIdentifierWithPredicates { name, keys } => {
                write!(f, "{name}")?;
                for (k, v) in keys {
                    write!(f, "[{}={}]", k.local_name(), v)?;
                }
                Ok(())
            }
            Self::NodeWithValue { name, value } => write!(f, "{name}[.={value}]"),
        }
    }
}

/// An absolute path into the normalized tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YangInstanceIdentifier {
    args: Vec<PathArgument>,
}

impl YangInstanceIdentifier {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(args: Vec<PathArgument>) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &[PathArgument] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn last(&self) -> Option<&PathArgument> {
        self.args.last()
    }

    pub fn node(mut self, arg: PathArgument) -> Self {
        self.args.push(arg);
        self
    }

    pub fn into_args(self) -> Vec<PathArgument> {
        self.args
    }
}

impl From<Vec<PathArgument>> for YangInstanceIdentifier {
    fn from(args: Vec<PathArgument>) -> Self {
        Self::new(args)
    }
}

impl fmt::Display for YangInstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            return f.write_str("/");
        }
        for arg in &self.args {
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}
