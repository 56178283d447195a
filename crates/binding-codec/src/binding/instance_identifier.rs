//! Object-model paths.

use std::fmt;

use super::data_object::Key;
use super::object_type::TypeName;
use super::value::BindingValue;

/// One component of an [`InstanceIdentifier`].
#[derive(Debug, Clone, PartialEq)]
pub enum PathStep {
    /// A container, choice member, augmentation or any entry of a list.
    Item {
        type_name: TypeName,
        case_type: Option<TypeName>,
    },
    /// One entry of a keyed list.
    KeyedItem {
        type_name: TypeName,
        case_type: Option<TypeName>,
        key: Key,
    },
}

impl PathStep {
    pub fn item(type_name: impl Into<TypeName>) -> Self {
        Self::Item {
            type_name: type_name.into(),
            case_type: None,
        }
    }

    pub fn keyed(type_name: impl Into<TypeName>, key: Key) -> Self {
        Self::KeyedItem {
            type_name: type_name.into(),
            case_type: None,
            key,
        }
    }

    pub fn type_name(&self) -> &TypeName {
        match self {
            Self::Item { type_name, .. } | Self::KeyedItem { type_name, .. } => type_name,
        }
    }

    pub fn case_type(&self) -> Option<&TypeName> {
        match self {
            Self::Item { case_type, .. } | Self::KeyedItem { case_type, .. } => case_type.as_ref(),
        }
    }

    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::KeyedItem { key, .. } => Some(key),
            Self::Item { .. } => None,
        }
    }

    /// Qualifies the step with the case it lives in.
    pub fn in_case(self, case: impl Into<TypeName>) -> Self {
        let case = Some(case.into());
        match self {
            Self::Item { type_name, .. } => Self::Item {
                type_name,
                case_type: case,
            },
            Self::KeyedItem { type_name, key, .. } => Self::KeyedItem {
                type_name,
                case_type: case,
                key,
            },
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(case) = self.case_type() {
            write!(f, "{}/", case.simple_name())?;
        }
        f.write_str(self.type_name().simple_name())?;
        if let Some(key) = self.key() {
            f.write_str("[")?;
            for (i, (property, value)) in key.values().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{property}={value:?}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Path from the data root to an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceIdentifier {
    steps: Vec<PathStep>,
}

impl InstanceIdentifier {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn target_type(&self) -> Option<&TypeName> {
        self.steps.last().map(PathStep::type_name)
    }

    pub fn child(mut self, type_name: impl Into<TypeName>) -> Self {
        self.steps.push(PathStep::item(type_name));
        self
    }

    pub fn keyed_child(mut self, type_name: impl Into<TypeName>, key: Key) -> Self {
        self.steps.push(PathStep::keyed(type_name, key));
        self
    }

    pub fn case_child(mut self, case: impl Into<TypeName>, type_name: impl Into<TypeName>) -> Self {
        self.steps.push(PathStep::item(type_name).in_case(case));
        self
    }

    pub fn step(mut self, step: PathStep) -> Self {
        self.steps.push(step);
        self
    }
}

impl fmt::Display for InstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

/// Target of an instance-identifier value: an object, or a single leaf or
/// leaf-list property of an object.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingPath {
    Data(InstanceIdentifier),
    Property {
        parent: InstanceIdentifier,
        property: String,
        /// Set when addressing one entry of a leaf-list.
        entry: Option<Box<BindingValue>>,
    },
}

impl From<InstanceIdentifier> for BindingPath {
    fn from(value: InstanceIdentifier) -> Self {
        Self::Data(value)
    }
}
