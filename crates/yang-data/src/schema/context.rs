//! Modules and the schema context assembled from them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use super::node::{SchemaNode, SchemaNodeKind};
use crate::qname::{QName, QNameModule};

/// Schema assembly errors.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("module {0} is defined more than once")]
    DuplicateModule(String),
    #[error("augment in module {module} targets unknown node {target}")]
    UnknownAugmentTarget { module: String, target: String },
    #[error("augment in module {module} targets {kind} {target}, which cannot be augmented")]
    InvalidAugmentTarget {
        module: String,
        target: String,
        kind: &'static str,
    },
    #[error("yang-data {0} is defined more than once")]
    DuplicateYangData(String),
    #[error("yang-data {name} must hold a single container, found {kind}")]
    InvalidYangData { name: String, kind: &'static str },
}

/// An `augment` declaration.
///
/// The children are instantiated directly under the target node; there is no
/// intermediate level in the data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentationSchema {
    /// Module declaring the augment.
    pub module: QNameModule,
    /// Position among the declaring module's augments.
    pub index: usize,
    /// Absolute schema path of the augmented node.
    pub target: Vec<QName>,
    pub children: Vec<Arc<SchemaNode>>,
}

impl AugmentationSchema {
    pub fn child(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.children.iter().find(|c| &c.qname == qname)
    }
}

/// Name of a `yang-data` template: the declaring module plus the template
/// name, which is not a YANG identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YangDataName {
    pub module: QNameModule,
    pub name: Arc<str>,
}

impl YangDataName {
    pub fn new(module: QNameModule, name: impl Into<Arc<str>>) -> Self {
        Self {
            module,
            name: name.into(),
        }
    }
}

impl fmt::Display for YangDataName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.module, self.name)
    }
}

/// A `yang-data` template: a data structure defined outside the data tree,
/// rooted at one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YangDataSchema {
    pub name: YangDataName,
    pub container: Arc<SchemaNode>,
}

impl YangDataSchema {
    /// Resolves `path`, which starts at the template's container.
    pub fn find_node(&self, path: &[QName]) -> Option<Arc<SchemaNode>> {
        let (first, rest) = path.split_first()?;
        if first != &self.container.qname {
            return None;
        }
        let mut current = self.container.clone();
        for step in rest {
            current = current.child(step)?.clone();
        }
        Some(current)
    }
}

/// An `identity` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySchema {
    pub qname: QName,
    pub bases: Vec<QName>,
}

/// A compiled module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub namespace: QNameModule,
    pub children: Vec<Arc<SchemaNode>>,
    pub augmentations: Vec<Arc<AugmentationSchema>>,
    pub identities: Vec<IdentitySchema>,
    pub yang_data: Vec<Arc<YangDataSchema>>,
}

impl Module {
    pub fn builder(name: impl Into<String>, namespace: QNameModule) -> ModuleBuilder {
        ModuleBuilder {
            module: Module {
                name: name.into(),
                namespace,
                children: Vec::new(),
                augmentations: Vec::new(),
                identities: Vec::new(),
                yang_data: Vec::new(),
            },
        }
    }

    pub fn qname(&self, local_name: &str) -> QName {
        self.namespace.qname(local_name)
    }

    pub fn child(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.children.iter().find(|c| &c.qname == qname)
    }
}

/// Builder for [`Module`].
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn child(mut self, child: impl Into<Arc<SchemaNode>>) -> Self {
        self.module.children.push(child.into());
        self
    }

    pub fn augment(
        mut self,
        target: impl IntoIterator<Item = QName>,
        children: impl IntoIterator<Item = Arc<SchemaNode>>,
    ) -> Self {
        let index = self.module.augmentations.len();
        self.module.augmentations.push(Arc::new(AugmentationSchema {
            module: self.module.namespace.clone(),
            index,
            target: target.into_iter().collect(),
            children: children.into_iter().collect(),
        }));
        self
    }

    pub fn identity(mut self, qname: QName, bases: impl IntoIterator<Item = QName>) -> Self {
        self.module.identities.push(IdentitySchema {
            qname,
            bases: bases.into_iter().collect(),
        });
        self
    }

    /// Declares the template `name` rooted at `container`.
    pub fn yang_data(
        mut self,
        name: impl Into<Arc<str>>,
        container: impl Into<Arc<SchemaNode>>,
    ) -> Self {
        self.module.yang_data.push(Arc::new(YangDataSchema {
            name: YangDataName::new(self.module.namespace.clone(), name),
            container: container.into(),
        }));
        self
    }

    pub fn build(self) -> Module {
        self.module
    }
}

/// The set of modules a runtime is built from.
///
/// Augmentations are kept separate from their targets: a target node only
/// lists its own children, and [`SchemaContext::augmentations_targeting`]
/// supplies the rest.
#[derive(Debug, Clone, Default)]
pub struct SchemaContext {
    modules: IndexMap<QNameModule, Arc<Module>>,
}

impl SchemaContext {
    pub fn new(modules: impl IntoIterator<Item = Module>) -> Result<Self, SchemaError> {
        let mut map = IndexMap::new();
        for module in modules {
            if map.contains_key(&module.namespace) {
                return Err(SchemaError::DuplicateModule(module.namespace.to_string()));
            }
            map.insert(module.namespace.clone(), Arc::new(module));
        }
        let ctx = Self { modules: map };
        ctx.check_augment_targets()?;
        ctx.check_yang_data()?;
        Ok(ctx)
    }

    fn check_yang_data(&self) -> Result<(), SchemaError> {
        for module in self.modules.values() {
            let mut seen = HashSet::new();
            for template in &module.yang_data {
                if !seen.insert(&template.name.name) {
                    return Err(SchemaError::DuplicateYangData(template.name.to_string()));
                }
                if !matches!(template.container.kind, SchemaNodeKind::Container { .. }) {
                    return Err(SchemaError::InvalidYangData {
                        name: template.name.to_string(),
                        kind: template.container.kind.keyword(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_augment_targets(&self) -> Result<(), SchemaError> {
        for module in self.modules.values() {
            for aug in &module.augmentations {
                let target = self.find_node(&aug.target).ok_or_else(|| {
                    SchemaError::UnknownAugmentTarget {
                        module: module.name.clone(),
                        target: format_path(&aug.target),
                    }
                })?;
                match target.kind {
                    SchemaNodeKind::Container { .. }
                    | SchemaNodeKind::List { .. }
                    | SchemaNodeKind::Choice
                    | SchemaNodeKind::Case
                    | SchemaNodeKind::Notification
                    | SchemaNodeKind::Input
                    | SchemaNodeKind::Output => {}
                    ref other => {
                        return Err(SchemaError::InvalidAugmentTarget {
                            module: module.name.clone(),
                            target: format_path(&aug.target),
                            kind: other.keyword(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    pub fn module(&self, namespace: &QNameModule) -> Option<&Arc<Module>> {
        self.modules.get(namespace)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Arc<Module>> {
        self.modules.values()
    }

    /// Top-level node with this name.
    pub fn data_child(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.modules.get(&qname.module)?.child(qname)
    }

    /// Resolves an absolute schema path, looking through augmentations.
    pub fn find_node(&self, path: &[QName]) -> Option<Arc<SchemaNode>> {
        let (first, rest) = path.split_first()?;
        let mut current = self.data_child(first)?.clone();
        for (depth, step) in rest.iter().enumerate() {
            let next = match current.child(step) {
                Some(child) => child.clone(),
                None => self
                    .augmentations_targeting(&path[..=depth])
                    .into_iter()
                    .find_map(|aug| aug.child(step).cloned())?,
            };
            current = next;
        }
        Some(current)
    }

    /// All augmentations of the node at `target`, ordered by declaring module
    /// and declaration position.
    pub fn augmentations_targeting(&self, target: &[QName]) -> Vec<Arc<AugmentationSchema>> {
        self.modules
            .values()
            .flat_map(|m| m.augmentations.iter())
            .filter(|aug| aug.target == target)
            .cloned()
            .collect()
    }

    pub fn yang_data(&self, name: &YangDataName) -> Option<&Arc<YangDataSchema>> {
        self.modules
            .get(&name.module)?
            .yang_data
            .iter()
            .find(|t| t.name == *name)
    }

    pub fn identity(&self, qname: &QName) -> Option<&IdentitySchema> {
        self.modules
            .get(&qname.module)?
            .identities
            .iter()
            .find(|i| &i.qname == qname)
    }
}

/// Renders a schema path as `/local/local`.
pub fn format_path(path: &[QName]) -> String {
    let mut out = String::new();
    for step in path {
        out.push('/');
        out.push_str(step.local_name());
    }
    out
}
