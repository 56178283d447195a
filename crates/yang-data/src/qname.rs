//! Qualified names.
//!
//! Every schema node, identity and tree node is named by a [`QName`]: a local
//! name scoped by the namespace (and optional revision) of the module that
//! defines it.

use std::fmt;
use std::sync::Arc;

/// Namespace and optional revision of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QNameModule {
    pub namespace: Arc<str>,
    pub revision: Option<Arc<str>>,
}

impl QNameModule {
    pub fn new(namespace: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: namespace.into(),
            revision: None,
        }
    }

    pub fn with_revision(namespace: impl Into<Arc<str>>, revision: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: namespace.into(),
            revision: Some(revision.into()),
        }
    }

    /// Creates a name in this module.
    pub fn qname(&self, local_name: impl Into<Arc<str>>) -> QName {
        QName {
            module: self.clone(),
            local_name: local_name.into(),
        }
    }
}

impl fmt::Display for QNameModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "{}?revision={}", self.namespace, rev),
            None => f.write_str(&self.namespace),
        }
    }
}

/// A local name qualified by its module.
///
/// Ordering is by namespace, then revision, then local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub module: QNameModule,
    pub local_name: Arc<str>,
}

impl QName {
    pub fn new(namespace: impl Into<Arc<str>>, local_name: impl Into<Arc<str>>) -> Self {
        QNameModule::new(namespace).qname(local_name)
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> &str {
        &self.module.namespace
    }

    /// Same local name, moved into another module.
    pub fn bind_to(&self, module: &QNameModule) -> QName {
        module.qname(self.local_name.clone())
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.module, self.local_name)
    }
}
