//! Identity codec: maps identity names to identity singletons.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use yang_data::{QName, QNameModule, SchemaContext, Value};

use crate::binding::{BindingValue, Identity, TypeName};
use crate::error::{CodecError, Result};
use crate::runtime::BindingRuntimeContext;

fn poisoned<T>(_: T) -> CodecError {
    CodecError::Internal("identity codec lock poisoned".into())
}

/// Hands out one [`Identity`] per identity name for the life of the codec
/// tree, caching lookups in both directions.
#[derive(Debug)]
pub struct IdentityCodec {
    runtime: Arc<BindingRuntimeContext>,
    by_qname: RwLock<HashMap<QName, Identity>>,
    by_type: RwLock<HashMap<TypeName, Identity>>,
}

impl IdentityCodec {
    pub(crate) fn new(runtime: Arc<BindingRuntimeContext>) -> Self {
        Self {
            runtime,
            by_qname: RwLock::new(HashMap::new()),
            by_type: RwLock::new(HashMap::new()),
        }
    }

    /// The identity singleton for `qname`.
    pub fn to_binding(&self, qname: &QName) -> Result<Identity> {
        if let Some(found) = self.by_qname.read().map_err(poisoned)?.get(qname) {
            return Ok(found.clone());
        }
        if self.runtime.schema().identity(qname).is_none() {
            return Err(CodecError::MissingSchema(format!("identity {qname}")));
        }
        let type_name = self
            .runtime
            .identity_type(qname)
            .ok_or_else(|| CodecError::MissingClass(format!("identity {qname}")))?
            .clone();
        self.intern(Identity::new(qname.clone(), type_name))
    }

    /// The identity singleton implemented by `type_name`.
    pub fn for_type(&self, type_name: &TypeName) -> Result<Identity> {
        if let Some(found) = self.by_type.read().map_err(poisoned)?.get(type_name) {
            return Ok(found.clone());
        }
        let qname = self
            .runtime
            .identity_qname(type_name)
            .ok_or_else(|| CodecError::MissingClass(type_name.to_string()))?
            .clone();
        self.to_binding(&qname)
    }

    pub fn from_binding(&self, identity: &Identity) -> QName {
        identity.qname().clone()
    }

    fn intern(&self, identity: Identity) -> Result<Identity> {
        let stored = self
            .by_qname
            .write()
            .map_err(poisoned)?
            .entry(identity.qname().clone())
            .or_insert(identity)
            .clone();
        self.by_type
            .write()
            .map_err(poisoned)?
            .entry(stored.type_name().clone())
            .or_insert_with(|| stored.clone());
        Ok(stored)
    }
}

/// Codec for one identityref leaf type.
#[derive(Debug, Clone)]
pub struct IdentityRefCodec {
    identities: Arc<IdentityCodec>,
    bases: Vec<QName>,
}

impl IdentityRefCodec {
    pub(crate) fn new(identities: Arc<IdentityCodec>, bases: &[QName]) -> Self {
        Self {
            identities,
            bases: bases.to_vec(),
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::QName(_))
    }

    pub fn serialize(&self, value: &BindingValue) -> Result<Value> {
        let BindingValue::Identity(identity) = value else {
            return Err(CodecError::InvalidArgument(format!(
                "expected an identity, got {}",
                value.kind()
            )));
        };
        let qname = self.identities.from_binding(identity);
        self.check_bases(&qname)?;
        Ok(Value::QName(qname))
    }

    pub fn deserialize(&self, value: &Value) -> Result<BindingValue> {
        let Value::QName(qname) = value else {
            return Err(CodecError::InvalidArgument(format!(
                "expected an identity name, got {}",
                value.kind()
            )));
        };
        self.check_bases(qname)?;
        Ok(BindingValue::Identity(self.identities.to_binding(qname)?))
    }

    /// Parses `[prefix:]name`; the name is resolved in `module`.
    pub fn parse(&self, text: &str, module: &QNameModule) -> Result<BindingValue> {
        let local = text.rsplit(':').next().unwrap_or(text).trim();
        self.deserialize(&Value::QName(module.qname(local)))
    }

    fn check_bases(&self, qname: &QName) -> Result<()> {
        if self.bases.is_empty() {
            return Ok(());
        }
        let schema = self.identities.runtime.schema();
        if self.bases.iter().any(|base| derives_from(schema, qname, base)) {
            Ok(())
        } else {
            Err(CodecError::InvalidArgument(format!(
                "identity {qname} is not derived from any of the allowed bases"
            )))
        }
    }
}

/// Whether `identity` is `base` or derives from it transitively.
fn derives_from(schema: &SchemaContext, identity: &QName, base: &QName) -> bool {
    let mut pending = vec![identity.clone()];
    let mut seen = Vec::new();
    while let Some(current) = pending.pop() {
        if &current == base {
            return true;
        }
        if seen.contains(&current) {
            continue;
        }
        if let Some(schema_identity) = schema.identity(&current) {
            pending.extend(schema_identity.bases.iter().cloned());
        }
        seen.push(current);
    }
    false
}
