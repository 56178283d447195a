//! Caches of the tree nodes produced for objects.
//!
//! A cache holds its input objects strongly and the produced nodes weakly: an
//! entry stays useful only while something else (typically a tree the node
//! was spliced into) keeps the node alive, and is dropped on the next insert
//! once the node is gone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use yang_data::{NormalizedNode, NormalizedNodeResult};

use crate::binding::{data_equals, DataObject, Key, TypeName};
use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::stream::{
    BindingStreamEventWriter, BindingToNormalizedStreamWriter, DataObjectSerializer,
    ObjectSerializer, SerializerRegistry,
};
use crate::tree::TreeInner;

#[derive(Debug)]
struct CacheEntry {
    object: Arc<dyn DataObject>,
    node: Weak<NormalizedNode>,
}

impl CacheEntry {
    fn is_live(&self) -> bool {
        self.node.strong_count() > 0
    }
}

type BucketKey = (TypeName, Option<Key>);
type Candidates = Vec<(Arc<dyn DataObject>, Arc<NormalizedNode>)>;

fn poisoned<T>(_: T) -> CodecError {
    CodecError::Internal("node cache lock poisoned".into())
}

/// Node cache of one container or list entry type.
///
/// Entries are bucketed by type and key; within a bucket an input is matched
/// by identity first, then by value. An entry whose node has been dropped no
/// longer holds its input: every insert sweeps dead entries out of all
/// buckets.
#[derive(Debug)]
pub struct NodeCache {
    ctx: Arc<CodecContext>,
    buckets: Mutex<HashMap<BucketKey, Vec<CacheEntry>>>,
}

fn same_object(a: &Arc<dyn DataObject>, b: &Arc<dyn DataObject>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
}

impl NodeCache {
    pub(crate) fn new(ctx: Arc<CodecContext>) -> Self {
        Self {
            ctx,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    fn bucket_key(object: &dyn DataObject) -> Result<BucketKey> {
        Ok((object.implemented_type().name().clone(), object.key()?))
    }

    /// Live entries of `bucket`.
    fn candidates(&self, bucket: &BucketKey) -> Result<Candidates> {
        let buckets = self.buckets.lock().map_err(poisoned)?;
        Ok(buckets
            .get(bucket)
            .into_iter()
            .flatten()
            .filter_map(|e| e.node.upgrade().map(|node| (e.object.clone(), node)))
            .collect())
    }

    fn sweep(buckets: &mut HashMap<BucketKey, Vec<CacheEntry>>) {
        let mut pruned = 0;
        buckets.retain(|_, entries| {
            let before = entries.len();
            entries.retain(CacheEntry::is_live);
            pruned += before - entries.len();
            !entries.is_empty()
        });
        if pruned > 0 {
            tracing::debug!(pruned, "pruned stale node cache entries");
        }
    }

    fn find(object: &Arc<dyn DataObject>, candidates: &Candidates) -> Option<Arc<NormalizedNode>> {
        candidates
            .iter()
            .find(|(cached, _)| same_object(cached, object))
            .or_else(|| {
                candidates
                    .iter()
                    .find(|(cached, _)| data_equals(cached.as_ref(), object.as_ref()))
            })
            .map(|(_, node)| node.clone())
    }

    /// The node for `object`, serializing it on a miss. Nested objects go
    /// through `registry`.
    pub fn get_or_compute(
        &self,
        object: &Arc<dyn DataObject>,
        registry: &SerializerRegistry,
    ) -> Result<Arc<NormalizedNode>> {
        if let Some(node) = object.backing_node() {
            return Ok(node.clone());
        }
        let bucket = Self::bucket_key(object.as_ref())?;
        if let Some(node) = Self::find(object, &self.candidates(&bucket)?) {
            return Ok(node);
        }

        let mut result = NormalizedNodeResult::new();
        {
            let mut writer = BindingToNormalizedStreamWriter::new(self.ctx.clone(), &mut result);
            ObjectSerializer::new(object.implemented_type().clone()).serialize(
                object,
                &mut writer,
                registry,
            )?;
        }
        let node = Arc::new(result.into_result()?);

        let mut buckets = self.buckets.lock().map_err(poisoned)?;
        Self::sweep(&mut buckets);
        let entries = buckets.entry(bucket).or_default();
        // Another thread may have stored an equal object meanwhile.
        let live: Candidates = entries
            .iter()
            .filter_map(|e| e.node.upgrade().map(|node| (e.object.clone(), node)))
            .collect();
        if let Some(existing) = Self::find(object, &live) {
            return Ok(existing);
        }
        entries.push(CacheEntry {
            object: object.clone(),
            node: Arc::downgrade(&node),
        });
        Ok(node)
    }
}

/// Emits cached subtrees in place of object events.
#[derive(Debug)]
pub struct CachingSerializer {
    cache: Arc<NodeCache>,
}

impl CachingSerializer {
    pub(crate) fn new(cache: Arc<NodeCache>) -> Self {
        Self { cache }
    }
}

impl DataObjectSerializer for CachingSerializer {
    fn serialize(
        &self,
        object: &Arc<dyn DataObject>,
        writer: &mut dyn BindingStreamEventWriter,
        registry: &SerializerRegistry,
    ) -> Result<()> {
        let node = self.cache.get_or_compute(object, registry)?;
        writer.normalized_node(&node)
    }
}

/// Serializer reusing the nodes produced for equal objects of selected
/// types, here and in every nested position.
#[derive(Debug)]
pub struct CachingCodec {
    tree: Arc<TreeInner>,
    registry: SerializerRegistry,
}

impl CachingCodec {
    pub(crate) fn new(tree: Arc<TreeInner>, types: impl IntoIterator<Item = TypeName>) -> Self {
        let mut caches = HashMap::new();
        for type_name in types {
            let ctx = match tree.context_for(&type_name) {
                Ok(ctx) => ctx,
                Err(err) => {
                    tracing::debug!(
                        type_name = %type_name,
                        error = %err,
                        "not caching unknown type"
                    );
                    continue;
                }
            };
            let cacheable = matches!(
                ctx.as_ref(),
                CodecContext::Container(_)
                    | CodecContext::StructuralContainer(_)
                    | CodecContext::List(_)
                    | CodecContext::KeyedList(_)
            );
            if !cacheable {
                tracing::debug!(type_name = %type_name, kind = ctx.kind(), "not caching type");
                continue;
            }
            caches.insert(type_name, Arc::new(NodeCache::new(ctx)));
        }
        Self {
            tree,
            registry: SerializerRegistry::new(caches),
        }
    }

    pub fn is_cached(&self, type_name: &TypeName) -> bool {
        self.registry.has_cache(type_name)
    }

    /// Serializes `object`. The result may be shared with earlier results for
    /// equal objects.
    pub fn serialize(&self, object: &Arc<dyn DataObject>) -> Result<Arc<NormalizedNode>> {
        if let Some(cache) = self.registry.cache(object.implemented_type().name()) {
            return cache.get_or_compute(object, &self.registry);
        }
        let ctx = self.tree.context_for(object.implemented_type().name())?;
        Ok(Arc::new(self.tree.serialize_with(&ctx, object, &self.registry)?))
    }
}
