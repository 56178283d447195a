//! The codec tree: factory and memo of codec contexts, and the entry points
//! translating objects, paths, notifications, operation data and yang-data
//! templates.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use yang_data::schema::format_path;
use yang_data::{
    NormalizedNode, NormalizedNodeResult, NormalizedNodeStreamWriter, PathArgument, QName,
    SchemaNodeKind, YangDataName, YangInstanceIdentifier,
};

use crate::binding::{
    BindingPath, BindingValue, DataObject, InstanceIdentifier, ObjectKind, ObjectType, PathStep,
    SchemaLocator, TypeName,
};
use crate::cache::CachingCodec;
use crate::codec::{CodecEnv, IdentityCodec, InstanceIdentifierCodec};
use crate::context::{ChoiceContext, CodecContext, DataObjectContext, ListContext};
use crate::error::{CodecError, Result};
use crate::options::CodecOptions;
use crate::path;
use crate::runtime::{BindingRuntimeContext, ResolvedSchema};
use crate::stream::{BindingToNormalizedStreamWriter, SerializerRegistry};
use crate::template::YangDataCodec;
use crate::view::ObjectView;

/// Shared state of a [`BindingCodecTree`].
#[derive(Debug)]
pub struct TreeInner {
    runtime: Arc<BindingRuntimeContext>,
    options: CodecOptions,
    contexts: RwLock<HashMap<TypeName, Arc<CodecContext>>>,
    /// Empty instances of structural containers.
    empties: RwLock<HashMap<TypeName, Arc<dyn DataObject>>>,
    identities: Arc<IdentityCodec>,
    registry: SerializerRegistry,
    self_weak: Weak<TreeInner>,
}

fn poisoned<T>(_: T) -> CodecError {
    CodecError::Internal("codec tree lock poisoned".into())
}

impl TreeInner {
    pub(crate) fn runtime(&self) -> &BindingRuntimeContext {
        &self.runtime
    }

    pub(crate) fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub(crate) fn weak(&self) -> Weak<TreeInner> {
        self.self_weak.clone()
    }

    pub(crate) fn env(&self) -> CodecEnv {
        CodecEnv {
            identities: self.identities.clone(),
            tree: self.weak(),
        }
    }

    pub(crate) fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    /// The context of `type_name`, built on first request. Concurrent first
    /// requests may build twice; the first stored context wins.
    pub(crate) fn context_for(&self, type_name: &TypeName) -> Result<Arc<CodecContext>> {
        if let Some(ctx) = self.contexts.read().map_err(poisoned)?.get(type_name) {
            return Ok(ctx.clone());
        }
        let type_ = self.runtime.load_type(type_name)?;
        let built = Arc::new(self.build_context(type_)?);
        let mut contexts = self.contexts.write().map_err(poisoned)?;
        let ctx = contexts.entry(type_name.clone()).or_insert(built).clone();
        tracing::trace!(type_name = %type_name, kind = ctx.kind(), "built codec context");
        Ok(ctx)
    }

    fn build_context(&self, type_: ObjectType) -> Result<CodecContext> {
        let schema = self.runtime.resolve_schema(&type_)?;
        let mismatch = |schema: &ResolvedSchema| {
            let found = match schema {
                ResolvedSchema::Node(node) => format!("{} {}", node.kind.keyword(), node.qname),
                ResolvedSchema::Augment(aug) => {
                    format!("augment #{} of {}", aug.index, aug.module)
                }
            };
            CodecError::IncorrectNesting(format!("{} cannot mirror {found}", type_.name()))
        };
        let node = schema.as_node().cloned();
        Ok(match (&type_.kind, node.as_ref().map(|n| &n.kind)) {
            (ObjectKind::Container, Some(SchemaNodeKind::Container { presence })) => {
                let presence = *presence;
                let ctx = DataObjectContext::new(type_.clone(), schema, self)?;
                if presence {
                    CodecContext::Container(ctx)
                } else {
                    CodecContext::StructuralContainer(ctx)
                }
            }
            (ObjectKind::ListEntry, Some(SchemaNodeKind::List { keys, .. })) => {
                let keyed = !keys.is_empty();
                let node = node.clone().ok_or_else(|| mismatch(&schema))?;
                let ctx = ListContext::new(type_.clone(), node, self)?;
                if keyed {
                    CodecContext::KeyedList(ctx)
                } else {
                    CodecContext::List(ctx)
                }
            }
            (ObjectKind::Choice, Some(SchemaNodeKind::Choice)) => {
                let node = node.clone().ok_or_else(|| mismatch(&schema))?;
                CodecContext::Choice(ChoiceContext::new(type_.clone(), node, self)?)
            }
            (ObjectKind::Case { choice }, Some(SchemaNodeKind::Case)) => {
                let path = type_.schema.path();
                let parent = path.split_last().map(|(_, parent)| parent).unwrap_or_default();
                let scope = type_.schema.scope();
                if self.runtime.type_in(&scope, parent).map(ObjectType::name) != Some(choice) {
                    return Err(CodecError::IncorrectNesting(format!(
                        "{} is not a case of {choice}",
                        type_.name()
                    )));
                }
                CodecContext::Case(DataObjectContext::new(type_.clone(), schema, self)?)
            }
            (ObjectKind::Augmentation { target }, None) => {
                let ResolvedSchema::Augment(aug) = &schema else {
                    return Err(mismatch(&schema));
                };
                if self.runtime.type_at(&aug.target).map(ObjectType::name) != Some(target) {
                    return Err(CodecError::IncorrectNesting(format!(
                        "{} does not augment {target}",
                        type_.name()
                    )));
                }
                CodecContext::Augmentation(DataObjectContext::new(type_.clone(), schema, self)?)
            }
            (ObjectKind::Notification, Some(SchemaNodeKind::Notification)) => {
                CodecContext::Notification(DataObjectContext::new(type_.clone(), schema, self)?)
            }
            (ObjectKind::Input, Some(SchemaNodeKind::Input))
            | (ObjectKind::Output, Some(SchemaNodeKind::Output)) => {
                CodecContext::ContainerLike(DataObjectContext::new(type_.clone(), schema, self)?)
            }
            _ => return Err(mismatch(&schema)),
        })
    }

    /// The shared empty instance of a structural container.
    pub(crate) fn empty_instance(&self, ctx: &Arc<CodecContext>) -> Result<Arc<dyn DataObject>> {
        let (CodecContext::StructuralContainer(data), Some(qname)) = (ctx.as_ref(), ctx.qname())
        else {
            return Err(CodecError::InvalidArgument(format!(
                "{} has no empty instance",
                ctx.kind()
            )));
        };
        let name = data.object_type().name();
        if let Some(empty) = self.empties.read().map_err(poisoned)?.get(name) {
            return Ok(empty.clone());
        }
        let node = Arc::new(NormalizedNode::Container(NormalizedNode::container(qname.clone())));
        let empty: Arc<dyn DataObject> = Arc::new(ObjectView::new(ctx.clone(), node)?);
        let mut empties = self.empties.write().map_err(poisoned)?;
        Ok(empties.entry(name.clone()).or_insert(empty).clone())
    }

    /// Context of a type mirroring a top-level data node, or a member of a
    /// top-level choice.
    pub(crate) fn root_child_by_path_step(
        &self,
        step: &PathStep,
        builder: &mut Vec<PathArgument>,
    ) -> Result<Arc<CodecContext>> {
        let type_ = self.runtime.load_type(step.type_name())?;
        match data_tree_path(&type_) {
            [_] => {
                let ctx = self.context_for(type_.name())?;
                ctx.add_tree_arguments(step, builder)?;
                Ok(ctx)
            }
            [choice, _, _, ..] if self.is_top_level_choice(choice) => {
                let choice_type = self
                    .runtime
                    .type_at(std::slice::from_ref(choice))
                    .ok_or_else(|| CodecError::MissingClass(format!("choice {choice}")))?;
                let ctx = self.context_for(choice_type.name())?;
                builder.push(PathArgument::node(choice.clone()));
                ctx.child_by_path_step(step, builder)
            }
            _ => Err(CodecError::IncorrectNesting(format!(
                "{} is not a top-level type",
                type_.name()
            ))),
        }
    }

    fn is_top_level_choice(&self, qname: &QName) -> bool {
        self.runtime
            .schema()
            .data_child(qname)
            .is_some_and(|c| c.is_choice())
    }

    /// Context of the top-level data node `arg` names.
    pub(crate) fn root_child_by_tree_argument(
        &self,
        arg: &PathArgument,
    ) -> Result<Arc<CodecContext>> {
        let qname = arg.name();
        if self.runtime.schema().data_child(qname).is_none() {
            return Err(CodecError::MissingSchema(format!("no top-level node {qname}")));
        }
        let type_ = self
            .runtime
            .type_at(std::slice::from_ref(qname))
            .ok_or_else(|| CodecError::MissingClass(format!("no object type for {qname}")))?;
        self.context_for(type_.name())
    }

    /// Serializes `object` through `ctx` with `registry`.
    pub(crate) fn serialize_with(
        &self,
        ctx: &Arc<CodecContext>,
        object: &Arc<dyn DataObject>,
        registry: &SerializerRegistry,
    ) -> Result<NormalizedNode> {
        let mut result = NormalizedNodeResult::new();
        {
            let mut writer = BindingToNormalizedStreamWriter::new(ctx.clone(), &mut result);
            registry.serialize(object, &mut writer)?;
        }
        Ok(result.into_result()?)
    }
}

/// Schema path of a type placed in the data tree; empty for augmentations
/// and template types, which are never top-level.
fn data_tree_path(type_: &ObjectType) -> &[QName] {
    match &type_.schema {
        SchemaLocator::Path(path) => path,
        SchemaLocator::Augment { .. } | SchemaLocator::YangData { .. } => &[],
    }
}

/// Translates between object-model data and normalized trees for one
/// runtime.
///
/// Cloning is cheap; clones share the same contexts.
#[derive(Debug, Clone)]
pub struct BindingCodecTree {
    inner: Arc<TreeInner>,
}

impl BindingCodecTree {
    pub fn new(runtime: Arc<BindingRuntimeContext>) -> Self {
        Self::with_options(runtime, CodecOptions::default())
    }

    pub fn with_options(runtime: Arc<BindingRuntimeContext>, options: CodecOptions) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<TreeInner>| TreeInner {
            identities: Arc::new(IdentityCodec::new(runtime.clone())),
            runtime,
            options,
            contexts: RwLock::new(HashMap::new()),
            empties: RwLock::new(HashMap::new()),
            registry: SerializerRegistry::new(HashMap::new()),
            self_weak: weak.clone(),
        });
        Self { inner }
    }

    pub(crate) fn upgrade(weak: &Weak<TreeInner>) -> Result<Self> {
        weak.upgrade()
            .map(|inner| Self { inner })
            .ok_or_else(|| CodecError::Internal("codec tree dropped".into()))
    }

    pub fn runtime(&self) -> &Arc<BindingRuntimeContext> {
        &self.inner.runtime
    }

    /// The context of `type_name`; the same instance on every call.
    pub fn get_context_for(&self, type_name: &TypeName) -> Result<Arc<CodecContext>> {
        self.inner.context_for(type_name)
    }

    pub fn identity_codec(&self) -> &Arc<IdentityCodec> {
        &self.inner.identities
    }

    pub fn instance_identifier_codec(&self) -> InstanceIdentifierCodec {
        InstanceIdentifierCodec::new(self.inner.weak())
    }

    /// Context and tree path of the object `path` addresses.
    pub(crate) fn resolve(
        &self,
        path: &InstanceIdentifier,
    ) -> Result<(Arc<CodecContext>, YangInstanceIdentifier)> {
        let mut builder = Vec::new();
        let ctx = path::resolve_steps(&self.inner, path.steps(), &mut builder)?.ok_or_else(|| {
            CodecError::MalformedPath("an empty path addresses no object".into())
        })?;
        Ok((ctx, YangInstanceIdentifier::new(builder)))
    }

    /// Serializes `object`, stored at `path`, into a tree node.
    pub fn to_normalized_node(
        &self,
        path: &InstanceIdentifier,
        object: &Arc<dyn DataObject>,
    ) -> Result<(YangInstanceIdentifier, NormalizedNode)> {
        let (ctx, yid) = self.resolve(path)?;
        if matches!(ctx.as_ref(), CodecContext::Case(_) | CodecContext::Augmentation(_)) {
            return Err(CodecError::InvalidArgument(format!(
                "{path} addresses a {}, which has no tree node of its own",
                ctx.kind()
            )));
        }
        let node = self.inner.serialize_with(&ctx, object, self.inner.registry())?;
        Ok((yid, node))
    }

    /// Serializes an augmentation into the children it contributes to its
    /// target, and the path of the target.
    pub fn to_normalized_augmentation(
        &self,
        path: &InstanceIdentifier,
        augmentation: &Arc<dyn DataObject>,
    ) -> Result<(YangInstanceIdentifier, Vec<Arc<NormalizedNode>>)> {
        let (ctx, yid) = self.resolve(path)?;
        let CodecContext::Augmentation(data) = ctx.as_ref() else {
            return Err(CodecError::InvalidArgument(format!(
                "{path} does not address an augmentation"
            )));
        };
        let holder = data.schema_path().last().cloned().ok_or_else(|| {
            CodecError::Internal(format!("{} has no target", data.object_type().name()))
        })?;
        let mut result = NormalizedNodeResult::new();
        result.start_container_node(&holder)?;
        {
            let registry = self.inner.registry();
            let mut writer = BindingToNormalizedStreamWriter::new(ctx.clone(), &mut result);
            registry.serialize(augmentation, &mut writer)?;
        }
        result.end_node()?;
        match result.into_result()? {
            NormalizedNode::Container(holder) => {
                Ok((yid, holder.children.into_values().collect()))
            }
            other => Err(CodecError::Internal(format!("augmentation produced {}", other.kind()))),
        }
    }

    /// Reads `node`, stored at `path`, as an object. `None` when either has
    /// no object-model representation.
    pub fn from_normalized_node(
        &self,
        path: &YangInstanceIdentifier,
        node: &Arc<NormalizedNode>,
    ) -> Result<Option<(InstanceIdentifier, Arc<dyn DataObject>)>> {
        if matches!(
            node.as_ref(),
            NormalizedNode::Leaf(_)
                | NormalizedNode::LeafSet(_)
                | NormalizedNode::LeafSetEntry(_)
                | NormalizedNode::AnyData(_)
        ) {
            return Ok(None);
        }
        let Some(walk) = path::walk_tree_path(&self.inner, path)? else {
            tracing::debug!(path = %path, "tree path has no object-model equivalent");
            return Ok(None);
        };
        let (Some(ctx), None) = (walk.target, walk.property) else {
            tracing::debug!(path = %path, "tree path does not address an object");
            return Ok(None);
        };
        match ctx.deserialize(node)? {
            Some(BindingValue::Object(object)) => {
                Ok(Some((InstanceIdentifier::new(walk.steps), object)))
            }
            _ => Ok(None),
        }
    }

    fn operation_context(
        &self,
        type_: &ObjectType,
        expected: &[&str],
    ) -> Result<Arc<CodecContext>> {
        let ctx = self.inner.context_for(type_.name())?;
        if !expected.contains(&ctx.kind()) {
            return Err(CodecError::InvalidArgument(format!(
                "{} is a {}, expected {}",
                type_.name(),
                ctx.kind(),
                expected.join(" or ")
            )));
        }
        Ok(ctx)
    }

    fn operation_type(&self, path: &[QName]) -> Result<ObjectType> {
        self.inner.runtime.type_at(path).cloned().ok_or_else(|| {
            CodecError::MissingClass(format!("no object type at {}", format_path(path)))
        })
    }

    /// Context of rpc input or output, checking the enclosing operation.
    fn rpc_data_context(&self, type_: &ObjectType, operation: &str) -> Result<Arc<CodecContext>> {
        let ctx = self.operation_context(type_, &["input/output"])?;
        let path = type_.schema.path();
        let parent = path.split_last().map(|(_, parent)| parent).unwrap_or_default();
        let enclosing = self.inner.runtime.schema().find_node(parent);
        let keyword = enclosing.as_ref().map(|n| n.kind.keyword());
        if keyword != Some(operation) {
            return Err(CodecError::InvalidArgument(format!(
                "{} is not the input or output of an {operation}",
                type_.name()
            )));
        }
        Ok(ctx)
    }

    pub fn to_normalized_notification(
        &self,
        notification: &Arc<dyn DataObject>,
    ) -> Result<NormalizedNode> {
        let ctx = self.operation_context(notification.implemented_type(), &["notification"])?;
        self.inner.serialize_with(&ctx, notification, self.inner.registry())
    }

    /// Reads the notification whose schema path is `path`.
    pub fn from_normalized_notification(
        &self,
        path: &[QName],
        node: &Arc<NormalizedNode>,
    ) -> Result<Arc<dyn DataObject>> {
        let type_ = self.operation_type(path)?;
        let ctx = self.operation_context(&type_, &["notification"])?;
        expect_object(ctx.deserialize(node)?, &type_)
    }

    /// Serializes rpc or action input or output.
    pub fn to_normalized_rpc_data(&self, data: &Arc<dyn DataObject>) -> Result<NormalizedNode> {
        let ctx = self.operation_context(data.implemented_type(), &["input/output"])?;
        self.inner.serialize_with(&ctx, data, self.inner.registry())
    }

    /// Reads rpc or action input or output whose schema path is `path`.
    pub fn from_normalized_rpc_data(
        &self,
        path: &[QName],
        node: &Arc<NormalizedNode>,
    ) -> Result<Arc<dyn DataObject>> {
        let type_ = self.operation_type(path)?;
        let ctx = self.operation_context(&type_, &["input/output"])?;
        expect_object(ctx.deserialize(node)?, &type_)
    }

    pub fn to_yang_instance_identifier(
        &self,
        path: &InstanceIdentifier,
    ) -> Result<YangInstanceIdentifier> {
        let mut builder = Vec::new();
        path::resolve_steps(&self.inner, path.steps(), &mut builder)?;
        Ok(YangInstanceIdentifier::new(builder))
    }

    /// `None` when `path` does not address an object, for example a list
    /// node without an entry or a leaf.
    pub fn from_yang_instance_identifier(
        &self,
        path: &YangInstanceIdentifier,
    ) -> Result<Option<InstanceIdentifier>> {
        match path::walk_tree_path(&self.inner, path)? {
            Some(walk) if walk.property.is_none() => Ok(Some(InstanceIdentifier::new(walk.steps))),
            _ => {
                tracing::debug!(path = %path, "tree path has no object-model equivalent");
                Ok(None)
            }
        }
    }

    /// Tree path of an object or of a leaf or leaf-list property.
    pub fn to_yang_path(&self, path: &BindingPath) -> Result<YangInstanceIdentifier> {
        path::to_yang_path(&self.inner, path)
    }

    /// Object-model path of a tree path, including leaf and leaf-list
    /// addressing.
    pub fn to_binding_path(&self, path: &YangInstanceIdentifier) -> Result<Option<BindingPath>> {
        path::to_binding_path(&self.inner, path)
    }

    /// A writer translating object events for the object at `path` into
    /// tree events on `delegate`, and the tree path of that object.
    pub fn new_writer<'a>(
        &self,
        path: &InstanceIdentifier,
        delegate: &'a mut dyn NormalizedNodeStreamWriter,
    ) -> Result<(YangInstanceIdentifier, BindingToNormalizedStreamWriter<'a>)> {
        let (ctx, yid) = self.resolve(path)?;
        Ok((yid, BindingToNormalizedStreamWriter::new(ctx, delegate)))
    }

    /// A writer translating events of the notification `type_name`.
    pub fn new_notification_writer<'a>(
        &self,
        type_name: &TypeName,
        delegate: &'a mut dyn NormalizedNodeStreamWriter,
    ) -> Result<BindingToNormalizedStreamWriter<'a>> {
        let type_ = self.inner.runtime.load_type(type_name)?;
        let ctx = self.operation_context(&type_, &["notification"])?;
        Ok(BindingToNormalizedStreamWriter::new(ctx, delegate))
    }

    /// A writer translating events of the rpc input or output `type_name`.
    pub fn new_rpc_writer<'a>(
        &self,
        type_name: &TypeName,
        delegate: &'a mut dyn NormalizedNodeStreamWriter,
    ) -> Result<BindingToNormalizedStreamWriter<'a>> {
        let type_ = self.inner.runtime.load_type(type_name)?;
        let ctx = self.rpc_data_context(&type_, "rpc")?;
        Ok(BindingToNormalizedStreamWriter::new(ctx, delegate))
    }

    /// A writer translating events of the input of the action at schema
    /// path `action`.
    pub fn new_action_input_writer<'a>(
        &self,
        action: &[QName],
        delegate: &'a mut dyn NormalizedNodeStreamWriter,
    ) -> Result<BindingToNormalizedStreamWriter<'a>> {
        let ctx = self.action_data_context(action, "input")?;
        Ok(BindingToNormalizedStreamWriter::new(ctx, delegate))
    }

    pub fn new_action_output_writer<'a>(
        &self,
        action: &[QName],
        delegate: &'a mut dyn NormalizedNodeStreamWriter,
    ) -> Result<BindingToNormalizedStreamWriter<'a>> {
        let ctx = self.action_data_context(action, "output")?;
        Ok(BindingToNormalizedStreamWriter::new(ctx, delegate))
    }

    fn action_data_context(&self, action: &[QName], local_name: &str) -> Result<Arc<CodecContext>> {
        let operation = action.last().ok_or_else(|| {
            CodecError::MalformedPath("an empty schema path addresses no action".into())
        })?;
        let mut path = action.to_vec();
        path.push(operation.module.qname(local_name));
        let type_ = self.operation_type(&path)?;
        self.rpc_data_context(&type_, "action")
    }

    /// Codec of the template `name`.
    pub fn yang_data_codec(&self, name: &YangDataName) -> Result<YangDataCodec> {
        if self.inner.runtime.schema().yang_data(name).is_none() {
            return Err(CodecError::MissingSchema(format!("yang-data {name} is not loaded")));
        }
        let type_ = self.inner.runtime.yang_data_type(name).ok_or_else(|| {
            CodecError::MissingClass(format!("no object type for yang-data {name}"))
        })?;
        let ctx = self.inner.context_for(type_.name())?;
        YangDataCodec::new(name.clone(), ctx, self.inner.clone())
    }

    /// Codec of the template whose container `type_name` mirrors.
    pub fn yang_data_codec_for_type(&self, type_name: &TypeName) -> Result<YangDataCodec> {
        let type_ = self.inner.runtime.load_type(type_name)?;
        match &type_.schema {
            SchemaLocator::YangData { name, path } if path.len() == 1 => self.yang_data_codec(name),
            _ => Err(CodecError::InvalidArgument(format!(
                "{type_name} is not the container of a yang-data template"
            ))),
        }
    }

    /// Context of the node a tree path addresses.
    pub fn subtree_codec(&self, path: &YangInstanceIdentifier) -> Result<Arc<CodecContext>> {
        path::subtree_context(&self.inner, path)
    }

    /// Context of the schema node at an absolute schema path.
    pub fn subtree_codec_for_schema(&self, path: &[QName]) -> Result<Arc<CodecContext>> {
        path::schema_subtree_context(&self.inner, path)
    }

    /// Context of the object `path` addresses, and its tree path.
    pub fn subtree_codec_with_path(
        &self,
        path: &InstanceIdentifier,
    ) -> Result<(Arc<CodecContext>, YangInstanceIdentifier)> {
        self.resolve(path)
    }

    /// A codec that caches the tree nodes produced for objects of `types`.
    /// Types that cannot be cached are skipped.
    pub fn create_caching_codec(&self, types: impl IntoIterator<Item = TypeName>) -> CachingCodec {
        CachingCodec::new(self.inner.clone(), types)
    }
}

fn expect_object(value: Option<BindingValue>, type_: &ObjectType) -> Result<Arc<dyn DataObject>> {
    match value {
        Some(BindingValue::Object(object)) => Ok(object),
        _ => Err(CodecError::MalformedData(format!(
            "node does not hold a {}",
            type_.name()
        ))),
    }
}
