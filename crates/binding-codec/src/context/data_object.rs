//! Contexts of object types backed by a data container: containers, list
//! entries, cases, augmentations, notifications and operation input/output.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use yang_data::{
    DataContainerNode, NormalizedNode, PathArgument, QName, SchemaNode, SchemaNodeKind,
};

use super::leaf::{LeafContext, LeafSetContext, OpaqueContext};
use super::{is_substitution, CodecContext};
use crate::binding::{
    Accessor, AccessorKind, Augmentations, BindingValue, ObjectType, PathStep, TypeName,
};
use crate::error::{CodecError, Result};
use crate::runtime::ResolvedSchema;
use crate::tree::TreeInner;
use crate::view::ObjectView;

#[derive(Debug)]
struct ChildSlot {
    schema: Arc<SchemaNode>,
    ctx: OnceLock<Arc<CodecContext>>,
}

#[derive(Debug)]
struct AugmentationEntry {
    type_: ObjectType,
    ctx: OnceLock<Arc<CodecContext>>,
}

/// Context of an object type whose instances wrap a data container.
#[derive(Debug)]
pub struct DataObjectContext {
    type_: ObjectType,
    schema: ResolvedSchema,
    /// Schema path of the mirrored node; the target path for augmentations.
    schema_path: Vec<QName>,
    tree: Weak<TreeInner>,
    /// One slot per accessor, same order.
    children: Vec<ChildSlot>,
    by_tree: HashMap<QName, usize>,
    by_stream_type: HashMap<TypeName, usize>,
    /// Case types, and types declared by cases, of choice children.
    by_choice_member: HashMap<TypeName, usize>,
    augmentations: Vec<AugmentationEntry>,
    aug_by_tree: HashMap<QName, usize>,
    aug_by_type: HashMap<TypeName, usize>,
}

impl DataObjectContext {
    pub(crate) fn new(type_: ObjectType, schema: ResolvedSchema, tree: &TreeInner) -> Result<Self> {
        let runtime = tree.runtime();
        let schema_path = match &schema {
            ResolvedSchema::Augment(aug) => aug.target.clone(),
            ResolvedSchema::Node(_) => type_.schema.path().to_vec(),
        };
        let scope = type_.schema.scope();

        let mut children = Vec::with_capacity(type_.accessors.len());
        let mut by_tree = HashMap::new();
        let mut by_stream_type = HashMap::new();
        let mut by_choice_member = HashMap::new();
        for (index, accessor) in type_.accessors.iter().enumerate() {
            let child = find_schema_child(&type_, &schema, accessor)?;
            by_tree.insert(child.qname.clone(), index);
            if let Some(child_type) = accessor.kind.child_type() {
                by_stream_type.insert(child_type.clone(), index);
            }
            if let AccessorKind::Choice(choice) = &accessor.kind {
                for case in runtime.case_types(choice) {
                    by_choice_member.entry(case.name().clone()).or_insert(index);
                    for member in case.child_types() {
                        by_choice_member.entry(member.clone()).or_insert(index);
                    }
                }
            }
            children.push(ChildSlot {
                schema: child,
                ctx: OnceLock::new(),
            });
        }

        let mut augmentations = Vec::new();
        let mut aug_by_tree = HashMap::new();
        let mut aug_by_type = HashMap::new();
        if type_.augmentable && !type_.is_augmentation() {
            for aug in runtime.augmentations_in(&scope, &schema_path) {
                let Some(aug_type) = runtime.augmentation_type(&aug.module, aug.index) else {
                    tracing::debug!(
                        target_type = %type_.name(),
                        module = %aug.module,
                        index = aug.index,
                        "augmentation has no object type, ignoring"
                    );
                    continue;
                };
                let index = augmentations.len();
                for child in &aug.children {
                    aug_by_tree.insert(child.qname.clone(), index);
                }
                aug_by_type.insert(aug_type.name().clone(), index);
                augmentations.push(AugmentationEntry {
                    type_: aug_type.clone(),
                    ctx: OnceLock::new(),
                });
            }
            for candidate in runtime.types_augmenting(type_.name()) {
                if aug_by_type.contains_key(candidate.name()) {
                    continue;
                }
                if let Some(index) = augmentations
                    .iter()
                    .position(|local| is_substitution(&candidate, &local.type_))
                {
                    aug_by_type.insert(candidate.name().clone(), index);
                }
            }
        }

        Ok(Self {
            type_,
            schema,
            schema_path,
            tree: tree.weak(),
            children,
            by_tree,
            by_stream_type,
            by_choice_member,
            augmentations,
            aug_by_tree,
            aug_by_type,
        })
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.type_
    }

    /// Tree name of the mirrored node; `None` for cases and augmentations.
    pub fn qname(&self) -> Option<&QName> {
        match &self.schema {
            ResolvedSchema::Node(node) if !node.is_case() => Some(&node.qname),
            _ => None,
        }
    }

    pub fn schema_path(&self) -> &[QName] {
        &self.schema_path
    }

    pub(crate) fn tree(&self) -> Result<Arc<TreeInner>> {
        self.tree
            .upgrade()
            .ok_or_else(|| CodecError::Internal("codec tree dropped".into()))
    }

    /// Tree names of this object's own children, augmentations excluded.
    pub fn tree_names(&self) -> impl Iterator<Item = &QName> {
        self.by_tree.keys()
    }

    /// Tree names contributed by augmentations.
    pub fn augmented_tree_names(&self) -> impl Iterator<Item = &QName> {
        self.aug_by_tree.keys()
    }

    /// Child context of the `index`-th accessor, built on first use.
    pub fn child_at(&self, index: usize) -> Result<Arc<CodecContext>> {
        let slot = self.children.get(index).ok_or_else(|| {
            CodecError::Internal(format!("{} has no accessor #{index}", self.type_.name()))
        })?;
        if let Some(ctx) = slot.ctx.get() {
            return Ok(ctx.clone());
        }
        let accessor = &self.type_.accessors[index];
        let ctx = self.load_child(accessor, &slot.schema)?;
        let _ = slot.ctx.set(ctx);
        slot.ctx
            .get()
            .cloned()
            .ok_or_else(|| CodecError::Internal("child slot not filled".into()))
    }

    fn load_child(
        &self,
        accessor: &Accessor,
        schema: &Arc<SchemaNode>,
    ) -> Result<Arc<CodecContext>> {
        let tree = self.tree()?;
        let env = tree.env();
        let ctx = match &accessor.kind {
            AccessorKind::Leaf => {
                Arc::new(CodecContext::Leaf(LeafContext::new(schema, accessor, &env)?))
            }
            AccessorKind::LeafList => {
                Arc::new(CodecContext::LeafSet(LeafSetContext::new(schema, accessor, &env)?))
            }
            AccessorKind::AnyData => {
                Arc::new(CodecContext::Opaque(OpaqueContext::new(schema, accessor)?))
            }
            AccessorKind::Container(t) | AccessorKind::List(t) | AccessorKind::Choice(t) => {
                let ctx = tree.context_for(t)?;
                if ctx.qname() != Some(&schema.qname) {
                    return Err(CodecError::IncorrectNesting(format!(
                        "{t} is not a valid child of {}: it mirrors {}, expected {}",
                        self.type_.name(),
                        ctx.qname().map(ToString::to_string).unwrap_or_default(),
                        schema.qname
                    )));
                }
                ctx
            }
        };
        tracing::trace!(
            parent = %self.type_.name(),
            child = %schema.qname,
            kind = ctx.kind(),
            "loaded child context"
        );
        Ok(ctx)
    }

    fn augmentation_at(&self, index: usize) -> Result<Arc<CodecContext>> {
        let entry = self.augmentations.get(index).ok_or_else(|| {
            CodecError::Internal(format!("{} has no augmentation #{index}", self.type_.name()))
        })?;
        if let Some(ctx) = entry.ctx.get() {
            return Ok(ctx.clone());
        }
        let ctx = self.tree()?.context_for(entry.type_.name())?;
        let _ = entry.ctx.set(ctx);
        entry
            .ctx
            .get()
            .cloned()
            .ok_or_else(|| CodecError::Internal("augmentation slot not filled".into()))
    }

    /// Accessor index of the child stored under `qname`.
    pub fn child_index(&self, qname: &QName) -> Option<usize> {
        self.by_tree.get(qname).copied()
    }

    /// The augmentation that contributes the tree child `qname`.
    pub fn augmentation_for_tree(&self, qname: &QName) -> Result<Option<Arc<CodecContext>>> {
        self.aug_by_tree
            .get(qname)
            .map(|index| self.augmentation_at(*index))
            .transpose()
    }

    /// The local augmentation for `type_name`, or the local augmentation it
    /// substitutes for.
    pub fn augmentation_by_type(&self, type_name: &TypeName) -> Result<Option<Arc<CodecContext>>> {
        self.aug_by_type
            .get(type_name)
            .map(|index| self.augmentation_at(*index))
            .transpose()
    }

    pub fn child_by_tree_argument(&self, arg: &PathArgument) -> Result<Arc<CodecContext>> {
        if let Some(index) = self.child_index(arg.name()) {
            return self.child_at(index);
        }
        if let Some(aug) = self.augmentation_for_tree(arg.name())? {
            return aug.child_by_tree_argument(arg);
        }
        Err(CodecError::IncorrectNesting(format!(
            "{} is not a valid child of {}",
            arg.name(),
            self.type_.name()
        )))
    }

    pub fn stream_child(&self, type_name: &TypeName) -> Result<Arc<CodecContext>> {
        if let Some(index) = self.by_stream_type.get(type_name) {
            return self.child_at(*index);
        }
        if let Some(aug) = self.augmentation_by_type(type_name)? {
            return Ok(aug);
        }
        Err(self.not_a_child(type_name))
    }

    /// Leaf, leaf-list or anydata child by schema local name.
    pub fn leaf_child(&self, name: &str) -> Result<Arc<CodecContext>> {
        let index = self
            .type_
            .accessors
            .iter()
            .position(|a| {
                a.yang_name == name
                    && matches!(
                        a.kind,
                        AccessorKind::Leaf | AccessorKind::LeafList | AccessorKind::AnyData
                    )
            })
            .ok_or_else(|| {
                CodecError::IncorrectNesting(format!(
                    "{name} is not a leaf of {}",
                    self.type_.name()
                ))
            })?;
        self.child_at(index)
    }

    /// Resolves the child addressed by `step`, appending its tree arguments.
    pub fn child_by_path_step(
        &self,
        step: &PathStep,
        builder: &mut Vec<PathArgument>,
    ) -> Result<Arc<CodecContext>> {
        let type_name = step.type_name();
        if let Some(index) = self.by_stream_type.get(type_name) {
            let child = self.child_at(*index)?;
            child.add_tree_arguments(step, builder)?;
            return Ok(child);
        }
        let choice_index = step
            .case_type()
            .and_then(|case| self.by_choice_member.get(case))
            .or_else(|| self.by_choice_member.get(type_name));
        if let Some(index) = choice_index {
            let choice = self.child_at(*index)?;
            if let Some(qname) = choice.qname() {
                builder.push(PathArgument::node(qname.clone()));
            }
            return choice.child_by_path_step(step, builder);
        }
        if let Some(aug) = self.augmentation_by_type(type_name)? {
            return Ok(aug);
        }
        Err(self.not_a_child(type_name))
    }

    fn not_a_child(&self, type_name: &TypeName) -> CodecError {
        match self.tree().and_then(|t| t.runtime().load_type(type_name)) {
            Err(CodecError::MissingClass(name)) => CodecError::MissingClass(name),
            _ => CodecError::IncorrectNesting(format!(
                "{type_name} is not a valid child of {}",
                self.type_.name()
            )),
        }
    }

    /// Reads the `index`-th accessor from `container`.
    ///
    /// Absent list-entry key leaves come from the entry's predicates; other
    /// absent leaves fall back to the configured defaults.
    pub(crate) fn read_child(
        &self,
        index: usize,
        container: &DataContainerNode,
    ) -> Result<Option<BindingValue>> {
        let ctx = self.child_at(index)?;
        let qname = &self.children[index].schema.qname;
        if let Some(node) = container.child(&PathArgument::node(qname.clone())) {
            return ctx.deserialize(node);
        }
        let CodecContext::Leaf(leaf) = ctx.as_ref() else {
            return Ok(None);
        };
        if let PathArgument::NodeIdentifierWithPredicates { keys, .. } = &container.identifier {
            if let Some(raw) = keys.get(qname) {
                return leaf.deserialize_value(raw).map(Some);
            }
        }
        self.tree()?.options().leaf_defaults.default_for(leaf)
    }

    /// Groups augmented children of `container` by augmentation and
    /// deserializes each group through its augmentation context.
    pub(crate) fn read_augmentations(
        &self,
        container: &DataContainerNode,
    ) -> Result<Augmentations> {
        let mut out = Augmentations::new();
        if self.augmentations.is_empty() {
            return Ok(out);
        }
        let mut groups: Vec<Option<DataContainerNode>> = vec![None; self.augmentations.len()];
        for (arg, child) in &container.children {
            if let Some(index) = self.aug_by_tree.get(arg.name()) {
                groups[*index]
                    .get_or_insert_with(|| DataContainerNode::new(container.identifier.clone()))
                    .children
                    .insert(arg.clone(), child.clone());
            }
        }
        for (index, group) in groups.into_iter().enumerate() {
            let Some(group) = group else { continue };
            let ctx = self.augmentation_at(index)?;
            let view = ObjectView::new(ctx, Arc::new(NormalizedNode::Container(group)))?;
            out.insert(self.augmentations[index].type_.name().clone(), Arc::new(view));
        }
        Ok(out)
    }
}

/// Finds the schema child an accessor is bound to and checks its kind.
fn find_schema_child(
    type_: &ObjectType,
    schema: &ResolvedSchema,
    accessor: &Accessor,
) -> Result<Arc<SchemaNode>> {
    let child = schema
        .children()
        .iter()
        .find(|c| c.qname.local_name() == accessor.yang_name)
        .ok_or_else(|| {
            CodecError::IncorrectNesting(format!(
                "{}.{} has no schema child named {}",
                type_.name(),
                accessor.property,
                accessor.yang_name
            ))
        })?;
    let fits = match (&accessor.kind, &child.kind) {
        (AccessorKind::Leaf, SchemaNodeKind::Leaf(_))
        | (AccessorKind::LeafList, SchemaNodeKind::LeafList { .. })
        | (AccessorKind::Container(_), SchemaNodeKind::Container { .. })
        | (AccessorKind::List(_), SchemaNodeKind::List { .. })
        | (AccessorKind::Choice(_), SchemaNodeKind::Choice)
        | (AccessorKind::AnyData, SchemaNodeKind::AnyData) => true,
        _ => false,
    };
    if !fits {
        return Err(CodecError::IncorrectNesting(format!(
            "{}.{} cannot be bound to {} {}",
            type_.name(),
            accessor.property,
            child.kind.keyword(),
            child.qname
        )));
    }
    Ok(child.clone())
}
