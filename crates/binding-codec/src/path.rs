//! Path translation between [`InstanceIdentifier`]s and
//! [`YangInstanceIdentifier`]s.
//!
//! Object paths have one step per container, list entry and augmentation.
//! Tree paths additionally carry a node for every choice and list, and
//! nothing for cases and augmentations.

use std::sync::Arc;

use yang_data::schema::format_path;
use yang_data::{PathArgument, QName, YangInstanceIdentifier};

use crate::binding::{BindingPath, BindingValue, InstanceIdentifier, PathStep, TypeName};
use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::tree::TreeInner;

/// Resolves `steps` from the data root, appending tree arguments to
/// `builder`. `None` for an empty path.
pub(crate) fn resolve_steps(
    tree: &TreeInner,
    steps: &[PathStep],
    builder: &mut Vec<PathArgument>,
) -> Result<Option<Arc<CodecContext>>> {
    let Some((first, rest)) = steps.split_first() else {
        return Ok(None);
    };
    let mut ctx = tree.root_child_by_path_step(first, builder)?;
    for step in rest {
        ctx = ctx.child_by_path_step(step, builder)?;
    }
    Ok(Some(ctx))
}

/// Context of any node a tree path addresses, including choice, list and
/// leaf nodes. A list or leaf-list node may be followed by one entry.
pub(crate) fn subtree_context(
    tree: &TreeInner,
    path: &YangInstanceIdentifier,
) -> Result<Arc<CodecContext>> {
    let mut args = path.args().iter();
    let first = args
        .next()
        .ok_or_else(|| CodecError::MalformedPath("an empty path addresses no node".into()))?;
    let mut current = tree.root_child_by_tree_argument(first)?;
    let mut awaiting_entry = opens_collection(&current, first);
    for arg in args {
        if std::mem::take(&mut awaiting_entry) {
            if !is_entry_of(&current, arg) {
                return Err(CodecError::MalformedPath(format!(
                    "{arg} is not an entry of {} {}",
                    current.kind(),
                    current.qname().map(ToString::to_string).unwrap_or_default()
                )));
            }
            continue;
        }
        current = current.child_by_tree_argument(arg)?;
        awaiting_entry = opens_collection(&current, arg);
    }
    Ok(current)
}

/// Context of the schema node at the absolute schema path `path`. Nodes
/// without an object type of their own resolve through their parent.
pub(crate) fn schema_subtree_context(
    tree: &TreeInner,
    path: &[QName],
) -> Result<Arc<CodecContext>> {
    let runtime = tree.runtime();
    let (last, parent) = path
        .split_last()
        .ok_or_else(|| CodecError::MalformedPath("an empty schema path addresses no node".into()))?;
    if runtime.schema().find_node(path).is_none() {
        return Err(CodecError::MissingSchema(format!("no schema node {}", format_path(path))));
    }
    if let Some(type_) = runtime.type_at(path) {
        return tree.context_for(type_.name());
    }
    if parent.is_empty() {
        return Err(CodecError::MissingClass(format!("no object type for {last}")));
    }
    let parent_ctx = schema_subtree_context(tree, parent)?;
    let data = parent_ctx.as_data_object().ok_or_else(|| {
        CodecError::MissingClass(format!("no object type at {}", format_path(path)))
    })?;
    if let Some(index) = data.child_index(last) {
        return data.child_at(index);
    }
    let aug = data.augmentation_for_tree(last)?.ok_or_else(|| {
        CodecError::IncorrectNesting(format!(
            "{last} is not a child of {}",
            data.object_type().name()
        ))
    })?;
    aug.child_by_tree_argument(&PathArgument::node(last.clone()))
}

/// Whether `arg` names a list or leaf-list node whose entry may follow.
fn opens_collection(ctx: &CodecContext, arg: &PathArgument) -> bool {
    matches!(arg, PathArgument::NodeIdentifier(_))
        && matches!(
            ctx,
            CodecContext::List(_) | CodecContext::KeyedList(_) | CodecContext::LeafSet(_)
        )
}

fn is_entry_of(ctx: &CodecContext, arg: &PathArgument) -> bool {
    match (ctx, arg) {
        (CodecContext::LeafSet(set), PathArgument::NodeWithValue { name, .. }) => {
            name == set.qname()
        }
        (CodecContext::List(list) | CodecContext::KeyedList(list), _) => {
            !matches!(arg, PathArgument::NodeWithValue { .. }) && arg.name() == list.qname()
        }
        _ => false,
    }
}

/// A leaf, leaf-list or anydata addressed by a tree path.
#[derive(Debug)]
pub(crate) struct PropertyRef {
    pub name: String,
    pub entry: Option<BindingValue>,
}

/// Result of walking a tree path.
#[derive(Debug)]
pub(crate) struct TreeWalk {
    pub steps: Vec<PathStep>,
    /// Context of the last object on the path.
    pub target: Option<Arc<CodecContext>>,
    pub property: Option<PropertyRef>,
}

fn qualified(step: PathStep, case: Option<TypeName>) -> PathStep {
    match case {
        Some(case) => step.in_case(case),
        None => step,
    }
}

/// Child of `parent` named by `arg`. Crossing into an augmentation pushes
/// the augmentation's step.
fn descend(
    parent: &CodecContext,
    arg: &PathArgument,
    case: &mut Option<TypeName>,
    steps: &mut Vec<PathStep>,
) -> Result<Arc<CodecContext>> {
    let not_a_child = || {
        CodecError::IncorrectNesting(format!(
            "{} is not a valid child of {}",
            arg.name(),
            parent.object_type().map(|t| t.name().to_string()).unwrap_or_default()
        ))
    };
    let data = parent.as_data_object().ok_or_else(not_a_child)?;
    if let Some(index) = data.child_index(arg.name()) {
        return data.child_at(index);
    }
    let Some(aug) = data.augmentation_for_tree(arg.name())? else {
        return Err(not_a_child());
    };
    let aug_data = aug.as_data_object().ok_or_else(not_a_child)?;
    steps.push(qualified(PathStep::item(aug_data.object_type().name().clone()), case.take()));
    let index = aug_data.child_index(arg.name()).ok_or_else(not_a_child)?;
    aug_data.child_at(index)
}

/// Walks a tree path. `None` when the path has no object-model form: it
/// ends on a choice or list node, or names a leaf directly inside a case.
pub(crate) fn walk_tree_path(
    tree: &TreeInner,
    path: &YangInstanceIdentifier,
) -> Result<Option<TreeWalk>> {
    let mut steps = Vec::new();
    let mut current: Option<Arc<CodecContext>> = None;
    let mut case: Option<TypeName> = None;
    let mut args = path.args().iter().peekable();

    while let Some(arg) = args.next() {
        let child = match &current {
            None => tree.root_child_by_tree_argument(arg)?,
            Some(parent) => descend(parent, arg, &mut case, &mut steps)?,
        };
        let property = match child.as_ref() {
            CodecContext::Choice(choice) => {
                let Some(next) = args.peek() else {
                    return Ok(None);
                };
                let index = choice.case_index_for_tree(next.name()).ok_or_else(|| {
                    CodecError::IncorrectNesting(format!(
                        "{} is not a valid case child of {}",
                        next.name(),
                        choice.object_type().name()
                    ))
                })?;
                let case_ctx = choice.case_at(index)?;
                case = case_ctx.object_type().map(|t| t.name().clone());
                current = Some(case_ctx);
                continue;
            }
            CodecContext::KeyedList(list) | CodecContext::List(list) => {
                let Some(entry) = args.next() else {
                    return Ok(None);
                };
                let type_name = list.entry().object_type().name().clone();
                let step = match entry {
                    PathArgument::NodeIdentifierWithPredicates { .. } if list.is_keyed() => {
                        let key = list.key_of(entry)?.ok_or_else(|| {
                            CodecError::Internal(format!("{} lost its key codec", list.qname()))
                        })?;
                        PathStep::keyed(type_name, key)
                    }
                    PathArgument::NodeIdentifier(name) if name == list.qname() => {
                        PathStep::item(type_name)
                    }
                    other => {
                        return Err(CodecError::MalformedPath(format!(
                            "{other} is not an entry of list {}",
                            list.qname()
                        )))
                    }
                };
                steps.push(qualified(step, case.take()));
                current = Some(child.clone());
                continue;
            }
            CodecContext::Leaf(leaf) => PropertyRef {
                name: leaf.property().to_string(),
                entry: None,
            },
            CodecContext::Opaque(opaque) => PropertyRef {
                name: opaque.property().to_string(),
                entry: None,
            },
            CodecContext::LeafSet(set) => {
                let value = match arg {
                    PathArgument::NodeWithValue { value, .. } => Some(value),
                    _ => match args.next() {
                        Some(PathArgument::NodeWithValue { name, value })
                            if name == set.qname() =>
                        {
                            Some(value)
                        }
                        Some(other) => {
                            return Err(CodecError::MalformedPath(format!(
                                "{other} is not an entry of leaf-list {}",
                                set.qname()
                            )))
                        }
                        None => None,
                    },
                };
                PropertyRef {
                    name: set.property().to_string(),
                    entry: value.map(|v| set.deserialize_value(v)).transpose()?,
                }
            }
            CodecContext::Case(_) | CodecContext::Augmentation(_) => {
                return Err(CodecError::Internal(format!("{arg} resolved to a {}", child.kind())));
            }
            CodecContext::Container(_)
            | CodecContext::StructuralContainer(_)
            | CodecContext::Notification(_)
            | CodecContext::ContainerLike(_) => {
                let type_name = child.object_type().map(|t| t.name().clone()).ok_or_else(|| {
                    CodecError::Internal(format!("{} has no object type", child.kind()))
                })?;
                steps.push(qualified(PathStep::item(type_name), case.take()));
                current = Some(child.clone());
                continue;
            }
        };

        if let Some(extra) = args.next() {
            return Err(CodecError::MalformedPath(format!(
                "{extra} follows {}, which has no children",
                arg.name()
            )));
        }
        if case.is_some() {
            return Ok(None);
        }
        return Ok(Some(TreeWalk {
            steps,
            target: current,
            property: Some(property),
        }));
    }

    Ok(Some(TreeWalk {
        steps,
        target: current,
        property: None,
    }))
}

pub(crate) fn to_yang_path(tree: &TreeInner, path: &BindingPath) -> Result<YangInstanceIdentifier> {
    let mut builder = Vec::new();
    match path {
        BindingPath::Data(id) => {
            resolve_steps(tree, id.steps(), &mut builder)?;
        }
        BindingPath::Property { parent, property, entry } => {
            let ctx = resolve_steps(tree, parent.steps(), &mut builder)?.ok_or_else(|| {
                CodecError::MalformedPath(format!("property {property} has no parent object"))
            })?;
            let data = ctx.as_data_object().ok_or_else(|| {
                CodecError::MalformedPath(format!("{parent} does not address an object"))
            })?;
            let (index, _) = data.object_type().accessor(property).ok_or_else(|| {
                CodecError::InvalidArgument(format!(
                    "{} has no property {property}",
                    data.object_type().name()
                ))
            })?;
            let child = data.child_at(index)?;
            match (child.as_ref(), entry) {
                (CodecContext::LeafSet(set), Some(value)) => {
                    builder.push(PathArgument::node(set.qname().clone()));
                    let value = set.serialize_value(value)?;
                    builder.push(PathArgument::with_value(set.qname().clone(), value));
                }
                (
                    CodecContext::Leaf(_) | CodecContext::LeafSet(_) | CodecContext::Opaque(_),
                    None,
                ) => {
                    if let Some(qname) = child.qname() {
                        builder.push(PathArgument::node(qname.clone()));
                    }
                }
                _ => {
                    return Err(CodecError::InvalidArgument(format!(
                        "property {property} of {} is a {}, not a leaf or leaf-list entry",
                        data.object_type().name(),
                        child.kind()
                    )))
                }
            }
        }
    }
    Ok(YangInstanceIdentifier::new(builder))
}

pub(crate) fn to_binding_path(
    tree: &TreeInner,
    path: &YangInstanceIdentifier,
) -> Result<Option<BindingPath>> {
    let Some(walk) = walk_tree_path(tree, path)? else {
        return Ok(None);
    };
    Ok(Some(match walk.property {
        None => BindingPath::Data(InstanceIdentifier::new(walk.steps)),
        Some(property) => BindingPath::Property {
            parent: InstanceIdentifier::new(walk.steps),
            property: property.name,
            entry: property.entry.map(Box::new),
        },
    }))
}
