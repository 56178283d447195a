//! Choice contexts and case resolution.
//!
//! A choice knows its cases three ways: by case type (including structurally
//! identical case types declared for the same choice elsewhere), by the
//! types the cases declare as children, and by the tree names of the cases'
//! children. A child type declared by several cases is ambiguous; it resolves
//! to the case whose type name sorts first and is reported once.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Weak};

use yang_data::{NormalizedNode, PathArgument, QName, SchemaNode};

use super::{is_substitution, CodecContext};
use crate::binding::{BindingValue, ObjectType, PathStep, SchemaScope, TypeName};
use crate::error::{CodecError, Result};
use crate::runtime::BindingRuntimeContext;
use crate::tree::TreeInner;

/// Context of a choice type.
#[derive(Debug)]
pub struct ChoiceContext {
    type_: ObjectType,
    qname: QName,
    tree: Weak<TreeInner>,
    /// Local cases, in schema order.
    cases: Vec<ObjectType>,
    by_case_type: HashMap<TypeName, usize>,
    by_child_type: HashMap<TypeName, usize>,
    /// Candidates sorted by case type name.
    ambiguous: HashMap<TypeName, Vec<usize>>,
    by_tree: HashMap<QName, usize>,
    warned: Mutex<HashSet<TypeName>>,
}

impl ChoiceContext {
    pub(crate) fn new(
        type_: ObjectType,
        schema: Arc<SchemaNode>,
        tree: &TreeInner,
    ) -> Result<Self> {
        let runtime = tree.runtime();
        let scope = type_.schema.scope();
        let path = type_.schema.path().to_vec();

        let mut case_nodes: Vec<Arc<SchemaNode>> =
            schema.children.iter().filter(|c| c.is_case()).cloned().collect();
        for aug in runtime.augmentations_in(&scope, &path) {
            case_nodes.extend(aug.children.iter().filter(|c| c.is_case()).cloned());
        }

        let mut cases = Vec::new();
        let mut by_case_type = HashMap::new();
        let mut by_tree = HashMap::new();
        let mut child_to_cases: HashMap<TypeName, Vec<usize>> = HashMap::new();
        for case_node in case_nodes {
            let mut case_path = path.clone();
            case_path.push(case_node.qname.clone());
            let Some(case_type) = runtime.type_in(&scope, &case_path) else {
                tracing::debug!(
                    choice = %type_.name(),
                    case = %case_node.qname,
                    "case has no object type, ignoring"
                );
                continue;
            };
            let index = cases.len();
            by_case_type.insert(case_type.name().clone(), index);
            for name in case_tree_names(runtime, &scope, &case_node, &case_path) {
                by_tree.entry(name).or_insert(index);
            }
            for child in case_type.child_types() {
                let owners = child_to_cases.entry(child.clone()).or_default();
                if !owners.contains(&index) {
                    owners.push(index);
                }
            }
            cases.push(case_type.clone());
        }

        let mut by_child_type = HashMap::new();
        let mut ambiguous = HashMap::new();
        for (child, mut owners) in child_to_cases {
            if owners.len() == 1 {
                by_child_type.insert(child, owners[0]);
            } else {
                owners.sort_by(|a, b| cases[*a].name().cmp(cases[*b].name()));
                ambiguous.insert(child, owners);
            }
        }

        for candidate in runtime.case_types(type_.name()) {
            if by_case_type.contains_key(candidate.name()) {
                continue;
            }
            if let Some(index) = cases.iter().position(|local| is_substitution(&candidate, local)) {
                by_case_type.insert(candidate.name().clone(), index);
            }
        }

        Ok(Self {
            type_,
            qname: schema.qname.clone(),
            tree: tree.weak(),
            cases,
            by_case_type,
            by_child_type,
            ambiguous,
            by_tree,
            warned: Mutex::new(HashSet::new()),
        })
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.type_
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn cases(&self) -> &[ObjectType] {
        &self.cases
    }

    pub(crate) fn tree(&self) -> Result<Arc<TreeInner>> {
        self.tree
            .upgrade()
            .ok_or_else(|| CodecError::Internal("codec tree dropped".into()))
    }

    pub fn case_at(&self, index: usize) -> Result<Arc<CodecContext>> {
        let case = self.cases.get(index).ok_or_else(|| {
            CodecError::Internal(format!("{} has no case #{index}", self.type_.name()))
        })?;
        self.tree()?.context_for(case.name())
    }

    /// Case owning the tree child `qname`.
    pub fn case_index_for_tree(&self, qname: &QName) -> Option<usize> {
        self.by_tree.get(qname).copied()
    }

    /// The local case for `case_type`, directly or by substitution.
    pub fn case_for_type(&self, case_type: &TypeName) -> Result<Arc<CodecContext>> {
        let index = self.by_case_type.get(case_type).ok_or_else(|| {
            CodecError::IncorrectNesting(format!(
                "{case_type} is not a valid case of {}",
                self.type_.name()
            ))
        })?;
        self.case_at(*index)
    }

    /// The case declaring `child_type` as a child.
    pub fn case_for_child_type(&self, child_type: &TypeName) -> Result<Arc<CodecContext>> {
        if let Some(index) = self.by_child_type.get(child_type) {
            return self.case_at(*index);
        }
        let candidates = self.ambiguous.get(child_type).ok_or_else(|| {
            CodecError::IncorrectNesting(format!(
                "{child_type} is not a child of any case of {}",
                self.type_.name()
            ))
        })?;
        let chosen = candidates[0];
        let first_report = self
            .warned
            .lock()
            .map(|mut warned| warned.insert(child_type.clone()))
            .unwrap_or(false);
        if first_report {
            let names: Vec<&str> = candidates
                .iter()
                .map(|i| self.cases[*i].name().as_str())
                .collect();
            tracing::warn!(
                child = %child_type,
                choice = %self.type_.name(),
                chosen = %self.cases[chosen].name(),
                candidates = ?names,
                "ambiguous reference to a child of a choice resolved to the first case; \
                 this mapping depends on type naming and may change when the schema changes"
            );
        }
        self.case_at(chosen)
    }

    /// The first child of the choice node selects the case; an empty choice
    /// node reads as absent.
    pub(crate) fn deserialize(&self, node: &Arc<NormalizedNode>) -> Result<Option<BindingValue>> {
        let NormalizedNode::Choice(choice) = node.as_ref() else {
            return Err(CodecError::MalformedData(format!(
                "expected choice {}, got {} {}",
                self.qname,
                node.kind(),
                node.name()
            )));
        };
        let Some(first) = choice.children.keys().next() else {
            return Ok(None);
        };
        let index = self.case_index_for_tree(first.name()).ok_or_else(|| {
            CodecError::IncorrectNesting(format!(
                "{} is not a valid case child of {}",
                first.name(),
                self.type_.name()
            ))
        })?;
        self.case_at(index)?.deserialize(node)
    }

    pub fn child_by_tree_argument(&self, arg: &PathArgument) -> Result<Arc<CodecContext>> {
        let index = self.case_index_for_tree(arg.name()).ok_or_else(|| {
            CodecError::IncorrectNesting(format!(
                "{} is not a valid case child of {}",
                arg.name(),
                self.type_.name()
            ))
        })?;
        self.case_at(index)?.child_by_tree_argument(arg)
    }

    /// Explicit case qualifiers win; otherwise the case is found by the
    /// step's type.
    pub fn child_by_path_step(
        &self,
        step: &PathStep,
        builder: &mut Vec<PathArgument>,
    ) -> Result<Arc<CodecContext>> {
        let case = match step.case_type() {
            Some(case_type) => self.case_for_type(case_type)?,
            None => self.case_for_child_type(step.type_name())?,
        };
        case.child_by_path_step(step, builder)
    }

    /// Case contexts by case type; other types resolve through the case
    /// declaring them.
    pub fn stream_child(&self, type_name: &TypeName) -> Result<Arc<CodecContext>> {
        if self.by_case_type.contains_key(type_name) {
            return self.case_for_type(type_name);
        }
        self.case_for_child_type(type_name)?.stream_child(type_name)
    }
}

/// Tree names a case contributes to its choice node, including names of
/// augmentations of the case.
fn case_tree_names(
    runtime: &BindingRuntimeContext,
    scope: &SchemaScope,
    case: &SchemaNode,
    case_path: &[QName],
) -> Vec<QName> {
    let mut names: Vec<QName> = case.children.iter().map(|c| c.qname.clone()).collect();
    for aug in runtime.augmentations_in(scope, case_path) {
        names.extend(aug.children.iter().map(|c| c.qname.clone()));
    }
    names
}
