mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use binding_codec::binding::{ObjectKind, ObjectType, TypeName};
use binding_codec::context::LeafContext;
use binding_codec::{
    BindingCodecTree, BindingRuntimeContext, BindingValue, CodecError, CodecOptions, DataObject,
    EnumValue, LeafDefaults, ObjectView, Result, SchemaDefaults,
};
use common::*;
use yang_data::{NormalizedNode, PathArgument, QName, YangInstanceIdentifier};

fn name(s: &str) -> TypeName {
    TypeName::new(s)
}

fn top_view(tree: &BindingCodecTree, node: NormalizedNode) -> ObjectView {
    let ctx = tree.get_context_for(&name("t.Top")).expect("top context");
    ObjectView::new(ctx, Arc::new(node)).expect("top view")
}

fn sparse_top() -> NormalizedNode {
    NormalizedNode::Container(
        NormalizedNode::container(t("top")).with_child(NormalizedNode::leaf(t("count"), 7)),
    )
}

fn tree_with_extra(extra: ObjectType) -> BindingCodecTree {
    let runtime = BindingRuntimeContext::builder(schema())
        .object_types(object_types())
        .object_type(extra)
        .build();
    BindingCodecTree::new(runtime)
}

#[test]
fn contexts_are_built_once_and_shared_by_clones() {
    let tree = tree();
    let first = tree.get_context_for(&name("t.Entry")).expect("entry context");
    let second = tree.get_context_for(&name("t.Entry")).expect("entry context again");
    assert!(Arc::ptr_eq(&first, &second));

    let clone = tree.clone();
    let from_clone = clone.get_context_for(&name("t.Entry")).expect("entry context via clone");
    assert!(Arc::ptr_eq(&first, &from_clone));

    let top = tree.get_context_for(&name("t.Top")).expect("top context");
    let child = top.stream_child(&name("t.Entry")).expect("entry as a child of top");
    assert!(Arc::ptr_eq(&first, &child));
}

#[test]
fn concurrent_first_requests_agree_on_one_context() {
    let tree = tree();
    let contexts: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    tree.get_context_for(&name("t.Settings"))
                        .expect("settings context")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker must not panic"))
            .collect()
    });
    for ctx in &contexts[1..] {
        assert!(Arc::ptr_eq(&contexts[0], ctx));
    }
}

#[test]
fn context_kinds_follow_the_schema() {
    let tree = tree();
    let kind = |type_name: &str| {
        tree.get_context_for(&name(type_name))
            .unwrap_or_else(|e| panic!("{type_name}: {e}"))
            .kind()
    };
    assert_eq!(kind("t.Top"), "structural container");
    assert_eq!(kind("t.Settings"), "structural container");
    assert_eq!(kind("t.Session"), "container");
    assert_eq!(kind("t.Entry"), "keyed list");
    assert_eq!(kind("t.Item"), "list");
    assert_eq!(kind("t.Shape"), "choice");
    assert_eq!(kind("t.Square"), "case");
    assert_eq!(kind("a.TopAug"), "augmentation");
    assert_eq!(kind("t.Alarm"), "notification");
    assert_eq!(kind("t.ResetInput"), "input/output");

    let top = tree.get_context_for(&name("t.Top")).expect("top context");
    assert_eq!(top.leaf_child("count").expect("count").kind(), "leaf");
    assert_eq!(top.leaf_child("tags").expect("tags").kind(), "leaf-list");
    assert_eq!(top.leaf_child("extra").expect("extra").kind(), "anydata");
    assert!(matches!(top.leaf_child("settings"), Err(CodecError::IncorrectNesting(_))));
}

#[test]
fn unknown_type_is_missing_class() {
    let tree = tree();
    assert!(matches!(
        tree.get_context_for(&name("t.Nope")),
        Err(CodecError::MissingClass(_))
    ));
}

#[test]
fn type_of_unloaded_module_is_missing_schema() {
    let ghost = ObjectType::builder("g.Ghost", ObjectKind::Container)
        .schema_path([QName::new("urn:example:ghost", "ghost")])
        .build();
    let tree = tree_with_extra(ghost);
    assert!(matches!(
        tree.get_context_for(&name("g.Ghost")),
        Err(CodecError::MissingSchema(_))
    ));
}

#[test]
fn type_mirroring_wrong_node_kind_is_incorrect_nesting() {
    let bad = ObjectType::builder("x.NotAList", ObjectKind::Container)
        .schema_path([t("top"), t("entry")])
        .build();
    let tree = tree_with_extra(bad);
    assert!(matches!(
        tree.get_context_for(&name("x.NotAList")),
        Err(CodecError::IncorrectNesting(_))
    ));
}

#[test]
fn case_claiming_another_choice_is_incorrect_nesting() {
    let stray = ObjectType::builder("x.Stray", ObjectKind::Case { choice: "t.Mode".into() })
        .schema_path([t("top"), t("shape"), t("circle")])
        .leaf("radius")
        .build();
    let tree = tree_with_extra(stray);
    assert!(matches!(
        tree.get_context_for(&name("x.Stray")),
        Err(CodecError::IncorrectNesting(_))
    ));
}

#[derive(Debug, Default)]
struct CountingDefaults {
    calls: AtomicUsize,
}

impl LeafDefaults for CountingDefaults {
    fn default_for(&self, leaf: &LeafContext) -> Result<Option<BindingValue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        SchemaDefaults.default_for(leaf)
    }
}

#[test]
fn absent_leaves_read_defaults_once_per_view() {
    let defaults = Arc::new(CountingDefaults::default());
    let tree = tree_with(CodecOptions {
        leaf_defaults: defaults.clone(),
    });
    let view = top_view(&tree, sparse_top());

    assert_eq!(view.get("count").expect("count"), Some(BindingValue::from(7)));
    assert_eq!(defaults.calls.load(Ordering::SeqCst), 0);

    assert_eq!(view.get("name").expect("name"), Some(BindingValue::from("unnamed")));
    assert_eq!(view.get("name").expect("name again"), Some(BindingValue::from("unnamed")));
    assert_eq!(defaults.calls.load(Ordering::SeqCst), 1);

    assert_eq!(
        view.get("level").expect("level"),
        Some(BindingValue::Enum(EnumValue {
            name: "low".into(),
            value: 0,
        }))
    );
    assert_eq!(defaults.calls.load(Ordering::SeqCst), 2);

    assert_eq!(view.get("mixed").expect("mixed"), None);
}

#[test]
fn missing_mandatory_leaf_is_invalid_argument() {
    let tree = tree();
    let session = NormalizedNode::Container(NormalizedNode::container(t("session")));
    let yid = YangInstanceIdentifier::new(vec![
        PathArgument::node(t("top")),
        PathArgument::node(t("session")),
    ]);
    let (path, object) = tree
        .from_normalized_node(&yid, &Arc::new(session))
        .expect("session lookup")
        .expect("session has an object form");
    assert_eq!(path, top_path().child("t.Session"));
    assert!(matches!(object.get("id"), Err(CodecError::InvalidArgument(_))));
}

#[test]
fn unknown_property_is_invalid_argument() {
    let tree = tree();
    let view = top_view(&tree, sparse_top());
    assert!(matches!(view.get("nope"), Err(CodecError::InvalidArgument(_))));
}

#[test]
fn absent_structural_container_reads_as_shared_empty_instance() {
    let tree = tree();
    let view = top_view(&tree, sparse_top());
    assert_eq!(view.get("settings").expect("settings"), None);

    let BindingValue::Object(first) = view.nonnull("settings").expect("nonnull settings") else {
        panic!("settings must read as an object");
    };
    let other = top_view(&tree, sparse_top());
    let BindingValue::Object(second) = other
        .nonnull("settings")
        .expect("nonnull settings again")
    else {
        panic!("settings must read as an object");
    };
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.implemented_type().name(), &name("t.Settings"));
    assert_eq!(first.get("enabled").expect("enabled"), Some(BindingValue::from(true)));
}

#[test]
fn nonnull_rejects_presence_containers_and_leaves() {
    let tree = tree();
    let view = top_view(&tree, sparse_top());
    assert!(matches!(view.nonnull("session"), Err(CodecError::InvalidArgument(_))));
    assert!(matches!(view.nonnull("count"), Err(CodecError::InvalidArgument(_))));
}

#[test]
fn present_container_is_returned_by_nonnull() {
    let tree = tree();
    let settings = NormalizedNode::container(t("settings"))
        .with_child(NormalizedNode::leaf(t("enabled"), false));
    let top = NormalizedNode::container(t("top")).with_child(NormalizedNode::Container(settings));
    let view = top_view(&tree, NormalizedNode::Container(top));

    let value = view.nonnull("settings").expect("nonnull settings");
    let settings = value.as_object().expect("settings object");
    assert_eq!(settings.get("enabled").expect("enabled"), Some(BindingValue::from(false)));
}

#[test]
fn view_rejects_non_container_nodes() {
    let tree = tree();
    let ctx = tree.get_context_for(&name("t.Top")).expect("top context");
    let leaf = Arc::new(NormalizedNode::leaf(t("top"), 1));
    assert!(matches!(ObjectView::new(ctx, leaf), Err(CodecError::MalformedData(_))));
}
