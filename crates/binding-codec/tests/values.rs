mod common;

use std::sync::Arc;

use binding_codec::binding::TypeName;
use binding_codec::{BindingPath, BindingValue, CodecError, DataObject, ObjectValue, UnionValue};
use common::*;
use yang_data::{NormalizedNode, PathArgument, Value, YangInstanceIdentifier};

fn top_yid() -> YangInstanceIdentifier {
    YangInstanceIdentifier::new(vec![PathArgument::node(t("top"))])
}

fn top_setting(
    tree: &binding_codec::BindingCodecTree,
    property: &str,
    value: impl Into<BindingValue>,
) -> Arc<dyn DataObject> {
    ObjectValue::builder(&ty(tree, "t.Top"))
        .set("name", "main")
        .set(property, value)
        .build()
        .expect("top")
}

fn read_leaf(
    tree: &binding_codec::BindingCodecTree,
    name: &str,
    value: Value,
) -> binding_codec::Result<Option<BindingValue>> {
    let node = NormalizedNode::container(t("top")).with_child(NormalizedNode::leaf(t(name), value));
    let (_, top) = tree
        .from_normalized_node(&top_yid(), &Arc::new(NormalizedNode::Container(node)))
        .expect("read top")
        .expect("top has an object form");
    top.get(name)
}

#[test]
fn identities_are_singletons() {
    let tree = tree();
    let codec = tree.identity_codec();
    let first = codec.to_binding(&t("fast")).expect("fast");
    let second = codec.to_binding(&t("fast")).expect("fast again");
    let by_type = codec.for_type(&TypeName::new("t.Fast")).expect("fast by type");
    assert!(first.ptr_eq(&second));
    assert!(first.ptr_eq(&by_type));
    assert_eq!(codec.from_binding(&first), t("fast"));

    let read = read_leaf(&tree, "kind", Value::QName(t("fast")))
        .expect("kind")
        .expect("kind present");
    let BindingValue::Identity(read) = read else {
        panic!("kind must decode as an identity");
    };
    assert!(read.ptr_eq(&first));
}

#[test]
fn unknown_identity_is_missing_schema() {
    let tree = tree();
    assert!(matches!(
        tree.identity_codec().to_binding(&t("ghost")),
        Err(CodecError::MissingSchema(_))
    ));
    assert!(matches!(
        tree.identity_codec().for_type(&TypeName::new("t.Ghost")),
        Err(CodecError::MissingClass(_))
    ));
}

#[test]
fn identity_outside_the_base_is_rejected() {
    let tree = tree();
    let other = tree.identity_codec().to_binding(&t("other")).expect("other");
    let top = top_setting(&tree, "kind", other);
    assert!(matches!(
        tree.to_normalized_node(&top_path(), &top),
        Err(CodecError::InvalidArgument(_))
    ));
    assert!(matches!(
        read_leaf(&tree, "kind", Value::QName(t("other"))),
        Err(CodecError::InvalidArgument(_))
    ));
}

#[test]
fn untagged_union_value_goes_to_the_first_accepting_member() {
    let tree = tree();
    let top = top_setting(&tree, "mixed", "hello");
    let (_, node) = tree.to_normalized_node(&top_path(), &top).expect("serialize top");
    assert_eq!(**child(&node, t("mixed")), NormalizedNode::leaf(t("mixed"), "hello"));

    let top = top_setting(&tree, "mixed", UnionValue::new("string", "5"));
    let (_, node) = tree.to_normalized_node(&top_path(), &top).expect("serialize top");
    assert_eq!(**child(&node, t("mixed")), NormalizedNode::leaf(t("mixed"), "5"));
}

#[test]
fn union_values_decode_with_their_member() {
    let tree = tree();
    assert_eq!(
        read_leaf(&tree, "mixed", Value::from("5")).expect("string member"),
        Some(BindingValue::Union(UnionValue::new("string", "5")))
    );
    assert_eq!(
        read_leaf(&tree, "mixed", Value::Int32(5)).expect("int32 member"),
        Some(BindingValue::Union(UnionValue::new("int32", 5)))
    );
    assert!(matches!(
        read_leaf(&tree, "mixed", Value::Bool(true)),
        Err(CodecError::NoCodecMatched { .. })
    ));
}

#[test]
fn instance_identifier_leaf_can_address_a_leaf_list_entry() {
    let tree = tree();
    let target = BindingPath::Property {
        parent: top_path(),
        property: "tags".into(),
        entry: Some(Box::new(BindingValue::from("red"))),
    };
    let top = top_setting(&tree, "ref", target.clone());
    let (yid, node) = tree.to_normalized_node(&top_path(), &top).expect("serialize top");

    let expected = YangInstanceIdentifier::new(vec![
        PathArgument::node(t("top")),
        PathArgument::node(t("tags")),
        PathArgument::with_value(t("tags"), Value::from("red")),
    ]);
    assert_eq!(
        **child(&node, t("ref")),
        NormalizedNode::leaf(t("ref"), Value::InstanceIdentifier(expected))
    );

    let (_, back) = tree
        .from_normalized_node(&yid, &Arc::new(node))
        .expect("read top")
        .expect("top has an object form");
    assert_eq!(
        back.get("ref").expect("ref"),
        Some(BindingValue::InstanceIdentifier(target))
    );
}

#[test]
fn instance_identifier_to_unrepresentable_node_is_rejected() {
    let tree = tree();
    let inside_case = YangInstanceIdentifier::new(vec![
        PathArgument::node(t("top")),
        PathArgument::node(t("shape")),
        PathArgument::node(t("radius")),
    ]);
    assert!(matches!(
        read_leaf(&tree, "ref", Value::InstanceIdentifier(inside_case)),
        Err(CodecError::InvalidArgument(_))
    ));
}

#[test]
fn instance_identifier_codec_outliving_its_tree_fails() {
    let tree = tree();
    let codec = tree.instance_identifier_codec();
    let value = BindingValue::InstanceIdentifier(BindingPath::from(top_path()));
    assert_eq!(
        codec.serialize(&value).expect("tree alive"),
        Value::InstanceIdentifier(top_yid())
    );

    drop(tree);
    assert!(matches!(codec.serialize(&value), Err(CodecError::Internal(_))));
}

#[test]
fn anydata_is_carried_verbatim() {
    let tree = tree();
    let body = serde_json::json!({ "nested": { "list": [1, 2, 3] } });
    let top = top_setting(&tree, "extra", body.clone());
    let (yid, node) = tree.to_normalized_node(&top_path(), &top).expect("serialize top");
    let NormalizedNode::AnyData(extra) = child(&node, t("extra")).as_ref() else {
        panic!("extra must serialize as anydata");
    };
    assert_eq!(extra.body, body);

    let (_, back) = tree
        .from_normalized_node(&yid, &Arc::new(node))
        .expect("read top")
        .expect("top has an object form");
    assert_eq!(back.get("extra").expect("extra"), Some(BindingValue::Opaque(body)));
}

#[test]
fn anydata_rejects_non_opaque_values() {
    let tree = tree();
    let top = top_setting(&tree, "extra", "plain text");
    assert!(matches!(
        tree.to_normalized_node(&top_path(), &top),
        Err(CodecError::InvalidArgument(_))
    ));
}

#[test]
fn scalar_type_mismatch_is_invalid_argument() {
    let tree = tree();
    let top = top_setting(&tree, "count", "seven");
    assert!(matches!(
        tree.to_normalized_node(&top_path(), &top),
        Err(CodecError::InvalidArgument(_))
    ));
    assert!(matches!(
        read_leaf(&tree, "count", Value::from("seven")),
        Err(CodecError::InvalidArgument(_))
    ));
}
