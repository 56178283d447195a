mod common;

use std::sync::Arc;

use binding_codec::binding::{ObjectKind, ObjectType, TypeName};
use binding_codec::{
    data_equals, BindingCodecTree, BindingRuntimeContext, BindingValue, DataObject, ObjectValue,
};
use common::*;
use yang_data::{NormalizedNode, PathArgument, Value, YangInstanceIdentifier};

#[test]
fn object_to_node_lays_out_every_child_kind() {
    let tree = tree();
    let top = sample_top(&tree);
    let (yid, node) = tree
        .to_normalized_node(&top_path(), &top)
        .expect("serialize top");

    assert_eq!(yid, YangInstanceIdentifier::new(vec![PathArgument::node(t("top"))]));
    assert_eq!(**child(&node, t("count")), NormalizedNode::leaf(t("count"), 7));
    assert_eq!(**child(&node, t("level")), NormalizedNode::leaf(t("level"), "high"));
    assert_eq!(
        **child(&node, t("flags")),
        NormalizedNode::leaf(
            t("flags"),
            Value::Bits(["read".to_string(), "write".to_string()].into_iter().collect())
        )
    );
    assert_eq!(**child(&node, t("kind")), NormalizedNode::leaf(t("kind"), t("fast")));

    let NormalizedNode::Map(entries) = child(&node, t("entry")).as_ref() else {
        panic!("entry must serialize as a map");
    };
    let first = PathArgument::with_predicates(
        t("entry"),
        [(t("zeta"), Value::from("z")), (t("alpha"), Value::Int32(1))],
    );
    assert!(entries.entries.contains_key(&first));
    assert_eq!(entries.entries.len(), 2);

    let NormalizedNode::UnkeyedList(items) = child(&node, t("item")).as_ref() else {
        panic!("item must serialize as an unkeyed list");
    };
    assert_eq!(items.entries.len(), 2);

    let NormalizedNode::LeafSet(tags) = child(&node, t("tags")).as_ref() else {
        panic!("tags must serialize as a leaf-set");
    };
    let tags: Vec<&Value> = tags.values.iter().collect();
    assert_eq!(tags, vec![&Value::from("red"), &Value::from("green")]);

    let shape = child(&node, t("shape"));
    assert!(matches!(shape.as_ref(), NormalizedNode::Choice(_)));
    assert_eq!(**child(shape, t("radius")), NormalizedNode::leaf(t("radius"), 3));
}

#[test]
fn object_survives_node_round_trip() {
    let tree = tree();
    let top = sample_top(&tree);
    let (yid, node) = tree
        .to_normalized_node(&top_path(), &top)
        .expect("serialize top");

    let (path, decoded) = tree
        .from_normalized_node(&yid, &Arc::new(node))
        .expect("deserialize top")
        .expect("top has an object form");
    assert_eq!(path, top_path());
    assert!(data_equals(top.as_ref(), decoded.as_ref()));
}

#[test]
fn node_survives_object_round_trip() {
    let tree = tree();
    let (yid, node) = tree
        .to_normalized_node(&top_path(), &sample_top(&tree))
        .expect("serialize top");
    let node = Arc::new(node);

    let (path, decoded) = tree
        .from_normalized_node(&yid, &node)
        .expect("deserialize top")
        .expect("top has an object form");
    let (again_yid, again) = tree
        .to_normalized_node(&path, &decoded)
        .expect("reserialize top");
    assert_eq!(again_yid, yid);
    assert_eq!(again, *node);
}

#[test]
fn decoded_children_are_spliced_back_unchanged() {
    let tree = tree();
    let (yid, node) = tree
        .to_normalized_node(&top_path(), &sample_top(&tree))
        .expect("serialize top");
    let node = Arc::new(node);
    let (_, decoded) = tree
        .from_normalized_node(&yid, &node)
        .expect("deserialize top")
        .expect("top has an object form");

    let settings = decoded
        .get("settings")
        .expect("read settings")
        .expect("settings present");
    let fresh = ObjectValue::builder(&ty(&tree, "t.Top"))
        .set("name", "other")
        .set("settings", settings)
        .build()
        .expect("fresh top");
    let (_, rebuilt) = tree
        .to_normalized_node(&top_path(), &fresh)
        .expect("serialize fresh top");

    assert!(Arc::ptr_eq(child(&rebuilt, t("settings")), child(&node, t("settings"))));
}

#[test]
fn list_entry_round_trips_on_its_own_path() {
    let tree = tree();
    let entry = ObjectValue::builder(&ty(&tree, "t.Entry"))
        .set("zeta", "q")
        .set("alpha", 9)
        .build()
        .expect("entry");
    let key = entry.key().expect("key").expect("keyed entry");
    let path = top_path().keyed_child("t.Entry", key);

    let (yid, node) = tree.to_normalized_node(&path, &entry).expect("serialize entry");
    let entry_arg = PathArgument::with_predicates(
        t("entry"),
        [(t("zeta"), Value::from("q")), (t("alpha"), Value::Int32(9))],
    );
    assert_eq!(yid.last(), Some(&entry_arg));
    assert!(matches!(node, NormalizedNode::MapEntry(_)));

    let (back, decoded) = tree
        .from_normalized_node(&yid, &Arc::new(node))
        .expect("deserialize entry")
        .expect("entry has an object form");
    assert_eq!(back, path);
    assert_eq!(decoded.get("note").expect("read note"), None);
    assert!(data_equals(entry.as_ref(), decoded.as_ref()));
}

#[test]
fn case_children_decode_through_the_choice() {
    let tree = tree();
    let style = ObjectValue::builder(&ty(&tree, "t.Style"))
        .set("color", "red")
        .build()
        .expect("style");
    let square = ObjectValue::builder(&ty(&tree, "t.Square"))
        .set("side", 4)
        .set("style", style)
        .build()
        .expect("square");
    let top = ObjectValue::builder(&ty(&tree, "t.Top"))
        .set("name", "shaped")
        .set("shape", square.clone())
        .build()
        .expect("top");

    let (yid, node) = tree.to_normalized_node(&top_path(), &top).expect("serialize top");
    let (_, decoded) = tree
        .from_normalized_node(&yid, &Arc::new(node))
        .expect("deserialize top")
        .expect("top has an object form");
    let Some(BindingValue::Object(case)) = decoded.get("shape").expect("read shape") else {
        panic!("shape must decode as a case object");
    };
    assert_eq!(case.implemented_type().name().as_str(), "t.Square");
    assert!(data_equals(square.as_ref(), case.as_ref()));
}

#[test]
fn equivalent_case_type_serializes_through_the_local_case() {
    let round = ObjectType::builder("x.Round", ObjectKind::Case { choice: "t.Shape".into() })
        .schema_path([t("elsewhere"), t("shape"), t("circle")])
        .leaf("radius")
        .build();
    let runtime = BindingRuntimeContext::builder(schema())
        .object_types(object_types())
        .object_type(round.clone())
        .build();
    let tree = BindingCodecTree::new(runtime);

    let shape_ctx = tree
        .get_context_for(&TypeName::new("t.Shape"))
        .expect("shape context");
    let local = shape_ctx
        .stream_child(&TypeName::new("x.Round"))
        .expect("substitute resolves");
    assert_eq!(local.object_type().map(|t| t.name().as_str()), Some("t.Circle"));

    let circle = ObjectValue::builder(&round).set("radius", 9).build().expect("round");
    let top = ObjectValue::builder(&ty(&tree, "t.Top"))
        .set("name", "substituted")
        .set("shape", circle.clone())
        .build()
        .expect("top");
    let (yid, node) = tree.to_normalized_node(&top_path(), &top).expect("serialize top");
    let shape = child(&node, t("shape"));
    assert!(matches!(shape.as_ref(), NormalizedNode::Choice(_)));
    assert_eq!(**child(shape, t("radius")), NormalizedNode::leaf(t("radius"), 9));

    let (_, decoded) = tree
        .from_normalized_node(&yid, &Arc::new(node))
        .expect("deserialize top")
        .expect("top has an object form");
    let Some(BindingValue::Object(case)) = decoded.get("shape").expect("read shape") else {
        panic!("shape must decode as a case object");
    };
    assert_eq!(case.implemented_type().name().as_str(), "t.Circle");
    assert_eq!(case.get("radius").expect("radius"), Some(BindingValue::from(9)));
}

#[test]
fn leaf_nodes_have_no_object_form() {
    let tree = tree();
    let yid = YangInstanceIdentifier::new(vec![
        PathArgument::node(t("top")),
        PathArgument::node(t("count")),
    ]);
    let leaf = Arc::new(NormalizedNode::leaf(t("count"), 1));
    assert!(tree
        .from_normalized_node(&yid, &leaf)
        .expect("leaf lookup")
        .is_none());
}

#[test]
fn list_node_without_entry_has_no_object_form() {
    let tree = tree();
    let (_, node) = tree
        .to_normalized_node(&top_path(), &sample_top(&tree))
        .expect("serialize top");
    let list = child(&node, t("entry")).clone();
    let yid = YangInstanceIdentifier::new(vec![
        PathArgument::node(t("top")),
        PathArgument::node(t("entry")),
    ]);
    assert!(tree
        .from_normalized_node(&yid, &list)
        .expect("list lookup")
        .is_none());
}
