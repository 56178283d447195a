mod common;

use std::sync::Arc;

use binding_codec::binding::{ObjectKind, ObjectType, TypeName};
use binding_codec::{
    data_equals, BindingCodecTree, BindingRuntimeContext, BindingStreamEventWriter, BindingValue,
    CodecError, ObjectValue,
};
use common::*;
use yang_data::{
    Module, NormalizedNode, NormalizedNodeResult, PathArgument, QName, QNameModule, SchemaContext,
    SchemaNode, TypeDefinition, YangInstanceIdentifier,
};

const OPS_NS: &str = "urn:example:ops";

fn o(name: &str) -> QName {
    QName::new(OPS_NS, name)
}

/// ```text
/// module ops {
///   container device {
///     leaf id { type string; }
///     action restart { input { leaf delay; } output { leaf done; } }
///   }
///   rpc ping { input { leaf host; } }
///   notification booted { leaf id; }
/// }
/// ```
fn ops_tree() -> BindingCodecTree {
    let restart = o("restart");
    let ping = o("ping");
    let device = SchemaNode::container(o("device"))
        .child(SchemaNode::leaf(o("id"), TypeDefinition::string()))
        .child(
            SchemaNode::action(restart.clone())
                .child(
                    SchemaNode::input(&restart)
                        .child(SchemaNode::leaf(o("delay"), TypeDefinition::int32())),
                )
                .child(
                    SchemaNode::output(&restart)
                        .child(SchemaNode::leaf(o("done"), TypeDefinition::boolean())),
                ),
        );
    let module = Module::builder("ops", QNameModule::new(OPS_NS))
        .child(device)
        .child(
            SchemaNode::rpc(ping.clone()).child(
                SchemaNode::input(&ping)
                    .child(SchemaNode::leaf(o("host"), TypeDefinition::string())),
            ),
        )
        .child(
            SchemaNode::notification(o("booted"))
                .child(SchemaNode::leaf(o("id"), TypeDefinition::string())),
        )
        .build();
    let schema = SchemaContext::new([module]).expect("ops schema");
    let runtime = BindingRuntimeContext::builder(schema)
        .object_types([
            ObjectType::builder("o.Device", ObjectKind::Container)
                .schema_path([o("device")])
                .leaf("id")
                .build(),
            ObjectType::builder("o.RestartInput", ObjectKind::Input)
                .schema_path([o("device"), o("restart"), o("input")])
                .leaf("delay")
                .build(),
            ObjectType::builder("o.RestartOutput", ObjectKind::Output)
                .schema_path([o("device"), o("restart"), o("output")])
                .leaf("done")
                .build(),
            ObjectType::builder("o.PingInput", ObjectKind::Input)
                .schema_path([o("ping"), o("input")])
                .leaf("host")
                .build(),
            ObjectType::builder("o.Booted", ObjectKind::Notification)
                .schema_path([o("booted")])
                .leaf("id")
                .build(),
        ])
        .build();
    BindingCodecTree::new(runtime)
}

fn write_one_leaf(
    writer: &mut dyn BindingStreamEventWriter,
    type_name: &str,
    leaf: &str,
    value: BindingValue,
) {
    writer
        .start_container_node(&TypeName::new(type_name))
        .expect("open root");
    writer.leaf_node(leaf, &value).expect("leaf");
    writer.end_node().expect("close root");
}

#[test]
fn notification_round_trips() {
    let tree = tree();
    let alarm = ObjectValue::builder(&ty(&tree, "t.Alarm"))
        .set("severity", 3)
        .build()
        .expect("alarm");
    let node = tree.to_normalized_notification(&alarm).expect("serialize alarm");
    assert_eq!(node.name(), t("alarm"));
    assert_eq!(**child(&node, t("severity")), NormalizedNode::leaf(t("severity"), 3));

    let back = tree
        .from_normalized_notification(&[t("alarm")], &Arc::new(node))
        .expect("deserialize alarm");
    assert!(data_equals(alarm.as_ref(), back.as_ref()));
}

#[test]
fn notification_codec_rejects_other_kinds() {
    let tree = tree();
    let settings = ObjectValue::builder(&ty(&tree, "t.Settings"))
        .set("enabled", true)
        .build()
        .expect("settings");
    assert!(matches!(
        tree.to_normalized_notification(&settings),
        Err(CodecError::InvalidArgument(_))
    ));
}

#[test]
fn rpc_input_round_trips() {
    let tree = tree();
    let input = ObjectValue::builder(&ty(&tree, "t.ResetInput"))
        .set("force", true)
        .build()
        .expect("input");
    let node = tree.to_normalized_rpc_data(&input).expect("serialize input");
    assert_eq!(node.name(), t("input"));

    let node = Arc::new(node);
    let back = tree
        .from_normalized_rpc_data(&[t("reset"), t("input")], &node)
        .expect("deserialize input");
    assert!(data_equals(input.as_ref(), back.as_ref()));

    assert!(matches!(
        tree.from_normalized_notification(&[t("reset"), t("input")], &node),
        Err(CodecError::InvalidArgument(_))
    ));
    assert!(matches!(
        tree.from_normalized_rpc_data(&[t("reset"), t("missing")], &node),
        Err(CodecError::MissingClass(_))
    ));
}

#[test]
fn writer_builds_the_addressed_object() {
    let tree = tree();
    let mut result = NormalizedNodeResult::new();
    {
        let (yid, mut writer) = tree
            .new_writer(&top_path().child("t.Settings"), &mut result)
            .expect("settings writer");
        assert_eq!(
            yid,
            YangInstanceIdentifier::new(vec![
                PathArgument::node(t("top")),
                PathArgument::node(t("settings")),
            ])
        );
        writer
            .start_container_node(&TypeName::new("t.Settings"))
            .expect("open settings");
        writer
            .leaf_node("enabled", &BindingValue::from(false))
            .expect("enabled");
        writer.end_node().expect("close settings");
    }
    let node = result.into_result().expect("complete settings");
    assert_eq!(
        node,
        NormalizedNode::Container(
            NormalizedNode::container(t("settings"))
                .with_child(NormalizedNode::leaf(t("enabled"), false))
        )
    );
}

#[test]
fn writer_rejects_a_foreign_root() {
    let tree = tree();
    let mut result = NormalizedNodeResult::new();
    let (_, mut writer) = tree
        .new_writer(&top_path().child("t.Settings"), &mut result)
        .expect("settings writer");
    assert!(matches!(
        writer.start_container_node(&TypeName::new("t.Top")),
        Err(CodecError::IncorrectNesting(_))
    ));
}

#[test]
fn writer_rejects_unknown_leaves() {
    let tree = tree();
    let mut result = NormalizedNodeResult::new();
    let (_, mut writer) = tree.new_writer(&top_path(), &mut result).expect("top writer");
    writer
        .start_container_node(&TypeName::new("t.Top"))
        .expect("open top");
    assert!(matches!(
        writer.leaf_node("nope", &BindingValue::from(1)),
        Err(CodecError::IncorrectNesting(_))
    ));
    assert!(matches!(
        writer.leaf_node("settings", &BindingValue::from(1)),
        Err(CodecError::IncorrectNesting(_))
    ));
}

#[test]
fn writer_passes_through_choice_and_case() {
    let tree = tree();
    let mut result = NormalizedNodeResult::new();
    {
        let (_, mut writer) = tree.new_writer(&top_path(), &mut result).expect("top writer");
        writer.start_container_node(&TypeName::new("t.Top")).expect("open top");
        writer.start_choice_node(&TypeName::new("t.Shape")).expect("open shape");
        writer.start_case(&TypeName::new("t.Square")).expect("open square");
        writer.leaf_node("side", &BindingValue::from(2)).expect("side");
        writer.start_container_node(&TypeName::new("t.Style")).expect("open style");
        writer.leaf_node("color", &BindingValue::from("red")).expect("color");
        for _ in 0..4 {
            writer.end_node().expect("close");
        }
    }
    let node = result.into_result().expect("complete top");

    let style =
        NormalizedNode::container(t("style")).with_child(NormalizedNode::leaf(t("color"), "red"));
    let shape = NormalizedNode::container(t("shape"))
        .with_child(NormalizedNode::leaf(t("side"), 2))
        .with_child(NormalizedNode::Container(style));
    let expected = NormalizedNode::container(t("top")).with_child(NormalizedNode::Choice(shape));
    assert_eq!(node, NormalizedNode::Container(expected));
}

#[test]
fn writer_rejects_a_case_of_another_choice() {
    let tree = tree();
    let mut result = NormalizedNodeResult::new();
    let (_, mut writer) = tree.new_writer(&top_path(), &mut result).expect("top writer");
    writer.start_container_node(&TypeName::new("t.Top")).expect("open top");
    writer.start_choice_node(&TypeName::new("t.Shape")).expect("open shape");
    assert!(matches!(
        writer.start_case(&TypeName::new("t.Auto")),
        Err(CodecError::IncorrectNesting(_))
    ));
}

#[test]
fn notification_writer_emits_the_notification_node() {
    let tree = ops_tree();
    let mut result = NormalizedNodeResult::new();
    {
        let mut writer = tree
            .new_notification_writer(&TypeName::new("o.Booted"), &mut result)
            .expect("booted writer");
        write_one_leaf(&mut writer, "o.Booted", "id", BindingValue::from("sw1"));
    }
    let node = result.into_result().expect("complete booted");
    assert_eq!(
        node,
        NormalizedNode::Container(
            NormalizedNode::container(o("booted")).with_child(NormalizedNode::leaf(o("id"), "sw1"))
        )
    );

    let mut other = NormalizedNodeResult::new();
    assert!(matches!(
        tree.new_notification_writer(&TypeName::new("o.PingInput"), &mut other),
        Err(CodecError::InvalidArgument(_))
    ));
}

#[test]
fn rpc_writer_accepts_only_rpc_data() {
    let tree = ops_tree();
    let mut result = NormalizedNodeResult::new();
    {
        let mut writer = tree
            .new_rpc_writer(&TypeName::new("o.PingInput"), &mut result)
            .expect("ping writer");
        write_one_leaf(&mut writer, "o.PingInput", "host", BindingValue::from("example.net"));
    }
    let node = result.into_result().expect("complete ping input");
    assert_eq!(node.name(), o("input"));
    assert_eq!(**child(&node, o("host")), NormalizedNode::leaf(o("host"), "example.net"));

    let mut other = NormalizedNodeResult::new();
    assert!(matches!(
        tree.new_rpc_writer(&TypeName::new("o.RestartInput"), &mut other),
        Err(CodecError::InvalidArgument(_))
    ));
    assert!(matches!(
        tree.new_rpc_writer(&TypeName::new("o.Missing"), &mut other),
        Err(CodecError::MissingClass(_))
    ));
}

#[test]
fn action_writers_resolve_input_and_output_by_action_path() {
    let tree = ops_tree();
    let action = [o("device"), o("restart")];

    let mut input = NormalizedNodeResult::new();
    {
        let mut writer = tree
            .new_action_input_writer(&action, &mut input)
            .expect("restart input writer");
        write_one_leaf(&mut writer, "o.RestartInput", "delay", BindingValue::from(5));
    }
    let input = input.into_result().expect("complete restart input");
    assert_eq!(input.name(), o("input"));
    assert_eq!(**child(&input, o("delay")), NormalizedNode::leaf(o("delay"), 5));

    let mut output = NormalizedNodeResult::new();
    {
        let mut writer = tree
            .new_action_output_writer(&action, &mut output)
            .expect("restart output writer");
        write_one_leaf(&mut writer, "o.RestartOutput", "done", BindingValue::from(true));
    }
    let output = output.into_result().expect("complete restart output");
    assert_eq!(**child(&output, o("done")), NormalizedNode::leaf(o("done"), true));
}

#[test]
fn action_writers_reject_rpcs_and_unknown_actions() {
    let tree = ops_tree();
    let mut result = NormalizedNodeResult::new();
    assert!(matches!(
        tree.new_action_input_writer(&[o("ping")], &mut result),
        Err(CodecError::InvalidArgument(_))
    ));
    assert!(matches!(
        tree.new_action_output_writer(&[o("device"), o("reboot")], &mut result),
        Err(CodecError::MissingClass(_))
    ));
    assert!(matches!(
        tree.new_action_input_writer(&[], &mut result),
        Err(CodecError::MalformedPath(_))
    ));
}
