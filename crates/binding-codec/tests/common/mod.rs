//! Shared fixture: a small schema, its object types and a codec tree.
//!
//! ```text
//! module test {
//!   container top {
//!     leaf name { type string; default "unnamed"; }
//!     leaf count { type int32; }
//!     leaf level { type enumeration { enum low; enum high; } default low; }
//!     leaf flags { type bits { bit read; bit write; } }
//!     leaf mixed { type union { type int32; type string; } }
//!     leaf kind { type identityref { base base-kind; } }
//!     leaf ref { type instance-identifier; }
//!     leaf-list tags { type string; ordered-by user; }
//!     anydata extra;
//!     container settings { leaf enabled { type boolean; default true; } }
//!     container session { presence; leaf id { type string; mandatory true; } }
//!     list entry { key "zeta alpha"; leaf zeta; leaf alpha; leaf note; }
//!     list item { leaf text; }
//!     choice shape {
//!       case square { leaf side; container style { leaf color; } }
//!       case circle { leaf radius; }
//!     }
//!   }
//!   choice mode { case auto { container schedule { leaf cron; } } }
//!   notification alarm { leaf severity; }
//!   rpc reset { input { leaf force; } output { leaf ok; } }
//! }
//! module aug { augment /top { leaf label; container audit { leaf by; } } }
//! module paint { augment /top { leaf color; } }
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use binding_codec::binding::{ObjectKind, ObjectType, TypeName};
use binding_codec::{
    BindingCodecTree, BindingPath, BindingRuntimeContext, BindingValue, BitsValue, CodecOptions,
    DataObject, EnumValue, InstanceIdentifier, ObjectValue, UnionValue,
};
use yang_data::{
    Module, NormalizedNode, PathArgument, QName, QNameModule, SchemaContext, SchemaNode,
    TypeDefinition,
};

pub const TEST_NS: &str = "urn:example:test";
pub const AUG_NS: &str = "urn:example:aug";
pub const PAINT_NS: &str = "urn:example:paint";

pub fn t(name: &str) -> QName {
    QName::new(TEST_NS, name)
}

pub fn a(name: &str) -> QName {
    QName::new(AUG_NS, name)
}

pub fn p(name: &str) -> QName {
    QName::new(PAINT_NS, name)
}

pub fn test_module() -> Module {
    let ns = QNameModule::new(TEST_NS);
    let top = SchemaNode::container(t("top"))
        .child(SchemaNode::leaf(t("name"), TypeDefinition::string()).default_value("unnamed"))
        .child(SchemaNode::leaf(t("count"), TypeDefinition::int32()))
        .child(
            SchemaNode::leaf(t("level"), TypeDefinition::enumeration([("low", 0), ("high", 1)]))
                .default_value("low"),
        )
        .child(SchemaNode::leaf(
            t("flags"),
            TypeDefinition::bits([("read", 0), ("write", 1)]),
        ))
        .child(SchemaNode::leaf(
            t("mixed"),
            TypeDefinition::union([TypeDefinition::int32(), TypeDefinition::string()]),
        ))
        .child(SchemaNode::leaf(t("kind"), TypeDefinition::identityref(t("base-kind"))))
        .child(SchemaNode::leaf(t("ref"), TypeDefinition::instance_identifier()))
        .child(SchemaNode::leaf_list(t("tags"), TypeDefinition::string()).ordered())
        .child(SchemaNode::anydata(t("extra")))
        .child(
            SchemaNode::container(t("settings")).child(
                SchemaNode::leaf(t("enabled"), TypeDefinition::boolean()).default_value("true"),
            ),
        )
        .child(
            SchemaNode::presence_container(t("session"))
                .child(SchemaNode::leaf(t("id"), TypeDefinition::string()).mandatory()),
        )
        .child(
            SchemaNode::list(t("entry"), [t("zeta"), t("alpha")])
                .child(SchemaNode::leaf(t("zeta"), TypeDefinition::string()))
                .child(SchemaNode::leaf(t("alpha"), TypeDefinition::int32()))
                .child(SchemaNode::leaf(t("note"), TypeDefinition::string())),
        )
        .child(
            SchemaNode::list(t("item"), Vec::<QName>::new())
                .child(SchemaNode::leaf(t("text"), TypeDefinition::string())),
        )
        .child(
            SchemaNode::choice(t("shape"))
                .child(
                    SchemaNode::case(t("square"))
                        .child(SchemaNode::leaf(t("side"), TypeDefinition::int32()))
                        .child(
                            SchemaNode::container(t("style"))
                                .child(SchemaNode::leaf(t("color"), TypeDefinition::string())),
                        ),
                )
                .child(
                    SchemaNode::case(t("circle"))
                        .child(SchemaNode::leaf(t("radius"), TypeDefinition::int32())),
                ),
        );
    let mode = SchemaNode::choice(t("mode")).child(
        SchemaNode::case(t("auto")).child(
            SchemaNode::container(t("schedule"))
                .child(SchemaNode::leaf(t("cron"), TypeDefinition::string())),
        ),
    );
    let reset = t("reset");
    let rpc = SchemaNode::rpc(reset.clone())
        .child(
            SchemaNode::input(&reset)
                .child(SchemaNode::leaf(t("force"), TypeDefinition::boolean())),
        )
        .child(
            SchemaNode::output(&reset).child(SchemaNode::leaf(t("ok"), TypeDefinition::boolean())),
        );
    Module::builder("test", ns)
        .child(top)
        .child(mode)
        .child(
            SchemaNode::notification(t("alarm"))
                .child(SchemaNode::leaf(t("severity"), TypeDefinition::int32())),
        )
        .child(rpc)
        .identity(t("base-kind"), Vec::new())
        .identity(t("fast"), [t("base-kind")])
        .identity(t("slow"), [t("base-kind")])
        .identity(t("other"), Vec::new())
        .build()
}

pub fn aug_module() -> Module {
    Module::builder("aug", QNameModule::new(AUG_NS))
        .augment(
            [t("top")],
            [
                SchemaNode::leaf(a("label"), TypeDefinition::string()).build(),
                SchemaNode::container(a("audit"))
                    .child(SchemaNode::leaf(a("by"), TypeDefinition::string()))
                    .build(),
            ],
        )
        .build()
}

pub fn paint_module() -> Module {
    Module::builder("paint", QNameModule::new(PAINT_NS))
        .augment([t("top")], [SchemaNode::leaf(p("color"), TypeDefinition::string()).build()])
        .build()
}

pub fn schema() -> SchemaContext {
    SchemaContext::new([test_module(), aug_module(), paint_module()])
        .expect("fixture schema must assemble")
}

pub fn object_types() -> Vec<ObjectType> {
    vec![
        ObjectType::builder("t.Top", ObjectKind::Container)
            .schema_path([t("top")])
            .leaf("name")
            .leaf("count")
            .leaf("level")
            .leaf("flags")
            .leaf("mixed")
            .leaf("kind")
            .leaf("ref")
            .leaf_list("tags")
            .anydata("extra")
            .container("settings", "t.Settings")
            .container("session", "t.Session")
            .list("entry", "t.Entry")
            .list("item", "t.Item")
            .choice("shape", "t.Shape")
            .augmentable()
            .build(),
        ObjectType::builder("t.Settings", ObjectKind::Container)
            .schema_path([t("top"), t("settings")])
            .leaf("enabled")
            .build(),
        ObjectType::builder("t.Session", ObjectKind::Container)
            .schema_path([t("top"), t("session")])
            .leaf("id")
            .build(),
        ObjectType::builder("t.Entry", ObjectKind::ListEntry)
            .schema_path([t("top"), t("entry")])
            .leaf("zeta")
            .leaf("alpha")
            .leaf("note")
            .key("t.EntryKey", ["zeta", "alpha"])
            .build(),
        ObjectType::builder("t.Item", ObjectKind::ListEntry)
            .schema_path([t("top"), t("item")])
            .leaf("text")
            .build(),
        ObjectType::builder("t.Shape", ObjectKind::Choice)
            .schema_path([t("top"), t("shape")])
            .build(),
        ObjectType::builder("t.Square", ObjectKind::Case { choice: "t.Shape".into() })
            .schema_path([t("top"), t("shape"), t("square")])
            .leaf("side")
            .container("style", "t.Style")
            .build(),
        ObjectType::builder("t.Style", ObjectKind::Container)
            .schema_path([t("top"), t("shape"), t("square"), t("style")])
            .leaf("color")
            .build(),
        ObjectType::builder("t.Circle", ObjectKind::Case { choice: "t.Shape".into() })
            .schema_path([t("top"), t("shape"), t("circle")])
            .leaf("radius")
            .build(),
        ObjectType::builder("t.Mode", ObjectKind::Choice)
            .schema_path([t("mode")])
            .build(),
        ObjectType::builder("t.Auto", ObjectKind::Case { choice: "t.Mode".into() })
            .schema_path([t("mode"), t("auto")])
            .container("schedule", "t.Schedule")
            .build(),
        ObjectType::builder("t.Schedule", ObjectKind::Container)
            .schema_path([t("mode"), t("auto"), t("schedule")])
            .leaf("cron")
            .build(),
        ObjectType::builder("t.Alarm", ObjectKind::Notification)
            .schema_path([t("alarm")])
            .leaf("severity")
            .build(),
        ObjectType::builder("t.ResetInput", ObjectKind::Input)
            .schema_path([t("reset"), t("input")])
            .leaf("force")
            .build(),
        ObjectType::builder("t.ResetOutput", ObjectKind::Output)
            .schema_path([t("reset"), t("output")])
            .leaf("ok")
            .build(),
        ObjectType::builder("a.TopAug", ObjectKind::Augmentation { target: "t.Top".into() })
            .augment_of(QNameModule::new(AUG_NS), 0)
            .leaf("label")
            .container("audit", "a.Audit")
            .build(),
        ObjectType::builder("a.Audit", ObjectKind::Container)
            .schema_path([t("top"), a("audit")])
            .leaf("by")
            .build(),
        ObjectType::builder("p.TopPaint", ObjectKind::Augmentation { target: "t.Top".into() })
            .augment_of(QNameModule::new(PAINT_NS), 0)
            .leaf("color")
            .build(),
    ]
}

pub fn runtime() -> Arc<BindingRuntimeContext> {
    BindingRuntimeContext::builder(schema())
        .object_types(object_types())
        .identity(t("base-kind"), "t.BaseKind")
        .identity(t("fast"), "t.Fast")
        .identity(t("slow"), "t.Slow")
        .identity(t("other"), "t.Other")
        .build()
}

pub fn tree() -> BindingCodecTree {
    BindingCodecTree::new(runtime())
}

pub fn tree_with(options: CodecOptions) -> BindingCodecTree {
    BindingCodecTree::with_options(runtime(), options)
}

pub fn ty(tree: &BindingCodecTree, name: &str) -> ObjectType {
    tree.runtime()
        .load_type(&TypeName::new(name))
        .expect("fixture type must exist")
}

pub fn top_path() -> InstanceIdentifier {
    InstanceIdentifier::default().child("t.Top")
}

/// A `top` object setting every property that has a schema default, so that
/// it compares equal to its decoded form.
pub fn sample_top(tree: &BindingCodecTree) -> Arc<dyn DataObject> {
    let entry = ty(tree, "t.Entry");
    let entries: Vec<Arc<dyn DataObject>> = vec![
        ObjectValue::builder(&entry)
            .set("zeta", "z")
            .set("alpha", 1)
            .set("note", "first")
            .build()
            .expect("entry z/1"),
        ObjectValue::builder(&entry)
            .set("zeta", "y")
            .set("alpha", 2)
            .set("note", "second")
            .build()
            .expect("entry y/2"),
    ];
    let item = ty(tree, "t.Item");
    let items: Vec<Arc<dyn DataObject>> = vec![
        ObjectValue::builder(&item).set("text", "one").build().expect("item one"),
        ObjectValue::builder(&item).set("text", "two").build().expect("item two"),
    ];
    let settings = ObjectValue::builder(&ty(tree, "t.Settings"))
        .set("enabled", false)
        .build()
        .expect("settings");
    let circle = ObjectValue::builder(&ty(tree, "t.Circle"))
        .set("radius", 3)
        .build()
        .expect("circle");
    let label = ObjectValue::builder(&ty(tree, "a.TopAug"))
        .set("label", "tagged")
        .build()
        .expect("aug augmentation");
    let paint = ObjectValue::builder(&ty(tree, "p.TopPaint"))
        .set("color", "blue")
        .build()
        .expect("paint augmentation");
    let fast = tree
        .identity_codec()
        .to_binding(&t("fast"))
        .expect("fast identity");

    ObjectValue::builder(&ty(tree, "t.Top"))
        .set("name", "main")
        .set("count", 7)
        .set(
            "level",
            EnumValue {
                name: "high".into(),
                value: 1,
            },
        )
        .set("flags", BitsValue::new([0, 1]))
        .set("mixed", UnionValue::new("int32", 5))
        .set("kind", fast)
        .set("ref", BindingPath::from(top_path().child("t.Settings")))
        .set(
            "tags",
            BindingValue::LeafList(vec![BindingValue::from("red"), BindingValue::from("green")]),
        )
        .set("extra", BindingValue::Opaque(serde_json::json!({ "note": "opaque" })))
        .set("settings", settings)
        .set("entry", entries)
        .set("item", items)
        .set("shape", circle)
        .augmentation(label)
        .augmentation(paint)
        .build()
        .expect("top")
}

/// Child `name` of a data container node.
pub fn child(node: &NormalizedNode, name: QName) -> &Arc<NormalizedNode> {
    node.as_data_container()
        .expect("node must be a data container")
        .child(&PathArgument::node(name))
        .expect("child must be present")
}
