//! Integration tests for schema resolution planning.

use serde_json::json;

use flightplan::{
    parse_schema, resolve, Action, ActionKind, ActionRef, AvroSchema, AvroValue, EnumSchema,
    ErrorKind, FieldSchema, FixedSchema, RecordSchema, ResolutionPlan,
};

fn field(name: &str, schema: AvroSchema) -> FieldSchema {
    FieldSchema::new(name, schema)
}

fn record(name: &str, fields: Vec<FieldSchema>) -> AvroSchema {
    AvroSchema::Record(RecordSchema::new(name, fields))
}

/// Follow a plan ref, panicking with context if absent.
fn action(plan: &ResolutionPlan, aref: ActionRef) -> &Action {
    plan.action(aref)
}

// ============================================================================
// Identity resolutions
// ============================================================================

#[test]
fn identity_primitives_do_nothing() {
    for schema in [
        AvroSchema::Null,
        AvroSchema::Boolean,
        AvroSchema::Int,
        AvroSchema::Long,
        AvroSchema::Float,
        AvroSchema::Double,
        AvroSchema::Bytes,
        AvroSchema::String,
    ] {
        let plan = resolve(&schema, &schema).unwrap();
        assert!(
            matches!(plan.root().kind, ActionKind::DoNothing),
            "identity resolution of {:?} should do nothing",
            schema
        );
    }
}

#[test]
fn identity_fixed_does_nothing() {
    let schema = AvroSchema::Fixed(FixedSchema::new("MD5", 16));
    let plan = resolve(&schema, &schema).unwrap();
    assert!(matches!(plan.root().kind, ActionKind::DoNothing));
}

#[test]
fn identity_array_of_primitives() {
    let schema = AvroSchema::Array(Box::new(AvroSchema::Double));
    let plan = resolve(&schema, &schema).unwrap();
    match plan.root().kind {
        ActionKind::Container { element } => {
            assert!(matches!(action(&plan, element).kind, ActionKind::DoNothing));
        }
        ref other => panic!("Expected container, got {:?}", other),
    }
}

#[test]
fn identity_map_of_primitives() {
    let schema = AvroSchema::Map(Box::new(AvroSchema::String));
    let plan = resolve(&schema, &schema).unwrap();
    match plan.root().kind {
        ActionKind::Container { element } => {
            assert!(matches!(action(&plan, element).kind, ActionKind::DoNothing));
        }
        ref other => panic!("Expected container, got {:?}", other),
    }
}

#[test]
fn identity_record_is_identity_mapping() {
    let schema = record(
        "User",
        vec![
            field("id", AvroSchema::Long),
            field("name", AvroSchema::String),
            field("score", AvroSchema::Double),
        ],
    );
    let plan = resolve(&schema, &schema).unwrap();
    match &plan.root().kind {
        ActionKind::RecordAdjust(adjust) => {
            assert_eq!(adjust.reader_order, vec![0, 1, 2]);
            assert!(adjust.no_reorder());
            assert_eq!(adjust.first_default, 3);
            assert!(adjust.defaults.is_empty());
            for fa in &adjust.field_actions {
                assert!(matches!(action(&plan, *fa).kind, ActionKind::DoNothing));
            }
        }
        other => panic!("Expected record adjust, got {:?}", other),
    }
}

#[test]
fn identity_enum_needs_no_adjustments() {
    let schema = AvroSchema::Enum(EnumSchema::new(
        "Suit",
        vec!["S".into(), "H".into(), "D".into(), "C".into()],
    ));
    let plan = resolve(&schema, &schema).unwrap();
    match &plan.root().kind {
        ActionKind::EnumAdjust(adjust) => {
            assert_eq!(
                adjust.adjustments,
                vec![Some(0), Some(1), Some(2), Some(3)]
            );
            assert!(adjust.no_adjustments_needed);
        }
        other => panic!("Expected enum adjust, got {:?}", other),
    }
}

// ============================================================================
// Promotion matrix
// ============================================================================

#[test]
fn promotion_matrix_is_exactly_the_table() {
    let primitives = [
        AvroSchema::Null,
        AvroSchema::Boolean,
        AvroSchema::Int,
        AvroSchema::Long,
        AvroSchema::Float,
        AvroSchema::Double,
        AvroSchema::Bytes,
        AvroSchema::String,
    ];
    let promotable = [
        (AvroSchema::Int, AvroSchema::Long),
        (AvroSchema::Int, AvroSchema::Float),
        (AvroSchema::Int, AvroSchema::Double),
        (AvroSchema::Long, AvroSchema::Float),
        (AvroSchema::Long, AvroSchema::Double),
        (AvroSchema::Float, AvroSchema::Double),
        (AvroSchema::String, AvroSchema::Bytes),
        (AvroSchema::Bytes, AvroSchema::String),
    ];

    for writer in &primitives {
        for reader in &primitives {
            if writer == reader {
                continue;
            }
            let plan = resolve(writer, reader).unwrap();
            let expected_promote = promotable
                .iter()
                .any(|(w, r)| w == writer && r == reader);
            match (&plan.root().kind, expected_promote) {
                (ActionKind::Promote, true) => {}
                (ActionKind::Error(ErrorKind::IncompatibleSchemaTypes), false) => {}
                (other, _) => panic!(
                    "resolving {:?} -> {:?} produced {:?}, expected promote={}",
                    writer, reader, other, expected_promote
                ),
            }
        }
    }
}

// ============================================================================
// Recursive schemas
// ============================================================================

#[test]
fn recursive_record_through_union_terminates_and_ties_the_knot() {
    let schema = parse_schema(
        r#"{
            "type": "record",
            "name": "LinkedList",
            "fields": [
                {"name": "value", "type": "int"},
                {"name": "next", "type": ["null", "LinkedList"]}
            ]
        }"#,
    )
    .unwrap();

    let plan = resolve(&schema, &schema).unwrap();

    let adjust = match &plan.root().kind {
        ActionKind::RecordAdjust(adjust) => adjust,
        other => panic!("Expected record adjust, got {:?}", other),
    };
    // next's action is a writer union; its second branch must be the root
    // record's own slot, not a fresh expansion.
    match &action(&plan, adjust.field_actions[1]).kind {
        ActionKind::WriterUnion { branch_actions, .. } => {
            assert_eq!(branch_actions[1], plan.root_ref());
        }
        other => panic!("Expected writer union, got {:?}", other),
    }
    assert!(!plan.has_errors());
}

#[test]
fn recursive_record_through_array_terminates_and_ties_the_knot() {
    let schema = parse_schema(
        r#"{
            "type": "record",
            "name": "Tree",
            "fields": [
                {"name": "label", "type": "string"},
                {"name": "children", "type": {"type": "array", "items": "Tree"}}
            ]
        }"#,
    )
    .unwrap();

    let plan = resolve(&schema, &schema).unwrap();
    let adjust = match &plan.root().kind {
        ActionKind::RecordAdjust(adjust) => adjust,
        other => panic!("Expected record adjust, got {:?}", other),
    };
    match action(&plan, adjust.field_actions[1]).kind {
        ActionKind::Container { element } => assert_eq!(element, plan.root_ref()),
        ref other => panic!("Expected container, got {:?}", other),
    }
}

// ============================================================================
// Record realignment
// ============================================================================

#[test]
fn field_realignment_with_skip_and_default() {
    let writer = record(
        "R",
        vec![
            field("a", AvroSchema::Int),
            field("b", AvroSchema::String),
            field("c", AvroSchema::Long),
        ],
    );
    let reader = record(
        "R",
        vec![
            field("c", AvroSchema::Long),
            field("a", AvroSchema::Int),
            field("d", AvroSchema::Int).with_default(json!(5)),
        ],
    );

    let plan = resolve(&writer, &reader).unwrap();
    let adjust = match &plan.root().kind {
        ActionKind::RecordAdjust(adjust) => adjust,
        other => panic!("Expected record adjust, got {:?}", other),
    };

    // Matched fields fill in writer order (a, then c), then defaults.
    assert_eq!(adjust.reader_order, vec![1, 0, 2]);
    assert_eq!(adjust.first_default, 2);
    assert_eq!(adjust.defaults, vec![AvroValue::Int(5)]);
    assert!(!adjust.no_reorder());

    // a -> a, b -> skip, c -> c
    assert!(matches!(
        action(&plan, adjust.field_actions[0]).kind,
        ActionKind::DoNothing
    ));
    let skip = action(&plan, adjust.field_actions[1]);
    assert!(matches!(skip.kind, ActionKind::Skip));
    assert_eq!(skip.writer, AvroSchema::String);
    assert!(skip.reader.is_none());
    assert!(matches!(
        action(&plan, adjust.field_actions[2]).kind,
        ActionKind::DoNothing
    ));
}

#[test]
fn missing_required_field_fails_the_whole_record() {
    let writer = record("R", vec![field("a", AvroSchema::Int)]);
    let reader = record(
        "R",
        vec![
            field("a", AvroSchema::Int),
            field("b", AvroSchema::String),
        ],
    );

    let plan = resolve(&writer, &reader).unwrap();
    let root = plan.root();
    assert!(matches!(
        root.kind,
        ActionKind::Error(ErrorKind::MissingRequiredField)
    ));
    let message = root.error_description().unwrap();
    assert!(message.contains('b'), "message should name field: {}", message);
}

#[test]
fn missing_required_field_overwrites_recursive_slot() {
    // The recursive reference is materialized before the missing field is
    // discovered; the error must win anyway.
    let writer = parse_schema(
        r#"{
            "type": "record",
            "name": "Node",
            "fields": [
                {"name": "next", "type": ["null", "Node"]}
            ]
        }"#,
    )
    .unwrap();
    let reader = parse_schema(
        r#"{
            "type": "record",
            "name": "Node",
            "fields": [
                {"name": "next", "type": ["null", "Node"]},
                {"name": "extra", "type": "string"}
            ]
        }"#,
    )
    .unwrap();

    let plan = resolve(&writer, &reader).unwrap();
    assert!(matches!(
        plan.root().kind,
        ActionKind::Error(ErrorKind::MissingRequiredField)
    ));
}

#[test]
fn record_names_are_not_compared() {
    let writer = record("WriterSide", vec![field("x", AvroSchema::Int)]);
    let reader = record("ReaderSide", vec![field("x", AvroSchema::Int)]);
    let plan = resolve(&writer, &reader).unwrap();
    assert!(matches!(plan.root().kind, ActionKind::RecordAdjust(_)));
}

#[test]
fn nested_field_mismatch_is_lazy() {
    // The mismatch sits inside one field; the record still resolves and
    // only that field's action is an error.
    let writer = record(
        "R",
        vec![
            field("good", AvroSchema::Int),
            field("bad", AvroSchema::Int),
        ],
    );
    let reader = record(
        "R",
        vec![
            field("good", AvroSchema::Int),
            field("bad", AvroSchema::Boolean),
        ],
    );
    let plan = resolve(&writer, &reader).unwrap();
    let adjust = match &plan.root().kind {
        ActionKind::RecordAdjust(adjust) => adjust,
        other => panic!("Expected record adjust, got {:?}", other),
    };
    assert!(matches!(
        action(&plan, adjust.field_actions[0]).kind,
        ActionKind::DoNothing
    ));
    assert!(action(&plan, adjust.field_actions[1]).is_error());
    assert!(plan.has_errors());
}

// ============================================================================
// Enums
// ============================================================================

#[test]
fn enum_remap_with_default_fallback() {
    let writer = AvroSchema::Enum(EnumSchema::new(
        "E",
        vec!["A".into(), "B".into(), "C".into()],
    ));
    let reader =
        AvroSchema::Enum(EnumSchema::new("E", vec!["C".into(), "A".into()]).with_default("A"));

    let plan = resolve(&writer, &reader).unwrap();
    match &plan.root().kind {
        ActionKind::EnumAdjust(adjust) => {
            assert_eq!(adjust.adjustments, vec![Some(1), Some(1), Some(0)]);
            assert!(!adjust.no_adjustments_needed);
        }
        other => panic!("Expected enum adjust, got {:?}", other),
    }
}

#[test]
fn enum_name_mismatch_is_deferred_error() {
    let writer = AvroSchema::Enum(EnumSchema::new("Colors", vec!["A".into()]));
    let reader = AvroSchema::Enum(EnumSchema::new("Suits", vec!["A".into()]));
    let plan = resolve(&writer, &reader).unwrap();
    let root = plan.root();
    assert!(matches!(
        root.kind,
        ActionKind::Error(ErrorKind::NamesDontMatch)
    ));
    let message = root.error_description().unwrap();
    assert!(message.contains("Colors") && message.contains("Suits"));
}

// ============================================================================
// Unions
// ============================================================================

#[test]
fn equivalent_unions_resolve_positionally() {
    let schema = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Int, AvroSchema::String]);
    let plan = resolve(&schema, &schema).unwrap();
    match &plan.root().kind {
        ActionKind::WriterUnion {
            branch_actions,
            union_equivalent,
        } => {
            assert!(*union_equivalent);
            assert_eq!(branch_actions.len(), 3);
            for ba in branch_actions {
                assert!(matches!(action(&plan, *ba).kind, ActionKind::DoNothing));
            }
        }
        other => panic!("Expected writer union, got {:?}", other),
    }
}

#[test]
fn writer_union_against_non_union_reader() {
    let writer = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Int]);
    let reader = AvroSchema::Int;
    let plan = resolve(&writer, &reader).unwrap();
    match &plan.root().kind {
        ActionKind::WriterUnion {
            branch_actions,
            union_equivalent,
        } => {
            assert!(!*union_equivalent);
            // null -> int cannot resolve; int -> int can. The error stays
            // latent unless the data actually contains the null branch.
            assert!(action(&plan, branch_actions[0]).is_error());
            assert!(matches!(
                action(&plan, branch_actions[1]).kind,
                ActionKind::DoNothing
            ));
        }
        other => panic!("Expected writer union, got {:?}", other),
    }
}

#[test]
fn writer_union_against_different_union_produces_reader_unions() {
    let writer = AvroSchema::Union(vec![AvroSchema::Int, AvroSchema::String]);
    let reader = AvroSchema::Union(vec![AvroSchema::String, AvroSchema::Long]);
    let plan = resolve(&writer, &reader).unwrap();
    match &plan.root().kind {
        ActionKind::WriterUnion {
            branch_actions,
            union_equivalent,
        } => {
            assert!(!*union_equivalent);
            // int matches long by promotion (branch 1), string exactly (branch 0)
            match action(&plan, branch_actions[0]).kind {
                ActionKind::ReaderUnion { first_match, .. } => assert_eq!(first_match, 1),
                ref other => panic!("Expected reader union, got {:?}", other),
            }
            match action(&plan, branch_actions[1]).kind {
                ActionKind::ReaderUnion { first_match, .. } => assert_eq!(first_match, 0),
                ref other => panic!("Expected reader union, got {:?}", other),
            }
        }
        other => panic!("Expected writer union, got {:?}", other),
    }
}

#[test]
fn reader_union_picks_first_exact_branch() {
    let writer = AvroSchema::Int;
    let reader = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Int]);
    let plan = resolve(&writer, &reader).unwrap();
    match plan.root().kind {
        ActionKind::ReaderUnion {
            first_match,
            actual,
        } => {
            assert_eq!(first_match, 1);
            assert!(matches!(action(&plan, actual).kind, ActionKind::DoNothing));
        }
        ref other => panic!("Expected reader union, got {:?}", other),
    }
}

#[test]
fn reader_union_falls_back_to_promotion() {
    let writer = AvroSchema::Int;
    let reader = AvroSchema::Union(vec![AvroSchema::Boolean, AvroSchema::Long]);
    let plan = resolve(&writer, &reader).unwrap();
    match plan.root().kind {
        ActionKind::ReaderUnion {
            first_match,
            actual,
        } => {
            assert_eq!(first_match, 1);
            assert!(matches!(action(&plan, actual).kind, ActionKind::Promote));
        }
        ref other => panic!("Expected reader union, got {:?}", other),
    }
}

#[test]
fn reader_union_without_match_is_deferred_error() {
    let writer = AvroSchema::Int;
    let reader = AvroSchema::Union(vec![AvroSchema::String, AvroSchema::Boolean]);
    let plan = resolve(&writer, &reader).unwrap();
    assert!(matches!(
        plan.root().kind,
        ActionKind::Error(ErrorKind::NoMatchingBranch)
    ));
}

#[test]
fn reader_union_prefers_exact_full_name_over_earlier_structural_match() {
    let writer = AvroSchema::Record(
        RecordSchema::new("R", vec![field("x", AvroSchema::Int)]).with_namespace("ns1"),
    );
    // Branch 0 matches structurally (and by short name); branch 1 matches
    // the full name exactly and must win.
    let reader = AvroSchema::Union(vec![
        AvroSchema::Record(
            RecordSchema::new("R", vec![field("x", AvroSchema::Int)]).with_namespace("ns2"),
        ),
        AvroSchema::Record(
            RecordSchema::new("R", vec![field("x", AvroSchema::Int)]).with_namespace("ns1"),
        ),
    ]);

    let plan = resolve(&writer, &reader).unwrap();
    match plan.root().kind {
        ActionKind::ReaderUnion { first_match, .. } => assert_eq!(first_match, 1),
        ref other => panic!("Expected reader union, got {:?}", other),
    }
}

#[test]
fn reader_union_soft_match_upgrades_to_short_name_candidate() {
    let writer = AvroSchema::Record(
        RecordSchema::new("R", vec![field("x", AvroSchema::Int)]).with_namespace("ns1"),
    );
    // No exact full-name hit. Branch 0 is the first structural candidate;
    // branch 1 also matches structurally and shares the writer's short
    // name, so it takes precedence.
    let reader = AvroSchema::Union(vec![
        AvroSchema::Record(RecordSchema::new(
            "Other",
            vec![field("x", AvroSchema::Int)],
        )),
        AvroSchema::Record(
            RecordSchema::new("R", vec![field("x", AvroSchema::Int)]).with_namespace("ns2"),
        ),
    ]);

    let plan = resolve(&writer, &reader).unwrap();
    match plan.root().kind {
        ActionKind::ReaderUnion { first_match, .. } => assert_eq!(first_match, 1),
        ref other => panic!("Expected reader union, got {:?}", other),
    }
}

#[test]
fn reader_union_structural_candidate_used_when_no_exact_hit() {
    let writer = AvroSchema::Record(
        RecordSchema::new("R", vec![field("x", AvroSchema::Int)]).with_namespace("ns1"),
    );
    let reader = AvroSchema::Union(vec![
        AvroSchema::Null,
        AvroSchema::Record(RecordSchema::new(
            "Different",
            vec![field("x", AvroSchema::Int)],
        )),
    ]);

    let plan = resolve(&writer, &reader).unwrap();
    match plan.root().kind {
        ActionKind::ReaderUnion { first_match, .. } => assert_eq!(first_match, 1),
        ref other => panic!("Expected reader union, got {:?}", other),
    }
}

#[test]
fn reader_union_record_with_field_error_is_not_a_structural_match() {
    let writer = AvroSchema::Record(RecordSchema::new(
        "R",
        vec![field("x", AvroSchema::Int)],
    ));
    // The only record branch requires a field the writer lacks, so phase 1
    // finds nothing and phase 2 has no promotion either.
    let reader = AvroSchema::Union(vec![AvroSchema::Record(RecordSchema::new(
        "S",
        vec![field("y", AvroSchema::Int)],
    ))]);

    let plan = resolve(&writer, &reader).unwrap();
    assert!(matches!(
        plan.root().kind,
        ActionKind::Error(ErrorKind::NoMatchingBranch)
    ));
}

// ============================================================================
// Aliases
// ============================================================================

#[test]
fn reader_field_alias_aligns_renamed_writer_field() {
    let writer = record("User", vec![field("user_id", AvroSchema::Long)]);
    let mut id_field = field("id", AvroSchema::Long);
    id_field.aliases = vec!["user_id".to_string()];
    let reader = record("User", vec![id_field]);

    let plan = resolve(&writer, &reader).unwrap();
    match &plan.root().kind {
        ActionKind::RecordAdjust(adjust) => {
            assert_eq!(adjust.reader_order, vec![0]);
            assert_eq!(adjust.first_default, 1);
            assert!(matches!(
                action(&plan, adjust.field_actions[0]).kind,
                ActionKind::DoNothing
            ));
        }
        other => panic!("Expected record adjust, got {:?}", other),
    }
}

#[test]
fn reader_type_alias_renames_writer_enum() {
    let writer = AvroSchema::Enum(EnumSchema::new("OldName", vec!["A".into()]));
    let mut reader_enum = EnumSchema::new("NewName", vec!["A".into()]);
    reader_enum.aliases = vec!["OldName".to_string()];
    let reader = AvroSchema::Enum(reader_enum);

    let plan = resolve(&writer, &reader).unwrap();
    assert!(matches!(plan.root().kind, ActionKind::EnumAdjust(_)));
}

// ============================================================================
// Logical types
// ============================================================================

#[test]
fn reader_logical_type_is_cached_on_action() {
    let writer = parse_schema(r#""int""#).unwrap();
    let reader = parse_schema(r#"{"type": "int", "logicalType": "date"}"#).unwrap();
    let plan = resolve(&writer, &reader).unwrap();
    let root = plan.root();
    assert!(matches!(root.kind, ActionKind::DoNothing));
    assert_eq!(
        root.logical_type,
        Some(flightplan::LogicalTypeName::Date)
    );
    // The stock provider registers no conversions.
    assert!(root.conversion.is_none());
}

#[test]
fn skip_actions_carry_no_reader_side_data() {
    let writer = record(
        "R",
        vec![
            field("keep", AvroSchema::Int),
            field("drop", AvroSchema::String),
        ],
    );
    let reader = record("R", vec![field("keep", AvroSchema::Int)]);
    let plan = resolve(&writer, &reader).unwrap();
    let adjust = match &plan.root().kind {
        ActionKind::RecordAdjust(adjust) => adjust,
        other => panic!("Expected record adjust, got {:?}", other),
    };
    let skip = action(&plan, adjust.field_actions[1]);
    assert!(matches!(skip.kind, ActionKind::Skip));
    assert!(skip.reader.is_none());
    assert!(skip.logical_type.is_none());
    assert!(skip.conversion.is_none());
}

// ============================================================================
// Round trips and plan properties
// ============================================================================

#[test]
fn self_resolution_never_contains_errors() {
    let schemas = [
        r#""int""#,
        r#"{"type": "array", "items": "string"}"#,
        r#"{"type": "map", "values": ["null", "long"]}"#,
        r#"{"type": "fixed", "name": "Hash", "size": 32}"#,
        r#"{"type": "enum", "name": "E", "symbols": ["A", "B"]}"#,
        r#"{
            "type": "record",
            "name": "Everything",
            "fields": [
                {"name": "id", "type": "long"},
                {"name": "tags", "type": {"type": "array", "items": "string"}},
                {"name": "props", "type": {"type": "map", "values": "int"}},
                {"name": "choice", "type": ["null", "string", "double"]},
                {"name": "nested", "type": {
                    "type": "record",
                    "name": "Inner",
                    "fields": [{"name": "x", "type": "int"}]
                }},
                {"name": "more", "type": "Inner"}
            ]
        }"#,
        r#"{
            "type": "record",
            "name": "Recursive",
            "fields": [
                {"name": "child", "type": ["null", "Recursive"]}
            ]
        }"#,
    ];

    for text in schemas {
        let schema = parse_schema(text).unwrap();
        let plan = resolve(&schema, &schema).unwrap();
        assert!(!plan.has_errors(), "self-resolution errored for {}", text);
    }
}

#[test]
fn plans_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResolutionPlan>();
}

#[test]
fn error_description_names_both_schemas() {
    let writer = AvroSchema::Fixed(FixedSchema::new("A", 4).with_namespace("ns"));
    let reader = AvroSchema::Fixed(FixedSchema::new("B", 4).with_namespace("ns"));
    let plan = resolve(&writer, &reader).unwrap();
    let message = plan.root().error_description().unwrap();
    assert!(message.contains("ns.A"), "message: {}", message);
    assert!(message.contains("ns.B"), "message: {}", message);
}
