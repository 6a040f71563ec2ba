//! Tests for structural field operations: add, delete, duplicate, move, reparent.
mod common;
use common::*;
use formflow::error::CommandError;
use formflow::hierarchy::{HierarchyOperations, orders_contiguous, renumber};
use formflow::prelude::*;
use formflow::schema::AncestorWalk;

fn ops_fixture() -> (StandardFieldTypes, EditorConfig) {
    (StandardFieldTypes::new(), EditorConfig::default())
}

#[test]
fn test_add_field_appends_with_generated_id() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_flat_module();

    let edit = ops.add_field(&module, "text", None).unwrap();
    assert_eq!(edit.field_id, "text_1");

    let added = edit.module.field("text_1").unwrap();
    assert_eq!(added.order, 4);
    assert_eq!(added.label, "Text");
    assert!(added.parent_id.is_none());
    assert!(orders_contiguous(&edit.module));

    // The input module is untouched.
    assert_eq!(module.fields.len(), 3);
}

#[test]
fn test_add_field_skips_taken_ids() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = Module::new("m", "M").with_fields(vec![Field::new("text_1", "text", 1)]);

    let edit = ops.add_field(&module, "text", None).unwrap();
    assert_eq!(edit.field_id, "text_2");
}

#[test]
fn test_add_field_under_parent_and_custom_separator() {
    let registry = StandardFieldTypes::new();
    let config = EditorConfig::default().with_id_separator("-");
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_nested_module();

    let edit = ops.add_field(&module, "dropdown", Some("b")).unwrap();
    assert_eq!(edit.field_id, "dropdown-1");
    assert_eq!(child_ids(&edit.module, Some("b")), vec!["c", "dropdown-1"]);
}

#[test]
fn test_add_field_rejects_unknown_type_and_missing_parent() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_flat_module();

    assert!(matches!(
        ops.add_field(&module, "hologram", None),
        Err(CommandError::UnknownFieldType(t)) if t == "hologram"
    ));
    assert!(matches!(
        ops.add_field(&module, "text", Some("ghost")),
        Err(CommandError::ParentNotFound { parent_id, .. }) if parent_id == "ghost"
    ));
}

#[test]
fn test_delete_cascades_to_descendants() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_nested_module();

    let removal = ops.delete_field(&module, "a").unwrap();
    assert_eq!(removal.removed, vec!["a", "b", "c"]);
    assert_eq!(ids(&removal.module), vec!["d"]);
    // `d` was second at the root and is renumbered to first.
    assert_eq!(removal.module.field("d").unwrap().order, 1);
}

#[test]
fn test_delete_missing_field_is_rejected() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);

    let result = ops.delete_field(&create_flat_module(), "nope");
    assert_eq!(result.unwrap_err(), CommandError::FieldNotFound("nope".to_string()));
}

#[test]
fn test_duplicate_inserts_after_original() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_flat_module();

    let edit = ops.duplicate_field(&module, "x").unwrap();
    assert_eq!(child_ids(&edit.module, None), vec!["x", edit.field_id.as_str(), "y", "z"]);

    let copy = edit.module.field(&edit.field_id).unwrap();
    assert_eq!(copy.label, "Copy of X");
    assert_eq!(copy.field_type, "text");
    assert!(orders_contiguous(&edit.module));
}

#[test]
fn test_move_field_swaps_with_neighbour() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_flat_module();

    let moved = ops.move_field(&module, "y", Direction::Up).unwrap();
    assert_eq!(child_ids(&moved, None), vec!["y", "x", "z"]);

    let moved = ops.move_field(&moved, "y", Direction::Down).unwrap();
    assert_eq!(child_ids(&moved, None), vec!["x", "y", "z"]);
}

#[test]
fn test_move_field_at_boundary_is_rejected() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_flat_module();

    let err = ops.move_field(&module, "x", Direction::Up).unwrap_err();
    assert!(matches!(err, CommandError::AlreadyAtBoundary { .. }));
    assert_eq!(err.level(), NoticeLevel::Info);

    assert!(ops.move_field(&module, "z", Direction::Down).is_err());
}

#[test]
fn test_change_parent_appends_to_new_group() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_nested_module();

    let moved = ops.change_field_parent(&module, "d", Some("b")).unwrap();
    let d = moved.field("d").unwrap();
    assert_eq!(d.parent_id.as_deref(), Some("b"));
    assert_eq!(d.order, 2);
    assert_eq!(child_ids(&moved, None), vec!["a"]);
    assert!(orders_contiguous(&moved));

    let back = ops.change_field_parent(&moved, "d", None).unwrap();
    assert_eq!(child_ids(&back, None), vec!["a", "d"]);
}

#[test]
fn test_change_parent_rejects_self_and_cycles() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_nested_module();

    assert_eq!(
        ops.change_field_parent(&module, "a", Some("a")).unwrap_err(),
        CommandError::SelfParent("a".to_string())
    );

    // `c` is a descendant of `a`; making it a's parent would close a loop.
    let err = ops.change_field_parent(&module, "a", Some("c")).unwrap_err();
    assert!(matches!(err, CommandError::CyclicParent { .. }));
    assert_eq!(err.level(), NoticeLevel::Error);

    assert!(matches!(
        ops.change_field_parent(&module, "a", Some("ghost")),
        Err(CommandError::ParentNotFound { .. })
    ));
}

#[test]
fn test_update_field_replaces_only_patched_properties() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_flat_module();

    let patch = FieldPatch {
        label: Some("Full name".to_string()),
        ..Default::default()
    };
    let updated = ops.update_field(&module, "x", &patch).unwrap();
    let x = updated.field("x").unwrap();
    assert_eq!(x.label, "Full name");
    assert_eq!(x.order, 1);
    assert_eq!(x.field_type, "text");

    assert!(ops.update_field(&module, "nope", &patch).is_err());
}

#[test]
fn test_insert_subtree_remaps_ids_and_parents() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = create_nested_module();

    let subtree: Vec<Field> = module
        .subtree_ids("a")
        .iter()
        .filter_map(|id| module.field(id).cloned())
        .collect();
    let edit = ops.insert_subtree(&module, &subtree, None).unwrap();

    assert_eq!(edit.module.fields.len(), 7);
    let root = edit.module.field(&edit.field_id).unwrap();
    assert_eq!(root.label, "Copy of Section A");
    assert_eq!(root.order, 3);

    let copied = edit.module.subtree_ids(&edit.field_id);
    assert_eq!(copied.len(), 3);
    for id in &copied {
        assert!(!["a", "b", "c"].contains(&id.as_str()));
    }
    assert!(orders_contiguous(&edit.module));
}

#[test]
fn test_renumber_closes_gaps_per_sibling_group() {
    let mut fields = vec![
        Field::new("p", "section", 5),
        Field::new("q", "text", 9).with_parent("p"),
        Field::new("r", "text", 2).with_parent("p"),
        Field::new("s", "text", 7),
    ];
    renumber(&mut fields);

    let orders: Vec<(&str, u32)> = fields.iter().map(|f| (f.id.as_str(), f.order)).collect();
    assert_eq!(orders, vec![("p", 1), ("q", 2), ("r", 1), ("s", 2)]);
}

#[test]
fn test_ancestor_walk_reports_cycles_and_orphans() {
    let module = Module::new("m", "M").with_fields(vec![
        Field::new("a", "section", 1).with_parent("b"),
        Field::new("b", "section", 1).with_parent("a"),
        Field::new("c", "text", 1).with_parent("missing"),
        Field::new("d", "text", 2),
    ]);

    assert!(matches!(module.ancestors("a"), AncestorWalk::Cycle { .. }));
    assert_eq!(
        module.ancestors("c"),
        AncestorWalk::Orphan {
            missing: "missing".to_string()
        }
    );
    assert_eq!(module.ancestors("d"), AncestorWalk::Root { chain: vec![] });
}

#[test]
fn test_delete_parent_with_two_children_empties_module() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = Module::new("m", "M").with_fields(vec![
        Field::new("A", "section", 1).with_label("A"),
        Field::new("B", "text", 1).with_parent("A").with_label("B"),
        Field::new("C", "text", 2).with_parent("A").with_label("C"),
    ]);

    let removal = ops.delete_field(&module, "A").unwrap();
    assert!(removal.module.fields.is_empty());
    assert_eq!(removal.removed.len(), 3);
}

#[test]
fn test_move_field_orders_by_position_when_input_has_ties() {
    let (registry, config) = ops_fixture();
    let ops = HierarchyOperations::new(&registry, &config);
    let module = Module::new("m", "M").with_fields(vec![
        Field::new("x", "text", 4),
        Field::new("y", "text", 4),
        Field::new("z", "text", 9),
    ]);

    let moved = ops.move_field(&module, "y", Direction::Up).unwrap();
    assert_eq!(child_ids(&moved, None), vec!["y", "x", "z"]);
    assert!(orders_contiguous(&moved));

    let moved = ops.move_field(&module, "y", Direction::Down).unwrap();
    assert_eq!(child_ids(&moved, None), vec!["x", "z", "y"]);
}
