mod helpers;

use helpers::write_all;
use memweave::{MemoryError, MemoryStore, MetadataInput, NodeId, NodeUpdate};
use serde_json::json;

#[test]
fn update_of_missing_node_returns_false() {
    let mut store = MemoryStore::new();
    write_all(&mut store, &["existing"]);

    let updated = store
        .update(
            &NodeId::from("nonexistent-id"),
            NodeUpdate::default().with_metadata("x"),
        )
        .unwrap();
    assert!(!updated);
    assert_eq!(store.len(), 1);
    assert!(store.resolve_key("x").is_none());
}

#[test]
fn new_key_resolves_and_old_key_is_released() {
    let mut store = MemoryStore::new();
    let id = store.write("draft title", &[]).unwrap();

    assert!(store
        .update(&id, NodeUpdate::default().with_metadata("final title"))
        .unwrap());

    assert_eq!(store.resolve_key("final title"), Some(&id));
    assert!(store.resolve_key("draft title").is_none());
    assert_eq!(store.write("final title", &[]).unwrap(), id);

    let fresh = store.write("draft title", &[]).unwrap();
    assert_ne!(fresh, id);
    assert_eq!(store.len(), 2);
}

#[test]
fn update_to_anothers_key_takes_it_over() {
    let mut store = MemoryStore::new();
    let ids = write_all(&mut store, &["alpha", "beta"]);

    store
        .update(&ids[0], NodeUpdate::default().with_metadata("beta"))
        .unwrap();

    // Last write wins: the key now resolves to the updated node.
    assert_eq!(store.resolve_key("beta"), Some(&ids[0]));
    assert!(store.resolve_key("alpha").is_none());
}

#[test]
fn stale_old_key_owned_by_other_node_survives() {
    let mut store = MemoryStore::new();
    let ids = write_all(&mut store, &["alpha", "beta"]);

    // alpha takes over "beta"; beta's node still holds that text.
    store
        .update(&ids[0], NodeUpdate::default().with_metadata("beta"))
        .unwrap();
    // Moving beta's node away must not drop the mapping that now points at alpha's node.
    store
        .update(&ids[1], NodeUpdate::default().with_metadata("gamma"))
        .unwrap();

    assert_eq!(store.resolve_key("beta"), Some(&ids[0]));
    assert_eq!(store.resolve_key("gamma"), Some(&ids[1]));
}

#[test]
fn structured_update_replaces_whole_mapping() {
    let mut store = MemoryStore::new();
    let id = store
        .write(
            MetadataInput::try_from(json!({"content": "Jane", "role": "editor"})).unwrap(),
            &[],
        )
        .unwrap();

    store
        .update(
            &id,
            NodeUpdate::default()
                .with_metadata(MetadataInput::try_from(json!({"content": "Jane", "team": "news"})).unwrap()),
        )
        .unwrap();

    let view = store.inspect(&id).unwrap();
    assert!(view.metadata.get("role").is_none());
    assert_eq!(view.metadata["team"], "news");
    // Content unchanged, so the key still resolves here.
    assert_eq!(store.resolve_key("Jane"), Some(&id));
}

#[test]
fn add_connections_skip_unknown_targets() {
    let mut store = MemoryStore::new();
    let ids = write_all(&mut store, &["hub", "spoke"]);

    let update = NodeUpdate::default().connect("ghost").connect(ids[1].clone());
    assert!(store.update(&ids[0], update).unwrap());
    assert_eq!(store.inspect(&ids[0]).unwrap().connections, vec![ids[1].clone()]);

    // The strict path reports the same missing target as a failure.
    assert!(!store.add_edge(&ids[0], &NodeId::from("ghost")));
}

#[test]
fn remove_connections_ignores_absent_edges() {
    let mut store = MemoryStore::new();
    let a = store.write("a", &[]).unwrap();
    let b = store.write("b", &[a.clone()]).unwrap();

    let update = NodeUpdate::default().disconnect(a.clone()).disconnect("ghost");
    assert!(store.update(&b, update).unwrap());
    assert!(store.inspect(&b).unwrap().connections.is_empty());

    // Removing again is still fine.
    assert!(store.update(&b, NodeUpdate::default().disconnect(a)).unwrap());
}

#[test]
fn invalid_update_changes_nothing() {
    let mut store = MemoryStore::new();
    let ids = write_all(&mut store, &["keep me", "target"]);
    let revision = store.revision();

    let update = NodeUpdate::default()
        .with_metadata(MetadataInput::try_from(json!({"list": [1, 2]})).unwrap())
        .connect(ids[1].clone());
    let err = store.update(&ids[0], update).unwrap_err();

    assert!(matches!(err, MemoryError::InvalidArgument(_)));
    assert_eq!(store.revision(), revision);
    let view = store.inspect(&ids[0]).unwrap();
    assert_eq!(view.metadata["content"], "keep me");
    assert!(view.connections.is_empty());
}

#[test]
fn edge_changes_do_not_bump_revision() {
    let mut store = MemoryStore::new();
    let ids = write_all(&mut store, &["a", "b"]);
    let revision = store.revision();

    store
        .update(&ids[0], NodeUpdate::default().connect(ids[1].clone()))
        .unwrap();
    assert_eq!(store.revision(), revision);

    store
        .update(&ids[0], NodeUpdate::default().with_metadata("a2"))
        .unwrap();
    assert_eq!(store.revision(), revision + 1);
}
