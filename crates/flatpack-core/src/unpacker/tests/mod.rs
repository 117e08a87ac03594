
use crate::{
    error::{ErrorClass, ErrorOrigin},
    graph::{Entity, EntityKey, Graph},
    model::registry::EntityRegistry,
    packer::Packer,
    test_support::{
        MERCHANT, MERCHANT_LOCATION, STREET_ADDRESS, TEST_ENTITY, capture_debug,
        parent_with_children, shop_registry, test_registry,
    },
    types::{EntityId, Timestamp},
    unpacker::{Unpacked, Unpacker, UnpackedRoot},
    value::Value,
};
use serde_json::{Value as JsonValue, json};

const ROOT: &str = "2b4a7f3e-9c1d-4e8a-b5f6-0d3c2e1a9b87";
const CHILD_A: &str = "6f1e2d3c-4b5a-4978-8a6b-5c4d3e2f1a0b";
const CHILD_B: &str = "9a8b7c6d-5e4f-4a3b-9c2d-1e0f9a8b7c6d";
const MISSING: &str = "00000000-0000-4000-8000-00000000dead";

fn id(s: &str) -> EntityId {
    s.parse().expect("fixture id should parse")
}

fn unpack(registry: &EntityRegistry, json: JsonValue) -> Unpacked {
    Unpacker::new(registry)
        .unpack_value(json)
        .expect("fixture document should parse")
}

fn unpack_shop(json: JsonValue) -> Unpacked {
    let registry = shop_registry();

    Unpacker::new(&registry)
        .entity_namespace(Some("shop".to_string()))
        .unpack_value(json)
        .expect("fixture document should parse")
}

fn key_of(unpacked: &Unpacked, raw: &str) -> EntityKey {
    unpacked
        .find(id(raw))
        .unwrap_or_else(|| panic!("entity {raw} should be reconstructed"))
}

#[test]
fn plain_record_becomes_an_entity_with_its_identity() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": { "testEntity": [{ "one": "first", "two": "second", "uuid": ROOT }] },
            "value": ROOT
        }),
    );

    let root = unpacked.root_entity().expect("root should resolve");
    assert_eq!(root.id(), id(ROOT));
    assert_eq!(root.model(), &TEST_ENTITY);
    assert_eq!(root.text("one"), Some("first"));
    assert_eq!(root.text("two"), Some("second"));
    assert_eq!(root.get("uuid"), None, "the identity field is not a property");
    assert_eq!(unpacked.graph.len(), 1);
}

#[test]
fn packed_children_rebuild_the_reciprocal_collection() {
    let mut graph = Graph::new();
    let (root, [a, b]) = parent_with_children(&mut graph);
    let doc = Packer::new().pack(&graph, Some(root));

    let registry = test_registry();
    let unpacked = Unpacker::new(&registry).unpack(&doc);

    let root_key = unpacked.root_key().expect("root should resolve");
    let a_key = unpacked.find(graph[a].id()).expect("first child should exist");
    let b_key = unpacked.find(graph[b].id()).expect("second child should exist");

    assert_eq!(unpacked.graph.follow_all(root_key, "two"), [a_key, b_key]);
    assert_eq!(
        unpacked.graph.follow_all(root_key, "test_sub_entities"),
        [a_key, b_key],
        "each child should appear once in the reciprocal collection"
    );
    for child in [a_key, b_key] {
        assert_eq!(
            unpacked.graph.follow(child, "test_entity").map(Entity::id),
            Some(graph[root].id())
        );
        assert_eq!(unpacked.graph[child].text("three"), Some("third"));
        assert_eq!(unpacked.graph[child].get("two"), None);
    }
}

#[test]
fn shared_references_resolve_to_the_same_entity() {
    let mut graph = Graph::new();
    let child = graph.insert(Entity::new(&TEST_ENTITY).with("one", "shared"));
    let root = graph.insert(
        Entity::new(&TEST_ENTITY)
            .with("test_entity", child)
            .with("two", vec![child]),
    );
    let doc = Packer::new().pack(&graph, Some(root));

    let registry = test_registry();
    let unpacked = Unpacker::new(&registry).unpack(&doc);
    let root_key = unpacked.root_key().expect("root should resolve");

    let single = unpacked.graph[root_key]
        .get("test_entity")
        .and_then(Value::as_reference)
        .expect("single reference should resolve");
    assert_eq!(unpacked.graph.follow_all(root_key, "two"), [single]);
    assert_eq!(unpacked.graph.len(), 2);
}

#[test]
fn cycles_resolve_in_any_order() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": { "testEntity": [
                { "one": "a", "testEntityUuid": CHILD_B, "uuid": CHILD_A },
                { "one": "b", "testEntityUuid": CHILD_A, "uuid": CHILD_B }
            ] },
            "value": CHILD_A
        }),
    );

    let a = key_of(&unpacked, CHILD_A);
    let b = key_of(&unpacked, CHILD_B);
    assert_eq!(unpacked.graph[a].get("test_entity"), Some(&Value::Ref(b)));
    assert_eq!(unpacked.graph[b].get("test_entity"), Some(&Value::Ref(a)));
    assert_eq!(unpacked.graph.follow_all(a, "test_entities"), [b]);
    assert_eq!(unpacked.graph.follow_all(b, "test_entities"), [a]);
}

#[test]
fn dangling_reference_with_declared_type_gets_a_placeholder() {
    let unpacked = unpack_shop(json!({
        "data": { "merchantLocation": [{ "merchantUuid": MISSING, "uuid": CHILD_A }] },
        "value": CHILD_A
    }));

    let location = key_of(&unpacked, CHILD_A);
    let placeholder = unpacked
        .graph
        .follow(location, "merchant")
        .expect("dangling merchant should be repaired");

    assert_eq!(placeholder.model(), &MERCHANT);
    assert_eq!(placeholder.id(), id(MISSING));
    assert_eq!(placeholder.get("name"), None, "placeholders carry no data fields");
    assert_eq!(
        unpacked.graph.follow_all(key_of(&unpacked, MISSING), "merchant_locations"),
        [location]
    );
}

#[test]
fn repeated_dangling_references_share_one_placeholder() {
    let unpacked = unpack_shop(json!({
        "data": { "merchantLocation": [
            { "merchantUuid": MISSING, "uuid": CHILD_A },
            { "merchantUuid": MISSING, "uuid": CHILD_B }
        ] }
    }));

    assert_eq!(unpacked.graph.len(), 3);
    let merchant = key_of(&unpacked, MISSING);
    assert_eq!(
        unpacked.graph.follow_all(merchant, "merchant_locations"),
        [key_of(&unpacked, CHILD_A), key_of(&unpacked, CHILD_B)]
    );
    assert_eq!(unpacked.root, UnpackedRoot::One(None));
}

#[test]
fn dangling_reference_without_declared_type_is_dropped() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": { "testEntity": [{ "one": "first", "twoUuid": MISSING, "uuid": ROOT }] },
            "value": ROOT
        }),
    );

    let root = unpacked.root_entity().expect("root should resolve");
    assert_eq!(root.get("two"), None);
    assert_eq!(unpacked.graph.len(), 1, "no placeholder should be synthesized");
}

#[test]
fn unresolved_list_elements_become_holes() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": { "testEntity": [
                { "twoUuid": [MISSING, CHILD_A, 7], "uuid": ROOT },
                { "uuid": CHILD_A }
            ] },
            "value": ROOT
        }),
    );

    let root = key_of(&unpacked, ROOT);
    let child = key_of(&unpacked, CHILD_A);
    assert_eq!(
        unpacked.graph[root].get("two"),
        Some(&Value::RefList(vec![None, Some(child), None]))
    );
    assert_eq!(unpacked.graph.len(), 2);
}

#[test]
fn list_elements_never_resolve_to_placeholders() {
    let scalar = json!({ "testEntityUuid": MISSING, "uuid": CHILD_A });
    let list = json!({ "twoUuid": [MISSING], "uuid": CHILD_B });

    for records in [[&scalar, &list], [&list, &scalar]] {
        let unpacked = unpack(
            &test_registry(),
            json!({ "data": { "testEntity": records } }),
        );

        assert_eq!(
            unpacked.graph[key_of(&unpacked, CHILD_B)].get("two"),
            Some(&Value::RefList(vec![None])),
            "list element should stay a hole whatever the record order"
        );
        assert_eq!(
            unpacked
                .graph
                .follow(key_of(&unpacked, CHILD_A), "test_entity")
                .map(Entity::id),
            Some(id(MISSING)),
            "the scalar reference should still be repaired"
        );
        assert_eq!(unpacked.graph.len(), 3);
    }
}

#[test]
fn explicit_collection_lists_merge_with_back_references() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": {
                "testEntity": [{ "testSubEntitiesUuid": [CHILD_B, CHILD_A], "uuid": ROOT }],
                "testSubEntity": [
                    { "testEntityUuid": ROOT, "uuid": CHILD_A },
                    { "testEntityUuid": ROOT, "uuid": CHILD_B }
                ]
            },
            "value": ROOT
        }),
    );

    let root = key_of(&unpacked, ROOT);
    assert_eq!(
        unpacked.graph.follow_all(root, "test_sub_entities"),
        [key_of(&unpacked, CHILD_B), key_of(&unpacked, CHILD_A)],
        "the explicit list order should hold and nothing should repeat"
    );
}

#[test]
fn unknown_buckets_are_skipped() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": {
                "mysteryEntity": [{ "uuid": CHILD_A, "testEntityUuid": ROOT }],
                "testEntity": [{ "one": "first", "uuid": ROOT }]
            },
            "value": ROOT
        }),
    );

    assert_eq!(unpacked.graph.len(), 1);
    assert!(unpacked.find(id(CHILD_A)).is_none());
    assert_eq!(
        unpacked.root_entity().and_then(|root| root.text("one")),
        Some("first")
    );
}

#[test]
fn root_in_an_unknown_bucket_is_absent() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": { "mysteryEntity": [{ "uuid": ROOT }] },
            "value": ROOT
        }),
    );

    assert_eq!(unpacked.root, UnpackedRoot::One(None));
    assert!(unpacked.graph.is_empty());
}

#[test]
fn list_values_resolve_position_by_position() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": { "testEntity": [{ "uuid": CHILD_A }, { "uuid": CHILD_B }] },
            "value": [CHILD_B, MISSING, CHILD_A]
        }),
    );

    assert_eq!(
        unpacked.root,
        UnpackedRoot::Many(vec![
            Some(key_of(&unpacked, CHILD_B)),
            None,
            Some(key_of(&unpacked, CHILD_A)),
        ])
    );
    assert_eq!(unpacked.root_key(), None);
    assert_eq!(unpacked.roots().len(), 3);
}

#[test]
fn root_entries_without_an_identity_are_absent() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": { "testEntity": [{ "uuid": ROOT }] },
            "value": [ROOT, "legacy-id", null]
        }),
    );

    assert_eq!(
        unpacked.root,
        UnpackedRoot::Many(vec![Some(key_of(&unpacked, ROOT)), None, None])
    );

    let unpacked = unpack(
        &test_registry(),
        json!({ "data": { "testEntity": [{ "uuid": ROOT }] }, "value": 42 }),
    );
    assert_eq!(unpacked.root, UnpackedRoot::One(None));
    assert_eq!(unpacked.graph.len(), 1);
}

#[test]
fn root_naming_a_placeholder_is_absent() {
    let unpacked = unpack_shop(json!({
        "data": { "merchantLocation": [{ "merchantUuid": MISSING, "uuid": CHILD_A }] },
        "value": [CHILD_A, MISSING]
    }));

    assert!(unpacked.find(id(MISSING)).is_some());
    assert_eq!(
        unpacked.root,
        UnpackedRoot::Many(vec![Some(key_of(&unpacked, CHILD_A)), None])
    );
}

#[test]
fn repeated_identity_keeps_the_latest_record() {
    let unpacked = unpack(
        &test_registry(),
        json!({
            "data": { "testEntity": [
                { "one": "stale", "uuid": ROOT },
                { "one": "fresh", "uuid": ROOT },
                { "uuid": "not-a-uuid", "one": "ignored" }
            ] },
            "value": ROOT
        }),
    );

    assert_eq!(unpacked.graph.len(), 1);
    assert_eq!(unpacked.root_entity().and_then(|e| e.text("one")), Some("fresh"));
}

#[test]
fn timestamp_fields_parse_to_utc() {
    let unpacked = unpack_shop(json!({
        "data": { "merchantLocation": [
            { "openedAt": "2023-11-14T23:13:20+01:00", "uuid": ROOT },
            { "openedAt": 1_700_000_000, "uuid": CHILD_A },
            { "openedAt": "1700000000", "uuid": CHILD_B },
            { "openedAt": "someday", "uuid": MISSING }
        ] }
    }));

    let expected = Value::Timestamp(Timestamp::from_unix_seconds(1_700_000_000).expect("valid"));
    for raw in [ROOT, CHILD_A, CHILD_B] {
        assert_eq!(
            unpacked.graph[key_of(&unpacked, raw)].get("opened_at"),
            Some(&expected),
            "openedAt of {raw} should parse as a timestamp"
        );
    }
    assert_eq!(
        unpacked.graph[key_of(&unpacked, MISSING)].text("opened_at"),
        Some("someday"),
        "unparseable timestamps should keep the raw text"
    );
}

#[test]
fn embedded_fields_rebuild_an_embedded_value_and_repack_identically() {
    let mut graph = Graph::new();
    let merchant = graph.insert(Entity::new(&MERCHANT).with("name", "Acme"));
    let location = graph.insert(
        Entity::new(&MERCHANT_LOCATION)
            .with("merchant", merchant)
            .with("address", "1 Embarcadero Center")
            .with("city", "San Francisco")
            .with("state", "CA")
            .with("zip", "94111"),
    );
    let location_id = graph[location].id();
    let original = Packer::new().pack(&graph, Some(location));

    let unpacked = unpack_shop(original.to_json_value().expect("document should serialize"));
    let rebuilt = unpacked.root_key().expect("location should resolve");

    let address = unpacked.graph[rebuilt]
        .embedded("street_address")
        .expect("address fields should rebuild the embedded value");
    assert_eq!(address.model(), &STREET_ADDRESS);
    assert_eq!(address.text("city"), Some("San Francisco"));
    assert_eq!(address.text("zip"), Some("94111"));

    let repacked = Packer::new().pack(&unpacked.graph, Some(rebuilt));
    assert_eq!(
        repacked.record("merchantLocation", location_id),
        original.record("merchantLocation", location_id),
        "repacking should reproduce the merged record"
    );
    assert!(repacked.records("streetAddress").is_empty());
}

#[test]
fn namespace_scopes_bucket_resolution() {
    let doc = json!({
        "data": { "merchant": [{ "name": "Acme", "uuid": ROOT }] },
        "value": ROOT
    });
    let registry = shop_registry();

    let unscoped = Unpacker::new(&registry)
        .unpack_value(doc.clone())
        .expect("document should parse");
    assert!(unscoped.graph.is_empty(), "shop models should not resolve without their namespace");

    let scoped = unpack_shop(doc);
    assert_eq!(scoped.root_entity().and_then(|e| e.text("name")), Some("Acme"));
}

#[test]
fn malformed_json_is_an_unpack_error() {
    let registry = test_registry();
    let err = Unpacker::new(&registry)
        .verbose(true)
        .unpack_str("{ not json")
        .expect_err("malformed json should fail");

    assert_eq!(err.class, ErrorClass::Deserialize);
    assert_eq!(err.origin, ErrorOrigin::Unpack);
}

#[test]
fn verbose_logs_progress_without_changing_the_graph() {
    let mut graph = Graph::new();
    let (root, _) = parent_with_children(&mut graph);
    let doc = Packer::new().pack(&graph, Some(root));
    let registry = test_registry();

    let (quiet, quiet_log) = capture_debug(|| Unpacker::new(&registry).unpack(&doc));
    let (loud, loud_log) = capture_debug(|| Unpacker::new(&registry).verbose(true).unpack(&doc));

    assert!(quiet_log.is_empty(), "quiet unpacking should log nothing, got {quiet_log}");
    assert!(loud_log.contains("flatpack::unpack"));
    assert!(loud_log.contains("unpacked 3 entities"));

    assert_eq!(quiet.root, loud.root);
    assert_eq!(
        Packer::new().pack(&quiet.graph, quiet.root_key()),
        Packer::new().pack(&loud.graph, loud.root_key()),
        "verbose should not change the rebuilt graph"
    );
}
