//! Entity type registration and schema persistence scenarios

mod common;

use common::{harness, test_schema};
use entitydb::{
    Actor, DocumentStore, EntityRegistry, Error, Event, Filter, Runtime, Value,
    SCHEMAS_COLLECTION,
};

#[test]
fn register_unregister_register_cycle() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();
    assert!(h.registry.registered("thing").unwrap());

    assert!(matches!(
        h.registry.register("thing", test_schema()),
        Err(Error::AlreadyRegistered(_))
    ));

    h.registry.unregister("thing").unwrap();
    assert!(!h.registry.registered("thing").unwrap());
    h.registry.register("thing", test_schema()).unwrap();
}

#[test]
fn schemas_persist_across_runtimes_sharing_a_store() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    thing.set("test2", "payload").unwrap();
    thing.save(Actor::System).unwrap();

    // A second runtime over the same store sees the registered type and
    // its records, with no shared process state involved.
    let second = EntityRegistry::new(Runtime::new(h.store.clone()));
    assert!(second.registered("thing").unwrap());
    let loaded = second.load("thing", "sample").unwrap();
    assert_eq!(loaded.get("test2").unwrap(), Value::from("payload"));
}

#[test]
fn persisted_hooks_are_action_keys_not_source() {
    let h = harness();
    h.registry
        .register(
            "thing",
            test_schema().with_hook(Event::Presave, "audit.stamp"),
        )
        .unwrap();

    let doc = h
        .store
        .collection(SCHEMAS_COLLECTION)
        .find_one(&Filter::by_field("type", "thing"))
        .unwrap()
        .unwrap();
    let schema = doc.get("schema").unwrap().as_object().unwrap();
    let hooks = schema.get("hooks").unwrap().as_object().unwrap();
    let presave = hooks.get("presave").unwrap().as_array().unwrap();
    assert_eq!(presave[0], Value::from("@action{audit.stamp}"));
}

#[test]
fn function_source_in_a_stored_schema_is_rejected() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    // Corrupt the stored schema the way legacy data would look.
    let schemas = h.store.collection(SCHEMAS_COLLECTION);
    let mut doc = schemas
        .find_one(&Filter::by_field("type", "thing"))
        .unwrap()
        .unwrap();
    if let Some(schema) = doc.fields.get_mut("schema") {
        if let Value::Object(map) = schema {
            if let Some(Value::Object(hooks)) = map.get_mut("hooks") {
                hooks.insert(
                    "presave".to_string(),
                    Value::Array(vec![Value::from("@fnc{function (next) { next(); }}")]),
                );
            }
        }
    }
    schemas.save(doc).unwrap();

    let err = h.registry.schema("thing").unwrap_err();
    assert!(err.to_string().contains("not supported"));
}

#[test]
fn invalid_type_names_are_rejected_up_front() {
    let h = harness();
    for name in ["", "CamelCase", "1starts-with-digit", "has space"] {
        assert!(matches!(
            h.registry.register(name, test_schema()),
            Err(Error::InvalidEntityType(_))
        ));
    }
    assert!(h
        .store
        .collection(SCHEMAS_COLLECTION)
        .count(&Filter::all())
        .unwrap()
        == 0);
}

#[test]
fn update_takes_effect_for_new_instances() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();

    let mut schema = test_schema();
    schema.fields.remove("test2");
    h.registry.update("thing", schema).unwrap();

    let mut thing = h.registry.create("thing", None).unwrap();
    thing.set("name", "sample").unwrap();
    // test2 is no longer declared, let alone required.
    assert!(matches!(
        thing.set("test2", "x"),
        Err(Error::UnknownField(_))
    ));
    thing.save(Actor::System).unwrap();
}

#[test]
fn unique_name_is_enforced_per_type() {
    let h = harness();
    h.registry.register("thing", test_schema()).unwrap();
    h.registry.register("other", test_schema()).unwrap();

    let mut first = h.registry.create("thing", None).unwrap();
    first.set("name", "sample").unwrap();
    first.set("test2", "x").unwrap();
    first.save(Actor::System).unwrap();

    let mut duplicate = h.registry.create("thing", None).unwrap();
    duplicate.set("name", "sample").unwrap();
    duplicate.set("test2", "x").unwrap();
    assert!(duplicate.save(Actor::System).is_err());

    // Same name under a different type lives in a different collection.
    let mut other = h.registry.create("other", None).unwrap();
    other.set("name", "sample").unwrap();
    other.set("test2", "x").unwrap();
    other.save(Actor::System).unwrap();
}
