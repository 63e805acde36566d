//! End-to-end behavior of types that participate in the prototyper.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use prototyper_core::{
    Array, Callable, Capabilities, Handle, InvalidOverride, ObjectId, ObjectRef, PrototypeError,
    TypeDescriptor, TypeRef, Value,
};
use prototyper_engine::{CyclePolicy, PrototyperConfig, StructuralPrototyper};
use prototyper_facade::{Overrides, Prototypable, duplicate_with_engine, prototype_with_engine};

type ResetLog = Arc<Mutex<Vec<ObjectId>>>;

/// A document with nested sections, an open file handle and a cache that is
/// cleared whenever a copy is made.
fn document_type(resets: ResetLog) -> TypeRef {
    let base = TypeDescriptor::builder("Record")
        .field("created_by")
        .private_field("revision")
        .build();
    TypeDescriptor::builder("Document")
        .extends(&base)
        .field("title")
        .field("sections")
        .field("file")
        .field("cache")
        .prototypable()
        .resettable(move |this| {
            resets.lock().unwrap().push(this.id());
            this.set("cache", Array::new())?;
            Ok(())
        })
        .behavior("summary", |this, _| {
            let title = this.get("title")?;
            Ok(Value::from(format!("doc:{}", title.as_text().unwrap_or(""))))
        })
        .build()
}

fn section_type() -> TypeRef {
    TypeDescriptor::builder("Section").field("heading").field("body").build()
}

fn document(ty: &TypeRef) -> ObjectRef {
    let section = ObjectRef::allocate(&section_type());
    section.set("heading", "Intro").unwrap();
    section.set("body", "Hello").unwrap();

    let doc = ObjectRef::allocate(ty);
    doc.set("created_by", "ada").unwrap();
    doc.set("revision", 4).unwrap();
    doc.set("title", "Notes").unwrap();
    doc.set("sections", Array::from_iter([Value::from(section)])).unwrap();
    doc.set("file", Handle::new("notes.txt", 3_u32)).unwrap();
    doc.set("cache", Array::from_iter([Value::from("stale")])).unwrap();
    doc
}

fn first_section(doc: &ObjectRef) -> ObjectRef {
    let sections = doc.get("sections").unwrap();
    let first = sections.as_array().unwrap().values().next().unwrap().clone();
    first.as_object().unwrap().clone()
}

#[test]
fn prototype_is_independent_of_its_source() {
    prototyper_observability::init_for_tests();
    let resets = ResetLog::default();
    let doc = document(&document_type(resets.clone()));

    let copy = doc.prototype().unwrap();

    let (src_section, copy_section) = (first_section(&doc), first_section(&copy));
    assert!(!ObjectRef::ptr_eq(&src_section, &copy_section));
    copy_section.set("body", "Changed").unwrap();
    assert_eq!(src_section.get("body").unwrap(), Value::from("Hello"));

    let (src_file, copy_file) = (doc.get("file").unwrap(), copy.get("file").unwrap());
    assert!(Handle::ptr_eq(src_file.as_handle().unwrap(), copy_file.as_handle().unwrap()));

    assert_eq!(copy.get("revision").unwrap(), Value::Int(4));
    assert_eq!(copy.get("created_by").unwrap(), Value::from("ada"));
    assert_eq!(copy.invoke("summary", &[]).unwrap(), Value::from("doc:Notes"));
}

#[test]
fn duplicating_resets_only_the_copy() {
    prototyper_observability::init_for_tests();
    let resets = ResetLog::default();
    let doc = document(&document_type(resets.clone()));

    let copy = doc.duplicate().unwrap();

    assert_eq!(*resets.lock().unwrap(), vec![copy.id()]);
    assert!(copy.get("cache").unwrap().as_array().unwrap().is_empty());
    assert_eq!(doc.get("cache").unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn prototype_keeps_overrides_without_resetting() {
    prototyper_observability::init_for_tests();
    let resets = ResetLog::default();
    let doc = document(&document_type(resets.clone()));
    let shout = Callable::new("shout", |this, _| {
        let title = this.get("title")?;
        Ok(Value::from(title.as_text().unwrap_or("").to_uppercase()))
    });

    let draft = doc
        .prototype_with(
            None,
            &Overrides::new()
                .with_field("title", "Draft")
                .with_field("cache", Array::from_iter([Value::from("warm")]))
                .with_behavior("shout", shout),
        )
        .unwrap();

    assert_eq!(draft.invoke("shout", &[]).unwrap(), Value::from("DRAFT"));
    let cache = draft.get("cache").unwrap();
    assert_eq!(cache.as_array().unwrap().values().next(), Some(&Value::from("warm")));
    assert!(resets.lock().unwrap().is_empty());

    // Duplicating the prototype does reset it.
    let copy = draft.duplicate().unwrap();
    assert_eq!(*resets.lock().unwrap(), vec![copy.id()]);
    assert!(copy.get("cache").unwrap().as_array().unwrap().is_empty());
    assert_eq!(copy.invoke("shout", &[]).unwrap(), Value::from("DRAFT"));
    assert!(matches!(
        doc.invoke("shout", &[]),
        Err(PrototypeError::UnknownBehavior { .. })
    ));
}

#[test]
fn bad_overrides_are_reported_and_nothing_is_reset() {
    prototyper_observability::init_for_tests();
    let resets = ResetLog::default();
    let doc = document(&document_type(resets.clone()));
    let noop = Callable::new("noop", |_, _| Ok(Value::Null));

    let cases = [
        (
            Overrides::new().with_field("nonexistentField", 1),
            InvalidOverride::unknown_field("nonexistentField", "Document"),
        ),
        (
            Overrides::new().with_behavior("123bad", noop),
            InvalidOverride::member_name("123bad"),
        ),
        (
            Overrides::new().with_behavior("m", "not-a-function"),
            InvalidOverride::not_callable("m", "text"),
        ),
    ];

    for (overrides, expected) in cases {
        let err = doc.prototype_with(None, &overrides).unwrap_err();
        assert_eq!(err.as_invalid_override(), Some(&expected));
    }
    assert!(resets.lock().unwrap().is_empty());
}

#[test]
fn excluded_instances_come_back_unchanged() {
    let registry_ty = TypeDescriptor::builder("Registry")
        .field("entries")
        .prototypable()
        .non_prototypable()
        .resettable(|_| anyhow::bail!("registries are never reset"))
        .build();
    let registry = ObjectRef::allocate(&registry_ty);
    assert!(registry.is_non_prototypable());

    let same = registry.duplicate().unwrap();
    assert!(ObjectRef::ptr_eq(&same, &registry));
    let same = registry.prototype().unwrap();
    assert!(ObjectRef::ptr_eq(&same, &registry));
}

#[test]
fn foreign_types_keep_their_own_duplication() {
    let conn_ty = TypeDescriptor::builder("Connection")
        .field("dsn")
        .field("pool")
        .native_duplicate(|this| {
            let copy = this.shallow_copy();
            copy.set("pool", Value::Null)?;
            Ok(copy)
        })
        .build();
    let conn = ObjectRef::allocate(&conn_ty);
    conn.set("dsn", "postgres://primary").unwrap();
    conn.set("pool", Array::from_iter([Value::from(1)])).unwrap();

    let copy = conn.duplicate().unwrap();
    assert_eq!(copy.get("dsn").unwrap(), Value::from("postgres://primary"));
    assert_eq!(copy.get("pool").unwrap(), Value::Null);

    let failing_ty = TypeDescriptor::builder("Socket")
        .native_duplicate(|_| anyhow::bail!("sockets cannot be duplicated"))
        .build();
    let socket = ObjectRef::allocate(&failing_ty);
    assert!(matches!(
        socket.duplicate(),
        Err(PrototypeError::NativeDuplicate { .. })
    ));
}

#[test]
fn reset_errors_reach_the_caller() {
    let ty = TypeDescriptor::builder("Journal")
        .prototypable()
        .resettable(|_| anyhow::bail!("journal is read-only"))
        .build();
    let journal = ObjectRef::allocate(&ty);

    match journal.duplicate().unwrap_err() {
        PrototypeError::ResetFailed { type_name, source } => {
            assert_eq!(type_name, "Journal");
            assert_eq!(source.to_string(), "journal is read-only");
        }
        other => panic!("expected ResetFailed, got {other:?}"),
    }

    // `prototype` never runs the hook.
    assert!(journal.prototype().is_ok());
}

#[test]
fn cycles_follow_the_configured_policy() {
    let node_ty = TypeDescriptor::builder("Node").field("next").prototypable().build();
    let a = ObjectRef::allocate(&node_ty);
    let b = ObjectRef::allocate(&node_ty);
    a.set("next", b.clone()).unwrap();
    b.set("next", a.clone()).unwrap();

    let rejecting =
        StructuralPrototyper::new(PrototyperConfig::default().with_cycle_policy(CyclePolicy::Reject));
    assert!(matches!(
        duplicate_with_engine(&rejecting, &a),
        Err(PrototypeError::CycleDetected { .. })
    ));
    assert!(matches!(
        prototype_with_engine(&rejecting, &a, &Overrides::new()),
        Err(PrototypeError::CycleDetected { .. })
    ));

    // Break the cycle so both nodes can be dropped.
    b.set("next", Value::Null).unwrap();
}

#[test]
fn disjoint_graphs_clone_concurrently() {
    let resets = ResetLog::default();
    let ty = document_type(resets.clone());
    let docs: Vec<_> = (0..4).map(|_| document(&ty)).collect();

    let copies: Vec<ObjectRef> = std::thread::scope(|scope| {
        let handles: Vec<_> = docs
            .iter()
            .map(|doc| scope.spawn(move || doc.duplicate().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(resets.lock().unwrap().len(), docs.len());
    for (doc, copy) in docs.iter().zip(&copies) {
        assert!(!ObjectRef::ptr_eq(doc, copy));
        assert!(!ObjectRef::ptr_eq(&first_section(doc), &first_section(copy)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Property: duplicating a resettable instance runs the hook once on the
    /// new instance and never on the source; non-resettable types never run
    /// a hook.
    #[test]
    fn reset_runs_once_per_duplicate(resettable in any::<bool>(), copies in 1usize..5) {
        let resets = ResetLog::default();
        let ty = if resettable {
            let resets = resets.clone();
            TypeDescriptor::builder("Counter")
                .field("n")
                .prototypable()
                .resettable(move |this| {
                    resets.lock().unwrap().push(this.id());
                    Ok(())
                })
                .build()
        } else {
            TypeDescriptor::builder("Counter").field("n").prototypable().build()
        };
        let source = ObjectRef::allocate(&ty);

        let made: Vec<ObjectId> = (0..copies)
            .map(|_| source.duplicate().unwrap().id())
            .collect();

        let log = resets.lock().unwrap();
        if resettable {
            prop_assert_eq!(&*log, &made);
        } else {
            prop_assert!(log.is_empty());
        }
        prop_assert!(!log.contains(&source.id()));
    }
}
