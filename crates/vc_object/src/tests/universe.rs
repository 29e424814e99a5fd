use alloc::collections::BTreeSet;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use crate::object::{DerivedType, Object, ObjectTypeBuilder};
use crate::registry::TypeRegistry;
use crate::relation::Signal;
use crate::tests::fixtures::{Bar, Foo, scene_type};
use crate::universe::Universe;

#[test]
fn identities_stay_unique() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let ty = DerivedType::Composite(scene_type(&mut registry));
    for _ in 0..4 {
        universe.create_object(&ty, "Scene");
    }
    let foo = universe.create::<Foo>(&mut registry, "Foo");

    let ids: BTreeSet<&str> = universe.iter().map(|(_, id)| id).collect();
    assert_eq!(ids.len(), universe.len());
    assert_eq!(universe.len(), 13);
    assert!(ids.contains("Scene03"));
    assert!(ids.contains("Bar03"));
    assert_eq!(universe.id_of(foo), Some("Foo04"));
}

#[test]
fn renaming() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let a = universe.create::<Foo>(&mut registry, "Foo");
    let b = universe.create::<Foo>(&mut registry, "Foo");
    let c = universe.create::<Foo>(&mut registry, "Foo01");
    assert_eq!(universe.id_of(b), Some("Foo01"));
    assert_eq!(universe.id_of(c), Some("Foo02"));

    // Keeping one's own name is exact.
    assert!(universe.rename_object(a, "Foo"));
    assert!(universe.rename_object(a, "First"));
    assert_eq!(universe.get_object("Foo"), None);
    assert_eq!(universe.get_object("First"), Some(a));

    // Too short, fall back to the type name.
    assert!(!universe.rename_object(b, "x"));
    assert_eq!(universe.id_of(b), Some("Foo01"));
    assert!(universe.rename_object(c, "Foo"));
}

#[test]
fn aspects_live_and_die_with_their_composite() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let ty = DerivedType::Composite(scene_type(&mut registry));
    let scene = universe.create_root(&ty, "Scene");
    let foo = universe.aspects(scene)[0];

    assert_eq!(universe.root(), Some(scene));
    assert!(!universe.destroy(foo));
    assert!(universe.contains(foo));
    assert!(universe.header(foo).unwrap().offset() > 0);

    assert!(universe.destroy(scene));
    assert!(!universe.contains(foo));
    assert!(universe.is_empty());
    assert_eq!(universe.root(), None);
    assert_eq!(universe.get_object("Foo"), None);
    assert!(!universe.destroy(scene));
}

static DROPS: AtomicU32 = AtomicU32::new(0);

macro_rules! counted {
    ($name:ident, $tag:literal) => {
        #[derive(Default)]
        struct $name;

        impl Object for $name {
            fn describe(_: &mut ObjectTypeBuilder<'_, Self>) {}
        }

        impl Drop for $name {
            fn drop(&mut self) {
                let log = DROPS.load(Ordering::Relaxed);
                DROPS.store((log << 4) | $tag, Ordering::Relaxed);
            }
        }
    };
}

counted!(CountedBase, 1);
counted!(CountedFirst, 2);
counted!(CountedSecond, 3);

#[test]
fn aspects_are_dropped_last_to_first_then_the_base() {
    let mut registry = TypeRegistry::new();
    let mut ty = crate::object::CompositeType::new("Counted", registry.register::<CountedBase>());
    ty.add_aspect(registry.register::<CountedFirst>())
        .add_aspect(registry.register::<CountedSecond>());
    ty.freeze();

    let mut universe = Universe::new();
    universe.create_object(&ty.into(), "Counted");
    universe.clear();
    assert_eq!(DROPS.load(Ordering::Relaxed), 0x321);
    assert!(universe.is_empty());
}

#[test]
fn emit_reaches_slots_and_functions() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let bar = universe.create::<Bar>(&mut registry, "Bar");
    let first = universe.create::<Foo>(&mut registry, "First");
    let second = universe.create::<Foo>(&mut registry, "Second");

    let total = Arc::new(AtomicI32::new(0));
    let sink = total.clone();
    fn signal(bar: &mut Bar) -> &mut Signal<i32> {
        &mut bar.when_something_happens
    }
    assert!(universe.connect::<Bar, i32>(bar, signal, first, "Signal receiver"));
    assert!(universe.connect::<Bar, i32>(bar, signal, second, "Signal receiver"));
    assert!(!universe.connect::<Bar, i32>(bar, signal, second, "Missing"));
    universe
        .get_mut::<Bar>(bar)
        .unwrap()
        .when_something_happens
        .connect_fn(move |n| {
            sink.fetch_add(n, Ordering::Relaxed);
        });

    assert_eq!(universe.emit::<Bar, i32>(bar, |b| &b.when_something_happens, 2), 3);
    assert_eq!(total.load(Ordering::Relaxed), 2);

    // A destroyed receiver is skipped.
    universe.destroy(first);
    assert_eq!(universe.emit::<Bar, i32>(bar, |b| &b.when_something_happens, 5), 2);

    let removed = universe
        .get_mut::<Bar>(bar)
        .unwrap()
        .when_something_happens
        .disconnect(second);
    assert_eq!(removed, 1);
    assert_eq!(universe.get::<Foo>(second).unwrap().received, [2, 5]);

    let receivers: Vec<_> = universe
        .get::<Bar>(bar)
        .unwrap()
        .when_something_happens
        .connections()
        .iter()
        .map(|c| c.receiver())
        .collect();
    assert_eq!(receivers, [Some(first), None]);
}
