use alloc::string::String;
use alloc::vec;

use vc_archive::NodeKind;

use crate::DeserializeError;
use crate::object::{CompositeType, DerivedType};
use crate::registry::TypeRegistry;
use crate::relation::Ref;
use crate::serde::Archive;
use crate::tests::fixtures::{Bar, Finish, Foo, Scene, Tile, nested_type, scene_type};
use crate::types::Type;
use crate::universe::Universe;

#[test]
fn inherited_optional_and_enum_attributes() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let tile = universe.create::<Tile>(&mut registry, "Tile");
    let state = universe.get_mut::<Tile>(tile).unwrap();
    state.shape.sides = 6;
    state.label = Some(String::from("hex"));
    state.finish = Finish::Glossy;

    let mut archive = Archive::new();
    archive.serialize(tile, &universe);
    let root = archive.tree().root_ref();
    let keys: vec::Vec<&str> = root.entries().map(|(key, _)| key).collect();
    assert_eq!(keys, ["class", "id", "sides", "label", "finish"]);
    assert_eq!(root.get("finish").as_str(), Some("Glossy"));

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    let state = other.get::<Tile>(copy).unwrap();
    assert_eq!(state.shape.sides, 6);
    assert_eq!(state.label.as_deref(), Some("hex"));
    assert_eq!(state.finish, Finish::Glossy);
}

#[test]
fn empty_option_is_written_as_null() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let tile = universe.create::<Tile>(&mut registry, "Tile");

    let mut archive = Archive::new();
    archive.serialize(tile, &universe);
    assert_eq!(archive.tree().kind(archive.get("label")), NodeKind::Empty);
    assert!(archive.tree().contains_key(archive.root(), "label"));

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert_eq!(other.get::<Tile>(copy).unwrap().label, None);
}

#[test]
fn unknown_enum_name_keeps_default() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let tile = universe.create::<Tile>(&mut registry, "Tile");
    universe.get_mut::<Tile>(tile).unwrap().finish = Finish::Glossy;

    let mut archive = Archive::new();
    archive.serialize(tile, &universe);
    let finish = archive.get("finish");
    archive.tree_mut().set(finish, "Velvet");

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert_eq!(other.get::<Tile>(copy).unwrap().finish, Finish::Matte);
}

#[test]
fn arrays_keep_their_order() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let bar = universe.create::<Bar>(&mut registry, "Bar");
    universe.get_mut::<Bar>(bar).unwrap().list = vec![30, -1, 7, 7, 0];

    let mut archive = Archive::new();
    archive.serialize(bar, &universe);
    let list = archive.tree().view(archive.get("list"));
    let values: vec::Vec<i64> = list.elements().filter_map(|item| item.as_i64()).collect();
    assert_eq!(values, [30, -1, 7, 7, 0]);

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert_eq!(other.get::<Bar>(copy).unwrap().list, [30, -1, 7, 7, 0]);
}

#[test]
fn dangling_references_stay_null() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let foo = universe.create::<Foo>(&mut registry, "Foo");
    let bar = universe.create::<Bar>(&mut registry, "Bar");
    universe.get_mut::<Bar>(bar).unwrap().foo = Ref::new(foo);

    let mut archive = Archive::new();
    archive.serialize(bar, &universe);
    assert_eq!(archive.tree().get_str(archive.get("foo")), Some("Foo"));

    // `Foo` is not part of the archive and does not exist over there.
    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    let state = other.get::<Bar>(copy).unwrap();
    assert!(state.foo.is_null());
    assert_eq!(state.bar, 456);

    // A target of the wrong class is rejected the same way.
    let mut third = Universe::new();
    third.create::<Scene>(&mut registry, "Foo");
    let copy = archive.deserialize(&mut third, &mut registry).unwrap();
    assert!(third.get::<Bar>(copy).unwrap().foo.is_null());

    // An existing target of the right class is found.
    let mut fourth = Universe::new();
    let target = fourth.create::<Foo>(&mut registry, "Foo");
    let copy = archive.deserialize(&mut fourth, &mut registry).unwrap();
    assert_eq!(fourth.get::<Bar>(copy).unwrap().foo.get(), Some(target));
}

#[test]
fn references_to_destroyed_objects_are_written_as_null() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let foo = universe.create::<Foo>(&mut registry, "Foo");
    let bar = universe.create::<Bar>(&mut registry, "Bar");
    universe.get_mut::<Bar>(bar).unwrap().foo = Ref::new(foo);
    assert!(universe.destroy(foo));

    let mut archive = Archive::new();
    archive.serialize(bar, &universe);
    assert_eq!(archive.tree().kind(archive.get("foo")), NodeKind::Empty);
}

#[test]
fn broken_connections_are_skipped() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let scene = universe.create_object(&DerivedType::Composite(scene_type(&mut registry)), "S1");

    let mut archive = Archive::new();
    archive.serialize(scene, &universe);
    let aspects = archive.get("aspects");
    let tree = archive.tree_mut();
    let bar = tree.at(aspects, 1);
    let signal = tree.key_mut(bar, "when_something_happens");
    let connections = [
        ("Foo", "No such slot"),
        ("Nobody", "Signal receiver"),
        ("Foo", "Signal receiver"),
    ];
    for (receiver, slot) in connections {
        let item = tree.push(signal);
        let receiver_node = tree.key_mut(item, "receiver");
        tree.set(receiver_node, receiver);
        let slot_node = tree.key_mut(item, "slot");
        tree.set(slot_node, slot);
    }
    let malformed = tree.push(signal);
    tree.set(malformed, 5);

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    let state = other.get::<Bar>(copy).unwrap();
    assert_eq!(state.when_something_happens.len(), 1);
    assert_eq!(other.emit::<Bar, i32>(copy, |bar| &bar.when_something_happens, 8), 1);
}

#[test]
fn mismatched_slot_signature_is_skipped() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let foo = universe.create::<Foo>(&mut registry, "Foo");
    let other_foo = universe.create::<Foo>(&mut registry, "Other");

    // `after_signal_received` sends nothing, the slot expects an `int32`.
    assert!(!universe.connect::<Foo, ()>(
        foo,
        |foo| &mut foo.after_signal_received,
        other_foo,
        "Signal receiver",
    ));

    let mut archive = Archive::new();
    archive.serialize(foo, &universe);
    let tree = archive.tree_mut();
    let signal = tree.key(tree.root(), "after_signal_received");
    let item = tree.push(signal);
    let receiver = tree.key_mut(item, "receiver");
    tree.set(receiver, "Foo");
    let slot = tree.key_mut(item, "slot");
    tree.set(slot, "Signal receiver");

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert!(other.get::<Foo>(copy).unwrap().after_signal_received.is_empty());
}

#[test]
fn root_errors() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();

    let mut archive = Archive::new();
    let root = archive.root();
    archive.tree_mut().set(root, 1);
    assert_eq!(
        archive.deserialize(&mut universe, &mut registry),
        Err(DeserializeError::ExpectedObject {
            found: NodeKind::Integer
        })
    );

    let mut archive = Archive::new();
    let id = archive.entry("id");
    archive.tree_mut().set(id, "x1");
    assert_eq!(
        archive.deserialize(&mut universe, &mut registry),
        Err(DeserializeError::MissingClass)
    );

    let class = archive.entry("class");
    archive.tree_mut().set(class, "Foo");
    assert_eq!(
        archive.deserialize(&mut universe, &mut registry),
        Err(DeserializeError::UnregisteredClass {
            class: String::from("Foo")
        })
    );

    archive.tree_mut().set(class, "Object");
    assert_eq!(
        archive.deserialize(&mut universe, &mut registry),
        Err(DeserializeError::AbstractClass {
            class: String::from("Object")
        })
    );
    assert!(universe.is_empty());
}

#[test]
fn unregistered_aspect_fails_the_whole_object() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let scene = universe.create_object(&DerivedType::Composite(scene_type(&mut registry)), "S1");
    let mut archive = Archive::new();
    archive.serialize(scene, &universe);

    let mut fresh = TypeRegistry::new();
    fresh.register::<Scene>();
    fresh.register::<Bar>();
    let mut other = Universe::new();
    assert_eq!(
        archive.deserialize(&mut other, &mut fresh),
        Err(DeserializeError::UnregisteredClass {
            class: String::from("Foo")
        })
    );
    assert!(other.is_empty());
}

#[test]
fn bad_children_are_skipped() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let scene = universe.create::<Scene>(&mut registry, "Stage");
    let foo = universe.create::<Foo>(&mut registry, "Foo");
    universe.get_mut::<Scene>(scene).unwrap().children.push(foo);

    let mut archive = Archive::new();
    archive.serialize(scene, &universe);
    let children = archive.get("children");
    let tree = archive.tree_mut();
    let unknown = tree.push(children);
    let class = tree.key_mut(unknown, "class");
    tree.set(class, "Ghost");
    let scalar = tree.push(children);
    tree.set(scalar, 2.5);

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert_eq!(other.get::<Scene>(copy).unwrap().children.len(), 1);
    assert_eq!(other.len(), 2);
}

#[test]
fn missing_ids_fall_back_to_the_type_name() {
    let mut registry = TypeRegistry::new();
    registry.register::<Foo>();
    let mut archive = Archive::new();
    let class = archive.entry("class");
    archive.tree_mut().set(class, "Foo");

    let mut universe = Universe::new();
    let first = archive.deserialize(&mut universe, &mut registry).unwrap();
    let second = archive.deserialize(&mut universe, &mut registry).unwrap();
    assert_eq!(universe.id_of(first), Some("Foo01"));
    assert_eq!(universe.id_of(second), Some("Foo02"));
    assert_eq!(universe.get::<Foo>(first).unwrap().foo, 123);
}

#[test]
fn unreadable_leaves_keep_their_value() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let bar = universe.create::<Bar>(&mut registry, "Bar");

    let mut archive = Archive::new();
    archive.serialize(bar, &universe);
    let number = archive.get("bar");
    let list = archive.get("list");
    let tree = archive.tree_mut();
    tree.set(number, "many");
    let item = tree.push(list);
    tree.set(item, 1);
    let item = tree.push(list);
    tree.set(item, 99_999_999_999_i64);
    let item = tree.push(list);
    tree.set(item, "x");

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    let state = other.get::<Bar>(copy).unwrap();
    assert_eq!(state.bar, 456);
    assert_eq!(state.list, [1, 0, 0]);
}

#[test]
fn composite_over_the_root_class_round_trips() {
    let mut registry = TypeRegistry::new();
    let root_class = registry.get("Object").cloned().unwrap();
    let mut ty = CompositeType::new("Bundle", root_class);
    ty.add_aspect(registry.register::<Foo>())
        .add_aspect(registry.register::<Bar>());
    ty.freeze();

    let mut universe = Universe::new();
    let bundle = universe.create_object(&ty.into(), "Bundle");
    universe.get_mut::<Bar>(bundle).unwrap().list = vec![4, 5];

    let mut archive = Archive::new();
    archive.serialize(bundle, &universe);
    assert_eq!(archive.tree().get_str(archive.get("class")), Some("Object"));

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert_eq!(other.len(), 3);
    assert_eq!(other.id_of(copy), Some("Bundle"));
    assert_eq!(other.class_of(copy).map(|class| class.name()), Some("Object"));
    assert_eq!(other.get::<Bar>(copy).unwrap().list, [4, 5]);
    assert!(other.get::<Foo>(copy).is_some());
}

#[test]
fn aspect_ids_are_claimed_before_children_are_read() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let ty = DerivedType::Composite(scene_type(&mut registry));
    let scene = universe.create_object(&ty, "Scene");
    let aspect = universe.cast_to::<Foo>(scene).unwrap();
    assert!(universe.rename_object(aspect, "MainFoo"));
    let child = universe.create::<Foo>(&mut registry, "Foo");
    assert_eq!(universe.id_of(child), Some("Foo"));
    universe.get_mut::<Scene>(scene).unwrap().children.push(child);

    let mut archive = Archive::new();
    archive.serialize(scene, &universe);

    // The child keeps `Foo` although the aspect is created as `Foo` too.
    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    let children = other.get::<Scene>(copy).unwrap().children.to_vec();
    assert_eq!(children.len(), 1);
    assert_eq!(other.id_of(children[0]), Some("Foo"));
    let copy_aspect = other.cast_to::<Foo>(copy).unwrap();
    assert_eq!(other.id_of(copy_aspect), Some("MainFoo"));

    let mut again = Archive::new();
    again.serialize(copy, &other);
    assert_eq!(again.tree(), archive.tree());
}

#[test]
fn nested_composite_round_trip() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let ty = DerivedType::Composite(nested_type(&mut registry));
    let nest = universe.create_object(&ty, "Nest");
    let inner = universe.cast_to::<Foo>(nest).unwrap();
    let bar = universe.cast_to::<Bar>(nest).unwrap();
    let tile = universe.cast_to::<Tile>(nest).unwrap();
    universe.get_mut::<Tile>(tile).unwrap().shape.sides = 4;
    universe.get_mut::<Foo>(inner).unwrap().foo = 9;
    universe.get_mut::<Bar>(bar).unwrap().foo = Ref::new(inner);

    let mut archive = Archive::new();
    archive.serialize(nest, &universe);
    let aspects = archive.tree().view(archive.get("aspects"));
    assert_eq!(aspects.at(1).get("class").as_str(), Some("Foo"));
    assert_eq!(aspects.at(1).get("aspects").at(0).get("foo").as_str(), Some("Foo"));

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert_eq!(other.len(), 4);
    assert_eq!(other.id_of(copy), Some("Nest"));
    let signature = other
        .type_of(copy)
        .and_then(DerivedType::as_composite)
        .map(|composite| composite.signature());
    assert_eq!(signature.as_deref(), Some("Scene[Tile, Foo[Bar]]"));

    // The reference crosses from the inner composite's aspect to its base.
    let copy_inner = other.cast_to::<Foo>(copy).unwrap();
    let copy_bar = other.cast_to::<Bar>(copy).unwrap();
    assert_eq!(other.parent(copy_bar), Some(copy_inner));
    assert_eq!(other.parent(copy_inner), Some(copy));
    assert_eq!(other.get::<Bar>(copy).unwrap().foo.get(), Some(copy_inner));
    assert_eq!(other.get::<Foo>(copy_inner).unwrap().foo, 9);
    assert_eq!(other.get::<Tile>(copy).unwrap().shape.sides, 4);

    let mut again = Archive::new();
    again.serialize(copy, &other);
    assert_eq!(again.tree(), archive.tree());
}
