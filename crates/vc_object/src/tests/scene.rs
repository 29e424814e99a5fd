use alloc::string::ToString;
use alloc::vec;

use vc_archive::ArchiveTree;

use crate::object::DerivedType;
use crate::registry::TypeRegistry;
use crate::relation::Ref;
use crate::serde::Archive;
use crate::tests::fixtures::{Bar, Foo, Scene, scene_type};
use crate::universe::{ObjectId, Universe};

const SCENE_TEXT: &str = r#"{ "root": {
    "class": "Scene",
    "id": "Scene",
    "children": [],
    "aspects": [
      {
        "class": "Foo",
        "id": "Foo",
        "foo": 123,
        "after_signal_received": [],
        "an_empty_signal": []
      },
      {
        "class": "Bar",
        "id": "Bar",
        "bar": 456,
        "list": [1, 2, 3],
        "foo": "Foo",
        "when_something_happens": [{"receiver": "Foo", "slot": "Signal receiver"}]
      }
    ]
  }
}
"#;

fn build_scene(registry: &mut TypeRegistry, universe: &mut Universe) -> ObjectId {
    let ty = DerivedType::Composite(scene_type(registry));
    let scene = universe.create_root(&ty, "Scene");
    let foo = universe.cast_to::<Foo>(scene).unwrap();
    let bar = universe.cast_to::<Bar>(scene).unwrap();

    let state = universe.get_mut::<Bar>(scene).unwrap();
    state.list = vec![1, 2, 3];
    state.foo = Ref::new(foo);
    assert!(universe.connect::<Bar, i32>(
        bar,
        |bar| &mut bar.when_something_happens,
        foo,
        "Signal receiver",
    ));
    scene
}

#[test]
fn composite_scene_text() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let scene = build_scene(&mut registry, &mut universe);

    let mut archive = Archive::new();
    archive.serialize(scene, &universe);
    assert_eq!(archive.to_string(), SCENE_TEXT);
}

#[test]
fn composite_scene_round_trip() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let scene = build_scene(&mut registry, &mut universe);

    let mut archive = Archive::new();
    archive.serialize(scene, &universe);

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert_eq!(other.len(), 3);
    assert_eq!(other.id_of(copy), Some("Scene"));
    assert_eq!(other.aspects(copy).len(), 2);

    let foo = other.cast_to::<Foo>(copy).unwrap();
    let bar = other.cast_to::<Bar>(copy).unwrap();
    assert_eq!(other.id_of(foo), Some("Foo"));
    assert_eq!(other.id_of(bar), Some("Bar"));
    assert_eq!(other.parent(bar), Some(copy));

    let state = other.get::<Bar>(copy).unwrap();
    assert_eq!(state.bar, 456);
    assert_eq!(state.list, [1, 2, 3]);
    assert_eq!(state.foo.get(), Some(foo));
    assert_eq!(other.get::<Foo>(bar).unwrap().foo, 123);

    let mut again = Archive::new();
    again.serialize(copy, &other);
    assert_eq!(again.tree(), archive.tree());
}

#[test]
fn restored_signal_reaches_slot_once() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let scene = build_scene(&mut registry, &mut universe);

    let mut archive = Archive::new();
    archive.serialize(scene, &universe);
    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();

    let delivered = other.emit::<Bar, i32>(copy, |bar| &bar.when_something_happens, 42);
    assert_eq!(delivered, 1);
    assert_eq!(other.get::<Foo>(copy).unwrap().received, [42]);

    // The source universe is untouched.
    assert!(universe.get::<Foo>(scene).unwrap().received.is_empty());
}

#[test]
fn loading_twice_keeps_links_inside_each_copy() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let scene = build_scene(&mut registry, &mut universe);
    let mut archive = Archive::new();
    archive.serialize(scene, &universe);

    let mut other = Universe::new();
    let first = archive.deserialize(&mut other, &mut registry).unwrap();
    let second = archive.deserialize(&mut other, &mut registry).unwrap();

    assert_eq!(other.id_of(second), Some("Scene01"));
    let second_foo = other.cast_to::<Foo>(second).unwrap();
    assert_eq!(other.id_of(second_foo), Some("Foo01"));
    assert_eq!(other.get::<Bar>(second).unwrap().foo.get(), Some(second_foo));
    assert_ne!(other.cast_to::<Foo>(first), Some(second_foo));

    other.emit::<Bar, i32>(second, |bar| &bar.when_something_happens, 1);
    assert!(other.get::<Foo>(first).unwrap().received.is_empty());
    assert_eq!(other.get::<Foo>(second).unwrap().received, [1]);
}

#[test]
fn child_list_archives_children_inline() {
    let mut registry = TypeRegistry::new();
    let mut universe = Universe::new();
    let scene = universe.create::<Scene>(&mut registry, "Stage");
    let foo = universe.create::<Foo>(&mut registry, "Actor");
    let bar = universe.create::<Bar>(&mut registry, "Prop");
    universe.get_mut::<Bar>(bar).unwrap().foo = Ref::new(foo);
    let children = &mut universe.get_mut::<Scene>(scene).unwrap().children;
    children.push(bar);
    children.push(foo);

    let mut archive = Archive::new();
    archive.serialize(scene, &universe);
    let view = archive.tree().root_ref();
    assert_eq!(view.get("children").len(), 2);
    assert_eq!(view.get("children").at(0).get("class").as_str(), Some("Bar"));
    assert_eq!(view.get("children").at(0).get("foo").as_str(), Some("Actor"));
    assert_eq!(view.get("children").at(1).get("id").as_str(), Some("Actor"));

    let mut other = Universe::new();
    let copy = archive.deserialize(&mut other, &mut registry).unwrap();
    assert_eq!(other.topmost().len(), 3);
    let children = other.get::<Scene>(copy).unwrap().children.to_vec();
    let actor = other.get_object("Actor").unwrap();
    let prop = other.get_object("Prop").unwrap();
    assert_eq!(children, [prop, actor]);
    assert_eq!(other.get::<Bar>(prop).unwrap().foo.get(), Some(actor));
}

#[test]
fn text_form_reads_back() {
    let mut registry = TypeRegistry::new();
    scene_type(&mut registry);
    let tree: ArchiveTree = serde_json::from_str(SCENE_TEXT).unwrap();

    let mut archive = Archive::from(tree);
    let mut universe = Universe::new();
    let scene = archive.deserialize(&mut universe, &mut registry).unwrap();

    assert_eq!(universe.get::<Bar>(scene).unwrap().list, [1, 2, 3]);
    assert_eq!(
        universe.emit::<Bar, i32>(scene, |bar| &bar.when_something_happens, 3),
        1
    );
    assert_eq!(archive.to_string(), SCENE_TEXT);
}
