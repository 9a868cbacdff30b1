use std::collections::BTreeMap;

use deepcopy_core::{
    deep_copy, reflected, CopyOption, EnumValue, Kind, Ptr, Reflect, ReflectRef, StructValue,
};

#[reflected]
struct Named {
    id: u32,
    #[reflect(skip)]
    cache: Vec<u8>,
    tags: Vec<String>,
}

#[reflected]
struct Pair(String, #[reflect(skip)] u8, Ptr<String>);

#[reflected]
struct Unit;

#[reflected]
enum Shape {
    #[default]
    Empty,
    Circle(f64),
    Rect {
        width: f64,
        height: f64,
        #[reflect(skip)]
        hint: u8,
    },
    Path(Vec<(i32, i32)>, Ptr<String>),
}

#[reflected]
struct Wrapper<T> {
    value: T,
    history: Vec<T>,
}

#[reflected]
struct Bounded<T>
where
    T: Clone,
{
    value: T,
    spare: Option<T>,
}

mod reexport {
    pub use deepcopy_core as dc;
}

#[derive(Debug, Clone, Default, deepcopy_core::Reflect)]
#[reflect(crate = "reexport::dc")]
struct Renamed {
    value: Option<u8>,
}

#[test]
fn struct_view_lists_every_field() {
    let named = Named {
        id: 7,
        cache: vec![1],
        tags: vec![String::from("t")],
    };
    assert_eq!(named.kind(), Kind::Struct);
    assert_eq!(named.field_len(), 3);
    assert_eq!(named.field_name(1), Some("cache"));
    assert!(named.field(1).is_none());
    assert_eq!(
        named.field(0).and_then(|f| f.downcast_ref::<u32>()),
        Some(&7)
    );
    assert!(named.field(3).is_none());
}

#[test]
fn skipped_struct_fields_keep_destination() {
    let named = Named {
        id: 1,
        cache: vec![9, 9],
        tags: vec![String::from("a"), String::from("b")],
    };
    let copied = deep_copy(&named, &[]).unwrap();
    assert_eq!(copied.id, 1);
    assert_eq!(copied.tags, named.tags);
    assert!(copied.cache.is_empty());
}

#[test]
fn tuple_struct_fields_by_position() {
    let pair = Pair(String::from("left"), 3, Ptr::new(String::from("right")));
    assert_eq!(pair.field_name(2), Some("2"));

    let copied = deep_copy(&pair, &[]).unwrap();
    assert_eq!(copied.0, "left");
    assert_eq!(copied.1, 0);
    assert!(!copied.2.ptr_eq(&pair.2));
    assert_eq!(*copied.2.borrow(), "right");

    assert_eq!(Unit.field_len(), 0);
    assert!(deep_copy(&Unit, &[]).is_ok());
}

#[test]
fn enum_view_follows_current_variant() {
    let shape = Shape::Rect {
        width: 2.0,
        height: 3.0,
        hint: 1,
    };
    assert_eq!(shape.kind(), Kind::Enum);
    assert_eq!(shape.variant_index(), 2);
    assert_eq!(shape.variant_name(), "Rect");
    assert_eq!(EnumValue::field_len(&shape), 3);
    assert_eq!(EnumValue::field_name(&shape, 1), Some("height"));
    assert!(EnumValue::field(&shape, 2).is_none());

    let mut zero = Shape::default();
    assert!(zero.set_variant(1));
    assert!(matches!(zero, Shape::Circle(r) if r == 0.0));
    assert!(!zero.set_variant(4));
}

#[test]
fn enum_copies_switch_variant() {
    let rect = Shape::Rect {
        width: 2.0,
        height: 3.0,
        hint: 9,
    };
    match deep_copy(&rect, &[]).unwrap() {
        Shape::Rect {
            width,
            height,
            hint,
        } => {
            assert_eq!((width, height), (2.0, 3.0));
            assert_eq!(hint, 0);
        }
        other => panic!("wrong variant: {other:?}"),
    }

    let label = Ptr::new(String::from("route"));
    let path = Shape::Path(vec![(0, 0), (1, 2)], label.clone());
    match deep_copy(&path, &[]).unwrap() {
        Shape::Path(points, copied_label) => {
            assert_eq!(points, vec![(0, 0), (1, 2)]);
            assert!(!copied_label.ptr_eq(&label));
            assert_eq!(*copied_label.borrow(), "route");
        }
        other => panic!("wrong variant: {other:?}"),
    }

    assert!(matches!(deep_copy(&Shape::Empty, &[]).unwrap(), Shape::Empty));
}

#[test]
fn generic_types() {
    let shared = Ptr::new(1i32);
    let wrapper = Wrapper {
        value: shared.clone(),
        history: vec![shared.clone(), shared.clone()],
    };

    let copied = deep_copy(&wrapper, &[CopyOption::CycleDetection]).unwrap();
    assert!(!copied.value.ptr_eq(&shared));
    assert!(copied.history.iter().all(|p| p.ptr_eq(&copied.value)));

    let mut scores = BTreeMap::new();
    scores.insert(String::from("a"), 1u64);
    let wrapper = Wrapper {
        value: scores.clone(),
        history: vec![],
    };
    assert_eq!(deep_copy(&wrapper, &[]).unwrap().value, scores);
}

#[test]
fn crate_path_attribute() {
    let renamed = Renamed { value: Some(4) };
    assert!(matches!(renamed.reflect_ref(), ReflectRef::Struct(_)));
    assert_eq!(deep_copy(&renamed, &[]).unwrap().value, Some(4));
}

#[test]
fn trailing_comma_where_clause() {
    let pointer = Ptr::new(String::from("bounded"));
    let bounded = Bounded {
        value: pointer.clone(),
        spare: Some(pointer.clone()),
    };

    let copied = deep_copy(&bounded, &[CopyOption::CycleDetection]).unwrap();
    assert!(!copied.value.ptr_eq(&pointer));
    assert_eq!(*copied.value.borrow(), "bounded");
    assert!(copied.spare.is_some_and(|spare| spare.ptr_eq(&copied.value)));
}
