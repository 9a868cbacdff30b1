//! `Reflect` implementations for std (and optionally chrono) types.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::time::{Duration, SystemTime};

use indexmap::IndexMap;

use crate::error::CopyError;
use crate::reflect::{
    assign_cloned, ArrayValue, ListValue, MapValue, PointerValue, Reflect, ReflectMut, ReflectRef,
    StructValue,
};

/// The methods every `Clone` implementor writes the same way.
macro_rules! reflect_common {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn clone_value(&self) -> Box<dyn Reflect> {
            Box::new(self.clone())
        }

        fn assign(&mut self, source: &dyn Reflect) -> Result<(), CopyError> {
            assign_cloned(self, source)
        }
    };
}

macro_rules! impl_reflect_primitive {
    ($($t:ty),* $(,)?) => {
        $(
            impl Reflect for $t {
                reflect_common!();

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Primitive
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Primitive
                }

                fn new_zeroed(&self) -> Box<dyn Reflect> {
                    Box::new(<$t as Default>::default())
                }
            }
        )*
    };
}

impl_reflect_primitive!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    String, &'static str, Duration, (),
);

/// Types whose internals are private: a struct with no visible fields.
/// Without an as-is registration a copy leaves the destination at its zero value.
macro_rules! impl_reflect_sealed_struct {
    ($t:ty, $zero:expr) => {
        impl Reflect for $t {
            reflect_common!();

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Struct(self)
            }

            fn new_zeroed(&self) -> Box<dyn Reflect> {
                Box::new($zero)
            }
        }

        impl StructValue for $t {
            fn field_len(&self) -> usize {
                0
            }

            fn field_name(&self, _index: usize) -> Option<&'static str> {
                None
            }

            fn field(&self, _index: usize) -> Option<&dyn Reflect> {
                None
            }

            fn field_mut(&mut self, _index: usize) -> Option<&mut dyn Reflect> {
                None
            }
        }
    };
}

// No `Default`: usable as a root value only, see the `Reflect` docs.
impl_reflect_sealed_struct!(SystemTime, SystemTime::UNIX_EPOCH);

#[cfg(feature = "chrono")]
impl_reflect_sealed_struct!(chrono::DateTime<chrono::Utc>, chrono::DateTime::<chrono::Utc>::default());
#[cfg(feature = "chrono")]
impl_reflect_sealed_struct!(
    chrono::DateTime<chrono::FixedOffset>,
    chrono::DateTime::<chrono::FixedOffset>::default()
);
#[cfg(feature = "chrono")]
impl_reflect_sealed_struct!(chrono::NaiveDateTime, chrono::NaiveDateTime::default());

impl<T: ?Sized + 'static> Reflect for PhantomData<T> {
    reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Other
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Other
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(PhantomData::<T>)
    }
}

// Option<T> is a nullable owning pointer: no identity, never shared.
impl<T: Reflect + Clone + Default> Reflect for Option<T> {
    reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(None::<T>)
    }
}

impl<T: Reflect + Clone + Default> PointerValue for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn identity(&self) -> Option<usize> {
        None
    }

    fn allocate(&mut self) {
        *self = Some(T::default());
    }

    fn shared(&self) -> Option<std::rc::Rc<dyn Any>> {
        None
    }

    fn set_shared(&mut self, _target: std::rc::Rc<dyn Any>) -> Result<(), CopyError> {
        Err(CopyError::failed("Option cannot share an allocation"))
    }

    fn with_pointee(
        &self,
        f: &mut dyn FnMut(&dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        match self {
            Some(value) => f(value),
            None => Err(CopyError::failed("dereference of None")),
        }
    }

    fn with_pointee_mut(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        match self {
            Some(value) => f(value),
            None => Err(CopyError::failed("dereference of None")),
        }
    }
}

// Box<T> is a non-null owning pointer.
impl<T: Reflect + Clone + Default> Reflect for Box<T> {
    reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(Box::new(T::default()))
    }
}

impl<T: Reflect + Clone + Default> PointerValue for Box<T> {
    fn is_null(&self) -> bool {
        false
    }

    fn identity(&self) -> Option<usize> {
        None
    }

    fn allocate(&mut self) {}

    fn shared(&self) -> Option<std::rc::Rc<dyn Any>> {
        None
    }

    fn set_shared(&mut self, _target: std::rc::Rc<dyn Any>) -> Result<(), CopyError> {
        Err(CopyError::failed("Box cannot share an allocation"))
    }

    fn with_pointee(
        &self,
        f: &mut dyn FnMut(&dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        f(&**self)
    }

    fn with_pointee_mut(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        f(&mut **self)
    }
}

impl<T: Reflect + Clone + Default, const N: usize> Reflect for [T; N] {
    reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Array(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Array(self)
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(std::array::from_fn::<T, N, _>(|_| T::default()))
    }
}

impl<T: Reflect + Clone + Default, const N: usize> ArrayValue for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|value| value as &dyn Reflect)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|value| value as &mut dyn Reflect)
    }
}

macro_rules! impl_reflect_list {
    ($list:ident) => {
        impl<T: Reflect + Clone + Default> Reflect for $list<T> {
            reflect_common!();

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Slice(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Slice(self)
            }

            fn new_zeroed(&self) -> Box<dyn Reflect> {
                Box::new($list::<T>::new())
            }
        }

        impl<T: Reflect + Clone + Default> ArrayValue for $list<T> {
            fn len(&self) -> usize {
                $list::len(self)
            }

            fn element(&self, index: usize) -> Option<&dyn Reflect> {
                self.get(index).map(|value| value as &dyn Reflect)
            }

            fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
                self.get_mut(index).map(|value| value as &mut dyn Reflect)
            }
        }

        impl<T: Reflect + Clone + Default> ListValue for $list<T> {
            fn capacity(&self) -> usize {
                $list::capacity(self)
            }

            fn reallocate(&mut self, len: usize, capacity: usize) {
                let mut fresh = $list::with_capacity(capacity.max(len));
                fresh.resize_with(len, T::default);
                *self = fresh;
            }
        }
    };
}

impl_reflect_list!(Vec);
impl_reflect_list!(VecDeque);

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: Reflect + Clone + Default + Eq + Hash,
    V: Reflect + Clone + Default,
    S: BuildHasher + Clone + Default + 'static,
{
    reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(HashMap::<K, V, S>::default())
    }
}

impl<K, V, S> MapValue for HashMap<K, V, S>
where
    K: Reflect + Clone + Default + Eq + Hash,
    V: Reflect + Clone + Default,
    S: BuildHasher + Clone + Default + 'static,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(
            self.iter()
                .map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect)),
        )
    }

    fn reallocate(&mut self, capacity: usize) {
        *self = HashMap::with_capacity_and_hasher(capacity, S::default());
    }

    fn insert_with(
        &mut self,
        fill: &mut dyn FnMut(&mut dyn Reflect, &mut dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        let mut key = K::default();
        let mut value = V::default();
        fill(&mut key, &mut value)?;
        self.insert(key, value);
        Ok(())
    }
}

impl<K, V, S> Reflect for IndexMap<K, V, S>
where
    K: Reflect + Clone + Default + Eq + Hash,
    V: Reflect + Clone + Default,
    S: BuildHasher + Clone + Default + 'static,
{
    reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(IndexMap::<K, V, S>::default())
    }
}

impl<K, V, S> MapValue for IndexMap<K, V, S>
where
    K: Reflect + Clone + Default + Eq + Hash,
    V: Reflect + Clone + Default,
    S: BuildHasher + Clone + Default + 'static,
{
    fn len(&self) -> usize {
        IndexMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(
            self.iter()
                .map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect)),
        )
    }

    fn reallocate(&mut self, capacity: usize) {
        *self = IndexMap::with_capacity_and_hasher(capacity, S::default());
    }

    fn insert_with(
        &mut self,
        fill: &mut dyn FnMut(&mut dyn Reflect, &mut dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        let mut key = K::default();
        let mut value = V::default();
        fill(&mut key, &mut value)?;
        self.insert(key, value);
        Ok(())
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Clone + Default + Ord,
    V: Reflect + Clone + Default,
{
    reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(BTreeMap::<K, V>::new())
    }
}

impl<K, V> MapValue for BTreeMap<K, V>
where
    K: Reflect + Clone + Default + Ord,
    V: Reflect + Clone + Default,
{
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(
            self.iter()
                .map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect)),
        )
    }

    // B-trees do not preallocate.
    fn reallocate(&mut self, _capacity: usize) {
        *self = BTreeMap::new();
    }

    fn insert_with(
        &mut self,
        fill: &mut dyn FnMut(&mut dyn Reflect, &mut dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        let mut key = K::default();
        let mut value = V::default();
        fill(&mut key, &mut value)?;
        self.insert(key, value);
        Ok(())
    }
}

// Tuples are records whose fields are named by position.
macro_rules! impl_reflect_tuple {
    ($len:expr; $($index:tt $name:ident),+) => {
        impl<$($name: Reflect + Clone + Default),+> Reflect for ($($name,)+) {
            reflect_common!();

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Struct(self)
            }

            fn new_zeroed(&self) -> Box<dyn Reflect> {
                Box::new(<($($name,)+) as Default>::default())
            }
        }

        impl<$($name: Reflect + Clone + Default),+> StructValue for ($($name,)+) {
            fn field_len(&self) -> usize {
                $len
            }

            fn field_name(&self, index: usize) -> Option<&'static str> {
                match index {
                    $($index => Some(stringify!($index)),)+
                    _ => None,
                }
            }

            fn field(&self, index: usize) -> Option<&dyn Reflect> {
                match index {
                    $($index => Some(&self.$index as &dyn Reflect),)+
                    _ => None,
                }
            }

            fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
                match index {
                    $($index => Some(&mut self.$index as &mut dyn Reflect),)+
                    _ => None,
                }
            }
        }
    };
}

impl_reflect_tuple!(1; 0 A);
impl_reflect_tuple!(2; 0 A, 1 B);
impl_reflect_tuple!(3; 0 A, 1 B, 2 C);
impl_reflect_tuple!(4; 0 A, 1 B, 2 C, 3 D);
impl_reflect_tuple!(5; 0 A, 1 B, 2 C, 3 D, 4 E);
impl_reflect_tuple!(6; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Kind;

    #[test]
    fn kinds_of_std_types() {
        assert_eq!(5u8.kind(), Kind::Primitive);
        assert_eq!(String::new().kind(), Kind::Primitive);
        assert_eq!(Duration::from_secs(1).kind(), Kind::Primitive);
        assert_eq!(SystemTime::now().kind(), Kind::Struct);
        assert_eq!(Some(1u8).kind(), Kind::Pointer);
        assert_eq!(Box::new(1u8).kind(), Kind::Pointer);
        assert_eq!(vec![1u8].kind(), Kind::Slice);
        assert_eq!(VecDeque::<u8>::new().kind(), Kind::Slice);
        assert_eq!([1u8; 3].kind(), Kind::Array);
        assert_eq!(HashMap::<u8, u8>::new().kind(), Kind::Map);
        assert_eq!(BTreeMap::<u8, u8>::new().kind(), Kind::Map);
        assert_eq!(IndexMap::<u8, u8>::new().kind(), Kind::Map);
        assert_eq!((1u8, String::new()).kind(), Kind::Struct);
        assert_eq!(PhantomData::<str>.kind(), Kind::Other);
    }

    #[test]
    fn new_zeroed_matches_default() {
        let zero = 17u64.new_zeroed();
        assert_eq!(zero.downcast_ref::<u64>(), Some(&0));

        let zero = [7i32; 4].new_zeroed();
        assert_eq!(zero.downcast_ref::<[i32; 4]>(), Some(&[0; 4]));

        let zero = SystemTime::now().new_zeroed();
        assert_eq!(zero.downcast_ref::<SystemTime>(), Some(&SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn list_reallocate_fills_zero_values() {
        let mut list = vec![String::from("old")];
        ListValue::reallocate(&mut list, 3, 10);
        assert_eq!(list, vec![String::new(), String::new(), String::new()]);
        assert!(list.capacity() >= 10);
    }

    #[test]
    fn map_insert_with_fills_fresh_slots() {
        let mut map: BTreeMap<u8, String> = BTreeMap::new();
        map.insert_with(&mut |key: &mut dyn Reflect, value: &mut dyn Reflect| {
            key.assign(&3u8)?;
            value.assign(&String::from("three"))
        })
        .unwrap();
        assert_eq!(map.get(&3).map(String::as_str), Some("three"));
    }

    #[test]
    fn tuple_fields_by_position() {
        let pair = (1u8, String::from("b"));
        assert_eq!(pair.field_len(), 2);
        assert_eq!(pair.field_name(1), Some("1"));
        assert_eq!(
            pair.field(1).and_then(|f| f.downcast_ref::<String>()).map(String::as_str),
            Some("b")
        );
        assert!(pair.field(2).is_none());
    }
}
