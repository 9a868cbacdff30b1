use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::CopyError;

/// Runtime identity of a concrete type, with its name kept for messages.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The structural category of a value. Drives the copy policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Struct,
    Enum,
    Pointer,
    Slice,
    Array,
    Map,
    Dynamic,
    Channel,
    Func,
    Primitive,
    /// Nothing the engine knows how to copy; the destination is left alone.
    Other,
}

/// A value whose shape can be inspected and rebuilt at runtime.
///
/// Implemented by `#[derive(Reflect)]` for user types and by this crate for
/// the std types it supports. Implementors are expected to be `Clone` (used for
/// shallow assignment) and `Default` (their zero value).
///
/// # Time values
///
/// `std::time::SystemTime` has no `Default`, so it can only be copied as the
/// root value (`copy` into an existing destination), never as a field of a
/// derived type or an element of a container. Use the chrono date-time types
/// (feature `chrono`, on by default) inside copied structs; they are copied
/// as-is like `SystemTime`.
///
/// ```compile_fail
/// use std::time::SystemTime;
///
/// #[deepcopy_core::reflected]
/// struct Stamped {
///     at: SystemTime,
/// }
/// ```
pub trait Reflect: Any {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<Self>()
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Shallow clone: shared pointers stay shared.
    fn clone_value(&self) -> Box<dyn Reflect>;

    /// A zero value of the same concrete type.
    fn new_zeroed(&self) -> Box<dyn Reflect>;

    /// Replaces `self` with a shallow clone of `source`, which must have the
    /// same concrete type.
    fn assign(&mut self, source: &dyn Reflect) -> Result<(), CopyError>;

    fn kind(&self) -> Kind {
        self.reflect_ref().kind()
    }
}

impl dyn Reflect {
    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Reflect({})", self.type_info())
    }
}

/// Downcasts a reflected value, failing with `TypeMismatch` on the wrong type.
pub fn downcast<T: Reflect>(value: &dyn Reflect) -> Result<&T, CopyError> {
    value
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| CopyError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found: value.type_info().name(),
        })
}

/// `Reflect::assign` for any `Clone` implementor.
pub fn assign_cloned<T: Reflect + Clone>(target: &mut T, source: &dyn Reflect) -> Result<(), CopyError> {
    *target = downcast::<T>(source)?.clone();
    Ok(())
}

/// Read-only view of a value, tagged by kind.
pub enum ReflectRef<'a> {
    Struct(&'a dyn StructValue),
    Enum(&'a dyn EnumValue),
    Pointer(&'a dyn PointerValue),
    Slice(&'a dyn ListValue),
    Array(&'a dyn ArrayValue),
    Map(&'a dyn MapValue),
    Dynamic(&'a dyn DynamicValue),
    Channel(&'a dyn ChannelValue),
    Func(&'a dyn FuncValue),
    Primitive,
    Other,
}

impl ReflectRef<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectRef::Struct(_) => Kind::Struct,
            ReflectRef::Enum(_) => Kind::Enum,
            ReflectRef::Pointer(_) => Kind::Pointer,
            ReflectRef::Slice(_) => Kind::Slice,
            ReflectRef::Array(_) => Kind::Array,
            ReflectRef::Map(_) => Kind::Map,
            ReflectRef::Dynamic(_) => Kind::Dynamic,
            ReflectRef::Channel(_) => Kind::Channel,
            ReflectRef::Func(_) => Kind::Func,
            ReflectRef::Primitive => Kind::Primitive,
            ReflectRef::Other => Kind::Other,
        }
    }
}

/// Mutable view of a value, tagged by kind.
pub enum ReflectMut<'a> {
    Struct(&'a mut dyn StructValue),
    Enum(&'a mut dyn EnumValue),
    Pointer(&'a mut dyn PointerValue),
    Slice(&'a mut dyn ListValue),
    Array(&'a mut dyn ArrayValue),
    Map(&'a mut dyn MapValue),
    Dynamic(&'a mut dyn DynamicValue),
    Channel(&'a mut dyn ChannelValue),
    Func(&'a mut dyn FuncValue),
    Primitive,
    Other,
}

impl ReflectMut<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectMut::Struct(_) => Kind::Struct,
            ReflectMut::Enum(_) => Kind::Enum,
            ReflectMut::Pointer(_) => Kind::Pointer,
            ReflectMut::Slice(_) => Kind::Slice,
            ReflectMut::Array(_) => Kind::Array,
            ReflectMut::Map(_) => Kind::Map,
            ReflectMut::Dynamic(_) => Kind::Dynamic,
            ReflectMut::Channel(_) => Kind::Channel,
            ReflectMut::Func(_) => Kind::Func,
            ReflectMut::Primitive => Kind::Primitive,
            ReflectMut::Other => Kind::Other,
        }
    }
}

/// A record with positional fields.
///
/// `field_len` counts every declared field. Fields that are not readable or not
/// assignable return `None` and are skipped by the copy.
pub trait StructValue {
    fn field_len(&self) -> usize;
    fn field_name(&self, index: usize) -> Option<&'static str>;
    fn field(&self, index: usize) -> Option<&dyn Reflect>;
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// A sum type. Field accessors address the fields of the current variant.
pub trait EnumValue {
    fn variant_index(&self) -> usize;
    fn variant_name(&self) -> &'static str;
    /// Switches to the zero value of the given variant. Returns false if the
    /// index is out of range.
    fn set_variant(&mut self, index: usize) -> bool;
    fn field_len(&self) -> usize;
    fn field_name(&self, index: usize) -> Option<&'static str>;
    fn field(&self, index: usize) -> Option<&dyn Reflect>;
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// A nullable reference to a single pointee.
pub trait PointerValue {
    fn is_null(&self) -> bool;

    /// Address of the pointee allocation, for pointers that can alias.
    fn identity(&self) -> Option<usize>;

    /// Points `self` at a fresh zero value.
    fn allocate(&mut self);

    /// Type-erased handle to the allocation, for pointers that can alias.
    fn shared(&self) -> Option<Rc<dyn Any>>;

    /// Points `self` at an allocation previously returned by `shared`.
    fn set_shared(&mut self, target: Rc<dyn Any>) -> Result<(), CopyError>;

    fn with_pointee(
        &self,
        f: &mut dyn FnMut(&dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError>;

    fn with_pointee_mut(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError>;
}

/// Fixed-length sequence stored inline.
pub trait ArrayValue {
    fn len(&self) -> usize;
    fn element(&self, index: usize) -> Option<&dyn Reflect>;
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Growable sequence with its own backing store.
pub trait ListValue: ArrayValue {
    fn capacity(&self) -> usize;

    /// Replaces the backing store with a new one holding `len` zero values.
    fn reallocate(&mut self, len: usize, capacity: usize);
}

pub trait MapValue {
    fn len(&self) -> usize;

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_>;

    /// Replaces `self` with an empty map able to hold `capacity` entries.
    fn reallocate(&mut self, capacity: usize);

    /// Creates a zero key and a zero value, lets `fill` populate them, then
    /// inserts the pair.
    fn insert_with(
        &mut self,
        fill: &mut dyn FnMut(&mut dyn Reflect, &mut dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A holder for a value whose concrete type is only known at runtime.
pub trait DynamicValue {
    fn get(&self) -> Option<&dyn Reflect>;
    fn set(&mut self, value: Option<Box<dyn Reflect>>);
}

pub trait ChannelValue {
    fn is_null(&self) -> bool;
    /// `None` for unbounded channels.
    fn capacity(&self) -> Option<usize>;
    /// Replaces `self` with a new empty channel.
    fn make(&mut self, capacity: Option<usize>);
}

pub trait FuncValue {
    fn is_null(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_info_equality_ignores_name() {
        assert_eq!(TypeInfo::of::<u32>(), TypeInfo::of::<u32>());
        assert_ne!(TypeInfo::of::<u32>(), TypeInfo::of::<i32>());
        assert_eq!(TypeInfo::of::<String>().name(), "alloc::string::String");
    }

    #[test]
    fn downcast_reports_both_types() {
        let value: Box<dyn Reflect> = Box::new(7u8);
        assert_eq!(*downcast::<u8>(value.as_ref()).unwrap(), 7);

        let err = downcast::<String>(value.as_ref()).unwrap_err();
        match err {
            CopyError::TypeMismatch { expected, found } => {
                assert_eq!(expected, "alloc::string::String");
                assert_eq!(found, "u8");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn assign_cloned_replaces_value() {
        let mut target = String::from("old");
        let source = String::from("new");
        assign_cloned(&mut target, &source).unwrap();
        assert_eq!(target, "new");
        assert!(assign_cloned(&mut target, &1u64).is_err());
    }

    #[test]
    fn dyn_reflect_downcast() {
        let mut value: Box<dyn Reflect> = Box::new(3i64);
        assert!(value.is::<i64>());
        assert!(!value.is::<u64>());
        *value.downcast_mut::<i64>().unwrap() += 1;
        assert_eq!(value.downcast_ref::<i64>(), Some(&4));
        assert_eq!(value.kind(), Kind::Primitive);
    }
}
