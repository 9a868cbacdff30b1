use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::SystemTime;

use crate::error::CopyError;
use crate::options::CopyOption;
use crate::reflect::{
    ArrayValue, EnumValue, ListValue, MapValue, PointerValue, Reflect, ReflectMut, ReflectRef,
    StructValue, TypeInfo,
};

/// Types copied as-is unless the caller says otherwise: absolute time values,
/// whose internals are not visible.
fn default_as_is() -> HashSet<TypeId> {
    let mut types = HashSet::new();
    types.insert(TypeId::of::<SystemTime>());
    #[cfg(feature = "chrono")]
    {
        types.insert(TypeId::of::<chrono::DateTime<chrono::Utc>>());
        types.insert(TypeId::of::<chrono::DateTime<chrono::FixedOffset>>());
        types.insert(TypeId::of::<chrono::NaiveDateTime>());
    }
    types
}

/// State threaded through one deep copy.
///
/// Responsibilities:
/// - Dispatch: picks the copy policy for each value by its kind
/// - Identity cache: remembers the clone of every shared allocation already
///   visited, when cycle detection is on
/// - As-is set: types assigned by shallow clone instead of being walked
///
/// A processor lives for exactly one top-level copy.
pub(crate) struct Processor {
    cache: Option<HashMap<usize, Rc<dyn Any>>>,
    as_is: HashSet<TypeId>,
}

impl Processor {
    pub(crate) fn new() -> Self {
        Processor {
            cache: None,
            as_is: default_as_is(),
        }
    }

    pub(crate) fn with_options(options: &[CopyOption]) -> Self {
        let mut processor = Processor::new();
        for option in options {
            match option {
                CopyOption::CycleDetection => {
                    processor.cache.get_or_insert_with(HashMap::new);
                }
                CopyOption::AsIs(types) => {
                    processor.as_is.extend(types.iter().map(TypeInfo::id));
                }
            }
        }
        processor
    }

    pub(crate) fn detects_cycles(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) fn cached_identities(&self) -> usize {
        self.cache.as_ref().map_or(0, HashMap::len)
    }

    /// Copies `src` into `dst`, which must be of the same concrete type.
    pub(crate) fn copy_value(
        &mut self,
        src: &dyn Reflect,
        dst: &mut dyn Reflect,
    ) -> Result<(), CopyError> {
        let ty = src.type_info();
        if self.as_is.contains(&ty.id()) {
            return dst.assign(src);
        }

        // Kinds copied by assignment (or not at all) need `dst` as a whole.
        match src.reflect_ref() {
            ReflectRef::Primitive => return dst.assign(src),
            ReflectRef::Func(func) if func.is_null() => return Ok(()),
            ReflectRef::Func(_) => return dst.assign(src),
            ReflectRef::Other => return Ok(()),
            _ => {}
        }

        match (src.reflect_ref(), dst.reflect_mut()) {
            (ReflectRef::Struct(s), ReflectMut::Struct(d)) => self.copy_struct(ty, s, d),
            (ReflectRef::Enum(s), ReflectMut::Enum(d)) => self.copy_enum(ty, s, d),
            (ReflectRef::Pointer(s), ReflectMut::Pointer(d)) => self.copy_pointer(s, d),
            (ReflectRef::Slice(s), ReflectMut::Slice(d)) => self.copy_slice(s, d),
            (ReflectRef::Array(s), ReflectMut::Array(d)) => self.copy_elements(s, d),
            (ReflectRef::Map(s), ReflectMut::Map(d)) => self.copy_map(s, d),
            (ReflectRef::Dynamic(s), ReflectMut::Dynamic(d)) => {
                let Some(held) = s.get() else {
                    return Ok(());
                };
                let mut fresh = held.new_zeroed();
                self.copy_value(held, fresh.as_mut())?;
                d.set(Some(fresh));
                Ok(())
            }
            (ReflectRef::Channel(s), ReflectMut::Channel(d)) => {
                if !s.is_null() {
                    d.make(s.capacity());
                }
                Ok(())
            }
            (s, d) => Err(CopyError::failed(format!(
                "{ty}: source is a {:?} but destination is a {:?}",
                s.kind(),
                d.kind()
            ))),
        }
    }

    fn copy_struct(
        &mut self,
        ty: TypeInfo,
        src: &dyn StructValue,
        dst: &mut dyn StructValue,
    ) -> Result<(), CopyError> {
        for index in 0..src.field_len() {
            match (src.field(index), dst.field_mut(index)) {
                (Some(value), Some(target)) => self.copy_value(value, target)?,
                _ => log::trace!(
                    "{ty}: skipping unassignable field {}",
                    src.field_name(index).unwrap_or("?")
                ),
            }
        }
        Ok(())
    }

    fn copy_enum(
        &mut self,
        ty: TypeInfo,
        src: &dyn EnumValue,
        dst: &mut dyn EnumValue,
    ) -> Result<(), CopyError> {
        let variant = src.variant_index();
        if dst.variant_index() != variant && !dst.set_variant(variant) {
            return Err(CopyError::failed(format!(
                "{ty}: no variant {} on destination",
                src.variant_name()
            )));
        }
        for index in 0..src.field_len() {
            match (src.field(index), dst.field_mut(index)) {
                (Some(value), Some(target)) => self.copy_value(value, target)?,
                _ => log::trace!(
                    "{ty}::{}: skipping unassignable field {}",
                    src.variant_name(),
                    src.field_name(index).unwrap_or("?")
                ),
            }
        }
        Ok(())
    }

    fn copy_pointer(
        &mut self,
        src: &dyn PointerValue,
        dst: &mut dyn PointerValue,
    ) -> Result<(), CopyError> {
        if src.is_null() {
            return Ok(());
        }

        let identity = src.identity();
        if let (Some(cache), Some(id)) = (self.cache.as_ref(), identity) {
            if let Some(clone) = cache.get(&id) {
                log::trace!("allocation {id:#x} already copied, sharing its clone");
                return dst.set_shared(Rc::clone(clone));
            }
        }

        if dst.is_null() {
            dst.allocate();
        }

        // Register before recursing so a cycle back to this allocation finds
        // the (still filling) clone instead of descending again.
        if let (Some(cache), Some(id)) = (self.cache.as_mut(), identity) {
            if let Some(clone) = dst.shared() {
                cache.insert(id, clone);
            }
        }

        src.with_pointee(&mut |pointee: &dyn Reflect| {
            dst.with_pointee_mut(&mut |target: &mut dyn Reflect| self.copy_value(pointee, target))
        })
    }

    fn copy_slice(&mut self, src: &dyn ListValue, dst: &mut dyn ListValue) -> Result<(), CopyError> {
        dst.reallocate(src.len(), src.capacity());
        self.copy_elements(src, dst)
    }

    fn copy_elements<S, D>(&mut self, src: &S, dst: &mut D) -> Result<(), CopyError>
    where
        S: ArrayValue + ?Sized,
        D: ArrayValue + ?Sized,
    {
        for index in 0..src.len() {
            if let (Some(value), Some(target)) = (src.element(index), dst.element_mut(index)) {
                self.copy_value(value, target)?;
            }
        }
        Ok(())
    }

    fn copy_map(&mut self, src: &dyn MapValue, dst: &mut dyn MapValue) -> Result<(), CopyError> {
        dst.reallocate(src.len());
        for (key, value) in src.entries() {
            dst.insert_with(&mut |new_key: &mut dyn Reflect, new_value: &mut dyn Reflect| {
                self.copy_value(key, new_key)?;
                self.copy_value(value, new_value)
            })?;
        }
        Ok(())
    }
}
