use std::any::Any;
use std::fmt;

use crate::error::CopyError;
use crate::reflect::{assign_cloned, DynamicValue, Reflect, ReflectMut, ReflectRef};

/// A slot holding a value of any reflected type, or nothing.
///
/// The concrete type is only known at runtime; a deep copy allocates a fresh
/// value of that same type.
#[derive(Default)]
pub struct Dynamic(Option<Box<dyn Reflect>>);

impl Dynamic {
    pub fn new<T: Reflect>(value: T) -> Self {
        Dynamic(Some(Box::new(value)))
    }

    pub fn empty() -> Self {
        Dynamic(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&dyn Reflect> {
        self.0.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut (dyn Reflect + 'static)> {
        self.0.as_deref_mut()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.get().and_then(|value| value.downcast_ref::<T>())
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.get_mut().and_then(|value| value.downcast_mut::<T>())
    }

    pub fn take(&mut self) -> Option<Box<dyn Reflect>> {
        self.0.take()
    }
}

impl Clone for Dynamic {
    fn clone(&self) -> Self {
        Dynamic(self.0.as_ref().map(|value| value.clone_value()))
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "Dynamic({})", value.type_info()),
            None => f.write_str("Dynamic(empty)"),
        }
    }
}

impl Reflect for Dynamic {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Dynamic(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Dynamic(self)
    }

    fn clone_value(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(Dynamic::empty())
    }

    fn assign(&mut self, source: &dyn Reflect) -> Result<(), CopyError> {
        assign_cloned(self, source)
    }
}

impl DynamicValue for Dynamic {
    fn get(&self) -> Option<&dyn Reflect> {
        self.0.as_deref()
    }

    fn set(&mut self, value: Option<Box<dyn Reflect>>) {
        self.0 = value;
    }
}
