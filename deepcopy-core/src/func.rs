use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::CopyError;
use crate::reflect::{assign_cloned, FuncValue, Reflect, ReflectMut, ReflectRef};

/// A nullable, shared handle to a callable.
///
/// Callables are never decomposed: a deep copy shares the same callable.
///
/// ```
/// use deepcopy_core::Func;
///
/// let answer: Func<dyn Fn() -> i32> = Func::new(|| 42);
/// assert_eq!(answer.get().map(|f| f()), Some(42));
/// ```
pub struct Func<F: ?Sized>(Option<Rc<F>>);

impl<F: ?Sized> Func<F> {
    pub fn from_rc(f: Rc<F>) -> Self {
        Func(Some(f))
    }

    pub fn null() -> Self {
        Func(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&F> {
        self.0.as_deref()
    }

    /// True if both refer to the same callable or both are null.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<R: 'static> Func<dyn Fn() -> R> {
    pub fn new(f: impl Fn() -> R + 'static) -> Self {
        Func(Some(Rc::new(f)))
    }
}

impl<F: ?Sized> From<Rc<F>> for Func<F> {
    fn from(f: Rc<F>) -> Self {
        Func::from_rc(f)
    }
}

impl<F: ?Sized> Clone for Func<F> {
    fn clone(&self) -> Self {
        Func(self.0.clone())
    }
}

impl<F: ?Sized> Default for Func<F> {
    fn default() -> Self {
        Func::null()
    }
}

impl<F: ?Sized> fmt::Debug for Func<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(rc) => write!(f, "Func({:#x})", Rc::as_ptr(rc) as *const () as usize),
            None => f.write_str("Func(null)"),
        }
    }
}

impl<F: ?Sized + 'static> Reflect for Func<F> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Func(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Func(self)
    }

    fn clone_value(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(Func::<F>::null())
    }

    fn assign(&mut self, source: &dyn Reflect) -> Result<(), CopyError> {
        assign_cloned(self, source)
    }
}

impl<F: ?Sized + 'static> FuncValue for Func<F> {
    fn is_null(&self) -> bool {
        self.0.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_through_handle() {
        let double: Rc<dyn Fn(i32) -> i32> = Rc::new(|x: i32| x * 2);
        let double = Func::from_rc(double);
        assert_eq!(double.get().map(|f| f(21)), Some(42));
    }

    #[test]
    fn clones_share_callable() {
        let f: Func<dyn Fn() -> &'static str> = Func::new(|| "hi");
        let g = f.clone();
        assert!(f.ptr_eq(&g));
        assert!(!f.ptr_eq(&Func::new(|| "hi")));
    }

    #[test]
    fn null_func() {
        let f: Func<dyn Fn()> = Func::default();
        assert!(f.is_null());
        assert!(f.get().is_none());
        assert_eq!(format!("{f:?}"), "Func(null)");
    }
}
