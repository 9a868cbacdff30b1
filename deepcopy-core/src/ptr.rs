use std::any::{type_name, Any};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::CopyError;
use crate::reflect::{assign_cloned, PointerValue, Reflect, ReflectMut, ReflectRef};

/// A nullable, shared, mutable reference.
///
/// Cloning a `Ptr` shares the allocation, so several fields can point at the
/// same value and graphs may contain cycles. Equality and hashing compare the
/// allocation address, not the pointee.
pub struct Ptr<T>(Option<Rc<RefCell<T>>>);

impl<T> Ptr<T> {
    /// Allocates `value` and points at it.
    pub fn new(value: T) -> Self {
        Ptr(Some(Rc::new(RefCell::new(value))))
    }

    pub fn null() -> Self {
        Ptr(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the pointee.
    ///
    /// # Panics
    ///
    /// Panics if the pointer is null or the pointee is mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        match &self.0 {
            Some(cell) => cell.borrow(),
            None => panic!("null pointer dereference of Ptr<{}>", type_name::<T>()),
        }
    }

    /// Mutably borrows the pointee.
    ///
    /// # Panics
    ///
    /// Panics if the pointer is null or the pointee is already borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        match &self.0 {
            Some(cell) => cell.borrow_mut(),
            None => panic!("null pointer dereference of Ptr<{}>", type_name::<T>()),
        }
    }

    /// Borrows the pointee, or `None` if null or mutably borrowed.
    pub fn try_borrow(&self) -> Option<Ref<'_, T>> {
        self.0.as_ref().and_then(|cell| cell.try_borrow().ok())
    }

    /// Address of the allocation, `None` if null.
    pub fn addr(&self) -> Option<usize> {
        self.0.as_ref().map(|cell| Rc::as_ptr(cell) as *const () as usize)
    }

    /// True if both point at the same allocation or both are null.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Ptr(self.0.clone())
    }
}

impl<T> Default for Ptr<T> {
    fn default() -> Self {
        Ptr::null()
    }
}

impl<T> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Ptr<T> {}

impl<T> Hash for Ptr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

// Only the address: printing the pointee would recurse forever on cycles.
impl<T> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr() {
            Some(addr) => write!(f, "Ptr({addr:#x})"),
            None => f.write_str("Ptr(null)"),
        }
    }
}

impl<T: Reflect + Default> Reflect for Ptr<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }

    fn clone_value(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(Ptr::<T>::null())
    }

    fn assign(&mut self, source: &dyn Reflect) -> Result<(), CopyError> {
        assign_cloned(self, source)
    }
}

impl<T: Reflect + Default> PointerValue for Ptr<T> {
    fn is_null(&self) -> bool {
        self.0.is_none()
    }

    fn identity(&self) -> Option<usize> {
        self.addr()
    }

    fn allocate(&mut self) {
        self.0 = Some(Rc::new(RefCell::new(T::default())));
    }

    fn shared(&self) -> Option<Rc<dyn Any>> {
        self.0.as_ref().map(|cell| Rc::clone(cell) as Rc<dyn Any>)
    }

    fn set_shared(&mut self, target: Rc<dyn Any>) -> Result<(), CopyError> {
        let cell = target.downcast::<RefCell<T>>().map_err(|_| {
            CopyError::failed(format!(
                "cached allocation is not a {}",
                type_name::<T>()
            ))
        })?;
        self.0 = Some(cell);
        Ok(())
    }

    fn with_pointee(
        &self,
        f: &mut dyn FnMut(&dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        let cell = self.0.as_ref().ok_or_else(|| null_deref::<T>())?;
        let pointee = cell
            .try_borrow()
            .map_err(|e| CopyError::failed(format!("Ptr<{}>: {e}", type_name::<T>())))?;
        f(&*pointee)
    }

    fn with_pointee_mut(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Reflect) -> Result<(), CopyError>,
    ) -> Result<(), CopyError> {
        let cell = self.0.as_ref().ok_or_else(|| null_deref::<T>())?;
        let mut pointee = cell
            .try_borrow_mut()
            .map_err(|e| CopyError::failed(format!("Ptr<{}>: {e}", type_name::<T>())))?;
        f(&mut *pointee)
    }
}

fn null_deref<T>() -> CopyError {
    CopyError::failed(format!("null pointer dereference of Ptr<{}>", type_name::<T>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn null_and_allocated() {
        let null: Ptr<u32> = Ptr::null();
        assert!(null.is_null());
        assert!(null.addr().is_none());
        assert!(null.try_borrow().is_none());

        let ptr = Ptr::new(5u32);
        assert!(!ptr.is_null());
        assert_eq!(*ptr.borrow(), 5);
        *ptr.borrow_mut() += 1;
        assert_eq!(*ptr.borrow(), 6);
    }

    #[test]
    fn clones_share_allocation() {
        let a = Ptr::new(String::from("shared"));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a, b);

        b.borrow_mut().push('!');
        assert_eq!(*a.borrow(), "shared!");

        let c = Ptr::new(String::from("shared!"));
        assert_ne!(a, c);
    }

    #[test]
    fn hash_by_identity() {
        let a = Ptr::new(1i64);
        let b = Ptr::new(1i64);
        let set: HashSet<Ptr<i64>> = [a.clone(), b.clone(), a.clone()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn pointer_value_shares_through_erased_handle() {
        let source = Ptr::new(3u8);
        let mut target: Ptr<u8> = Ptr::null();

        let handle = PointerValue::shared(&source).unwrap();
        target.set_shared(handle).unwrap();
        assert!(target.ptr_eq(&source));

        let mut wrong: Ptr<u16> = Ptr::null();
        let handle = PointerValue::shared(&source).unwrap();
        assert!(wrong.set_shared(handle).is_err());
    }

    #[test]
    fn borrow_conflict_is_an_error() {
        let ptr = Ptr::new(1u8);
        let _guard = ptr.borrow_mut();
        let result = ptr.with_pointee(&mut |_| Ok(()));
        assert!(matches!(result, Err(CopyError::Failed(_))));
    }

    #[test]
    fn debug_prints_address_only() {
        let null: Ptr<u8> = Ptr::null();
        assert_eq!(format!("{null:?}"), "Ptr(null)");
        assert!(format!("{:?}", Ptr::new(1u8)).starts_with("Ptr(0x"));
    }
}
