use crate::reflect::{Reflect, TypeInfo};

/// A toggle accepted by [`copy`](crate::copy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOption {
    /// Tracks every shared allocation already copied, so aliased pointers stay
    /// aliased in the clone and cyclic graphs terminate.
    ///
    /// Without it a cyclic graph recurses until the stack is exhausted.
    CycleDetection,
    /// Types assigned by a single shallow clone instead of being walked.
    AsIs(Vec<TypeInfo>),
}

impl CopyOption {
    /// Copies values of type `T` as-is.
    pub fn as_is<T: Reflect>() -> Self {
        CopyOption::AsIs(vec![TypeInfo::of::<T>()])
    }

    /// Copies values of the same types as the given samples as-is.
    ///
    /// ```
    /// use deepcopy_core::CopyOption;
    ///
    /// let option = CopyOption::as_is_of(&[&0u8, &String::new()]);
    /// assert!(matches!(option, CopyOption::AsIs(types) if types.len() == 2));
    /// ```
    pub fn as_is_of(samples: &[&dyn Reflect]) -> Self {
        CopyOption::AsIs(samples.iter().map(|sample| sample.type_info()).collect())
    }
}
