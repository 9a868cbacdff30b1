use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::CopyError;
use crate::options::CopyOption;
use crate::processor::Processor;
use crate::reflect::Reflect;

/// Deep-copies `source` into `destination`.
///
/// Both must be the same concrete type, otherwise `TypeMismatch` is returned
/// and `destination` is untouched. Pointers are reallocated, sequences and maps
/// get their own backing stores, channels are recreated empty and callables
/// are shared.
///
/// On any other error `destination` may be partially written and should be
/// discarded.
///
/// A panic raised inside a `Reflect` impl is caught and returned as
/// `CopyError::Failed`. The process panic hook still runs first, so the default
/// hook prints the panic message to stderr; install a quiet hook with
/// `std::panic::set_hook` to suppress it.
pub fn copy(
    source: &dyn Reflect,
    destination: &mut dyn Reflect,
    options: &[CopyOption],
) -> Result<(), CopyError> {
    let expected = destination.type_info();
    let found = source.type_info();
    if expected != found {
        return Err(CopyError::TypeMismatch {
            expected: expected.name(),
            found: found.name(),
        });
    }

    let mut processor = Processor::with_options(options);
    log::debug!(
        "copying {found} (cycle detection: {})",
        processor.detects_cycles()
    );

    // A fault anywhere in the traversal surfaces as an error, never a panic.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        processor.copy_value(source, destination)
    }));
    match outcome {
        Ok(result) => {
            log::debug!(
                "copied {found}, {} shared allocations tracked",
                processor.cached_identities()
            );
            result
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::warn!("copy of {found} aborted: {message}");
            Err(CopyError::Failed(message))
        }
    }
}

/// Returns a deep copy of `source` as a new value.
///
/// ```
/// use deepcopy_core::{deep_copy, Ptr};
///
/// let original = vec![Ptr::new(1u8), Ptr::null()];
/// let copied = deep_copy(&original, &[]).unwrap();
/// assert!(!copied[0].ptr_eq(&original[0]));
/// assert!(copied[1].is_null());
/// ```
pub fn deep_copy<T: Reflect + Default>(
    source: &T,
    options: &[CopyOption],
) -> Result<T, CopyError> {
    let mut destination = T::default();
    copy(source, &mut destination, options)?;
    Ok(destination)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during traversal".to_owned()
    }
}
