//! Deepcopy clones arbitrary value graphs, including shared and cyclic ones.
//!
//! Core concepts:
//! - **Reflect**: A value whose shape can be walked at runtime (derived or built in)
//! - **Kind**: The structural category that picks the copy policy for a value
//! - **Ptr**: A nullable shared pointer; the unit of aliasing and cycles
//! - **Dynamic**: A slot holding a value of any reflected type
//! - **Chan** / **Func**: Channels are recreated empty, callables are shared
//! - **CopyOption**: Cycle detection and the set of types copied as-is
//!
//! # Example
//!
//! ```
//! use deepcopy_core::{deep_copy, reflected, CopyOption, Ptr};
//!
//! #[reflected]
//! struct Node {
//!     value: i32,
//!     next: Ptr<Node>,
//! }
//!
//! let node = Ptr::new(Node { value: 1, next: Ptr::null() });
//! node.borrow_mut().next = node.clone();
//!
//! let copied = deep_copy(&node, &[CopyOption::CycleDetection]).unwrap();
//! assert!(!copied.ptr_eq(&node));
//! assert!(copied.borrow().next.ptr_eq(&copied));
//! # node.borrow_mut().next = Ptr::null();
//! # copied.borrow_mut().next = Ptr::null();
//! ```
//!
//! # Cycles
//!
//! Without [`CopyOption::CycleDetection`] every pointer is followed afresh:
//! aliased pointers become independent copies and a cyclic graph recurses
//! until the stack overflows.

// Lets `#[derive(Reflect)]` paths resolve inside this crate's own tests.
extern crate self as deepcopy_core;

mod chan;
mod copy;
mod dynamic;
mod error;
mod func;
mod impls;
mod options;
mod processor;
mod ptr;
mod reflect;

pub use chan::{Chan, ChanError};
pub use copy::{copy, deep_copy};
pub use dynamic::Dynamic;
pub use error::CopyError;
pub use func::Func;
pub use options::CopyOption;
pub use ptr::Ptr;
pub use reflect::{
    assign_cloned, downcast, ArrayValue, ChannelValue, DynamicValue, EnumValue, FuncValue, Kind,
    ListValue, MapValue, PointerValue, Reflect, ReflectMut, ReflectRef, StructValue, TypeInfo,
};

#[cfg(feature = "derive")]
pub use deepcopy_derive::{reflected, Reflect};
