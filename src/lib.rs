//! Host-runtime buffers as Rust containers.
//!
//! A host runtime (a script interpreter, an embedded VM, another process's
//! allocator) owns multi-dimensional numeric buffers and exposes them only
//! as opaque handles that can be asked for a view: raw pointer, element
//! type tag, shape and byte strides. This crate adapts such buffers to
//! ordinary value-semantics containers:
//!
//! - [`Array1`] and [`Array2`]: one- and two-dimensional adaptors that
//!   cache the decoded view and refresh it eagerly on every structural
//!   mutation, so element access is a plain indexed load.
//! - [`Cursor`] / [`CursorIter`]: a reusable random-access iteration
//!   abstraction; a concrete cursor implements a small core of operations
//!   and inherits the full iterator surface.
//! - [`BufferProvider`] / [`BufferHandle`]: the boundary a host runtime (or
//!   the bundled [`HeapProvider`] / [`ArenaProvider`]) implements.
//!
//! # Example
//!
//! ```
//! use hostbuf::{Array1, HeapProvider};
//!
//! let mut a = Array1::<_, i32>::filled(HeapProvider, 5, 0).unwrap();
//! for (i, slot) in a.iter_mut().enumerate() {
//!     *slot = i as i32 + 1;
//! }
//! assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
//!
//! a.resize(3).unwrap(); // trailing elements are discarded
//! assert_eq!(a.len(), 3);
//! assert_eq!(a[2], 3);
//! ```

pub use hostbuf_core::array1::{Array1, Iter, IterMut};
pub use hostbuf_core::array2::Array2;
pub use hostbuf_core::error::BufferError;
pub use hostbuf_core::providers::{ArenaHandle, ArenaProvider, HeapHandle, HeapProvider};
pub use hostbuf_core::tag::{Scalar, ScalarKind, TypeTag, tag_of};
pub use hostbuf_core::traits::{BufferHandle, BufferProvider};
pub use hostbuf_core::view::BufferView;

pub use hostbuf_cursor::{Cursor, CursorIter, PtrCursor, PtrCursorMut};
