#![allow(unsafe_code)] // Element access through the cached pointer; see SAFETY comments.

//! One-dimensional buffer adaptor.
//!
//! [`Array1<B, T>`] owns a handle to a provider buffer and caches the
//! decoded view (data pointer + length) next to it. Element access and
//! iteration go straight through the cache; every operation that replaces
//! the handle (handle assignment, resize) re-decodes eagerly, so the cache
//! is never stale. There is no lazy refresh.
//!
//! # Example
//!
//! ```ignore
//! let mut a = Array1::<_, i32>::filled(HeapProvider, 4, 7)?;
//! a[0] = 1;
//! assert_eq!(a.iter().sum::<i32>(), 22);
//! a.resize(2)?; // keeps the prefix [1, 7]
//! ```
//!
//! # Aliasing
//!
//! `Clone` deep-copies the buffer, so clones are independent. The only way
//! to alias storage is [`Array1::share_handle`], which hands the underlying
//! handle back across the provider boundary; mutating through an adaptor
//! while an alias reads the same buffer is the caller's responsibility to
//! order (nothing here locks).

use core::fmt;
use core::mem::size_of;
use core::ops::{Index, IndexMut};
use core::ptr::{self, NonNull};

use hostbuf_cursor::{CursorIter, PtrCursor, PtrCursorMut};

use crate::error::BufferError;
use crate::tag::Scalar;
use crate::traits::{BufferHandle, BufferProvider};

/// Shared iterator over an [`Array1`].
pub type Iter<'a, T> = CursorIter<PtrCursor<'a, T>>;
/// Mutable iterator over an [`Array1`].
pub type IterMut<'a, T> = CursorIter<PtrCursorMut<'a, T>>;

/// A provider buffer presented as a one-dimensional container.
///
/// Invariant: `data`, `len` and `epoch` always agree with the latest view
/// of `handle`. The empty state (`handle == None`, dangling pointer,
/// `len == 0`) is what default construction and [`Array1::take`] leave
/// behind.
pub struct Array1<B: BufferProvider, T: Scalar> {
    provider: B,
    handle: Option<B::Handle>,
    data: NonNull<T>,
    len: usize,
    epoch: u64,
}

impl<B: BufferProvider, T: Scalar> Array1<B, T> {
    /// An empty adaptor holding no buffer.
    pub fn new(provider: B) -> Self {
        Self {
            provider,
            handle: None,
            data: NonNull::dangling(),
            len: 0,
            epoch: 0,
        }
    }

    /// A zero-filled buffer of `len` elements.
    pub fn with_len(provider: B, len: usize) -> Result<Self, BufferError> {
        let handle = provider.create(T::TAG, &[len], &[size_of::<T>()])?;
        Self::from_handle(provider, handle)
    }

    /// A buffer of `len` elements, every element set to `value`.
    pub fn filled(provider: B, len: usize, value: T) -> Result<Self, BufferError> {
        let mut array = Self::with_len(provider, len)?;
        array.fill(value);
        Ok(array)
    }

    /// A buffer holding the elements of `elements`, in iteration order.
    pub fn from_elements(
        provider: B,
        elements: impl IntoIterator<Item = T, IntoIter: ExactSizeIterator>,
    ) -> Result<Self, BufferError> {
        let elements = elements.into_iter();
        let mut array = Self::with_len(provider, elements.len())?;
        for (slot, value) in array.iter_mut().zip(elements) {
            *slot = value;
        }
        Ok(array)
    }

    /// Adopt an existing provider buffer.
    ///
    /// The handle must view as rank 1, unit stride, element type `T`;
    /// anything else is rejected with the specific mismatch.
    pub fn from_handle(provider: B, handle: B::Handle) -> Result<Self, BufferError> {
        let mut array = Self::new(provider);
        array.assign_handle(handle)?;
        Ok(array)
    }

    /// Replace the wrapped buffer with `handle` and refresh the cache.
    ///
    /// On error the adaptor keeps its previous buffer untouched.
    pub fn assign_handle(&mut self, handle: B::Handle) -> Result<(), BufferError> {
        let (data, len) = handle.view().as_contiguous::<T>()?;
        self.epoch = handle.epoch();
        self.data = data;
        self.len = len;
        self.handle = Some(handle);
        Ok(())
    }

    /// Share the underlying handle back across the provider boundary.
    ///
    /// The returned handle aliases this adaptor's storage (it is the
    /// provider's sharing `Clone`, not a copy). `None` for the empty state.
    pub fn share_handle(&self) -> Option<B::Handle> {
        self.handle.clone()
    }

    /// Number of elements. O(1), reads the cache only.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stale-cache tripwire: the cached epoch must match the handle's.
    /// Compiled out of release builds.
    fn debug_check_fresh(&self) {
        #[cfg(debug_assertions)]
        if let Some(handle) = &self.handle {
            debug_assert_eq!(
                self.epoch,
                handle.epoch(),
                "cached view is stale: the handle changed without a refresh"
            );
        }
    }

    /// Checked element access.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.debug_check_fresh();
        if index < self.len {
            // SAFETY: index is in bounds of the live cached buffer, which
            // the shared borrow of self keeps unreplaced.
            Some(unsafe { &*self.data.as_ptr().add(index) })
        } else {
            None
        }
    }

    /// Checked mutable element access.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.debug_check_fresh();
        if index < self.len {
            // SAFETY: as `get`, and the exclusive borrow rules out other
            // references through this adaptor.
            Some(unsafe { &mut *self.data.as_ptr().add(index) })
        } else {
            None
        }
    }

    /// Unchecked element access.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        // SAFETY: caller guarantees the bound.
        unsafe { &*self.data.as_ptr().add(index) }
    }

    /// Unchecked mutable element access.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        // SAFETY: caller guarantees the bound.
        unsafe { &mut *self.data.as_ptr().add(index) }
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.len.checked_sub(1).and_then(move |i| self.get_mut(i))
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        for slot in self.iter_mut() {
            *slot = value;
        }
    }

    /// Iterate the elements front to back. Reverse with `.rev()`.
    pub fn iter(&self) -> Iter<'_, T> {
        self.debug_check_fresh();
        let base = self.data.as_ptr().cast_const();
        // SAFETY: [base, base + len) is the live cached buffer; the shared
        // borrow of self pins it for the iterator's lifetime.
        unsafe {
            CursorIter::new(
                PtrCursor::from_ptr(base),
                PtrCursor::from_ptr(base.add(self.len)),
            )
        }
    }

    /// Iterate the elements mutably.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.debug_check_fresh();
        let base = self.data.as_ptr();
        // SAFETY: as `iter`, with the exclusive borrow ruling out other
        // access for the iterator's lifetime.
        unsafe {
            CursorIter::new(
                PtrCursorMut::from_ptr(base),
                PtrCursorMut::from_ptr(base.add(self.len)),
            )
        }
    }

    /// Change the length to `new_len`.
    ///
    /// Equal length is a no-op that never reallocates. Otherwise the buffer
    /// is replaced by a fresh allocation: the first `min(old, new)` elements
    /// carry over, growth beyond them is zero-filled.
    pub fn resize(&mut self, new_len: usize) -> Result<(), BufferError> {
        if new_len == self.len {
            return Ok(());
        }
        tracing::trace!(old_len = self.len, new_len, "reallocating 1-d buffer");
        let handle = self.provider.create(T::TAG, &[new_len], &[size_of::<T>()])?;
        {
            let (dst, _) = handle.view().as_contiguous::<T>()?;
            let keep = self.len.min(new_len);
            // SAFETY: src and dst are distinct live buffers, each at least
            // `keep` elements long.
            unsafe { ptr::copy_nonoverlapping(self.data.as_ptr(), dst.as_ptr(), keep) };
        }
        self.assign_handle(handle)
    }

    /// Change the length to `new_len`, setting **every** element to `value`.
    ///
    /// Equal length is still a strict no-op: the existing contents are left
    /// alone and `value` is ignored. The fill only applies when the length
    /// actually changes.
    pub fn resize_with(&mut self, new_len: usize, value: T) -> Result<(), BufferError> {
        if new_len == self.len {
            return Ok(());
        }
        let handle = self.provider.create(T::TAG, &[new_len], &[size_of::<T>()])?;
        self.assign_handle(handle)?;
        self.fill(value);
        Ok(())
    }

    /// A deep copy: freshly allocated buffer, same contents.
    pub fn duplicate(&self) -> Result<Self, BufferError> {
        match &self.handle {
            None => Ok(Self::new(self.provider.clone())),
            Some(handle) => Self::from_handle(self.provider.clone(), handle.duplicate()?),
        }
    }

    /// Move the buffer out, leaving this adaptor in the empty state.
    pub fn take(&mut self) -> Self {
        let empty = Self::new(self.provider.clone());
        core::mem::replace(self, empty)
    }
}

impl<B: BufferProvider, T: Scalar> Clone for Array1<B, T> {
    fn clone(&self) -> Self {
        self.duplicate()
            .expect("duplicating an already-allocated buffer cannot overflow")
    }
}

impl<B: BufferProvider + Default, T: Scalar> Default for Array1<B, T> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: BufferProvider, T: Scalar> Index<usize> for Array1<B, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of bounds for buffer of length {}", self.len),
        }
    }
}

impl<B: BufferProvider, T: Scalar> IndexMut<usize> for Array1<B, T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {index} out of bounds for buffer of length {len}"),
        }
    }
}

impl<B: BufferProvider, T: Scalar + PartialEq> PartialEq for Array1<B, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<B: BufferProvider, T: Scalar + Eq> Eq for Array1<B, T> {}

impl<B: BufferProvider, T: Scalar + fmt::Debug> fmt::Debug for Array1<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
