#![allow(unsafe_code)] // Element access through the cached pointer; see SAFETY comments.

//! Two-dimensional buffer adaptor.
//!
//! [`Array2<B, T>`] is [`crate::array1::Array1`]'s row-major sibling: same
//! handle-plus-cached-view lifecycle, but the cache holds a row and column
//! count and every access computes a row-major flat index. One private
//! helper computes `row * cols + col`; every access path, checked or
//! unchecked, goes through it.
//!
//! No iterator surface is exposed. That is deliberate and provisional: the
//! rank-1 and rank-2 adaptors are parallel implementations, and iteration
//! over rank 2 is deferred until an n-dimensional generalization replaces
//! both.

use core::fmt;
use core::mem::size_of;
use core::ops::{Index, IndexMut};
use core::ptr::{self, NonNull};

use crate::error::BufferError;
use crate::tag::Scalar;
use crate::traits::{BufferHandle, BufferProvider};

/// A provider buffer presented as a row-major matrix.
///
/// Invariant: `data`, `rows`, `cols` and `epoch` always agree with the
/// latest view of `handle`; every handle replacement refreshes them eagerly.
pub struct Array2<B: BufferProvider, T: Scalar> {
    provider: B,
    handle: Option<B::Handle>,
    data: NonNull<T>,
    rows: usize,
    cols: usize,
    epoch: u64,
}

impl<B: BufferProvider, T: Scalar> Array2<B, T> {
    /// An empty adaptor holding no buffer.
    pub fn new(provider: B) -> Self {
        Self {
            provider,
            handle: None,
            data: NonNull::dangling(),
            rows: 0,
            cols: 0,
            epoch: 0,
        }
    }

    fn row_major_strides(cols: usize) -> Result<[usize; 2], BufferError> {
        let row_stride = cols
            .checked_mul(size_of::<T>())
            .ok_or(BufferError::CapacityOverflow)?;
        Ok([row_stride, size_of::<T>()])
    }

    /// A zero-filled `rows` by `cols` buffer.
    pub fn with_shape(provider: B, rows: usize, cols: usize) -> Result<Self, BufferError> {
        let strides = Self::row_major_strides(cols)?;
        let handle = provider.create(T::TAG, &[rows, cols], &strides)?;
        Self::from_handle(provider, handle)
    }

    /// A `rows` by `cols` buffer with every element set to `value`.
    pub fn filled(provider: B, rows: usize, cols: usize, value: T) -> Result<Self, BufferError> {
        let mut array = Self::with_shape(provider, rows, cols)?;
        array.fill(value);
        Ok(array)
    }

    /// Adopt an existing provider buffer.
    ///
    /// The handle must view as rank 2, row-major, element type `T`.
    pub fn from_handle(provider: B, handle: B::Handle) -> Result<Self, BufferError> {
        let mut array = Self::new(provider);
        array.assign_handle(handle)?;
        Ok(array)
    }

    /// Replace the wrapped buffer with `handle` and refresh the cache.
    ///
    /// On error the adaptor keeps its previous buffer untouched.
    pub fn assign_handle(&mut self, handle: B::Handle) -> Result<(), BufferError> {
        let (data, rows, cols) = handle.view().as_row_major::<T>()?;
        self.epoch = handle.epoch();
        self.data = data;
        self.rows = rows;
        self.cols = cols;
        self.handle = Some(handle);
        Ok(())
    }

    /// Share the underlying handle back across the provider boundary.
    pub fn share_handle(&self) -> Option<B::Handle> {
        self.handle.clone()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows * self.cols == 0
    }

    /// The one row-major addressing rule, used by every access path.
    fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

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

    /// Number of elements (`rows * cols`); private, the public surface is
    /// the shape.
    fn element_count(&self) -> usize {
        self.rows * self.cols
    }

    fn flat(&self) -> &[T] {
        self.debug_check_fresh();
        // SAFETY: the cached buffer holds rows * cols contiguous elements;
        // the shared borrow of self pins it.
        unsafe { core::slice::from_raw_parts(self.data.as_ptr(), self.element_count()) }
    }

    fn flat_mut(&mut self) -> &mut [T] {
        self.debug_check_fresh();
        // SAFETY: as `flat`, with exclusive access through self.
        unsafe { core::slice::from_raw_parts_mut(self.data.as_ptr(), self.element_count()) }
    }

    /// Checked element access.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            let index = self.flat_index(row, col);
            self.flat().get(index)
        } else {
            None
        }
    }

    /// Checked mutable element access.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows && col < self.cols {
            let index = self.flat_index(row, col);
            self.flat_mut().get_mut(index)
        } else {
            None
        }
    }

    /// Unchecked element access.
    ///
    /// # Safety
    ///
    /// `row < self.rows()` and `col < self.cols()`.
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> &T {
        debug_assert!(row < self.rows && col < self.cols);
        let index = self.flat_index(row, col);
        // SAFETY: caller guarantees both bounds, so the flat index is in
        // bounds of the cached buffer.
        unsafe { &*self.data.as_ptr().add(index) }
    }

    /// Unchecked mutable element access.
    ///
    /// # Safety
    ///
    /// `row < self.rows()` and `col < self.cols()`.
    pub unsafe fn get_unchecked_mut(&mut self, row: usize, col: usize) -> &mut T {
        debug_assert!(row < self.rows && col < self.cols);
        let index = self.flat_index(row, col);
        // SAFETY: caller guarantees both bounds.
        unsafe { &mut *self.data.as_ptr().add(index) }
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.flat_mut().fill(value);
    }

    /// Change the shape to `rows` by `cols`.
    ///
    /// An equal shape is a no-op that never reallocates. Otherwise the
    /// buffer is replaced: the overlapping top-left sub-matrix carries over,
    /// growth beyond it is zero-filled.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<(), BufferError> {
        if rows == self.rows && cols == self.cols {
            return Ok(());
        }
        tracing::trace!(
            old_rows = self.rows,
            old_cols = self.cols,
            rows,
            cols,
            "reallocating 2-d buffer"
        );
        let strides = Self::row_major_strides(cols)?;
        let handle = self.provider.create(T::TAG, &[rows, cols], &strides)?;
        {
            let (dst, _, new_cols) = handle.view().as_row_major::<T>()?;
            let keep_rows = rows.min(self.rows);
            let keep_cols = cols.min(self.cols);
            for row in 0..keep_rows {
                // SAFETY: row < old and new row counts, keep_cols fits in
                // both row widths, and the two buffers are distinct.
                unsafe {
                    ptr::copy_nonoverlapping(
                        self.data.as_ptr().add(self.flat_index(row, 0)),
                        dst.as_ptr().add(row * new_cols),
                        keep_cols,
                    );
                }
            }
        }
        self.assign_handle(handle)
    }

    /// Change the shape, setting **every** element to `value`.
    ///
    /// An equal shape is still a strict no-op: contents are left alone and
    /// `value` is ignored.
    pub fn resize_with(
        &mut self,
        rows: usize,
        cols: usize,
        value: T,
    ) -> Result<(), BufferError> {
        if rows == self.rows && cols == self.cols {
            return Ok(());
        }
        let strides = Self::row_major_strides(cols)?;
        let handle = self.provider.create(T::TAG, &[rows, cols], &strides)?;
        self.assign_handle(handle)?;
        self.fill(value);
        Ok(())
    }

    /// A deep copy: freshly allocated buffer, same shape and contents.
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

impl<B: BufferProvider, T: Scalar> Clone for Array2<B, T> {
    fn clone(&self) -> Self {
        self.duplicate()
            .expect("duplicating an already-allocated buffer cannot overflow")
    }
}

impl<B: BufferProvider + Default, T: Scalar> Default for Array2<B, T> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: BufferProvider, T: Scalar> Index<(usize, usize)> for Array2<B, T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        match self.get(row, col) {
            Some(value) => value,
            None => panic!(
                "position ({row}, {col}) out of bounds for {} by {} buffer",
                self.rows, self.cols
            ),
        }
    }
}

impl<B: BufferProvider, T: Scalar> IndexMut<(usize, usize)> for Array2<B, T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let (rows, cols) = (self.rows, self.cols);
        match self.get_mut(row, col) {
            Some(value) => value,
            None => panic!("position ({row}, {col}) out of bounds for {rows} by {cols} buffer"),
        }
    }
}

impl<B: BufferProvider, T: Scalar + PartialEq> PartialEq for Array2<B, T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.flat() == other.flat()
    }
}

impl<B: BufferProvider, T: Scalar + Eq> Eq for Array2<B, T> {}

impl<B: BufferProvider, T: Scalar + fmt::Debug> fmt::Debug for Array2<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array2")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("data", &self.flat())
            .finish()
    }
}
