//! Borrow-scoped snapshots of a buffer's layout.
//!
//! A [`BufferView`] is what a handle reports when asked for its current
//! layout: data pointer, element tag, shape and byte strides. It borrows the
//! handle, so it cannot outlive the call that requested it: the view is
//! released (dropped) before the handle can next be mutated or replaced.
//!
//! The decoders ([`BufferView::as_contiguous`], [`BufferView::as_row_major`])
//! are the single place the adaptors' layout preconditions are checked: a
//! wrongly-typed, wrongly-ranked or strided buffer is rejected with a
//! descriptive [`BufferError`] instead of being silently mis-indexed.

use core::mem::size_of;
use core::ptr::NonNull;

use crate::error::BufferError;
use crate::tag::{Scalar, TypeTag};

/// Snapshot of a buffer's current layout, borrowed from its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferView<'h> {
    ptr: NonNull<u8>,
    tag: TypeTag,
    shape: &'h [usize],
    /// Per-axis strides in bytes, same length as `shape`.
    strides: &'h [usize],
    epoch: u64,
}

impl<'h> BufferView<'h> {
    /// Describe a buffer.
    ///
    /// Called by providers; `ptr` must address at least
    /// `shape-product * tag.size` bytes, aligned to `tag.align`, live for as
    /// long as the handle the view borrows. The view itself never
    /// dereferences `ptr`; consumers that do rely on this contract.
    pub fn new(
        ptr: NonNull<u8>,
        tag: TypeTag,
        shape: &'h [usize],
        strides: &'h [usize],
        epoch: u64,
    ) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            ptr,
            tag,
            shape,
            strides,
            epoch,
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &'h [usize] {
        self.shape
    }

    pub fn strides(&self) -> &'h [usize] {
        self.strides
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Allocation identity; see [`crate::traits::BufferHandle::epoch`].
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Total number of elements (product of the shape).
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    fn check_tag<T: Scalar>(&self) -> Result<(), BufferError> {
        if self.tag == T::TAG {
            Ok(())
        } else {
            Err(BufferError::TagMismatch {
                expected: T::TAG,
                actual: self.tag,
            })
        }
    }

    /// Decode as a rank-1 unit-stride buffer of `T`: `(data, len)`.
    pub fn as_contiguous<T: Scalar>(&self) -> Result<(NonNull<T>, usize), BufferError> {
        self.check_tag::<T>()?;
        if self.rank() != 1 {
            return Err(BufferError::RankMismatch {
                expected: 1,
                actual: self.rank(),
            });
        }
        if self.strides[0] != size_of::<T>() {
            return Err(BufferError::StrideMismatch {
                axis: 0,
                expected: size_of::<T>(),
                actual: self.strides[0],
            });
        }
        Ok((self.ptr.cast(), self.shape[0]))
    }

    /// Decode as a rank-2 row-major buffer of `T`: `(data, rows, cols)`.
    pub fn as_row_major<T: Scalar>(&self) -> Result<(NonNull<T>, usize, usize), BufferError> {
        self.check_tag::<T>()?;
        if self.rank() != 2 {
            return Err(BufferError::RankMismatch {
                expected: 2,
                actual: self.rank(),
            });
        }
        let (rows, cols) = (self.shape[0], self.shape[1]);
        if self.strides[1] != size_of::<T>() {
            return Err(BufferError::StrideMismatch {
                axis: 1,
                expected: size_of::<T>(),
                actual: self.strides[1],
            });
        }
        let row_stride = cols * size_of::<T>();
        if self.strides[0] != row_stride {
            return Err(BufferError::StrideMismatch {
                axis: 0,
                expected: row_stride,
                actual: self.strides[0],
            });
        }
        Ok((self.ptr.cast(), rows, cols))
    }
}
