//! Random-access cursors over contiguous memory.
//!
//! A [`Cursor`] is a position inside some contiguous range of elements. The
//! trait requires only a minimal core of operations (move by one, move by an
//! offset, dereference, compare positions); everything else, from the
//! remaining comparisons to the whole [`Iterator`] surface, is derived once
//! from that core and shared by every implementation:
//!
//! - provided trait methods derive `!=`, `>`, `<=`, `>=` and offset access
//!   from `coincides_with` / `precedes` / `offset`;
//! - [`CursorIter`] turns any `[front, back)` cursor pair into a full
//!   double-ended, exact-size iterator.
//!
//! [`PtrCursor`] and [`PtrCursorMut`] are the concrete cursors used by the
//! buffer adaptors: a bare element pointer each, so a cursor is the size of
//! a `usize` and every move is plain pointer arithmetic.
//!
//! # Safety model
//!
//! Moving a cursor is always safe (pointer cursors move with wrapping
//! arithmetic, so an out-of-range cursor is a dead value, not UB).
//! Dereferencing ([`Cursor::item`]) and measuring ([`Cursor::distance_from`])
//! are unsafe: they require the cursor(s) to sit inside one live range.
//! [`CursorIter::new`] is the single place that invariant is established;
//! from there on iteration is safe.
//!
//! Cursors obtained from different ranges must not be compared or measured
//! against each other.

#![no_std]
#![allow(unsafe_code)]

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

/// A random-access position inside a contiguous range of elements.
///
/// Implementations supply the minimal core below; the provided methods and
/// [`CursorIter`] derive the rest. The derived operations are only coherent
/// if `precedes` is a strict total order over positions of one range and
/// `coincides_with` is the matching equivalence; an implementation that
/// breaks that gets unspecified (but not undefined) results from the
/// derived comparisons.
pub trait Cursor: Sized {
    /// What dereferencing the cursor yields.
    type Item;

    /// Move one element forward.
    fn advance(&mut self);

    /// Move one element backward.
    fn retreat(&mut self);

    /// Move `n` elements forward (backward for negative `n`).
    fn offset(&mut self, n: isize);

    /// Number of elements from `origin` to `self`.
    ///
    /// # Safety
    ///
    /// Both cursors must point into the same contiguous range.
    unsafe fn distance_from(&self, origin: &Self) -> isize;

    /// Dereference the cursor.
    ///
    /// # Safety
    ///
    /// The cursor must point at a live element of its range. In particular
    /// the one-past-the-end position and the default "no position" value
    /// must never be dereferenced.
    unsafe fn item(&self) -> Self::Item;

    /// `true` if both cursors sit on the same position.
    fn coincides_with(&self, other: &Self) -> bool;

    /// `true` if `self` sits strictly before `other`.
    fn precedes(&self, other: &Self) -> bool;

    // --- Derived operations -------------------------------------------------
    // Everything below is defined purely in terms of the core ops above.

    /// The cursor moved `n` elements forward.
    #[must_use]
    fn step(mut self, n: isize) -> Self {
        self.offset(n);
        self
    }

    /// Dereference the position `n` elements away without moving.
    ///
    /// # Safety
    ///
    /// As [`Cursor::item`], for the position `n` elements from `self`.
    unsafe fn item_at(&self, n: isize) -> Self::Item
    where
        Self: Clone,
    {
        let mut probe = self.clone();
        probe.offset(n);
        // SAFETY: forwarded to the caller.
        unsafe { probe.item() }
    }

    /// Negation of [`Cursor::coincides_with`].
    fn differs_from(&self, other: &Self) -> bool {
        !self.coincides_with(other)
    }

    /// `self` sits strictly after `other` (reversed [`Cursor::precedes`]).
    fn succeeds(&self, other: &Self) -> bool {
        other.precedes(self)
    }

    /// `self` sits on or before `other`.
    fn at_or_before(&self, other: &Self) -> bool {
        !other.precedes(self)
    }

    /// `self` sits on or after `other`.
    fn at_or_after(&self, other: &Self) -> bool {
        !self.precedes(other)
    }
}

// =============================================================================
// CursorIter - a [front, back) cursor pair as a std iterator
// =============================================================================

/// Iterator over the half-open range `[front, back)` of any [`Cursor`].
///
/// Implements `Iterator`, `DoubleEndedIterator` (so `.rev()` gives reverse
/// traversal), `ExactSizeIterator` and `FusedIterator` once, for every
/// cursor type.
pub struct CursorIter<C> {
    front: C,
    back: C,
}

impl<C: Cursor> CursorIter<C> {
    /// Build an iterator over `[front, back)`.
    ///
    /// # Safety
    ///
    /// `front` and `back` must point into the same contiguous range, with
    /// `front` not after `back`, and every position in `[front, back)` must
    /// stay dereferenceable for the iterator's lifetime.
    pub unsafe fn new(front: C, back: C) -> Self {
        Self { front, back }
    }

    /// Remaining number of elements.
    pub fn remaining(&self) -> usize {
        // SAFETY: `new` guarantees both cursors share one range.
        let n = unsafe { self.back.distance_from(&self.front) };
        debug_assert!(n >= 0, "front cursor ran past the back cursor");
        n as usize
    }
}

impl<C: Cursor> Iterator for CursorIter<C> {
    type Item = C::Item;

    fn next(&mut self) -> Option<C::Item> {
        if self.front.coincides_with(&self.back) {
            return None;
        }
        // SAFETY: front != back inside the range from `new`, so front is
        // on a live element.
        let item = unsafe { self.front.item() };
        self.front.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<C::Item> {
        let left = self.remaining();
        if n >= left {
            // Exhaust without walking element by element.
            self.front.offset(left as isize);
            return None;
        }
        self.front.offset(n as isize);
        self.next()
    }
}

impl<C: Cursor> DoubleEndedIterator for CursorIter<C> {
    fn next_back(&mut self) -> Option<C::Item> {
        if self.front.coincides_with(&self.back) {
            return None;
        }
        self.back.retreat();
        // SAFETY: back moved one step inside [front, old back), so it is on
        // a live element.
        Some(unsafe { self.back.item() })
    }
}

impl<C: Cursor> ExactSizeIterator for CursorIter<C> {}
impl<C: Cursor> FusedIterator for CursorIter<C> {}

impl<C: Clone> Clone for CursorIter<C> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for CursorIter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorIter")
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

// =============================================================================
// PtrCursor / PtrCursorMut - contiguous pointer cursors
// =============================================================================

/// Shared-access cursor over contiguous `T`s: a bare element pointer.
pub struct PtrCursor<'a, T> {
    ptr: *const T,
    _marker: PhantomData<&'a T>,
}

/// Mutable-access cursor over contiguous `T`s.
///
/// [`Cursor::item`] hands out `&'a mut T`; the unsafe contract makes the
/// caller responsible for never holding two of them for the same position.
/// [`CursorIter`] upholds that by dereferencing each position exactly once.
pub struct PtrCursorMut<'a, T> {
    ptr: *mut T,
    _marker: PhantomData<&'a mut T>,
}

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
static_assertions::assert_eq_size!(PtrCursor<'static, u64>, usize);
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
static_assertions::assert_eq_size!(PtrCursorMut<'static, u64>, usize);

impl<'a, T> PtrCursor<'a, T> {
    /// The "no position" cursor. Compares equal to itself, must never be
    /// dereferenced.
    pub fn dangling() -> Self {
        Self {
            ptr: core::ptr::NonNull::dangling().as_ptr(),
            _marker: PhantomData,
        }
    }

    /// Cursor at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must point into, or one past the end of, an allocation of `T`s
    /// that stays live and unmoved for `'a`.
    pub unsafe fn from_ptr(ptr: *const T) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// The underlying pointer.
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }
}

impl<'a, T> PtrCursorMut<'a, T> {
    /// The "no position" cursor. Compares equal to itself, must never be
    /// dereferenced.
    pub fn dangling() -> Self {
        Self {
            ptr: core::ptr::NonNull::dangling().as_ptr(),
            _marker: PhantomData,
        }
    }

    /// Cursor at `ptr`.
    ///
    /// # Safety
    ///
    /// As [`PtrCursor::from_ptr`], and `ptr` must be valid for writes.
    pub unsafe fn from_ptr(ptr: *mut T) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// The underlying pointer.
    pub fn as_ptr(&self) -> *mut T {
        self.ptr
    }
}

impl<'a, T> Cursor for PtrCursor<'a, T> {
    type Item = &'a T;

    fn advance(&mut self) {
        // Wrapping arithmetic keeps movement safe; only dereference and
        // distance require the cursor to be in range.
        self.ptr = self.ptr.wrapping_add(1);
    }

    fn retreat(&mut self) {
        self.ptr = self.ptr.wrapping_sub(1);
    }

    fn offset(&mut self, n: isize) {
        self.ptr = self.ptr.wrapping_offset(n);
    }

    unsafe fn distance_from(&self, origin: &Self) -> isize {
        // SAFETY: caller guarantees both cursors are in one range.
        unsafe { self.ptr.offset_from(origin.ptr) }
    }

    unsafe fn item(&self) -> &'a T {
        // SAFETY: caller guarantees the cursor is on a live element of an
        // allocation valid for 'a.
        unsafe { &*self.ptr }
    }

    fn coincides_with(&self, other: &Self) -> bool {
        core::ptr::eq(self.ptr, other.ptr)
    }

    fn precedes(&self, other: &Self) -> bool {
        self.ptr < other.ptr
    }
}

impl<'a, T> Cursor for PtrCursorMut<'a, T> {
    type Item = &'a mut T;

    fn advance(&mut self) {
        self.ptr = self.ptr.wrapping_add(1);
    }

    fn retreat(&mut self) {
        self.ptr = self.ptr.wrapping_sub(1);
    }

    fn offset(&mut self, n: isize) {
        self.ptr = self.ptr.wrapping_offset(n);
    }

    unsafe fn distance_from(&self, origin: &Self) -> isize {
        // SAFETY: caller guarantees both cursors are in one range.
        unsafe { self.ptr.offset_from(origin.ptr) }
    }

    unsafe fn item(&self) -> &'a mut T {
        // SAFETY: caller guarantees the position is live, valid for writes,
        // and not aliased by another outstanding reference.
        unsafe { &mut *self.ptr }
    }

    fn coincides_with(&self, other: &Self) -> bool {
        core::ptr::eq(self.ptr, other.ptr)
    }

    fn precedes(&self, other: &Self) -> bool {
        self.ptr < other.ptr
    }
}

impl<T> Clone for PtrCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for PtrCursor<'_, T> {}

// A cloned mutable cursor is just another position; aliasing is governed by
// the `item` contract, not by the cursor value itself.
impl<T> Clone for PtrCursorMut<'_, T> {
    fn clone(&self) -> Self {
        Self {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for PtrCursor<'_, T> {
    fn default() -> Self {
        Self::dangling()
    }
}

impl<T> Default for PtrCursorMut<'_, T> {
    fn default() -> Self {
        Self::dangling()
    }
}

impl<T> fmt::Debug for PtrCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PtrCursor({:p})", self.ptr)
    }
}

impl<T> fmt::Debug for PtrCursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PtrCursorMut({:p})", self.ptr)
    }
}

impl<T> PartialEq for PtrCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.coincides_with(other)
    }
}
impl<T> Eq for PtrCursor<'_, T> {}

impl<T> PartialEq for PtrCursorMut<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.coincides_with(other)
    }
}
impl<T> Eq for PtrCursorMut<'_, T> {}
