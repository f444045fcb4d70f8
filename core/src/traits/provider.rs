//! The provider boundary the adaptors consume.
//!
//! # Design Philosophy
//!
//! Buffers are owned by whoever allocated them, whether a host runtime in
//! production or an in-process provider in tests. The adaptors never touch
//! that ownership; they hold an opaque handle and ask it for a
//! [`BufferView`] whenever they need the current pointer/shape/strides.
//! This mirrors how the types in this workspace are built: the allocation
//! strategy is a pluggable trait, the consumers are generic over it.
//!
//! # Aliasing
//!
//! Handle duplication comes in two explicit flavors, so no consumer has to
//! guess which one it got:
//!
//! - `Clone` **shares**: both handles refer to the same storage (for a
//!   reference-counted provider this is a refcount bump).
//! - [`BufferHandle::duplicate`] **copies**: a freshly allocated buffer with
//!   the same layout and contents.
//!
//! The adaptors deep-copy on their own `Clone` and only ever share through
//! their explicit `share_handle` accessors.

use core::fmt::Debug;

use crate::error::BufferError;
use crate::tag::TypeTag;
use crate::view::BufferView;

/// An opaque reference to a provider-owned buffer.
pub trait BufferHandle: Clone + Debug {
    /// Snapshot the buffer's current layout.
    ///
    /// Must reflect the true current layout; repeated calls on an unmutated
    /// handle return equal views. The view borrows the handle, so it is
    /// released before the handle can next change.
    fn view(&self) -> BufferView<'_>;

    /// Allocation identity of the buffer this handle currently refers to.
    ///
    /// Unique per allocation and constant for the allocation's lifetime.
    /// Consumers cache it next to any decoded pointer; a mismatch later
    /// means the cached pointer is stale.
    fn epoch(&self) -> u64 {
        self.view().epoch()
    }

    /// Allocate a new buffer with this buffer's layout and contents.
    ///
    /// Unlike `Clone`, the result shares no storage with `self`.
    fn duplicate(&self) -> Result<Self, BufferError>;
}

/// Allocates buffers.
pub trait BufferProvider: Clone + Debug {
    type Handle: BufferHandle;

    /// Allocate a zero-filled buffer for the given layout.
    ///
    /// `strides` are caller-computed bytes per axis (unit stride for rank 1,
    /// row-major for rank 2); the provider stores them verbatim and reports
    /// them back from every view. Fails only if the total byte size
    /// overflows ([`BufferError::CapacityOverflow`]).
    fn create(
        &self,
        tag: TypeTag,
        shape: &[usize],
        strides: &[usize],
    ) -> Result<Self::Handle, BufferError>;
}
