#![allow(unsafe_code)] // Raw allocation and byte copies; see SAFETY comments.

use alloc::alloc::{alloc_zeroed, dealloc, handle_alloc_error};
use alloc::rc::Rc;
use core::alloc::Layout;
use core::fmt;
use core::ptr::{self, NonNull};

use smallvec::SmallVec;

use crate::error::BufferError;
use crate::tag::TypeTag;
use crate::traits::{BufferHandle, BufferProvider};
use crate::view::BufferView;

use super::{byte_len, next_epoch};

// =============================================================================
// HeapBuffer - the owned allocation behind a handle
// =============================================================================

/// One heap allocation plus its layout metadata.
///
/// Never mutated after construction: a "resized" buffer is a new
/// `HeapBuffer` behind a new handle, which is why the epoch can double as
/// the allocation's identity.
struct HeapBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
    tag: TypeTag,
    // Inline up to rank 2, which covers everything the adaptors create.
    shape: SmallVec<[usize; 2]>,
    strides: SmallVec<[usize; 2]>,
    epoch: u64,
}

impl Drop for HeapBuffer {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: ptr was returned by alloc_zeroed with exactly this
            // layout and has not been freed.
            unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}

impl fmt::Debug for HeapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapBuffer")
            .field("tag", &self.tag)
            .field("shape", &&*self.shape)
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Aligned address for a zero-sized buffer; dereferencing it is already
/// excluded by the view contract.
fn aligned_dangling(align: usize) -> NonNull<u8> {
    NonNull::new(align as *mut u8).unwrap_or(NonNull::dangling())
}

// =============================================================================
// HeapProvider / HeapHandle
// =============================================================================

/// Buffer provider backed by the global allocator, reference-counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapProvider;

impl HeapProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Reference-counted handle to a [`HeapProvider`] buffer.
///
/// `Clone` shares the allocation; [`BufferHandle::duplicate`] copies it.
#[derive(Clone, Debug)]
pub struct HeapHandle {
    buf: Rc<HeapBuffer>,
}

impl BufferHandle for HeapHandle {
    fn view(&self) -> BufferView<'_> {
        BufferView::new(
            self.buf.ptr,
            self.buf.tag,
            &self.buf.shape,
            &self.buf.strides,
            self.buf.epoch,
        )
    }

    fn epoch(&self) -> u64 {
        self.buf.epoch
    }

    fn duplicate(&self) -> Result<Self, BufferError> {
        let copy = HeapProvider.create(self.buf.tag, &self.buf.shape, &self.buf.strides)?;
        let bytes = self.buf.layout.size();
        if bytes > 0 {
            // SAFETY: source and destination are distinct live allocations
            // of `bytes` bytes each.
            unsafe {
                ptr::copy_nonoverlapping(self.buf.ptr.as_ptr(), copy.buf.ptr.as_ptr(), bytes);
            }
        }
        Ok(copy)
    }
}

impl BufferProvider for HeapProvider {
    type Handle = HeapHandle;

    fn create(
        &self,
        tag: TypeTag,
        shape: &[usize],
        strides: &[usize],
    ) -> Result<HeapHandle, BufferError> {
        let bytes = byte_len(tag, shape)?;
        let layout =
            Layout::from_size_align(bytes, tag.align).map_err(|_| BufferError::CapacityOverflow)?;
        tracing::trace!(?tag, ?shape, bytes, "allocating heap buffer");

        let ptr = if layout.size() == 0 {
            aligned_dangling(layout.align())
        } else {
            // SAFETY: layout has non-zero size.
            let raw = unsafe { alloc_zeroed(layout) };
            match NonNull::new(raw) {
                Some(ptr) => ptr,
                None => handle_alloc_error(layout),
            }
        };

        Ok(HeapHandle {
            buf: Rc::new(HeapBuffer {
                ptr,
                layout,
                tag,
                shape: SmallVec::from_slice(shape),
                strides: SmallVec::from_slice(strides),
                epoch: next_epoch(),
            }),
        })
    }
}
