#![allow(unsafe_code)] // Raw arena blocks and byte copies; see SAFETY comments.

use core::fmt;
use core::ptr::{self, NonNull};

use bumpalo::Bump;
use smallvec::SmallVec;

use crate::error::BufferError;
use crate::tag::TypeTag;
use crate::traits::{BufferHandle, BufferProvider};
use crate::view::BufferView;

use super::{byte_len, next_epoch};

/// Arena-allocated buffer metadata.
///
/// Bumpalo never runs `Drop`, so everything here must be drop-free: the
/// shape/stride vectors stay inline (rank is at most 2 for everything the
/// adaptors create) and the data block is a raw arena allocation.
struct ArenaBuffer {
    ptr: NonNull<u8>,
    bytes: usize,
    tag: TypeTag,
    shape: SmallVec<[usize; 2]>,
    strides: SmallVec<[usize; 2]>,
    epoch: u64,
}

impl fmt::Debug for ArenaBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaBuffer")
            .field("tag", &self.tag)
            .field("shape", &&*self.shape)
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Buffer provider that allocates out of a bumpalo arena.
///
/// Handles are `Copy` and live as long as the arena; individual buffers are
/// never freed.
#[derive(Clone, Copy)]
pub struct ArenaProvider<'a> {
    arena: &'a Bump,
}

impl<'a> ArenaProvider<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self { arena }
    }
}

impl fmt::Debug for ArenaProvider<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ArenaProvider")
    }
}

/// `Copy` handle to an [`ArenaProvider`] buffer.
pub struct ArenaHandle<'a> {
    buf: &'a ArenaBuffer,
    // Kept so `duplicate` can allocate from the same arena.
    arena: &'a Bump,
}

impl Clone for ArenaHandle<'_> {
    fn clone(&self) -> Self {
        *self
    }
}
impl Copy for ArenaHandle<'_> {}

impl fmt::Debug for ArenaHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArenaHandle").field(self.buf).finish()
    }
}

impl<'a> BufferHandle for ArenaHandle<'a> {
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
        let copy =
            ArenaProvider::new(self.arena).create(self.buf.tag, &self.buf.shape, &self.buf.strides)?;
        if self.buf.bytes > 0 {
            // SAFETY: source and destination are distinct live arena blocks
            // of `bytes` bytes each.
            unsafe {
                ptr::copy_nonoverlapping(
                    self.buf.ptr.as_ptr(),
                    copy.buf.ptr.as_ptr(),
                    self.buf.bytes,
                );
            }
        }
        Ok(copy)
    }
}

impl<'a> BufferProvider for ArenaProvider<'a> {
    type Handle = ArenaHandle<'a>;

    fn create(
        &self,
        tag: TypeTag,
        shape: &[usize],
        strides: &[usize],
    ) -> Result<ArenaHandle<'a>, BufferError> {
        let bytes = byte_len(tag, shape)?;
        let layout = core::alloc::Layout::from_size_align(bytes, tag.align)
            .map_err(|_| BufferError::CapacityOverflow)?;
        tracing::trace!(?tag, ?shape, bytes, "allocating arena buffer");

        let ptr = if bytes == 0 {
            NonNull::new(tag.align as *mut u8).unwrap_or(NonNull::dangling())
        } else {
            let ptr = self.arena.alloc_layout(layout);
            // SAFETY: the block was just allocated with room for `bytes`
            // bytes. Fresh buffers are zero-filled by contract.
            unsafe { ptr::write_bytes(ptr.as_ptr(), 0, bytes) };
            ptr
        };

        let buf = self.arena.alloc(ArenaBuffer {
            ptr,
            bytes,
            tag,
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
            epoch: next_epoch(),
        });

        Ok(ArenaHandle {
            buf,
            arena: self.arena,
        })
    }
}
