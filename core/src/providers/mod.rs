//! In-process buffer providers.
//!
//! Two allocation strategies behind the same [`crate::traits::BufferProvider`]
//! boundary, standing in for a host runtime:
//!
//! - [`HeapProvider`]: reference-counted heap buffers; `Clone` on a handle
//!   bumps the refcount, the last drop deallocates.
//! - [`ArenaProvider`]: bumpalo arena buffers; handles are `Copy`, nothing
//!   is ever freed individually.

mod arena;
mod heap;

pub use arena::{ArenaHandle, ArenaProvider};
pub use heap::{HeapHandle, HeapProvider};

use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::BufferError;
use crate::tag::TypeTag;

/// Epochs are handed out from one process-wide counter so that no two
/// allocations ever share one, even across different providers.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// Total byte size of a buffer, or `CapacityOverflow`.
pub(crate) fn byte_len(tag: TypeTag, shape: &[usize]) -> Result<usize, BufferError> {
    shape
        .iter()
        .try_fold(tag.size, |acc, &dim| acc.checked_mul(dim))
        .ok_or(BufferError::CapacityOverflow)
}
