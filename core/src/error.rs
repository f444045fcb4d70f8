//! Public error type for provider and adaptor operations.
//!
//! Layout violations that a raw-pointer design would leave silent (wrong
//! rank, wrong element type, non-contiguous strides) fail fast here instead;
//! the failing operation leaves the adaptor in its prior valid state.

use thiserror::Error;

use crate::tag::TypeTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The requested shape, times the element size, does not fit in the
    /// address space. The only allocation failure a provider reports.
    #[error("requested buffer size overflows the address space")]
    CapacityOverflow,

    /// The handle's view has a different rank than the adaptor.
    #[error("expected a rank-{expected} buffer, handle reports rank {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// The handle's element type does not match the adaptor's element type.
    #[error("element type mismatch: adaptor expects {expected:?}, buffer holds {actual:?}")]
    TagMismatch { expected: TypeTag, actual: TypeTag },

    /// The handle's layout is not the contiguous one the adaptor requires.
    #[error("non-contiguous buffer: axis {axis} stride is {actual} bytes, expected {expected}")]
    StrideMismatch {
        axis: usize,
        expected: usize,
        actual: usize,
    },
}
