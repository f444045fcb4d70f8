//! Runtime type descriptors for buffer elements.
//!
//! A buffer carries no Rust type; a [`TypeTag`] is the runtime description
//! (kind, size, alignment) that providers store and adaptors check against
//! the compile-time element type. [`Scalar`] maps the compile-time side to
//! the runtime side.

#![allow(unsafe_code)] // `Scalar` is an unsafe trait; impls assert layout facts.

use core::mem::{align_of, size_of};

/// Coarse element category, the part of a tag not derivable from the size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Signed integer.
    Int,
    /// Unsigned integer.
    Uint,
    /// IEEE-754 float.
    Float,
    /// One-byte boolean.
    Bool,
}

/// Runtime description of a buffer's element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub kind: ScalarKind,
    /// Element size in bytes.
    pub size: usize,
    /// Element alignment in bytes; always a power of two.
    pub align: usize,
}

/// Element types the adaptors can store in a buffer.
///
/// # Safety
///
/// `TAG` must report the exact size and alignment of the implementing type,
/// and every bit pattern of `TAG.size` zero bytes must be a valid value
/// (providers zero-fill fresh buffers).
pub unsafe trait Scalar: Copy + 'static {
    const TAG: TypeTag;
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            // SAFETY: the tag is computed from the type itself, and all of
            // these are plain numeric types for which zero bytes are valid.
            unsafe impl Scalar for $ty {
                const TAG: TypeTag = TypeTag {
                    kind: ScalarKind::$kind,
                    size: size_of::<$ty>(),
                    align: align_of::<$ty>(),
                };
            }
        )*
    };
}

impl_scalar! {
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    f32 => Float,
    f64 => Float,
    bool => Bool,
}

/// The runtime tag of a compile-time element type.
pub fn tag_of<T: Scalar>() -> TypeTag {
    T::TAG
}
