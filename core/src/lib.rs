//! Adaptors that present host-runtime buffers as Rust containers.
//!
//! A host runtime hands out opaque buffer objects; the only way to their
//! memory is to request a view (pointer + shape + strides) that goes stale
//! whenever the buffer is replaced. The adaptors here cache the decoded view
//! eagerly, refresh it on every structural mutation, and expose an ordinary
//! value-semantics container surface on top.
//!
//! - [`traits`]: the provider boundary ([`traits::BufferProvider`],
//!   [`traits::BufferHandle`]) the adaptors consume.
//! - [`providers`]: in-process providers (reference-counted heap, bumpalo
//!   arena) standing in for a real host runtime.
//! - [`array1`] / [`array2`]: the one- and two-dimensional adaptors.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod array1;
pub mod array2;
pub mod error;
pub mod providers;
pub mod tag;
pub mod traits;
pub mod view;
