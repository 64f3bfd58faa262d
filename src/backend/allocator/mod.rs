//! Native buffer handling.
//!
//! Buffers handed out by the windowing system are opaque, reference counted objects owned by
//! the buffer manager. This module wraps them so that:
//!
//! - every reference this crate takes is released exactly once ([`BufferHandle`]),
//! - pixel memory is only touched between a map and the matching unmap ([`BufferMapping`]),
//! - rows are copied between differently strided memory with the bounds checked up front
//!   ([`copy_rows`]).

use std::{fmt, ptr::NonNull};

mod format;
mod handle;
mod mapping;

pub use self::format::Format;
pub use self::handle::BufferHandle;
pub use self::mapping::{copy_rows, BufferMapping, CopyError};

pub use drm_fourcc::{DrmFourcc as Fourcc, UnrecognizedFourcc};

bitflags::bitflags! {
    /// Access requested when mapping a native buffer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MapAccess: u32 {
        /// The mapping is read from
        const READ = 1;
        /// The mapping is written to
        const WRITE = 2;
    }
}

/// First plane of a mapped native buffer
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Start of the mapped memory
    pub ptr: NonNull<u8>,
    /// Length of the mapped memory in bytes
    pub len: usize,
    /// Bytes between the start of two consecutive rows
    pub stride: usize,
}

/// Error returned by the buffer manager when mapping fails
#[derive(Debug, thiserror::Error)]
#[error("Mapping the native buffer failed (code {0})")]
pub struct MapError(pub i32);

/// Common trait describing the buffers handed out by the windowing system
///
/// Implementations wrap a raw handle owned by the buffer manager. They do not take any
/// reference on their own; reference counting goes through [`BufferHandle`].
pub trait NativeBuffer: fmt::Debug {
    /// Increments the buffer manager's reference count of this buffer
    fn reference(&self);
    /// Decrements the buffer manager's reference count of this buffer
    fn unreference(&self);
    /// Pixel format of the buffer
    fn format(&self) -> Format;
    /// Maps the first plane of the buffer with the given access.
    ///
    /// On success the returned plane must stay valid for `access` until [`NativeBuffer::unmap`]
    /// is called.
    fn map(&self, access: MapAccess) -> Result<Plane, MapError>;
    /// Releases a mapping previously returned by [`NativeBuffer::map`]
    fn unmap(&self);
}
