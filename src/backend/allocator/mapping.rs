use std::slice;

use tracing::trace;

use super::{MapAccess, MapError, NativeBuffer, Plane};

/// Scoped CPU mapping of the first plane of a native buffer.
///
/// The buffer is unmapped when the mapping is dropped, on every path.
#[derive(Debug)]
pub struct BufferMapping<'a, B: NativeBuffer + ?Sized> {
    buffer: &'a B,
    plane: Plane,
    access: MapAccess,
}

impl<'a, B: NativeBuffer + ?Sized> BufferMapping<'a, B> {
    /// Map `buffer` with the given access
    pub fn new(buffer: &'a B, access: MapAccess) -> Result<BufferMapping<'a, B>, MapError> {
        let plane = buffer.map(access)?;
        trace!(?access, len = plane.len, stride = plane.stride, "Mapped native buffer");
        Ok(BufferMapping { buffer, plane, access })
    }

    /// Bytes between the start of two consecutive rows
    pub fn stride(&self) -> usize {
        self.plane.stride
    }

    /// Length of the mapping in bytes
    pub fn len(&self) -> usize {
        self.plane.len
    }

    /// Whether the mapping covers no memory at all
    pub fn is_empty(&self) -> bool {
        self.plane.len == 0
    }

    /// Access the mapping was created with
    pub fn access(&self) -> MapAccess {
        self.access
    }

    /// Mapped memory
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `NativeBuffer::map` guarantees `len` bytes at `ptr` stay valid until `unmap`,
        // which only happens once `self` is dropped.
        unsafe { slice::from_raw_parts(self.plane.ptr.as_ptr(), self.plane.len) }
    }

    /// Mapped memory for writing, `None` if the buffer was not mapped writable
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        if !self.access.contains(MapAccess::WRITE) {
            return None;
        }
        // SAFETY: see `as_slice`, and the mapping was requested with write access.
        // Taking `&mut self` keeps any other view of this mapping from existing.
        Some(unsafe { slice::from_raw_parts_mut(self.plane.ptr.as_ptr(), self.plane.len) })
    }
}

impl<'a, B: NativeBuffer + ?Sized> Drop for BufferMapping<'a, B> {
    fn drop(&mut self) {
        self.buffer.unmap();
        trace!("Unmapped native buffer");
    }
}

/// Error returned by [`copy_rows`] if the requested rows do not fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CopyError {
    /// A stride is smaller than the row length, rows would overlap
    #[error("Stride {stride} is smaller than the row length {row_len}")]
    StrideTooSmall {
        /// Offending stride
        stride: usize,
        /// Bytes copied per row
        row_len: usize,
    },
    /// The rows reach past the end of a buffer
    #[error("Copy needs {required} bytes, but the buffer only has {available}")]
    OutOfBounds {
        /// Bytes the copy needs
        required: usize,
        /// Bytes the buffer has
        available: usize,
    },
}

fn check_bounds(len: usize, stride: usize, row_len: usize, rows: usize) -> Result<(), CopyError> {
    if rows > 1 && stride < row_len {
        return Err(CopyError::StrideTooSmall { stride, row_len });
    }
    let required = (rows - 1)
        .checked_mul(stride)
        .and_then(|start| start.checked_add(row_len))
        .unwrap_or(usize::MAX);
    if required > len {
        return Err(CopyError::OutOfBounds {
            required,
            available: len,
        });
    }
    Ok(())
}

/// Copies `rows` rows of `row_len` bytes from `src` to `dst`.
///
/// Row `i` starts at `i * src_stride` in `src` and at `i * dst_stride` in `dst`, so the same
/// routine packs padded rows tightly or spreads tight rows out to a padded layout. Both slices
/// are checked once up front; nothing is copied if either is too short.
#[profiling::function]
pub fn copy_rows(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    row_len: usize,
    rows: usize,
) -> Result<(), CopyError> {
    if rows == 0 || row_len == 0 {
        return Ok(());
    }
    check_bounds(src.len(), src_stride, row_len, rows)?;
    check_bounds(dst.len(), dst_stride, row_len, rows)?;

    for row in 0..rows {
        let src_start = row * src_stride;
        let dst_start = row * dst_stride;
        dst[dst_start..dst_start + row_len].copy_from_slice(&src[src_start..src_start + row_len]);
    }
    Ok(())
}
