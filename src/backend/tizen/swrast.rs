//! Software rasterizer bridge
//!
//! The driver renders into its own linear memory and calls back into the surface whenever it
//! needs to know the drawable geometry or to move pixels in or out of the native buffer. The
//! first such call in a frame dequeues the buffer.
//!
//! Callbacks can arrive while the surface is in the middle of a dispatch call, most notably the
//! final `putImage` of a swap, so they only take the surface state by shared reference.

use tracing::{trace, warn};

use crate::backend::{
    allocator::{copy_rows, BufferMapping, MapAccess, NativeBuffer},
    egl::SurfaceKind,
};

use super::{BufferError, NativeSurface, SwrastSurface};

/// Geometry of a drawable as reported to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawableInfo {
    /// Horizontal offset, always zero
    pub x: i32,
    /// Vertical offset, always zero
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

/// Operation the driver performs when putting an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOp {
    /// Draw into the back buffer
    Draw,
    /// Clear the buffer
    Clear,
    /// Present the buffer
    Swap,
    /// Any other operation code
    Other(i32),
}

impl From<i32> for ImageOp {
    fn from(op: i32) -> Self {
        match op {
            1 => ImageOp::Draw,
            2 => ImageOp::Clear,
            3 => ImageOp::Swap,
            x => ImageOp::Other(x),
        }
    }
}

/// Callbacks of the software rasterizer loader contract
pub trait SwrastLoader {
    /// Position and size of the drawable, `None` if no buffer could be obtained
    fn drawable_info(&self) -> Option<DrawableInfo>;

    /// Read a `width` x `height` region at `(x, y)` into `data`, rows tightly packed
    fn get_image(&self, x: i32, y: i32, width: i32, height: i32, data: &mut [u8]);

    /// Write tightly packed rows from `data` into a region of the buffer
    fn put_image(&self, op: ImageOp, x: i32, y: i32, width: i32, height: i32, data: &[u8]);

    /// Write rows `stride` bytes apart from `data` into a region of the buffer
    #[allow(clippy::too_many_arguments)]
    fn put_image2(
        &self,
        op: ImageOp,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        stride: i32,
        data: &[u8],
    );
}

#[derive(Debug, Clone, Copy)]
struct Region {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl Region {
    /// Region inside a `bounds.0` x `bounds.1` buffer, `None` if negative or out of bounds
    fn within(x: i32, y: i32, width: i32, height: i32, bounds: (i32, i32)) -> Option<Region> {
        let region = Region {
            x: usize::try_from(x).ok()?,
            y: usize::try_from(y).ok()?,
            width: usize::try_from(width).ok()?,
            height: usize::try_from(height).ok()?,
        };
        let (max_width, max_height) = (usize::try_from(bounds.0).ok()?, usize::try_from(bounds.1).ok()?);
        if region.x.checked_add(region.width)? > max_width || region.y.checked_add(region.height)? > max_height {
            return None;
        }
        Some(region)
    }

    /// Byte offset of the region's first pixel in a buffer with the given stride
    fn offset(&self, stride: usize, bpp: usize) -> Option<usize> {
        self.y.checked_mul(stride)?.checked_add(self.x.checked_mul(bpp)?)
    }
}

impl<S: NativeSurface> SwrastSurface<S> {
    fn read_region(&self, region: Region, data: &mut [u8]) -> Result<(), BufferError> {
        let frame = self.frame.borrow();
        let buffer = frame.buffer.as_deref().ok_or(BufferError::NotCheckedOut)?;
        let bpp = buffer.format().bytes_per_pixel();
        let mapping = BufferMapping::new(buffer, MapAccess::READ)?;

        let stride = mapping.stride();
        let row_len = region.width * bpp;
        let src = region
            .offset(stride, bpp)
            .and_then(|offset| mapping.as_slice().get(offset..))
            .unwrap_or(&[]);
        copy_rows(data, row_len, src, stride, row_len, region.height)?;
        Ok(())
    }

    fn write_region(&self, region: Region, src_stride: usize, data: &[u8]) -> Result<(), BufferError> {
        let frame = self.frame.borrow();
        let buffer = frame.buffer.as_deref().ok_or(BufferError::NotCheckedOut)?;
        let bpp = buffer.format().bytes_per_pixel();
        let mut mapping = BufferMapping::new(buffer, MapAccess::WRITE)?;

        let stride = mapping.stride();
        let row_len = region.width * bpp;
        let offset = region.offset(stride, bpp);
        let dst: &mut [u8] = match (offset, mapping.as_mut_slice()) {
            (Some(offset), Some(memory)) => memory.get_mut(offset..).unwrap_or(&mut []),
            _ => &mut [],
        };
        copy_rows(dst, stride, data, src_stride, row_len, region.height)?;
        Ok(())
    }
}

impl<S: NativeSurface> SwrastLoader for SwrastSurface<S> {
    fn drawable_info(&self) -> Option<DrawableInfo> {
        self.update_buffers().ok()?;

        let (width, height) = self.size();
        Some(DrawableInfo {
            x: 0,
            y: 0,
            width,
            height,
        })
    }

    #[profiling::function]
    fn get_image(&self, x: i32, y: i32, width: i32, height: i32, data: &mut [u8]) {
        if self.update_buffers().is_err() {
            return;
        }
        let Some(region) = Region::within(x, y, width, height, self.size()) else {
            warn!(x, y, width, height, "Ignoring read of invalid region");
            return;
        };

        match self.read_region(region, data) {
            Ok(()) => trace!(x, y, width, height, "Read image"),
            Err(BufferError::NotCheckedOut) => {}
            Err(BufferError::Map(err)) => warn!(?err, "Could not map native buffer"),
            Err(err) => warn!(?err, x, y, width, height, "Could not read image"),
        }
    }

    fn put_image(&self, op: ImageOp, x: i32, y: i32, width: i32, height: i32, data: &[u8]) {
        if self.kind() != SurfaceKind::Window {
            return;
        }
        if self.update_buffers().is_err() {
            warn!("Could not get native buffer");
            return;
        }

        let stride = usize::try_from(width)
            .ok()
            .and_then(|width| i32::try_from(self.buffer_format().stride_for(width)).ok())
            .unwrap_or(-1);
        self.put_image2(op, x, y, width, height, stride, data);
    }

    #[profiling::function]
    fn put_image2(
        &self,
        op: ImageOp,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        stride: i32,
        data: &[u8],
    ) {
        if !matches!(op, ImageOp::Draw | ImageOp::Swap) {
            return;
        }
        if self.kind() != SurfaceKind::Window {
            return;
        }
        if self.update_buffers().is_err() {
            warn!("Could not get native buffer");
            return;
        }
        let region = Region::within(x, y, width, height, self.size());
        let (Some(region), Ok(stride)) = (region, usize::try_from(stride)) else {
            warn!(x, y, width, height, stride, "Ignoring write of invalid region");
            return;
        };

        match self.write_region(region, stride, data) {
            Ok(()) => trace!(?op, x, y, width, height, "Wrote image"),
            Err(BufferError::Map(err)) => warn!(?err, "Could not map native buffer"),
            Err(err) => warn!(?err, x, y, width, height, "Could not write image"),
        }
    }
}
