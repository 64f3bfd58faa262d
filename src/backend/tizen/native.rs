//! Interface of the windowing system client library
//!
//! The windowing system owns native windows and pixmaps, the buffer queue of every window and
//! the compatibility rules between visuals and surface types. This crate only consumes it.

use std::error::Error as StdError;

use crate::{
    backend::{
        allocator::{Format, NativeBuffer},
        egl::{NativeHandle, SurfaceKind},
    },
    utils::Rectangle,
};

/// Geometry and pixel format of a native window or pixmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeInfo {
    /// Current width in pixels
    pub width: i32,
    /// Current height in pixels
    pub height: i32,
    /// Pixel format, [`Format::INVALID`] if none is usable
    pub format: Format,
}

/// Channel sizes of a visual a config is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualRequest {
    /// Bits of the red channel
    pub red: u32,
    /// Bits of the green channel
    pub green: u32,
    /// Bits of the blue channel
    pub blue: u32,
    /// Bits of the alpha channel
    pub alpha: u32,
    /// Bits per pixel
    pub depth: u32,
}

/// Display configuration the windowing system matched to a [`VisualRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigMatch {
    /// Native visual id to report as `EGL_NATIVE_VISUAL_ID`
    pub native_visual_id: i32,
    /// Whether rendering with this visual is expected to be slow
    pub is_slow: bool,
}

/// Display handle of the windowing system
pub trait NativePlatform {
    /// Surface objects created by this display
    type Surface: NativeSurface;
    /// Error reported by queries
    type Error: StdError + Send + Sync + 'static;

    /// Current size and a compatible pixel format of a native window.
    ///
    /// `depth` and `alpha` are the sizes of the driver config the format is chosen for, zero if
    /// only the size is of interest.
    fn native_window_info(&self, window: NativeHandle, depth: u32, alpha: u32)
        -> Result<NativeInfo, Self::Error>;

    /// Current size and pixel format of a native pixmap
    fn native_pixmap_info(&self, pixmap: NativeHandle) -> Result<NativeInfo, Self::Error>;

    /// Create a surface object bound to a native window or pixmap.
    ///
    /// The returned object holds one reference on the windowing system's surface, released on drop.
    fn create_surface(&self, native: NativeHandle, kind: SurfaceKind, format: Format) -> Option<Self::Surface>;

    /// Find a display configuration matching the visual for the given surface kind
    fn query_config(&self, kind: SurfaceKind, visual: &VisualRequest) -> Result<ConfigMatch, Self::Error>;
}

/// Windowing system surface object, owning the buffer queue of a native window
pub trait NativeSurface {
    /// Buffers handed out by the queue
    type Buffer: NativeBuffer;
    /// Error reported when submitting a buffer
    type Error: StdError + Send + Sync + 'static;

    /// Take the next free buffer out of the queue, `None` if none is available
    fn dequeue_buffer(&mut self) -> Option<Self::Buffer>;

    /// Size of the buffers currently handed out, which follows resizes and rotations
    fn size(&self) -> (i32, i32);

    /// Submit a buffer for display, the whole surface is considered damaged.
    ///
    /// May block on compositor flow control.
    fn enqueue_buffer(&mut self, buffer: &Self::Buffer) -> Result<(), Self::Error>;

    /// Submit a buffer for display, only the given regions changed.
    ///
    /// May block on compositor flow control.
    fn enqueue_buffer_with_damage(
        &mut self,
        buffer: &Self::Buffer,
        damage: &[Rectangle],
    ) -> Result<(), Self::Error>;
}
