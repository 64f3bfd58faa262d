//! Types shared with the generic EGL dispatch layer
//!
//! The generic EGL layer owns the public entry points, the config attribute plumbing and the
//! display-wide mutex. Platform backends plug into it through the [`DisplayVtbl`] trait and
//! report failures as [`EGLError`] codes.

use std::os::raw::c_void;

pub mod display;
mod error;
#[allow(non_upper_case_globals)]
pub mod ffi;

pub use self::display::{DisplayLock, DisplayMutex, DisplayVtbl, SyncValues};
pub use self::error::*;

bitflags::bitflags! {
    /// Surface types an EGL config can be used with
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SurfaceType: ffi::EGLint {
        /// Off-screen pixel buffer
        const PBUFFER = ffi::PBUFFER_BIT;
        /// Native pixmap
        const PIXMAP = ffi::PIXMAP_BIT;
        /// Native window
        const WINDOW = ffi::WINDOW_BIT;
    }
}

/// Kind of surface requested from a platform backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// On-screen surface backed by a native window
    Window,
    /// Off-screen surface backed by a native pixmap
    Pixmap,
    /// Off-screen pixel buffer without a native object
    Pbuffer,
}

impl SurfaceKind {
    /// Surface type bit matching this kind
    pub fn surface_type(self) -> SurfaceType {
        match self {
            SurfaceKind::Window => SurfaceType::WINDOW,
            SurfaceKind::Pixmap => SurfaceType::PIXMAP,
            SurfaceKind::Pbuffer => SurfaceType::PBUFFER,
        }
    }
}

/// EGL framebuffer configuration registered by a platform backend
#[derive(Debug, Clone, PartialEq)]
pub struct EglConfig<C> {
    /// Value of `EGL_CONFIG_ID`
    pub config_id: ffi::EGLint,
    /// Surface types this config can be used with
    pub surface_type: SurfaceType,
    /// Value of `EGL_NATIVE_VISUAL_ID`
    pub native_visual_id: ffi::EGLint,
    /// Red, green, blue and alpha channel masks
    pub rgba_masks: [u32; 4],
    /// Driver configuration backing this config
    pub driver_config: C,
}

/// Native window or pixmap handle passed in by the application.
///
/// The handle is borrowed: the application keeps ownership of the native object and has to
/// keep it alive as long as any surface created from it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(std::ptr::NonNull<c_void>);

impl NativeHandle {
    /// Wrap a raw native handle, `None` if it is null
    pub fn new(ptr: *mut c_void) -> Option<NativeHandle> {
        std::ptr::NonNull::new(ptr).map(NativeHandle)
    }

    /// Raw handle as passed in by the application
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Error that can happen when creating a surface
#[derive(thiserror::Error, Debug)]
pub enum SurfaceCreationError {
    /// No native window was given for a window surface
    #[error("A valid native window is required to create a window surface")]
    MissingNativeWindow,
    /// No native pixmap was given for a pixmap surface
    #[error("A valid native pixmap is required to create a pixmap surface")]
    MissingNativePixmap,
    /// Pbuffer surfaces are not supported by this platform
    #[error("Pbuffer surfaces are not supported")]
    PbufferUnsupported,
    /// The windowing system could not resolve the native window or pixmap
    #[error("Querying the native {kind:?} failed: {source}")]
    NativeInfo {
        /// Kind of native object queried
        kind: SurfaceKind,
        /// Error reported by the windowing system
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The windowing system has no usable pixel format for the native object
    #[error("The native {0:?} has no usable pixel format")]
    NoPixelFormat(SurfaceKind),
    /// The config does not support the requested surface type
    #[error("The config does not support {0:?} surfaces")]
    ConfigMismatch(SurfaceKind),
    /// The windowing system failed to create its surface object
    #[error("Creating the native surface object failed")]
    NativeSurfaceFailed,
    /// The driver failed to create a drawable for the surface
    #[error("Creating the driver drawable failed")]
    DrawableFailed,
}

impl SurfaceCreationError {
    /// EGL error code reported for this error
    pub fn egl_error(&self) -> EGLError {
        match self {
            SurfaceCreationError::MissingNativeWindow | SurfaceCreationError::PbufferUnsupported => {
                EGLError::BadNativeWindow
            }
            SurfaceCreationError::MissingNativePixmap => EGLError::BadNativePixmap,
            SurfaceCreationError::NativeInfo { kind, .. } | SurfaceCreationError::NoPixelFormat(kind) => {
                match kind {
                    SurfaceKind::Pixmap => EGLError::BadNativePixmap,
                    _ => EGLError::BadNativeWindow,
                }
            }
            SurfaceCreationError::ConfigMismatch(_) => EGLError::BadMatch,
            SurfaceCreationError::NativeSurfaceFailed | SurfaceCreationError::DrawableFailed => {
                EGLError::BadAlloc
            }
        }
    }
}
