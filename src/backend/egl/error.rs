use super::ffi;

/// Error that can happen while initializing a display
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// One of the initialization steps failed, the display was torn down again
    #[error("Display initialization failed: {0}")]
    NotInitialized(&'static str),
}

impl Error {
    /// EGL error code reported for this error
    pub fn egl_error(&self) -> EGLError {
        match self {
            Error::NotInitialized(_) => EGLError::NotInitialized,
        }
    }
}

/// Raw EGL error
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EGLError {
    /// EGL is not initialized, or could not be initialized, for the specified EGL display connection.
    #[error(
        "EGL is not initialized, or could not be initialized, for the specified EGL display connection."
    )]
    NotInitialized,
    /// EGL cannot access a requested resource (for example a context is bound in another thread).
    #[error("EGL cannot access a requested resource (for example a context is bound in another thread).")]
    BadAccess,
    /// EGL failed to allocate resources for the requested operation.
    #[error("EGL failed to allocate resources for the requested operation.")]
    BadAlloc,
    /// An unrecognized attribute or attribute value was passed in the attribute list.
    #[error("An unrecognized attribute or attribute value was passed in the attribute list.")]
    BadAttribute,
    /// An EGLContext argument does not name a valid EGL rendering context.
    #[error("An EGLContext argument does not name a valid EGL rendering context.")]
    BadContext,
    /// An EGLConfig argument does not name a valid EGL frame buffer configuration.
    #[error("An EGLConfig argument does not name a valid EGL frame buffer configuration.")]
    BadConfig,
    /// The current surface of the calling thread is a window, pixel buffer or pixmap that is no longer valid.
    #[error("The current surface of the calling thread is a window, pixel buffer or pixmap that is no longer valid.")]
    BadCurrentSurface,
    /// An EGLDisplay argument does not name a valid EGL display connection.
    #[error("An EGLDisplay argument does not name a valid EGL display connection.")]
    BadDisplay,
    /// An EGLSurface argument does not name a valid surface (window, pixel buffer or pixmap) configured for GL rendering.
    #[error("An EGLSurface argument does not name a valid surface (window, pixel buffer or pixmap) configured for GL rendering.")]
    BadSurface,
    /// Arguments are inconsistent (for example, a valid context requires buffers not supplied by a valid surface).
    #[error("Arguments are inconsistent (for example, a valid context requires buffers not supplied by a valid surface).")]
    BadMatch,
    /// One or more argument values are invalid.
    #[error("One or more argument values are invalid.")]
    BadParameter,
    /// A NativePixmapType argument does not refer to a valid native pixmap.
    #[error("A NativePixmapType argument does not refer to a valid native pixmap.")]
    BadNativePixmap,
    /// A NativeWindowType argument does not refer to a valid native window.
    #[error("A NativeWindowType argument does not refer to a valid native window.")]
    BadNativeWindow,
    /// A power management event has occurred. The application must destroy all contexts and reinitialise OpenGL ES state and objects to continue rendering.
    #[error("A power management event has occurred. The application must destroy all contexts and reinitialise OpenGL ES state and objects to continue rendering.")]
    ContextLost,
    /// An unknown error
    #[error("An unknown error ({0:x})")]
    Unknown(u32),
}

impl From<u32> for EGLError {
    fn from(value: u32) -> Self {
        match value {
            ffi::NOT_INITIALIZED => EGLError::NotInitialized,
            ffi::BAD_ACCESS => EGLError::BadAccess,
            ffi::BAD_ALLOC => EGLError::BadAlloc,
            ffi::BAD_ATTRIBUTE => EGLError::BadAttribute,
            ffi::BAD_CONFIG => EGLError::BadConfig,
            ffi::BAD_CONTEXT => EGLError::BadContext,
            ffi::BAD_CURRENT_SURFACE => EGLError::BadCurrentSurface,
            ffi::BAD_DISPLAY => EGLError::BadDisplay,
            ffi::BAD_SURFACE => EGLError::BadSurface,
            ffi::BAD_MATCH => EGLError::BadMatch,
            ffi::BAD_PARAMETER => EGLError::BadParameter,
            ffi::BAD_NATIVE_PIXMAP => EGLError::BadNativePixmap,
            ffi::BAD_NATIVE_WINDOW => EGLError::BadNativeWindow,
            ffi::CONTEXT_LOST => EGLError::ContextLost,
            x => EGLError::Unknown(x),
        }
    }
}

impl From<EGLError> for u32 {
    fn from(value: EGLError) -> Self {
        match value {
            EGLError::NotInitialized => ffi::NOT_INITIALIZED,
            EGLError::BadAccess => ffi::BAD_ACCESS,
            EGLError::BadAlloc => ffi::BAD_ALLOC,
            EGLError::BadAttribute => ffi::BAD_ATTRIBUTE,
            EGLError::BadConfig => ffi::BAD_CONFIG,
            EGLError::BadContext => ffi::BAD_CONTEXT,
            EGLError::BadCurrentSurface => ffi::BAD_CURRENT_SURFACE,
            EGLError::BadDisplay => ffi::BAD_DISPLAY,
            EGLError::BadSurface => ffi::BAD_SURFACE,
            EGLError::BadMatch => ffi::BAD_MATCH,
            EGLError::BadParameter => ffi::BAD_PARAMETER,
            EGLError::BadNativePixmap => ffi::BAD_NATIVE_PIXMAP,
            EGLError::BadNativeWindow => ffi::BAD_NATIVE_WINDOW,
            EGLError::ContextLost => ffi::CONTEXT_LOST,
            EGLError::Unknown(x) => x,
        }
    }
}
