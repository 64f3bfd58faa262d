//! Interface of the software rasterizing GPU driver

use std::{error::Error as StdError, fmt, os::raw::c_void, ptr::NonNull};

use crate::{
    backend::egl::{EglConfig, NativeHandle, SurfaceType},
    utils::DeviceFd,
};

use super::NativePlatform;

/// Name and version of a loader extension offered to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    /// Extension name
    pub name: &'static str,
    /// Extension version
    pub version: u32,
    /// Callbacks the extension provides
    pub entry_points: &'static [&'static str],
}

/// Loader extension implemented by [`SwrastLoader`](super::SwrastLoader)
pub const SWRAST_LOADER_EXTENSION: ExtensionDescriptor = ExtensionDescriptor {
    name: "DRI_SWRastLoader",
    version: 2,
    entry_points: &["getDrawableInfo", "putImage", "getImage", "putImage2"],
};

/// Loader extensions offered to the driver when it is loaded
pub static SWRAST_LOADER_EXTENSIONS: &[ExtensionDescriptor] = &[SWRAST_LOADER_EXTENSION];

/// Opaque per-surface context handed to the driver on drawable creation.
///
/// The driver passes it back on every raster bridge callback. It points to the
/// [`SwrastSurface`](super::SwrastSurface) shared by the drawable's [`Surface`](super::Surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoaderPrivate(pub(super) NonNull<c_void>);

impl LoaderPrivate {
    /// Raw pointer as seen by the driver
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Driver config attributes this crate reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAttrib {
    /// Bits of the depth buffer
    DepthSize,
    /// Bits of the alpha channel
    AlphaSize,
}

/// Software rasterizing driver, loaded once per display
pub trait SwrastDriver {
    /// Driver framebuffer configuration
    type Config: Clone + fmt::Debug;
    /// Driver rendering target bound to a surface
    type Drawable: fmt::Debug;
    /// Error reported during screen setup
    type Error: StdError + Send + Sync + 'static;

    /// Create the driver screen
    fn create_screen(&mut self) -> Result<(), Self::Error>;

    /// Bind the extensions the screen exposes
    fn setup_extensions(&mut self) -> Result<(), Self::Error>;

    /// Derive the display capabilities from the screen
    fn setup_screen(&mut self);

    /// Framebuffer configurations supported by the screen
    fn driver_configs(&self) -> &[Self::Config];

    /// Read an attribute of a driver config, zero if it is not set
    fn config_attrib(&self, config: &Self::Config, attrib: ConfigAttrib) -> u32;

    /// Register an EGL config for a driver config.
    ///
    /// Returns the registered config, which may be an earlier one if the driver decided both
    /// are identical, or `None` if the combination is rejected.
    fn add_config(
        &mut self,
        config: &Self::Config,
        config_id: i32,
        surface_type: SurfaceType,
        attributes: &[i32],
        rgba_masks: [u32; 4],
    ) -> Option<EglConfig<Self::Config>>;

    /// Create a drawable bound to a surface
    fn create_drawable(&self, config: &Self::Config, loader_private: LoaderPrivate) -> Option<Self::Drawable>;

    /// Destroy a drawable
    fn destroy_drawable(&self, drawable: Self::Drawable);

    /// Finish the frame of a drawable
    fn swap_buffers(&self, drawable: &Self::Drawable);
}

/// Entry point used to bring up the collaborators of a display
pub trait PlatformLoader {
    /// Windowing system display
    type Platform: NativePlatform;
    /// Software rasterizing driver
    type Driver: SwrastDriver;

    /// Connect to the windowing system through the application's native display
    fn create_display(&mut self, native_display: Option<NativeHandle>) -> Option<Self::Platform>;

    /// Device file descriptor of the buffer manager
    fn bufmgr_fd(&mut self) -> Option<DeviceFd>;

    /// Load the driver called `name`, offering it the given loader extensions
    fn load_driver(
        &mut self,
        name: &str,
        fd: &DeviceFd,
        loader_extensions: &'static [ExtensionDescriptor],
    ) -> Option<Self::Driver>;
}
