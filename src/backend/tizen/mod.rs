//! Tizen platform backend
//!
//! Presents frames rendered by the software rasterizing driver into buffers owned by the Tizen
//! windowing system.
//!
//! Bring-up goes through [`TizenDisplay::initialize`], which connects to the windowing system,
//! loads the driver and registers the configs. Only the returned display implements
//! [`DisplayVtbl`], so the surface operations can never be reached on a half initialized
//! display. Dropping the display tears everything down again, which is also what happens to the
//! already created parts if one of the initialization steps fails.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use egl_platform_tizen::backend::{egl::{DisplayMutex, DisplayVtbl}, tizen::{PlatformLoader, TizenDisplay}};
//! # fn run<L: PlatformLoader>(loader: &mut L) -> Result<(), egl_platform_tizen::backend::egl::Error> {
//! let lock = Arc::new(DisplayMutex::new());
//! let display = TizenDisplay::initialize(loader, None, lock)?;
//! for config in display.configs() {
//!     println!("config {} for {:?}", config.config_id, config.surface_type);
//! }
//! # Ok(())
//! # }
//! ```

use std::{fmt, sync::Arc};

use tracing::{debug, error, info, info_span, warn};

use crate::{
    backend::egl::{
        ffi, DisplayLock, DisplayVtbl, EGLError, EglConfig, Error, NativeHandle, SurfaceCreationError,
        SurfaceKind,
    },
    utils::{DeviceFd, Rectangle},
};

mod config;
mod driver;
mod native;
mod surface;
mod swrast;

pub use self::config::{Visual, CONFIG_DEPTH, VISUALS};
pub use self::driver::*;
pub use self::native::*;
pub use self::surface::{BufferError, Surface, SwrastSurface};
pub use self::swrast::{DrawableInfo, ImageOp, SwrastLoader};

/// Name of the driver loaded for every display
pub const DRIVER_NAME: &str = "swrast";

/// Surface type of a [`TizenDisplay`] brought up by the loader `L`
pub type TizenSurface<L> =
    Surface<<<L as PlatformLoader>::Platform as NativePlatform>::Surface, <L as PlatformLoader>::Driver>;

/// Config type of a [`TizenDisplay`] brought up by the loader `L`
pub type TizenConfig<L> = EglConfig<<<L as PlatformLoader>::Driver as SwrastDriver>::Config>;

/// Fully initialized display of the Tizen platform
pub struct TizenDisplay<L: PlatformLoader, K: DisplayLock> {
    // fields are dropped in declaration order, which is the teardown order.
    // surfaces share the driver and unload it last if they outlive the display.
    configs: Vec<TizenConfig<L>>,
    driver: Arc<L::Driver>,
    fd: DeviceFd,
    platform: L::Platform,
    lock: Arc<K>,
    span: tracing::Span,
}

impl<L, K> fmt::Debug for TizenDisplay<L, K>
where
    L: PlatformLoader,
    K: DisplayLock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TizenDisplay")
            .field("configs", &self.configs.len())
            .field("fd", &self.fd)
            .finish_non_exhaustive()
    }
}

fn init_failed(reason: &'static str) -> Error {
    error!(reason, "Display initialization failed");
    Error::NotInitialized(reason)
}

impl<L: PlatformLoader, K: DisplayLock> TizenDisplay<L, K> {
    /// Bring up a display for the application's native display.
    ///
    /// Every step has to succeed, otherwise the parts created so far are torn down again and
    /// the failing step is reported.
    pub fn initialize(
        loader: &mut L,
        native_display: Option<NativeHandle>,
        lock: Arc<K>,
    ) -> Result<TizenDisplay<L, K>, Error> {
        let span = info_span!("backend_tizen");
        let guard = span.enter();

        let platform = loader
            .create_display(native_display)
            .ok_or_else(|| init_failed("failed to create the platform display"))?;
        let fd = loader
            .bufmgr_fd()
            .ok_or_else(|| init_failed("failed to get the buffer manager fd"))?;
        let mut driver = loader
            .load_driver(DRIVER_NAME, &fd, SWRAST_LOADER_EXTENSIONS)
            .ok_or_else(|| init_failed("failed to load the swrast driver"))?;
        debug!(driver = DRIVER_NAME, ?fd, "Loaded driver");

        driver.create_screen().map_err(|err| {
            error!(?err, "Driver screen creation failed");
            init_failed("failed to create the driver screen")
        })?;
        driver.setup_extensions().map_err(|err| {
            error!(?err, "Driver extension setup failed");
            init_failed("failed to set up the driver extensions")
        })?;
        driver.setup_screen();

        let configs = config::add_configs(&platform, &mut driver);
        if configs.is_empty() {
            return Err(init_failed("failed to add configs"));
        }
        info!(configs = configs.len(), "Display initialized");

        drop(guard);
        Ok(TizenDisplay {
            configs,
            driver: Arc::new(driver),
            fd,
            platform,
            lock,
            span,
        })
    }

    /// Configs registered for this display, ids start at one
    pub fn configs(&self) -> &[TizenConfig<L>] {
        &self.configs
    }

    /// Look up a config by its `EGL_CONFIG_ID`
    pub fn config(&self, config_id: ffi::EGLint) -> Option<&TizenConfig<L>> {
        self.configs.iter().find(|config| config.config_id == config_id)
    }

    /// Device file descriptor of the buffer manager
    pub fn fd(&self) -> &DeviceFd {
        &self.fd
    }

    /// Windowing system display
    pub fn platform(&self) -> &L::Platform {
        &self.platform
    }

    /// Loaded driver
    pub fn driver(&self) -> &L::Driver {
        &self.driver
    }

    /// Display lock held by callers of the dispatch table
    pub fn lock(&self) -> &Arc<K> {
        &self.lock
    }

    /// Present a surface with damage given as a flat `x, y, width, height` list
    pub fn swap_buffers_with_egl_damage(
        &self,
        surface: &mut TizenSurface<L>,
        rects: &[ffi::EGLint],
    ) -> Result<(), EGLError> {
        let damage = Rectangle::from_egl_rects(rects);
        self.swap_buffers_with_damage(surface, &damage)
    }
}

impl<L: PlatformLoader, K: DisplayLock> DisplayVtbl for TizenDisplay<L, K> {
    type Surface = TizenSurface<L>;
    type Config = TizenConfig<L>;

    fn create_window_surface(
        &self,
        config: &Self::Config,
        native_window: Option<NativeHandle>,
    ) -> Result<Box<Self::Surface>, SurfaceCreationError> {
        let _guard = self.span.enter();
        Surface::create(
            &self.platform,
            &self.driver,
            SurfaceKind::Window,
            config,
            native_window,
        )
        .map_err(|err| {
            warn!(?err, "Failed to create window surface");
            err
        })
    }

    fn create_pixmap_surface(
        &self,
        config: &Self::Config,
        native_pixmap: Option<NativeHandle>,
    ) -> Result<Box<Self::Surface>, SurfaceCreationError> {
        let _guard = self.span.enter();
        Surface::create(
            &self.platform,
            &self.driver,
            SurfaceKind::Pixmap,
            config,
            native_pixmap,
        )
        .map_err(|err| {
            warn!(?err, "Failed to create pixmap surface");
            err
        })
    }

    fn destroy_surface(&self, surface: Box<Self::Surface>) {
        let _guard = self.span.enter();
        surface.destroy(&*self.lock);
    }

    fn swap_buffers_with_damage(
        &self,
        surface: &mut Self::Surface,
        damage: &[Rectangle],
    ) -> Result<(), EGLError> {
        let _guard = self.span.enter();
        if surface.kind() != SurfaceKind::Window {
            return Ok(());
        }

        if surface.has_buffer() {
            // failures are logged by the enqueue and only cost this frame
            let _ = surface.enqueue_buffer_with_damage(&*self.lock, Some(damage));
        }
        // the driver may write the final image through the raster callbacks,
        // which only touch the state shared with the drawable
        if let Some(drawable) = surface.drawable() {
            self.driver.swap_buffers(drawable);
        }
        Ok(())
    }

    fn query_surface(&self, surface: &Self::Surface, attribute: ffi::EGLint) -> Result<i32, EGLError> {
        let _guard = self.span.enter();
        match (surface.native_window(), attribute) {
            (Some(window), ffi::WIDTH | ffi::HEIGHT) => {
                let info = self.platform.native_window_info(window, 0, 0).map_err(|err| {
                    warn!(?err, "Querying the native window failed");
                    EGLError::BadNativeWindow
                })?;
                Ok(if attribute == ffi::WIDTH {
                    info.width
                } else {
                    info.height
                })
            }
            _ => surface.query(attribute),
        }
    }
}
