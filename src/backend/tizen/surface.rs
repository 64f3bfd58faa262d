//! Surfaces and the buffer exchange protocol
//!
//! A window surface cycles through three states every frame:
//!
//! 1. no buffer checked out,
//! 2. a buffer dequeued from the native window, rendered into by the driver,
//! 3. the buffer handed back by an enqueue (presented) or a cancel, back to 1.
//!
//! Pixmap surfaces never check out buffers.
//!
//! The buffer state lives in a [`SwrastSurface`] shared with the driver, which reaches it from
//! its raster callbacks while a [`Surface`] call like a swap may still be running.

use std::{
    cell::{Ref, RefCell},
    error::Error as StdError,
    ops::Deref,
    ptr::NonNull,
    rc::Rc,
    sync::Arc,
};

use tracing::{debug, trace, warn};

use crate::{
    backend::{
        allocator::{BufferHandle, CopyError, Format, MapError, NativeBuffer},
        egl::{ffi, DisplayLock, EGLError, EglConfig, NativeHandle, SurfaceCreationError, SurfaceKind},
    },
    utils::Rectangle,
};

use super::{ConfigAttrib, LoaderPrivate, NativePlatform, NativeSurface, SwrastDriver};

/// Error that can happen while exchanging buffers with the windowing system
#[derive(thiserror::Error, Debug)]
pub enum BufferError {
    /// The native window had no free buffer
    #[error("Could not dequeue a buffer from the native window")]
    NoBuffer,
    /// The operation needs a checked out buffer, but none is
    #[error("No buffer is checked out")]
    NotCheckedOut,
    /// The windowing system rejected the submitted buffer
    #[error("Submitting the buffer failed: {0}")]
    Enqueue(#[source] Box<dyn StdError + Send + Sync>),
    /// The buffer could not be mapped
    #[error("{0}")]
    Map(#[from] MapError),
    /// The requested region does not fit the buffer
    #[error("{0}")]
    Copy(#[from] CopyError),
}

/// Surface state the driver reaches through its raster callbacks.
///
/// The driver finds it through the [`LoaderPrivate`] of the surface's drawable, possibly while
/// the owning [`Surface`] is borrowed by a dispatch call. It is therefore only ever handed out by
/// shared reference and keeps its mutable parts behind a [`RefCell`].
#[derive(Debug)]
pub struct SwrastSurface<S: NativeSurface> {
    kind: SurfaceKind,
    format: Format,
    native_window: Option<NativeHandle>,
    pub(super) frame: RefCell<Frame<S>>,
}

#[derive(Debug)]
pub(super) struct Frame<S: NativeSurface> {
    width: i32,
    height: i32,
    native: S,
    pub(super) buffer: Option<BufferHandle<S::Buffer>>,
}

/// Rendering surface bound to a native window or pixmap.
///
/// The surface keeps the driver alive until its drawable is destroyed. Dropping it outside of
/// [`DisplayVtbl::destroy_surface`](crate::backend::egl::DisplayVtbl::destroy_surface) still
/// cancels a checked out buffer and destroys the drawable before the native surface is released.
#[derive(Debug)]
pub struct Surface<S: NativeSurface, D: SwrastDriver> {
    config_id: i32,
    shared: Rc<SwrastSurface<S>>,
    drawable: Option<D::Drawable>,
    driver: Arc<D>,
}

impl<S: NativeSurface, D: SwrastDriver> Surface<S, D> {
    /// Create a surface for a native window or pixmap and its driver drawable.
    ///
    /// Resources are released in reverse order if a later step fails.
    pub(super) fn create<P>(
        platform: &P,
        driver: &Arc<D>,
        kind: SurfaceKind,
        config: &EglConfig<D::Config>,
        native: Option<NativeHandle>,
    ) -> Result<Box<Surface<S, D>>, SurfaceCreationError>
    where
        P: NativePlatform<Surface = S>,
    {
        if kind == SurfaceKind::Pbuffer {
            return Err(SurfaceCreationError::PbufferUnsupported);
        }
        if !config.surface_type.contains(kind.surface_type()) {
            return Err(SurfaceCreationError::ConfigMismatch(kind));
        }

        let (native, info) = match kind {
            SurfaceKind::Window => {
                let window = native.ok_or(SurfaceCreationError::MissingNativeWindow)?;
                let depth = driver.config_attrib(&config.driver_config, ConfigAttrib::DepthSize);
                let alpha = driver.config_attrib(&config.driver_config, ConfigAttrib::AlphaSize);
                let info = platform
                    .native_window_info(window, depth, alpha)
                    .map_err(|err| SurfaceCreationError::NativeInfo {
                        kind,
                        source: Box::new(err),
                    })?;
                (window, info)
            }
            SurfaceKind::Pixmap => {
                let pixmap = native.ok_or(SurfaceCreationError::MissingNativePixmap)?;
                let info =
                    platform
                        .native_pixmap_info(pixmap)
                        .map_err(|err| SurfaceCreationError::NativeInfo {
                            kind,
                            source: Box::new(err),
                        })?;
                (pixmap, info)
            }
            SurfaceKind::Pbuffer => return Err(SurfaceCreationError::PbufferUnsupported),
        };
        if !info.format.is_valid() {
            return Err(SurfaceCreationError::NoPixelFormat(kind));
        }

        let native_surface = platform
            .create_surface(native, kind, info.format)
            .ok_or(SurfaceCreationError::NativeSurfaceFailed)?;

        let shared = Rc::new(SwrastSurface {
            kind,
            format: info.format,
            native_window: (kind == SurfaceKind::Window).then_some(native),
            frame: RefCell::new(Frame {
                width: info.width,
                height: info.height,
                native: native_surface,
                buffer: None,
            }),
        });
        let drawable = driver
            .create_drawable(&config.driver_config, shared.loader_private())
            .ok_or(SurfaceCreationError::DrawableFailed)?;

        debug!(
            ?kind,
            width = info.width,
            height = info.height,
            format = ?info.format,
            "Created surface"
        );
        Ok(Box::new(Surface {
            config_id: config.config_id,
            shared,
            drawable: Some(drawable),
            driver: driver.clone(),
        }))
    }

    /// Tear the surface down with the display lock held by the caller.
    ///
    /// A buffer still checked out is cancelled with the lock released, then the drawable is
    /// destroyed and finally the native surface object is released.
    pub(super) fn destroy<L>(self: Box<Self>, lock: &L)
    where
        L: DisplayLock + ?Sized,
    {
        if self.kind() == SurfaceKind::Window && self.has_buffer() {
            self.cancel_buffer(lock);
        }
    }

    /// Id of the config the surface was created with
    pub fn config_id(&self) -> i32 {
        self.config_id
    }

    /// Driver drawable of the surface
    pub fn drawable(&self) -> Option<&D::Drawable> {
        self.drawable.as_ref()
    }

    /// Answer a surface query from the state cached in the surface
    pub fn query(&self, attribute: ffi::EGLint) -> Result<i32, EGLError> {
        let (width, height) = self.size();
        match attribute {
            ffi::CONFIG_ID => Ok(self.config_id),
            ffi::WIDTH => Ok(width),
            ffi::HEIGHT => Ok(height),
            ffi::RENDER_BUFFER => Ok(match self.kind() {
                SurfaceKind::Window => ffi::BACK_BUFFER,
                _ => ffi::SINGLE_BUFFER,
            }),
            _ => Err(EGLError::BadAttribute),
        }
    }
}

impl<S: NativeSurface, D: SwrastDriver> Deref for Surface<S, D> {
    type Target = SwrastSurface<S>;

    fn deref(&self) -> &SwrastSurface<S> {
        &self.shared
    }
}

impl<S: NativeSurface, D: SwrastDriver> Drop for Surface<S, D> {
    fn drop(&mut self) {
        // only left over if the surface was not destroyed through the display,
        // so there is no display lock to give up around the cancel
        if self.shared.has_buffer() {
            if let Err(err) = self.shared.submit(None) {
                debug!(?err, "Ignoring error while cancelling buffer");
            }
        }
        if let Some(drawable) = self.drawable.take() {
            self.driver.destroy_drawable(drawable);
        }
        debug!(kind = ?self.kind(), "Destroyed surface");
    }
}

impl<S: NativeSurface> SwrastSurface<S> {
    /// Recover the surface state from the context the driver passes to its callbacks.
    ///
    /// # Safety
    ///
    /// `loader_private` has to be the context a drawable of a still alive [`Surface`] was created
    /// with, and that surface has to outlive `'a`.
    pub unsafe fn from_loader_private<'a>(loader_private: LoaderPrivate) -> &'a SwrastSurface<S> {
        unsafe { &*loader_private.as_ptr().cast::<SwrastSurface<S>>() }
    }

    /// Context handed to the driver for this surface
    pub fn loader_private(&self) -> LoaderPrivate {
        LoaderPrivate(NonNull::from(self).cast())
    }

    /// Kind of the surface
    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Last known size of the native window or pixmap
    pub fn size(&self) -> (i32, i32) {
        let frame = self.frame.borrow();
        (frame.width, frame.height)
    }

    /// Pixel format the native surface was created with
    pub fn format(&self) -> Format {
        self.format
    }

    /// Native window the surface renders into, `None` for pixmap surfaces
    pub fn native_window(&self) -> Option<NativeHandle> {
        self.native_window
    }

    /// Windowing system surface object
    pub fn native_surface(&self) -> Ref<'_, S> {
        Ref::map(self.frame.borrow(), |frame| &frame.native)
    }

    /// Buffer currently checked out, if any
    pub fn buffer(&self) -> Option<Ref<'_, S::Buffer>> {
        Ref::filter_map(self.frame.borrow(), |frame| frame.buffer.as_deref()).ok()
    }

    /// Whether a buffer is checked out
    pub fn has_buffer(&self) -> bool {
        self.frame.borrow().buffer.is_some()
    }

    /// Format of the checked out buffer, or of the surface if no buffer is checked out
    pub(super) fn buffer_format(&self) -> Format {
        self.frame
            .borrow()
            .buffer
            .as_ref()
            .map(|buffer| buffer.format())
            .unwrap_or(self.format)
    }

    /// Check out the next buffer of the native window.
    ///
    /// Does nothing if a buffer is already checked out. The surface size is refreshed from the
    /// window, as it may change between frames.
    pub fn dequeue_buffer(&self) -> Result<(), BufferError> {
        let mut frame = self.frame.borrow_mut();
        if frame.buffer.is_some() {
            return Ok(());
        }

        let buffer = frame.native.dequeue_buffer().ok_or(BufferError::NoBuffer)?;
        let buffer = BufferHandle::acquire(buffer);

        let (width, height) = frame.native.size();
        if (width, height) != (frame.width, frame.height) {
            debug!(
                from = ?(frame.width, frame.height),
                to = ?(width, height),
                "Native window changed size"
            );
            frame.width = width;
            frame.height = height;
        }

        trace!(buffer = ?*buffer, "Dequeued buffer");
        frame.buffer = Some(buffer);
        Ok(())
    }

    /// Hand the checked out buffer back to the windowing system for display.
    ///
    /// `lock` has to be held by the caller. It is released while the buffer is submitted, as
    /// that may block on the compositor, and held again when this returns. The buffer is
    /// released whether the submission succeeds or not.
    ///
    /// Without damage, or with an empty damage list, the whole surface is submitted.
    pub fn enqueue_buffer_with_damage<L>(&self, lock: &L, damage: Option<&[Rectangle]>) -> Result<(), BufferError>
    where
        L: DisplayLock + ?Sized,
    {
        if !self.has_buffer() {
            return Err(BufferError::NotCheckedOut);
        }

        lock.unlock();
        scopeguard::defer! {
            lock.lock();
        }
        self.submit(damage)
    }

    /// Hand the checked out buffer back for display of the whole surface
    pub fn enqueue_buffer<L>(&self, lock: &L) -> Result<(), BufferError>
    where
        L: DisplayLock + ?Sized,
    {
        self.enqueue_buffer_with_damage(lock, None)
    }

    /// Give up the checked out buffer. Never fails, errors are only logged.
    pub fn cancel_buffer<L>(&self, lock: &L)
    where
        L: DisplayLock + ?Sized,
    {
        if let Err(err) = self.enqueue_buffer(lock) {
            debug!(?err, "Ignoring error while cancelling buffer");
        }
    }

    /// Make sure a window surface has a buffer checked out, dequeueing one if needed.
    ///
    /// Pixmap surfaces always succeed without a buffer.
    pub fn update_buffers(&self) -> Result<(), BufferError> {
        if self.kind != SurfaceKind::Window {
            return Ok(());
        }

        self.dequeue_buffer().map_err(|err| {
            warn!("Could not dequeue buffer from native window");
            err
        })
    }

    fn submit(&self, damage: Option<&[Rectangle]>) -> Result<(), BufferError> {
        let mut frame = self.frame.borrow_mut();
        let frame = &mut *frame;
        let buffer = frame.buffer.take().ok_or(BufferError::NotCheckedOut)?;

        let result = match damage {
            Some(damage) if !damage.is_empty() => frame.native.enqueue_buffer_with_damage(&buffer, damage),
            _ => frame.native.enqueue_buffer(&buffer),
        };
        buffer.release();

        result.map_err(|err| {
            warn!(?err, "Enqueueing buffer failed");
            BufferError::Enqueue(Box::new(err))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::{
        egl::DisplayMutex,
        tizen::test::{pixmap_handle, window_handle, DummyLoader, DummySurface, Event},
    };

    fn rgba() -> Format {
        Format::from(crate::backend::allocator::Fourcc::Rgba8888)
    }

    #[test]
    fn dequeue_is_exclusive() {
        let loader = DummyLoader::new();
        let surface = loader.window_surface();

        surface.dequeue_buffer().unwrap();
        let first = surface.buffer().unwrap().id;
        surface.dequeue_buffer().unwrap();
        assert_eq!(surface.buffer().unwrap().id, first);
        assert_eq!(loader.state().count(|e| matches!(e, Event::Dequeue(_))), 1);
        assert_eq!(loader.state().buffer_refs, 1);
    }

    #[test]
    fn dequeue_refreshes_size() {
        let loader = DummyLoader::new();
        let surface = loader.window_surface();
        assert_eq!(surface.size(), (100, 100));

        loader.state_mut().window_size = (200, 50);
        surface.dequeue_buffer().unwrap();
        assert_eq!(surface.size(), (200, 50));
    }

    #[test]
    fn failed_dequeue_leaves_surface_empty() {
        let loader = DummyLoader::new();
        let surface = loader.window_surface();
        loader.state_mut().dequeue_fails = true;

        assert!(matches!(surface.dequeue_buffer(), Err(BufferError::NoBuffer)));
        assert!(surface.buffer().is_none());
        assert_eq!(loader.state().buffer_refs, 0);

        // retryable on the next frame
        loader.state_mut().dequeue_fails = false;
        surface.dequeue_buffer().unwrap();
        assert!(surface.buffer().is_some());
    }

    #[test]
    fn enqueue_releases_lock_only_around_submission() {
        let loader = DummyLoader::new();
        let lock = Arc::new(DisplayMutex::new());
        loader.state_mut().observed_lock = Some(lock.clone());
        let surface = loader.window_surface();

        surface.dequeue_buffer().unwrap();
        lock.lock();
        surface.enqueue_buffer(&*lock).unwrap();

        assert!(lock.is_locked());
        assert_eq!(loader.state().lock_held_during_enqueue, vec![false]);
        lock.unlock();
    }

    #[test]
    fn enqueue_failure_still_releases_buffer_and_relocks() {
        let loader = DummyLoader::new();
        let lock = DisplayMutex::new();
        let surface = loader.window_surface();
        loader.state_mut().enqueue_fails = true;

        surface.dequeue_buffer().unwrap();
        lock.lock();
        assert!(matches!(
            surface.enqueue_buffer(&lock),
            Err(BufferError::Enqueue(_))
        ));
        assert!(lock.is_locked());
        assert!(surface.buffer().is_none());
        assert_eq!(loader.state().buffer_refs, 0);
        lock.unlock();
    }

    #[test]
    fn enqueue_without_buffer_keeps_lock() {
        let loader = DummyLoader::new();
        let lock = DisplayMutex::new();
        let surface = loader.window_surface();

        lock.lock();
        assert!(matches!(
            surface.enqueue_buffer(&lock),
            Err(BufferError::NotCheckedOut)
        ));
        assert!(lock.is_locked());
        lock.unlock();
    }

    #[test]
    fn empty_damage_uses_full_submission() {
        let loader = DummyLoader::new();
        let lock = DisplayMutex::new();
        let surface = loader.window_surface();

        for damage in [None, Some(&[][..])] {
            surface.dequeue_buffer().unwrap();
            lock.lock();
            surface.enqueue_buffer_with_damage(&lock, damage).unwrap();
            lock.unlock();
        }
        let damage = [Rectangle::new(5, 5, 10, 10)];
        surface.dequeue_buffer().unwrap();
        lock.lock();
        surface.enqueue_buffer_with_damage(&lock, Some(&damage)).unwrap();
        lock.unlock();

        let state = loader.state();
        let submissions: Vec<_> = state
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Enqueue { damage, .. } => Some(damage.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(submissions, vec![None, None, Some(damage.to_vec())]);
    }

    #[test]
    fn cancel_ignores_errors() {
        let loader = DummyLoader::new();
        let lock = DisplayMutex::new();
        let surface = loader.window_surface();
        loader.state_mut().enqueue_fails = true;

        surface.dequeue_buffer().unwrap();
        lock.lock();
        surface.cancel_buffer(&lock);
        // cancelling with nothing checked out is fine as well
        surface.cancel_buffer(&lock);
        assert!(lock.is_locked());
        lock.unlock();
        assert!(surface.buffer().is_none());
        assert_eq!(loader.state().buffer_refs, 0);
    }

    #[test]
    fn update_buffers_is_lazy_and_window_only() {
        let loader = DummyLoader::new();
        let window = loader.window_surface();
        window.update_buffers().unwrap();
        window.update_buffers().unwrap();
        assert_eq!(loader.state().count(|e| matches!(e, Event::Dequeue(_))), 1);

        let pixmap = loader.pixmap_surface();
        pixmap.update_buffers().unwrap();
        assert!(pixmap.buffer().is_none());
        assert_eq!(loader.state().count(|e| matches!(e, Event::Dequeue(_))), 1);

        loader.state_mut().dequeue_fails = true;
        let window = loader.window_surface();
        assert!(window.update_buffers().is_err());
    }

    #[test]
    fn destroy_cancels_outstanding_buffer() {
        let loader = DummyLoader::new();
        let lock = Arc::new(DisplayMutex::new());
        loader.state_mut().observed_lock = Some(lock.clone());
        let surface = loader.window_surface();
        surface.dequeue_buffer().unwrap();

        lock.lock();
        surface.destroy(&*lock);
        assert!(lock.is_locked());
        lock.unlock();

        let state = loader.state();
        assert_eq!(state.buffer_refs, 0);
        assert_eq!(state.lock_held_during_enqueue, vec![false]);
        let enqueue = state.position(|e| matches!(e, Event::Enqueue { .. })).unwrap();
        let drawable = state.position(|e| matches!(e, Event::DrawableDestroyed(_))).unwrap();
        let released = state.position(|e| *e == Event::SurfaceReleased).unwrap();
        assert!(enqueue < drawable && drawable < released);
    }

    #[test]
    fn dropped_surface_cancels_and_destroys_drawable() {
        let loader = DummyLoader::new();
        let surface = loader.window_surface();
        surface.dequeue_buffer().unwrap();
        assert_eq!(loader.state().buffer_refs, 1);

        drop(surface);

        let state = loader.state();
        assert_eq!(state.count(|e| matches!(e, Event::Enqueue { .. })), 1);
        assert_eq!(state.count(|e| matches!(e, Event::DrawableDestroyed(_))), 1);
        assert_eq!(state.count(|e| *e == Event::SurfaceReleased), 1);
        assert_eq!(state.buffer_refs, 0);
        let drawable = state.position(|e| matches!(e, Event::DrawableDestroyed(_))).unwrap();
        let released = state.position(|e| *e == Event::SurfaceReleased).unwrap();
        assert!(drawable < released);
    }

    #[test]
    fn dropped_pixmap_only_destroys_drawable() {
        let loader = DummyLoader::new();
        drop(loader.pixmap_surface());

        let state = loader.state();
        assert_eq!(state.count(|e| matches!(e, Event::Enqueue { .. })), 0);
        assert_eq!(state.count(|e| matches!(e, Event::DrawableDestroyed(_))), 1);
        assert_eq!(state.count(|e| *e == Event::SurfaceReleased), 1);
    }

    #[test]
    fn loader_private_points_to_shared_state() {
        let loader = DummyLoader::new();
        let surface = loader.window_surface();
        let private = surface.drawable().unwrap().loader_private;
        assert_eq!(private, surface.loader_private());

        {
            let recovered = unsafe { SwrastSurface::<DummySurface>::from_loader_private(private) };
            recovered.dequeue_buffer().unwrap();
        }
        assert!(surface.buffer().is_some());
    }

    #[test]
    fn cached_queries() {
        let loader = DummyLoader::new();
        let window = loader.window_surface();
        assert_eq!(window.query(ffi::WIDTH), Ok(100));
        assert_eq!(window.query(ffi::HEIGHT), Ok(100));
        assert_eq!(window.query(ffi::RENDER_BUFFER), Ok(ffi::BACK_BUFFER));
        assert_eq!(window.query(ffi::CONFIG_ID), Ok(window.config_id()));
        assert_eq!(window.query(0x1234), Err(EGLError::BadAttribute));
        assert_eq!(window.format(), rgba());
        assert_eq!(window.native_window(), window_handle());

        let pixmap = loader.pixmap_surface();
        assert_eq!(pixmap.query(ffi::RENDER_BUFFER), Ok(ffi::SINGLE_BUFFER));
        assert!(pixmap.native_window().is_none());
        assert!(pixmap_handle().is_some());
    }
}
