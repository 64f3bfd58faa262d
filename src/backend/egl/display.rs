//! Display-wide lock and the dispatch table of platform backends

use std::sync::{Condvar, Mutex, PoisonError};

use super::{EGLError, NativeHandle, SurfaceCreationError};
use crate::utils::Rectangle;

/// Display-wide mutual exclusion lock owned by the generic EGL layer.
///
/// Every dispatch call happens with this lock held. Unlike a guard based lock it can be released
/// and re-acquired by the callee, which platform backends do around calls that may block on the
/// compositor.
pub trait DisplayLock {
    /// Block until the lock is acquired
    fn lock(&self);
    /// Release the lock held by the caller
    fn unlock(&self);
}

/// Non-recursive display mutex with explicit lock and unlock
#[derive(Debug, Default)]
pub struct DisplayMutex {
    locked: Mutex<bool>,
    released: Condvar,
}

impl DisplayMutex {
    /// Create a new unlocked mutex
    pub fn new() -> DisplayMutex {
        DisplayMutex::default()
    }

    /// Whether somebody currently holds the lock
    pub fn is_locked(&self) -> bool {
        *self.locked.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplayLock for DisplayMutex {
    fn lock(&self) {
        let mut locked = self.locked.lock().unwrap_or_else(PoisonError::into_inner);
        while *locked {
            locked = self
                .released
                .wait(locked)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *locked = true;
    }

    fn unlock(&self) {
        let mut locked = self.locked.lock().unwrap_or_else(PoisonError::into_inner);
        *locked = false;
        self.released.notify_one();
    }
}

/// Values returned by `eglGetSyncValuesCHROMIUM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncValues {
    /// Unadjusted system time
    pub ust: i64,
    /// Media stream counter
    pub msc: i64,
    /// Swap buffer counter
    pub sbc: i64,
}

/// Dispatch table of a platform backend.
///
/// An implementation only exists once the backend finished initializing, so the generic layer
/// can never reach a partially initialized platform through it. Operations a platform does not
/// support have default fallbacks.
pub trait DisplayVtbl {
    /// Surface type created by this platform
    type Surface;
    /// Config type registered by this platform
    type Config;

    /// Create a surface rendering into a native window
    fn create_window_surface(
        &self,
        config: &Self::Config,
        native_window: Option<NativeHandle>,
    ) -> Result<Box<Self::Surface>, SurfaceCreationError>;

    /// Create a surface rendering into a native pixmap
    fn create_pixmap_surface(
        &self,
        config: &Self::Config,
        native_pixmap: Option<NativeHandle>,
    ) -> Result<Box<Self::Surface>, SurfaceCreationError>;

    /// Create an off-screen pixel buffer surface
    fn create_pbuffer_surface(&self, _config: &Self::Config) -> Result<Box<Self::Surface>, SurfaceCreationError> {
        Err(SurfaceCreationError::PbufferUnsupported)
    }

    /// Destroy a surface and every resource bound to it
    fn destroy_surface(&self, surface: Box<Self::Surface>);

    /// Present the current frame of a surface
    fn swap_buffers(&self, surface: &mut Self::Surface) -> Result<(), EGLError> {
        self.swap_buffers_with_damage(surface, &[])
    }

    /// Present the current frame of a surface, restricted to the damaged regions
    fn swap_buffers_with_damage(
        &self,
        surface: &mut Self::Surface,
        damage: &[Rectangle],
    ) -> Result<(), EGLError>;

    /// `eglSwapBuffersRegionNOK`
    fn swap_buffers_region(&self, _surface: &mut Self::Surface, _rects: &[Rectangle]) -> Result<(), EGLError> {
        Err(EGLError::BadMatch)
    }

    /// `eglPostSubBufferNV`
    fn post_sub_buffer(&self, _surface: &mut Self::Surface, _rect: Rectangle) -> Result<(), EGLError> {
        Err(EGLError::BadMatch)
    }

    /// `eglCopyBuffers`
    fn copy_buffers(&self, _surface: &mut Self::Surface, _target: NativeHandle) -> Result<(), EGLError> {
        Err(EGLError::BadNativePixmap)
    }

    /// `EGL_BUFFER_AGE_EXT`, zero means the content is undefined
    fn query_buffer_age(&self, _surface: &mut Self::Surface) -> i32 {
        0
    }

    /// `eglQuerySurface`
    fn query_surface(&self, surface: &Self::Surface, attribute: super::ffi::EGLint) -> Result<i32, EGLError>;

    /// `eglGetSyncValuesCHROMIUM`
    fn get_sync_values(&self, _surface: &Self::Surface) -> Result<SyncValues, EGLError> {
        Err(EGLError::BadMatch)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    use super::*;

    #[test]
    fn explicit_lock_and_unlock() {
        let mutex = DisplayMutex::new();
        assert!(!mutex.is_locked());
        mutex.lock();
        assert!(mutex.is_locked());
        mutex.unlock();
        assert!(!mutex.is_locked());
    }

    #[test]
    fn lock_blocks_until_released() {
        let mutex = Arc::new(DisplayMutex::new());
        let acquired = Arc::new(AtomicBool::new(false));
        mutex.lock();

        let waiter = {
            let mutex = mutex.clone();
            let acquired = acquired.clone();
            thread::spawn(move || {
                mutex.lock();
                acquired.store(true, Ordering::SeqCst);
                mutex.unlock();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::SeqCst));
        mutex.unlock();
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
        assert!(!mutex.is_locked());
    }
}
