use std::ops::Deref;

use tracing::trace;

use super::NativeBuffer;

/// Reference held by this crate on a native buffer.
///
/// Acquiring a handle takes one reference on the buffer, dropping it releases that reference
/// again. This is the only place the reference count of native buffers is touched, so every
/// successful dequeue is balanced by exactly one release.
#[derive(Debug)]
pub struct BufferHandle<B: NativeBuffer> {
    buffer: B,
}

impl<B: NativeBuffer> BufferHandle<B> {
    /// Take a reference on `buffer`
    pub fn acquire(buffer: B) -> BufferHandle<B> {
        buffer.reference();
        trace!(?buffer, "Referenced native buffer");
        BufferHandle { buffer }
    }

    /// Release the reference explicitly, same as dropping the handle.
    pub fn release(self) {}
}

impl<B: NativeBuffer> Deref for BufferHandle<B> {
    type Target = B;
    fn deref(&self) -> &B {
        &self.buffer
    }
}

impl<B: NativeBuffer> Drop for BufferHandle<B> {
    fn drop(&mut self) {
        self.buffer.unreference();
        trace!(buffer = ?self.buffer, "Released native buffer");
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::backend::allocator::{Format, MapAccess, MapError, Plane};

    #[derive(Debug, Default)]
    struct Counted(Rc<Cell<i32>>);

    impl NativeBuffer for Counted {
        fn reference(&self) {
            self.0.set(self.0.get() + 1);
        }
        fn unreference(&self) {
            self.0.set(self.0.get() - 1);
        }
        fn format(&self) -> Format {
            Format::INVALID
        }
        fn map(&self, _access: MapAccess) -> Result<Plane, MapError> {
            Err(MapError(-1))
        }
        fn unmap(&self) {}
    }

    #[test]
    fn acquire_and_drop_balance() {
        let refs = Rc::new(Cell::new(0));
        let handle = BufferHandle::acquire(Counted(refs.clone()));
        assert_eq!(refs.get(), 1);
        drop(handle);
        assert_eq!(refs.get(), 0);
    }

    #[test]
    fn explicit_release() {
        let refs = Rc::new(Cell::new(0));
        let first = BufferHandle::acquire(Counted(refs.clone()));
        let second = BufferHandle::acquire(Counted(refs.clone()));
        assert_eq!(refs.get(), 2);
        first.release();
        assert_eq!(refs.get(), 1);
        second.release();
        assert_eq!(refs.get(), 0);
    }
}
