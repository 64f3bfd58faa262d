//! Backend helpers
//!
//! Collection of the types and traits making up the platform backend:
//!
//! - [`allocator`] for native buffers, their reference counts and mappings,
//! - [`egl`] for the types shared with the generic EGL dispatch layer,
//! - [`tizen`] for the Tizen platform implementation itself.

pub mod allocator;
pub mod egl;
pub mod tizen;
