#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
// Allow acronyms like EGL
#![allow(clippy::upper_case_acronyms)]

//! # Tizen platform backend for EGL
//!
//! This crate implements the platform layer an EGL implementation needs to present frames
//! rendered by a software rasterizing driver into buffers owned by the Tizen windowing system.
//!
//! It sits between three parties that each own their own ABI:
//!
//! - the windowing system, handing out native buffers for a window through a
//!   dequeue/enqueue queue ([`backend::tizen::NativePlatform`], [`backend::tizen::NativeSurface`]),
//! - the GPU driver, which owns the drawables and renders into them by calling back into
//!   this crate for pixel access ([`backend::tizen::SwrastDriver`], [`backend::tizen::SwrastLoader`]),
//! - the generic EGL layer, which dispatches surface operations through a fixed table
//!   ([`backend::egl::DisplayVtbl`]) while holding a display-wide lock ([`backend::egl::DisplayLock`]).
//!
//! ## Structure of the crate
//!
//! - [`backend::allocator`] contains the buffer primitives: format tags, reference counted
//!   buffer handles and scoped mappings.
//! - [`backend::egl`] contains the EGL facing types: error codes, configs, the display lock
//!   and the dispatch table.
//! - [`backend::tizen`] contains the platform backend itself, starting at
//!   [`TizenDisplay::initialize`](backend::tizen::TizenDisplay::initialize).
//! - [`utils`] contains small shared helpers.
//!
//! ## Buffer lifecycle
//!
//! Every window surface holds at most one buffer at any time. A buffer is dequeued lazily the
//! first time the driver asks for the drawable geometry or pixel access in a frame, and is handed
//! back to the windowing system on swap. The hand-off may block on compositor backpressure, so the
//! display lock is released around it and re-acquired before returning.
//!
//! ### Logging
//!
//! This crate makes extensive use of [`tracing`] for its internal logging.
//!
//! For release builds it is recommended to limit the log level during compile time.
//! This can be done by adding a dependency to [`tracing`] and enabling the corresponding features.
//! For example to enable `trace` messages for debug builds, but limit release builds to `debug` add
//! the following in your binary crate `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! tracing = { version = "0.1", features = ["max_level_trace", "release_max_level_debug"] }
//! ```

pub mod backend;
pub mod utils;
