#![allow(missing_docs)]
//! Raw EGL values exchanged with the generic EGL layer

pub type EGLint = i32;
pub type EGLenum = u32;

pub const SUCCESS: EGLenum = 0x3000;
pub const NOT_INITIALIZED: EGLenum = 0x3001;
pub const BAD_ACCESS: EGLenum = 0x3002;
pub const BAD_ALLOC: EGLenum = 0x3003;
pub const BAD_ATTRIBUTE: EGLenum = 0x3004;
pub const BAD_CONFIG: EGLenum = 0x3005;
pub const BAD_CONTEXT: EGLenum = 0x3006;
pub const BAD_CURRENT_SURFACE: EGLenum = 0x3007;
pub const BAD_DISPLAY: EGLenum = 0x3008;
pub const BAD_MATCH: EGLenum = 0x3009;
pub const BAD_NATIVE_PIXMAP: EGLenum = 0x300A;
pub const BAD_NATIVE_WINDOW: EGLenum = 0x300B;
pub const BAD_PARAMETER: EGLenum = 0x300C;
pub const BAD_SURFACE: EGLenum = 0x300D;
pub const CONTEXT_LOST: EGLenum = 0x300E;

pub const CONFIG_ID: EGLint = 0x3028;
pub const NATIVE_VISUAL_ID: EGLint = 0x302E;
pub const NONE: EGLint = 0x3038;
pub const HEIGHT: EGLint = 0x3056;
pub const WIDTH: EGLint = 0x3057;
pub const RENDER_BUFFER: EGLint = 0x3086;
pub const BACK_BUFFER: EGLint = 0x3084;
pub const SINGLE_BUFFER: EGLint = 0x3085;

pub const PBUFFER_BIT: EGLint = 0x0001;
pub const PIXMAP_BIT: EGLint = 0x0002;
pub const WINDOW_BIT: EGLint = 0x0004;
