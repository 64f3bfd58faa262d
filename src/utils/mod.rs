//! Various utilities functions and types

mod fd;
mod rectangle;

pub use self::fd::DeviceFd;
pub use self::rectangle::Rectangle;
