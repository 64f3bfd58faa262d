//! Pixel format tags of native buffers
//!
//! The buffer manager tags its buffers with fourcc codes, which line up with the
//! [`drm_fourcc`] definitions. Codes this crate does not know about are still carried
//! around untouched.

use std::fmt;

use super::{Fourcc, UnrecognizedFourcc};

/// Raw pixel format tag of a native window, pixmap or buffer
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Format(pub u32);

impl Format {
    /// Tag reported by the windowing system when no usable format exists
    pub const INVALID: Format = Format(0);

    /// Whether the windowing system reported a usable format
    pub fn is_valid(self) -> bool {
        self != Format::INVALID
    }

    /// Interprets the tag as a known fourcc code
    pub fn fourcc(self) -> Result<Fourcc, UnrecognizedFourcc> {
        Fourcc::try_from(self.0)
    }

    /// Bytes a single pixel of this format occupies in the first plane.
    ///
    /// Only 16-bit RGB565 is narrower than four bytes. Every other format, including
    /// codes that are not recognized at all, is treated as four bytes wide.
    pub fn bytes_per_pixel(self) -> usize {
        match self.fourcc() {
            Ok(Fourcc::Rgb565) => 2,
            _ => 4,
        }
    }

    /// Byte length of `pixels` consecutive pixels of this format
    pub fn stride_for(self, pixels: usize) -> usize {
        self.bytes_per_pixel() * pixels
    }
}

impl From<Fourcc> for Format {
    fn from(code: Fourcc) -> Self {
        Format(code as u32)
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fourcc() {
            Ok(code) => write!(f, "Format({:?})", code),
            Err(_) => write!(f, "Format({:#x})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb565_is_two_bytes() {
        assert_eq!(Format::from(Fourcc::Rgb565).bytes_per_pixel(), 2);
    }

    #[test]
    fn thirty_two_bit_formats_are_four_bytes() {
        for code in [Fourcc::Rgba8888, Fourcc::Bgra8888, Fourcc::Rgbx8888, Fourcc::Argb8888] {
            assert_eq!(Format::from(code).bytes_per_pixel(), 4);
        }
    }

    #[test]
    fn unknown_formats_default_to_four_bytes() {
        let unknown = Format(0xdead_beef);
        assert!(unknown.fourcc().is_err());
        assert_eq!(unknown.bytes_per_pixel(), 4);
        assert_eq!(Format::INVALID.bytes_per_pixel(), 4);
        // 16 bit formats we do not enumerate explicitly still get the default
        assert_eq!(Format::from(Fourcc::Xrgb4444).bytes_per_pixel(), 4);
    }

    #[test]
    fn stride_scales_with_width() {
        assert_eq!(Format::from(Fourcc::Rgb565).stride_for(10), 20);
        assert_eq!(Format::from(Fourcc::Rgba8888).stride_for(10), 40);
    }

    #[test]
    fn validity() {
        assert!(!Format::INVALID.is_valid());
        assert!(Format::from(Fourcc::Rgba8888).is_valid());
    }
}
