use smallvec::SmallVec;

/// A rectangle defined by its top-left corner and dimensions, in buffer coordinates
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    /// horizontal position of the top-left corner of the rectangle
    pub x: i32,
    /// vertical position of the top-left corner of the rectangle
    pub y: i32,
    /// width of the rectangle
    pub width: i32,
    /// height of the rectangle
    pub height: i32,
}

impl Rectangle {
    /// Create a new rectangle from its position and size
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rectangle { x, y, width, height }
    }

    /// Parses a flat EGL rectangle list as passed to `eglSwapBuffersWithDamage`.
    ///
    /// Every rectangle takes four consecutive values `x, y, width, height`.
    /// A trailing incomplete group is ignored.
    pub fn from_egl_rects(rects: &[i32]) -> SmallVec<[Rectangle; 4]> {
        rects
            .chunks_exact(4)
            .map(|r| Rectangle::new(r[0], r[1], r[2], r[3]))
            .collect()
    }
}
