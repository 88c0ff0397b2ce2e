use crate::error::FormatError;

/// A packed `0xRRGGBB` color, the form GIF color tables are read into.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Squared euclidean distance over (R, G, B).
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let d = |a: u8, b: u8| {
            let x = a as i32 - b as i32;
            (x * x) as u32
        };
        d(self.r(), other.r()) + d(self.g(), other.g()) + d(self.b(), other.b())
    }
}

impl From<u32> for Rgb {
    fn from(value: u32) -> Self {
        Rgb(value & 0xFF_FFFF)
    }
}

/// Smallest table depth `k` in `1..=8` with `2^k >= colors`.
pub fn table_depth(colors: usize) -> Result<u8, FormatError> {
    if colors > 256 {
        return Err(FormatError::TooManyColors(colors));
    }
    let mut depth = 1;
    while (1usize << depth) < colors {
        depth += 1;
    }
    Ok(depth)
}
