/// Represents a color in RGBA format.
///
/// Each channel is an 8-bit unsigned integer. Surfaces store colors packed into a `u32` with red
/// in the lowest byte, see [`Color::to_packed`].
///
/// # Examples
///
/// ```
/// use tileraster::Color;
///
/// let red = Color::rgb(255, 0, 0);
/// assert_eq!(red.normalize(), [1.0, 0.0, 0.0, 1.0]);
///
/// let semi_blue = Color::rgba(0, 0, 255, 128);
/// assert_eq!(semi_blue.to_array(), [0, 0, 255, 128]);
/// assert_eq!(Color::from_packed(semi_blue.to_packed()), semi_blue);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color(pub [u8; 4]);

impl Color {
    /// A transparent color. All channels are zero, which is also the packed value `0`.
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);
    /// An opaque black color.
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    /// An opaque white color.
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    /// Creates a new color with the specified RGB values and full opacity.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Creates a new color with the specified RGBA values.
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Converts a normalized `[r, g, b, a]` color into 8-bit channels.
    ///
    /// Values are clamped to `[0.0, 1.0]` and rounded. NaN maps to zero.
    ///
    /// ```
    /// use tileraster::Color;
    ///
    /// assert_eq!(Color::from_normalized([1.0, 0.5, -2.0, 1.0]), Color([255, 128, 0, 255]));
    /// ```
    pub fn from_normalized(rgba: [f32; 4]) -> Self {
        Self(rgba.map(|channel| {
            if channel.is_nan() {
                0
            } else {
                (channel.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        }))
    }

    /// Normalizes the color values to the range [0.0, 1.0].
    pub fn normalize(&self) -> [f32; 4] {
        self.0.map(|channel| channel as f32 / 255.0)
    }

    /// Returns the color as an array of 4 `u8` values.
    pub fn to_array(&self) -> [u8; 4] {
        self.0
    }

    /// Packs the color into the surface pixel format.
    pub fn to_packed(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Unpacks a surface pixel.
    pub fn from_packed(packed: u32) -> Self {
        Self(packed.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn transparent_packs_to_zero() {
        assert_eq!(Color::TRANSPARENT.to_packed(), 0);
    }

    #[test]
    fn packed_layout_keeps_red_in_lowest_byte() {
        assert_eq!(Color::rgba(1, 2, 3, 4).to_packed(), 0x0403_0201);
    }

    #[test]
    fn from_normalized_clamps_out_of_range_channels() {
        let color = Color::from_normalized([2.0, -1.0, f32::NAN, 0.0]);
        assert_eq!(color, Color([255, 0, 0, 0]));
    }
}
