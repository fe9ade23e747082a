/// RGB colours in the `0xRRGGBB` form used throughout the demos

/// An 8-bit-per-channel RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_hex(0x000000);
    pub const WHITE: Color = Color::from_hex(0xffffff);
    pub const RED: Color = Color::from_hex(0xff0000);
    pub const YELLOW: Color = Color::from_hex(0xffff00);
    pub const BLUE: Color = Color::from_hex(0x0000ff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from a packed `0xRRGGBB` value
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Multiply every channel by `factor`, saturating at white
    pub fn scale(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Perceived brightness in `0.0..=1.0`
    pub fn luminance(self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }

    pub fn to_rgba(self, alpha: f32) -> [u8; 4] {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r, self.g, self.b, a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        let color = Color::from_hex(0x222842);
        assert_eq!(color, Color::new(0x22, 0x28, 0x42));
        assert_eq!(color.to_hex(), 0x222842);
    }

    #[test]
    fn test_scale_saturates() {
        assert_eq!(Color::new(200, 100, 0).scale(2.0), Color::new(255, 200, 0));
        assert_eq!(Color::WHITE.scale(0.0), Color::BLACK);
    }
}
