use std::ops::{Add, AddAssign, Mul, MulAssign};

use serde::Deserialize;

/// Linear color with an alpha channel, usually within [0, 1] per channel.
///
/// Nothing clamps automatically; call [`Color::saturate`] where a bounded
/// value is needed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "ColorParams")]
pub struct Color {
    pub a: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(1.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 1.0, 0.0, 0.0);
    pub const LIME: Color = Color::new(1.0, 0.0, 1.0, 0.0);
    pub const GREEN: Color = Color::new(1.0, 0.0, 0.5, 0.0);
    pub const DARK_GREEN: Color = Color::new(1.0, 0.0, 100.0 / 255.0, 0.0);
    pub const BLUE: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const DARK_SLATE_GRAY: Color = Color::new(1.0, 47.0 / 255.0, 79.0 / 255.0, 79.0 / 255.0);
    pub const ALMOST_BLACK: Color = Color::new(1.0, 0.1, 0.1, 0.1);

    /// Fully transparent black, the additive identity.
    pub const ZERO: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(a: f32, r: f32, g: f32, b: f32) -> Self {
        Color { a, r, g, b }
    }

    /// Looks up a preset by its snake_case name.
    pub fn named(name: &str) -> Option<Color> {
        match name {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::RED),
            "lime" => Some(Color::LIME),
            "green" => Some(Color::GREEN),
            "dark_green" => Some(Color::DARK_GREEN),
            "blue" => Some(Color::BLUE),
            "dark_slate_gray" => Some(Color::DARK_SLATE_GRAY),
            "almost_black" => Some(Color::ALMOST_BLACK),
            _ => None,
        }
    }

    /// Clamps every channel, alpha included, to [0, 1].
    pub fn saturate(&mut self) {
        self.a = self.a.clamp(0.0, 1.0);
        self.r = self.r.clamp(0.0, 1.0);
        self.g = self.g.clamp(0.0, 1.0);
        self.b = self.b.clamp(0.0, 1.0);
    }

    pub fn saturated(mut self) -> Self {
        self.saturate();
        self
    }

    /// Packs into `0xAARRGGBB`.
    ///
    /// Each channel is scaled by 255 and truncated, not rounded, so images
    /// stay bit-identical with earlier renders. Values outside [0, 1]
    /// saturate at the byte limits.
    pub fn to_u32(&self) -> u32 {
        (channel_to_byte(self.a) << 24)
            | (channel_to_byte(self.r) << 16)
            | (channel_to_byte(self.g) << 8)
            | channel_to_byte(self.b)
    }

    /// Unpacks a `0xAARRGGBB` pixel.
    pub fn from_u32(pixel: u32) -> Self {
        let byte = |shift: u32| ((pixel >> shift) & 0xff) as f32 / 255.0;
        Color::new(byte(24), byte(16), byte(8), byte(0))
    }
}

fn channel_to_byte(value: f32) -> u32 {
    (255.0 * value) as u8 as u32
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.a += rhs.a;
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl MulAssign<f32> for Color {
    fn mul_assign(&mut self, s: f32) {
        self.a *= s;
        self.r *= s;
        self.g *= s;
        self.b *= s;
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.a + rhs.a, self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.a * rhs.a, self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, s: f32) -> Color {
        Color::new(self.a * s, self.r * s, self.g * s, self.b * s)
    }
}

/// Scene file spelling of a color: a preset name, `[r, g, b]` or `[a, r, g, b]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorParams {
    Rgb([f32; 3]),
    Argb([f32; 4]),
    Named(NamedColor),
}

#[derive(Deserialize)]
#[serde(try_from = "String")]
struct NamedColor(Color);

impl TryFrom<String> for NamedColor {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Color::named(&name)
            .map(NamedColor)
            .ok_or_else(|| format!("unknown color name {}", name))
    }
}

impl From<ColorParams> for Color {
    fn from(params: ColorParams) -> Self {
        match params {
            ColorParams::Rgb([r, g, b]) => Color::new(1.0, r, g, b),
            ColorParams::Argb([a, r, g, b]) => Color::new(a, r, g, b),
            ColorParams::Named(NamedColor(color)) => color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_argb_with_truncation() {
        assert_eq!(Color::WHITE.to_u32(), 0xffff_ffff);
        assert_eq!(Color::BLACK.to_u32(), 0xff00_0000);
        assert_eq!(Color::RED.to_u32(), 0xffff_0000);
        // 0.5 * 255 = 127.5 truncates to 127
        assert_eq!(Color::GREEN.to_u32(), 0xff00_7f00);
        // 0.1 * 255 = 25.5 truncates to 25
        assert_eq!(Color::ALMOST_BLACK.to_u32(), 0xff19_1919);
    }

    #[test]
    fn unpack_recovers_exact_bytes() {
        for byte in [0u32, 1, 47, 79, 100, 127, 128, 200, 254, 255] {
            let pixel = (255 << 24) | (byte << 16) | ((255 - byte) << 8) | (byte / 2);
            let color = Color::from_u32(pixel);
            assert_eq!(color.to_u32(), pixel, "byte {}", byte);
        }
        assert_eq!(Color::from_u32(Color::DARK_SLATE_GRAY.to_u32()).to_u32(), 0xff2f_4f4f);
    }

    #[test]
    fn saturate_clamps_and_is_idempotent() {
        let mut c = Color::new(1.5, -0.25, 0.5, 2.0);
        c.saturate();
        assert_eq!(c, Color::new(1.0, 0.0, 0.5, 1.0));
        let again = c.saturated();
        assert_eq!(again, c);

        let in_range = Color::new(0.2, 0.4, 0.6, 0.8);
        assert_eq!(in_range.saturated(), in_range);
    }

    #[test]
    fn arithmetic_is_channelwise() {
        let a = Color::new(1.0, 0.5, 0.25, 0.0);
        let b = Color::new(0.5, 0.5, 1.0, 1.0);
        assert_eq!(a + b, Color::new(1.5, 1.0, 1.25, 1.0));
        assert_eq!(a * b, Color::new(0.5, 0.25, 0.25, 0.0));
        assert_eq!(a * 2.0, Color::new(2.0, 1.0, 0.5, 0.0));

        let mut c = a;
        c += b;
        c *= 0.5;
        assert_eq!(c, Color::new(0.75, 0.5, 0.625, 0.5));
    }

    #[test]
    fn deserializes_names_and_arrays() {
        let named: Color = serde_json::from_str("\"dark_slate_gray\"").unwrap();
        assert_eq!(named, Color::DARK_SLATE_GRAY);
        let rgb: Color = serde_json::from_str("[0.25, 0.5, 1.0]").unwrap();
        assert_eq!(rgb, Color::new(1.0, 0.25, 0.5, 1.0));
        let argb: Color = serde_json::from_str("[0.0, 0.25, 0.5, 1.0]").unwrap();
        assert_eq!(argb, Color::new(0.0, 0.25, 0.5, 1.0));
        assert!(serde_json::from_str::<Color>("\"mauve\"").is_err());
    }
}
