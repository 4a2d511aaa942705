use std::fmt;
use std::str::FromStr;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Straight (non-premultiplied) RGBA color stored per pixel in a layer.
///
/// Serialized as a hex string (`#rrggbb`, or `#rrggbbaa` when not opaque).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("hex color `{0}` must have 3, 6 or 8 digits")]
    InvalidLength(String),
    #[error("hex color `{0}` contains a non-hex digit")]
    InvalidDigit(String),
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Construct from 0-255 channel values.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 0-255 channel values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let digits = text.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(text.to_string()));
        }
        let channel = |i: usize| -> Result<u8, ColorParseError> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorParseError::InvalidDigit(text.to_string()))
        };
        match digits.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, c) in rgb.iter_mut().zip(digits.chars()) {
                    let v = c.to_digit(16).unwrap_or(0) as u8;
                    *slot = v * 17;
                }
                Ok(Self::rgb(rgb[0], rgb[1], rgb[2]))
            }
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(ColorParseError::InvalidLength(text.to_string())),
        }
    }

    /// Lowercase hex form; alpha is only written when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Convert to egui's premultiplied 8-bit format used by the chunk rasters.
    pub fn to_color32(&self) -> Color32 {
        Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    /// Convert from egui's color format back to straight channels.
    pub fn from_color32(c: Color32) -> Self {
        let [r, g, b, a] = c.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_long_and_alpha_forms() {
        assert_eq!(Color::from_hex("#f00").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hex("00ff00").unwrap(), Color::rgb(0, 255, 0));
        assert_eq!(
            Color::from_hex("#0000ff80").unwrap(),
            Color::rgba(0, 0, 255, 128)
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Color::from_hex("#ff00"),
            Err(ColorParseError::InvalidLength(_))
        ));
        assert!(matches!(
            Color::from_hex("#gg0000"),
            Err(ColorParseError::InvalidDigit(_))
        ));
    }

    #[test]
    fn hex_output_omits_opaque_alpha() {
        assert_eq!(Color::rgb(255, 0, 16).to_hex(), "#ff0010");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Color::rgb(0, 255, 0)).unwrap();
        assert_eq!(json, "\"#00ff00\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(0, 255, 0));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn opaque_colors_survive_color32_conversion() {
        let c = Color::rgb(12, 200, 99);
        assert_eq!(Color::from_color32(c.to_color32()), c);
    }
}
