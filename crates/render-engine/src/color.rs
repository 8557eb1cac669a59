//! Background colors.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use flipbook_common::error::{FlipbookError, FlipbookResult};

/// Solid color painted behind every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundColor(Rgba<u8>);

impl BackgroundColor {
    pub const WHITE: BackgroundColor = BackgroundColor(Rgba([255, 255, 255, 255]));
    pub const BLACK: BackgroundColor = BackgroundColor(Rgba([0, 0, 0, 255]));

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Rgba([r, g, b, 255]))
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn parse(text: &str) -> FlipbookResult<Self> {
        let hex = text.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FlipbookError::config(format!("Invalid color: {text:?}")));
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        let parsed = match hex.len() {
            3 => {
                let mut rgba = [255u8; 4];
                for (i, c) in hex.chars().enumerate() {
                    // Checked above.
                    let nibble = c.to_digit(16).unwrap_or(0) as u8;
                    rgba[i] = nibble * 17;
                }
                Ok(rgba)
            }
            6 => channel(0).and_then(|r| Ok([r, channel(2)?, channel(4)?, 255])),
            8 => channel(0).and_then(|r| Ok([r, channel(2)?, channel(4)?, channel(6)?])),
            _ => return Err(FlipbookError::config(format!("Invalid color: {text:?}"))),
        };

        parsed
            .map(|rgba| Self(Rgba(rgba)))
            .map_err(|e| FlipbookError::config(format!("Invalid color {text:?}: {e}")))
    }

    pub fn rgba(self) -> Rgba<u8> {
        self.0
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0 .0;
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for BackgroundColor {
    type Err = FlipbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(BackgroundColor::parse("#ffffff").unwrap(), BackgroundColor::WHITE);
        assert_eq!(BackgroundColor::parse("#000").unwrap(), BackgroundColor::BLACK);
        assert_eq!(
            BackgroundColor::parse("1a2b3c").unwrap(),
            BackgroundColor::rgb(0x1a, 0x2b, 0x3c)
        );
        assert_eq!(
            BackgroundColor::parse("#11223380").unwrap().rgba(),
            Rgba([0x11, 0x22, 0x33, 0x80])
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(BackgroundColor::parse("").is_err());
        assert!(BackgroundColor::parse("#ggg").is_err());
        assert!(BackgroundColor::parse("#12345").is_err());
        assert!(BackgroundColor::parse("#+1234").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let color: BackgroundColor = "#0A0B0C".parse().unwrap();
        assert_eq!(color.to_string(), "#0a0b0c");
    }
}
