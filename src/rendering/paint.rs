//! Paint command set for the card canvas

use crate::{Error, Result};

/// Which loaded raster an image command draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Template,
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Font selection, equivalent to a CSS shorthand like `bold 22px`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub weight: FontWeight,
    pub size_px: f32,
}

impl FontSpec {
    pub const fn regular(size_px: f32) -> Self {
        Self { weight: FontWeight::Regular, size_px }
    }

    pub const fn bold(size_px: f32) -> Self {
        Self { weight: FontWeight::Bold, size_px }
    }
}

/// Horizontal anchoring of text relative to its x coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Circular clip applied while drawing an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

impl Circle {
    /// Whether the center of pixel (`x`, `y`) lies inside the circle
    pub fn contains_pixel(&self, x: u32, y: u32) -> bool {
        let dx = x as f32 + 0.5 - self.cx;
        let dy = y as f32 + 0.5 - self.cy;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Draw a layer stretched to `width`×`height` at (`x`, `y`)
    Image {
        layer: Layer,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        clip: Option<Circle>,
    },
    /// Fill `text` with its baseline at `baseline`
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font: FontSpec,
        align: TextAlign,
        rgba: (u8, u8, u8, u8),
    },
}

/// Parse `#RRGGBB` into an opaque colour.
pub fn parse_hex_color(s: &str) -> Result<(u8, u8, u8, u8)> {
    let digits = s.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return Err(Error::RenderError(format!("invalid color: {}", s)));
    }
    let b = hex::decode(digits).map_err(|_| Error::RenderError(format!("invalid color: {}", s)))?;
    Ok((b[0], b[1], b[2], 255))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), (255, 255, 255, 255));
        assert_eq!(parse_hex_color("0a1B2c").unwrap(), (10, 27, 44, 255));
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn circle_contains_center_not_corner() {
        let c = Circle { cx: 10.0, cy: 10.0, radius: 5.0 };
        assert!(c.contains_pixel(9, 9));
        assert!(!c.contains_pixel(5, 5));
        assert!(!c.contains_pixel(16, 10));
    }
}
