//! Rasterizer executing paint commands onto an RGBA canvas

use std::io::Cursor;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use base64::Engine as _;
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use log::warn;
use sha2::{Digest, Sha256};

use crate::rendering::paint::{Circle, FontSpec, FontWeight, Layer, PaintCommand, TextAlign};
use crate::rendering::Snapshot;
use crate::{Error, Result};

const BUNDLED_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// TrueType faces used for text commands. Either face stands in for the
/// other when only one is present.
#[derive(Clone)]
pub struct Fonts {
    regular: Option<FontArc>,
    bold: Option<FontArc>,
}

impl Fonts {
    /// No faces: text commands are skipped
    pub fn none() -> Self {
        Self { regular: None, bold: None }
    }

    /// DejaVu Sans regular and bold, compiled into the binary
    pub fn bundled() -> Result<Self> {
        let face = |bytes: &'static [u8], name: &str| {
            FontArc::try_from_slice(bytes)
                .map_err(|e| Error::RenderError(format!("Bundled font {} is invalid: {}", name, e)))
        };
        Ok(Self {
            regular: Some(face(BUNDLED_REGULAR, "DejaVuSans")?),
            bold: Some(face(BUNDLED_BOLD, "DejaVuSans-Bold")?),
        })
    }

    /// Bundled faces, with either one replaced by a TrueType file when a
    /// path is given.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self> {
        let mut fonts = Self::bundled()?;
        if let Some(path) = regular {
            fonts.regular = Some(parse_font(std::fs::read(path)?, path)?);
        }
        if let Some(path) = bold {
            fonts.bold = Some(parse_font(std::fs::read(path)?, path)?);
        }
        Ok(fonts)
    }

    fn pick(&self, weight: FontWeight) -> Option<&FontArc> {
        match weight {
            FontWeight::Regular => self.regular.as_ref().or(self.bold.as_ref()),
            FontWeight::Bold => self.bold.as_ref().or(self.regular.as_ref()),
        }
    }
}

fn parse_font(bytes: Vec<u8>, path: &Path) -> Result<FontArc> {
    FontArc::try_from_vec(bytes)
        .map_err(|e| Error::ConfigError(format!("Invalid font {}: {}", path.display(), e)))
}

/// Loaded rasters that image commands refer to
#[derive(Debug, Clone, Default)]
pub struct Layers {
    pub template: Option<RgbaImage>,
    pub photo: Option<RgbaImage>,
}

impl Layers {
    fn get(&self, layer: Layer) -> Option<&RgbaImage> {
        match layer {
            Layer::Template => self.template.as_ref(),
            Layer::Photo => self.photo.as_ref(),
        }
    }
}

pub struct Rasterizer {
    canvas: RgbaImage,
    fonts: Fonts,
}

impl Rasterizer {
    /// A transparent canvas of the given size
    pub fn new(width: u32, height: u32, fonts: Fonts) -> Self {
        Self { canvas: RgbaImage::new(width, height), fonts }
    }

    pub fn paint(&mut self, cmd: &PaintCommand, layers: &Layers) -> Result<()> {
        match cmd {
            PaintCommand::Image { layer, x, y, width, height, clip } => {
                let src = layers
                    .get(*layer)
                    .ok_or_else(|| Error::RenderError(format!("{:?} layer is not loaded", layer)))?;
                self.draw_image(src, *x, *y, *width, *height, *clip);
                Ok(())
            }
            PaintCommand::Text { x, baseline, text, font, align, rgba } => {
                self.fill_text(*x, *baseline, text, *font, *align, *rgba);
                Ok(())
            }
        }
    }

    pub fn paint_all(&mut self, cmds: &[PaintCommand], layers: &Layers) -> Result<()> {
        for cmd in cmds {
            self.paint(cmd, layers)?;
        }
        Ok(())
    }

    fn draw_image(&mut self, src: &RgbaImage, x: i32, y: i32, width: u32, height: u32, clip: Option<Circle>) {
        if width == 0 || height == 0 {
            return;
        }
        let scaled;
        let src = if src.dimensions() == (width, height) {
            src
        } else {
            scaled = imageops::resize(src, width, height, imageops::FilterType::Triangle);
            &scaled
        };

        let (cw, ch) = self.canvas.dimensions();
        for (ox, oy, p) in src.enumerate_pixels() {
            let cx = x + ox as i32;
            let cy = y + oy as i32;
            if cx < 0 || cy < 0 || cx as u32 >= cw || cy as u32 >= ch {
                continue;
            }
            let (cx, cy) = (cx as u32, cy as u32);
            if let Some(circle) = clip {
                if !circle.contains_pixel(cx, cy) {
                    continue;
                }
            }
            blend(self.canvas.get_pixel_mut(cx, cy), *p);
        }
    }

    fn fill_text(&mut self, x: f32, baseline: f32, text: &str, font: FontSpec, align: TextAlign, rgba: (u8, u8, u8, u8)) {
        let Some(face) = self.fonts.pick(font.weight) else {
            warn!("No font loaded; skipping text '{}'", text);
            return;
        };
        let scale = px_scale(face, font.size_px);
        let ascent = face.as_scaled(scale).ascent();
        let left = match align {
            TextAlign::Left => x,
            TextAlign::Center => {
                let (w, _) = text_size(scale, face, text);
                x - w as f32 / 2.0
            }
        };
        let color = Rgba([rgba.0, rgba.1, rgba.2, rgba.3]);
        draw_text_mut(
            &mut self.canvas,
            color,
            left.round() as i32,
            (baseline - ascent).round() as i32,
            scale,
            face,
            text,
        );
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            width: self.canvas.width(),
            height: self.canvas.height(),
            png_data: encode_png(&self.canvas)?,
        })
    }
}

/// Scale at which a face renders with an em box of `size_px` pixels,
/// matching CSS font sizes.
fn px_scale(face: &FontArc, size_px: f32) -> PxScale {
    let upem = face.units_per_em().unwrap_or(1000.0);
    PxScale::from(size_px * face.height_unscaled() / upem)
}

/// Source-over compositing of `src` onto `dst`
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let c = (src.0[i] as f32 * sa + dst.0[i] as f32 * da * (1.0 - sa)) / out_a;
        dst.0[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

pub fn data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// SHA-256 of the raw pixels, hex encoded
pub fn fingerprint(img: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(img.width().to_be_bytes());
    hasher.update(img.height().to_be_bytes());
    hasher.update(img.as_raw());
    hex::encode(hasher.finalize())
}
