//! Photo intake and the square crop editor.
//!
//! The editor mirrors an interactive crop surface: an uploaded image is
//! shown scaled to the editor width, the user drags a 1:1 region over that
//! preview, and applying the crop samples the matching region of the image
//! at its natural resolution.

use std::path::Path;

use image::{imageops, RgbaImage};
use log::debug;

use crate::rendering::raster::{data_url, encode_png};
use crate::{Error, Result};

/// Fraction of the shorter displayed side covered by the initial crop
pub const INITIAL_CROP_FRACTION: f64 = 0.9;

/// Units a crop region is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropUnit {
    /// Displayed-image pixels
    Pixels,
    /// Percent of the displayed width (x, width) or height (y, height)
    Percent,
}

/// Size of the image as shown in the editor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size at which an image of `natural` dimensions is shown in an editor
    /// `max_width` pixels wide. Images are scaled down to fit, never up.
    pub fn fit(natural: (u32, u32), max_width: u32) -> Self {
        let (w, h) = (natural.0 as f64, natural.1 as f64);
        let max = max_width as f64;
        if w <= max || w == 0.0 {
            return Self::new(w, h);
        }
        let scale = max / w;
        Self::new(max, h * scale)
    }
}

/// A user-selected sub-rectangle of the displayed image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub unit: CropUnit,
}

impl CropRegion {
    pub fn pixels(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, unit: CropUnit::Pixels }
    }

    pub fn percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, unit: CropUnit::Percent }
    }

    pub fn to_pixels(&self, display: DisplaySize) -> Self {
        match self.unit {
            CropUnit::Pixels => *self,
            CropUnit::Percent => Self::pixels(
                self.x * display.width / 100.0,
                self.y * display.height / 100.0,
                self.width * display.width / 100.0,
                self.height * display.height / 100.0,
            ),
        }
    }

    pub fn to_percent(&self, display: DisplaySize) -> Self {
        match self.unit {
            CropUnit::Percent => *self,
            CropUnit::Pixels => Self::percent(
                self.x / display.width * 100.0,
                self.y / display.height * 100.0,
                self.width / display.width * 100.0,
                self.height / display.height * 100.0,
            ),
        }
    }

    /// Square this region to its shorter side and keep it inside the
    /// displayed image. The result is in pixels.
    pub fn constrain(&self, display: DisplaySize) -> Self {
        let px = self.to_pixels(display);
        let side = px
            .width
            .min(px.height)
            .min(display.width)
            .min(display.height)
            .max(0.0);
        let x = px.x.clamp(0.0, (display.width - side).max(0.0));
        let y = px.y.clamp(0.0, (display.height - side).max(0.0));
        Self::pixels(x, y, side, side)
    }
}

/// Centered square crop covering [`INITIAL_CROP_FRACTION`] of the shorter
/// displayed side, in percent units.
pub fn initial_crop(display: DisplaySize) -> CropRegion {
    let side = display.width.min(display.height) * INITIAL_CROP_FRACTION;
    let px = CropRegion::pixels(
        (display.width - side) / 2.0,
        (display.height - side) / 2.0,
        side,
        side,
    );
    px.to_percent(display)
}

/// Square photo produced by applying a crop
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedPhoto {
    image: RgbaImage,
}

impl CroppedPhoto {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }

    /// PNG data URL suitable for a preview `<img>`
    pub fn to_data_url(&self) -> Result<String> {
        Ok(data_url(&self.to_png()?))
    }
}

/// An uploaded image at natural resolution
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub image: RgbaImage,
}

impl SourceImage {
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self { name: name.into(), image })
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Editing surface state
#[derive(Debug, Default)]
pub struct CropEditor {
    source: Option<SourceImage>,
    display: Option<DisplaySize>,
    pending: Option<CropRegion>,
    committed: Option<CropRegion>,
    open: bool,
}

impl CropEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode a local image, then open the editor on it.
    ///
    /// `None` means the picker was dismissed: nothing changes and
    /// `Ok(false)` is returned.
    pub async fn select_file(&mut self, path: Option<&Path>) -> Result<bool> {
        let Some(path) = path else {
            return Ok(false);
        };
        self.pending = None;
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = tokio::task::spawn_blocking(move || SourceImage::decode(name, &bytes))
            .await
            .map_err(|e| Error::Other(format!("Image decode task failed: {}", e)))??;
        self.open_source(source);
        Ok(true)
    }

    /// Open the editor on an already decoded image.
    pub fn open_source(&mut self, source: SourceImage) {
        debug!(
            "crop editor opened on {} ({}x{})",
            source.name,
            source.image.width(),
            source.image.height()
        );
        self.source = Some(source);
        self.display = None;
        self.pending = None;
        self.committed = None;
        self.open = true;
    }

    /// The preview finished laying out at `width`×`height`; seed the
    /// initial crop.
    pub fn on_image_displayed(&mut self, width: f64, height: f64) {
        let display = DisplaySize::new(width, height);
        self.display = Some(display);
        self.pending = Some(initial_crop(display));
    }

    /// The user is dragging; track the region being edited.
    pub fn on_crop_changed(&mut self, region: CropRegion) {
        self.pending = Some(self.enforce(region));
    }

    /// The user released the drag; this is the region `apply_crop` uses.
    pub fn on_crop_finalized(&mut self, region: CropRegion) {
        let region = self.enforce(region);
        self.pending = Some(region);
        self.committed = Some(region);
    }

    /// Displayed size, or the natural size when the preview has not been
    /// laid out yet
    fn effective_display(&self) -> Option<DisplaySize> {
        self.display.or_else(|| {
            self.source
                .as_ref()
                .map(|s| DisplaySize::new(s.image.width() as f64, s.image.height() as f64))
        })
    }

    fn enforce(&self, region: CropRegion) -> CropRegion {
        match self.effective_display() {
            Some(display) => region.constrain(display),
            None => region,
        }
    }

    /// Rasterize the committed region and close the editor.
    ///
    /// Returns `None` when no region was finalized or no image is loaded.
    pub fn apply_crop(&mut self) -> Option<CroppedPhoto> {
        let region = self.committed?;
        let display = self.effective_display()?;
        let source = self.source.as_ref()?;

        let photo = crop_to_photo(&source.image, display, region.to_pixels(display))?;
        self.committed = None;
        self.pending = None;
        self.open = false;
        Some(photo)
    }

    /// Dismiss the editor without applying.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn display_size(&self) -> Option<DisplaySize> {
        self.display
    }

    pub fn pending(&self) -> Option<CropRegion> {
        self.pending
    }

    pub fn committed(&self) -> Option<CropRegion> {
        self.committed
    }
}

/// Map a display-space pixel region onto `image` and resample it to the
/// region's displayed size.
pub fn crop_to_photo(image: &RgbaImage, display: DisplaySize, region: CropRegion) -> Option<CroppedPhoto> {
    // Percent round-trips leave values like 269.99999999999997
    let out_w = (region.width.min(display.width) + 1e-6).floor() as u32;
    let out_h = (region.height.min(display.height) + 1e-6).floor() as u32;
    if out_w == 0 || out_h == 0 || display.width <= 0.0 || display.height <= 0.0 {
        debug!("crop region {:?} is empty; nothing to apply", region);
        return None;
    }

    let (nat_w, nat_h) = image.dimensions();
    if nat_w == 0 || nat_h == 0 {
        return None;
    }
    let scale_x = nat_w as f64 / display.width;
    let scale_y = nat_h as f64 / display.height;

    let sx = ((region.x * scale_x).round() as u32).min(nat_w.saturating_sub(1));
    let sy = ((region.y * scale_y).round() as u32).min(nat_h.saturating_sub(1));
    let sw = ((region.width * scale_x).round() as u32).clamp(1, nat_w - sx);
    let sh = ((region.height * scale_y).round() as u32).clamp(1, nat_h - sy);

    let sub = imageops::crop_imm(image, sx, sy, sw, sh).to_image();
    let out = if (sw, sh) == (out_w, out_h) {
        sub
    } else {
        imageops::resize(&sub, out_w, out_h, imageops::FilterType::Triangle)
    };
    Some(CroppedPhoto::from_image(out))
}
