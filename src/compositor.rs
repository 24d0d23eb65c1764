//! Card compositor.
//!
//! A card is drawn in three strictly ordered stages, each waiting for the
//! previous one: the template is loaded and stretched over the canvas, the
//! cropped photo is loaded and drawn inside its circular frame, then the
//! derived values are computed and the text is filled in. Nothing cancels a
//! run once it has started.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use image::{imageops, Rgba, RgbaImage};
use log::{debug, info};

use crate::crop::CroppedPhoto;
use crate::form::FormFields;
use crate::identity::CardDetails;
use crate::rendering::layout::{photo_commands, template_commands, text_commands, PHOTO_SIZE};
use crate::rendering::paint::parse_hex_color;
use crate::rendering::raster::{fingerprint, Fonts, Layers, Rasterizer};
use crate::rendering::{Snapshot, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::{Error, GeneratorConfig, Result};

/// Fill colour of the built-in template
pub const BUILTIN_TEMPLATE_COLOR: &str = "#14285A";

/// Where the background raster comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Plain dark fill, used when no template file is configured
    Builtin,
    File(PathBuf),
}

/// File name offered for download
pub fn download_name(name: &str) -> String {
    format!("ID-Card-{}.png", name)
}

/// A finished card
#[derive(Debug, Clone)]
pub struct GeneratedCard {
    snapshot: Snapshot,
    details: CardDetails,
    file_name: String,
    fingerprint: String,
}

impl GeneratedCard {
    pub fn png(&self) -> &[u8] {
        &self.snapshot.png_data
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Download link target
    pub fn data_url(&self) -> String {
        self.snapshot.data_url()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn details(&self) -> &CardDetails {
        &self.details
    }

    /// SHA-256 of the rendered pixels
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Write the PNG into `dir` under its download name. Path separators in
    /// the name are replaced so the file always lands in `dir`.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        let safe: String = self
            .file_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        let path = dir.join(safe);
        tokio::fs::write(&path, self.png()).await?;
        info!("Saved card to {}", path.display());
        Ok(path)
    }
}

pub struct Compositor {
    template: TemplateSource,
    fonts: Fonts,
}

impl Compositor {
    pub fn new(template: TemplateSource, fonts: Fonts) -> Self {
        Self { template, fonts }
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let template = match &config.template_path {
            Some(p) => TemplateSource::File(p.clone()),
            None => TemplateSource::Builtin,
        };
        let fonts = Fonts::load(config.font_path.as_deref(), config.bold_font_path.as_deref())?;
        Ok(Self::new(template, fonts))
    }

    pub fn template(&self) -> &TemplateSource {
        &self.template
    }

    async fn load_template(&self) -> Result<RgbaImage> {
        match &self.template {
            TemplateSource::Builtin => {
                let (r, g, b, a) = parse_hex_color(BUILTIN_TEMPLATE_COLOR)?;
                Ok(RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba([r, g, b, a])))
            }
            TemplateSource::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                decode_blocking(bytes).await
            }
        }
    }

    async fn load_photo(photo: &CroppedPhoto) -> Result<RgbaImage> {
        let image = photo.image().clone();
        tokio::task::spawn_blocking(move || {
            imageops::resize(&image, PHOTO_SIZE, PHOTO_SIZE, imageops::FilterType::Triangle)
        })
        .await
        .map_err(|e| Error::Other(format!("Photo load task failed: {}", e)))
    }

    /// Template-only canvas shown before any card has been generated
    pub async fn blank(&self) -> Result<Snapshot> {
        let layers = Layers { template: Some(self.load_template().await?), photo: None };
        let mut raster = Rasterizer::new(CANVAS_WIDTH, CANVAS_HEIGHT, self.fonts.clone());
        raster.paint_all(&template_commands(), &layers)?;
        raster.snapshot()
    }

    /// Draw a card for `form` with `photo`, issued on `issued`.
    ///
    /// Fails with [`Error::MissingFields`] before anything is loaded or drawn
    /// when a field is empty or there is no photo.
    pub async fn compose(
        &self,
        form: &FormFields,
        photo: Option<&CroppedPhoto>,
        issued: NaiveDate,
    ) -> Result<GeneratedCard> {
        let fields = form.missing();
        let photo = match photo {
            Some(p) if fields.is_empty() => p,
            _ => {
                return Err(Error::MissingFields { fields, photo_missing: photo.is_none() });
            }
        };

        let mut raster = Rasterizer::new(CANVAS_WIDTH, CANVAS_HEIGHT, self.fonts.clone());
        let mut layers = Layers::default();

        layers.template = Some(self.load_template().await?);
        raster.paint_all(&template_commands(), &layers)?;
        debug!("template drawn");

        layers.photo = Some(Self::load_photo(photo).await?);
        raster.paint_all(&photo_commands(), &layers)?;
        debug!("photo drawn");

        let details = CardDetails::derive(form, issued)?;
        raster.paint_all(&text_commands(&details)?, &layers)?;
        debug!("text drawn for {}", details.id_number);

        let fingerprint = fingerprint(raster.canvas());
        let snapshot = raster.snapshot()?;
        info!("Generated card {} ({})", details.id_number, &fingerprint[..12]);
        Ok(GeneratedCard {
            snapshot,
            file_name: download_name(form.get(crate::form::Field::Name)),
            details,
            fingerprint,
        })
    }
}

async fn decode_blocking(bytes: Vec<u8>) -> Result<RgbaImage> {
    tokio::task::spawn_blocking(move || -> Result<RgbaImage> {
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    })
    .await
    .map_err(|e| Error::Other(format!("Image decode task failed: {}", e)))?
}
