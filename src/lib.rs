//! ID card generator
//!
//! Builds a printable 400×600 ID card from a filled-in form and a cropped
//! photo, and reports each generated card to a spreadsheet endpoint.
//!
//! # Features
//!
//! - **Crop editor**: square crops chosen on a scaled preview are sampled
//!   from the photo at its natural resolution
//! - **Compositor**: template, circular photo and text drawn in three
//!   ordered stages
//! - **Remote logger** (`remote`, default): one multipart POST per card,
//!   never blocking the download
//!
//! # Example
//!
//! ```no_run
//! use idcard::{Field, GeneratorConfig, Session};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::from_config(GeneratorConfig::default())?;
//! session.set_field(Field::Name, "Asha Rao");
//! session.set_field(Field::DateOfBirth, "1994-03-07");
//! // ...remaining fields...
//! session.select_photo(Some(Path::new("face.jpg"))).await?;
//! if let Some(region) = session.editor().pending() {
//!     session.editor_mut().on_crop_finalized(region);
//! }
//! session.apply_crop();
//! let card = session.generate().await?;
//! card.save(Path::new(".")).await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod form;
pub use form::{Field, FormFields};

pub mod identity;

pub mod crop;

pub mod rendering;

pub mod compositor;
pub use compositor::{Compositor, GeneratedCard, TemplateSource};

pub mod submit;
pub use submit::{SubmissionRecord, SubmissionStatus, Submitter};

pub mod session;
pub use session::{Session, SubmissionState};

/// Spreadsheet web app that records generated cards
pub const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbxOBUg93qHRm1ZJDzIxxU4uH4xSOTtg4WzBPxu9XwbZhyd3r4z2Rh6t95hon3drsCl_3Q/exec";

/// Configuration for a generator session
///
/// Every key is optional when loading from JSON; missing keys take the
/// values of [`GeneratorConfig::default`].
///
/// # Examples
///
/// ```
/// let cfg = idcard::GeneratorConfig::default();
/// assert_eq!(cfg.editor_width, 460);
/// assert!(cfg.template_path.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// URL the submission is POSTed to
    pub endpoint: String,
    /// Background template; a plain built-in fill when unset
    pub template_path: Option<PathBuf>,
    /// TrueType file replacing the bundled regular face
    pub font_path: Option<PathBuf>,
    /// TrueType file replacing the bundled bold face
    pub bold_font_path: Option<PathBuf>,
    /// Width of the crop editor preview in pixels
    pub editor_width: u32,
    /// User agent sent with submissions
    pub user_agent: String,
    /// Whether generated cards are submitted at all
    pub submit: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            template_path: None,
            font_path: None,
            bold_font_path: None,
            editor_width: 460,
            user_agent: format!("idcard/{}", env!("CARGO_PKG_VERSION")),
            submit: true,
        }
    }
}

impl GeneratorConfig {
    /// Load a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.editor_width == 0 {
            return Err(Error::ConfigError("editor_width must be positive".into()));
        }
        if self.submit {
            self.validate_endpoint()?;
        }
        Ok(())
    }

    #[cfg(feature = "remote")]
    fn validate_endpoint(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| Error::ConfigError(format!("endpoint '{}': {}", self.endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::ConfigError(format!(
                "endpoint '{}' must be http or https",
                self.endpoint
            )));
        }
        Ok(())
    }

    #[cfg(not(feature = "remote"))]
    fn validate_endpoint(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.submit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"editor_width": 300, "submit": false}"#).unwrap();
        assert_eq!(config.editor_width, 300);
        assert!(!config.submit);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn zero_editor_width_is_rejected() {
        let config = GeneratorConfig { editor_width: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[cfg(feature = "remote")]
    #[test]
    fn non_http_endpoint_is_rejected() {
        let config = GeneratorConfig { endpoint: "ftp://example.com/x".into(), ..Default::default() };
        assert!(config.validate().is_err());
        let config = GeneratorConfig { endpoint: "not a url".into(), ..Default::default() };
        assert!(config.validate().is_err());
    }
}
