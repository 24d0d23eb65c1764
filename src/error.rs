//! Error types for the card generator

use thiserror::Error;

use crate::form::Field;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Blocking warning shown when generation is attempted with an incomplete form.
pub const MISSING_FIELDS_MESSAGE: &str =
    "Please fill in ALL fields, including address, WhatsApp, and photo.";

/// Errors that can occur while building a card
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required inputs are empty (the photo counts as an input).
    /// `fields` lists the empty form fields; `photo_missing` is set when no
    /// cropped photo exists yet.
    #[error("Please fill in ALL fields, including address, WhatsApp, and photo.")]
    MissingFields {
        fields: Vec<Field>,
        photo_missing: bool,
    },

    /// A field value could not be interpreted (e.g. a date without a day part)
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: Field, reason: String },

    /// An image could not be read or decoded
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// Failed to render or encode the card
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// A submission is still in flight; generation is disabled until it settles
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error talking to the spreadsheet endpoint
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => Error::RenderError(e.to_string()),
            other => Error::DecodeError(other.to_string()),
        }
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}
