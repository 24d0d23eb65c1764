//! Card rendering: a fixed layout expressed as paint commands, executed
//! onto an RGBA canvas.

pub mod layout;
pub mod paint;
pub mod raster;

/// Canvas width in pixels
pub const CANVAS_WIDTH: u32 = 400;
/// Canvas height in pixels
pub const CANVAS_HEIGHT: u32 = 600;

/// An encoded canvas
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Snapshot {
    /// `data:image/png;base64,...` form of the PNG
    pub fn data_url(&self) -> String {
        raster::data_url(&self.png_data)
    }
}
