use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::debayer::types::RgbImageData;

/// Camera description recorded in a DNG.
#[derive(Debug, Clone)]
pub struct DngInfo {
    pub make: String,
    pub model: String,
    /// XYZ to camera matrix of the first three camera channels
    pub color_matrix: [[f32; 3]; 3],
    /// White balance multipliers the file was rendered without
    pub wb_multipliers: [f32; 3],
}

pub trait TiffWriter {
    fn write_rgb_tiff(&self, image: &RgbImageData, output: &mut dyn Write) -> Result<()>;
    fn write_dng(&self, image: &RgbImageData, info: &DngInfo, output: &mut dyn Write) -> Result<()>;
}
