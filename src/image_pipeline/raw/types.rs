//! RAW container data types

use serde::Serialize;

use crate::image_pipeline::options::types::{ColorEncoding, LegacyOffset};

/// Sensor samples as delivered by the container, before any processing.
#[derive(Debug, Clone)]
pub struct SensorBlock {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Components per pixel (1 for CFA sensors, 3 for layered sensors)
    pub cpp: usize,
    /// CFA pattern name, e.g. "RGGB"; empty for layered sensors
    pub cfa_pattern: String,
    /// Raw sample data, `width * height * cpp` values
    pub data: Vec<u16>,
    /// Actual bits per sample from the sensor (e.g., 12, 14, or 16)
    pub bits_per_sample: u32,
}

impl SensorBlock {
    /// Samples as little-endian bytes, the layout of a raw block dump.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

/// Descriptive properties of the container.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyList {
    pub make: String,
    pub model: String,
    pub clean_make: String,
    pub clean_model: String,
    pub width: usize,
    pub height: usize,
    pub components_per_pixel: usize,
    pub cfa_pattern: String,
    /// EXIF orientation code (1 = normal)
    pub orientation: u16,
}

/// Camera calibration data needed to render pixels.
#[derive(Debug, Clone)]
pub struct CameraMetadata {
    /// As-shot white balance coefficients (R, G, B, G2)
    pub wb_coeffs: [f32; 4],
    pub black_levels: [u16; 4],
    pub white_levels: [u16; 4],
    /// XYZ to camera matrix, one row per camera channel
    pub xyz_to_cam: [[f32; 3]; 4],
    /// Crop margins to the active area: top, right, bottom, left
    pub crops: [usize; 4],
}

/// Sample encoding of a PPM dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpmEncoding {
    /// P3
    Ascii,
    /// P6
    Binary,
}

/// Bucketing of a histogram dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramScale {
    /// One row per sample value
    Linear,
    /// Rows in 1/16 stop exposure bins
    Log,
}

/// Rendering parameters passed with every pixel-producing call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub color_encoding: ColorEncoding,
    pub crop: bool,
    pub denoise: bool,
    pub white_balance: Option<String>,
    pub use_accelerator: bool,
    pub legacy_offset: LegacyOffset,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color_encoding: ColorEncoding::None,
            crop: false,
            denoise: false,
            white_balance: None,
            use_accelerator: false,
            legacy_offset: LegacyOffset::Automatic,
        }
    }
}
