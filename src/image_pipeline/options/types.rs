//! Execution configuration types

use std::path::PathBuf;

use crate::image_pipeline::raw::types::RenderOptions;

/// Default cap on matrix elements written to a metadata dump.
pub const DEFAULT_MAX_MATRIX_ELEMENTS: usize = 100;

/// Artifact produced for every input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Sensor block as stored, no processing
    RawBlock,
    /// 3x16 bit RGB TIFF
    Tiff,
    /// DNG LinearRaw (default)
    Dng,
    /// 16 bit PPM, P3 (ascii)
    PpmAscii,
    /// 16 bit PPM, P6 (binary)
    PpmBinary,
    /// CSV histogram, one row per value
    HistogramLinear,
    /// CSV histogram, logarithmic exposure bins
    HistogramLog,
    /// Embedded JPEG preview
    JpegExtract,
    /// Property list and camera metadata
    MetaExtract,
}

impl OutputKind {
    /// Extension appended to the output base name.
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::RawBlock => ".raw",
            OutputKind::Tiff => ".tif",
            OutputKind::Dng => ".dng",
            OutputKind::PpmAscii | OutputKind::PpmBinary => ".ppm",
            OutputKind::HistogramLinear | OutputKind::HistogramLog => ".csv",
            OutputKind::JpegExtract => ".jpg",
            OutputKind::MetaExtract => ".meta",
        }
    }

    /// Human readable label used in progress messages.
    pub fn describe(self) -> &'static str {
        match self {
            OutputKind::RawBlock => "RAW block",
            OutputKind::Tiff => "RAW as TIFF",
            OutputKind::Dng => "RAW as DNG",
            OutputKind::PpmAscii | OutputKind::PpmBinary => "RAW as PPM",
            OutputKind::HistogramLinear | OutputKind::HistogramLog => "RAW as CSV histogram",
            OutputKind::JpegExtract => "JPEG",
            OutputKind::MetaExtract => "META DATA",
        }
    }
}

/// Color encoding applied to rendered pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorEncoding {
    /// White-balanced camera RGB
    None,
    Srgb,
    AdobeRgb,
    ProPhotoRgb,
    /// Sensor values without any preprocessing
    Unprocessed,
    /// Top layer of a layered sensor without preprocessing
    QuattroTop,
}

impl ColorEncoding {
    /// Parses the value of `-color`. Only the three output spaces are accepted there.
    pub fn from_switch_value(name: &str) -> Option<Self> {
        match name {
            "sRGB" => Some(ColorEncoding::Srgb),
            "AdobeRGB" => Some(ColorEncoding::AdobeRgb),
            "ProPhotoRGB" => Some(ColorEncoding::ProPhotoRgb),
            _ => None,
        }
    }
}

/// Black level offset for old sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyOffset {
    /// Take the black level from the container
    #[default]
    Automatic,
    Fixed(i32),
}

/// Configuration for one batch run. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub output_kind: OutputKind,
    pub output_dir: Option<PathBuf>,
    pub color_encoding: ColorEncoding,
    pub crop: bool,
    pub denoise: bool,
    pub white_balance: Option<String>,
    pub use_accelerator: bool,
    pub legacy_offset: LegacyOffset,
    pub max_matrix_elements: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            output_kind: OutputKind::Dng,
            output_dir: None,
            color_encoding: ColorEncoding::None,
            crop: false,
            denoise: false,
            white_balance: None,
            use_accelerator: false,
            legacy_offset: LegacyOffset::Automatic,
            max_matrix_elements: DEFAULT_MAX_MATRIX_ELEMENTS,
        }
    }
}

impl ExecutionConfig {
    pub fn builder() -> ExecutionConfigBuilder {
        ExecutionConfigBuilder::default()
    }

    /// Parameters handed to every pixel-rendering collaborator call.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            color_encoding: self.color_encoding,
            crop: self.crop,
            denoise: self.denoise,
            white_balance: self.white_balance.clone(),
            use_accelerator: self.use_accelerator,
            legacy_offset: self.legacy_offset,
        }
    }
}

/// Builder for ExecutionConfig
#[derive(Default)]
pub struct ExecutionConfigBuilder {
    output_kind: Option<OutputKind>,
    output_dir: Option<Option<PathBuf>>,
    color_encoding: Option<ColorEncoding>,
    crop: Option<bool>,
    denoise: Option<bool>,
    white_balance: Option<Option<String>>,
    use_accelerator: Option<bool>,
    legacy_offset: Option<LegacyOffset>,
    max_matrix_elements: Option<usize>,
}

impl ExecutionConfigBuilder {
    pub fn output_kind(mut self, kind: OutputKind) -> Self {
        self.output_kind = Some(kind);
        self
    }

    pub fn output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn color_encoding(mut self, encoding: ColorEncoding) -> Self {
        self.color_encoding = Some(encoding);
        self
    }

    pub fn crop(mut self, enable: bool) -> Self {
        self.crop = Some(enable);
        self
    }

    pub fn denoise(mut self, enable: bool) -> Self {
        self.denoise = Some(enable);
        self
    }

    pub fn white_balance(mut self, preset: Option<String>) -> Self {
        self.white_balance = Some(preset);
        self
    }

    pub fn use_accelerator(mut self, enable: bool) -> Self {
        self.use_accelerator = Some(enable);
        self
    }

    pub fn legacy_offset(mut self, offset: LegacyOffset) -> Self {
        self.legacy_offset = Some(offset);
        self
    }

    pub fn max_matrix_elements(mut self, max: usize) -> Self {
        self.max_matrix_elements = Some(max);
        self
    }

    pub fn build(self) -> ExecutionConfig {
        let default = ExecutionConfig::default();
        ExecutionConfig {
            output_kind: self.output_kind.unwrap_or(default.output_kind),
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            color_encoding: self.color_encoding.unwrap_or(default.color_encoding),
            crop: self.crop.unwrap_or(default.crop),
            denoise: self.denoise.unwrap_or(default.denoise),
            white_balance: self.white_balance.unwrap_or(default.white_balance),
            use_accelerator: self.use_accelerator.unwrap_or(default.use_accelerator),
            legacy_offset: self.legacy_offset.unwrap_or(default.legacy_offset),
            max_matrix_elements: self.max_matrix_elements.unwrap_or(default.max_matrix_elements),
        }
    }
}
