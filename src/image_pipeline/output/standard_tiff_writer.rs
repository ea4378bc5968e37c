use std::io::{Cursor, Write};
use tiff::encoder::{Rational, SRational, TiffEncoder, colortype};
use tiff::tags::Tag;
use tracing::debug;
use crate::image_pipeline::common::error::{Result, ConversionError};
use crate::image_pipeline::debayer::types::RgbImageData;
use crate::image_pipeline::output::writer::{DngInfo, TiffWriter};

const PHOTOMETRIC_LINEAR_RAW: u16 = 34892;
const TAG_DNG_VERSION: Tag = Tag::Unknown(50706);
const TAG_DNG_BACKWARD_VERSION: Tag = Tag::Unknown(50707);
const TAG_UNIQUE_CAMERA_MODEL: Tag = Tag::Unknown(50708);
const TAG_BLACK_LEVEL: Tag = Tag::Unknown(50714);
const TAG_WHITE_LEVEL: Tag = Tag::Unknown(50717);
const TAG_COLOR_MATRIX_1: Tag = Tag::Unknown(50721);
const TAG_AS_SHOT_NEUTRAL: Tag = Tag::Unknown(50728);
const TAG_CALIBRATION_ILLUMINANT_1: Tag = Tag::Unknown(50778);

const DNG_VERSION: [u8; 4] = [1, 4, 0, 0];
const DNG_BACKWARD_VERSION: [u8; 4] = [1, 1, 0, 0];
/// EXIF light source code for D65
const ILLUMINANT_D65: u16 = 21;
/// Denominator used for rational matrix entries
const RATIONAL_SCALE: i32 = 10_000;

#[derive(Debug, Default)]
pub struct StandardTiffWriter;

fn encode_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::Produce(e.to_string())
}

fn srational(v: f32) -> SRational {
    SRational { n: (v * RATIONAL_SCALE as f32).round() as i32, d: RATIONAL_SCALE }
}

fn rational(v: f32) -> Rational {
    Rational { n: (v.max(0.0) * RATIONAL_SCALE as f32).round() as u32, d: RATIONAL_SCALE as u32 }
}

fn check_dimensions(image: &RgbImageData) -> Result<()> {
    if image.width == 0 || image.height == 0 || image.data.len() != image.width * image.height * 3 {
        return Err(ConversionError::Produce(format!(
            "Invalid image dimensions: width={}, height={}, samples={}",
            image.width, image.height, image.data.len()
        )));
    }
    Ok(())
}

impl TiffWriter for StandardTiffWriter {
    fn write_rgb_tiff(&self, image: &RgbImageData, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding TIFF image: {}x{}", image.width, image.height);
        check_dimensions(image)?;

        let mut buffer = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer)).map_err(encode_error)?;
            encoder.write_image::<colortype::RGB16>(
                image.width as u32,
                image.height as u32,
                &image.data,
            ).map_err(encode_error)?;
        }

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }

    fn write_dng(
        &self,
        image: &RgbImageData,
        info: &DngInfo,
        output: &mut dyn Write,
    ) -> Result<()> {
        debug!("Encoding DNG image: {}x{}", image.width, image.height);
        check_dimensions(image)?;

        let color_matrix: Vec<SRational> = info.color_matrix
            .iter()
            .flatten()
            .map(|&v| srational(v))
            .collect();
        // AsShotNeutral is the camera value of neutral, the inverse of the multipliers.
        let neutral: Vec<Rational> = info.wb_multipliers
            .iter()
            .map(|&m| rational(if m > 0.0 { 1.0 / m } else { 1.0 }))
            .collect();
        let unique_model = format!("{} {}", info.make, info.model);

        let mut buffer = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer)).map_err(encode_error)?;
            let mut dng = encoder
                .new_image::<colortype::RGB16>(image.width as u32, image.height as u32)
                .map_err(encode_error)?;

            let dir = dng.encoder();
            dir.write_tag(Tag::PhotometricInterpretation, PHOTOMETRIC_LINEAR_RAW)
                .map_err(encode_error)?;
            dir.write_tag(Tag::Make, info.make.as_str()).map_err(encode_error)?;
            dir.write_tag(Tag::Model, info.model.as_str()).map_err(encode_error)?;
            dir.write_tag(TAG_DNG_VERSION, &DNG_VERSION[..]).map_err(encode_error)?;
            dir.write_tag(TAG_DNG_BACKWARD_VERSION, &DNG_BACKWARD_VERSION[..])
                .map_err(encode_error)?;
            dir.write_tag(TAG_UNIQUE_CAMERA_MODEL, unique_model.as_str()).map_err(encode_error)?;
            dir.write_tag(TAG_BLACK_LEVEL, 0u16).map_err(encode_error)?;
            dir.write_tag(TAG_WHITE_LEVEL, u16::MAX).map_err(encode_error)?;
            dir.write_tag(TAG_COLOR_MATRIX_1, &color_matrix[..]).map_err(encode_error)?;
            dir.write_tag(TAG_AS_SHOT_NEUTRAL, &neutral[..]).map_err(encode_error)?;
            dir.write_tag(TAG_CALIBRATION_ILLUMINANT_1, ILLUMINANT_D65).map_err(encode_error)?;

            dng.write_data(&image.data).map_err(encode_error)?;
        }

        output.write_all(&buffer)?;

        debug!("DNG encoding complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> RgbImageData {
        RgbImageData { width: 2, height: 1, data: vec![0, 1, 2, 3, 4, 5], bits_per_sample: 16 }
    }

    #[test]
    fn tiff_output_has_tiff_header() {
        let mut out = Vec::new();
        StandardTiffWriter.write_rgb_tiff(&image(), &mut out).unwrap();

        assert!(out.starts_with(b"II*\0") || out.starts_with(b"MM\0*"));
    }

    #[test]
    fn dng_output_has_tiff_header() {
        let info = DngInfo {
            make: "SIGMA".to_string(),
            model: "dp2 Quattro".to_string(),
            color_matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            wb_multipliers: [2.0, 1.0, 1.5],
        };
        let mut out = Vec::new();
        StandardTiffWriter.write_dng(&image(), &info, &mut out).unwrap();

        assert!(out.starts_with(b"II*\0") || out.starts_with(b"MM\0*"));
        assert!(out.windows(b"SIGMA dp2 Quattro".len()).any(|w| w == b"SIGMA dp2 Quattro"));
    }

    #[test]
    fn empty_image_is_rejected() {
        let empty = RgbImageData { width: 0, height: 0, data: vec![], bits_per_sample: 16 };
        let err = StandardTiffWriter.write_rgb_tiff(&empty, &mut Vec::new()).unwrap_err();

        assert!(matches!(err, ConversionError::Produce(_)));
    }
}
