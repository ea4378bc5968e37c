//! Pixel rendering
//!
//! Turns a decoded sensor block into the pixel buffer an output writer
//! consumes: crop, denoise, black/white levels, white balance and color
//! encoding, all driven by [`RenderOptions`].

pub mod color;
pub mod denoise;

use tracing::{debug, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::RgbImageData;
use crate::image_pipeline::options::types::{ColorEncoding, LegacyOffset};
use crate::image_pipeline::raw::types::{CameraMetadata, RenderOptions};
use color::{Matrix3, OutputSpace};

pub const WB_AS_SHOT: &str = "AsShot";
pub const WB_DAYLIGHT: &str = "Daylight";
pub const WB_UNITY: &str = "Unity";

/// Renders `decoded` for TIFF, PPM and histogram output.
///
/// `layered` tells whether the sensor delivers three components per pixel,
/// which is required for top layer extraction.
pub fn render(
    decoded: &RgbImageData,
    camera: &CameraMetadata,
    layered: bool,
    options: &RenderOptions,
) -> Result<RgbImageData> {
    let image = prepare(decoded, camera, options);

    let space = match options.color_encoding {
        ColorEncoding::Unprocessed => return Ok(image),
        ColorEncoding::QuattroTop => return top_layer(&image, layered),
        ColorEncoding::None => None,
        ColorEncoding::Srgb => Some(OutputSpace::Srgb),
        ColorEncoding::AdobeRgb => Some(OutputSpace::AdobeRgb),
        ColorEncoding::ProPhotoRgb => Some(OutputSpace::ProPhotoRgb),
    };

    let wb = white_balance(camera, options.white_balance.as_deref())?;
    match space {
        None => Ok(apply_levels(&image, camera, options.legacy_offset, wb, |rgb| rgb)),
        Some(space) => {
            let matrix: Matrix3 = color::camera_to_output(&camera.xyz_to_cam, space)
                .ok_or_else(|| {
                    ConversionError::Produce("camera has no usable color matrix".to_string())
                })?;
            Ok(apply_levels(&image, camera, options.legacy_offset, wb, |rgb| {
                color::apply(&matrix, rgb).map(|v| space.encode(v))
            }))
        }
    }
}

/// Renders `decoded` as linear camera RGB for DNG output.
///
/// Levels are normalized but white balance is not applied; the chosen
/// multipliers are returned so the writer can record them as neutral.
pub fn render_linear_raw(
    decoded: &RgbImageData,
    camera: &CameraMetadata,
    options: &RenderOptions,
) -> Result<(RgbImageData, [f32; 3])> {
    let image = prepare(decoded, camera, options);
    let wb = white_balance(camera, options.white_balance.as_deref())?;
    let linear = apply_levels(&image, camera, options.legacy_offset, [1.0; 3], |rgb| rgb);
    Ok((linear, wb))
}

fn prepare(
    decoded: &RgbImageData,
    camera: &CameraMetadata,
    options: &RenderOptions,
) -> RgbImageData {
    if options.use_accelerator {
        warn!("No accelerator backend available, rendering on CPU");
    }

    let image = if options.crop {
        crop_to_active_area(decoded, camera.crops)
    } else {
        decoded.clone()
    };

    if options.denoise {
        debug!("Denoising {}x{}", image.width, image.height);
        denoise::median3x3(&image)
    } else {
        image
    }
}

/// Crops to the active area. Margins are top, right, bottom, left.
pub fn crop_to_active_area(image: &RgbImageData, crops: [usize; 4]) -> RgbImageData {
    let [top, right, bottom, left] = crops;
    if left + right >= image.width || top + bottom >= image.height {
        warn!(
            "Crop margins {:?} do not fit a {}x{} image, keeping full frame",
            crops, image.width, image.height
        );
        return image.clone();
    }

    let width = image.width - left - right;
    let height = image.height - top - bottom;
    let mut data = Vec::with_capacity(width * height * 3);
    for y in top..top + height {
        let start = (y * image.width + left) * 3;
        data.extend_from_slice(&image.data[start..start + width * 3]);
    }

    RgbImageData {
        width,
        height,
        data,
        bits_per_sample: image.bits_per_sample,
    }
}

fn top_layer(image: &RgbImageData, layered: bool) -> Result<RgbImageData> {
    if !layered {
        return Err(ConversionError::Produce(
            "top layer extraction needs a layered sensor".to_string(),
        ));
    }
    let data = image
        .data
        .chunks_exact(3)
        .flat_map(|px| [px[0]; 3])
        .collect();
    Ok(RgbImageData {
        width: image.width,
        height: image.height,
        data,
        bits_per_sample: image.bits_per_sample,
    })
}

/// Resolves a white balance preset into R, G, B multipliers.
pub fn white_balance(camera: &CameraMetadata, preset: Option<&str>) -> Result<[f32; 3]> {
    match preset.unwrap_or(WB_AS_SHOT) {
        WB_AS_SHOT => Ok(as_shot_multipliers(camera.wb_coeffs)),
        WB_DAYLIGHT => color::daylight_multipliers(&camera.xyz_to_cam).ok_or_else(|| {
            ConversionError::Produce("camera has no daylight white balance".to_string())
        }),
        WB_UNITY => Ok([1.0; 3]),
        other => Err(ConversionError::Produce(format!(
            "Unknown white balance preset: {other} (expected {WB_AS_SHOT}, {WB_DAYLIGHT} or {WB_UNITY})"
        ))),
    }
}

fn as_shot_multipliers(coeffs: [f32; 4]) -> [f32; 3] {
    let green = coeffs[1];
    let usable = green > 0.0 && coeffs[..3].iter().all(|v| v.is_finite() && *v > 0.0);
    if !usable {
        return [1.0; 3];
    }
    [coeffs[0] / green, 1.0, coeffs[2] / green]
}

fn black_levels(camera: &CameraMetadata, offset: LegacyOffset) -> [f32; 3] {
    match offset {
        LegacyOffset::Automatic => [
            camera.black_levels[0] as f32,
            camera.black_levels[1] as f32,
            camera.black_levels[2] as f32,
        ],
        LegacyOffset::Fixed(value) => [value.max(0) as f32; 3],
    }
}

fn apply_levels(
    image: &RgbImageData,
    camera: &CameraMetadata,
    offset: LegacyOffset,
    wb: [f32; 3],
    transform: impl Fn([f32; 3]) -> [f32; 3],
) -> RgbImageData {
    let black = black_levels(camera, offset);
    let range: [f32; 3] =
        std::array::from_fn(|c| (camera.white_levels[c] as f32 - black[c]).max(1.0));

    let data = image
        .data
        .chunks_exact(3)
        .flat_map(|px| {
            let linear: [f32; 3] =
                std::array::from_fn(|c| ((px[c] as f32 - black[c]).max(0.0) / range[c]) * wb[c]);
            transform(linear).map(|v| (v * 65535.0).clamp(0.0, 65535.0) as u16)
        })
        .collect();

    RgbImageData {
        width: image.width,
        height: image.height,
        data,
        bits_per_sample: 16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraMetadata {
        CameraMetadata {
            wb_coeffs: [2.0, 1.0, 1.5, f32::NAN],
            black_levels: [0; 4],
            white_levels: [65535; 4],
            xyz_to_cam: [[0.0; 3]; 4],
            crops: [1, 0, 0, 1],
        }
    }

    fn image() -> RgbImageData {
        RgbImageData {
            width: 2,
            height: 2,
            data: vec![
                0, 0, 0, 1000, 2000, 4000,
                65535, 65535, 65535, 30000, 30000, 30000,
            ],
            bits_per_sample: 16,
        }
    }

    fn assert_near(actual: [u16; 3], expected: [u16; 3]) {
        for c in 0..3 {
            assert!(
                (actual[c] as i32 - expected[c] as i32).abs() <= 1,
                "{actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn unprocessed_returns_sensor_values() {
        let options = RenderOptions {
            color_encoding: ColorEncoding::Unprocessed,
            ..RenderOptions::default()
        };
        let out = render(&image(), &camera(), false, &options).unwrap();
        assert_eq!(out, image());
    }

    #[test]
    fn no_encoding_applies_levels_and_as_shot_balance() {
        let out = render(&image(), &camera(), false, &RenderOptions::default()).unwrap();

        assert_eq!(out.bits_per_sample, 16);
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
        assert_eq!(out.pixel(0, 1), [65535, 65535, 65535]);
        assert_near(out.pixel(1, 1), [60000, 30000, 45000]);
    }

    #[test]
    fn fixed_offset_replaces_black_level() {
        let options = RenderOptions {
            white_balance: Some(WB_UNITY.to_string()),
            legacy_offset: LegacyOffset::Fixed(1000),
            ..RenderOptions::default()
        };
        let out = render(&image(), &camera(), false, &options).unwrap();

        let px = out.pixel(1, 0);
        assert_eq!(px[0], 0);
        assert!(px[1] > 1000 && px[2] > px[1]);
    }

    #[test]
    fn crop_uses_active_area() {
        let options = RenderOptions {
            crop: true,
            color_encoding: ColorEncoding::Unprocessed,
            ..RenderOptions::default()
        };
        let out = render(&image(), &camera(), false, &options).unwrap();

        assert_eq!((out.width, out.height), (1, 1));
        assert_eq!(out.pixel(0, 0), [30000, 30000, 30000]);
    }

    #[test]
    fn oversized_crop_keeps_full_frame() {
        let out = crop_to_active_area(&image(), [2, 0, 0, 0]);
        assert_eq!(out, image());
    }

    #[test]
    fn unknown_preset_is_a_produce_error() {
        let err = white_balance(&camera(), Some("Moonlight")).unwrap_err();
        assert!(matches!(err, ConversionError::Produce(msg) if msg.contains("Moonlight")));
    }

    #[test]
    fn unusable_as_shot_coefficients_fall_back_to_unity() {
        let mut camera = camera();
        camera.wb_coeffs = [f32::NAN; 4];
        assert_eq!(white_balance(&camera, None).unwrap(), [1.0; 3]);
    }

    #[test]
    fn color_encoding_without_matrix_fails() {
        let options = RenderOptions {
            color_encoding: ColorEncoding::Srgb,
            ..RenderOptions::default()
        };
        assert!(render(&image(), &camera(), false, &options).is_err());
    }

    #[test]
    fn top_layer_needs_layered_sensor() {
        let options = RenderOptions {
            color_encoding: ColorEncoding::QuattroTop,
            ..RenderOptions::default()
        };
        assert!(render(&image(), &camera(), false, &options).is_err());

        let out = render(&image(), &camera(), true, &options).unwrap();
        assert_eq!(out.pixel(1, 0), [1000, 1000, 1000]);
    }

    #[test]
    fn linear_raw_leaves_balance_to_the_writer() {
        let (out, wb) = render_linear_raw(&image(), &camera(), &RenderOptions::default()).unwrap();

        assert_eq!(wb, [2.0, 1.0, 1.5]);
        assert_near(out.pixel(1, 1), [30000, 30000, 30000]);
    }
}
