//! Collaborator implementation on top of the rawloader library.
//!
//! rawloader parses and decodes any RAW format it knows (ARW, CR2, NEF, DNG,
//! ...). Opening only parses the header; the container keeps the file bytes
//! so that preview lookup and the pixel decode happen in the `load_*` call
//! that needs them.

use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

use tracing::debug;
use rawloader::{RawImage, RawImageData as RawloaderImageData};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::{CpuDebayer, RgbImageData};
use crate::image_pipeline::output::{self, DngInfo, StandardTiffWriter, TiffWriter};
use crate::image_pipeline::raw::backend::RawBackend;
use crate::image_pipeline::raw::preview::find_embedded_jpeg;
use crate::image_pipeline::raw::types::{
    CameraMetadata, HistogramScale, PpmEncoding, PropertyList, RenderOptions, SensorBlock,
};
use crate::image_pipeline::render;

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

/// Parsed RAW file plus the blocks loaded from it so far.
pub struct RawContainer {
    bytes: Vec<u8>,
    /// Header fields only, the pixel data is not decoded
    header: RawImage,
    preview: Option<Vec<u8>>,
    properties: Option<PropertyList>,
    camera: Option<CameraMetadata>,
    sensor: Option<SensorBlock>,
    decoded: Option<RgbImageData>,
}

impl RawContainer {
    fn is_layered(&self) -> bool {
        self.header.cpp == 3
    }
}

fn require<'a, T>(block: &'a Option<T>, name: &str) -> Result<&'a T> {
    block
        .as_ref()
        .ok_or_else(|| ConversionError::Produce(format!("{name} not loaded")))
}

/// Converts the decoder output into a sensor block without touching the values
/// beyond bringing float data to the u16 range.
fn sensor_block(image: &RawImage) -> SensorBlock {
    let data: Vec<u16> = match &image.data {
        RawloaderImageData::Integer(values) => values.clone(),
        // Float data is normalized 0.0-1.0
        RawloaderImageData::Float(values) => {
            values.iter().map(|&v| (v * u16::MAX as f32) as u16).collect()
        }
    };

    // The white level is the largest value the sensor produces, which gives
    // its real bit depth (12, 14 or 16 bit).
    let max_white_level = image.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
    let bits_per_sample = if max_white_level == 0 {
        DEFAULT_BITS_PER_SAMPLE
    } else {
        U16_BITS - max_white_level.leading_zeros()
    };

    SensorBlock {
        width: image.width,
        height: image.height,
        cpp: image.cpp,
        cfa_pattern: image.cfa.name.clone(),
        data,
        bits_per_sample,
    }
}

/// Runs the full pixel decode on the container bytes.
fn decode_pixels(bytes: &[u8]) -> Result<SensorBlock> {
    let image = rawloader::decode(&mut Cursor::new(bytes))
        .map_err(|e| ConversionError::Decode(e.to_string()))?;
    let sensor = sensor_block(&image);
    if sensor.data.len() != sensor.width * sensor.height * sensor.cpp {
        return Err(ConversionError::Decode(format!(
            "sensor block holds {} samples, expected {}x{}x{}",
            sensor.data.len(),
            sensor.width,
            sensor.height,
            sensor.cpp
        )));
    }
    debug!("Calculated bits_per_sample: {}", sensor.bits_per_sample);
    Ok(sensor)
}

/// Creates `dest`, hands a buffered writer to `write` and syncs the file.
fn write_artifact(dest: &Path, write: impl FnOnce(&mut dyn Write) -> Result<()>) -> Result<()> {
    let file = File::create(dest)
        .map_err(|e| ConversionError::Produce(format!("{}: {}", dest.display(), e)))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    let file = writer.into_inner().map_err(|e| ConversionError::Io(e.into_error()))?;
    file.sync_all()?;
    Ok(())
}

#[derive(Default)]
pub struct RawLoaderBackend {
    tiff_writer: StandardTiffWriter,
}

impl RawLoaderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn rendered(&self, container: &RawContainer, options: &RenderOptions) -> Result<RgbImageData> {
        let decoded = require(&container.decoded, "decoded sensor block")?;
        let camera = require(&container.camera, "camera metadata")?;
        render::render(decoded, camera, container.is_layered(), options)
    }
}

impl RawBackend for RawLoaderBackend {
    type Container = RawContainer;

    fn open_container(&self, input: &mut dyn Read) -> Result<RawContainer> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        debug!("Parsing RAW container header, {} bytes", bytes.len());

        let header = rawloader::decode_dummy(&mut Cursor::new(&bytes))
            .map_err(|e| ConversionError::Decode(e.to_string()))?;

        debug!(
            "Parsed {} {}: {}x{}",
            header.clean_make, header.clean_model, header.width, header.height
        );

        Ok(RawContainer {
            bytes,
            header,
            preview: None,
            properties: None,
            camera: None,
            sensor: None,
            decoded: None,
        })
    }

    fn load_embedded_preview(&self, container: &mut RawContainer) -> Result<()> {
        let preview = find_embedded_jpeg(&container.bytes)
            .ok_or_else(|| ConversionError::Decode("no embedded JPEG preview".to_string()))?;
        debug!("Found embedded preview, {} bytes", preview.len());
        container.preview = Some(preview.to_vec());
        Ok(())
    }

    fn load_property_list(&self, container: &mut RawContainer) -> Result<()> {
        let image = &container.header;
        container.properties = Some(PropertyList {
            make: image.make.clone(),
            model: image.model.clone(),
            clean_make: image.clean_make.clone(),
            clean_model: image.clean_model.clone(),
            width: image.width,
            height: image.height,
            components_per_pixel: image.cpp,
            cfa_pattern: image.cfa.name.clone(),
            orientation: image.orientation.to_u16(),
        });
        Ok(())
    }

    fn load_camera_metadata(&self, container: &mut RawContainer) -> Result<()> {
        let image = &container.header;
        container.camera = Some(CameraMetadata {
            wb_coeffs: image.wb_coeffs,
            black_levels: image.blacklevels,
            white_levels: image.whitelevels,
            xyz_to_cam: image.xyz_to_cam,
            crops: image.crops,
        });
        Ok(())
    }

    fn load_undecoded_sensor_block(&self, container: &mut RawContainer) -> Result<()> {
        container.sensor = Some(decode_pixels(&container.bytes)?);
        Ok(())
    }

    fn load_decoded_sensor_block(&self, container: &mut RawContainer) -> Result<()> {
        let fresh;
        let sensor = match &container.sensor {
            Some(sensor) => sensor,
            None => {
                fresh = decode_pixels(&container.bytes)?;
                &fresh
            }
        };
        let decoded = CpuDebayer::new()
            .process(sensor)
            .map_err(|e| ConversionError::Decode(e.to_string()))?;
        container.decoded = Some(decoded);
        Ok(())
    }

    fn dump_preview(&self, container: &RawContainer, dest: &Path) -> Result<()> {
        let preview = require(&container.preview, "embedded preview")?;
        write_artifact(dest, |out| Ok(out.write_all(preview)?))
    }

    fn dump_metadata(
        &self,
        container: &RawContainer,
        max_matrix_elements: usize,
        dest: &Path,
    ) -> Result<()> {
        let properties = require(&container.properties, "property list")?;
        let camera = require(&container.camera, "camera metadata")?;
        write_artifact(dest, |out| {
            output::write_metadata(properties, camera, max_matrix_elements, out)
        })
    }

    fn dump_raw_block(&self, container: &RawContainer, dest: &Path) -> Result<()> {
        let sensor = require(&container.sensor, "sensor block")?;
        write_artifact(dest, |out| Ok(out.write_all(&sensor.to_le_bytes())?))
    }

    fn dump_tiff(
        &self,
        container: &RawContainer,
        options: &RenderOptions,
        dest: &Path,
    ) -> Result<()> {
        let image = self.rendered(container, options)?;
        write_artifact(dest, |out| self.tiff_writer.write_rgb_tiff(&image, out))
    }

    fn dump_dng(
        &self,
        container: &RawContainer,
        options: &RenderOptions,
        dest: &Path,
    ) -> Result<()> {
        let decoded = require(&container.decoded, "decoded sensor block")?;
        let camera = require(&container.camera, "camera metadata")?;
        let (image, wb_multipliers) = render::render_linear_raw(decoded, camera, options)?;
        let info = DngInfo {
            make: container.header.make.clone(),
            model: container.header.model.clone(),
            color_matrix: [camera.xyz_to_cam[0], camera.xyz_to_cam[1], camera.xyz_to_cam[2]],
            wb_multipliers,
        };
        write_artifact(dest, |out| self.tiff_writer.write_dng(&image, &info, out))
    }

    fn dump_ppm(
        &self,
        container: &RawContainer,
        options: &RenderOptions,
        encoding: PpmEncoding,
        dest: &Path,
    ) -> Result<()> {
        let image = self.rendered(container, options)?;
        write_artifact(dest, |out| output::write_ppm(&image, encoding, out))
    }

    fn dump_histogram(
        &self,
        container: &RawContainer,
        options: &RenderOptions,
        scale: HistogramScale,
        dest: &Path,
    ) -> Result<()> {
        let image = self.rendered(container, options)?;
        write_artifact(dest, |out| output::write_histogram(&image, scale, out))
    }
}
