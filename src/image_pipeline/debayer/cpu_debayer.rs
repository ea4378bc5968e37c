use anyhow::{Result, anyhow, bail};
use tracing::debug;
use std::io::Cursor;
use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use crate::image_pipeline::{debayer::RgbImageData, raw::types::SensorBlock};

pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }

    /// Maps a container CFA pattern name onto the patterns the bayer crate knows.
    pub fn cfa_from_pattern(pattern: &str) -> Option<CFA> {
        match pattern {
            "RGGB" => Some(CFA::RGGB),
            "BGGR" => Some(CFA::BGGR),
            "GRBG" => Some(CFA::GRBG),
            "GBRG" => Some(CFA::GBRG),
            _ => None,
        }
    }

    /// Interpolates a sensor block to interleaved RGB.
    ///
    /// Layered sensors already carry three components per pixel and are
    /// passed through unchanged.
    pub fn process(&self, sensor: &SensorBlock) -> Result<RgbImageData> {
        let width = sensor.width;
        let height = sensor.height;

        if sensor.data.len() != width * height * sensor.cpp {
            bail!(
                "sensor block holds {} samples, expected {}x{}x{}",
                sensor.data.len(), width, height, sensor.cpp
            );
        }

        match sensor.cpp {
            3 => {
                return Ok(RgbImageData {
                    width,
                    height,
                    data: sensor.data.clone(),
                    bits_per_sample: sensor.bits_per_sample,
                });
            }
            1 => {}
            cpp => bail!("unsupported number of components per pixel: {}", cpp),
        }

        let cfa = Self::cfa_from_pattern(&sensor.cfa_pattern)
            .ok_or_else(|| anyhow!("unsupported CFA pattern: {:?}", sensor.cfa_pattern))?;

        debug!("Starting CPU debayering for image {}x{}", width, height);

        // Determine bit depth - bayer crate only supports 8 and 16 bit
        let (bayer_depth, raster_depth, bytes_per_pixel) = if sensor.bits_per_sample <= 8 {
            (BayerDepth::Depth8, RasterDepth::Depth8, 1)
        } else {
            (BayerDepth::Depth16LE, RasterDepth::Depth16, 2)
        };

        let bayer_bytes: Vec<u8> = if bytes_per_pixel == 1 {
            sensor.data.iter().map(|&val| val as u8).collect()
        } else {
            sensor.to_le_bytes()
        };

        let output_buf_size = width * height * 3 * bytes_per_pixel;
        let mut output_buf = vec![0u8; output_buf_size];
        let mut cursor = Cursor::new(&bayer_bytes[..]);

        debug!(
            "Running demosaic with depth={:?}, CFA={}, algo=Linear",
            bayer_depth, sensor.cfa_pattern
        );

        let mut output_raster = RasterMut::new(
            width,
            height,
            raster_depth,
            &mut output_buf
        );

        bayer::run_demosaic(
            &mut cursor,
            bayer_depth,
            cfa,
            Demosaic::Linear,
            &mut output_raster
        ).map_err(|e| anyhow!("Demosaic failed: {:?}", e))?;

        let data: Vec<u16> = if bytes_per_pixel == 1 {
            output_buf.iter().map(|&b| b as u16).collect()
        } else {
            output_buf
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]))
                .collect()
        };

        Ok(RgbImageData {
            width,
            height,
            data,
            bits_per_sample: sensor.bits_per_sample,
        })
    }
}

impl Default for CpuDebayer {
    fn default() -> Self {
        Self::new()
    }
}
