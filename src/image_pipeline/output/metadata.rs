use std::io::Write;

use serde::Serialize;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::types::{CameraMetadata, PropertyList};

#[derive(Debug, Serialize)]
struct MatrixDump {
    name: &'static str,
    rows: usize,
    columns: usize,
    elements: Vec<f64>,
    truncated: bool,
}

impl MatrixDump {
    fn new(
        name: &'static str,
        rows: usize,
        columns: usize,
        values: impl IntoIterator<Item = f64>,
        max: usize,
    ) -> Self {
        let total = rows * columns;
        let elements: Vec<f64> = values.into_iter().take(total.min(max)).collect();
        Self {
            name,
            rows,
            columns,
            truncated: elements.len() < total,
            elements,
        }
    }
}

#[derive(Debug, Serialize)]
struct MetadataDump<'a> {
    properties: &'a PropertyList,
    camera: Vec<MatrixDump>,
}

fn camera_matrices(camera: &CameraMetadata, max: usize) -> Vec<MatrixDump> {
    vec![
        MatrixDump::new("wb_coeffs", 1, 4, camera.wb_coeffs.map(f64::from), max),
        MatrixDump::new("black_levels", 1, 4, camera.black_levels.map(f64::from), max),
        MatrixDump::new("white_levels", 1, 4, camera.white_levels.map(f64::from), max),
        MatrixDump::new(
            "xyz_to_cam",
            4,
            3,
            camera.xyz_to_cam.iter().flatten().map(|&v| f64::from(v)),
            max,
        ),
        MatrixDump::new("crops", 1, 4, camera.crops.map(|v| v as f64), max),
    ]
}

/// Serializes the property list and camera metadata as pretty JSON. No
/// matrix lists more than `max_matrix_elements` elements.
pub fn write_metadata(
    properties: &PropertyList,
    camera: &CameraMetadata,
    max_matrix_elements: usize,
    output: &mut dyn Write,
) -> Result<()> {
    let dump = MetadataDump {
        properties,
        camera: camera_matrices(camera, max_matrix_elements),
    };
    serde_json::to_writer_pretty(&mut *output, &dump)
        .map_err(|e| ConversionError::Produce(e.to_string()))?;
    writeln!(output)?;
    Ok(())
}
