use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::debayer::types::RgbImageData;
use crate::image_pipeline::raw::types::HistogramScale;

/// Bins per stop in a logarithmic histogram.
const BINS_PER_STOP: f64 = 16.0;
/// Stops covered by a 16 bit sample.
const SAMPLE_STOPS: f64 = 16.0;

fn log_bin(value: u16) -> usize {
    if value == 0 {
        0
    } else {
        1 + (BINS_PER_STOP * (value as f64).log2()).floor() as usize
    }
}

fn log_label(bin: usize) -> String {
    if bin == 0 {
        "zero".to_string()
    } else {
        format!("{:.4}", (bin - 1) as f64 / BINS_PER_STOP - SAMPLE_STOPS)
    }
}

/// Counts per channel, indexed by bin.
fn count(image: &RgbImageData, scale: HistogramScale) -> Vec<[u64; 3]> {
    let bin_of = |v: u16| match scale {
        HistogramScale::Linear => v as usize,
        HistogramScale::Log => log_bin(v),
    };

    let mut counts: Vec<[u64; 3]> = Vec::new();
    for px in image.data.chunks_exact(3) {
        for (c, &v) in px.iter().enumerate() {
            let bin = bin_of(v);
            if bin >= counts.len() {
                counts.resize(bin + 1, [0; 3]);
            }
            counts[bin][c] += 1;
        }
    }
    counts
}

/// Writes a CSV histogram with one row per bin up to the highest populated one.
pub fn write_histogram(
    image: &RgbImageData,
    scale: HistogramScale,
    output: &mut dyn Write,
) -> Result<()> {
    let counts = count(image, scale);

    match scale {
        HistogramScale::Linear => writeln!(output, "value,red,green,blue")?,
        HistogramScale::Log => writeln!(output, "stop,red,green,blue")?,
    }

    for (bin, [r, g, b]) in counts.iter().enumerate() {
        let label = match scale {
            HistogramScale::Linear => bin.to_string(),
            HistogramScale::Log => log_label(bin),
        };
        writeln!(output, "{},{},{},{}", label, r, g, b)?;
    }

    Ok(())
}
