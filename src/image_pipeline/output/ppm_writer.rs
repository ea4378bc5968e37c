use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::debayer::types::RgbImageData;
use crate::image_pipeline::raw::types::PpmEncoding;

const MAX_VALUE: u16 = u16::MAX;

/// Writes a 3x16 bit PPM, P3 for ascii or P6 for binary samples.
pub fn write_ppm(
    image: &RgbImageData,
    encoding: PpmEncoding,
    output: &mut dyn Write,
) -> Result<()> {
    let magic = match encoding {
        PpmEncoding::Ascii => "P3",
        PpmEncoding::Binary => "P6",
    };
    write!(output, "{}\n{} {}\n{}\n", magic, image.width, image.height, MAX_VALUE)?;

    match encoding {
        PpmEncoding::Ascii => {
            let row_len = image.width * 3;
            for row in image.data.chunks(row_len.max(1)) {
                let line: Vec<String> = row.iter().map(u16::to_string).collect();
                writeln!(output, "{}", line.join(" "))?;
            }
        }
        PpmEncoding::Binary => {
            // 16 bit PPM samples are big-endian.
            let bytes: Vec<u8> = image.data.iter().flat_map(|v| v.to_be_bytes()).collect();
            output.write_all(&bytes)?;
        }
    }

    Ok(())
}
