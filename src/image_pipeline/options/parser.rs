//! Command line switch parsing.
//!
//! Switches are single-dash words (`-ppm-ascii`, `-matrixmax`), so they are
//! matched by hand instead of through a flag library. Parsing stops at the
//! first token that does not start with `-`; everything from there on is an
//! input file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::options::types::{
    ColorEncoding, ExecutionConfig, LegacyOffset, OutputKind,
};

/// Parsed command line: the configuration plus the batch of input files.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub config: ExecutionConfig,
    pub inputs: Vec<PathBuf>,
}

pub fn usage(program: &str) -> String {
    format!(
        "usage: {program} <SWITCHES> <file1> ...
   -o <DIR>        Use <DIR> as output dir
   -jpg            Dump embedded JPG
   -meta           Dump metadata
   -raw            Dump RAW area undecoded
   -tiff           Dump RAW as 3x16 bit TIFF
   -dng            Dump RAW as DNG LinearRaw (default)
   -ppm-ascii      Dump RAW/color as 3x16 bit PPM/P3 (ascii)
                   NOTE: 16 bit PPM/P3 is not generally supported
   -ppm            Dump RAW/color as 3x16 bit PPM/P6 (binary)
   -histogram      Dump histogram as csv file
   -loghist        Dump histogram as csv file, with log exposure
   -color <COLOR>  Convert to RGB color
                   (sRGB, AdobeRGB, ProPhotoRGB)
   -unprocessed    Dump RAW without any preprocessing
   -qtop           Dump Quattro top layer without preprocessing
   -crop           Crop to active area
   -denoise        Denoise RAW data
   -wb <WB>        Select white balance preset
   -ocl            Use accelerator

STRANGE STUFF
   -offset <OFF>   Offset for SD14 and older
                   NOTE: If not given, then offset is automatic
   -matrixmax <M>  Max num matrix elements in metadata (def=100)"
    )
}

/// Parses the arguments following the program name.
pub fn parse_args<I, S>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut tokens = args.into_iter().map(Into::into).peekable();
    let mut builder = ExecutionConfig::builder();
    let mut output_dir: Option<PathBuf> = None;

    while let Some(token) = tokens.next_if(|t| t.as_encoded_bytes().starts_with(b"-")) {
        let switch = token.to_string_lossy();
        builder = match switch.as_ref() {
            "-jpg" => builder.output_kind(OutputKind::JpegExtract),
            "-meta" => builder.output_kind(OutputKind::MetaExtract),
            "-raw" => builder.output_kind(OutputKind::RawBlock),
            "-tiff" => builder.output_kind(OutputKind::Tiff),
            "-dng" => builder.output_kind(OutputKind::Dng),
            "-ppm-ascii" => builder.output_kind(OutputKind::PpmAscii),
            "-ppm" => builder.output_kind(OutputKind::PpmBinary),
            "-histogram" => builder.output_kind(OutputKind::HistogramLinear),
            "-loghist" => builder.output_kind(OutputKind::HistogramLog),
            "-color" => {
                let name = string_value(&switch, tokens.next())?;
                let encoding = ColorEncoding::from_switch_value(&name).ok_or_else(|| {
                    ConversionError::Usage(format!("Unknown color encoding: {name}"))
                })?;
                builder.color_encoding(encoding)
            }
            "-o" => {
                let dir = tokens.next().ok_or_else(|| missing_value(&switch))?;
                output_dir = Some(PathBuf::from(dir));
                builder
            }
            "-unprocessed" => builder.color_encoding(ColorEncoding::Unprocessed),
            "-qtop" => builder.color_encoding(ColorEncoding::QuattroTop),
            "-crop" => builder.crop(true),
            "-denoise" => builder.denoise(true),
            "-wb" => builder.white_balance(Some(string_value(&switch, tokens.next())?)),
            "-ocl" => builder.use_accelerator(true),
            "-offset" => {
                let offset = integer_value::<i32>(&switch, tokens.next())?;
                builder.legacy_offset(LegacyOffset::Fixed(offset))
            }
            "-matrixmax" => {
                builder.max_matrix_elements(integer_value::<usize>(&switch, tokens.next())?)
            }
            other => {
                return Err(ConversionError::Usage(format!("Unknown switch: {other}")));
            }
        };
    }

    if let Some(dir) = &output_dir {
        check_dir(dir)?;
    }

    let inputs: Vec<PathBuf> = tokens.map(PathBuf::from).collect();
    if inputs.is_empty() {
        return Err(ConversionError::Usage("No input files given".to_string()));
    }

    let config = builder.output_dir(output_dir).build();
    debug!(?config, files = inputs.len(), "Parsed command line");

    Ok(Invocation { config, inputs })
}

fn check_dir(dir: &Path) -> Result<()> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConversionError::Usage(format!(
            "Could not find outdir {}: not a directory",
            dir.display()
        ))),
        Err(e) => Err(ConversionError::Usage(format!(
            "Could not find outdir {}: {}",
            dir.display(),
            e
        ))),
    }
}

fn missing_value(switch: &str) -> ConversionError {
    ConversionError::Usage(format!("Switch {switch} needs a value"))
}

fn string_value(switch: &str, value: Option<OsString>) -> Result<String> {
    let value = value.ok_or_else(|| missing_value(switch))?;
    value
        .into_string()
        .map_err(|v| {
            ConversionError::Usage(format!(
                "Invalid value for {switch}: {}",
                v.to_string_lossy()
            ))
        })
}

fn integer_value<T: std::str::FromStr>(switch: &str, value: Option<OsString>) -> Result<T> {
    let value = string_value(switch, value)?;
    value
        .trim()
        .parse()
        .map_err(|_| ConversionError::Usage(format!("Invalid number for {switch}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Invocation> {
        parse_args(args.iter().copied())
    }

    #[test]
    fn defaults_when_only_files_given() {
        let invocation = parse(&["a.x3f", "b.x3f"]).unwrap();
        let config = &invocation.config;

        assert_eq!(config.output_kind, OutputKind::Dng);
        assert_eq!(config.color_encoding, ColorEncoding::None);
        assert!(!config.crop);
        assert!(!config.denoise);
        assert!(!config.use_accelerator);
        assert_eq!(config.legacy_offset, LegacyOffset::Automatic);
        assert_eq!(config.max_matrix_elements, 100);
        assert!(config.output_dir.is_none());
        assert!(config.white_balance.is_none());
        assert_eq!(invocation.inputs, vec![PathBuf::from("a.x3f"), PathBuf::from("b.x3f")]);
    }

    #[test]
    fn output_kind_switches() {
        let cases = [
            ("-jpg", OutputKind::JpegExtract),
            ("-meta", OutputKind::MetaExtract),
            ("-raw", OutputKind::RawBlock),
            ("-tiff", OutputKind::Tiff),
            ("-dng", OutputKind::Dng),
            ("-ppm-ascii", OutputKind::PpmAscii),
            ("-ppm", OutputKind::PpmBinary),
            ("-histogram", OutputKind::HistogramLinear),
            ("-loghist", OutputKind::HistogramLog),
        ];
        for (switch, kind) in cases {
            let invocation = parse(&[switch, "in.x3f"]).unwrap();
            assert_eq!(invocation.config.output_kind, kind, "switch {switch}");
        }
    }

    #[test]
    fn last_output_kind_wins() {
        let invocation = parse(&["-jpg", "-tiff", "in.x3f"]).unwrap();
        assert_eq!(invocation.config.output_kind, OutputKind::Tiff);
    }

    #[test]
    fn processing_switches() {
        let invocation = parse(&[
            "-color", "AdobeRGB", "-crop", "-denoise", "-wb", "Daylight", "-ocl",
            "-offset", "-12", "-matrixmax", "7", "in.x3f",
        ])
        .unwrap();
        let config = invocation.config;

        assert_eq!(config.color_encoding, ColorEncoding::AdobeRgb);
        assert!(config.crop);
        assert!(config.denoise);
        assert!(config.use_accelerator);
        assert_eq!(config.white_balance.as_deref(), Some("Daylight"));
        assert_eq!(config.legacy_offset, LegacyOffset::Fixed(-12));
        assert_eq!(config.max_matrix_elements, 7);
    }

    #[test]
    fn unprocessed_and_qtop_set_encoding() {
        let invocation = parse(&["-unprocessed", "in.x3f"]).unwrap();
        assert_eq!(invocation.config.color_encoding, ColorEncoding::Unprocessed);

        let invocation = parse(&["-color", "sRGB", "-qtop", "in.x3f"]).unwrap();
        assert_eq!(invocation.config.color_encoding, ColorEncoding::QuattroTop);
    }

    #[test]
    fn first_plain_token_ends_switches() {
        let invocation = parse(&["-tiff", "a.x3f", "-crop", "b.x3f"]).unwrap();

        assert!(!invocation.config.crop);
        assert_eq!(
            invocation.inputs,
            vec![PathBuf::from("a.x3f"), PathBuf::from("-crop"), PathBuf::from("b.x3f")]
        );
    }

    #[test]
    fn zero_files_is_usage_error() {
        let err = parse(&["-tiff"]).unwrap_err();
        assert!(matches!(err, ConversionError::Usage(_)));

        let err = parse(&[]).unwrap_err();
        assert!(matches!(err, ConversionError::Usage(_)));
    }

    #[test]
    fn unknown_color_is_usage_error() {
        let err = parse(&["-color", "Rec2020", "in.x3f"]).unwrap_err();
        assert!(matches!(err, ConversionError::Usage(msg) if msg.contains("Rec2020")));
    }

    #[test]
    fn unknown_switch_is_usage_error() {
        let err = parse(&["-bogus", "in.x3f"]).unwrap_err();
        assert!(matches!(err, ConversionError::Usage(msg) if msg.contains("-bogus")));
    }

    #[test]
    fn switch_without_value_is_usage_error() {
        assert!(matches!(parse(&["-wb"]), Err(ConversionError::Usage(_))));
        assert!(matches!(parse(&["-o"]), Err(ConversionError::Usage(_))));
    }

    #[test]
    fn bad_number_is_usage_error() {
        let err = parse(&["-offset", "ten", "in.x3f"]).unwrap_err();
        assert!(matches!(err, ConversionError::Usage(_)));
    }

    #[test]
    fn output_dir_must_exist() {
        let err = parse(&["-o", "/definitely/not/here/raw_extract", "in.x3f"]).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Usage(msg) if msg.contains("Could not find outdir")
        ));
    }

    #[test]
    fn output_dir_must_be_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let err = parse(&["-o", &path, "in.x3f"]).unwrap_err();
        assert!(matches!(err, ConversionError::Usage(_)));
    }

    #[test]
    fn existing_output_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap().to_string();

        let invocation = parse(&["-o", &path, "in.x3f"]).unwrap();
        assert_eq!(invocation.config.output_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn usage_mentions_program_name() {
        let text = usage("raw_extract");
        assert!(text.starts_with("usage: raw_extract <SWITCHES>"));
        assert!(text.contains("-matrixmax"));
    }
}
