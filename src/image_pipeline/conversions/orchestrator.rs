use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::image_pipeline::{
    common::error::{AtStage, ConversionError, Result, Stage, StageFailure},
    options::{ExecutionConfig, OutputKind},
    paths::PathPair,
    raw::{HistogramScale, PpmEncoding, RawBackend, RawLoaderBackend},
};

/// Drives the collaborator for one input: open, load the blocks the output
/// kind needs, and dump exactly one artifact to the temporary path.
pub struct ConversionPipeline<B: RawBackend> {
    backend: B,
    config: ExecutionConfig,
}

impl ConversionPipeline<RawLoaderBackend> {
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            backend: RawLoaderBackend::new(),
            config,
        }
    }
}

impl<B: RawBackend> ConversionPipeline<B> {
    pub fn with_backend(backend: B, config: ExecutionConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Opens `input` and parses its container. The file handle is closed
    /// before this returns.
    #[instrument(skip(self, input), fields(input = %input.display()))]
    pub fn open(&self, input: &Path) -> std::result::Result<B::Container, StageFailure> {
        let file = File::open(input)
            .map_err(|source| ConversionError::Open {
                path: input.to_path_buf(),
                source,
            })
            .at_stage(Stage::OpenInput)?;

        info!("READ THE RAW FILE {}", input.display());
        let mut reader = BufReader::new(file);
        self.backend.open_container(&mut reader).at_stage(Stage::Decode)
    }

    /// Loads the container blocks the configured output kind consumes.
    pub fn load(&self, container: &mut B::Container) -> std::result::Result<(), StageFailure> {
        self.load_blocks(container).at_stage(Stage::Decode)
    }

    fn load_blocks(&self, container: &mut B::Container) -> Result<()> {
        let kind = self.config.output_kind;
        debug!(?kind, "Loading container blocks");

        if kind == OutputKind::JpegExtract {
            return self.backend.load_embedded_preview(container);
        }

        self.backend.load_property_list(container)?;
        self.backend.load_camera_metadata(container)?;

        match kind {
            OutputKind::MetaExtract => Ok(()),
            OutputKind::RawBlock => self.backend.load_undecoded_sensor_block(container),
            _ => self.backend.load_decoded_sensor_block(container),
        }
    }

    /// Writes the artifact for the configured output kind to the temporary
    /// path of `paths`. The final path is left alone.
    pub fn produce(
        &self,
        container: &B::Container,
        paths: &PathPair,
    ) -> std::result::Result<(), StageFailure> {
        let kind = self.config.output_kind;
        info!("Dump {} to {}", kind.describe(), paths.final_path.display());
        self.dump(kind, container, &paths.temporary_path)
            .at_stage(Stage::ProduceOutput)
    }

    fn dump(&self, kind: OutputKind, container: &B::Container, dest: &Path) -> Result<()> {
        let options = self.config.render_options();
        match kind {
            OutputKind::JpegExtract => self.backend.dump_preview(container, dest),
            OutputKind::MetaExtract => {
                self.backend.dump_metadata(container, self.config.max_matrix_elements, dest)
            }
            OutputKind::RawBlock => self.backend.dump_raw_block(container, dest),
            OutputKind::Tiff => self.backend.dump_tiff(container, &options, dest),
            OutputKind::Dng => self.backend.dump_dng(container, &options, dest),
            OutputKind::PpmAscii => {
                self.backend.dump_ppm(container, &options, PpmEncoding::Ascii, dest)
            }
            OutputKind::PpmBinary => {
                self.backend.dump_ppm(container, &options, PpmEncoding::Binary, dest)
            }
            OutputKind::HistogramLinear => {
                self.backend.dump_histogram(container, &options, HistogramScale::Linear, dest)
            }
            OutputKind::HistogramLog => {
                self.backend.dump_histogram(container, &options, HistogramScale::Log, dest)
            }
        }
    }
}
